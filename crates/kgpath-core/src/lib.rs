//! kgpath Core: shared errors, settings, and configuration traits.
//!
//! This crate provides the foundational types used across all kgpath crates.
//! It has no internal kgpath dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`settings`]: Store connection and extraction settings
//! - [`traits`]: Configuration provider abstraction

#![doc = include_str!("../README.md")]

pub mod error;
pub mod settings;
pub mod traits;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use settings::{ExtractionSettings, StoreSettings};
pub use traits::ConfigProvider;
