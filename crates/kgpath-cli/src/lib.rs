//! Command-line front end for kgpath.
//!
//! # Key Abstractions
//!
//! - [`KgpathCli<C>`](app::KgpathCli): application parameterized over a config provider
//! - [`KgpathConfig`](config::KgpathConfig): TOML + environment configuration
//! - [`handlers`]: one function per graph command, returning printable output

#![doc = include_str!("../README.md")]

pub mod app;
pub mod cli;
pub mod config;
pub mod config_handlers;
pub mod handlers;

pub use app::KgpathCli;
pub use cli::{CliArgs, Command, ConfigAction, ConfigCommand, TraversalArgs};
pub use config::KgpathConfig;
