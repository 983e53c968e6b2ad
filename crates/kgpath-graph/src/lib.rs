//! Subgraph extraction and reasoning-path enumeration for kgpath.
//!
//! This crate turns a start entity in a labeled property graph into a list
//! of readable root-to-leaf paths.
//!
//! # Features
//!
//! - `neo4j` (default): the [`Neo4jStore`] backend over Bolt (`neo4rs`)
//! - `test-utils`: the in-memory [`MemoryStore`] for tests and fixtures
//!
//! # Key Abstractions
//!
//! - [`GraphStore`] trait: hop-bounded traversal and entity lookups
//! - [`SubgraphAssembler`]: identity dedup, label filtering, connectivity repair
//! - [`PathEnumerator`]: cycle-guarded depth-first path enumeration
//! - [`Extractor`]: the end-to-end pipeline with timeout handling

#![doc = include_str!("../README.md")]

pub mod assembler;
pub mod enumerator;
pub mod export;
pub mod extraction;
pub mod hop_filter;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
#[cfg(feature = "neo4j")]
pub mod neo4j;
pub mod query;
pub mod stats;
pub mod store;
pub mod types;
pub mod validation;

pub use assembler::{AssemblyReport, SubgraphAssembler, assemble};
pub use enumerator::{PathEnumerator, PathModel, enumerate_paths};
pub use export::{ExportOptions, PathSample, build_samples, find_question_entities, write_samples};
pub use extraction::{Extraction, ExtractionRequest, Extractor};
pub use hop_filter::{MULTI_HOP_MIN, count_arrows, filter_min_hops, filter_rendered};
#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryStore;
#[cfg(feature = "neo4j")]
pub use neo4j::Neo4jStore;
pub use stats::{SubgraphStats, compute_stats, quick_summary};
pub use store::{BoundedPathQuery, GraphStore};
pub use types::{
    Connection, Direction, Edge, Hop, LabelFilter, Node, PATH_DELIMITER, Path, Properties,
    RawNode, RawPathRecord, RawRelationship, Subgraph, render_paths,
};
pub use validation::{ValidationIssue, ValidationResult, validate_subgraph};
