//! Includes module - Include directive handling for the vendored tree
//!
//! Provides:
//! - Directive parsing
//! - The explicit original -> new path map
//! - Resolution of include names against the tree
//! - Rewriting and verification passes

pub mod parse;
pub mod pathmap;
pub mod resolve;
pub mod rewrite;
pub mod verify;
