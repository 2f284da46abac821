//! Flows module - Operations combining several pipeline stages
//!
//! Provides:
//! - setup: the full vendoring pipeline
//! - fetch: clone or pull the upstream checkout
//! - rewrite: include rewriting over an existing tree

pub mod fetch;
pub mod rewrite;
pub mod setup;
