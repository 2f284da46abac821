//! Core module - Contains the fundamental data structures and utilities
//!
//! This module provides:
//! - Unified result model (ResultItem)
//! - Rendering functions for different output formats
//! - Vendoring configuration and domain errors
//! - Log level selection and tracing setup
//! - Path normalization utilities
//! - Sorted source tree listing

pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod paths;
pub mod render;
pub mod tree;
pub mod util;
