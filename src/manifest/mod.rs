//! Vendoring manifest
//!
//! Records which upstream file every vendored file came from, so a later
//! `rewrite` can resolve includes through the same path map the setup run
//! built.

pub mod meta;
pub mod store;
