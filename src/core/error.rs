//! Domain errors
//!
//! Command handlers work in `anyhow::Result`; these are the failures callers
//! (and tests) may want to match on.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VendorError {
    #[error("could not execute git command `git {args}` (exit status {status}): {stderr}")]
    FetchFailed {
        args: String,
        status: String,
        stderr: String,
    },

    #[error("git is not installed or not on PATH")]
    GitUnavailable,

    #[error("upstream checkout {0} does not exist; run without --offline to fetch it")]
    MissingCheckout(PathBuf),

    #[error("copy source {0} does not exist in the upstream checkout")]
    MissingSource(PathBuf),

    #[error("{0} ambiguous include(s) left unchanged")]
    AmbiguousIncludes(usize),

    #[error("verification found {0} issue(s)")]
    VerificationFailed(usize),

    #[error("guard target {0} does not exist")]
    MissingGuardTarget(PathBuf),

    #[error("invalid configuration in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
