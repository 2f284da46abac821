//! Manifest contents

use serde::{Deserialize, Serialize};

use crate::includes::pathmap::PathMap;

/// Manifest format version
pub const MANIFEST_VERSION: &str = "1";

/// Vendoring manifest stored in .btvendor/manifest.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Manifest format version
    pub manifest_version: String,

    /// Version of the tool that wrote it
    pub tool_version: String,

    pub upstream_url: String,

    /// Upstream commit the tree was copied from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_commit: Option<String>,

    /// Hash of the configuration used for the run
    pub config_hash: String,

    /// RFC 3339 timestamp
    pub generated_at: String,

    pub entries: PathMap,
}

impl Manifest {
    pub fn new(
        upstream_url: &str,
        upstream_commit: Option<String>,
        config_hash: &str,
        entries: PathMap,
    ) -> Self {
        Self {
            manifest_version: MANIFEST_VERSION.to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            upstream_url: upstream_url.to_string(),
            upstream_commit,
            config_hash: config_hash.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            entries,
        }
    }
}
