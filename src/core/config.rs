//! Vendoring configuration
//!
//! Every value the pipeline needs (upstream URL, directory layout, copy rules,
//! extension allow-list, directories to drop) lives here with a default that
//! reproduces the stock BTstack layout. A JSON file passed with `--config`
//! overrides any subset of the fields; command-line flags override both.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::error::VendorError;
use crate::core::paths::join_normalized;
use crate::core::util::hash_bytes;

pub const DEFAULT_UPSTREAM_URL: &str = "https://github.com/bluekitchen/btstack";

/// One upstream directory copied into the target tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyRule {
    /// Directory relative to the upstream checkout
    pub from: String,
    /// Directory relative to the target tree ("." for the target itself)
    pub to: String,
}

impl CopyRule {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// Wrap a file (relative to the target tree) in `#if condition` / `#endif`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardRule {
    pub path: String,
    pub condition: String,
}

/// What to do when an include name matches several files by suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AmbiguityPolicy {
    /// Take the first candidate in sorted walk order and warn
    #[default]
    First,
    /// Leave the directive unchanged and fail the rewrite
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VendorConfig {
    pub upstream_url: String,
    /// Branch, tag or commit checked out after fetching
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
    pub checkout_dir: String,
    pub target_dir: String,
    /// Directory rewritten includes are relative to
    pub include_base: String,
    pub copies: Vec<CopyRule>,
    /// Allowed file extensions, without the dot
    pub extensions: Vec<String>,
    /// Subdirectories of the target removed after copying
    pub remove_dirs: Vec<String>,
    /// Include names expected to live outside the vendored tree
    pub external_headers: Vec<String>,
    pub guards: Vec<GuardRule>,
    pub ambiguity: AmbiguityPolicy,
    /// Wipe the target directory before copying
    pub clean: bool,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            git_ref: None,
            checkout_dir: "original/btstack".to_string(),
            target_dir: "src/btstack".to_string(),
            include_base: "src".to_string(),
            copies: vec![
                CopyRule::new("src", "."),
                CopyRule::new("3rd-party/bluedroid/decoder/include", "3rd-party/codec"),
                CopyRule::new("3rd-party/bluedroid/decoder/srce", "3rd-party/codec"),
                CopyRule::new("3rd-party/bluedroid/encoder/include", "3rd-party/codec"),
                CopyRule::new("3rd-party/bluedroid/encoder/srce", "3rd-party/codec"),
                CopyRule::new("3rd-party/rijndael", "3rd-party/rijndael"),
                CopyRule::new("3rd-party/micro-ecc", "3rd-party/micro-ecc"),
                CopyRule::new("3rd-party/md5", "3rd-party/md5"),
                CopyRule::new("3rd-party/yxml", "3rd-party/yxml"),
            ],
            extensions: vec!["h".to_string(), "c".to_string(), "inc".to_string()],
            remove_dirs: vec![
                "3rd-party/micro-ecc/test".to_string(),
                "mesh".to_string(),
                "le-audio".to_string(),
            ],
            external_headers: vec!["btstack_config.h".to_string()],
            guards: Vec::new(),
            ambiguity: AmbiguityPolicy::First,
            clean: false,
        }
    }
}

impl VendorConfig {
    /// Load the configuration, layering the optional JSON file over defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config = serde_json::from_str(&content).map_err(|source| VendorError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    pub fn checkout_path(&self, root: &Path) -> PathBuf {
        join_normalized(root, &self.checkout_dir)
    }

    pub fn target_path(&self, root: &Path) -> PathBuf {
        join_normalized(root, &self.target_dir)
    }

    pub fn include_base_path(&self, root: &Path) -> PathBuf {
        join_normalized(root, &self.include_base)
    }

    pub fn is_external_header(&self, name: &str) -> bool {
        self.external_headers.iter().any(|h| h == name)
    }

    /// Fingerprint of the effective configuration, stored in the manifest
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        hash_bytes(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_reproduce_stock_layout() {
        let config = VendorConfig::default();
        assert_eq!(config.upstream_url, DEFAULT_UPSTREAM_URL);
        assert_eq!(config.copies.len(), 9);
        assert_eq!(config.copies[0], CopyRule::new("src", "."));
        assert_eq!(config.extensions, vec!["h", "c", "inc"]);
        assert!(config.remove_dirs.contains(&"mesh".to_string()));
        assert!(config.is_external_header("btstack_config.h"));
        assert_eq!(config.ambiguity, AmbiguityPolicy::First);
    }

    #[test]
    fn test_load_without_file_is_default() {
        assert_eq!(VendorConfig::load(None).unwrap(), VendorConfig::default());
    }

    #[test]
    fn test_load_partial_file_keeps_other_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("vendor.json");
        std::fs::write(
            &path,
            r#"{"target_dir": "lib/bt", "ambiguity": "error", "remove_dirs": []}"#,
        )
        .unwrap();

        let config = VendorConfig::load(Some(&path)).unwrap();
        assert_eq!(config.target_dir, "lib/bt");
        assert_eq!(config.ambiguity, AmbiguityPolicy::Error);
        assert!(config.remove_dirs.is_empty());
        assert_eq!(config.checkout_dir, "original/btstack");
    }

    #[test]
    fn test_load_rejects_unknown_fields() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("vendor.json");
        std::fs::write(&path, r#"{"taget_dir": "typo"}"#).unwrap();

        let err = VendorConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<VendorError>(),
            Some(VendorError::Config { .. })
        ));
    }

    #[test]
    fn test_paths_are_under_root() {
        let config = VendorConfig::default();
        let root = Path::new("/project");
        assert_eq!(
            config.target_path(root),
            PathBuf::from("/project/src/btstack")
        );
        assert_eq!(
            config.checkout_path(root),
            PathBuf::from("/project/original/btstack")
        );
        assert_eq!(config.include_base_path(root), PathBuf::from("/project/src"));
    }

    #[test]
    fn test_fingerprint_tracks_changes() {
        let a = VendorConfig::default();
        let mut b = VendorConfig::default();
        assert_eq!(a.fingerprint(), b.fingerprint());
        b.extensions.push("S".to_string());
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
