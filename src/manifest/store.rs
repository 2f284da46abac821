//! Manifest store - Read/write .btvendor/manifest.json

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::core::config::VendorConfig;
use crate::core::paths::state_dir;
use crate::includes::pathmap::PathMap;
use crate::manifest::meta::{Manifest, MANIFEST_VERSION};

pub const MANIFEST_FILE: &str = "manifest.json";

/// Ensure the state directory exists
pub fn ensure_state_dir(root: &Path) -> Result<PathBuf> {
    let dir = state_dir(root);
    if !dir.exists() {
        fs::create_dir_all(&dir).context("Failed to create .btvendor directory")?;
    }
    Ok(dir)
}

pub fn manifest_path(root: &Path) -> PathBuf {
    state_dir(root).join(MANIFEST_FILE)
}

/// Write the manifest, returning its path
pub fn write_manifest(root: &Path, manifest: &Manifest) -> Result<PathBuf> {
    let dir = ensure_state_dir(root)?;
    let path = dir.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(manifest)?;
    fs::write(&path, json).context("Failed to write manifest.json")?;
    Ok(path)
}

/// Read the manifest; `None` when there is none
pub fn read_manifest(root: &Path) -> Result<Option<Manifest>> {
    let path = manifest_path(root);
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path).context("Failed to read manifest.json")?;
    let manifest: Manifest = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(manifest))
}

/// Path map recorded by the last setup run, if it is usable
pub fn load_path_map(root: &Path, config: &VendorConfig) -> Result<Option<PathMap>> {
    let Some(manifest) = read_manifest(root)? else {
        return Ok(None);
    };

    if manifest.manifest_version != MANIFEST_VERSION {
        warn!(
            "ignoring manifest with version {} (expected {})",
            manifest.manifest_version, MANIFEST_VERSION
        );
        return Ok(None);
    }
    if manifest.config_hash != config.fingerprint() {
        warn!("manifest was written with a different configuration; using its path map anyway");
    }
    Ok(Some(manifest.entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_map() -> PathMap {
        let mut map = PathMap::new();
        map.record("src/hci.h", "hci.h", "hci.h");
        map
    }

    #[test]
    fn test_write_read_manifest() {
        let temp = tempdir().unwrap();
        let manifest = Manifest::new("https://example.com/btstack", Some("abc".into()), "h1", sample_map());
        let path = write_manifest(temp.path(), &manifest).unwrap();

        assert!(path.ends_with(".btvendor/manifest.json"));
        let read = read_manifest(temp.path()).unwrap().unwrap();
        assert_eq!(read, manifest);
        assert!(chrono::DateTime::parse_from_rfc3339(&read.generated_at).is_ok());
    }

    #[test]
    fn test_missing_manifest_is_none() {
        let temp = tempdir().unwrap();
        assert!(read_manifest(temp.path()).unwrap().is_none());
        assert!(load_path_map(temp.path(), &VendorConfig::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_load_path_map_tolerates_config_change() {
        let temp = tempdir().unwrap();
        let manifest = Manifest::new("u", None, "stale-hash", sample_map());
        write_manifest(temp.path(), &manifest).unwrap();

        let map = load_path_map(temp.path(), &VendorConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(map.origin("hci.h").unwrap().original, "src/hci.h");
    }

    #[test]
    fn test_load_path_map_skips_other_versions() {
        let temp = tempdir().unwrap();
        let mut manifest = Manifest::new("u", None, "h", sample_map());
        manifest.manifest_version = "0".to_string();
        write_manifest(temp.path(), &manifest).unwrap();

        assert!(load_path_map(temp.path(), &VendorConfig::default())
            .unwrap()
            .is_none());
    }
}
