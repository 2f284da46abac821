//! Rewrite flow - rewrite includes in an already vendored tree

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::config::{AmbiguityPolicy, VendorConfig};
use crate::core::paths::{make_relative, normalize_path};
use crate::core::tree::SourceTree;
use crate::includes::pathmap::PathMap;
use crate::includes::resolve::Resolver;
use crate::includes::rewrite::{RewriteReport, Rewriter};
use crate::manifest::store::load_path_map;

/// Path shown in output: relative to root when possible
pub fn display_path(path: &Path, root: &Path) -> String {
    make_relative(path, root).unwrap_or_else(|| normalize_path(path))
}

/// Prefix rewritten includes carry: the target relative to the include base.
/// Empty when the target is not below it.
pub fn include_prefix(root: &Path, config: &VendorConfig, target: &Path) -> String {
    let base = config.include_base_path(root);
    match make_relative(target, &base) {
        Some(prefix) => prefix,
        None => {
            debug!(
                "{} is not below {}, includes are written relative to the tree itself",
                target.display(),
                base.display()
            );
            String::new()
        }
    }
}

/// Rewrite every include under `dir` (the configured target by default).
///
/// The manifest's path map is used for the configured target when present;
/// any other directory is resolved by walking it.
pub fn run_rewrite(
    root: &Path,
    config: &VendorConfig,
    dir: Option<&Path>,
    policy: AmbiguityPolicy,
) -> Result<RewriteReport> {
    let configured = config.target_path(root);
    let target: PathBuf = match dir {
        Some(dir) if dir.is_absolute() => dir.to_path_buf(),
        Some(dir) => root.join(dir),
        None => configured.clone(),
    };
    if !target.is_dir() {
        bail!("Directory does not exist: {}", target.display());
    }

    let mut map = if target == configured {
        load_path_map(root, config)?.unwrap_or_default()
    } else {
        PathMap::new()
    };
    map.prune(&target);

    let tree = SourceTree::new(&target);
    let added = map.fill_from_tree(&tree)?;
    debug!("path map: {} entries, {} from the tree walk", map.len(), added);

    let resolver = Resolver::new(&map, include_prefix(root, config, &target), policy);
    let rewriter = Rewriter::new(
        &resolver,
        &config.external_headers,
        display_path(&target, root),
    );
    rewriter.rewrite_tree(&tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::paths::join_normalized;
    use crate::manifest::meta::Manifest;
    use crate::manifest::store::write_manifest;
    use std::fs;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = join_normalized(root, rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_include_prefix() {
        let root = Path::new("/project");
        let config = VendorConfig::default();
        assert_eq!(
            include_prefix(root, &config, &config.target_path(root)),
            "btstack"
        );
        assert_eq!(include_prefix(root, &config, Path::new("/elsewhere")), "");
    }

    #[test]
    fn test_rewrite_without_manifest_walks_tree() {
        let temp = tempdir().unwrap();
        write(temp.path(), "src/btstack/hci.h", "");
        write(temp.path(), "src/btstack/classic/a2dp.c", "#include \"hci.h\"\n");

        let config = VendorConfig::default();
        let report = run_rewrite(temp.path(), &config, None, AmbiguityPolicy::First).unwrap();

        assert_eq!(report.directives_changed, 1);
        assert_eq!(
            fs::read_to_string(temp.path().join("src/btstack/classic/a2dp.c")).unwrap(),
            "#include \"btstack/hci.h\"\n"
        );

        let again = run_rewrite(temp.path(), &config, None, AmbiguityPolicy::First).unwrap();
        assert_eq!(again.directives_changed, 0);
        assert_eq!(again.files_changed, 0);
    }

    #[test]
    fn test_rewrite_uses_manifest_origins() {
        let temp = tempdir().unwrap();
        write(temp.path(), "src/btstack/3rd-party/codec/oi_codec_sbc.h", "");
        write(temp.path(), "src/btstack/other/oi_codec_sbc.h", "");
        write(
            temp.path(),
            "src/btstack/3rd-party/codec/decoder.c",
            "#include \"../include/oi_codec_sbc.h\"\n",
        );

        let mut map = PathMap::new();
        map.record(
            "3rd-party/bluedroid/decoder/include/oi_codec_sbc.h",
            "oi_codec_sbc.h",
            "3rd-party/codec/oi_codec_sbc.h",
        );
        map.record(
            "3rd-party/bluedroid/decoder/srce/decoder.c",
            "decoder.c",
            "3rd-party/codec/decoder.c",
        );
        let config = VendorConfig::default();
        write_manifest(
            temp.path(),
            &Manifest::new(&config.upstream_url, None, &config.fingerprint(), map),
        )
        .unwrap();

        run_rewrite(temp.path(), &config, None, AmbiguityPolicy::Error).unwrap();
        assert_eq!(
            fs::read_to_string(temp.path().join("src/btstack/3rd-party/codec/decoder.c"))
                .unwrap(),
            "#include \"btstack/3rd-party/codec/oi_codec_sbc.h\"\n"
        );
    }

    #[test]
    fn test_rewrite_missing_directory_fails() {
        let temp = tempdir().unwrap();
        let result = run_rewrite(
            temp.path(),
            &VendorConfig::default(),
            Some(Path::new("nope")),
            AmbiguityPolicy::First,
        );
        assert!(result.is_err());
    }
}
