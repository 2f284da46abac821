//! Setup flow - the full vendoring pipeline
//!
//! fetch -> clean -> copy -> filter extensions -> remove dirs -> prune map
//! -> rewrite includes -> guards -> manifest
//!
//! A fetch failure stops the run before the target tree is touched.

use anyhow::Result;
use std::path::Path;
use tracing::{debug, info};

use crate::core::config::VendorConfig;
use crate::core::error::VendorError;
use crate::core::model::{Kind, ResultItem, ResultSet, Stage};
use crate::core::paths::{make_relative, normalize_path};
use crate::core::tree::SourceTree;
use crate::flows::fetch::{fetch_upstream, offline_checkout};
use crate::flows::rewrite::{display_path, include_prefix};
use crate::includes::pathmap::PathMap;
use crate::includes::resolve::Resolver;
use crate::includes::rewrite::{RewriteReport, Rewriter};
use crate::manifest::meta::Manifest;
use crate::manifest::store::write_manifest;
use crate::vendor::cleanup::{clean_target, filter_extensions, remove_dirs};
use crate::vendor::copy::copy_all;
use crate::vendor::guard::apply_guards;

#[derive(Debug, Clone, Copy, Default)]
pub struct SetupOptions {
    /// Use the existing checkout instead of fetching
    pub offline: bool,
    /// Wipe the target before copying (in addition to `config.clean`)
    pub clean: bool,
}

/// Everything a setup run did
#[derive(Debug, Clone, Default)]
pub struct SetupReport {
    pub results: ResultSet,
    pub commit: Option<String>,
    pub files_copied: usize,
    pub files_removed: usize,
    pub rewrite: RewriteReport,
    pub guards_applied: usize,
}

impl SetupReport {
    /// Fail when the ambiguity policy refused to rewrite directives
    pub fn into_result(self) -> Result<Self> {
        if self.rewrite.refused > 0 {
            return Err(VendorError::AmbiguousIncludes(self.rewrite.refused).into());
        }
        Ok(self)
    }
}

/// Run the full pipeline under `root`
pub fn run_setup(root: &Path, config: &VendorConfig, options: SetupOptions) -> Result<SetupReport> {
    let checkout = config.checkout_path(root);
    let target = config.target_path(root);
    let display = display_path(&target, root);

    let mut report = SetupReport::default();

    // fetch
    if options.offline {
        report.commit = offline_checkout(root, config)?;
    } else {
        let fetched = fetch_upstream(root, config)?;
        report.commit = fetched.commit.clone();
        report.results.append(fetched.results);
    }

    // clean
    if (options.clean || config.clean) && clean_target(&target)? {
        let mut item = ResultItem::remove(display.clone());
        item.excerpt = Some("target cleaned before copy".to_string());
        report.results.push(item);
    }

    // copy
    let mut map = PathMap::new();
    let copied = copy_all(&checkout, &target, &config.copies, &mut map, &display)?;
    report.files_copied = copied.items.iter().filter_map(|i| i.meta.files).sum();
    report.results.append(copied);

    // cleanup
    let filtered = filter_extensions(&target, &config.extensions, &display)?;
    let removed = remove_dirs(&target, &config.remove_dirs, &display)?;
    report.files_removed = filtered.len()
        + removed
            .items
            .iter()
            .filter_map(|i| i.meta.files)
            .sum::<usize>();
    report.results.append(filtered);
    report.results.append(removed);

    let tree = SourceTree::new(&target);
    let kept = map.fill_from_tree(&tree)?;
    if kept > 0 {
        debug!("{} file(s) from earlier runs kept in the target", kept);
    }
    let pruned = map.prune(&target);
    debug!("pruned {} path map entr{}", pruned, if pruned == 1 { "y" } else { "ies" });

    // rewrite
    let prefix = include_prefix(root, config, &target);
    let resolver = Resolver::new(&map, prefix, config.ambiguity);
    let rewriter = Rewriter::new(&resolver, &config.external_headers, display.clone());
    report.rewrite = rewriter.rewrite_tree(&tree)?;
    report.results.append(report.rewrite.results.clone());

    // guards
    let guarded = apply_guards(&target, &config.guards, &display)?;
    report.guards_applied = guarded.len();
    report.results.append(guarded);

    // manifest
    let manifest = Manifest::new(
        &config.upstream_url,
        report.commit.clone(),
        &config.fingerprint(),
        map,
    );
    let entries = manifest.entries.len();
    let path = write_manifest(root, &manifest)?;
    let manifest_display = make_relative(&path, root).unwrap_or_else(|| normalize_path(&path));
    info!("wrote {}", manifest_display);
    report.results.push(
        ResultItem::check(format!("{} entries recorded", entries), Stage::Manifest)
            .with_path(manifest_display),
    );

    info!(
        "vendored {} file(s), rewrote {} include(s) in {} file(s)",
        report.files_copied - report.files_removed.min(report.files_copied),
        report.rewrite.directives_changed,
        report.rewrite.files_changed
    );
    debug!(
        "{} rewrite item(s), {} left unchanged",
        report.results.count(Kind::Rewrite),
        report.rewrite.unresolved
    );

    report.results.sort();
    Ok(report)
}
