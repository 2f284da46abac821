//! Fetch flow - bring the upstream checkout up to date

use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::core::config::VendorConfig;
use crate::core::error::VendorError;
use crate::core::model::{Meta, ResultItem, ResultSet};
use crate::flows::rewrite::display_path;
use crate::vendor::git::{fetch, head_commit};

#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub results: ResultSet,
    pub commit: Option<String>,
}

/// Clone or pull the configured upstream
pub fn fetch_upstream(root: &Path, config: &VendorConfig) -> Result<FetchReport> {
    let checkout = config.checkout_path(root);
    let outcome = fetch(&config.upstream_url, &checkout, config.git_ref.as_deref())?;
    if !outcome.output.is_empty() {
        info!("{}", outcome.output);
    }

    let mut excerpt = format!("{} {}", outcome.action.as_str(), config.upstream_url);
    if let Some(git_ref) = &config.git_ref {
        excerpt.push_str(&format!(" at {}", git_ref));
    }
    let item = ResultItem::fetch(display_path(&checkout, root), excerpt).with_meta(Meta {
        commit: outcome.commit.clone(),
        ..Default::default()
    });

    let mut results = ResultSet::new();
    results.push(item);
    Ok(FetchReport {
        results,
        commit: outcome.commit,
    })
}

/// Use the existing checkout without fetching. Returns its commit when it is
/// a git checkout.
pub fn offline_checkout(root: &Path, config: &VendorConfig) -> Result<Option<String>> {
    let checkout = config.checkout_path(root);
    if !checkout.is_dir() {
        return Err(VendorError::MissingCheckout(checkout).into());
    }
    info!("offline: using {}", checkout.display());

    if checkout.join(".git").exists() {
        Ok(head_commit(&checkout))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_offline_checkout_requires_directory() {
        let temp = tempdir().unwrap();
        let config = VendorConfig::default();
        assert!(offline_checkout(temp.path(), &config).is_err());

        fs::create_dir_all(temp.path().join("original/btstack")).unwrap();
        assert_eq!(offline_checkout(temp.path(), &config).unwrap(), None);
    }

    #[test]
    fn test_fetch_failure_leaves_no_results() {
        if !crate::vendor::git::is_git_available() {
            return;
        }
        let temp = tempdir().unwrap();
        let config = VendorConfig {
            upstream_url: temp.path().join("missing").to_string_lossy().to_string(),
            ..VendorConfig::default()
        };

        let err = fetch_upstream(temp.path(), &config).unwrap_err();
        assert!(err.to_string().contains("could not execute git command"));
    }
}
