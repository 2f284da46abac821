//! Vendored tree verification
//!
//! Checks for:
//! - quoted includes that point to no existing file
//! - files outside the extension allow-list
//! - directories that should have been removed

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::core::config::VendorConfig;
use crate::core::model::{ResultItem, ResultSet, Stage, VendorIssue};
use crate::core::paths::{has_allowed_extension, join_normalized, make_relative, normalize_path};
use crate::core::tree::SourceTree;
use crate::core::util::plural;
use crate::includes::parse::{parse_content, Delimiter};

/// A verification issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyIssue {
    pub code: &'static str,
    pub message: String,
    pub path: String,
    pub line: Option<u32>,
}

impl VerifyIssue {
    fn new(code: &'static str, message: String, path: &str, line: Option<u32>) -> Self {
        Self {
            code,
            message,
            path: path.to_string(),
            line,
        }
    }

    pub fn to_result_item(&self) -> ResultItem {
        let mut item = ResultItem::error(VendorIssue::new(self.code, &self.message), Stage::Verify)
            .with_path(self.path.clone());
        item.line = self.line;
        item
    }
}

/// Outcome of verifying a tree
#[derive(Debug, Clone, Default)]
pub struct Verification {
    pub issues: Vec<VerifyIssue>,
    pub files: usize,
    pub includes: usize,
}

impl Verification {
    pub fn to_result_set(&self) -> ResultSet {
        let mut result_set = ResultSet::new();
        for issue in &self.issues {
            result_set.push(issue.to_result_item());
        }
        result_set.sort();

        if self.issues.is_empty() {
            result_set.push(ResultItem::check(
                format!(
                    "{} file{} and {} quoted include{} verified",
                    self.files,
                    plural(self.files),
                    self.includes,
                    plural(self.includes)
                ),
                Stage::Verify,
            ));
        }
        result_set
    }
}

/// Whether a quoted include names an existing file
fn include_exists(
    target: &str,
    including_dir: &Path,
    target_root: &Path,
    include_base: &Path,
) -> bool {
    [include_base, target_root, including_dir]
        .iter()
        .any(|base| join_normalized(base, target).is_file())
}

/// Verify the configured target tree under `root`
pub fn verify_tree(root: &Path, config: &VendorConfig) -> Result<Verification> {
    let target = config.target_path(root);
    let include_base = config.include_base_path(root);
    let display = |path: &Path| make_relative(path, root).unwrap_or_else(|| normalize_path(path));

    let mut verification = Verification::default();
    let tree = SourceTree::new(&target);

    if !tree.exists() {
        verification.issues.push(VerifyIssue::new(
            "TARGET_MISSING",
            format!("target directory {} does not exist", config.target_dir),
            &config.target_dir,
            None,
        ));
        return Ok(verification);
    }

    for file in tree.files()? {
        verification.files += 1;
        let path = display(&file.path);

        if !has_allowed_extension(&file.path, &config.extensions) {
            verification.issues.push(VerifyIssue::new(
                "DISALLOWED_FILE",
                format!("{} is not an allowed source file", file.relative),
                &path,
                None,
            ));
            continue;
        }

        let content = fs::read(&file.path)
            .with_context(|| format!("Failed to read {}", file.path.display()))?;
        let including_dir = file.path.parent().unwrap_or(target.as_path());

        for directive in parse_content(&content) {
            if directive.delimiter == Delimiter::Angle {
                continue;
            }
            verification.includes += 1;

            if config.is_external_header(&directive.target)
                || include_exists(&directive.target, including_dir, &target, &include_base)
            {
                continue;
            }

            verification.issues.push(VerifyIssue::new(
                "UNRESOLVED_INCLUDE",
                format!("{} does not resolve to a file", directive.written()),
                &path,
                Some(directive.line),
            ));
        }
    }

    for dir in &config.remove_dirs {
        let full = join_normalized(&target, dir);
        if full.exists() {
            verification.issues.push(VerifyIssue::new(
                "REMOVED_DIR_PRESENT",
                format!("{} should have been removed", dir),
                &display(&full),
                None,
            ));
        }
    }

    Ok(verification)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_clean_tree_passes() {
        let temp = tempdir().unwrap();
        write(temp.path(), "src/btstack/hci.h", "#include <stdint.h>\n");
        write(
            temp.path(),
            "src/btstack/classic/a2dp.c",
            "#include \"btstack_config.h\"\n#include \"btstack/hci.h\"\n",
        );

        let verification = verify_tree(temp.path(), &VendorConfig::default()).unwrap();
        assert!(verification.issues.is_empty(), "{:?}", verification.issues);
        assert_eq!(verification.files, 2);
        assert_eq!(verification.includes, 2);

        let results = verification.to_result_set();
        assert_eq!(results.len(), 1);
        assert_eq!(results.error_count(), 0);
    }

    #[test]
    fn test_reports_unresolved_include_with_line() {
        let temp = tempdir().unwrap();
        write(
            temp.path(),
            "src/btstack/hci.c",
            "int a;\n#include \"btstack/missing.h\"\n",
        );

        let verification = verify_tree(temp.path(), &VendorConfig::default()).unwrap();
        assert_eq!(verification.issues.len(), 1);
        let issue = &verification.issues[0];
        assert_eq!(issue.code, "UNRESOLVED_INCLUDE");
        assert_eq!(issue.path, "src/btstack/hci.c");
        assert_eq!(issue.line, Some(2));
    }

    #[test]
    fn test_non_utf8_file_is_still_checked() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("src/btstack/oi_codec.c");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"/* \xa9 1999 */\n#include \"missing.h\"\n").unwrap();

        let verification = verify_tree(temp.path(), &VendorConfig::default()).unwrap();
        assert_eq!(verification.includes, 1);
        assert_eq!(verification.issues.len(), 1);
        assert_eq!(verification.issues[0].code, "UNRESOLVED_INCLUDE");
        assert_eq!(verification.issues[0].line, Some(2));
    }

    #[test]
    fn test_include_relative_to_including_file_is_accepted() {
        let temp = tempdir().unwrap();
        write(temp.path(), "src/btstack/classic/avdtp.h", "");
        write(temp.path(), "src/btstack/classic/a2dp.c", "#include \"avdtp.h\"\n");

        let verification = verify_tree(temp.path(), &VendorConfig::default()).unwrap();
        assert!(verification.issues.is_empty());
    }

    #[test]
    fn test_reports_disallowed_files_and_leftover_dirs() {
        let temp = tempdir().unwrap();
        write(temp.path(), "src/btstack/README.md", "# btstack");
        write(temp.path(), "src/btstack/mesh/mesh.h", "");

        let verification = verify_tree(temp.path(), &VendorConfig::default()).unwrap();
        let codes: Vec<_> = verification.issues.iter().map(|i| i.code).collect();
        assert_eq!(codes, vec!["DISALLOWED_FILE", "REMOVED_DIR_PRESENT"]);
        assert_eq!(verification.issues[1].path, "src/btstack/mesh");
    }

    #[test]
    fn test_missing_target_is_an_issue() {
        let temp = tempdir().unwrap();
        let verification = verify_tree(temp.path(), &VendorConfig::default()).unwrap();
        assert_eq!(verification.issues[0].code, "TARGET_MISSING");
    }
}
