//! Path normalization utilities
//!
//! Ensures all paths are normalized to use '/' as separator and are relative to root.

use std::path::{Path, PathBuf};

/// Normalize a path to use '/' as separator (for cross-platform consistency)
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Make a path relative to the root directory
pub fn make_relative(path: &Path, root: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(normalize_path)
}

/// Join a '/'-separated relative path onto a base directory
pub fn join_normalized(base: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .fold(base.to_path_buf(), |acc, part| acc.join(part))
}

/// Collapse `.` and `..` segments of a '/'-separated relative path.
///
/// Returns `None` when the path climbs above its starting directory.
pub fn collapse_relative(path: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    Some(parts.join("/"))
}

/// Join two '/'-separated relative paths, treating an empty prefix as the root
pub fn join_relative(prefix: &str, path: &str) -> String {
    if prefix.is_empty() || prefix == "." {
        path.to_string()
    } else {
        format!("{}/{}", prefix.trim_end_matches('/'), path)
    }
}

/// Parent directory of a '/'-separated relative path ("" for top-level files)
pub fn parent_relative(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Last component of a '/'-separated relative path
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Whether `path` ends with `suffix` on a path-component boundary
pub fn ends_with_components(path: &str, suffix: &str) -> bool {
    if path == suffix {
        return true;
    }
    path.len() > suffix.len()
        && path.ends_with(suffix)
        && path.as_bytes()[path.len() - suffix.len() - 1] == b'/'
}

/// Check whether the file has one of the allowed extensions (without dot,
/// case-sensitive)
pub fn has_allowed_extension(path: &Path, allowed: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| allowed.iter().any(|a| a.trim_start_matches('.') == ext))
        .unwrap_or(false)
}

/// Get the .btvendor state directory for a given root
pub fn state_dir(root: &Path) -> PathBuf {
    root.join(".btvendor")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_make_relative() {
        let root = Path::new("/project");
        let path = Path::new("/project/src/btstack/hci.c");
        assert_eq!(
            make_relative(path, root),
            Some("src/btstack/hci.c".to_string())
        );
        assert_eq!(make_relative(Path::new("/other/file.c"), root), None);
    }

    #[test]
    fn test_join_normalized() {
        let base = Path::new("/project");
        assert_eq!(
            join_normalized(base, "src/./btstack/"),
            PathBuf::from("/project/src/btstack")
        );
        assert_eq!(join_normalized(base, "."), PathBuf::from("/project"));
    }

    #[rstest]
    #[case("classic/a2dp.h", Some("classic/a2dp.h"))]
    #[case("./classic/../hci.h", Some("hci.h"))]
    #[case("a/b/../../c.h", Some("c.h"))]
    #[case("../hci.h", None)]
    #[case("", Some(""))]
    fn test_collapse_relative(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(collapse_relative(input), expected.map(str::to_string));
    }

    #[test]
    fn test_join_relative() {
        assert_eq!(join_relative("", "hci.h"), "hci.h");
        assert_eq!(join_relative(".", "hci.h"), "hci.h");
        assert_eq!(join_relative("classic/", "a2dp.h"), "classic/a2dp.h");
    }

    #[test]
    fn test_parent_and_file_name() {
        assert_eq!(parent_relative("classic/a2dp.h"), "classic");
        assert_eq!(parent_relative("hci.h"), "");
        assert_eq!(file_name("classic/a2dp.h"), "a2dp.h");
        assert_eq!(file_name("hci.h"), "hci.h");
    }

    #[rstest]
    #[case("btstack/classic/a2dp.h", "a2dp.h", true)]
    #[case("btstack/classic/a2dp.h", "classic/a2dp.h", true)]
    #[case("a2dp.h", "a2dp.h", true)]
    #[case("btstack/foo_bar.h", "bar.h", false)]
    #[case("bar.h", "foo_bar.h", false)]
    #[case("btstack/classic/a2dp.h", "le/a2dp.h", false)]
    fn test_ends_with_components(#[case] path: &str, #[case] suffix: &str, #[case] expected: bool) {
        assert_eq!(ends_with_components(path, suffix), expected);
    }

    #[test]
    fn test_has_allowed_extension() {
        let allowed = vec!["h".to_string(), ".c".to_string(), "inc".to_string()];
        assert!(has_allowed_extension(Path::new("a/hci.h"), &allowed));
        assert!(has_allowed_extension(Path::new("hci.c"), &allowed));
        assert!(has_allowed_extension(Path::new("tables.inc"), &allowed));
        assert!(!has_allowed_extension(Path::new("README.md"), &allowed));
        assert!(!has_allowed_extension(Path::new("Makefile"), &allowed));
        assert!(!has_allowed_extension(Path::new("HCI.H"), &allowed));
    }

    #[test]
    fn test_state_dir() {
        let root = Path::new("/project");
        assert_eq!(state_dir(root), PathBuf::from("/project/.btvendor"));
    }
}
