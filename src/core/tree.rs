//! Source tree listing
//!
//! Uses walkdir with entries sorted by file name so every pass over a tree
//! visits files in the same order.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::paths::make_relative;

/// A directory of source files owned by the current run
#[derive(Debug, Clone)]
pub struct SourceTree {
    root: PathBuf,
}

/// A file inside a `SourceTree`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeFile {
    pub path: PathBuf,
    /// Path relative to the tree root, '/'-separated
    pub relative: String,
}

impl SourceTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    /// All regular files, depth-first, sorted by file name at every level
    pub fn files(&self) -> Result<Vec<TreeFile>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry =
                entry.with_context(|| format!("Failed to walk {}", self.root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(relative) = make_relative(entry.path(), &self.root) else {
                continue;
            };
            files.push(TreeFile {
                path: entry.into_path(),
                relative,
            });
        }

        Ok(files)
    }
}
