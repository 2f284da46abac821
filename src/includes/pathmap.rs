//! Explicit original -> new path mapping
//!
//! Built once from the copy operations: every vendored file remembers the
//! upstream path it came from and the path it was copied under relative to
//! its copy rule. The resolver consults this before any name-based matching.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use crate::core::paths::{ends_with_components, file_name, join_normalized};
use crate::core::tree::SourceTree;

/// Where a vendored file came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    /// Path relative to the upstream checkout
    pub original: String,
    /// Path relative to the copy rule's source directory; this is the name
    /// upstream code uses to include the file
    pub key: String,
}

/// Secondary lookup: some name -> new paths carrying it
type Index = HashMap<String, BTreeSet<String>>;

fn index_insert(index: &mut Index, name: &str, new: &str) {
    index
        .entry(name.to_string())
        .or_default()
        .insert(new.to_string());
}

fn index_remove(index: &mut Index, name: &str, new: &str) {
    if let Some(set) = index.get_mut(name) {
        set.remove(new);
        if set.is_empty() {
            index.remove(name);
        }
    }
}

/// Serialized form: only the entries, indexes are rebuilt on load
#[derive(Serialize, Deserialize)]
struct StoredMap {
    entries: BTreeMap<String, Origin>,
}

/// Mapping keyed by new path (relative to the target tree)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredMap", into = "StoredMap")]
pub struct PathMap {
    entries: BTreeMap<String, Origin>,
    by_original: Index,
    by_key: Index,
    by_name: Index,
}

impl From<StoredMap> for PathMap {
    fn from(stored: StoredMap) -> Self {
        let mut map = PathMap::new();
        for (new, origin) in &stored.entries {
            map.index(new, origin);
        }
        map.entries = stored.entries;
        map
    }
}

impl From<PathMap> for StoredMap {
    fn from(map: PathMap) -> Self {
        StoredMap {
            entries: map.entries,
        }
    }
}

impl PathMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn index(&mut self, new: &str, origin: &Origin) {
        index_insert(&mut self.by_original, &origin.original, new);
        index_insert(&mut self.by_key, &origin.key, new);
        index_insert(&mut self.by_name, file_name(new), new);
    }

    fn unindex(&mut self, new: &str, origin: &Origin) {
        index_remove(&mut self.by_original, &origin.original, new);
        index_remove(&mut self.by_key, &origin.key, new);
        index_remove(&mut self.by_name, file_name(new), new);
    }

    /// Record one copied file. Returns the origin it replaced when an earlier
    /// copy produced the same new path.
    pub fn record(
        &mut self,
        original: impl Into<String>,
        key: impl Into<String>,
        new: impl Into<String>,
    ) -> Option<Origin> {
        let new = new.into();
        let origin = Origin {
            original: original.into(),
            key: key.into(),
        };
        let previous = self.entries.insert(new.clone(), origin.clone());
        if let Some(previous) = &previous {
            self.unindex(&new, previous);
        }
        self.index(&new, &origin);
        previous.filter(|previous| *previous != origin)
    }

    /// Add files present under the tree but missing from the map, each as its
    /// own origin. Returns how many were added.
    pub fn fill_from_tree(&mut self, tree: &SourceTree) -> anyhow::Result<usize> {
        let mut added = 0;
        for file in tree.files()? {
            if self.entries.contains_key(&file.relative) {
                continue;
            }
            let origin = Origin {
                original: file.relative.clone(),
                key: file.relative.clone(),
            };
            self.index(&file.relative, &origin);
            self.entries.insert(file.relative, origin);
            added += 1;
        }
        Ok(added)
    }

    /// Drop entries whose file no longer exists under `target`
    pub fn prune(&mut self, target: &Path) -> usize {
        let gone: Vec<(String, Origin)> = self
            .entries
            .iter()
            .filter(|(new, _)| !join_normalized(target, new).is_file())
            .map(|(new, origin)| (new.clone(), origin.clone()))
            .collect();

        for (new, origin) in &gone {
            self.entries.remove(new);
            self.unindex(new, origin);
        }
        gone.len()
    }

    pub fn origin(&self, new: &str) -> Option<&Origin> {
        self.entries.get(new)
    }

    /// New path of the file copied from `original`. When one upstream file
    /// was copied twice the first new path wins.
    pub fn lookup(&self, original: &str) -> Option<&str> {
        self.by_original
            .get(original)
            .and_then(|set| set.iter().next())
            .map(String::as_str)
    }

    /// New paths of files copied under copy-rule key `key`
    pub fn candidates_by_key(&self, key: &str) -> Vec<&str> {
        self.by_key
            .get(key)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn contains_new(&self, new: &str) -> bool {
        self.entries.contains_key(new)
    }

    /// New paths ending with `suffix` on a component boundary, in new-path order
    pub fn candidates_by_suffix(&self, suffix: &str) -> Vec<&str> {
        let Some(named) = self.by_name.get(file_name(suffix)) else {
            return Vec::new();
        };
        named
            .iter()
            .filter(|new| ends_with_components(new, suffix))
            .map(String::as_str)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
