//! Include target resolution
//!
//! Order of lookups for a requested name X inside file F:
//! 1. X already is a rewritten path (include prefix + new path)
//! 2. X relative to F's upstream directory, through the path map
//! 3. X as a copy-rule relative key, through the path map
//! 4. X as a new path relative to the target tree
//! 5. files whose new path ends with X on a component boundary
//!
//! Step 5 is a guess. Several candidates there make the directive ambiguous,
//! settled by `AmbiguityPolicy`. A directory part of X that matches nothing
//! is never dropped, so `<sys/types.h>` cannot land on a vendored `types.h`.

use serde::Serialize;
use std::cmp::Ordering;

use crate::core::config::AmbiguityPolicy;
use crate::core::model::Confidence;
use crate::core::paths::{collapse_relative, join_relative, parent_relative};
use crate::includes::pathmap::PathMap;

/// How a resolved directive was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Via {
    /// Already names the file by its new location
    Current,
    /// Found through the explicit path map
    Mapped,
    /// Matched by path suffix
    Unique,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved {
        /// New path relative to the target tree
        path: String,
        via: Via,
    },
    Ambiguous {
        /// Candidates in walk order
        candidates: Vec<String>,
        /// The candidate used, if the policy picks one
        chosen: Option<String>,
    },
    Unresolved,
}

impl Resolution {
    /// The new path the directive should point to, if any
    pub fn target(&self) -> Option<&str> {
        match self {
            Resolution::Resolved { path, .. } => Some(path),
            Resolution::Ambiguous { chosen, .. } => chosen.as_deref(),
            Resolution::Unresolved => None,
        }
    }

    pub fn confidence(&self) -> Confidence {
        match self {
            Resolution::Resolved {
                via: Via::Current | Via::Mapped,
                ..
            } => Confidence::High,
            Resolution::Resolved {
                via: Via::Unique, ..
            } => Confidence::Medium,
            Resolution::Ambiguous { .. } | Resolution::Unresolved => Confidence::Low,
        }
    }
}

/// Order of a depth-first walk with entries sorted by file name
pub fn walk_order(a: &str, b: &str) -> Ordering {
    a.split('/').cmp(b.split('/'))
}

/// Drop leading `./` and `../` segments so a relative include can still be
/// matched by suffix
fn suffix_form(target: &str) -> &str {
    let mut rest = target;
    loop {
        if let Some(stripped) = rest.strip_prefix("./") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix("../") {
            rest = stripped;
        } else {
            return rest;
        }
    }
}

/// Resolves include names against a vendored tree
#[derive(Debug, Clone)]
pub struct Resolver<'a> {
    map: &'a PathMap,
    /// Target directory relative to the include base ("" when not below it)
    prefix: String,
    policy: AmbiguityPolicy,
}

impl<'a> Resolver<'a> {
    pub fn new(map: &'a PathMap, prefix: impl Into<String>, policy: AmbiguityPolicy) -> Self {
        Self {
            map,
            prefix: prefix.into().trim_matches('/').to_string(),
            policy,
        }
    }

    /// The include text for a new path, e.g. `btstack/classic/a2dp.h`
    pub fn include_path(&self, new: &str) -> String {
        join_relative(&self.prefix, new)
    }

    /// Resolve `target` as requested from the file at new path `from`
    pub fn resolve(&self, from: &str, target: &str) -> Resolution {
        let target = target.trim();

        // 1. already rewritten
        let unprefixed = if self.prefix.is_empty() {
            Some(target)
        } else {
            target
                .strip_prefix(self.prefix.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
        };
        if let Some(rest) = unprefixed {
            if self.map.contains_new(rest) {
                return self.resolved(rest, Via::Current);
            }
        }

        // 2. relative to the including file's upstream directory
        if let Some(origin) = self.map.origin(from) {
            let joined = join_relative(parent_relative(&origin.original), target);
            if let Some(new) = collapse_relative(&joined).and_then(|c| self.map.lookup(&c)) {
                return self.resolved(new, Via::Mapped);
            }
        }

        // 3. copy-rule relative key
        if let Some(key) = collapse_relative(target) {
            let by_key = self.map.candidates_by_key(&key);
            if !by_key.is_empty() {
                return self.pick(by_key, Via::Mapped);
            }

            // 4. new path relative to the target tree
            if self.map.contains_new(&key) {
                return self.resolved(&key, Via::Current);
            }
        }

        // 5. component suffix match
        let by_suffix = self.map.candidates_by_suffix(suffix_form(target));
        if by_suffix.is_empty() {
            return Resolution::Unresolved;
        }
        self.pick(by_suffix, Via::Unique)
    }

    fn resolved(&self, path: &str, via: Via) -> Resolution {
        Resolution::Resolved {
            path: path.to_string(),
            via,
        }
    }

    fn pick(&self, mut candidates: Vec<&str>, via: Via) -> Resolution {
        if candidates.len() == 1 {
            return self.resolved(candidates[0], via);
        }

        candidates.sort_by(|a, b| walk_order(a, b));
        let candidates: Vec<String> = candidates.into_iter().map(str::to_string).collect();
        let chosen = match self.policy {
            AmbiguityPolicy::First => candidates.first().cloned(),
            AmbiguityPolicy::Error => None,
        };
        Resolution::Ambiguous { candidates, chosen }
    }
}
