//! Unified Result Model
//!
//! Every pipeline stage reports what it did as `ResultItem`s collected into a
//! `ResultSet` before rendering output.

use serde::{Deserialize, Serialize};

/// The kind of result item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Fetch,
    Copy,
    Remove,
    Rewrite,
    Include,
    Guard,
    Check,
    Error,
}

/// Confidence level of a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Pipeline stage that produced the result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Fetch,
    Copy,
    Cleanup,
    Rewrite,
    Guard,
    Verify,
    Manifest,
    Config,
    Doctor,
}

/// Metadata for a result item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// Number of files the item covers (copy/remove of a directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<usize>,

    /// Upstream commit id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

/// Error information for a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorIssue {
    pub code: String,
    pub message: String,
}

impl VendorIssue {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// The unified result item that all commands produce
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultItem {
    /// The kind of this result
    pub kind: Kind,

    /// Path relative to the project root, using '/' as separator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// 1-indexed line within the file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    /// Human readable detail, e.g. `hci.h -> btstack/hci.h`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,

    /// Structured payload (resolution details, config dumps)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// Confidence level
    pub confidence: Confidence,

    /// Stage that produced this item
    pub stage: Stage,

    /// Metadata
    pub meta: Meta,

    /// Errors (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<VendorIssue>,
}

impl ResultItem {
    fn base(kind: Kind, stage: Stage) -> Self {
        Self {
            kind,
            path: None,
            line: None,
            excerpt: None,
            data: None,
            confidence: Confidence::High,
            stage,
            meta: Meta::default(),
            errors: Vec::new(),
        }
    }

    /// Create a fetch result
    pub fn fetch(path: impl Into<String>, excerpt: impl Into<String>) -> Self {
        let mut item = Self::base(Kind::Fetch, Stage::Fetch);
        item.path = Some(path.into());
        item.excerpt = Some(excerpt.into());
        item
    }

    /// Create a copy result
    pub fn copy(path: impl Into<String>, excerpt: impl Into<String>, files: usize) -> Self {
        let mut item = Self::base(Kind::Copy, Stage::Copy);
        item.path = Some(path.into());
        item.excerpt = Some(excerpt.into());
        item.meta.files = Some(files);
        item
    }

    /// Create a removal result
    pub fn remove(path: impl Into<String>) -> Self {
        let mut item = Self::base(Kind::Remove, Stage::Cleanup);
        item.path = Some(path.into());
        item
    }

    /// Create a rewritten-directive result
    pub fn rewrite(path: impl Into<String>, line: u32, excerpt: impl Into<String>) -> Self {
        let mut item = Self::base(Kind::Rewrite, Stage::Rewrite);
        item.path = Some(path.into());
        item.line = Some(line);
        item.excerpt = Some(excerpt.into());
        item
    }

    /// Create a result for a directive that was looked at but left alone
    pub fn include(path: impl Into<String>, line: u32, excerpt: impl Into<String>) -> Self {
        let mut item = Self::base(Kind::Include, Stage::Rewrite);
        item.path = Some(path.into());
        item.line = Some(line);
        item.excerpt = Some(excerpt.into());
        item
    }

    /// Create a guard result
    pub fn guard(path: impl Into<String>, excerpt: impl Into<String>) -> Self {
        let mut item = Self::base(Kind::Guard, Stage::Guard);
        item.path = Some(path.into());
        item.excerpt = Some(excerpt.into());
        item
    }

    /// Create a passing check result
    pub fn check(excerpt: impl Into<String>, stage: Stage) -> Self {
        let mut item = Self::base(Kind::Check, stage);
        item.excerpt = Some(excerpt.into());
        item
    }

    /// Create a new error result
    pub fn error(error: VendorIssue, stage: Stage) -> Self {
        let mut item = Self::base(Kind::Error, stage);
        item.excerpt = Some(error.message.clone());
        item.errors.push(error);
        item
    }

    /// Set path
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set line
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Set metadata
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    /// Set confidence level
    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }

    /// Set structured data payload
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Add an error
    #[allow(dead_code)]
    pub fn with_error(mut self, error: VendorIssue) -> Self {
        self.errors.push(error);
        self
    }

    pub fn is_error(&self) -> bool {
        self.kind == Kind::Error || !self.errors.is_empty()
    }
}

/// Result set containing multiple result items
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultSet {
    pub items: Vec<ResultItem>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, item: ResultItem) {
        self.items.push(item);
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = ResultItem>) {
        self.items.extend(items);
    }

    pub fn append(&mut self, other: ResultSet) {
        self.items.extend(other.items);
    }

    /// Sort items by path and line for stable output. Items without a path
    /// keep their relative order and go last.
    pub fn sort(&mut self) {
        self.items.sort_by(|a, b| match (&a.path, &b.path) {
            (Some(pa), Some(pb)) => pa.cmp(pb).then_with(|| a.line.cmp(&b.line)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items carrying errors
    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_error()).count()
    }

    /// Number of items of the given kind
    pub fn count(&self, kind: Kind) -> usize {
        self.items.iter().filter(|i| i.kind == kind).count()
    }
}
