//! Include rewriting
//!
//! Rewrites the delimited target of every resolvable include directive to the
//! file's new location relative to the include base. Everything else on the
//! line (indentation, spacing, trailing comments) is kept byte for byte, and
//! files are only written back when something changed. Content is handled as
//! bytes: several vendored codecs carry Latin-1 comments.

use anyhow::{Context, Result};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::core::model::{Kind, ResultItem, ResultSet, Stage, VendorIssue};
use crate::core::paths::join_relative;
use crate::core::tree::SourceTree;
use crate::includes::parse::{parse_line, Delimiter, IncludeDirective};
use crate::includes::resolve::{Resolution, Resolver};

/// Result of rewriting one file's content
#[derive(Debug, Clone)]
pub struct FileRewrite {
    pub content: Vec<u8>,
    /// Number of directives whose text changed
    pub changed: usize,
    /// Directives left unchanged because the policy refused to guess
    pub refused: usize,
    pub items: Vec<ResultItem>,
}

/// Summary of a rewrite pass over a tree
#[derive(Debug, Clone, Default)]
pub struct RewriteReport {
    pub results: ResultSet,
    pub files_scanned: usize,
    pub files_changed: usize,
    pub directives_changed: usize,
    pub unresolved: usize,
    pub refused: usize,
}

/// Context shared by every file of a pass
pub struct Rewriter<'a> {
    resolver: &'a Resolver<'a>,
    external_headers: &'a [String],
    /// Target tree relative to the project root, used for reported paths
    display_base: String,
}

impl<'a> Rewriter<'a> {
    pub fn new(
        resolver: &'a Resolver<'a>,
        external_headers: &'a [String],
        display_base: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            external_headers,
            display_base: display_base.into(),
        }
    }

    fn is_external(&self, target: &str) -> bool {
        self.external_headers.iter().any(|h| h == target)
    }

    /// Rewrite the content of the file at new path `relative`
    pub fn rewrite_content(&self, relative: &str, content: &[u8]) -> FileRewrite {
        let shown = join_relative(&self.display_base, relative);
        let mut output = Vec::with_capacity(content.len() + 64);
        let mut items = Vec::new();
        let mut changed = 0;
        let mut refused = 0;

        for (idx, segment) in content.split_inclusive(|&b| b == b'\n').enumerate() {
            let body_len = segment
                .iter()
                .rposition(|&b| b != b'\n' && b != b'\r')
                .map_or(0, |pos| pos + 1);
            let (body, terminator) = segment.split_at(body_len);

            let Some(directive) = parse_line(body, idx as u32 + 1) else {
                output.extend_from_slice(segment);
                continue;
            };

            let resolution = self.resolver.resolve(relative, &directive.target);
            match resolution.target() {
                Some(new) => {
                    let replacement = Delimiter::Quote.wrap(&self.resolver.include_path(new));
                    let written = &body[directive.span.clone()];

                    if written != replacement.as_bytes() {
                        debug!("   {} -> {}", directive.target, replacement);
                        changed += 1;
                        items.push(self.rewrite_item(
                            &shown,
                            &directive,
                            &replacement,
                            &resolution,
                        ));
                    }

                    output.extend_from_slice(&body[..directive.span.start]);
                    output.extend_from_slice(replacement.as_bytes());
                    output.extend_from_slice(&body[directive.span.end..]);
                    output.extend_from_slice(terminator);
                }
                None => {
                    if let Some(item) = self.unresolved_item(&shown, &directive, &resolution) {
                        if item.kind == Kind::Error {
                            refused += 1;
                        }
                        items.push(item);
                    }
                    output.extend_from_slice(segment);
                }
            }
        }

        FileRewrite {
            content: output,
            changed,
            refused,
            items,
        }
    }

    fn rewrite_item(
        &self,
        shown: &str,
        directive: &IncludeDirective,
        replacement: &str,
        resolution: &Resolution,
    ) -> ResultItem {
        let mut item = ResultItem::rewrite(
            shown,
            directive.line,
            format!("{} -> {}", directive.written(), replacement),
        )
        .with_confidence(resolution.confidence());

        match resolution {
            Resolution::Resolved { via, .. } => {
                item = item.with_data(json!({ "via": via }));
            }
            Resolution::Ambiguous { candidates, .. } => {
                warn!(
                    "{}:{} include {} is ambiguous, using {} (candidates: {})",
                    shown,
                    directive.line,
                    directive.target,
                    replacement,
                    candidates.join(", ")
                );
                item = item.with_data(json!({ "via": "ambiguous", "candidates": candidates }));
            }
            Resolution::Unresolved => {}
        }

        item
    }

    fn unresolved_item(
        &self,
        shown: &str,
        directive: &IncludeDirective,
        resolution: &Resolution,
    ) -> Option<ResultItem> {
        if let Resolution::Ambiguous { candidates, .. } = resolution {
            warn!(
                "{}:{} include {} is ambiguous, left unchanged (candidates: {})",
                shown,
                directive.line,
                directive.target,
                candidates.join(", ")
            );
            let issue = VendorIssue::new(
                "AMBIGUOUS_INCLUDE",
                format!(
                    "{} matches {} files: {}",
                    directive.target,
                    candidates.len(),
                    candidates.join(", ")
                ),
            );
            return Some(
                ResultItem::error(issue, Stage::Rewrite)
                    .with_path(shown)
                    .with_line(directive.line)
                    .with_data(json!({ "candidates": candidates })),
            );
        }

        if directive.delimiter == Delimiter::Angle || self.is_external(&directive.target) {
            debug!("   {} left as is", directive.written());
            return None;
        }

        warn!(
            "{}:{} file {} not found",
            shown, directive.line, directive.target
        );
        Some(
            ResultItem::include(
                shown,
                directive.line,
                format!("{} not found, left unchanged", directive.written()),
            )
            .with_confidence(resolution.confidence()),
        )
    }

    /// Rewrite every file under the tree in walk order
    pub fn rewrite_tree(&self, tree: &SourceTree) -> Result<RewriteReport> {
        let mut report = RewriteReport::default();

        for file in tree.files()? {
            info!("processing {}", file.relative);
            report.files_scanned += 1;

            let content = std::fs::read(&file.path)
                .with_context(|| format!("Failed to read {}", file.path.display()))?;

            let rewritten = self.rewrite_content(&file.relative, &content);
            report.refused += rewritten.refused;
            report.unresolved += rewritten
                .items
                .iter()
                .filter(|i| i.kind == Kind::Include)
                .count();

            if rewritten.changed > 0 {
                std::fs::write(&file.path, &rewritten.content)
                    .with_context(|| format!("Failed to write {}", file.path.display()))?;
                report.files_changed += 1;
                report.directives_changed += rewritten.changed;
            }

            report.results.extend(rewritten.items);
        }

        report.results.sort();
        Ok(report)
    }
}
