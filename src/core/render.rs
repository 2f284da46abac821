//! Renderer module
//!
//! Renders ResultSet to different output formats: jsonl, json, md, raw

use crate::core::model::{Kind, ResultItem, ResultSet};
use std::io::Write;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Jsonl,
    Json,
    Markdown,
    Raw,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" => Ok(OutputFormat::Jsonl),
            "json" => Ok(OutputFormat::Json),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "raw" => Ok(OutputFormat::Raw),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl RenderConfig {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            pretty: false,
        }
    }

    /// Create a new render config with pretty option
    pub fn with_pretty(format: OutputFormat, pretty: bool) -> Self {
        Self { format, pretty }
    }
}

/// Renderer for result sets
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    #[allow(dead_code)]
    pub fn new(format: OutputFormat) -> Self {
        Self {
            config: RenderConfig::new(format),
        }
    }

    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render a result set to a string
    pub fn render(&self, result_set: &ResultSet) -> String {
        match self.config.format {
            OutputFormat::Jsonl => self.render_jsonl(result_set),
            OutputFormat::Json => self.render_json(result_set),
            OutputFormat::Markdown => self.render_markdown(result_set),
            OutputFormat::Raw => self.render_raw(result_set),
        }
    }

    /// Render to a writer, followed by a trailing newline
    pub fn render_to<W: Write>(
        &self,
        result_set: &ResultSet,
        mut writer: W,
    ) -> std::io::Result<()> {
        let output = self.render(result_set);
        if output.is_empty() {
            return Ok(());
        }
        writeln!(writer, "{}", output)
    }

    fn render_jsonl(&self, result_set: &ResultSet) -> String {
        result_set
            .items
            .iter()
            .filter_map(|item| {
                if self.config.pretty {
                    serde_json::to_string_pretty(item).ok()
                } else {
                    serde_json::to_string(item).ok()
                }
            })
            .collect::<Vec<_>>()
            .join(if self.config.pretty { "\n\n" } else { "\n" })
    }

    fn render_json(&self, result_set: &ResultSet) -> String {
        if self.config.pretty {
            serde_json::to_string_pretty(&result_set.items).unwrap_or_else(|_| "[]".to_string())
        } else {
            serde_json::to_string(&result_set.items).unwrap_or_else(|_| "[]".to_string())
        }
    }

    fn render_markdown(&self, result_set: &ResultSet) -> String {
        let sections: [(&str, &[Kind]); 6] = [
            ("Fetch", &[Kind::Fetch]),
            ("Copied", &[Kind::Copy]),
            ("Removed", &[Kind::Remove]),
            ("Includes", &[Kind::Rewrite, Kind::Include]),
            ("Guards", &[Kind::Guard]),
            ("Checks", &[Kind::Check]),
        ];

        let mut output = String::new();

        let errors: Vec<&ResultItem> = result_set.items.iter().filter(|i| i.is_error()).collect();
        if !errors.is_empty() {
            output.push_str("## Errors\n\n");
            for item in errors {
                for error in &item.errors {
                    output.push_str(&format!("- **{}**: {}", error.code, error.message));
                    if let Some(path) = &item.path {
                        output.push_str(&format!(" (`{}`", path));
                        if let Some(line) = item.line {
                            output.push_str(&format!(":{}", line));
                        }
                        output.push(')');
                    }
                    output.push('\n');
                }
            }
            output.push('\n');
        }

        for (title, kinds) in sections {
            let items: Vec<&ResultItem> = result_set
                .items
                .iter()
                .filter(|i| kinds.contains(&i.kind) && i.errors.is_empty())
                .collect();
            if items.is_empty() {
                continue;
            }

            output.push_str(&format!("## {}\n\n", title));
            for item in items {
                render_item_md(&mut output, item);
            }
            output.push('\n');
        }

        output
    }

    /// Render as raw output (excerpts only)
    fn render_raw(&self, result_set: &ResultSet) -> String {
        result_set
            .items
            .iter()
            .filter_map(|item| item.excerpt.clone())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn render_item_md(output: &mut String, item: &ResultItem) {
    output.push_str("- ");
    if let Some(path) = &item.path {
        output.push_str(&format!("`{}`", path));
        if let Some(line) = item.line {
            output.push_str(&format!(":{}", line));
        }
        if item.excerpt.is_some() {
            output.push_str(" ");
        }
    }
    if let Some(excerpt) = &item.excerpt {
        output.push_str(excerpt);
    }
    if let Some(files) = item.meta.files {
        output.push_str(&format!(" ({} files)", files));
    }
    output.push('\n');
}
