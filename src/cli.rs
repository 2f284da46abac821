//! CLI module - Command-line interface definitions and handlers

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use crate::core::config::{AmbiguityPolicy, VendorConfig};
use crate::core::error::VendorError;
use crate::core::logging::LogLevel;
use crate::core::model::{ResultItem, ResultSet, Stage};
use crate::core::render::{OutputFormat, RenderConfig, Renderer};
use crate::core::util::plural;

/// btvendor - vendor the BTstack Bluetooth stack into an Arduino-style library.
#[derive(Parser, Debug)]
#[command(name = "btvendor")]
#[command(
    author,
    version,
    about,
    long_about = r#"btvendor fetches BTstack, copies the buildable subset into the library's
source tree, drops everything that is not a C source file and rewrites
#include directives so they resolve from the library's include base.

Running btvendor without a subcommand performs the full setup pipeline.

Each command prints a ResultSet in the selected format (default: jsonl).

Output formats:
- jsonl: one JSON object per line (best for piping into tools)
- json: a single JSON array
- md: human-friendly Markdown
- raw: excerpts only (unstable; intended for debugging)

Examples:
    btvendor
    btvendor setup --offline --format md
    btvendor rewrite --ambiguity error
    btvendor verify
    btvendor --config vendor.json config
"#
)]
pub struct Cli {
    /// Project root directory.
    #[arg(
        long,
        global = true,
        default_value = ".",
        value_name = "ROOT",
        long_help = "Project root directory (defaults to the current directory).\n\n\
Every path in the configuration (checkout, target, include base) is relative to\n\
this root, and all paths emitted in results are relative to it."
    )]
    pub root: PathBuf,

    /// JSON file overriding the built-in configuration.
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        long_help = "JSON file overriding any subset of the built-in configuration.\n\n\
Unknown fields are rejected. Use `btvendor config` to print the effective\n\
configuration as a starting point."
    )]
    pub config: Option<PathBuf>,

    /// Output format (jsonl/json/md/raw).
    #[arg(
        long,
        global = true,
        default_value = "jsonl",
        value_name = "FORMAT",
        long_help = "Select the output format for ResultSet.\n\n\
Supported values:\n\
- jsonl (default)\n\
- json\n\
- md (markdown)\n\
- raw"
    )]
    pub format: OutputFormat,

    /// Pretty-print JSON/JSONL output with indentation.
    #[arg(
        long,
        global = true,
        long_help = "Pretty-print JSON and JSONL output with indentation for human readability.\n\n\
Has no effect on md/raw formats."
    )]
    pub pretty: bool,

    /// Log level for diagnostics on stderr.
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = LogLevel::Warn,
        value_name = "LEVEL",
        long_help = "Log level for diagnostics written to stderr.\n\n\
info shows per-file progress, debug shows every include decision.\n\
silent disables logging entirely."
    )]
    pub log_level: LogLevel,

    /// Disable colored output (when applicable).
    #[arg(
        long,
        global = true,
        long_help = "Disable colored output. This is useful when piping to files or when your\n\
terminal does not support ANSI colors."
    )]
    pub no_color: bool,

    /// Quiet mode (errors only).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Only log errors and skip the summary line. Results are still printed\n\
to stdout."
    )]
    pub quiet: bool,

    /// Verbose mode (debug logging).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Log at debug level regardless of --log-level."
    )]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Log level after applying -v/-q
    pub fn effective_log_level(&self) -> LogLevel {
        self.log_level.adjusted(self.verbose, self.quiet)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline: fetch, copy, clean up, rewrite, guard.
    #[command(
        long_about = "Run the full vendoring pipeline:\n\n\
  fetch -> copy -> filter extensions -> remove dirs -> rewrite includes -> guards\n\n\
A fetch failure stops the run before the target tree is touched. The path map\n\
of the run is stored in .btvendor/manifest.json under ROOT.\n\n\
Examples:\n\
  btvendor setup\n\
  btvendor setup --offline --clean\n"
    )]
    Setup {
        /// Use the existing checkout instead of fetching.
        #[arg(
            long,
            long_help = "Skip git entirely and use the existing upstream checkout.\n\n\
Fails when the checkout directory does not exist."
        )]
        offline: bool,

        /// Remove the target directory before copying.
        #[arg(long)]
        clean: bool,

        /// How to settle includes matching several files.
        #[arg(long, value_enum, value_name = "POLICY")]
        ambiguity: Option<AmbiguityPolicy>,
    },

    /// Clone or pull the upstream repository only.
    #[command(
        long_about = "Clone the upstream repository into the checkout directory, or pull when\n\
it already exists. With git_ref configured, that ref is checked out afterwards.\n"
    )]
    Fetch,

    /// Rewrite includes in an existing tree.
    #[command(
        long_about = "Rewrite #include directives in an already vendored tree.\n\n\
The configured target uses the path map from .btvendor/manifest.json when present;\n\
other directories are resolved by walking them. Rewriting twice changes nothing.\n\n\
Examples:\n\
  btvendor rewrite\n\
  btvendor rewrite src/btstack --ambiguity error\n"
    )]
    Rewrite {
        /// Directory to rewrite (defaults to the configured target).
        #[arg(value_name = "DIR")]
        dir: Option<PathBuf>,

        /// How to settle includes matching several files.
        #[arg(
            long,
            value_enum,
            value_name = "POLICY",
            long_help = "How to settle an include that matches several files by name.\n\n\
- first: use the first match in sorted walk order and warn\n\
- error: leave the directive unchanged and fail after processing every file"
        )]
        ambiguity: Option<AmbiguityPolicy>,
    },

    /// Check the vendored tree; exits non-zero on issues.
    #[command(
        long_about = "Check the vendored tree:\n\n\
- every quoted include resolves to a file (or is a configured external header)\n\
- only allowed file extensions remain\n\
- removed directories are gone\n\n\
Every issue is reported as an error item and the exit status is non-zero.\n"
    )]
    Verify,

    /// Apply configured preprocessor guards.
    Guard,

    /// Print the effective configuration.
    Config,

    /// Check external tool dependencies.
    Doctor,
}

/// Print a result set to stdout
fn print_results(renderer: &Renderer, result_set: &ResultSet) -> Result<()> {
    renderer.render_to(result_set, std::io::stdout().lock())?;
    Ok(())
}

/// One-line summary on stderr
fn summary(quiet: bool, ok: bool, message: String) {
    if quiet {
        return;
    }
    if ok {
        eprintln!("{} {}", "✓".green(), message);
    } else {
        eprintln!("{} {}", "✗".red(), message.yellow());
    }
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let renderer = Renderer::with_config(RenderConfig::with_pretty(cli.format, cli.pretty));

    if cli.no_color {
        colored::control::set_override(false);
    }

    let mut config = VendorConfig::load(cli.config.as_deref())?;
    let quiet = cli.quiet;

    // Get absolute root path
    let root = cli.root.canonicalize().unwrap_or(cli.root);

    let command = cli.command.unwrap_or(Commands::Setup {
        offline: false,
        clean: false,
        ambiguity: None,
    });

    match command {
        Commands::Setup {
            offline,
            clean,
            ambiguity,
        } => {
            if let Some(policy) = ambiguity {
                config.ambiguity = policy;
            }
            let options = crate::flows::setup::SetupOptions { offline, clean };
            let report = crate::flows::setup::run_setup(&root, &config, options)?;
            print_results(&renderer, &report.results)?;

            let unresolved = report.rewrite.unresolved + report.rewrite.refused;
            summary(
                quiet,
                unresolved == 0,
                format!(
                    "setup: {} file{} copied, {} removed, {} include{} rewritten, {} left unchanged, {} guarded",
                    report.files_copied,
                    plural(report.files_copied),
                    report.files_removed,
                    report.rewrite.directives_changed,
                    plural(report.rewrite.directives_changed),
                    unresolved,
                    report.guards_applied
                ),
            );
            report.into_result().map(|_| ())
        }

        Commands::Fetch => {
            let fetched = crate::flows::fetch::fetch_upstream(&root, &config)?;
            print_results(&renderer, &fetched.results)?;
            summary(
                quiet,
                true,
                format!(
                    "fetch: {}",
                    fetched.commit.as_deref().unwrap_or("no commit reported")
                ),
            );
            Ok(())
        }

        Commands::Rewrite { dir, ambiguity } => {
            let policy = ambiguity.unwrap_or(config.ambiguity);
            let report =
                crate::flows::rewrite::run_rewrite(&root, &config, dir.as_deref(), policy)?;
            print_results(&renderer, &report.results)?;
            summary(
                quiet,
                report.unresolved == 0 && report.refused == 0,
                format!(
                    "rewrite: {} include{} rewritten in {} of {} files, {} left unchanged",
                    report.directives_changed,
                    plural(report.directives_changed),
                    report.files_changed,
                    report.files_scanned,
                    report.unresolved + report.refused
                ),
            );
            if report.refused > 0 {
                return Err(VendorError::AmbiguousIncludes(report.refused).into());
            }
            Ok(())
        }

        Commands::Verify => {
            let verification = crate::includes::verify::verify_tree(&root, &config)?;
            print_results(&renderer, &verification.to_result_set())?;
            let issues = verification.issues.len();
            summary(
                quiet,
                issues == 0,
                format!(
                    "verify: {} file{}, {} issue{}",
                    verification.files,
                    plural(verification.files),
                    issues,
                    plural(issues)
                ),
            );
            if issues > 0 {
                return Err(VendorError::VerificationFailed(issues).into());
            }
            Ok(())
        }

        Commands::Guard => {
            let target = config.target_path(&root);
            let display = crate::flows::rewrite::display_path(&target, &root);
            let results = crate::vendor::guard::apply_guards(&target, &config.guards, &display)?;
            print_results(&renderer, &results)?;
            summary(
                quiet,
                true,
                format!("guard: {} file{} guarded", results.len(), plural(results.len())),
            );
            Ok(())
        }

        Commands::Config => {
            let mut result_set = ResultSet::new();
            result_set.push(
                ResultItem::check("effective configuration", Stage::Config)
                    .with_data(serde_json::to_value(&config)?),
            );
            print_results(&renderer, &result_set)?;
            Ok(())
        }

        Commands::Doctor => {
            let (results, missing) = crate::vendor::doctor::doctor();
            print_results(&renderer, &results)?;
            if missing {
                eprintln!("\n⚠️  Some required dependencies are missing!");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["btvendor"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.effective_log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "btvendor",
            "rewrite",
            "src/btstack",
            "--ambiguity",
            "error",
            "-v",
            "--format",
            "md",
        ])
        .unwrap();
        assert_eq!(cli.effective_log_level(), LogLevel::Debug);
        assert_eq!(cli.format, OutputFormat::Markdown);
        match cli.command {
            Some(Commands::Rewrite { dir, ambiguity }) => {
                assert_eq!(dir, Some(PathBuf::from("src/btstack")));
                assert_eq!(ambiguity, Some(AmbiguityPolicy::Error));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_log_level_values() {
        let cli = Cli::try_parse_from(["btvendor", "--log-level", "silent", "verify"]).unwrap();
        assert_eq!(cli.effective_log_level(), LogLevel::Silent);
        assert!(Cli::try_parse_from(["btvendor", "--log-level", "loud"]).is_err());
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let cli = Cli::try_parse_from(["btvendor", "verify"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Jsonl);
        assert!(Cli::try_parse_from(["btvendor", "--format", "xml", "verify"]).is_err());
    }
}
