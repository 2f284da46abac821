//! btvendor - vendors BTstack into an Arduino-style library tree
//!
//! btvendor provides:
//! - Clone-or-pull of the upstream repository
//! - Curated copy of the buildable subset with an explicit path map
//! - Extension filtering and removal of unbuildable directories
//! - Include rewriting relative to the library include base
//! - Unified output format (jsonl/json/md/raw)

use anyhow::Result;
use clap::Parser;

mod cli;
mod core;
mod flows;
mod includes;
mod manifest;
mod vendor;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    crate::core::logging::setup_tracing(cli.effective_log_level(), !cli.no_color);
    cli::run(cli)
}
