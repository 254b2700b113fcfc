use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::indexing_commands::IndexStatus;
use crate::config::AppConfig;
use crate::models::pipeline::{Notice, PipelineResult};
use crate::services::indexing_service::IndexReport;

/// Speak a query, find the files whose names match it.
#[derive(Debug, Parser)]
#[command(name = "echofind", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub config: AppConfig,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Index every file under the configured root
    Index,
    /// Search file names by keyword
    Search {
        keyword: String,
        /// Maximum number of paths to print
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Transcribe an audio file and show the five best matching files
    Listen { audio: PathBuf },
    /// Show the state of the configured index
    Status,
}

pub fn format_report(report: &IndexReport) -> String {
    format!(
        "Indexed {} files from {} into '{}' ({} skipped)",
        report.indexed,
        report.root.display(),
        report.index_name,
        report.skipped
    )
}

pub fn format_paths(keyword: &str, paths: &[String]) -> String {
    if paths.is_empty() {
        return format!("No files match \"{keyword}\"");
    }
    paths
        .iter()
        .enumerate()
        .map(|(i, path)| format!("{:>3}. {path}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_slots(result: &PipelineResult) -> String {
    result
        .slots
        .iter()
        .enumerate()
        .map(|(i, slot)| format!("match {}: {}", i + 1, slot.as_deref().unwrap_or("")))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_status(status: &IndexStatus) -> String {
    if !status.exists {
        return format!("Index '{}' does not exist yet", status.index_name);
    }
    format!("Index '{}': {} documents", status.index_name, status.documents)
}

pub fn format_notice(notice: &Notice) -> String {
    format!("[{}] {}", notice.level, notice.message)
}
