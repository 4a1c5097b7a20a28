//! Update report rows and their rendering
//!
//! # Modules
//!
//! - [`matcher`]: Joins running instances against resolved versions

pub mod matcher;

use serde::Serialize;
use tabled::{Table, Tabled};

pub use matcher::{MatchError, match_instances};

/// One output line: a running task and whether its image has a newer tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    #[tabled(rename = "Namespace")]
    pub namespace: String,

    #[tabled(rename = "Job")]
    pub job: String,

    #[tabled(rename = "Group")]
    pub group: String,

    #[tabled(rename = "Task")]
    pub task: String,

    #[tabled(rename = "Image")]
    pub image: String,

    #[tabled(rename = "Latest")]
    pub latest: String,

    #[tabled(rename = "Current")]
    pub current: String,

    #[tabled(rename = "UpdateAvailable")]
    pub update_available: bool,
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON format.
    Json,
}

/// Render rows in the given format. An empty table still prints its header.
pub fn render(rows: &[ReportRow], format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Table => Ok(Table::new(rows).to_string()),
        OutputFormat::Json => serde_json::to_string_pretty(rows),
    }
}
