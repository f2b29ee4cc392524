//! Output formatting for check results

mod json;
mod terminal;

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use crate::compare::{
    has_value_differences, ColumnSum, DifferenceResult, GeometryHealth, NameComparison,
    SumDifference,
};
use crate::config::OutputFormat;

pub use json::JsonOutput;
pub use terminal::TerminalOutput;

/// Result of one check, ready to render
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "check", content = "result", rename_all = "snake_case")]
pub enum Report {
    ColumnNames(NameComparison),
    ColumnSums(Vec<ColumnSum>),
    ColumnValues(DifferenceResult),
    SumDifferences(Vec<SumDifference>),
    Geometry(GeometryHealth),
}

impl Report {
    /// Whether the check turned up something worth a non-zero exit
    pub fn has_findings(&self) -> bool {
        match self {
            Report::ColumnNames(names) => !names.is_conforming(),
            Report::ColumnSums(_) => false,
            Report::ColumnValues(diffs) => has_value_differences(diffs),
            Report::SumDifferences(diffs) => diffs.iter().any(|d| !d.difference.is_zero()),
            Report::Geometry(health) => !health.is_healthy(),
        }
    }
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Render a report to a writer; `title` names the inputs checked
    fn render(&self, report: &Report, title: &str, writer: &mut dyn Write) -> Result<()>;
}

/// Factory for creating output formatters
pub struct OutputFactory;

impl OutputFactory {
    /// Create an output formatter based on format type
    pub fn create(format: OutputFormat) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Terminal => Box::new(TerminalOutput::new()),
            OutputFormat::Json => Box::new(JsonOutput::new()),
        }
    }
}

/// Render a report to stdout
pub fn render_to_stdout(report: &Report, title: &str, format: OutputFormat) -> Result<()> {
    let formatter = OutputFactory::create(format);
    let mut stdout = std::io::stdout().lock();
    formatter.render(report, title, &mut stdout)
}
