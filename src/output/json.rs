//! JSON output format

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use super::{OutputFormatter, Report};

/// JSON output formatter
pub struct JsonOutput {
    pretty: bool,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    title: &'a str,
    findings: bool,
    report: &'a Report,
}

impl OutputFormatter for JsonOutput {
    fn render(&self, report: &Report, title: &str, writer: &mut dyn Write) -> Result<()> {
        let output = JsonReport {
            title,
            findings: report.has_findings(),
            report,
        };

        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, &output)?;
        } else {
            serde_json::to_writer(&mut *writer, &output)?;
        }
        writeln!(writer)?;
        Ok(())
    }
}
