//! Colored terminal output

use std::io::{IsTerminal, Write};

use anyhow::Result;
use tabled::builder::Builder;
use tabled::settings::Style;
use termcolor::{Ansi, Color, ColorChoice, ColorSpec, WriteColor};

use crate::compare::{ColumnSum, DifferenceResult, GeometryHealth, NameComparison, SumDifference};

use super::{OutputFormatter, Report};

/// Terminal output with colors
pub struct TerminalOutput {
    color_choice: ColorChoice,
}

impl TerminalOutput {
    pub fn new() -> Self {
        Self {
            color_choice: ColorChoice::Auto,
        }
    }

    pub fn with_color_choice(color_choice: ColorChoice) -> Self {
        Self { color_choice }
    }

    fn use_color(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always | ColorChoice::AlwaysAnsi => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
            }
        }
    }

    fn write_header(&self, writer: &mut dyn Write, title: &str) -> Result<()> {
        writeln!(writer, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(writer, " dataqa: {}", title)?;
        writeln!(writer, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(writer)?;
        Ok(())
    }

    /// Write a one-line verdict, green when `passed` and red otherwise
    fn write_verdict(&self, writer: &mut dyn Write, passed: bool, text: &str) -> Result<()> {
        if !self.use_color() {
            writeln!(writer, "{}", text)?;
            return Ok(());
        }

        let color = if passed { Color::Green } else { Color::Red };
        let mut ansi = Ansi::new(writer);
        ansi.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(ansi, "{}", text)?;
        ansi.reset()?;
        writeln!(ansi)?;
        Ok(())
    }

    fn write_names(&self, names: &NameComparison, writer: &mut dyn Write) -> Result<()> {
        let mut builder = Builder::default();
        builder.push_record(["Column", "Status"]);
        for name in &names.matches {
            builder.push_record([name.as_str(), "standard"]);
        }
        for name in &names.mismatches {
            builder.push_record([name.as_str(), "non-standard"]);
        }
        writeln!(writer, "{}", build_table(builder))?;

        let verdict = format!(
            "{} standard, {} non-standard",
            names.matches.len(),
            names.mismatches.len()
        );
        self.write_verdict(writer, names.is_conforming(), &verdict)
    }

    fn write_sums(&self, sums: &[ColumnSum], writer: &mut dyn Write) -> Result<()> {
        let mut builder = Builder::default();
        builder.push_record(["Column", "Type", "Sum"]);
        for sum in sums {
            builder.push_record([
                sum.column.clone(),
                sum.column_type.to_string(),
                sum.sum.to_string(),
            ]);
        }
        writeln!(writer, "{}", build_table(builder))?;
        Ok(())
    }

    fn write_values(&self, diffs: &DifferenceResult, writer: &mut dyn Write) -> Result<()> {
        let mut differing = 0;
        for (columns, rows) in diffs {
            writeln!(writer, "{}:", columns)?;

            let mut builder = Builder::default();
            builder.push_record(["Rows", "Difference"]);
            for row in rows {
                if !row.difference.is_zero() {
                    differing += 1;
                }
                builder.push_record([row.rows.clone(), row.difference.to_string()]);
            }
            writeln!(writer, "{}", build_table(builder))?;
        }

        let verdict = format!("{} differing cells", differing);
        self.write_verdict(writer, differing == 0, &verdict)
    }

    fn write_sum_differences(&self, diffs: &[SumDifference], writer: &mut dyn Write) -> Result<()> {
        let mut builder = Builder::default();
        builder.push_record(["Columns", "Difference"]);
        for diff in diffs {
            builder.push_record([diff.columns.clone(), diff.difference.to_string()]);
        }
        writeln!(writer, "{}", build_table(builder))?;

        let differing = diffs.iter().filter(|d| !d.difference.is_zero()).count();
        let verdict = format!("{} of {} column totals differ", differing, diffs.len());
        self.write_verdict(writer, differing == 0, &verdict)
    }

    fn write_geometry(&self, health: &GeometryHealth, writer: &mut dyn Write) -> Result<()> {
        let mut builder = Builder::default();
        builder.push_record(["Check", "Count", "Share", "Exceeds threshold"]);
        for (check, count, exceeds) in [
            ("missing", health.missing, health.has_missing),
            ("empty", health.empty, health.has_empty),
        ] {
            builder.push_record([
                check.to_string(),
                count.to_string(),
                format_share(count, health.rows),
                exceeds.to_string(),
            ]);
        }

        writeln!(
            writer,
            "Geometry column '{}' ({} rows, threshold {})",
            health.column, health.rows, health.threshold
        )?;
        writeln!(writer, "{}", build_table(builder))?;

        let verdict = if health.is_healthy() {
            "Geometries OK"
        } else {
            "Geometry check failed"
        };
        self.write_verdict(writer, health.is_healthy(), verdict)
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TerminalOutput {
    fn render(&self, report: &Report, title: &str, writer: &mut dyn Write) -> Result<()> {
        self.write_header(writer, title)?;

        match report {
            Report::ColumnNames(names) => self.write_names(names, writer),
            Report::ColumnSums(sums) => self.write_sums(sums, writer),
            Report::ColumnValues(diffs) => self.write_values(diffs, writer),
            Report::SumDifferences(diffs) => self.write_sum_differences(diffs, writer),
            Report::Geometry(health) => self.write_geometry(health, writer),
        }
    }
}

fn build_table(builder: Builder) -> String {
    let mut table = builder.build();
    table.with(Style::modern());
    table.to_string()
}

fn format_share(count: usize, rows: usize) -> String {
    if rows == 0 {
        return "-".to_string();
    }
    format!("{:.1}%", count as f64 / rows as f64 * 100.0)
}
