//! Parser layer for reading various tabular data formats

mod csv;
mod excel;
mod geojson;
mod json;

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::config::Config;
use crate::model::Table;

pub use self::csv::CsvParser;
pub use self::excel::ExcelParser;
pub use self::geojson::GeoJsonParser;
pub use self::json::JsonParser;

/// Trait for parsing tabular data files
pub trait Parser: Send + Sync {
    /// Parse a file and return a Table
    fn parse(&self, path: &Path, config: &Config) -> Result<Table>;

    /// Check if this parser can handle the given file extension
    fn supports_extension(&self, ext: &str) -> bool;
}

/// Factory for creating parsers based on file extension
pub struct ParserFactory {
    parsers: Vec<Box<dyn Parser>>,
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserFactory {
    /// Create a new parser factory with all supported parsers
    pub fn new() -> Self {
        Self {
            parsers: vec![
                Box::new(CsvParser),
                Box::new(ExcelParser),
                Box::new(GeoJsonParser),
                Box::new(JsonParser),
            ],
        }
    }

    /// Get a parser for the given file path
    ///
    /// Files without an extension are sniffed with [`detect_format`].
    pub fn get_parser(&self, path: &Path) -> Result<&dyn Parser> {
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.to_lowercase(),
            None => detect_format(path).unwrap_or("csv").to_string(),
        };

        for parser in &self.parsers {
            if parser.supports_extension(&ext) {
                return Ok(parser.as_ref());
            }
        }

        bail!("Unsupported file format: {}", ext)
    }

    /// Parse a file using the appropriate parser
    pub fn parse(&self, path: &Path, config: &Config) -> Result<Table> {
        let parser = self.get_parser(path)?;
        let table = parser.parse(path, config)?;
        log::debug!(
            "loaded {} ({} rows, {} columns)",
            path.display(),
            table.row_count(),
            table.column_count()
        );
        Ok(table)
    }
}

/// Apply the configured index and geometry columns to a freshly read table
fn finish_table(mut table: Table, config: &Config) -> Result<Table> {
    table.infer_column_types();
    table.set_geometry_column(config.geometry_column.clone());

    if let Some(ref index) = config.index_column {
        table
            .set_index_column(index)
            .with_context(|| format!("Failed to use column '{}' as index", index))?;
    }

    Ok(table)
}

/// Detect file format from content (for files without extension)
pub fn detect_format(path: &Path) -> Option<&'static str> {
    use std::fs::File;
    use std::io::{BufRead, BufReader, Read};

    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let mut buffer = [0u8; 8];
    let bytes_read = reader.read(&mut buffer).ok()?;

    if bytes_read < 4 {
        return None;
    }

    // Check for Excel ZIP format (xlsx)
    if &buffer[0..4] == b"PK\x03\x04" {
        return Some("xlsx");
    }

    // Check for old Excel format (xls)
    if &buffer[0..4] == b"\xD0\xCF\x11\xE0" {
        return Some("xls");
    }

    // Try to detect JSON
    reader.seek_relative(-(bytes_read as i64)).ok()?;
    let mut line = String::new();
    reader.read_line(&mut line).ok()?;
    let trimmed = line.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        return Some("json");
    }

    // Default to CSV
    Some("csv")
}
