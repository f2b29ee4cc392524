//! CSV file parser

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::model::{CellValue, Column, Table};

use super::geojson::parse_geometry;
use super::{finish_table, Parser};

/// Parser for CSV files
pub struct CsvParser;

impl Parser for CsvParser {
    fn parse(&self, path: &Path, config: &Config) -> Result<Table> {
        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        let delimiter = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
            _ => b',',
        };
        let table = read_csv(BufReader::new(file), delimiter)?;
        finish_table(table, config)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "csv" | "tsv" | "txt")
    }
}

/// Read delimited text with a header row into a table
fn read_csv<R: Read>(reader: R, delimiter: u8) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    // Read headers
    let headers = csv_reader
        .headers()
        .context("Failed to read CSV headers")?
        .clone();

    let columns: Vec<Column> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(name.to_string(), i))
        .collect();

    let mut table = Table::new(columns);

    for (line_num, result) in csv_reader.records().enumerate() {
        // +2 for 1-indexing and header
        let source_line = line_num + 2;
        let record = result.with_context(|| format!("Failed to read CSV row {}", source_line))?;

        if record.len() != table.column_count() {
            log::warn!(
                "CSV row {} has {} fields, expected {}",
                source_line,
                record.len(),
                table.column_count()
            );
        }

        let cells: Vec<CellValue> = record.iter().map(parse_cell_value).collect();
        table.add_row(cells, source_line);
    }

    Ok(table)
}

/// Parse a string value into a CellValue with type inference
fn parse_cell_value(s: &str) -> CellValue {
    let trimmed = s.trim();

    // Check for empty/null
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") || trimmed == "NA" {
        return CellValue::Null;
    }

    // Try parsing as boolean
    if trimmed.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }

    // Try parsing as integer
    if let Ok(i) = trimmed.parse::<i64>() {
        return CellValue::Int(i);
    }

    // Try parsing as float
    if let Ok(f) = trimmed.parse::<f64>() {
        return CellValue::Float(f);
    }

    // Try parsing as date
    if let Ok(date) = chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return CellValue::Date(date);
    }

    // Try parsing as datetime (ISO 8601)
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return CellValue::DateTime(dt);
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return CellValue::DateTime(dt);
    }

    // Embedded GeoJSON geometry
    if trimmed.starts_with('{') {
        if let Some(geometry) = parse_geometry(trimmed) {
            return CellValue::Geometry(geometry);
        }
    }

    // Default to string
    CellValue::String(Cow::Owned(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellType, RowKey};

    #[test]
    fn test_parse_cell_value() {
        assert_eq!(parse_cell_value(""), CellValue::Null);
        assert_eq!(parse_cell_value("null"), CellValue::Null);
        assert_eq!(parse_cell_value("true"), CellValue::Bool(true));
        assert_eq!(parse_cell_value("false"), CellValue::Bool(false));
        assert_eq!(parse_cell_value("42"), CellValue::Int(42));
        assert_eq!(parse_cell_value("3.25"), CellValue::Float(3.25));
        assert_eq!(
            parse_cell_value("hello"),
            CellValue::String(Cow::Owned("hello".to_string()))
        );
        assert_eq!(parse_cell_value("{not json"), CellValue::from("{not json"));
    }

    #[test]
    fn test_parse_geometry_cell() {
        let cell = parse_cell_value(r#"{"type": "Point", "coordinates": [1.0, 2.0]}"#);
        assert_eq!(cell.cell_type(), CellType::Geometry);
        assert_eq!(cell.display(), "POINT(1 2)");
    }

    #[test]
    fn test_read_csv() {
        let data = "ID,POP,NAME\n10,100,a\n11,250\n";
        let table = read_csv(data.as_bytes(), b',').unwrap();

        assert_eq!(table.column_count(), 3);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[1].source_line, 3);
        assert_eq!(table.get("NAME", &RowKey::Int(1)).unwrap(), &CellValue::Null);
    }

    #[test]
    fn test_index_column() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        std::io::Write::write_all(&mut file, b"ID,POP\n10,100\n11,250\n").unwrap();

        let config = Config::default().with_index_column("ID");
        let table = CsvParser.parse(file.path(), &config).unwrap();
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["POP"]);
        assert_eq!(table.get("POP", &RowKey::Int(11)).unwrap(), &CellValue::Int(250));
        assert_eq!(table.column("POP").unwrap().inferred_type, CellType::Int);
    }
}
