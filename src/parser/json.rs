//! JSON array parser

use std::borrow::Cow;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};
use indexmap::IndexSet;
use serde_json::Value;

use crate::config::Config;
use crate::model::{CellValue, Column, Table};

use super::geojson::{geojson_to_table, is_geojson_document, is_geometry_object, json_to_geometry};
use super::{finish_table, Parser};

/// Parser for JSON array files
///
/// A top-level GeoJSON Feature or FeatureCollection is handed to the GeoJSON
/// reader, so `.json` exports of geospatial layers load as geo tables.
pub struct JsonParser;

impl Parser for JsonParser {
    fn parse(&self, path: &Path, config: &Config) -> Result<Table> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open JSON file: {}", path.display()))?;
        let reader = BufReader::new(file);

        let value: Value =
            serde_json::from_reader(reader).context("Failed to parse JSON file")?;

        let table = if matches!(&value, Value::Object(obj) if is_geojson_document(obj)) {
            geojson_to_table(value, &config.geometry_column)?
        } else {
            records_to_table(value)?
        };
        finish_table(table, config)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "json")
    }
}

/// Build a table from an array of objects (or a single object)
fn records_to_table(value: Value) -> Result<Table> {
    // Handle both arrays and single objects
    let array = match value {
        Value::Array(arr) => arr,
        Value::Object(_) => vec![value],
        _ => bail!("JSON must be an array or object"),
    };

    // Collect all unique keys across all objects to build column list
    let mut column_names: IndexSet<String> = IndexSet::new();
    for item in &array {
        match item {
            Value::Object(obj) => column_names.extend(obj.keys().cloned()),
            _ => bail!("JSON array must contain only objects"),
        }
    }

    let columns: Vec<Column> = column_names
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(name.clone(), i))
        .collect();

    let mut table = Table::new(columns);

    // Convert each object to a row
    for (line_num, item) in array.iter().enumerate() {
        if let Value::Object(obj) = item {
            let cells = column_names
                .iter()
                .map(|key| json_value_to_cell(obj.get(key)))
                .collect();
            table.add_row(cells, line_num + 1);
        }
    }

    Ok(table)
}

pub(super) fn json_value_to_cell(value: Option<&Value>) -> CellValue {
    match value {
        None | Some(Value::Null) => CellValue::Null,
        Some(Value::Bool(b)) => CellValue::Bool(*b),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                CellValue::Int(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(Cow::Owned(n.to_string()))
            }
        }
        Some(Value::String(s)) => {
            // Try parsing as date/datetime
            if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return CellValue::Date(date);
            }
            if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                return CellValue::DateTime(dt);
            }
            if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return CellValue::DateTime(dt);
            }
            CellValue::String(Cow::Owned(s.clone()))
        }
        Some(Value::Object(obj)) if is_geometry_object(obj) => {
            match json_to_geometry(Value::Object(obj.clone())) {
                Some(geometry) => CellValue::Geometry(geometry),
                None => CellValue::String(Cow::Owned(Value::Object(obj.clone()).to_string())),
            }
        }
        // Nested arrays and objects are kept as their JSON text
        Some(other) => CellValue::String(Cow::Owned(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellType, RowKey};
    use serde_json::json;

    #[test]
    fn test_records_to_table() {
        let value = json!([
            {"COL1": 1, "COL2": 2.5, "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}},
            {"COL1": 4, "COL3": "x", "geometry": null}
        ]);
        let table = records_to_table(value).unwrap();

        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["COL1", "COL2", "geometry", "COL3"]
        );
        assert_eq!(
            table.get("geometry", &RowKey::Int(0)).unwrap().cell_type(),
            CellType::Geometry
        );
        assert!(table.get("COL2", &RowKey::Int(1)).unwrap().is_null());
    }

    #[test]
    fn test_non_object_items_rejected() {
        assert!(records_to_table(json!([1, 2, 3])).is_err());
        assert!(records_to_table(json!("text")).is_err());
    }

    #[test]
    fn test_nested_values_kept_as_text() {
        assert_eq!(
            json_value_to_cell(Some(&json!([1, 2]))),
            CellValue::from("[1,2]")
        );
        assert_eq!(
            json_value_to_cell(Some(&json!("2020-08-14"))).cell_type(),
            CellType::Date
        );
    }
}
