//! Row labels

use std::fmt;

use serde::{Deserialize, Serialize};

use super::table::CellValue;

/// Label of a row within a table's index
///
/// Tables are indexed `0..n` by default; any column holding unique integer
/// or text values can be promoted to the index instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowKey {
    Int(i64),
    Text(String),
}

impl RowKey {
    /// Build a row key from a cell, if the cell can label a row
    ///
    /// Integers (and floats with no fractional part) become `Int` keys,
    /// nulls and geometries are rejected, everything else is keyed by its
    /// display text.
    pub fn from_cell(cell: &CellValue) -> Option<Self> {
        match cell {
            CellValue::Null | CellValue::Geometry(_) => None,
            CellValue::Int(i) => Some(RowKey::Int(*i)),
            CellValue::Float(f) if f.fract() == 0.0 && f.is_finite() => {
                Some(RowKey::Int(*f as i64))
            }
            other => Some(RowKey::Text(other.display().into_owned())),
        }
    }

    /// Parse a label given on the command line: integers first, then text
    pub fn parse(s: &str) -> Self {
        match s.trim().parse::<i64>() {
            Ok(i) => RowKey::Int(i),
            Err(_) => RowKey::Text(s.to_string()),
        }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Int(i) => write!(f, "{}", i),
            RowKey::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RowKey {
    fn from(i: i64) -> Self {
        RowKey::Int(i)
    }
}

impl From<i32> for RowKey {
    fn from(i: i32) -> Self {
        RowKey::Int(i64::from(i))
    }
}

impl From<usize> for RowKey {
    fn from(i: usize) -> Self {
        RowKey::Int(i as i64)
    }
}

impl From<&str> for RowKey {
    fn from(s: &str) -> Self {
        RowKey::Text(s.to_string())
    }
}

impl From<String> for RowKey {
    fn from(s: String) -> Self {
        RowKey::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cell() {
        assert_eq!(RowKey::from_cell(&CellValue::Int(4)), Some(RowKey::Int(4)));
        assert_eq!(RowKey::from_cell(&CellValue::Float(2.0)), Some(RowKey::Int(2)));
        assert_eq!(
            RowKey::from_cell(&CellValue::Float(2.5)),
            Some(RowKey::Text("2.5".into()))
        );
        assert_eq!(
            RowKey::from_cell(&CellValue::from("MA-01")),
            Some(RowKey::Text("MA-01".into()))
        );
        assert_eq!(RowKey::from_cell(&CellValue::Null), None);
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(RowKey::parse("12"), RowKey::Int(12));
        assert_eq!(RowKey::parse("precinct"), RowKey::Text("precinct".into()));
        assert_eq!(RowKey::Int(0).to_string(), "0");
        assert_eq!(RowKey::Text("a".into()).to_string(), "a");
    }
}
