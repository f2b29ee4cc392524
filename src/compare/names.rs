//! Column name comparison against a standard vocabulary

use indexmap::IndexSet;
use serde::Serialize;

use crate::model::Table;

/// A table's columns split by membership in a set of standard names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NameComparison {
    /// Columns that are standard names
    pub matches: IndexSet<String>,
    /// Columns that are not standard names
    pub mismatches: IndexSet<String>,
}

impl NameComparison {
    /// Whether every column is a standard name
    pub fn is_conforming(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Classify a table's columns against `standards`
///
/// Matching is exact and case-sensitive. Both sets keep the table's column
/// order.
pub fn compare_column_names<I, S>(table: &Table, standards: I) -> NameComparison
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let standards: IndexSet<String> = standards
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect();

    let (matches, mismatches): (IndexSet<String>, IndexSet<String>) = table
        .column_names()
        .map(str::to_string)
        .partition(|name| standards.contains(name));

    log::debug!(
        "compared {} columns against {} standards: {} matches, {} mismatches",
        table.column_count(),
        standards.len(),
        matches.len(),
        mismatches.len()
    );

    NameComparison {
        matches,
        mismatches,
    }
}
