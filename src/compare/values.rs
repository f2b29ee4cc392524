//! Cell-by-cell differences between paired columns and rows

use indexmap::IndexMap;
use serde::Serialize;

use super::align::{can_align, Selection};
use super::pair_label;
use crate::error::{QaError, Result};
use crate::model::{CellValue, RowKey, Table};

/// Difference between two paired cells
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowDifference {
    /// `"<row1> [vs] <row2>"`
    pub rows: String,
    pub difference: CellValue,
}

/// Differences keyed by `"<column1> [vs] <column2>"`, in input order
pub type DifferenceResult = IndexMap<String, Vec<RowDifference>>;

/// Subtract the cells of `table2` from the cells of `table1`
///
/// Columns are paired by position: `columns1[i]` with `columns2[i]`. Rows
/// are paired the same way when `rows1` and `rows2` are given. When both are
/// `None`, each table's whole index is used in its natural order. This zips
/// the two indexes by position; it does not match rows by key, so tables
/// that are not already aligned get compared row-for-row anyway.
///
/// # Errors
///
/// * [`QaError::InvalidArgument`] if the columns or rows cannot be aligned
///   (see [`can_align`]), or if only one of `rows1`/`rows2` is given.
/// * [`QaError::ColumnNotFound`] / [`QaError::RowNotFound`] if a cell is
///   missing.
/// * [`QaError::UnsupportedOperands`] if two cells cannot be subtracted.
pub fn compare_column_values(
    table1: &Table,
    table2: &Table,
    columns1: &Selection<String>,
    columns2: &Selection<String>,
    rows1: Option<&Selection<RowKey>>,
    rows2: Option<&Selection<RowKey>>,
) -> Result<DifferenceResult> {
    if !can_align(columns1, columns2) {
        return Err(QaError::invalid(format!(
            "cannot compare columns {:?} and {:?}",
            columns1, columns2
        )));
    }

    let (rows1, rows2) = match (rows1, rows2) {
        (None, None) => {
            let index1 = Selection::Sequence(table1.index().cloned().collect());
            let index2 = Selection::Sequence(table2.index().cloned().collect());
            return compare_column_values(
                table1,
                table2,
                columns1,
                columns2,
                Some(&index1),
                Some(&index2),
            );
        }
        (Some(rows1), Some(rows2)) => (rows1, rows2),
        _ => {
            return Err(QaError::invalid(
                "rows must be given for both tables or for neither",
            ))
        }
    };

    if !can_align(rows1, rows2) {
        return Err(QaError::invalid(format!(
            "cannot compare rows {:?} and {:?}",
            rows1, rows2
        )));
    }

    log::debug!(
        "comparing {} column pairs over {} row pairs",
        columns1.len(),
        rows1.len()
    );

    let mut results = DifferenceResult::new();
    for (column1, column2) in columns1.iter().zip(columns2.iter()) {
        let diffs = rows1
            .iter()
            .zip(rows2.iter())
            .map(|(row1, row2)| {
                let left = table1.get(column1, row1)?;
                let right = table2.get(column2, row2)?;
                Ok(RowDifference {
                    rows: pair_label(row1, row2),
                    difference: left.checked_sub(right)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        results.insert(pair_label(column1, column2), diffs);
    }

    Ok(results)
}
