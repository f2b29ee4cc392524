//! Column totals and the differences between them

use serde::Serialize;

use super::align::{can_align, Selection};
use super::pair_label;
use crate::error::{QaError, Result};
use crate::model::{CellType, CellValue, Table};

/// Total of one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSum {
    pub column: String,
    /// Type inferred for the column when the table was loaded
    pub column_type: CellType,
    pub sum: CellValue,
}

/// Difference between the totals of two paired columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SumDifference {
    /// `"<column1> [vs] <column2>"`
    pub columns: String,
    pub difference: CellValue,
}

/// Sum each named column, in the order the names are given
///
/// Integer columns sum to an integer and any float promotes the total to a
/// float. Null cells are skipped; an empty column sums to `0`. Columns must
/// hold numbers only: booleans, text, dates and geometries fail with
/// [`QaError::UnsupportedOperands`] instead of being coerced.
pub fn sum_column_values<I, S>(table: &Table, columns: I) -> Result<Vec<ColumnSum>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    columns
        .into_iter()
        .map(|column| {
            let column = column.as_ref();
            let column_type = table.columns()[table.require_column(column)?].inferred_type;
            let sum = table
                .column_values(column)?
                .filter(|cell| !cell.is_null())
                .try_fold(CellValue::Int(0), |acc, cell| acc.checked_add(cell))?;
            Ok(ColumnSum {
                column: column.to_string(),
                column_type,
                sum,
            })
        })
        .collect()
}

/// Subtract the totals of `columns2` in `table2` from those of `columns1`
/// in `table1`, pairing the columns by position
pub fn compare_column_sums(
    table1: &Table,
    table2: &Table,
    columns1: &Selection<String>,
    columns2: &Selection<String>,
) -> Result<Vec<SumDifference>> {
    if !can_align(columns1, columns2) {
        return Err(QaError::invalid(format!(
            "cannot compare columns {:?} and {:?}",
            columns1, columns2
        )));
    }

    let sums1 = sum_column_values(table1, columns1.iter())?;
    let sums2 = sum_column_values(table2, columns2.iter())?;
    if sums1.len() != sums2.len() {
        return Err(QaError::invalid(format!(
            "cannot pair {} sums with {} sums",
            sums1.len(),
            sums2.len()
        )));
    }

    log::debug!("comparing sums of {} column pairs", sums1.len());

    sums1
        .iter()
        .zip(&sums2)
        .map(|(a, b)| {
            Ok(SumDifference {
                columns: pair_label(&a.column, &b.column),
                difference: a.sum.checked_sub(&b.sum)?,
            })
        })
        .collect()
}
