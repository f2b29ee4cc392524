//! Column and value comparisons between tables
//!
//! Every function here only reads its tables and returns a fresh result;
//! any error aborts the whole comparison.

mod align;
mod geometry;
mod names;
mod sums;
mod values;

use std::fmt::Display;

pub use align::{can_align, Selection, SelectionKind};
pub use geometry::{
    geometry_health, has_empty_geometries, has_missing_geometries, GeometryHealth,
    DEFAULT_THRESHOLD,
};
pub use names::{compare_column_names, NameComparison};
pub use sums::{compare_column_sums, sum_column_values, ColumnSum, SumDifference};
pub use values::{compare_column_values, DifferenceResult, RowDifference};

/// Separator between the two sides of a comparison label
pub const PAIR_SEPARATOR: &str = " [vs] ";

/// Label for a compared pair, e.g. `"COL1 [vs] col1"`
pub fn pair_label(left: impl Display, right: impl Display) -> String {
    format!("{}{}{}", left, PAIR_SEPARATOR, right)
}

/// Whether any value difference is non-zero
pub fn has_value_differences(result: &DifferenceResult) -> bool {
    result
        .values()
        .flatten()
        .any(|diff| !diff.difference.is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellValue;

    #[test]
    fn test_pair_label() {
        assert_eq!(pair_label("COL1", "col1"), "COL1 [vs] col1");
        assert_eq!(pair_label(0, 1), "0 [vs] 1");
    }

    #[test]
    fn test_has_value_differences() {
        let mut result = DifferenceResult::new();
        result.insert(
            pair_label("a", "b"),
            vec![RowDifference {
                rows: pair_label(0, 0),
                difference: CellValue::Float(0.0),
            }],
        );
        assert!(!has_value_differences(&result));

        result.insert(
            pair_label("c", "d"),
            vec![RowDifference {
                rows: pair_label(0, 0),
                difference: CellValue::Int(3),
            }],
        );
        assert!(has_value_differences(&result));
    }
}
