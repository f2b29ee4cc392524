//! Health checks over the geometry column of a geospatial table

use geo::HasDimensions;
use serde::Serialize;

use crate::error::{QaError, Result};
use crate::model::{CellValue, Table};

/// Fraction of rows allowed to fail a check unless told otherwise
///
/// At `0.0` a single missing or empty geometry fails the check.
pub const DEFAULT_THRESHOLD: f64 = 0.0;

/// Geometry counts for one table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometryHealth {
    pub column: String,
    pub rows: usize,
    /// Rows with no geometry at all
    pub missing: usize,
    /// Rows whose geometry has no coordinates
    pub empty: usize,
    pub threshold: f64,
    pub has_missing: bool,
    pub has_empty: bool,
}

impl GeometryHealth {
    /// Whether both checks passed
    pub fn is_healthy(&self) -> bool {
        !self.has_missing && !self.has_empty
    }
}

/// Whether more than `threshold` of the table's rows lack a geometry
///
/// The comparison is strict: `missing > threshold * rows`. A threshold of
/// `0.0` flags any missing geometry, and a threshold of `1.0` can never be
/// exceeded, so it always yields `false`.
pub fn has_missing_geometries(table: &Table, threshold: f64) -> Result<bool> {
    Ok(geometry_health(table, threshold)?.has_missing)
}

/// Whether more than `threshold` of the table's rows hold an empty geometry
///
/// Empty means a geometry with no coordinates, e.g. a polygon without an
/// exterior ring. A null cell is missing, not empty. The threshold behaves as
/// in [`has_missing_geometries`].
pub fn has_empty_geometries(table: &Table, threshold: f64) -> Result<bool> {
    Ok(geometry_health(table, threshold)?.has_empty)
}

/// Count missing and empty geometries and apply `threshold` to both
///
/// # Errors
///
/// * [`QaError::InvalidArgument`] if `threshold` is not within `[0, 1]`.
/// * [`QaError::ColumnNotFound`] if the table has no geometry column.
/// * [`QaError::NotGeometry`] if the column holds anything other than
///   geometries and nulls.
pub fn geometry_health(table: &Table, threshold: f64) -> Result<GeometryHealth> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(QaError::invalid(format!(
            "threshold must be between 0 and 1, got {}",
            threshold
        )));
    }

    let column = table.geometry_column();
    let mut missing = 0;
    let mut empty = 0;
    for cell in table.column_values(column)? {
        match cell {
            CellValue::Null => missing += 1,
            CellValue::Geometry(geometry) if geometry.is_empty() => empty += 1,
            CellValue::Geometry(_) => {}
            other => {
                return Err(QaError::NotGeometry {
                    column: column.to_string(),
                    found: other.cell_type(),
                })
            }
        }
    }

    let rows = table.row_count();
    let allowed = rows as f64 * threshold;
    log::debug!(
        "geometry column '{}': {} missing, {} empty of {} rows (allowed {})",
        column,
        missing,
        empty,
        rows,
        allowed
    );

    Ok(GeometryHealth {
        column: column.to_string(),
        rows,
        missing,
        empty,
        threshold,
        has_missing: missing as f64 > allowed,
        has_empty: empty as f64 > allowed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use geo::{point, Geometry, LineString, MultiPoint, Polygon};

    fn pt(x: f64, y: f64) -> CellValue {
        CellValue::Geometry(point!(x: x, y: y).into())
    }

    fn empty_polygon() -> CellValue {
        CellValue::Geometry(Polygon::new(LineString::new(vec![]), vec![]).into())
    }

    fn gdf(geometries: Vec<CellValue>) -> Table {
        let labels = (0..geometries.len())
            .map(|i| CellValue::from(format!("v{}", i + 1)))
            .collect();
        Table::from_columns([("col", labels), ("geometry", geometries)]).unwrap()
    }

    #[test]
    fn test_missing_geometries() {
        let table = gdf(vec![CellValue::Null, pt(1.0, 2.0), pt(2.0, 1.0)]);
        assert!(has_missing_geometries(&table, DEFAULT_THRESHOLD).unwrap());
        assert!(!has_missing_geometries(&table, 0.75).unwrap());
        assert!(has_missing_geometries(&table, 0.3).unwrap());
        assert!(!has_empty_geometries(&table, DEFAULT_THRESHOLD).unwrap());
    }

    #[test]
    fn test_empty_geometries() {
        let table = gdf(vec![pt(1.0, 2.0), empty_polygon(), pt(2.0, 1.0)]);
        assert!(has_empty_geometries(&table, DEFAULT_THRESHOLD).unwrap());
        assert!(!has_empty_geometries(&table, 0.75).unwrap());
        assert!(!has_missing_geometries(&table, DEFAULT_THRESHOLD).unwrap());

        let multi = gdf(vec![CellValue::Geometry(Geometry::MultiPoint(MultiPoint::new(
            vec![],
        )))]);
        assert!(has_empty_geometries(&multi, DEFAULT_THRESHOLD).unwrap());
    }

    #[test]
    fn test_threshold_one_never_fires() {
        let table = gdf(vec![CellValue::Null, CellValue::Null]);
        assert!(has_missing_geometries(&table, 0.99).unwrap());
        assert!(!has_missing_geometries(&table, 1.0).unwrap());
    }

    #[test]
    fn test_zero_threshold_on_clean_table() {
        let table = gdf(vec![pt(0.0, 0.0)]);
        let health = geometry_health(&table, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(health.missing, 0);
        assert_eq!(health.empty, 0);
        assert!(health.is_healthy());

        let none = gdf(vec![]);
        assert!(!has_missing_geometries(&none, DEFAULT_THRESHOLD).unwrap());
    }

    #[test]
    fn test_missing_geometry_column() {
        let table = Table::from_columns([("col", vec![CellValue::Int(1)])]).unwrap();
        let err = has_missing_geometries(&table, DEFAULT_THRESHOLD).unwrap_err();
        assert_eq!(err, QaError::ColumnNotFound("geometry".into()));
    }

    #[test]
    fn test_custom_geometry_column() {
        let table = Table::from_columns([("shape", vec![CellValue::Null, pt(1.0, 1.0)])])
            .unwrap()
            .with_geometry_column("shape");
        assert!(has_missing_geometries(&table, 0.25).unwrap());
        assert!(!has_missing_geometries(&table, 0.5).unwrap());
    }

    #[test]
    fn test_invalid_threshold() {
        let table = gdf(vec![pt(0.0, 0.0)]);
        for threshold in [-0.1, 1.5, f64::NAN] {
            let err = has_missing_geometries(&table, threshold).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn test_non_geometry_values() {
        let table = gdf(vec![CellValue::from("POINT (1 2)")]);
        let err = has_empty_geometries(&table, DEFAULT_THRESHOLD).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }
}
