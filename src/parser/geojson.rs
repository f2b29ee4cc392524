//! GeoJSON FeatureCollection parser

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};
use geo::Geometry;
use geojson::{Feature, FeatureCollection, GeoJson};
use indexmap::IndexSet;
use serde_json::{Map, Value};

use crate::config::Config;
use crate::model::{CellValue, Column, Table};

use super::json::json_value_to_cell;
use super::{finish_table, Parser};

/// GeoJSON `type` values that denote a bare geometry
const GEOMETRY_TYPES: &[&str] = &[
    "Point",
    "MultiPoint",
    "LineString",
    "MultiLineString",
    "Polygon",
    "MultiPolygon",
    "GeometryCollection",
];

/// Parser for GeoJSON files
pub struct GeoJsonParser;

impl Parser for GeoJsonParser {
    fn parse(&self, path: &Path, config: &Config) -> Result<Table> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open GeoJSON file: {}", path.display()))?;
        let value: Value = serde_json::from_reader(BufReader::new(file))
            .context("Failed to parse GeoJSON file")?;

        let table = geojson_to_table(value, &config.geometry_column)?;
        finish_table(table, config)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "geojson")
    }
}

/// Whether a JSON object looks like a GeoJSON document rather than a record
pub(super) fn is_geojson_document(obj: &Map<String, Value>) -> bool {
    matches!(
        obj.get("type").and_then(Value::as_str),
        Some("FeatureCollection" | "Feature")
    )
}

/// Whether a JSON object is a bare GeoJSON geometry
pub(super) fn is_geometry_object(obj: &Map<String, Value>) -> bool {
    let Some(kind) = obj.get("type").and_then(Value::as_str) else {
        return false;
    };
    GEOMETRY_TYPES.contains(&kind)
        && (obj.contains_key("coordinates") || obj.contains_key("geometries"))
}

/// Convert a GeoJSON geometry object to a geometry
pub(super) fn json_to_geometry(value: Value) -> Option<Geometry<f64>> {
    let geometry = geojson::Geometry::from_json_value(value).ok()?;
    Geometry::<f64>::try_from(geometry).ok()
}

/// Parse GeoJSON geometry text, e.g. a CSV cell
pub(super) fn parse_geometry(text: &str) -> Option<Geometry<f64>> {
    match serde_json::from_str::<Value>(text).ok()? {
        Value::Object(obj) if is_geometry_object(&obj) => json_to_geometry(Value::Object(obj)),
        _ => None,
    }
}

/// Build a table from a Feature or FeatureCollection
///
/// Feature properties become columns (union of keys, first-seen order) and
/// each feature's geometry goes into `geometry_column`; a feature without a
/// geometry gets a null.
pub(super) fn geojson_to_table(value: Value, geometry_column: &str) -> Result<Table> {
    let features = match GeoJson::from_json_value(value).context("Invalid GeoJSON")? {
        GeoJson::FeatureCollection(FeatureCollection { features, .. }) => features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => bail!("GeoJSON must be a Feature or FeatureCollection"),
    };

    let mut column_names: IndexSet<String> = IndexSet::new();
    for feature in &features {
        if let Some(ref properties) = feature.properties {
            column_names.extend(properties.keys().cloned());
        }
    }
    column_names.insert(geometry_column.to_string());

    let shadowed = shadowed_properties(&features, geometry_column);
    if shadowed > 0 {
        log::warn!(
            "{} of {} features have a '{}' property; it is replaced by the feature geometry",
            shadowed,
            features.len(),
            geometry_column
        );
    }

    let columns: Vec<Column> = column_names
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(name.clone(), i))
        .collect();
    let mut table = Table::new(columns);

    for (line_num, feature) in features.into_iter().enumerate() {
        let cells = feature_cells(feature, &column_names, geometry_column)
            .with_context(|| format!("Invalid geometry in feature {}", line_num + 1))?;
        table.add_row(cells, line_num + 1);
    }

    Ok(table)
}

/// Number of features whose properties use the geometry column's name
fn shadowed_properties(features: &[Feature], geometry_column: &str) -> usize {
    features
        .iter()
        .filter(|f| {
            f.properties
                .as_ref()
                .is_some_and(|p| p.contains_key(geometry_column))
        })
        .count()
}

fn feature_cells(
    feature: Feature,
    column_names: &IndexSet<String>,
    geometry_column: &str,
) -> Result<Vec<CellValue>> {
    let geometry = match feature.geometry {
        Some(geometry) => CellValue::Geometry(Geometry::<f64>::try_from(geometry)?),
        None => CellValue::Null,
    };

    let mut geometry = Some(geometry);
    let cells = column_names
        .iter()
        .map(|name| {
            if name == geometry_column {
                geometry.take().unwrap_or(CellValue::Null)
            } else {
                json_value_to_cell(feature.properties.as_ref().and_then(|p| p.get(name)))
            }
        })
        .collect();

    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{has_empty_geometries, has_missing_geometries, DEFAULT_THRESHOLD};
    use crate::model::{CellType, RowKey};
    use serde_json::json;

    fn collection() -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"NAME": "a", "POP": 10},
                    "geometry": null
                },
                {
                    "type": "Feature",
                    "properties": {"NAME": "b", "POP": 20},
                    "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}
                },
                {
                    "type": "Feature",
                    "properties": {"NAME": "c", "POP": 30, "EXTRA": true},
                    "geometry": {"type": "GeometryCollection", "geometries": []}
                }
            ]
        })
    }

    #[test]
    fn test_feature_collection() {
        let table = geojson_to_table(collection(), "geometry").unwrap();
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["NAME", "POP", "EXTRA", "geometry"]
        );
        assert_eq!(table.row_count(), 3);
        assert!(table.get("geometry", &RowKey::Int(0)).unwrap().is_null());
        assert_eq!(
            table.get("geometry", &RowKey::Int(1)).unwrap().cell_type(),
            CellType::Geometry
        );
        assert!(table.get("EXTRA", &RowKey::Int(0)).unwrap().is_null());

        assert!(has_missing_geometries(&table, DEFAULT_THRESHOLD).unwrap());
        assert!(has_empty_geometries(&table, DEFAULT_THRESHOLD).unwrap());
        assert!(!has_missing_geometries(&table, 0.5).unwrap());
    }

    #[test]
    fn test_custom_geometry_column() {
        let table = geojson_to_table(collection(), "shape").unwrap();
        assert!(table.column("shape").is_some());
        assert!(table.column("geometry").is_none());
    }

    #[test]
    fn test_geometry_wins_over_same_named_property() {
        let value = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"NAME": "a", "geometry": "POINT (9 9)"},
                    "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}
                },
                {
                    "type": "Feature",
                    "properties": {"NAME": "b"},
                    "geometry": null
                }
            ]
        });

        let features = match GeoJson::from_json_value(value.clone()).unwrap() {
            GeoJson::FeatureCollection(fc) => fc.features,
            other => panic!("expected a collection, got {:?}", other),
        };
        assert_eq!(shadowed_properties(&features, "geometry"), 1);
        assert_eq!(shadowed_properties(&features, "shape"), 0);

        let table = geojson_to_table(value, "geometry").unwrap();
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["NAME", "geometry"]);
        assert_eq!(
            table.get("geometry", &RowKey::Int(0)).unwrap().cell_type(),
            CellType::Geometry
        );
    }

    #[test]
    fn test_bare_geometry_rejected() {
        let value = json!({"type": "Point", "coordinates": [0.0, 0.0]});
        assert!(geojson_to_table(value, "geometry").is_err());
    }

    #[test]
    fn test_is_geometry_object() {
        let point = json!({"type": "Point", "coordinates": [0.0, 0.0]});
        let record = json!({"type": "Residential", "coordinates": "n/a"});
        assert!(is_geometry_object(point.as_object().unwrap()));
        assert!(!is_geometry_object(record.as_object().unwrap()));
    }
}
