//! Table, Row, and Cell data structures

use std::borrow::Cow;

use chrono::{NaiveDate, NaiveDateTime};
use geo::{CoordsIter, Geometry, HasDimensions};
use rustc_hash::FxHashMap;
use serde::{Serialize, Serializer};

use super::key::RowKey;
use super::schema::{CellType, Column};
use crate::error::{QaError, Result};

/// Name of the geometry column unless a table says otherwise
pub const DEFAULT_GEOMETRY_COLUMN: &str = "geometry";

/// A cell value with type information
#[derive(Debug, Clone)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Cow<'static, str>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Geometry(Geometry<f64>),
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::Float(a), CellValue::Float(b)) => {
                // Handle NaN comparison
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (CellValue::String(a), CellValue::String(b)) => a == b,
            (CellValue::Date(a), CellValue::Date(b)) => a == b,
            (CellValue::DateTime(a), CellValue::DateTime(b)) => a == b,
            (CellValue::Geometry(a), CellValue::Geometry(b)) => a == b,
            // Cross-type numeric comparison
            (CellValue::Int(a), CellValue::Float(b)) => (*a as f64) == *b,
            (CellValue::Float(a), CellValue::Int(b)) => *a == (*b as f64),
            _ => false,
        }
    }
}

impl CellValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Type tag of this value
    pub fn cell_type(&self) -> CellType {
        match self {
            CellValue::Null => CellType::Null,
            CellValue::Bool(_) => CellType::Bool,
            CellValue::Int(_) => CellType::Int,
            CellValue::Float(_) => CellType::Float,
            CellValue::String(_) => CellType::String,
            CellValue::Date(_) => CellType::Date,
            CellValue::DateTime(_) => CellType::DateTime,
            CellValue::Geometry(_) => CellType::Geometry,
        }
    }

    /// Numeric value as a float, if the cell is numeric
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Whether the value is zero, i.e. a difference that found nothing
    ///
    /// Null differences count as zero: a missing value on either side is
    /// not evidence of a discrepancy.
    pub fn is_zero(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Int(i) => *i == 0,
            CellValue::Float(f) => *f == 0.0,
            _ => false,
        }
    }

    /// Convert to a display string
    pub fn display(&self) -> Cow<'_, str> {
        match self {
            CellValue::Null => Cow::Borrowed("NULL"),
            CellValue::Bool(b) => Cow::Owned(b.to_string()),
            CellValue::Int(i) => Cow::Owned(i.to_string()),
            CellValue::Float(f) => Cow::Owned(f.to_string()),
            CellValue::String(s) => Cow::Borrowed(s.as_ref()),
            CellValue::Date(d) => Cow::Owned(d.to_string()),
            CellValue::DateTime(dt) => Cow::Owned(dt.to_string()),
            CellValue::Geometry(g) => Cow::Owned(geometry_label(g)),
        }
    }

    /// `self + other` for numeric cells
    ///
    /// Nulls propagate, integer overflow is an error rather than a wrap.
    pub fn checked_add(&self, other: &CellValue) -> Result<CellValue> {
        self.arithmetic(other, "addition", i64::checked_add, |a, b| a + b)
    }

    /// `self - other` for numeric cells
    ///
    /// Nulls propagate, integer overflow is an error rather than a wrap.
    pub fn checked_sub(&self, other: &CellValue) -> Result<CellValue> {
        self.arithmetic(other, "subtraction", i64::checked_sub, |a, b| a - b)
    }

    fn arithmetic(
        &self,
        other: &CellValue,
        op: &'static str,
        int_op: fn(i64, i64) -> Option<i64>,
        float_op: fn(f64, f64) -> f64,
    ) -> Result<CellValue> {
        match (self, other) {
            (CellValue::Int(a), CellValue::Int(b)) => int_op(*a, *b)
                .map(CellValue::Int)
                .ok_or(QaError::IntegerOverflow { op }),
            (CellValue::Null, b) if b.is_null() || b.cell_type().is_numeric() => Ok(CellValue::Null),
            (a, CellValue::Null) if a.cell_type().is_numeric() => Ok(CellValue::Null),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => Ok(CellValue::Float(float_op(x, y))),
                _ => Err(QaError::UnsupportedOperands {
                    op,
                    left: a.cell_type(),
                    right: b.cell_type(),
                }),
            },
        }
    }
}

/// Short WKT-style label for a geometry
fn geometry_label(geometry: &Geometry<f64>) -> String {
    let name = match geometry {
        Geometry::Point(_) => "POINT",
        Geometry::Line(_) => "LINE",
        Geometry::LineString(_) => "LINESTRING",
        Geometry::Polygon(_) => "POLYGON",
        Geometry::MultiPoint(_) => "MULTIPOINT",
        Geometry::MultiLineString(_) => "MULTILINESTRING",
        Geometry::MultiPolygon(_) => "MULTIPOLYGON",
        Geometry::GeometryCollection(_) => "GEOMETRYCOLLECTION",
        Geometry::Rect(_) => "RECT",
        Geometry::Triangle(_) => "TRIANGLE",
    };

    if geometry.is_empty() {
        return format!("{} EMPTY", name);
    }

    match geometry {
        Geometry::Point(p) => format!("POINT({} {})", p.x(), p.y()),
        other => format!("{}[{} coords]", name, other.coords_count()),
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            CellValue::Null => serializer.serialize_none(),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Int(i) => serializer.serialize_i64(*i),
            CellValue::Float(f) => serializer.serialize_f64(*f),
            CellValue::String(s) => serializer.serialize_str(s),
            CellValue::Date(d) => d.serialize(serializer),
            CellValue::DateTime(dt) => dt.serialize(serializer),
            CellValue::Geometry(g) => {
                geojson::Geometry::new(geojson::Value::from(g)).serialize(serializer)
            }
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(Cow::Owned(s.to_string()))
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(Cow::Owned(s))
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<Geometry<f64>> for CellValue {
    fn from(g: Geometry<f64>) -> Self {
        CellValue::Geometry(g)
    }
}

impl<T> From<Option<T>> for CellValue
where
    T: Into<CellValue>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

/// A row in the table
#[derive(Debug, Clone)]
pub struct Row {
    /// Cell values in column order
    pub cells: Vec<CellValue>,
    /// Label of this row in the table's index
    pub key: RowKey,
    /// Original line/row number in source file (1-indexed)
    pub source_line: usize,
}

impl Row {
    /// Get a cell value by column index
    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }
}

/// A table of named columns and keyed rows
#[derive(Debug, Clone)]
pub struct Table {
    /// Column definitions
    columns: Vec<Column>,
    /// All rows in the table, in index order
    rows: Vec<Row>,
    /// Row key to position in `rows`
    row_index: FxHashMap<RowKey, usize>,
    /// Column holding the geometries of a geospatial table
    geometry_column: String,
}

impl Table {
    /// Create a new empty table with column definitions
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            row_index: FxHashMap::default(),
            geometry_column: DEFAULT_GEOMETRY_COLUMN.to_string(),
        }
    }

    /// Build a table from named columns of values, indexed `0..n`
    ///
    /// Fails if the columns do not all have the same length.
    pub fn from_columns<I, S>(data: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<CellValue>)>,
        S: Into<String>,
    {
        let (names, values): (Vec<String>, Vec<Vec<CellValue>>) =
            data.into_iter().map(|(name, cells)| (name.into(), cells)).unzip();

        let height = values.first().map_or(0, Vec::len);
        if let Some((name, cells)) = names
            .iter()
            .zip(&values)
            .find(|(_, cells)| cells.len() != height)
        {
            return Err(QaError::invalid(format!(
                "column '{}' has {} values, expected {}",
                name,
                cells.len(),
                height
            )));
        }

        let columns = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Column::new(name, i))
            .collect();
        let mut table = Table::new(columns);

        let mut iters: Vec<_> = values.into_iter().map(Vec::into_iter).collect();
        for line in 0..height {
            let cells = iters.iter_mut().filter_map(|it| it.next()).collect();
            table.add_row(cells, line + 1);
        }
        table.infer_column_types();

        Ok(table)
    }

    /// Add a row to the table, keyed by its position
    ///
    /// If the position is already taken as a key (after [`Table::with_index`]
    /// or [`Table::set_index_column`]) the row gets the next free integer key.
    /// Short rows are padded with nulls and long rows truncated so that every
    /// row holds one cell per column.
    pub fn add_row(&mut self, mut cells: Vec<CellValue>, source_line: usize) {
        cells.resize(self.columns.len(), CellValue::Null);
        let idx = self.rows.len();
        let mut key = RowKey::from(idx);
        while let RowKey::Int(n) = key {
            if !self.row_index.contains_key(&key) {
                break;
            }
            key = RowKey::Int(n + 1);
        }
        self.row_index.insert(key.clone(), idx);
        self.rows.push(Row {
            cells,
            key,
            source_line,
        });
    }

    /// Replace the index with explicit row keys
    pub fn with_index<K: Into<RowKey>>(mut self, keys: impl IntoIterator<Item = K>) -> Result<Self> {
        let keys: Vec<RowKey> = keys.into_iter().map(Into::into).collect();
        if keys.len() != self.rows.len() {
            return Err(QaError::invalid(format!(
                "index has {} keys but table has {} rows",
                keys.len(),
                self.rows.len()
            )));
        }
        self.reindex(keys)?;
        Ok(self)
    }

    /// Promote a column to the index, removing it from the columns
    pub fn set_index_column(&mut self, name: &str) -> Result<()> {
        let col_idx = self.require_column(name)?;

        let keys = self
            .rows
            .iter()
            .map(|row| {
                RowKey::from_cell(&row.cells[col_idx]).ok_or_else(|| {
                    QaError::invalid(format!(
                        "column '{}' cannot label row {} (line {}): value is {}",
                        name,
                        row.key,
                        row.source_line,
                        row.cells[col_idx].cell_type()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        self.reindex(keys)?;

        self.columns.remove(col_idx);
        for (i, col) in self.columns.iter_mut().enumerate() {
            col.index = i;
        }
        for row in &mut self.rows {
            row.cells.remove(col_idx);
        }
        Ok(())
    }

    fn reindex(&mut self, keys: Vec<RowKey>) -> Result<()> {
        let mut index = FxHashMap::default();
        for (idx, key) in keys.iter().enumerate() {
            if index.insert(key.clone(), idx).is_some() {
                return Err(QaError::invalid(format!("duplicate row key '{}'", key)));
            }
        }
        for (row, key) in self.rows.iter_mut().zip(keys) {
            row.key = key;
        }
        self.row_index = index;
        Ok(())
    }

    /// Name of the geometry column
    pub fn geometry_column(&self) -> &str {
        &self.geometry_column
    }

    /// Designate the geometry column
    pub fn set_geometry_column(&mut self, name: impl Into<String>) {
        self.geometry_column = name.into();
    }

    /// Builder form of [`Table::set_geometry_column`]
    pub fn with_geometry_column(mut self, name: impl Into<String>) -> Self {
        self.set_geometry_column(name);
        self
    }

    /// Column definitions in table order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Rows in index order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Row keys in index order
    pub fn index(&self) -> impl Iterator<Item = &RowKey> {
        self.rows.iter().map(|row| &row.key)
    }

    /// Column names in table order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Get column index by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Get column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column index by name, or a lookup error
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| QaError::ColumnNotFound(name.to_string()))
    }

    /// Look up a row by key
    pub fn row(&self, key: &RowKey) -> Result<&Row> {
        self.row_index
            .get(key)
            .map(|&idx| &self.rows[idx])
            .ok_or_else(|| QaError::RowNotFound(key.to_string()))
    }

    /// The cell at `(column, row)`
    pub fn get(&self, column: &str, row: &RowKey) -> Result<&CellValue> {
        let col_idx = self.require_column(column)?;
        Ok(&self.row(row)?.cells[col_idx])
    }

    /// All values of a column in index order
    pub fn column_values(&self, name: &str) -> Result<impl Iterator<Item = &CellValue>> {
        let col_idx = self.require_column(name)?;
        Ok(self.rows.iter().map(move |row| &row.cells[col_idx]))
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Infer column types from data
    pub fn infer_column_types(&mut self) {
        for (col_idx, col) in self.columns.iter_mut().enumerate() {
            col.inferred_type = self
                .rows
                .iter()
                .filter_map(|row| row.get(col_idx))
                .fold(CellType::Null, |acc, cell| acc.widen(cell.cell_type()));
        }
    }
}
