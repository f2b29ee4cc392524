//! Data model for tabular data representation

mod key;
mod schema;
mod table;

pub use key::RowKey;
pub use schema::{CellType, Column};
pub use table::{CellValue, Row, Table, DEFAULT_GEOMETRY_COLUMN};
