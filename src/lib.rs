//! dataqa - Data quality checks for tabular data
//!
//! Compares column names against a standard vocabulary, sums columns, takes
//! positional differences of values and totals between two tables, and flags
//! missing or empty geometries in geospatial tables.

pub mod compare;
pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod parser;

pub use config::Config;
pub use error::{ErrorKind, QaError};
pub use model::Table;
