//! Configuration handling for dataqa

use crate::compare::DEFAULT_THRESHOLD;
use crate::model::DEFAULT_GEOMETRY_COLUMN;

/// Output format for check results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "terminal" => Ok(OutputFormat::Terminal),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Configuration for loading tables and running checks
#[derive(Debug, Clone)]
pub struct Config {
    /// Column whose values become the row keys
    pub index_column: Option<String>,
    /// Column holding geometries
    pub geometry_column: String,
    /// Fraction of rows allowed to fail a geometry check
    pub threshold: f64,
    /// For Excel files: which sheet to load
    pub sheet_name: Option<String>,
    /// Output format
    pub output_format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_column: None,
            geometry_column: DEFAULT_GEOMETRY_COLUMN.to_string(),
            threshold: DEFAULT_THRESHOLD,
            sheet_name: None,
            output_format: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Set the index column
    pub fn with_index_column(mut self, column: impl Into<String>) -> Self {
        self.index_column = Some(column.into());
        self
    }

    /// Set the geometry column
    pub fn with_geometry_column(mut self, column: impl Into<String>) -> Self {
        self.geometry_column = column.into();
        self
    }

    /// Set the geometry check threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set Excel sheet name
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = Some(name.into());
        self
    }

    /// Set output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.geometry_column, "geometry");
        assert_eq!(config.threshold, 0.0);
        assert!(config.index_column.is_none());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("terminal".parse::<OutputFormat>(), Ok(OutputFormat::Terminal));
        assert!("html".parse::<OutputFormat>().is_err());
    }
}
