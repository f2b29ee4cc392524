//! dataqa - Data quality checks for tabular data

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use dataqa::compare::{
    compare_column_names, compare_column_sums, compare_column_values, geometry_health,
    sum_column_values, Selection,
};
use dataqa::config::{Config, OutputFormat};
use dataqa::model::{RowKey, Table};
use dataqa::output::{render_to_stdout, Report};
use dataqa::parser::ParserFactory;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Terminal,
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Terminal => OutputFormat::Terminal,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Data quality checks for tabular and geospatial data
#[derive(Parser, Debug)]
#[command(name = "dataqa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal", global = true)]
    format: CliOutputFormat,

    /// Column to use as the row index instead of row positions
    #[arg(long, global = true)]
    index_column: Option<String>,

    /// Column holding geometries
    #[arg(long, default_value = "geometry", global = true)]
    geometry_column: String,

    /// For Excel files: which sheet to load
    #[arg(long, global = true)]
    sheet: Option<String>,

    /// Log progress to stderr (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split a table's columns into standard and non-standard names
    Names {
        file: PathBuf,

        /// Standard column names (comma-separated)
        #[arg(short, long, value_delimiter = ',', required_unless_present = "standards_file")]
        standards: Vec<String>,

        /// File with one standard column name per line
        #[arg(long)]
        standards_file: Option<PathBuf>,
    },

    /// Sum the values of columns
    Sums {
        file: PathBuf,

        /// Columns to sum (comma-separated)
        #[arg(short, long, value_delimiter = ',', required = true)]
        columns: Vec<String>,
    },

    /// Subtract the cells of paired columns and rows
    Values {
        #[command(flatten)]
        pair: TablePair,

        /// Rows of the first table (comma-separated); defaults to all rows
        #[arg(long, value_delimiter = ',', requires = "rows2")]
        rows1: Vec<String>,

        /// Rows of the second table (comma-separated); defaults to all rows
        #[arg(long, value_delimiter = ',', requires = "rows1")]
        rows2: Vec<String>,
    },

    /// Subtract the totals of paired columns
    SumDiff {
        #[command(flatten)]
        pair: TablePair,
    },

    /// Check the geometry column for missing and empty geometries
    Geometry {
        file: PathBuf,

        /// Fraction of rows (0 to 1) allowed to be missing or empty
        #[arg(short, long, default_value_t = 0.0)]
        threshold: f64,
    },
}

#[derive(Args, Debug)]
struct TablePair {
    /// First table
    file1: PathBuf,

    /// Second table
    file2: PathBuf,

    /// Columns of the first table (comma-separated)
    #[arg(long, value_delimiter = ',', required = true)]
    columns1: Vec<String>,

    /// Columns of the second table (comma-separated)
    #[arg(long, value_delimiter = ',', required = true)]
    columns2: Vec<String>,

    /// Treat the column and row lists as sets (duplicates collapse)
    #[arg(long)]
    set: bool,
}

impl TablePair {
    fn selection<T, U>(&self, items: impl IntoIterator<Item = U>) -> Selection<T>
    where
        T: std::hash::Hash + Eq,
        U: Into<T>,
    {
        if self.set {
            Selection::set(items)
        } else {
            Selection::sequence(items)
        }
    }

    fn title(&self) -> String {
        format!("{} → {}", self.file1.display(), self.file2.display())
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(has_findings) => {
            if has_findings {
                ExitCode::from(1) // Check found discrepancies
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<bool> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::default()
        .with_geometry_column(cli.geometry_column.clone())
        .with_output_format(cli.format.into());
    if let Some(ref index) = cli.index_column {
        config = config.with_index_column(index.clone());
    }
    if let Some(ref sheet) = cli.sheet {
        config = config.with_sheet_name(sheet.clone());
    }

    let factory = ParserFactory::new();
    let (report, title) = match cli.command {
        Command::Names {
            file,
            mut standards,
            standards_file,
        } => {
            if let Some(path) = standards_file {
                standards.extend(read_standards(&path)?);
            }
            let table = load(&factory, &file, &config)?;
            let names = compare_column_names(&table, &standards);
            (Report::ColumnNames(names), file.display().to_string())
        }
        Command::Sums { file, columns } => {
            let table = load(&factory, &file, &config)?;
            let sums = sum_column_values(&table, &columns)?;
            (Report::ColumnSums(sums), file.display().to_string())
        }
        Command::Values { pair, rows1, rows2 } => {
            let table1 = load(&factory, &pair.file1, &config)?;
            let table2 = load(&factory, &pair.file2, &config)?;
            let columns1 = pair.selection(pair.columns1.iter().cloned());
            let columns2 = pair.selection(pair.columns2.iter().cloned());

            let diffs = if rows1.is_empty() && rows2.is_empty() {
                compare_column_values(&table1, &table2, &columns1, &columns2, None, None)?
            } else {
                let rows1: Selection<RowKey> = pair.selection(rows1.iter().map(|r| RowKey::parse(r)));
                let rows2: Selection<RowKey> = pair.selection(rows2.iter().map(|r| RowKey::parse(r)));
                compare_column_values(
                    &table1,
                    &table2,
                    &columns1,
                    &columns2,
                    Some(&rows1),
                    Some(&rows2),
                )?
            };
            (Report::ColumnValues(diffs), pair.title())
        }
        Command::SumDiff { pair } => {
            let table1 = load(&factory, &pair.file1, &config)?;
            let table2 = load(&factory, &pair.file2, &config)?;
            let columns1 = pair.selection(pair.columns1.iter().cloned());
            let columns2 = pair.selection(pair.columns2.iter().cloned());
            let diffs = compare_column_sums(&table1, &table2, &columns1, &columns2)?;
            (Report::SumDifferences(diffs), pair.title())
        }
        Command::Geometry { file, threshold } => {
            let config = config.clone().with_threshold(threshold);
            let table = load(&factory, &file, &config)?;
            let health = geometry_health(&table, config.threshold)?;
            (Report::Geometry(health), file.display().to_string())
        }
    };

    render_to_stdout(&report, &title, config.output_format)?;
    Ok(report.has_findings())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn load(factory: &ParserFactory, path: &Path, config: &Config) -> Result<Table> {
    factory
        .parse(path, config)
        .with_context(|| format!("Failed to parse file: {}", path.display()))
}

fn read_standards(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read standards file: {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
