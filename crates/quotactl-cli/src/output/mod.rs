//! Output formatting module
//!
//! Documents and reports are JSON by default; `--format table` renders the
//! same data through `tabled`. Files given with `-o` always receive JSON.

use anyhow::Context as _;
use serde::Serialize;
use std::fmt::Display;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tabled::{Table, Tabled};

/// Output format enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "table" => Ok(OutputFormat::Table),
            _ => Err(format!("Invalid format: {}. Use 'json' or 'table'", s)),
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Table => write!(f, "table"),
        }
    }
}

/// Write `value` as indented JSON to `path`, or to stdout when `None`
pub fn write_json_output<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
where
    T: Serialize + ?Sized,
{
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            quotactl_core::write_json(BufWriter::new(file), value)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => quotactl_core::write_json(std::io::stdout().lock(), value)?,
    }
    Ok(())
}

/// Print rows as a table
pub fn print_table<T: Tabled>(rows: &[T], empty_message: &str) {
    if rows.is_empty() {
        println!("{}", empty_message);
    } else {
        println!("{}", Table::new(rows));
    }
}

/// Emit a report: JSON to `path` (if any), then stdout in the chosen format
///
/// With `--format json` and an output file, stdout stays empty.
pub fn emit<T, R>(
    value: &T,
    rows: impl FnOnce() -> Vec<R>,
    format: OutputFormat,
    path: Option<&Path>,
    empty_message: &str,
) -> anyhow::Result<()>
where
    T: Serialize + ?Sized,
    R: Tabled,
{
    if path.is_some() {
        write_json_output(value, path)?;
    }
    match format {
        OutputFormat::Table => print_table(&rows(), empty_message),
        OutputFormat::Json if path.is_none() => write_json_output(value, None)?,
        OutputFormat::Json => {}
    }
    Ok(())
}

/// Render a limit value for table cells
pub fn display_value(value: Option<&serde_json::Value>) -> String {
    match value {
        None => "-".to_string(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Print a success message (respects quiet mode)
pub fn print_success(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", colored::Colorize::green(message));
    }
}

/// Print a warning message (respects quiet mode)
pub fn print_warning(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", colored::Colorize::yellow(message));
    }
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{}", colored::Colorize::red(message));
}
