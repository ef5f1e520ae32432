// Dictionary adapters: read abbreviation/full-form pairs from workbooks,
// delimited text, JSON objects or TOML tables into an `AbbreviationDictionary`.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::dictionary::{AbbreviationDictionary, InsertOutcome};

const ABBREVIATION_HEADER: &str = "abbreviation";
const FULL_FORM_HEADER: &str = "full form";

/// Errors raised at the dictionary I/O boundary
#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("Dictionary file not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported dictionary format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    #[error("Workbook has no worksheets: {0}")]
    NoWorksheet(String),

    #[error("Failed to read worksheet {sheet}: {message}")]
    Sheet { sheet: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Dictionary needs an abbreviation and a full form column: {0}")]
    MissingColumns(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Row accounting for one dictionary load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub loaded: usize,
    /// Rows with a missing or empty abbreviation or full form
    pub skipped: usize,
    /// Rows whose key repeated an earlier row; the later row won
    pub duplicates: usize,
}

/// Supported dictionary source formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictionaryFormat {
    Workbook,
    Csv,
    Tsv,
    Json,
    Toml,
}

impl DictionaryFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Some(Self::Workbook),
            "csv" => Some(Self::Csv),
            "tsv" => Some(Self::Tsv),
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// Load a dictionary, choosing the adapter by file extension
pub fn load_dictionary(
    path: &Path,
) -> Result<(AbbreviationDictionary, LoadReport), DictionaryError> {
    let source = path.display().to_string();
    if !path.exists() {
        return Err(DictionaryError::FileNotFound(source));
    }
    let format = DictionaryFormat::from_path(path)
        .ok_or_else(|| DictionaryError::UnsupportedFormat(source.clone()))?;

    let (dictionary, report) = match format {
        DictionaryFormat::Workbook => load_workbook(path)?,
        DictionaryFormat::Csv => load_delimited(path, b',')?,
        DictionaryFormat::Tsv => load_delimited(path, b'\t')?,
        DictionaryFormat::Json => parse_json(&std::fs::read_to_string(path)?)?,
        DictionaryFormat::Toml => parse_toml(&std::fs::read_to_string(path)?)?,
    };

    info!(
        "Loaded dictionary {}: {} entries ({} rows skipped, {} duplicates)",
        source, report.loaded, report.skipped, report.duplicates
    );
    Ok((dictionary, report))
}

fn load_workbook(path: &Path) -> Result<(AbbreviationDictionary, LoadReport), DictionaryError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| DictionaryError::WorkbookOpen(format!("{}: {}", path.display(), e)))?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| DictionaryError::NoWorksheet(path.display().to_string()))?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| DictionaryError::Sheet {
            sheet: sheet.clone(),
            message: e.to_string(),
        })?;

    debug!(sheet = %sheet, rows = range.height(), "Reading dictionary worksheet");
    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();
    rows_to_dictionary(rows, path)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{:.0}", f)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

fn load_delimited(
    path: &Path,
    delimiter: u8,
) -> Result<(AbbreviationDictionary, LoadReport), DictionaryError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    rows_to_dictionary(rows, path)
}

/// Parse a flat JSON object of abbreviation to full form
pub fn parse_json(content: &str) -> Result<(AbbreviationDictionary, LoadReport), DictionaryError> {
    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(content)?;
    Ok(collect_pairs(
        object.iter().map(|(key, value)| (key.as_str(), value.as_str())),
    ))
}

/// Parse a flat TOML table, or the `[abbreviations]` table when present
pub fn parse_toml(content: &str) -> Result<(AbbreviationDictionary, LoadReport), DictionaryError> {
    let table: toml::Table = content.parse()?;
    let entries = match table.get("abbreviations").and_then(toml::Value::as_table) {
        Some(nested) => nested,
        None => &table,
    };
    Ok(collect_pairs(
        entries.iter().map(|(key, value)| (key.as_str(), value.as_str())),
    ))
}

/// Build a dictionary from tabular rows.
///
/// The first non-empty row is a header when it names both an "Abbreviation"
/// and a "Full Form" column; otherwise every row is data in the first two columns.
pub fn rows_to_dictionary(
    rows: Vec<Vec<String>>,
    source: &Path,
) -> Result<(AbbreviationDictionary, LoadReport), DictionaryError> {
    let first = rows
        .iter()
        .position(|row| row.iter().any(|cell| !cell.trim().is_empty()));
    let Some(first) = first else {
        return Ok((AbbreviationDictionary::new(), LoadReport::default()));
    };

    let header = &rows[first];
    let column = |title: &str| {
        header
            .iter()
            .position(|cell| cell.trim().eq_ignore_ascii_case(title))
    };

    let (key_column, value_column, data_start) =
        match (column(ABBREVIATION_HEADER), column(FULL_FORM_HEADER)) {
            (Some(key), Some(value)) => (key, value, first + 1),
            _ => {
                if rows.iter().all(|row| row.len() < 2) {
                    return Err(DictionaryError::MissingColumns(source.display().to_string()));
                }
                (0, 1, first)
            }
        };

    Ok(collect_pairs(rows[data_start..].iter().map(|row| {
        (
            row.get(key_column).map_or("", String::as_str),
            row.get(value_column).map(String::as_str),
        )
    })))
}

fn collect_pairs<'a, I>(pairs: I) -> (AbbreviationDictionary, LoadReport)
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    let mut dictionary = AbbreviationDictionary::new();
    let mut report = LoadReport::default();

    for (key, value) in pairs {
        match dictionary.insert(key, value.unwrap_or("")) {
            InsertOutcome::Inserted => report.loaded += 1,
            InsertOutcome::Replaced => report.duplicates += 1,
            InsertOutcome::Skipped => report.skipped += 1,
        }
    }

    (dictionary, report)
}
