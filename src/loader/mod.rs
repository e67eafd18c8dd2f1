//! Spreadsheet ingestion with format, encoding and delimiter auto-detection.
//!
//! Uploads arrive as raw bytes. Files starting with the ZIP magic are read
//! as xlsx workbooks (first worksheet); everything else is treated as
//! delimited text, with the encoding detected via chardet and the delimiter
//! chosen by counting candidates in the header line.
//!
//! Either way the result is a typed [`Table`]: row 1 becomes the (trimmed)
//! column names, blank rows are dropped, and each cell is typed as empty,
//! boolean, number or text.

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, Xlsx};

use crate::error::{LoadError, LoadResult};
use crate::model::{CellValue, Table};

/// ZIP local-file-header magic; xlsx workbooks are ZIP containers.
pub const XLSX_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Detected container format of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Office Open XML workbook.
    Xlsx,
    /// Delimited text (CSV and friends).
    Delimited,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Delimited => "delimited",
        }
    }
}

/// A loaded table plus what was detected while reading it.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: Table,
    pub format: SourceFormat,
    /// Detected text encoding; only set for delimited input.
    pub encoding: Option<String>,
    /// Detected field delimiter; only set for delimited input.
    pub delimiter: Option<char>,
}

/// Load a table from raw upload bytes.
pub fn load_bytes(bytes: &[u8]) -> LoadResult<LoadedTable> {
    if bytes.is_empty() {
        return Err(LoadError::EmptyFile);
    }
    if bytes.starts_with(&XLSX_MAGIC) {
        load_xlsx(bytes)
    } else {
        load_delimited(bytes)
    }
}

/// Load a table from a file on disk.
pub fn load_path<P: AsRef<Path>>(path: P) -> LoadResult<LoadedTable> {
    let bytes = std::fs::read(path.as_ref())?;
    load_bytes(&bytes)
}

// =============================================================================
// xlsx
// =============================================================================

fn load_xlsx(bytes: &[u8]) -> LoadResult<LoadedTable> {
    let mut workbook = Xlsx::new(Cursor::new(bytes))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(LoadError::NoSheets)?;
    let range = workbook.worksheet_range(&sheet)?;

    let mut rows = range.rows();
    let header = rows.next().ok_or(LoadError::NoHeaders)?;
    let columns: Vec<String> = header.iter().map(header_name).collect();
    if columns.iter().all(|c| c.is_empty()) {
        return Err(LoadError::NoHeaders);
    }

    let mut table = Table::new(columns);
    for row in rows {
        let cells: Vec<CellValue> = row.iter().map(convert_cell).collect();
        if cells.iter().all(CellValue::is_empty) {
            continue;
        }
        table.push_row(cells);
    }

    Ok(LoadedTable {
        table,
        format: SourceFormat::Xlsx,
        encoding: None,
        delimiter: None,
    })
}

/// Map a calamine cell onto our value model.
fn convert_cell(value: &Data) -> CellValue {
    match value {
        Data::Empty => CellValue::Empty,
        Data::Bool(v) => CellValue::Bool(*v),
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Float(v) => CellValue::Number(*v),
        Data::String(v) => CellValue::from_text(v),
        // Serial date; kept numeric so it can key a group.
        Data::DateTime(v) => CellValue::Number(v.as_f64()),
        Data::DateTimeIso(v) => CellValue::from_text(v),
        Data::DurationIso(v) => CellValue::from_text(v),
        // Formula errors carry no usable value.
        Data::Error(_) => CellValue::Empty,
    }
}

fn header_name(cell: &Data) -> String {
    convert_cell(cell).to_string()
}

// =============================================================================
// Delimited text
// =============================================================================

fn load_delimited(bytes: &[u8]) -> LoadResult<LoadedTable> {
    let encoding = detect_encoding(bytes);
    let decoded = decode_content(bytes, &encoding);
    // Excel exports often carry a BOM that would pollute the first header.
    let content = decoded.trim_start_matches('\u{feff}');
    let delimiter = detect_delimiter(content);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record?,
        None => return Err(LoadError::NoHeaders),
    };
    let columns: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();
    if columns.iter().all(|c| c.is_empty()) {
        return Err(LoadError::NoHeaders);
    }

    let mut table = Table::new(columns);
    for record in records {
        let record = record?;
        let cells: Vec<CellValue> = record.iter().map(CellValue::parse).collect();
        if cells.iter().all(CellValue::is_empty) {
            continue;
        }
        table.push_row(cells);
    }

    Ok(LoadedTable {
        table,
        format: SourceFormat::Delimited,
        encoding: Some(encoding),
        delimiter: Some(delimiter),
    })
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
///
/// Unknown encodings fall back to lossy UTF-8 so a stray byte never sinks
/// a whole upload.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8_lossy(bytes).to_string(),
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.to_string(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.to_string(),
        _ => String::from_utf8_lossy(bytes).to_string(),
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ';';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "TAB",
        '|' => "|",
        _ => "?",
    }
}
