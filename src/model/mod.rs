//! In-memory table model shared by the loader, consolidator and exporter.
//!
//! A [`Table`] is a rectangular grid: an ordered list of column names plus
//! rows of [`CellValue`]s, one value per column. Cell values are typed the
//! way spreadsheets type them (empty, boolean, number, text), and compare
//! by value so they can key group membership.

use std::fmt;
use std::hash::{Hash, Hasher};

// =============================================================================
// Cell Values
// =============================================================================

/// A single spreadsheet cell.
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Blank cell, or a cell containing only whitespace.
    Empty,
    /// Boolean cell.
    Bool(bool),
    /// Numeric cell. Integers, floats and serial dates all land here.
    Number(f64),
    /// Text cell, stored with surrounding whitespace removed.
    Text(String),
}

impl CellValue {
    /// Parse a raw delimited-text field into a typed cell.
    ///
    /// Whitespace-only fields become [`CellValue::Empty`], fields that parse
    /// as a finite number become [`CellValue::Number`], everything else is
    /// kept as trimmed text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Self::Number(n),
            _ => Self::Text(trimmed.to_string()),
        }
    }

    /// Build a text cell, mapping whitespace-only input to [`CellValue::Empty`].
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self::Empty
        } else {
            Self::Text(trimmed.to_string())
        }
    }

    /// True for [`CellValue::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Bits used for equality and hashing of numeric cells.
///
/// `-0.0` is folded into `0.0` so both hash to the same group; every other
/// bit pattern (NaN included) keys by its exact bits.
fn canonical_bits(n: f64) -> u64 {
    if n == 0.0 {
        0
    } else {
        n.to_bits()
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Empty, Self::Empty) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => canonical_bits(*a) == canonical_bits(*b),
            (Self::Text(a), Self::Text(b)) => a == b,
            // No cross-type coercion: Number(2.0) and Text("2") stay distinct.
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Empty => {}
            Self::Bool(b) => b.hash(state),
            Self::Number(n) => canonical_bits(*n).hash(state),
            Self::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for CellValue {
    /// Stable textual form used when cell values are merged into strings.
    ///
    /// Integral numbers render without a decimal point (`20`, not `20.0`)
    /// and never in scientific notation; empty cells render as "".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) => {
                if *n == 0.0 {
                    // Normalizes "-0" to "0".
                    f.write_str("0")
                } else {
                    write!(f, "{}", n)
                }
            }
            Self::Text(s) => f.write_str(s),
        }
    }
}

// =============================================================================
// Tables
// =============================================================================

/// A rectangular table: ordered column names plus rows of cells.
///
/// Column names are trimmed on construction, and every row is padded or
/// truncated to the column count, so lookups and row access never have to
/// deal with ragged data.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Create an empty table with the given column names (trimmed).
    pub fn new(columns: Vec<String>) -> Self {
        let columns = columns.into_iter().map(|c| c.trim().to_string()).collect();
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Column names, in sheet order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of a column by (trimmed) name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let needle = name.trim();
        self.columns.iter().position(|c| c == needle)
    }

    /// Append a row, padding short rows with empty cells and truncating
    /// rows longer than the header.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
    }

    /// All rows, in insertion order.
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Number of data rows (header not counted).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when the table holds no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
