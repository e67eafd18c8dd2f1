//! Error types for the creepmerge pipeline.
//!
//! This module defines a hierarchy of error types following best practices:
//!
//! - [`LoadError`] - spreadsheet ingestion errors
//! - [`ConsolidateError`] - grouping/merge errors
//! - [`ExportError`] - workbook serialization errors
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Load Errors
// =============================================================================

/// Errors during spreadsheet ingestion.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to open or read an xlsx workbook.
    #[error("Failed to read workbook: {0}")]
    Workbook(#[from] calamine::XlsxError),

    /// Malformed delimited text.
    #[error("Invalid delimited data: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file.
    #[error("Uploaded file is empty")]
    EmptyFile,

    /// Workbook without a single worksheet.
    #[error("Workbook contains no worksheets")]
    NoSheets,

    /// No header row found.
    #[error("No header row found")]
    NoHeaders,
}

// =============================================================================
// Consolidation Errors
// =============================================================================

/// Errors during consolidation.
#[derive(Debug, Error)]
pub enum ConsolidateError {
    /// Required columns are absent from the input table.
    ///
    /// Both lists are collected before this error is raised, so one report
    /// names every missing grouping column and every missing merge column.
    #[error("{}", missing_columns_message(.grouping, .aggregation))]
    MissingColumns {
        /// Missing columns that identify a test condition.
        grouping: Vec<String>,
        /// Missing columns whose values get merged per group.
        aggregation: Vec<String>,
    },
}

fn missing_columns_message(grouping: &[String], aggregation: &[String]) -> String {
    let mut parts = Vec::new();
    if !grouping.is_empty() {
        parts.push(format!("grouping columns [{}]", grouping.join(", ")));
    }
    if !aggregation.is_empty() {
        parts.push(format!("aggregation columns [{}]", aggregation.join(", ")));
    }
    if parts.is_empty() {
        return "Input is missing required columns".to_string();
    }
    format!("Input is missing required {}", parts.join(" and "))
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors during workbook export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Workbook construction or serialization failed.
    #[error("Failed to write workbook: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::transform::pipeline`]
/// entry points. It wraps all lower-level errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Spreadsheet ingestion error.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Consolidation error.
    #[error("Consolidation error: {0}")]
    Consolidate(#[from] ConsolidateError),

    /// Workbook export error.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for consolidation operations.
pub type ConsolidateResult<T> = Result<T, ConsolidateError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
