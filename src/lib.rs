//! # creepmerge - Creep-test spreadsheet consolidation
//!
//! creepmerge ingests tabular creep-test exports (xlsx or delimited text),
//! folds every measurement row taken under the same test condition into a
//! single row, and writes the consolidated sheet as a downloadable workbook.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌───────────────┐     ┌──────────────┐
//! │ Spreadsheet  │────▶│   Loader    │────▶│ Consolidator  │────▶│   Workbook   │
//! │ (xlsx / csv) │     │ (auto-enc)  │     │ (group+merge) │     │ (xlsx bytes) │
//! └──────────────┘     └─────────────┘     └───────────────┘     └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use creepmerge::process_path;
//! use std::path::Path;
//!
//! let summary = process_path(
//!     Path::new("readings.xlsx"),
//!     Path::new("processed_data.xlsx"),
//! )?;
//! println!("{} test conditions", summary.group_count);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`model`] - Table and cell value model
//! - [`loader`] - Spreadsheet ingestion with auto-detection
//! - [`transform`] - Plan, consolidator, and pipeline
//! - [`export`] - xlsx workbook export
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod model;

// Ingestion
pub mod loader;

// Consolidation
pub mod transform;

// Export
pub mod export;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ConsolidateError, ExportError, LoadError, PipelineError, ServerError};

// =============================================================================
// Re-exports - Model
// =============================================================================

pub use model::{CellValue, Table};

// =============================================================================
// Re-exports - Loader
// =============================================================================

pub use loader::{
    decode_content,
    detect_delimiter,
    detect_encoding,
    load_bytes,
    load_path,
    LoadedTable,
    SourceFormat,
};

// =============================================================================
// Re-exports - Consolidator
// =============================================================================

pub use transform::consolidator::{consolidate, missing_columns, GroupKey};

// =============================================================================
// Re-exports - Plan
// =============================================================================

pub use transform::plan::{
    ColumnRole,
    ConsolidationPlan,
    MergeStrategy,
    MergedColumn,
    GROUPING_COLUMNS,
    MERGED_COLUMNS,
    OUTPUT_COLUMNS,
    PLACEHOLDER_COLUMN,
};

// =============================================================================
// Re-exports - Export
// =============================================================================

pub use export::{export_bytes, export_path, DOWNLOAD_FILENAME, SHEET_NAME};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    inspect_bytes,
    inspect_path,
    process_bytes,
    process_path,
    ProcessOutput,
    ProcessSummary,
};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, InspectResponse};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
