//! High-level pipeline API: load, consolidate, export in one call.
//!
//! # Example
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
//! Every entry point runs the same three stages and reports progress on
//! the shared log broadcaster. Nothing is written on failure: an error in
//! any stage aborts before output exists.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::api::logs::{log_info, log_success, log_warning};
use crate::error::PipelineResult;
use crate::export;
use crate::loader::{self, format_delimiter, LoadedTable};
use crate::model::Table;

use super::consolidator::consolidate;
use super::plan::ConsolidationPlan;

/// What a processing run reports besides the workbook itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSummary {
    /// Detected container format ("xlsx" or "delimited").
    pub format: String,
    /// Detected text encoding, for delimited input.
    pub encoding: Option<String>,
    /// Detected field delimiter, for delimited input.
    pub delimiter: Option<char>,
    /// Data rows in the input (header not counted).
    pub input_rows: usize,
    /// Input column names, as read.
    pub input_columns: Vec<String>,
    /// Distinct test conditions found.
    pub group_count: usize,
    /// Output column names, in sheet order.
    pub output_columns: Vec<String>,
}

/// Result of a full processing run: the workbook plus its summary.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Consolidated workbook, ready for download.
    pub workbook: Vec<u8>,
    pub summary: ProcessSummary,
}

/// Consolidate an uploaded spreadsheet and serialize the result.
pub fn process_bytes(bytes: &[u8]) -> PipelineResult<ProcessOutput> {
    let loaded = load_stage(bytes)?;
    let (derived, summary) = consolidate_stage(loaded)?;

    log_info("export", "📦 Writing consolidated workbook...");
    let workbook = export::export_bytes(&derived)?;
    log_success("export", format!("Workbook ready ({} bytes)", workbook.len()));

    Ok(ProcessOutput { workbook, summary })
}

/// Dry run: consolidate without serializing a workbook.
pub fn inspect_bytes(bytes: &[u8]) -> PipelineResult<ProcessSummary> {
    let loaded = load_stage(bytes)?;
    let (_derived, summary) = consolidate_stage(loaded)?;
    Ok(summary)
}

/// Consolidate a spreadsheet file and write the result next to it.
pub fn process_path(input: &Path, output: &Path) -> PipelineResult<ProcessSummary> {
    log_info("load", format!("📖 Reading {}...", input.display()));
    let loaded = loader::load_path(input)?;
    log_loaded(&loaded);

    let (derived, summary) = consolidate_stage(loaded)?;

    log_info("export", "📦 Writing consolidated workbook...");
    export::export_path(&derived, output)?;
    log_success("export", format!("Saved to {}", output.display()));

    Ok(summary)
}

/// Dry run on a file: consolidate without writing anything.
pub fn inspect_path(input: &Path) -> PipelineResult<ProcessSummary> {
    log_info("load", format!("📖 Reading {}...", input.display()));
    let loaded = loader::load_path(input)?;
    log_loaded(&loaded);

    let (_derived, summary) = consolidate_stage(loaded)?;
    Ok(summary)
}

fn load_stage(bytes: &[u8]) -> PipelineResult<LoadedTable> {
    log_info("load", "📖 Reading uploaded spreadsheet...");
    let loaded = loader::load_bytes(bytes)?;
    log_loaded(&loaded);
    Ok(loaded)
}

fn log_loaded(loaded: &LoadedTable) {
    log_success("load", format!("Detected format: {}", loaded.format.as_str()));
    if let Some(ref encoding) = loaded.encoding {
        log_success("load", format!("Detected encoding: {}", encoding));
    }
    if let Some(delimiter) = loaded.delimiter {
        log_success(
            "load",
            format!("Detected separator: '{}'", format_delimiter(delimiter)),
        );
    }
    log_success(
        "load",
        format!(
            "Read {} rows, {} columns",
            loaded.table.row_count(),
            loaded.table.column_count()
        ),
    );

    log_info(
        "load",
        format!("📋 Input has {} columns:", loaded.table.column_count()),
    );
    for (i, col) in loaded.table.columns().iter().enumerate() {
        log_info("load", format!("[{:2}] {}", i + 1, col));
    }
}

fn consolidate_stage(loaded: LoadedTable) -> PipelineResult<(Table, ProcessSummary)> {
    let plan = ConsolidationPlan::creep_test();

    log_info(
        "consolidate",
        format!("🔎 Grouping by {}...", plan.grouping.join(", ")),
    );
    if loaded.table.is_empty() {
        log_warning("consolidate", "No data rows; output will be empty");
    }

    let derived = consolidate(&loaded.table, &plan)?;
    log_success(
        "consolidate",
        format!("{} test conditions", derived.row_count()),
    );

    let summary = ProcessSummary {
        format: loaded.format.as_str().to_string(),
        encoding: loaded.encoding,
        delimiter: loaded.delimiter,
        input_rows: loaded.table.row_count(),
        input_columns: loaded.table.columns().to_vec(),
        group_count: derived.row_count(),
        output_columns: derived.columns().to_vec(),
    };

    Ok((derived, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConsolidateError, LoadError, PipelineError};
    use crate::loader::load_bytes;
    use crate::model::CellValue;
    use crate::transform::plan::OUTPUT_COLUMNS;

    const READINGS: &[u8] = b"Composition,Temperature,Orientation,Stress (MPa),Test duration,Strain (%),Time\n\
A,650,L,120,1000h,0.5,0\n\
A,650,L,120,1000h,0.7,1\n\
B,650,L,120,1000h,0.3,0\n";

    #[test]
    fn test_process_bytes_end_to_end() {
        let output = process_bytes(READINGS).unwrap();

        assert_eq!(output.summary.input_rows, 3);
        assert_eq!(output.summary.group_count, 2);
        assert_eq!(output.summary.output_columns, OUTPUT_COLUMNS);

        // The workbook holds the consolidated sheet.
        let loaded = load_bytes(&output.workbook).unwrap();
        assert_eq!(loaded.table.columns(), OUTPUT_COLUMNS);
        assert_eq!(loaded.table.row_count(), 2);

        let first = &loaded.table.rows()[0];
        assert_eq!(first[0], CellValue::Text("A".into()));
        assert_eq!(first[4], CellValue::Empty); // UTS
        assert_eq!(first[6], CellValue::Text("0.5,0.7".into()));
        assert_eq!(first[7], CellValue::Text("0,1".into()));
    }

    #[test]
    fn test_inspect_reports_without_exporting() {
        let summary = inspect_bytes(READINGS).unwrap();
        assert_eq!(summary.format, "delimited");
        assert_eq!(summary.delimiter, Some(','));
        assert_eq!(summary.input_columns.len(), 7);
        assert_eq!(summary.group_count, 2);
    }

    #[test]
    fn test_missing_columns_abort_the_run() {
        let bytes = b"Composition,Temperature\nA,650\n";
        let err = process_bytes(bytes).unwrap_err();
        match err {
            PipelineError::Consolidate(ConsolidateError::MissingColumns {
                grouping,
                aggregation,
            }) => {
                assert_eq!(
                    grouping,
                    vec!["Orientation", "Stress (MPa)", "Test duration"]
                );
                assert_eq!(aggregation, vec!["Strain (%)", "Time"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_upload_is_a_load_error() {
        let err = process_bytes(b"").unwrap_err();
        assert!(matches!(err, PipelineError::Load(LoadError::EmptyFile)));
    }

    #[test]
    fn test_process_path_writes_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("readings.csv");
        let output = dir.path().join("processed_data.xlsx");
        std::fs::write(&input, READINGS).unwrap();

        let summary = process_path(&input, &output).unwrap();
        assert_eq!(summary.group_count, 2);

        let loaded = crate::loader::load_path(&output).unwrap();
        assert_eq!(loaded.table.row_count(), 2);
    }
}
