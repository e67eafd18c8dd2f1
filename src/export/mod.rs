//! Workbook export: turn a [`Table`] into downloadable xlsx bytes.
//!
//! The consolidated sheet is written with its cells typed (numbers stay
//! numbers, empty cells stay blank) so the download opens cleanly in Excel.

use std::path::Path;

use rust_xlsxwriter::Workbook;

use crate::error::ExportResult;
use crate::model::{CellValue, Table};

/// Worksheet name in the exported workbook.
pub const SHEET_NAME: &str = "Processed_Data";

/// Filename offered when the workbook is downloaded.
pub const DOWNLOAD_FILENAME: &str = "processed_data.xlsx";

/// Serialize a table to xlsx bytes.
pub fn export_bytes(table: &Table) -> ExportResult<Vec<u8>> {
    let mut workbook = build_workbook(table)?;
    Ok(workbook.save_to_buffer()?)
}

/// Write a table to an xlsx file on disk.
pub fn export_path<P: AsRef<Path>>(table: &Table, path: P) -> ExportResult<()> {
    let mut workbook = build_workbook(table)?;
    workbook.save(path.as_ref())?;
    Ok(())
}

fn build_workbook(table: &Table) -> ExportResult<Workbook> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, name) in table.columns().iter().enumerate() {
        worksheet.write_string(0, col as u16, name)?;
    }

    for (i, row) in table.rows().iter().enumerate() {
        let row_idx = (i + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col_idx = col as u16;
            match cell {
                CellValue::Empty => {}
                CellValue::Bool(v) => {
                    worksheet.write_boolean(row_idx, col_idx, *v)?;
                }
                CellValue::Number(v) => {
                    worksheet.write_number(row_idx, col_idx, *v)?;
                }
                CellValue::Text(v) => {
                    worksheet.write_string(row_idx, col_idx, v)?;
                }
            }
        }
    }

    Ok(workbook)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{load_bytes, SourceFormat};

    fn sample_table() -> Table {
        let mut table = Table::new(vec![
            "Composition".into(),
            "UTS".into(),
            "Strain (%)".into(),
        ]);
        table.push_row(vec![
            CellValue::Text("A".into()),
            CellValue::Empty,
            CellValue::Text("0.5,0.7".into()),
        ]);
        table.push_row(vec![
            CellValue::Text("B".into()),
            CellValue::Empty,
            CellValue::Number(0.3),
        ]);
        table
    }

    #[test]
    fn test_export_roundtrips_through_loader() {
        let bytes = export_bytes(&sample_table()).unwrap();

        let loaded = load_bytes(&bytes).unwrap();
        assert_eq!(loaded.format, SourceFormat::Xlsx);
        assert_eq!(
            loaded.table.columns(),
            &["Composition", "UTS", "Strain (%)"]
        );
        assert_eq!(loaded.table.rows()[0][1], CellValue::Empty);
        assert_eq!(loaded.table.rows()[0][2], CellValue::Text("0.5,0.7".into()));
        assert_eq!(loaded.table.rows()[1][2], CellValue::Number(0.3));
    }

    #[test]
    fn test_export_names_the_sheet() {
        use calamine::Reader;

        let bytes = export_bytes(&sample_table()).unwrap();
        let workbook =
            calamine::Xlsx::new(std::io::Cursor::new(bytes.as_slice())).unwrap();
        assert_eq!(workbook.sheet_names(), vec![SHEET_NAME.to_string()]);
    }

    #[test]
    fn test_export_path_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed_data.xlsx");

        export_path(&sample_table(), &path).unwrap();

        let loaded = crate::loader::load_path(&path).unwrap();
        assert_eq!(loaded.table.row_count(), 2);
    }

    #[test]
    fn test_header_only_table_exports() {
        let table = Table::new(vec!["Composition".into(), "Time".into()]);
        let bytes = export_bytes(&table).unwrap();

        let loaded = load_bytes(&bytes).unwrap();
        assert_eq!(loaded.table.row_count(), 0);
        assert_eq!(loaded.table.columns(), &["Composition", "Time"]);
    }
}
