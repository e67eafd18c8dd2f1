//! Consolidate creep-test measurement rows that share a test condition.
//!
//! Lab exports carry one row per reading. Consolidation folds every reading
//! taken under the same test condition into a single row, with the
//! measurement series inlined as comma-joined text.
//!
//! # Architecture
//!
//! ```text
//! Flat input (one row per reading)     →  Consolidated output (one row per condition)
//! ┌───────────────────────────────┐       ┌──────────────────────────────────┐
//! │ A, 650, L, 120, 1000h, 0.5, 0 │       │ A, 650, L, 120, -, 1000h,        │
//! │ A, 650, L, 120, 1000h, 0.7, 1 │  →    │   "0.5,0.7", "0,1"               │
//! │ B, 650, L, 120, 1000h, 0.3, 0 │       ├──────────────────────────────────┤
//! └───────────────────────────────┘       │ B, 650, L, 120, -, 1000h,        │
//!                                         │   "0.3", "0"                     │
//!                                         └──────────────────────────────────┘
//! ```
//!
//! # Ordering
//!
//! Output rows appear in the order their condition first appears in the
//! input, and values inside a merged series keep their original row order.
//! Consolidating the same input twice produces identical output.

use indexmap::IndexMap;

use crate::error::{ConsolidateError, ConsolidateResult};
use crate::model::{CellValue, Table};

use super::plan::{ColumnRole, ConsolidationPlan};

/// Composite key identifying one test condition: the row's values at the
/// grouping columns, in plan order. Equality and hashing cover every
/// component, so two rows land in the same group exactly when all grouping
/// values match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey(Vec<CellValue>);

impl GroupKey {
    fn from_row(row: &[CellValue], indices: &[usize]) -> Self {
        Self(indices.iter().map(|&i| row[i].clone()).collect())
    }

    /// Key components, in grouping-column order.
    pub fn values(&self) -> &[CellValue] {
        &self.0
    }
}

/// Required column names absent from `available`, in `required` order.
///
/// Both sides are whitespace-trimmed before comparison; duplicates in
/// `required` are reported once.
pub fn missing_columns<'a>(
    required: impl IntoIterator<Item = &'a str>,
    available: &[String],
) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    for name in required {
        let name = name.trim();
        let present = available.iter().any(|have| have.trim() == name);
        if !present && !missing.iter().any(|m| m == name) {
            missing.push(name.to_string());
        }
    }
    missing
}

/// Consolidate a flat measurement table into one row per test condition.
///
/// Fails up front with [`ConsolidateError::MissingColumns`] when the input
/// lacks any grouping or merge column; both lists are collected before the
/// error is raised so a single report names everything that is missing.
/// An input without data rows yields an output without data rows, but with
/// the full output header.
pub fn consolidate(table: &Table, plan: &ConsolidationPlan) -> ConsolidateResult<Table> {
    let grouping_missing =
        missing_columns(plan.grouping.iter().map(String::as_str), table.columns());
    let merged_missing = missing_columns(
        plan.merged.iter().map(|m| m.name.as_str()),
        table.columns(),
    );
    if !grouping_missing.is_empty() || !merged_missing.is_empty() {
        return Err(ConsolidateError::MissingColumns {
            grouping: grouping_missing,
            aggregation: merged_missing,
        });
    }

    // Both column sets were verified present above.
    let key_indices: Vec<usize> = plan
        .grouping
        .iter()
        .filter_map(|name| table.column_index(name))
        .collect();
    let merge_indices: Vec<usize> = plan
        .merged
        .iter()
        .filter_map(|col| table.column_index(&col.name))
        .collect();
    debug_assert_eq!(key_indices.len(), plan.grouping.len());
    debug_assert_eq!(merge_indices.len(), plan.merged.len());

    // Single pass. IndexMap keeps groups in first-appearance order; each
    // group collects one value list per merge column, in row order.
    let mut groups: IndexMap<GroupKey, Vec<Vec<CellValue>>> = IndexMap::new();
    for row in table.rows() {
        let key = GroupKey::from_row(row, &key_indices);
        let series = groups
            .entry(key)
            .or_insert_with(|| vec![Vec::new(); merge_indices.len()]);
        for (values, &column) in series.iter_mut().zip(&merge_indices) {
            values.push(row[column].clone());
        }
    }

    let mut output = Table::new(plan.output_order.clone());
    for (key, series) in &groups {
        let row = plan
            .output_order
            .iter()
            .map(|column| match plan.role_of(column) {
                ColumnRole::Grouping(i) => key.values()[i].clone(),
                ColumnRole::Merged(i) => plan.merged[i].strategy.merge(&series[i]),
                ColumnRole::Placeholder => CellValue::Empty,
            })
            .collect();
        output.push_row(row);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::plan::OUTPUT_COLUMNS;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.into())
    }

    fn num(n: f64) -> CellValue {
        CellValue::Number(n)
    }

    fn creep_columns() -> Vec<String> {
        vec![
            "Composition".into(),
            "Temperature".into(),
            "Orientation".into(),
            "Stress (MPa)".into(),
            "Test duration".into(),
            "Strain (%)".into(),
            "Time".into(),
        ]
    }

    fn reading(
        comp: &str,
        temp: f64,
        orient: &str,
        stress: f64,
        duration: &str,
        strain: f64,
        time: f64,
    ) -> Vec<CellValue> {
        vec![
            text(comp),
            num(temp),
            text(orient),
            num(stress),
            text(duration),
            num(strain),
            num(time),
        ]
    }

    #[test]
    fn test_merges_readings_per_condition() {
        let mut table = Table::new(creep_columns());
        table.push_row(reading("A", 650.0, "L", 120.0, "1000h", 0.5, 0.0));
        table.push_row(reading("A", 650.0, "L", 120.0, "1000h", 0.7, 1.0));
        table.push_row(reading("B", 650.0, "L", 120.0, "1000h", 0.3, 0.0));

        let output = consolidate(&table, &ConsolidationPlan::creep_test()).unwrap();

        assert_eq!(output.columns(), OUTPUT_COLUMNS);
        assert_eq!(output.row_count(), 2);

        let first = &output.rows()[0];
        assert_eq!(first[0], text("A"));
        assert_eq!(first[1], num(650.0));
        assert_eq!(first[2], text("L"));
        assert_eq!(first[3], num(120.0));
        assert_eq!(first[4], CellValue::Empty); // UTS
        assert_eq!(first[5], text("1000h"));
        assert_eq!(first[6], text("0.5,0.7"));
        assert_eq!(first[7], text("0,1"));

        let second = &output.rows()[1];
        assert_eq!(second[0], text("B"));
        assert_eq!(second[6], text("0.3"));
        assert_eq!(second[7], text("0"));
    }

    #[test]
    fn test_one_output_row_per_distinct_condition() {
        let mut table = Table::new(creep_columns());
        for temp in [600.0, 650.0] {
            for strain in [0.1, 0.2, 0.3] {
                table.push_row(reading("A", temp, "L", 100.0, "500h", strain, 1.0));
            }
        }

        let output = consolidate(&table, &ConsolidationPlan::creep_test()).unwrap();
        assert_eq!(output.row_count(), 2);
    }

    #[test]
    fn test_groups_keep_first_appearance_order() {
        let mut table = Table::new(creep_columns());
        table.push_row(reading("B", 650.0, "L", 120.0, "1000h", 0.1, 0.0));
        table.push_row(reading("A", 650.0, "L", 120.0, "1000h", 0.2, 0.0));
        table.push_row(reading("B", 650.0, "L", 120.0, "1000h", 0.3, 1.0));
        table.push_row(reading("C", 650.0, "L", 120.0, "1000h", 0.4, 0.0));

        let output = consolidate(&table, &ConsolidationPlan::creep_test()).unwrap();

        let order: Vec<_> = output.rows().iter().map(|r| r[0].clone()).collect();
        assert_eq!(order, vec![text("B"), text("A"), text("C")]);
        // Interleaved rows still merge in row order.
        assert_eq!(output.rows()[0][6], text("0.1,0.3"));
        assert_eq!(output.rows()[0][7], text("0,1"));
    }

    #[test]
    fn test_input_column_order_does_not_matter() {
        // Same readings, columns shuffled.
        let mut table = Table::new(vec![
            "Time".into(),
            "Strain (%)".into(),
            "Composition".into(),
            "Test duration".into(),
            "Orientation".into(),
            "Stress (MPa)".into(),
            "Temperature".into(),
        ]);
        table.push_row(vec![
            num(0.0),
            num(0.5),
            text("A"),
            text("1000h"),
            text("L"),
            num(120.0),
            num(650.0),
        ]);
        table.push_row(vec![
            num(1.0),
            num(0.7),
            text("A"),
            text("1000h"),
            text("L"),
            num(120.0),
            num(650.0),
        ]);

        let output = consolidate(&table, &ConsolidationPlan::creep_test()).unwrap();
        assert_eq!(output.columns(), OUTPUT_COLUMNS);
        assert_eq!(output.rows()[0][0], text("A"));
        assert_eq!(output.rows()[0][6], text("0.5,0.7"));
        assert_eq!(output.rows()[0][7], text("0,1"));
    }

    #[test]
    fn test_missing_columns_reported_together() {
        // No Orientation, no Time.
        let mut table = Table::new(vec![
            "Composition".into(),
            "Temperature".into(),
            "Stress (MPa)".into(),
            "Test duration".into(),
            "Strain (%)".into(),
        ]);
        table.push_row(vec![
            text("A"),
            num(650.0),
            num(120.0),
            text("1000h"),
            num(0.5),
        ]);

        let err = consolidate(&table, &ConsolidationPlan::creep_test()).unwrap_err();
        let ConsolidateError::MissingColumns {
            grouping,
            aggregation,
        } = err;
        assert_eq!(grouping, vec!["Orientation".to_string()]);
        assert_eq!(aggregation, vec!["Time".to_string()]);
    }

    #[test]
    fn test_missing_aggregation_column_only() {
        let mut table = Table::new(vec![
            "Composition".into(),
            "Temperature".into(),
            "Orientation".into(),
            "Stress (MPa)".into(),
            "Test duration".into(),
            "Time".into(),
        ]);
        table.push_row(vec![
            text("A"),
            num(650.0),
            text("L"),
            num(120.0),
            text("1000h"),
            num(0.0),
        ]);

        let err = consolidate(&table, &ConsolidationPlan::creep_test()).unwrap_err();
        let ConsolidateError::MissingColumns {
            grouping,
            aggregation,
        } = err;
        assert!(grouping.is_empty());
        assert_eq!(aggregation, vec!["Strain (%)".to_string()]);
    }

    #[test]
    fn test_empty_input_yields_empty_output_with_header() {
        let table = Table::new(creep_columns());
        let output = consolidate(&table, &ConsolidationPlan::creep_test()).unwrap();
        assert_eq!(output.row_count(), 0);
        assert_eq!(output.columns(), OUTPUT_COLUMNS);
    }

    #[test]
    fn test_input_uts_values_are_discarded() {
        let mut columns = creep_columns();
        columns.push("UTS".into());
        let mut table = Table::new(columns);
        let mut row = reading("A", 650.0, "L", 120.0, "1000h", 0.5, 0.0);
        row.push(num(830.0));
        table.push_row(row);

        let output = consolidate(&table, &ConsolidationPlan::creep_test()).unwrap();
        assert_eq!(output.rows()[0][4], CellValue::Empty);
    }

    #[test]
    fn test_consolidation_is_idempotent() {
        let mut table = Table::new(creep_columns());
        table.push_row(reading("A", 650.0, "L", 120.0, "1000h", 0.5, 0.0));
        table.push_row(reading("A", 650.0, "L", 120.0, "1000h", 0.7, 1.0));
        table.push_row(reading("B", 700.0, "T", 80.0, "500h", 0.3, 0.0));

        let plan = ConsolidationPlan::creep_test();
        let once = consolidate(&table, &plan).unwrap();
        let twice = consolidate(&once, &plan).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_text_and_number_keys_stay_distinct() {
        let mut table = Table::new(creep_columns());
        let mut as_number = reading("A", 650.0, "L", 120.0, "1000h", 0.5, 0.0);
        let mut as_text = reading("A", 650.0, "L", 120.0, "1000h", 0.7, 1.0);
        as_number[1] = num(650.0);
        as_text[1] = text("650");
        table.push_row(as_number);
        table.push_row(as_text);

        let output = consolidate(&table, &ConsolidationPlan::creep_test()).unwrap();
        assert_eq!(output.row_count(), 2);
    }

    #[test]
    fn test_missing_columns_helper() {
        let available = vec!["Composition".to_string(), " Temperature ".to_string()];
        let missing = missing_columns(["Composition", "Temperature", "Time", "Time"], &available);
        assert_eq!(missing, vec!["Time".to_string()]);
        assert!(missing_columns(["Composition", "Temperature"], &available).is_empty());
    }
}
