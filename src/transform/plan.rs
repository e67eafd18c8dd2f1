//! Consolidation plan: which columns identify a test condition, which
//! columns get merged, and the layout of the output sheet.
//!
//! The plan for creep-test sheets is fixed (see [`ConsolidationPlan::creep_test`]),
//! but the consolidator itself only ever talks to a plan, so alternative
//! layouts stay cheap to add.

use crate::model::CellValue;

/// Columns whose combined values identify one test condition.
pub const GROUPING_COLUMNS: [&str; 5] = [
    "Composition",
    "Temperature",
    "Orientation",
    "Stress (MPa)",
    "Test duration",
];

/// Columns whose per-row values are merged into one cell per condition.
pub const MERGED_COLUMNS: [&str; 2] = ["Strain (%)", "Time"];

/// Column emitted empty for downstream manual entry.
pub const PLACEHOLDER_COLUMN: &str = "UTS";

/// Column order of the consolidated sheet.
pub const OUTPUT_COLUMNS: [&str; 8] = [
    "Composition",
    "Temperature",
    "Orientation",
    "Stress (MPa)",
    "UTS",
    "Test duration",
    "Strain (%)",
    "Time",
];

// =============================================================================
// Merge Strategies
// =============================================================================

/// How the values a column takes across one group's rows combine into a
/// single output cell.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeStrategy {
    /// Stringify each value and join them with a separator, keeping the
    /// order in which the rows appeared.
    JoinStringified { separator: String },
}

impl MergeStrategy {
    /// The strategy used for measurement series: comma-joined text.
    pub fn comma_join() -> Self {
        Self::JoinStringified {
            separator: ",".to_string(),
        }
    }

    /// Combine the collected values of one group into one cell.
    pub fn merge(&self, values: &[CellValue]) -> CellValue {
        match self {
            Self::JoinStringified { separator } => {
                let joined = values
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(separator);
                if joined.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(joined)
                }
            }
        }
    }
}

// =============================================================================
// Plans
// =============================================================================

/// A column to merge, paired with its strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedColumn {
    pub name: String,
    pub strategy: MergeStrategy,
}

impl MergedColumn {
    /// A comma-joined merge column.
    pub fn comma_joined(name: &str) -> Self {
        Self {
            name: name.to_string(),
            strategy: MergeStrategy::comma_join(),
        }
    }
}

/// What an output column is filled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// The i-th grouping column; filled from the group key.
    Grouping(usize),
    /// The i-th merged column; filled by its merge strategy.
    Merged(usize),
    /// Not fed by the input; emitted empty.
    Placeholder,
}

/// Grouping and merge specification for one consolidation run.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidationPlan {
    /// Columns forming the group key, in key order.
    pub grouping: Vec<String>,
    /// Columns merged per group.
    pub merged: Vec<MergedColumn>,
    /// Output columns, in sheet order.
    pub output_order: Vec<String>,
}

impl ConsolidationPlan {
    /// The fixed plan for creep-test sheets.
    ///
    /// Groups by composition, temperature, orientation, stress and test
    /// duration; merges the strain and time series; leaves UTS empty.
    pub fn creep_test() -> Self {
        Self {
            grouping: GROUPING_COLUMNS.iter().map(|c| c.to_string()).collect(),
            merged: MERGED_COLUMNS.iter().map(|c| MergedColumn::comma_joined(c)).collect(),
            output_order: OUTPUT_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Role of an output column under this plan.
    pub fn role_of(&self, column: &str) -> ColumnRole {
        if let Some(i) = self.grouping.iter().position(|g| g == column) {
            ColumnRole::Grouping(i)
        } else if let Some(i) = self.merged.iter().position(|m| m.name == column) {
            ColumnRole::Merged(i)
        } else {
            ColumnRole::Placeholder
        }
    }
}

impl Default for ConsolidationPlan {
    fn default() -> Self {
        Self::creep_test()
    }
}
