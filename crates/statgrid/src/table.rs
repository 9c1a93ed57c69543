//! The assembled table: body rows and columns plus per-variable metadata.
//!
//! The body is plain strings. Everything statistical has been computed and
//! formatted by the time a [`TableBody`] exists; add-ons add columns or
//! rewrite labels, but they never recompute existing cells.

use std::collections::BTreeMap;
use std::ops::Range;

use serde::Serialize;
use statgrid_render::GridSource;

use crate::classify::VariableKind;
use crate::compare::TestKind;
use crate::template::{Rounding, Template};

/// Column id of the row label column.
pub const LABEL_COLUMN: &str = "label";
/// Column id of the overall (ungrouped) statistics column.
pub const OVERALL_COLUMN: &str = "stat_0";
/// Column id added by `add_n`.
pub const N_COLUMN: &str = "n";
/// Column id added by `add_comparison`.
pub const P_VALUE_COLUMN: &str = "p.value";
/// Column id added by `add_multiplicity_adjustment`.
pub const Q_VALUE_COLUMN: &str = "q.value";
/// Column id added by `add_stat_label` in column mode.
pub const STAT_LABEL_COLUMN: &str = "stat_label";

/// Column id of the statistics column for group level `index` (0-based).
pub fn group_column_id(index: usize) -> String {
    format!("stat_{}", index + 1)
}

/// What a column holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Label,
    Group,
    Overall,
    N,
    PValue,
    QValue,
    StatLabel,
}

/// A column of the table body.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableColumn {
    pub id: String,
    pub role: ColumnRole,
    pub header: String,
    /// Group level for group columns.
    pub level: Option<String>,
    /// Rows behind the column: the group size, or the table total.
    pub n: usize,
}

/// Kind of body row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowType {
    /// The variable's first row, carrying its label.
    Label,
    /// One level of a categorical variable.
    Level,
    /// The missing-value count.
    Missing,
}

/// A row of the table body.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableRow {
    pub variable: String,
    pub row_type: RowType,
    pub label: String,
    pub level: Option<String>,
    /// Cell text keyed by column id. The label column is not stored here.
    pub cells: BTreeMap<String, String>,
}

impl TableRow {
    pub fn cell(&self, column: &str) -> Option<&str> {
        if column == LABEL_COLUMN {
            return Some(&self.label);
        }
        self.cells.get(column).map(String::as_str)
    }
}

/// Rows and columns of the table.
///
/// Rows may carry cells for columns that are not (yet) part of the body;
/// the overall column is always computed and only listed once requested.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TableBody {
    pub(crate) columns: Vec<TableColumn>,
    pub(crate) rows: Vec<TableRow>,
}

impl TableBody {
    pub fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn column(&self, id: &str) -> Option<&TableColumn> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn has_column(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == id)
    }

    pub fn column_ids(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.id.clone()).collect()
    }

    /// Ids of the columns holding statistics (group and overall).
    pub fn stat_column_ids(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| matches!(c.role, ColumnRole::Group | ColumnRole::Overall))
            .map(|c| c.id.clone())
            .collect()
    }

    /// Inserts a column at `index`, clamped to the end.
    pub(crate) fn insert_column(&mut self, index: usize, column: TableColumn) {
        let index = index.min(self.columns.len());
        self.columns.insert(index, column);
    }

    /// Indices of rows matching `predicate`.
    pub fn row_indices(&self, predicate: impl Fn(&TableRow) -> bool) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| predicate(row))
            .map(|(i, _)| i)
            .collect()
    }

    /// Raw content for a rendering backend.
    pub fn to_grid_source(&self) -> GridSource {
        let columns = self.column_ids();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|id| row.cell(id).unwrap_or_default().to_string())
                    .collect()
            })
            .collect();
        GridSource { columns, rows }
    }
}

/// How one variable is summarized. Fixed once the summary is built.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableSpec {
    pub name: String,
    pub label: String,
    pub kind: VariableKind,
    /// Levels of a categorical variable in display order; for a
    /// dichotomous variable, both levels.
    pub levels: Vec<String>,
    /// Displayed level of a dichotomous variable.
    pub shown_level: Option<String>,
    pub template: Template,
    pub missing_template: Template,
    pub rounding: Rounding,
    pub n_missing: usize,
}

/// Facts about one summarized variable.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VariableMeta {
    pub name: String,
    pub label: String,
    pub kind: VariableKind,
    /// Rows considered (after dropping rows without a group).
    pub n: usize,
    pub n_missing: usize,
    pub n_nonmissing: usize,
    pub test: Option<TestKind>,
    pub p_value: Option<f64>,
    /// p-value adjusted by `add_comparison`.
    pub p_adjusted: Option<f64>,
    /// q-value from `add_multiplicity_adjustment`.
    pub q_value: Option<f64>,
    /// The variable's rows in the body.
    pub rows: Range<usize>,
}

/// Per-variable metadata, in row order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MetaData {
    pub(crate) variables: Vec<VariableMeta>,
    pub(crate) group_by: Option<String>,
    pub(crate) dropped_rows: usize,
}

impl MetaData {
    pub fn variables(&self) -> &[VariableMeta] {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&VariableMeta> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Name of the grouping column, if any.
    pub fn group_by(&self) -> Option<&str> {
        self.group_by.as_deref()
    }

    /// Rows dropped for a missing group value.
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
