//! Inline query: one formatted cell for use in running text.

use crate::classify::VariableKind;
use crate::error::{Result, StatgridError};
use crate::table::{RowType, N_COLUMN, OVERALL_COLUMN, P_VALUE_COLUMN, Q_VALUE_COLUMN};

use super::Summary;

/// Columns with one value per variable, stored on its label row.
const PER_VARIABLE_COLUMNS: &[&str] = &[N_COLUMN, P_VALUE_COLUMN, Q_VALUE_COLUMN];

impl Summary {
    /// Returns the text of one cell, exactly as stored in the table body.
    ///
    /// `level` selects a level of a categorical variable and must be omitted
    /// for other kinds; the missing-value row is addressed by its label for
    /// any kind. `column` is a column id (`stat_1`, `n`, `p.value`, ...), a
    /// group level, or `overall`. Per-variable columns (`n`, `p.value`,
    /// `q.value`) need no level.
    ///
    /// Nothing is recomputed; cells that exist but are empty return `""`.
    ///
    /// # Errors
    ///
    /// [`StatgridError::VariableNotFound`], [`StatgridError::LevelNotFound`],
    /// or [`StatgridError::ColumnNotFound`].
    pub fn inline_text(&self, variable: &str, level: Option<&str>, column: &str) -> Result<String> {
        let index = self.variable_index(variable)?;
        let column = self.resolve_inline_column(column)?;
        let kind = self.variables[index].kind;
        let rows = &self.body.rows[self.meta.variables[index].rows.clone()];
        let level_not_found = |level: &str| StatgridError::LevelNotFound {
            variable: variable.to_string(),
            level: level.to_string(),
        };
        let per_variable = PER_VARIABLE_COLUMNS.contains(&column.as_str());

        let row = match level {
            Some(level) => {
                let missing = rows
                    .iter()
                    .find(|r| r.row_type == RowType::Missing && r.label == level);
                let level_row = rows.iter().find(|r| {
                    r.row_type == RowType::Level && r.level.as_deref() == Some(level)
                });
                match (missing, level_row) {
                    (_, Some(row)) if kind == VariableKind::Categorical => row,
                    (Some(row), _) => row,
                    _ => return Err(level_not_found(level)),
                }
            }
            None if kind == VariableKind::Categorical && !per_variable => {
                return Err(level_not_found("(none)"))
            }
            None => &rows[0],
        };
        let row = if per_variable { &rows[0] } else { row };

        Ok(row.cell(&column).unwrap_or_default().to_string())
    }

    /// Like `resolve_column`, but also accepts the overall column while it is
    /// not shown: its cells are always stored.
    fn resolve_inline_column(&self, column: &str) -> Result<String> {
        match self.resolve_column(column) {
            Ok(id) => Ok(id),
            Err(_) if column == OVERALL_COLUMN || column.eq_ignore_ascii_case("overall") => {
                Ok(OVERALL_COLUMN.to_string())
            }
            Err(err) => Err(err),
        }
    }
}

/// Free-function form of [`Summary::inline_text`].
pub fn inline_text(
    summary: &Summary,
    variable: &str,
    level: Option<&str>,
    column: &str,
) -> Result<String> {
    summary.inline_text(variable, level, column)
}
