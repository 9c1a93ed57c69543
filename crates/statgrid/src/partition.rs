//! Group partitions.

use crate::classify::level_codes;
use crate::dataset::Column;

/// The split of rows by the levels of a grouping column.
///
/// Levels are the observed values only, in the same order categorical
/// levels use. Rows whose group value is missing belong to no level and are
/// dropped from the whole summary.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupPartition {
    column: String,
    levels: Vec<String>,
    rows: Vec<Vec<usize>>,
    dropped: usize,
}

impl GroupPartition {
    pub fn from_column(column: &Column) -> Self {
        let (levels, codes) = level_codes(column.data(), None);
        let mut rows = vec![Vec::new(); levels.len()];
        let mut dropped = 0;
        for (row, code) in codes.iter().enumerate() {
            match code {
                Some(code) => rows[*code].push(row),
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            tracing::warn!(
                group_by = column.name(),
                dropped,
                "rows with a missing group value are excluded"
            );
        }
        GroupPartition {
            column: column.name().to_string(),
            levels,
            rows,
            dropped,
        }
    }

    /// Name of the grouping column.
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// Row indices of one level, ascending.
    pub fn rows(&self, level: usize) -> &[usize] {
        &self.rows[level]
    }

    pub fn level_size(&self, level: usize) -> usize {
        self.rows[level].len()
    }

    /// Rows dropped for a missing group value.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Every row that belongs to some level, ascending.
    pub fn kept_rows(&self) -> Vec<usize> {
        let mut rows: Vec<usize> = self.rows.iter().flatten().copied().collect();
        rows.sort_unstable();
        rows
    }
}
