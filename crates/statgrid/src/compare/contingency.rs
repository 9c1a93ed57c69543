//! Contingency-table tests: Pearson chi-square and Fisher's exact test.
//!
//! Tables are `rows x columns` counts (variable levels by groups). Rows and
//! columns whose margin is zero carry no information and are dropped first.

use super::distribution::{chi_square_sf, ln_factorials};

/// Relative tolerance when comparing table probabilities with the observed
/// one, so that numerically equal tables count as "as extreme".
const FISHER_TOLERANCE: f64 = 1e-7;

/// Drops empty rows and columns.
pub(crate) fn trim(table: &[Vec<u64>]) -> Vec<Vec<u64>> {
    let ncols = table.first().map(Vec::len).unwrap_or(0);
    let keep_cols: Vec<usize> = (0..ncols)
        .filter(|&j| table.iter().any(|row| row[j] > 0))
        .collect();
    table
        .iter()
        .filter(|row| row.iter().any(|&v| v > 0))
        .map(|row| keep_cols.iter().map(|&j| row[j]).collect())
        .collect()
}

fn margins(table: &[Vec<u64>]) -> (Vec<u64>, Vec<u64>, u64) {
    let rows: Vec<u64> = table.iter().map(|r| r.iter().sum()).collect();
    let ncols = table.first().map(Vec::len).unwrap_or(0);
    let cols: Vec<u64> = (0..ncols).map(|j| table.iter().map(|r| r[j]).sum()).collect();
    let total = rows.iter().sum();
    (rows, cols, total)
}

/// Expected counts under independence.
pub(crate) fn expected(table: &[Vec<u64>]) -> Vec<Vec<f64>> {
    let (rows, cols, total) = margins(table);
    rows.iter()
        .map(|&r| {
            cols.iter()
                .map(|&c| {
                    if total == 0 {
                        0.0
                    } else {
                        r as f64 * c as f64 / total as f64
                    }
                })
                .collect()
        })
        .collect()
}

/// Smallest expected count of the trimmed table, `None` when the table is
/// degenerate.
pub(crate) fn min_expected(table: &[Vec<u64>]) -> Option<f64> {
    let trimmed = trim(table);
    expected(&trimmed)
        .into_iter()
        .flatten()
        .min_by(f64::total_cmp)
}

/// Outcome of a chi-square test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ChiSquare {
    pub statistic: f64,
    pub df: f64,
    pub p_value: Option<f64>,
}

/// Pearson chi-square test of independence. `correct` applies the Yates
/// continuity correction, which only affects 2x2 tables.
pub(crate) fn chi_square(table: &[Vec<u64>], correct: bool) -> ChiSquare {
    let table = trim(table);
    let nrows = table.len();
    let ncols = table.first().map(Vec::len).unwrap_or(0);
    if nrows < 2 || ncols < 2 {
        return ChiSquare {
            statistic: f64::NAN,
            df: 0.0,
            p_value: None,
        };
    }
    let expected = expected(&table);
    let yates = correct && nrows == 2 && ncols == 2;
    let correction = if yates {
        table
            .iter()
            .zip(&expected)
            .flat_map(|(o, e)| o.iter().zip(e).map(|(o, e)| (*o as f64 - e).abs()))
            .fold(0.5f64, f64::min)
    } else {
        0.0
    };
    let statistic: f64 = table
        .iter()
        .zip(&expected)
        .flat_map(|(o, e)| o.iter().zip(e))
        .map(|(o, e)| {
            let diff = (*o as f64 - e).abs() - correction;
            diff * diff / e
        })
        .sum();
    let df = ((nrows - 1) * (ncols - 1)) as f64;
    ChiSquare {
        statistic,
        df,
        p_value: Some(chi_square_sf(statistic, df)),
    }
}

/// Fisher's exact test on an `r x c` table.
///
/// Enumerates every table with the observed margins. Returns `None` when
/// more than `budget` tables would have to be visited; the caller falls back
/// to an approximation.
pub(crate) fn fisher_exact(table: &[Vec<u64>], budget: usize) -> Option<f64> {
    let table = trim(table);
    if table.len() < 2 || table.first().map(Vec::len).unwrap_or(0) < 2 {
        return Some(1.0);
    }
    let (rows, cols, total) = margins(&table);
    let ln_fact = ln_factorials(total as usize);
    let lf = |n: u64| ln_fact[n as usize];

    let ln_const = rows.iter().map(|&r| lf(r)).sum::<f64>() + cols.iter().map(|&c| lf(c)).sum::<f64>()
        - lf(total);
    let ln_observed = ln_const - table.iter().flatten().map(|&n| lf(n)).sum::<f64>();

    let mut search = FisherSearch {
        ln_fact: &ln_fact,
        cols: &cols,
        row_rem: rows,
        ln_const,
        threshold: ln_observed + FISHER_TOLERANCE.ln_1p(),
        total: 0.0,
        visited: 0,
        budget,
    };
    if !search.fill(0, 0, cols[0], 0.0) {
        return None;
    }
    Some(search.total.min(1.0))
}

struct FisherSearch<'a> {
    ln_fact: &'a [f64],
    cols: &'a [u64],
    row_rem: Vec<u64>,
    ln_const: f64,
    threshold: f64,
    total: f64,
    visited: usize,
    budget: usize,
}

impl FisherSearch<'_> {
    /// Fills column `col` from row `row` down, with `col_rem` still to place.
    /// `ln_cells` accumulates `-sum(ln n_ij!)`. Returns false once the budget
    /// is spent.
    fn fill(&mut self, col: usize, row: usize, col_rem: u64, ln_cells: f64) -> bool {
        let nrows = self.row_rem.len();
        let ncols = self.cols.len();

        if col == ncols - 1 {
            // The last column takes whatever each row has left.
            let ln_last: f64 = self.row_rem.iter().map(|&r| self.ln_fact[r as usize]).sum();
            self.visited += 1;
            if self.visited > self.budget {
                return false;
            }
            let ln_p = self.ln_const + ln_cells - ln_last;
            if ln_p <= self.threshold {
                self.total += ln_p.exp();
            }
            return true;
        }

        if row == nrows - 1 {
            if col_rem > self.row_rem[row] {
                return true;
            }
            self.row_rem[row] -= col_rem;
            let ln_next = ln_cells - self.ln_fact[col_rem as usize];
            let ok = self.fill(col + 1, 0, self.cols[col + 1], ln_next);
            self.row_rem[row] += col_rem;
            return ok;
        }

        let below: u64 = self.row_rem[row + 1..].iter().sum();
        let lower = col_rem.saturating_sub(below);
        let upper = col_rem.min(self.row_rem[row]);
        for cell in lower..=upper {
            self.row_rem[row] -= cell;
            let ok = self.fill(col, row + 1, col_rem - cell, ln_cells - self.ln_fact[cell as usize]);
            self.row_rem[row] += cell;
            if !ok {
                return false;
            }
        }
        true
    }
}
