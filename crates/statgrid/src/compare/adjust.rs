//! Multiple-comparison adjustment of p-values.
//!
//! A pure function over already-computed p-values: nothing is retested.
//! Undefined p-values stay undefined and do not count toward the number of
//! comparisons.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Adjustment method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustMethod {
    /// Family-wise: `m * p`.
    Bonferroni,
    /// Family-wise step-down.
    Holm,
    /// Family-wise step-up.
    Hochberg,
    /// False discovery rate.
    #[serde(alias = "bh", alias = "fdr")]
    BenjaminiHochberg,
    /// False discovery rate under arbitrary dependence.
    #[serde(alias = "by")]
    BenjaminiYekutieli,
}

impl AdjustMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustMethod::Bonferroni => "bonferroni",
            AdjustMethod::Holm => "holm",
            AdjustMethod::Hochberg => "hochberg",
            AdjustMethod::BenjaminiHochberg => "benjamini_hochberg",
            AdjustMethod::BenjaminiYekutieli => "benjamini_yekutieli",
        }
    }

    /// Footnote text naming the method.
    pub fn description(&self) -> &'static str {
        match self {
            AdjustMethod::Bonferroni => "Bonferroni correction for multiple testing",
            AdjustMethod::Holm => "Holm correction for multiple testing",
            AdjustMethod::Hochberg => "Hochberg correction for multiple testing",
            AdjustMethod::BenjaminiHochberg => {
                "Benjamini & Hochberg correction for multiple testing"
            }
            AdjustMethod::BenjaminiYekutieli => {
                "Benjamini & Yekutieli correction for multiple testing"
            }
        }
    }
}

impl fmt::Display for AdjustMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adjusts p-values, keeping positions and undefined entries.
pub fn adjust(p_values: &[Option<f64>], method: AdjustMethod) -> Vec<Option<f64>> {
    let defined: Vec<(usize, f64)> = p_values
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.map(|p| (i, p)))
        .collect();
    let m = defined.len();
    let mut out = vec![None; p_values.len()];
    if m == 0 {
        return out;
    }
    let mf = m as f64;

    let ascending = |a: &(usize, f64), b: &(usize, f64)| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal);
    let mut order = defined.clone();

    match method {
        AdjustMethod::Bonferroni => {
            for (i, p) in defined {
                out[i] = Some((mf * p).min(1.0));
            }
        }
        AdjustMethod::Holm => {
            order.sort_by(ascending);
            let mut running: f64 = 0.0;
            for (rank, (i, p)) in order.into_iter().enumerate() {
                running = running.max((mf - rank as f64) * p);
                out[i] = Some(running.min(1.0));
            }
        }
        AdjustMethod::Hochberg | AdjustMethod::BenjaminiHochberg | AdjustMethod::BenjaminiYekutieli => {
            order.sort_by(|a, b| ascending(b, a));
            let harmonic: f64 = (1..=m).map(|k| 1.0 / k as f64).sum();
            let mut running = f64::INFINITY;
            for (offset, (i, p)) in order.into_iter().enumerate() {
                // 1-based rank in ascending order
                let rank = (m - offset) as f64;
                let scaled = match method {
                    AdjustMethod::Hochberg => (mf - rank + 1.0) * p,
                    AdjustMethod::BenjaminiHochberg => mf / rank * p,
                    _ => harmonic * mf / rank * p,
                };
                running = running.min(scaled);
                out[i] = Some(running.min(1.0));
            }
        }
    }
    out
}
