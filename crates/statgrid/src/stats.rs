//! Descriptive statistics.
//!
//! Every table cell is backed by a [`StatisticBundle`]: the named values its
//! template may reference. Missing values never enter a statistic; they are
//! counted in `N_miss` instead. Values that cannot be computed (the mean of
//! nothing, the sd of one value, a share of zero) are [`Stat::Undefined`].
//!
//! | Kind | Statistics |
//! |------|------------|
//! | continuous | `N_obs N_miss N_nonmiss p_miss mean sd var median p25 p75 iqr min max sum`, and `p0`..`p100` |
//! | categorical, dichotomous | `n N p N_obs N_miss N_nonmiss p_miss` |
//! | missing row | `N_obs N_miss N_nonmiss p_miss` |
//!
//! `N` is the denominator of `p`: the non-missing count in the same column,
//! never the table total. Percentages (`p`, `p_miss`) run from 0 to 100.

use std::collections::BTreeMap;

use crate::classify::VariableKind;

/// Statistics available for continuous variables (besides `pNN`).
pub const CONTINUOUS_STATISTICS: &[&str] = &[
    "N_obs", "N_miss", "N_nonmiss", "p_miss", "mean", "sd", "var", "median", "p25", "p75", "iqr",
    "min", "max", "sum",
];

/// Statistics available for each level of a categorical or dichotomous
/// variable.
pub const CATEGORICAL_STATISTICS: &[&str] =
    &["n", "N", "p", "N_obs", "N_miss", "N_nonmiss", "p_miss"];

/// Statistics available for the missing-value row.
pub const MISSING_STATISTICS: &[&str] = &["N_obs", "N_miss", "N_nonmiss", "p_miss"];

/// Statistics that are counts and print without decimals.
pub const COUNT_STATISTICS: &[&str] = &["n", "N", "N_obs", "N_miss", "N_nonmiss"];

/// Statistics that are percentages.
pub const PERCENT_STATISTICS: &[&str] = &["p", "p_miss"];

/// One computed value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Stat {
    Count(usize),
    Value(f64),
    Undefined,
}

impl Stat {
    /// Wraps a float, mapping NaN and infinities to `Undefined`.
    pub fn from_f64(value: f64) -> Stat {
        if value.is_finite() {
            Stat::Value(value)
        } else {
            Stat::Undefined
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Stat::Count(n) => Some(*n as f64),
            Stat::Value(v) => Some(*v),
            Stat::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Stat::Undefined)
    }
}

/// Named statistics for one (variable, column) cell.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatisticBundle {
    stats: BTreeMap<String, Stat>,
}

impl StatisticBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, stat: Stat) {
        self.stats.insert(name.into(), stat);
    }

    pub fn get(&self, name: &str) -> Option<&Stat> {
        self.stats.get(name)
    }

    /// The numeric value of a statistic, if present and defined.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.stats.get(name).and_then(Stat::value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.stats.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.stats.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Stat)> {
        self.stats.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

/// Parses a percentile placeholder (`p0`..`p100`).
pub fn percentile_name(name: &str) -> Option<u32> {
    let digits = name.strip_prefix('p')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|pct| *pct <= 100)
}

/// Whether a template for this kind may reference `name`.
pub fn is_allowed(kind: VariableKind, name: &str) -> bool {
    match kind {
        VariableKind::Continuous => {
            CONTINUOUS_STATISTICS.contains(&name) || percentile_name(name).is_some()
        }
        VariableKind::Categorical | VariableKind::Dichotomous => {
            CATEGORICAL_STATISTICS.contains(&name)
        }
    }
}

/// Whether a missing-row template may reference `name`.
pub fn is_allowed_missing(name: &str) -> bool {
    MISSING_STATISTICS.contains(&name)
}

/// Quantile of sorted data by ECDF inversion with averaging at
/// discontinuities (type 2). `pct` is in percent.
pub fn quantile(sorted: &[f64], pct: u32) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    // n * pct / 100, kept in integers so that exact hits average.
    let scaled = n * pct as usize;
    let j = scaled / 100;
    if scaled % 100 != 0 {
        return Some(sorted[j.min(n - 1)]);
    }
    if j == 0 {
        return Some(sorted[0]);
    }
    if j >= n {
        return Some(sorted[n - 1]);
    }
    Some((sorted[j - 1] + sorted[j]) / 2.0)
}

fn insert_missing_counts(bundle: &mut StatisticBundle, n_obs: usize, n_miss: usize) {
    bundle.insert("N_obs", Stat::Count(n_obs));
    bundle.insert("N_miss", Stat::Count(n_miss));
    bundle.insert("N_nonmiss", Stat::Count(n_obs - n_miss));
    bundle.insert(
        "p_miss",
        if n_obs == 0 {
            Stat::Undefined
        } else {
            Stat::from_f64(100.0 * n_miss as f64 / n_obs as f64)
        },
    );
}

/// Statistics of a continuous variable over `rows`.
///
/// `percentiles` lists extra `pNN` statistics to compute.
pub fn continuous_bundle(
    values: &[Option<f64>],
    rows: &[usize],
    percentiles: &[u32],
) -> StatisticBundle {
    let mut sorted: Vec<f64> = rows.iter().filter_map(|&r| values[r]).collect();
    sorted.sort_by(f64::total_cmp);

    let mut bundle = StatisticBundle::new();
    insert_missing_counts(&mut bundle, rows.len(), rows.len() - sorted.len());

    let n = sorted.len();
    let undefined_if_empty = |value: Option<f64>| value.map(Stat::from_f64).unwrap_or(Stat::Undefined);

    let sum: f64 = sorted.iter().sum();
    let mean = (n > 0).then(|| sum / n as f64);
    let var = match mean {
        Some(mean) if n > 1 => {
            Some(sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64)
        }
        _ => None,
    };
    let p25 = quantile(&sorted, 25);
    let p75 = quantile(&sorted, 75);

    bundle.insert("mean", undefined_if_empty(mean));
    bundle.insert("var", undefined_if_empty(var));
    bundle.insert("sd", undefined_if_empty(var.map(f64::sqrt)));
    bundle.insert("median", undefined_if_empty(quantile(&sorted, 50)));
    bundle.insert("p25", undefined_if_empty(p25));
    bundle.insert("p75", undefined_if_empty(p75));
    bundle.insert(
        "iqr",
        undefined_if_empty(p25.zip(p75).map(|(lo, hi)| hi - lo)),
    );
    bundle.insert("min", undefined_if_empty(sorted.first().copied()));
    bundle.insert("max", undefined_if_empty(sorted.last().copied()));
    bundle.insert("sum", undefined_if_empty((n > 0).then_some(sum)));
    for &pct in percentiles {
        bundle.insert(format!("p{}", pct), undefined_if_empty(quantile(&sorted, pct)));
    }
    bundle
}

/// One bundle per level of a categorical variable over `rows`.
pub fn level_bundles(codes: &[Option<usize>], rows: &[usize], n_levels: usize) -> Vec<StatisticBundle> {
    let mut counts = vec![0usize; n_levels];
    let mut n_miss = 0;
    for &row in rows {
        match codes[row] {
            Some(code) if code < n_levels => counts[code] += 1,
            Some(_) => {}
            None => n_miss += 1,
        }
    }
    let denominator = rows.len() - n_miss;
    counts
        .into_iter()
        .map(|n| {
            let mut bundle = StatisticBundle::new();
            insert_missing_counts(&mut bundle, rows.len(), n_miss);
            bundle.insert("n", Stat::Count(n));
            bundle.insert("N", Stat::Count(denominator));
            bundle.insert(
                "p",
                if denominator == 0 {
                    Stat::Undefined
                } else {
                    Stat::from_f64(100.0 * n as f64 / denominator as f64)
                },
            );
            bundle
        })
        .collect()
}

/// Missing-value counts over `rows`.
pub fn missing_bundle(rows: &[usize], is_missing: impl Fn(usize) -> bool) -> StatisticBundle {
    let n_miss = rows.iter().filter(|&&row| is_missing(row)).count();
    let mut bundle = StatisticBundle::new();
    insert_missing_counts(&mut bundle, rows.len(), n_miss);
    bundle
}
