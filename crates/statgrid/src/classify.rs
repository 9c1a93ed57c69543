//! Variable classification.
//!
//! [`classify`] decides how a column is summarized and fixes the level order
//! every later stage uses.
//!
//! Without an override (a declared column kind counts as one):
//!
//! | Data | Kind |
//! |------|------|
//! | boolean, numeric within {0, 1}, text/factor with levels yes/no | dichotomous |
//! | numeric with a fractional value or more distinct values than the threshold | continuous |
//! | numeric without observed values | continuous |
//! | anything else | categorical |
//!
//! Levels appear in first-observed order, except for factors, which keep their
//! declared order restricted to observed levels.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::dataset::{Column, ColumnData};
use crate::error::{Result, StatgridError};

/// How a variable is summarized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    /// One row of location/spread statistics.
    Continuous,
    /// A label row followed by one row per level.
    Categorical,
    /// One row showing a single level's count.
    Dichotomous,
}

impl VariableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableKind::Continuous => "continuous",
            VariableKind::Categorical => "categorical",
            VariableKind::Dichotomous => "dichotomous",
        }
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs to [`classify`] beyond the column itself.
#[derive(Clone, Copy, Debug)]
pub struct ClassifyOptions<'a> {
    /// Explicit kind; wins over the column's declared kind.
    pub kind: Option<VariableKind>,
    /// Numeric columns with more distinct values than this are continuous.
    pub continuous_threshold: usize,
    /// Level shown by a dichotomous variable.
    pub value: Option<&'a str>,
    /// Rows whose values define the levels; all rows when `None`. Values
    /// outside these rows that match no level are coded as missing.
    pub rows: Option<&'a [usize]>,
}

impl Default for ClassifyOptions<'_> {
    fn default() -> Self {
        ClassifyOptions {
            kind: None,
            continuous_threshold: 9,
            value: None,
            rows: None,
        }
    }
}

/// A classified column, carrying the data in the shape its kind needs.
#[derive(Clone, Debug, PartialEq)]
pub enum Classified {
    Continuous {
        values: Vec<Option<f64>>,
    },
    Categorical {
        levels: Vec<String>,
        codes: Vec<Option<usize>>,
    },
    Dichotomous {
        levels: Vec<String>,
        codes: Vec<Option<usize>>,
        /// Index into `levels` of the displayed level.
        shown: usize,
    },
}

impl Classified {
    pub fn kind(&self) -> VariableKind {
        match self {
            Classified::Continuous { .. } => VariableKind::Continuous,
            Classified::Categorical { .. } => VariableKind::Categorical,
            Classified::Dichotomous { .. } => VariableKind::Dichotomous,
        }
    }

    /// Observed levels in display order; empty for continuous variables.
    pub fn levels(&self) -> &[String] {
        match self {
            Classified::Continuous { .. } => &[],
            Classified::Categorical { levels, .. } | Classified::Dichotomous { levels, .. } => {
                levels
            }
        }
    }

    /// Per-row level codes; `None` for continuous variables.
    pub fn codes(&self) -> Option<&[Option<usize>]> {
        match self {
            Classified::Continuous { .. } => None,
            Classified::Categorical { codes, .. } | Classified::Dichotomous { codes, .. } => {
                Some(codes)
            }
        }
    }

    /// The displayed level of a dichotomous variable.
    pub fn shown_level(&self) -> Option<&str> {
        match self {
            Classified::Dichotomous { levels, shown, .. } => levels.get(*shown).map(String::as_str),
            _ => None,
        }
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            Classified::Continuous { values } => values[row].is_none(),
            Classified::Categorical { codes, .. } | Classified::Dichotomous { codes, .. } => {
                codes[row].is_none()
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Classified::Continuous { values } => values.len(),
            Classified::Categorical { codes, .. } | Classified::Dichotomous { codes, .. } => {
                codes.len()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shortest decimal form of a numeric level (`3`, not `3.0`).
pub fn format_level(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

/// Distinct observed levels in display order, with one code per row.
///
/// Only `rows` (all rows when `None`) contribute levels; every row is coded.
pub(crate) fn level_codes(
    data: &ColumnData,
    rows: Option<&[usize]>,
) -> (Vec<String>, Vec<Option<usize>>) {
    fn first_observed<'a, T, K: Eq + Hash>(
        values: &'a [Option<T>],
        rows: Option<&[usize]>,
        key: impl Fn(&'a T) -> K,
        name: impl Fn(&T) -> String,
    ) -> (Vec<String>, Vec<Option<usize>>) {
        let mut index: HashMap<K, usize> = HashMap::new();
        let mut levels = Vec::new();
        let mut observe = |value: &'a T| {
            if let Entry::Vacant(entry) = index.entry(key(value)) {
                entry.insert(levels.len());
                levels.push(name(value));
            }
        };
        match rows {
            Some(rows) => rows
                .iter()
                .filter_map(|&row| values.get(row).and_then(Option::as_ref))
                .for_each(&mut observe),
            None => values.iter().flatten().for_each(&mut observe),
        }
        let codes = values
            .iter()
            .map(|value| value.as_ref().and_then(|v| index.get(&key(v)).copied()))
            .collect();
        (levels, codes)
    }

    match data {
        ColumnData::Numeric(values) => first_observed(
            values,
            rows,
            |v| if *v == 0.0 { 0f64.to_bits() } else { v.to_bits() },
            |v| format_level(*v),
        ),
        ColumnData::Text(values) => first_observed(values, rows, String::as_str, String::clone),
        ColumnData::Boolean(values) => first_observed(values, rows, |v| *v, bool::to_string),
        ColumnData::Factor { levels, codes } => {
            let mut observed = vec![false; levels.len()];
            let mut mark = |code: Option<usize>| {
                if let Some(seen) = code.and_then(|code| observed.get_mut(code)) {
                    *seen = true;
                }
            };
            match rows {
                Some(rows) => rows
                    .iter()
                    .for_each(|&row| mark(codes.get(row).copied().flatten())),
                None => codes.iter().for_each(|&code| mark(code)),
            }
            let mut remap = vec![None; levels.len()];
            let mut kept = Vec::new();
            for (code, level) in levels.iter().enumerate() {
                if observed[code] {
                    remap[code] = Some(kept.len());
                    kept.push(level.clone());
                }
            }
            let codes = codes
                .iter()
                .map(|c| c.and_then(|code| remap.get(code).copied().flatten()))
                .collect();
            (kept, codes)
        }
    }
}

fn is_yes_no(levels: &[String]) -> bool {
    if levels.len() != 2 {
        return false;
    }
    let mut lower: Vec<String> = levels.iter().map(|l| l.to_lowercase()).collect();
    lower.sort();
    lower == ["no", "yes"]
}

/// Classifies a column.
///
/// # Errors
///
/// [`StatgridError::InvalidKind`] when the requested kind does not fit the
/// data: continuous on non-numeric data, categorical on numeric data with
/// fractional values, dichotomous on more than two levels or with a
/// displayed value that is not a level.
pub fn classify(column: &Column, options: &ClassifyOptions<'_>) -> Result<Classified> {
    let data = column.data();
    let requested = options.kind.or(column.kind());
    let invalid = |kind: VariableKind, reason: String| StatgridError::InvalidKind {
        variable: column.name().to_string(),
        kind,
        reason,
    };

    let numeric = match data {
        ColumnData::Numeric(values) => Some(values),
        _ => None,
    };
    let has_fraction = numeric
        .map(|values| values.iter().flatten().any(|v| v.fract() != 0.0 || !v.is_finite()))
        .unwrap_or(false);

    if let Some(values) = numeric {
        let continuous = match requested {
            Some(kind) => kind == VariableKind::Continuous,
            None => has_fraction || values.iter().all(Option::is_none),
        };
        if continuous {
            let classified = Classified::Continuous {
                values: values.clone(),
            };
            log_classified(column, &classified, requested.is_some());
            return Ok(classified);
        }
    }

    let (levels, codes) = level_codes(data, options.rows);

    let kind = match requested {
        Some(kind) => kind,
        None => match data {
            ColumnData::Boolean(_) => VariableKind::Dichotomous,
            ColumnData::Numeric(values) => {
                if values.iter().flatten().all(|v| *v == 0.0 || *v == 1.0) {
                    VariableKind::Dichotomous
                } else if has_fraction || levels.len() > options.continuous_threshold {
                    VariableKind::Continuous
                } else {
                    VariableKind::Categorical
                }
            }
            ColumnData::Text(_) => {
                if is_yes_no(&levels) {
                    VariableKind::Dichotomous
                } else {
                    VariableKind::Categorical
                }
            }
            ColumnData::Factor {
                levels: declared, ..
            } => {
                if is_yes_no(declared) {
                    VariableKind::Dichotomous
                } else {
                    VariableKind::Categorical
                }
            }
        },
    };

    let classified = match kind {
        VariableKind::Continuous => match numeric {
            Some(values) => Classified::Continuous {
                values: values.clone(),
            },
            None => {
                return Err(invalid(
                    kind,
                    format!("{} data is not numeric", data.type_name()),
                ))
            }
        },
        VariableKind::Categorical => {
            if has_fraction {
                return Err(invalid(kind, "numeric data has non-integer values".into()));
            }
            Classified::Categorical { levels, codes }
        }
        VariableKind::Dichotomous => {
            if levels.len() > 2 {
                return Err(invalid(
                    kind,
                    format!("{} distinct values, at most 2 allowed", levels.len()),
                ));
            }
            let (levels, shown) = dichotomous_level(data, levels, options.value)
                .map_err(|reason| invalid(kind, reason))?;
            Classified::Dichotomous {
                levels,
                codes,
                shown,
            }
        }
    };

    log_classified(column, &classified, requested.is_some());
    Ok(classified)
}

fn log_classified(column: &Column, classified: &Classified, overridden: bool) {
    tracing::debug!(
        variable = column.name(),
        kind = %classified.kind(),
        levels = classified.levels().len(),
        overridden,
        "classified variable"
    );
}

/// Picks the displayed level, appending it when it is declared but was never
/// observed.
fn dichotomous_level(
    data: &ColumnData,
    mut levels: Vec<String>,
    value: Option<&str>,
) -> std::result::Result<(Vec<String>, usize), String> {
    let declared: Vec<String> = match data {
        ColumnData::Boolean(_) => vec!["false".into(), "true".into()],
        ColumnData::Factor { levels, .. } => levels.clone(),
        _ => Vec::new(),
    };

    if let Some(value) = value {
        if let Some(idx) = levels.iter().position(|l| l == value) {
            return Ok((levels, idx));
        }
        if declared.iter().any(|l| l == value) && levels.len() < 2 {
            let idx = levels.len();
            levels.push(value.to_string());
            return Ok((levels, idx));
        }
        return Err(format!("'{}' is not a level of this variable", value));
    }

    let default = match data {
        ColumnData::Boolean(_) => Some("true".to_string()),
        ColumnData::Numeric(values) if values.iter().flatten().all(|v| *v == 0.0 || *v == 1.0) => {
            Some("1".to_string())
        }
        ColumnData::Text(_) | ColumnData::Factor { .. } => levels
            .iter()
            .chain(declared.iter())
            .find(|l| l.eq_ignore_ascii_case("yes"))
            .cloned(),
        _ => None,
    };

    match default {
        Some(level) => match levels.iter().position(|l| *l == level) {
            Some(idx) => Ok((levels, idx)),
            None if levels.len() < 2 => {
                levels.push(level);
                let idx = levels.len() - 1;
                Ok((levels, idx))
            }
            None => {
                let idx = levels.len() - 1;
                Ok((levels, idx))
            }
        },
        None if levels.is_empty() => Err("no observed values".into()),
        None => {
            let idx = levels.len() - 1;
            Ok((levels, idx))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ColumnData;

    fn numeric(values: &[f64]) -> Column {
        Column::new(
            "x",
            ColumnData::Numeric(values.iter().map(|v| Some(*v)).collect()),
        )
    }

    fn text(values: &[&str]) -> Column {
        Column::new(
            "t",
            ColumnData::Text(values.iter().map(|v| Some(v.to_string())).collect()),
        )
    }

    fn auto(column: &Column) -> Classified {
        classify(column, &ClassifyOptions::default()).unwrap()
    }

    #[test]
    fn many_distinct_numbers_are_continuous() {
        let column = numeric(&(0..20).map(f64::from).collect::<Vec<_>>());
        assert_eq!(auto(&column).kind(), VariableKind::Continuous);
    }

    #[test]
    fn fractional_numbers_are_continuous() {
        assert_eq!(auto(&numeric(&[1.5, 2.0, 1.5])).kind(), VariableKind::Continuous);
    }

    #[test]
    fn few_integers_are_categorical_in_first_observed_order() {
        let classified = auto(&numeric(&[3.0, 1.0, 2.0, 3.0]));
        assert_eq!(classified.kind(), VariableKind::Categorical);
        assert_eq!(classified.levels(), ["3", "1", "2"]);
        assert_eq!(classified.codes().unwrap()[3], Some(0));
    }

    #[test]
    fn threshold_is_configurable() {
        let column = numeric(&[1.0, 2.0, 3.0, 4.0]);
        let options = ClassifyOptions {
            continuous_threshold: 3,
            ..ClassifyOptions::default()
        };
        assert_eq!(
            classify(&column, &options).unwrap().kind(),
            VariableKind::Continuous
        );
    }

    #[test]
    fn zero_one_numbers_are_dichotomous() {
        let classified = auto(&numeric(&[0.0, 1.0, 1.0]));
        assert_eq!(classified.kind(), VariableKind::Dichotomous);
        assert_eq!(classified.shown_level(), Some("1"));
    }

    #[test]
    fn booleans_show_true_even_when_unobserved() {
        let column = Column::new("b", ColumnData::Boolean(vec![Some(false), Some(false)]));
        let classified = auto(&column);
        assert_eq!(classified.kind(), VariableKind::Dichotomous);
        assert_eq!(classified.shown_level(), Some("true"));
        assert_eq!(classified.levels(), ["false", "true"]);
    }

    #[test]
    fn yes_no_text_is_dichotomous() {
        let classified = auto(&text(&["No", "Yes", "No"]));
        assert_eq!(classified.kind(), VariableKind::Dichotomous);
        assert_eq!(classified.shown_level(), Some("Yes"));
    }

    #[test]
    fn text_is_categorical() {
        let classified = auto(&text(&["b", "a", "c", "a"]));
        assert_eq!(classified.kind(), VariableKind::Categorical);
        assert_eq!(classified.levels(), ["b", "a", "c"]);
    }

    #[test]
    fn factor_keeps_declared_order_of_observed_levels() {
        let column = Column::new(
            "f",
            ColumnData::Factor {
                levels: vec!["low".into(), "mid".into(), "high".into()],
                codes: vec![Some(2), Some(0), None, Some(2)],
            },
        );
        let classified = auto(&column);
        assert_eq!(classified.levels(), ["low", "high"]);
        assert_eq!(
            classified.codes().unwrap(),
            &[Some(1), Some(0), None, Some(1)]
        );
    }

    #[test]
    fn all_missing_numeric_is_continuous() {
        let column = Column::new("x", ColumnData::Numeric(vec![None, None]));
        assert_eq!(auto(&column).kind(), VariableKind::Continuous);
    }

    #[test]
    fn continuous_override_on_text_fails() {
        let options = ClassifyOptions {
            kind: Some(VariableKind::Continuous),
            ..ClassifyOptions::default()
        };
        let err = classify(&text(&["a"]), &options).unwrap_err();
        assert!(matches!(
            err,
            StatgridError::InvalidKind { kind: VariableKind::Continuous, .. }
        ));
    }

    #[test]
    fn categorical_override_on_fractions_fails() {
        let options = ClassifyOptions {
            kind: Some(VariableKind::Categorical),
            ..ClassifyOptions::default()
        };
        assert!(classify(&numeric(&[1.5, 2.0]), &options).is_err());
        assert!(classify(&numeric(&[1.0, 2.0, 30.0]), &options).is_ok());
    }

    #[test]
    fn dichotomous_override_needs_two_levels() {
        let options = ClassifyOptions {
            kind: Some(VariableKind::Dichotomous),
            ..ClassifyOptions::default()
        };
        assert!(classify(&text(&["a", "b", "c"]), &options).is_err());

        let classified = classify(&text(&["a", "b"]), &options).unwrap();
        assert_eq!(classified.shown_level(), Some("b"));
    }

    #[test]
    fn dichotomous_value_must_be_a_level() {
        let options = ClassifyOptions {
            kind: Some(VariableKind::Dichotomous),
            value: Some("a"),
            ..ClassifyOptions::default()
        };
        let classified = classify(&text(&["a", "b"]), &options).unwrap();
        assert_eq!(classified.shown_level(), Some("a"));

        let options = ClassifyOptions {
            value: Some("z"),
            ..options
        };
        assert!(classify(&text(&["a", "b"]), &options).is_err());
    }

    #[test]
    fn declared_kind_acts_as_override() {
        let column = numeric(&[1.0, 2.0, 3.0]).with_kind(VariableKind::Continuous);
        assert_eq!(auto(&column).kind(), VariableKind::Continuous);
    }

    #[test]
    fn numeric_levels_print_short() {
        assert_eq!(format_level(3.0), "3");
        assert_eq!(format_level(-0.0), "0");
        assert_eq!(format_level(2.5), "2.5");
    }

    #[test]
    fn large_fractional_column_is_continuous_without_levels() {
        let values: Vec<f64> = (0..50_000).map(|i| f64::from(i) + 0.5).collect();
        let classified = auto(&numeric(&values));
        assert_eq!(classified.kind(), VariableKind::Continuous);
        assert!(classified.levels().is_empty());
        assert_eq!(classified.len(), 50_000);
    }

    #[test]
    fn many_distinct_text_values_keep_their_codes() {
        let names: Vec<String> = (0..20_000).map(|i| format!("id{}", i % 10_000)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let classified = auto(&text(&refs));

        assert_eq!(classified.levels().len(), 10_000);
        assert_eq!(classified.levels()[123], "id123");
        let codes = classified.codes().unwrap();
        assert_eq!(codes[123], Some(123));
        assert_eq!(codes[10_123], Some(123));
    }

    #[test]
    fn level_rows_restrict_observed_levels() {
        let column = text(&["I", "IV", "II", "I"]);
        let options = ClassifyOptions {
            rows: Some(&[0, 2, 3]),
            ..ClassifyOptions::default()
        };
        let classified = classify(&column, &options).unwrap();
        assert_eq!(classified.levels(), ["I", "II"]);
        assert_eq!(classified.codes().unwrap(), [Some(0), None, Some(1), Some(0)]);
    }

    #[test]
    fn level_rows_restrict_factor_levels() {
        let column = Column::new(
            "f",
            ColumnData::Factor {
                levels: vec!["low".into(), "mid".into(), "high".into()],
                codes: vec![Some(2), Some(1), Some(0)],
            },
        );
        let options = ClassifyOptions {
            rows: Some(&[0, 2]),
            ..ClassifyOptions::default()
        };
        let classified = classify(&column, &options).unwrap();
        assert_eq!(classified.levels(), ["low", "high"]);
        assert_eq!(classified.codes().unwrap(), [Some(1), None, Some(0)]);
    }
}
