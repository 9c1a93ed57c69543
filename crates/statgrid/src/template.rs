//! Statistic templates.
//!
//! A [`Template`] is a format string with `{name}` placeholders, parsed once
//! into literal and placeholder tokens:
//!
//! - `{name}` - a statistic from the cell's [`StatisticBundle`]
//! - `{{` and `}}` - literal braces
//! - anything else - literal text, `%` included
//!
//! Placeholders are checked against the statistics of the variable's kind
//! when the summary is built, so rendering a template cannot fail. Each
//! placeholder rounds with its own digits (see [`Rounding`]); a statistic
//! that could not be computed prints as [`NA`].
//!
//! ```rust
//! use statgrid::{Rounding, Stat, StatisticBundle, Template};
//!
//! let template = Template::parse("{mean} ({sd})").unwrap();
//! let mut bundle = StatisticBundle::new();
//! bundle.insert("mean", Stat::Value(47.23));
//! bundle.insert("sd", Stat::Value(14.318));
//!
//! let rounding = Rounding::new(1).with_statistic("sd", 2);
//! assert_eq!(template.render(&bundle, &rounding), "47.2 (14.32)");
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StatgridError};
use crate::stats::{percentile_name, StatisticBundle, COUNT_STATISTICS, PERCENT_STATISTICS};

/// Text printed for a statistic that could not be computed.
pub const NA: &str = "NA";

/// A piece of a parsed template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Literal(String),
    Placeholder(String),
}

/// A parsed format string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    source: String,
    tokens: Vec<Token>,
}

impl Template {
    /// Parses a template.
    ///
    /// # Errors
    ///
    /// [`StatgridError::InvalidTemplate`] for an unclosed, empty, or nested
    /// placeholder.
    pub fn parse(source: &str) -> Result<Self> {
        let invalid = |reason: &str| StatgridError::InvalidTemplate {
            template: source.to_string(),
            reason: reason.to_string(),
        };

        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for inner in chars.by_ref() {
                        match inner {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => return Err(invalid("nested '{' in placeholder")),
                            other => name.push(other),
                        }
                    }
                    if !closed {
                        return Err(invalid("unclosed placeholder"));
                    }
                    let name = name.trim();
                    if name.is_empty() {
                        return Err(invalid("empty placeholder"));
                    }
                    if !literal.is_empty() {
                        tokens.push(Token::Literal(std::mem::take(&mut literal)));
                    }
                    tokens.push(Token::Placeholder(name.to_string()));
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Ok(Template {
            source: source.to_string(),
            tokens,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Placeholder names in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|t| match t {
            Token::Placeholder(name) => Some(name.as_str()),
            Token::Literal(_) => None,
        })
    }

    /// Checks every placeholder against `allowed`.
    ///
    /// # Errors
    ///
    /// [`StatgridError::UnknownPlaceholder`] naming the first placeholder that
    /// is not allowed, and `variable`.
    pub fn validate(&self, variable: &str, allowed: impl Fn(&str) -> bool) -> Result<()> {
        match self.placeholders().find(|name| !allowed(name)) {
            Some(name) => Err(StatgridError::UnknownPlaceholder {
                placeholder: name.to_string(),
                variable: variable.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Substitutes statistics from a bundle.
    pub fn render(&self, bundle: &StatisticBundle, rounding: &Rounding) -> String {
        self.render_with(|name| match bundle.value(name) {
            Some(value) => format_fixed(value, rounding.digits_for(name)),
            None => NA.to_string(),
        })
    }

    /// Substitutes each placeholder with `lookup(name)`.
    pub fn render_with(&self, lookup: impl Fn(&str) -> String) -> String {
        let mut out = String::with_capacity(self.source.len());
        for token in &self.tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Placeholder(name) => out.push_str(&lookup(name)),
            }
        }
        out
    }

    /// A reader-facing description of the template, e.g. `Median (Q1, Q3)`
    /// for `{median} ({p25}, {p75})`.
    ///
    /// The `%` unit written right after a percentage placeholder (`{p}%`,
    /// `{p_miss}%`) is dropped, since the label already names it.
    pub fn describe(&self) -> String {
        let mut out = String::with_capacity(self.source.len());
        let mut percent = false;
        for token in &self.tokens {
            match token {
                Token::Literal(text) => {
                    let text = match text.strip_prefix('%') {
                        Some(rest) if percent => rest,
                        _ => text.as_str(),
                    };
                    out.push_str(text);
                    percent = false;
                }
                Token::Placeholder(name) => {
                    let label = statistic_label(name);
                    percent = matches!(name.as_str(), "p" | "p_miss") || label.ends_with('%');
                    out.push_str(&label);
                }
            }
        }
        out
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Display name of a statistic.
pub fn statistic_label(name: &str) -> String {
    let label = match name {
        "mean" => "Mean",
        "sd" => "SD",
        "var" => "Variance",
        "median" => "Median",
        "p25" => "Q1",
        "p75" => "Q3",
        "iqr" => "IQR",
        "min" => "Min",
        "max" => "Max",
        "sum" => "Sum",
        "n" => "n",
        "N" | "N_obs" => "N",
        "p" => "%",
        "N_miss" => "N Missing",
        "N_nonmiss" => "N Non-missing",
        "p_miss" => "% Missing",
        other => {
            return match percentile_name(other) {
                Some(pct) => format!("{}%", pct),
                None => other.to_string(),
            }
        }
    };
    label.to_string()
}

/// Digits for a variable's statistics: one number for all, or a number per
/// statistic.
///
/// ```yaml
/// digits:
///   age: 1
///   marker: { mean: 2, sd: 3 }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Digits {
    Uniform(u32),
    PerStatistic(BTreeMap<String, u32>),
}

/// Decimal places per statistic.
///
/// Resolution order: a per-statistic setting, then counts (always 0), then
/// a uniform setting, then percentages (0), then the continuous default.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rounding {
    continuous: u32,
    uniform: Option<u32>,
    per_statistic: BTreeMap<String, u32>,
}

impl Rounding {
    /// Rounding with `continuous` decimals for non-count, non-percentage
    /// statistics.
    pub fn new(continuous: u32) -> Self {
        Rounding {
            continuous,
            ..Rounding::default()
        }
    }

    pub fn with_statistic(mut self, name: &str, digits: u32) -> Self {
        self.per_statistic.insert(name.to_string(), digits);
        self
    }

    /// Overlays caller-supplied digits.
    pub fn with_digits(mut self, digits: &Digits) -> Self {
        match digits {
            Digits::Uniform(d) => self.uniform = Some(*d),
            Digits::PerStatistic(map) => {
                self.per_statistic
                    .extend(map.iter().map(|(k, v)| (k.clone(), *v)));
            }
        }
        self
    }

    pub fn digits_for(&self, name: &str) -> u32 {
        if let Some(d) = self.per_statistic.get(name) {
            return *d;
        }
        if COUNT_STATISTICS.contains(&name) {
            return 0;
        }
        if let Some(d) = self.uniform {
            return d;
        }
        if PERCENT_STATISTICS.contains(&name) {
            return 0;
        }
        self.continuous
    }
}

/// Default decimals for a continuous variable, from the spread of its
/// overall values: below 1 gives 2, below 10 gives 1, else 0.
pub fn guess_digits(bundle: &StatisticBundle) -> u32 {
    let iqr = bundle.value("iqr").filter(|v| *v > 0.0);
    let range = match (bundle.value("min"), bundle.value("max")) {
        (Some(lo), Some(hi)) => Some(hi - lo),
        _ => None,
    };
    match iqr.or(range) {
        Some(spread) if spread < 1.0 => 2,
        Some(spread) if spread < 10.0 => 1,
        _ => 0,
    }
}

/// Formats with fixed decimals, rounding half away from zero and never
/// printing negative zero.
pub fn format_fixed(value: f64, digits: u32) -> String {
    let factor = 10f64.powi(digits as i32);
    let mut rounded = (value * factor).round() / factor;
    if !rounded.is_finite() {
        rounded = value;
    }
    if rounded == 0.0 {
        rounded = 0.0;
    }
    format!("{:.*}", digits as usize, rounded)
}
