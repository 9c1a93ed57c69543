//! Summary configuration.
//!
//! [`SummaryOptions`] can be built in code or loaded from YAML:
//!
//! ```yaml
//! group_by: trt
//! labels:
//!   age: Age (years)
//! kinds:
//!   grade: categorical
//! statistics:
//!   age: "{mean} ({sd})"
//! digits:
//!   age: 1
//!   marker: { mean: 2, sd: 3 }
//! values:
//!   response: "1"
//! include_overall: true
//! missing_policy: show
//! ```
//!
//! Every key is optional. Variable names in the maps must be dataset columns;
//! this is checked when the summary is built.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classify::VariableKind;
use crate::error::Result;
use crate::template::Digits;

/// Where the overall column goes among the statistics columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallPosition {
    First,
    #[default]
    Last,
}

/// When a variable gets a missing-value row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    /// Always.
    #[serde(alias = "always")]
    Show,
    /// Never.
    #[serde(alias = "no", alias = "never")]
    Hide,
    /// When the variable has missing values in the summarized rows.
    #[default]
    #[serde(alias = "ifany")]
    OnlyIfPresent,
}

/// Statistic templates used when a variable has none of its own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultStatistics {
    pub continuous: String,
    pub categorical: String,
    pub dichotomous: String,
    /// Template of the missing-value row.
    pub missing: String,
}

impl Default for DefaultStatistics {
    fn default() -> Self {
        DefaultStatistics {
            continuous: "{median} ({p25}, {p75})".to_string(),
            categorical: "{n} ({p}%)".to_string(),
            dichotomous: "{n} ({p}%)".to_string(),
            missing: "{N_miss}".to_string(),
        }
    }
}

impl DefaultStatistics {
    pub fn for_kind(&self, kind: VariableKind) -> &str {
        match kind {
            VariableKind::Continuous => &self.continuous,
            VariableKind::Categorical => &self.categorical,
            VariableKind::Dichotomous => &self.dichotomous,
        }
    }

    fn set(&mut self, kind: VariableKind, template: String) {
        match kind {
            VariableKind::Continuous => self.continuous = template,
            VariableKind::Categorical => self.categorical = template,
            VariableKind::Dichotomous => self.dichotomous = template,
        }
    }
}

/// Options for `build_summary`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SummaryOptions {
    /// Column whose levels split the table into groups.
    pub group_by: Option<String>,
    /// Variables to summarize; all columns but `group_by` when unset. Rows
    /// still follow dataset column order.
    pub include: Option<Vec<String>>,
    /// Row labels, overriding column labels.
    pub labels: BTreeMap<String, String>,
    /// Kind overrides.
    pub kinds: BTreeMap<String, VariableKind>,
    /// Statistic template per variable.
    pub statistics: BTreeMap<String, String>,
    pub default_statistics: DefaultStatistics,
    pub digits: BTreeMap<String, Digits>,
    /// Displayed level of dichotomous variables.
    pub values: BTreeMap<String, String>,
    /// Show the overall column in a grouped table.
    pub include_overall: bool,
    pub overall_position: OverallPosition,
    pub missing_policy: MissingPolicy,
    /// Label of the missing-value row.
    pub missing_text: String,
    /// Numeric columns with more distinct values are continuous.
    pub continuous_threshold: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        SummaryOptions {
            group_by: None,
            include: None,
            labels: BTreeMap::new(),
            kinds: BTreeMap::new(),
            statistics: BTreeMap::new(),
            default_statistics: DefaultStatistics::default(),
            digits: BTreeMap::new(),
            values: BTreeMap::new(),
            include_overall: false,
            overall_position: OverallPosition::Last,
            missing_policy: MissingPolicy::OnlyIfPresent,
            missing_text: "Unknown".to_string(),
            continuous_threshold: 9,
        }
    }
}

impl SummaryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses options from YAML.
    ///
    /// # Errors
    ///
    /// [`StatgridError::Config`](crate::StatgridError::Config) on malformed
    /// YAML or unknown keys.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads options from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn group_by(mut self, column: &str) -> Self {
        self.group_by = Some(column.to_string());
        self
    }

    pub fn include<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Some(variables.into_iter().map(Into::into).collect());
        self
    }

    pub fn label(mut self, variable: &str, label: &str) -> Self {
        self.labels.insert(variable.to_string(), label.to_string());
        self
    }

    pub fn kind(mut self, variable: &str, kind: VariableKind) -> Self {
        self.kinds.insert(variable.to_string(), kind);
        self
    }

    pub fn statistic(mut self, variable: &str, template: &str) -> Self {
        self.statistics
            .insert(variable.to_string(), template.to_string());
        self
    }

    /// Sets the default template for one kind.
    pub fn default_statistic(mut self, kind: VariableKind, template: &str) -> Self {
        self.default_statistics.set(kind, template.to_string());
        self
    }

    /// Sets the missing-row template.
    pub fn missing_statistic(mut self, template: &str) -> Self {
        self.default_statistics.missing = template.to_string();
        self
    }

    pub fn digits(mut self, variable: &str, digits: Digits) -> Self {
        self.digits.insert(variable.to_string(), digits);
        self
    }

    pub fn value(mut self, variable: &str, level: &str) -> Self {
        self.values.insert(variable.to_string(), level.to_string());
        self
    }

    pub fn include_overall(mut self, include: bool) -> Self {
        self.include_overall = include;
        self
    }

    pub fn overall_position(mut self, position: OverallPosition) -> Self {
        self.overall_position = position;
        self
    }

    pub fn missing_policy(mut self, policy: MissingPolicy) -> Self {
        self.missing_policy = policy;
        self
    }

    pub fn missing_text(mut self, text: &str) -> Self {
        self.missing_text = text.to_string();
        self
    }

    pub fn continuous_threshold(mut self, threshold: usize) -> Self {
        self.continuous_threshold = threshold;
        self
    }

    /// Variable names referenced by the per-variable maps.
    pub(crate) fn referenced_variables(&self) -> impl Iterator<Item = &str> {
        self.labels
            .keys()
            .chain(self.kinds.keys())
            .chain(self.statistics.keys())
            .chain(self.digits.keys())
            .chain(self.values.keys())
            .chain(self.include.iter().flatten())
            .map(String::as_str)
    }
}
