//! Comparison tests across groups.
//!
//! For each variable one test is chosen and run on the rows of the group
//! partition:
//!
//! | Variable | Groups | Default test |
//! |----------|--------|--------------|
//! | continuous | 2 | Wilcoxon rank-sum |
//! | continuous | 3+ | Kruskal-Wallis |
//! | categorical, dichotomous | any | Pearson chi-square, or Fisher's exact test when an expected count is small |
//!
//! An explicit test in [`ComparisonOptions::tests`] always wins, provided it
//! fits the variable. Exact tests are bounded: Fisher's test falls back to
//! chi-square above `exact_max_rows` or when its enumeration budget runs
//! out.

pub mod adjust;
mod contingency;
mod distribution;
mod parametric;
mod rank;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classify::{Classified, VariableKind};
use crate::error::{Result, StatgridError};
use crate::partition::GroupPartition;
use crate::template::{format_fixed, Template, NA};

pub use adjust::{adjust, AdjustMethod};

/// A comparison test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    RankSum,
    KruskalWallis,
    WelchT,
    Anova,
    ChiSquare,
    ChiSquareUncorrected,
    FisherExact,
}

impl TestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestKind::RankSum => "rank_sum",
            TestKind::KruskalWallis => "kruskal_wallis",
            TestKind::WelchT => "welch_t",
            TestKind::Anova => "anova",
            TestKind::ChiSquare => "chi_square",
            TestKind::ChiSquareUncorrected => "chi_square_uncorrected",
            TestKind::FisherExact => "fisher_exact",
        }
    }

    /// Name printed in the test footnote.
    pub fn description(&self) -> &'static str {
        match self {
            TestKind::RankSum => "Wilcoxon rank sum test",
            TestKind::KruskalWallis => "Kruskal-Wallis rank sum test",
            TestKind::WelchT => "Welch Two Sample t-test",
            TestKind::Anova => "One-way ANOVA",
            TestKind::ChiSquare => "Pearson's Chi-squared test",
            TestKind::ChiSquareUncorrected => {
                "Pearson's Chi-squared test without continuity correction"
            }
            TestKind::FisherExact => "Fisher's exact test",
        }
    }

    /// Whether the test compares numeric samples (as opposed to counts).
    pub fn is_continuous(&self) -> bool {
        matches!(
            self,
            TestKind::RankSum | TestKind::KruskalWallis | TestKind::WelchT | TestKind::Anova
        )
    }

    /// Whether the test compares exactly two groups.
    pub fn is_two_sample(&self) -> bool {
        matches!(self, TestKind::RankSum | TestKind::WelchT)
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How p-values are printed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PvalueStyle {
    /// `<0.001`, 3 decimals below 0.1, 2 below 0.2, 1 up to 0.9, then `>0.9`.
    #[default]
    Adaptive,
    /// Fixed decimals; values below `floor` print as `<floor`.
    Fixed { digits: u32, floor: f64 },
}

impl PvalueStyle {
    pub fn format(&self, p: f64) -> String {
        match *self {
            PvalueStyle::Adaptive => {
                if p < 0.001 {
                    "<0.001".to_string()
                } else if p < 0.1 {
                    format_fixed(p, 3)
                } else if p < 0.2 {
                    format_fixed(p, 2)
                } else if p <= 0.9 {
                    format_fixed(p, 1)
                } else {
                    ">0.9".to_string()
                }
            }
            PvalueStyle::Fixed { digits, floor } => {
                if p < floor {
                    format!("<{}", format_fixed(floor, digits))
                } else {
                    format_fixed(p, digits)
                }
            }
        }
    }
}

/// Options for `add_comparison`.
///
/// ```yaml
/// tests:
///   age: welch_t
///   grade: fisher_exact
/// min_expected: 5
/// pvalue_style: { fixed: { digits: 3, floor: 0.001 } }
/// adjust: holm
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComparisonOptions {
    /// Test per variable, overriding the default choice.
    pub tests: BTreeMap<String, TestKind>,
    /// Expected count below which categorical variables use Fisher's test.
    pub min_expected: f64,
    /// Row ceiling for exact tests.
    pub exact_max_rows: usize,
    /// Tables Fisher's test may enumerate before falling back.
    pub fisher_budget: usize,
    /// Template for the p-value cell; `{p}` is the only placeholder.
    pub pvalue_template: String,
    pub pvalue_style: PvalueStyle,
    /// Show adjusted p-values in the p-value column.
    pub adjust: Option<AdjustMethod>,
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        ComparisonOptions {
            tests: BTreeMap::new(),
            min_expected: 5.0,
            exact_max_rows: 1000,
            fisher_budget: 200_000,
            pvalue_template: "{p}".to_string(),
            pvalue_style: PvalueStyle::Adaptive,
            adjust: None,
        }
    }
}

impl ComparisonOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn test(mut self, variable: &str, test: TestKind) -> Self {
        self.tests.insert(variable.to_string(), test);
        self
    }

    pub fn min_expected(mut self, min_expected: f64) -> Self {
        self.min_expected = min_expected;
        self
    }

    pub fn exact_max_rows(mut self, rows: usize) -> Self {
        self.exact_max_rows = rows;
        self
    }

    pub fn fisher_budget(mut self, budget: usize) -> Self {
        self.fisher_budget = budget;
        self
    }

    pub fn pvalue_template(mut self, template: &str) -> Self {
        self.pvalue_template = template.to_string();
        self
    }

    pub fn pvalue_style(mut self, style: PvalueStyle) -> Self {
        self.pvalue_style = style;
        self
    }

    pub fn adjust(mut self, method: AdjustMethod) -> Self {
        self.adjust = Some(method);
        self
    }

    /// Parses and checks the p-value template.
    pub(crate) fn parsed_template(&self) -> Result<Template> {
        let template = Template::parse(&self.pvalue_template)?;
        template.validate("p.value", |name| name == "p")?;
        Ok(template)
    }
}

/// Result of one comparison.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TestOutcome {
    /// The test actually run, after any fallback.
    pub test: TestKind,
    pub statistic: Option<f64>,
    pub p_value: Option<f64>,
}

/// Formats a p-value through the p-value template.
pub(crate) fn format_pvalue(p: Option<f64>, template: &Template, style: &PvalueStyle) -> String {
    template.render_with(|_| match p {
        Some(p) => style.format(p),
        None => NA.to_string(),
    })
}

/// Checks that `test` can run on a variable of `kind` with `groups` groups.
pub(crate) fn check_compatible(
    test: TestKind,
    variable: &str,
    kind: VariableKind,
    groups: usize,
) -> Result<()> {
    let incompatible = |reason: String| StatgridError::IncompatibleTest {
        test: test.as_str(),
        variable: variable.to_string(),
        reason,
    };
    let continuous = kind == VariableKind::Continuous;
    if test.is_continuous() && !continuous {
        return Err(incompatible(format!("needs a continuous variable, found {}", kind)));
    }
    if !test.is_continuous() && continuous {
        return Err(incompatible("needs a categorical or dichotomous variable".into()));
    }
    if test.is_two_sample() && groups != 2 {
        return Err(incompatible(format!("needs exactly 2 groups, found {}", groups)));
    }
    Ok(())
}

/// Non-missing values of a continuous variable per group.
fn samples(values: &[Option<f64>], partition: &GroupPartition) -> Vec<Vec<f64>> {
    (0..partition.num_levels())
        .map(|g| partition.rows(g).iter().filter_map(|&r| values[r]).collect())
        .collect()
}

/// Level-by-group counts of a categorical variable.
fn contingency_table(
    codes: &[Option<usize>],
    n_levels: usize,
    partition: &GroupPartition,
) -> Vec<Vec<u64>> {
    let mut table = vec![vec![0u64; partition.num_levels()]; n_levels];
    for g in 0..partition.num_levels() {
        for &row in partition.rows(g) {
            if let Some(code) = codes[row] {
                if code < n_levels {
                    table[code][g] += 1;
                }
            }
        }
    }
    table
}

/// Chooses and runs the test for one variable.
///
/// # Errors
///
/// [`StatgridError::IncompatibleTest`] when the requested test does not fit.
pub(crate) fn compare(
    variable: &str,
    classified: &Classified,
    partition: &GroupPartition,
    options: &ComparisonOptions,
) -> Result<TestOutcome> {
    let groups = partition.num_levels();
    let requested = options.tests.get(variable).copied();
    if let Some(test) = requested {
        check_compatible(test, variable, classified.kind(), groups)?;
    }

    let outcome = match classified {
        Classified::Continuous { values } => {
            let samples = samples(values, partition);
            let test = requested.unwrap_or(if groups == 2 {
                TestKind::RankSum
            } else {
                TestKind::KruskalWallis
            });
            run_continuous(test, &samples)
        }
        Classified::Categorical { levels, codes } | Classified::Dichotomous { levels, codes, .. } => {
            let table = contingency_table(codes, levels.len(), partition);
            let test = requested.unwrap_or_else(|| {
                match contingency::min_expected(&table) {
                    Some(min) if min < options.min_expected => TestKind::FisherExact,
                    _ => TestKind::ChiSquare,
                }
            });
            run_table(test, variable, &table, options)
        }
    };

    tracing::debug!(
        variable,
        test = %outcome.test,
        requested = requested.is_some(),
        p_value = ?outcome.p_value,
        "ran comparison"
    );
    Ok(outcome)
}

fn run_continuous(test: TestKind, samples: &[Vec<f64>]) -> TestOutcome {
    let (statistic, p_value) = match test {
        TestKind::RankSum => {
            let result = rank::rank_sum(&samples[0], &samples[1]);
            (result.statistic, result.p_value)
        }
        TestKind::WelchT => {
            let result = parametric::welch_t(&samples[0], &samples[1]);
            (result.statistic, result.p_value)
        }
        TestKind::Anova => {
            let result = parametric::anova(samples);
            (result.statistic, result.p_value)
        }
        _ => {
            let result = rank::kruskal_wallis(samples);
            (result.statistic, result.p_value)
        }
    };
    TestOutcome {
        test,
        statistic: Some(statistic).filter(|s| s.is_finite()),
        p_value,
    }
}

fn run_table(
    test: TestKind,
    variable: &str,
    table: &[Vec<u64>],
    options: &ComparisonOptions,
) -> TestOutcome {
    if test == TestKind::FisherExact {
        let total: u64 = table.iter().flatten().sum();
        if total as usize > options.exact_max_rows {
            tracing::warn!(
                variable,
                rows = total,
                limit = options.exact_max_rows,
                "too many rows for Fisher's exact test, using chi-square"
            );
        } else {
            match contingency::fisher_exact(table, options.fisher_budget) {
                Some(p) => {
                    return TestOutcome {
                        test,
                        statistic: None,
                        p_value: Some(p),
                    }
                }
                None => tracing::warn!(
                    variable,
                    budget = options.fisher_budget,
                    "Fisher's exact test exceeded its budget, using chi-square"
                ),
            }
        }
    }
    let (test, correct) = match test {
        TestKind::ChiSquareUncorrected => (test, false),
        _ => (TestKind::ChiSquare, true),
    };
    let result = contingency::chi_square(table, correct);
    TestOutcome {
        test,
        statistic: Some(result.statistic).filter(|s| s.is_finite()),
        p_value: result.p_value,
    }
}
