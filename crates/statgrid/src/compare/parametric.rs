//! Mean-based tests: Welch's t-test and one-way ANOVA.

use super::distribution::{f_sf, student_t_two_sided};

fn mean_var(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, var)
}

/// Outcome of a parametric test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Parametric {
    pub statistic: f64,
    pub df: (f64, f64),
    pub p_value: Option<f64>,
}

impl Parametric {
    fn undefined() -> Self {
        Parametric {
            statistic: f64::NAN,
            df: (f64::NAN, f64::NAN),
            p_value: None,
        }
    }
}

/// Two-sided Welch t-test (unequal variances).
pub(crate) fn welch_t(x: &[f64], y: &[f64]) -> Parametric {
    if x.len() < 2 || y.len() < 2 {
        return Parametric::undefined();
    }
    let (m1, v1) = mean_var(x);
    let (m2, v2) = mean_var(y);
    let (s1, s2) = (v1 / x.len() as f64, v2 / y.len() as f64);
    let se2 = s1 + s2;
    if se2 <= 0.0 {
        return Parametric::undefined();
    }
    let t = (m1 - m2) / se2.sqrt();
    let df = se2 * se2
        / (s1 * s1 / (x.len() as f64 - 1.0) + s2 * s2 / (y.len() as f64 - 1.0));
    Parametric {
        statistic: t,
        df: (df, f64::NAN),
        p_value: Some(student_t_two_sided(t, df)),
    }
}

/// One-way analysis of variance. Empty samples are ignored.
pub(crate) fn anova(samples: &[Vec<f64>]) -> Parametric {
    let samples: Vec<&Vec<f64>> = samples.iter().filter(|s| !s.is_empty()).collect();
    let k = samples.len();
    let n: usize = samples.iter().map(|s| s.len()).sum();
    if k < 2 || n <= k {
        return Parametric::undefined();
    }
    let grand = samples.iter().flat_map(|s| s.iter()).sum::<f64>() / n as f64;
    let mut between = 0.0;
    let mut within = 0.0;
    for sample in &samples {
        let mean = sample.iter().sum::<f64>() / sample.len() as f64;
        between += sample.len() as f64 * (mean - grand).powi(2);
        within += sample.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    }
    let df1 = (k - 1) as f64;
    let df2 = (n - k) as f64;
    if within <= 0.0 {
        return Parametric::undefined();
    }
    let f = (between / df1) / (within / df2);
    Parametric {
        statistic: f,
        df: (df1, df2),
        p_value: Some(f_sf(f, df1, df2)),
    }
}
