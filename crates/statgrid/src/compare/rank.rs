//! Rank-based tests: Wilcoxon rank-sum and Kruskal-Wallis.

use super::distribution::{chi_square_sf, normal_cdf};

/// Samples below this size (both of them, without ties) use the exact
/// rank-sum distribution.
const EXACT_RANK_SUM_LIMIT: usize = 50;

/// Midranks of pooled samples, returned per sample, plus the tie term
/// `sum(t^3 - t)` over tie groups.
pub(crate) fn pooled_ranks(samples: &[Vec<f64>]) -> (Vec<Vec<f64>>, f64) {
    let mut pooled: Vec<(f64, usize, usize)> = samples
        .iter()
        .enumerate()
        .flat_map(|(g, values)| values.iter().enumerate().map(move |(i, v)| (*v, g, i)))
        .collect();
    pooled.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut ranks: Vec<Vec<f64>> = samples.iter().map(|s| vec![0.0; s.len()]).collect();
    let mut ties = 0.0;
    let mut start = 0;
    while start < pooled.len() {
        let mut end = start + 1;
        while end < pooled.len() && pooled[end].0 == pooled[start].0 {
            end += 1;
        }
        // 1-based ranks start+1..=end share their mean
        let rank = (start + 1 + end) as f64 / 2.0;
        for &(_, g, i) in &pooled[start..end] {
            ranks[g][i] = rank;
        }
        let t = (end - start) as f64;
        ties += t * t * t - t;
        start = end;
    }
    (ranks, ties)
}

/// Outcome of a two-sample rank-sum test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct RankSum {
    /// Mann-Whitney U of the first sample.
    pub statistic: f64,
    pub p_value: Option<f64>,
    pub exact: bool,
}

/// Two-sided Wilcoxon rank-sum (Mann-Whitney) test.
pub(crate) fn rank_sum(x: &[f64], y: &[f64]) -> RankSum {
    let (n1, n2) = (x.len(), y.len());
    if n1 == 0 || n2 == 0 {
        return RankSum {
            statistic: f64::NAN,
            p_value: None,
            exact: false,
        };
    }
    let (ranks, ties) = pooled_ranks(&[x.to_vec(), y.to_vec()]);
    let r1: f64 = ranks[0].iter().sum();
    let u = r1 - (n1 * (n1 + 1)) as f64 / 2.0;

    if ties == 0.0 && n1 < EXACT_RANK_SUM_LIMIT && n2 < EXACT_RANK_SUM_LIMIT {
        let dist = u_distribution(n1, n2);
        let total: f64 = dist.iter().sum();
        // U is an integer without ties
        let q = u.round() as usize;
        let mean = (n1 * n2) as f64 / 2.0;
        let tail = if u > mean {
            dist[q..].iter().sum::<f64>()
        } else {
            dist[..=q].iter().sum::<f64>()
        };
        return RankSum {
            statistic: u,
            p_value: Some((2.0 * tail / total).min(1.0)),
            exact: true,
        };
    }

    let n = (n1 + n2) as f64;
    let (n1f, n2f) = (n1 as f64, n2 as f64);
    let z = u - n1f * n2f / 2.0;
    let sigma = (n1f * n2f / 12.0 * ((n + 1.0) - ties / (n * (n - 1.0)))).sqrt();
    if sigma <= 0.0 || !sigma.is_finite() {
        return RankSum {
            statistic: u,
            p_value: None,
            exact: false,
        };
    }
    let correction = 0.5 * z.signum();
    let z = (z - correction) / sigma;
    let p = 2.0 * normal_cdf(z).min(normal_cdf(-z));
    RankSum {
        statistic: u,
        p_value: Some(p.min(1.0)),
        exact: false,
    }
}

/// Frequencies of U = 0..=n1*n2 under the null hypothesis.
///
/// Counts the m-subsets of ranks 1..=m+n by rank sum, then shifts by the
/// minimum rank sum.
fn u_distribution(m: usize, n: usize) -> Vec<f64> {
    let total = m + n;
    let max_sum: usize = (n + 1..=total).sum();
    // counts[k][s]: k-subsets of the ranks seen so far with rank sum s
    let mut counts = vec![vec![0.0f64; max_sum + 1]; m + 1];
    counts[0][0] = 1.0;
    for rank in 1..=total {
        for k in (1..=m.min(rank)).rev() {
            for s in (rank..=max_sum).rev() {
                let add = counts[k - 1][s - rank];
                if add != 0.0 {
                    counts[k][s] += add;
                }
            }
        }
    }
    let min_sum = m * (m + 1) / 2;
    counts[m][min_sum..=max_sum].to_vec()
}

/// Outcome of a Kruskal-Wallis test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct KruskalWallis {
    pub statistic: f64,
    pub df: f64,
    pub p_value: Option<f64>,
}

/// Kruskal-Wallis rank-sum test with tie correction. Empty samples are
/// ignored.
pub(crate) fn kruskal_wallis(samples: &[Vec<f64>]) -> KruskalWallis {
    let samples: Vec<Vec<f64>> = samples.iter().filter(|s| !s.is_empty()).cloned().collect();
    let k = samples.len();
    let n: usize = samples.iter().map(Vec::len).sum();
    if k < 2 || n < 2 {
        return KruskalWallis {
            statistic: f64::NAN,
            df: k.saturating_sub(1) as f64,
            p_value: None,
        };
    }
    let (ranks, ties) = pooled_ranks(&samples);
    let nf = n as f64;
    let h: f64 = 12.0 / (nf * (nf + 1.0))
        * ranks
            .iter()
            .map(|r| {
                let sum: f64 = r.iter().sum();
                sum * sum / r.len() as f64
            })
            .sum::<f64>()
        - 3.0 * (nf + 1.0);
    let correction = 1.0 - ties / (nf * nf * nf - nf);
    let df = (k - 1) as f64;
    if correction <= 0.0 {
        return KruskalWallis {
            statistic: f64::NAN,
            df,
            p_value: None,
        };
    }
    let statistic = h / correction;
    KruskalWallis {
        statistic,
        df,
        p_value: Some(chi_square_sf(statistic, df)),
    }
}
