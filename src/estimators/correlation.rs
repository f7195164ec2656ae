//! Correlation coefficients.
//!
//! `pearson`:  matches `scipy.stats.pearsonr(x, y)[0]`.
//! `spearman`: matches `scipy.stats.spearmanr(x, y).correlation`: Pearson
//!   correlation of the ranks, ties receiving their average rank.
use super::check_pair;
use crate::error::EstimatorError;

/// Pearson product-moment correlation.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64, EstimatorError> {
    check_pair(x, y)?;
    let n = x.len();
    if n < 2 {
        return Err(EstimatorError::InsufficientSamples { needed: 2, got: n });
    }
    let mx = x.iter().sum::<f64>() / n as f64;
    let my = y.iter().sum::<f64>() / n as f64;

    let (mut sxy, mut sxx, mut syy) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (&a, &b) in x.iter().zip(y) {
        let (da, db) = (a - mx, b - my);
        sxy += da * db;
        sxx += da * da;
        syy += db * db;
    }
    if sxx == 0.0 || syy == 0.0 {
        return Err(EstimatorError::ZeroVariance);
    }
    Ok((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

/// Spearman rank correlation.
pub fn spearman(x: &[f64], y: &[f64]) -> Result<f64, EstimatorError> {
    check_pair(x, y)?;
    pearson(&rank_average(x), &rank_average(y))
}

/// 1-based ranks, ties sharing the mean of the ranks they span.
pub fn rank_average(x: &[f64]) -> Vec<f64> {
    let n = x.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| x[a].total_cmp(&x[b]));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && x[order[j]] == x[order[i]] {
            j += 1;
        }
        // positions i..j (0-based) hold equal values → ranks i+1..=j
        let r = (i + j + 1) as f64 / 2.0;
        for &k in &order[i..j] {
            ranks[k] = r;
        }
        i = j;
    }
    ranks
}
