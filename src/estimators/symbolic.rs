//! Symbolic (partition-based) information measures.
//!
//! Continuous samples are discretised against ordered boundaries `divs`:
//!
//! ```text
//! symbol(v) = #{ d ∈ divs : d <= v }          ∈ [0, divs.len()]
//! ```
//!
//! A word of length `L` and embedding delay `τ` starting at `t` is
//! `(s[t], s[t+τ], …, s[t+(L-1)τ])`, packed into one integer.  Probabilities
//! are plug-in frequencies and all logarithms are base 2.  Counts live in
//! ordered maps so the summation order, and hence the result, is
//! reproducible bit for bit.
//!
//! Mutual information over aligned words:
//!
//! ```text
//! I(X;Y) = Σ p(x,y) · log2[ p(x,y) / (p(x) p(y)) ]
//! ```
//!
//! Transfer entropy X → Y, with `y⁺ = s_y[t + Lτ]` the symbol following the
//! word of Y:
//!
//! ```text
//! T(X→Y) = Σ p(y⁺, yʷ, xʷ) · log2[ p(y⁺ | yʷ, xʷ) / p(y⁺ | yʷ) ]
//! ```
use std::collections::BTreeMap;

use super::check_pair;
use crate::error::EstimatorError;
use crate::metric::SymbolicParams;

/// Map each sample to its partition index.
pub fn symbolize(x: &[f64], divs: &[f64]) -> Vec<usize> {
    x.iter().map(|&v| divs.partition_point(|&d| d <= v)).collect()
}

/// Pack the first `count` words of `symbols` into integers.
///
/// Panics if `count + (symbolic_length - 1) · tau > symbols.len()`, or if
/// `n_symbols^symbolic_length` overflows (see [`SymbolicParams::n_words`]).
pub fn words(symbols: &[usize], n_symbols: usize, tau: usize, symbolic_length: usize, count: usize) -> Vec<usize> {
    (0..count)
        .map(|t| {
            (0..symbolic_length)
                .rev()
                .fold(0, |acc, k| acc * n_symbols + symbols[t + k * tau])
        })
        .collect()
}

/// Mutual information between the symbolic words of `x` and `y`, in bits.
pub fn mutual_info(x: &[f64], y: &[f64], params: &SymbolicParams) -> Result<f64, EstimatorError> {
    check_pair(x, y)?;
    let span = params.word_span();
    if x.len() < span {
        return Err(EstimatorError::InsufficientSamples { needed: span, got: x.len() });
    }
    let n_words = x.len() - span + 1;
    let (wx, wy) = word_pair(x, y, params, n_words)?;

    let c_xy = counts(wx.iter().copied().zip(wy.iter().copied()));
    let c_x = counts(wx.iter().copied());
    let c_y = counts(wy.iter().copied());

    let n = n_words as f64;
    let mi = c_xy
        .iter()
        .map(|(&(a, b), &c)| {
            let c = c as f64;
            c / n * (c * n / (c_x[&a] as f64 * c_y[&b] as f64)).log2()
        })
        .sum::<f64>();
    Ok(mi.max(0.0))
}

/// Transfer entropy from `x` to `y`, in bits.
pub fn transfer_entropy(x: &[f64], y: &[f64], params: &SymbolicParams) -> Result<f64, EstimatorError> {
    check_pair(x, y)?;
    let lead = params.symbolic_length * params.tau;
    if x.len() <= lead {
        return Err(EstimatorError::InsufficientSamples { needed: lead + 1, got: x.len() });
    }
    let n_obs = x.len() - lead;
    let (wx, wy) = word_pair(x, y, params, n_obs)?;
    let sy = symbolize(y, &params.divs);
    let future = &sy[lead..];

    let mut c_fyx: BTreeMap<(usize, usize, usize), usize> = BTreeMap::new();
    let mut c_yx:  BTreeMap<(usize, usize), usize> = BTreeMap::new();
    let mut c_fy:  BTreeMap<(usize, usize), usize> = BTreeMap::new();
    let mut c_y:   BTreeMap<usize, usize> = BTreeMap::new();
    for t in 0..n_obs {
        let (f, yw, xw) = (future[t], wy[t], wx[t]);
        *c_fyx.entry((f, yw, xw)).or_default() += 1;
        *c_yx.entry((yw, xw)).or_default() += 1;
        *c_fy.entry((f, yw)).or_default() += 1;
        *c_y.entry(yw).or_default() += 1;
    }

    let n = n_obs as f64;
    let te = c_fyx
        .iter()
        .map(|(&(f, yw, xw), &c)| {
            let c = c as f64;
            let ratio = c * c_y[&yw] as f64 / (c_yx[&(yw, xw)] as f64 * c_fy[&(f, yw)] as f64);
            c / n * ratio.log2()
        })
        .sum::<f64>();
    // Conditioning cannot increase entropy; clip rounding noise.
    Ok(te.max(0.0))
}

fn word_pair(
    x: &[f64],
    y: &[f64],
    params: &SymbolicParams,
    count: usize,
) -> Result<(Vec<usize>, Vec<usize>), EstimatorError> {
    let k = params.n_symbols();
    if params.n_words().is_none() {
        return Err(EstimatorError::WordOverflow { n_symbols: k, symbolic_length: params.symbolic_length });
    }
    let sx = symbolize(x, &params.divs);
    let sy = symbolize(y, &params.divs);
    Ok((
        words(&sx, k, params.tau, params.symbolic_length, count),
        words(&sy, k, params.tau, params.symbolic_length, count),
    ))
}

fn counts<K: Ord>(it: impl Iterator<Item = K>) -> BTreeMap<K, usize> {
    let mut m = BTreeMap::new();
    for k in it {
        *m.entry(k).or_default() += 1;
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn symbolize_counts_boundaries() {
        let divs = [-0.5, 0.0, 0.5];
        let s = symbolize(&[-1.0, -0.5, -0.1, 0.0, 0.49, 0.5, 2.0], &divs);
        assert_eq!(s, vec![0, 1, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn words_pack_with_tau() {
        // n_symbols = 3, tau = 2, L = 2: word(t) = s[t] + 3·s[t+2]
        let s = [0, 1, 2, 0, 1];
        assert_eq!(words(&s, 3, 2, 2, 3), vec![6, 1, 5]);
    }

    #[test]
    fn mi_of_independent_constant_is_zero() {
        let p = SymbolicParams::default();
        let x: Vec<f64> = (0..64).map(|i| (i as f64 * 0.37).sin()).collect();
        let y = vec![0.0; 64];
        assert_abs_diff_eq!(mutual_info(&x, &y, &p).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn mi_two_balanced_symbols_is_one_bit() {
        let p = SymbolicParams { divs: vec![0.0], ..SymbolicParams::default() };
        let x: Vec<f64> = (0..100).map(|i| if i % 2 == 0 { -1.0 } else { 1.0 }).collect();
        assert_abs_diff_eq!(mutual_info(&x, &x, &p).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn te_too_short() {
        let p = SymbolicParams { symbolic_length: 2, tau: 2, ..SymbolicParams::default() };
        let err = transfer_entropy(&[0.0; 4], &[0.0; 4], &p).unwrap_err();
        assert_eq!(err, EstimatorError::InsufficientSamples { needed: 5, got: 4 });
    }

    #[test]
    fn oversized_word_alphabet_is_an_error() {
        let p = SymbolicParams { symbolic_length: 23, ..SymbolicParams::default() };
        let x: Vec<f64> = (0..400).map(|i| (i as f64 * 0.05).sin()).collect();
        let overflow = EstimatorError::WordOverflow { n_symbols: 7, symbolic_length: 23 };
        assert_eq!(mutual_info(&x, &x, &p).unwrap_err(), overflow);
        assert_eq!(transfer_entropy(&x, &x, &p).unwrap_err(), overflow);
    }

    #[test]
    fn nan_rejected() {
        let p = SymbolicParams::default();
        let x = [0.0, f64::NAN, 0.2];
        assert_eq!(mutual_info(&x, &[0.0; 3], &p).unwrap_err(), EstimatorError::NonFinite);
    }
}
