//! Single-link evaluation: one metric value for one ordered channel pair.
//!
//! A transmission delay `d` shifts the two segments against each other
//! before the estimator sees them, so that `a[k]` is paired with `b[k + d]`:
//!
//! ```text
//! d > 0 :  a[..n-d]   vs  b[d..]      (b lags a)
//! d = 0 :  a          vs  b
//! d < 0 :  a[|d|..]   vs  b[..n-|d|]  (a lags b)
//! ```
use ndarray::{ArrayView1, s};
use std::borrow::Cow;

use crate::error::{DfcError, Result};
use crate::estimators::{correlation, symbolic};
use crate::metric::Metric;

/// Reject delays longer than a tenth of the window.
///
/// `delay = window_length / 10` is accepted; anything beyond fails.
pub fn check_delay(delay: isize, window_length: usize) -> Result<()> {
    if delay.unsigned_abs() as f64 > window_length as f64 / 10.0 {
        return Err(DfcError::config(format!(
            "delay {delay} exceeds window_length / 10 = {}", window_length as f64 / 10.0
        )));
    }
    Ok(())
}

/// Truncate `a` and `b` so that `a[k]` lines up with `b[k + delay]`.
pub fn shift_pair<'a>(
    a: ArrayView1<'a, f64>,
    b: ArrayView1<'a, f64>,
    delay: isize,
) -> Result<(ArrayView1<'a, f64>, ArrayView1<'a, f64>)> {
    let n = a.len();
    if b.len() != n {
        return Err(DfcError::config(format!(
            "segment lengths differ: {n} vs {}", b.len()
        )));
    }
    let d = delay.unsigned_abs();
    if d >= n && delay != 0 {
        return Err(DfcError::config(format!(
            "delay {delay} leaves no samples in a segment of {n}"
        )));
    }
    Ok(match delay {
        0 => (a, b),
        _ if delay > 0 => (a.slice_move(s![..n - d]), b.slice_move(s![d..])),
        _ => (a.slice_move(s![d..]), b.slice_move(s![..n - d])),
    })
}

/// Evaluate `metric` on the delay-shifted pair `(a, b)`.
///
/// For directed metrics the result is the dependency `a → b`.  Estimator
/// failures are returned as [`DfcError::Estimator`] so the caller can decide
/// whether a single bad link is fatal.
pub fn evaluate<'a, 'b>(
    a: ArrayView1<'a, f64>,
    b: ArrayView1<'b, f64>,
    metric: &Metric,
    delay: isize,
) -> Result<f64> {
    let (a, b) = shift_pair(a.view(), b.view(), delay)?;
    let (x, y) = (contiguous(a), contiguous(b));
    let value = match metric {
        Metric::TransferEntropy(p) => symbolic::transfer_entropy(&x, &y, p)?,
        Metric::MutualInfo(p)      => symbolic::mutual_info(&x, &y, p)?,
        Metric::Pearson            => correlation::pearson(&x, &y)?,
        Metric::Spearman           => correlation::spearman(&x, &y)?,
    };
    Ok(value)
}

fn contiguous<'a>(v: ArrayView1<'a, f64>) -> Cow<'a, [f64]> {
    match v.to_slice() {
        Some(s) => Cow::Borrowed(s),
        None => Cow::Owned(v.to_vec()),
    }
}
