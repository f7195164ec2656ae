//! Overlap-add zero-phase FIR convolution.
//!
//! Matches MNE's `_overlap_add_filter` + `_1d_overlap_filter`.
//!
//! Zero-phase is achieved by shifting the output left by `(N-1)/2` samples,
//! NOT by running filtfilt. The edge transient is suppressed by
//! reflect-limited padding of `N-1` samples on each side.
use std::sync::Arc;

use anyhow::{bail, Result};
use ndarray::{Array2, ArrayView1};
use rayon::prelude::*;
use rustfft::{Fft, FftPlanner, num_complex::Complex};

/// An FIR kernel with its FFT plans, reusable across channels of one length.
pub struct OverlapAdd {
    n_h:     usize,
    n_fft:   usize,
    h_fft:   Vec<Complex<f64>>,
    fwd:     Arc<dyn Fft<f64>>,
    inv:     Arc<dyn Fft<f64>>,
}

impl OverlapAdd {
    /// Plan the convolution of `h` (odd length) with signals of `n_x` samples.
    pub fn new(h: &[f64], n_x: usize) -> Result<Self> {
        let n_h = h.len();
        if n_h == 0 || n_h % 2 == 0 {
            bail!("FIR kernel must have odd length, got {n_h}");
        }
        let n_ext = n_x + 2 * (n_h - 1);
        let n_fft = choose_fft_len(n_h, n_ext);

        let mut planner: FftPlanner<f64> = FftPlanner::new();
        let fwd = planner.plan_fft_forward(n_fft);
        let inv = planner.plan_fft_inverse(n_fft);

        let mut h_fft = zero_padded(h, n_fft);
        fwd.process(&mut h_fft);

        Ok(Self { n_h, n_fft, h_fft, fwd, inv })
    }

    /// Filter one signal; the output has the same length as `x`.
    pub fn apply(&self, x: &[f64]) -> Vec<f64> {
        let n_x = x.len();
        if n_x == 0 {
            return vec![];
        }
        let (n_h, n_fft) = (self.n_h, self.n_fft);
        let shift = (n_h - 1) / 2;
        let n_edge = n_h - 1;

        let x_ext = reflect_limited_pad(x, n_edge, n_edge);
        let n_ext = x_ext.len();

        let n_seg = n_fft - n_h + 1;
        let inv_scale = 1.0 / n_fft as f64;
        let mut y = vec![0.0_f64; n_ext];

        for start in (0..n_ext).step_by(n_seg) {
            let stop = (start + n_seg).min(n_ext);
            let mut buf = zero_padded(&x_ext[start..stop], n_fft);

            self.fwd.process(&mut buf);
            for (b, &hf) in buf.iter_mut().zip(&self.h_fft) {
                *b *= hf;
            }
            self.inv.process(&mut buf);

            // Accumulate, shifted left by the group delay.
            let out_start = start.saturating_sub(shift);
            let out_end   = (out_start + n_fft).min(n_ext);
            let prod_start = shift.saturating_sub(start);
            for (o, p) in (out_start..out_end).zip(prod_start..n_fft) {
                y[o] += buf[p].re * inv_scale;
            }
        }

        y[n_edge..n_edge + n_x].to_vec()
    }
}

/// Apply a zero-phase FIR filter to each channel of `data` ([C, T]) in-place.
///
/// Channels are filtered in parallel and share one set of FFT plans.
pub fn apply_fir_zero_phase(data: &mut Array2<f64>, h: &[f64]) -> Result<()> {
    let ola = OverlapAdd::new(h, data.ncols())?;
    let rows: Vec<Vec<f64>> = data.rows().into_iter().map(|r| r.to_vec()).collect();
    let filtered: Vec<Vec<f64>> = rows.par_iter().map(|r| ola.apply(r)).collect();
    for (mut row, f) in data.rows_mut().into_iter().zip(filtered) {
        row.assign(&ArrayView1::from(&f));
    }
    Ok(())
}

/// Filter a single 1-D signal.
pub fn filter_1d(x: &[f64], h: &[f64]) -> Result<Vec<f64>> {
    Ok(OverlapAdd::new(h, x.len())?.apply(x))
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Reflect-limited padding (matches MNE's `_smart_pad`).
///
/// Left:  `pad[i] = 2*x[0] - x[n_l-i]`  for i in 1..=n_l
/// Right: `pad[i] = 2*x[-1] - x[-(i+1)]` for i in 1..=n_r
/// Requests longer than the signal are completed with zeros.
fn reflect_limited_pad(x: &[f64], n_l: usize, n_r: usize) -> Vec<f64> {
    let n = x.len();
    let actual_l = n_l.min(n - 1);
    let actual_r = n_r.min(n - 1);
    let (first, last) = (x[0], x[n - 1]);

    let mut out = Vec::with_capacity(n_l + n + n_r);
    out.extend(std::iter::repeat(0.0).take(n_l - actual_l));
    out.extend((1..=actual_l).rev().map(|i| 2.0 * first - x[i]));
    out.extend_from_slice(x);
    out.extend((1..=actual_r).map(|i| 2.0 * last - x[n - 1 - i]));
    out.extend(std::iter::repeat(0.0).take(n_r - actual_r));
    out
}

/// Optimal FFT block size (power of 2 minimising operation count).
///
/// MNE's cost function:
///   `cost = ceil(n_x / (N - n_h + 1)) * N * (log2(N) + 1) + 4e-5 * N * n_x`
fn choose_fft_len(n_h: usize, n_x: usize) -> usize {
    let min_fft = 2 * n_h - 1;
    let max_pow = (n_x as f64).log2().ceil() as u32 + 1;
    let min_pow = (min_fft as f64).log2().ceil() as u32;

    (min_pow..=max_pow.max(min_pow))
        .map(|pow| {
            let n = 1_usize << pow;
            let n_seg = (n - n_h + 1) as f64;
            let cost = (n_x as f64 / n_seg).ceil() * n as f64 * (pow as f64 + 1.0)
                + 4e-5 * n as f64 * n_x as f64;
            (n, cost)
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(n, _)| n)
        .unwrap_or(1 << min_pow)
}

fn zero_padded(x: &[f64], n: usize) -> Vec<Complex<f64>> {
    x.iter()
        .map(|&v| Complex { re: v, im: 0.0 })
        .chain(std::iter::repeat(Complex::default()))
        .take(n)
        .collect()
}
