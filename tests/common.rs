/// Shared helpers: synthetic recordings.
use dfc::Recording;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

pub const SFREQ: f64 = 250.0;

#[allow(unused)]
pub fn ch_names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("EEG{:03}", i + 1)).collect()
}

#[allow(unused)]
/// 4 channels × `n` samples: channels 0 and 1 carry the same 5 Hz sine,
/// channels 2 and 3 independent uniform noise in `[-1, 1]`.
pub fn sine_noise_recording(n: usize, seed: u64) -> Recording {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = Array2::<f64>::zeros((4, n));
    for t in 0..n {
        let s = (2.0 * PI * 5.0 * t as f64 / SFREQ).sin();
        data[[0, t]] = s;
        data[[1, t]] = s;
        data[[2, t]] = rng.gen_range(-1.0..1.0);
        data[[3, t]] = rng.gen_range(-1.0..1.0);
    }
    Recording::new(data, ch_names(4), SFREQ).unwrap()
}

#[allow(unused)]
/// `n_ch` channels of independent uniform noise in `[-1, 1]`.
pub fn noise_recording(n_ch: usize, n: usize, seed: u64) -> Recording {
    let mut rng = StdRng::seed_from_u64(seed);
    let data = Array2::from_shape_fn((n_ch, n), |_| rng.gen_range(-1.0..1.0));
    Recording::new(data, ch_names(n_ch), SFREQ).unwrap()
}

#[allow(unused)]
/// Channel 1 is channel 0 delayed by `lag` samples; channel 0 is noise.
pub fn driven_pair(n: usize, lag: usize, seed: u64) -> Recording {
    let mut rng = StdRng::seed_from_u64(seed);
    let x: Vec<f64> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let mut data = Array2::<f64>::zeros((2, n));
    for t in 0..n {
        data[[0, t]] = x[t];
        data[[1, t]] = if t >= lag { x[t - lag] } else { rng.gen_range(-1.0..1.0) };
    }
    Recording::new(data, ch_names(2), SFREQ).unwrap()
}

#[allow(unused)]
/// Every ordered pair `(i, j)` with `i != j`.
pub fn off_diagonal(n_ch: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n_ch).flat_map(move |i| (0..n_ch).filter(move |&j| j != i).map(move |j| (i, j)))
}
