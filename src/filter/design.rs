//! FIR band-pass design matching MNE / `scipy.signal.firwin`.
//!
//! For a pass band `[l_freq, h_freq]` Hz at sampling rate `sfreq`:
//!   • low edge transition bandwidth  = min(max(0.25 · l_freq, 2.0), l_freq)
//!   • high edge transition bandwidth = min(max(0.25 · h_freq, 2.0), sfreq/2 − h_freq)
//!   • filter length N = ceil(3.3 / trans_bw · sfreq), rounded to odd,
//!     using the narrower of the two transition bands
//!   • cutoffs at the middle of each transition band
//!   • windowed-sinc design (Hamming window); band-pass is the difference of
//!     two low-passes of the same length
use std::f64::consts::PI;

/// MNE-compatible transition bandwidth for the lower (highpass) edge.
///
/// Rule: `min(max(0.25 * l_freq, 2.0), l_freq)`
pub fn auto_trans_bandwidth(l_freq: f64) -> f64 {
    (0.25 * l_freq).max(2.0).min(l_freq)
}

/// MNE-compatible transition bandwidth for the upper (lowpass) edge.
///
/// Rule: `min(max(0.25 * h_freq, 2.0), sfreq / 2 - h_freq)`
pub fn auto_trans_bandwidth_high(h_freq: f64, sfreq: f64) -> f64 {
    (0.25 * h_freq).max(2.0).min(sfreq / 2.0 - h_freq)
}

/// Number of FIR taps for a given transition bandwidth.
/// Returns an odd integer (required for zero-phase linear-phase FIR).
///
/// Formula: `ceil(3.3 / trans_bw * sfreq)` rounded up to odd.
pub fn auto_filter_length(trans_bw: f64, sfreq: f64) -> usize {
    let n_raw = (3.3 / trans_bw * sfreq).ceil() as usize;
    if n_raw % 2 == 0 { n_raw + 1 } else { n_raw }
}

/// Zero-phase highpass at `l_freq` via spectral inversion of a lowpass.
pub fn design_highpass(l_freq: f64, sfreq: f64) -> Vec<f64> {
    let trans_bw = auto_trans_bandwidth(l_freq);
    let n = auto_filter_length(trans_bw, sfreq);
    let cutoff = l_freq - trans_bw / 2.0;
    firwin(n, cutoff, sfreq, false)
}

/// Zero-phase lowpass at `h_freq`.
pub fn design_lowpass(h_freq: f64, sfreq: f64) -> Vec<f64> {
    let trans_bw = auto_trans_bandwidth_high(h_freq, sfreq);
    let n = auto_filter_length(trans_bw, sfreq);
    let cutoff = h_freq + trans_bw / 2.0;
    firwin(n, cutoff, sfreq, true)
}

/// Zero-phase band-pass keeping `[l_freq, h_freq]`.
///
/// Both edges share one (odd) length: the longer of the two edge designs.
pub fn design_bandpass(l_freq: f64, h_freq: f64, sfreq: f64) -> Vec<f64> {
    let tb_l = auto_trans_bandwidth(l_freq);
    let tb_h = auto_trans_bandwidth_high(h_freq, sfreq);
    let n = auto_filter_length(tb_l, sfreq).max(auto_filter_length(tb_h, sfreq));

    let lp_high = firwin(n, h_freq + tb_h / 2.0, sfreq, true);
    let lp_low  = firwin(n, l_freq - tb_l / 2.0, sfreq, true);
    lp_high.iter().zip(&lp_low).map(|(h, l)| h - l).collect()
}

/// Hamming-windowed sinc FIR.
///
/// `pass_zero=true` means the DC component passes (lowpass); `false`
/// spectrally inverts the lowpass into a highpass.
/// `cutoff_hz` is the -6 dB point.
pub fn firwin(n: usize, cutoff_hz: f64, sfreq: f64, pass_zero: bool) -> Vec<f64> {
    assert!(n % 2 == 1, "firwin requires odd N for linear-phase filter");
    let alpha = (n - 1) as f64 / 2.0;
    let nyq = sfreq / 2.0;
    let fc = cutoff_hz / nyq;   // normalised [0, 1]

    let win = hamming(n);

    let mut h: Vec<f64> = (0..n)
        .map(|i| {
            let x = i as f64 - alpha;
            // f(x) = sin(π·fc·x) / (π·x);  lim_{x→0} f(x) = fc  (L'Hôpital)
            let sinc = if x == 0.0 { fc } else { (PI * fc * x).sin() / (PI * x) };
            sinc * win[i]
        })
        .collect();

    // Unit DC gain.
    let s: f64 = h.iter().sum();
    h.iter_mut().for_each(|v| *v /= s);

    if !pass_zero {
        h.iter_mut().for_each(|v| *v = -*v);
        h[n / 2] += 1.0;
    }

    h
}

/// Hamming window of length `n`.
pub fn hamming(n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![1.0];
    }
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / (n - 1) as f64).cos())
        .collect()
}
