mod common;
use common::{ch_names, SFREQ};
use dfc::filter::{apply_fir_zero_phase, auto_filter_length, design_bandpass, design_highpass, design_lowpass};
use dfc::{FirFilter, Recording, SignalFilter};
use ndarray::Array2;
use std::f64::consts::PI;

fn tone(n: usize, freqs: &[f64]) -> Vec<f64> {
    (0..n)
        .map(|i| freqs.iter().map(|f| (2.0 * PI * f * i as f64 / SFREQ).sin()).sum())
        .collect()
}

fn interior_rms(x: &[f64], guard: usize) -> f64 {
    let interior = &x[guard..x.len() - guard];
    (interior.iter().map(|v| v * v).sum::<f64>() / interior.len() as f64).sqrt()
}

// ── Coefficient tests ─────────────────────────────────────────────────────────

#[test]
fn filter_coeffs_symmetric() {
    for h in [
        design_highpass(1.0, SFREQ),
        design_lowpass(40.0, SFREQ),
        design_bandpass(8.0, 13.0, SFREQ),
    ] {
        let n = h.len();
        assert!(n % 2 == 1, "even length {n}");
        for i in 0..n / 2 {
            let diff = (h[i] - h[n - 1 - i]).abs();
            assert!(diff < 1e-12, "h[{i}]={} ≠ h[{}]={}", h[i], n - 1 - i, h[n - 1 - i]);
        }
    }
}

#[test]
fn bandpass_length_follows_narrower_edge() {
    // Low edge 1 Hz → trans_bw 1 Hz → ceil(3.3 · 250) ≈ 825 taps
    // High edge 40 Hz → trans_bw 10 Hz → 83 taps
    let n = design_bandpass(1.0, 40.0, SFREQ).len();
    assert_eq!(n, auto_filter_length(1.0, SFREQ));
    assert_eq!(n, design_highpass(1.0, SFREQ).len());
    assert!(n > design_lowpass(40.0, SFREQ).len());
}

// ── Application tests ─────────────────────────────────────────────────────────

#[test]
fn bandpass_keeps_in_band_tone_removes_others() {
    // 1 Hz (stop) + 10 Hz (pass) + 60 Hz (stop)
    let n = 30 * SFREQ as usize;
    let row = tone(n, &[1.0, 10.0, 60.0]);
    let mut data = Array2::from_shape_vec((1, n), row).unwrap();
    let h = design_bandpass(6.0, 20.0, SFREQ);
    apply_fir_zero_phase(&mut data, &h).unwrap();

    let rms = interior_rms(data.row(0).as_slice().unwrap(), h.len());
    // A unit sine alone has RMS 1/√2 ≈ 0.707.
    assert!(rms > 0.65, "RMS too low ({rms:.3}), pass band attenuated?");
    assert!(rms < 0.76, "RMS too high ({rms:.3}), stop band leaking?");
}

#[test]
fn zero_phase_no_lag() {
    // An in-band tone must come out aligned with the input.
    let n = 20 * SFREQ as usize;
    let x = tone(n, &[10.0]);
    let mut data = Array2::from_shape_vec((1, n), x.clone()).unwrap();
    let h = design_lowpass(40.0, SFREQ);
    apply_fir_zero_phase(&mut data, &h).unwrap();
    let y = data.row(0).to_vec();
    for t in h.len()..n - h.len() {
        assert!((x[t] - y[t]).abs() < 0.02, "t={t}: x={} y={}", x[t], y[t]);
    }
}

#[test]
fn fir_filter_returns_new_recording() {
    let n = 2000;
    let data = Array2::from_shape_fn((2, n), |(c, t)| {
        (2.0 * PI * (2.0 + 20.0 * c as f64) * t as f64 / SFREQ).sin() + 1.0
    });
    let rec = Recording::new(data, ch_names(2), SFREQ).unwrap();
    let out = FirFilter.filter(&rec, Some(5.0), Some(15.0)).unwrap();

    assert_eq!(out.ch_names(), rec.ch_names());
    assert_eq!(out.times(), rec.times());
    // Original untouched (still has its DC offset).
    assert!((rec.data()[[0, 0]] - 1.0).abs() < 1e-12);
    // Both channels are out of band: 2 Hz and 22 Hz.
    let guard = 600;
    for c in 0..2 {
        let row = out.data().row(c).to_vec();
        let rms = interior_rms(&row, guard);
        assert!(rms < 0.1, "channel {c} RMS {rms:.3} after band-pass");
    }
}

#[test]
fn fir_filter_without_band_is_identity() {
    let data = Array2::from_shape_fn((1, 100), |(_, t)| t as f64);
    let rec = Recording::new(data, ch_names(1), SFREQ).unwrap();
    let out = FirFilter.filter(&rec, None, None).unwrap();
    assert_eq!(out.data(), rec.data());
}
