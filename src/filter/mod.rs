//! Band-limiting collaborator.
//!
//! - [`design`]: Hamming-windowed sinc FIR design (highpass, lowpass,
//!   band-pass), matching `mne.filter.create_filter(fir_window='hamming',
//!   phase='zero')`.
//! - [`apply`]: overlap-add zero-phase convolution, matching MNE's
//!   `_overlap_add_filter` / `_1d_overlap_filter`.
//!
//! The connectivity engine only sees the [`SignalFilter`] trait, so callers
//! can plug in any other filter implementation.

pub mod apply;
pub mod design;

pub use apply::{apply_fir_zero_phase, filter_1d, OverlapAdd};
pub use design::{
    auto_filter_length, auto_trans_bandwidth, auto_trans_bandwidth_high,
    design_bandpass, design_highpass, design_lowpass, firwin, hamming,
};

use crate::error::{DfcError, Result};
use crate::recording::Recording;

/// Produces a band-limited copy of a recording.
///
/// `None` on either edge leaves that side of the spectrum untouched.
pub trait SignalFilter: Sync {
    fn filter(&self, rec: &Recording, l_freq: Option<f64>, h_freq: Option<f64>) -> Result<Recording>;
}

/// Zero-phase FIR filter designed from the pass band edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirFilter;

impl FirFilter {
    /// Impulse response for the requested band, or `None` for an all-pass.
    pub fn kernel(l_freq: Option<f64>, h_freq: Option<f64>, sfreq: f64) -> Result<Option<Vec<f64>>> {
        check_band(l_freq, h_freq, sfreq)?;
        Ok(match (l_freq, h_freq) {
            (None, None)       => None,
            (Some(l), None)    => Some(design_highpass(l, sfreq)),
            (None, Some(h))    => Some(design_lowpass(h, sfreq)),
            (Some(l), Some(h)) => Some(design_bandpass(l, h, sfreq)),
        })
    }
}

impl SignalFilter for FirFilter {
    fn filter(&self, rec: &Recording, l_freq: Option<f64>, h_freq: Option<f64>) -> Result<Recording> {
        let Some(h) = Self::kernel(l_freq, h_freq, rec.sfreq())? else {
            return Ok(rec.clone());
        };
        let mut data = rec.data().clone();
        apply_fir_zero_phase(&mut data, &h).map_err(|e| DfcError::Filter(format!("{e:#}")))?;
        Ok(rec.replace_data(data))
    }
}

/// Validate pass band edges against the Nyquist frequency.
pub fn check_band(l_freq: Option<f64>, h_freq: Option<f64>, sfreq: f64) -> Result<()> {
    let nyq = sfreq / 2.0;
    if let Some(l) = l_freq {
        if !(l.is_finite() && l > 0.0 && l < nyq) {
            return Err(DfcError::config(format!("min_freq {l} must lie in (0, {nyq})")));
        }
    }
    if let Some(h) = h_freq {
        if !(h.is_finite() && h > 0.0 && h < nyq) {
            return Err(DfcError::config(format!("max_freq {h} must lie in (0, {nyq})")));
        }
    }
    if let (Some(l), Some(h)) = (l_freq, h_freq) {
        if l >= h {
            return Err(DfcError::config(format!(
                "min_freq {l} must be below max_freq {h}"
            )));
        }
    }
    Ok(())
}
