//! Multichannel recordings and event markers.
//!
//! A [`Recording`] is the read-only input of the engine: `[C, T]` samples,
//! one name per channel and one timestamp (seconds) per sample.  It plays the
//! role of MNE's `Raw` after `get_data(return_times=True)`.
use ndarray::{Array2, ArrayView1, s};
use std::collections::HashSet;

use crate::error::{DfcError, Result};

/// An immutable `[C, T]` recording with channel names and sample times.
#[derive(Debug, Clone)]
pub struct Recording {
    data:     Array2<f64>,
    ch_names: Vec<String>,
    times:    Vec<f64>,
    sfreq:    f64,
}

impl Recording {
    /// Build a recording whose timestamps are `i / sfreq`.
    pub fn new(data: Array2<f64>, ch_names: Vec<String>, sfreq: f64) -> Result<Self> {
        if !(sfreq.is_finite() && sfreq > 0.0) {
            return Err(DfcError::config(format!("sfreq must be positive, got {sfreq}")));
        }
        let times = (0..data.ncols()).map(|i| i as f64 / sfreq).collect();
        Self::with_times(data, ch_names, times, sfreq)
    }

    /// Build a recording with explicit, strictly increasing timestamps.
    pub fn with_times(
        data: Array2<f64>,
        ch_names: Vec<String>,
        times: Vec<f64>,
        sfreq: f64,
    ) -> Result<Self> {
        let (n_ch, n_t) = data.dim();
        if ch_names.len() != n_ch {
            return Err(DfcError::config(format!(
                "{} channel names for {n_ch} channels", ch_names.len()
            )));
        }
        if times.len() != n_t {
            return Err(DfcError::config(format!(
                "{} timestamps for {n_t} samples", times.len()
            )));
        }
        if !(sfreq.is_finite() && sfreq > 0.0) {
            return Err(DfcError::config(format!("sfreq must be positive, got {sfreq}")));
        }

        let mut seen = HashSet::with_capacity(n_ch);
        for name in &ch_names {
            if !seen.insert(name.as_str()) {
                return Err(DfcError::config(format!("duplicate channel name '{name}'")));
            }
        }
        if times.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(DfcError::config("timestamps must be strictly increasing"));
        }

        Ok(Self { data, ch_names, times, sfreq })
    }

    #[inline]
    pub fn n_channels(&self) -> usize {
        self.data.nrows()
    }

    #[inline]
    pub fn n_samples(&self) -> usize {
        self.data.ncols()
    }

    #[inline]
    pub fn sfreq(&self) -> f64 {
        self.sfreq
    }

    /// `[C, T]` samples.
    #[inline]
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    #[inline]
    pub fn ch_names(&self) -> &[String] {
        &self.ch_names
    }

    /// Sample timestamps in seconds.
    #[inline]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Samples of channel `ch` in `[start, end)`.
    pub fn segment(&self, ch: usize, start: usize, end: usize) -> ArrayView1<'_, f64> {
        self.data.slice(s![ch, start..end])
    }

    /// Same names and times, new samples (used by the filter collaborator).
    pub(crate) fn replace_data(&self, data: Array2<f64>) -> Self {
        debug_assert_eq!(data.dim(), self.data.dim());
        Self {
            data,
            ch_names: self.ch_names.clone(),
            times:    self.times.clone(),
            sfreq:    self.sfreq,
        }
    }

    /// Position of `name` in the channel list.
    pub fn channel_index(&self, name: &str) -> Option<usize> {
        self.ch_names.iter().position(|n| n == name)
    }
}

// ── Events ────────────────────────────────────────────────────────────────

/// A discrete event (stimulus, response, clinical marker) on the time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct EventMarker {
    /// Event time, in the same units as [`Recording::times`].
    pub timestamp: f64,
    /// Channel or event code.
    pub code:      i64,
    /// Text appended to the label of the window containing the event.
    pub label:     String,
}

impl EventMarker {
    pub fn new(timestamp: f64, code: i64, label: impl Into<String>) -> Self {
        Self { timestamp, code, label: label.into() }
    }

    /// Convert an MNE events array (`[n_events, 3]`: sample, previous id,
    /// event id) into markers.
    ///
    /// `sample` indexes `times` directly; the event id becomes both the code
    /// and the label.  Row order is preserved.
    pub fn from_mne_events(events: &Array2<i64>, times: &[f64]) -> Result<Vec<Self>> {
        if events.ncols() != 3 {
            return Err(DfcError::config(format!(
                "events array must have 3 columns, got {}", events.ncols()
            )));
        }
        events
            .rows()
            .into_iter()
            .map(|row| {
                let sample = row[0];
                let id = row[2];
                let t = usize::try_from(sample)
                    .ok()
                    .and_then(|i| times.get(i))
                    .ok_or_else(|| DfcError::config(format!(
                        "event sample {sample} outside recording of {} samples", times.len()
                    )))?;
                Ok(EventMarker::new(*t, id, id.to_string()))
            })
            .collect()
    }
}
