//! Sliding-window scheduling.
//!
//! Cuts the sample axis into windows of `window_length` samples advancing by
//! `step = window_length - overlap`.  Trailing samples that do not fill a
//! complete window are dropped, never padded:
//!
//! ```text
//! n_windows = floor((total_samples - window_length) / step)
//! start_k   = k · step
//! ```
//!
//! The sample at `start + window_length` is always inside the recording, so
//! each label can quote the time at which its window ends.
use crate::error::{DfcError, Result};
use crate::recording::EventMarker;

/// One analysis window: samples `[start, end)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub index: usize,
    pub start: usize,
    pub end:   usize,
    /// `"<t_start>s - <t_end>s"`, optionally followed by `", Event: <label>"`.
    pub label: String,
}

impl Window {
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Start offsets of every complete window.
pub fn window_starts(total_samples: usize, window_length: usize, overlap: usize) -> Result<Vec<usize>> {
    if window_length == 0 {
        return Err(DfcError::config("window_length must be positive"));
    }
    if window_length > total_samples {
        return Err(DfcError::config(format!(
            "window_length {window_length} exceeds recording length {total_samples}"
        )));
    }
    if overlap >= window_length {
        return Err(DfcError::config(format!(
            "overlap {overlap} must be smaller than window_length {window_length}"
        )));
    }
    let step = window_length - overlap;
    let n_windows = (total_samples - window_length) / step;
    Ok((0..n_windows).map(|k| k * step).collect())
}

/// `"<times[start]>s - <times[start + window_length]>s"`.
pub fn window_label(times: &[f64], start: usize, window_length: usize) -> String {
    format!(
        "{}s - {}s",
        fmt_seconds(times[start]),
        fmt_seconds(times[start + window_length])
    )
}

/// Build the labelled window list for a recording with sample times `times`.
///
/// Events are matched against each window in their given order; see
/// [`annotate`].
pub fn schedule(
    times: &[f64],
    window_length: usize,
    overlap: usize,
    events: Option<&[EventMarker]>,
) -> Result<Vec<Window>> {
    let starts = window_starts(times.len(), window_length, overlap)?;
    let windows = starts
        .into_iter()
        .enumerate()
        .map(|(index, start)| {
            let mut w = Window {
                index,
                start,
                end: start + window_length,
                label: window_label(times, start, window_length),
            };
            if let Some(events) = events {
                annotate(&mut w, times, events);
            }
            w
        })
        .collect();
    Ok(windows)
}

/// Append the first event falling inside `window` to its label.
///
/// An event is inside when `times[start] <= timestamp < times[end]`.  Only
/// the first match (in slice order) is used; later matches are ignored.
/// Returns whether the label changed.
pub fn annotate(window: &mut Window, times: &[f64], events: &[EventMarker]) -> bool {
    let t0 = times[window.start];
    let t1 = times[window.end];
    match events.iter().find(|e| t0 <= e.timestamp && e.timestamp < t1) {
        Some(ev) => {
            window.label.push_str(", Event: ");
            window.label.push_str(&ev.label);
            true
        }
        None => false,
    }
}

/// Shortest round-trip rendering that always keeps a decimal point.
///
/// Values below `1e-4` or from `1e16` up switch to exponent form, written
/// with a sign and at least two digits: `1e-05`, `2.5e+16`.
fn fmt_seconds(t: f64) -> String {
    let s = format!("{t:?}");
    let Some((mantissa, exp)) = s.split_once('e') else {
        return s;
    };
    let (sign, digits) = match exp.strip_prefix('-') {
        Some(d) => ('-', d),
        None => ('+', exp),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}
