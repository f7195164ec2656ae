//! Connectome configuration.
//!
//! [`DfcConfig`] holds every tunable parameter of a dynamic-connectivity run.
//! Defaults follow the original `dynamic_connect` tool: transfer entropy with
//! six partition boundaries, no overlap, no delay, no threshold, no filter.
use crate::error::{DfcError, Result};
use crate::filter::check_band;
use crate::link::check_delay;
use crate::metric::Metric;

/// Configuration for one dynamic functional connectivity computation.
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use dfc::{DfcConfig, Metric};
///
/// let cfg = DfcConfig {
///     window_length: 200,
///     overlap:       100,
///     metric:        Metric::Pearson,
///     threshold:     Some(0.75),
///     ..DfcConfig::default()
/// };
/// assert_eq!(cfg.step(), 100);
/// ```
#[derive(Debug, Clone)]
pub struct DfcConfig {
    /// Window length in samples.
    ///
    /// Must be positive and no longer than the recording.
    ///
    /// Default: `1000`.
    pub window_length: usize,

    /// Samples shared by consecutive windows.  The window advances by
    /// `window_length - overlap` samples, so `overlap` must be strictly
    /// smaller than `window_length`.
    ///
    /// Default: `0` (no overlap).
    pub overlap: usize,

    /// Pairwise metric and its parameters.
    ///
    /// Default: transfer entropy with
    /// `divs = [-0.5, -0.3, -0.1, 0.1, 0.3, 0.5]`, `tau = 1`,
    /// `symbolic_length = 1`.
    pub metric: Metric,

    /// Hypothesised transmission lag in samples from the source channel to
    /// the target channel.  Positive: the target lags the source.
    ///
    /// `|delay|` may not exceed `window_length / 10`, which bounds how much
    /// of each window is spent on shifting.
    ///
    /// Default: `0`.
    pub delay: isize,

    /// Significance cutoff for the masked (presentation) tensor.
    ///
    /// Correlation metrics keep links with `|r| >= threshold`; information
    /// metrics keep links with `value >= threshold`.  The raw tensor is never
    /// masked.
    ///
    /// Default: `None` (keep every link).
    pub threshold: Option<f64>,

    /// Lower pass band edge in Hz.  Forwarded to the filter collaborator.
    ///
    /// Default: `None`.
    pub min_freq: Option<f64>,

    /// Upper pass band edge in Hz.  Forwarded to the filter collaborator.
    ///
    /// Default: `None`.
    pub max_freq: Option<f64>,

    /// Evaluate windows on the rayon thread pool.
    ///
    /// Results are identical either way; only wall-clock time differs.
    ///
    /// Default: `true`.
    pub parallel: bool,
}

impl Default for DfcConfig {
    fn default() -> Self {
        Self {
            window_length: 1000,
            overlap:       0,
            metric:        Metric::default(),
            delay:         0,
            threshold:     None,
            min_freq:      None,
            max_freq:      None,
            parallel:      true,
        }
    }
}

impl DfcConfig {
    /// Samples between consecutive window starts (`0` if misconfigured).
    pub fn step(&self) -> usize {
        self.window_length.saturating_sub(self.overlap)
    }

    /// Number of complete windows in a recording of `n_samples` samples:
    /// `floor((n_samples - window_length) / step)`.
    ///
    /// ```
    /// use dfc::DfcConfig;
    /// let cfg = DfcConfig { window_length: 200, ..DfcConfig::default() };
    /// assert_eq!(cfg.n_windows(1000), 4);
    /// ```
    pub fn n_windows(&self, n_samples: usize) -> usize {
        match self.step() {
            0 => 0,
            step => n_samples.saturating_sub(self.window_length) / step,
        }
    }

    /// Check the configuration against a recording of `n_samples` samples.
    ///
    /// `sfreq` is only consulted when a frequency band is requested.
    pub fn validate(&self, n_samples: usize, sfreq: f64) -> Result<()> {
        check_delay(self.delay, self.window_length)?;
        if self.window_length == 0 {
            return Err(DfcError::config("window_length must be positive"));
        }
        if self.window_length > n_samples {
            return Err(DfcError::config(format!(
                "window_length {} exceeds recording length {n_samples}", self.window_length
            )));
        }
        if self.overlap >= self.window_length {
            return Err(DfcError::config(format!(
                "overlap {} must be smaller than window_length {}",
                self.overlap, self.window_length
            )));
        }
        if let Some(t) = self.threshold {
            if t.is_nan() {
                return Err(DfcError::config("threshold must not be NaN"));
            }
        }
        self.metric.validate()?;
        if self.min_freq.is_some() || self.max_freq.is_some() {
            check_band(self.min_freq, self.max_freq, sfreq)?;
        }
        Ok(())
    }
}
