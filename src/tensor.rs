//! Tensor assembly: windows × ordered channel pairs → `[W, C, C]`.
//!
//! ```text
//! for w in windows:                   (parallel over w)
//!     for i in channels:
//!         for j in channels, j != i:
//!             dfc[w, i, j] = link(x[i, w], x[j, w])
//! ```
//!
//! The diagonal is never evaluated and stays NaN.  A link whose estimator
//! fails also stays NaN; the run carries on and counts it.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ndarray::{Array2, Array3, s};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::DfcConfig;
use crate::error::{DfcError, Result};
use crate::filter::{FirFilter, SignalFilter};
use crate::link;
use crate::metric::Metric;
use crate::recording::{EventMarker, Recording};
use crate::window::{self, Window};

/// `[n_windows, n_channels, n_channels]`, NaN where undefined.
pub type ConnectivityTensor = Array3<f64>;

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct DynamicConnectome {
    /// Raw connectivity values; `dfc[w, i, j]` is the link `i → j` in window `w`.
    pub dfc:          ConnectivityTensor,
    /// `dfc` with sub-threshold links set to NaN.  Presentation only.
    pub masked:       ConnectivityTensor,
    /// Symmetric colour/magnitude bound, see [`scale_bound`].
    pub scale:        f64,
    pub windows:      Vec<Window>,
    pub ch_names:     Vec<String>,
    pub metric:       Metric,
    /// Off-diagonal cells left NaN because the estimator failed.
    pub failed_cells: usize,
}

impl DynamicConnectome {
    #[inline]
    pub fn n_windows(&self) -> usize {
        self.windows.len()
    }

    /// Window labels, in window order.
    pub fn labels(&self) -> Vec<&str> {
        self.windows.iter().map(|w| w.label.as_str()).collect()
    }
}

/// Cooperative cancellation flag, checked once per window.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Compute the dynamic functional connectivity tensor of `rec`.
///
/// Cost is `O(n_windows × n_channels² × metric)`: every ordered channel pair
/// is evaluated in every window.  Symbolic metrics dominate; with `parallel`
/// set, windows are spread over the rayon pool.
///
/// # Errors
///
/// [`DfcError::InvalidConfiguration`] before any work is done if the
/// configuration does not fit the recording, or [`DfcError::Filter`] if the
/// band-pass filter fails.
///
/// # Examples
///
/// ```
/// use dfc::{compute, DfcConfig, Metric, Recording};
/// use ndarray::Array2;
///
/// let data = Array2::from_shape_fn((3, 600), |(c, t)| ((c + 1) as f64 * t as f64 * 0.05).sin());
/// let names = vec!["Fz".into(), "Cz".into(), "Pz".into()];
/// let rec = Recording::new(data, names, 100.0).unwrap();
///
/// let cfg = DfcConfig { window_length: 200, metric: Metric::Pearson, ..DfcConfig::default() };
/// let dfc = compute(&rec, &cfg, None).unwrap();
/// assert_eq!(dfc.dim(), (2, 3, 3));
/// assert!(dfc[[0, 1, 1]].is_nan());
/// ```
pub fn compute(
    rec: &Recording,
    cfg: &DfcConfig,
    events: Option<&[EventMarker]>,
) -> Result<ConnectivityTensor> {
    Ok(assemble(rec, cfg, events)?.dfc)
}

/// Like [`compute`], but return the masked tensor, scale bound and window
/// labels as well.
pub fn assemble(
    rec: &Recording,
    cfg: &DfcConfig,
    events: Option<&[EventMarker]>,
) -> Result<DynamicConnectome> {
    assemble_with(rec, cfg, events, &FirFilter, None)
}

/// Full-control entry point: custom filter collaborator and cancellation.
pub fn assemble_with(
    rec: &Recording,
    cfg: &DfcConfig,
    events: Option<&[EventMarker]>,
    filter: &dyn SignalFilter,
    cancel: Option<&CancelToken>,
) -> Result<DynamicConnectome> {
    cfg.validate(rec.n_samples(), rec.sfreq())?;

    let filtered;
    let rec = if cfg.min_freq.is_some() || cfg.max_freq.is_some() {
        info!(l_freq = ?cfg.min_freq, h_freq = ?cfg.max_freq, "filtering");
        filtered = filter.filter(rec, cfg.min_freq, cfg.max_freq)?;
        &filtered
    } else {
        rec
    };

    let windows = window::schedule(rec.times(), cfg.window_length, cfg.overlap, events)?;
    let (n_w, n_ch) = (windows.len(), rec.n_channels());
    info!(
        windows = n_w,
        channels = n_ch,
        metric = cfg.metric.name(),
        delay = cfg.delay,
        "calculating connectome"
    );

    let eval = |w: &Window| -> Result<(Array2<f64>, usize)> {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(DfcError::Cancelled);
        }
        let plane = window_plane(rec, w, &cfg.metric, cfg.delay)?;
        debug!(window = w.index, label = %w.label, failed = plane.1, "window done");
        Ok(plane)
    };
    let planes: Vec<(Array2<f64>, usize)> = if cfg.parallel {
        windows.par_iter().map(eval).collect::<Result<_>>()?
    } else {
        windows.iter().map(eval).collect::<Result<_>>()?
    };

    let mut dfc = Array3::from_elem((n_w, n_ch, n_ch), f64::NAN);
    let mut failed_cells = 0;
    for (w, (plane, failed)) in planes.into_iter().enumerate() {
        dfc.slice_mut(s![w, .., ..]).assign(&plane);
        failed_cells += failed;
    }

    let masked = apply_threshold(&dfc, cfg.threshold, &cfg.metric);
    let scale = scale_bound(&dfc);
    info!(failed_cells, scale, "connectome ready");

    Ok(DynamicConnectome {
        dfc,
        masked,
        scale,
        windows,
        ch_names: rec.ch_names().to_vec(),
        metric: cfg.metric.clone(),
        failed_cells,
    })
}

/// Evaluate every ordered pair `i != j` in one window.
///
/// Returns the `[C, C]` plane and the number of cells whose estimator failed.
fn window_plane(
    rec: &Recording,
    w: &Window,
    metric: &Metric,
    delay: isize,
) -> Result<(Array2<f64>, usize)> {
    let n_ch = rec.n_channels();
    let mut plane = Array2::from_elem((n_ch, n_ch), f64::NAN);
    let mut failed = 0;
    for i in 0..n_ch {
        let a = rec.segment(i, w.start, w.end);
        for j in (0..n_ch).filter(|&j| j != i) {
            let b = rec.segment(j, w.start, w.end);
            match link::evaluate(a, b, metric, delay) {
                Ok(v) => plane[[i, j]] = v,
                Err(DfcError::Estimator(e)) => {
                    failed += 1;
                    warn!(
                        window = w.index,
                        source = %rec.ch_names()[i],
                        target = %rec.ch_names()[j],
                        error = %e,
                        "link left undefined"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
    Ok((plane, failed))
}

/// Whether `value` survives the threshold test for `metric`.
///
/// Correlations are tested on magnitude, information measures on the raw
/// value.  NaN never survives a threshold; without one every value does.
#[inline]
pub fn passes_threshold(value: f64, threshold: Option<f64>, metric: &Metric) -> bool {
    match threshold {
        None => true,
        Some(t) if metric.is_symmetric() => value.abs() >= t,
        Some(t) => value >= t,
    }
}

/// Masked copy of `dfc`: failing cells become NaN.  Idempotent.
pub fn apply_threshold(dfc: &Array3<f64>, threshold: Option<f64>, metric: &Metric) -> Array3<f64> {
    dfc.mapv(|v| if passes_threshold(v, threshold, metric) { v } else { f64::NAN })
}

/// `max(|max|, |min|)` over the finite entries; `0.0` if there are none.
pub fn scale_bound(dfc: &Array3<f64>) -> f64 {
    dfc.iter()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()))
}
