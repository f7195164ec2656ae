//! # dfc — dynamic functional connectivity in pure Rust
//!
//! `dfc` builds a time-resolved connectome from a multichannel recording
//! (EEG, ECoG, LFP): a window slides over the samples and, inside every
//! window, a dependency metric is evaluated for every ordered channel pair.
//! The result is a `[time, channel, channel]` tensor.
//!
//! ## Pipeline overview
//!
//! ```text
//! Recording [C, T] + times + ch_names  (+ events)
//!   │
//!   ├─ filter (optional)       FIR band-pass, zero-phase overlap-add
//!   ├─ window::schedule()      start offsets, "0.0s - 0.78125s" labels,
//!   │                          first event inside each window appended
//!   ├─ link::evaluate()        delay shift → transfer_entropy | mutual_info
//!   │   (per window,                          | pearson | spearman
//!   │    per ordered pair)
//!   ├─ apply_threshold()       masked copy for presentation
//!   └─ scale_bound()           max |value| for symmetric colour scaling
//!        │
//!        └─→ Array3<f64> [W, C, C]   (diagonal NaN)
//! ```
//!
//! ## Quick start
//!
//! ```
//! use dfc::{assemble, DfcConfig, Metric, Recording};
//! use ndarray::Array2;
//!
//! // 4 channels, 1000 samples at 250 Hz
//! let data = Array2::from_shape_fn((4, 1000), |(c, t)| {
//!     (t as f64 * 0.07 * (1 + c % 2) as f64).sin()
//! });
//! let names = ["Fp1", "Fp2", "O1", "O2"].map(String::from).to_vec();
//! let rec = Recording::new(data, names, 250.0).unwrap();
//!
//! let cfg = DfcConfig {
//!     window_length: 200,
//!     metric:        Metric::Pearson,
//!     threshold:     Some(0.9),
//!     ..DfcConfig::default()
//! };
//! let conn = assemble(&rec, &cfg, None).unwrap();
//! assert_eq!(conn.dfc.dim(), (4, 4, 4));
//! assert_eq!(conn.windows[0].label, "0.0s - 0.8s");
//! ```
//!
//! ## Running individual steps
//!
//! ```
//! use dfc::{link, window, Metric, SymbolicParams};
//! use ndarray::Array1;
//!
//! let starts = window::window_starts(1000, 200, 100).unwrap();
//! assert_eq!(starts.len(), 8);
//!
//! let a: Array1<f64> = (0..200).map(|t| (t as f64 * 0.1).sin() * 0.4).collect();
//! let b: Array1<f64> = (0..200).map(|t| (t as f64 * 0.1 - 0.3).sin() * 0.4).collect();
//! let te = link::evaluate(a.view(), b.view(), &Metric::TransferEntropy(SymbolicParams::default()), 3).unwrap();
//! assert!(te >= 0.0);
//! ```

pub mod config;
pub mod error;
pub mod estimators;
pub mod filter;
pub mod io;
pub mod link;
pub mod metric;
pub mod recording;
pub mod render;
pub mod tensor;
pub mod window;

// ── Crate-root re-exports ─────────────────────────────────────────────────

pub use config::DfcConfig;
pub use error::{DfcError, EstimatorError};
pub use filter::{FirFilter, SignalFilter};
pub use metric::{Metric, MetricKind, SymbolicParams};
pub use recording::{EventMarker, Recording};
pub use render::{render, Ffmpeg, Frame, FrameSink, RenderConfig, SafetensorsFrameSink, VideoEncoder};
pub use tensor::{
    apply_threshold, assemble, assemble_with, compute, passes_threshold, scale_bound,
    CancelToken, ConnectivityTensor, DynamicConnectome,
};
pub use window::{schedule, window_starts, Window};
