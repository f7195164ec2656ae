//! Animation of a connectome: one heatmap frame per window, encoded to video.
//!
//! Drawing and encoding are delegated.  This module turns a
//! [`DynamicConnectome`] into [`Frame`]s (title, reordered masked matrix,
//! colour range and colormap), hands each one to a [`FrameSink`] that writes
//! `frame_00000.<ext>`, `frame_00001.<ext>`, … into a scratch directory, then
//! asks a [`VideoEncoder`] to stitch them.  The scratch directory is removed
//! on every exit path.
//!
//! All presentation settings travel in [`RenderConfig`]; nothing is global.
use std::path::{Path, PathBuf};
use std::process::Command;

use ndarray::Array2;
use tracing::{debug, info, warn};

use crate::error::{DfcError, Result};
use crate::io::StWriter;
use crate::tensor::DynamicConnectome;

/// Presentation settings for [`render`].
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Video file to produce.
    pub output: PathBuf,

    /// Frames per second.
    ///
    /// Default: `10`.
    pub framerate: u32,

    /// Tick label scale, forwarded to the sink.
    ///
    /// Default: `2.0`.
    pub font_scale: f64,

    /// Channel order for display.  Must be a permutation of the connectome's
    /// channel names; the computed tensor is unaffected.
    ///
    /// Default: `None` (recording order).
    pub reorder: Option<Vec<String>>,

    /// Scratch directory for frames.  Must not exist beforehand.
    ///
    /// Default: `movie_frame`.
    pub frame_dir: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output:     PathBuf::from("dfc.mp4"),
            framerate:  10,
            font_scale: 2.0,
            reorder:    None,
            frame_dir:  PathBuf::from("movie_frame"),
        }
    }
}

/// Heatmap colormap family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    /// Blue–white–red, centred on zero (`bwr`).
    Diverging,
    /// White to red (`Reds`).
    Sequential,
}

impl Colormap {
    pub fn name(self) -> &'static str {
        match self {
            Colormap::Diverging  => "bwr",
            Colormap::Sequential => "Reds",
        }
    }
}

/// One heatmap, ready to draw.
#[derive(Debug, Clone)]
pub struct Frame {
    pub index:          usize,
    /// Window label, e.g. `"1.0s - 2.0s, Event: 3"`.
    pub title:          String,
    /// Row and column labels, in display order.
    pub ch_names:       Vec<String>,
    /// Masked values in display order; NaN cells are left blank.
    pub values:         Array2<f64>,
    pub vmin:           f64,
    pub vmax:           f64,
    pub colormap:       Colormap,
    pub colorbar_label: &'static str,
    pub font_scale:     f64,
}

/// Writes one frame file.
pub trait FrameSink {
    /// File extension of the frames this sink writes (without the dot).
    fn extension(&self) -> &str;

    fn write_frame(&mut self, frame: &Frame, path: &Path) -> anyhow::Result<()>;
}

/// Stitches `frame_%05d.<ext>` files into a video.
pub trait VideoEncoder {
    fn encode(&self, pattern: &Path, framerate: u32, output: &Path) -> anyhow::Result<()>;
}

/// Frames as numeric safetensors files, for plotting elsewhere.
#[derive(Debug, Default)]
pub struct SafetensorsFrameSink;

impl FrameSink for SafetensorsFrameSink {
    fn extension(&self) -> &str {
        "safetensors"
    }

    fn write_frame(&mut self, frame: &Frame, path: &Path) -> anyhow::Result<()> {
        let mut w = StWriter::new();
        w.add_f64_arr2("values", &frame.values);
        w.add_f64("range", &[frame.vmin, frame.vmax], &[2]);
        w.add_metadata("title", frame.title.clone());
        w.add_metadata("colormap", frame.colormap.name());
        w.add_metadata("colorbar_label", frame.colorbar_label);
        w.add_metadata("font_scale", frame.font_scale.to_string());
        w.add_metadata("ch_names", serde_json::to_string(&frame.ch_names)?);
        w.write(path)
    }
}

/// `ffmpeg -framerate N -i <pattern> -pix_fmt yuv420p <output>`.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    pub program: PathBuf,
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self { program: PathBuf::from("ffmpeg") }
    }
}

impl VideoEncoder for Ffmpeg {
    fn encode(&self, pattern: &Path, framerate: u32, output: &Path) -> anyhow::Result<()> {
        let status = Command::new(&self.program)
            .arg("-y")
            .args(["-framerate", &framerate.to_string()])
            .arg("-i").arg(pattern)
            .args(["-pix_fmt", "yuv420p"])
            .arg(output)
            .status()
            .map_err(|e| anyhow::anyhow!("failed to run {}: {e}", self.program.display()))?;
        if !status.success() {
            anyhow::bail!("{} exited with {status}", self.program.display());
        }
        Ok(())
    }
}

/// Build one [`Frame`] per window.
///
/// Correlation metrics get a diverging map over `[-scale, scale]`,
/// information metrics a sequential map over `[0, scale]`.
pub fn frames(conn: &DynamicConnectome, cfg: &RenderConfig) -> Result<Vec<Frame>> {
    let order = display_order(&conn.ch_names, cfg.reorder.as_deref())?;
    let ch_names: Vec<String> = order.iter().map(|&i| conn.ch_names[i].clone()).collect();
    let (colormap, vmin) = if conn.metric.is_symmetric() {
        (Colormap::Diverging, -conn.scale)
    } else {
        (Colormap::Sequential, 0.0)
    };

    Ok(conn.windows.iter().map(|w| {
        let n = order.len();
        let values = Array2::from_shape_fn((n, n), |(r, c)| {
            conn.masked[[w.index, order[r], order[c]]]
        });
        Frame {
            index: w.index,
            title: w.label.clone(),
            ch_names: ch_names.clone(),
            values,
            vmin,
            vmax: conn.scale,
            colormap,
            colorbar_label: conn.metric.colorbar_label(),
            font_scale: cfg.font_scale,
        }
    }).collect())
}

/// Write every frame through `sink` and encode them into `cfg.output`.
///
/// # Errors
///
/// [`DfcError::InvalidConfiguration`] for a bad channel order,
/// [`DfcError::Render`] if the scratch directory exists already or a sink or
/// encoder call fails.  The scratch directory is removed in all cases.
pub fn render(
    conn: &DynamicConnectome,
    cfg: &RenderConfig,
    sink: &mut dyn FrameSink,
    encoder: &dyn VideoEncoder,
) -> Result<()> {
    let frames = frames(conn, cfg)?;
    info!(frames = frames.len(), output = %cfg.output.display(), "generating video");

    let dir = FrameDir::create(&cfg.frame_dir)?;
    let ext = sink.extension().to_string();
    for frame in &frames {
        let path = dir.path().join(format!("frame_{:05}.{ext}", frame.index));
        sink.write_frame(frame, &path)
            .map_err(|e| DfcError::Render(format!("frame {}: {e:#}", frame.index)))?;
        debug!(frame = frame.index, "frame written");
    }
    let pattern = dir.path().join(format!("frame_%05d.{ext}"));
    encoder
        .encode(&pattern, cfg.framerate, &cfg.output)
        .map_err(|e| DfcError::Render(format!("encoding: {e:#}")))?;
    Ok(())
}

/// Indices into `ch_names` in display order.
fn display_order(ch_names: &[String], reorder: Option<&[String]>) -> Result<Vec<usize>> {
    let Some(reorder) = reorder else {
        return Ok((0..ch_names.len()).collect());
    };
    if reorder.len() != ch_names.len() {
        return Err(DfcError::config(format!(
            "reorder lists {} channels, connectome has {}", reorder.len(), ch_names.len()
        )));
    }
    let mut used = vec![false; ch_names.len()];
    reorder
        .iter()
        .map(|name| {
            let i = ch_names
                .iter()
                .position(|n| n == name)
                .ok_or_else(|| DfcError::config(format!("unknown channel '{name}' in reorder")))?;
            if std::mem::replace(&mut used[i], true) {
                return Err(DfcError::config(format!("channel '{name}' repeated in reorder")));
            }
            Ok(i)
        })
        .collect()
}

/// Scratch directory removed on drop.
struct FrameDir {
    path: PathBuf,
}

impl FrameDir {
    fn create(path: &Path) -> Result<Self> {
        std::fs::create_dir(path).map_err(|e| {
            DfcError::Render(format!("cannot create frame directory {}: {e}", path.display()))
        })?;
        Ok(Self { path: path.to_path_buf() })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FrameDir {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            warn!(dir = %self.path.display(), error = %e, "failed to remove frame directory");
        }
    }
}
