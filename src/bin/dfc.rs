/// dfc: compute a dynamic functional connectome from a safetensors recording.
///
/// Input keys (see `dfc::io`): data [C, T], sfreq [1], optional times,
/// ch_names, events.
///
/// Output keys:
///   dfc           [W, C, C]  f64  raw connectivity (diagonal NaN)
///   masked        [W, C, C]  f64  thresholded copy
///   scale         [1]        f64  max |value|
///   window_start  [W]        i32
///   __metadata__  metric, ch_names, labels
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dfc::{
    assemble,
    io::{write_connectome, RecordingFile},
    render::{frames, FrameSink},
    DfcConfig, Metric, SafetensorsFrameSink, SymbolicParams,
};

#[derive(Parser, Debug)]
#[command(name = "dfc", about = "Sliding-window functional connectivity")]
struct Args {
    /// Recording safetensors file.
    #[arg(long)]
    input: PathBuf,

    /// Connectome safetensors output path.
    #[arg(long)]
    output: PathBuf,

    /// Window length in samples.
    #[arg(long)]
    window_length: usize,

    /// Overlap between consecutive windows in samples.
    #[arg(long, default_value_t = 0)]
    overlap: usize,

    /// transfer_entropy | mutual_info | pearson | spearman
    #[arg(long, default_value = "transfer_entropy")]
    metric: String,

    /// Partition boundaries for the symbolic metrics (comma-separated).
    #[arg(long, value_delimiter = ',', default_value = "-0.5,-0.3,-0.1,0.1,0.3,0.5", allow_hyphen_values = true)]
    divs: Vec<f64>,

    /// Embedding delay for the symbolic metrics.
    #[arg(long, default_value_t = 1)]
    tau: usize,

    /// Word length for the symbolic metrics.
    #[arg(long, default_value_t = 1)]
    symbolic_length: usize,

    /// Transmission delay in samples (|delay| <= window_length / 10).
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    delay: isize,

    /// Significance cutoff for the masked tensor.
    #[arg(long)]
    threshold: Option<f64>,

    /// Lower pass band edge (Hz).
    #[arg(long)]
    min_freq: Option<f64>,

    /// Upper pass band edge (Hz).
    #[arg(long)]
    max_freq: Option<f64>,

    /// Also export one numeric heatmap frame per window into this directory.
    #[arg(long)]
    frames: Option<PathBuf>,

    /// Display order of channels in exported frames (comma-separated names).
    #[arg(long, value_delimiter = ',')]
    reorder: Option<Vec<String>>,

    /// Evaluate windows on a single thread.
    #[arg(long)]
    sequential: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let file = RecordingFile::load(&args.input)?;
    let rec = &file.recording;
    info!(
        channels = rec.n_channels(),
        samples = rec.n_samples(),
        sfreq = rec.sfreq(),
        events = file.events.len(),
        "loaded {}", args.input.display()
    );

    let params = SymbolicParams {
        divs: args.divs,
        tau: args.tau,
        symbolic_length: args.symbolic_length,
    };
    let cfg = DfcConfig {
        window_length: args.window_length,
        overlap:       args.overlap,
        metric:        Metric::from_name(&args.metric, params)?,
        delay:         args.delay,
        threshold:     args.threshold,
        min_freq:      args.min_freq,
        max_freq:      args.max_freq,
        parallel:      !args.sequential,
    };

    let events = (!file.events.is_empty()).then_some(file.events.as_slice());
    let conn = assemble(rec, &cfg, events)?;

    write_connectome(&args.output, &conn)?;
    info!("written → {}", args.output.display());

    if let Some(dir) = args.frames {
        let render_cfg = dfc::RenderConfig {
            reorder: args.reorder,
            frame_dir: dir.clone(),
            ..dfc::RenderConfig::default()
        };
        std::fs::create_dir_all(&dir)?;
        let mut sink = SafetensorsFrameSink;
        for frame in frames(&conn, &render_cfg)? {
            let path = dir.join(format!("frame_{:05}.{}", frame.index, sink.extension()));
            sink.write_frame(&frame, &path)?;
        }
        info!(frames = conn.n_windows(), "frames → {}", dir.display());
    }

    Ok(())
}
