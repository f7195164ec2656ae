mod common;
use common::{ch_names, sine_noise_recording};
use dfc::render::{frames, Colormap};
use dfc::{
    assemble, render, DfcConfig, DfcError, DynamicConnectome, Frame, FrameSink, Metric,
    RenderConfig, SymbolicParams, VideoEncoder,
};
use std::cell::RefCell;
use std::path::{Path, PathBuf};

fn tmp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("dfc_test_render_{}_{name}", std::process::id()))
}

fn connectome(metric: Metric) -> DynamicConnectome {
    let rec = sine_noise_recording(1250, 4);
    let cfg = DfcConfig { window_length: 250, metric, ..DfcConfig::default() };
    assemble(&rec, &cfg, None).unwrap()
}

/// Records titles and checks each frame lands in an existing directory.
#[derive(Default)]
struct RecordingSink {
    titles: Vec<String>,
    paths:  Vec<PathBuf>,
    fail_at: Option<usize>,
}

impl FrameSink for RecordingSink {
    fn extension(&self) -> &str {
        "txt"
    }

    fn write_frame(&mut self, frame: &Frame, path: &Path) -> anyhow::Result<()> {
        if self.fail_at == Some(frame.index) {
            anyhow::bail!("disk full");
        }
        std::fs::write(path, frame.title.as_bytes())?;
        self.titles.push(frame.title.clone());
        self.paths.push(path.to_path_buf());
        Ok(())
    }
}

#[derive(Default)]
struct MockEncoder {
    calls: RefCell<Vec<(PathBuf, u32, PathBuf, usize)>>,
}

impl VideoEncoder for MockEncoder {
    fn encode(&self, pattern: &Path, framerate: u32, output: &Path) -> anyhow::Result<()> {
        // Frames are still on disk while encoding.
        let n_files = std::fs::read_dir(pattern.parent().unwrap())?.count();
        self.calls.borrow_mut().push((pattern.to_path_buf(), framerate, output.to_path_buf(), n_files));
        Ok(())
    }
}

#[test]
fn render_writes_frames_encodes_and_cleans_up() {
    let conn = connectome(Metric::Pearson);
    let dir = tmp_dir("ok");
    let cfg = RenderConfig {
        output: PathBuf::from("out.mp4"),
        framerate: 25,
        frame_dir: dir.clone(),
        ..RenderConfig::default()
    };
    let mut sink = RecordingSink::default();
    let enc = MockEncoder::default();
    render(&conn, &cfg, &mut sink, &enc).unwrap();

    assert_eq!(sink.titles, conn.labels());
    assert_eq!(sink.paths[0], dir.join("frame_00000.txt"));
    assert_eq!(sink.paths[3], dir.join("frame_00003.txt"));

    let calls = enc.calls.borrow();
    assert_eq!(calls.len(), 1);
    let (pattern, rate, output, n_files) = &calls[0];
    assert_eq!(pattern, &dir.join("frame_%05d.txt"));
    assert_eq!(*rate, 25);
    assert_eq!(output, &PathBuf::from("out.mp4"));
    assert_eq!(*n_files, conn.n_windows());

    assert!(!dir.exists(), "frame directory left behind");
}

#[test]
fn failing_sink_reports_render_error_and_cleans_up() {
    let conn = connectome(Metric::Pearson);
    let dir = tmp_dir("fail");
    let cfg = RenderConfig { frame_dir: dir.clone(), ..RenderConfig::default() };
    let mut sink = RecordingSink { fail_at: Some(2), ..RecordingSink::default() };
    let enc = MockEncoder::default();

    let err = render(&conn, &cfg, &mut sink, &enc).unwrap_err();
    assert!(matches!(err, DfcError::Render(_)), "{err}");
    assert_eq!(sink.titles.len(), 2);
    assert!(enc.calls.borrow().is_empty());
    assert!(!dir.exists());
}

#[test]
fn existing_frame_dir_is_refused_and_kept() {
    let conn = connectome(Metric::Pearson);
    let dir = tmp_dir("exists");
    std::fs::create_dir_all(&dir).unwrap();
    let cfg = RenderConfig { frame_dir: dir.clone(), ..RenderConfig::default() };

    let err = render(&conn, &cfg, &mut RecordingSink::default(), &MockEncoder::default()).unwrap_err();
    assert!(matches!(err, DfcError::Render(_)));
    assert!(dir.exists());
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn reorder_permutes_rows_and_columns() {
    let conn = connectome(Metric::Pearson);
    let names = ch_names(4);
    let order = vec![names[3].clone(), names[1].clone(), names[0].clone(), names[2].clone()];
    let idx = [3, 1, 0, 2];
    let cfg = RenderConfig { reorder: Some(order.clone()), ..RenderConfig::default() };

    let frames = frames(&conn, &cfg).unwrap();
    assert_eq!(frames.len(), conn.n_windows());
    for f in &frames {
        assert_eq!(f.ch_names, order);
        for r in 0..4 {
            for c in 0..4 {
                let got = f.values[[r, c]];
                let want = conn.masked[[f.index, idx[r], idx[c]]];
                assert!(got == want || (got.is_nan() && want.is_nan()));
            }
        }
    }
    // The computed tensor keeps recording order.
    assert_eq!(conn.ch_names, names);
}

#[test]
fn bad_reorder_is_a_configuration_error() {
    let conn = connectome(Metric::Pearson);
    let cfg = RenderConfig {
        reorder: Some(vec!["EEG001".into(), "EEG001".into(), "EEG002".into(), "EEG003".into()]),
        ..RenderConfig::default()
    };
    let err = frames(&conn, &cfg).unwrap_err();
    assert!(matches!(err, DfcError::InvalidConfiguration(_)));
}

#[test]
fn colour_range_follows_metric_family() {
    let corr = connectome(Metric::Spearman);
    let f = &frames(&corr, &RenderConfig::default()).unwrap()[0];
    assert_eq!(f.colormap, Colormap::Diverging);
    assert_eq!((f.vmin, f.vmax), (-corr.scale, corr.scale));
    assert_eq!(f.colorbar_label, "Spearman correlation");

    let info = connectome(Metric::MutualInfo(SymbolicParams::default()));
    let f = &frames(&info, &RenderConfig::default()).unwrap()[0];
    assert_eq!(f.colormap, Colormap::Sequential);
    assert_eq!((f.vmin, f.vmax), (0.0, info.scale));
    assert_eq!(f.colorbar_label, "Mutual information");
    assert_eq!(f.font_scale, 2.0);
}
