//! Safetensors I/O.
//!
//! Reader: a recording file with
//!
//! ```text
//! data      [C, T]  F32 | F64   samples
//! sfreq     [1]     F32 | F64   sampling rate (Hz)
//! times     [T]     F32 | F64   optional; defaults to i / sfreq
//! ch_names  [n]     U8          optional; newline-separated UTF-8
//! events    [E, 3]  I32 | I64   optional; MNE events (sample, prev, id)
//! ```
//!
//! Writer: [`StWriter`] plus [`write_connectome`], which stores the raw and
//! masked tensors and puts window labels and channel names in `__metadata__`.
use anyhow::{bail, Context, Result};
use ndarray::{Array2, Array3};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

use crate::recording::{EventMarker, Recording};
use crate::tensor::DynamicConnectome;

// ── Low-level safetensors parser ──────────────────────────────────────────────

struct StFile {
    bytes:      Vec<u8>,
    header:     HashMap<String, Value>,
    data_start: usize,
}

impl StFile {
    fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading {}", path.display()))?;
        if bytes.len() < 8 {
            bail!("safetensors file too small");
        }
        let n = u64::from_le_bytes(bytes[..8].try_into()?);
        let Some(end) = usize::try_from(n)
            .ok()
            .and_then(|n| 8usize.checked_add(n))
            .filter(|&end| end <= bytes.len())
        else {
            bail!("safetensors header truncated");
        };
        let header: HashMap<String, Value> = serde_json::from_slice(&bytes[8..end])
            .context("failed to parse safetensors header")?;
        Ok(Self { bytes, header, data_start: end })
    }

    fn entry(&self, key: &str) -> Option<&Value> {
        self.header.get(key)
    }

    fn shape(&self, key: &str) -> Result<Vec<usize>> {
        let entry = self.entry(key).with_context(|| format!("missing '{key}' key"))?;
        entry["shape"]
            .as_array()
            .context("tensor shape is not an array")?
            .iter()
            .map(|v| v.as_u64().map(|d| d as usize).context("bad shape entry"))
            .collect()
    }

    fn raw(&self, key: &str) -> Result<(&str, &[u8])> {
        let entry = self.entry(key).with_context(|| format!("missing '{key}' key"))?;
        let dtype = entry["dtype"].as_str().context("tensor dtype missing")?;
        let offsets = entry["data_offsets"].as_array().context("data_offsets missing")?;
        let (s, e) = match offsets.as_slice() {
            [s, e] => (
                s.as_u64().context("bad offset")? as usize,
                e.as_u64().context("bad offset")? as usize,
            ),
            _ => bail!("data_offsets must have two entries"),
        };
        let (s, e) = (self.data_start + s, self.data_start + e);
        if e > self.bytes.len() || s > e {
            bail!("tensor '{key}' out of bounds");
        }
        Ok((dtype, &self.bytes[s..e]))
    }

    /// Any float tensor as `f64`.
    fn f64_vec(&self, key: &str) -> Result<Vec<f64>> {
        let (dtype, raw) = self.raw(key)?;
        Ok(match dtype {
            "F32" => raw.chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64)
                .collect(),
            "F64" => raw.chunks_exact(8)
                .map(|b| f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
                .collect(),
            other => bail!("tensor '{key}': expected F32 or F64, got {other}"),
        })
    }

    /// Any integer tensor as `i64`.
    fn i64_vec(&self, key: &str) -> Result<Vec<i64>> {
        let (dtype, raw) = self.raw(key)?;
        Ok(match dtype {
            "I32" => raw.chunks_exact(4)
                .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as i64)
                .collect(),
            "I64" => raw.chunks_exact(8)
                .map(|b| i64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
                .collect(),
            other => bail!("tensor '{key}': expected I32 or I64, got {other}"),
        })
    }
}

// ── Recording reader ──────────────────────────────────────────────────────────

/// A recording loaded from safetensors, with its event list (may be empty).
pub struct RecordingFile {
    pub recording: Recording,
    pub events:    Vec<EventMarker>,
}

impl RecordingFile {
    pub fn load(path: &Path) -> Result<Self> {
        let st = StFile::read(path)?;

        let shape = st.shape("data")?;
        let &[n_ch, n_t] = shape.as_slice() else {
            bail!("'data' must be 2-D, got shape {shape:?}");
        };
        let data = Array2::from_shape_vec((n_ch, n_t), st.f64_vec("data")?)?;

        let sfreq = *st.f64_vec("sfreq")?.first().context("empty 'sfreq'")?;

        // Channel names are optional.
        let ch_names: Vec<String> = if st.entry("ch_names").is_some() {
            let (_, raw) = st.raw("ch_names")?;
            std::str::from_utf8(raw)?
                .split('\n')
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        } else {
            (0..n_ch).map(|i| format!("ch{i}")).collect()
        };

        let recording = if st.entry("times").is_some() {
            Recording::with_times(data, ch_names, st.f64_vec("times")?, sfreq)?
        } else {
            Recording::new(data, ch_names, sfreq)?
        };

        let events = if st.entry("events").is_some() {
            let shape = st.shape("events")?;
            let n_ev = shape.first().copied().unwrap_or(0);
            let arr = Array2::from_shape_vec((n_ev, 3), st.i64_vec("events")?)
                .context("'events' must be [E, 3]")?;
            EventMarker::from_mne_events(&arr, recording.times())?
        } else {
            vec![]
        };

        Ok(Self { recording, events })
    }
}

// ── Generic safetensors builder ───────────────────────────────────────────────

/// Simple safetensors file writer for F32, F64 and I32 tensors with optional
/// string metadata.
///
/// Usage:
/// ```rust,no_run
/// use dfc::io::StWriter;
/// use std::path::Path;
/// let mut w = StWriter::new();
/// w.add_f64("signal", &[1.0, 2.0, 3.0], &[1, 3]);
/// w.add_metadata("units", "volts");
/// w.write(Path::new("/tmp/out.safetensors")).unwrap();
/// ```
#[derive(Default)]
pub struct StWriter {
    entries:  Vec<(String, Vec<u8>, &'static str, Vec<usize>)>,
    metadata: Map<String, Value>,
}

impl StWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_f32(&mut self, name: &str, data: &[f32], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "F32", shape.to_vec()));
    }

    pub fn add_f64(&mut self, name: &str, data: &[f64], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "F64", shape.to_vec()));
    }

    pub fn add_f64_arr2(&mut self, name: &str, arr: &Array2<f64>) {
        let data: Vec<f64> = arr.iter().copied().collect();
        self.add_f64(name, &data, &[arr.nrows(), arr.ncols()]);
    }

    pub fn add_f64_arr3(&mut self, name: &str, arr: &Array3<f64>) {
        let (a, b, c) = arr.dim();
        let data: Vec<f64> = arr.iter().copied().collect();
        self.add_f64(name, &data, &[a, b, c]);
    }

    pub fn add_i32(&mut self, name: &str, data: &[i32], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "I32", shape.to_vec()));
    }

    /// Raw bytes stored as a U8 tensor (e.g. newline-separated names).
    pub fn add_bytes(&mut self, name: &str, data: &[u8]) {
        self.entries.push((name.to_string(), data.to_vec(), "U8", vec![data.len()]));
    }

    /// String entry in the `__metadata__` header map.
    pub fn add_metadata(&mut self, key: &str, value: impl Into<String>) {
        self.metadata.insert(key.to_string(), Value::String(value.into()));
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        use std::io::Write;
        let mut header_map = Map::new();
        if !self.metadata.is_empty() {
            header_map.insert("__metadata__".into(), Value::Object(self.metadata.clone()));
        }
        let mut offset: usize = 0;
        for (name, data, dtype, shape) in &self.entries {
            header_map.insert(name.clone(), serde_json::json!({
                "dtype": dtype,
                "shape": shape,
                "data_offsets": [offset, offset + data.len()],
            }));
            offset += data.len();
        }
        let hdr_bytes = serde_json::to_vec(&header_map)?;
        let pad = (8 - hdr_bytes.len() % 8) % 8;
        let padded: Vec<u8> = hdr_bytes.into_iter()
            .chain(std::iter::repeat(b' ').take(pad))
            .collect();
        let mut f = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        f.write_all(&(padded.len() as u64).to_le_bytes())?;
        f.write_all(&padded)?;
        for (_, data, _, _) in &self.entries {
            f.write_all(data)?;
        }
        Ok(())
    }
}

// ── Connectome writer ─────────────────────────────────────────────────────────

/// Write a connectome to `path`.
///
/// Tensors: `dfc [W, C, C]`, `masked [W, C, C]`, `scale [1]` (F64) and
/// `window_start [W]` (I32).  Metadata: `metric`, `ch_names` and `labels`
/// (both JSON arrays encoded as strings).
pub fn write_connectome(path: &Path, conn: &DynamicConnectome) -> Result<()> {
    let mut w = StWriter::new();
    w.add_f64_arr3("dfc", &conn.dfc);
    w.add_f64_arr3("masked", &conn.masked);
    w.add_f64("scale", &[conn.scale], &[1]);
    let starts: Vec<i32> = conn.windows.iter()
        .map(|win| i32::try_from(win.start))
        .collect::<Result<_, _>>()
        .context("window start does not fit in i32")?;
    w.add_i32("window_start", &starts, &[starts.len()]);

    w.add_metadata("metric", conn.metric.name());
    w.add_metadata("ch_names", serde_json::to_string(&conn.ch_names)?);
    w.add_metadata("labels", serde_json::to_string(&conn.labels())?);
    w.write(path)
}
