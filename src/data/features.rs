// ============================================================
// Raw Feature Readers and Padding
// ============================================================
// Reads one sample's raw feature sequence from disk and pads a
// whole split into one dense (N, L_max, D) array.
//
// Raw formats written by the upstream extractors:
//   - audio: `;`-delimited CSV with a header row,
//            one row per time step, every column numeric.
//            Read as f64; it only becomes f32 after
//            normalization.
//   - face:  .npy float32 array (T, D)
//   - text:  .npy float32 array (T, D) or (1, T, D)
//
// Padding rule: zeros are appended on the time axis until the
// sequence has exactly L_max steps. A sequence longer than
// L_max is an error; we never truncate.

use ndarray::{s, Array2, Array3, ArrayD, Axis, Ix2};
use ndarray_npy::ReadNpyExt;
use std::{fs::File, io::BufReader, path::Path};

use crate::domain::modality::Modality;
use crate::error::{PipelineError, Result};

fn ensure_exists(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(PipelineError::MissingInput {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Read an eGeMAPS low-level-descriptor table: one row per
/// time step, one column per descriptor.
pub fn read_lld_csv(path: &Path) -> Result<Array2<f64>> {
    ensure_exists(path)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .from_path(path)?;

    let cols = reader.headers()?.len();
    let mut values = Vec::new();
    let mut rows   = 0usize;

    for record in reader.records() {
        let record = record?;
        for field in record.iter() {
            let value = field.trim().parse::<f64>().map_err(|e| {
                PipelineError::malformed(path, format!("row {rows}: '{field}' is not numeric ({e})"))
            })?;
            values.push(value);
        }
        rows += 1;
    }

    Array2::from_shape_vec((rows, cols), values)
        .map_err(|e| PipelineError::malformed(path, e.to_string()))
}

/// Read a float32 `.npy` feature sequence. A leading unit
/// axis, as written by per-video embedding scripts, is dropped.
pub fn read_npy_sequence(path: &Path) -> Result<Array2<f32>> {
    ensure_exists(path)?;

    let reader = BufReader::new(File::open(path)?);
    let array  = ArrayD::<f32>::read_npy(reader)?;

    let array = match array.ndim() {
        2 => array,
        3 if array.shape()[0] == 1 => array.index_axis_move(Axis(0), 0),
        _ => {
            return Err(PipelineError::malformed(
                path,
                format!("expected shape (T, D) or (1, T, D), found {:?}", array.shape()),
            ))
        }
    };

    array
        .into_dimensionality::<Ix2>()
        .map_err(|e| PipelineError::malformed(path, e.to_string()))
}

// ─── PaddedStack ──────────────────────────────────────────────────────────────
/// Accumulates the sequences of one split into a zero-padded
/// (N, L_max, D) array, in push order.
///
/// The output buffer is allocated on the first push, once the
/// feature dimension is known, so raw sequences never need to be
/// held all at once. Padding is `A::default()`, i.e. zero for
/// the float types used here.
pub struct PaddedStack<A> {
    modality: Modality,
    samples:  usize,
    max_len:  usize,
    filled:   usize,
    out:      Option<Array3<A>>,
}

impl<A: Clone + Default> PaddedStack<A> {
    pub fn new(modality: Modality, samples: usize, max_len: usize) -> Self {
        Self {
            modality,
            samples,
            max_len,
            filled: 0,
            out: None,
        }
    }

    /// Copy `seq` into the next row, zero-padded to `max_len`.
    pub fn push(&mut self, sample: &str, seq: &Array2<A>) -> Result<()> {
        let (len, dim) = seq.dim();

        if self.filled >= self.samples {
            return Err(PipelineError::shape_mismatch(
                format!("{} samples stacked", self.modality),
                self.samples,
                self.filled + 1,
            ));
        }
        if len > self.max_len {
            return Err(PipelineError::SequenceTooLong {
                modality: self.modality,
                sample:   sample.to_string(),
                len,
                max:      self.max_len,
            });
        }

        let (samples, max_len) = (self.samples, self.max_len);
        let out = self
            .out
            .get_or_insert_with(|| Array3::default((samples, max_len, dim)));

        let expected = out.shape()[2];
        if dim != expected {
            return Err(PipelineError::FeatureDimMismatch {
                modality: self.modality,
                sample:   sample.to_string(),
                expected,
                actual:   dim,
            });
        }

        out.slice_mut(s![self.filled, ..len, ..]).assign(seq);
        self.filled += 1;
        Ok(())
    }

    pub fn finish(self) -> Result<Array3<A>> {
        if self.filled != self.samples {
            return Err(PipelineError::shape_mismatch(
                format!("{} samples stacked", self.modality),
                self.samples,
                self.filled,
            ));
        }
        Ok(self
            .out
            .unwrap_or_else(|| Array3::default((self.samples, self.max_len, 0))))
    }
}
