// ============================================================
// Audio Normalization
// ============================================================
// Z-score normalization of the padded audio stack.
//
// Statistics are fitted on the TRAIN split only:
//   mean[d] = Σ_{n,t} x[n,t,d] / (N·T)
//   std[d]  = sqrt( Σ_{n,t} (x[n,t,d] − mean[d])² / (N·T) )
//
// Raw audio arrives as f64 and every step here stays in f64;
// only the normalized output is narrowed to f32.
//
// Padding zeros are part of the sums, and the std is the
// population std. Validation and test never fit their own
// statistics; they read the ones stored in the train artifact.
//
// There is no epsilon guard. A constant feature has std 0 and
// its normalized values become NaN or ±inf. We only warn about
// it so the numbers stay exactly `(x - mean) / std`.
//
// The cached audio artifact is a bincode container:
//   AudioArtifact { stats: Some(..) on train / None otherwise,
//                   normalized: Array3<f32> }
// `stats` is serialised first so `read_stats` can pull the
// two small vectors without decoding the whole array.

use ndarray::{Array1, Array3};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

use crate::error::{PipelineError, Result};
use crate::infra::cache::Artifact;

// ─── NormStats ────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormStats {
    pub mean: Array1<f64>,
    pub std:  Array1<f64>,
}

impl NormStats {
    /// Fit per-feature mean and population std over the sample
    /// and time axes jointly.
    pub fn fit(raw: &Array3<f64>) -> Self {
        let dim   = raw.shape()[2];
        let count = (raw.shape()[0] * raw.shape()[1]) as f64;

        // Pass 1: mean
        let mut sum = Array1::<f64>::zeros(dim);
        for row in raw.rows() {
            for (acc, &x) in sum.iter_mut().zip(row.iter()) {
                *acc += x;
            }
        }
        let mean = sum / count;

        // Pass 2: variance around the mean
        let mut sq = Array1::<f64>::zeros(dim);
        for row in raw.rows() {
            for ((acc, &x), &m) in sq.iter_mut().zip(row.iter()).zip(mean.iter()) {
                let diff = x - m;
                *acc += diff * diff;
            }
        }
        let std = (sq / count).mapv(f64::sqrt);

        Self { mean, std }
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Indices of features whose std is zero.
    pub fn zero_variance_features(&self) -> Vec<usize> {
        self.std
            .iter()
            .enumerate()
            .filter(|&(_, &s)| s == 0.0)
            .map(|(i, _)| i)
            .collect()
    }

    /// `(x - mean) / std`, feature-wise, narrowed to f32.
    pub fn apply(&self, raw: &Array3<f64>) -> Result<Array3<f32>> {
        let dim = raw.shape()[2];
        if dim != self.dim() {
            return Err(PipelineError::shape_mismatch(
                "audio feature dimension vs. train statistics",
                self.dim(),
                dim,
            ));
        }

        let mut out = Array3::<f32>::zeros(raw.raw_dim());
        for (mut dst, src) in out.rows_mut().into_iter().zip(raw.rows()) {
            for (((y, &x), &m), &s) in dst
                .iter_mut()
                .zip(src.iter())
                .zip(self.mean.iter())
                .zip(self.std.iter())
            {
                *y = ((x - m) / s) as f32;
            }
        }
        Ok(out)
    }
}

// ─── AudioArtifact ────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioArtifact {
    /// Present only on the train artifact.
    pub stats:      Option<NormStats>,
    pub normalized: Array3<f32>,
}

/// Leading field of an `AudioArtifact`, decoded on its own.
#[derive(Deserialize)]
struct StatsPrefix {
    stats: Option<NormStats>,
}

impl AudioArtifact {
    /// Read only the statistics stored at the front of an
    /// audio artifact file.
    pub fn read_stats(path: &Path) -> Result<Option<NormStats>> {
        let reader = BufReader::new(File::open(path)?);
        let prefix: StatsPrefix = bincode::deserialize_from(reader)?;
        Ok(prefix.stats)
    }
}

impl Artifact for AudioArtifact {
    const EXTENSION: &'static str = "bin";

    fn read_from(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(bincode::deserialize_from(reader)?)
    }

    fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        bincode::serialize_into(writer, self)?;
        Ok(())
    }
}

// ─── Split normalization ──────────────────────────────────────────────────────

/// Fit statistics on the train stack and normalize it.
pub fn normalize_train(raw: &Array3<f64>) -> Result<AudioArtifact> {
    let stats = NormStats::fit(raw);
    warn_zero_variance(&stats);

    let normalized = stats.apply(raw)?;
    tracing::info!("Fitted audio statistics over {} features", stats.dim());

    Ok(AudioArtifact {
        stats: Some(stats),
        normalized,
    })
}

/// Normalize a validation/test stack with the statistics read
/// from the train artifact at `train_artifact`.
pub fn normalize_with_train_stats(raw: &Array3<f64>, train_artifact: &Path) -> Result<AudioArtifact> {
    let missing = || PipelineError::MissingStatistics {
        path: train_artifact.to_path_buf(),
    };

    if !train_artifact.is_file() {
        return Err(missing());
    }
    let stats = AudioArtifact::read_stats(train_artifact)?.ok_or_else(missing)?;

    Ok(AudioArtifact {
        stats:      None,
        normalized: stats.apply(raw)?,
    })
}

fn warn_zero_variance(stats: &NormStats) {
    let constant = stats.zero_variance_features();
    if !constant.is_empty() {
        tracing::warn!(
            "Audio features {:?} have zero variance; their normalized values will be NaN/inf",
            constant
        );
    }
}
