// ============================================================
// Pipeline Errors
// ============================================================
// One error type for the whole library. Every failure here is
// fatal for the load that raised it: nothing is retried and no
// partial dataset is ever returned.
//
// The variants fall into four groups:
//   - configuration   (bad selectors, fusion flags, zero targets)
//   - data integrity  (sizes, shapes, label names, raw files)
//   - missing train statistics for validation/test
//   - resampling targets longer than the sequence
//
// The binary wraps these in anyhow for context; library callers
// can match on the variant.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::{modality::Modality, split::Split};

/// Result type for every fallible pipeline operation.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    // ── Configuration ────────────────────────────────────────────────────────
    #[error("unsupported {modality} source '{selector}'")]
    UnsupportedSource { modality: Modality, selector: String },

    #[error("only one of audio-only, face-only and text-only fusion may be set")]
    ConflictingFusionTargets,

    #[error("{modality} resample length must be positive")]
    InvalidResampleLength { modality: Modality },

    // ── Data integrity ───────────────────────────────────────────────────────
    #[error("{split} split has {actual} samples, expected {expected}")]
    SampleCountMismatch { split: Split, expected: usize, actual: usize },

    #[error("{split} target names {actual:?} differ from train target names {expected:?}")]
    TargetNamesMismatch {
        split:    Split,
        expected: Vec<String>,
        actual:   Vec<String>,
    },

    #[error("{modality} sequence of sample '{sample}' has {len} steps, maximum is {max}")]
    SequenceTooLong {
        modality: Modality,
        sample:   String,
        len:      usize,
        max:      usize,
    },

    #[error("{modality} features of sample '{sample}' have dimension {actual}, expected {expected}")]
    FeatureDimMismatch {
        modality: Modality,
        sample:   String,
        expected: usize,
        actual:   usize,
    },

    #[error("{what}: expected {expected}, found {actual}")]
    ShapeMismatch {
        what:     String,
        expected: usize,
        actual:   usize,
    },

    #[error("label '{label}' has no value for sample '{sample}'")]
    MissingLabel { label: String, sample: String },

    #[error("missing input file '{}'", path.display())]
    MissingInput { path: PathBuf },

    #[error("malformed input '{}': {reason}", path.display())]
    MalformedInput { path: PathBuf, reason: String },

    // ── Missing dependency ───────────────────────────────────────────────────
    #[error(
        "normalization statistics not found in '{}'; load the train split first",
        path.display()
    )]
    MissingStatistics { path: PathBuf },

    // ── Resampling ───────────────────────────────────────────────────────────
    #[error("{modality} resample length {target} exceeds the allowed maximum {max}")]
    ResampleExceedsLength {
        modality: Modality,
        target:   usize,
        max:      usize,
    },

    // ── Wrapped I/O and codec errors ─────────────────────────────────────────
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("NPY read error: {0}")]
    NpyRead(#[from] ndarray_npy::ReadNpyError),

    #[error("NPY write error: {0}")]
    NpyWrite(#[from] ndarray_npy::WriteNpyError),

    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            path:   path.into(),
            reason: reason.into(),
        }
    }

    pub fn shape_mismatch(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }

    /// True for errors caused by configuration rather than by data on disk.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedSource { .. }
                | Self::ConflictingFusionTargets
                | Self::InvalidResampleLength { .. }
        )
    }
}
