// ============================================================
// Split Assembler and Datasets
// ============================================================
// Joins the three padded modality stacks and the label matrix
// of one split into a dataset that burn's DataLoader can index.
//
//   audio  (N, 1526, D_a) ┐
//   face   (N,  459, D_f) ├─► SplitDataset ─ get(i) ─► MultimodalSample
//   text   (N,   60, D_t) │
//   labels (N, K)         ┘
//
// Assembly is pure: it only checks shapes and moves the arrays
// in. Every modality must have the same N as the labels and
// exactly its fixed padded length.
//
// MultimodalDataset is what the training side receives: either
// the split as-is or the split behind a resampling transform.
//
// Reference: Burn Book §4 (Datasets)

use burn::data::dataset::Dataset;
use ndarray::{Array1, Array2, Array3, Axis};
use serde::{Deserialize, Serialize};

use crate::data::resampler::ResampledDataset;
use crate::domain::{
    layout::{CorpusLayout, ModalityLengths},
    modality::Modality,
    split::Split,
};
use crate::error::{PipelineError, Result};

/// One aligned sample: (time, feature) sequences per modality
/// plus the label vector.
#[derive(Debug, Clone, PartialEq)]
pub struct MultimodalSample {
    pub audio: Array2<f32>,
    pub face:  Array2<f32>,
    pub text:  Array2<f32>,
    pub label: Array1<f32>,
}

impl MultimodalSample {
    /// Time steps per modality.
    pub fn lengths(&self) -> ModalityLengths {
        ModalityLengths::new(self.audio.nrows(), self.face.nrows(), self.text.nrows())
    }
}

// ─── SplitDataset ─────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct SplitDataset {
    split:  Split,
    audio:  Array3<f32>,
    face:   Array3<f32>,
    text:   Array3<f32>,
    labels: Array2<f32>,
}

impl SplitDataset {
    /// Assemble a split, checking that every modality has one row
    /// per label and the fixed padded length of `layout`.
    pub fn assemble(
        split:  Split,
        layout: &CorpusLayout,
        audio:  Array3<f32>,
        face:   Array3<f32>,
        text:   Array3<f32>,
        labels: Array2<f32>,
    ) -> Result<Self> {
        let n = labels.nrows();

        for (modality, stack) in [
            (Modality::Audio, &audio),
            (Modality::Face, &face),
            (Modality::Text, &text),
        ] {
            if stack.shape()[0] != n {
                return Err(PipelineError::shape_mismatch(
                    format!("{split} {modality} samples vs. labels"),
                    n,
                    stack.shape()[0],
                ));
            }
            let max_len = layout.max_len(modality);
            if stack.shape()[1] != max_len {
                return Err(PipelineError::shape_mismatch(
                    format!("{split} {modality} padded length"),
                    max_len,
                    stack.shape()[1],
                ));
            }
        }

        Ok(Self { split, audio, face, text, labels })
    }

    pub fn split(&self) -> Split {
        self.split
    }

    /// Padded length of every sequence, per modality.
    pub fn full_lengths(&self) -> ModalityLengths {
        ModalityLengths::new(self.audio.shape()[1], self.face.shape()[1], self.text.shape()[1])
    }

    /// Feature dimension of `modality`.
    pub fn feature_dim(&self, modality: Modality) -> usize {
        match modality {
            Modality::Audio => self.audio.shape()[2],
            Modality::Face  => self.face.shape()[2],
            Modality::Text  => self.text.shape()[2],
        }
    }
}

impl Dataset<MultimodalSample> for SplitDataset {
    fn get(&self, index: usize) -> Option<MultimodalSample> {
        if index >= self.labels.nrows() {
            return None;
        }
        Some(MultimodalSample {
            audio: self.audio.index_axis(Axis(0), index).to_owned(),
            face:  self.face.index_axis(Axis(0), index).to_owned(),
            text:  self.text.index_axis(Axis(0), index).to_owned(),
            label: self.labels.row(index).to_owned(),
        })
    }

    fn len(&self) -> usize {
        self.labels.nrows()
    }
}

// ─── MultimodalDataset ────────────────────────────────────────────────────────
/// A split as handed to the training side.
#[derive(Debug)]
pub enum MultimodalDataset {
    Full(SplitDataset),
    Resampled(ResampledDataset),
}

impl MultimodalDataset {
    pub fn split(&self) -> Split {
        match self {
            MultimodalDataset::Full(ds) => ds.split(),
            MultimodalDataset::Resampled(ds) => ds.inner().split(),
        }
    }

    pub fn is_resampled(&self) -> bool {
        matches!(self, MultimodalDataset::Resampled(_))
    }
}

impl Dataset<MultimodalSample> for MultimodalDataset {
    fn get(&self, index: usize) -> Option<MultimodalSample> {
        match self {
            MultimodalDataset::Full(ds) => ds.get(index),
            MultimodalDataset::Resampled(ds) => ds.get(index),
        }
    }

    fn len(&self) -> usize {
        match self {
            MultimodalDataset::Full(ds) => ds.len(),
            MultimodalDataset::Resampled(ds) => ds.len(),
        }
    }
}

// ─── ModelInputDims ───────────────────────────────────────────────────────────
/// Input sizes a model needs to be built for this data,
/// read off one (possibly resampled) training sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInputDims {
    pub orig_d_a:   usize,
    pub orig_d_v:   usize,
    pub orig_d_l:   usize,
    pub a_len:      usize,
    pub v_len:      usize,
    pub l_len:      usize,
    pub output_dim: usize,
}

impl ModelInputDims {
    pub fn from_sample(sample: &MultimodalSample) -> Self {
        Self {
            orig_d_a:   sample.audio.ncols(),
            orig_d_v:   sample.face.ncols(),
            orig_d_l:   sample.text.ncols(),
            a_len:      sample.audio.nrows(),
            v_len:      sample.face.nrows(),
            l_len:      sample.text.nrows(),
            output_dim: sample.label.len(),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array;

    fn layout() -> CorpusLayout {
        CorpusLayout {
            train_size: 3,
            valid_size: 1,
            test_size:  1,
            lengths:    ModalityLengths::new(5, 4, 3),
        }
    }

    fn stacks(n: usize) -> (Array3<f32>, Array3<f32>, Array3<f32>, Array2<f32>) {
        (
            Array::from_shape_fn((n, 5, 2), |(i, t, d)| (i * 100 + t * 10 + d) as f32),
            Array::from_shape_fn((n, 4, 3), |(i, _, _)| i as f32),
            Array::from_shape_fn((n, 3, 6), |(i, _, _)| -(i as f32)),
            Array::from_shape_fn((n, 2), |(i, k)| (i + k) as f32 / 10.0),
        )
    }

    #[test]
    fn test_indexed_access() {
        let (a, f, t, l) = stacks(3);
        let ds = SplitDataset::assemble(Split::Train, &layout(), a, f, t, l).unwrap();

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.full_lengths(), ModalityLengths::new(5, 4, 3));
        assert_eq!(ds.feature_dim(Modality::Face), 3);

        let sample = ds.get(2).unwrap();
        assert_eq!(sample.audio.dim(), (5, 2));
        assert_eq!(sample.audio[[1, 1]], 211.0);
        assert_eq!(sample.face[[0, 0]], 2.0);
        assert_eq!(sample.text[[0, 0]], -2.0);
        assert_eq!(sample.label.to_vec(), vec![0.2, 0.3]);

        assert!(ds.get(3).is_none());
    }

    #[test]
    fn test_mismatched_sample_count() {
        let (a, f, _, l) = stacks(3);
        let (_, _, t, _) = stacks(2);
        let err = SplitDataset::assemble(Split::Train, &layout(), a, f, t, l).unwrap_err();
        assert!(matches!(err, PipelineError::ShapeMismatch { expected: 3, actual: 2, .. }));
    }

    #[test]
    fn test_wrong_padded_length() {
        let (_, f, t, l) = stacks(3);
        let audio = Array3::zeros((3, 6, 2));
        let err = SplitDataset::assemble(Split::Train, &layout(), audio, f, t, l).unwrap_err();
        assert!(matches!(err, PipelineError::ShapeMismatch { expected: 5, actual: 6, .. }));
    }

    #[test]
    fn test_model_input_dims() {
        let (a, f, t, l) = stacks(1);
        let ds   = SplitDataset::assemble(Split::Test, &layout(), a, f, t, l).unwrap();
        let dims = ModelInputDims::from_sample(&ds.get(0).unwrap());

        assert_eq!(
            dims,
            ModelInputDims {
                orig_d_a:   2,
                orig_d_v:   3,
                orig_d_l:   6,
                a_len:      5,
                v_len:      4,
                l_len:      3,
                output_dim: 2,
            }
        );
    }
}
