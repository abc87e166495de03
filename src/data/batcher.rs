// ============================================================
// Multimodal Batcher
// ============================================================
// Implements burn's Batcher trait so a DataLoader can turn a
// Vec<MultimodalSample> into device tensors.
//
//   Input:  B samples, each with (L_m, D_m) sequences
//   Output: MultimodalBatch with
//             audio  [B, L_a, D_a]
//             face   [B, L_f, D_f]
//             text   [B, L_t, D_t]
//             labels [B, K]
//
// Every sample of a split has the same shapes (padding and
// resampling guarantee it), so stacking is a flat copy followed
// by one reshape per tensor.
//
// Batch size, shuffling and workers stay with the DataLoader.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::TensorData,
};
use ndarray::Array2;

use crate::data::dataset::MultimodalSample;

#[derive(Debug, Clone)]
pub struct MultimodalBatch<B: Backend> {
    pub audio:  Tensor<B, 3>,
    pub face:   Tensor<B, 3>,
    pub text:   Tensor<B, 3>,
    pub labels: Tensor<B, 2>,
}

#[derive(Clone, Debug)]
pub struct MultimodalBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> MultimodalBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    /// Stack one modality of every item into a [B, L, D] tensor.
    fn stack(&self, items: &[MultimodalSample], pick: fn(&MultimodalSample) -> &Array2<f32>) -> Tensor<B, 3> {
        let (len, dim) = pick(&items[0]).dim();

        let flat: Vec<f32> = items
            .iter()
            .flat_map(|item| {
                let seq = pick(item);
                assert_eq!(seq.dim(), (len, dim), "samples in a batch must share one shape");
                seq.iter().copied()
            })
            .collect();

        Tensor::from_data(TensorData::new(flat, [items.len(), len, dim]), &self.device)
    }
}

impl<B: Backend> Batcher<MultimodalSample, MultimodalBatch<B>> for MultimodalBatcher<B> {
    fn batch(&self, items: Vec<MultimodalSample>) -> MultimodalBatch<B> {
        assert!(!items.is_empty(), "cannot batch zero samples");

        let targets = items[0].label.len();
        let labels: Vec<f32> = items
            .iter()
            .flat_map(|item| item.label.iter().copied())
            .collect();

        MultimodalBatch {
            audio:  self.stack(&items, |s| &s.audio),
            face:   self.stack(&items, |s| &s.face),
            text:   self.stack(&items, |s| &s.text),
            labels: Tensor::from_data(TensorData::new(labels, [items.len(), targets]), &self.device),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use ndarray::{Array, Array1};

    type TestBackend = NdArray;

    fn sample(offset: f32) -> MultimodalSample {
        MultimodalSample {
            audio: Array::from_shape_fn((4, 2), |(t, d)| offset + (t * 2 + d) as f32),
            face:  Array2::from_elem((3, 5), offset),
            text:  Array2::zeros((2, 6)),
            label: Array1::from(vec![offset, offset + 0.5]),
        }
    }

    #[test]
    fn test_batch_shapes() {
        let batcher = MultimodalBatcher::<TestBackend>::new(Default::default());
        let batch   = batcher.batch(vec![sample(0.0), sample(100.0), sample(200.0)]);

        assert_eq!(batch.audio.dims(), [3, 4, 2]);
        assert_eq!(batch.face.dims(), [3, 3, 5]);
        assert_eq!(batch.text.dims(), [3, 2, 6]);
        assert_eq!(batch.labels.dims(), [3, 2]);
    }

    #[test]
    fn test_batch_preserves_sample_order() {
        let batcher = MultimodalBatcher::<TestBackend>::new(Default::default());
        let batch   = batcher.batch(vec![sample(0.0), sample(100.0)]);

        let labels = batch.labels.into_data().to_vec::<f32>().unwrap();
        assert_eq!(labels, vec![0.0, 0.5, 100.0, 100.5]);

        let audio = batch.audio.into_data().to_vec::<f32>().unwrap();
        assert_eq!(audio[..8], [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(audio[8], 100.0);
    }
}
