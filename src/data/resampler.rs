// ============================================================
// Temporal Resampling
// ============================================================
// Shortens each modality's padded sequence to a target length
// when a sample is accessed (not when the split is loaded).
//
// Two phases:
//   resolve  — once, when the dataset-set is built. Fills unset
//              targets with the full length and validates every
//              target against it.
//   apply    — on every access. Stateless apart from the RNG.
//
// Index selection for full length L and target n:
//
//   Uniform  n evenly spaced indices over [0, L−1], both ends
//            included: round(i·(L−1)/(n−1)).
//            L=1000, n=10 → [0, 111, 222, …, 888, 999]
//
//   Random   n distinct indices drawn from [0, L−1) (the last
//            index is never picked), then sorted so temporal
//            order is kept. Redrawn on every access, so each
//            epoch sees a different subsample. Train only.
//
// A modality whose target equals its full length is passed
// through untouched in both modes. The label is never changed.

use burn::data::dataset::Dataset;
use ndarray::{Array2, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::dataset::{MultimodalSample, SplitDataset};
use crate::domain::{layout::ModalityLengths, modality::Modality};
use crate::error::{PipelineError, Result};

// ─── Index selection ──────────────────────────────────────────────────────────

/// `target` evenly spaced indices over `[0, full - 1]`.
pub fn uniform_indices(full: usize, target: usize) -> Vec<usize> {
    match target {
        0 => Vec::new(),
        1 => vec![0],
        _ => {
            let last = (full - 1) as f64;
            let step = (target - 1) as f64;
            (0..target)
                .map(|i| ((i as f64 * last / step).round() as usize).min(full - 1))
                .collect()
        }
    }
}

/// `target` distinct ascending indices drawn uniformly from
/// `[0, full - 1)`. Requires `target < full`.
pub fn random_indices<R: Rng + ?Sized>(rng: &mut R, full: usize, target: usize) -> Vec<usize> {
    let mut picked = rand::seq::index::sample(rng, full - 1, target).into_vec();
    picked.sort_unstable();
    picked
}

// ─── Configuration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplingMode {
    Uniform,
    Random,
}

/// Requested target lengths. `None` keeps the full length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResampleConfig {
    pub audio: Option<usize>,
    pub face:  Option<usize>,
    pub text:  Option<usize>,
}

impl ResampleConfig {
    pub fn new(audio: Option<usize>, face: Option<usize>, text: Option<usize>) -> Self {
        Self { audio, face, text }
    }

    /// True when at least one modality has a target length.
    pub fn is_active(&self) -> bool {
        self.audio.is_some() || self.face.is_some() || self.text.is_some()
    }

    pub fn target(&self, modality: Modality) -> Option<usize> {
        match modality {
            Modality::Audio => self.audio,
            Modality::Face  => self.face,
            Modality::Text  => self.text,
        }
    }

    /// Fix unset targets to the full lengths and validate the rest.
    pub fn resolve(&self, full: ModalityLengths, mode: SamplingMode) -> Result<ResolvedResample> {
        let mut target = full;

        for modality in Modality::ALL {
            let Some(requested) = self.target(modality) else {
                continue;
            };
            if requested == 0 {
                return Err(PipelineError::InvalidResampleLength { modality });
            }

            let full_len = full.get(modality);
            if requested > full_len {
                return Err(PipelineError::ResampleExceedsLength {
                    modality,
                    target: requested,
                    max:    full_len,
                });
            }
            // Random draws exclude the last index, so a random
            // subsample has at most full - 1 steps.
            if mode == SamplingMode::Random && requested == full_len {
                return Err(PipelineError::ResampleExceedsLength {
                    modality,
                    target: requested,
                    max:    full_len - 1,
                });
            }

            match modality {
                Modality::Audio => target.audio = requested,
                Modality::Face  => target.face = requested,
                Modality::Text  => target.text = requested,
            }
        }

        Ok(ResolvedResample::new(full, target, mode))
    }
}

// ─── ResolvedResample ─────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedResample {
    full:    ModalityLengths,
    target:  ModalityLengths,
    mode:    SamplingMode,
    /// Precomputed uniform indices, per modality.
    uniform: [Vec<usize>; 3],
}

impl ResolvedResample {
    fn new(full: ModalityLengths, target: ModalityLengths, mode: SamplingMode) -> Self {
        let uniform = Modality::ALL.map(|m| uniform_indices(full.get(m), target.get(m)));
        Self { full, target, mode, uniform }
    }

    pub fn full(&self) -> ModalityLengths {
        self.full
    }

    pub fn target(&self) -> ModalityLengths {
        self.target
    }

    pub fn mode(&self) -> SamplingMode {
        self.mode
    }

    /// Indices picked for `modality` on one access.
    pub fn indices<R: Rng + ?Sized>(&self, modality: Modality, rng: &mut R) -> Vec<usize> {
        let full   = self.full.get(modality);
        let target = self.target.get(modality);

        match self.mode {
            SamplingMode::Random if target < full => random_indices(rng, full, target),
            _ => self.uniform[modality_slot(modality)].clone(),
        }
    }

    /// Subsample every modality of `sample` along the time axis.
    pub fn apply(&self, sample: MultimodalSample) -> MultimodalSample {
        self.apply_with(sample, &mut rand::thread_rng())
    }

    pub fn apply_with<R: Rng + ?Sized>(&self, sample: MultimodalSample, rng: &mut R) -> MultimodalSample {
        MultimodalSample {
            audio: self.select(Modality::Audio, sample.audio, rng),
            face:  self.select(Modality::Face, sample.face, rng),
            text:  self.select(Modality::Text, sample.text, rng),
            label: sample.label,
        }
    }

    fn select<R: Rng + ?Sized>(&self, modality: Modality, seq: Array2<f32>, rng: &mut R) -> Array2<f32> {
        if self.target.get(modality) == self.full.get(modality) {
            return seq;
        }
        seq.select(Axis(0), &self.indices(modality, rng))
    }
}

fn modality_slot(modality: Modality) -> usize {
    match modality {
        Modality::Audio => 0,
        Modality::Face  => 1,
        Modality::Text  => 2,
    }
}

// ─── ResampledDataset ─────────────────────────────────────────────────────────
/// A split whose samples are resampled on access.
#[derive(Debug)]
pub struct ResampledDataset {
    inner:    SplitDataset,
    resolved: ResolvedResample,
}

impl ResampledDataset {
    /// Wrap `inner`. Its padded lengths must be the ones the
    /// transform was resolved against.
    pub fn new(inner: SplitDataset, resolved: ResolvedResample) -> Result<Self> {
        let lengths = inner.full_lengths();
        for modality in Modality::ALL {
            if lengths.get(modality) != resolved.full.get(modality) {
                return Err(PipelineError::shape_mismatch(
                    format!("{} {modality} length vs. resample transform", inner.split()),
                    resolved.full.get(modality),
                    lengths.get(modality),
                ));
            }
        }
        Ok(Self { inner, resolved })
    }

    pub fn inner(&self) -> &SplitDataset {
        &self.inner
    }

    pub fn resolved(&self) -> &ResolvedResample {
        &self.resolved
    }
}

impl Dataset<MultimodalSample> for ResampledDataset {
    fn get(&self, index: usize) -> Option<MultimodalSample> {
        self.inner.get(index).map(|sample| self.resolved.apply(sample))
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{layout::CorpusLayout, split::Split};
    use ndarray::{Array, Array3};
    use rand::{rngs::StdRng, SeedableRng};

    fn full() -> ModalityLengths {
        CorpusLayout::impression_v2().lengths
    }

    #[test]
    fn test_uniform_thousand_to_ten() {
        assert_eq!(
            uniform_indices(1000, 10),
            vec![0, 111, 222, 333, 444, 555, 666, 777, 888, 999]
        );
    }

    #[test]
    fn test_uniform_includes_both_ends() {
        let idx = uniform_indices(1526, 7);
        assert_eq!(idx.len(), 7);
        assert_eq!(idx[0], 0);
        assert_eq!(idx[6], 1525);
        assert!(idx.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_uniform_is_pure() {
        assert_eq!(uniform_indices(459, 13), uniform_indices(459, 13));
        assert_eq!(uniform_indices(60, 1), vec![0]);
        assert_eq!(uniform_indices(60, 60), (0..60).collect::<Vec<_>>());
    }

    #[test]
    fn test_random_indices_distinct_sorted_excluding_last() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let idx = random_indices(&mut rng, 60, 10);
            assert_eq!(idx.len(), 10);
            assert!(idx.windows(2).all(|w| w[0] < w[1]));
            assert!(idx.iter().all(|&i| i < 59));
        }
    }

    #[test]
    fn test_random_indices_vary_between_draws() {
        let mut rng = StdRng::seed_from_u64(1);
        let draws: Vec<Vec<usize>> = (0..10).map(|_| random_indices(&mut rng, 1526, 10)).collect();
        assert!(draws.iter().any(|d| d != &draws[0]));
    }

    #[test]
    fn test_resolve_fills_unset_targets() {
        let resolved = ResampleConfig::new(Some(10), None, None)
            .resolve(full(), SamplingMode::Uniform)
            .unwrap();
        assert_eq!(resolved.target(), ModalityLengths::new(10, 459, 60));
    }

    #[test]
    fn test_target_beyond_full_length_rejected() {
        let err = ResampleConfig::new(Some(2000), None, None)
            .resolve(full(), SamplingMode::Uniform)
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ResampleExceedsLength { modality: Modality::Audio, target: 2000, max: 1526 }
        ));
    }

    #[test]
    fn test_random_mode_cannot_take_every_step() {
        let err = ResampleConfig::new(None, None, Some(60))
            .resolve(full(), SamplingMode::Random)
            .unwrap_err();
        assert!(matches!(err, PipelineError::ResampleExceedsLength { max: 59, .. }));

        // Uniform mode accepts the full length.
        assert!(ResampleConfig::new(None, None, Some(60))
            .resolve(full(), SamplingMode::Uniform)
            .is_ok());
    }

    #[test]
    fn test_zero_target_rejected() {
        let err = ResampleConfig::new(None, Some(0), None)
            .resolve(full(), SamplingMode::Uniform)
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidResampleLength { modality: Modality::Face }));
    }

    fn small_split() -> SplitDataset {
        let layout = CorpusLayout {
            train_size: 2,
            valid_size: 2,
            test_size:  2,
            lengths:    ModalityLengths::new(10, 6, 4),
        };
        SplitDataset::assemble(
            Split::Train,
            &layout,
            Array::from_shape_fn((2, 10, 2), |(_, t, _)| t as f32),
            Array::from_shape_fn((2, 6, 3), |(_, t, _)| t as f32),
            Array3::ones((2, 4, 5)),
            Array::from_shape_fn((2, 3), |(i, k)| (i * 3 + k) as f32),
        )
        .unwrap()
    }

    #[test]
    fn test_uniform_apply_selects_expected_steps() {
        let inner    = small_split();
        let resolved = ResampleConfig::new(Some(4), Some(2), None)
            .resolve(inner.full_lengths(), SamplingMode::Uniform)
            .unwrap();
        let ds = ResampledDataset::new(inner, resolved).unwrap();

        let sample = ds.get(1).unwrap();
        assert_eq!(sample.audio.dim(), (4, 2));
        assert_eq!(sample.audio.column(0).to_vec(), vec![0.0, 3.0, 6.0, 9.0]);
        assert_eq!(sample.face.column(0).to_vec(), vec![0.0, 5.0]);
        assert_eq!(sample.text.dim(), (4, 5));
        assert_eq!(sample.label.to_vec(), vec![3.0, 4.0, 5.0]);

        assert_eq!(ds.get(1).unwrap(), sample);
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn test_random_apply_keeps_order() {
        let inner    = small_split();
        let resolved = ResampleConfig::new(Some(5), None, None)
            .resolve(inner.full_lengths(), SamplingMode::Random)
            .unwrap();

        let mut rng = StdRng::seed_from_u64(3);
        let sample  = resolved.apply_with(inner.get(0).unwrap(), &mut rng);
        let steps   = sample.audio.column(0).to_vec();

        assert_eq!(steps.len(), 5);
        assert!(steps.windows(2).all(|w| w[0] < w[1]));
        assert!(steps.iter().all(|&s| s < 9.0));
        assert_eq!(sample.face.nrows(), 6);
    }

    #[test]
    fn test_wrapper_rejects_mismatched_lengths() {
        let resolved = ResampleConfig::new(Some(4), None, None)
            .resolve(full(), SamplingMode::Uniform)
            .unwrap();
        let err = ResampledDataset::new(small_split(), resolved).unwrap_err();
        assert!(matches!(err, PipelineError::ShapeMismatch { .. }));
    }
}
