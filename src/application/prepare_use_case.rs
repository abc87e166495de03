// ============================================================
// Layer 2 — PrepareUseCase
// ============================================================
// Builds the train / valid / test datasets in order:
//
//   Step 1: Resolve resample targets     (Layer 4 - data)
//   Step 2: Open the artifact cache      (Layer 6 - infra)
//   Step 3: Per split, train first:
//             a. load ground truth       (Layer 4 - data)
//             b. load audio, face, text  (Layer 4 - data, cached)
//             c. assemble the split      (Layer 4 - data)
//   Step 4: Check target names and feature dims match train
//   Step 5: Wrap splits with the resample transform
//
// Train must come first: the valid and test audio are
// normalized with statistics stored in the train artifact.
//
// Resample targets are checked against the padded lengths of
// the layout before any file is read, so a bad target fails
// without producing (or caching) anything.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::data::{
    dataset::{ModelInputDims, MultimodalDataset, SplitDataset},
    ground_truth::load_ground_truth,
    resampler::{ResampleConfig, ResampledDataset, ResolvedResample, SamplingMode},
    sources::{FeatureSource, SourceEnv},
};
use crate::domain::{
    fusion::FusionTargets,
    layout::CorpusLayout,
    modality::{AudioSource, FaceSource, Modality, TextSource},
    split::Split,
};
use crate::error::{PipelineError, Result};
use crate::infra::cache::ArtifactCache;
use burn::data::dataset::Dataset;

// ─── Pipeline Configuration ──────────────────────────────────────────────────
// Everything one preparation run depends on. Saved next to the
// cached artifacts so later runs can reload it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub data_dir:      PathBuf,
    pub embedding_dir: PathBuf,
    /// Defaults to `data_dir` when unset.
    pub cache_dir:     Option<PathBuf>,
    pub audio_source:  AudioSource,
    pub face_source:   FaceSource,
    pub text_source:   TextSource,
    pub resample:      ResampleConfig,
    /// Random (instead of uniform) resampling of the train split.
    pub random_sample: bool,
    pub fusion:        FusionTargets,
    /// Fixed corpus shape. Never saved or loaded: outside this
    /// crate's own tests it is always the production layout.
    #[serde(skip)]
    pub(crate) layout: CorpusLayout,
}

impl PipelineConfig {
    /// Default selectors, no resampling, production layout.
    pub fn new(data_dir: impl Into<PathBuf>, embedding_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir:      data_dir.into(),
            embedding_dir: embedding_dir.into(),
            cache_dir:     None,
            audio_source:  AudioSource::default(),
            face_source:   FaceSource::default(),
            text_source:   TextSource::default(),
            resample:      ResampleConfig::default(),
            random_sample: false,
            fusion:        FusionTargets::all(),
            layout:        CorpusLayout::impression_v2(),
        }
    }

    pub fn layout(&self) -> &CorpusLayout {
        &self.layout
    }

    pub fn cache_dir(&self) -> &Path {
        self.cache_dir.as_deref().unwrap_or(&self.data_dir)
    }

    /// Sampling mode of `split`. Only train can be random.
    pub fn sampling_mode(&self, split: Split) -> SamplingMode {
        if split.is_train() && self.random_sample {
            SamplingMode::Random
        } else {
            SamplingMode::Uniform
        }
    }
}

// ─── DatasetSet ───────────────────────────────────────────────────────────────
/// The three prepared splits plus what the training side needs
/// to interpret them.
#[derive(Debug)]
pub struct DatasetSet {
    pub train:        MultimodalDataset,
    pub valid:        MultimodalDataset,
    pub test:         MultimodalDataset,
    /// Label names, identical across splits.
    pub target_names: Vec<String>,
    pub fusion:       FusionTargets,
}

impl DatasetSet {
    pub fn get(&self, split: Split) -> &MultimodalDataset {
        match split {
            Split::Train => &self.train,
            Split::Valid => &self.valid,
            Split::Test  => &self.test,
        }
    }

    /// Model input sizes, read off the first training sample.
    pub fn model_input_dims(&self) -> Option<ModelInputDims> {
        self.train.get(0).map(|sample| ModelInputDims::from_sample(&sample))
    }
}

// ─── PrepareUseCase ───────────────────────────────────────────────────────────
pub struct PrepareUseCase {
    config: PipelineConfig,
}

impl PrepareUseCase {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the full preparation and return the dataset-set.
    pub fn execute(&self) -> Result<DatasetSet> {
        let cfg = &self.config;

        // ── Step 1: Resolve resample targets ─────────────────────────────────
        let resample = if cfg.resample.is_active() {
            let full = cfg.layout().lengths;
            let train = cfg.resample.resolve(full, cfg.sampling_mode(Split::Train))?;
            let eval  = cfg.resample.resolve(full, SamplingMode::Uniform)?;
            tracing::info!(
                "Resampling to {:?} ({:?} on train)",
                train.target(),
                train.mode()
            );
            Some((train, eval))
        } else {
            None
        };

        // ── Step 2: Open the cache ───────────────────────────────────────────
        let cache = ArtifactCache::new(cfg.cache_dir())?;
        let env = SourceEnv {
            data_dir:      &cfg.data_dir,
            embedding_dir: &cfg.embedding_dir,
            layout:        cfg.layout(),
            cache:         &cache,
        };
        tracing::info!("Using cache directory '{}'", cache.dir().display());

        // ── Step 3: Load every split, train first ────────────────────────────
        let (train, target_names) = self.load_split(&env, Split::Train)?;

        // ── Step 4: Target names and feature dims must match train ───────────
        let load_eval = |split: Split| -> Result<SplitDataset> {
            let (ds, names) = self.load_split(&env, split)?;
            if names != target_names {
                return Err(PipelineError::TargetNamesMismatch {
                    split,
                    expected: target_names.clone(),
                    actual:   names,
                });
            }
            for modality in Modality::ALL {
                if ds.feature_dim(modality) != train.feature_dim(modality) {
                    return Err(PipelineError::shape_mismatch(
                        format!("{split} {modality} feature dimension vs. train"),
                        train.feature_dim(modality),
                        ds.feature_dim(modality),
                    ));
                }
            }
            Ok(ds)
        };
        let valid = load_eval(Split::Valid)?;
        let test  = load_eval(Split::Test)?;

        // ── Step 5: Wrap with the resample transform ─────────────────────────
        let (train, valid, test) = match resample {
            Some((train_rs, eval_rs)) => (
                wrap(train, train_rs)?,
                wrap(valid, eval_rs.clone())?,
                wrap(test, eval_rs)?,
            ),
            None => (
                MultimodalDataset::Full(train),
                MultimodalDataset::Full(valid),
                MultimodalDataset::Full(test),
            ),
        };

        tracing::info!(
            "Prepared {} train, {} valid, {} test samples",
            train.len(),
            valid.len(),
            test.len()
        );

        Ok(DatasetSet {
            train,
            valid,
            test,
            target_names,
            fusion: cfg.fusion,
        })
    }

    /// Ground truth, the three modality stacks, and assembly for
    /// one split. Returns the split and its target names.
    fn load_split(&self, env: &SourceEnv<'_>, split: Split) -> Result<(SplitDataset, Vec<String>)> {
        let cfg = &self.config;

        // ── a. Ground truth ──────────────────────────────────────────────────
        let gt = load_ground_truth(&cfg.data_dir, split, cfg.layout())?;

        // ── b. Modality stacks, in ground-truth order ────────────────────────
        let audio = cfg.audio_source.load(env, split, &gt.samples)?;
        let face  = cfg.face_source.load(env, split, &gt.samples)?;
        let text  = cfg.text_source.load(env, split, &gt.samples)?;

        // ── c. Assemble ──────────────────────────────────────────────────────
        let ds = SplitDataset::assemble(split, cfg.layout(), audio, face, text, gt.labels)?;
        tracing::info!("Assembled {} split: {} samples", split, ds.len());

        Ok((ds, gt.target_names))
    }
}

fn wrap(ds: SplitDataset, resolved: ResolvedResample) -> Result<MultimodalDataset> {
    Ok(MultimodalDataset::Resampled(ResampledDataset::new(ds, resolved)?))
}

/// Shorthand for `PrepareUseCase::new(config).execute()`.
pub fn load_dataset_set(config: PipelineConfig) -> Result<DatasetSet> {
    PrepareUseCase::new(config).execute()
}
