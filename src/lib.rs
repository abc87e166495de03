// ============================================================
// multimodal_prep
// ============================================================
// Turns per-video audio, face and text feature files plus a
// label store into aligned, padded, cached datasets for a
// cross-modal model.
//
// Layers, outermost first:
//   cli          — clap commands (binary only)
//   application  — PrepareUseCase, PipelineConfig
//   data         — loaders, normalizer, datasets, resampler
//   infra        — artifact cache, config store
//   domain       — splits, modalities, layout, fusion flags

pub mod application;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod infra;

pub use application::prepare_use_case::{load_dataset_set, DatasetSet, PipelineConfig, PrepareUseCase};
pub use data::{
    batcher::{MultimodalBatch, MultimodalBatcher},
    dataset::{ModelInputDims, MultimodalDataset, MultimodalSample},
};
pub use error::{PipelineError, Result};
