// ============================================================
// Data Pipeline
// ============================================================
// Everything from raw per-video feature files to aligned,
// indexable samples.
//
// The pipeline flows in this order, once per split:
//
//   label store (JSON)
//       │
//       ▼
//   ground_truth  → sorted sample keys + label matrix
//       │
//       ▼
//   sources       → one padded (N, L, D) stack per modality,
//       │           memoized in the artifact cache
//       │           (audio goes through normalizer first)
//       ▼
//   dataset       → SplitDataset, burn's Dataset trait
//       │
//       ▼
//   resampler     → optional per-access time subsampling
//       │
//       ▼
//   batcher       → device tensors for the DataLoader
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Label store parsing and sample ordering
pub mod ground_truth;

/// Raw CSV/NPY readers and zero padding
pub mod features;

/// Train-fitted z-score normalization for audio
pub mod normalizer;

/// Selectable per-modality loaders behind the cache
pub mod sources;

/// Split assembly and the Dataset implementations
pub mod dataset;

/// Uniform and random temporal resampling
pub mod resampler;

/// Burn Batcher for multimodal samples
pub mod batcher;

#[cfg(test)]
pub(crate) mod fixtures;
