// ============================================================
// Ground-Truth Loader
// ============================================================
// Reads the label store of one split and turns it into an
// ordered (samples × targets) label matrix.
//
// Store format (JSON, key order is significant):
//
//   {
//     "extraversion": { "abc.001.mp4": 0.52, "xyz.004.mp4": 0.61, ... },
//     "neuroticism":  { ... },
//     ...
//     "interview":    { ... },   ← second to last, not a target
//     "openness":     { ... }
//   }
//
// Steps:
//   1. drop the label at position −2 of the label order
//   2. take the sample filenames of the first remaining label
//   3. sample key = filename stem ("abc.001.mp4" → "abc.001")
//   4. sort samples by key
//   5. check the count against the split's fixed size

use ndarray::Array2;
use serde_json::{Map, Value};
use std::{fs, path::Path};

use crate::domain::{layout::CorpusLayout, split::Split};
use crate::error::{PipelineError, Result};

/// Position, from the end, of the non-target label column.
const NON_TARGET_FROM_END: usize = 2;

#[derive(Debug, Clone)]
pub struct GroundTruth {
    /// Sample keys, sorted.
    pub samples:      Vec<String>,
    /// One row per sample, one column per target.
    pub labels:       Array2<f32>,
    pub target_names: Vec<String>,
}

impl GroundTruth {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Load the labels of `split` from `data_dir` and check the
/// sample count against `layout`.
pub fn load_ground_truth(data_dir: &Path, split: Split, layout: &CorpusLayout) -> Result<GroundTruth> {
    let path = data_dir.join(split.label_store_name());
    if !path.is_file() {
        return Err(PipelineError::MissingInput { path });
    }

    let text = fs::read_to_string(&path)?;
    let gt   = parse_label_store(&path, &text)?;

    let expected = layout.expected_size(split);
    if gt.len() != expected {
        return Err(PipelineError::SampleCountMismatch {
            split,
            expected,
            actual: gt.len(),
        });
    }

    tracing::info!(
        "Loaded {} {} labels over {} targets",
        gt.len(),
        split,
        gt.target_names.len()
    );
    Ok(gt)
}

/// Parse a label store. `path` is only used in error messages.
pub fn parse_label_store(path: &Path, text: &str) -> Result<GroundTruth> {
    let store: Map<String, Value> = serde_json::from_str(text)
        .map_err(|e| PipelineError::malformed(path, e.to_string()))?;

    if store.len() < NON_TARGET_FROM_END {
        return Err(PipelineError::malformed(
            path,
            format!("expected at least {NON_TARGET_FROM_END} label columns, found {}", store.len()),
        ));
    }

    // ── Target columns, in store order, minus the non-target ────────────────
    let skip = store.len() - NON_TARGET_FROM_END;
    let mut columns: Vec<(&String, &Map<String, Value>)> = Vec::with_capacity(store.len() - 1);
    for (i, (name, values)) in store.iter().enumerate() {
        if i == skip {
            tracing::debug!("Dropping non-target label '{}'", name);
            continue;
        }
        let values = values.as_object().ok_or_else(|| {
            PipelineError::malformed(path, format!("label '{name}' is not a mapping"))
        })?;
        columns.push((name, values));
    }
    let target_names: Vec<String> = columns.iter().map(|(name, _)| (*name).clone()).collect();

    // ── Samples: stems of the first target's filenames, sorted ──────────────
    let mut samples: Vec<(String, &String)> = columns[0]
        .1
        .keys()
        .map(|file| file_stem(path, file).map(|stem| (stem, file)))
        .collect::<Result<_>>()?;
    samples.sort_by(|a, b| a.0.cmp(&b.0));

    if let Some(pair) = samples.windows(2).find(|w| w[0].0 == w[1].0) {
        return Err(PipelineError::malformed(
            path,
            format!("duplicate sample key '{}'", pair[0].0),
        ));
    }

    // ── Label matrix ─────────────────────────────────────────────────────────
    let mut labels = Array2::<f32>::zeros((samples.len(), columns.len()));
    for (row, (_, file)) in samples.iter().enumerate() {
        for (col, (name, values)) in columns.iter().enumerate() {
            let value = values.get(file.as_str()).ok_or_else(|| PipelineError::MissingLabel {
                label:  (*name).clone(),
                sample: (*file).clone(),
            })?;
            let value = value.as_f64().ok_or_else(|| {
                PipelineError::malformed(path, format!("label '{name}' of '{file}' is not a number"))
            })?;
            labels[[row, col]] = value as f32;
        }
    }

    Ok(GroundTruth {
        samples: samples.into_iter().map(|(key, _)| key).collect(),
        labels,
        target_names,
    })
}

fn file_stem(path: &Path, file: &str) -> Result<String> {
    Path::new(file)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| PipelineError::malformed(path, format!("'{file}' has no file stem")))
}
