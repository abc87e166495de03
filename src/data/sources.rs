// ============================================================
// Feature Sources
// ============================================================
// One loader per (modality, selector). Every loader turns an
// ordered list of sample keys into a padded (N, L_max, D) stack
// and goes through the artifact cache, so only the first run
// ever touches the raw per-video files.
//
// Raw file locations, for sample key K of split S:
//
//   audio  lld       data_dir/S/K/egemaps/lld.csv
//   face   resnet18  data_dir/S/K/fi_face_resnet18/features.npy
//   text   bert      embedding_dir/text/S/K_bertemd.npy
//
// Audio is additionally normalized (see normalizer.rs) and the
// cached audio artifact holds the normalized stack.

use ndarray::{Array2, Array3};
use std::path::{Path, PathBuf};

use crate::data::{
    features::{read_lld_csv, read_npy_sequence, PaddedStack},
    normalizer::{normalize_train, normalize_with_train_stats, AudioArtifact},
};
use crate::domain::{
    layout::CorpusLayout,
    modality::{AudioSource, FaceSource, Modality, TextSource},
    split::Split,
};
use crate::error::Result;
use crate::infra::cache::{Artifact, ArtifactCache, CacheKey};

/// Where the raw files live, the fixed layout to check them
/// against, and the cache to memoize into.
pub struct SourceEnv<'a> {
    pub data_dir:      &'a Path,
    pub embedding_dir: &'a Path,
    pub layout:        &'a CorpusLayout,
    pub cache:         &'a ArtifactCache,
}

impl SourceEnv<'_> {
    fn sample_dir(&self, split: Split, sample: &str) -> PathBuf {
        self.data_dir.join(split.as_str()).join(sample)
    }

    /// Read every sample with `read` and pad them into one stack.
    fn stack<A, F>(&self, modality: Modality, samples: &[String], read: F) -> Result<Array3<A>>
    where
        A: Clone + Default,
        F: Fn(&str) -> Result<Array2<A>>,
    {
        let mut stack = PaddedStack::new(modality, samples.len(), self.layout.max_len(modality));
        for sample in samples {
            let seq = read(sample)?;
            tracing::debug!("{} '{}': {} steps", modality, sample, seq.nrows());
            stack.push(sample, &seq)?;
        }
        stack.finish()
    }
}

// ─── FeatureSource ────────────────────────────────────────────────────────────
/// A selectable upstream extractor for one modality.
pub trait FeatureSource {
    fn modality(&self) -> Modality;

    fn selector(&self) -> &'static str;

    /// Padded (N, L_max, D) stack for `samples`, in order.
    fn load(&self, env: &SourceEnv<'_>, split: Split, samples: &[String]) -> Result<Array3<f32>>;

    fn cache_key(&self, split: Split) -> CacheKey {
        CacheKey::new(split, self.modality(), self.selector())
    }

    /// Remove every cached artifact of this source. Returns the
    /// number of files deleted.
    fn clear_cache(&self, cache: &ArtifactCache) -> Result<usize>;
}

// ─── Audio ────────────────────────────────────────────────────────────────────
impl FeatureSource for AudioSource {
    fn modality(&self) -> Modality {
        Modality::Audio
    }

    fn selector(&self) -> &'static str {
        self.name()
    }

    fn load(&self, env: &SourceEnv<'_>, split: Split, samples: &[String]) -> Result<Array3<f32>> {
        let key = self.cache_key(split);

        let artifact = env.cache.get_or_compute::<AudioArtifact, _>(&key, || {
            let raw = match self {
                AudioSource::Lld => env.stack(Modality::Audio, samples, |sample| {
                    read_lld_csv(&env.sample_dir(split, sample).join("egemaps").join("lld.csv"))
                })?,
            };

            if split.is_train() {
                normalize_train(&raw)
            } else {
                let train = env
                    .cache
                    .path_for::<AudioArtifact>(&key.with_split(Split::Train));
                normalize_with_train_stats(&raw, &train)
            }
        })?;

        Ok(artifact.normalized)
    }

    fn clear_cache(&self, cache: &ArtifactCache) -> Result<usize> {
        clear_all::<AudioArtifact>(self, cache)
    }
}

// ─── Face ─────────────────────────────────────────────────────────────────────
impl FeatureSource for FaceSource {
    fn modality(&self) -> Modality {
        Modality::Face
    }

    fn selector(&self) -> &'static str {
        self.name()
    }

    fn load(&self, env: &SourceEnv<'_>, split: Split, samples: &[String]) -> Result<Array3<f32>> {
        env.cache.get_or_compute(&self.cache_key(split), || match self {
            FaceSource::Resnet18 => env.stack(Modality::Face, samples, |sample| {
                read_npy_sequence(
                    &env.sample_dir(split, sample)
                        .join("fi_face_resnet18")
                        .join("features.npy"),
                )
            }),
        })
    }

    fn clear_cache(&self, cache: &ArtifactCache) -> Result<usize> {
        clear_all::<Array3<f32>>(self, cache)
    }
}

// ─── Text ─────────────────────────────────────────────────────────────────────
impl FeatureSource for TextSource {
    fn modality(&self) -> Modality {
        Modality::Text
    }

    fn selector(&self) -> &'static str {
        self.name()
    }

    fn load(&self, env: &SourceEnv<'_>, split: Split, samples: &[String]) -> Result<Array3<f32>> {
        env.cache.get_or_compute(&self.cache_key(split), || match self {
            TextSource::Bert => {
                let dir = env.embedding_dir.join("text").join(split.as_str());
                env.stack(Modality::Text, samples, |sample| {
                    read_npy_sequence(&dir.join(format!("{sample}_bertemd.npy")))
                })
            }
        })
    }

    fn clear_cache(&self, cache: &ArtifactCache) -> Result<usize> {
        clear_all::<Array3<f32>>(self, cache)
    }
}

fn clear_all<A: Artifact>(
    source: &impl FeatureSource,
    cache:  &ArtifactCache,
) -> Result<usize> {
    let mut removed = 0;
    for split in Split::ALL {
        if cache.remove::<A>(&source.cache_key(split))? {
            removed += 1;
        }
    }
    Ok(removed)
}
