// ============================================================
// Infrastructure — Artifact Cache
// ============================================================
// Disk-backed memoization of every expensive pipeline step.
//
// An artifact is addressed by (split, modality, source selector)
// and lives in a single file under the cache directory:
//
//   cache_dir/
//     train_audio_lld.bin        ← normalized audio + mean/std
//     valid_audio_lld.bin        ← normalized audio only
//     test_audio_lld.bin
//     train_face_resnet18.npy    ← padded face stack
//     ...
//     train_text_bert.npy        ← padded text stack
//     ...
//
// `get_or_compute` is the only policy: a present artifact is
// loaded verbatim, an absent one is computed, written, and
// returned. There is no eviction; `remove` exists for manual
// invalidation.
//
// Writes go to a temporary file in the cache directory first
// and are renamed into place, so a crashed run never leaves a
// half-written artifact behind. Two processes populating the
// same key at once is still unguarded: the last rename wins.

use ndarray::Array3;
use ndarray_npy::{ReadNpyExt, WriteNpyExt};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

use crate::domain::{modality::Modality, split::Split};
use crate::error::Result;

// ─── CacheKey ─────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub split:    Split,
    pub modality: Modality,
    pub selector: &'static str,
}

impl CacheKey {
    pub fn new(split: Split, modality: Modality, selector: &'static str) -> Self {
        Self { split, modality, selector }
    }

    /// The same modality and selector, on another split.
    pub fn with_split(self, split: Split) -> Self {
        Self { split, ..self }
    }

    fn file_stem(&self) -> String {
        format!("{}_{}_{}", self.split, self.modality, self.selector)
    }
}

// ─── Artifact ─────────────────────────────────────────────────────────────────
/// A value that can be persisted in the cache.
///
/// Encoding must be deterministic: writing the same value twice
/// has to produce identical bytes.
pub trait Artifact: Sized {
    /// File extension, without the dot.
    const EXTENSION: &'static str;

    fn read_from(path: &Path) -> Result<Self>;

    fn write_to<W: Write>(&self, writer: W) -> Result<()>;
}

/// Face and text stacks are stored as plain `.npy` arrays.
impl Artifact for Array3<f32> {
    const EXTENSION: &'static str = "npy";

    fn read_from(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(Array3::<f32>::read_npy(reader)?)
    }

    fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        self.write_npy(writer)?;
        Ok(())
    }
}

// ─── ArtifactCache ────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct ArtifactCache {
    dir: PathBuf,
}

impl ArtifactCache {
    /// Open (and create if needed) the cache directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of the artifact for `key`.
    pub fn path_for<A: Artifact>(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{}.{}", key.file_stem(), A::EXTENSION))
    }

    pub fn contains<A: Artifact>(&self, key: &CacheKey) -> bool {
        self.path_for::<A>(key).is_file()
    }

    /// Load the artifact for `key` if it has been cached.
    pub fn get<A: Artifact>(&self, key: &CacheKey) -> Result<Option<A>> {
        let path = self.path_for::<A>(key);
        if !path.is_file() {
            return Ok(None);
        }
        tracing::debug!("Reading cached artifact '{}'", path.display());
        A::read_from(&path).map(Some)
    }

    /// Persist `artifact` under `key`, replacing any previous value.
    pub fn put<A: Artifact>(&self, key: &CacheKey, artifact: &A) -> Result<()> {
        let path = self.path_for::<A>(key);

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            artifact.write_to(&mut writer)?;
            writer.flush()?;
        }
        tmp.persist(&path).map_err(|e| e.error)?;

        tracing::debug!("Wrote artifact '{}'", path.display());
        Ok(())
    }

    /// Return the cached artifact for `key`, computing and
    /// persisting it first if it is not cached yet.
    pub fn get_or_compute<A, F>(&self, key: &CacheKey, compute: F) -> Result<A>
    where
        A: Artifact,
        F: FnOnce() -> Result<A>,
    {
        if let Some(cached) = self.get::<A>(key)? {
            tracing::info!("Cache hit: {} {} ({})", key.split, key.modality, key.selector);
            return Ok(cached);
        }

        tracing::info!("Cache miss: {} {} ({}), computing", key.split, key.modality, key.selector);
        let artifact = compute()?;
        self.put(key, &artifact)?;
        Ok(artifact)
    }

    /// Delete the artifact for `key`. Returns whether a file was removed.
    pub fn remove<A: Artifact>(&self, key: &CacheKey) -> Result<bool> {
        let path = self.path_for::<A>(key);
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        tracing::info!("Removed artifact '{}'", path.display());
        Ok(true)
    }
}
