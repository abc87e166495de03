// ============================================================
// Infrastructure — Config Store
// ============================================================
// Saves the pipeline configuration and the model input sizes
// as pretty JSON next to the cached artifacts.
//
// Why save the config?
//   The artifact names only carry the split, modality and source
//   selector. The data roots, resample targets and corpus layout
//   live here, so `stats` and `clear-cache` (and the training
//   side) can reload exactly what `prepare` used.
//
// File layout:
//   cache_dir/
//     pipeline_config.json   ← PipelineConfig
//     model_input_dims.json  ← ModelInputDims
//     *_audio_*.bin, *_face_*.npy, *_text_*.npy

use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::prepare_use_case::PipelineConfig;
use crate::data::dataset::ModelInputDims;
use crate::error::{PipelineError, Result};

const CONFIG_FILE: &str = "pipeline_config.json";
const DIMS_FILE:   &str = "model_input_dims.json";

pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    pub fn save_config(&self, cfg: &PipelineConfig) -> Result<()> {
        write_json(&self.config_path(), cfg)
    }

    pub fn load_config(&self) -> Result<PipelineConfig> {
        read_json(&self.config_path())
    }

    pub fn save_dims(&self, dims: &ModelInputDims) -> Result<()> {
        write_json(&self.dir.join(DIMS_FILE), dims)
    }

    pub fn load_dims(&self) -> Result<ModelInputDims> {
        read_json(&self.dir.join(DIMS_FILE))
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    tracing::debug!("Saved '{}'", path.display());
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.is_file() {
        return Err(PipelineError::MissingInput {
            path: path.to_path_buf(),
        });
    }
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::resampler::ResampleConfig;
    use crate::domain::layout::CorpusLayout;
    use tempfile::TempDir;

    #[test]
    fn test_config_survives_reload() {
        let dir   = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path()).unwrap();

        let mut cfg = PipelineConfig::new(dir.path().join("data"), dir.path().join("emb"));
        cfg.resample      = ResampleConfig::new(Some(10), None, Some(5));
        cfg.random_sample = true;

        store.save_config(&cfg).unwrap();
        assert_eq!(store.load_config().unwrap(), cfg);
    }

    #[test]
    fn test_dims_survive_reload() {
        let dir   = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path()).unwrap();
        let dims  = ModelInputDims {
            orig_d_a:   25,
            orig_d_v:   512,
            orig_d_l:   768,
            a_len:      1526,
            v_len:      459,
            l_len:      60,
            output_dim: 5,
        };

        store.save_dims(&dims).unwrap();
        assert_eq!(store.load_dims().unwrap(), dims);
    }

    #[test]
    fn test_layout_is_not_part_of_saved_config() {
        let dir   = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path()).unwrap();

        let mut cfg = PipelineConfig::new("data", "emb");
        cfg.layout.train_size = 4;
        store.save_config(&cfg).unwrap();

        let json = fs::read_to_string(store.config_path()).unwrap();
        assert!(!json.contains("layout"));
        assert_eq!(*store.load_config().unwrap().layout(), CorpusLayout::impression_v2());
    }

    #[test]
    fn test_layout_in_edited_config_is_ignored() {
        let dir   = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path()).unwrap();
        store.save_config(&PipelineConfig::new("data", "emb")).unwrap();

        let mut json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.config_path()).unwrap()).unwrap();
        json["layout"] = serde_json::json!({
            "train_size": 4,
            "valid_size": 2,
            "test_size":  2,
            "lengths":    { "audio": 6, "face": 5, "text": 4 }
        });
        fs::write(store.config_path(), json.to_string()).unwrap();

        assert_eq!(*store.load_config().unwrap().layout(), CorpusLayout::impression_v2());
    }

    #[test]
    fn test_missing_config() {
        let dir   = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path()).unwrap();
        assert!(matches!(
            store.load_config().unwrap_err(),
            PipelineError::MissingInput { .. }
        ));
    }
}
