// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses the command line with clap and routes each subcommand
// to Layer 2 (application) or straight to the cache.
//
// Three commands are supported:
//   1. `prepare`     — build every split, warm the cache, save
//                      the config and model input sizes
//   2. `stats`       — print mean / std per audio feature
//   3. `clear-cache` — delete cached artifacts of a run

pub mod commands;

use anyhow::{Context, Result};
use burn::data::dataset::Dataset;
use clap::Parser;
use commands::{Commands, PrepareArgs, StoreArgs};

use crate::application::prepare_use_case::{PipelineConfig, PrepareUseCase};
use crate::data::{normalizer::AudioArtifact, sources::FeatureSource};
use crate::domain::split::Split;
use crate::error::PipelineError;
use crate::infra::{cache::ArtifactCache, config_store::ConfigStore};

#[derive(Parser, Debug)]
#[command(
    name = "multimodal-prep",
    version = "0.1.0",
    about = "Align audio, face and text features with labels and cache them for training."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Prepare(args)    => run_prepare(args),
            Commands::Stats(args)      => run_stats(args),
            Commands::ClearCache(args) => run_clear_cache(args),
        }
    }
}

/// Handles the `prepare` subcommand.
fn run_prepare(args: PrepareArgs) -> Result<()> {
    let config = PipelineConfig::try_from(args).context("Invalid pipeline configuration")?;
    tracing::info!("Preparing data from '{}'", config.data_dir.display());

    let set = PrepareUseCase::new(config.clone())
        .execute()
        .context("Failed to prepare the dataset-set")?;

    let store = ConfigStore::new(config.cache_dir())?;
    store.save_config(&config).context("Failed to save pipeline config")?;
    if let Some(dims) = set.model_input_dims() {
        store.save_dims(&dims).context("Failed to save model input dims")?;
        tracing::info!("Model input dims: {:?}", dims);
    }

    for split in Split::ALL {
        println!("{:<6} {} samples", split, set.get(split).len());
    }
    println!("Targets: {}", set.target_names.join(", "));
    Ok(())
}

/// Handles the `stats` subcommand.
fn run_stats(args: StoreArgs) -> Result<()> {
    let (config, cache, store) = open_run(&args)?;

    let key  = config.audio_source.cache_key(Split::Train);
    let path = cache.path_for::<AudioArtifact>(&key);
    let stats = AudioArtifact::read_stats(&path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?
        .with_context(|| format!("'{}' holds no normalization statistics", path.display()))?;

    println!("{:>7} {:>14} {:>14}", "feature", "mean", "std");
    for (i, (mean, std)) in stats.mean.iter().zip(stats.std.iter()).enumerate() {
        println!("{i:>7} {mean:>14.6} {std:>14.6}");
    }
    let flat = stats.zero_variance_features();
    if !flat.is_empty() {
        println!("Zero-variance features: {flat:?}");
    }

    // Older runs may predate the dims file.
    match store.load_dims() {
        Ok(dims) => println!(
            "Model input: audio {}x{}, face {}x{}, text {}x{}, {} targets",
            dims.a_len, dims.orig_d_a, dims.v_len, dims.orig_d_v, dims.l_len, dims.orig_d_l,
            dims.output_dim,
        ),
        Err(PipelineError::MissingInput { .. }) => {}
        Err(e) => return Err(e).context("Failed to read model input dims"),
    }
    Ok(())
}

/// Handles the `clear-cache` subcommand.
fn run_clear_cache(args: StoreArgs) -> Result<()> {
    let (config, cache, _) = open_run(&args)?;

    let removed = config.audio_source.clear_cache(&cache)?
        + config.face_source.clear_cache(&cache)?
        + config.text_source.clear_cache(&cache)?;

    println!("Removed {} cached artifacts from '{}'", removed, cache.dir().display());
    Ok(())
}

/// Reload the config saved by `prepare` and open its cache.
fn open_run(args: &StoreArgs) -> Result<(PipelineConfig, ArtifactCache, ConfigStore)> {
    let store  = ConfigStore::new(&args.cache_dir)?;
    let config = store
        .load_config()
        .with_context(|| format!("No prepared run in '{}'", args.cache_dir.display()))?;
    let cache = ArtifactCache::new(config.cache_dir())?;
    Ok((config, cache, store))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::Fixture;
    use std::path::Path;

    /// Prepare with the default layout is impossible on a small
    /// fixture, so the config is saved the way `prepare` does.
    fn prepared_run(fx: &Fixture) -> StoreArgs {
        let mut config = PipelineConfig::new(fx.data_dir(), fx.embedding_dir());
        config.cache_dir = Some(fx.cache_dir().to_path_buf());
        config.layout    = fx.layout;

        let set   = PrepareUseCase::new(config.clone()).execute().unwrap();
        let store = ConfigStore::new(fx.cache_dir()).unwrap();
        store.save_config(&config).unwrap();
        store.save_dims(&set.model_input_dims().unwrap()).unwrap();

        StoreArgs { cache_dir: fx.cache_dir().to_path_buf() }
    }

    fn artifact_count(dir: &Path) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                let name = entry.file_name();
                let name = name.to_string_lossy();
                name.ends_with(".npy") || name.ends_with(".bin")
            })
            .count()
    }

    #[test]
    fn test_stats_reads_prepared_run() {
        let fx = Fixture::build();
        run_stats(prepared_run(&fx)).unwrap();
    }

    #[test]
    fn test_stats_without_dims_file() {
        let fx   = Fixture::build();
        let args = prepared_run(&fx);
        std::fs::remove_file(fx.cache_dir().join("model_input_dims.json")).unwrap();
        run_stats(args).unwrap();
    }

    #[test]
    fn test_stats_rejects_corrupt_dims_file() {
        let fx   = Fixture::build();
        let args = prepared_run(&fx);
        std::fs::write(fx.cache_dir().join("model_input_dims.json"), "{").unwrap();
        assert!(run_stats(args).is_err());
    }

    #[test]
    fn test_clear_cache_removes_every_artifact() {
        let fx   = Fixture::build();
        let args = prepared_run(&fx);
        assert_eq!(artifact_count(fx.cache_dir()), 9);

        run_clear_cache(args).unwrap();
        assert_eq!(artifact_count(fx.cache_dir()), 0);
        assert!(fx.cache_dir().join("pipeline_config.json").is_file());
    }

    #[test]
    fn test_commands_need_a_prepared_run() {
        let fx = Fixture::build();
        let args = StoreArgs { cache_dir: fx.cache_dir().to_path_buf() };
        assert!(run_stats(args).is_err());
    }
}
