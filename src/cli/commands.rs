// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands and their flags:
//   prepare      build (and cache) every split
//   stats        show the train audio normalization statistics
//   clear-cache  delete the cached artifacts of a prepared run
//
// Selectors are taken as plain strings and parsed when the args
// are turned into a PipelineConfig, so an unknown selector
// surfaces as UnsupportedSource, not as a clap usage error.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::prepare_use_case::PipelineConfig;
use crate::data::resampler::ResampleConfig;
use crate::domain::{fusion::FusionTargets, layout::CorpusLayout};
use crate::error::PipelineError;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load, align and cache train, valid and test
    Prepare(PrepareArgs),

    /// Print the audio normalization statistics of a prepared run
    Stats(StoreArgs),

    /// Delete the cached artifacts of a prepared run
    ClearCache(StoreArgs),
}

/// All arguments for the `prepare` command.
#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Root holding the label stores and per-sample feature folders
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Root holding text/{split}/{sample}_bertemd.npy
    #[arg(long, default_value = "embeddings")]
    pub embedding_dir: PathBuf,

    /// Where cached artifacts go (defaults to --data-dir)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Audio feature source
    #[arg(long, default_value = "lld")]
    pub audio_emb: String,

    /// Face feature source
    #[arg(long, default_value = "resnet18")]
    pub face_emb: String,

    /// Text feature source
    #[arg(long, default_value = "bert")]
    pub text_emb: String,

    /// Resample audio to this many steps
    #[arg(long)]
    pub a_sample: Option<usize>,

    /// Resample face to this many steps
    #[arg(long)]
    pub v_sample: Option<usize>,

    /// Resample text to this many steps
    #[arg(long)]
    pub l_sample: Option<usize>,

    /// Draw random (sorted) steps on every train access
    #[arg(long)]
    pub random_sample: bool,

    /// Fuse into audio only
    #[arg(long)]
    pub aonly: bool,

    /// Fuse into face only
    #[arg(long)]
    pub vonly: bool,

    /// Fuse into text only
    #[arg(long)]
    pub lonly: bool,
}

/// Boundary between Layer 1 and Layer 2: the application layer
/// never sees clap types or raw selector strings.
impl TryFrom<PrepareArgs> for PipelineConfig {
    type Error = PipelineError;

    fn try_from(a: PrepareArgs) -> Result<Self, Self::Error> {
        Ok(PipelineConfig {
            data_dir:      a.data_dir,
            embedding_dir: a.embedding_dir,
            cache_dir:     a.cache_dir,
            audio_source:  a.audio_emb.parse()?,
            face_source:   a.face_emb.parse()?,
            text_source:   a.text_emb.parse()?,
            resample:      ResampleConfig::new(a.a_sample, a.v_sample, a.l_sample),
            random_sample: a.random_sample,
            fusion:        FusionTargets::resolve(a.aonly, a.vonly, a.lonly)?,
            layout:        CorpusLayout::impression_v2(),
        })
    }
}

/// Arguments for the commands that work on a prepared run.
#[derive(Args, Debug)]
pub struct StoreArgs {
    /// Cache directory of the run (holds pipeline_config.json)
    #[arg(long, default_value = "data")]
    pub cache_dir: PathBuf,
}
