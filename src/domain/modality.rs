// ============================================================
// Domain — Modalities and Feature Sources
// ============================================================
// Each sample carries three independent feature channels.
// Every channel can in principle come from several upstream
// extractors, so each modality has a closed set of source
// selectors. Parsing an unknown selector string is a
// configuration error raised at startup.
//
//   Modality │ Selector  │ Upstream extractor output
//   ─────────┼───────────┼──────────────────────────────────
//   audio    │ lld       │ eGeMAPS low-level descriptors (CSV)
//   face     │ resnet18  │ ResNet-18 frame embeddings (NPY)
//   text     │ bert      │ BERT token embeddings (NPY)

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Audio,
    Face,
    Text,
}

impl Modality {
    pub const ALL: [Modality; 3] = [Modality::Audio, Modality::Face, Modality::Text];

    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Audio => "audio",
            Modality::Face  => "face",
            Modality::Text  => "text",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Source selectors ─────────────────────────────────────────────────────────

/// Audio feature extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioSource {
    #[default]
    Lld,
}

/// Face feature extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceSource {
    #[default]
    Resnet18,
}

/// Text feature extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSource {
    #[default]
    Bert,
}

impl AudioSource {
    pub fn name(&self) -> &'static str {
        match self {
            AudioSource::Lld => "lld",
        }
    }
}

impl FaceSource {
    pub fn name(&self) -> &'static str {
        match self {
            FaceSource::Resnet18 => "resnet18",
        }
    }
}

impl TextSource {
    pub fn name(&self) -> &'static str {
        match self {
            TextSource::Bert => "bert",
        }
    }
}

fn unsupported(modality: Modality, selector: &str) -> PipelineError {
    PipelineError::UnsupportedSource {
        modality,
        selector: selector.to_string(),
    }
}

impl FromStr for AudioSource {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lld" => Ok(AudioSource::Lld),
            other => Err(unsupported(Modality::Audio, other)),
        }
    }
}

impl FromStr for FaceSource {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resnet18" => Ok(FaceSource::Resnet18),
            other => Err(unsupported(Modality::Face, other)),
        }
    }
}

impl FromStr for TextSource {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bert" => Ok(TextSource::Bert),
            other => Err(unsupported(Modality::Text, other)),
        }
    }
}
