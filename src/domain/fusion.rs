// ============================================================
// Domain — Fusion Targets
// ============================================================
// A cross-modal model can fuse into every modality or into a
// single one. The pipeline only validates the choice and hands
// it to the training side with the dataset-set.
//
//   flags set │ result
//   ──────────┼────────────────────────────
//   none      │ fuse into audio, face, text
//   one       │ fuse into that modality only
//   two+      │ ConflictingFusionTargets

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FusionTargets {
    pub audio: bool,
    pub face:  bool,
    pub text:  bool,
}

impl FusionTargets {
    pub fn all() -> Self {
        Self { audio: true, face: true, text: true }
    }

    /// Resolve the three "only" flags into the fusion targets.
    pub fn resolve(audio_only: bool, face_only: bool, text_only: bool) -> Result<Self> {
        let set = [audio_only, face_only, text_only]
            .iter()
            .filter(|&&flag| flag)
            .count();

        match set {
            0 => Ok(Self::all()),
            1 => Ok(Self {
                audio: audio_only,
                face:  face_only,
                text:  text_only,
            }),
            _ => Err(PipelineError::ConflictingFusionTargets),
        }
    }
}

impl Default for FusionTargets {
    fn default() -> Self {
        Self::all()
    }
}
