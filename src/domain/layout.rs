// ============================================================
// Domain — Corpus Layout
// ============================================================
// The fixed shape of the corpus: how many samples each split
// holds and how many time steps every padded sequence has.
// These numbers are invariants of the corpus. Every loader
// asserts against them and a mismatch aborts the load.
//
// `CorpusLayout::impression_v2()` is the production corpus:
//   train 6000 / valid 2000 / test 2000 samples
//   audio 1526 / face 459 / text 60 time steps

use serde::{Deserialize, Serialize};

use crate::domain::{modality::Modality, split::Split};

/// One length per modality. Used both for the fixed padded
/// lengths and for resampling targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalityLengths {
    pub audio: usize,
    pub face:  usize,
    pub text:  usize,
}

impl ModalityLengths {
    pub fn new(audio: usize, face: usize, text: usize) -> Self {
        Self { audio, face, text }
    }

    pub fn get(&self, modality: Modality) -> usize {
        match modality {
            Modality::Audio => self.audio,
            Modality::Face  => self.face,
            Modality::Text  => self.text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusLayout {
    pub train_size: usize,
    pub valid_size: usize,
    pub test_size:  usize,
    pub lengths:    ModalityLengths,
}

impl CorpusLayout {
    pub fn impression_v2() -> Self {
        Self {
            train_size: 6000,
            valid_size: 2000,
            test_size:  2000,
            lengths:    ModalityLengths::new(1526, 459, 60),
        }
    }

    pub fn expected_size(&self, split: Split) -> usize {
        match split {
            Split::Train => self.train_size,
            Split::Valid => self.valid_size,
            Split::Test  => self.test_size,
        }
    }

    pub fn max_len(&self, modality: Modality) -> usize {
        self.lengths.get(modality)
    }
}

impl Default for CorpusLayout {
    fn default() -> Self {
        Self::impression_v2()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_constants() {
        let layout = CorpusLayout::default();
        assert_eq!(layout.expected_size(Split::Train), 6000);
        assert_eq!(layout.expected_size(Split::Valid), 2000);
        assert_eq!(layout.expected_size(Split::Test), 2000);
        assert_eq!(layout.max_len(Modality::Audio), 1526);
        assert_eq!(layout.max_len(Modality::Face), 459);
        assert_eq!(layout.max_len(Modality::Text), 60);
    }
}
