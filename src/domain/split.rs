// ============================================================
// Domain — Split
// ============================================================
// The corpus is partitioned into three fixed splits.
// Train is special: it is the only split allowed to produce
// normalization statistics. Validation and test always reuse
// the statistics cached by a previous train run.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Valid,
    Test,
}

impl Split {
    /// All splits in load order. Train comes first so its
    /// statistics exist before validation/test need them.
    pub const ALL: [Split; 3] = [Split::Train, Split::Valid, Split::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Valid => "valid",
            Split::Test  => "test",
        }
    }

    /// File name of the split-wide label store.
    pub fn label_store_name(&self) -> &'static str {
        match self {
            Split::Train => "annotation_training.json",
            Split::Valid => "annotation_validation.json",
            Split::Test  => "annotation_test.json",
        }
    }

    pub fn is_train(&self) -> bool {
        matches!(self, Split::Train)
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
