// ============================================================
// Domain Layer
// ============================================================
// Plain Rust types that name the concepts of the pipeline:
// splits, modalities, source selectors, the fixed corpus
// layout and the fusion targets.
//
// Rules for this layer:
//   - NO burn or ndarray types
//   - NO file I/O
//   - Only enums, small structs and their validation
//
// Everything above this layer (data, infra, application)
// speaks in these types.

/// Train / valid / test
pub mod split;

/// Audio / face / text and their source selectors
pub mod modality;

/// Fixed split sizes and padded sequence lengths
pub mod layout;

/// Cross-modal fusion target flags
pub mod fusion;
