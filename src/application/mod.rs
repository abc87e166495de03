// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to produce the dataset-set.
//
// Rules for this layer:
//   - No feature math here (that's Layer 4 - data)
//   - No printing here (that's Layer 1 - cli)
//   - Only workflow coordination

// Ground truth → cached modality stacks → datasets
pub mod prepare_use_case;
