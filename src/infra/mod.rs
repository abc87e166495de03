// ============================================================
// Infrastructure Layer
// ============================================================
// Persistence that the data and application layers share:
//
//   cache.rs         — the artifact cache. Every expensive
//                      stack is written here once and read back
//                      verbatim on later runs.
//
//   config_store.rs  — the pipeline configuration and the
//                      derived model input sizes, stored as
//                      JSON next to the artifacts so later
//                      commands reuse exactly what was prepared.

/// Keyed on-disk artifact memoization
pub mod cache;

/// Pipeline config and model dims as JSON
pub mod config_store;
