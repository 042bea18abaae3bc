// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence used by the application and ML layers:
//
//   checkpoint.rs      — Model weights via Burn's CompactRecorder,
//                        plus train_config.json / best_epoch.json
//
//   tokenizer_store.rs — Resolves the tokenizer (file or hub id)
//                        and keeps a copy with the checkpoints
//
//   metrics.rs         — Per-epoch metrics appended to metrics.csv
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Tokenizer resolution, saving, and loading
pub mod tokenizer_store;

/// Training metrics CSV logger
pub mod metrics;
