// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn model, optimisation and evaluation code.
//
//   model.rs      — Transformer encoder with a mean-pooled
//                   6-way classification head
//
//   evaluation.rs — Logits preprocessing hook and the metric
//                   computer (accuracy, weighted P/R/F1);
//                   backend-free, works on host arrays
//
//   scheduler.rs  — Linear warmup + linear decay learning rate
//
//   trainer.rs    — AdamW loop with gradient accumulation,
//                   per-epoch validation and best-checkpoint
//                   restoration
//
//   inferencer.rs — Gradient-free scoring of a dataset, used by
//                   validation and the `evaluate` command
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Vaswani et al. (2017) Attention Is All You Need

/// Transformer encoder classifier architecture
pub mod model;

/// Logits hook and evaluation metrics
pub mod evaluation;

/// Learning-rate schedule
pub mod scheduler;

/// Full training loop with validation and checkpointing
pub mod trainer;

/// Inference over a dataset
pub mod inferencer;
