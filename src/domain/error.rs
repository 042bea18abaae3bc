// ============================================================
// Layer 3 — Validation Errors
// ============================================================
// Data-integrity violations that must stop the run instead of
// being silently coerced. Everything above this layer wraps
// these in anyhow::Error, so `?` works the same everywhere.
//
// Reference: Rust Book §9 (Error Handling)
//            thiserror crate documentation

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A label name that is not one of the six section categories
    #[error("unknown section label '{0}'")]
    UnknownLabel(String),

    /// An integer label outside 0..NUM_LABELS
    #[error("label index {0} is outside the valid range 0..=5")]
    LabelIndexOutOfRange(i64),

    #[error("expected {expected} scores per example, got {actual}")]
    ClassCountMismatch { expected: usize, actual: usize },

    #[error("{scores} score rows but {labels} labels")]
    LengthMismatch { scores: usize, labels: usize },

    /// Accuracy over zero examples is undefined
    #[error("cannot evaluate an empty batch")]
    EmptyEvaluation,

    #[error("label {label} at position {position} is outside 0..=5")]
    LabelOutOfRange { position: usize, label: i64 },

    #[error("invalid split ratios: {0}")]
    InvalidSplit(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
