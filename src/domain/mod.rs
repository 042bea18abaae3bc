// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs, enums and traits that define what the
// system works with: section labels, labelled examples, the
// dataset split and the validation errors raised on bad data.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §6 (Enums), §10 (Traits)

/// The six bug-report section categories and their integer encoding
pub mod label;

/// A labelled text element and the train/validation/test split
pub mod example;

/// Data-integrity errors
pub mod error;

/// Core abstractions (traits) that other layers implement
pub mod traits;
