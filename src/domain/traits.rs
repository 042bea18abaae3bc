// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer loads examples through this trait and
// never sees the file format behind it.
//
// Implementations:
//   - CsvExampleLoader → reads an `element,label` CSV file
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::example::LabeledExample;

// ─── ExampleSource ────────────────────────────────────────────────────────────
/// Any component that can produce the full labelled example set.
pub trait ExampleSource {
    /// Load every example, failing on the first malformed row.
    fn load_all(&self) -> Result<Vec<LabeledExample>>;
}
