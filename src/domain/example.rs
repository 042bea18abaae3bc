// ============================================================
// Layer 3 — Labeled Example
// ============================================================
// One row of the dataset: a piece of bug-report text and the
// section it belongs to.
//
// `row` is the 0-based data row in the source CSV. Two rows may
// carry identical text, so the row number (not the text) is what
// identifies an example when checking that splits are disjoint.

use serde::{Deserialize, Serialize};

use crate::domain::label::SectionLabel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledExample {
    pub row:   usize,
    pub text:  String,
    pub label: SectionLabel,
}

impl LabeledExample {
    pub fn new(row: usize, text: impl Into<String>, label: SectionLabel) -> Self {
        Self { row, text: text.into(), label }
    }
}

/// The three disjoint partitions of the full example set
#[derive(Debug, Clone, Default)]
pub struct DatasetSplit {
    pub train:      Vec<LabeledExample>,
    pub validation: Vec<LabeledExample>,
    pub test:       Vec<LabeledExample>,
}

impl DatasetSplit {
    pub fn total(&self) -> usize {
        self.train.len() + self.validation.len() + self.test.len()
    }
}
