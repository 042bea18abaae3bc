// ============================================================
// Layer 3 — Section Label
// ============================================================
// The closed set of bug-report section categories.
//
// The integer mapping is fixed: the classifier's output layer
// has one logit per category in exactly this order, and the
// metric computer compares argmax indices against it.
//
//   describe    → 0
//   expected    → 1
//   reproduce   → 2
//   actual      → 3
//   environment → 4
//   additional  → 5
//
// Reference: Rust Book §6 (Enums), §10 (Traits: FromStr/Display)

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::error::ValidationError;

/// Number of output classes of the classifier
pub const NUM_LABELS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionLabel {
    Describe,
    Expected,
    Reproduce,
    Actual,
    Environment,
    Additional,
}

impl SectionLabel {
    /// All labels in index order
    pub const ALL: [SectionLabel; NUM_LABELS] = [
        SectionLabel::Describe,
        SectionLabel::Expected,
        SectionLabel::Reproduce,
        SectionLabel::Actual,
        SectionLabel::Environment,
        SectionLabel::Additional,
    ];

    /// The stable integer used as the training target
    pub fn index(self) -> usize {
        match self {
            SectionLabel::Describe    => 0,
            SectionLabel::Expected    => 1,
            SectionLabel::Reproduce   => 2,
            SectionLabel::Actual      => 3,
            SectionLabel::Environment => 4,
            SectionLabel::Additional  => 5,
        }
    }

    /// Decode an integer class index back into a label
    pub fn from_index(index: i64) -> Result<Self, ValidationError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(ValidationError::LabelIndexOutOfRange(index))
    }

    /// The category name as it appears in the dataset CSV
    pub fn name(self) -> &'static str {
        match self {
            SectionLabel::Describe    => "describe",
            SectionLabel::Expected    => "expected",
            SectionLabel::Reproduce   => "reproduce",
            SectionLabel::Actual      => "actual",
            SectionLabel::Environment => "environment",
            SectionLabel::Additional  => "additional",
        }
    }
}

impl fmt::Display for SectionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts the category name (any case) or its integer form.
/// Some exports of the dataset store the already-encoded label.
impl FromStr for SectionLabel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if let Ok(index) = trimmed.parse::<i64>() {
            return Self::from_index(index);
        }

        let lowered = trimmed.to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|label| label.name() == lowered)
            .ok_or_else(|| ValidationError::UnknownLabel(trimmed.to_string()))
    }
}
