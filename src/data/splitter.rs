// ============================================================
// Layer 4 — Train/Validation/Test Splitter
// ============================================================
// Shuffles the examples with a seeded RNG and cuts them into
// three disjoint partitions:
//   - Training set:   used to update model weights
//   - Validation set: scored every epoch to pick the best checkpoint
//   - Test set:       held out for the `evaluate` command
//
// The RNG is seeded so the same seed always yields the same
// split. `evaluate` relies on this to rebuild the exact test set
// that training never saw.
//
// Default split: 80% training, 10% validation, 10% test
//
// Reference: Rust Book §8 (Vectors)
//            rand crate documentation (SeedableRng, SliceRandom)

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::domain::error::ValidationError;
use crate::domain::example::{DatasetSplit, LabeledExample};

/// Fractions of the dataset assigned to training and validation.
/// The test set receives whatever remains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitRatios {
    pub train:      f64,
    pub validation: f64,
}

impl SplitRatios {
    pub fn new(train: f64, validation: f64) -> Result<Self, ValidationError> {
        let in_unit = |x: f64| (0.0..=1.0).contains(&x);
        if !in_unit(train) || !in_unit(validation) {
            return Err(ValidationError::InvalidSplit(format!(
                "fractions must lie in [0, 1], got train={train}, validation={validation}"
            )));
        }
        // Small tolerance so that e.g. 0.7 + 0.3 is not rejected
        if train + validation > 1.0 + 1e-9 {
            return Err(ValidationError::InvalidSplit(format!(
                "train + validation = {} exceeds 1",
                train + validation
            )));
        }
        Ok(Self { train, validation })
    }
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self { train: 0.8, validation: 0.1 }
    }
}

/// Shuffle `examples` with `seed` and split into train/validation/test.
pub fn split_dataset(
    mut examples: Vec<LabeledExample>,
    ratios:       SplitRatios,
    seed:         u64,
) -> DatasetSplit {
    let mut rng = StdRng::seed_from_u64(seed);

    // Fisher-Yates shuffle, deterministic for a given seed
    examples.shuffle(&mut rng);

    let total = examples.len();

    // Clamp both cut points so tiny datasets never panic
    let train_end = ((total as f64) * ratios.train).round() as usize;
    let train_end = train_end.min(total);
    let val_end   = train_end + ((total as f64) * ratios.validation).round() as usize;
    let val_end   = val_end.min(total);

    // split_off(n) keeps [0..n) and returns [n..)
    let test       = examples.split_off(val_end);
    let validation = examples.split_off(train_end);
    let train      = examples;

    tracing::debug!(
        "Dataset split (seed {}): {} train, {} validation, {} test",
        seed,
        train.len(),
        validation.len(),
        test.len(),
    );

    DatasetSplit { train, validation, test }
}
