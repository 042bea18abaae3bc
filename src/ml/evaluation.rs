// ============================================================
// Layer 5 — Evaluation Metrics
// ============================================================
// Turns one evaluation pass worth of classifier scores into the
// metrics used for logging and checkpoint selection.
//
//   ModelOutput ──preprocess_logits──► Scores ─┐
//                                              ├─► compute_metrics ─► EvalMetrics
//   labels ────────────────────────────────────┘
//
// Everything here runs on plain host arrays: the trainer copies
// logits off the device once per batch, so these functions need
// no backend and are trivially unit-testable.
//
// Predicted class = argmax over the 6 scores, lowest index on ties.
// precision / recall / f1 are support-weighted averages over the
// classes (classes with no true examples get weight 0); a class
// with a zero denominator contributes 0 for that metric.

use serde::{Deserialize, Serialize};

use crate::domain::error::ValidationError;
use crate::domain::label::NUM_LABELS;

// ─── Model output contract ────────────────────────────────────────────────────
/// What a classifier forward pass returns. Some architectures
/// emit an auxiliary tensor (e.g. pooled hidden states) next to
/// the class scores; only the scores are ever scored.
#[derive(Debug, Clone)]
pub enum ModelOutput<T> {
    ScoresOnly(T),
    ScoresWithAux(T, T),
}

/// Select the class-score array, dropping any auxiliary output.
pub fn preprocess_logits<T>(output: ModelOutput<T>) -> T {
    match output {
        ModelOutput::ScoresOnly(scores)        => scores,
        ModelOutput::ScoresWithAux(scores, _)  => scores,
    }
}

// ─── Scores ───────────────────────────────────────────────────────────────────
/// Row-major `[rows, num_classes]` score matrix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scores {
    values:      Vec<f32>,
    num_classes: usize,
}

impl Scores {
    pub fn new(values: Vec<f32>, num_classes: usize) -> Result<Self, ValidationError> {
        if num_classes == 0 || values.len() % num_classes != 0 {
            return Err(ValidationError::ClassCountMismatch {
                expected: NUM_LABELS,
                actual:   num_classes,
            });
        }
        Ok(Self { values, num_classes })
    }

    /// Append a batch of rows with the same class count.
    pub fn extend(&mut self, other: Scores) -> Result<(), ValidationError> {
        if self.num_classes == 0 {
            *self = other;
            return Ok(());
        }
        if other.num_classes != self.num_classes {
            return Err(ValidationError::ClassCountMismatch {
                expected: self.num_classes,
                actual:   other.num_classes,
            });
        }
        self.values.extend(other.values);
        Ok(())
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn rows(&self) -> usize {
        if self.num_classes == 0 { 0 } else { self.values.len() / self.num_classes }
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.values[i * self.num_classes..(i + 1) * self.num_classes]
    }

    /// Index of the highest score in each row.
    pub fn argmax(&self) -> Vec<usize> {
        (0..self.rows()).map(|i| argmax(self.row(i))).collect()
    }
}

/// First index of the maximum; NaN never beats a real score.
pub fn argmax(row: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in row.iter().enumerate().skip(1) {
        let current = row[best];
        if (current.is_nan() && !v.is_nan()) || v > current {
            best = i;
        }
    }
    best
}

// ─── EvalPrediction / EvalMetrics ─────────────────────────────────────────────
/// Scores and ground truth for one evaluation pass
#[derive(Debug, Clone, Default)]
pub struct EvalPrediction {
    pub scores: Scores,
    pub labels: Vec<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalMetrics {
    /// Fraction of exact argmax matches; drives best-checkpoint selection
    pub accuracy:  f64,
    pub f1:        f64,
    pub precision: f64,
    pub recall:    f64,
}

/// Compute accuracy and weighted precision/recall/F1.
pub fn compute_metrics(pred: &EvalPrediction) -> Result<EvalMetrics, ValidationError> {
    let scores = &pred.scores;

    // An evaluation pass that saw no batches has no class count either
    if pred.labels.is_empty() && scores.rows() == 0 {
        return Err(ValidationError::EmptyEvaluation);
    }
    if scores.num_classes() != NUM_LABELS {
        return Err(ValidationError::ClassCountMismatch {
            expected: NUM_LABELS,
            actual:   scores.num_classes(),
        });
    }
    if scores.rows() != pred.labels.len() {
        return Err(ValidationError::LengthMismatch {
            scores: scores.rows(),
            labels: pred.labels.len(),
        });
    }
    let y_true: Vec<usize> = pred
        .labels
        .iter()
        .enumerate()
        .map(|(position, &label)| {
            usize::try_from(label)
                .ok()
                .filter(|&l| l < NUM_LABELS)
                .ok_or(ValidationError::LabelOutOfRange { position, label })
        })
        .collect::<Result<_, _>>()?;
    let y_pred = scores.argmax();

    // confusion[true][pred]
    let mut confusion = [[0usize; NUM_LABELS]; NUM_LABELS];
    for (&t, &p) in y_true.iter().zip(&y_pred) {
        confusion[t][p] += 1;
    }

    let n = y_true.len() as f64;
    let correct: usize = (0..NUM_LABELS).map(|c| confusion[c][c]).sum();

    let mut precision = 0.0;
    let mut recall    = 0.0;
    let mut f1        = 0.0;

    for c in 0..NUM_LABELS {
        let tp        = confusion[c][c] as f64;
        let support   = confusion[c].iter().sum::<usize>() as f64;
        let predicted = (0..NUM_LABELS).map(|t| confusion[t][c]).sum::<usize>() as f64;

        let p  = ratio(tp, predicted);
        let r  = ratio(tp, support);
        let f  = ratio(2.0 * p * r, p + r);

        precision += p * support;
        recall    += r * support;
        f1        += f * support;
    }

    Ok(EvalMetrics {
        accuracy:  correct as f64 / n,
        f1:        f1 / n,
        precision: precision / n,
        recall:    recall / n,
    })
}

fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 { 0.0 } else { num / den }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn from_rows(rows: &[Vec<f32>]) -> Result<Scores, ValidationError> {
        let num_classes = rows.first().map(Vec::len).unwrap_or(NUM_LABELS);
        Scores::new(rows.concat(), num_classes)
    }

    fn prediction(rows: &[Vec<f32>], labels: &[i64]) -> EvalPrediction {
        EvalPrediction {
            scores: from_rows(rows).unwrap(),
            labels: labels.to_vec(),
        }
    }

    fn one_hot(class: usize) -> Vec<f32> {
        let mut row = vec![0.0; NUM_LABELS];
        row[class] = 1.0;
        row
    }

    #[test]
    fn test_half_correct_scenario() {
        let pred = prediction(
            &[
                vec![0.9, 0.1, 0.0, 0.0, 0.0, 0.0],
                vec![0.0, 0.0, 0.0, 0.0, 0.2, 0.8],
            ],
            &[0, 4],
        );
        let m = compute_metrics(&pred).unwrap();
        assert_eq!(m.accuracy, 0.5);
    }

    #[test]
    fn test_argmax_tie_breaks_low() {
        assert_eq!(argmax(&[0.5, 0.5, 0.0, 0.0, 0.0, 0.0]), 0);
        assert_eq!(argmax(&[0.0, 0.0, 0.3, 0.3, 0.3, 0.0]), 2);
    }

    #[test]
    fn test_argmax_skips_nan() {
        assert_eq!(argmax(&[f32::NAN, 0.1, 0.7, 0.0, 0.0, 0.0]), 2);
    }

    #[test]
    fn test_accuracy_is_exact_fraction() {
        let rows: Vec<Vec<f32>> = [0, 1, 2, 3, 4, 5, 0].iter().map(|&c| one_hot(c)).collect();
        let labels = [0, 1, 2, 3, 4, 0, 1];
        let m = compute_metrics(&prediction(&rows, &labels)).unwrap();

        assert!((m.accuracy - 5.0 / 7.0).abs() < 1e-12);
        for v in [m.accuracy, m.f1, m.precision, m.recall] {
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_perfect_predictions() {
        let rows: Vec<Vec<f32>> = (0..NUM_LABELS).map(one_hot).collect();
        let labels: Vec<i64> = (0..NUM_LABELS as i64).collect();
        let m = compute_metrics(&prediction(&rows, &labels)).unwrap();

        assert_eq!(m, EvalMetrics { accuracy: 1.0, f1: 1.0, precision: 1.0, recall: 1.0 });
    }

    #[test]
    fn test_weighted_metrics() {
        // true: [0, 0, 1], pred: [0, 1, 1]
        // class 0: p=1,   r=0.5, f1=2/3, support 2
        // class 1: p=0.5, r=1,   f1=2/3, support 1
        let rows = vec![one_hot(0), one_hot(1), one_hot(1)];
        let m = compute_metrics(&prediction(&rows, &[0, 0, 1])).unwrap();

        assert!((m.precision - (2.0 * 1.0 + 0.5) / 3.0).abs() < 1e-12);
        assert!((m.recall - (2.0 * 0.5 + 1.0) / 3.0).abs() < 1e-12);
        assert!((m.f1 - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_batch_is_an_error() {
        let pred = EvalPrediction {
            scores: Scores::new(Vec::new(), NUM_LABELS).unwrap(),
            labels: Vec::new(),
        };
        assert_eq!(compute_metrics(&pred), Err(ValidationError::EmptyEvaluation));
        assert_eq!(
            compute_metrics(&EvalPrediction::default()),
            Err(ValidationError::EmptyEvaluation)
        );
    }

    #[test]
    fn test_label_out_of_range() {
        let pred = prediction(&[one_hot(0), one_hot(1)], &[0, 6]);
        assert_eq!(
            compute_metrics(&pred),
            Err(ValidationError::LabelOutOfRange { position: 1, label: 6 })
        );
    }

    #[test]
    fn test_wrong_class_count() {
        let pred = prediction(&[vec![0.1, 0.9]], &[1]);
        assert!(matches!(
            compute_metrics(&pred),
            Err(ValidationError::ClassCountMismatch { expected: 6, actual: 2 })
        ));
    }

    #[test]
    fn test_length_mismatch() {
        let pred = prediction(&[one_hot(0)], &[0, 1]);
        assert!(matches!(compute_metrics(&pred), Err(ValidationError::LengthMismatch { .. })));
    }

    #[test]
    fn test_preprocess_selects_scores() {
        let scores = vec![0.1f32, 0.9];
        let aux    = vec![42.0f32; 8];

        assert_eq!(preprocess_logits(ModelOutput::ScoresWithAux(scores.clone(), aux)), scores);
        assert_eq!(preprocess_logits(ModelOutput::ScoresOnly(scores.clone())), scores);
    }

    #[test]
    fn test_scores_extend() {
        let mut all = Scores::default();
        all.extend(from_rows(&[one_hot(2)]).unwrap()).unwrap();
        all.extend(from_rows(&[one_hot(5)]).unwrap()).unwrap();

        assert_eq!(all.rows(), 2);
        assert_eq!(all.argmax(), vec![2, 5]);
        assert!(all.extend(from_rows(&[vec![1.0]]).unwrap()).is_err());
    }

    #[test]
    fn test_extend_checks_width_before_first_row() {
        let mut all = Scores::new(Vec::new(), NUM_LABELS).unwrap();
        assert_eq!(
            all.extend(from_rows(&[vec![0.1, 0.9]]).unwrap()),
            Err(ValidationError::ClassCountMismatch { expected: 6, actual: 2 })
        );
        assert_eq!(all.rows(), 0);
    }
}
