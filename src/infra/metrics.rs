// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records per-epoch training metrics to a CSV file.
//
// Output file: <output_dir>/metrics.csv
//
//   epoch,train_loss,val_loss,accuracy,f1,precision,recall
//   1,1.712300,1.650100,0.412000,0.351200,0.390100,0.412000
//   2,1.402100,1.398700,0.498000,0.460300,0.471900,0.498000
//   ...
//
// The file is appended to, so repeated runs into the same output
// directory keep their history.
//
// Reference: csv crate documentation (Writer, WriterBuilder)

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

use crate::ml::evaluation::EvalMetrics;

const HEADER: [&str; 7] = ["epoch", "train_loss", "val_loss", "accuracy", "f1", "precision", "recall"];

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Average cross-entropy loss over all training micro-batches
    pub train_loss: f64,

    /// Average cross-entropy loss on the validation set
    pub val_loss: f64,

    /// Validation metrics for this epoch
    pub eval: EvalMetrics,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, val_loss: f64, eval: EvalMetrics) -> Self {
        Self { epoch, train_loss, val_loss, eval }
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger.
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");

        if !csv_path.exists() {
            let mut writer = csv::Writer::from_path(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writer.write_record(HEADER)?;
            writer.flush()?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

        let values = [m.train_loss, m.val_loss, m.eval.accuracy, m.eval.f1, m.eval.precision, m.eval.recall];
        let mut record = vec![m.epoch.to_string()];
        record.extend(values.iter().map(|v| format!("{v:.6}")));

        writer.write_record(&record)?;
        writer.flush()?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_loss={:.4}, accuracy={:.4}",
            m.epoch,
            m.train_loss,
            m.val_loss,
            m.eval.accuracy,
        );

        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(accuracy: f64) -> EvalMetrics {
        EvalMetrics { accuracy, f1: 0.5, precision: 0.25, recall: accuracy }
    }

    #[test]
    fn test_writes_header_and_rows() {
        let dir    = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();

        logger.log(&EpochMetrics::new(1, 1.5, 1.25, metrics(0.5))).unwrap();

        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], HEADER.join(","));
        assert_eq!(lines[1], "1,1.500000,1.250000,0.500000,0.500000,0.250000,0.500000");
    }

    #[test]
    fn test_appends_across_loggers() {
        let dir = tempfile::tempdir().unwrap();

        MetricsLogger::new(dir.path()).unwrap()
            .log(&EpochMetrics::new(1, 1.0, 1.0, metrics(0.1))).unwrap();
        MetricsLogger::new(dir.path()).unwrap()
            .log(&EpochMetrics::new(2, 0.9, 0.9, metrics(0.2))).unwrap();

        let csv = fs::read_to_string(dir.path().join("metrics.csv")).unwrap();
        // One header, two rows
        assert_eq!(csv.lines().count(), 3);
    }
}
