// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores classifier weights with Burn's
// CompactRecorder, plus the small JSON files that tie a run
// together.
//
// File naming convention:
//   <output_dir>/
//     model_epoch_1.mpk.gz   ← weights after epoch 1
//     model_epoch_2.mpk.gz   ← weights after epoch 2
//     ...
//     model_best.mpk.gz      ← weights of the best-accuracy epoch
//     latest_epoch.json      ← number of the last saved epoch
//     best_epoch.json        ← TrainingSummary of the run
//     train_config.json      ← hyperparameters, architecture, split
//
// CompactRecorder writes MessagePack + gzip and refuses to load
// a record into a model of a different architecture, which is
// why train_config.json is saved before training starts.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::TextClassifier;
use crate::ml::trainer::TrainingSummary;

const BEST_MODEL: &str = "model_best";

/// Manages saving and loading of model checkpoints.
/// All files are stored in the configured directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create output directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save model weights for a given epoch and update latest_epoch.json.
    pub fn save_model<B: Backend>(&self, model: &TextClassifier<B>, epoch: usize) -> Result<()> {
        self.record(model, &format!("model_epoch_{epoch}"))?;

        let latest_path = self.dir.join("latest_epoch.json");
        fs::write(&latest_path, serde_json::to_string(&epoch)?)
            .with_context(|| "Failed to write latest_epoch.json")?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    pub fn save_best_model<B: Backend>(&self, model: &TextClassifier<B>) -> Result<()> {
        self.record(model, BEST_MODEL)?;
        tracing::info!("Saved best model to '{}'", self.dir.join(BEST_MODEL).display());
        Ok(())
    }

    /// Load the weights written for `epoch`.
    pub fn load_epoch_model<B: Backend>(
        &self,
        model:  TextClassifier<B>,
        epoch:  usize,
        device: &B::Device,
    ) -> Result<TextClassifier<B>> {
        tracing::info!("Loading checkpoint from epoch {}", epoch);
        load_into(model, self.dir.join(format!("model_epoch_{epoch}")), device)
    }

    pub fn load_best_model<B: Backend>(
        &self,
        model:  TextClassifier<B>,
        device: &B::Device,
    ) -> Result<TextClassifier<B>> {
        load_into(model, self.dir.join(BEST_MODEL), device)
            .context("Have you run 'train' first?")
    }

    /// Load pretrained weights from an arbitrary record path
    /// (with or without the `.mpk.gz` extension).
    pub fn load_weights<B: Backend>(
        &self,
        model:  TextClassifier<B>,
        path:   &str,
        device: &B::Device,
    ) -> Result<TextClassifier<B>> {
        let path = path.strip_suffix(".mpk.gz").unwrap_or(path);
        load_into(model, PathBuf::from(path), device)
    }

    /// Number of the last epoch saved, if any.
    pub fn latest_epoch(&self) -> Result<usize> {
        let path = self.dir.join("latest_epoch.json");
        let s = fs::read_to_string(&path)
            .with_context(|| "Cannot find 'latest_epoch.json'. Have you run 'train' first?")?;
        Ok(serde_json::from_str::<usize>(&s)?)
    }

    /// Persist the hyperparameters so `evaluate` can rebuild the model and split.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' before 'evaluate'.",
                    path.display()
                )
            })?;

        Ok(serde_json::from_str(&json)?)
    }

    pub fn save_summary(&self, summary: &TrainingSummary) -> Result<()> {
        let path = self.dir.join("best_epoch.json");
        fs::write(&path, serde_json::to_string_pretty(summary)?)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        Ok(())
    }

    pub fn load_summary(&self) -> Result<TrainingSummary> {
        let path = self.dir.join("best_epoch.json");
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }

    fn record<B: Backend>(&self, model: &TextClassifier<B>, name: &str) -> Result<()> {
        // The recorder appends the extension itself
        let path = self.dir.join(name);
        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))
    }
}

fn load_into<B: Backend>(
    model:  TextClassifier<B>,
    path:   PathBuf,
    device: &B::Device,
) -> Result<TextClassifier<B>> {
    let record = CompactRecorder::new()
        .load(path.clone(), device)
        .with_context(|| format!("Cannot load checkpoint '{}'", path.display()))?;
    Ok(model.load_record(record))
}
