// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Validate the configuration
//   Step 2: Load the labelled CSV          (Layer 4 - data)
//   Step 3: Split train/validation/test    (Layer 4 - data)
//   Step 4: Resolve the tokenizer          (Layer 6 - infra)
//   Step 5: Encode train and validation    (Layer 4 - data)
//   Step 6: Save config                    (Layer 6 - infra)
//   Step 7: Run training loop              (Layer 5 - ml)
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::ClassificationDataset,
    encoder::encode_examples,
    loader::CsvExampleLoader,
    splitter::{split_dataset, SplitRatios},
};
use crate::domain::error::ValidationError;
use crate::domain::label::NUM_LABELS;
use crate::domain::traits::ExampleSource;
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::MetricsLogger,
    tokenizer_store::TokenizerStore,
};
use crate::ml::model::TextClassifierConfig;
use crate::ml::trainer::{run_training, TrainingSummary};

// ─── Training Configuration ──────────────────────────────────────────────────
// Everything a run needs. Saved as train_config.json so `evaluate`
// can rebuild the same architecture and the same split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_path:        String,
    pub output_dir:       String,
    /// tokenizer.json path or pretrained hub identifier
    pub tokenizer:        String,
    /// Optional burn record to start from instead of random weights
    pub init_weights:     Option<String>,
    pub max_seq_len:      usize,
    pub learning_rate:    f64,
    pub epochs:           usize,
    pub warmup_steps:     usize,
    pub train_batch_size: usize,
    pub eval_batch_size:  usize,
    pub seed:             u64,
    pub split_seed:       u64,
    pub train_ratio:      f64,
    pub val_ratio:        f64,
    pub weight_decay:     f64,
    pub num_workers:      usize,
    pub grad_accum_steps: usize,
    /// Overwritten with the tokenizer's vocabulary size at train time
    pub vocab_size:       usize,
    pub d_model:          usize,
    pub num_heads:        usize,
    pub num_layers:       usize,
    pub d_ff:             usize,
    pub dropout:          f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path:        "../Dataset/autoirt.csv".to_string(),
            output_dir:       "./T5_training_output".to_string(),
            tokenizer:        "google-t5/t5-base".to_string(),
            init_weights:     None,
            max_seq_len:      512,
            learning_rate:    5e-5,
            epochs:           8,
            warmup_steps:     2000,
            train_batch_size: 2,
            eval_batch_size:  8,
            seed:             120,
            split_seed:       42,
            train_ratio:      0.8,
            val_ratio:        0.1,
            weight_decay:     0.0,
            num_workers:      1,
            grad_accum_steps: 4,
            vocab_size:       32128,
            d_model:          256,
            num_heads:        8,
            num_layers:       6,
            d_ff:             1024,
            dropout:          0.1,
        }
    }
}

impl TrainConfig {
    /// Reject settings that would otherwise fail deep inside the loop.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let positive = [
            ("epochs", self.epochs),
            ("train_batch_size", self.train_batch_size),
            ("eval_batch_size", self.eval_batch_size),
            ("grad_accum_steps", self.grad_accum_steps),
            ("max_seq_len", self.max_seq_len),
            ("num_heads", self.num_heads),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, v)| *v == 0) {
            return Err(ValidationError::InvalidConfig(format!("{name} must be positive")));
        }
        if self.d_model % self.num_heads != 0 {
            return Err(ValidationError::InvalidConfig(format!(
                "d_model ({}) must be divisible by num_heads ({})",
                self.d_model, self.num_heads
            )));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ValidationError::InvalidConfig(
                "learning_rate must be a positive number".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(ValidationError::InvalidConfig("dropout must lie in [0, 1)".to_string()));
        }
        self.split_ratios()?;
        Ok(())
    }

    pub fn split_ratios(&self) -> Result<SplitRatios, ValidationError> {
        SplitRatios::new(self.train_ratio, self.val_ratio)
    }

    pub fn model_config(&self) -> TextClassifierConfig {
        TextClassifierConfig::new(
            self.vocab_size, self.max_seq_len, self.d_model,
            self.num_heads, self.num_layers, self.d_ff, self.dropout,
        )
        .with_num_classes(NUM_LABELS)
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<TrainingSummary> {
        let mut cfg = self.config.clone();

        // ── Step 1: Validate ─────────────────────────────────────────────────
        cfg.validate()?;

        // ── Step 2: Load the labelled dataset ────────────────────────────────
        let loader   = CsvExampleLoader::new(&cfg.data_path);
        let examples = loader.load_all()?;

        // ── Step 3: Train / validation / test split ──────────────────────────
        let split = split_dataset(examples, cfg.split_ratios()?, cfg.split_seed);
        tracing::info!("Split {} examples with seed {}", split.total(), cfg.split_seed);

        // Sizes in train, test, validation order
        println!("{} {} {}", split.train.len(), split.test.len(), split.validation.len());

        if split.train.is_empty() || split.validation.is_empty() {
            bail!(
                "Need at least one training and one validation example \
                 (got {} train, {} validation)",
                split.train.len(),
                split.validation.len()
            );
        }

        // ── Step 4: Tokenizer ────────────────────────────────────────────────
        let tok_store = TokenizerStore::new(&cfg.output_dir);
        let tokenizer = tok_store.load_source(&cfg.tokenizer)?;
        cfg.vocab_size = tokenizer.get_vocab_size(true);

        // ── Step 5: Encode ───────────────────────────────────────────────────
        let train_encoded = encode_examples(&tokenizer, &split.train, cfg.max_seq_len)?;
        let val_encoded   = encode_examples(&tokenizer, &split.validation, cfg.max_seq_len)?;
        tracing::info!(
            "Encoded {} train / {} validation examples (vocab {})",
            train_encoded.len(),
            val_encoded.len(),
            cfg.vocab_size
        );

        let train_dataset = ClassificationDataset::new(train_encoded);
        let val_dataset   = ClassificationDataset::new(val_encoded);

        // ── Step 6: Save config for evaluation ───────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.output_dir)?;
        ckpt_manager.save_config(&cfg)?;
        let metrics_logger = MetricsLogger::new(&cfg.output_dir)?;

        // ── Step 7: Run training loop (Layer 5) ──────────────────────────────
        run_training(&cfg, train_dataset, val_dataset, &ckpt_manager, &metrics_logger)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_run() {
        let cfg = TrainConfig::default();
        assert_eq!(cfg.learning_rate, 5e-5);
        assert_eq!(cfg.epochs, 8);
        assert_eq!(cfg.warmup_steps, 2000);
        assert_eq!((cfg.train_batch_size, cfg.eval_batch_size), (2, 8));
        assert_eq!(cfg.seed, 120);
        assert_eq!(cfg.num_workers, 1);
        assert_eq!(cfg.grad_accum_steps, 4);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_values_rejected() {
        let cfg = TrainConfig { grad_accum_steps: 0, ..TrainConfig::default() };
        assert!(matches!(cfg.validate(), Err(ValidationError::InvalidConfig(_))));

        let cfg = TrainConfig { epochs: 0, ..TrainConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_heads_must_divide_d_model() {
        let cfg = TrainConfig { d_model: 250, num_heads: 8, ..TrainConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_bad_split_rejected() {
        let cfg = TrainConfig { train_ratio: 0.9, val_ratio: 0.2, ..TrainConfig::default() };
        assert!(matches!(cfg.validate(), Err(ValidationError::InvalidSplit(_))));
    }

    #[test]
    fn test_model_config_has_six_classes() {
        let model_cfg = TrainConfig::default().model_config();
        assert_eq!(model_cfg.num_classes, NUM_LABELS);
        assert_eq!(model_cfg.max_seq_len, 512);
    }

    #[test]
    fn test_missing_dataset_fails_before_training() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TrainConfig {
            data_path:  dir.path().join("missing.csv").to_string_lossy().into_owned(),
            output_dir: dir.path().to_string_lossy().into_owned(),
            ..TrainConfig::default()
        };
        assert!(TrainUseCase::new(cfg).execute().is_err());
    }
}
