// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Scores the best checkpoint of a finished run on the held-out
// test split.
//
// The split is rebuilt from train_config.json (same seed, same
// ratios), so the test examples are exactly the ones training
// never saw, as long as the CSV itself is unchanged.

use anyhow::{bail, Result};

use crate::data::{
    dataset::ClassificationDataset,
    encoder::encode_examples,
    loader::CsvExampleLoader,
    splitter::split_dataset,
};
use crate::domain::traits::ExampleSource;
use crate::infra::{checkpoint::CheckpointManager, tokenizer_store::TokenizerStore};
use crate::ml::evaluation::EvalMetrics;
use crate::ml::inferencer::Inferencer;

pub struct EvaluateUseCase {
    output_dir: String,
    /// Overrides the dataset path recorded at training time
    data_path:  Option<String>,
}

impl EvaluateUseCase {
    pub fn new(output_dir: String, data_path: Option<String>) -> Self {
        Self { output_dir, data_path }
    }

    pub fn execute(&self) -> Result<EvalMetrics> {
        let ckpt = CheckpointManager::new(&self.output_dir)?;
        let cfg  = ckpt.load_config()?;

        if let Ok(summary) = ckpt.load_summary() {
            tracing::info!(
                "Run trained {} epochs (last saved {}), best epoch {} at accuracy {:.4}",
                summary.epochs_run,
                ckpt.latest_epoch().unwrap_or(summary.epochs_run),
                summary.best_epoch,
                summary.best_metrics.accuracy,
            );
        }

        let data_path = self.data_path.as_deref().unwrap_or(&cfg.data_path);
        let examples  = CsvExampleLoader::new(data_path).load_all()?;
        let split     = split_dataset(examples, cfg.split_ratios()?, cfg.split_seed);

        if split.test.is_empty() {
            bail!("The test split is empty (train_ratio + val_ratio leaves no rows)");
        }

        let tokenizer = TokenizerStore::new(&self.output_dir).load()?;
        let encoded   = encode_examples(&tokenizer, &split.test, cfg.max_seq_len)?;
        let n_test    = encoded.len();

        let inferencer = Inferencer::from_checkpoint(&ckpt, &cfg)?;
        let (metrics, loss) = inferencer.evaluate(
            ClassificationDataset::new(encoded),
            cfg.eval_batch_size,
            cfg.num_workers,
        )?;

        tracing::info!("Evaluated {} test examples, loss {:.4}", n_test, loss);
        Ok(metrics)
    }
}
