// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Runs a classifier over a dataset without gradients and
// gathers scores and labels on the host, ready for
// compute_metrics. Used by the trainer for per-epoch validation
// and by the `evaluate` command for the held-out test split.

use anyhow::{anyhow, Result};
use burn::{data::dataloader::DataLoaderBuilder, prelude::*};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{ClassificationBatch, ClassificationBatcher},
    dataset::ClassificationDataset,
};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::evaluation::{compute_metrics, EvalMetrics, EvalPrediction, Scores};
use crate::ml::model::TextClassifier;

type InferBackend = burn::backend::Wgpu;

/// Host-side result of one pass over an evaluation set
#[derive(Debug, Clone)]
pub struct EvalPass {
    pub prediction: EvalPrediction,
    /// Mean cross-entropy over batches (NaN when there were none)
    pub mean_loss: f64,
}

/// Score every batch and collect logits + labels on the host.
pub fn predict_batches<B, I>(model: &TextClassifier<B>, batches: I) -> Result<EvalPass>
where
    B: Backend,
    I: IntoIterator<Item = ClassificationBatch<B>>,
{
    let mut prediction = EvalPrediction::default();
    let mut loss_sum   = 0.0f64;
    let mut n_batches  = 0usize;

    for batch in batches {
        let labels = batch.labels.clone();
        let (loss, logits) = model.forward_classification(batch);

        loss_sum  += loss.into_scalar().elem::<f64>();
        n_batches += 1;

        let [_, num_classes] = logits.dims();
        let values: Vec<f32> = logits
            .into_data()
            .convert::<f32>()
            .to_vec()
            .map_err(|e| anyhow!("Cannot read logits: {e:?}"))?;
        prediction.scores.extend(Scores::new(values, num_classes)?)?;

        let labels: Vec<i64> = labels
            .into_data()
            .convert::<i64>()
            .to_vec()
            .map_err(|e| anyhow!("Cannot read labels: {e:?}"))?;
        prediction.labels.extend(labels);
    }

    let mean_loss = if n_batches > 0 { loss_sum / n_batches as f64 } else { f64::NAN };
    Ok(EvalPass { prediction, mean_loss })
}

/// Best checkpoint of a finished run, loaded for evaluation
pub struct Inferencer {
    model:  TextClassifier<InferBackend>,
    device: burn::backend::wgpu::WgpuDevice,
}

impl Inferencer {
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager, cfg: &TrainConfig) -> Result<Self> {
        let device = burn::backend::wgpu::WgpuDevice::default();

        let model: TextClassifier<InferBackend> = cfg.model_config().init(&device);
        let model = ckpt_manager.load_best_model(model, &device)?;

        tracing::info!("Best model loaded from '{}'", ckpt_manager.dir().display());
        Ok(Self { model, device })
    }

    /// Score a whole dataset and compute its metrics.
    pub fn evaluate(
        &self,
        dataset:     ClassificationDataset,
        batch_size:  usize,
        num_workers: usize,
    ) -> Result<(EvalMetrics, f64)> {
        let batcher = ClassificationBatcher::<InferBackend>::new(self.device.clone());
        let loader  = DataLoaderBuilder::new(batcher)
            .batch_size(batch_size)
            .num_workers(num_workers)
            .build(dataset);

        let pass    = predict_batches(&self.model, loader.iter())?;
        let metrics = compute_metrics(&pass.prediction)?;
        Ok((metrics, pass.mean_loss))
    }
}
