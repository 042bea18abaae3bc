// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Fine-tunes the classifier with AdamW, a warmup/linear-decay
// learning rate and gradient accumulation, then scores the
// validation set after every epoch.
//
//   for each epoch:
//     for each micro-batch:
//       loss / grad_accum_steps → backward → accumulate
//       every grad_accum_steps micro-batches: optimizer step
//     validation pass → compute_metrics → checkpoint + CSV row
//   reload the epoch with the best accuracy → model_best
//
// Notes on Burn:
//   - Training uses Autodiff<Wgpu> for gradients
//   - model.valid() returns the model on the inner backend,
//     so the validation batcher is built for that backend too
//   - train_loop is generic over the backend so tests can run it
//     on Autodiff<NdArray>
//
// Reference: Burn Book §5, Loshchilov & Hutter (2019) AdamW

use anyhow::{Context, Result};
use burn::{
    data::{dataloader::DataLoaderBuilder, dataset::Dataset},
    module::AutodiffModule,
    optim::{AdamWConfig, GradientsAccumulator, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::ClassificationBatcher, dataset::ClassificationDataset};
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::evaluation::{compute_metrics, EvalMetrics};
use crate::ml::inferencer::predict_batches;
use crate::ml::model::TextClassifier;
use crate::ml::scheduler::WarmupLinearSchedule;

type MyBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

/// Outcome of a finished run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub best_epoch:      usize,
    pub best_metrics:    EvalMetrics,
    pub epochs_run:      usize,
    /// Optimizer updates actually applied, trailing partial groups included
    pub optimizer_steps: usize,
}

pub fn run_training(
    cfg:            &TrainConfig,
    train_dataset:  ClassificationDataset,
    val_dataset:    ClassificationDataset,
    ckpt_manager:   &CheckpointManager,
    metrics_logger: &MetricsLogger,
) -> Result<TrainingSummary> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    train_loop::<MyBackend>(cfg, train_dataset, val_dataset, ckpt_manager, metrics_logger, device)
}

/// Optimizer updates in one run, counting a trailing partial
/// accumulation group as a full step.
pub fn total_optimizer_steps(cfg: &TrainConfig, train_examples: usize) -> usize {
    let batches_per_epoch = train_examples.div_ceil(cfg.train_batch_size);
    let steps_per_epoch   = batches_per_epoch.div_ceil(cfg.grad_accum_steps);
    steps_per_epoch * cfg.epochs
}

/// Whether `candidate` replaces the current best. Only a strictly
/// higher accuracy wins, so the earlier epoch keeps a tie.
pub fn is_new_best(best: Option<&EvalMetrics>, candidate: &EvalMetrics) -> bool {
    best.map_or(true, |b| candidate.accuracy > b.accuracy)
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:            &TrainConfig,
    train_dataset:  ClassificationDataset,
    val_dataset:    ClassificationDataset,
    ckpt_manager:   &CheckpointManager,
    metrics_logger: &MetricsLogger,
    device:         B::Device,
) -> Result<TrainingSummary> {
    B::seed(cfg.seed);

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: TextClassifier<B> = cfg.model_config().init(&device);
    if let Some(path) = &cfg.init_weights {
        model = ckpt_manager.load_weights(model, path, &device)?;
        tracing::info!("Initialised encoder from '{}'", path);
    }
    tracing::info!(
        "Model ready: {} layers, d_model={}, {} classes",
        cfg.num_layers, cfg.d_model, cfg.model_config().num_classes,
    );

    // ── AdamW optimiser ───────────────────────────────────────────────────────
    let mut optim = AdamWConfig::new()
        .with_beta_1(0.9)
        .with_beta_2(0.999)
        .with_epsilon(1e-8)
        .with_weight_decay(cfg.weight_decay as f32)
        .init();

    let total_steps  = total_optimizer_steps(cfg, train_dataset.len());
    let mut schedule = WarmupLinearSchedule::new(cfg.learning_rate, cfg.warmup_steps, total_steps);
    tracing::info!(
        "{} optimizer steps ({} warmup), effective batch size {}",
        total_steps,
        cfg.warmup_steps,
        cfg.train_batch_size * cfg.grad_accum_steps,
    );

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_batcher = ClassificationBatcher::<B>::new(device.clone());
    let train_loader  = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.train_batch_size)
        .shuffle(cfg.seed)
        .num_workers(cfg.num_workers)
        .build(train_dataset);

    // ── Validation data loader (InnerBackend — no autodiff overhead) ──────────
    let val_batcher = ClassificationBatcher::<B::InnerBackend>::new(device.clone());
    let val_loader  = DataLoaderBuilder::new(val_batcher)
        .batch_size(cfg.eval_batch_size)
        .num_workers(cfg.num_workers)
        .build(val_dataset);

    let mut best: Option<(usize, EvalMetrics)> = None;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;
        let mut accumulator    = GradientsAccumulator::<TextClassifier<B>>::new();
        let mut pending        = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_classification(batch);

            train_loss_sum += loss.clone().into_scalar().elem::<f64>();
            train_batches  += 1;

            // Scale so the accumulated gradient is a mean over the group
            let grads = (loss / cfg.grad_accum_steps as f64).backward();
            let grads = GradientsParams::from_grads(grads, &model);
            accumulator.accumulate(&model, grads);
            pending += 1;

            if pending == cfg.grad_accum_steps {
                model   = optim.step(schedule.next_lr(), model, accumulator.grads());
                pending = 0;
            }
        }

        // Flush a trailing partial group
        if pending > 0 {
            model = optim.step(schedule.next_lr(), model, accumulator.grads());
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        // ── Validation phase ──────────────────────────────────────────────────
        let model_valid = model.valid();
        let pass    = predict_batches(&model_valid, val_loader.iter())?;
        let metrics = compute_metrics(&pass.prediction)
            .with_context(|| format!("Validation failed after epoch {epoch}"))?;

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | accuracy={:.1}% | f1={:.3}",
            epoch, cfg.epochs, avg_train_loss, pass.mean_loss,
            metrics.accuracy * 100.0, metrics.f1,
        );
        tracing::debug!(
            "Epoch {} precision={:.4} recall={:.4} lr={:.3e} step={}",
            epoch, metrics.precision, metrics.recall,
            schedule.lr_at(schedule.current_step()), schedule.current_step(),
        );

        ckpt_manager.save_model(&model, epoch)?;
        metrics_logger.log(&EpochMetrics::new(epoch, avg_train_loss, pass.mean_loss, metrics))?;

        if is_new_best(best.as_ref().map(|(_, b)| b), &metrics) {
            tracing::info!("New best accuracy {:.4} at epoch {}", metrics.accuracy, epoch);
            best = Some((epoch, metrics));
        }
    }

    let (best_epoch, best_metrics) = best.context("Training ran for zero epochs")?;

    // ── Restore the best epoch ────────────────────────────────────────────────
    let model = ckpt_manager.load_epoch_model(model, best_epoch, &device)?;
    ckpt_manager.save_best_model(&model)?;

    let summary = TrainingSummary {
        best_epoch,
        best_metrics,
        epochs_run:      cfg.epochs,
        optimizer_steps: schedule.current_step(),
    };
    if summary.optimizer_steps != total_steps {
        tracing::warn!(
            "Applied {} optimizer steps, schedule was sized for {}",
            summary.optimizer_steps, total_steps
        );
    }
    ckpt_manager.save_summary(&summary)?;

    tracing::info!(
        "Training complete! Best epoch {} with accuracy {:.4}, metrics in '{}'",
        best_epoch, best_metrics.accuracy, metrics_logger.csv_path().display()
    );
    Ok(summary)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::EncodedExample;
    use crate::domain::error::ValidationError;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray>;

    fn tiny_config(dir: &str) -> TrainConfig {
        TrainConfig {
            output_dir:       dir.to_string(),
            epochs:           2,
            train_batch_size: 2,
            eval_batch_size:  4,
            grad_accum_steps: 2,
            warmup_steps:     1,
            learning_rate:    1e-3,
            num_workers:      1,
            max_seq_len:      4,
            vocab_size:       16,
            d_model:          8,
            num_heads:        2,
            num_layers:       1,
            d_ff:             16,
            dropout:          0.0,
            ..TrainConfig::default()
        }
    }

    fn dataset(n: usize) -> ClassificationDataset {
        let examples = (0..n)
            .map(|i| EncodedExample {
                input_ids:      vec![(i % 6 + 1) as u32, 7, 0, 0],
                attention_mask: vec![1, 1, 0, 0],
                label:          i % 6,
            })
            .collect();
        ClassificationDataset::new(examples)
    }

    #[test]
    fn test_total_optimizer_steps() {
        let cfg = tiny_config("unused");
        // 5 examples / batch 2 = 3 batches → 2 steps per epoch → 4 total
        assert_eq!(total_optimizer_steps(&cfg, 5), 4);
        assert_eq!(total_optimizer_steps(&cfg, 0), 0);
    }

    #[test]
    fn test_train_loop_writes_checkpoints_and_summary() {
        let dir  = tempfile::tempdir().unwrap();
        let cfg  = tiny_config(dir.path().to_str().unwrap());
        let ckpt = CheckpointManager::new(&cfg.output_dir).unwrap();
        let log  = MetricsLogger::new(&cfg.output_dir).unwrap();

        let summary = train_loop::<TestBackend>(
            &cfg, dataset(5), dataset(3), &ckpt, &log, Default::default(),
        ).unwrap();

        assert_eq!(summary.epochs_run, 2);
        assert!((1..=2).contains(&summary.best_epoch));
        assert!((0.0..=1.0).contains(&summary.best_metrics.accuracy));

        assert!(dir.path().join("model_epoch_1.mpk.gz").exists());
        assert!(dir.path().join("model_epoch_2.mpk.gz").exists());
        assert!(dir.path().join("model_best.mpk.gz").exists());
        assert_eq!(ckpt.load_summary().unwrap().best_epoch, summary.best_epoch);

        // 5 examples / batch 2 = 3 micro-batches → one full group + one partial, per epoch
        assert_eq!(summary.optimizer_steps, 4);
        assert_eq!(summary.optimizer_steps, total_optimizer_steps(&cfg, 5));

        // model_best carries the weights of the selected epoch
        let device = Default::default();
        let fresh  = || cfg.model_config().init::<NdArray>(&device);
        let best   = ckpt.load_best_model(fresh(), &device).unwrap();
        let epoch  = ckpt.load_epoch_model(fresh(), summary.best_epoch, &device).unwrap();
        let best_w:  Vec<f32> = best.classifier.weight.val().into_data().to_vec().unwrap();
        let epoch_w: Vec<f32> = epoch.classifier.weight.val().into_data().to_vec().unwrap();
        assert_eq!(best_w, epoch_w);

        let csv = std::fs::read_to_string(log.csv_path()).unwrap();
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn test_empty_validation_set_fails() {
        let dir  = tempfile::tempdir().unwrap();
        let cfg  = tiny_config(dir.path().to_str().unwrap());
        let ckpt = CheckpointManager::new(&cfg.output_dir).unwrap();
        let log  = MetricsLogger::new(&cfg.output_dir).unwrap();

        let err = train_loop::<TestBackend>(
            &cfg, dataset(4), dataset(0), &ckpt, &log, Default::default(),
        ).unwrap_err();
        assert_eq!(err.downcast_ref::<ValidationError>(), Some(&ValidationError::EmptyEvaluation));
    }

    #[test]
    fn test_exact_accumulation_groups() {
        let dir  = tempfile::tempdir().unwrap();
        let cfg  = TrainConfig { epochs: 1, ..tiny_config(dir.path().to_str().unwrap()) };
        let ckpt = CheckpointManager::new(&cfg.output_dir).unwrap();
        let log  = MetricsLogger::new(&cfg.output_dir).unwrap();

        // 8 examples / batch 2 = 4 micro-batches = 2 full groups, nothing left over
        let summary = train_loop::<TestBackend>(
            &cfg, dataset(8), dataset(2), &ckpt, &log, Default::default(),
        ).unwrap();
        assert_eq!(summary.optimizer_steps, 2);
        assert_eq!(summary.optimizer_steps, total_optimizer_steps(&cfg, 8));
    }

    fn metrics(accuracy: f64) -> EvalMetrics {
        EvalMetrics { accuracy, f1: 0.0, precision: 0.0, recall: 0.0 }
    }

    #[test]
    fn test_best_epoch_selection() {
        assert!(is_new_best(None, &metrics(0.0)));
        assert!(is_new_best(Some(&metrics(0.4)), &metrics(0.5)));
        assert!(!is_new_best(Some(&metrics(0.5)), &metrics(0.4)));
        // A tie keeps the earlier epoch
        assert!(!is_new_best(Some(&metrics(0.5)), &metrics(0.5)));
    }
}
