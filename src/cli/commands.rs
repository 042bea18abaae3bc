// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `evaluate`, and
// all their flags. Defaults reproduce the reference fine-tuning
// run (lr 5e-5, 8 epochs, 2000 warmup steps, batch 2 with 4
// accumulation steps, eval batch 8, seed 120).
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fine-tune the section classifier on a labelled CSV
    Train(TrainArgs),

    /// Score the best checkpoint on the held-out test split
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// CSV with `element` (text) and `label` (section name) columns
    #[arg(long, default_value = "../Dataset/autoirt.csv")]
    pub data: String,

    /// Directory for checkpoints, tokenizer, config and metrics
    #[arg(long, default_value = "./T5_training_output")]
    pub output_dir: String,

    /// Path to a tokenizer.json, or a pretrained HuggingFace identifier
    #[arg(long, default_value = "google-t5/t5-base")]
    pub tokenizer: String,

    /// Burn record with pretrained weights for the same architecture
    #[arg(long)]
    pub init_weights: Option<String>,

    /// Sequences are truncated to this many tokens
    #[arg(long, default_value_t = 512)]
    pub max_seq_len: usize,

    #[arg(long, default_value_t = 5e-5)]
    pub learning_rate: f64,

    #[arg(long, default_value_t = 8)]
    pub epochs: usize,

    /// Optimizer steps over which the learning rate ramps up from 0
    #[arg(long, default_value_t = 2000)]
    pub warmup_steps: usize,

    #[arg(long, default_value_t = 2)]
    pub train_batch_size: usize,

    #[arg(long, default_value_t = 8)]
    pub eval_batch_size: usize,

    /// Seed for weight init and training-batch shuffling
    #[arg(long, default_value_t = 120)]
    pub seed: u64,

    /// Seed for the train/validation/test split
    #[arg(long, default_value_t = 42)]
    pub split_seed: u64,

    #[arg(long, default_value_t = 0.8)]
    pub train_ratio: f64,

    #[arg(long, default_value_t = 0.1)]
    pub val_ratio: f64,

    /// AdamW decoupled weight decay
    #[arg(long, default_value_t = 0.0)]
    pub weight_decay: f64,

    /// Data-loader worker threads
    #[arg(long, default_value_t = 1)]
    pub num_workers: usize,

    /// Micro-batches per optimizer step
    #[arg(long, default_value_t = 4)]
    pub grad_accum_steps: usize,

    /// Hidden dimension of the encoder
    #[arg(long, default_value_t = 256)]
    pub d_model: usize,

    /// Attention heads; must divide d_model
    #[arg(long, default_value_t = 8)]
    pub num_heads: usize,

    #[arg(long, default_value_t = 6)]
    pub num_layers: usize,

    /// Inner dimension of the feed-forward network
    #[arg(long, default_value_t = 1024)]
    pub d_ff: usize,

    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_path:        a.data,
            output_dir:       a.output_dir,
            tokenizer:        a.tokenizer,
            init_weights:     a.init_weights,
            max_seq_len:      a.max_seq_len,
            learning_rate:    a.learning_rate,
            epochs:           a.epochs,
            warmup_steps:     a.warmup_steps,
            train_batch_size: a.train_batch_size,
            eval_batch_size:  a.eval_batch_size,
            seed:             a.seed,
            split_seed:       a.split_seed,
            train_ratio:      a.train_ratio,
            val_ratio:        a.val_ratio,
            weight_decay:     a.weight_decay,
            num_workers:      a.num_workers,
            grad_accum_steps: a.grad_accum_steps,
            d_model:          a.d_model,
            num_heads:        a.num_heads,
            num_layers:       a.num_layers,
            d_ff:             a.d_ff,
            dropout:          a.dropout,
            ..TrainConfig::default()
        }
    }
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Output directory of a finished `train` run
    #[arg(long, default_value = "./T5_training_output")]
    pub output_dir: String,

    /// Dataset CSV; defaults to the one recorded at training time
    #[arg(long)]
    pub data: Option<String>,
}
