// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses command line arguments with clap and hands off to the
// application layer. Only this layer prints final results.
//
//   1. `train`    — fine-tunes the classifier on the CSV dataset
//   2. `evaluate` — scores the best checkpoint on the test split
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "bug-section-classifier",
    version,
    about = "Fine-tune a transformer encoder to classify bug-report sections."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Evaluate(args) => run_evaluate(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on dataset: {}", args.data);

    let summary = TrainUseCase::new(args.into()).execute()?;

    println!(
        "Training complete. Best epoch {} (accuracy {:.4}) saved as model_best.",
        summary.best_epoch, summary.best_metrics.accuracy
    );
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    let metrics = EvaluateUseCase::new(args.output_dir, args.data).execute()?;

    println!("accuracy  {:.4}", metrics.accuracy);
    println!("f1        {:.4}", metrics.f1);
    println!("precision {:.4}", metrics.precision);
    println!("recall    {:.4}", metrics.recall);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::TrainConfig;

    #[test]
    fn test_train_defaults() {
        let cli = Cli::try_parse_from(["bug-section-classifier", "train"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };

        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.data_path, "../Dataset/autoirt.csv");
        assert_eq!(cfg.output_dir, "./T5_training_output");
        assert_eq!(cfg.grad_accum_steps, 4);
        assert_eq!(cfg.seed, 120);
        assert!(cfg.init_weights.is_none());
    }

    #[test]
    fn test_train_overrides() {
        let cli = Cli::try_parse_from([
            "bug-section-classifier", "train",
            "--epochs", "2", "--learning-rate", "1e-4", "--tokenizer", "tok.json",
        ]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };

        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.epochs, 2);
        assert_eq!(cfg.learning_rate, 1e-4);
        assert_eq!(cfg.tokenizer, "tok.json");
    }

    #[test]
    fn test_evaluate_args() {
        let cli = Cli::try_parse_from([
            "bug-section-classifier", "evaluate", "--output-dir", "run1",
        ]).unwrap();
        let Commands::Evaluate(args) = cli.command else { panic!("expected evaluate") };
        assert_eq!(args.output_dir, "run1");
        assert!(args.data.is_none());
    }
}
