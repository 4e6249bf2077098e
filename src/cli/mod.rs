// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Parses arguments with clap, hands off to a use case, and
// prints the result. Nothing else in the crate writes to stdout.
//
// Running without a subcommand behaves like `show` with all
// defaults: load ./trained_model.pt, load ./data/mnist/ (train
// split, downloading if needed), print sample 0.

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, ConvertArgs, EvalArgs};

use crate::application::{
    convert_use_case::ConvertUseCase,
    evaluate_use_case::EvaluateUseCase,
    show_use_case::{ShowConfig, ShowUseCase},
};

#[derive(Parser, Debug)]
#[command(
    name = "fedmnist-eval",
    version,
    about = "Load a federated MNIST checkpoint, load MNIST, and inspect or score the model."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            None                         => run_show(ShowConfig::default()),
            Some(Commands::Show(args))     => run_show(args.into()),
            Some(Commands::Evaluate(args)) => run_evaluate(args),
            Some(Commands::Convert(args))  => run_convert(args),
        }
    }
}

fn run_show(config: ShowConfig) -> Result<()> {
    let outcome = ShowUseCase::new(config).execute()?;

    println!("{}", outcome.sample);
    if let Some(p) = outcome.prediction {
        println!("prediction: {} (p={:.4})", p.class, p.probability);
    }
    Ok(())
}

fn run_evaluate(args: EvalArgs) -> Result<()> {
    let report = EvaluateUseCase::new(args.into()).execute()?;

    println!("Testing accuracy: {:.2}%", report.accuracy() * 100.0);
    println!("Testing loss: {:.4}", report.mean_loss);
    Ok(())
}

fn run_convert(args: ConvertArgs) -> Result<()> {
    let written = ConvertUseCase::new(args.checkpoint, args.output, args.arch.into()).execute()?;
    println!("Saved {}", written.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::split::Split;
    use std::path::PathBuf;

    #[test]
    fn test_no_subcommand_means_show_with_defaults() {
        let cli = Cli::try_parse_from(["fedmnist-eval"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_show_flags_map_onto_config() {
        let cli = Cli::try_parse_from([
            "fedmnist-eval", "show",
            "--checkpoint", "round_9.pt",
            "--split", "test",
            "--index", "42",
            "--no-download",
            "--predict",
        ])
        .unwrap();

        let Some(Commands::Show(args)) = cli.command else {
            panic!("expected the show subcommand");
        };
        let cfg: ShowConfig = args.into();
        assert_eq!(cfg.checkpoint, PathBuf::from("round_9.pt"));
        assert_eq!(cfg.data_dir, PathBuf::from("./data/mnist/"));
        assert_eq!(cfg.split, Split::Test);
        assert_eq!(cfg.index, 42);
        assert!(!cfg.download);
        assert!(cfg.predict);
        assert_eq!(cfg.num_classes, 10);
    }

    #[test]
    fn test_evaluate_defaults_to_test_split() {
        let cli = Cli::try_parse_from(["fedmnist-eval", "evaluate", "--batch-size", "64"]).unwrap();
        let Some(Commands::Evaluate(args)) = cli.command else {
            panic!("expected the evaluate subcommand");
        };
        assert_eq!(args.split, Split::Test);
        assert_eq!(args.batch_size, 64);
        assert!(args.metrics_dir.is_none());
    }

    #[test]
    fn test_convert_requires_output() {
        assert!(Cli::try_parse_from(["fedmnist-eval", "convert"]).is_err());
    }
}
