// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// The three subcommands and their flags. Every flag has a
// default, so `fedmnist-eval show` with no flags reproduces the
// plain harness run.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::{evaluate_use_case::EvalConfig, show_use_case::ShowConfig};
use crate::domain::split::Split;
use crate::ml::model::ModelConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the checkpoint and MNIST, then print one sample (default)
    Show(ShowArgs),

    /// Report loss and accuracy of the checkpoint on a whole split
    Evaluate(EvalArgs),

    /// Re-save a checkpoint as a native Burn record
    Convert(ConvertArgs),
}

/// Architecture flags, used when no model_config.json sits next
/// to the checkpoint
#[derive(Args, Debug, Clone)]
pub struct ArchArgs {
    /// Input image channels (MNIST batches have 1; anything else is rejected)
    #[arg(long, default_value_t = 1)]
    pub num_channels: usize,

    /// Output classes
    #[arg(long, default_value_t = 10)]
    pub num_classes: usize,
}

impl From<ArchArgs> for ModelConfig {
    fn from(a: ArchArgs) -> Self {
        ModelConfig::new()
            .with_num_channels(a.num_channels)
            .with_num_classes(a.num_classes)
    }
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Model checkpoint (.pt state dict or Burn .mpk record)
    #[arg(long, default_value = "trained_model.pt")]
    pub checkpoint: PathBuf,

    /// Dataset root; files live under <data-dir>/MNIST/raw
    #[arg(long, default_value = "./data/mnist/")]
    pub data_dir: PathBuf,

    /// Which split to read from
    #[arg(long, value_enum, default_value_t = Split::Train)]
    pub split: Split,

    /// Index of the sample to print
    #[arg(long, default_value_t = 0)]
    pub index: usize,

    /// Fail instead of downloading missing dataset files
    #[arg(long)]
    pub no_download: bool,

    /// Also print the model's prediction for the sample
    #[arg(long)]
    pub predict: bool,

    #[command(flatten)]
    pub arch: ArchArgs,
}

impl From<ShowArgs> for ShowConfig {
    fn from(a: ShowArgs) -> Self {
        ShowConfig {
            checkpoint:   a.checkpoint,
            data_dir:     a.data_dir,
            split:        a.split,
            index:        a.index,
            download:     !a.no_download,
            predict:      a.predict,
            num_channels: a.arch.num_channels,
            num_classes:  a.arch.num_classes,
        }
    }
}

#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Model checkpoint (.pt state dict or Burn .mpk record)
    #[arg(long, default_value = "trained_model.pt")]
    pub checkpoint: PathBuf,

    /// Dataset root; files live under <data-dir>/MNIST/raw
    #[arg(long, default_value = "./data/mnist/")]
    pub data_dir: PathBuf,

    /// Which split to score
    #[arg(long, value_enum, default_value_t = Split::Test)]
    pub split: Split,

    /// Samples per forward pass
    #[arg(long, default_value_t = 128)]
    pub batch_size: usize,

    /// Fail instead of downloading missing dataset files
    #[arg(long)]
    pub no_download: bool,

    /// Append the result to <metrics-dir>/eval_metrics.csv
    #[arg(long)]
    pub metrics_dir: Option<PathBuf>,

    #[command(flatten)]
    pub arch: ArchArgs,
}

impl From<EvalArgs> for EvalConfig {
    fn from(a: EvalArgs) -> Self {
        EvalConfig {
            checkpoint:   a.checkpoint,
            data_dir:     a.data_dir,
            split:        a.split,
            batch_size:   a.batch_size,
            download:     !a.no_download,
            metrics_dir:  a.metrics_dir,
            num_channels: a.arch.num_channels,
            num_classes:  a.arch.num_classes,
        }
    }
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Checkpoint to read
    #[arg(long, default_value = "trained_model.pt")]
    pub checkpoint: PathBuf,

    /// Where to write the Burn record (.mpk is appended)
    #[arg(long)]
    pub output: PathBuf,

    #[command(flatten)]
    pub arch: ArchArgs,
}
