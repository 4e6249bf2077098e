// ============================================================
// Layer 2 - ShowUseCase
// ============================================================
// The harness' default path, in order:
//
//   Step 1: Load the checkpoint          (Layer 6 - infra)
//   Step 2: Switch to evaluation mode    (Layer 5 - ml)
//   Step 3: Load MNIST, download if absent (Layer 4 - data)
//   Step 4: Return one sample            (Layer 3 - domain)
//
// The checkpoint is loaded before the dataset so a missing model
// fails fast, before any network traffic.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::dataset::MnistDataset;
use crate::domain::{sample::MnistSample, split::Split, traits::SampleSource};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{
    evaluator::Prediction,
    inferencer::Inferencer,
    model::ModelConfig,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowConfig {
    pub checkpoint:   PathBuf,
    pub data_dir:     PathBuf,
    pub split:        Split,
    pub index:        usize,
    pub download:     bool,
    pub predict:      bool,
    pub num_channels: usize,
    pub num_classes:  usize,
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self {
            checkpoint:   PathBuf::from("trained_model.pt"),
            data_dir:     PathBuf::from("./data/mnist/"),
            split:        Split::Train,
            index:        0,
            download:     true,
            predict:      false,
            num_channels: 1,
            num_classes:  10,
        }
    }
}

impl ShowConfig {
    pub fn model_config(&self) -> ModelConfig {
        ModelConfig::new()
            .with_num_channels(self.num_channels)
            .with_num_classes(self.num_classes)
    }
}

/// What `show` hands back to the CLI for printing
#[derive(Debug, Clone)]
pub struct ShowOutcome {
    pub sample:     MnistSample,
    pub prediction: Option<Prediction>,
}

pub struct ShowUseCase {
    config: ShowConfig,
}

impl ShowUseCase {
    pub fn new(config: ShowConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<ShowOutcome> {
        let cfg = &self.config;

        // ── Steps 1 + 2: checkpoint → evaluation mode ────────────────────────
        let ckpt       = CheckpointManager::new(&cfg.checkpoint);
        let inferencer = Inferencer::from_checkpoint(&ckpt, cfg.model_config())?;

        // ── Step 3: dataset ──────────────────────────────────────────────────
        tracing::info!("Loading MNIST {} split from '{}'", cfg.split, cfg.data_dir.display());
        let dataset = MnistDataset::load(&cfg.data_dir, cfg.split, cfg.download)?;

        // ── Step 4: one sample ───────────────────────────────────────────────
        self.inspect(&dataset, &inferencer)
    }

    /// Fetch the configured sample and optionally classify it
    pub fn inspect<S: SampleSource>(&self, source: &S, inferencer: &Inferencer) -> Result<ShowOutcome> {
        let available = source.sample_count();
        if self.config.index >= available {
            bail!(
                "Sample index {} is out of range: the {} split has {} samples",
                self.config.index,
                self.config.split,
                available
            );
        }

        let sample = source.sample(self.config.index)?;
        let prediction = if self.config.predict {
            let p = inferencer.predict(&sample)?;
            tracing::debug!("Sample {} predicted as {} (p={:.4})", self.config.index, p.class, p.probability);
            Some(p)
        } else {
            None
        };
        Ok(ShowOutcome { sample, prediction })
    }
}
