// ============================================================
// Layer 6 - Checkpoint Manager
// ============================================================
// Restores (and writes) model weights for one checkpoint path.
//
// Two on-disk formats are accepted, chosen by file extension:
//
//   trained_model.pt / .pth  → PyTorch state dict, read through
//                              burn-import's PyTorchFileRecorder
//   anything else            → Burn's named MessagePack record
//                              (.mpk is appended if missing)
//
// The PyTorch loader expects `torch.save(net.state_dict(), path)`;
// a pickled nn.Module object has no tensor layout we can map.
//
// Architecture sidecar:
//   model_config.json next to the checkpoint holds the ModelConfig
//   the weights were trained with. When it exists it wins over the
//   architecture flags given on the command line.

use anyhow::{bail, Context, Result};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
};
use burn_import::pytorch::{LoadArgs, PyTorchFileRecorder};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::ml::model::{CnnMnist, CnnMnistRecord, ModelConfig};

pub const CONFIG_FILE: &str = "model_config.json";

/// `torch.save(net.state_dict())` of a 10-class CnnMnist whose logits are
/// `0.5 * class + 0.1225` for every input (see testdata/make_state_dict.py)
#[cfg(test)]
pub const STATE_DICT_FIXTURE: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/cnn_mnist_state_dict.pt");

type NativeRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointFormat {
    PyTorch,
    Native,
}

impl CheckpointFormat {
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("pt") | Some("pth") => CheckpointFormat::PyTorch,
            _ => CheckpointFormat::Native,
        }
    }
}

pub struct CheckpointManager {
    path: PathBuf,
}

impl CheckpointManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn format(&self) -> CheckpointFormat {
        CheckpointFormat::detect(&self.path)
    }

    /// The file the loader will actually open
    pub fn resolved_path(&self) -> PathBuf {
        match self.format() {
            CheckpointFormat::PyTorch => self.path.clone(),
            CheckpointFormat::Native  => self.path.with_extension("mpk"),
        }
    }

    /// Location of the architecture sidecar
    pub fn config_path(&self) -> PathBuf {
        self.path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(CONFIG_FILE)
    }

    /// Read the sidecar config, or return `fallback` if there is none
    pub fn load_config(&self, fallback: ModelConfig) -> Result<ModelConfig> {
        let path = self.config_path();
        if !path.is_file() {
            tracing::debug!("No '{}', using command line architecture", path.display());
            return Ok(fallback);
        }

        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        let cfg: ModelConfig = serde_json::from_str(&json)
            .with_context(|| format!("Invalid model config in '{}'", path.display()))?;
        tracing::info!("Using architecture from '{}'", path.display());
        Ok(cfg)
    }

    pub fn save_config(&self, cfg: &ModelConfig) -> Result<()> {
        let path = self.config_path();
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved model config to '{}'", path.display());
        Ok(())
    }

    /// Build a model from `cfg` and load the checkpoint weights into it.
    pub fn load_model<B: Backend>(
        &self,
        cfg:    &ModelConfig,
        device: &B::Device,
    ) -> Result<CnnMnist<B>> {
        cfg.validate()
            .with_context(|| format!("Unsupported architecture for '{}'", self.path.display()))?;

        let file = self.resolved_path();
        if !file.is_file() {
            bail!("Checkpoint '{}' not found", file.display());
        }

        let record: CnnMnistRecord<B> = match self.format() {
            CheckpointFormat::PyTorch => PyTorchFileRecorder::<FullPrecisionSettings>::default()
                .load(LoadArgs::new(self.path.clone()), device)
                .with_context(|| {
                    format!("Cannot read PyTorch state dict '{}'", file.display())
                })?,
            CheckpointFormat::Native => NativeRecorder::new()
                .load(self.path.clone(), device)
                .with_context(|| format!("Cannot load checkpoint '{}'", file.display()))?,
        };

        let model = cfg.init::<B>(device).load_record(record);
        tracing::info!(
            "Loaded {:?} checkpoint '{}' ({} parameters)",
            self.format(),
            file.display(),
            model.num_params()
        );
        Ok(model)
    }

    /// Write `model` as a native record at this path (.mpk appended).
    pub fn save_model<B: Backend>(&self, model: &CnnMnist<B>) -> Result<PathBuf> {
        if self.format() == CheckpointFormat::PyTorch {
            bail!("Refusing to write a Burn record to '{}'", self.path.display());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }

        NativeRecorder::new()
            .record(model.clone().into_record(), self.path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", self.path.display()))?;

        let written = self.resolved_path();
        tracing::debug!("Saved checkpoint '{}'", written.display());
        Ok(written)
    }
}
