// ============================================================
// Layer 2 - ConvertUseCase
// ============================================================
// Re-saves any readable checkpoint (typically a PyTorch state
// dict) as a native Burn record, with the architecture written
// next to it so later runs need no architecture flags.

use anyhow::{bail, Result};
use std::path::PathBuf;

use crate::infra::checkpoint::{CheckpointFormat, CheckpointManager};
use crate::ml::{model::CnnMnist, model::ModelConfig, InferBackend, InferDevice};

pub struct ConvertUseCase {
    input:    PathBuf,
    output:   PathBuf,
    fallback: ModelConfig,
}

impl ConvertUseCase {
    pub fn new(input: PathBuf, output: PathBuf, fallback: ModelConfig) -> Self {
        Self { input, output, fallback }
    }

    /// Returns the path of the written record
    pub fn execute(&self) -> Result<PathBuf> {
        let source = CheckpointManager::new(&self.input);
        let target = CheckpointManager::new(&self.output);
        if target.format() == CheckpointFormat::PyTorch {
            bail!(
                "Output '{}' must not use a PyTorch extension; it is written as a Burn record",
                self.output.display()
            );
        }

        let device = InferDevice::default();
        let config = source.load_config(self.fallback.clone())?;
        let model: CnnMnist<InferBackend> = source.load_model(&config, &device)?;

        let written = target.save_model(&model)?;
        target.save_config(&config)?;
        tracing::info!("Converted '{}' → '{}'", self.input.display(), written.display());
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::checkpoint::{CONFIG_FILE, STATE_DICT_FIXTURE};
    use burn::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn test_converts_native_record_and_writes_config() {
        let tmp   = TempDir::new().unwrap();
        let model: CnnMnist<InferBackend> =
            ModelConfig::new().with_num_classes(6).init(&InferDevice::default());
        CheckpointManager::new(tmp.path().join("in/model")).save_model(&model).unwrap();

        let written = ConvertUseCase::new(
            tmp.path().join("in/model"),
            tmp.path().join("out/model"),
            ModelConfig::new().with_num_classes(6),
        )
        .execute()
        .unwrap();

        assert_eq!(written, tmp.path().join("out/model.mpk"));
        assert!(written.is_file());
        assert!(tmp.path().join("out").join(CONFIG_FILE).is_file());
    }

    #[test]
    fn test_converts_pytorch_state_dict_losslessly() {
        let tmp    = TempDir::new().unwrap();
        let device = InferDevice::default();

        let written = ConvertUseCase::new(
            STATE_DICT_FIXTURE.into(),
            tmp.path().join("trained_model"),
            ModelConfig::new(),
        )
        .execute()
        .unwrap();

        let cfg = ModelConfig::new();
        let from_pt: CnnMnist<InferBackend> =
            CheckpointManager::new(STATE_DICT_FIXTURE).load_model(&cfg, &device).unwrap();
        let from_mpk: CnnMnist<InferBackend> =
            CheckpointManager::new(&written).load_model(&cfg, &device).unwrap();

        let input = Tensor::<InferBackend, 4>::ones([2, 1, 28, 28], &device);
        from_pt
            .forward(input.clone())
            .into_data()
            .assert_approx_eq(&from_mpk.forward(input).into_data(), 5);
    }

    #[test]
    fn test_rejects_pytorch_output_path() {
        let tmp = TempDir::new().unwrap();
        let err = ConvertUseCase::new(
            tmp.path().join("model.pt"),
            tmp.path().join("copy.pt"),
            ModelConfig::new(),
        )
        .execute()
        .unwrap_err();
        assert!(err.to_string().contains("PyTorch extension"));
    }
}
