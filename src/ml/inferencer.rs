// ============================================================
// Layer 5 - Inferencer
// ============================================================
use anyhow::Result;
use burn::{data::dataset::Dataset, module::AutodiffModule};

use crate::domain::sample::MnistSample;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::evaluator::{evaluate, predict, EvalReport, Prediction};
use crate::ml::model::{CnnMnist, ModelConfig};
use crate::ml::{InferBackend, InferDevice, LoadBackend};

/// A checkpointed model in evaluation mode.
pub struct Inferencer {
    model:  CnnMnist<InferBackend>,
    device: InferDevice,
}

impl Inferencer {
    /// Restore the checkpoint and switch it to evaluation mode.
    ///
    /// Weights are loaded onto the autodiff backend, where dropout is
    /// live, and `valid()` moves them to the inner backend where
    /// dropout is the identity. The architecture (sidecar or
    /// `fallback`) is validated before any weights are read.
    pub fn from_checkpoint(ckpt: &CheckpointManager, fallback: ModelConfig) -> Result<Self> {
        let device = InferDevice::default();
        let config = ckpt.load_config(fallback)?;

        let trained: CnnMnist<LoadBackend> = ckpt.load_model(&config, &device)?;
        let model = trained.valid();
        tracing::info!("Model switched to evaluation mode");

        Ok(Self { model, device })
    }

    pub fn predict(&self, sample: &MnistSample) -> Result<Prediction> {
        predict(&self.model, sample, &self.device)
    }

    pub fn evaluate<D>(&self, dataset: D, batch_size: usize) -> Result<EvalReport>
    where
        D: Dataset<MnistSample> + 'static,
    {
        evaluate(&self.model, dataset, batch_size, &self.device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample::IMAGE_PIXELS;
    use burn::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn test_eval_mode_disables_dropout() {
        let device = InferDevice::default();
        let cfg    = ModelConfig::new().with_dropout(0.9);
        let train_mode: CnnMnist<LoadBackend> = cfg.init(&device);
        let eval_mode = train_mode.clone().valid();

        let input = Tensor::<InferBackend, 4>::ones([2, 1, 28, 28], &device);
        let a = eval_mode.forward(input.clone()).into_data();
        let b = eval_mode.forward(input).into_data();
        a.assert_approx_eq(&b, 6);
    }

    #[test]
    fn test_from_checkpoint_uses_sidecar_config() {
        let tmp    = TempDir::new().unwrap();
        let device = InferDevice::default();
        let cfg    = ModelConfig::new().with_num_classes(5);
        let model: CnnMnist<InferBackend> = cfg.init(&device);

        let ckpt = CheckpointManager::new(tmp.path().join("trained_model"));
        ckpt.save_model(&model).unwrap();
        ckpt.save_config(&cfg).unwrap();

        // Fallback says 10 classes, the sidecar says 5
        let inferencer = Inferencer::from_checkpoint(&ckpt, ModelConfig::new()).unwrap();
        let images     = Tensor::<InferBackend, 4>::zeros([1, 1, 28, 28], &device);
        assert_eq!(inferencer.model.forward(images).dims(), [1, 5]);

        let sample = MnistSample::new(vec![0.0; IMAGE_PIXELS], 1);
        assert!(inferencer.predict(&sample).unwrap().class < 5);
    }

    #[test]
    fn test_multi_channel_sidecar_is_rejected_before_inference() {
        let tmp    = TempDir::new().unwrap();
        let device = InferDevice::default();
        let cfg    = ModelConfig::new().with_num_channels(3);
        let model: CnnMnist<InferBackend> = cfg.init(&device);

        let ckpt = CheckpointManager::new(tmp.path().join("trained_model"));
        ckpt.save_model(&model).unwrap();
        ckpt.save_config(&cfg).unwrap();

        // The one-channel fallback is ignored in favour of the sidecar
        let err = Inferencer::from_checkpoint(&ckpt, ModelConfig::new())
            .err()
            .expect("a 3-channel model cannot take MNIST batches");
        assert!(format!("{err:#}").contains("num_channels is 3"));
    }

    #[test]
    fn test_multi_channel_fallback_is_rejected() {
        let tmp  = TempDir::new().unwrap();
        let ckpt = CheckpointManager::new(tmp.path().join("trained_model"));

        let err = Inferencer::from_checkpoint(&ckpt, ModelConfig::new().with_num_channels(3))
            .err()
            .expect("a 3-channel architecture is rejected");
        assert!(format!("{err:#}").contains("num_channels is 3"));
    }
}
