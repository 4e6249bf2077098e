// ============================================================
// Layer 2 - EvaluateUseCase
// ============================================================
// Scores a checkpoint on a whole split:
//
//   Step 1: checkpoint → evaluation mode
//   Step 2: load the split (test by default)
//   Step 3: batched loss / accuracy
//   Step 4: optionally append the result to the metrics CSV

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::dataset::MnistDataset;
use crate::domain::split::Split;
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::{evaluator::EvalReport, inferencer::Inferencer, model::ModelConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    pub checkpoint:   PathBuf,
    pub data_dir:     PathBuf,
    pub split:        Split,
    pub batch_size:   usize,
    pub download:     bool,
    pub metrics_dir:  Option<PathBuf>,
    pub num_channels: usize,
    pub num_classes:  usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            checkpoint:   PathBuf::from("trained_model.pt"),
            data_dir:     PathBuf::from("./data/mnist/"),
            split:        Split::Test,
            batch_size:   128,
            download:     true,
            metrics_dir:  None,
            num_channels: 1,
            num_classes:  10,
        }
    }
}

pub struct EvaluateUseCase {
    config: EvalConfig,
}

impl EvaluateUseCase {
    pub fn new(config: EvalConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<EvalReport> {
        let cfg = &self.config;

        let ckpt = CheckpointManager::new(&cfg.checkpoint);
        let fallback = ModelConfig::new()
            .with_num_channels(cfg.num_channels)
            .with_num_classes(cfg.num_classes);
        let inferencer = Inferencer::from_checkpoint(&ckpt, fallback)?;

        let dataset = MnistDataset::load(&cfg.data_dir, cfg.split, cfg.download)?;

        tracing::info!("Evaluating on the {} split (batch size {})", cfg.split, cfg.batch_size);
        let report = inferencer.evaluate(dataset, cfg.batch_size)?;
        tracing::info!(
            "{}/{} correct, mean loss {:.4}",
            report.correct,
            report.samples,
            report.mean_loss
        );

        if let Some(dir) = &cfg.metrics_dir {
            let logger = MetricsLogger::new(dir)?;
            logger.log(&cfg.checkpoint.display().to_string(), cfg.split, &report)?;
            tracing::info!("Metrics appended to '{}'", logger.csv_path().display());
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{
        download::raw_dir,
        idx::{encode_images, encode_labels},
    };
    use crate::domain::sample::IMAGE_PIXELS;
    use crate::ml::{model::CnnMnist, InferBackend, InferDevice};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_evaluates_local_split_and_logs_metrics() {
        let tmp = TempDir::new().unwrap();

        let model: CnnMnist<InferBackend> = ModelConfig::new().init(&InferDevice::default());
        let ckpt_path = tmp.path().join("round_1");
        CheckpointManager::new(&ckpt_path).save_model(&model).unwrap();

        let raw = raw_dir(&tmp.path().join("data"));
        fs::create_dir_all(&raw).unwrap();
        let images: Vec<Vec<u8>> = (0..5).map(|i| vec![i as u8 * 40; IMAGE_PIXELS]).collect();
        fs::write(raw.join(Split::Test.images_file()), encode_images(28, 28, &images)).unwrap();
        fs::write(raw.join(Split::Test.labels_file()), encode_labels(&[7, 2, 1, 0, 4])).unwrap();

        let cfg = EvalConfig {
            checkpoint:  ckpt_path,
            data_dir:    tmp.path().join("data"),
            batch_size:  2,
            download:    false,
            metrics_dir: Some(tmp.path().join("metrics")),
            ..Default::default()
        };
        let report = EvaluateUseCase::new(cfg).execute().unwrap();

        assert_eq!(report.samples, 5);
        let csv = fs::read_to_string(tmp.path().join("metrics").join("eval_metrics.csv")).unwrap();
        assert_eq!(csv.lines().count(), 2);
    }
}
