// ============================================================
// Layer 5 - Evaluator
// ============================================================
// Runs an eval-mode model over a dataset with Burn's DataLoader
// and accumulates loss and accuracy, plus single-sample
// prediction for the `show --predict` path.
//
// Loss is summed per sample and divided by the sample count at
// the end, so a short last batch is weighted correctly.

use anyhow::{bail, Result};
use burn::{
    data::{
        dataloader::{batcher::Batcher, DataLoaderBuilder},
        dataset::Dataset,
    },
    nn::loss::CrossEntropyLossConfig,
    prelude::*,
    tensor::activation::softmax,
};
use serde::{Deserialize, Serialize};

use crate::data::batcher::MnistBatcher;
use crate::domain::sample::MnistSample;
use crate::ml::model::CnnMnist;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    pub samples:   usize,
    pub correct:   usize,
    /// Mean cross-entropy per sample
    pub mean_loss: f64,
}

impl EvalReport {
    /// Fraction of samples classified correctly, 0.0 for an empty run
    pub fn accuracy(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.correct as f64 / self.samples as f64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub class:       usize,
    pub probability: f32,
}

pub fn evaluate<B, D>(
    model:      &CnnMnist<B>,
    dataset:    D,
    batch_size: usize,
    device:     &B::Device,
) -> Result<EvalReport>
where
    B: Backend,
    D: Dataset<MnistSample> + 'static,
{
    if batch_size == 0 {
        bail!("batch size must be at least 1");
    }
    if dataset.is_empty() {
        bail!("cannot evaluate on an empty dataset");
    }

    let loader = DataLoaderBuilder::new(MnistBatcher::<B>::new(device.clone()))
        .batch_size(batch_size)
        .num_workers(1)
        .build(dataset);

    let ce = CrossEntropyLossConfig::new().init(device);

    let mut loss_sum = 0.0f64;
    let mut correct  = 0usize;
    let mut samples  = 0usize;

    for batch in loader.iter() {
        let n      = batch.targets.dims()[0];
        let logits = model.forward(batch.images);

        let classes   = logits.dims()[1];
        let max_label = batch.targets.clone().max().into_scalar().elem::<i64>();
        if max_label as usize >= classes {
            bail!("label {max_label} is outside the model's {classes} output classes");
        }

        let batch_loss: f64 = ce
            .forward(logits.clone(), batch.targets.clone())
            .into_scalar()
            .elem::<f64>();
        loss_sum += batch_loss * n as f64;

        // argmax(1) returns [batch, 1]; flatten before comparing with [batch]
        let predicted = logits.argmax(1).flatten::<1>(0, 1);
        let hits: i64 = predicted
            .equal(batch.targets)
            .int()
            .sum()
            .into_scalar()
            .elem::<i64>();

        correct += hits as usize;
        samples += n;
        tracing::debug!("Evaluated {} samples so far", samples);
    }

    Ok(EvalReport {
        samples,
        correct,
        mean_loss: loss_sum / samples as f64,
    })
}

/// Classify a single sample, returning the arg-max class and its softmax probability
pub fn predict<B: Backend>(
    model:  &CnnMnist<B>,
    sample: &MnistSample,
    device: &B::Device,
) -> Result<Prediction> {
    let batch  = MnistBatcher::<B>::new(device.clone()).batch(vec![sample.clone()]);
    let logits = model.forward(batch.images);

    let probs: Vec<f32> = softmax(logits, 1)
        .into_data()
        .iter::<f32>()
        .collect();

    let (class, &probability) = probs
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .ok_or_else(|| anyhow::anyhow!("model produced no logits"))?;

    Ok(Prediction { class, probability })
}
