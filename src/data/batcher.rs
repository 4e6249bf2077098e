// ============================================================
// Layer 4 - MNIST Batcher
// ============================================================
// Implements Burn's Batcher trait to stack a Vec<MnistSample>
// into tensors the model can consume.
//
//   Input:  N samples, each 784 normalised pixels + a label
//   Output: images [N, 1, 28, 28] (float), targets [N] (int)
//
// The samples are already normalised, so batching is only a
// flatten + reshape.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::TensorData,
};

use crate::domain::sample::{MnistSample, IMAGE_CHANNELS, IMAGE_PIXELS, IMAGE_SIDE};

#[derive(Debug, Clone)]
pub struct MnistBatch<B: Backend> {
    /// shape: [batch_size, 1, 28, 28]
    pub images: Tensor<B, 4>,

    /// shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

#[derive(Clone, Debug)]
pub struct MnistBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> MnistBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<MnistSample, MnistBatch<B>> for MnistBatcher<B> {
    fn batch(&self, items: Vec<MnistSample>) -> MnistBatch<B> {
        let batch_size = items.len();

        let mut pixels = Vec::with_capacity(batch_size * IMAGE_PIXELS);
        for item in &items {
            pixels.extend_from_slice(&item.image);
        }
        let targets: Vec<i32> = items.iter().map(|s| s.label as i32).collect();

        let images = Tensor::<B, 4>::from_data(
            TensorData::new(pixels, [batch_size, IMAGE_CHANNELS, IMAGE_SIDE, IMAGE_SIDE]),
            &self.device,
        );
        let targets = Tensor::<B, 1, Int>::from_ints(targets.as_slice(), &self.device);

        MnistBatch { images, targets }
    }
}
