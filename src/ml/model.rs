use anyhow::{bail, Result};
use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        Dropout, DropoutConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::relu,
};

use crate::domain::sample::IMAGE_CHANNELS;

/// Channels after the second convolution
const CONV2_CHANNELS: usize = 20;
/// Spatial side after two conv(5) + pool(2) stages on a 28x28 input
const FEATURE_SIDE: usize = 4;
const FLAT_FEATURES: usize = CONV2_CHANNELS * FEATURE_SIDE * FEATURE_SIDE;
const HIDDEN: usize = 50;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct ModelConfig {
    #[config(default = 1)]
    pub num_channels: usize,
    #[config(default = 10)]
    pub num_classes:  usize,
    #[config(default = 0.5)]
    pub dropout:      f64,
}

impl ModelConfig {
    /// Reject architectures the MNIST pipeline cannot feed.
    /// Batches are always [N, 1, 28, 28], so conv1 must take one channel.
    pub fn validate(&self) -> Result<()> {
        if self.num_channels != IMAGE_CHANNELS {
            bail!(
                "num_channels is {}, but MNIST images have {IMAGE_CHANNELS} channel",
                self.num_channels
            );
        }
        if self.num_classes == 0 {
            bail!("num_classes must be at least 1");
        }
        if !(0.0..1.0).contains(&self.dropout) {
            bail!("dropout must be in [0, 1), got {}", self.dropout);
        }
        Ok(())
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> CnnMnist<B> {
        CnnMnist {
            conv1:   Conv2dConfig::new([self.num_channels, 10], [5, 5]).init(device),
            conv2:   Conv2dConfig::new([10, CONV2_CHANNELS], [5, 5]).init(device),
            pool:    MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            dropout: DropoutConfig::new(self.dropout).init(),
            fc1:     LinearConfig::new(FLAT_FEATURES, HIDDEN).init(device),
            fc2:     LinearConfig::new(HIDDEN, self.num_classes).init(device),
        }
    }
}

/// Two-layer CNN the federated run checkpoints.
/// Field names match the PyTorch state dict keys (conv1, conv2, fc1, fc2)
/// so a `.pt` checkpoint maps onto it without remapping.
#[derive(Module, Debug)]
pub struct CnnMnist<B: Backend> {
    pub conv1:   Conv2d<B>,
    pub conv2:   Conv2d<B>,
    pub pool:    MaxPool2d,
    pub dropout: Dropout,
    pub fc1:     Linear<B>,
    pub fc2:     Linear<B>,
}

impl<B: Backend> CnnMnist<B> {
    /// images: [batch, channels, 28, 28] → logits: [batch, num_classes]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let [batch_size, _, _, _] = images.dims();

        let x = relu(self.pool.forward(self.conv1.forward(images)));
        // Dropout is the identity once the model is on a non-autodiff backend
        let x = relu(self.pool.forward(self.dropout.forward(self.conv2.forward(x))));

        let x = x.reshape([batch_size, FLAT_FEATURES]);
        let x = self.dropout.forward(relu(self.fc1.forward(x)));
        self.fc2.forward(x)
    }
}
