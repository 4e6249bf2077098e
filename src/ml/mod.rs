// ============================================================
// Layer 5 - ML / Model Layer (Burn)
// ============================================================
// All model code lives here:
//
//   model.rs      - the CNN whose weights the checkpoint holds
//   evaluator.rs  - batched loss/accuracy and single predictions
//   inferencer.rs - checkpoint -> evaluation-mode model
//
// Backends:
//   LoadBackend  = Autodiff<InferBackend>, what a freshly restored
//                  model lives on (training behaviour enabled)
//   InferBackend = ndarray on the CPU, or wgpu with the `wgpu`
//                  feature; evaluation-mode models live here

/// CNN architecture matching the checkpoint
pub mod model;

/// Loss / accuracy over a dataset
pub mod evaluator;

/// Loads a checkpoint and switches it to evaluation mode
pub mod inferencer;

#[cfg(not(feature = "wgpu"))]
pub type InferBackend = burn::backend::NdArray<f32>;
#[cfg(not(feature = "wgpu"))]
pub type InferDevice = burn::backend::ndarray::NdArrayDevice;

#[cfg(feature = "wgpu")]
pub type InferBackend = burn::backend::Wgpu;
#[cfg(feature = "wgpu")]
pub type InferDevice = burn::backend::wgpu::WgpuDevice;

pub type LoadBackend = burn::backend::Autodiff<InferBackend>;
