// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// Everything from the IDX files on disk to tensor batches:
//
//   mirrors (.gz)
//       │
//       ▼
//   download     → fetches + gunzips missing files
//       │
//       ▼
//   idx          → parses the big-endian IDX containers
//       │
//       ▼
//   transform    → ToTensor + Normalize(0.1307, 0.3081)
//       │
//       ▼
//   MnistDataset → implements Burn's Dataset trait
//       │
//       ▼
//   MnistBatcher → stacks samples into [N, 1, 28, 28] tensors

/// Fetches and decompresses missing MNIST files
pub mod download;

/// IDX container parsing
pub mod idx;

/// Fixed pixel normalisation
pub mod transform;

/// Implements Burn's Dataset trait for MNIST samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
