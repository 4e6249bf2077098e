// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
//   checkpoint.rs - reads PyTorch state dicts and Burn records,
//                   writes Burn records, keeps the architecture
//                   sidecar (model_config.json)
//
//   metrics.rs    - appends evaluation results to a CSV file

/// Model checkpoint loading and saving
pub mod checkpoint;

/// Evaluation metrics CSV logger
pub mod metrics;
