// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust types shared by every other layer.
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O or network calls
//   - Only structs, enums, and traits

/// A preprocessed (image, label) pair
pub mod sample;

/// Train / test split and its file names
pub mod split;

/// Abstractions the application layer programs against
pub mod traits;
