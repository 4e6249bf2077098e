// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// Orchestrates the other layers for one goal each.
//
// Rules for this layer:
//   - No model math here
//   - No printing here (that's Layer 1)
//   - Only workflow coordination

/// Load checkpoint, load MNIST, hand back one sample
pub mod show_use_case;

/// Score a checkpoint on a whole split
pub mod evaluate_use_case;

/// Re-save a checkpoint as a native Burn record
pub mod convert_use_case;
