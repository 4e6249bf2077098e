// ============================================================
// Layer 3 - MnistSample Domain Type
// ============================================================
// One labelled MNIST image after preprocessing.
//
// The image is stored flat in row-major order with the logical
// shape [channels, rows, cols] = [1, 28, 28], exactly what
// ToTensor + Normalize produce for a grayscale digit.
//
// The Display impl prints the pair the same way a Python tuple
// of (tensor, int) reads:
//
//   (tensor([[[-0.4242, -0.4242, ...],
//             ...
//             [-0.4242, -0.4242, ...]]]), 5)

use std::fmt;

use serde::{Deserialize, Serialize};

/// MNIST digits are grayscale
pub const IMAGE_CHANNELS: usize = 1;

/// Image side length in pixels
pub const IMAGE_SIDE: usize = 28;

/// Number of pixels in one image
pub const IMAGE_PIXELS: usize = IMAGE_SIDE * IMAGE_SIDE;

/// Number of digit classes
pub const NUM_CLASSES: usize = 10;

/// A preprocessed (image, label) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MnistSample {
    /// Normalised pixel values, shape [1, 28, 28] flattened
    pub image: Vec<f32>,

    /// The digit shown in the image, 0..=9
    pub label: u8,
}

impl MnistSample {
    pub fn new(image: Vec<f32>, label: u8) -> Self {
        debug_assert_eq!(image.len(), IMAGE_PIXELS);
        Self { image, label }
    }
}

impl fmt::Display for MnistSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Continuation rows line up under the first '[' of the row data
        let indent = " ".repeat("(tensor([[".len());

        write!(f, "(tensor([[")?;
        for (r, row) in self.image.chunks(IMAGE_SIDE).enumerate() {
            if r > 0 {
                write!(f, ",\n{indent}")?;
            }
            write!(f, "[")?;
            for (c, v) in row.iter().enumerate() {
                if c > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{v:.4}")?;
            }
            write!(f, "]")?;
        }
        write!(f, "]]), {})", self.label)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_sample() -> MnistSample {
        let image = (0..IMAGE_PIXELS).map(|i| i as f32 / 1000.0).collect();
        MnistSample::new(image, 7)
    }

    #[test]
    fn test_display_rows_are_row_major() {
        let printed = ramp_sample().to_string();
        let second  = printed.lines().nth(1).unwrap().trim_start();
        // Row 1 starts at flat index 28
        assert!(second.starts_with("[0.0280, 0.0290"));
    }

    #[test]
    fn test_display_is_a_tuple_of_tensor_and_label() {
        let printed = ramp_sample().to_string();
        assert!(printed.starts_with("(tensor([[[0.0000, 0.0010"));
        assert!(printed.ends_with("]]]), 7)"));
        // One line per image row
        assert_eq!(printed.lines().count(), IMAGE_SIDE);
    }
}
