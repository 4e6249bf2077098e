// ============================================================
// Layer 4 - Image Transform
// ============================================================
// The fixed preprocessing pipeline applied to every MNIST image:
//
//   1. ToTensor   p -> p / 255            (bytes to [0, 1])
//   2. Normalize  x -> (x - mean) / std   (dataset statistics)
//
// mean and std are the published MNIST training-set statistics.

pub const MNIST_MEAN: f32 = 0.1307;
pub const MNIST_STD:  f32 = 0.3081;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalize {
    pub mean: f32,
    pub std:  f32,
}

impl Normalize {
    pub fn new(mean: f32, std: f32) -> Self {
        assert!(std > 0.0, "std must be positive");
        Self { mean, std }
    }

    /// Scale a raw byte to [0, 1]
    pub fn to_tensor_value(pixel: u8) -> f32 {
        pixel as f32 / 255.0
    }

    /// Apply ToTensor then Normalize to one pixel
    pub fn apply(&self, pixel: u8) -> f32 {
        (Self::to_tensor_value(pixel) - self.mean) / self.std
    }

    /// Apply the pipeline to a whole image
    pub fn apply_all(&self, pixels: &[u8]) -> Vec<f32> {
        pixels.iter().map(|&p| self.apply(p)).collect()
    }
}

impl Default for Normalize {
    fn default() -> Self {
        Self::new(MNIST_MEAN, MNIST_STD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_black_and_white_pixels() {
        let n = Normalize::default();
        assert!(close(n.apply(0), -0.4242));
        assert!(close(n.apply(255), 2.8215));
    }

    #[test]
    fn test_to_tensor_range() {
        assert_eq!(Normalize::to_tensor_value(0), 0.0);
        assert_eq!(Normalize::to_tensor_value(255), 1.0);
    }

    #[test]
    fn test_apply_all_preserves_order() {
        let n   = Normalize::new(0.0, 1.0);
        let out = n.apply_all(&[0, 51, 255]);
        assert!(close(out[0], 0.0));
        assert!(close(out[1], 0.2));
        assert!(close(out[2], 1.0));
    }

    #[test]
    #[should_panic]
    fn test_zero_std_is_rejected() {
        let _ = Normalize::new(0.5, 0.0);
    }
}
