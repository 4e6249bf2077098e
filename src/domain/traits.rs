// ============================================================
// Layer 3 - Core Traits
// ============================================================
// The application layer only needs "something that hands out
// labelled samples by index". MnistDataset is the production
// implementation; tests use small in-memory sources.

use anyhow::Result;

use crate::domain::sample::MnistSample;

// ─── SampleSource ─────────────────────────────────────────────────────────────
/// Any indexed collection of preprocessed samples.
pub trait SampleSource {
    /// Number of samples available
    fn sample_count(&self) -> usize;

    /// Fetch the sample at `index`.
    /// Returns an error when the index is out of range.
    fn sample(&self, index: usize) -> Result<MnistSample>;
}

impl SampleSource for Vec<MnistSample> {
    fn sample_count(&self) -> usize {
        self.len()
    }

    fn sample(&self, index: usize) -> Result<MnistSample> {
        self.get(index).cloned().ok_or_else(|| {
            anyhow::anyhow!("index {index} out of range for {} samples", self.len())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample::IMAGE_PIXELS;

    #[test]
    fn test_vec_source_rejects_out_of_range() {
        let source = vec![MnistSample::new(vec![0.0; IMAGE_PIXELS], 3)];
        assert_eq!(source.sample_count(), 1);
        assert_eq!(source.sample(0).unwrap().label, 3);
        assert!(source.sample(1).is_err());
    }
}
