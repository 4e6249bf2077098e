// ============================================================
// Layer 4 - MNIST Dataset
// ============================================================
// Maps an index to a preprocessed (image, label) pair.
//
// The raw bytes are kept as they are on disk (47 MB for the
// training split) and normalised on access, so memory use is a
// quarter of storing f32 images up front.
//
// Implements Burn's Dataset trait so the DataLoader can call
// .get(index) and .len() on it during evaluation.

use anyhow::{bail, Context, Result};
use burn::data::dataset::Dataset;
use std::{fmt, fs, path::Path};

use crate::data::{
    download::{ensure_split, raw_dir},
    idx::{parse_images, parse_labels},
    transform::Normalize,
};
use crate::domain::{
    sample::{MnistSample, IMAGE_SIDE},
    split::Split,
    traits::SampleSource,
};

pub struct MnistDataset {
    pixels:    Vec<u8>,
    labels:    Vec<u8>,
    normalize: Normalize,
    split:     Split,
}

impl MnistDataset {
    /// Load `split` from `<root>/MNIST/raw`, downloading it first
    /// when files are missing and `download` is set.
    pub fn load(root: impl AsRef<Path>, split: Split, download: bool) -> Result<Self> {
        let raw = raw_dir(root.as_ref());
        let fetched = ensure_split(&raw, split, download)?;
        if fetched > 0 {
            tracing::info!("Downloaded {} MNIST {} files", fetched, split);
        }
        Self::from_dir(&raw, split)
    }

    /// Load `split` from a directory that already holds the IDX files
    pub fn from_dir(raw_dir: &Path, split: Split) -> Result<Self> {
        let images_path = raw_dir.join(split.images_file());
        let labels_path = raw_dir.join(split.labels_file());

        let image_bytes = fs::read(&images_path)
            .with_context(|| format!("Cannot read '{}'", images_path.display()))?;
        let label_bytes = fs::read(&labels_path)
            .with_context(|| format!("Cannot read '{}'", labels_path.display()))?;

        let images = parse_images(&image_bytes)
            .with_context(|| format!("Invalid image file '{}'", images_path.display()))?;
        let labels = parse_labels(&label_bytes)
            .with_context(|| format!("Invalid label file '{}'", labels_path.display()))?;

        if images.rows != IMAGE_SIDE || images.cols != IMAGE_SIDE {
            bail!(
                "Expected {IMAGE_SIDE}x{IMAGE_SIDE} images, '{}' holds {}x{}",
                images_path.display(),
                images.rows,
                images.cols
            );
        }
        if images.count != labels.len() {
            bail!(
                "Image count {} doesn't match label count {} for the {} split",
                images.count,
                labels.len(),
                split
            );
        }
        if images.count != split.expected_len() {
            tracing::warn!(
                "MNIST {} split has {} items, expected {}",
                split,
                images.count,
                split.expected_len()
            );
        }

        tracing::info!("Loaded MNIST {} split: {} images", split, images.count);
        Ok(Self::from_raw(images.pixels, labels, split))
    }

    /// Build from raw 28x28 pixel bytes and labels
    pub fn from_raw(pixels: Vec<u8>, labels: Vec<u8>, split: Split) -> Self {
        debug_assert_eq!(pixels.len(), labels.len() * IMAGE_SIDE * IMAGE_SIDE);
        Self { pixels, labels, normalize: Normalize::default(), split }
    }
}

// Summarised: the pixel buffer of a full split is tens of megabytes
impl fmt::Debug for MnistDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MnistDataset")
            .field("split", &self.split)
            .field("len", &self.labels.len())
            .field("normalize", &self.normalize)
            .finish()
    }
}

impl Dataset<MnistSample> for MnistDataset {
    fn get(&self, index: usize) -> Option<MnistSample> {
        let label = *self.labels.get(index)?;
        let n     = IMAGE_SIDE * IMAGE_SIDE;
        let raw   = &self.pixels[index * n..(index + 1) * n];
        Some(MnistSample::new(self.normalize.apply_all(raw), label))
    }

    fn len(&self) -> usize {
        self.labels.len()
    }
}

impl SampleSource for MnistDataset {
    fn sample_count(&self) -> usize {
        self.len()
    }

    fn sample(&self, index: usize) -> Result<MnistSample> {
        self.get(index).with_context(|| {
            format!("Index {index} out of range for the {} split ({} items)", self.split, self.len())
        })
    }
}
