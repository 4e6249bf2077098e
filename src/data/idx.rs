// ============================================================
// Layer 4 - IDX File Parser
// ============================================================
// MNIST is distributed in the IDX format: a big-endian header
// followed by raw unsigned bytes.
//
//   images (idx3):  magic 2051 | count | rows | cols | pixels...
//   labels (idx1):  magic 2049 | count | labels...
//
// Parsing works on an in-memory byte slice so it can be tested
// without touching the filesystem.

use thiserror::Error;

use crate::domain::sample::NUM_CLASSES;

pub const IMAGES_MAGIC: u32 = 2051;
pub const LABELS_MAGIC: u32 = 2049;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdxError {
    #[error("expected magic number {expected}, found {found}")]
    BadMagic { expected: u32, found: u32 },

    #[error("file truncated: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("label {label} at index {index} is not a digit")]
    LabelOutOfRange { index: usize, label: u8 },

    #[error("header dimensions {dims:?} are too large to address")]
    TooLarge { dims: Vec<u32> },
}

/// Raw image payload of an idx3 file
#[derive(Debug, Clone)]
pub struct IdxImages {
    pub count:  usize,
    pub rows:   usize,
    pub cols:   usize,
    pub pixels: Vec<u8>,
}

fn read_u32(bytes: &[u8], offset: usize) -> Result<u32, IdxError> {
    let word = bytes.get(offset..offset + 4).ok_or(IdxError::Truncated {
        needed:    offset + 4,
        available: bytes.len(),
    })?;
    Ok(u32::from_be_bytes([word[0], word[1], word[2], word[3]]))
}

fn check_magic(bytes: &[u8], expected: u32) -> Result<(), IdxError> {
    let found = read_u32(bytes, 0)?;
    if found != expected {
        return Err(IdxError::BadMagic { expected, found });
    }
    Ok(())
}

/// Header size plus the product of `dims`, or `TooLarge` on overflow
fn payload_end(header: usize, dims: &[u32]) -> Result<usize, IdxError> {
    dims.iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d as usize))
        .and_then(|n| n.checked_add(header))
        .ok_or_else(|| IdxError::TooLarge { dims: dims.to_vec() })
}

/// Parse an idx3 image file.
pub fn parse_images(bytes: &[u8]) -> Result<IdxImages, IdxError> {
    check_magic(bytes, IMAGES_MAGIC)?;
    let count = read_u32(bytes, 4)?;
    let rows  = read_u32(bytes, 8)?;
    let cols  = read_u32(bytes, 12)?;

    let header = 16;
    let needed = payload_end(header, &[count, rows, cols])?;
    if bytes.len() < needed {
        return Err(IdxError::Truncated { needed, available: bytes.len() });
    }

    Ok(IdxImages {
        count:  count as usize,
        rows:   rows as usize,
        cols:   cols as usize,
        pixels: bytes[header..needed].to_vec(),
    })
}

/// Parse an idx1 label file, checking every label is a digit.
pub fn parse_labels(bytes: &[u8]) -> Result<Vec<u8>, IdxError> {
    check_magic(bytes, LABELS_MAGIC)?;
    let count = read_u32(bytes, 4)?;

    let header = 8;
    let needed = payload_end(header, &[count])?;
    if bytes.len() < needed {
        return Err(IdxError::Truncated { needed, available: bytes.len() });
    }

    let labels = bytes[header..needed].to_vec();
    if let Some((index, &label)) = labels
        .iter()
        .enumerate()
        .find(|&(_, &l)| l as usize >= NUM_CLASSES)
    {
        return Err(IdxError::LabelOutOfRange { index, label });
    }
    Ok(labels)
}

/// Encode images in idx3 layout. Inverse of `parse_images`.
#[cfg(test)]
pub fn encode_images(rows: usize, cols: usize, images: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&IMAGES_MAGIC.to_be_bytes());
    out.extend_from_slice(&(images.len() as u32).to_be_bytes());
    out.extend_from_slice(&(rows as u32).to_be_bytes());
    out.extend_from_slice(&(cols as u32).to_be_bytes());
    for img in images {
        out.extend_from_slice(img);
    }
    out
}

/// Encode labels in idx1 layout. Inverse of `parse_labels`.
#[cfg(test)]
pub fn encode_labels(labels: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&LABELS_MAGIC.to_be_bytes());
    out.extend_from_slice(&(labels.len() as u32).to_be_bytes());
    out.extend_from_slice(labels);
    out
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_header_and_pixels() {
        let bytes  = encode_images(2, 3, &[vec![1, 2, 3, 4, 5, 6], vec![9; 6]]);
        let images = parse_images(&bytes).unwrap();
        assert_eq!(images.count, 2);
        assert_eq!((images.rows, images.cols), (2, 3));
        assert_eq!(&images.pixels[..6], &[1, 2, 3, 4, 5, 6]);
        assert_eq!(&images.pixels[6..], &[9; 6]);
    }

    #[test]
    fn test_rejects_label_file_as_images() {
        let bytes = encode_labels(&[1, 2, 3]);
        assert_eq!(
            parse_images(&bytes).unwrap_err(),
            IdxError::BadMagic { expected: IMAGES_MAGIC, found: LABELS_MAGIC }
        );
    }

    #[test]
    fn test_truncated_pixels() {
        let mut bytes = encode_images(2, 2, &[vec![0; 4], vec![0; 4]]);
        bytes.pop();
        assert!(matches!(
            parse_images(&bytes),
            Err(IdxError::Truncated { needed: 24, available: 23 })
        ));
    }

    #[test]
    fn test_overflowing_dimensions_are_rejected() {
        let mut bytes = IMAGES_MAGIC.to_be_bytes().to_vec();
        for _ in 0..3 {
            bytes.extend_from_slice(&u32::MAX.to_be_bytes());
        }
        assert_eq!(
            parse_images(&bytes).unwrap_err(),
            IdxError::TooLarge { dims: vec![u32::MAX; 3] }
        );
    }

    #[test]
    fn test_huge_count_on_short_file_is_truncated() {
        // Fits in usize but the payload isn't there
        let mut bytes = LABELS_MAGIC.to_be_bytes().to_vec();
        bytes.extend_from_slice(&u32::MAX.to_be_bytes());
        assert!(matches!(parse_labels(&bytes), Err(IdxError::Truncated { .. })));
    }

    #[test]
    fn test_truncated_header() {
        assert!(matches!(parse_labels(&[0, 0]), Err(IdxError::Truncated { .. })));
    }

    #[test]
    fn test_labels_must_be_digits() {
        let bytes = encode_labels(&[0, 9, 10]);
        assert_eq!(
            parse_labels(&bytes).unwrap_err(),
            IdxError::LabelOutOfRange { index: 2, label: 10 }
        );
    }

    #[test]
    fn test_trailing_bytes_are_ignored() {
        let mut bytes = encode_labels(&[4, 2]);
        bytes.extend_from_slice(&[0xff, 0xff]);
        assert_eq!(parse_labels(&bytes).unwrap(), vec![4, 2]);
    }
}
