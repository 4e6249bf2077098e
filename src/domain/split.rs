// ============================================================
// Layer 3 - Dataset Split
// ============================================================
// MNIST ships as two splits. Each split is a pair of IDX files
// (images + labels) that live side by side in the raw directory.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    /// 60 000 training images
    Train,
    /// 10 000 test images
    Test,
}

impl Split {
    /// File name of the uncompressed image IDX file
    pub fn images_file(self) -> &'static str {
        match self {
            Split::Train => "train-images-idx3-ubyte",
            Split::Test  => "t10k-images-idx3-ubyte",
        }
    }

    /// File name of the uncompressed label IDX file
    pub fn labels_file(self) -> &'static str {
        match self {
            Split::Train => "train-labels-idx1-ubyte",
            Split::Test  => "t10k-labels-idx1-ubyte",
        }
    }

    pub fn files(self) -> [&'static str; 2] {
        [self.images_file(), self.labels_file()]
    }

    /// Item count of the published dataset
    pub fn expected_len(self) -> usize {
        match self {
            Split::Train => 60_000,
            Split::Test  => 10_000,
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Split::Train => write!(f, "train"),
            Split::Test  => write!(f, "test"),
        }
    }
}
