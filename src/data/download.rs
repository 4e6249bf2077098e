// ============================================================
// Layer 4 - Dataset Downloader
// ============================================================
// Makes sure the raw IDX files of a split exist on disk,
// fetching the gzip archives from a mirror when they don't.
//
// Layout (same as torchvision, so an existing download is reused):
//
//   <root>/MNIST/raw/train-images-idx3-ubyte
//   <root>/MNIST/raw/train-labels-idx1-ubyte
//   <root>/MNIST/raw/t10k-images-idx3-ubyte
//   <root>/MNIST/raw/t10k-labels-idx1-ubyte
//
// A file only appears under its final name after it has been
// fully downloaded and decompressed (.part files are renamed),
// so presence of the final name means "complete". Present files
// are never fetched again.

use anyhow::{bail, Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::split::Split;

/// Mirrors tried in order for every archive
pub const MNIST_MIRRORS: [&str; 2] = [
    "https://ossci-datasets.s3.amazonaws.com/mnist/",
    "http://yann.lecun.com/exdb/mnist/",
];

/// Directory holding the uncompressed IDX files under `root`
pub fn raw_dir(root: &Path) -> PathBuf {
    root.join("MNIST").join("raw")
}

/// Files of `split` that are not yet in `raw_dir`
pub fn missing_files(raw_dir: &Path, split: Split) -> Vec<&'static str> {
    split
        .files()
        .into_iter()
        .filter(|name| !raw_dir.join(name).is_file())
        .collect()
}

/// Ensure both files of `split` exist, downloading the missing ones
/// when `download` is set. Returns how many files were fetched.
pub fn ensure_split(raw_dir: &Path, split: Split, download: bool) -> Result<usize> {
    let missing = missing_files(raw_dir, split);
    if missing.is_empty() {
        tracing::debug!("MNIST {} files already present in '{}'", split, raw_dir.display());
        return Ok(0);
    }

    if !download {
        bail!(
            "MNIST file '{}' not found in '{}' and downloading is disabled",
            missing[0],
            raw_dir.display()
        );
    }

    fs::create_dir_all(raw_dir)
        .with_context(|| format!("Cannot create dataset directory '{}'", raw_dir.display()))?;

    let downloader = Downloader::new(MNIST_MIRRORS.iter().map(|m| m.to_string()).collect())?;
    for name in &missing {
        downloader.fetch(raw_dir, name)?;
    }
    Ok(missing.len())
}

pub struct Downloader {
    mirrors: Vec<String>,
    #[cfg(feature = "download")]
    client: reqwest::blocking::Client,
}

impl Downloader {
    #[cfg(feature = "download")]
    pub fn new(mirrors: Vec<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .user_agent(concat!("fedmnist-eval/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Cannot build HTTP client")?;
        Ok(Self { mirrors, client })
    }

    #[cfg(not(feature = "download"))]
    pub fn new(mirrors: Vec<String>) -> Result<Self> {
        Ok(Self { mirrors })
    }

    /// Fetch `<name>.gz` from the first mirror that serves it and
    /// decompress it to `raw_dir/<name>`.
    pub fn fetch(&self, raw_dir: &Path, name: &str) -> Result<()> {
        if self.mirrors.is_empty() {
            bail!("No download mirrors configured for '{name}'");
        }

        let archive = raw_dir.join(format!("{name}.gz"));
        let mut last_err = None;

        for mirror in &self.mirrors {
            let url = format!("{mirror}{name}.gz");
            tracing::info!("Downloading {}", url);
            match self.download_file(&url, &archive) {
                Ok(()) => {
                    last_err = None;
                    break;
                }
                Err(e) => {
                    tracing::warn!("Failed to download {}: {:#}", url, e);
                    last_err = Some(e);
                }
            }
        }
        if let Some(e) = last_err {
            return Err(e.context(format!("No mirror could provide '{name}.gz'")));
        }

        let dest = raw_dir.join(name);
        let result = extract_gzip(&archive, &dest);
        // The archive is only an intermediate
        discard(&archive);
        result?;

        tracing::info!("Extracted '{}'", dest.display());
        Ok(())
    }

    #[cfg(feature = "download")]
    fn download_file(&self, url: &str, dest: &Path) -> Result<()> {
        let mut response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("Server rejected {url}"))?;

        let part = part_path(dest);
        let mut file = fs::File::create(&part)
            .with_context(|| format!("Cannot create '{}'", part.display()))?;
        let written = response.copy_to(&mut file);
        drop(file);

        match written {
            Ok(bytes) => {
                tracing::debug!("Received {} bytes from {}", bytes, url);
                fs::rename(&part, dest)
                    .with_context(|| format!("Cannot move download to '{}'", dest.display()))
            }
            Err(e) => {
                discard(&part);
                Err(anyhow::Error::new(e).context(format!("Download of {url} interrupted")))
            }
        }
    }

    #[cfg(not(feature = "download"))]
    fn download_file(&self, url: &str, _dest: &Path) -> Result<()> {
        bail!("Cannot fetch {url}: built without the 'download' feature")
    }
}

/// Remove an intermediate file. A file that is already gone is fine;
/// any other failure is logged and left for the user to clean up.
fn discard(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Could not remove '{}': {}", path.display(), e),
    }
}

/// Sibling path used while a file is being written
fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

/// Decompress a gzip file to `dest` via a `.part` file.
#[cfg(feature = "download")]
pub fn extract_gzip(archive: &Path, dest: &Path) -> Result<()> {
    use flate2::read::GzDecoder;

    let input = fs::File::open(archive)
        .with_context(|| format!("Cannot open '{}'", archive.display()))?;
    let mut decoder = GzDecoder::new(input);

    let part = part_path(dest);
    let mut output = fs::File::create(&part)
        .with_context(|| format!("Cannot create '{}'", part.display()))?;
    if let Err(e) = std::io::copy(&mut decoder, &mut output) {
        drop(output);
        discard(&part);
        return Err(anyhow::Error::new(e)
            .context(format!("Cannot decompress '{}'", archive.display())));
    }
    drop(output);

    fs::rename(&part, dest)
        .with_context(|| format!("Cannot move '{}' into place", dest.display()))
}

#[cfg(not(feature = "download"))]
pub fn extract_gzip(archive: &Path, _dest: &Path) -> Result<()> {
    bail!("Cannot decompress '{}': built without the 'download' feature", archive.display())
}
