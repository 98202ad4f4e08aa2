//! Perceptual image hashing for duplicate detection.
//!
//! This module provides the [`PerceptualHasher`], which decodes an image and
//! reduces it to a [`Fingerprint`] that stays stable under resizing and
//! recompression.
//!
//! Decoding happens in two steps. The primary decoder picks the format from
//! the file extension. If that fails, a fallback decoder sniffs the format
//! from the file content, which rescues files with a wrong extension. Only
//! when both fail is the file reported as a [`FailureReason`].

use std::path::Path;

use image::{DynamicImage, ImageError, ImageReader};
use image_hasher::{HashAlg, HasherConfig};
use serde::{Deserialize, Serialize};

use crate::duplicates::{FailureReason, Fingerprint};

/// Default hash edge length; 8x8 gives a 64-bit fingerprint.
pub const DEFAULT_HASH_SIZE: u32 = 8;

/// Smallest hash edge length accepted from the CLI or config.
pub const MIN_HASH_SIZE: u32 = 2;

/// Largest hash edge length accepted from the CLI or config.
pub const MAX_HASH_SIZE: u32 = 64;

/// Supported perceptual hashing algorithms.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PerceptualAlgorithm {
    /// pHash (Perceptual Hash) - DCT-based, most resilient to transformations.
    #[default]
    Phash,
    /// dHash (Difference Hash) - Gradient-based, very fast and effective.
    Dhash,
    /// aHash (Average Hash) - Mean-based, fast but less resilient.
    Ahash,
    /// Blockhash - block mean comparison, robust to small edits.
    Blockhash,
}

impl std::fmt::Display for PerceptualAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Phash => write!(f, "pHash"),
            Self::Dhash => write!(f, "dHash"),
            Self::Ahash => write!(f, "aHash"),
            Self::Blockhash => write!(f, "blockhash"),
        }
    }
}

/// Computes perceptual fingerprints for images.
pub struct PerceptualHasher {
    hasher: image_hasher::Hasher,
    algorithm: PerceptualAlgorithm,
    hash_size: u32,
}

impl std::fmt::Debug for PerceptualHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerceptualHasher")
            .field("algorithm", &self.algorithm)
            .field("hash_size", &self.hash_size)
            .finish()
    }
}

impl PerceptualHasher {
    /// Create a new `PerceptualHasher` with the given algorithm and the
    /// default 8x8 hash size.
    #[must_use]
    pub fn new(algorithm: PerceptualAlgorithm) -> Self {
        Self::with_hash_size(algorithm, DEFAULT_HASH_SIZE)
    }

    /// Create a hasher producing `hash_size * hash_size`-bit fingerprints.
    ///
    /// A size of zero is raised to one.
    #[must_use]
    pub fn with_hash_size(algorithm: PerceptualAlgorithm, hash_size: u32) -> Self {
        let hash_size = hash_size.max(1);
        let mut config = HasherConfig::new().hash_size(hash_size, hash_size);

        match algorithm {
            PerceptualAlgorithm::Phash => {
                config = config.hash_alg(HashAlg::Median).preproc_dct();
            }
            PerceptualAlgorithm::Dhash => {
                config = config.hash_alg(HashAlg::Gradient);
            }
            PerceptualAlgorithm::Ahash => {
                config = config.hash_alg(HashAlg::Mean);
            }
            PerceptualAlgorithm::Blockhash => {
                config = config.hash_alg(HashAlg::Blockhash);
            }
        }

        Self {
            hasher: config.to_hasher(),
            algorithm,
            hash_size,
        }
    }

    /// Decode the image at `path` and compute its fingerprint.
    ///
    /// # Errors
    ///
    /// Returns the [`FailureReason`] of the last decode attempt when neither
    /// the primary nor the fallback decoder can read the file.
    pub fn fingerprint(&self, path: &Path) -> Result<Fingerprint, FailureReason> {
        let img = decode(path)?;
        let hash = self.hasher.hash_image(&img);
        Ok(Fingerprint::from_bytes(hash.as_bytes()))
    }

    /// Fingerprint an already decoded image.
    #[must_use]
    pub fn fingerprint_image(&self, img: &DynamicImage) -> Fingerprint {
        Fingerprint::from_bytes(self.hasher.hash_image(img).as_bytes())
    }

    /// Get the algorithm used by this hasher.
    #[must_use]
    pub fn algorithm(&self) -> PerceptualAlgorithm {
        self.algorithm
    }

    /// Edge length of the hash grid.
    #[must_use]
    pub fn hash_size(&self) -> u32 {
        self.hash_size
    }
}

impl Default for PerceptualHasher {
    fn default() -> Self {
        Self::new(PerceptualAlgorithm::Phash)
    }
}

/// Decode with the extension-based decoder, then with content sniffing.
fn decode(path: &Path) -> Result<DynamicImage, FailureReason> {
    match image::open(path) {
        Ok(img) => Ok(img),
        Err(ImageError::IoError(e)) => Err(FailureReason::Io(e.to_string())),
        Err(primary) => {
            log::debug!(
                "Primary decode failed for {}: {}; sniffing content",
                path.display(),
                primary
            );
            decode_sniffed(path)
        }
    }
}

fn decode_sniffed(path: &Path) -> Result<DynamicImage, FailureReason> {
    let reader = ImageReader::open(path)
        .map_err(|e| FailureReason::Io(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| FailureReason::Io(e.to_string()))?;

    if reader.format().is_none() {
        return Err(FailureReason::Unsupported(format!(
            "unrecognized image data in {}",
            path.display()
        )));
    }

    reader.decode().map_err(classify)
}

fn classify(err: ImageError) -> FailureReason {
    match err {
        ImageError::IoError(e) => FailureReason::Io(e.to_string()),
        ImageError::Unsupported(e) => FailureReason::Unsupported(e.to_string()),
        other => FailureReason::Decode(other.to_string()),
    }
}
