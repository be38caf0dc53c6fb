//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//!
//! [`Hasher`] computes fixed-width BLAKE3 digests over a byte range of a file:
//! either the head window ([`HEAD_SIZE`] bytes) or the whole content. The
//! algorithm is the same on every platform, so digests are comparable across
//! runs and machines.
//!
//! # Example
//!
//! ```no_run
//! use dupetrim::scanner::{hash_to_hex, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let digest = hasher.full_hash(Path::new("photo.jpg")).unwrap();
//! println!("{}", hash_to_hex(&digest));
//! ```

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use super::HashError;

/// Size of the head window hashed in the second funnel stage.
pub const HEAD_SIZE: u64 = 32 * 1024;

/// A 32-byte BLAKE3 digest.
pub type Hash = [u8; 32];

/// Stateless BLAKE3 file hasher.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hasher;

impl Hasher {
    /// Create a new hasher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Hash the first `min(size, HEAD_SIZE)` bytes of a file.
    ///
    /// `size` is the size recorded at scan time. A file that shrank since
    /// then simply yields a digest over fewer bytes, which cannot collide
    /// with an unchanged copy of the original.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    pub fn head_hash(&self, path: &Path, size: u64) -> Result<Hash, HashError> {
        let file = open(path)?;
        let limit = size.min(HEAD_SIZE);
        let mut hasher = blake3::Hasher::new();
        hasher
            .update_reader(file.take(limit))
            .map_err(|e| map_io_error(path, e))?;
        Ok(*hasher.finalize().as_bytes())
    }

    /// Hash the entire content of a file.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    pub fn full_hash(&self, path: &Path) -> Result<Hash, HashError> {
        let file = open(path)?;
        let mut hasher = blake3::Hasher::new();
        hasher
            .update_reader(file)
            .map_err(|e| map_io_error(path, e))?;
        Ok(*hasher.finalize().as_bytes())
    }
}

fn open(path: &Path) -> Result<File, HashError> {
    File::open(path).map_err(|e| map_io_error(path, e))
}

fn map_io_error(path: &Path, error: io::Error) -> HashError {
    match error.kind() {
        io::ErrorKind::NotFound => HashError::NotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => HashError::PermissionDenied(path.to_path_buf()),
        _ => HashError::Io {
            path: path.to_path_buf(),
            source: error,
        },
    }
}

/// Render a digest as lowercase hexadecimal (64 characters).
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    blake3::Hash::from_bytes(*hash).to_hex().to_string()
}
