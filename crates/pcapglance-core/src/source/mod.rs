//! Capture file acquisition.
//!
//! Reads a capture from disk into memory under a size limit and hands the
//! bytes to the decoder. All filesystem access in the crate lives here.

pub mod reader;

use std::fs::File;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::CaptureFile;
use crate::decode::{DecodeError, DecodeOptions, decode_capture_with};

/// Size limit applied when the caller does not pick one.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("capture is {size} bytes, larger than the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },
    #[error("pcapng captures are not supported, only classic libpcap")]
    Pcapng,
    #[error("{0}")]
    Decode(#[from] DecodeError),
}

/// Limits applied when loading and decoding a capture file.
///
/// # Examples
/// ```
/// use pcapglance_core::SourceOptions;
///
/// let options = SourceOptions::default();
/// assert_eq!(options.max_file_bytes, 10 * 1024 * 1024);
/// assert_eq!(options.decode.max_packets, 5000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceOptions {
    pub max_file_bytes: u64,
    pub decode: DecodeOptions,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            decode: DecodeOptions::default(),
        }
    }
}

/// A capture file loaded into memory.
#[derive(Debug)]
pub struct CaptureSource {
    path: PathBuf,
    bytes: Vec<u8>,
}

impl CaptureSource {
    /// Load `path`, refusing files larger than `max_bytes`.
    ///
    /// # Errors
    /// Returns `SourceError::Io` when the file cannot be read and
    /// `SourceError::TooLarge` when it exceeds `max_bytes`.
    pub fn open(path: &Path, max_bytes: u64) -> Result<Self, SourceError> {
        let size = path.metadata()?.len();
        if size > max_bytes {
            return Err(SourceError::TooLarge {
                size,
                limit: max_bytes,
            });
        }
        let bytes = reader::read_limited(File::open(path)?, max_bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "capture loaded");
        Ok(Self {
            path: path.to_path_buf(),
            bytes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decode the loaded bytes.
    ///
    /// # Errors
    /// Returns `SourceError::Pcapng` for pcapng input and
    /// `SourceError::Decode` for any other structural failure.
    pub fn decode(&self, options: &DecodeOptions) -> Result<CaptureFile, SourceError> {
        match decode_capture_with(&self.bytes, options) {
            Ok(capture) => Ok(capture),
            Err(DecodeError::UnknownMagic { .. }) if reader::is_pcapng_magic(&self.bytes) => {
                Err(SourceError::Pcapng)
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Load and decode a capture file in one step.
///
/// # Examples
/// ```no_run
/// use std::path::Path;
///
/// use pcapglance_core::{SourceOptions, read_capture_file};
///
/// let capture = read_capture_file(Path::new("capture.pcap"), &SourceOptions::default())?;
/// println!("packets: {}", capture.packet_count());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Errors
/// See [`CaptureSource::open`] and [`CaptureSource::decode`].
pub fn read_capture_file(path: &Path, options: &SourceOptions) -> Result<CaptureFile, SourceError> {
    CaptureSource::open(path, options.max_file_bytes)?.decode(&options.decode)
}
