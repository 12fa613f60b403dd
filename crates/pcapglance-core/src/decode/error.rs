use thiserror::Error;

/// Structural errors returned before any packet record is read.
///
/// # Examples
/// ```
/// use pcapglance_core::DecodeError;
///
/// let err = DecodeError::UnknownMagic { value: 0x0a0d0d0a };
/// assert!(err.to_string().contains("not a PCAP file"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("capture too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("not a PCAP file: unknown magic number 0x{value:08x}")]
    UnknownMagic { value: u32 },
}
