use std::io::Read;

use super::SourceError;

pub const PCAPNG_MAGIC: [u8; 4] = [0x0a, 0x0d, 0x0d, 0x0a];

/// Read at most `limit` bytes, failing if the input holds more.
///
/// The check is done on the bytes actually read, so a file that grows after
/// it was stat'ed still cannot push the buffer past the limit.
///
/// # Examples
/// This helper is part of an internal module, so the example is marked as
/// text example.
/// ```text
/// use pcapglance_core::source::reader::read_limited;
/// use std::io::Cursor;
///
/// let bytes = read_limited(Cursor::new([1u8, 2, 3]), 3).unwrap();
/// assert_eq!(bytes, vec![1, 2, 3]);
/// ```
///
/// # Errors
/// Returns `SourceError::Io` on read failure and `SourceError::TooLarge` when
/// the input exceeds `limit`.
pub fn read_limited<R: Read>(reader: R, limit: u64) -> Result<Vec<u8>, SourceError> {
    let mut bytes = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut bytes)?;
    let size = bytes.len() as u64;
    if size > limit {
        return Err(SourceError::TooLarge { size, limit });
    }
    Ok(bytes)
}

/// Check whether the buffer starts with the PCAPNG section header magic.
pub fn is_pcapng_magic(bytes: &[u8]) -> bool {
    bytes.starts_with(&PCAPNG_MAGIC)
}

#[cfg(test)]
mod tests {
    use super::{is_pcapng_magic, read_limited};
    use crate::source::SourceError;
    use std::io::Cursor;

    #[test]
    fn read_limited_accepts_exact_size() {
        let bytes = read_limited(Cursor::new([1u8, 2, 3]), 3).unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[test]
    fn read_limited_rejects_oversized_input() {
        let err = read_limited(Cursor::new([0u8; 5]), 4).unwrap_err();
        assert!(matches!(err, SourceError::TooLarge { size: 5, limit: 4 }));
    }

    #[test]
    fn detect_pcapng_magic() {
        assert!(is_pcapng_magic(&[0x0a, 0x0d, 0x0d, 0x0a, 0x00]));
        assert!(!is_pcapng_magic(&[0xd4, 0xc3, 0xb2, 0xa1]));
        assert!(!is_pcapng_magic(&[0x0a, 0x0d]));
    }
}
