use super::error::DecodeError;
use super::layout;
use crate::ByteOrder;

/// Bounds-checked access to a capture buffer in a fixed byte order.
///
/// Every multi-byte read goes through the byte order chosen from the magic
/// number; the host's native order is never consulted.
pub struct CaptureReader<'a> {
    data: &'a [u8],
    order: ByteOrder,
}

impl<'a> CaptureReader<'a> {
    pub fn new(data: &'a [u8], order: ByteOrder) -> Self {
        Self { data, order }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    /// Bytes left in the buffer from `offset` onward (zero past the end).
    pub fn remaining(&self, offset: usize) -> usize {
        self.data.len().saturating_sub(offset)
    }

    pub fn read_slice(&self, range: std::ops::Range<usize>) -> Result<&'a [u8], DecodeError> {
        self.data.get(range.clone()).ok_or(DecodeError::TooShort {
            needed: range.end,
            actual: self.data.len(),
        })
    }

    pub fn read_u16(&self, range: std::ops::Range<usize>) -> Result<u16, DecodeError> {
        let bytes: [u8; 2] = self.read_array(range)?;
        Ok(match self.order {
            ByteOrder::BigEndian => u16::from_be_bytes(bytes),
            ByteOrder::LittleEndian => u16::from_le_bytes(bytes),
        })
    }

    pub fn read_u32(&self, range: std::ops::Range<usize>) -> Result<u32, DecodeError> {
        let bytes: [u8; 4] = self.read_array(range)?;
        Ok(match self.order {
            ByteOrder::BigEndian => u32::from_be_bytes(bytes),
            ByteOrder::LittleEndian => u32::from_le_bytes(bytes),
        })
    }

    /// Read a `u32` at `offset`, guarding the `offset + 4` addition.
    pub fn read_u32_at(&self, offset: usize) -> Result<u32, DecodeError> {
        let end = offset.checked_add(4).ok_or(DecodeError::TooShort {
            needed: usize::MAX,
            actual: self.data.len(),
        })?;
        self.read_u32(offset..end)
    }

    fn read_array<const N: usize>(
        &self,
        range: std::ops::Range<usize>,
    ) -> Result<[u8; N], DecodeError> {
        let bytes = self.read_slice(range)?;
        bytes.try_into().map_err(|_| DecodeError::TooShort {
            needed: N,
            actual: bytes.len(),
        })
    }
}

/// Read the magic number big-endian and map it to a byte order.
///
/// # Examples
/// This helper is part of an internal module, so the example is marked as
/// text example.
/// ```text
/// use pcapglance_core::decode::reader::detect_byte_order;
/// use pcapglance_core::ByteOrder;
///
/// let data = [0xd4, 0xc3, 0xb2, 0xa1];
/// assert_eq!(detect_byte_order(&data).unwrap(), (0xd4c3b2a1, ByteOrder::LittleEndian));
/// ```
pub fn detect_byte_order(data: &[u8]) -> Result<(u32, ByteOrder), DecodeError> {
    let magic = CaptureReader::new(data, ByteOrder::BigEndian).read_u32(layout::MAGIC_RANGE)?;
    match magic {
        layout::MAGIC_BIG_ENDIAN => Ok((magic, ByteOrder::BigEndian)),
        layout::MAGIC_LITTLE_ENDIAN => Ok((magic, ByteOrder::LittleEndian)),
        value => Err(DecodeError::UnknownMagic { value }),
    }
}

/// Lowercase, space-separated hex of `bytes`.
pub fn hex_preview(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
