//! pcapglance core library for summarizing classic libpcap captures.
//!
//! The crate turns the bytes of a `.pcap` file into an immutable
//! [`CaptureFile`]: the global header fields plus a bounded list of packet
//! records, each with a timestamp, its lengths and a short hex preview of the
//! leading payload bytes. Decoding is pure and single-pass; file access is
//! isolated in `source`, and `export` renders a summary as JSON, CSV or
//! Markdown.
//!
//! Invariants:
//! - Only a short buffer or an unknown magic number fails a decode.
//! - The magic number fixes the byte order of every later field.
//! - At most `max_packets` real records are kept; reaching the limit appends a
//!   single [`LimitMarker`].
//!
//! # Examples
//! ```
//! use pcapglance_core::decode_capture;
//!
//! let mut bytes = vec![0xa1, 0xb2, 0xc3, 0xd4, 0x00, 0x02, 0x00, 0x04];
//! bytes.extend_from_slice(&[0u8; 8]);
//! bytes.extend_from_slice(&65535u32.to_be_bytes());
//! bytes.extend_from_slice(&1u32.to_be_bytes());
//!
//! let capture = decode_capture(&bytes)?;
//! assert_eq!(capture.header.version_major, 2);
//! assert_eq!(capture.packet_count(), 0);
//! # Ok::<(), pcapglance_core::DecodeError>(())
//! ```

use serde::{Deserialize, Serialize};

mod decode;
pub mod export;
mod source;

pub use decode::layout::{DEFAULT_MAX_PACKETS, DEFAULT_PREVIEW_BYTES};
pub use decode::{DecodeError, DecodeOptions, decode_capture, decode_capture_with};
pub use export::{ExportError, ExportFormat, RenderOptions, render};
pub use source::{
    CaptureSource, DEFAULT_MAX_FILE_BYTES, SourceError, SourceOptions, read_capture_file,
};

/// Byte order of every multi-byte field after the magic number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    /// Magic read big-endian as `0xA1B2C3D4`.
    BigEndian,
    /// Magic read big-endian as `0xD4C3B2A1`.
    LittleEndian,
}

/// Fields of the 24-byte libpcap global header.
///
/// # Examples
/// ```
/// use pcapglance_core::{ByteOrder, GlobalHeader};
///
/// let header = GlobalHeader {
///     magic_number: 0xa1b2c3d4,
///     byte_order: ByteOrder::BigEndian,
///     version_major: 2,
///     version_minor: 4,
///     timezone_offset: 0,
///     timestamp_accuracy: 0,
///     snapshot_length: 65535,
///     link_type: 1,
/// };
/// assert_eq!(header.snapshot_length, 65535);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalHeader {
    /// Magic number as read big-endian from offset 0.
    pub magic_number: u32,
    /// Byte order selected by the magic number.
    pub byte_order: ByteOrder,
    pub version_major: u16,
    pub version_minor: u16,
    /// `thiszone`, informational only.
    pub timezone_offset: u32,
    /// `sigfigs`, informational only.
    pub timestamp_accuracy: u32,
    /// `snaplen`: per-packet truncation limit declared by the capturing tool.
    pub snapshot_length: u32,
    /// `network`: link-layer header type, surfaced but not interpreted.
    pub link_type: u32,
}

/// One packet record from the capture.
///
/// # Examples
/// ```
/// use pcapglance_core::PacketRecord;
///
/// let record = PacketRecord {
///     sequence_index: 0,
///     timestamp_ms: 1_700_000_000_500,
///     timestamp: Some("2023-11-14T22:13:20.500Z".to_string()),
///     captured_length: 4,
///     original_length: 4,
///     leading_bytes_hex: "de ad be ef".to_string(),
///     truncated: false,
/// };
/// assert!(!record.truncated);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketRecord {
    /// Zero-based position in the capture.
    pub sequence_index: usize,
    /// Milliseconds since the Unix epoch (`sec * 1000 + usec / 1000`).
    pub timestamp_ms: u64,
    /// RFC3339 UTC rendering of `timestamp_ms` with millisecond precision.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// `incl_len`: bytes stored in the file for this packet.
    pub captured_length: u32,
    /// `orig_len`: bytes the packet had on the wire.
    pub original_length: u32,
    /// Lowercase, space-separated hex of the leading stored bytes.
    pub leading_bytes_hex: String,
    /// Set when `captured_length` runs past the end of the capture.
    pub truncated: bool,
}

/// Synthetic entry appended when the packet limit is reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitMarker {
    /// Position of the marker in the packet list.
    pub sequence_index: usize,
    /// Limit that stopped the decode.
    pub limit: usize,
    pub note: String,
}

/// Entry in the packet list of a [`CaptureFile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PacketEntry {
    Packet(PacketRecord),
    LimitReached(LimitMarker),
}

/// Decoded capture: global header plus packet entries in file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureFile {
    pub header: GlobalHeader,
    pub packets: Vec<PacketEntry>,
}

impl CaptureFile {
    /// Real packet records, skipping the limit marker.
    pub fn records(&self) -> impl Iterator<Item = &PacketRecord> {
        self.packets.iter().filter_map(|entry| match entry {
            PacketEntry::Packet(record) => Some(record),
            PacketEntry::LimitReached(_) => None,
        })
    }

    /// Number of real packet records.
    pub fn packet_count(&self) -> usize {
        self.records().count()
    }

    /// The limit marker, if the decode stopped at the packet limit.
    pub fn limit_marker(&self) -> Option<&LimitMarker> {
        self.packets.iter().find_map(|entry| match entry {
            PacketEntry::LimitReached(marker) => Some(marker),
            PacketEntry::Packet(_) => None,
        })
    }

    pub fn limit_reached(&self) -> bool {
        self.limit_marker().is_some()
    }

    /// Whether the capture ended in a record that runs past the buffer.
    pub fn is_truncated(&self) -> bool {
        self.records().last().is_some_and(|record| record.truncated)
    }
}
