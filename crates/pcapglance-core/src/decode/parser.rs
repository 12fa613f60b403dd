use time::OffsetDateTime;
use time::macros::format_description;
use tracing::{debug, warn};

use super::error::DecodeError;
use super::layout;
use super::reader::{CaptureReader, detect_byte_order, hex_preview};
use crate::{CaptureFile, GlobalHeader, LimitMarker, PacketEntry, PacketRecord};

/// Tunables for a decode pass.
///
/// # Examples
/// ```
/// use pcapglance_core::DecodeOptions;
///
/// let options = DecodeOptions::default();
/// assert_eq!(options.max_packets, 5000);
/// assert_eq!(options.preview_bytes, 32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Real records kept before the limit marker is appended (minimum 1).
    pub max_packets: usize,
    /// Leading payload bytes rendered into `leading_bytes_hex`.
    pub preview_bytes: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_packets: layout::DEFAULT_MAX_PACKETS,
            preview_bytes: layout::DEFAULT_PREVIEW_BYTES,
        }
    }
}

struct RecordHeader {
    ts_sec: u32,
    ts_usec: u32,
    incl_len: u32,
    orig_len: u32,
}

/// Decode a classic libpcap capture with the default limits.
///
/// # Errors
/// Returns `DecodeError` when the buffer is shorter than the global header or
/// the magic number is not a libpcap magic. Damage after the header never
/// fails the call; it ends the packet list instead.
pub fn decode_capture(data: &[u8]) -> Result<CaptureFile, DecodeError> {
    decode_capture_with(data, &DecodeOptions::default())
}

/// Decode a classic libpcap capture with explicit limits.
///
/// # Errors
/// Same as [`decode_capture`].
pub fn decode_capture_with(
    data: &[u8],
    options: &DecodeOptions,
) -> Result<CaptureFile, DecodeError> {
    if data.len() < layout::GLOBAL_HEADER_LEN {
        return Err(DecodeError::TooShort {
            needed: layout::GLOBAL_HEADER_LEN,
            actual: data.len(),
        });
    }
    let (magic_number, byte_order) = detect_byte_order(data)?;
    let reader = CaptureReader::new(data, byte_order);
    let header = read_global_header(&reader, magic_number)?;
    debug!(
        ?byte_order,
        version_major = header.version_major,
        version_minor = header.version_minor,
        snaplen = header.snapshot_length,
        link_type = header.link_type,
        "pcap global header accepted"
    );

    let max_packets = options.max_packets.max(1);
    let snaplen = usize::try_from(header.snapshot_length).unwrap_or(usize::MAX);
    let mut packets = Vec::new();
    let mut offset = layout::GLOBAL_HEADER_LEN;

    while reader.remaining(offset) >= layout::RECORD_HEADER_LEN {
        let sequence_index = packets.len();
        let record = match read_record_header(&reader, offset) {
            Ok(record) => record,
            Err(err) => {
                warn!(offset, %err, "unreadable record header");
                break;
            }
        };
        let body_start = offset + layout::RECORD_HEADER_LEN;
        let captured = usize::try_from(record.incl_len).unwrap_or(usize::MAX);
        let body_end = body_start
            .checked_add(captured)
            .filter(|end| *end <= reader.len());

        let Some(body_end) = body_end else {
            warn!(
                sequence_index,
                offset,
                captured_length = record.incl_len,
                remaining = reader.remaining(body_start),
                "packet record runs past end of capture"
            );
            packets.push(PacketEntry::Packet(build_record(
                sequence_index,
                &record,
                String::new(),
                true,
            )));
            break;
        };

        let stored = captured.min(snaplen).min(options.preview_bytes);
        let preview = reader.read_slice(body_start..body_start + stored)?;
        packets.push(PacketEntry::Packet(build_record(
            sequence_index,
            &record,
            hex_preview(preview),
            false,
        )));
        offset = body_end;

        if packets.len() >= max_packets {
            warn!(limit = max_packets, offset, "packet limit reached");
            packets.push(PacketEntry::LimitReached(LimitMarker {
                sequence_index: packets.len(),
                limit: max_packets,
                note: format!("capture truncated for performance after {max_packets} packets"),
            }));
            break;
        }
    }

    debug!(entries = packets.len(), "pcap decode finished");
    Ok(CaptureFile { header, packets })
}

fn read_global_header(
    reader: &CaptureReader<'_>,
    magic_number: u32,
) -> Result<GlobalHeader, DecodeError> {
    Ok(GlobalHeader {
        magic_number,
        byte_order: reader.byte_order(),
        version_major: reader.read_u16(layout::VERSION_MAJOR_RANGE)?,
        version_minor: reader.read_u16(layout::VERSION_MINOR_RANGE)?,
        timezone_offset: reader.read_u32(layout::THISZONE_RANGE)?,
        timestamp_accuracy: reader.read_u32(layout::SIGFIGS_RANGE)?,
        snapshot_length: reader.read_u32(layout::SNAPLEN_RANGE)?,
        link_type: reader.read_u32(layout::NETWORK_RANGE)?,
    })
}

fn read_record_header(
    reader: &CaptureReader<'_>,
    offset: usize,
) -> Result<RecordHeader, DecodeError> {
    Ok(RecordHeader {
        ts_sec: reader.read_u32_at(offset + layout::TS_SEC_OFFSET)?,
        ts_usec: reader.read_u32_at(offset + layout::TS_USEC_OFFSET)?,
        incl_len: reader.read_u32_at(offset + layout::INCL_LEN_OFFSET)?,
        orig_len: reader.read_u32_at(offset + layout::ORIG_LEN_OFFSET)?,
    })
}

fn build_record(
    sequence_index: usize,
    record: &RecordHeader,
    leading_bytes_hex: String,
    truncated: bool,
) -> PacketRecord {
    let timestamp_ms = timestamp_ms(record.ts_sec, record.ts_usec);
    PacketRecord {
        sequence_index,
        timestamp_ms,
        timestamp: ms_to_rfc3339(timestamp_ms),
        captured_length: record.incl_len,
        original_length: record.orig_len,
        leading_bytes_hex,
        truncated,
    }
}

fn timestamp_ms(ts_sec: u32, ts_usec: u32) -> u64 {
    u64::from(ts_sec) * 1000 + u64::from(ts_usec) / 1000
}

fn ms_to_rfc3339(ms: u64) -> Option<String> {
    let format = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    );
    let nanos = i128::from(ms) * 1_000_000;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&format).ok())
}

#[cfg(test)]
mod tests {
    use super::{DecodeOptions, decode_capture, decode_capture_with, ms_to_rfc3339, timestamp_ms};
    use crate::decode::error::DecodeError;
    use crate::decode::layout;
    use crate::{ByteOrder, PacketEntry};

    fn header(order: ByteOrder, snaplen: u32) -> Vec<u8> {
        let mut out = Vec::with_capacity(layout::GLOBAL_HEADER_LEN);
        let magic = match order {
            ByteOrder::BigEndian => layout::MAGIC_BIG_ENDIAN.to_be_bytes(),
            ByteOrder::LittleEndian => layout::MAGIC_LITTLE_ENDIAN.to_be_bytes(),
        };
        out.extend_from_slice(&magic);
        push_u16(&mut out, order, 2);
        push_u16(&mut out, order, 4);
        push_u32(&mut out, order, 0);
        push_u32(&mut out, order, 0);
        push_u32(&mut out, order, snaplen);
        push_u32(&mut out, order, 1);
        out
    }

    fn record(out: &mut Vec<u8>, order: ByteOrder, incl_len: u32, body: &[u8]) {
        push_u32(out, order, 1_700_000_000);
        push_u32(out, order, 500_000);
        push_u32(out, order, incl_len);
        push_u32(out, order, incl_len);
        out.extend_from_slice(body);
    }

    fn push_u16(out: &mut Vec<u8>, order: ByteOrder, value: u16) {
        match order {
            ByteOrder::BigEndian => out.extend_from_slice(&value.to_be_bytes()),
            ByteOrder::LittleEndian => out.extend_from_slice(&value.to_le_bytes()),
        }
    }

    fn push_u32(out: &mut Vec<u8>, order: ByteOrder, value: u32) {
        match order {
            ByteOrder::BigEndian => out.extend_from_slice(&value.to_be_bytes()),
            ByteOrder::LittleEndian => out.extend_from_slice(&value.to_le_bytes()),
        }
    }

    #[test]
    fn rejects_short_buffer() {
        let err = decode_capture(&[0xa1, 0xb2, 0xc3, 0xd4]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TooShort {
                needed: 24,
                actual: 4
            }
        );
    }

    #[test]
    fn rejects_unknown_magic() {
        let mut data = header(ByteOrder::BigEndian, 65535);
        data[0] = 0x0a;
        let err = decode_capture(&data).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownMagic { .. }));
    }

    #[test]
    fn header_only_has_no_packets() {
        let data = header(ByteOrder::LittleEndian, 65535);
        let capture = decode_capture(&data).unwrap();
        assert!(capture.packets.is_empty());
        assert_eq!(capture.header.byte_order, ByteOrder::LittleEndian);
        assert_eq!(capture.header.snapshot_length, 65535);
    }

    #[test]
    fn partial_record_header_ends_stream() {
        let mut data = header(ByteOrder::BigEndian, 65535);
        data.extend_from_slice(&[0u8; 15]);
        let capture = decode_capture(&data).unwrap();
        assert!(capture.packets.is_empty());
    }

    #[test]
    fn preview_capped_by_snaplen_but_cursor_uses_captured_length() {
        let mut data = header(ByteOrder::BigEndian, 2);
        record(&mut data, ByteOrder::BigEndian, 4, &[1, 2, 3, 4]);
        record(&mut data, ByteOrder::BigEndian, 1, &[9]);
        let capture = decode_capture(&data).unwrap();
        let records: Vec<_> = capture.records().collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].leading_bytes_hex, "01 02");
        assert_eq!(records[1].leading_bytes_hex, "09");
        assert!(!records[1].truncated);
    }

    #[test]
    fn zero_snaplen_gives_empty_preview() {
        let mut data = header(ByteOrder::LittleEndian, 0);
        record(&mut data, ByteOrder::LittleEndian, 3, &[1, 2, 3]);
        let capture = decode_capture(&data).unwrap();
        let record = capture.records().next().unwrap();
        assert_eq!(record.leading_bytes_hex, "");
        assert_eq!(record.captured_length, 3);
        assert!(!record.truncated);
    }

    #[test]
    fn oversized_length_marks_truncated() {
        let mut data = header(ByteOrder::BigEndian, 65535);
        record(&mut data, ByteOrder::BigEndian, u32::MAX, &[1, 2]);
        let capture = decode_capture(&data).unwrap();
        assert_eq!(capture.packets.len(), 1);
        let record = capture.records().next().unwrap();
        assert!(record.truncated);
        assert_eq!(record.leading_bytes_hex, "");
        assert_eq!(record.captured_length, u32::MAX);
    }

    #[test]
    fn custom_limit_appends_marker() {
        let mut data = header(ByteOrder::BigEndian, 65535);
        for _ in 0..3 {
            record(&mut data, ByteOrder::BigEndian, 1, &[0xaa]);
        }
        let options = DecodeOptions {
            max_packets: 2,
            preview_bytes: 32,
        };
        let capture = decode_capture_with(&data, &options).unwrap();
        assert_eq!(capture.packet_count(), 2);
        assert!(capture.limit_reached());
        match capture.packets.last() {
            Some(PacketEntry::LimitReached(marker)) => {
                assert_eq!(marker.limit, 2);
                assert_eq!(marker.sequence_index, 2);
            }
            other => panic!("expected limit marker, got {other:?}"),
        }
    }

    #[test]
    fn limit_marker_added_when_capture_ends_at_limit() {
        let mut data = header(ByteOrder::LittleEndian, 65535);
        record(&mut data, ByteOrder::LittleEndian, 1, &[0xaa]);
        record(&mut data, ByteOrder::LittleEndian, 1, &[0xbb]);
        let options = DecodeOptions {
            max_packets: 2,
            preview_bytes: 32,
        };
        let capture = decode_capture_with(&data, &options).unwrap();
        assert_eq!(capture.packets.len(), 3);
        assert_eq!(capture.packet_count(), 2);
        assert!(!capture.is_truncated());
        assert_eq!(capture.limit_marker().map(|m| m.sequence_index), Some(2));
    }

    #[test]
    fn zero_limit_is_clamped() {
        let mut data = header(ByteOrder::BigEndian, 65535);
        record(&mut data, ByteOrder::BigEndian, 1, &[0xaa]);
        record(&mut data, ByteOrder::BigEndian, 1, &[0xbb]);
        let options = DecodeOptions {
            max_packets: 0,
            preview_bytes: 32,
        };
        let capture = decode_capture_with(&data, &options).unwrap();
        assert_eq!(capture.packet_count(), 1);
        assert!(capture.limit_reached());
    }

    #[test]
    fn preview_bytes_option_limits_hex() {
        let mut data = header(ByteOrder::BigEndian, 65535);
        record(&mut data, ByteOrder::BigEndian, 4, &[1, 2, 3, 4]);
        let options = DecodeOptions {
            max_packets: 10,
            preview_bytes: 1,
        };
        let capture = decode_capture_with(&data, &options).unwrap();
        assert_eq!(capture.records().next().unwrap().leading_bytes_hex, "01");
    }

    #[test]
    fn timestamp_combines_seconds_and_micros() {
        assert_eq!(timestamp_ms(1, 999_999), 1999);
        assert_eq!(
            ms_to_rfc3339(1_700_000_000_500).as_deref(),
            Some("2023-11-14T22:13:20.500Z")
        );
        assert_eq!(ms_to_rfc3339(0).as_deref(), Some("1970-01-01T00:00:00.000Z"));
    }
}
