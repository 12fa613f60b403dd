use std::fmt::Write;

use super::{ExportError, PACKET_COLUMNS};
use crate::{ByteOrder, CaptureFile, PacketEntry};

pub(crate) fn render_markdown(capture: &CaptureFile) -> Result<String, ExportError> {
    let header = &capture.header;
    let byte_order = match header.byte_order {
        ByteOrder::BigEndian => "big-endian",
        ByteOrder::LittleEndian => "little-endian",
    };

    let mut out = String::new();
    writeln!(out, "# PCAP summary")?;
    writeln!(out)?;
    writeln!(out, "| Field | Value |")?;
    writeln!(out, "| --- | --- |")?;
    writeln!(out, "| Magic | 0x{:08x} |", header.magic_number)?;
    writeln!(out, "| Byte order | {byte_order} |")?;
    writeln!(
        out,
        "| Version | {}.{} |",
        header.version_major, header.version_minor
    )?;
    writeln!(out, "| Timezone offset | {} |", header.timezone_offset)?;
    writeln!(out, "| Timestamp accuracy | {} |", header.timestamp_accuracy)?;
    writeln!(out, "| Snapshot length | {} |", header.snapshot_length)?;
    writeln!(out, "| Link type | {} |", header.link_type)?;
    writeln!(out, "| Packets | {} |", capture.packet_count())?;
    writeln!(out)?;

    writeln!(out, "| {} |", PACKET_COLUMNS.join(" | "))?;
    writeln!(out, "|{}", " --- |".repeat(PACKET_COLUMNS.len()))?;
    let mut marker_note = None;
    for entry in &capture.packets {
        match entry {
            PacketEntry::Packet(record) => {
                let hex = if record.leading_bytes_hex.is_empty() {
                    String::new()
                } else {
                    format!("`{}`", record.leading_bytes_hex)
                };
                writeln!(
                    out,
                    "| {} | {} | {} | {} | {} | {} | {} |",
                    record.sequence_index,
                    escape_cell(record.timestamp.as_deref().unwrap_or("")),
                    record.timestamp_ms,
                    record.captured_length,
                    record.original_length,
                    if record.truncated { "yes" } else { "no" },
                    hex,
                )?;
            }
            PacketEntry::LimitReached(marker) => marker_note = Some(&marker.note),
        }
    }

    if let Some(note) = marker_note {
        writeln!(out)?;
        writeln!(out, "_{}_", escape_cell(note))?;
    }
    Ok(out)
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::{escape_cell, render_markdown};
    use crate::export::fixtures;

    #[test]
    fn markdown_has_header_and_packet_tables() {
        let capture = fixtures::capture(false);
        let md = render_markdown(&capture).unwrap();
        assert!(md.contains("| Byte order | big-endian |"));
        assert!(md.contains("| Version | 2.4 |"));
        assert!(md.contains("| Packets | 2 |"));
        assert!(md.contains(
            "| 0 | 2023-11-14T22:13:20.500Z | 1700000000500 | 4 | 60 | no | `de ad be ef` |"
        ));
        assert!(md.contains("| 1 | 2023-11-14T22:13:21.000Z | 1700000001000 | 1500 | 1500 | yes |  |"));
        assert!(!md.contains("_capture truncated"));
    }

    #[test]
    fn markdown_notes_limit_marker() {
        let capture = fixtures::capture(true);
        let md = render_markdown(&capture).unwrap();
        assert!(md.trim_end().ends_with("_capture truncated for performance after 2 packets_"));
    }

    #[test]
    fn escape_cell_escapes_pipes() {
        assert_eq!(escape_cell("a|b"), "a\\|b");
        assert_eq!(escape_cell("line one\r\nline two"), "line one  line two");
    }
}
