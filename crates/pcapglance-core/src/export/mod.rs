//! Rendering of decoded captures for export.
//!
//! Renderers are pure: they take a [`CaptureFile`](crate::CaptureFile) and
//! return a `String`. Writing the result anywhere is the caller's job.

mod delimited;
mod json;
mod markdown;

use thiserror::Error;

use crate::CaptureFile;

/// Output format for [`render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Markdown,
}

/// Options shared by all renderers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Pretty-print JSON output; ignored by the other formats.
    pub pretty: bool,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV buffer flush failed: {0}")]
    CsvBuffer(String),
    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("formatting failed")]
    Format(#[from] std::fmt::Error),
}

/// Column names shared by the CSV and Markdown packet tables.
pub(crate) const PACKET_COLUMNS: [&str; 7] = [
    "index",
    "timestamp",
    "timestamp_ms",
    "captured_length",
    "original_length",
    "truncated",
    "leading_bytes_hex",
];

/// Render `capture` in the requested format.
///
/// # Examples
/// ```
/// use pcapglance_core::{ExportFormat, RenderOptions, decode_capture, render};
///
/// let mut bytes = vec![0xd4, 0xc3, 0xb2, 0xa1, 0x02, 0x00, 0x04, 0x00];
/// bytes.extend_from_slice(&[0u8; 8]);
/// bytes.extend_from_slice(&65535u32.to_le_bytes());
/// bytes.extend_from_slice(&1u32.to_le_bytes());
/// let capture = decode_capture(&bytes)?;
///
/// let csv = render(&capture, ExportFormat::Csv, &RenderOptions::default())?;
/// assert!(csv.starts_with("index,timestamp,"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Errors
/// Returns `ExportError` when serialization fails.
pub fn render(
    capture: &CaptureFile,
    format: ExportFormat,
    options: &RenderOptions,
) -> Result<String, ExportError> {
    match format {
        ExportFormat::Json => json::render_json(capture, options.pretty),
        ExportFormat::Csv => delimited::render_csv(capture),
        ExportFormat::Markdown => markdown::render_markdown(capture),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::{ByteOrder, CaptureFile, GlobalHeader, LimitMarker, PacketEntry, PacketRecord};

    pub(crate) fn capture(with_marker: bool) -> CaptureFile {
        let mut packets = vec![
            PacketEntry::Packet(PacketRecord {
                sequence_index: 0,
                timestamp_ms: 1_700_000_000_500,
                timestamp: Some("2023-11-14T22:13:20.500Z".to_string()),
                captured_length: 4,
                original_length: 60,
                leading_bytes_hex: "de ad be ef".to_string(),
                truncated: false,
            }),
            PacketEntry::Packet(PacketRecord {
                sequence_index: 1,
                timestamp_ms: 1_700_000_001_000,
                timestamp: Some("2023-11-14T22:13:21.000Z".to_string()),
                captured_length: 1500,
                original_length: 1500,
                leading_bytes_hex: String::new(),
                truncated: true,
            }),
        ];
        if with_marker {
            packets.push(PacketEntry::LimitReached(LimitMarker {
                sequence_index: 2,
                limit: 2,
                note: "capture truncated for performance after 2 packets".to_string(),
            }));
        }
        CaptureFile {
            header: GlobalHeader {
                magic_number: 0xa1b2_c3d4,
                byte_order: ByteOrder::BigEndian,
                version_major: 2,
                version_minor: 4,
                timezone_offset: 0,
                timestamp_accuracy: 0,
                snapshot_length: 65535,
                link_type: 1,
            },
            packets,
        }
    }
}
