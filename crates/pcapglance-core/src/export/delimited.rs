use super::{ExportError, PACKET_COLUMNS};
use crate::{CaptureFile, PacketEntry};

pub(crate) fn render_csv(capture: &CaptureFile) -> Result<String, ExportError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(Vec::new());
    wtr.write_record(PACKET_COLUMNS)?;
    for entry in &capture.packets {
        match entry {
            PacketEntry::Packet(record) => wtr.write_record([
                record.sequence_index.to_string().as_str(),
                record.timestamp.as_deref().unwrap_or(""),
                record.timestamp_ms.to_string().as_str(),
                record.captured_length.to_string().as_str(),
                record.original_length.to_string().as_str(),
                if record.truncated { "true" } else { "false" },
                record.leading_bytes_hex.as_str(),
            ])?,
            PacketEntry::LimitReached(marker) => wtr.write_record([
                marker.sequence_index.to_string().as_str(),
                "",
                "",
                "",
                "",
                "",
                marker.note.as_str(),
            ])?,
        }
    }
    let bytes = wtr
        .into_inner()
        .map_err(|err| ExportError::CsvBuffer(err.error().to_string()))?;
    Ok(String::from_utf8(bytes)?)
}
