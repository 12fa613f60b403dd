use serde::Serialize;

use super::ExportError;
use crate::{CaptureFile, GlobalHeader, PacketEntry};

#[derive(Serialize)]
struct Summary {
    packet_count: usize,
    limit_reached: bool,
    truncated: bool,
}

#[derive(Serialize)]
struct JsonExport<'a> {
    summary: Summary,
    header: &'a GlobalHeader,
    packets: &'a [PacketEntry],
}

pub(crate) fn render_json(capture: &CaptureFile, pretty: bool) -> Result<String, ExportError> {
    let export = JsonExport {
        summary: Summary {
            packet_count: capture.packet_count(),
            limit_reached: capture.limit_reached(),
            truncated: capture.is_truncated(),
        },
        header: &capture.header,
        packets: &capture.packets,
    };
    let json = if pretty {
        serde_json::to_string_pretty(&export)?
    } else {
        serde_json::to_string(&export)?
    };
    Ok(json)
}
