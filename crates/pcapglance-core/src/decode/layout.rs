pub const MAGIC_RANGE: std::ops::Range<usize> = 0..4;
pub const VERSION_MAJOR_RANGE: std::ops::Range<usize> = 4..6;
pub const VERSION_MINOR_RANGE: std::ops::Range<usize> = 6..8;
pub const THISZONE_RANGE: std::ops::Range<usize> = 8..12;
pub const SIGFIGS_RANGE: std::ops::Range<usize> = 12..16;
pub const SNAPLEN_RANGE: std::ops::Range<usize> = 16..20;
pub const NETWORK_RANGE: std::ops::Range<usize> = 20..24;

pub const GLOBAL_HEADER_LEN: usize = 24;

// Offsets relative to the start of a record header.
pub const TS_SEC_OFFSET: usize = 0;
pub const TS_USEC_OFFSET: usize = 4;
pub const INCL_LEN_OFFSET: usize = 8;
pub const ORIG_LEN_OFFSET: usize = 12;

pub const RECORD_HEADER_LEN: usize = 16;

/// Magic as read big-endian from a file written in big-endian order.
pub const MAGIC_BIG_ENDIAN: u32 = 0xA1B2_C3D4;
/// Magic as read big-endian from a file written in little-endian order.
pub const MAGIC_LITTLE_ENDIAN: u32 = 0xD4C3_B2A1;

pub const DEFAULT_MAX_PACKETS: usize = 5000;
pub const DEFAULT_PREVIEW_BYTES: usize = 32;
