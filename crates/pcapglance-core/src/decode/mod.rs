//! Classic libpcap decoding.
//!
//! The parser checks the global header (length, magic) and then walks the
//! packet records in a single pass. The magic number fixes the byte order for
//! every later read; `reader` threads that order through each access so
//! parsing never depends on the host.
//!
//! Only two conditions are errors: a buffer shorter than the global header
//! and an unknown magic number. Everything after that is reported as data
//! (a `truncated` record or a limit marker). Offsets live in `layout`.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use error::DecodeError;
pub use parser::{DecodeOptions, decode_capture, decode_capture_with};
