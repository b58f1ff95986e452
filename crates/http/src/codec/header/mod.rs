//! Request-line, header-section and status-line processing.
//!
//! - [`HeaderDecoder`]: reads the request line and the header section, line
//!   by line, into a [`RequestHead`]
//!   - the request line must have exactly three space-separated tokens
//!   - header lines are split on `": "`, lines that don't split are dropped
//!   - header names are lower-cased, a repeated name keeps the last value
//!
//! - [`HeaderEncoder`]: writes the status line and the header lines of a
//!   response, in insertion order, followed by the blank separator line

mod header_decoder;
mod header_encoder;

pub use header_decoder::HeaderDecoder;
pub use header_decoder::RequestHead;
pub use header_encoder::HeaderEncoder;
