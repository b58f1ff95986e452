//! Request body handling.
//!
//! Only `Content-Length` framing is understood: the body is exactly the
//! declared number of bytes, or empty when the header is absent. Chunked
//! transfer encoding is not interpreted.
//!
//! - [`LengthDecoder`]: collects a fixed-length payload

mod length_decoder;

pub use length_decoder::LengthDecoder;
