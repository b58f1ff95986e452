//! HTTP codec module for encoding and decoding HTTP messages
//!
//! This module turns a connection's bytes into a [`Request`](crate::protocol::Request)
//! and a [`Response`](crate::protocol::Response) back into bytes. Both sides
//! plug into `tokio_util`'s `FramedRead` / `FramedWrite`.
//!
//! # Architecture
//!
//! - Request handling:
//!   - [`RequestDecoder`]: Decodes one complete incoming request
//!   - Request line and header parsing via the `header` module
//!   - Content-Length body collection via the `body` module
//!
//! - Response handling:
//!   - [`ResponseEncoder`]: Encodes an outgoing response
//!   - Status line and header encoding via the `header` module
//!
//! # Example
//!
//! ```
//! use nano_http::codec::ResponseEncoder;
//! use nano_http::protocol::Response;
//! use tokio_util::codec::Encoder;
//! use bytes::BytesMut;
//! use http::StatusCode;
//!
//! let mut response = Response::new();
//! response.set_status(StatusCode::ACCEPTED);
//!
//! let mut buffer = BytesMut::new();
//! ResponseEncoder::new().encode(response, &mut buffer).unwrap();
//! assert_eq!(&buffer[..], b"HTTP/1.1 202 Accepted\r\n\r\n");
//! ```

mod body;
mod header;
mod request_decoder;
mod response_encoder;

pub use header::RequestHead;
pub use request_decoder::RequestDecoder;
pub use response_encoder::ResponseEncoder;
