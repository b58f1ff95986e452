//! HTTP request decoder module
//!
//! This module decodes one complete HTTP request from a byte stream. It runs
//! in two phases, both driven by [`Decoder::decode`]:
//!
//! 1. Header parsing: [`HeaderDecoder`] consumes the request line and the
//!    header section
//! 2. Payload parsing: [`LengthDecoder`] collects exactly `Content-Length`
//!    bytes of body
//!
//! # Example
//!
//! ```
//! use nano_http::codec::RequestDecoder;
//! use nano_http::protocol::Method;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from("GET /echo/abc?x=1 HTTP/1.1\r\n\r\n");
//! let request = decoder.decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(request.method(), Method::Get);
//! assert_eq!(request.path(), "/echo/abc");
//! ```

use crate::codec::body::LengthDecoder;
use crate::codec::header::{HeaderDecoder, RequestHead};
use crate::protocol::{ParseError, Request};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// A decoder for HTTP requests that handles both headers and payload
///
/// # State Machine
///
/// The decoder maintains its state through the `payload` field:
/// - `None`: Currently parsing the request line and headers
/// - `Some((head, LengthDecoder))`: Headers are done, waiting for the body
#[derive(Debug, Default)]
pub struct RequestDecoder {
    header_decoder: HeaderDecoder,
    payload: Option<(RequestHead, LengthDecoder)>,
}

impl RequestDecoder {
    /// Creates a new `RequestDecoder` instance
    pub fn new() -> Self {
        Default::default()
    }
}

impl Decoder for RequestDecoder {
    type Item = Request;
    type Error = ParseError;

    /// Attempts to decode an HTTP request from the provided buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(request))`: a complete request, body included
    /// - `Ok(None)`: Need more data to proceed
    /// - `Err(_)`: Encountered a parsing error
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.payload.is_none() {
            let Some(head) = self.header_decoder.decode(src)? else {
                return Ok(None);
            };

            let length_decoder = LengthDecoder::new(head.content_length()?);
            self.payload = Some((head, length_decoder));
        }

        let Some((_, length_decoder)) = &mut self.payload else {
            return Ok(None);
        };

        match length_decoder.decode(src)? {
            Some(body) => Ok(self.payload.take().map(|(head, _)| head.into_request(body))),
            None => Ok(None),
        }
    }

    /// Called once the stream has ended.
    ///
    /// A stream ending mid-body is [`ParseError::IncompleteBody`]; ending
    /// anywhere inside the request line or header section is an
    /// [`ParseError::Io`] with `UnexpectedEof`. A stream that ends before any
    /// byte arrived yields `Ok(None)`.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(request) = self.decode(src)? {
            return Ok(Some(request));
        }

        match &mut self.payload {
            Some((_, length_decoder)) => length_decoder.decode_eof(src).map(|_| None),
            None if src.is_empty() && self.header_decoder.is_idle() => Ok(None),
            None => Err(ParseError::unexpected_eof()),
        }
    }
}
