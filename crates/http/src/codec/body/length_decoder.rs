//! Decoder implementation for request bodies framed by a Content-Length header.
//!
//! See [RFC 7230 Section 3.3.2](https://tools.ietf.org/html/rfc7230#section-3.3.2).
//! The whole body is collected before it is handed out: a request is only
//! complete once exactly `length` bytes have arrived.

use std::cmp;

use crate::protocol::ParseError;
use bytes::{Bytes, BytesMut};
use tokio_util::codec::Decoder;

/// Upper bound on how much buffer space is reserved ahead of the body at once.
const MAX_RESERVE: u64 = 64 * 1024;

/// A decoder for a body with a known content length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthDecoder {
    /// The declared body length
    length: u64,
}

impl LengthDecoder {
    /// Creates a new LengthDecoder instance.
    ///
    /// # Arguments
    /// * `length` - The total content length to decode, specified by Content-Length header
    pub fn new(length: u64) -> Self {
        Self { length }
    }

    pub fn length(&self) -> u64 {
        self.length
    }
}

impl Decoder for LengthDecoder {
    type Item = Bytes;
    type Error = ParseError;

    /// # Returns
    /// * `Ok(Some(bytes))` with exactly `length` bytes once they are all buffered
    /// * `Ok(None)` when more data is needed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.length == 0 {
            return Ok(Some(Bytes::new()));
        }

        let buffered = src.len() as u64;
        if buffered < self.length {
            let missing = self.length - buffered;
            // `missing` is at most MAX_RESERVE here, so the cast can't truncate
            src.reserve(cmp::min(missing, MAX_RESERVE) as usize);
            return Ok(None);
        }

        // the whole body is buffered, so `length` fits in memory and in usize
        Ok(Some(src.split_to(self.length as usize).freeze()))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(body) => Ok(Some(body)),
            None => Err(ParseError::incomplete_body(self.length, src.len() as u64)),
        }
    }
}
