//! HTTP header encoder implementation for serializing response heads
//!
//! Writes the status line followed by every header line in insertion order
//! and the blank separator line. Nothing is added or rewritten here: framing
//! headers such as `Content-Length` must already be present on the response.

use crate::protocol::{Response, SendError};

use bytes::{BufMut, BytesMut};

use std::io;
use std::io::Write;
use tokio_util::codec::Encoder;

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 4 * 1024;

/// Encoder for the status line and header section of a [`Response`].
#[derive(Debug)]
pub struct HeaderEncoder;

impl Encoder<&Response> for HeaderEncoder {
    type Error = SendError;

    /// Encodes `HTTP/1.1 <code> <reason>\r\n`, then `<name>: <value>\r\n` per header, then `\r\n`.
    fn encode(&mut self, response: &Response, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(INIT_HEADER_SIZE);

        write!(FastWrite(dst), "HTTP/1.1 {} {}\r\n", response.status().as_str(), response.reason())?;

        for (header_name, header_value) in response.headers().iter() {
            dst.put_slice(header_name.as_bytes());
            dst.put_slice(b": ");
            dst.put_slice(header_value.as_bytes());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

/// Fast writer implementation for writing to BytesMut.
///
/// Lets `write!` format straight into the buffer we've already reserved.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
