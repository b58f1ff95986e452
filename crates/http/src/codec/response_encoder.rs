use crate::codec::header::HeaderEncoder;
use crate::protocol::{Response, SendError};
use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;

/// Serializes a finalized [`Response`] into its exact wire bytes.
///
/// The head is written by [`HeaderEncoder`], the body follows untouched.
#[derive(Debug)]
pub struct ResponseEncoder {
    header_encoder: HeaderEncoder,
}

impl ResponseEncoder {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Default for ResponseEncoder {
    fn default() -> Self {
        Self { header_encoder: HeaderEncoder }
    }
}

impl Encoder<Response> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, response: Response, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.header_encoder.encode(&response, dst)?;
        dst.put_slice(response.body());
        Ok(())
    }
}
