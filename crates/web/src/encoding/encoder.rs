use crate::encoding::GZIP;
use bytes::{BufMut, BytesMut};
use flate2::Compression;
use flate2::write::GzEncoder;
use http::header::{ACCEPT_ENCODING, CONTENT_ENCODING};
use nano_http::protocol::{Request, Response};
use std::io;
use std::io::Write;
use tracing::{trace, warn};

/// Whether an `Accept-Encoding` value lists `gzip` as one of its tokens.
pub fn accepts_gzip(accept_encoding: &str) -> bool {
    accept_encoding.split(',').any(|token| token.trim() == GZIP)
}

/// Compresses `data` into a complete gzip stream.
pub fn gzip(data: &[u8]) -> io::Result<BytesMut> {
    let mut encoder = GzEncoder::new(BytesMut::new().writer(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?.into_inner())
}

/// Gzips the response body when the request accepts it.
///
/// An empty body is compressed too. A body that fails to compress is sent as
/// is.
pub fn encode(req: &Request, resp: &mut Response) {
    // response has already encoded
    if resp.headers().contains(CONTENT_ENCODING.as_str()) {
        return;
    }

    let accepted = req.header(ACCEPT_ENCODING.as_str()).is_some_and(accepts_gzip);
    if !accepted {
        return;
    }

    match gzip(resp.body()) {
        Ok(compressed) => {
            trace!(original = resp.body().len(), compressed = compressed.len(), "gzip response body");
            resp.replace_body(compressed);
            resp.set_header("Content-Encoding", GZIP);
        }
        Err(e) => warn!(cause = %e, "can't gzip response body, send it uncompressed"),
    }
}
