//! Line-oriented decoder for the request line and the header section.
//!
//! The decoder is incremental: it consumes whole lines from the buffer as
//! they become available and keeps the partially built head between calls,
//! so it can sit behind a `FramedRead` fed by a socket.
//!
//! No size limits are enforced, a line is read until its `\n` arrives.

use bytes::{Bytes, BytesMut};
use http::header::CONTENT_LENGTH;
use http::{HeaderMap, HeaderName, HeaderValue};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{Method, ParseError, Request};

/// The request line and header section of a request, before its body is read.
#[derive(Debug)]
pub struct RequestHead {
    method: Method,
    target: String,
    version: String,
    headers: HeaderMap,
}

impl RequestHead {
    pub fn method(&self) -> Method {
        self.method
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// The protocol version token, kept as sent. Only its presence is checked.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The declared body length, `0` when there is no `Content-Length` header.
    pub fn content_length(&self) -> Result<u64, ParseError> {
        let Some(value) = self.headers.get(CONTENT_LENGTH) else {
            return Ok(0);
        };

        let value = value.to_str().map_err(ParseError::malformed_content_length)?;
        value.parse::<u64>().map_err(|e| ParseError::malformed_content_length(format!("{value:?}: {e}")))
    }

    /// Attaches the body and splits the target into path and query.
    pub fn into_request(self, body: Bytes) -> Request {
        Request::from_target(self.method, &self.target, self.headers, body)
    }
}

#[derive(Debug)]
enum State {
    RequestLine,
    Fields(RequestHead),
}

/// Decoder for the request line and header section implementing the [`Decoder`] trait.
#[derive(Debug)]
pub struct HeaderDecoder {
    state: State,
    // bytes already searched for `\n`, so a slow client doesn't cause rescans
    scanned: usize,
}

impl Default for HeaderDecoder {
    fn default() -> Self {
        Self { state: State::RequestLine, scanned: 0 }
    }
}

impl HeaderDecoder {
    /// True while nothing of the current request has been consumed yet.
    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::RequestLine)
    }

    fn next_line(&mut self, src: &mut BytesMut) -> Option<BytesMut> {
        let scanned = self.scanned.min(src.len());
        match src[scanned..].iter().position(|b| *b == b'\n') {
            Some(offset) => {
                let line = src.split_to(scanned + offset + 1);
                self.scanned = 0;
                Some(line)
            }
            None => {
                self.scanned = src.len();
                None
            }
        }
    }
}

impl Decoder for HeaderDecoder {
    type Item = RequestHead;
    type Error = ParseError;

    /// Consumes as many complete lines as are buffered.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(head))` once the empty line ending the header section is read
    /// - `Ok(None)` if more data is needed
    /// - `Err(ParseError)` if the request line is malformed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        while let Some(line) = self.next_line(src) {
            let line = trim_line_end(&line);

            match self.state {
                State::RequestLine => {
                    self.state = State::Fields(parse_request_line(line)?);
                }
                State::Fields(_) if line.is_empty() => {
                    if let State::Fields(head) = std::mem::replace(&mut self.state, State::RequestLine) {
                        return Ok(Some(head));
                    }
                }
                State::Fields(ref mut head) => parse_header_line(line, &mut head.headers),
            }
        }

        Ok(None)
    }
}

/// Strips every trailing `\r` and `\n`.
fn trim_line_end(line: &[u8]) -> &[u8] {
    let end = line.iter().rposition(|b| *b != b'\r' && *b != b'\n').map_or(0, |index| index + 1);
    &line[..end]
}

fn parse_request_line(line: &[u8]) -> Result<RequestHead, ParseError> {
    let malformed = || ParseError::malformed_request_line(String::from_utf8_lossy(line));

    let tokens = line.split(|b| *b == b' ').collect::<Vec<_>>();
    ensure!(tokens.len() == 3, malformed());

    let method = Method::from_bytes(tokens[0])?;
    let target = std::str::from_utf8(tokens[1]).map_err(|_e| malformed())?;
    let version = std::str::from_utf8(tokens[2]).map_err(|_e| malformed())?;

    Ok(RequestHead { method, target: target.to_owned(), version: version.to_owned(), headers: HeaderMap::new() })
}

/// Parses one `name: value` line into `headers`.
///
/// Lines without the `": "` separator, or whose name or value is not legal in
/// HTTP, are dropped. [`HeaderName`] lower-cases the name, and `insert`
/// replaces an earlier value with the same name.
fn parse_header_line(line: &[u8], headers: &mut HeaderMap) {
    let Some(separator) = line.windows(2).position(|window| window == b": ") else {
        trace!(line = ?String::from_utf8_lossy(line), "drop header line without separator");
        return;
    };

    let (name, value) = (&line[..separator], &line[separator + 2..]);
    match (HeaderName::from_bytes(name), HeaderValue::from_bytes(value)) {
        (Ok(name), Ok(value)) => {
            headers.insert(name, value);
        }
        _ => trace!(line = ?String::from_utf8_lossy(line), "drop invalid header line"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn crlf(str: &str) -> BytesMut {
        BytesMut::from(str.replace('\n', "\r\n").as_str())
    }

    #[test]
    fn trim_line_end_strips_cr_and_lf() {
        assert_eq!(trim_line_end(b"GET / HTTP/1.1\r\n"), b"GET / HTTP/1.1");
        assert_eq!(trim_line_end(b"abc\n\r\n"), b"abc");
        assert_eq!(trim_line_end(b"\r\n"), b"");
        assert_eq!(trim_line_end(b""), b"");
    }

    #[test]
    fn decode_request_line_and_headers() {
        let mut bytes = crlf(indoc! {r##"
        GET /index.html?a=1 HTTP/1.1
        Content-Type: text/plain
        Server: X

        "##});

        let head = HeaderDecoder::default().decode(&mut bytes).unwrap().unwrap();
        assert_eq!(head.method(), Method::Get);
        assert_eq!(head.target(), "/index.html?a=1");
        assert_eq!(head.version(), "HTTP/1.1");
        assert_eq!(head.headers().len(), 2);
        assert_eq!(head.headers().get("content-type").unwrap(), "text/plain");
        assert_eq!(head.headers().get("server").unwrap(), "X");
        assert!(bytes.is_empty());
    }

    #[test]
    fn request_line_needs_exactly_three_tokens() {
        for line in ["GET /HTTP/1.1\r\n", "GET / HTTP/1.1 extra\r\n", "GET  / HTTP/1.1\r\n", "\r\n"] {
            let mut bytes = BytesMut::from(line);
            let result = HeaderDecoder::default().decode(&mut bytes);
            assert!(matches!(result, Err(ParseError::MalformedRequestLine { .. })), "line {line:?}");
        }
    }

    #[test]
    fn version_value_is_not_validated() {
        let mut bytes = BytesMut::from("POST /files/a SPDY/9\r\n\r\n");
        let head = HeaderDecoder::default().decode(&mut bytes).unwrap().unwrap();
        assert_eq!(head.method(), Method::Post);
        assert_eq!(head.version(), "SPDY/9");
    }

    #[test]
    fn unknown_method_is_rejected() {
        let mut bytes = BytesMut::from("BREW /pot HTTP/1.1\r\n\r\n");
        let result = HeaderDecoder::default().decode(&mut bytes);
        assert!(matches!(result, Err(ParseError::InvalidMethod { .. })));
    }

    #[test]
    fn repeated_header_keeps_last_value() {
        let mut bytes = crlf(indoc! {r##"
        GET / HTTP/1.1
        Accept: text/html
        ACCEPT: */*

        "##});

        let head = HeaderDecoder::default().decode(&mut bytes).unwrap().unwrap();
        assert_eq!(head.headers().len(), 1);
        assert_eq!(head.headers().get("accept").unwrap(), "*/*");
    }

    #[test]
    fn lines_without_separator_are_dropped() {
        let mut bytes = crlf(indoc! {r##"
        GET / HTTP/1.1
        Host:example.com
        no separator here
        Bad Name: x
        User-Agent: curl/8.0

        "##});

        let head = HeaderDecoder::default().decode(&mut bytes).unwrap().unwrap();
        assert_eq!(head.headers().len(), 1);
        assert_eq!(head.headers().get("user-agent").unwrap(), "curl/8.0");
    }

    #[test]
    fn decode_across_partial_reads() {
        let mut decoder = HeaderDecoder::default();
        let mut bytes = BytesMut::from("GET /echo/ab");
        assert!(decoder.decode(&mut bytes).unwrap().is_none());
        assert!(decoder.is_idle());

        bytes.extend_from_slice(b"c HTTP/1.1\r\nHost: loc");
        assert!(decoder.decode(&mut bytes).unwrap().is_none());
        assert!(!decoder.is_idle());

        bytes.extend_from_slice(b"alhost\r\n\r\nbody");
        let head = decoder.decode(&mut bytes).unwrap().unwrap();
        assert_eq!(head.target(), "/echo/abc");
        assert_eq!(head.headers().get("host").unwrap(), "localhost");
        assert_eq!(&bytes[..], b"body");
        assert!(decoder.is_idle());
    }

    #[test]
    fn content_length() {
        let mut bytes = BytesMut::from("POST / HTTP/1.1\r\nContent-Length: 12\r\n\r\n");
        let head = HeaderDecoder::default().decode(&mut bytes).unwrap().unwrap();
        assert_eq!(head.content_length().unwrap(), 12);

        let mut bytes = BytesMut::from("POST / HTTP/1.1\r\n\r\n");
        let head = HeaderDecoder::default().decode(&mut bytes).unwrap().unwrap();
        assert_eq!(head.content_length().unwrap(), 0);

        for value in ["abc", "-1", "", "1.5"] {
            let mut bytes = BytesMut::from(format!("POST / HTTP/1.1\r\nContent-Length: {value}\r\n\r\n").as_str());
            let head = HeaderDecoder::default().decode(&mut bytes).unwrap().unwrap();
            assert!(matches!(head.content_length(), Err(ParseError::MalformedContentLength { .. })), "value {value:?}");
        }
    }
}
