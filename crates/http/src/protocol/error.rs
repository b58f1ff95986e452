use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },
}

/// Everything that can go wrong while turning raw bytes into a [`Request`](crate::protocol::Request).
///
/// Every variant is answered with `400 Bad Request` by the connection.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed request line: {line:?}")]
    MalformedRequestLine { line: String },

    #[error("invalid http method: {method:?}")]
    InvalidMethod { method: String },

    #[error("malformed content-length header: {reason}")]
    MalformedContentLength { reason: String },

    #[error("incomplete body, expected {expected} bytes but the stream ended after {received}")]
    IncompleteBody { expected: u64, received: u64 },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn malformed_request_line<S: ToString>(line: S) -> Self {
        Self::MalformedRequestLine { line: line.to_string() }
    }

    pub fn invalid_method<S: ToString>(method: S) -> Self {
        Self::InvalidMethod { method: method.to_string() }
    }

    pub fn malformed_content_length<S: ToString>(str: S) -> Self {
        Self::MalformedContentLength { reason: str.to_string() }
    }

    pub fn incomplete_body(expected: u64, received: u64) -> Self {
        Self::IncompleteBody { expected, received }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// The stream closed before a complete request line and header section arrived.
    pub fn unexpected_eof() -> Self {
        Self::io(io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed before the header section ended"))
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
