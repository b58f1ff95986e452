//! Core HTTP protocol types.
//!
//! - [`Method`]: the six request methods the server accepts
//! - [`Request`]: a fully parsed request, with its query map and the
//!   [`PathParams`] bound by the router
//! - [`Response`]: the mutable response builder handlers write into
//! - [`HttpError`], [`ParseError`], [`SendError`]: the error taxonomy
//!
//! Requests are single-shot: one request is read from a connection, one
//! response is written back, and the connection is closed.

mod method;
pub use method::Method;

mod request;
pub use request::PathParams;
pub use request::Request;
pub use request::split_target;

mod response;
pub use response::Response;
pub use response::ResponseHeaders;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
