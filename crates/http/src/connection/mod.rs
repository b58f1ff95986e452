//! HTTP connection handling module
//!
//! - [`HttpConnection`]: serves a single request on one connection:
//!   - parses the request, replying `400 Bad Request` on failure
//!   - passes the request to a [`Handler`](crate::handler::Handler)
//!   - frames and writes the response
//!   - closes the connection unconditionally, there is no keep-alive

mod http_connection;

pub use http_connection::HttpConnection;
