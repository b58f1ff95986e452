//! A small single-shot HTTP/1.1 server core
//!
//! This crate turns the bytes of one TCP connection into a structured
//! [`protocol::Request`], hands it to a [`handler::Handler`], and writes the
//! resulting [`protocol::Response`] back before closing the connection.
//! Routing, content negotiation and the accept loop live one layer up, in
//! `nano-web`.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use tracing::{error, info, warn};
//! use nano_http::connection::HttpConnection;
//! use nano_http::handler::make_handler;
//! use nano_http::protocol::{Request, Response};
//!
//! #[tokio::main]
//! async fn main() {
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     let handler = Arc::new(make_handler(hello_world));
//!
//!     loop {
//!         let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let handler = handler.clone();
//!
//!         tokio::spawn(async move {
//!             let (reader, writer) = tcp_stream.into_split();
//!             let connection = HttpConnection::new(reader, writer);
//!             match connection.process(handler).await {
//!                 Ok(()) => info!("finished process, connection shutdown"),
//!                 Err(e) => error!("service has error, cause {}, connection shutdown", e),
//!             }
//!         });
//!     }
//! }
//!
//! async fn hello_world(request: Request) -> Response {
//!     info!("request path {}", request.path());
//!
//!     let mut response = Response::new();
//!     response.set_header("Content-Type", "text/plain");
//!     response.append_body("Hello World!\r\n");
//!     response
//! }
//! ```
//!
//! # Architecture
//!
//! - [`connection`]: one request / one response per connection
//! - [`protocol`]: request, response builder and error types
//! - [`codec`]: request decoding and response encoding
//! - [`handler`]: the trait a connection hands parsed requests to
//!
//! # Wire format
//!
//! The request line must have exactly three space-separated tokens. Header
//! lines are split on `": "`; names are lower-cased and a repeated name keeps
//! its last value. A body is read only when `Content-Length` is present, and
//! must be complete. Any parse failure is answered with `400 Bad Request`.
//!
//! Responses are written as `HTTP/1.1 <code> <reason>`, the headers in
//! insertion order, a blank line and the raw body. A non-empty body is always
//! framed with a `Content-Length` matching its final size.
//!
//! # Limitations
//!
//! - no keep-alive or pipelining, every connection carries one request
//! - no chunked transfer encoding, no trailers, no `100 Continue`
//! - no TLS, no HTTP/2
//! - no read or write timeouts

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
