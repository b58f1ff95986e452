//! Routing and a draining connection server on top of `nano-http`.
//!
//! Routes are registered on a [`Router`] before serving starts. Each route
//! maps a method and a `/literal/:param` pattern to a [`HandlerChain`], whose
//! handlers run in order until one of them makes the response ready. The
//! [`Server`] accepts connections, answers one request on each, gzips
//! responses for clients that ask for it, and drains in-flight connections
//! on `SIGINT`/`SIGTERM`.
//!
//! # Example
//!
//! ```no_run
//! use nano_http::protocol::{Request, Response};
//! use nano_web::{Router, Server, handler_fn};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut router = Router::new();
//!     router.get("/echo/:str", handler_fn(|req: &Request, resp: &mut Response| {
//!         resp.set_header("Content-Type", "text/plain");
//!         resp.append_body(req.path_param("str").unwrap_or_default());
//!     }))?;
//!
//!     Server::builder().router(router).port(4221).build()?.start().await?;
//!     Ok(())
//! }
//! ```

pub mod encoding;
pub mod handler;
pub mod router;
pub mod server;

pub use handler::FnHandler;
pub use handler::HandlerChain;
pub use handler::RequestHandler;
pub use handler::handler_fn;
pub use router::RouteError;
pub use router::RouteMatch;
pub use router::Router;
pub use server::Server;
pub use server::ServerBuildError;
pub use server::ServerBuilder;
pub use server::ServerError;
