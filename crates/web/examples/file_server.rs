//! A small file storage server.
//!
//! ```text
//! GET  /                   200
//! GET  /index.html         200
//! GET  /echo/:str          the path segment, as text
//! GET  /user-agent         the client's user agent, as text
//! GET  /files/:filename    the file's content
//! POST /files/:filename    store the request body, 202
//! ```
//!
//! Run with `cargo run --example file_server -- --directory /tmp --port 4221`.

use async_trait::async_trait;
use clap::Parser;
use http::StatusCode;
use nano_http::protocol::{Request, Response};
use nano_web::{HandlerChain, RequestHandler, Router, Server, handler_fn};
use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "file_server")]
#[command(about = "Serve and store files over a tiny HTTP/1.1 server", long_about = None)]
struct Args {
    /// Directory files are read from and written to
    #[arg(long, default_value = "/tmp")]
    directory: PathBuf,

    #[arg(short, long, default_value_t = nano_web::server::DEFAULT_PORT)]
    port: u16,

    #[arg(long, default_value_t = Level::INFO)]
    log_level: Level,
}

fn ok(_req: &Request, resp: &mut Response) {
    resp.set_status(StatusCode::OK);
}

fn echo(req: &Request, resp: &mut Response) {
    resp.set_header("Content-Type", mime::TEXT_PLAIN.as_ref());
    resp.append_body(req.path_param("str").unwrap_or_default());
}

fn user_agent(req: &Request, resp: &mut Response) {
    resp.set_header("Content-Type", mime::TEXT_PLAIN.as_ref());
    resp.append_body(req.header_lossy("user-agent").unwrap_or_default().as_bytes());
}

/// Rejects file names that would resolve outside the served directory.
fn check_filename(req: &Request, resp: &mut Response) {
    match req.path_param("filename") {
        Some("." | "..") | None => resp.set_status(StatusCode::BAD_REQUEST),
        Some(_) => {}
    }
}

struct ReadFile {
    directory: Arc<PathBuf>,
}

#[async_trait]
impl RequestHandler for ReadFile {
    async fn invoke(&self, req: &Request, resp: &mut Response) {
        let Some(filename) = req.path_param("filename") else {
            resp.set_status(StatusCode::NOT_FOUND);
            return;
        };

        match tokio::fs::read(self.directory.join(filename)).await {
            Ok(content) => {
                resp.set_header("Content-Type", mime::APPLICATION_OCTET_STREAM.as_ref());
                resp.append_body(content);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => resp.set_status(StatusCode::NOT_FOUND),
            Err(e) => {
                warn!(cause = %e, filename, "can't read file");
                resp.set_status(StatusCode::INTERNAL_SERVER_ERROR);
            }
        }
    }
}

struct WriteFile {
    directory: Arc<PathBuf>,
}

#[async_trait]
impl RequestHandler for WriteFile {
    async fn invoke(&self, req: &Request, resp: &mut Response) {
        let Some(filename) = req.path_param("filename") else {
            resp.set_status(StatusCode::NOT_FOUND);
            return;
        };

        match tokio::fs::write(self.directory.join(filename), req.body()).await {
            Ok(()) => resp.set_status(StatusCode::ACCEPTED),
            Err(e) => {
                warn!(cause = %e, filename, "can't write file");
                resp.set_status(StatusCode::INTERNAL_SERVER_ERROR);
            }
        }
    }
}

fn router(directory: PathBuf) -> Result<Router, nano_web::RouteError> {
    let directory = Arc::new(directory);
    let mut router = Router::new();

    router
        .get("/", handler_fn(ok))?
        .get("/index.html", handler_fn(ok))?
        .get("/echo/:str", handler_fn(echo))?
        .get("/user-agent", handler_fn(user_agent))?
        .get(
            "/files/:filename",
            HandlerChain::new().with(handler_fn(check_filename)).with(ReadFile { directory: Arc::clone(&directory) }),
        )?
        .post("/files/:filename", HandlerChain::new().with(handler_fn(check_filename)).with(WriteFile { directory }))?;

    Ok(router)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder().with_max_level(args.log_level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!(directory = %args.directory.display(), "serving files");
    let server = Server::builder().router(router(args.directory)?).port(args.port).build()?;

    if let Err(e) = server.start().await {
        error!(cause = %e, "server failed");
        return Err(e.into());
    }
    Ok(())
}
