//! The connection server.
//!
//! A [`Server`] owns the [`Router`] and drives a listening socket through the
//! states `Created → Listening → Draining → Stopped`:
//!
//! - an accept loop pulls sockets off the listener and pushes them into a
//!   small bounded queue, waiting whenever the queue is full;
//! - a dispatch loop drains the queue and spawns one handling task per
//!   connection, tracked by a [`TaskTracker`];
//! - on shutdown the listener is dropped, the queue is closed, the queued
//!   connections are still dispatched, and the server waits until every
//!   tracked task has finished.
//!
//! In-flight tasks are never cancelled, they run to completion.

use crate::encoding;
use crate::router::Router;
use async_trait::async_trait;
use futures::FutureExt;
use http::StatusCode;
use nano_http::connection::HttpConnection;
use nano_http::handler::Handler;
use nano_http::protocol::{Request, Response};
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

pub const DEFAULT_PORT: u16 = 4221;
pub const DEFAULT_QUEUE_CAPACITY: usize = 3;

const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub struct ServerBuilder {
    router: Option<Router>,
    address: IpAddr,
    port: u16,
    queue_capacity: usize,
}

impl ServerBuilder {
    fn new() -> Self {
        Self {
            router: None,
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    pub fn address(mut self, address: impl Into<IpAddr>) -> Self {
        self.address = address.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Slots in the queue between the accept loop and the dispatch loop, at least one.
    pub fn queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity.max(1);
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        let router = self.router.ok_or(ServerBuildError::MissingRouter)?;
        Ok(Server { router, address: SocketAddr::new(self.address, self.port), queue_capacity: self.queue_capacity })
    }
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("router must be set")]
    MissingRouter,
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("can't bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("can't install signal handler: {source}")]
    Signal { source: io::Error },
}

/// Lifecycle states of a [`Server`], as reported in its logs.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ServerState {
    Created,
    Listening,
    Draining,
    Stopped,
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServerState::Created => "created",
            ServerState::Listening => "listening",
            ServerState::Draining => "draining",
            ServerState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct Server {
    router: Router,
    address: SocketAddr,
    queue_capacity: usize,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Binds the configured address and serves until an interrupt or terminate signal.
    pub async fn start(self) -> Result<(), ServerError> {
        let shutdown = shutdown_signal()?;

        let addr = self.address;
        info!(state = %ServerState::Created, %addr, routes = self.router.len(), "binding server");
        let listener = TcpListener::bind(addr).await.map_err(|source| ServerError::Bind { addr, source })?;

        self.serve_with_shutdown(listener, shutdown).await
    }

    /// Serves connections from `listener` until `shutdown` completes, then drains.
    ///
    /// Returns once the accept and dispatch loops have exited and every
    /// connection accepted before the shutdown has been answered.
    pub async fn serve_with_shutdown<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        let local_addr = listener.local_addr()?;
        let (sender, receiver) = mpsc::channel(self.queue_capacity);
        let cancel = CancellationToken::new();
        let tracker = TaskTracker::new();
        let server = Arc::new(self);

        let accept_task = tokio::spawn(accept_loop(listener, sender, cancel.clone()));
        let dispatch_task = tokio::spawn(dispatch_loop(receiver, server, tracker.clone()));
        info!(state = %ServerState::Listening, addr = %local_addr, "server started");

        shutdown.await;

        info!(
            state = %ServerState::Draining,
            in_flight = tracker.len(),
            "stop accepting, waiting for in-flight connections"
        );
        cancel.cancel();
        join_loop("accept", accept_task).await;
        join_loop("dispatch", dispatch_task).await;

        tracker.close();
        tracker.wait().await;
        info!(state = %ServerState::Stopped, "server stopped");
        Ok(())
    }
}

async fn join_loop(name: &'static str, task: JoinHandle<()>) {
    if let Err(e) = task.await {
        error!(cause = %e, "{} loop ended abnormally", name);
    }
}

/// Moves accepted sockets into the queue until cancelled.
///
/// Dropping the listener and the sender on exit is what closes both.
async fn accept_loop(listener: TcpListener, sender: mpsc::Sender<(TcpStream, SocketAddr)>, cancel: CancellationToken) {
    loop {
        let accepted = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => accepted,
        };

        let (tcp_stream, remote_addr) = match accepted {
            Ok(stream_and_addr) => stream_and_addr,
            Err(e) if is_connection_error(&e) => {
                debug!(cause = %e, "connection failed before accept");
                continue;
            }
            Err(e) => {
                // e.g. EMFILE, which persists until some connection closes
                warn!(cause = %e, "failed to accept, backing off");
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    () = tokio::time::sleep(ACCEPT_ERROR_BACKOFF) => {}
                }
                continue;
            }
        };

        // waits while the queue is full; the dispatch loop always drains it
        if sender.send((tcp_stream, remote_addr)).await.is_err() {
            warn!(peer = %remote_addr, "dispatch loop is gone, dropping connection");
            break;
        }
    }
    debug!("accept loop exited");
}

/// Errors that concern only the one connection being accepted, not the listener.
fn is_connection_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused | io::ErrorKind::ConnectionAborted | io::ErrorKind::ConnectionReset
    )
}

/// Spawns one tracked task per queued connection until the queue is closed and empty.
async fn dispatch_loop(
    mut receiver: mpsc::Receiver<(TcpStream, SocketAddr)>,
    server: Arc<Server>,
    tracker: TaskTracker,
) {
    while let Some((tcp_stream, remote_addr)) = receiver.recv().await {
        let server = Arc::clone(&server);
        tracker.spawn(async move {
            let handling = AssertUnwindSafe(serve_connection(server, tcp_stream, remote_addr));
            if let Err(panic) = handling.catch_unwind().await {
                error!(peer = %remote_addr, cause = panic_message(panic.as_ref()), "connection task panicked");
            }
        });
    }
    debug!("dispatch loop exited");
}

async fn serve_connection(server: Arc<Server>, tcp_stream: TcpStream, remote_addr: SocketAddr) {
    let (reader, writer) = tcp_stream.into_split();
    let connection = HttpConnection::new(reader, writer);
    match connection.process(server).await {
        Ok(()) => debug!(peer = %remote_addr, "finished process, connection shutdown"),
        Err(e) => warn!(peer = %remote_addr, cause = %e, "connection finished with error"),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

/// Resolves to `()` on the first interrupt or terminate signal.
///
/// The terminate handler is installed eagerly so that a failure surfaces
/// before the server binds.
fn shutdown_signal() -> Result<impl Future<Output = ()>, ServerError> {
    #[cfg(unix)]
    let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())
        .map_err(|source| ServerError::Signal { source })?;

    Ok(async move {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                error!(cause = %e, "can't listen for interrupt signal");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async move {
            terminate.recv().await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("interrupt signal received"),
            _ = terminate => info!("terminate signal received"),
        }
    })
}

#[async_trait]
impl Handler for Server {
    async fn call(&self, mut req: Request) -> Response {
        let mut resp = Response::new();

        match self.router.resolve(req.method(), req.path()) {
            Ok(route) => {
                let (chain, params) = route.into_parts();
                req.set_path_params(params);
                chain.dispatch(&req, &mut resp).await;
            }
            Err(e) => {
                debug!(cause = %e, "route miss, reply not found");
                resp.set_status(StatusCode::NOT_FOUND);
            }
        }

        encoding::encode(&req, &mut resp);
        resp
    }
}
