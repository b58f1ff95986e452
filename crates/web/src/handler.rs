//! Handlers and handler chains.
//!
//! A route resolves to a [`HandlerChain`]: an ordered list of
//! [`RequestHandler`]s. Each one reads the request and mutates the response.
//! The chain stops as soon as the response is ready, i.e. a handler has set
//! a status or written some body, so leading handlers can act as middleware
//! that either rejects a request or lets it fall through.

use async_trait::async_trait;
use http::StatusCode;
use nano_http::protocol::{Request, Response};
use std::fmt;

#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn invoke(&self, req: &Request, resp: &mut Response);
}

/// a [`RequestHandler`] made of a plain synchronous function
#[derive(Debug)]
pub struct FnHandler<F> {
    f: F,
}

pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&Request, &mut Response) + Send + Sync,
{
    FnHandler { f }
}

#[async_trait]
impl<F> RequestHandler for FnHandler<F>
where
    F: Fn(&Request, &mut Response) + Send + Sync,
{
    async fn invoke(&self, req: &Request, resp: &mut Response) {
        (self.f)(req, resp);
    }
}

/// An ordered sequence of handlers attached to one route.
#[derive(Default)]
pub struct HandlerChain {
    handlers: Vec<Box<dyn RequestHandler>>,
}

impl HandlerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler to the end of the chain.
    pub fn with<H: RequestHandler + 'static>(mut self, handler: H) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs the handlers in order until the response becomes ready.
    ///
    /// If the chain runs out without the response becoming ready, or it became
    /// ready through its body alone, the status is set to `200 OK`.
    pub async fn dispatch(&self, req: &Request, resp: &mut Response) {
        for handler in &self.handlers {
            handler.invoke(req, resp).await;
            if resp.is_ready() {
                break;
            }
        }

        if !resp.is_status_explicit() {
            resp.set_status(StatusCode::OK);
        }
    }
}

impl fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerChain").field("len", &self.handlers.len()).finish()
    }
}

impl<H: RequestHandler + 'static> From<H> for HandlerChain {
    fn from(handler: H) -> Self {
        HandlerChain::new().with(handler)
    }
}

impl FromIterator<Box<dyn RequestHandler>> for HandlerChain {
    fn from_iter<T: IntoIterator<Item = Box<dyn RequestHandler>>>(iter: T) -> Self {
        Self { handlers: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::HeaderMap;
    use nano_http::protocol::Method;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn request() -> Request {
        Request::from_target(Method::Get, "/", HeaderMap::new(), Bytes::new())
    }

    struct Counting {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RequestHandler for Counting {
        async fn invoke(&self, _req: &Request, _resp: &mut Response) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn empty_chain_defaults_to_ok() {
        let mut response = Response::new();
        HandlerChain::new().dispatch(&request(), &mut response).await;

        assert!(response.is_status_explicit());
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.body().is_empty());
    }

    #[tokio::test]
    async fn stops_once_status_is_set() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = HandlerChain::new()
            .with(Counting { calls: calls.clone() })
            .with(handler_fn(|_req: &Request, resp: &mut Response| resp.set_status(StatusCode::UNAUTHORIZED)))
            .with(Counting { calls: calls.clone() });

        let mut response = Response::new();
        chain.dispatch(&request(), &mut response).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn body_without_status_is_ok() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = HandlerChain::new()
            .with(handler_fn(|_req: &Request, resp: &mut Response| resp.append_body("hello")))
            .with(Counting { calls: calls.clone() });

        let mut response = Response::new();
        chain.dispatch(&request(), &mut response).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.reason(), "OK");
        assert_eq!(response.body(), b"hello");
    }

    #[tokio::test]
    async fn chain_runs_to_the_end_when_never_ready() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = HandlerChain::new()
            .with(Counting { calls: calls.clone() })
            .with(handler_fn(|_req: &Request, resp: &mut Response| resp.set_header("X-Seen", "1")))
            .with(Counting { calls: calls.clone() });

        let mut response = Response::new();
        chain.dispatch(&request(), &mut response).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.header("x-seen"), Some("1"));
    }

    #[test]
    fn build_chain_from_boxes() {
        fn noop(_req: &Request, _resp: &mut Response) {}

        let handlers: Vec<Box<dyn RequestHandler>> = vec![Box::new(handler_fn(noop)), Box::new(handler_fn(noop))];
        let chain = handlers.into_iter().collect::<HandlerChain>();
        assert_eq!(chain.len(), 2);
        assert!(!chain.is_empty());
        assert_eq!(HandlerChain::from(handler_fn(noop)).len(), 1);
    }
}
