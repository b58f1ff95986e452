//! Path-trie routing.
//!
//! Every route is stored as a path of segments below a per-method root, so
//! `GET /echo/:str` becomes the segments `GET`, `echo`, `:str`. A segment
//! starting with `:` is a parameter: it matches any one request segment and
//! binds it under the parameter's name.
//!
//! Lookup walks the trie one request segment at a time, preferring a literal
//! child over the parameter child. It never backtracks: once a literal child
//! has been taken, a dead end further down is a miss even if the parameter
//! branch would have matched.

use crate::handler::HandlerChain;
use nano_http::protocol::{Method, PathParams};
use std::collections::HashMap;
use thiserror::Error;
use tracing::trace;

const PARAM_MARKER: char = ':';

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("no route for {method} {path}")]
    NoRoute { method: Method, path: String },

    #[error("parameter ':{new}' conflicts with ':{existing}' at the same position in '{pattern}'")]
    ParamConflict { pattern: String, existing: String, new: String },

    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: &'static str },
}

#[derive(Debug, Default)]
struct Node {
    literals: HashMap<String, Node>,
    param: Option<(String, Box<Node>)>,
    chain: Option<HandlerChain>,
}

/// Maps a method and a path to the [`HandlerChain`] registered for it.
///
/// # Example
///
/// ```
/// use nano_http::protocol::{Method, Request, Response};
/// use nano_web::handler::handler_fn;
/// use nano_web::router::Router;
///
/// let mut router = Router::new();
/// router
///     .get("/echo/:str", handler_fn(|req: &Request, resp: &mut Response| {
///         resp.append_body(req.path_param("str").unwrap_or_default());
///     }))
///     .unwrap();
///
/// let route = router.resolve(Method::Get, "/echo/abc").unwrap();
/// assert_eq!(route.params().get("str"), Some("abc"));
/// assert!(router.resolve(Method::Post, "/echo/abc").is_err());
/// ```
#[derive(Debug, Default)]
pub struct Router {
    root: Node,
    route_count: usize,
}

/// A resolved route: the chain to run and the parameters bound on the way.
#[derive(Debug)]
pub struct RouteMatch<'router> {
    chain: &'router HandlerChain,
    params: PathParams,
}

impl<'router> RouteMatch<'router> {
    pub fn chain(&self) -> &'router HandlerChain {
        self.chain
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    pub fn into_parts(self) -> (&'router HandlerChain, PathParams) {
        (self.chain, self.params)
    }
}

/// Splits a path on `/`, dropping the single empty segment a trailing slash leaves behind.
///
/// `/` itself yields one empty segment, so the root route stays distinct from
/// the method node.
fn segments(path: &str) -> Vec<&str> {
    let mut segments = path.split('/').collect::<Vec<_>>();
    if segments.len() > 1 && segments.last().is_some_and(|last| last.is_empty()) {
        segments.pop();
    }
    segments
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct routes registered.
    pub fn len(&self) -> usize {
        self.route_count
    }

    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }

    /// Registers `chain` for `method` and `pattern`.
    ///
    /// Registering the same method and pattern again replaces the earlier
    /// chain. Two parameters with different names at the same position are
    /// rejected, as is a parameter segment with no name.
    pub fn register(
        &mut self,
        method: Method,
        pattern: &str,
        chain: impl Into<HandlerChain>,
    ) -> Result<&mut Self, RouteError> {
        let mut node = self.root.literals.entry(method.as_str().to_string()).or_default();

        for segment in segments(pattern) {
            node = match segment.strip_prefix(PARAM_MARKER) {
                Some("") => {
                    return Err(RouteError::InvalidPattern {
                        pattern: pattern.to_string(),
                        reason: "parameter segment has no name",
                    });
                }

                Some(name) => {
                    if let Some((existing, _)) = &node.param
                        && existing != name
                    {
                        return Err(RouteError::ParamConflict {
                            pattern: pattern.to_string(),
                            existing: existing.clone(),
                            new: name.to_string(),
                        });
                    }

                    let (_, child) = node.param.get_or_insert_with(|| (name.to_string(), Box::default()));
                    child.as_mut()
                }

                None => node.literals.entry(segment.to_string()).or_default(),
            };
        }

        if node.chain.replace(chain.into()).is_none() {
            self.route_count += 1;
        }
        trace!(%method, pattern, "route registered");
        Ok(self)
    }

    pub fn get(&mut self, pattern: &str, chain: impl Into<HandlerChain>) -> Result<&mut Self, RouteError> {
        self.register(Method::Get, pattern, chain)
    }

    pub fn post(&mut self, pattern: &str, chain: impl Into<HandlerChain>) -> Result<&mut Self, RouteError> {
        self.register(Method::Post, pattern, chain)
    }

    pub fn put(&mut self, pattern: &str, chain: impl Into<HandlerChain>) -> Result<&mut Self, RouteError> {
        self.register(Method::Put, pattern, chain)
    }

    pub fn patch(&mut self, pattern: &str, chain: impl Into<HandlerChain>) -> Result<&mut Self, RouteError> {
        self.register(Method::Patch, pattern, chain)
    }

    pub fn head(&mut self, pattern: &str, chain: impl Into<HandlerChain>) -> Result<&mut Self, RouteError> {
        self.register(Method::Head, pattern, chain)
    }

    pub fn delete(&mut self, pattern: &str, chain: impl Into<HandlerChain>) -> Result<&mut Self, RouteError> {
        self.register(Method::Delete, pattern, chain)
    }

    /// Finds the chain for `method` and `path`, binding path parameters on the way.
    ///
    /// Fails with [`RouteError::NoRoute`] when the walk dead-ends or stops on a
    /// node nothing was registered for.
    pub fn resolve(&self, method: Method, path: &str) -> Result<RouteMatch<'_>, RouteError> {
        let no_route = || RouteError::NoRoute { method, path: path.to_string() };

        let mut node = self.root.literals.get(method.as_str()).ok_or_else(no_route)?;
        let mut params = PathParams::empty();

        for segment in segments(path) {
            node = match (node.literals.get(segment), &node.param) {
                (Some(child), _) => child,
                (None, Some((name, child))) => {
                    params.insert(name.as_str(), segment);
                    child.as_ref()
                }
                (None, None) => return Err(no_route()),
            };
        }

        let chain = node.chain.as_ref().ok_or_else(no_route)?;
        Ok(RouteMatch { chain, params })
    }
}
