//! The parsed form of one HTTP request.
//!
//! A [`Request`] is produced once per connection by the
//! [`RequestDecoder`](crate::codec::RequestDecoder) and is read-only for the
//! handlers that see it. The only field filled in after parsing is the set of
//! path parameters, bound by the router before any handler runs.

use std::borrow::Cow;
use std::collections::HashMap;
use std::collections::hash_map;

use bytes::Bytes;
use http::HeaderMap;

use crate::protocol::Method;

/// An HTTP request as seen by handlers.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Bytes,
    query: HashMap<String, String>,
    path_params: PathParams,
}

impl Request {
    /// Creates a request from its parsed parts, with no path parameters bound yet.
    pub fn new(
        method: Method,
        path: impl Into<String>,
        headers: HeaderMap,
        body: Bytes,
        query: HashMap<String, String>,
    ) -> Self {
        Self { method, path: path.into(), headers, body, query, path_params: PathParams::empty() }
    }

    /// Splits a request target into its path and query map and builds a request from them.
    pub fn from_target(method: Method, target: &str, headers: HeaderMap, body: Bytes) -> Self {
        let (path, query) = split_target(target);
        Self::new(method, path, headers, body, query)
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// The request path, without the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// All request headers, names are stored lower-cased.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Case-insensitive header lookup, returns `None` for absent or non-visible-ASCII values.
    ///
    /// Use [`header_lossy`](Self::header_lossy) for values that may carry UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Case-insensitive header lookup that decodes any value, replacing invalid UTF-8.
    pub fn header_lossy(&self, name: &str) -> Option<Cow<'_, str>> {
        self.headers.get(name).map(|value| String::from_utf8_lossy(value.as_bytes()))
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    pub fn path_params(&self) -> &PathParams {
        &self.path_params
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name)
    }

    /// Binds the parameters captured while resolving the route.
    pub fn set_path_params(&mut self, path_params: PathParams) {
        self.path_params = path_params;
    }
}

/// Splits `target` on the first `?`.
///
/// The query part is cut into `&`-separated pairs, each split on its first
/// `=`. A pair without `=` maps the whole pair to an empty value, so an empty
/// pair (`a=1&&b=2`, or a bare trailing `?`) yields the key `""`. Values are
/// kept verbatim, no percent-decoding.
pub fn split_target(target: &str) -> (&str, HashMap<String, String>) {
    let Some((path, raw_query)) = target.split_once('?') else {
        return (target, HashMap::new());
    };

    let query = raw_query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (key.to_owned(), value.to_owned()),
            None => (pair.to_owned(), String::new()),
        })
        .collect();

    (path, query)
}

/// Named values captured from `:param` segments of the matched route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    inner: HashMap<String, String>,
}

impl PathParams {
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Gets the value of a path parameter by its name.
    #[inline]
    pub fn get(&self, key: impl AsRef<str>) -> Option<&str> {
        self.inner.get(key.as_ref()).map(String::as_str)
    }

    /// Binds `name` to `value`, replacing an earlier binding with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(name.into(), value.into());
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, String> {
        self.inner.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self { inner: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

impl<'a> IntoIterator for &'a PathParams {
    type Item = (&'a String, &'a String);
    type IntoIter = hash_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn target_without_query() {
        let (path, query) = split_target("/echo/abc");
        assert_eq!(path, "/echo/abc");
        assert!(query.is_empty());
    }

    #[test]
    fn target_with_query() {
        let (path, query) = split_target("/some-query?q=1&y=2");
        assert_eq!(path, "/some-query");
        assert_eq!(query.len(), 2);
        assert_eq!(query["q"], "1");
        assert_eq!(query["y"], "2");
    }

    #[test]
    fn query_pair_without_equals_is_empty_valued() {
        let (path, query) = split_target("/?flag&x=1=2");
        assert_eq!(path, "/");
        assert_eq!(query["flag"], "");
        // only the first `=` splits
        assert_eq!(query["x"], "1=2");
    }

    #[test]
    fn empty_pairs_map_to_empty_key() {
        let (path, query) = split_target("/p?a=1&&b=2");
        assert_eq!(path, "/p");
        assert_eq!(query.len(), 3);
        assert_eq!(query.get(""), Some(&String::new()));
        assert_eq!(query["a"], "1");
        assert_eq!(query["b"], "2");

        let (path, query) = split_target("/p?");
        assert_eq!(path, "/p");
        assert_eq!(query.len(), 1);
        assert_eq!(query.get(""), Some(&String::new()));
    }

    #[test]
    fn only_first_question_mark_splits() {
        let (path, query) = split_target("/path?a=?b");
        assert_eq!(path, "/path");
        assert_eq!(query["a"], "?b");
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "text/plain".parse().unwrap());
        let request = Request::from_target(Method::Get, "/", headers, Bytes::new());

        assert_eq!(request.header("Content-Type"), Some("text/plain"));
        assert_eq!(request.header("CONTENT-TYPE"), Some("text/plain"));
        assert_eq!(request.header("server"), None);
    }

    #[test]
    fn utf8_header_value_needs_lossy_lookup() {
        let mut headers = HeaderMap::new();
        headers.insert("user-agent", HeaderValue::from_bytes("agent/ü".as_bytes()).unwrap());
        let request = Request::from_target(Method::Get, "/", headers, Bytes::new());

        assert_eq!(request.header("user-agent"), None);
        assert_eq!(request.header_lossy("User-Agent").as_deref(), Some("agent/ü"));
        assert_eq!(request.header_lossy("server"), None);
    }

    #[test]
    fn bind_path_params() {
        let mut request = Request::from_target(Method::Get, "/echo/abc", HeaderMap::new(), Bytes::new());
        assert!(request.path_params().is_empty());

        request.set_path_params([("str", "abc")].into_iter().collect());
        assert_eq!(request.path_param("str"), Some("abc"));
        assert_eq!(request.path_params().len(), 1);
    }
}
