//! The response builder handed to handlers.
//!
//! A [`Response`] is created fresh for every request and owned by exactly one
//! handling task until it is serialized. Handlers may set the status, set
//! headers and append to the body. Once the status has been set explicitly or
//! the body is non-empty the response is *ready*, and the handler chain stops.

use bytes::BytesMut;
use http::StatusCode;

#[derive(Debug, Clone, Default)]
pub struct Response {
    status: Option<StatusCode>,
    reason: &'static str,
    headers: ResponseHeaders,
    body: BytesMut,
}

impl Response {
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the status code and fixes the reason phrase from the static status table.
    ///
    /// Codes without a canonical reason get an empty phrase.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
        self.reason = status.canonical_reason().unwrap_or("");
    }

    /// The status code, `200 OK` when no handler ever set one.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    /// The reason phrase fixed when the status was set.
    pub fn reason(&self) -> &'static str {
        match self.status {
            Some(_) => self.reason,
            None => "OK",
        }
    }

    pub fn is_status_explicit(&self) -> bool {
        self.status.is_some()
    }

    /// A response is ready once its status was set explicitly or it carries a body.
    pub fn is_ready(&self) -> bool {
        self.is_status_explicit() || !self.body.is_empty()
    }

    /// Sets a header, overwriting an earlier value with the same (case-insensitive) name.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.set(name.into(), value.into());
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn headers(&self) -> &ResponseHeaders {
        &self.headers
    }

    pub fn append_body(&mut self, bytes: impl AsRef<[u8]>) {
        self.body.extend_from_slice(bytes.as_ref());
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Takes the body out, leaving an empty one behind.
    pub fn take_body(&mut self) -> BytesMut {
        self.body.split()
    }

    /// Replaces the whole body, used by post-processing such as compression.
    pub fn replace_body(&mut self, body: BytesMut) {
        self.body = body;
    }

    /// Frames a non-empty body with a `Content-Length` matching its final size.
    ///
    /// Any value a handler set is overwritten. Empty bodies are left alone.
    pub fn set_content_length(&mut self) {
        if !self.body.is_empty() {
            self.set_header("Content-Length", self.body.len().to_string());
        }
    }
}

/// Response headers kept in first-insertion order.
///
/// Names keep the case they were first given with; lookups and overwrites
/// compare names ASCII case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct ResponseHeaders {
    entries: Vec<(String, String)>,
}

impl ResponseHeaders {
    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(existing, _)| existing.eq_ignore_ascii_case(name))
    }

    fn set(&mut self, name: String, value: String) {
        match self.position(&name) {
            Some(index) => self.entries[index].1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|index| self.entries[index].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_response_is_not_ready() {
        let response = Response::new();
        assert!(!response.is_ready());
        assert!(!response.is_status_explicit());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.reason(), "OK");
    }

    #[test]
    fn status_makes_ready_and_fixes_reason() {
        let mut response = Response::new();
        response.set_status(StatusCode::ACCEPTED);
        assert!(response.is_ready());
        assert!(response.is_status_explicit());
        assert_eq!(response.reason(), "Accepted");

        response.set_status(StatusCode::from_u16(599).unwrap());
        assert_eq!(response.status().as_u16(), 599);
        assert_eq!(response.reason(), "");
    }

    #[test]
    fn body_makes_ready_without_explicit_status() {
        let mut response = Response::new();
        response.append_body("Hello ");
        response.append_body(b"world");
        assert!(response.is_ready());
        assert!(!response.is_status_explicit());
        assert_eq!(response.body(), b"Hello world");
    }

    #[test]
    fn headers_overwrite_in_place() {
        let mut response = Response::new();
        response.set_header("Content-Type", "text/plain");
        response.set_header("Server", "X");
        response.set_header("content-type", "application/json");

        let headers = response.headers().iter().collect::<Vec<_>>();
        assert_eq!(headers, vec![("Content-Type", "application/json"), ("Server", "X")]);
        assert_eq!(response.header("CONTENT-TYPE"), Some("application/json"));
        assert!(!response.is_ready());
    }

    #[test]
    fn content_length_follows_final_body() {
        let mut response = Response::new();
        response.set_content_length();
        assert!(!response.headers().contains("content-length"));

        response.set_header("Content-Length", "1");
        response.append_body("abc");
        response.set_content_length();
        assert_eq!(response.header("content-length"), Some("3"));
        assert_eq!(response.headers().len(), 1);
    }

    #[test]
    fn take_and_replace_body() {
        let mut response = Response::new();
        response.append_body("abc");
        let body = response.take_body();
        assert_eq!(&body[..], b"abc");
        assert!(response.body().is_empty());

        response.replace_body(BytesMut::from(&b"xyz"[..]));
        assert_eq!(response.body(), b"xyz");
    }
}
