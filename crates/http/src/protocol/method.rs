use std::fmt;
use std::str::FromStr;

use crate::protocol::ParseError;

/// The request methods this server understands.
///
/// Anything else on the request line is rejected while parsing, so a
/// handler never has to deal with an extension method.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Head,
    Delete,
}

impl Method {
    pub const ALL: [Method; 6] = [Method::Get, Method::Post, Method::Put, Method::Patch, Method::Head, Method::Delete];

    /// Returns the method token as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Delete => "DELETE",
        }
    }

    /// Parses a method token, the match is case-sensitive.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        match bytes {
            b"GET" => Ok(Method::Get),
            b"POST" => Ok(Method::Post),
            b"PUT" => Ok(Method::Put),
            b"PATCH" => Ok(Method::Patch),
            b"HEAD" => Ok(Method::Head),
            b"DELETE" => Ok(Method::Delete),
            other => Err(ParseError::invalid_method(String::from_utf8_lossy(other))),
        }
    }
}

impl FromStr for Method {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::from_bytes(s.as_bytes())
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Method {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_methods() {
        for method in Method::ALL {
            assert_eq!(method.as_str().parse::<Method>().unwrap(), method);
        }
    }

    #[test]
    fn reject_unknown_or_lowercase() {
        assert!(matches!(Method::from_bytes(b"OPTIONS"), Err(ParseError::InvalidMethod { .. })));
        assert!(matches!(Method::from_bytes(b"get"), Err(ParseError::InvalidMethod { .. })));
        assert!(matches!(Method::from_bytes(b""), Err(ParseError::InvalidMethod { .. })));
    }
}
