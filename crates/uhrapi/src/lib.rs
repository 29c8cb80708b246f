//! UHR API (Universal Http Response API)
//! is a small vocabulary crate shared between response sinks, response
//! writers and the servers hosting them, so that response-layer features
//! can be written once and reused across server backends.

mod status;
pub use status::{InvalidStatusCode, StatusCode};

use std::str::FromStr;

/// HTTP protocol version.
/// SPEC: RFC 9110 - 2.5. Protocol Version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpVersion {
    pub major: u8,
    pub minor: u8,
}

impl HttpVersion {
    pub const HTTP_1_0: Self = Self { major: 1, minor: 0 };
    pub const HTTP_1_1: Self = Self { major: 1, minor: 1 };
}

impl Default for HttpVersion {
    fn default() -> Self {
        Self::HTTP_1_1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseHttpVersionError;

impl std::fmt::Display for ParseHttpVersionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("invalid HTTP version")
    }
}

impl std::error::Error for ParseHttpVersionError {}

impl FromStr for HttpVersion {
    type Err = ParseHttpVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix("HTTP/").ok_or(ParseHttpVersionError)?;
        let (major, minor) = rest.split_once('.').ok_or(ParseHttpVersionError)?;
        Ok(HttpVersion {
            major: major.parse().map_err(|_| ParseHttpVersionError)?,
            minor: minor.parse().map_err(|_| ParseHttpVersionError)?,
        })
    }
}

impl std::fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP/{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidRequestLine;

impl std::fmt::Display for InvalidRequestLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("invalid request line")
    }
}

impl std::error::Error for InvalidRequestLine {}

/// The request context a server hands to the response layer.
///
/// Opaque to the writer itself; stored so that hosting code holding a
/// writer can still reach the originating request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub method: String,
    pub target: String,
    pub version: HttpVersion,
}

impl RequestHead {
    /// Parse a request line.
    /// SPEC: RFC 9112 - 3. Request Line
    /// ABNF: request-line = method SP request-target SP HTTP-version
    pub fn parse(line: &str) -> Result<Self, InvalidRequestLine> {
        let mut parts = line.trim_ascii_end().split(' ');
        let method = parts.next().filter(|m| !m.is_empty()).ok_or(InvalidRequestLine)?;
        let target = parts.next().filter(|t| !t.is_empty()).ok_or(InvalidRequestLine)?;
        let version = parts.next().ok_or(InvalidRequestLine)?;
        if parts.next().is_some() {
            return Err(InvalidRequestLine);
        }
        Ok(Self {
            method: method.to_owned(),
            target: target.to_owned(),
            version: version.parse().map_err(|_| InvalidRequestLine)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_roundtrip() {
        let v: HttpVersion = "HTTP/1.1".parse().unwrap();
        assert_eq!(v, HttpVersion::HTTP_1_1);
        assert_eq!(v.to_string(), "HTTP/1.1");
        assert_eq!("HTTP/1.0".parse::<HttpVersion>().unwrap(), HttpVersion::HTTP_1_0);
    }

    #[test]
    fn version_rejects_garbage() {
        assert!("HTTP/1".parse::<HttpVersion>().is_err());
        assert!("1.1".parse::<HttpVersion>().is_err());
        assert!("HTTP/x.y".parse::<HttpVersion>().is_err());
    }

    #[test]
    fn request_line() {
        let head = RequestHead::parse("GET /login?user=x HTTP/1.1\r\n").unwrap();
        assert_eq!(head.method, "GET");
        assert_eq!(head.target, "/login?user=x");
        assert_eq!(head.version, HttpVersion::HTTP_1_1);
    }

    #[test]
    fn request_line_rejects_extra_words() {
        assert!(RequestHead::parse("GET /a HTTP/1.1 tail").is_err());
        assert!(RequestHead::parse("GET").is_err());
        assert!(RequestHead::parse("").is_err());
    }
}
