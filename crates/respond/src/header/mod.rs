mod map;
mod value;
pub use map::HeaderMap;
pub use value::FieldValue;

use std::fmt::Display;
use std::str::FromStr;

use unicase::UniCase;

#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid header name")]
pub struct InvalidHeaderName;

/// A validated, case-insensitive header field name.
///
/// Names the response layer emits itself get a builtin representation with
/// a canonical rendering; everything else keeps the caller's spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderName(Repr);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Repr {
    Builtin(Builtin),
    Custom(UniCase<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Builtin {
    ContentType,
    ContentLength,
    ContentDisposition,
    AcceptRanges,
    Location,
}

impl Builtin {
    const MAP: &[(&'static str, Builtin)] = &[
        ("content-type", Self::ContentType),
        ("content-length", Self::ContentLength),
        ("content-disposition", Self::ContentDisposition),
        ("accept-ranges", Self::AcceptRanges),
        ("location", Self::Location),
    ];

    fn from_name(name: &str) -> Option<Self> {
        Self::MAP
            .iter()
            .find(|(s, _)| name.eq_ignore_ascii_case(s))
            .map(|(_, b)| *b)
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::ContentType => "Content-Type",
            Self::ContentLength => "Content-Length",
            Self::ContentDisposition => "Content-Disposition",
            Self::AcceptRanges => "Accept-Ranges",
            Self::Location => "Location",
        }
    }
}

impl HeaderName {
    pub const CONTENT_TYPE: Self = Self(Repr::Builtin(Builtin::ContentType));
    pub const CONTENT_LENGTH: Self = Self(Repr::Builtin(Builtin::ContentLength));
    pub const CONTENT_DISPOSITION: Self = Self(Repr::Builtin(Builtin::ContentDisposition));
    pub const ACCEPT_RANGES: Self = Self(Repr::Builtin(Builtin::AcceptRanges));
    pub const LOCATION: Self = Self(Repr::Builtin(Builtin::Location));

    /// The name as it will appear on the wire. Builtins render in their
    /// canonical capitalization, custom names keep the caller's spelling.
    pub fn as_str(&self) -> &str {
        match &self.0 {
            Repr::Builtin(builtin) => builtin.as_str(),
            Repr::Custom(name) => name,
        }
    }

    /// Case-insensitive comparison against a raw string.
    pub fn is(&self, name: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(name)
    }
}

/// Field names are tokens.
/// SPEC: RFC 9110 - 5.1. Field Names
/// ABNF: field-name = token
fn is_tchar(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
        )
}

impl FromStr for HeaderName {
    type Err = InvalidHeaderName;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        if name.is_empty() || !name.bytes().all(is_tchar) {
            return Err(InvalidHeaderName);
        }
        Ok(match Builtin::from_name(name) {
            Some(builtin) => Self(Repr::Builtin(builtin)),
            None => Self(Repr::Custom(UniCase::new(name.to_owned()))),
        })
    }
}

impl Display for HeaderName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scan a field value for a `charset` parameter: `;` OWS `charset` OWS `=`.
pub(crate) fn has_charset_param(value: &str) -> bool {
    let bytes = value.as_bytes();
    memchr::memchr_iter(b';', bytes).any(|semi| {
        let rest = trim_ows(&bytes[semi + 1..]);
        match rest.split_at_checked(7) {
            Some((param, rest)) => {
                param.eq_ignore_ascii_case(b"charset") && trim_ows(rest).first() == Some(&b'=')
            }
            None => false,
        }
    })
}

fn trim_ows(mut bytes: &[u8]) -> &[u8] {
    while let Some((first, rest)) = bytes.split_first() {
        if !first.is_ascii_whitespace() {
            break;
        }
        bytes = rest;
    }
    bytes
}
