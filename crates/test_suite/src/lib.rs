//! Shared test support for the cinder workspace.

use bytes::Bytes;
use cinder_respond::ResponseSink;
use cinder_respond::header::{FieldValue, HeaderMap, HeaderName};
use uhrapi::StatusCode;

/// Recording [`ResponseSink`].
///
/// Stores everything pushed at it and counts head/end calls, so tests can
/// assert both the stored state and the single-write law. Unlike a real
/// sink it records repeated head/end calls too — surfacing contract
/// violations is the point.
#[derive(Debug, Default)]
pub struct MockSink {
    pub headers: HeaderMap,
    pub head: Option<(StatusCode, String)>,
    pub body: Option<Bytes>,
    pub head_calls: usize,
    pub end_calls: usize,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored single value for `name`, when present.
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(FieldValue::one)
    }

    /// Every stored value for `name`, in order.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .get(name)
            .map(|value| value.iter().collect())
            .unwrap_or_default()
    }

    /// The recorded body as text. Empty when nothing was written.
    pub fn body_str(&self) -> &str {
        self.body
            .as_deref()
            .map(|body| std::str::from_utf8(body).expect("body should be utf-8"))
            .unwrap_or("")
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.head.as_ref().map(|(status, _)| *status)
    }

    pub fn reason(&self) -> Option<&str> {
        self.head.as_ref().map(|(_, reason)| reason.as_str())
    }
}

impl ResponseSink for MockSink {
    fn set_header(&mut self, name: HeaderName, value: FieldValue) {
        self.headers.insert(name, value);
    }

    fn header(&self, name: &str) -> Option<&FieldValue> {
        self.headers.get(name)
    }

    fn write_head(&mut self, status: StatusCode, reason: &str) {
        self.head_calls += 1;
        self.head = Some((status, reason.to_owned()));
    }

    fn end(&mut self, body: Bytes) {
        self.end_calls += 1;
        self.body = Some(body);
    }
}
