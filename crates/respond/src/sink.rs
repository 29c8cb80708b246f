use bytes::Bytes;
use uhrapi::StatusCode;

use crate::header::{FieldValue, HeaderName};

/// The capability set a transport-level response object exposes to the
/// response layer.
///
/// Implementations buffer: nothing here performs I/O or blocks, the
/// hosting server owns the socket and the lifetime of the exchange. One
/// sink serves exactly one request/response exchange and is never shared
/// across tasks.
pub trait ResponseSink {
    /// Replace the stored value for `name` in the header store.
    fn set_header(&mut self, name: HeaderName, value: FieldValue);

    /// Read back a stored value. Lookup is case-insensitive.
    fn header(&self, name: &str) -> Option<&FieldValue>;

    /// Record the status line. Arrives at most once per exchange.
    fn write_head(&mut self, status: StatusCode, reason: &str);

    /// Terminate the exchange with `body`. Arrives at most once, after
    /// `write_head`.
    fn end(&mut self, body: Bytes);
}
