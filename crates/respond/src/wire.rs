use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use uhrapi::{HttpVersion, StatusCode};

use crate::{
    header::{FieldValue, HeaderMap, HeaderName},
    sink::ResponseSink,
};

/// In-memory [`ResponseSink`].
///
/// Collects the head line, header store and body of one exchange; the
/// hosting layer encodes the finished exchange onto its socket with
/// [`write_to`](BufferedSink::write_to) once the writer has finalized.
#[derive(Debug, Default)]
pub struct BufferedSink {
    version: HttpVersion,
    head: Option<(StatusCode, String)>,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl BufferedSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(version: HttpVersion) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    pub fn head(&self) -> Option<(StatusCode, &str)> {
        self.head.as_ref().map(|(status, reason)| (*status, reason.as_str()))
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    pub fn is_ended(&self) -> bool {
        self.body.is_some()
    }

    /// Serialize the exchange: head line, header lines in insertion order
    /// (one line per value for multi-valued fields), blank line, body. An
    /// exchange that never saw a head line encodes as `200` with an empty
    /// reason.
    pub fn encode(&self, buf: &mut BytesMut) {
        let (status, reason) = match &self.head {
            Some((status, reason)) => (*status, reason.as_str()),
            None => (StatusCode::OK, ""),
        };

        let mut digits = itoa::Buffer::new();
        buf.put_slice(b"HTTP/");
        buf.put_slice(digits.format(self.version.major).as_bytes());
        buf.put_slice(b".");
        buf.put_slice(digits.format(self.version.minor).as_bytes());
        buf.put_slice(b" ");
        buf.put_slice(digits.format(status.as_u16()).as_bytes());
        buf.put_slice(b" ");
        buf.put_slice(reason.as_bytes());
        buf.put_slice(b"\r\n");

        for (name, value) in self.headers.iter() {
            for v in value.iter() {
                buf.put_slice(name.as_str().as_bytes());
                buf.put_slice(b": ");
                buf.put_slice(v.as_bytes());
                buf.put_slice(b"\r\n");
            }
        }
        buf.put_slice(b"\r\n");

        if let Some(body) = &self.body {
            buf.put_slice(body);
        }
    }

    /// Encode and flush the exchange onto `writer`.
    pub async fn write_to<W>(&self, writer: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let mut buf = BytesMut::with_capacity(1024);
        self.encode(&mut buf);
        writer.write_all(&buf).await?;
        writer.flush().await
    }
}

impl ResponseSink for BufferedSink {
    fn set_header(&mut self, name: HeaderName, value: FieldValue) {
        self.headers.insert(name, value);
    }

    fn header(&self, name: &str) -> Option<&FieldValue> {
        self.headers.get(name)
    }

    fn write_head(&mut self, status: StatusCode, reason: &str) {
        // first head wins, matching the exchange contract
        if self.head.is_none() {
            self.head = Some((status, reason.to_owned()));
        }
    }

    fn end(&mut self, body: Bytes) {
        if self.body.is_none() {
            self.body = Some(body);
        }
    }
}

static_assertions::assert_impl_all!(crate::ResponseWriter<BufferedSink>: Send);
static_assertions::assert_impl_all!(BufferedSink: Send, Sync);

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn sink_with_reply() -> BufferedSink {
        let mut sink = BufferedSink::new();
        sink.set_header("Content-Type".parse().unwrap(), "text/html; charset=utf-8".into());
        sink.set_header("X-A".parse().unwrap(), ["1", "2"].into());
        sink.write_head(StatusCode::NOT_FOUND, "Not Found");
        sink.end(Bytes::from_static(b"gone"));
        sink
    }

    #[test]
    fn encode_is_deterministic() {
        let mut buf = BytesMut::new();
        sink_with_reply().encode(&mut buf);
        assert_eq!(
            &buf[..],
            b"HTTP/1.1 404 Not Found\r\n\
              Content-Type: text/html; charset=utf-8\r\n\
              X-A: 1\r\n\
              X-A: 2\r\n\
              \r\n\
              gone" as &[u8]
        );
    }

    #[test]
    fn encode_without_head_defaults_to_200() {
        let mut buf = BytesMut::new();
        BufferedSink::new().encode(&mut buf);
        assert_eq!(&buf[..], b"HTTP/1.1 200 \r\n\r\n" as &[u8]);
    }

    #[test]
    fn head_and_end_are_first_write_wins() {
        let mut sink = BufferedSink::new();
        sink.write_head(StatusCode::OK, "OK");
        sink.write_head(StatusCode::NOT_FOUND, "Not Found");
        sink.end(Bytes::from_static(b"a"));
        sink.end(Bytes::from_static(b"b"));
        assert_eq!(sink.head(), Some((StatusCode::OK, "OK")));
        assert_eq!(sink.body().unwrap().as_ref(), b"a");
    }

    #[tokio::test]
    async fn write_to_flushes_encoded_bytes() {
        let sink = sink_with_reply();
        let mut out = Cursor::new(Vec::new());
        sink.write_to(&mut out).await.unwrap();

        let mut expected = BytesMut::new();
        sink.encode(&mut expected);
        assert_eq!(out.into_inner(), &expected[..]);
    }
}
