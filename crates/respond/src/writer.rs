use std::sync::Arc;

use bytes::Bytes;
use log::{debug, warn};
use serde_json::Value;
use uhrapi::{RequestHead, StatusCode};

use crate::{
    envelope::Envelope,
    header::{FieldValue, HeaderName, has_charset_param},
    sink::ResponseSink,
    status::StatusTable,
};

/// One-shot gate over the response lifecycle. `Open` transitions to
/// `Finalized` exactly once and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteState {
    Open,
    Finalized,
}

/// Decorator over a [`ResponseSink`] for one request/response exchange.
///
/// Adds header discipline, buffered status, and formatting helpers for
/// HTML, JSON envelopes, redirects and downloads. Every helper funnels
/// through [`end`](ResponseWriter::end), the single place that flushes the
/// head and terminates the body. After that, any further mutation is
/// dropped: a sink whose head and body are already on the wire must not be
/// touched again.
pub struct ResponseWriter<S: ResponseSink> {
    sink: S,
    table: Arc<StatusTable>,
    request: Option<RequestHead>,
    state: WriteState,
    pending_status: Option<StatusCode>,
}

impl<S: ResponseSink> ResponseWriter<S> {
    pub fn new(sink: S, table: Arc<StatusTable>) -> Self {
        Self {
            sink,
            table,
            request: None,
            state: WriteState::Open,
            pending_status: None,
        }
    }

    /// Attach the originating request. The writer never consults it; it is
    /// carried for the hosting code's benefit.
    pub fn with_request(sink: S, table: Arc<StatusTable>, request: RequestHead) -> Self {
        Self {
            request: Some(request),
            ..Self::new(sink, table)
        }
    }

    pub fn request(&self) -> Option<&RequestHead> {
        self.request.as_ref()
    }

    pub fn is_finalized(&self) -> bool {
        self.state == WriteState::Finalized
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Hand the sink back to the hosting layer, typically after finalize.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// True (and logged) when the exchange is already finalized and the
    /// pending operation must be dropped.
    fn dropped(&self, op: &str) -> bool {
        if self.state == WriteState::Finalized {
            debug!("response already finalized, dropping {op}");
            return true;
        }
        false
    }

    /// Store a header on the sink.
    ///
    /// Values coerce to strings via [`FieldValue`]. A `Content-Type` value
    /// without a `charset` parameter gets `; charset=utf-8` appended.
    /// Invalid names are discarded rather than raised.
    pub fn set_header(&mut self, name: &str, value: impl Into<FieldValue>) {
        if self.dropped("header") {
            return;
        }
        let name: HeaderName = match name.parse() {
            Ok(name) => name,
            Err(_) => {
                warn!("discarding header with invalid name {name:?}");
                return;
            }
        };
        let mut value = value.into();
        if name == HeaderName::CONTENT_TYPE {
            for v in value.values_mut() {
                if !has_charset_param(v) {
                    v.push_str("; charset=utf-8");
                }
            }
        }
        self.sink.set_header(name, value);
    }

    /// Store a whole mapping of headers, one [`set_header`] per entry.
    ///
    /// [`set_header`]: ResponseWriter::set_header
    pub fn set_headers<'a, I, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (&'a str, V)>,
        V: Into<FieldValue>,
    {
        for (name, value) in pairs {
            self.set_header(name, value);
        }
    }

    /// Read back a stored header. Never gated: reads are always safe.
    pub fn header(&self, name: &str) -> Option<&FieldValue> {
        self.sink.header(name)
    }

    /// Merge `value` into the stored header: absent fields behave like
    /// [`set_header`], present fields keep their values and append the new
    /// ones in order.
    ///
    /// [`set_header`]: ResponseWriter::set_header
    pub fn append_header(&mut self, name: &str, value: impl Into<FieldValue>) {
        if self.dropped("header") {
            return;
        }
        let value = value.into();
        match self.sink.header(name) {
            Some(prev) => {
                let mut merged = prev.clone();
                merged.extend_from(value);
                self.set_header(name, merged);
            }
            None => self.set_header(name, value),
        }
    }

    /// Buffer the status for the head line. Resolved at [`end`] time; the
    /// last call before finalize wins.
    ///
    /// [`end`]: ResponseWriter::end
    pub fn set_status(&mut self, status: StatusCode) {
        if self.dropped("status") {
            return;
        }
        self.pending_status = Some(status);
    }

    /// Finalize the exchange: resolve the status (buffered code, else 200),
    /// write the head with the table's reason text, terminate the body.
    ///
    /// Idempotent — only the first call reaches the sink.
    pub fn end(&mut self, body: impl Into<Bytes>) {
        if self.dropped("finalize") {
            return;
        }
        self.state = WriteState::Finalized;
        let status = self.pending_status.take().unwrap_or(StatusCode::OK);
        let reason = self.table.reason(status).unwrap_or("");
        self.sink.write_head(status, reason);
        self.sink.end(body.into());
    }

    /// HTML error page. A `None` message falls back to the table text for
    /// `status`.
    pub fn error(&mut self, status: StatusCode, message: Option<&str>) {
        if self.dropped("error reply") {
            return;
        }
        let message = match message {
            Some(message) => message.to_owned(),
            None => self.table.reason(status).unwrap_or("").to_owned(),
        };
        self.set_status(status);
        self.set_header("Content-Type", "text/html; charset=utf-8");
        self.end(format!(
            "<fieldset><legend>Http Status: {status}</legend><pre>{message}</pre></fieldset>"
        ));
    }

    /// HTTP redirect: 301 when `permanent`, else 302. A url with no
    /// `http://`, `https://` or `ftp://` prefix becomes scheme-relative.
    pub fn redirect(&mut self, url: &str, permanent: bool) {
        if self.dropped("redirect") {
            return;
        }
        let location = if has_scheme(url) {
            url.to_owned()
        } else {
            format!("//{url}")
        };
        self.set_header("Location", location);
        self.set_status(if permanent {
            StatusCode::MOVED_PERMANENTLY
        } else {
            StatusCode::FOUND
        });
        self.end("");
    }

    /// Client-side redirect: a 200 page whose script assigns
    /// `location.href`.
    pub fn location(&mut self, url: &str) {
        if self.dropped("redirect") {
            return;
        }
        self.render(format!(
            "<html><head><script>location.href=\"{url}\"</script></head></html>"
        ));
    }

    /// HTML body with status 200.
    pub fn render(&mut self, body: impl AsRef<str>) {
        self.render_with_status(StatusCode::OK, body);
    }

    /// HTML body. An empty body falls back to the table text for `status`;
    /// a non-200 status is buffered for the head line.
    pub fn render_with_status(&mut self, status: StatusCode, body: impl AsRef<str>) {
        if self.dropped("render") {
            return;
        }
        let body = match body.as_ref() {
            "" => self.table.reason(status).unwrap_or("").to_owned(),
            body => body.to_owned(),
        };
        self.set_header("Content-Type", "text/html");
        self.set_header("Content-Length", body.len());
        if status != StatusCode::OK {
            self.set_status(status);
        }
        self.end(body);
    }

    /// Forced download. Quote and control characters are stripped from
    /// `filename` before it lands in `Content-Disposition`.
    pub fn sendfile(&mut self, data: impl Into<Bytes>, filename: &str) {
        if self.dropped("file reply") {
            return;
        }
        let data = data.into();
        let filename = sanitize_filename(filename);
        self.set_header("Content-Type", "application/force-download");
        self.set_header("Accept-Ranges", "bytes");
        self.set_header("Content-Length", data.len());
        self.set_header(
            "Content-Disposition",
            format!("attachment;filename=\"{filename}\""),
        );
        self.end(data);
    }

    /// JSON envelope reply. A code above 200 also becomes the HTTP status;
    /// 200 itself is the sink default and is not re-applied.
    pub fn send(&mut self, envelope: Envelope) {
        self.send_inner(envelope, None);
    }

    /// JSON envelope reply wrapped as a JSONP call.
    pub fn send_jsonp(&mut self, envelope: Envelope, callback: &str) {
        self.send_inner(envelope, Some(callback));
    }

    /// Success envelope: code 200, message from the table, `data` attached.
    pub fn send_success(&mut self, data: Value) {
        let envelope = Envelope {
            code: StatusCode::OK.as_u16(),
            msg: self.table_msg(StatusCode::OK),
            data,
        };
        self.send(envelope);
    }

    /// Usage-error envelope: code 400 with the given message and no data.
    pub fn send_error(&mut self, message: impl Into<String>) {
        let envelope = Envelope {
            code: StatusCode::BAD_REQUEST.as_u16(),
            msg: message.into(),
            data: Value::Null,
        };
        self.send(envelope);
    }

    /// Bare status envelope: message from the table, no data.
    pub fn send_status(&mut self, status: StatusCode) {
        let envelope = Envelope {
            code: status.as_u16(),
            msg: self.table_msg(status),
            data: Value::Null,
        };
        self.send(envelope);
    }

    fn table_msg(&self, status: StatusCode) -> String {
        self.table.reason(status).unwrap_or("success").to_owned()
    }

    fn send_inner(&mut self, envelope: Envelope, callback: Option<&str>) {
        if self.dropped("json reply") {
            return;
        }
        let output = match callback {
            Some(callback) => envelope.to_jsonp(callback),
            None => envelope.to_json(),
        };
        self.set_header("Content-Type", "application/json");
        self.set_header("Content-Length", output.len());
        if envelope.code > 200
            && let Ok(status) = StatusCode::from_u16(envelope.code)
        {
            self.set_status(status);
        }
        self.end(output);
    }
}

fn has_scheme(url: &str) -> bool {
    ["http://", "https://", "ftp://"]
        .iter()
        .any(|scheme| url.starts_with(scheme))
}

fn sanitize_filename(name: &str) -> String {
    name.chars().filter(|c| *c != '"' && !c.is_control()).collect()
}
