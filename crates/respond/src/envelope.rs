use serde::{Deserialize, Serialize};
use serde_json::Value;

use uhrapi::StatusCode;

/// The JSON reply envelope.
///
/// Wire format: `{"code": <int>, "msg": <string>, "data": <any|null>}`,
/// optionally wrapped as `name(...)` for JSONP consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub code: u16,
    pub msg: String,
    pub data: Value,
}

impl Envelope {
    pub fn new(code: StatusCode, msg: impl Into<String>, data: Value) -> Self {
        Self {
            code: code.as_u16(),
            msg: msg.into(),
            data,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("envelope fields serialize to plain JSON")
    }

    /// JSONP rendering: `callback(json)`, with the callback name reduced to
    /// its legal character set first.
    pub fn to_jsonp(&self, callback: &str) -> String {
        let mut out = sanitize_callback(callback);
        out.push('(');
        out.push_str(&self.to_json());
        out.push(')');
        out
    }
}

/// Strip every character outside `[A-Za-z0-9_.-]` from a JSONP callback
/// name. Malformed names are reduced, not rejected.
pub fn sanitize_callback(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_shape() {
        let envelope = Envelope::new(StatusCode::BAD_REQUEST, "oops", Value::Null);
        assert_eq!(envelope.to_json(), r#"{"code":400,"msg":"oops","data":null}"#);

        let envelope = Envelope::new(StatusCode::OK, "success", json!({"a": 1}));
        assert_eq!(envelope.to_json(), r#"{"code":200,"msg":"success","data":{"a":1}}"#);
    }

    #[test]
    fn jsonp_wraps_and_sanitizes() {
        let envelope = Envelope::new(StatusCode::OK, "ok", Value::Null);
        let out = envelope.to_jsonp("cb;alert(1)");
        assert!(out.starts_with("cbalert1("));
        assert!(out.ends_with(')'));
        assert_eq!(out, format!("cbalert1({})", envelope.to_json()));
    }

    #[test]
    fn callback_charset() {
        assert_eq!(sanitize_callback("jQuery1_2.cb-x"), "jQuery1_2.cb-x");
        assert_eq!(sanitize_callback("<script>"), "script");
        assert_eq!(sanitize_callback("a b\tc"), "abc");
    }
}
