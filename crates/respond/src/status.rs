use std::collections::HashMap;

use uhrapi::StatusCode;

/// The injected status-message table.
///
/// Consulted for head-line reason text and for the default messages of the
/// HTML and JSON helpers. Read-only once handed to a writer; build it at
/// process start and share it with [`std::sync::Arc`].
///
/// [`StatusTable::default`] layers `200 => "success"` over the canonical
/// registry: the envelope helpers reply with the table text for their code,
/// and plain success replies historically read `"success"`.
#[derive(Debug, Clone)]
pub struct StatusTable {
    overrides: HashMap<u16, String>,
}

impl Default for StatusTable {
    fn default() -> Self {
        Self::canonical().with_reason(StatusCode::OK, "success")
    }
}

impl StatusTable {
    /// The canonical registry phrases, nothing else.
    pub fn canonical() -> Self {
        Self {
            overrides: HashMap::new(),
        }
    }

    /// Override (or add) the text for one code.
    #[must_use]
    pub fn with_reason(mut self, code: StatusCode, reason: impl Into<String>) -> Self {
        self.overrides.insert(code.as_u16(), reason.into());
        self
    }

    /// Text for `code`: overrides first, then the canonical registry.
    /// `None` when neither knows the code; the writer renders an empty
    /// reason in that case.
    pub fn reason(&self, code: StatusCode) -> Option<&str> {
        match self.overrides.get(&code.as_u16()) {
            Some(reason) => Some(reason),
            None => code.canonical_reason(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_reads_success_for_200() {
        let table = StatusTable::default();
        assert_eq!(table.reason(StatusCode::OK), Some("success"));
        assert_eq!(table.reason(StatusCode::NOT_FOUND), Some("Not Found"));
    }

    #[test]
    fn overrides_win_over_registry() {
        let table = StatusTable::canonical().with_reason(StatusCode::NOT_FOUND, "Nope");
        assert_eq!(table.reason(StatusCode::NOT_FOUND), Some("Nope"));
        assert_eq!(table.reason(StatusCode::OK), Some("OK"));
    }

    #[test]
    fn unknown_codes_have_no_reason() {
        let table = StatusTable::default();
        assert_eq!(table.reason(StatusCode::from_u16(599).unwrap()), None);
    }
}
