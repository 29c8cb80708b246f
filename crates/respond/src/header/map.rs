use super::{FieldValue, HeaderName};

/// Insertion-ordered header store.
///
/// Backed by a flat list: the handful of headers a response carries makes
/// linear lookup cheaper than hashing, and the wire encoder needs a stable
/// order.
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    entries: Vec<(HeaderName, FieldValue)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Store `value` under `name`, replacing any previous value in place
    /// so the field keeps its original position.
    pub fn insert(&mut self, name: HeaderName, value: FieldValue) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(n, _)| n.is(name))
            .map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n.is(name))
            .map(|(_, v)| v)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        let position = self.entries.iter().position(|(n, _)| n.is(name))?;
        Some(self.entries.remove(position).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &FieldValue)> {
        self.entries.iter().map(|(n, v)| (n, v))
    }
}
