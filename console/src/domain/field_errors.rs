//! Aggregated per-field validation messages.

use std::collections::BTreeMap;
use std::fmt;

/// Validation messages keyed by form field.
///
/// Validation never fails fast: every check runs and each failing field
/// keeps its own message so the form can render them inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors<K: Ord> {
    messages: BTreeMap<K, String>,
}

impl<K: Ord> Default for FieldErrors<K> {
    fn default() -> Self {
        Self {
            messages: BTreeMap::new(),
        }
    }
}

impl<K: Ord> FieldErrors<K> {
    /// Empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`, replacing any earlier one.
    pub fn insert(&mut self, field: K, message: impl Into<String>) {
        self.messages.insert(field, message.into());
    }

    /// Record `message` when `failed` holds.
    pub fn check(&mut self, failed: bool, field: K, message: &str) {
        if failed {
            self.insert(field, message);
        }
    }

    /// Drop the message for one field, typically once the user edits it.
    pub fn clear(&mut self, field: &K) {
        self.messages.remove(field);
    }

    /// Message recorded for `field`.
    pub fn get(&self, field: &K) -> Option<&str> {
        self.messages.get(field).map(String::as_str)
    }

    /// Whether validation passed.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Failing fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &str)> {
        self.messages
            .iter()
            .map(|(field, message)| (field, message.as_str()))
    }

    /// `Ok(())` when empty, otherwise the errors themselves.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl<K: Ord> fmt::Display for FieldErrors<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for message in self.messages.values() {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(message)?;
            first = false;
        }
        Ok(())
    }
}

impl<K: Ord + fmt::Debug> std::error::Error for FieldErrors<K> {}
