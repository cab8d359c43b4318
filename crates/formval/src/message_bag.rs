//! Ordered per-field collection of validation failure messages.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// Error messages accumulated during one validation sweep.
///
/// A field key exists in the bag iff at least one rule failed for it.
/// Field order is first-failure order; message order within a field is
/// rule-declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageBag {
    fields: Vec<(String, Vec<String>)>,
}

impl MessageBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an error message to a field's list.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        if let Some(slot) = self.fields.iter_mut().find(|(name, _)| *name == field) {
            slot.1.push(message.into());
        } else {
            self.fields.push((field, vec![message.into()]));
        }
    }

    /// Whether any errors were recorded.
    pub fn has_errors(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Whether the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether the field has at least one error.
    pub fn has(&self, field: &str) -> bool {
        self.fields.iter().any(|(name, _)| name == field)
    }

    /// The first error recorded for a field.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field).first().map(String::as_str)
    }

    /// All errors recorded for a field, empty if none.
    pub fn get(&self, field: &str) -> &[String] {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
            .unwrap_or(&[])
    }

    /// Every message across all fields, in bag order.
    pub fn flatten(&self) -> Vec<&str> {
        self.fields
            .iter()
            .flat_map(|(_, messages)| messages.iter().map(String::as_str))
            .collect()
    }

    /// Total number of messages.
    pub fn count(&self) -> usize {
        self.fields.iter().map(|(_, messages)| messages.len()).sum()
    }

    /// Fields with errors, in first-failure order.
    pub fn keys(&self) -> Vec<&str> {
        self.fields.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Iterate `(field, messages)` pairs in bag order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.fields.iter(),
        }
    }
}

impl<'a> IntoIterator for &'a MessageBag {
    type Item = (&'a str, &'a [String]);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// Iterator over a bag's `(field, messages)` pairs.
pub struct Iter<'a> {
    inner: std::slice::Iter<'a, (String, Vec<String>)>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a [String]);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }
}

impl fmt::Display for MessageBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.count())
    }
}

impl Serialize for MessageBag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, messages) in &self.fields {
            map.serialize_entry(field, messages)?;
        }
        map.end()
    }
}
