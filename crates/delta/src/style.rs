//! The immutable style value type: a set of attributes with at most one
//! line-scoped member.

use crate::attributes::{AttributeMap, AttributeValue};
use crate::error::Error;
use crate::registry::AttributeRegistry;
use crate::scope::AttributeScope;
use std::collections::BTreeMap;

/// A single named style value: a key, the scope it applies at, and its
/// value. Two attributes are equal iff all three fields match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub key: String,
    pub scope: AttributeScope,
    pub value: AttributeValue,
}

impl Attribute {
    pub fn new(key: impl Into<String>, scope: AttributeScope, value: AttributeValue) -> Self {
        Self {
            key: key.into(),
            scope,
            value,
        }
    }

    pub fn is_unset(&self) -> bool {
        self.value.is_null()
    }
}

/// An immutable mapping of attribute key to [`Attribute`], enforcing that
/// at most one line-scoped attribute is set at a time: `header`, `list`,
/// `blockquote`, and `code-block` are mutually exclusive on a line, and
/// installing a second one silently displaces the first.
///
/// Every mutator returns a new `Style`; there is no in-place mutation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Style {
    attrs: BTreeMap<String, Attribute>,
}

impl Style {
    pub fn new() -> Self {
        Self {
            attrs: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.attrs.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Attribute> {
        self.attrs.get(key)
    }

    pub fn contains_same(&self, attr: &Attribute) -> bool {
        self.attrs.get(&attr.key) == Some(attr)
    }

    /// `true` if no line-scoped attribute is set.
    pub fn is_inline(&self) -> bool {
        self.line_style().is_none()
    }

    /// The unique line-scoped attribute set on this style, if any.
    pub fn line_style(&self) -> Option<&Attribute> {
        self.attrs.values().find(|a| a.scope.is_line())
    }

    /// Installs `attr`, replacing any prior attribute of the same key. If
    /// `attr` is line-scoped, any *other* line-scoped attribute is removed
    /// first — a style carries at most one line attribute.
    pub fn put(mut self, attr: Attribute) -> Self {
        if attr.scope.is_line() {
            self.attrs.retain(|k, a| !a.scope.is_line() || *k == attr.key);
        }
        self.attrs.insert(attr.key.clone(), attr);
        self
    }

    /// Like [`Style::put`], but an *unset* attribute (`value = Null`)
    /// compacts to outright removal rather than being stored as a tombstone.
    pub fn merge(self, attr: Attribute) -> Self {
        if attr.is_unset() {
            let mut next = self;
            next.attrs.remove(&attr.key);
            next
        } else {
            self.put(attr)
        }
    }

    pub fn merge_all(self, attrs: impl IntoIterator<Item = Attribute>) -> Self {
        attrs.into_iter().fold(self, Style::merge)
    }

    pub fn remove_all(mut self, keys: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        for key in keys {
            self.attrs.remove(key.as_ref());
        }
        self
    }

    /// Parses a raw JSON-like attribute map using `registry` to resolve
    /// each key's scope. Unknown keys consult the registry's
    /// `createMissing` policy (default: reject).
    pub fn from_raw_attributes(
        raw: &AttributeMap,
        registry: &AttributeRegistry,
    ) -> Result<Self, Error> {
        let mut style = Style::new();
        for (key, value) in raw {
            let scope = registry.resolve(key)?;
            style = style.merge(Attribute::new(key.clone(), scope, value.clone()));
        }
        Ok(style)
    }

    /// The raw `key -> value` map, or `None` when the style carries no
    /// attributes — callers treat `None` the same as "no formatting".
    pub fn to_map(&self) -> Option<AttributeMap> {
        if self.attrs.is_empty() {
            return None;
        }
        Some(
            self.attrs
                .iter()
                .map(|(k, a)| (k.clone(), a.value.clone()))
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attrs.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold() -> Attribute {
        Attribute::new("bold", AttributeScope::Inline, AttributeValue::Boolean(true))
    }

    fn header(level: i64) -> Attribute {
        Attribute::new("header", AttributeScope::Line, AttributeValue::Number(level))
    }

    fn list(kind: &str) -> Attribute {
        Attribute::new(
            "list",
            AttributeScope::Line,
            AttributeValue::String(kind.to_string()),
        )
    }

    #[test]
    fn put_is_idempotent() {
        let style = Style::new().put(bold());
        let again = style.clone().put(bold());
        assert_eq!(style, again);
    }

    #[test]
    fn put_displaces_other_line_attribute() {
        let style = Style::new().put(header(1)).put(list("bullet"));
        assert_eq!(style.line_style(), Some(&list("bullet")));
        assert!(!style.contains("header"));
    }

    #[test]
    fn merge_unset_removes_present_attribute() {
        let style = Style::new().put(bold());
        let unset = Attribute::new("bold", AttributeScope::Inline, AttributeValue::Null);
        let merged = style.merge(unset);
        assert!(!merged.contains("bold"));
    }

    #[test]
    fn merge_unset_on_absent_attribute_is_noop() {
        let style = Style::new();
        let unset = Attribute::new("bold", AttributeScope::Inline, AttributeValue::Null);
        let merged = style.clone().merge(unset);
        assert_eq!(style, merged);
    }

    #[test]
    fn at_most_one_line_style() {
        let style = Style::new().put(header(1)).put(header(2)).put(list("ordered"));
        assert_eq!(style.line_style(), Some(&list("ordered")));
    }

    #[test]
    fn from_raw_attributes_round_trips_to_map() {
        let registry = AttributeRegistry::standard();
        let mut raw = AttributeMap::new();
        raw.insert("bold".to_string(), AttributeValue::Boolean(true));
        raw.insert("header".to_string(), AttributeValue::Number(2));

        let style = Style::from_raw_attributes(&raw, &registry).unwrap();
        assert_eq!(style.to_map(), Some(raw));
    }

    #[test]
    fn from_raw_attributes_rejects_unknown_key() {
        let registry = AttributeRegistry::standard();
        let mut raw = AttributeMap::new();
        raw.insert("mystery".to_string(), AttributeValue::Boolean(true));
        assert!(Style::from_raw_attributes(&raw, &registry).is_err());
    }
}
