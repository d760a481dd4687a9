//! Operation types for the Delta format
//!
//! This module defines the fundamental operation types that make up a Delta:
//! - **InsertText**: add new textual content
//! - **InsertObject**: add a single opaque embed of length 1
//! - **Delete**: remove existing content
//! - **Retain**: keep existing content, optionally reapplying attributes
//!
//! Operations are the atomic units of change in the Delta format. They can be
//! combined, transformed, and inverted to support collaborative editing.

use crate::attributes::AttributeMap;
use serde_json::Value as JsonValue;

/// An opaque embedded object: a single key identifying its kind plus its
/// JSON-encoded value (an image URL, a horizontal rule's marker, etc).
///
/// Embeds occupy exactly one character position in the document regardless
/// of how large their `value` is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectValue {
    /// The embed's registry key (e.g. "image", "hr").
    pub key: String,
    /// JSON data associated with the embed.
    pub value: JsonValue,
}

impl ObjectValue {
    pub fn new(key: impl Into<String>, value: JsonValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// A single operation in a Delta.
///
/// Ops are a closed sum: exactly four variants, matching the Delta algebra
/// described by this format. There is no `InsertEmbed`/`RetainEmbed` split —
/// an object insert is atomic and is never retained with changed content,
/// only with changed attributes, which `Retain` already covers by carrying
/// the object's identity implicitly via position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// Inserts text content, optionally carrying formatting attributes.
    /// `text` may contain `'\n'`; an empty string is never a valid insert
    /// (callers must filter it before constructing the op).
    InsertText {
        text: String,
        attributes: Option<AttributeMap>,
    },
    /// Inserts a single opaque embed with optional formatting attributes.
    InsertObject {
        object: ObjectValue,
        attributes: Option<AttributeMap>,
    },
    /// Deletes `length` characters forward from the current position.
    Delete(usize),
    /// Retains `length` characters, optionally re-applying `attributes`
    /// over the retained range (a format operation in disguise).
    Retain {
        length: usize,
        attributes: Option<AttributeMap>,
    },
}

impl Op {
    /// Length of content this op spans. Text ops count Unicode scalar
    /// values, not bytes; object inserts always have length 1.
    pub fn length(&self) -> usize {
        match self {
            Op::InsertText { text, .. } => text.chars().count(),
            Op::InsertObject { .. } => 1,
            Op::Delete(len) => *len,
            Op::Retain { length, .. } => *length,
        }
    }

    pub fn attributes(&self) -> Option<&AttributeMap> {
        match self {
            Op::InsertText { attributes, .. }
            | Op::InsertObject { attributes, .. }
            | Op::Retain { attributes, .. } => attributes.as_ref(),
            Op::Delete(_) => None,
        }
    }

    pub fn attributes_mut(&mut self) -> Option<&mut AttributeMap> {
        match self {
            Op::InsertText { attributes, .. }
            | Op::InsertObject { attributes, .. }
            | Op::Retain { attributes, .. } => attributes.as_mut(),
            Op::Delete(_) => None,
        }
    }

    /// Returns a new op with `attrs` installed, replacing whatever it had.
    /// `Delete` ignores this call — deletes never carry attributes.
    pub fn with_attributes(mut self, attrs: AttributeMap) -> Self {
        match &mut self {
            Op::InsertText { attributes, .. }
            | Op::InsertObject { attributes, .. }
            | Op::Retain { attributes, .. } => {
                *attributes = Some(attrs);
            }
            Op::Delete(_) => {}
        }
        self
    }

    pub fn is_insert(&self) -> bool {
        matches!(self, Op::InsertText { .. } | Op::InsertObject { .. })
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Op::Delete(_))
    }

    pub fn is_retain(&self) -> bool {
        matches!(self, Op::Retain { .. })
    }

    /// True for `InsertObject` — used by the rule pipelines to branch on
    /// object vs. text content without re-matching the whole enum.
    pub fn is_object(&self) -> bool {
        matches!(self, Op::InsertObject { .. })
    }

    pub fn has_attributes(&self) -> bool {
        self.attributes().is_some_and(|a| !a.is_empty())
    }

    pub fn op_type(&self) -> &'static str {
        match self {
            Op::InsertText { .. } => "insert_text",
            Op::InsertObject { .. } => "insert_object",
            Op::Delete(_) => "delete",
            Op::Retain { .. } => "retain",
        }
    }

    /// Does the text payload of this op (or, for an object, its single
    /// placeholder character — see the module doc for `crate::text`) end
    /// with `s`? Non-text ops always answer `false`.
    pub fn ends_with(&self, s: &str) -> bool {
        match self {
            Op::InsertText { text, .. } => text.ends_with(s),
            Op::InsertObject { .. } => s == crate::OBJECT_PLACEHOLDER_STR,
            _ => false,
        }
    }

    pub fn starts_with(&self, s: &str) -> bool {
        match self {
            Op::InsertText { text, .. } => text.starts_with(s),
            Op::InsertObject { .. } => s == crate::OBJECT_PLACEHOLDER_STR,
            _ => false,
        }
    }

    pub fn contains_newline(&self) -> bool {
        matches!(self, Op::InsertText { text, .. } if text.contains('\n'))
    }

    /// Byte offset (in Unicode scalar values, not bytes) of the first
    /// `'\n'` in a text op's content, or `None` if absent/not a text op.
    pub fn index_of_newline(&self) -> Option<usize> {
        match self {
            Op::InsertText { text, .. } => text.chars().position(|c| c == '\n'),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeValue;
    use std::collections::BTreeMap;

    #[test]
    fn test_op_length() {
        let insert_text = Op::InsertText {
            text: "Hello".to_string(),
            attributes: None,
        };
        assert_eq!(insert_text.length(), 5);

        let insert_object = Op::InsertObject {
            object: ObjectValue::new("image", JsonValue::String("url".to_string())),
            attributes: None,
        };
        assert_eq!(insert_object.length(), 1);

        assert_eq!(Op::Delete(10).length(), 10);

        let retain = Op::Retain {
            length: 7,
            attributes: None,
        };
        assert_eq!(retain.length(), 7);
    }

    #[test]
    fn test_op_attributes() {
        let mut attrs = BTreeMap::new();
        attrs.insert("bold".to_string(), AttributeValue::Boolean(true));

        let op = Op::InsertText {
            text: "text".to_string(),
            attributes: Some(attrs.clone()),
        };

        assert_eq!(op.attributes(), Some(&attrs));
        assert!(op.is_insert());
        assert!(!op.is_delete());
        assert!(!op.is_retain());
    }

    #[test]
    fn test_op_type_checks() {
        let insert = Op::InsertText {
            text: "test".to_string(),
            attributes: None,
        };
        assert!(insert.is_insert());
        assert_eq!(insert.op_type(), "insert_text");

        let delete = Op::Delete(5);
        assert!(delete.is_delete());
        assert_eq!(delete.op_type(), "delete");

        let retain = Op::Retain {
            length: 3,
            attributes: None,
        };
        assert!(retain.is_retain());
        assert_eq!(retain.op_type(), "retain");
    }

    #[test]
    fn test_newline_helpers() {
        let op = Op::InsertText {
            text: "ab\ncd".to_string(),
            attributes: None,
        };
        assert!(op.contains_newline());
        assert_eq!(op.index_of_newline(), Some(2));
        assert!(!Op::Delete(3).contains_newline());
    }
}
