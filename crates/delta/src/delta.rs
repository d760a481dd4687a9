//! Delta module - the core operational representation of a document or change.
//!
//! A [`Delta`] is either a **document Delta** (only `InsertText`/`InsertObject`
//! ops, ending in `'\n'`) or a **change Delta** (any mix of retain/insert/
//! delete describing an edit to apply to a document). Both share the same
//! representation and composition algebra.
//!
//! # Examples
//!
//! ```rust
//! use vellum_delta::Delta;
//!
//! let doc = Delta::new()
//!     .insert("Hello world", None)
//!     .insert("\n", None);
//!
//! let change = Delta::new()
//!     .retain(6, None)
//!     .delete(5)
//!     .insert("Rust", None);
//! ```

use crate::attributes::{AttributeMap, AttributeMapOps};
use crate::diff::{diff_text, DiffType};
use crate::op::{ObjectValue, Op};
use crate::op_iterator::OpIterator;
use serde_json::Value as JsonValue;

/// An ordered, normalized sequence of [`Op`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta {
    ops: Vec<Op>,
}

impl Delta {
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Builds a Delta directly from a vector of ops, with no merging or
    /// trimming. Prefer the builder methods unless you already have a
    /// normalized op list (e.g. from JSON deserialization).
    pub fn from_ops(ops: Vec<Op>) -> Self {
        Self { ops }
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn ops_mut(&mut self) -> &mut Vec<Op> {
        &mut self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// A document Delta contains only inserts and its text content ends
    /// in `'\n'` (spec invariant 1). Object-only or empty documents are
    /// never valid documents under this check.
    pub fn is_document(&self) -> bool {
        self.ops.iter().all(|op| op.is_insert()) && self.to_text().ends_with('\n')
    }

    /// Inserts text, merging into the previous op when attributes match.
    /// Empty strings are silently dropped (insert never constructs an
    /// empty `InsertText`).
    pub fn insert<T: Into<String>>(self, text: T, attributes: Option<AttributeMap>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return self;
        }

        let op = Op::InsertText {
            text,
            attributes: normalize_attrs(attributes),
        };
        self.push(op)
    }

    /// Inserts a single opaque embed identified by `key`, with `value` as
    /// its JSON payload.
    pub fn insert_object(
        self,
        key: impl Into<String>,
        value: JsonValue,
        attributes: Option<AttributeMap>,
    ) -> Self {
        let object = ObjectValue::new(key, value);
        let op = Op::InsertObject {
            object,
            attributes: normalize_attrs(attributes),
        };
        self.push(op)
    }

    pub fn delete(self, length: usize) -> Self {
        if length == 0 {
            return self;
        }
        self.push(Op::Delete(length))
    }

    pub fn retain(self, length: usize, attributes: Option<AttributeMap>) -> Self {
        if length == 0 {
            return self;
        }

        let op = Op::Retain {
            length,
            attributes: normalize_attrs(attributes),
        };
        self.push(op)
    }

    /// Appends `new_op`, merging with the previous op when possible and
    /// keeping inserts ordered before a trailing delete.
    pub fn push(mut self, new_op: Op) -> Self {
        if self.ops.is_empty() {
            self.ops.push(new_op);
            return self;
        }

        let last_index = self.ops.len() - 1;
        let last_op = self.ops[last_index].clone();

        if let (Op::Delete(_), Op::Delete(new_len)) = (&last_op, &new_op) {
            if let Op::Delete(ref mut last_len) = self.ops[last_index] {
                *last_len += new_len;
                return self;
            }
        }

        if Self::can_merge_ops(&last_op, &new_op) {
            Self::merge_ops(&mut self.ops[last_index], new_op);
            return self;
        }

        if matches!(last_op, Op::Delete(_)) && new_op.is_insert() {
            if last_index > 0 {
                let prev_op = self.ops[last_index - 1].clone();
                if Self::can_merge_ops(&prev_op, &new_op) {
                    Self::merge_ops(&mut self.ops[last_index - 1], new_op);
                    return self;
                }
            }
            self.ops.insert(last_index, new_op);
            return self;
        }

        self.ops.push(new_op);
        self
    }

    fn can_merge_ops(op1: &Op, op2: &Op) -> bool {
        match (op1, op2) {
            (
                Op::InsertText {
                    attributes: attr1, ..
                },
                Op::InsertText {
                    attributes: attr2, ..
                },
            ) => attr1 == attr2,
            (
                Op::Retain {
                    attributes: attr1, ..
                },
                Op::Retain {
                    attributes: attr2, ..
                },
            ) => attr1 == attr2,
            (Op::Delete(_), Op::Delete(_)) => true,
            _ => false,
        }
    }

    fn merge_ops(op1: &mut Op, op2: Op) {
        match (op1, op2) {
            (Op::InsertText { text: text1, .. }, Op::InsertText { text: text2, .. }) => {
                text1.push_str(&text2);
            }
            (Op::Retain { length: len1, .. }, Op::Retain { length: len2, .. }) => {
                *len1 += len2;
            }
            (Op::Delete(len1), Op::Delete(len2)) => {
                *len1 += len2;
            }
            _ => {}
        }
    }

    /// Drops a trailing `Retain` with no attributes — normalization applied
    /// after `compose`/`transform`/`diff` so a change Delta never ends with
    /// a meaningless retain.
    pub fn chop(mut self) -> Self {
        if let Some(Op::Retain {
            attributes: None, ..
        }) = self.ops.last()
        {
            self.ops.pop();
        }
        self
    }

    pub fn length(&self) -> usize {
        self.ops.iter().map(|op| op.length()).sum()
    }

    /// Net change in document length this Delta would cause if applied.
    pub fn change_length(&self) -> i64 {
        self.ops
            .iter()
            .map(|op| match op {
                Op::InsertText { .. } | Op::InsertObject { .. } => op.length() as i64,
                Op::Delete(len) => -(*len as i64),
                _ => 0,
            })
            .sum()
    }

    pub fn filter<F>(&self, predicate: F) -> Vec<&Op>
    where
        F: Fn(&Op) -> bool,
    {
        self.ops.iter().filter(|op| predicate(op)).collect()
    }

    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&Op),
    {
        for op in &self.ops {
            f(op);
        }
    }

    pub fn map<T, F>(&self, f: F) -> Vec<T>
    where
        F: Fn(&Op) -> T,
    {
        self.ops.iter().map(f).collect()
    }

    /// Extracts the ops covering `[start, end)` (end defaults to the
    /// Delta's length) as a new Delta.
    pub fn slice(&self, start: usize, end: Option<usize>) -> Delta {
        let end = end.unwrap_or(usize::MAX);
        let mut ops = Vec::new();
        let mut iter = OpIterator::new(&self.ops);
        let mut index = 0;

        while index < end && iter.has_next() {
            let next_op = if index < start {
                iter.next(Some(start - index))
            } else {
                let op = iter.next(Some(end - index));
                ops.push(op.clone());
                op
            };
            index += next_op.length();
        }

        Delta::from_ops(ops)
    }

    /// Appends `other`'s ops, merging at the boundary.
    pub fn concat(&self, other: &Delta) -> Delta {
        let mut result = self.clone();
        if !other.ops.is_empty() {
            result = result.push(other.ops[0].clone());
            for op in &other.ops[1..] {
                result.ops.push(op.clone());
            }
        }
        result
    }

    /// Composes `self` followed by `other` into a single equivalent Delta —
    /// the fundamental operation for folding sequential edits together.
    pub fn compose(&self, other: &Delta) -> Delta {
        let mut this_iter = OpIterator::new(&self.ops);
        let mut other_iter = OpIterator::new(&other.ops);
        let mut result = Delta::new();

        if let Some(Op::Retain {
            length,
            attributes: None,
        }) = other_iter.peek()
        {
            let mut first_left = *length;
            while this_iter.peek_type() == "insert_text" && this_iter.peek_length() <= first_left
            {
                first_left -= this_iter.peek_length();
                result = result.push(this_iter.next(None));
            }
            if length - first_left > 0 {
                other_iter.next(Some(length - first_left));
            }
        }

        while this_iter.has_next() || other_iter.has_next() {
            if other_iter.peek_type() == "insert_text" || other_iter.peek_type() == "insert_object"
            {
                result = result.push(other_iter.next(None));
            } else if this_iter.peek_type() == "delete" {
                result = result.push(this_iter.next(None));
            } else {
                let length = std::cmp::min(this_iter.peek_length(), other_iter.peek_length());
                let this_op = this_iter.next(Some(length));
                let other_op = other_iter.next(Some(length));

                match (&this_op, &other_op) {
                    (
                        _,
                        Op::Retain {
                            attributes: other_attrs,
                            ..
                        },
                    ) => {
                        let new_op = match &this_op {
                            Op::Retain {
                                attributes: this_attrs,
                                ..
                            } => Op::Retain {
                                length,
                                attributes: AttributeMapOps::compose(
                                    this_attrs.as_ref(),
                                    other_attrs.as_ref(),
                                    true,
                                ),
                            },
                            Op::InsertText {
                                text,
                                attributes: this_attrs,
                            } => Op::InsertText {
                                text: text.clone(),
                                attributes: AttributeMapOps::compose(
                                    this_attrs.as_ref(),
                                    other_attrs.as_ref(),
                                    false,
                                ),
                            },
                            Op::InsertObject {
                                object,
                                attributes: this_attrs,
                            } => Op::InsertObject {
                                object: object.clone(),
                                attributes: AttributeMapOps::compose(
                                    this_attrs.as_ref(),
                                    other_attrs.as_ref(),
                                    false,
                                ),
                            },
                            _ => this_op,
                        };
                        let new_op_clone = new_op.clone();
                        result = result.push(new_op);

                        if !other_iter.has_next()
                            && matches!(result.ops.last(), Some(last) if *last == new_op_clone)
                        {
                            let rest = Delta::from_ops(this_iter.rest());
                            return result.concat(&rest).chop();
                        }
                    }
                    (Op::Retain { .. } | Op::InsertText { .. } | Op::InsertObject { .. }, Op::Delete(_)) => {
                        result = result.push(other_op);
                    }
                    _ => {} // insert + delete cancels out
                }
            }
        }

        result.chop()
    }

    /// Transforms `self` so it can be applied after `other` in an
    /// operational-transformation sense. `priority` resolves conflicting
    /// attribute writes in favour of `self` when `true`.
    pub fn transform(&self, other: &Delta, priority: bool) -> Delta {
        let mut this_iter = OpIterator::new(&self.ops);
        let mut other_iter = OpIterator::new(&other.ops);
        let mut result = Delta::new();

        while this_iter.has_next() || other_iter.has_next() {
            let this_is_insert =
                this_iter.peek_type() == "insert_text" || this_iter.peek_type() == "insert_object";
            let other_is_insert = other_iter.peek_type() == "insert_text"
                || other_iter.peek_type() == "insert_object";

            if this_is_insert && (priority || !other_is_insert) {
                result = result.retain(this_iter.next(None).length(), None);
            } else if other_is_insert {
                result = result.push(other_iter.next(None));
            } else {
                let length = std::cmp::min(this_iter.peek_length(), other_iter.peek_length());
                let this_op = this_iter.next(Some(length));
                let other_op = other_iter.next(Some(length));

                match (&this_op, &other_op) {
                    (Op::Delete(_), _) => continue,
                    (_, Op::Delete(_)) => {
                        result = result.push(other_op);
                    }
                    (
                        Op::Retain {
                            attributes: this_attrs,
                            ..
                        },
                        Op::Retain {
                            attributes: other_attrs,
                            ..
                        },
                    ) => {
                        result = result.retain(
                            length,
                            AttributeMapOps::transform(
                                this_attrs.as_ref(),
                                other_attrs.as_ref(),
                                priority,
                            ),
                        );
                    }
                    _ => {
                        let this_attrs = this_op.attributes();
                        let other_attrs = other_op.attributes();
                        let transformed_attrs =
                            AttributeMapOps::transform(this_attrs, other_attrs, priority);

                        match &other_op {
                            Op::InsertText { text, .. } => {
                                result = result.insert(text.clone(), transformed_attrs);
                            }
                            Op::InsertObject { object, .. } => {
                                result = result.insert_object(
                                    object.key.clone(),
                                    object.value.clone(),
                                    transformed_attrs,
                                );
                            }
                            Op::Retain { .. } => {
                                result = result.retain(length, transformed_attrs);
                            }
                            _ => {}
                        }
                    }
                }
            }
        }

        result.chop()
    }

    /// Maps a position `index` through this Delta's changes, for tracking
    /// a caret/selection boundary across an edit.
    pub fn transform_position(&self, index: usize, priority: bool) -> usize {
        let mut iter = OpIterator::new(&self.ops);
        let mut offset = 0;
        let mut transformed_index = index;

        while iter.has_next() && offset <= index {
            let length = iter.peek_length();
            let op_type = iter.peek_type();
            iter.next(None);

            match op_type {
                "delete" => {
                    transformed_index =
                        transformed_index.saturating_sub(std::cmp::min(length, index - offset));
                }
                "insert_text" | "insert_object" => {
                    if offset < index || !priority {
                        transformed_index += length;
                    }
                }
                _ => {}
            }

            offset += length;
        }

        transformed_index
    }

    /// Builds the change Delta that transforms the document `self` into
    /// the document `other`. Both must be documents (inserts only).
    pub fn diff(&self, other: &Delta) -> Delta {
        if self.ops == other.ops {
            return Delta::new();
        }

        let self_text = self.to_text();
        let other_text = other.to_text();

        let diff_ops = diff_text(&self_text, &other_text);
        let mut result = Delta::new();
        let mut this_iter = OpIterator::new(&self.ops);
        let mut other_iter = OpIterator::new(&other.ops);

        for diff_op in diff_ops {
            let mut length = diff_op.length();

            while length > 0 {
                match diff_op.operation {
                    DiffType::Insert => {
                        let op_length = std::cmp::min(other_iter.peek_length(), length);
                        result = result.push(other_iter.next(Some(op_length)));
                        length -= op_length;
                    }
                    DiffType::Delete => {
                        let op_length = std::cmp::min(length, this_iter.peek_length());
                        this_iter.next(Some(op_length));
                        result = result.delete(op_length);
                        length -= op_length;
                    }
                    DiffType::Equal => {
                        let op_length = std::cmp::min(
                            std::cmp::min(this_iter.peek_length(), other_iter.peek_length()),
                            length,
                        );
                        let this_op = this_iter.next(Some(op_length));
                        let other_op = other_iter.next(Some(op_length));

                        let content_equal = match (&this_op, &other_op) {
                            (Op::InsertText { text: t1, .. }, Op::InsertText { text: t2, .. }) => {
                                t1 == t2
                            }
                            (
                                Op::InsertObject { object: o1, .. },
                                Op::InsertObject { object: o2, .. },
                            ) => o1 == o2,
                            _ => false,
                        };

                        if content_equal {
                            let attr_diff =
                                AttributeMapOps::diff(this_op.attributes(), other_op.attributes());
                            result = result.retain(op_length, attr_diff);
                        } else {
                            result = result.push(other_op).delete(op_length);
                        }
                        length -= op_length;
                    }
                }
            }
        }

        result.chop()
    }

    /// Builds the Delta that undoes `self`, given `base` — the document
    /// `self` was originally applied to.
    pub fn invert(&self, base: &Delta) -> Delta {
        let mut inverted = Delta::new();
        let mut base_index = 0;

        for op in &self.ops {
            match op {
                Op::InsertText { .. } | Op::InsertObject { .. } => {
                    inverted = inverted.delete(op.length());
                }
                Op::Delete(length) => {
                    let slice = base.slice(base_index, Some(base_index + length));
                    for base_op in slice.ops() {
                        inverted = inverted.push(base_op.clone());
                    }
                    base_index += length;
                }
                Op::Retain { length, attributes } => {
                    if attributes.is_none() {
                        inverted = inverted.retain(*length, None);
                    } else {
                        let slice = base.slice(base_index, Some(base_index + length));
                        for base_op in slice.ops() {
                            let inverted_attrs =
                                AttributeMapOps::invert(attributes.as_ref(), base_op.attributes());
                            inverted = inverted.retain(base_op.length(), inverted_attrs);
                        }
                    }
                    base_index += length;
                }
            }
        }

        inverted.chop()
    }

    /// Text content of a document Delta: text inserts concatenated, with
    /// one `OBJECT_PLACEHOLDER` character per object insert. Meaningless
    /// on a change Delta (it has no defined "content").
    pub fn to_text(&self) -> String {
        let mut result = String::new();
        for op in &self.ops {
            match op {
                Op::InsertText { text, .. } => result.push_str(text),
                Op::InsertObject { .. } => result.push(crate::OBJECT_PLACEHOLDER),
                _ => {}
            }
        }
        result
    }
}

fn normalize_attrs(attributes: Option<AttributeMap>) -> Option<AttributeMap> {
    attributes.filter(|a| !a.is_empty())
}

impl Default for Delta {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeValue;
    use std::collections::BTreeMap;

    #[test]
    fn test_delta_construction() {
        let delta = Delta::new();
        assert!(delta.ops().is_empty());

        let delta = Delta::new()
            .insert("Hello", None)
            .insert(" ", None)
            .insert("World", None);

        assert_eq!(delta.ops().len(), 1);
        if let Op::InsertText { text, .. } = &delta.ops()[0] {
            assert_eq!(text, "Hello World");
        } else {
            panic!("Expected insert_text operation");
        }
    }

    #[test]
    fn test_delta_attributes() {
        let mut attrs = BTreeMap::new();
        attrs.insert("bold".to_string(), AttributeValue::Boolean(true));

        let delta = Delta::new()
            .insert("Hello", Some(attrs.clone()))
            .insert("World", Some(attrs));

        assert_eq!(delta.ops().len(), 1);
        if let Op::InsertText { text, attributes } = &delta.ops()[0] {
            assert_eq!(text, "HelloWorld");
            assert!(attributes.is_some());
        } else {
            panic!("Expected insert_text operation");
        }
    }

    #[test]
    fn test_delta_different_attributes() {
        let mut bold = BTreeMap::new();
        bold.insert("bold".to_string(), AttributeValue::Boolean(true));

        let mut italic = BTreeMap::new();
        italic.insert("italic".to_string(), AttributeValue::Boolean(true));

        let delta = Delta::new()
            .insert("Hello", Some(bold))
            .insert("World", Some(italic));

        assert_eq!(delta.ops().len(), 2);
    }

    #[test]
    fn test_delta_delete_merge() {
        let delta = Delta::new().delete(5).delete(3);

        assert_eq!(delta.ops().len(), 1);
        if let Op::Delete(len) = delta.ops()[0] {
            assert_eq!(len, 8);
        } else {
            panic!("Expected delete operation");
        }
    }

    #[test]
    fn test_delta_insert_before_delete() {
        let delta = Delta::new().delete(5).insert("Hello", None);

        assert_eq!(delta.ops().len(), 2);
        assert!(delta.ops()[0].is_insert());
        assert!(delta.ops()[1].is_delete());
    }

    #[test]
    fn test_delta_length() {
        let delta = Delta::new().insert("Hello", None).retain(5, None).delete(3);
        assert_eq!(delta.length(), 13);
    }

    #[test]
    fn test_delta_change_length() {
        let delta = Delta::new().insert("Hello", None).retain(5, None).delete(3);
        assert_eq!(delta.change_length(), 2);
    }

    #[test]
    fn test_delta_slice() {
        let delta = Delta::new().insert("Hello World", None);

        let sliced = delta.slice(0, Some(5));
        assert_eq!(sliced.ops().len(), 1);
        if let Op::InsertText { text, .. } = &sliced.ops()[0] {
            assert_eq!(text, "Hello");
        } else {
            panic!("Expected insert_text operation");
        }

        let sliced = delta.slice(6, None);
        assert_eq!(sliced.ops().len(), 1);
        if let Op::InsertText { text, .. } = &sliced.ops()[0] {
            assert_eq!(text, "World");
        } else {
            panic!("Expected insert_text operation");
        }
    }

    #[test]
    fn test_delta_chop() {
        let delta = Delta::new().insert("Hello", None).retain(5, None).chop();
        assert_eq!(delta.ops().len(), 1);
        assert!(delta.ops()[0].is_insert());
    }

    #[test]
    fn test_compose_associative() {
        let a = Delta::new().insert("Hello World", None);
        let b = Delta::new().retain(6, None).delete(5).insert("Rust", None);
        let mut bold = BTreeMap::new();
        bold.insert("bold".to_string(), AttributeValue::Boolean(true));
        let c = Delta::new().retain(6, None).retain(4, Some(bold));

        let left = a.compose(&b).compose(&c);
        let right = a.compose(&b.compose(&c));
        assert_eq!(left, right);
    }

    #[test]
    fn test_invert_round_trip() {
        let base = Delta::new().insert("Hello World", None).insert("\n", None);
        let change = Delta::new().retain(6, None).delete(5).insert("Rust", None);

        let result = base.compose(&change);
        let inverted = change.invert(&base);
        let restored = result.compose(&inverted);

        assert_eq!(restored, base);
    }

    #[test]
    fn test_document_detection() {
        let doc = Delta::new().insert("Hello\n", None);
        assert!(doc.is_document());

        let not_doc = Delta::new().retain(5, None);
        assert!(!not_doc.is_document());

        let unterminated = Delta::new().insert("Hello", None);
        assert!(!unterminated.is_document());
    }
}
