//! The document controller (spec §4.6): owns the canonical [`Delta`] and
//! its mirror [`Tree`], runs the heuristic rule pipelines, and publishes a
//! [`ChangeEvent`] for every successful edit.

use vellum_delta::{
    AttributeMap, AttributeRegistry, Attribute, Delta, EmbedRegistry, JsonValue, Op, Placement, Style,
    OBJECT_PLACEHOLDER,
};
use vellum_log::debug;
use vellum_tree::Tree;

use crate::change::{ChangeEvent, ChangeStream, Source};
use crate::error::Error;
use crate::rules::{
    standard_delete_rules, standard_format_rules, standard_insert_object_rules,
    standard_insert_rules, DeleteRule, FormatRule, InsertObjectRule, InsertRule, RuleContext,
};

/// A live, editable document: the running Delta, the tree that mirrors it,
/// the two read-only registries, the four rule pipelines, and the change
/// stream. Single-threaded and synchronous, per spec §5.
pub struct Document {
    delta: Delta,
    tree: Tree,
    attributes: AttributeRegistry,
    embeds: EmbedRegistry,
    insert_rules: Vec<InsertRule>,
    insert_object_rules: Vec<InsertObjectRule>,
    format_rules: Vec<FormatRule>,
    delete_rules: Vec<DeleteRule>,
    changes: ChangeStream,
    closed: bool,
    /// `(before, change)` of the most recently applied edit, kept for
    /// [`Document::invert_last`]. Not a full undo/redo manager — a host
    /// wanting grouped undo stacks builds one on top of this primitive.
    last_change: Option<(Delta, Delta)>,
}

impl Document {
    /// A fresh document holding the minimal valid Delta, `"\n"`, with the
    /// standard rule pipelines.
    pub fn new(attributes: AttributeRegistry, embeds: EmbedRegistry) -> Self {
        Self::with_rules(
            attributes,
            embeds,
            standard_insert_rules(),
            standard_insert_object_rules(),
            standard_format_rules(),
            standard_delete_rules(),
        )
    }

    /// Like [`Document::new`] but with caller-supplied rule pipelines. Each
    /// list must end in a catch-all — the controller has no way to verify
    /// that, so a host replacing the defaults is responsible for it (spec
    /// §9 "rule pipeline as data").
    pub fn with_rules(
        attributes: AttributeRegistry,
        embeds: EmbedRegistry,
        insert_rules: Vec<InsertRule>,
        insert_object_rules: Vec<InsertObjectRule>,
        format_rules: Vec<FormatRule>,
        delete_rules: Vec<DeleteRule>,
    ) -> Self {
        let tree = Tree::new();
        let delta = tree.to_delta();
        Self {
            delta,
            tree,
            attributes,
            embeds,
            insert_rules,
            insert_object_rules,
            format_rules,
            delete_rules,
            changes: ChangeStream::new(),
            closed: false,
            last_change: None,
        }
    }

    /// Loads an existing document Delta. Rejects a Delta that isn't a
    /// valid document (spec §7: "document load whose Delta does not end in
    /// `'\n'` or contains non-insert ops" is a programmer error).
    pub fn from_delta(delta: Delta, attributes: AttributeRegistry, embeds: EmbedRegistry) -> Result<Self, Error> {
        if !delta.is_document() {
            return Err(Error::Invariant(
                "loaded delta is not a valid document (must contain only inserts and end in '\\n')".to_string(),
            ));
        }

        let mut tree = Tree::new();
        let mut offset = 0usize;
        for op in delta.ops() {
            match op {
                Op::InsertText { text, attributes: attrs } => {
                    let style = Style::from_raw_attributes(&attrs.clone().unwrap_or_default(), &attributes)?;
                    if text.contains('\n') {
                        for (i, piece) in text.split('\n').enumerate() {
                            if i > 0 {
                                tree.insert(offset, "\n", style.clone())?;
                                offset += 1;
                            }
                            if !piece.is_empty() {
                                tree.insert(offset, piece, style.clone())?;
                                offset += piece.chars().count();
                            }
                        }
                    } else {
                        tree.insert(offset, text, style)?;
                        offset += text.chars().count();
                    }
                }
                Op::InsertObject { object, attributes: attrs } => {
                    let embed_type = embeds.resolve(&object.key)?;
                    let style = Style::from_raw_attributes(&attrs.clone().unwrap_or_default(), &attributes)?;
                    tree.insert_object(offset, object.clone(), embed_type.placement == Placement::Line, style)?;
                    offset += 1;
                }
                Op::Delete(_) | Op::Retain { .. } => {
                    return Err(Error::Invariant(
                        "loaded delta contains a non-insert op".to_string(),
                    ))
                }
            }
        }

        let rebuilt = tree.to_delta();
        if rebuilt != delta {
            return Err(Error::Invariant(
                "loaded delta does not round-trip through the tree".to_string(),
            ));
        }

        Ok(Self {
            delta,
            tree,
            attributes,
            embeds,
            insert_rules: standard_insert_rules(),
            insert_object_rules: standard_insert_object_rules(),
            format_rules: standard_format_rules(),
            delete_rules: standard_delete_rules(),
            changes: ChangeStream::new(),
            closed: false,
            last_change: None,
        })
    }

    pub fn delta(&self) -> &Delta {
        &self.delta
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The Delta that would undo the most recently applied edit, or `None`
    /// before any edit has been made. Not a full undo manager — grouping
    /// consecutive edits into a single undo step, and redo, are a host's
    /// responsibility built on top of this (spec §1: "the engine exposes a
    /// *source* tag on every change so a host can layer OT on top").
    pub fn invert_last(&self) -> Option<Delta> {
        self.last_change
            .as_ref()
            .map(|(before, change)| change.invert(before))
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&ChangeEvent) + 'static) {
        self.changes.subscribe(listener);
    }

    /// Concatenation of text inserts plus one placeholder character per
    /// embed (spec §4.6).
    pub fn to_plain_text(&self) -> String {
        self.tree.to_plain_text()
    }

    /// Intersection of inline attributes present on every character in the
    /// range and every line style present on every line it intersects.
    pub fn collect_style(&self, index: usize, length: usize) -> Style {
        self.tree.collect_style(index, length)
    }

    fn rule_context(&self) -> RuleContext<'_> {
        RuleContext {
            attributes: &self.attributes,
            embeds: &self.embeds,
        }
    }

    fn check_open(&self) -> Result<(), Error> {
        if self.closed {
            return Err(Error::Closed);
        }
        Ok(())
    }

    fn check_offset(&self, offset: usize) -> Result<(), Error> {
        if offset > self.delta.length() {
            return Err(Error::OffsetOutOfBounds {
                offset,
                length: self.delta.length(),
            });
        }
        Ok(())
    }

    /// Strips the embed placeholder character from caller-supplied text
    /// (spec §6) — it is reserved for embeds the tree itself inserts.
    fn sanitize(text: &str) -> String {
        text.chars().filter(|&c| c != OBJECT_PLACEHOLDER).collect()
    }

    pub fn insert(&mut self, index: usize, text: &str) -> Result<Delta, Error> {
        self.check_open()?;
        self.check_offset(index)?;
        let text = Self::sanitize(text);
        if text.is_empty() {
            return Err(Error::EmptyInsertText);
        }

        let ctx = self.rule_context();
        let change = self
            .insert_rules
            .iter()
            .find_map(|rule| rule(&self.delta, index, &text, &ctx))
            .ok_or(Error::RulesExhausted("insert"))?
            .chop();

        self.apply_and_emit(change, Source::Local)
    }

    pub fn insert_object(
        &mut self,
        index: usize,
        key: &str,
        value: JsonValue,
        style: Option<AttributeMap>,
    ) -> Result<Delta, Error> {
        self.check_open()?;
        self.check_offset(index)?;
        if key.is_empty() {
            return Err(Error::EmptyEmbedType);
        }

        let ctx = self.rule_context();
        let change = self
            .insert_object_rules
            .iter()
            .find_map(|rule| rule(&self.delta, index, key, &value, style.as_ref(), &ctx))
            .ok_or(Error::RulesExhausted("insert_object"))?
            .chop();

        self.apply_and_emit(change, Source::Local)
    }

    pub fn delete(&mut self, index: usize, length: usize) -> Result<Delta, Error> {
        self.check_open()?;
        self.check_offset(index + length)?;

        let ctx = self.rule_context();
        let change = self
            .delete_rules
            .iter()
            .find_map(|rule| rule(&self.delta, index, length, &ctx))
            .ok_or(Error::RulesExhausted("delete"))?
            .chop();

        self.apply_and_emit(change, Source::Local)
    }

    /// Format is idempotent when no rule produces a change — that case
    /// returns an empty Delta directly rather than going through
    /// [`Document::compose`], which rejects an empty change as a
    /// programmer error (spec §7).
    pub fn format(&mut self, index: usize, length: usize, attribute: &Attribute) -> Result<Delta, Error> {
        self.check_open()?;
        self.check_offset(index + length)?;

        let ctx = self.rule_context();
        let change = self
            .format_rules
            .iter()
            .find_map(|rule| rule(&self.delta, index, length, attribute, &ctx))
            .unwrap_or_else(Delta::new)
            .chop();

        if change.is_empty() {
            return Ok(change);
        }
        self.apply_and_emit(change, Source::Local)
    }

    /// `text` empty and `length > 0` delegates to `delete`; `length == 0`
    /// delegates to `insert`; otherwise inserts at `index+length` then
    /// deletes `[index, index+length)`.
    pub fn replace(&mut self, index: usize, length: usize, text: &str) -> Result<Delta, Error> {
        let text = Self::sanitize(text);
        if text.is_empty() && length == 0 {
            return Err(Error::EmptyReplace);
        }
        if text.is_empty() {
            return self.delete(index, length);
        }
        if length == 0 {
            return self.insert(index, &text);
        }

        self.check_open()?;
        self.check_offset(index + length)?;

        let ctx = self.rule_context();
        let insert_change = self
            .insert_rules
            .iter()
            .find_map(|rule| rule(&self.delta, index + length, &text, &ctx))
            .ok_or(Error::RulesExhausted("insert"))?
            .chop();

        let before = self.delta.clone();
        self.apply_change(&insert_change)?;

        let ctx = self.rule_context();
        let delete_change = self
            .delete_rules
            .iter()
            .find_map(|rule| rule(&self.delta, index, length, &ctx))
            .ok_or(Error::RulesExhausted("delete"))?
            .chop();
        self.apply_change(&delete_change)?;

        let change = insert_change.compose(&delete_change);
        self.last_change = Some((before.clone(), change.clone()));
        let event = ChangeEvent {
            before,
            change: change.clone(),
            source: Source::Local,
        };
        self.changes.emit(&event);
        Ok(change)
    }

    /// Low-level compose (spec §4.6): dispatches every op in `change` to
    /// the tree (maintaining a running offset), composes `change` into the
    /// stored Delta, asserts `tree.to_delta() == delta`, then publishes the
    /// event. Rejects an empty change — this is the entry point a host
    /// calls directly with a pre-built change Delta; `insert`/`delete`/
    /// `insert_object` go through [`Document::apply_and_emit`] instead,
    /// since their rule pipelines already guarantee a non-empty change.
    pub fn compose(&mut self, change: Delta, source: Source) -> Result<Delta, Error> {
        self.check_open()?;
        if change.is_empty() {
            return Err(Error::EmptyChange);
        }
        self.apply_and_emit(change, source)
    }

    fn apply_and_emit(&mut self, change: Delta, source: Source) -> Result<Delta, Error> {
        let _span = vellum_log::info_span("vellum_engine::compose").entered();
        let before = self.delta.clone();
        self.apply_change(&change)?;
        debug!(ops = change.ops().len(), ?source, "composed change into document");
        self.last_change = Some((before.clone(), change.clone()));
        let event = ChangeEvent {
            before,
            change: change.clone(),
            source,
        };
        self.changes.emit(&event);
        Ok(change)
    }

    /// Dispatches every op in `change` to the tree, then composes `change`
    /// into `self.delta` and checks the round-trip invariant. Snapshots the
    /// tree before touching it and restores that snapshot on any error path
    /// — a rule failing partway through a multi-op change, or the final
    /// invariant check tripping, must leave both `self.tree` and
    /// `self.delta` exactly as they were before the call (spec.md §5).
    fn apply_change(&mut self, change: &Delta) -> Result<(), Error> {
        let tree_snapshot = self.tree.clone();

        if let Err(err) = self.apply_change_to_tree(change) {
            self.tree = tree_snapshot;
            return Err(err);
        }

        let composed = self.delta.compose(change);
        if self.tree.to_delta() != composed {
            self.tree = tree_snapshot;
            return Err(Error::Invariant(format!(
                "tree.to_delta() diverged from the composed delta after applying change {change:?}"
            )));
        }
        self.delta = composed;
        Ok(())
    }

    fn apply_change_to_tree(&mut self, change: &Delta) -> Result<(), Error> {
        let mut offset = 0usize;
        for op in change.ops() {
            match op {
                Op::Retain { length, attributes } => {
                    if let Some(attrs) = attributes {
                        let style = Style::from_raw_attributes(attrs, &self.attributes)?;
                        self.tree.retain(offset, *length, style)?;
                    }
                    offset += length;
                }
                Op::InsertText { text, attributes } => {
                    let style = Style::from_raw_attributes(&attributes.clone().unwrap_or_default(), &self.attributes)?;
                    self.tree.insert(offset, text, style)?;
                    offset += text.chars().count();
                }
                Op::InsertObject { object, attributes } => {
                    let embed_type = self.embeds.resolve(&object.key)?;
                    let style = Style::from_raw_attributes(&attributes.clone().unwrap_or_default(), &self.attributes)?;
                    self.tree.insert_object(offset, object.clone(), embed_type.placement == Placement::Line, style)?;
                    offset += 1;
                }
                Op::Delete(length) => {
                    self.tree.delete(offset, *length)?;
                }
            }
        }
        Ok(())
    }
}
