//! The document tree: `Root` → (`Block` | `Line`) → leaves, kept in lockstep
//! with a [`Delta`] by the engine's document controller.
//!
//! Every mutator here is offset-based and operates on an already-styled
//! piece of content — the caller (the document controller) is responsible
//! for running the heuristic rule pipelines and resolving raw attribute
//! maps into [`Style`] values before calling in. This tree has no knowledge
//! of registries or rules.

use std::collections::BTreeMap;

use vellum_delta::{Attribute, Delta, ObjectValue, Style};

use crate::error::Error;
use crate::node::{Arena, NodeData, NodeId, NodeKind};

/// Line-scoped attribute keys that require lines sharing their value to be
/// grouped under a `Block` container (spec.md §4.4 "Block grouping").
/// `header` deliberately isn't here — heading lines live directly under the
/// root.
const BLOCK_ATTRIBUTE_KEYS: &[&str] = &["list", "blockquote", "code-block"];

enum InsertContent {
    Text(String),
    Object(ObjectValue, bool),
}

/// The document tree. Owns an [`Arena`] of nodes and the canonical,
/// document-ordered list of `Line` node ids — the source of truth every
/// other structural view (in particular the `Root`/`Block` layer) is
/// rebuilt from after each mutation.
#[derive(Clone)]
pub struct Tree {
    arena: Arena,
    root: NodeId,
    lines: Vec<NodeId>,
}

impl Tree {
    /// A fresh tree holding the minimal valid document: a single empty
    /// line, i.e. the text `"\n"`.
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.alloc(None, NodeData::Root { children: Vec::new() });
        let line = arena.alloc_line(Style::new());
        let mut tree = Self {
            arena,
            root,
            lines: vec![line],
        };
        tree.regroup();
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn lines(&self) -> &[NodeId] {
        &self.lines
    }

    pub fn kind_of(&self, id: NodeId) -> NodeKind {
        self.arena.kind_of(id)
    }

    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.arena.children_of(id)
    }

    pub fn line_style(&self, id: NodeId) -> Style {
        self.line_style_of(id)
    }

    pub fn text_of(&self, id: NodeId) -> Option<&str> {
        match &self.arena.get(id).data {
            NodeData::Text { text, .. } => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn leaf_style(&self, id: NodeId) -> &Style {
        self.arena.get(id).data.style()
    }

    /// Total document length: the sum of every line's content plus its
    /// terminating `'\n'` (spec.md §3 invariant: "line length includes the
    /// terminal newline").
    pub fn length(&self) -> usize {
        self.lines.iter().map(|&l| self.line_total_length(l)).sum()
    }

    fn line_content_length(&self, line_id: NodeId) -> usize {
        self.arena
            .children_of(line_id)
            .iter()
            .map(|&c| self.arena.get(c).data.leaf_length())
            .sum()
    }

    fn line_total_length(&self, line_id: NodeId) -> usize {
        self.line_content_length(line_id) + 1
    }

    fn line_style_of(&self, line_id: NodeId) -> Style {
        self.arena.get(line_id).data.style().clone()
    }

    fn set_line_style(&mut self, line_id: NodeId, style: Style) {
        self.arena.get_mut(line_id).data.set_style(style);
    }

    /// Resolves a document offset to `(line index, offset within that
    /// line's content)`. The local offset ranges `[0, content_len]`; the
    /// upper bound is the gap immediately before the line's own `'\n'`.
    fn locate_line(&self, offset: usize) -> Result<(usize, usize), Error> {
        let mut pos = 0;
        for (i, &line_id) in self.lines.iter().enumerate() {
            let total = self.line_total_length(line_id);
            if offset < pos + total {
                return Ok((i, offset - pos));
            }
            pos += total;
        }
        Err(Error::OffsetOutOfBounds {
            offset,
            length: pos,
        })
    }

    /// Descends from a document offset to the leaf (or line, if the offset
    /// lands past the last leaf) that owns it, per spec.md §4.4 "Lookup".
    /// With `inclusive`, an offset landing exactly on a leaf boundary
    /// resolves to the preceding leaf instead of the following one.
    pub fn lookup(&self, offset: usize, inclusive: bool) -> Result<(NodeId, usize), Error> {
        let (line_idx, local_offset) = self.locate_line(offset)?;
        let line_id = self.lines[line_idx];
        for (leaf_id, start, len) in self.leaf_spans(line_id) {
            if local_offset < start + len || (inclusive && local_offset == start + len) {
                return Ok((leaf_id, local_offset - start));
            }
        }
        Ok((line_id, local_offset))
    }

    fn leaf_spans(&self, line_id: NodeId) -> Vec<(NodeId, usize, usize)> {
        let mut spans = Vec::new();
        let mut pos = 0;
        for &leaf in self.arena.children_of(line_id) {
            let len = self.arena.get(leaf).data.leaf_length();
            spans.push((leaf, pos, len));
            pos += len;
        }
        spans
    }

    // ---- mutators -------------------------------------------------

    /// Inserts `text` (already stripped of the embed placeholder and routed
    /// through the insert rule pipeline by the caller) at `offset`, carrying
    /// `style`.
    pub fn insert(&mut self, offset: usize, text: &str, style: Style) -> Result<(), Error> {
        if text.is_empty() {
            return Ok(());
        }
        let (line_idx, local_offset) = self.locate_line(offset)?;
        if text.contains('\n') {
            self.insert_multiline(line_idx, local_offset, text, style);
        } else {
            self.insert_inline(line_idx, local_offset, InsertContent::Text(text.to_string()), style);
        }
        self.regroup();
        Ok(())
    }

    /// Inserts a single embed leaf. Callers must have already routed the
    /// edit through the insert-object rules so a `line_placed` embed lands
    /// on an empty line (spec.md §3 invariant 3) — this is re-checked here
    /// and reported as [`Error::EmbedLineViolation`] if violated.
    pub fn insert_object(
        &mut self,
        offset: usize,
        object: ObjectValue,
        line_placed: bool,
        style: Style,
    ) -> Result<(), Error> {
        let (line_idx, local_offset) = self.locate_line(offset)?;
        let line_id = self.lines[line_idx];
        if line_placed && self.line_content_length(line_id) != 0 {
            return Err(Error::EmbedLineViolation);
        }
        self.insert_inline(line_idx, local_offset, InsertContent::Object(object, line_placed), style);
        self.regroup();
        Ok(())
    }

    /// Removes `length` characters starting at `offset`, merging lines
    /// whenever a deletion consumes a line's terminating `'\n'`. The
    /// surviving line keeps its own (the earlier line's) style — the later
    /// line's content is appended but its style is discarded, so merging a
    /// list item into a plain line never coerces the plain line into a list
    /// (spec.md §4.5.4 rule 2; see DESIGN.md for why this reading was
    /// chosen over the more literal "next line's style survives" phrasing).
    pub fn delete(&mut self, offset: usize, length: usize) -> Result<(), Error> {
        if length == 0 {
            return Ok(());
        }
        // Walk the whole range read-only first, so a deletion that would
        // consume the document's final newline is rejected before any
        // `remove_inline_range`/arena mutation — a partial mutation followed
        // by an `Err` would leave the tree diverged from the caller's Delta.
        self.validate_delete_range(offset, length)?;

        let mut remaining = length;
        while remaining > 0 {
            let (line_idx, local_offset) = self.locate_line(offset)?;
            let line_id = self.lines[line_idx];
            let content_len = self.line_content_length(line_id);
            let available = content_len - local_offset;
            let take = remaining.min(available);
            if take > 0 {
                self.remove_inline_range(line_id, local_offset, local_offset + take);
                remaining -= take;
            }
            if remaining > 0 {
                let next_line = self.lines[line_idx + 1];
                let mut merged_children = self.arena.children_of(line_id).to_vec();
                merged_children.extend(self.arena.children_of(next_line).iter().copied());
                self.arena.set_children(line_id, merged_children);
                self.arena.free(next_line);
                self.lines.remove(line_idx + 1);
                remaining -= 1;
            }
        }
        self.regroup();
        Ok(())
    }

    /// Read-only dry run of [`Tree::delete`]'s walk: same line/offset
    /// bookkeeping, no arena writes. Returns the same error the mutating
    /// walk would hit, but before it has touched anything.
    fn validate_delete_range(&self, offset: usize, length: usize) -> Result<(), Error> {
        let mut pos = offset;
        let mut remaining = length;
        while remaining > 0 {
            let (line_idx, local_offset) = self.locate_line(pos)?;
            let line_id = self.lines[line_idx];
            let content_len = self.line_content_length(line_id);
            let available = content_len - local_offset;
            let take = remaining.min(available);
            remaining -= take;
            pos += take;
            if remaining > 0 {
                if line_idx + 1 >= self.lines.len() {
                    return Err(Error::Invariant(
                        "delete consumed the document's final newline".to_string(),
                    ));
                }
                remaining -= 1;
                pos += 1;
            }
        }
        Ok(())
    }

    /// Re-applies `style` over `[offset, offset+length)`. Inline attributes
    /// split text/embed leaves as needed; whenever the range crosses a
    /// line's `'\n'`, any line-scoped attributes in `style` are merged into
    /// that line's style (replacing any prior line-scoped attribute, per
    /// the one-line-attribute invariant).
    pub fn retain(&mut self, offset: usize, length: usize, style: Style) -> Result<(), Error> {
        if length == 0 {
            return Ok(());
        }
        let mut pos = offset;
        let mut remaining = length;
        while remaining > 0 {
            let (line_idx, local_offset) = self.locate_line(pos)?;
            let line_id = self.lines[line_idx];
            let content_len = self.line_content_length(line_id);
            let available = content_len - local_offset;
            let take = remaining.min(available);
            if take > 0 {
                self.apply_inline_style(line_id, local_offset, local_offset + take, &style);
                pos += take;
                remaining -= take;
            }
            if remaining > 0 {
                let line_attrs: Vec<Attribute> =
                    style.iter().filter(|a| a.scope.is_line()).cloned().collect();
                if !line_attrs.is_empty() {
                    let merged = self.line_style_of(line_id).merge_all(line_attrs);
                    self.set_line_style(line_id, merged);
                }
                pos += 1;
                remaining -= 1;
            }
        }
        self.regroup();
        Ok(())
    }

    // ---- leaf-level helpers ----------------------------------------

    fn insert_inline(&mut self, line_idx: usize, local_offset: usize, content: InsertContent, style: Style) {
        let line_id = self.lines[line_idx];
        let spans = self.leaf_spans(line_id);
        let mut target_index = spans.len();
        for (i, &(_, start, len)) in spans.iter().enumerate() {
            if local_offset == start {
                target_index = i;
                break;
            }
            if local_offset > start && local_offset < start + len {
                self.split_text_leaf(line_id, i, local_offset - start);
                target_index = i + 1;
                break;
            }
        }
        let new_leaf = match content {
            InsertContent::Text(text) => {
                if text.is_empty() {
                    return;
                }
                self.arena.alloc_text(text, style)
            }
            InsertContent::Object(object, line_placed) => self.arena.alloc_embed(object, line_placed, style),
        };
        self.arena.attach(line_id, target_index, new_leaf);
    }

    fn append_inline_to_node(&mut self, line_id: NodeId, text: &str, style: Style) {
        if text.is_empty() {
            return;
        }
        let idx = self.arena.children_of(line_id).len();
        let leaf = self.arena.alloc_text(text.to_string(), style);
        self.arena.attach(line_id, idx, leaf);
    }

    /// Splits `children[child_index]` (must be a `Text` leaf) into two text
    /// leaves at `split_offset`, inserting the second half immediately
    /// after the first. Embeds never split — they have length 1 and a
    /// split offset is never strictly inside one.
    fn split_text_leaf(&mut self, line_id: NodeId, child_index: usize, split_offset: usize) {
        let leaf_id = self.arena.children_of(line_id)[child_index];
        let (text, style) = match &self.arena.get(leaf_id).data {
            NodeData::Text { text, style } => (text.clone(), style.clone()),
            _ => return,
        };
        let chars: Vec<char> = text.chars().collect();
        let left: String = chars[..split_offset].iter().collect();
        let right: String = chars[split_offset..].iter().collect();
        if let NodeData::Text { text, .. } = &mut self.arena.get_mut(leaf_id).data {
            *text = left;
        }
        let right_leaf = self.arena.alloc_text(right, style);
        self.arena.attach(line_id, child_index + 1, right_leaf);
    }

    /// Removes leaf content in `[start, end)` within a single line,
    /// trimming partially-covered text leaves and dropping fully-covered
    /// ones (an embed is always fully covered, since it has length 1).
    fn remove_inline_range(&mut self, line_id: NodeId, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let spans = self.leaf_spans(line_id);
        let mut new_children = Vec::new();
        for (leaf_id, lstart, llen) in spans {
            let lend = lstart + llen;
            if lend <= start || lstart >= end {
                new_children.push(leaf_id);
                continue;
            }
            match self.arena.get(leaf_id).data.clone() {
                NodeData::Text { text, style } => {
                    let chars: Vec<char> = text.chars().collect();
                    let keep_left = start.saturating_sub(lstart).min(llen);
                    let keep_right_from = end.saturating_sub(lstart).min(llen);
                    let left_part: String = chars[..keep_left].iter().collect();
                    let right_part: String = chars[keep_right_from..].iter().collect();
                    self.arena.free(leaf_id);
                    if !left_part.is_empty() {
                        new_children.push(self.arena.alloc_text(left_part, style.clone()));
                    }
                    if !right_part.is_empty() {
                        new_children.push(self.arena.alloc_text(right_part, style));
                    }
                }
                NodeData::Embed { .. } => {
                    self.arena.free(leaf_id);
                }
                _ => unreachable!("a line's children are always leaves"),
            }
        }
        self.arena.set_children(line_id, new_children);
    }

    /// Merges `style`'s inline attributes into the leaves covering
    /// `[start, end)`, splitting text leaves at the overlap boundaries.
    fn apply_inline_style(&mut self, line_id: NodeId, start: usize, end: usize, style: &Style) {
        if start >= end {
            return;
        }
        let spans = self.leaf_spans(line_id);
        let mut new_children = Vec::new();
        for (leaf_id, lstart, llen) in spans {
            let lend = lstart + llen;
            if lend <= start || lstart >= end {
                new_children.push(leaf_id);
                continue;
            }
            let overlap_start = start.max(lstart);
            let overlap_end = end.min(lend);
            match self.arena.get(leaf_id).data.clone() {
                NodeData::Text { text, style: old_style } => {
                    let chars: Vec<char> = text.chars().collect();
                    let pre = overlap_start - lstart;
                    let mid_len = overlap_end - overlap_start;
                    self.arena.free(leaf_id);
                    if pre > 0 {
                        let s: String = chars[..pre].iter().collect();
                        new_children.push(self.arena.alloc_text(s, old_style.clone()));
                    }
                    let s: String = chars[pre..pre + mid_len].iter().collect();
                    let merged = merge_inline(old_style.clone(), style);
                    new_children.push(self.arena.alloc_text(s, merged));
                    if pre + mid_len < chars.len() {
                        let s: String = chars[pre + mid_len..].iter().collect();
                        new_children.push(self.arena.alloc_text(s, old_style));
                    }
                }
                NodeData::Embed {
                    object,
                    line_placed,
                    style: old_style,
                } => {
                    self.arena.free(leaf_id);
                    let merged = merge_inline(old_style, style);
                    new_children.push(self.arena.alloc_embed(object, line_placed, merged));
                }
                _ => unreachable!("a line's children are always leaves"),
            }
        }
        self.arena.set_children(line_id, new_children);
    }

    fn insert_multiline(&mut self, line_idx: usize, local_offset: usize, text: &str, style: Style) {
        let line_id = self.lines[line_idx];
        let pieces: Vec<&str> = text.split('\n').collect();
        let n = pieces.len();

        let tail_leaves = self.split_off_line_tail(line_id, local_offset);
        let original_style = self.line_style_of(line_id);

        self.append_inline_to_node(line_id, pieces[0], style.clone());
        let first_style = if style.line_style().is_some() {
            style.clone()
        } else {
            original_style.clone()
        };
        self.set_line_style(line_id, first_style);

        let mut insert_at = line_idx;
        for piece in &pieces[1..n - 1] {
            let new_style = if style.line_style().is_some() {
                style.clone()
            } else {
                Style::new()
            };
            let new_line = self.arena.alloc_line(new_style);
            self.append_inline_to_node(new_line, piece, style.clone());
            insert_at += 1;
            self.lines.insert(insert_at, new_line);
        }

        let tail_line = self.arena.alloc_line(original_style);
        self.append_inline_to_node(tail_line, pieces[n - 1], style.clone());
        for leaf in tail_leaves {
            let idx = self.arena.children_of(tail_line).len();
            self.arena.attach(tail_line, idx, leaf);
        }
        insert_at += 1;
        self.lines.insert(insert_at, tail_line);
    }

    /// Splits `line_id`'s children at `local_offset`, leaving the prefix
    /// attached and returning the detached tail as a list of leaf ids ready
    /// to be reattached elsewhere.
    fn split_off_line_tail(&mut self, line_id: NodeId, local_offset: usize) -> Vec<NodeId> {
        let spans = self.leaf_spans(line_id);
        let mut split_index = spans.len();
        for (i, &(_, start, len)) in spans.iter().enumerate() {
            if local_offset == start {
                split_index = i;
                break;
            }
            if local_offset > start && local_offset < start + len {
                self.split_text_leaf(line_id, i, local_offset - start);
                split_index = i + 1;
                break;
            }
        }
        let children = self.arena.children_of(line_id).to_vec();
        let tail = children[split_index..].to_vec();
        self.arena.set_children(line_id, children[..split_index].to_vec());
        tail
    }

    /// Rebuilds the `Root`/`Block` layer from `self.lines`. Called after
    /// every mutation — cheaper to discard and rebuild than to track
    /// incremental block splits/merges, and keeps this the single place
    /// the block-grouping invariant (spec.md §3 invariant 4) is enforced.
    fn regroup(&mut self) {
        for child in self.arena.children_of(self.root).to_vec() {
            if self.arena.kind_of(child) == NodeKind::Block {
                self.arena.free(child);
            }
        }

        let mut new_root_children = Vec::new();
        let mut i = 0;
        while i < self.lines.len() {
            let style = self.line_style_of(self.lines[i]);
            match block_key_value(&style) {
                Some((key, value)) => {
                    let mut group = vec![self.lines[i]];
                    let mut j = i + 1;
                    while j < self.lines.len() {
                        let next_style = self.line_style_of(self.lines[j]);
                        if block_key_value(&next_style).as_ref() == Some(&(key.clone(), value.clone())) {
                            group.push(self.lines[j]);
                            j += 1;
                        } else {
                            break;
                        }
                    }
                    let block_id = self.arena.alloc(None, NodeData::Block { children: Vec::new() });
                    self.arena.set_children(block_id, group);
                    new_root_children.push(block_id);
                    i = j;
                }
                None => {
                    new_root_children.push(self.lines[i]);
                    i += 1;
                }
            }
        }
        self.arena.set_children(self.root, new_root_children);
    }

    // ---- rendering ---------------------------------------------------

    /// In-order traversal producing the document Delta this tree encodes —
    /// must equal the controller's composed Delta at rest (spec.md §3
    /// invariant 6).
    pub fn to_delta(&self) -> Delta {
        let mut delta = Delta::new();
        for &line_id in &self.lines {
            for &leaf in self.arena.children_of(line_id) {
                match &self.arena.get(leaf).data {
                    NodeData::Text { text, style } => {
                        delta = delta.insert(text.clone(), style.to_map());
                    }
                    NodeData::Embed { object, style, .. } => {
                        delta = delta.insert_object(object.key.clone(), object.value.clone(), style.to_map());
                    }
                    _ => unreachable!("a line's children are always leaves"),
                }
            }
            let line_style = self.line_style_of(line_id);
            delta = delta.insert("\n", line_style.to_map());
        }
        delta
    }

    /// Concatenation of every text leaf plus one placeholder character per
    /// embed — mirrors `Delta::to_text` but reads the tree directly.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        for &line_id in &self.lines {
            for &leaf in self.arena.children_of(line_id) {
                match &self.arena.get(leaf).data {
                    NodeData::Text { text, .. } => out.push_str(text),
                    NodeData::Embed { .. } => out.push_str(vellum_delta::OBJECT_PLACEHOLDER_STR),
                    _ => unreachable!("a line's children are always leaves"),
                }
            }
            out.push('\n');
        }
        out
    }

    /// The intersection of inline attributes present on every character in
    /// `[index, index+length)` and the line-scoped attribute present on
    /// every line the range intersects (spec.md §4.6 `collectStyle`). A
    /// zero-length range samples the single position at `index`.
    pub fn collect_style(&self, index: usize, length: usize) -> Style {
        let sample_end = index + length.max(1);
        let mut inline_acc: Option<BTreeMap<String, Attribute>> = None;
        let mut line_acc: Option<Option<Attribute>> = None;
        let mut pos = 0usize;

        for &line_id in &self.lines {
            let content_len = self.line_content_length(line_id);
            let line_start = pos;
            pos += content_len + 1;
            if pos <= index || line_start >= sample_end {
                continue;
            }

            let this_line_attr = self.line_style_of(line_id).line_style().cloned();
            line_acc = Some(match line_acc {
                None => this_line_attr,
                Some(prev) if prev == this_line_attr => prev,
                Some(_) => None,
            });

            let seg_start = index.max(line_start);
            let seg_end = sample_end.min(line_start + content_len);
            if seg_end <= seg_start {
                continue;
            }
            let local_start = seg_start - line_start;
            let local_end = seg_end - line_start;
            for (leaf_id, lstart, llen) in self.leaf_spans(line_id) {
                if lstart + llen <= local_start || lstart >= local_end {
                    continue;
                }
                let leaf_style = self.arena.get(leaf_id).data.style();
                let map: BTreeMap<String, Attribute> =
                    leaf_style.iter().cloned().map(|a| (a.key.clone(), a)).collect();
                inline_acc = Some(match inline_acc.take() {
                    None => map,
                    Some(prev) => prev
                        .into_iter()
                        .filter(|(k, v)| map.get(k) == Some(v))
                        .collect(),
                });
            }
        }

        let mut result = Style::new();
        if let Some(map) = inline_acc {
            for (_, attr) in map {
                result = result.put(attr);
            }
        }
        if let Some(Some(attr)) = line_acc {
            result = result.put(attr);
        }
        result
    }
}

fn merge_inline(base: Style, incoming: &Style) -> Style {
    let mut result = base;
    for attr in incoming.iter().filter(|a| a.scope.is_inline()) {
        result = result.merge(attr.clone());
    }
    result
}

fn block_key_value(style: &Style) -> Option<(String, vellum_delta::AttributeValue)> {
    style
        .line_style()
        .filter(|a| BLOCK_ATTRIBUTE_KEYS.contains(&a.key.as_str()))
        .map(|a| (a.key.clone(), a.value.clone()))
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_delta::{AttributeScope, AttributeValue};

    fn bold() -> Style {
        Style::new().put(Attribute::new("bold", AttributeScope::Inline, AttributeValue::Boolean(true)))
    }

    fn bullet() -> Style {
        Style::new().put(Attribute::new(
            "list",
            AttributeScope::Line,
            AttributeValue::String("bullet".to_string()),
        ))
    }

    #[test]
    fn new_tree_is_a_single_empty_line() {
        let tree = Tree::new();
        assert_eq!(tree.length(), 1);
        assert_eq!(tree.to_delta(), Delta::new().insert("\n", None));
    }

    #[test]
    fn insert_plain_text_round_trips() {
        let mut tree = Tree::new();
        tree.insert(0, "Hello", Style::new()).unwrap();
        assert_eq!(tree.to_plain_text(), "Hello\n");
        assert_eq!(tree.to_delta(), Delta::new().insert("Hello\n", None));
    }

    #[test]
    fn insert_with_embedded_newline_splits_lines() {
        let mut tree = Tree::new();
        tree.insert(0, "One\nTwo", Style::new()).unwrap();
        assert_eq!(tree.lines().len(), 2);
        assert_eq!(tree.to_plain_text(), "One\nTwo\n");
    }

    #[test]
    fn insert_text_splits_leaf_at_offset() {
        let mut tree = Tree::new();
        tree.insert(0, "Hello", Style::new()).unwrap();
        tree.insert(2, "XY", Style::new()).unwrap();
        assert_eq!(tree.to_plain_text(), "HeXYllo\n");
    }

    #[test]
    fn retain_applies_inline_style_splitting_leaves() {
        let mut tree = Tree::new();
        tree.insert(0, "Hello", Style::new()).unwrap();
        tree.retain(1, 2, bold()).unwrap();
        let line = tree.lines()[0];
        let children = tree.children_of(line);
        assert_eq!(children.len(), 3);
        assert_eq!(tree.text_of(children[0]), Some("H"));
        assert_eq!(tree.text_of(children[1]), Some("el"));
        assert!(tree.leaf_style(children[1]).contains("bold"));
        assert_eq!(tree.text_of(children[2]), Some("lo"));
        assert!(!tree.leaf_style(children[2]).contains("bold"));
    }

    #[test]
    fn retain_at_newline_sets_line_style_and_groups_block() {
        let mut tree = Tree::new();
        tree.insert(0, "One\nTwo", Style::new()).unwrap();
        // The newline after "One" sits at offset 3.
        tree.retain(3, 1, bullet()).unwrap();
        assert_eq!(tree.line_style(tree.lines()[0]).line_style(), bullet().line_style());
        // A single list line still groups under a Block per spec.md §4.4.
        assert_eq!(tree.kind_of(tree.children_of(tree.root())[0]), NodeKind::Block);
    }

    #[test]
    fn consecutive_equal_line_styles_group_into_one_block() {
        let mut tree = Tree::new();
        tree.insert(0, "One\nTwo\nThree", Style::new()).unwrap();
        tree.retain(3, 1, bullet()).unwrap();
        tree.retain(8, 1, bullet()).unwrap();
        let root_children = tree.children_of(tree.root()).to_vec();
        assert_eq!(root_children.len(), 2); // [block(One,Two), line(Three)]
        assert_eq!(tree.kind_of(root_children[0]), NodeKind::Block);
        assert_eq!(tree.children_of(root_children[0]).len(), 2);
        assert_eq!(tree.kind_of(root_children[1]), NodeKind::Line);
    }

    #[test]
    fn delete_merges_lines_keeping_first_lines_style() {
        let mut tree = Tree::new();
        tree.insert(0, "One\nTwo", Style::new()).unwrap();
        tree.retain(3, 1, bullet()).unwrap();
        // Delete the newline between "One" and "Two".
        tree.delete(3, 1).unwrap();
        assert_eq!(tree.lines().len(), 1);
        assert_eq!(tree.to_plain_text(), "OneTwo\n");
        assert_eq!(tree.line_style(tree.lines()[0]).line_style(), bullet().line_style());
    }

    #[test]
    fn delete_removes_partial_text_range() {
        let mut tree = Tree::new();
        tree.insert(0, "Hello World", Style::new()).unwrap();
        tree.delete(5, 6).unwrap();
        assert_eq!(tree.to_plain_text(), "Hello\n");
    }

    #[test]
    fn delete_that_would_consume_final_newline_leaves_tree_untouched() {
        let mut tree = Tree::new();
        tree.insert(0, "Hi", Style::new()).unwrap();
        let result = tree.delete(1, 2);
        assert!(matches!(result, Err(Error::Invariant(_))));
        assert_eq!(tree.to_plain_text(), "Hi\n");
    }

    #[test]
    fn insert_object_requires_empty_line_for_line_placed_embed() {
        let mut tree = Tree::new();
        tree.insert(0, "text", Style::new()).unwrap();
        let result = tree.insert_object(
            2,
            ObjectValue::new("hr", serde_json::Value::Null),
            true,
            Style::new(),
        );
        assert!(matches!(result, Err(Error::EmbedLineViolation)));
    }

    #[test]
    fn insert_object_on_empty_line_succeeds() {
        let mut tree = Tree::new();
        tree.insert_object(0, ObjectValue::new("hr", serde_json::Value::Null), true, Style::new())
            .unwrap();
        assert_eq!(tree.length(), 2); // one embed + the line's newline
    }

    #[test]
    fn collect_style_intersects_inline_attributes_in_range() {
        let mut tree = Tree::new();
        tree.insert(0, "Hello", Style::new()).unwrap();
        tree.retain(0, 3, bold()).unwrap();
        let collected = tree.collect_style(0, 3);
        assert!(collected.contains("bold"));
        let collected_wider = tree.collect_style(0, 5);
        assert!(!collected_wider.contains("bold"));
    }

    #[test]
    fn every_line_to_delta_has_exactly_one_trailing_newline() {
        let mut tree = Tree::new();
        tree.insert(0, "Alpha\nBeta\nGamma", Style::new()).unwrap();
        for &line_id in tree.lines() {
            let mut line_delta = Delta::new();
            for &leaf in tree.children_of(line_id) {
                if let Some(text) = tree.text_of(leaf) {
                    line_delta = line_delta.insert(text.to_string(), None);
                }
            }
            line_delta = line_delta.insert("\n", None);
            let text = line_delta.to_text();
            assert_eq!(text.matches('\n').count(), 1);
            assert!(text.ends_with('\n'));
        }
    }
}
