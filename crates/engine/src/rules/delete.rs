//! Delete rule pipeline (spec §4.5.4), applied by `delete(index, length)`.

use std::collections::BTreeMap;

use vellum_delta::{AttributeValue, Delta, Op, Placement};

use super::RuleContext;
use crate::support::{attrs_covering, char_at, next_newline, op_covering};

pub type DeleteRule = Box<dyn Fn(&Delta, usize, usize, &RuleContext) -> Option<Delta>>;

/// Rule 1: ensure embed line. A deletion that would leave a line-placed
/// embed sharing a line with other content instead widens to remove that
/// embed's entire line (leaf, inline neighbours, and terminating `'\n'`).
fn ensure_embed_line(document: &Delta, index: usize, length: usize, ctx: &RuleContext) -> Option<Delta> {
    if length == 0 {
        return None;
    }

    let mut embed_pos = None;
    for pos in index..(index + length).min(document.length()) {
        if let Some(Op::InsertObject { object, .. }) = op_covering(document, pos) {
            if ctx.embeds.resolve(&object.key).map(|t| t.placement == Placement::Line).unwrap_or(false) {
                embed_pos = Some(pos);
                break;
            }
        }
    }
    let embed_pos = embed_pos?;

    let mut line_start = embed_pos;
    while line_start > 0 && char_at(document, line_start - 1) != Some('\n') {
        line_start -= 1;
    }
    let mut line_newline = embed_pos + 1;
    while line_newline < document.length() && char_at(document, line_newline) != Some('\n') {
        line_newline += 1;
    }
    let line_end = line_newline + 1; // includes the terminating '\n'

    if index <= line_start && index + length >= line_end {
        return None; // deletion already clears the whole embed line
    }

    let new_start = index.min(line_start);
    let new_end = (index + length).max(line_end);

    let mut result = Delta::new();
    if new_start > 0 {
        result = result.retain(new_start, None);
    }
    result = result.delete(new_end - new_start);
    Some(result)
}

/// Rule 2: preserve line style on merge. The line whose own `'\n'` was
/// deleted keeps its line-scoped attribute on the merged result's surviving
/// newline — the tree keeps that earlier line's node across a merge (see
/// `vellum_tree::Tree::delete`), so the flat Delta transplants its style
/// the same way rather than leaving the textually-remaining newline's own
/// (possibly absent) style in place.
fn preserve_line_style_on_merge(document: &Delta, index: usize, length: usize, ctx: &RuleContext) -> Option<Delta> {
    if length == 0 {
        return None;
    }

    let chars: Vec<char> = document.to_text().chars().collect();
    let deleted_newline = (index..(index + length).min(chars.len())).find(|&i| chars[i] == '\n')?;

    let line_attr = |attrs: Option<vellum_delta::AttributeMap>| -> Option<(String, AttributeValue)> {
        attrs.and_then(|a| {
            a.into_iter()
                .find(|(k, _)| ctx.attributes.scope_of(k).map(|s| s.is_line()).unwrap_or(false))
        })
    };

    let deleted_attr = line_attr(attrs_covering(document, deleted_newline));
    let (next_pos, next_attrs) = next_newline(document, index + length)?;
    let next_attr = line_attr(next_attrs);

    if deleted_attr == next_attr {
        return None;
    }

    let mut result = Delta::new();
    if index > 0 {
        result = result.retain(index, None);
    }
    result = result.delete(length);
    if next_pos > index + length {
        result = result.retain(next_pos - (index + length), None);
    }

    let mut target_attrs = BTreeMap::new();
    if let Some((key, _)) = &next_attr {
        target_attrs.insert(key.clone(), AttributeValue::Null);
    }
    if let Some((key, value)) = deleted_attr {
        target_attrs.insert(key, value);
    }
    result = result.retain(1, Some(target_attrs));
    Some(result)
}

/// Rule 3: catch-all. Deletes the range literally.
fn catch_all(_document: &Delta, index: usize, length: usize, _ctx: &RuleContext) -> Option<Delta> {
    let mut result = Delta::new();
    if index > 0 {
        result = result.retain(index, None);
    }
    result = result.delete(length);
    Some(result)
}

pub fn standard_delete_rules() -> Vec<DeleteRule> {
    vec![
        Box::new(ensure_embed_line),
        Box::new(preserve_line_style_on_merge),
        Box::new(catch_all),
    ]
}
