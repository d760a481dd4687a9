//! Insert rule pipeline (spec §4.5.2), applied by `insert(index, text)`.
//! Ordered — first match wins, with a catch-all last.

use vellum_delta::{AttributeMap, AttributeValue, Delta, Placement};

use super::RuleContext;
use crate::support::{
    attrs_covering, followed_by_newline, is_absolute_http_url, next_newline, op_covering,
    op_spanning, preceded_by_newline, strip_trailing_punctuation, unset_map,
};

pub type InsertRule = Box<dyn Fn(&Delta, usize, &str, &RuleContext) -> Option<Delta>>;

/// Rule 1: preserve block style on paste. A multi-line paste splits on
/// `'\n'`; the first produced newline inherits the style of the line the
/// caret was in, non-heading styles propagate to every produced newline,
/// and a heading never propagates past the first (the tail keeps the
/// original line's newline, with its header unset once it's been split).
fn preserve_block_style_on_paste(document: &Delta, index: usize, text: &str, _ctx: &RuleContext) -> Option<Delta> {
    if !(text.contains('\n') && text.chars().count() > 1) {
        return None;
    }
    let (newline_pos, captured) = next_newline(document, index)?;
    let is_heading = captured.as_ref().is_some_and(|a| a.contains_key("header"));

    let pieces: Vec<&str> = text.split('\n').collect();
    let mut result = Delta::new();
    if index > 0 {
        result = result.retain(index, None);
    }
    for (i, piece) in pieces.iter().enumerate() {
        if !piece.is_empty() {
            result = result.insert(piece.to_string(), None);
        }
        if i + 1 < pieces.len() {
            let attrs = if i == 0 || !is_heading {
                captured.clone()
            } else {
                Some(unset_map("header"))
            };
            result = result.insert("\n", attrs);
        }
    }
    if newline_pos > index {
        result = result.retain(newline_pos - index, None);
    }
    if is_heading {
        result = result.retain(1, Some(unset_map("header")));
    }
    Some(result)
}

/// Rule 2: force newline around embed. An insert landing directly against a
/// line-placed embed gets wrapped with a newline on that side, so the embed
/// keeps its own line.
fn force_newline_around_embed(document: &Delta, index: usize, text: &str, ctx: &RuleContext) -> Option<Delta> {
    let is_line_embed = |pos: Option<usize>| -> bool {
        let Some(pos) = pos else { return false };
        match op_covering(document, pos) {
            Some(vellum_delta::Op::InsertObject { object, .. }) => ctx
                .embeds
                .resolve(&object.key)
                .map(|t| t.placement == Placement::Line)
                .unwrap_or(false),
            _ => false,
        }
    };

    let before = is_line_embed(index.checked_sub(1));
    let after = is_line_embed(Some(index));

    if !before && !after {
        return None;
    }

    let mut wrapped = text.to_string();
    let mut changed = false;
    if before && !wrapped.starts_with('\n') {
        wrapped = format!("\n{wrapped}");
        changed = true;
    }
    if after && !wrapped.ends_with('\n') {
        wrapped.push('\n');
        changed = true;
    }
    if !changed {
        return None;
    }

    let mut result = Delta::new();
    if index > 0 {
        result = result.retain(index, None);
    }
    result = result.insert(wrapped, None);
    Some(result)
}

/// Rule 3: preserve line style on split. Pressing enter in the middle of a
/// styled line should produce two lines of that same style, not a plain
/// line break.
fn preserve_line_style_on_split(document: &Delta, index: usize, text: &str, _ctx: &RuleContext) -> Option<Delta> {
    if text != "\n" {
        return None;
    }
    if preceded_by_newline(document, index) || followed_by_newline(document, index) {
        return None;
    }

    let mut result = Delta::new();
    if index > 0 {
        result = result.retain(index, None);
    }

    if op_spanning(document, index).is_some_and(|op| op.contains_newline()) {
        result = result.insert("\n", None);
        return Some(result);
    }

    let (_, attrs) = next_newline(document, index)?;
    result = result.insert("\n", attrs);
    Some(result)
}

/// Rule 4: auto-exit block. Pressing enter on an empty, block-styled line
/// leaves the block instead of producing another empty block member.
fn auto_exit_block(document: &Delta, index: usize, text: &str, ctx: &RuleContext) -> Option<Delta> {
    if text != "\n" {
        return None;
    }
    if !(preceded_by_newline(document, index) && followed_by_newline(document, index)) {
        return None;
    }
    let attrs = attrs_covering(document, index)?;
    let line_key = attrs
        .keys()
        .find(|k| ctx.attributes.scope_of(k).is_some_and(|s| s.is_line()))?
        .clone();

    let mut result = Delta::new();
    if index > 0 {
        result = result.retain(index, None);
    }
    result = result.retain(1, Some(unset_map(&line_key)));
    Some(result)
}

/// Rule 5: reset line format on newline. Splitting a non-empty heading line
/// keeps the heading on the first half only; the second half's newline
/// (already present in the document) has its header unset.
fn reset_line_format_on_newline(document: &Delta, index: usize, text: &str, _ctx: &RuleContext) -> Option<Delta> {
    if text != "\n" {
        return None;
    }
    if !followed_by_newline(document, index) {
        return None;
    }
    let attrs = attrs_covering(document, index)?;
    if !attrs.contains_key("header") {
        return None;
    }

    let mut result = Delta::new();
    if index > 0 {
        result = result.retain(index, None);
    }
    result = result.insert("\n", Some(attrs));
    result = result.retain(1, Some(unset_map("header")));
    Some(result)
}

/// Rule 6: auto-format links. Typing a space after a bare `http(s)://` URL
/// link-formats the URL (stripping trailing sentence punctuation first) and
/// carries the surrounding inline style — minus `link` — onto the space.
fn auto_format_links(document: &Delta, index: usize, text: &str, _ctx: &RuleContext) -> Option<Delta> {
    if text != " " || index == 0 {
        return None;
    }
    let prefix = document.slice(0, Some(index)).to_text();
    let word = prefix.split_whitespace().last()?;
    let candidate = strip_trailing_punctuation(word);
    if !is_absolute_http_url(candidate) {
        return None;
    }

    let prev_attrs = attrs_covering(document, index - 1).unwrap_or_default();
    if prev_attrs.contains_key("link") {
        return None;
    }

    let word_len = word.chars().count();
    let link_len = candidate.chars().count();
    let trailing_len = word_len - link_len;
    let word_start = index - word_len;

    let mut link_attrs = prev_attrs.clone();
    link_attrs.insert("link".to_string(), AttributeValue::String(candidate.to_string()));

    let mut result = Delta::new();
    if word_start > 0 {
        result = result.retain(word_start, None);
    }
    result = result.retain(link_len, Some(link_attrs));
    if trailing_len > 0 {
        result = result.retain(trailing_len, if prev_attrs.is_empty() { None } else { Some(prev_attrs.clone()) });
    }
    result = result.insert(" ", if prev_attrs.is_empty() { None } else { Some(prev_attrs) });
    Some(result)
}

/// Rule 7: preserve inline styles. An insert with no newline inherits the
/// previous character's inline attributes, except `link` — which only
/// carries over when the *following* character shares the same link value
/// (otherwise the caret sits at the link's boundary, and typing there must
/// not silently extend it).
fn preserve_inline_styles(document: &Delta, index: usize, text: &str, ctx: &RuleContext) -> Option<Delta> {
    if text.contains('\n') || index == 0 {
        return None;
    }
    let prev_attrs = attrs_covering(document, index - 1)?;
    let mut inline_attrs: AttributeMap = prev_attrs
        .iter()
        .filter(|(k, _)| ctx.attributes.scope_of(k).map(|s| s.is_inline()).unwrap_or(true))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    if let Some(link_value) = prev_attrs.get("link") {
        let next_attrs = attrs_covering(document, index);
        let keeps_link = next_attrs.as_ref().and_then(|a| a.get("link")) == Some(link_value);
        if !keeps_link {
            inline_attrs.remove("link");
        }
    }

    let mut result = Delta::new();
    if index > 0 {
        result = result.retain(index, None);
    }
    result = result.insert(text.to_string(), if inline_attrs.is_empty() { None } else { Some(inline_attrs) });
    Some(result)
}

/// Rule 8: catch-all. Inserts `text` verbatim with no attributes.
fn catch_all(_document: &Delta, index: usize, text: &str, _ctx: &RuleContext) -> Option<Delta> {
    let mut result = Delta::new();
    if index > 0 {
        result = result.retain(index, None);
    }
    result = result.insert(text.to_string(), None);
    Some(result)
}

pub fn standard_insert_rules() -> Vec<InsertRule> {
    vec![
        Box::new(preserve_block_style_on_paste),
        Box::new(force_newline_around_embed),
        Box::new(preserve_line_style_on_split),
        Box::new(auto_exit_block),
        Box::new(reset_line_format_on_newline),
        Box::new(auto_format_links),
        Box::new(preserve_inline_styles),
        Box::new(catch_all),
    ]
}
