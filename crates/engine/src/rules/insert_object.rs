//! Insert-object rule pipeline (spec §4.5.3), applied by
//! `insert_object(index, type, value, style)`.

use vellum_delta::{AttributeMap, Delta, Placement};
use vellum_delta::JsonValue;

use super::RuleContext;
use crate::support::{followed_by_newline, next_newline, preceded_by_newline};

pub type InsertObjectRule =
    Box<dyn Fn(&Delta, usize, &str, &JsonValue, Option<&AttributeMap>, &RuleContext) -> Option<Delta>>;

/// Rule 1: line-placed object. A line-placed embed lands directly on an
/// already-empty line; otherwise the line is split around it so the embed
/// ends up alone.
fn line_placed_object(
    document: &Delta,
    index: usize,
    key: &str,
    value: &JsonValue,
    style: Option<&AttributeMap>,
    ctx: &RuleContext,
) -> Option<Delta> {
    let embed_type = ctx.embeds.resolve(key).ok()?;
    if embed_type.placement != Placement::Line {
        return None;
    }

    let mut result = Delta::new();
    if index > 0 {
        result = result.retain(index, None);
    }

    let on_empty_line = preceded_by_newline(document, index) && followed_by_newline(document, index);
    if !on_empty_line && !preceded_by_newline(document, index) {
        let existing_style = next_newline(document, index).and_then(|(_, attrs)| attrs);
        result = result.insert("\n", existing_style);
    }
    result = result.insert_object(key.to_string(), value.clone(), style.cloned());
    if !on_empty_line && !followed_by_newline(document, index) {
        result = result.insert("\n", None);
    }
    Some(result)
}

/// Rule 2: catch-all. Inserts the object as-is with the caller's style.
fn catch_all(
    _document: &Delta,
    index: usize,
    key: &str,
    value: &JsonValue,
    style: Option<&AttributeMap>,
    _ctx: &RuleContext,
) -> Option<Delta> {
    let mut result = Delta::new();
    if index > 0 {
        result = result.retain(index, None);
    }
    result = result.insert_object(key.to_string(), value.clone(), style.cloned());
    Some(result)
}

pub fn standard_insert_object_rules() -> Vec<InsertObjectRule> {
    vec![Box::new(line_placed_object), Box::new(catch_all)]
}
