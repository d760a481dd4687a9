//! Format rule pipeline (spec §4.5.1), applied by `format(index, length, attribute)`.

use std::collections::BTreeMap;

use vellum_delta::{Attribute, AttributeValue, Delta};

use super::RuleContext;
use crate::support::{attrs_covering, link_run_at};

pub type FormatRule = Box<dyn Fn(&Delta, usize, usize, &Attribute, &RuleContext) -> Option<Delta>>;

/// Rule 1: link-at-caret. A zero-length `link` format at a caret sitting
/// inside an existing link run re-formats the whole run rather than
/// inserting a zero-width link at a point.
fn link_at_caret(
    document: &Delta,
    index: usize,
    length: usize,
    attribute: &Attribute,
    _ctx: &RuleContext,
) -> Option<Delta> {
    if attribute.key != "link" || length != 0 {
        return None;
    }
    let (start, end, _existing_value) = link_run_at(document, index)?;
    let mut result = Delta::new();
    if start > 0 {
        result = result.retain(start, None);
    }
    let mut attrs = BTreeMap::new();
    attrs.insert(attribute.key.clone(), attribute.value.clone());
    result = result.retain(end - start, Some(attrs));
    Some(result)
}

/// Rule 2: resolve line format. Applies a line-scoped attribute to every
/// `'\n'` in `[index, index+length)`, then to the next `'\n'` after that
/// range too (so a zero-length format always hits the line under the
/// caret). Any other line-scoped attribute present on a target newline is
/// unset first, since a line carries at most one.
fn resolve_line_format(
    document: &Delta,
    index: usize,
    length: usize,
    attribute: &Attribute,
    ctx: &RuleContext,
) -> Option<Delta> {
    if !attribute.scope.is_line() {
        return None;
    }

    let chars: Vec<char> = document.to_text().chars().collect();

    let mut targets: Vec<usize> = Vec::new();
    for (i, &c) in chars.iter().enumerate() {
        if c == '\n' && i >= index && i < index + length {
            targets.push(i);
        }
    }
    let mut p = index + length;
    while p < chars.len() {
        if chars[p] == '\n' {
            targets.push(p);
            break;
        }
        p += 1;
    }
    if targets.is_empty() {
        return None;
    }

    let mut result = Delta::new();
    let mut pos = 0;
    for target in targets {
        if target > pos {
            result = result.retain(target - pos, None);
        }
        let existing = attrs_covering(document, target).unwrap_or_default();
        let mut new_attrs = BTreeMap::new();
        for (key, _) in &existing {
            if key != &attribute.key && ctx.attributes.scope_of(key).map(|s| s.is_line()).unwrap_or(false) {
                new_attrs.insert(key.clone(), AttributeValue::Null);
            }
        }
        new_attrs.insert(attribute.key.clone(), attribute.value.clone());
        result = result.retain(1, Some(new_attrs));
        pos = target + 1;
    }
    Some(result)
}

/// Rule 3: resolve inline format. Applies an inline-scoped attribute to
/// every non-newline character in `[index, index+length)`; newlines inside
/// the range are retained unchanged so they keep splitting runs cleanly.
fn resolve_inline_format(
    document: &Delta,
    index: usize,
    length: usize,
    attribute: &Attribute,
    _ctx: &RuleContext,
) -> Option<Delta> {
    if !attribute.scope.is_inline() {
        return None;
    }

    let chars: Vec<char> = document.to_text().chars().collect();
    let end = index + length;

    let mut result = Delta::new();
    if index > 0 {
        result = result.retain(index, None);
    }
    let mut i = index;
    while i < end && i < chars.len() {
        if chars[i] == '\n' {
            result = result.retain(1, None);
            i += 1;
        } else {
            let run_start = i;
            while i < end && i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            let mut attrs = BTreeMap::new();
            attrs.insert(attribute.key.clone(), attribute.value.clone());
            result = result.retain(i - run_start, Some(attrs));
        }
    }
    Some(result)
}

pub fn standard_format_rules() -> Vec<FormatRule> {
    vec![
        Box::new(link_at_caret),
        Box::new(resolve_line_format),
        Box::new(resolve_inline_format),
    ]
}
