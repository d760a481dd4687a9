//! Shared helpers the rule pipelines use to inspect the *current* document
//! Delta around an edit index. None of these mutate anything — every rule
//! reads `document` and returns a proposed change Delta.

use std::collections::BTreeMap;

use vellum_delta::{AttributeMap, AttributeValue, Delta, Op};

/// The character at `pos` in `document`'s text content (an embed counts as
/// [`vellum_delta::OBJECT_PLACEHOLDER`]), or `None` past the end.
pub(crate) fn char_at(document: &Delta, pos: usize) -> Option<char> {
    if pos >= document.length() {
        return None;
    }
    document.slice(pos, Some(pos + 1)).to_text().chars().next()
}

/// The op covering position `pos`, sliced down to that single position —
/// enough to inspect its type/attributes, though a sliced text op's `text`
/// field is truncated to one character.
pub(crate) fn op_covering(document: &Delta, pos: usize) -> Option<Op> {
    if pos >= document.length() {
        return None;
    }
    document.slice(pos, Some(pos + 1)).ops().first().cloned()
}

pub(crate) fn attrs_covering(document: &Delta, pos: usize) -> Option<AttributeMap> {
    op_covering(document, pos).and_then(|op| op.attributes().cloned())
}

/// The real, unsliced op whose span contains `pos` — unlike [`op_covering`],
/// this keeps a multi-character text op's full `text` intact, which a few
/// rules need (e.g. checking whether the op already contains a `'\n'`).
pub(crate) fn op_spanning(document: &Delta, pos: usize) -> Option<&Op> {
    let mut acc = 0usize;
    for op in document.ops() {
        let len = op.length();
        if pos >= acc && pos < acc + len {
            return Some(op);
        }
        acc += len;
    }
    None
}

/// `true` when the character immediately before `index` is `'\n'` (or
/// `index == 0`, which this spec treats as a line edge — the document start
/// behaves like it follows an implicit newline for split/merge purposes).
pub(crate) fn preceded_by_newline(document: &Delta, index: usize) -> bool {
    index == 0 || char_at(document, index - 1) == Some('\n')
}

/// `true` when the character at `index` is `'\n'` (or `index` is the
/// document's end).
pub(crate) fn followed_by_newline(document: &Delta, index: usize) -> bool {
    index >= document.length() || char_at(document, index) == Some('\n')
}

/// Attributes of the first `'\n'` at or after `from`, and its absolute
/// position — used by rules that "capture" or "scan forward to" a line's
/// style.
pub(crate) fn next_newline(document: &Delta, from: usize) -> Option<(usize, Option<AttributeMap>)> {
    let text = document.slice(from, None).to_text();
    let rel = text.chars().position(|c| c == '\n')?;
    let pos = from + rel;
    Some((pos, attrs_covering(document, pos)))
}

pub(crate) fn unset_map(key: &str) -> AttributeMap {
    let mut m = BTreeMap::new();
    m.insert(key.to_string(), AttributeValue::Null);
    m
}

/// The bounds `[start, end)` and shared value of the contiguous run of
/// `link`-attributed text touching `index`, if `index` sits inside (or on
/// the boundary of, from both sides) such a run. A normalized Delta merges
/// adjacent ops with identical attributes, so a "run" as this spec defines
/// it is ordinarily just the one op spanning `index` — this walk also
/// tolerates the degenerate case of two adjacent ops that happen to carry
/// an equal link value without having been merged (e.g. a hand-built Delta).
pub(crate) fn link_run_at(document: &Delta, index: usize) -> Option<(usize, usize, AttributeValue)> {
    let mut pos = 0usize;
    let mut run_start: Option<usize> = None;
    let mut run_value: Option<AttributeValue> = None;
    let mut found = None;

    for op in document.ops() {
        let len = op.length();
        let value = op.attributes().and_then(|a| a.get("link")).cloned();
        let continues = matches!((&run_value, &value), (Some(a), Some(b)) if a == b);
        if !continues {
            if let (Some(start), Some(rv)) = (run_start, run_value.clone()) {
                if start <= index && index <= pos {
                    found = Some((start, pos, rv));
                }
            }
            run_start = value.as_ref().map(|_| pos);
            run_value = value;
        }
        pos += len;
    }
    if found.is_none() {
        if let (Some(start), Some(rv)) = (run_start, run_value) {
            if start <= index && index <= pos {
                found = Some((start, pos, rv));
            }
        }
    }
    found
}

/// Strips trailing ASCII punctuation commonly found at the end of a
/// sentence (`.`, `,`, `;`, `:`, `!`, `?`, `)`, `]`) before validating a
/// candidate URL — per the auto-link Open Question decision (SPEC_FULL §D).
pub(crate) fn strip_trailing_punctuation(word: &str) -> &str {
    word.trim_end_matches(['.', ',', ';', ':', '!', '?', ')', ']'])
}

/// `http://`/`https://` only — the auto-link Open Question decision
/// deliberately excludes any other scheme.
pub(crate) fn is_absolute_http_url(word: &str) -> bool {
    word.starts_with("http://") || word.starts_with("https://")
}
