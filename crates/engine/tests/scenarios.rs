use std::collections::BTreeMap;

use vellum_delta::{
    Attribute, AttributeRegistry, AttributeScope, AttributeValue, Delta, EmbedRegistry,
};
use vellum_engine::Document;

fn registries() -> (AttributeRegistry, EmbedRegistry) {
    (AttributeRegistry::standard(), EmbedRegistry::standard())
}

fn load(delta: Delta) -> Document {
    let (attributes, embeds) = registries();
    Document::from_delta(delta, attributes, embeds).unwrap()
}

fn bullet() -> Attribute {
    Attribute::new("list", AttributeScope::Line, AttributeValue::String("bullet".to_string()))
}

fn bold() -> Attribute {
    Attribute::new("bold", AttributeScope::Inline, AttributeValue::Boolean(true))
}

fn blockquote() -> Attribute {
    Attribute::new("blockquote", AttributeScope::Line, AttributeValue::Boolean(true))
}

fn link(value: &str) -> Attribute {
    Attribute::new("link", AttributeScope::Inline, AttributeValue::String(value.to_string()))
}

fn attrs(attribute: &Attribute) -> vellum_delta::AttributeMap {
    let mut map = BTreeMap::new();
    map.insert(attribute.key.clone(), attribute.value.clone());
    map
}

// Scenario 1: line format over a multi-line range (spec §8.1).
#[test]
fn line_format_over_range() {
    let mut doc = load(Delta::new().insert("Correct\nLine\nStyle\nRule\n", None));

    let change = doc.format(0, 20, &bullet()).unwrap();

    let expected = Delta::new()
        .retain(7, None)
        .retain(1, Some(attrs(&bullet())))
        .retain(4, None)
        .retain(1, Some(attrs(&bullet())))
        .retain(5, None)
        .retain(1, Some(attrs(&bullet())))
        .retain(4, None)
        .retain(1, Some(attrs(&bullet())));
    assert_eq!(change, expected);
}

// Scenario 2: zero-length line format hits the line under the caret (spec §8.2).
#[test]
fn line_format_zero_length() {
    let mut doc = load(Delta::new().insert("Correct\nLine\nStyle\nRule\n", None));

    let change = doc.format(0, 0, &bullet()).unwrap();

    let expected = Delta::new().retain(7, None).retain(1, Some(attrs(&bullet())));
    assert_eq!(change, expected);
}

// Scenario 3: formatting a line with an existing line style unsets the old one (spec §8.3).
#[test]
fn line_format_overrides_existing_style() {
    let mut doc = load(Delta::new().insert("Title", None).insert("\n", Some(attrs(&bullet()))));

    let change = doc.format(0, 0, &blockquote()).unwrap();

    let mut expected_attrs = BTreeMap::new();
    expected_attrs.insert("list".to_string(), AttributeValue::Null);
    expected_attrs.insert("blockquote".to_string(), AttributeValue::Boolean(true));
    let expected = Delta::new().retain(5, None).retain(1, Some(expected_attrs));
    assert_eq!(change, expected);
}

// Scenario 4: inline format skips newlines (spec §8.4).
#[test]
fn inline_format_skips_newlines() {
    let mut doc = load(Delta::new().insert("Correct\nLine\nStyle\nRule\n", None));

    let change = doc.format(0, 20, &bold()).unwrap();

    let expected = Delta::new()
        .retain(7, Some(attrs(&bold())))
        .retain(1, None)
        .retain(4, Some(attrs(&bold())))
        .retain(1, None)
        .retain(5, Some(attrs(&bold())))
        .retain(1, None)
        .retain(1, Some(attrs(&bold())));
    assert_eq!(change, expected);
}

// Scenario 5: a zero-length link format at a caret inside a link run re-formats the whole run (spec §8.5).
#[test]
fn link_format_at_caret_inside_run() {
    let mut doc = load(
        Delta::new()
            .insert("Visit our ", None)
            .insert("website", Some(attrs(&link("A"))))
            .insert(" for more details.\n", None),
    );

    let change = doc.format(13, 0, &link("B")).unwrap();

    let expected = Delta::new().retain(10, None).retain(7, Some(attrs(&link("B"))));
    assert_eq!(change, expected);
}

// Scenario 6: deleting a line's newline transplants its style onto the merged line (spec §8.6).
#[test]
fn delete_merges_line_style() {
    let mut doc = load(
        Delta::new()
            .insert("Title\nOne", None)
            .insert("\n", Some(attrs(&bullet())))
            .insert("Two\n", None),
    );

    let change = doc.delete(9, 1).unwrap();

    let expected = Delta::new()
        .retain(9, None)
        .delete(1)
        .retain(3, None)
        .retain(1, Some(attrs(&bullet())));
    assert_eq!(change, expected);
}

#[test]
fn to_plain_text_uses_one_placeholder_per_embed() {
    let (attributes, embeds) = registries();
    let mut doc = Document::new(attributes, embeds);
    doc.insert(0, "Hello").unwrap();
    doc.insert_object(5, "hr", serde_json::json!(true), None).unwrap();

    assert!(doc.to_plain_text().contains(vellum_delta::OBJECT_PLACEHOLDER));
}

// A line-placed embed dropped mid-line splits the line and carries the
// existing line's style onto the new leading newline (spec §4.5.3 rule 1),
// not onto the trailing one.
#[test]
fn insert_object_mid_line_preserves_existing_line_style_on_leading_newline() {
    let mut doc = load(Delta::new().insert("Item\n", Some(attrs(&bullet()))));

    let change = doc.insert_object(2, "hr", serde_json::json!(true), None).unwrap();

    let expected = Delta::new()
        .retain(2, None)
        .insert("\n", Some(attrs(&bullet())))
        .insert_object("hr", serde_json::json!(true), None)
        .insert("\n", None);
    assert_eq!(change, expected);
}

#[test]
fn closed_document_rejects_edits() {
    let (attributes, embeds) = registries();
    let mut doc = Document::new(attributes, embeds);
    doc.close();

    assert!(matches!(doc.insert(0, "x"), Err(vellum_engine::Error::Closed)));
}

#[test]
fn format_no_op_returns_empty_change() {
    let (attributes, embeds) = registries();
    let mut doc = Document::new(attributes, embeds);
    doc.insert(0, "hi").unwrap();

    let change = doc.format(0, 0, &bold()).unwrap();
    assert!(change.is_empty());
}

// An inline no-op format away from the caret's start must also collapse to
// an empty change, not a dangling leading retain (spec §8 boundary: "format(i,
// 0, inlineAttr) is a no-op returning empty" for any `i`, not just `i == 0`).
#[test]
fn format_no_op_at_nonzero_index_returns_empty_change() {
    let (attributes, embeds) = registries();
    let mut doc = Document::new(attributes, embeds);
    doc.insert(0, "hi").unwrap();

    let change = doc.format(1, 0, &bold()).unwrap();
    assert!(change.is_empty());
}

// A delete that would consume the document's trailing newline is rejected
// by the tree layer; the controller must leave both the stored Delta and
// the tree untouched rather than applying it partially (spec.md §5: "either
// commit both tree and Delta or raise and leave both unchanged").
#[test]
fn delete_consuming_final_newline_leaves_document_unchanged() {
    let (attributes, embeds) = registries();
    let mut doc = Document::new(attributes, embeds);
    doc.insert(0, "Hi").unwrap();

    let before = doc.delta().clone();
    let result = doc.delete(1, 2);
    assert!(result.is_err());
    assert_eq!(doc.delta(), &before);

    // The document must still accept further edits against its original
    // (unshortened) offsets — a diverged tree would mis-index here.
    doc.insert(2, "!").unwrap();
    assert_eq!(doc.to_plain_text(), "Hi!\n");
}

#[test]
fn invert_last_undoes_the_most_recent_edit() {
    let (attributes, embeds) = registries();
    let mut doc = Document::new(attributes, embeds);
    doc.insert(0, "hello").unwrap();

    let before = doc.delta().clone();
    doc.insert(5, " world").unwrap();
    assert_ne!(doc.delta(), &before);

    let undo = doc.invert_last().expect("an edit was just applied");
    let restored = doc.delta().compose(&undo);
    assert_eq!(restored, before);
}
