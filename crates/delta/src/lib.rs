//! # Delta
//!
//! A Rust implementation of the Quill Delta format for representing rich text documents and changes.
//!
//! Deltas are a simple, yet expressive format that can be used to describe contents and changes.
//! The format is JSON based, and is human readable, yet easily parsible by machines. Deltas can
//! describe any rich text document, includes all text and formatting information, without the
//! ambiguity and complexity of HTML.
//!
//! On top of the Delta algebra this crate also carries the attribute/style model
//! ([`Style`], [`scope::AttributeScope`]) and the registry configuration surface
//! ([`registry::AttributeRegistry`], [`registry::EmbedRegistry`]) that a host document
//! controller uses to validate and render content.

pub mod attributes;
pub mod delta;
pub mod diff;
pub mod error;
pub mod json;
pub mod op;
pub mod op_iterator;
pub mod registry;
pub mod scope;
pub mod style;

pub use attributes::{AttributeMap, AttributeValue};
pub use delta::Delta;
pub use error::Error;
pub use json::{delta_from_json, delta_from_json_str, delta_to_json, delta_to_json_string};
pub use op::{ObjectValue, Op};
pub use op_iterator::OpIterator;
pub use registry::{
    AttributeRegistry, AttributeRegistryBuilder, CreateMissing, EmbedRegistry,
    EmbedRegistryBuilder, EmbedType, Placement,
};
pub use scope::AttributeScope;
pub use style::{Attribute, Style};

// Re-export for convenience
pub use serde_json::Value as JsonValue;

/// The Object Replacement Character — the placeholder an embed occupies in
/// any plain-text rendering of a document (`Delta::to_text`, a tree's
/// `to_plain_text`).
pub const OBJECT_PLACEHOLDER: char = '\u{FFFC}';
pub const OBJECT_PLACEHOLDER_STR: &str = "\u{FFFC}";
