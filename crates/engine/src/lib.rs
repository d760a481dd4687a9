//! # Vellum Engine
//!
//! The heuristic rewrite-rule pipelines (spec §4.5) and the document
//! controller (spec §4.6) that sits on top of [`vellum_delta`] and
//! [`vellum_tree`]: given a proposed edit, runs it through an ordered list
//! of pure rules until one produces a normalized change Delta, then
//! composes that change into the tree and the running document Delta and
//! publishes a [`ChangeEvent`] on the controller's broadcast stream.

pub mod change;
pub mod document;
pub mod error;
mod rules;
mod support;

pub use change::{ChangeEvent, ChangeStream, Source};
pub use document::Document;
pub use error::Error;
pub use rules::{
    standard_delete_rules, standard_format_rules, standard_insert_object_rules,
    standard_insert_rules, DeleteRule, FormatRule, InsertObjectRule, InsertRule, RuleContext,
};
