//! The four heuristic rewrite-rule pipelines (spec §4.5): ordered lists of
//! pure functions tried in turn until one returns a change. Each pipeline's
//! `standard()` constructor is the fallback registry a [`crate::Document`]
//! uses unless a host supplies its own list — hosts doing so must still end
//! their list with a catch-all, or the pipeline throws `RulesExhausted`.

pub mod delete;
pub mod format;
pub mod insert;
pub mod insert_object;

use vellum_delta::{AttributeRegistry, EmbedRegistry};

/// Read-only configuration every rule gets a reference to. Registries are
/// shared (not owned) since they're immutable after construction and may
/// back multiple documents at once.
pub struct RuleContext<'a> {
    pub attributes: &'a AttributeRegistry,
    pub embeds: &'a EmbedRegistry,
}

pub use delete::{standard_delete_rules, DeleteRule};
pub use format::{standard_format_rules, FormatRule};
pub use insert::{standard_insert_rules, InsertRule};
pub use insert_object::{standard_insert_object_rules, InsertObjectRule};
