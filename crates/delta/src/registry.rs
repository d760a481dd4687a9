//! Attribute and embed registries — the engine's configuration surface.
//!
//! Both registries are built once (typically via their `builder()`) and are
//! read-only afterwards, so a single instance may be shared across documents
//! without synchronization.

use crate::error::Error;
use crate::scope::AttributeScope;
use std::collections::HashMap;

/// What to do when a key is not found in a registry during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateMissing {
    /// Reject with [`Error::UnknownAttribute`]/[`Error::UnknownEmbed`].
    Reject,
    /// Synthesize an entry with the given scope/placement rather than fail.
    Synthesize,
}

/// Maps an attribute key to its [`AttributeScope`].
///
/// The fallback registry matches the one named in the specification:
/// `bold`/`italic`/`link` inline, `header`/`list`/`blockquote`/`code-block`
/// line. Hosts extend it via [`AttributeRegistryBuilder`].
#[derive(Debug, Clone)]
pub struct AttributeRegistry {
    scopes: HashMap<String, AttributeScope>,
    create_missing: CreateMissing,
}

impl AttributeRegistry {
    pub fn builder() -> AttributeRegistryBuilder {
        AttributeRegistryBuilder::new()
    }

    /// The registry described in the specification's "standard attribute
    /// registry (fallback)" — this is what a document constructed without
    /// an explicit registry uses.
    pub fn standard() -> Self {
        AttributeRegistryBuilder::new()
            .inline("bold")
            .inline("italic")
            .inline("link")
            .line("header")
            .line("list")
            .line("blockquote")
            .line("code-block")
            .build()
    }

    pub fn scope_of(&self, key: &str) -> Option<AttributeScope> {
        self.scopes.get(key).copied()
    }

    /// Resolves `key`'s scope, applying `createMissing` when unregistered.
    /// `Synthesize` falls back to [`AttributeScope::Inline`] — an unknown
    /// attribute is assumed to be a span formatter unless a host's registry
    /// says otherwise.
    pub fn resolve(&self, key: &str) -> Result<AttributeScope, Error> {
        match self.scope_of(key) {
            Some(scope) => Ok(scope),
            None => match self.create_missing {
                CreateMissing::Reject => Err(Error::UnknownAttribute(key.to_string())),
                CreateMissing::Synthesize => Ok(AttributeScope::Inline),
            },
        }
    }
}

impl Default for AttributeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

pub struct AttributeRegistryBuilder {
    scopes: HashMap<String, AttributeScope>,
    create_missing: CreateMissing,
}

impl AttributeRegistryBuilder {
    pub fn new() -> Self {
        Self {
            scopes: HashMap::new(),
            create_missing: CreateMissing::Reject,
        }
    }

    pub fn inline(mut self, key: impl Into<String>) -> Self {
        self.scopes.insert(key.into(), AttributeScope::Inline);
        self
    }

    pub fn line(mut self, key: impl Into<String>) -> Self {
        self.scopes.insert(key.into(), AttributeScope::Line);
        self
    }

    pub fn on_missing(mut self, policy: CreateMissing) -> Self {
        self.create_missing = policy;
        self
    }

    pub fn build(self) -> AttributeRegistry {
        AttributeRegistry {
            scopes: self.scopes,
            create_missing: self.create_missing,
        }
    }
}

impl Default for AttributeRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Where an embed may live relative to its line: alongside text, or alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Inline,
    Line,
}

/// A registered embed kind: its placement and a `stringify` surrogate used
/// by `toPlainText()`-equivalent rendering.
#[derive(Clone)]
pub struct EmbedType {
    pub key: String,
    pub placement: Placement,
    stringify: fn(&serde_json::Value) -> String,
}

impl EmbedType {
    pub fn new(
        key: impl Into<String>,
        placement: Placement,
        stringify: fn(&serde_json::Value) -> String,
    ) -> Self {
        Self {
            key: key.into(),
            placement,
            stringify,
        }
    }

    pub fn stringify(&self, value: &serde_json::Value) -> String {
        (self.stringify)(value)
    }
}

impl std::fmt::Debug for EmbedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbedType")
            .field("key", &self.key)
            .field("placement", &self.placement)
            .finish()
    }
}

fn stringify_hr(_value: &serde_json::Value) -> String {
    String::new()
}

fn stringify_image(_value: &serde_json::Value) -> String {
    "[image]".to_string()
}

/// Maps an embed key to its [`EmbedType`].
#[derive(Debug, Clone)]
pub struct EmbedRegistry {
    types: HashMap<String, EmbedType>,
    create_missing: CreateMissing,
}

impl EmbedRegistry {
    pub fn builder() -> EmbedRegistryBuilder {
        EmbedRegistryBuilder::new()
    }

    /// The fallback registry named by the specification: `hr` and `image`,
    /// both line-placed.
    pub fn standard() -> Self {
        EmbedRegistryBuilder::new()
            .register(EmbedType::new("hr", Placement::Line, stringify_hr))
            .register(EmbedType::new("image", Placement::Line, stringify_image))
            .build()
    }

    pub fn get(&self, key: &str) -> Option<&EmbedType> {
        self.types.get(key)
    }

    /// Resolves `key` to an [`EmbedType`], applying `createMissing` when the
    /// key is unregistered. The default policy synthesizes a line-placed
    /// embed with an empty stringify surrogate, per the specification.
    pub fn resolve(&self, key: &str) -> Result<EmbedType, Error> {
        if let Some(t) = self.types.get(key) {
            return Ok(t.clone());
        }
        match self.create_missing {
            CreateMissing::Reject => Err(Error::UnknownEmbed(key.to_string())),
            CreateMissing::Synthesize => Ok(EmbedType::new(key, Placement::Line, stringify_hr)),
        }
    }
}

impl Default for EmbedRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

pub struct EmbedRegistryBuilder {
    types: HashMap<String, EmbedType>,
    create_missing: CreateMissing,
}

impl EmbedRegistryBuilder {
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
            create_missing: CreateMissing::Synthesize,
        }
    }

    pub fn register(mut self, embed_type: EmbedType) -> Self {
        self.types.insert(embed_type.key.clone(), embed_type);
        self
    }

    pub fn on_missing(mut self, policy: CreateMissing) -> Self {
        self.create_missing = policy;
        self
    }

    pub fn build(self) -> EmbedRegistry {
        EmbedRegistry {
            types: self.types,
            create_missing: self.create_missing,
        }
    }
}

impl Default for EmbedRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_attribute_scopes() {
        let reg = AttributeRegistry::standard();
        assert_eq!(reg.scope_of("bold"), Some(AttributeScope::Inline));
        assert_eq!(reg.scope_of("header"), Some(AttributeScope::Line));
        assert_eq!(reg.scope_of("unknown"), None);
    }

    #[test]
    fn unknown_attribute_rejected_by_default() {
        let reg = AttributeRegistry::standard();
        assert!(reg.resolve("mystery").is_err());
    }

    #[test]
    fn embed_registry_synthesizes_by_default() {
        let reg = EmbedRegistry::standard();
        let synthesized = reg.resolve("video").unwrap();
        assert_eq!(synthesized.placement, Placement::Line);
        assert_eq!(synthesized.stringify(&serde_json::Value::Null), "");
    }

    #[test]
    fn image_stringify_surrogate() {
        let reg = EmbedRegistry::standard();
        let image = reg.get("image").unwrap();
        assert_eq!(image.stringify(&serde_json::Value::Null), "[image]");
    }
}
