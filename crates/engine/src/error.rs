//! Error types for the rule pipelines and the document controller.
//!
//! Follows the two-class split from the engine's error handling design:
//! programmer errors (malformed calls — the caller should not retry) and
//! content errors (malformed or unrecognized data, handled by a registry's
//! `createMissing` policy upstream in `vellum_delta`). Internal invariant
//! violations get their own variant rather than a `panic!`.

#[derive(thiserror::Error)]
pub enum Error {
    #[error("offset {offset} is out of bounds for a document of length {length}")]
    OffsetOutOfBounds { offset: usize, length: usize },
    #[error("insert text must not be empty")]
    EmptyInsertText,
    #[error("embed type key must not be empty")]
    EmptyEmbedType,
    #[error("replace requires a non-empty text or a non-zero length")]
    EmptyReplace,
    #[error("document is closed and rejects further edits")]
    Closed,
    #[error("compose requires a non-empty change")]
    EmptyChange,
    #[error("rules exhausted: no rule in the {0} pipeline matched — a catch-all is missing")]
    RulesExhausted(&'static str),
    #[error("internal invariant violated: {0}")]
    Invariant(String),
    #[error(transparent)]
    Delta(#[from] vellum_delta::Error),
    #[error(transparent)]
    Tree(#[from] vellum_tree::Error),
}

pub(crate) fn format_error(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter,
) -> std::fmt::Result {
    write!(f, "{e}")?;

    let mut source = e.source();
    if e.source().is_some() {
        writeln!(f, "\ncaused by:")?;
        let mut i: usize = 0;
        while let Some(inner) = source {
            writeln!(f, "{i: >5}: {inner}")?;
            source = inner.source();
            i += 1;
        }
    }

    Ok(())
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        format_error(self, f)
    }
}
