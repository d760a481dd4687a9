//! Error types for tree mutation and lookup.

#[derive(thiserror::Error)]
pub enum Error {
    #[error("offset {offset} is out of bounds for a document of length {length}")]
    OffsetOutOfBounds { offset: usize, length: usize },
    #[error("a line-placed embed cannot share a line with other content")]
    EmbedLineViolation,
    #[error("internal tree invariant violated: {0}")]
    Invariant(String),
    #[error(transparent)]
    Delta(#[from] vellum_delta::Error),
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
