//! Error types for the Delta, attribute, and embed machinery.
//!
//! Follows the two-class split the engine's error handling design uses
//! throughout: programmer errors (malformed calls — the caller should not
//! retry) and content errors (malformed or unrecognized *data*, for which a
//! registry's `createMissing` policy decides the outcome).

#[derive(thiserror::Error)]
pub enum Error {
    #[error("attribute key '{0}' is not registered and the registry's createMissing policy rejects it")]
    UnknownAttribute(String),
    #[error("embed key '{0}' is not registered and the registry's createMissing policy rejects it")]
    UnknownEmbed(String),
    #[error("attribute '{key}' expects a {expected} value")]
    InvalidAttributeValue { key: String, expected: &'static str },
    #[error("malformed document JSON: {0}")]
    MalformedJson(String),
    #[error("a document Delta must contain only inserts and end with '\\n'")]
    NotADocument,
}

/// Mirrors the teacher's cause-chain `Debug` formatting so errors read the
/// same way across every crate in this workspace.
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
