//! JSON-LD error.

use std::fmt;

use serde_json::Value;
use thiserror;

/// JSON-LD processing result.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse-grained error kind for JSON-LD processing.
///
/// The core only ever fails in one of three ways: the textual interchange
/// form was malformed, a document violated the structural invariants of the
/// expanded/compacted data model, or a local context could not be
/// evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed textual input: UTF-8 validation failure, syntax error,
    /// max-depth exceeded, or a stray control character.
    Parse,
    /// Structural violation of the document model during expansion or
    /// compaction (duplicate reserved keys, wrong value shape for a
    /// reserved key, a list nested directly inside a list, extra keys
    /// alongside `@value`/`@list`/`@set`, ...).
    Syntax,
    /// Context-evaluation failure: a cycle among prefix references, or a
    /// request for an unsupported remote context.
    Process,
}

impl ErrorKind {
    /// Returns a short, stable description of the error kind.
    pub fn message(self) -> &'static str {
        match self {
            Self::Parse => "parse error",
            Self::Syntax => "syntax error",
            Self::Process => "context processing error",
        }
    }

    /// Creates an `Error` from this kind and the given source error.
    pub(crate) fn and_source<E>(self, source: E) -> Error
    where
        E: Into<anyhow::Error>,
    {
        Error {
            kind: self,
            node: None,
            source: Some(source.into()),
        }
    }

    /// Creates an `Error` from this kind, a message, and the offending node.
    pub(crate) fn with_node(self, message: impl fmt::Display, node: &Value) -> Error {
        Error {
            kind: self,
            node: Some(node.clone()),
            source: Some(anyhow::anyhow!("{}", message)),
        }
    }

    /// Creates an `Error` from this kind and a plain message, with no node.
    pub(crate) fn with_message(self, message: impl fmt::Display) -> Error {
        Error {
            kind: self,
            node: None,
            source: Some(anyhow::anyhow!("{}", message)),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ErrorKind {}

/// JSON-LD processing error.
///
/// Carries a coarse [`ErrorKind`], a human-readable message (wrapped as the
/// `anyhow` source), and, where available, a snapshot of the offending node
/// for diagnostics.
#[derive(Debug, thiserror::Error)]
pub struct Error {
    /// Error kind.
    kind: ErrorKind,
    /// Offending node, if one was captured at the failure site.
    node: Option<Value>,
    /// Details of the error (if available).
    #[source]
    source: Option<anyhow::Error>,
}

impl Error {
    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the offending node, if one was captured.
    pub fn node(&self) -> Option<&Value> {
        self.node.as_ref()
    }

    /// Wraps the error with the additional context.
    pub(crate) fn context<C>(self, context: C) -> Self
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        let source = match self.source {
            Some(source) => source.context(context),
            None => anyhow::anyhow!("{}", context),
        };

        Self {
            kind: self.kind,
            node: self.node,
            source: Some(source),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.message())?;
        if let Some(source) = self.source.as_ref() {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            node: None,
            source: None,
        }
    }
}

/// Extension trait for JSON-LD processing results.
pub(crate) trait ResultExt<T> {
    /// Wraps the error value with the additional context.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T> ResultExt<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|err| err.context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_source() {
        let err = ErrorKind::Syntax.with_message("duplicate @id");
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert!(err.to_string().contains("duplicate @id"));
    }

    #[test]
    fn node_snapshot_is_retained() {
        let node = serde_json::json!({"@id": "http://example/1", "@id2": "x"});
        let err = ErrorKind::Syntax.with_node("duplicate @id", &node);
        assert_eq!(err.node(), Some(&node));
    }

    #[test]
    fn bare_kind_converts_to_error() {
        let err: Error = ErrorKind::Process.into();
        assert_eq!(err.kind(), ErrorKind::Process);
        assert_eq!(err.to_string(), "context processing error");
    }
}
