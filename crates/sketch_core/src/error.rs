//! Error kinds shared across the sandbox.
//!
//! Frame-loop failures are carried as a tagged kind + message pair rather than
//! unchecked panics: every `update`/`draw` invocation returns a
//! `Result<(), SketchError>` and the runner decides what to do with it.

use std::error::Error;
use std::fmt;

/// Category of a sandbox error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Source text failed to assemble into a callable program.
    Compile,
    /// A single `update` or `draw` invocation failed.
    Runtime,
    /// An asset accessor was called with an unregistered name.
    AssetNotFound,
    /// Asset registration conflict.
    DuplicateName,
}

impl ErrorKind {
    /// User-facing label for the status indicator.
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Compile => "CompileError",
            ErrorKind::Runtime => "RuntimeError",
            ErrorKind::AssetNotFound => "AssetNotFound",
            ErrorKind::DuplicateName => "DuplicateName",
        }
    }
}

/// Tagged error surfaced through the console and returned from frame calls.
#[derive(Debug, Clone, PartialEq)]
pub struct SketchError {
    pub kind: ErrorKind,
    pub message: String,
}

impl SketchError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn compile(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Compile, message)
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Runtime, message)
    }

    pub fn asset_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AssetNotFound, message)
    }

    pub fn duplicate_name(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateName, message)
    }
}

impl fmt::Display for SketchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.message)
    }
}

impl Error for SketchError {}

/// Result type used throughout the sandbox core.
pub type SketchResult<T> = Result<T, SketchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_label() {
        let err = SketchError::runtime("attempt to index a nil value");
        assert_eq!(
            err.to_string(),
            "RuntimeError: attempt to index a nil value"
        );
    }

    #[test]
    fn test_kind_constructors() {
        assert_eq!(SketchError::compile("x").kind, ErrorKind::Compile);
        assert_eq!(
            SketchError::asset_not_found("x").kind,
            ErrorKind::AssetNotFound
        );
        assert_eq!(
            SketchError::duplicate_name("x").kind,
            ErrorKind::DuplicateName
        );
    }
}
