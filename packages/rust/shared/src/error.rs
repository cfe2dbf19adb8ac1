//! Error types for journalbuilder.
//!
//! Library crates use [`JournalError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all journalbuilder operations.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    /// Configuration error: missing inputs, bad flags, unreadable config file.
    #[error("config error: {message}")]
    Config { message: String },

    /// A contribution's source document could not be located.
    #[error("can't find file {filename}")]
    NotFound { filename: String },

    /// The external converter failed on a source document.
    #[error("can't convert {} to LaTeX: {detail}", source_file.display())]
    Conversion { source_file: PathBuf, detail: String },

    /// The external typesetter failed or produced no output.
    #[error("typesetting error: {message}")]
    Typeset { message: String },

    /// Malformed metadata table (bad row, missing column, duplicate index).
    #[error("metadata error: {message}")]
    Metadata { message: String },

    /// An external program could not be launched at all.
    #[error("failed to launch `{program}`: {source}")]
    Tool {
        program: String,
        source: std::io::Error,
    },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Argument validation error.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, JournalError>;

impl JournalError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a not-found error for a contribution filename.
    pub fn not_found(filename: impl Into<String>) -> Self {
        Self::NotFound {
            filename: filename.into(),
        }
    }

    /// Create a conversion error for a source document.
    pub fn conversion(source_file: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        Self::Conversion {
            source_file: source_file.into(),
            detail: detail.into(),
        }
    }

    /// Create a typesetting error from any displayable message.
    pub fn typeset(msg: impl Into<String>) -> Self {
        Self::Typeset {
            message: msg.into(),
        }
    }

    /// Create a metadata error from any displayable message.
    pub fn metadata(msg: impl Into<String>) -> Self {
        Self::Metadata {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = JournalError::config("no database file; should be db.csv");
        assert_eq!(err.to_string(), "config error: no database file; should be db.csv");

        let err = JournalError::not_found("story.docx");
        assert_eq!(err.to_string(), "can't find file story.docx");

        let err = JournalError::conversion("/tmp/poem.rtf", "pandoc exited with status 64");
        assert!(err.to_string().contains("/tmp/poem.rtf"));
        assert!(err.to_string().contains("status 64"));
    }
}
