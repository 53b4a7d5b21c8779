//! Error types for dialect parsing.
//!
//! Parsers fail fast and loud on structurally malformed input (unbalanced
//! brackets, missing tables or messages) but stay maximally permissive about
//! unrecognized *type names*, which degrade to `any` instead of erroring:
//! downstream diffing treats `any` as matching everything.

use thiserror::Error;

/// Errors that can occur while parsing a schema source.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Structurally malformed dialect-specific syntax. The message carries
    /// the line number where the parser tracks one.
    #[error("syntax error: {message}")]
    Syntax {
        /// 1-based line in the source, where available.
        line: Option<usize>,
        /// Human-readable description, prefixed with the line when known.
        message: String,
    },

    /// A requested table/message/model name matches more than one candidate.
    #[error("selector {name:?} is ambiguous, matches: {}", .candidates.join(", "))]
    AmbiguousSelector {
        /// The requested name.
        name: String,
        /// All matching candidates.
        candidates: Vec<String>,
    },

    /// A requested table/message/model name matches no candidate.
    #[error("selector {name:?} matches nothing (available: {})", .available.join(", "))]
    SelectorNotFound {
        /// The requested name.
        name: String,
        /// The names that were defined in the source.
        available: Vec<String>,
    },

    /// The dialect of an input file could not be determined.
    #[error("cannot determine schema dialect of {path}")]
    UnknownDialect {
        /// The offending file path.
        path: String,
    },

    /// File I/O failure while reading a source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing failure in a JSON-carried dialect.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing failure in a YAML-carried dialect.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ParseError {
    /// Builds a syntax error, prefixing the message with the line number
    /// when one is known.
    pub fn syntax(line: Option<usize>, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = match line {
            Some(number) => format!("line {number}: {message}"),
            None => message,
        };
        Self::Syntax { line, message }
    }
}

/// Convenience alias for results with [`ParseError`].
pub type Result<T> = std::result::Result<T, ParseError>;
