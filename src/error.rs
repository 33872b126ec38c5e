//! Front-end error types for Atom
//!
//! Lexing and parsing stop at the first error; these carry the span that
//! caused it. Runtime problems are diagnostics, see [`crate::diagnostic`].

use std::fmt;

use thiserror::Error;

use crate::ion::Span;

/// Error kinds raised before evaluation starts
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    // Lexer errors
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
    #[error("unterminated string")]
    UnterminatedString,
    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    // Parser errors
    #[error("{0}, got '{1}'")]
    ExpectedToken(String, String),
    #[error("expected expression, got '{0}'")]
    ExpectedExpression(String),
    #[error("invalid assignment target")]
    InvalidAssignmentTarget,
}

/// An Atom error with location information
#[derive(Debug, Clone, PartialEq)]
pub struct AtomError {
    pub kind: ErrorKind,
    pub span: Option<Span>,
    pub source_line: Option<String>,
}

impl AtomError {
    pub fn new(kind: ErrorKind, span: Option<Span>) -> Self {
        Self {
            kind,
            span,
            source_line: None,
        }
    }

    /// Attach the offending source line so `Display` can point at it
    pub fn with_source(mut self, source: &str) -> Self {
        self.source_line = self.span.and_then(|span| source_line(source, span));
        self
    }
}

impl fmt::Display for AtomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Some(span) => {
                write!(f, "[line {}:{}] Error: {}", span.line, span.column, self.kind)?;
                if let Some(line) = &self.source_line {
                    write_caret(f, line, *span)?;
                }
            }
            None => write!(f, "Error: {}", self.kind)?,
        }
        Ok(())
    }
}

impl std::error::Error for AtomError {}

/// Result type for Atom front-end operations
pub type Result<T> = std::result::Result<T, AtomError>;

/// The text of the 1-based line `span` points into
pub(crate) fn source_line(source: &str, span: Span) -> Option<String> {
    span.line
        .checked_sub(1)
        .and_then(|idx| source.lines().nth(idx))
        .map(str::to_string)
}

pub(crate) fn write_caret(f: &mut fmt::Formatter<'_>, line: &str, span: Span) -> fmt::Result {
    write!(f, "\n  | {}", line)?;
    write!(f, "\n  | {}^", " ".repeat(span.column.saturating_sub(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_source() {
        let err = AtomError::new(ErrorKind::UnexpectedCharacter('#'), Some(Span::new(8, 9, 2, 3)))
            .with_source("let a = 1\nb #");
        assert_eq!(
            err.to_string(),
            "[line 2:3] Error: unexpected character '#'\n  | b #\n  |   ^"
        );
    }

    #[test]
    fn test_display_without_span() {
        let err = AtomError::new(ErrorKind::UnterminatedString, None).with_source("\"abc");
        assert_eq!(err.to_string(), "Error: unterminated string");
    }
}
