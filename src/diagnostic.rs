//! Runtime diagnostics
//!
//! Evaluation never aborts: a failing operation reports a [`Diagnostic`]
//! to the [`Reporter`] its environment was built with and yields `null`.

use std::cell::{Cell, RefCell};
use std::fmt;

use colored::Colorize;
use thiserror::Error;

use crate::error::{source_line, write_caret};
use crate::ion::Span;

/// Runtime error taxonomy
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeErrorKind {
    #[error("variable '{0}' is already declared")]
    DuplicateDeclaration(String),

    #[error("cannot assign to locked variable '{0}'")]
    AssignToLocked(String),

    #[error("cannot resolve '{0}'")]
    UnresolvedName(String),

    #[error("object does not contain property {0}")]
    UnknownProperty(String),

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("cannot assign to {0}")]
    InvalidAssignmentTarget(&'static str),

    #[error("no evaluation rule for {0} nodes")]
    UnhandledNodeKind(&'static str),
}

impl RuntimeErrorKind {
    /// The stable error code
    pub fn code(&self) -> String {
        match self {
            RuntimeErrorKind::DuplicateDeclaration(_) => "AT2001".to_string(),
            RuntimeErrorKind::AssignToLocked(_) => "AT2002".to_string(),
            RuntimeErrorKind::UnresolvedName(_) => "AT2003".to_string(),
            RuntimeErrorKind::UnknownProperty(_) => "AT2004".to_string(),
            RuntimeErrorKind::TypeMismatch(_) => "AT2005".to_string(),
            RuntimeErrorKind::InvalidAssignmentTarget(_) => "AT2006".to_string(),
            RuntimeErrorKind::UnhandledNodeKind(kind) => format!("AT_UNKNOWN:{}", kind),
        }
    }
}

/// A runtime error positioned at the node that caused it
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: RuntimeErrorKind,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(kind: RuntimeErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn code(&self) -> String {
        self.kind.code()
    }

    pub fn line(&self) -> usize {
        self.span.line
    }

    pub fn column(&self) -> usize {
        self.span.column
    }

    /// Display form followed by the offending source line and a caret
    pub fn render(&self, source: &str) -> String {
        match source_line(source, self.span) {
            Some(line) => format!("{}{}", self, Caret(&line, self.span)),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[line {}:{}] Runtime error {}: {}",
            self.span.line,
            self.span.column,
            self.code(),
            self.kind
        )
    }
}

/// Sink for runtime diagnostics
pub trait Reporter {
    fn report(&self, diagnostic: Diagnostic);
}

/// Keeps every diagnostic for the caller to inspect
#[derive(Debug, Default)]
pub struct Collector {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.borrow().is_empty()
    }

    /// Copy of what has been reported so far
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    /// Remove and return everything reported so far
    pub fn drain(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow_mut().drain(..).collect()
    }

    pub fn into_inner(self) -> Vec<Diagnostic> {
        self.diagnostics.into_inner()
    }
}

impl Reporter for Collector {
    fn report(&self, diagnostic: Diagnostic) {
        log::debug!("collected {}", diagnostic);
        self.diagnostics.borrow_mut().push(diagnostic);
    }
}

/// Prints diagnostics to stderr as they happen, pointing into the source
pub struct StderrReporter {
    source: String,
    reported: Cell<usize>,
}

impl StderrReporter {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            reported: Cell::new(0),
        }
    }

    /// Number of diagnostics printed so far
    pub fn reported(&self) -> usize {
        self.reported.get()
    }
}

impl Reporter for StderrReporter {
    fn report(&self, diagnostic: Diagnostic) {
        self.reported.set(self.reported.get() + 1);
        eprintln!("{}", diagnostic.render(&self.source).red());
    }
}

struct Caret<'a>(&'a str, Span);

impl fmt::Display for Caret<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_caret(f, self.0, self.1)
    }
}
