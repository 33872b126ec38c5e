//! Ion definitions for the Atom language
//!
//! Ions are the lexical units the parser consumes.

use std::fmt;

/// Location in source code for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self { start, end, line, column }
    }

    /// Span covering `self` through `other`, positioned at `self`
    pub fn to(self, other: Span) -> Self {
        Self::new(self.start, other.end, self.line, self.column)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Ion kinds in Atom
#[derive(Debug, Clone, PartialEq)]
pub enum IonKind {
    // Literals
    Number(f64),
    String(String),
    True,
    False,
    Null,

    Ident(String),

    // Keywords
    Let,   // unlocked binding
    Const, // locked binding

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Equal,

    // Delimiters
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Semicolon,
    Colon,
    Dot,

    Newline,
    Eof,
}

impl fmt::Display for IonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IonKind::Number(n) => write!(f, "{}", n),
            IonKind::String(s) => write!(f, "\"{}\"", s),
            IonKind::Ident(s) => write!(f, "{}", s),
            IonKind::True => write!(f, "true"),
            IonKind::False => write!(f, "false"),
            IonKind::Null => write!(f, "null"),
            IonKind::Let => write!(f, "let"),
            IonKind::Const => write!(f, "const"),
            IonKind::Plus => write!(f, "+"),
            IonKind::Minus => write!(f, "-"),
            IonKind::Star => write!(f, "*"),
            IonKind::Slash => write!(f, "/"),
            IonKind::Percent => write!(f, "%"),
            IonKind::Equal => write!(f, "="),
            IonKind::LeftParen => write!(f, "("),
            IonKind::RightParen => write!(f, ")"),
            IonKind::LeftBrace => write!(f, "{{"),
            IonKind::RightBrace => write!(f, "}}"),
            IonKind::LeftBracket => write!(f, "["),
            IonKind::RightBracket => write!(f, "]"),
            IonKind::Comma => write!(f, ","),
            IonKind::Semicolon => write!(f, ";"),
            IonKind::Colon => write!(f, ":"),
            IonKind::Dot => write!(f, "."),
            IonKind::Newline => write!(f, "\\n"),
            IonKind::Eof => write!(f, "EOF"),
        }
    }
}

/// An ion with its kind and location
#[derive(Debug, Clone, PartialEq)]
pub struct Ion {
    pub kind: IonKind,
    pub span: Span,
    pub lexeme: String,
}

impl Ion {
    pub fn new(kind: IonKind, span: Span, lexeme: String) -> Self {
        Self { kind, span, lexeme }
    }

    /// Source text of the ion as quoted in parse errors. Newlines and
    /// synthesized ions like `Eof` fall back to their kind.
    pub fn text(&self) -> String {
        if self.lexeme.is_empty() || self.kind == IonKind::Newline {
            self.kind.to_string()
        } else {
            self.lexeme.clone()
        }
    }
}

/// Check if a word is a keyword and return the corresponding ion kind
pub fn lookup_keyword(ident: &str) -> Option<IonKind> {
    match ident {
        "let" => Some(IonKind::Let),
        "const" => Some(IonKind::Const),
        "true" => Some(IonKind::True),
        "false" => Some(IonKind::False),
        "null" => Some(IonKind::Null),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        assert_eq!(lookup_keyword("const"), Some(IonKind::Const));
        assert_eq!(lookup_keyword("null"), Some(IonKind::Null));
        assert_eq!(lookup_keyword("state"), None);
    }

    #[test]
    fn test_text_prefers_lexeme() {
        let quoted = Ion::new(IonKind::String("a".into()), Span::default(), "'a'".into());
        let eof = Ion::new(IonKind::Eof, Span::default(), String::new());
        assert_eq!(quoted.text(), "'a'");
        assert_eq!(eof.text(), "EOF");

        let newline = Ion::new(IonKind::Newline, Span::default(), "\n".into());
        assert_eq!(newline.text(), "\\n");
    }

    #[test]
    fn test_span_join() {
        let a = Span::new(0, 1, 2, 5);
        let b = Span::new(4, 9, 2, 9);
        assert_eq!(a.to(b), Span::new(0, 9, 2, 5));
        assert_eq!(a.to_string(), "2:5");
    }
}
