//! Lexer for the Atom language
//!
//! Converts source code into a stream of ions.

use crate::error::{AtomError, ErrorKind, Result};
use crate::ion::{lookup_keyword, Ion, IonKind, Span};

/// The lexer state
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer from source code
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire source, terminated by an `Eof` ion
    pub fn tokenize(&mut self) -> Result<Vec<Ion>> {
        let mut ions = Vec::new();

        while let Some(ion) = self.next_ion()? {
            ions.push(ion);
        }

        ions.push(Ion::new(
            IonKind::Eof,
            Span::new(self.current_pos, self.current_pos, self.line, self.column),
            String::new(),
        ));

        Ok(ions)
    }

    fn next_ion(&mut self) -> Result<Option<Ion>> {
        self.skip_whitespace_and_comments();

        let Some(&(start_pos, ch)) = self.chars.peek() else {
            return Ok(None);
        };

        let start_line = self.line;
        let start_column = self.column;

        let kind = match ch {
            '(' => { self.advance(); IonKind::LeftParen }
            ')' => { self.advance(); IonKind::RightParen }
            '{' => { self.advance(); IonKind::LeftBrace }
            '}' => { self.advance(); IonKind::RightBrace }
            '[' => { self.advance(); IonKind::LeftBracket }
            ']' => { self.advance(); IonKind::RightBracket }
            ',' => { self.advance(); IonKind::Comma }
            ';' => { self.advance(); IonKind::Semicolon }
            ':' => { self.advance(); IonKind::Colon }
            '.' => { self.advance(); IonKind::Dot }
            '+' => { self.advance(); IonKind::Plus }
            '-' => { self.advance(); IonKind::Minus }
            '*' => { self.advance(); IonKind::Star }
            '/' => { self.advance(); IonKind::Slash }
            '%' => { self.advance(); IonKind::Percent }
            '=' => { self.advance(); IonKind::Equal }

            '\n' => {
                self.advance();
                self.new_line();
                IonKind::Newline
            }

            '"' | '\'' => self.scan_string(ch)?,

            c if c.is_ascii_digit() => self.scan_number()?,

            c if c.is_alphabetic() || c == '_' => self.scan_identifier(),

            _ => {
                self.advance();
                return Err(AtomError::new(
                    ErrorKind::UnexpectedCharacter(ch),
                    Some(Span::new(start_pos, self.current_pos, start_line, start_column)),
                ));
            }
        };

        let lexeme = self.source[start_pos..self.current_pos].to_string();

        Ok(Some(Ion::new(
            kind,
            Span::new(start_pos, self.current_pos, start_line, start_column),
            lexeme,
        )))
    }

    fn advance(&mut self) -> Option<char> {
        let (pos, ch) = self.chars.next()?;
        self.current_pos = pos + ch.len_utf8();
        self.column += 1;
        Some(ch)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, ch)| ch)
    }

    fn new_line(&mut self) {
        self.line += 1;
        self.column = 1;
    }

    /// Skip whitespace (except newlines) and `//` comments
    fn skip_whitespace_and_comments(&mut self) {
        while let Some(&(_, ch)) = self.chars.peek() {
            match ch {
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '/' if self.source[self.current_pos..].starts_with("//") => {
                    while let Some(c) = self.peek_char() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Scan a string literal delimited by `quote`
    fn scan_string(&mut self, quote: char) -> Result<IonKind> {
        let start_line = self.line;
        let start_column = self.column;
        let start_pos = self.current_pos;

        self.advance();

        let mut value = String::new();

        loop {
            match self.peek_char() {
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(IonKind::String(value));
                }
                Some('\\') => {
                    self.advance();
                    match self.advance() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('r') => value.push('\r'),
                        Some(c) => value.push(c),
                        None => break,
                    }
                }
                Some('\n') => {
                    value.push('\n');
                    self.advance();
                    self.new_line();
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
                None => break,
            }
        }

        Err(AtomError::new(
            ErrorKind::UnterminatedString,
            Some(Span::new(start_pos, self.current_pos, start_line, start_column)),
        ))
    }

    fn scan_number(&mut self) -> Result<IonKind> {
        let start = self.current_pos;
        let start_column = self.column;

        self.consume_digits();

        // A dot only belongs to the number when a digit follows it,
        // so `obj.0` style access is never swallowed here.
        if self.peek_char() == Some('.') {
            let after_dot = self.source[self.current_pos..].chars().nth(1);
            if after_dot.is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
                self.consume_digits();
            }
        }

        let text = &self.source[start..self.current_pos];
        text.parse::<f64>().map(IonKind::Number).map_err(|_| {
            AtomError::new(
                ErrorKind::InvalidNumber(text.to_string()),
                Some(Span::new(start, self.current_pos, self.line, start_column)),
            )
        })
    }

    fn consume_digits(&mut self) {
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn scan_identifier(&mut self) -> IonKind {
        let start = self.current_pos;

        while self.peek_char().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.advance();
        }

        let text = &self.source[start..self.current_pos];
        lookup_keyword(text).unwrap_or_else(|| IonKind::Ident(text.to_string()))
    }
}
