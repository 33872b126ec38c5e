//! Parser for the Atom language
//!
//! Converts ions into an Abstract Syntax Tree.

use crate::ast::{BinaryOp, MemberProperty, Node, Property};
use crate::error::{AtomError, ErrorKind, Result};
use crate::ion::{Ion, IonKind, Span};

/// The parser state
pub struct Parser {
    ions: Vec<Ion>,
    current: usize,
    /// Open `(`, `[` and `{` groups; newlines inside them are not separators.
    nesting: usize,
}

impl Parser {
    /// Create a new parser from ions. The sequence must end with `Eof`,
    /// as produced by [`crate::Lexer::tokenize`].
    pub fn new(mut ions: Vec<Ion>) -> Self {
        if !matches!(ions.last().map(|i| &i.kind), Some(IonKind::Eof)) {
            let span = ions.last().map(|i| i.span).unwrap_or_default();
            ions.push(Ion::new(IonKind::Eof, span, String::new()));
        }
        Self { ions, current: 0, nesting: 0 }
    }

    /// Parse the ions into a `Program` node
    pub fn parse(&mut self) -> Result<Node> {
        let span = self.peek().span;
        let mut body = Vec::new();

        self.skip_separators();
        while !self.is_at_end() {
            body.push(self.statement()?);
            self.end_of_statement()?;
            self.skip_separators();
        }

        Ok(Node::Program { body, span })
    }

    // ==================== Statements ====================

    fn statement(&mut self) -> Result<Node> {
        if self.check(&IonKind::Let) || self.check(&IonKind::Const) {
            self.variable_declaration()
        } else {
            self.expression()
        }
    }

    fn variable_declaration(&mut self) -> Result<Node> {
        let keyword = self.advance().clone();
        let locked = keyword.kind == IonKind::Const;

        let name = self.expect_ident("expected variable name")?;
        self.expect(&IonKind::Equal, "expected '=' after variable name")?;
        let value = self.expression()?;

        Ok(Node::VariableDeclaration {
            name,
            locked,
            span: keyword.span.to(value.span()),
            value: Box::new(value),
        })
    }

    fn end_of_statement(&mut self) -> Result<()> {
        if self.check(&IonKind::Semicolon) || self.check(&IonKind::Newline) || self.is_at_end() {
            return Ok(());
        }
        Err(self.error_expected("expected ';' or newline after statement"))
    }

    // ==================== Expressions ====================

    fn expression(&mut self) -> Result<Node> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Node> {
        let target = self.additive()?;

        if self.match_token(&IonKind::Equal) {
            let equals = self.previous().span;
            let value = self.assignment()?;

            return match target {
                Node::Identifier { .. } | Node::MemberExpression { .. } => {
                    Ok(Node::AssignmentExpression {
                        span: target.span().to(value.span()),
                        target: Box::new(target),
                        value: Box::new(value),
                    })
                }
                _ => Err(AtomError::new(ErrorKind::InvalidAssignmentTarget, Some(equals))),
            };
        }

        Ok(target)
    }

    fn additive(&mut self) -> Result<Node> {
        let mut left = self.multiplicative()?;

        loop {
            let op = if self.match_token(&IonKind::Plus) {
                BinaryOp::Add
            } else if self.match_token(&IonKind::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };

            let right = self.multiplicative()?;
            left = binary(left, op, right);
        }

        Ok(left)
    }

    fn multiplicative(&mut self) -> Result<Node> {
        let mut left = self.postfix()?;

        loop {
            let op = if self.match_token(&IonKind::Star) {
                BinaryOp::Mul
            } else if self.match_token(&IonKind::Slash) {
                BinaryOp::Div
            } else if self.match_token(&IonKind::Percent) {
                BinaryOp::Mod
            } else {
                break;
            };

            let right = self.postfix()?;
            left = binary(left, op, right);
        }

        Ok(left)
    }

    fn postfix(&mut self) -> Result<Node> {
        let mut expr = self.primary()?;

        loop {
            if self.match_token(&IonKind::Dot) {
                let name = self.expect_ident("expected property name after '.'")?;
                let span = expr.span().to(self.previous().span);
                expr = Node::MemberExpression {
                    object: Box::new(expr),
                    property: MemberProperty::Named(name),
                    span,
                };
            } else if self.match_token(&IonKind::LeftBracket) {
                self.nesting += 1;
                let key = self.expression()?;
                self.expect(&IonKind::RightBracket, "expected ']' after property key")?;
                self.nesting -= 1;
                let span = expr.span().to(self.previous().span);
                expr = Node::MemberExpression {
                    object: Box::new(expr),
                    property: MemberProperty::Computed(Box::new(key)),
                    span,
                };
            } else if self.match_token(&IonKind::LeftParen) {
                expr = self.finish_call(expr)?;
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Node) -> Result<Node> {
        self.nesting += 1;
        let mut args = Vec::new();

        if !self.check(&IonKind::RightParen) {
            loop {
                args.push(self.expression()?);
                if !self.match_token(&IonKind::Comma) {
                    break;
                }
            }
        }

        self.expect(&IonKind::RightParen, "expected ')' after arguments")?;
        self.nesting -= 1;

        Ok(Node::CallExpression {
            span: callee.span().to(self.previous().span),
            callee: Box::new(callee),
            args,
        })
    }

    fn primary(&mut self) -> Result<Node> {
        let ion = self.peek().clone();
        let span = ion.span;

        let node = match ion.kind {
            IonKind::Number(value) => Node::NumberLiteral { value, span },
            IonKind::String(value) => Node::StringLiteral { value, span },
            IonKind::True => Node::BoolLiteral { value: true, span },
            IonKind::False => Node::BoolLiteral { value: false, span },
            IonKind::Null => Node::NullLiteral { span },
            IonKind::Ident(name) => Node::Identifier { name, span },
            IonKind::Minus => return self.negative_number(),
            IonKind::LeftParen => return self.grouping(),
            IonKind::LeftBrace => return self.object_literal(),
            _ => return Err(self.error_expected_expression()),
        };

        self.advance();
        Ok(node)
    }

    /// `-` directly before a number literal folds into the literal
    fn negative_number(&mut self) -> Result<Node> {
        let minus = self.advance().span;
        let ion = self.peek().clone();

        match ion.kind {
            IonKind::Number(value) => {
                self.advance();
                Ok(Node::NumberLiteral { value: -value, span: minus.to(ion.span) })
            }
            _ => Err(self.error_expected_expression()),
        }
    }

    fn grouping(&mut self) -> Result<Node> {
        self.advance();
        self.nesting += 1;
        let expr = self.expression()?;
        self.expect(&IonKind::RightParen, "expected ')' after expression")?;
        self.nesting -= 1;
        Ok(expr)
    }

    fn object_literal(&mut self) -> Result<Node> {
        let open = self.advance().span;
        self.nesting += 1;

        let mut properties = Vec::new();
        while !self.check(&IonKind::RightBrace) && !self.is_at_end() {
            let key_ion = self.advance().clone();
            let key = match &key_ion.kind {
                IonKind::Ident(name) | IonKind::String(name) => name.clone(),
                _ => {
                    return Err(AtomError::new(
                        ErrorKind::ExpectedToken("expected property name".to_string(), key_ion.text()),
                        Some(key_ion.span),
                    ))
                }
            };

            self.expect(&IonKind::Colon, "expected ':' after property name")?;
            let value = self.expression()?;
            properties.push(Property { key, value });

            if !self.match_token(&IonKind::Comma) {
                break;
            }
        }

        self.expect(&IonKind::RightBrace, "expected '}' after object properties")?;
        self.nesting -= 1;

        Ok(Node::ObjectLiteral { properties, span: open.to(self.previous().span) })
    }

    // ==================== Helpers ====================

    /// Index of the next significant ion
    fn position(&self) -> usize {
        let mut pos = self.current;
        if self.nesting > 0 {
            while matches!(self.ions[pos].kind, IonKind::Newline) {
                pos += 1;
            }
        }
        pos
    }

    fn peek(&self) -> &Ion {
        &self.ions[self.position()]
    }

    fn previous(&self) -> &Ion {
        &self.ions[self.current.saturating_sub(1)]
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, IonKind::Eof)
    }

    fn advance(&mut self) -> &Ion {
        if !self.is_at_end() {
            self.current = self.position() + 1;
        }
        self.previous()
    }

    fn check(&self, kind: &IonKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    fn match_token(&mut self, kind: &IonKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &IonKind, message: &str) -> Result<&Ion> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_expected(message))
        }
    }

    fn expect_ident(&mut self, message: &str) -> Result<String> {
        if let IonKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.error_expected(message))
        }
    }

    fn error_expected(&self, message: &str) -> AtomError {
        AtomError::new(
            ErrorKind::ExpectedToken(message.to_string(), self.peek().text()),
            Some(self.peek().span),
        )
    }

    fn error_expected_expression(&self) -> AtomError {
        AtomError::new(
            ErrorKind::ExpectedExpression(self.peek().text()),
            Some(self.peek().span),
        )
    }

    fn skip_separators(&mut self) {
        while self.match_token(&IonKind::Newline) || self.match_token(&IonKind::Semicolon) {}
    }
}

fn binary(left: Node, op: BinaryOp, right: Node) -> Node {
    let span: Span = left.span().to(right.span());
    Node::BinaryExpression {
        left: Box::new(left),
        op,
        right: Box::new(right),
        span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(source: &str) -> Vec<Node> {
        let tokens = Lexer::new(source).tokenize().unwrap();
        match Parser::new(tokens).parse().unwrap() {
            Node::Program { body, .. } => body,
            other => panic!("expected program, got {:?}", other),
        }
    }

    fn parse_err(source: &str) -> ErrorKind {
        let tokens = Lexer::new(source).tokenize().unwrap();
        Parser::new(tokens).parse().unwrap_err().kind
    }

    #[test]
    fn test_declarations() {
        let body = parse("let x = 1; const y = 2");
        assert_eq!(body.len(), 2);
        match (&body[0], &body[1]) {
            (
                Node::VariableDeclaration { name: a, locked: false, .. },
                Node::VariableDeclaration { name: b, locked: true, .. },
            ) => {
                assert_eq!(a, "x");
                assert_eq!(b, "y");
            }
            _ => panic!("expected two declarations, got {:?}", body),
        }
    }

    #[test]
    fn test_precedence() {
        let body = parse("1 + 2 * 3");
        match &body[0] {
            Node::BinaryExpression { op: BinaryOp::Add, right, .. } => {
                assert!(matches!(**right, Node::BinaryExpression { op: BinaryOp::Mul, .. }));
            }
            other => panic!("expected addition, got {:?}", other),
        }
    }

    #[test]
    fn test_assignment_is_right_associative() {
        let body = parse("a = b = 3");
        match &body[0] {
            Node::AssignmentExpression { target, value, .. } => {
                assert!(matches!(**target, Node::Identifier { ref name, .. } if name == "a"));
                assert!(matches!(**value, Node::AssignmentExpression { .. }));
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_member_access() {
        let body = parse("point.x; point[1]; point['y'] = 4");
        assert!(matches!(
            &body[0],
            Node::MemberExpression { property: MemberProperty::Named(name), .. } if name == "x"
        ));
        assert!(matches!(
            &body[1],
            Node::MemberExpression { property: MemberProperty::Computed(_), .. }
        ));
        assert!(matches!(&body[2], Node::AssignmentExpression { .. }));
    }

    #[test]
    fn test_object_literal_across_lines() {
        let body = parse("let o = {\n  a: 1,\n  \"b c\": 2,\n}\no");
        assert_eq!(body.len(), 2);
        match &body[0] {
            Node::VariableDeclaration { value, .. } => match &**value {
                Node::ObjectLiteral { properties, .. } => {
                    let keys: Vec<&str> = properties.iter().map(|p| p.key.as_str()).collect();
                    assert_eq!(keys, ["a", "b c"]);
                }
                other => panic!("expected object literal, got {:?}", other),
            },
            other => panic!("expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_literal_and_grouping() {
        let body = parse("(-2 - 3) * 4");
        match &body[0] {
            Node::BinaryExpression { op: BinaryOp::Mul, left, .. } => match &**left {
                Node::BinaryExpression { left, .. } => {
                    assert!(matches!(**left, Node::NumberLiteral { value, .. } if value == -2.0));
                }
                other => panic!("expected subtraction, got {:?}", other),
            },
            other => panic!("expected multiplication, got {:?}", other),
        }
    }

    #[test]
    fn test_call_is_parsed() {
        let body = parse("print(1, 2)");
        assert!(matches!(&body[0], Node::CallExpression { args, .. } if args.len() == 2));
    }

    #[test]
    fn test_node_positions() {
        let body = parse("let a = 1\n  a + 2");
        let span = body[1].span();
        assert_eq!((span.line, span.column), (2, 3));
    }

    #[test]
    fn test_invalid_assignment_target() {
        assert_eq!(parse_err("1 = 2"), ErrorKind::InvalidAssignmentTarget);
    }

    #[test]
    fn test_missing_separator() {
        assert!(matches!(parse_err("let x = 3 x"), ErrorKind::ExpectedToken(..)));
    }

    #[test]
    fn test_missing_expression() {
        assert!(matches!(parse_err("let x = ;"), ErrorKind::ExpectedExpression(_)));
    }

    #[test]
    fn test_errors_quote_source_text() {
        assert_eq!(
            parse_err("let 'a' = 1"),
            ErrorKind::ExpectedToken("expected variable name".to_string(), "'a'".to_string())
        );
        assert_eq!(parse_err("let x = )"), ErrorKind::ExpectedExpression(")".to_string()));
        assert_eq!(parse_err("let x = -y"), ErrorKind::ExpectedExpression("y".to_string()));
        assert_eq!(parse_err("let x ="), ErrorKind::ExpectedExpression("EOF".to_string()));
        assert_eq!(
            parse_err("{ 1: 2 }"),
            ErrorKind::ExpectedToken("expected property name".to_string(), "1".to_string())
        );
    }
}
