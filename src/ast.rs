//! Abstract Syntax Tree definitions for Atom
//!
//! Every node carries the span of the source that produced it; runtime
//! diagnostics are positioned with it.

use std::fmt;

use crate::ion::Span;

/// AST nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A sequence of top-level statements
    Program { body: Vec<Node>, span: Span },

    /// Variable reference: foo
    Identifier { name: String, span: Span },

    NullLiteral { span: Span },

    BoolLiteral { value: bool, span: Span },

    NumberLiteral { value: f64, span: Span },

    StringLiteral { value: String, span: Span },

    /// Object literal: { a: 1, "b": 2 }
    ObjectLiteral { properties: Vec<Property>, span: Span },

    /// `let name = value` or, when locked, `const name = value`
    VariableDeclaration {
        name: String,
        locked: bool,
        value: Box<Node>,
        span: Span,
    },

    /// Binary operation: a + b, x * y
    BinaryExpression {
        left: Box<Node>,
        op: BinaryOp,
        right: Box<Node>,
        span: Span,
    },

    /// Assignment: target = value
    AssignmentExpression {
        target: Box<Node>,
        value: Box<Node>,
        span: Span,
    },

    /// Property access: obj.prop or obj[key]
    MemberExpression {
        object: Box<Node>,
        property: MemberProperty,
        span: Span,
    },

    /// Function call: callee(args). Parsed, not yet evaluated.
    CallExpression {
        callee: Box<Node>,
        args: Vec<Node>,
        span: Span,
    },
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::Program { span, .. }
            | Node::Identifier { span, .. }
            | Node::NullLiteral { span }
            | Node::BoolLiteral { span, .. }
            | Node::NumberLiteral { span, .. }
            | Node::StringLiteral { span, .. }
            | Node::ObjectLiteral { span, .. }
            | Node::VariableDeclaration { span, .. }
            | Node::BinaryExpression { span, .. }
            | Node::AssignmentExpression { span, .. }
            | Node::MemberExpression { span, .. }
            | Node::CallExpression { span, .. } => *span,
        }
    }

    /// The kind tag, as used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Program { .. } => "Program",
            Node::Identifier { .. } => "Identifier",
            Node::NullLiteral { .. } => "NullLiteral",
            Node::BoolLiteral { .. } => "BoolLiteral",
            Node::NumberLiteral { .. } => "NumberLiteral",
            Node::StringLiteral { .. } => "StringLiteral",
            Node::ObjectLiteral { .. } => "ObjectLiteral",
            Node::VariableDeclaration { .. } => "VariableDeclaration",
            Node::BinaryExpression { .. } => "BinaryExpression",
            Node::AssignmentExpression { .. } => "AssignmentExpression",
            Node::MemberExpression { .. } => "MemberExpression",
            Node::CallExpression { .. } => "CallExpression",
        }
    }
}

/// A `key: value` entry of an object literal
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: String,
    pub value: Node,
}

/// The accessed side of a member expression
#[derive(Debug, Clone, PartialEq)]
pub enum MemberProperty {
    /// obj.name
    Named(String),
    /// obj[expr]; a number key is positional, a string key nominal
    Computed(Box<Node>),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add, // +
    Sub, // -
    Mul, // *
    Div, // /
    Mod, // %
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
            BinaryOp::Mod => write!(f, "%"),
        }
    }
}
