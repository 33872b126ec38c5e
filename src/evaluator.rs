//! Tree-walking evaluator for Atom
//!
//! `evaluate` dispatches on the node kind. Sub-expressions are evaluated
//! left to right, depth first, against the same environment. Failures are
//! reported through the environment and evaluate to `null`.

use crate::ast::{BinaryOp, MemberProperty, Node, Property};
use crate::diagnostic::RuntimeErrorKind;
use crate::environment::Environment;
use crate::ion::Span;
use crate::value::{ObjectRef, Value};

/// Evaluate `node` in `env`
pub fn evaluate(node: &Node, env: &Environment) -> Value {
    match node {
        Node::Program { body, .. } => eval_program(body, env),
        Node::Identifier { name, span } => env.get(name, *span),
        Node::NullLiteral { .. } => Value::null(),
        Node::BoolLiteral { value, .. } => Value::bool(*value),
        Node::NumberLiteral { value, .. } => Value::number(*value),
        Node::StringLiteral { value, .. } => Value::string(value.as_str()),
        Node::ObjectLiteral { properties, .. } => eval_object(properties, env),
        Node::VariableDeclaration { name, locked, value, span } => {
            let value = evaluate(value, env);
            env.declare(name, value, *locked, *span)
        }
        Node::BinaryExpression { left, op, right, span } => {
            let left = evaluate(left, env);
            let right = evaluate(right, env);
            eval_binary(&left, *op, &right, *span, env)
        }
        Node::AssignmentExpression { target, value, span } => eval_assignment(target, value, *span, env),
        Node::MemberExpression { object, property, span } => eval_member(object, property, *span, env),
        other => {
            env.report(RuntimeErrorKind::UnhandledNodeKind(other.kind()), other.span());
            Value::null()
        }
    }
}

fn eval_program(body: &[Node], env: &Environment) -> Value {
    let mut last = Value::null();
    for stmt in body {
        last = evaluate(stmt, env);
        log::trace!("last eval: {:?}", last);
    }
    last
}

fn eval_object(properties: &[Property], env: &Environment) -> Value {
    let entries: Vec<(String, Value)> = properties
        .iter()
        .map(|p| (p.key.clone(), evaluate(&p.value, env)))
        .collect();
    Value::object(entries)
}

fn eval_binary(left: &Value, op: BinaryOp, right: &Value, span: Span, env: &Environment) -> Value {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Value::number(match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Mod => a % b,
        }),
        (Value::String(_), _) | (_, Value::String(_)) if op == BinaryOp::Add => {
            Value::string(format!("{}{}", left, right))
        }
        _ => {
            env.report(
                RuntimeErrorKind::TypeMismatch(format!(
                    "cannot apply '{}' to {} and {}",
                    op,
                    left.type_name(),
                    right.type_name()
                )),
                span,
            );
            Value::null()
        }
    }
}

fn eval_assignment(target: &Node, value: &Node, span: Span, env: &Environment) -> Value {
    match target {
        Node::Identifier { name, .. } => {
            let value = evaluate(value, env);
            env.set(name, value, span)
        }
        Node::MemberExpression { object, property, span: target_span } => {
            let object = evaluate(object, env);
            let key = eval_key(property, *target_span, env);
            let value = evaluate(value, env);

            let (Some(obj), Some(key)) = (expect_object(&object, *target_span, env), key) else {
                return Value::null();
            };
            env.set_object_property(obj, key.name(), value, span, key.index())
        }
        other => {
            env.report(RuntimeErrorKind::InvalidAssignmentTarget(other.kind()), other.span());
            Value::null()
        }
    }
}

fn eval_member(object: &Node, property: &MemberProperty, span: Span, env: &Environment) -> Value {
    let object = evaluate(object, env);
    let key = eval_key(property, span, env);

    match (expect_object(&object, span, env), key) {
        (Some(obj), Some(key)) => env.get_object_property(obj, key.name(), span, key.index()),
        _ => Value::null(),
    }
}

/// How a member expression addresses a property
enum Key {
    Name(String),
    Position(usize),
}

impl Key {
    fn name(&self) -> &str {
        match self {
            Key::Name(name) => name,
            Key::Position(_) => "",
        }
    }

    fn index(&self) -> Option<usize> {
        match self {
            Key::Name(_) => None,
            Key::Position(i) => Some(*i),
        }
    }
}

fn eval_key(property: &MemberProperty, span: Span, env: &Environment) -> Option<Key> {
    let expr = match property {
        MemberProperty::Named(name) => return Some(Key::Name(name.clone())),
        MemberProperty::Computed(expr) => expr,
    };

    match evaluate(expr, env) {
        Value::String(name) => Some(Key::Name(name)),
        Value::Number(n) if n >= 0.0 && n.fract() == 0.0 && n < usize::MAX as f64 => {
            Some(Key::Position(n as usize))
        }
        Value::Number(n) => {
            env.report(RuntimeErrorKind::UnknownProperty(format!("at index {}", n)), span);
            None
        }
        other => {
            env.report(
                RuntimeErrorKind::TypeMismatch(format!(
                    "property key must be a string or number, got {}",
                    other.type_name()
                )),
                expr.span(),
            );
            None
        }
    }
}

fn expect_object<'v>(value: &'v Value, span: Span, env: &Environment) -> Option<&'v ObjectRef> {
    let obj = value.as_object();
    if obj.is_none() {
        env.report(
            RuntimeErrorKind::TypeMismatch(format!("cannot access a property of {}", value.type_name())),
            span,
        );
    }
    obj
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Collector;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Node {
        let ions = Lexer::new(source).tokenize().unwrap();
        Parser::new(ions).parse().unwrap()
    }

    /// Evaluate `source` in a fresh root scope; returns the result and the
    /// codes of everything reported.
    fn eval(source: &str) -> (Value, Vec<String>) {
        let collector = Collector::new();
        let value = {
            let env = Environment::new(&collector);
            evaluate(&parse(source), &env)
        };
        let codes = collector.into_inner().iter().map(|d| d.code()).collect();
        (value, codes)
    }

    fn eval_ok(source: &str) -> Value {
        let (value, codes) = eval(source);
        assert!(codes.is_empty(), "unexpected diagnostics {:?}", codes);
        value
    }

    fn span() -> Span {
        Span::new(0, 1, 1, 1)
    }

    #[test]
    fn test_literals() {
        assert_eq!(eval_ok("null"), Value::Null);
        assert_eq!(eval_ok("true"), Value::bool(true));
        assert_eq!(eval_ok("2.5"), Value::number(2.5));
        assert_eq!(eval_ok("'hi'"), Value::string("hi"));
    }

    #[test]
    fn test_empty_program_is_null() {
        assert_eq!(eval_ok(""), Value::Null);
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval_ok("1 + 2 * 3"), Value::number(7.0));
        assert_eq!(eval_ok("(1 + 2) * 3"), Value::number(9.0));
        assert_eq!(eval_ok("7 % 4 - 10 / 4"), Value::number(0.5));
        assert_eq!(eval_ok("-2 * 3"), Value::number(-6.0));
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(eval_ok("'a' + 'b'"), Value::string("ab"));
        assert_eq!(eval_ok("'n=' + 4"), Value::string("n=4"));
        assert_eq!(eval_ok("1 + '!'"), Value::string("1!"));
        assert_eq!(eval_ok("'is ' + true"), Value::string("is true"));
    }

    #[test]
    fn test_type_mismatch() {
        assert_eq!(eval("true + 1"), (Value::Null, vec!["AT2005".to_string()]));
        assert_eq!(eval("'a' * 2"), (Value::Null, vec!["AT2005".to_string()]));
        assert_eq!(eval("null - null"), (Value::Null, vec!["AT2005".to_string()]));
    }

    #[test]
    fn test_declaration_returns_value() {
        assert_eq!(eval_ok("let x = 3"), Value::number(3.0));
        assert_eq!(eval_ok("let x = 3; x + 4;"), Value::number(7.0));
    }

    #[test]
    fn test_locked_assignment() {
        let (value, codes) = eval("const x = 3; x = 5;");
        assert_eq!(value, Value::Null);
        assert_eq!(codes, ["AT2002"]);

        let (value, codes) = eval("const x = 3; x = 5; x");
        assert_eq!(value, Value::number(3.0));
        assert_eq!(codes, ["AT2002"]);
    }

    #[test]
    fn test_errors_do_not_stop_the_program() {
        let (value, codes) = eval("y; let z = 1; z + 1");
        assert_eq!(value, Value::number(2.0));
        assert_eq!(codes, ["AT2003"]);
    }

    #[test]
    fn test_assignment_evaluates_to_value() {
        assert_eq!(eval_ok("let x = 1; let y = 1; x = y = 4; x + y"), Value::number(8.0));
    }

    #[test]
    fn test_evaluation_order() {
        // The left operand's write happens before the right operand reads.
        assert_eq!(eval_ok("let x = 0; (x = 1) + (x = x + 10)"), Value::number(12.0));
        assert_eq!(eval_ok("let x = 0; let y = 0; (x = 1) + (y = x + 1); y"), Value::number(2.0));
    }

    #[test]
    fn test_member_assignment_order() {
        // The target object is fixed before the right-hand side rebinds `o`.
        let value = eval_ok("let o = { a: 1 }; let p = { a: 2 }; let q = o; o.a = (o = p); q.a");
        assert_eq!(value.to_string(), "{ a: 2 }");
        assert_eq!(eval_ok("let o = { a: 1 }; let p = { a: 2 }; o.a = (o = p); p.a"), Value::number(2.0));

        // The computed key runs before the right-hand side reads `k`.
        let value = eval_ok("let k = 0; let o = { a: 'x', b: 'y' }; o[k = 1] = k; o");
        assert_eq!(value.to_string(), "{ a: \"x\", b: 1 }");
    }

    #[test]
    fn test_huge_index_reports_written_value() {
        let collector = Collector::new();
        let env = Environment::new(&collector);
        let value = evaluate(&parse("let o = { a: 1 }; o[100000000000000000000000]"), &env);

        assert_eq!(value, Value::Null);
        let diagnostics = collector.snapshot();
        assert_eq!(diagnostics.len(), 1);
        let message = diagnostics[0].kind.to_string();
        assert!(message.contains("at index 100000000000000000000000"), "{}", message);
        assert!(!message.contains(&usize::MAX.to_string()), "{}", message);
    }

    #[test]
    fn test_object_literal_order() {
        let value = eval_ok("{ b: 1, a: 2, c: 1 + 2 }");
        assert_eq!(value.to_string(), "{ b: 1, a: 2, c: 3 }");
    }

    #[test]
    fn test_member_access() {
        assert_eq!(eval_ok("let o = { a: 1, b: 2 }; o.b"), Value::number(2.0));
        assert_eq!(eval_ok("let o = { a: 1, b: 2 }; o['a']"), Value::number(1.0));
        assert_eq!(eval_ok("let o = { a: 1, b: 2 }; o[1]"), Value::number(2.0));
        assert_eq!(eval_ok("let o = { a: 1, b: 2 }; o[0]"), Value::number(1.0));
        assert_eq!(eval_ok("let o = { inner: { x: 5 } }; o.inner.x"), Value::number(5.0));
    }

    #[test]
    fn test_member_assignment_mutates_shared_object() {
        assert_eq!(eval_ok("let o = { a: 1 }; let p = o; p.a = 9; o.a"), Value::number(9.0));
        assert_eq!(eval_ok("const o = { a: 1, b: 2 }; o[0] = 'x'; o"), Value::object([
            ("a", Value::string("x")),
            ("b", Value::number(2.0)),
        ]));
    }

    #[test]
    fn test_unknown_property() {
        assert_eq!(eval("let o = { a: 1 }; o.z"), (Value::Null, vec!["AT2004".to_string()]));
        assert_eq!(eval("let o = { a: 1 }; o[3]"), (Value::Null, vec!["AT2004".to_string()]));
        assert_eq!(eval("let o = { a: 1 }; o[0.5]"), (Value::Null, vec!["AT2004".to_string()]));

        let (value, codes) = eval("let o = { a: 1 }; o.z = 2; o");
        assert_eq!(value.to_string(), "{ a: 1 }");
        assert_eq!(codes, ["AT2004"]);
    }

    #[test]
    fn test_member_of_non_object() {
        assert_eq!(eval("let n = 1; n.a"), (Value::Null, vec!["AT2005".to_string()]));
        assert_eq!(eval("let o = { a: 1 }; o[true]"), (Value::Null, vec!["AT2005".to_string()]));
    }

    #[test]
    fn test_call_is_unhandled() {
        assert_eq!(
            eval("print(1)"),
            (Value::Null, vec!["AT_UNKNOWN:CallExpression".to_string()])
        );
    }

    #[test]
    fn test_invalid_assignment_target() {
        let collector = Collector::new();
        let env = Environment::new(&collector);
        let node = Node::AssignmentExpression {
            target: Box::new(Node::NumberLiteral { value: 1.0, span: span() }),
            value: Box::new(Node::NumberLiteral { value: 2.0, span: span() }),
            span: span(),
        };

        assert_eq!(evaluate(&node, &env), Value::Null);
        assert_eq!(collector.snapshot()[0].code(), "AT2006");
    }

    #[test]
    fn test_evaluates_in_child_scope() {
        let collector = Collector::new();
        let root = Environment::new(&collector);
        evaluate(&parse("let x = 1; const k = 2"), &root);

        let child = Environment::with_parent(&root);
        assert_eq!(evaluate(&parse("let x = 10; x + k"), &child), Value::number(12.0));
        assert_eq!(evaluate(&parse("x"), &root), Value::number(1.0));
        assert!(collector.is_empty());
    }
}
