//! Atom - a small lexically-scoped scripting language
//!
//! Source is lexed into ions, parsed into an AST and interpreted by a
//! tree-walking evaluator against a tree of scopes.

pub mod ion;
pub mod lexer;
pub mod parser;
pub mod ast;
pub mod value;
pub mod diagnostic;
pub mod environment;
pub mod evaluator;
pub mod error;

pub use diagnostic::{Collector, Diagnostic, Reporter, RuntimeErrorKind};
pub use environment::Environment;
pub use error::{AtomError, Result};
pub use evaluator::evaluate;
pub use lexer::Lexer;
pub use parser::Parser;
pub use value::Value;

/// Result of running a program
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Value of the last statement
    pub value: Value,
    /// Everything reported while evaluating, in order
    pub diagnostics: Vec<Diagnostic>,
}

impl Evaluation {
    /// No diagnostics were reported, so a `null` value is a real `null`
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Lex and parse `source` into a `Program` node
pub fn parse(source: &str) -> Result<ast::Node> {
    let ions = Lexer::new(source).tokenize()?;
    Parser::new(ions).parse()
}

/// Convenience function to run Atom code in a fresh root scope
pub fn run(source: &str) -> Result<Evaluation> {
    let program = parse(source)?;

    let collector = Collector::new();
    let value = {
        let env = Environment::new(&collector);
        evaluate(&program, &env)
    };

    Ok(Evaluation {
        value,
        diagnostics: collector.into_inner(),
    })
}

/// Version of the Atom language
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
