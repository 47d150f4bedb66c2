//! Arena-allocated Abstract Syntax Tree for the TypeScript/JavaScript
//! compiler core.
//!
//! Every node is allocated by a [`bumpalo::Bump`] arena and borrows from it;
//! there is no owned-tree representation. This crate defines the node
//! shapes only — it has no lexer or parser, matching source-spec §1's
//! external-collaborator boundary: an AST reaches the compiler already
//! built by something else (a real parser, or a test harness).

pub mod decl;
pub mod expr;
mod node;
pub mod ops;
pub mod pattern;
pub mod stmt;

pub use decl::*;
pub use expr::*;
pub use node::Ident;
pub use ops::*;
pub use pattern::*;
pub use stmt::*;

use jsc_core::Span;
use stmt::Stmt as TopLevelStmt;

/// The root of a parsed, type-checked module or script.
///
/// `body` holds the top-level statement list — function/class declarations,
/// `let`/`const`/`var`, `import`/`export`, and arbitrary statements are all
/// valid top-level items, exactly as in a JavaScript module or script body.
#[derive(Debug, Clone, Copy)]
pub struct Program<'ast> {
    body: &'ast [TopLevelStmt<'ast>],
    span: Span,
}

impl<'ast> Program<'ast> {
    pub fn new(body: &'ast [TopLevelStmt<'ast>], span: Span) -> Self {
        Self { body, span }
    }

    pub fn body(&self) -> &[TopLevelStmt<'ast>] {
        self.body
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_exposes_body_and_span() {
        let program = Program::new(&[], Span::new(1, 1, 0));
        assert!(program.body().is_empty());
        assert_eq!(program.span(), Span::new(1, 1, 0));
    }
}
