//! Statement AST nodes.
//!
//! Covers every statement form the compiler core lowers: blocks,
//! declarations (`let`/`const`/`var`, function, class), control flow
//! (`if`, `while`, `do-while`, `for`, `for-of`, `for-in`, `switch`),
//! jumps (`break`/`continue` with optional label, `return`, `throw`),
//! `try`/`catch`/`finally`, labeled statements, and module declarations.

use crate::ast::decl::{ClassDecl, ExportDecl, FunctionDecl, ImportDecl};
use crate::ast::expr::Expr;
use crate::ast::pattern::Pattern;
use crate::ast::Ident;
use jsc_core::Span;

/// A statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    Expr(ExprStmt<'ast>),
    VarDecl(VarDeclStmt<'ast>),
    Function(&'ast FunctionDecl<'ast>),
    Class(&'ast ClassDecl<'ast>),
    Return(ReturnStmt<'ast>),
    Break(BreakStmt<'ast>),
    Continue(ContinueStmt<'ast>),
    Throw(ThrowStmt<'ast>),
    Block(Block<'ast>),
    If(&'ast IfStmt<'ast>),
    While(&'ast WhileStmt<'ast>),
    DoWhile(&'ast DoWhileStmt<'ast>),
    For(&'ast ForStmt<'ast>),
    ForOf(&'ast ForOfStmt<'ast>),
    ForIn(&'ast ForInStmt<'ast>),
    Switch(&'ast SwitchStmt<'ast>),
    Try(&'ast TryStmt<'ast>),
    Labeled(&'ast LabeledStmt<'ast>),
    Import(&'ast ImportDecl<'ast>),
    Export(&'ast ExportDecl<'ast>),
}

impl<'ast> Stmt<'ast> {
    /// Get the span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Self::Expr(s) => s.span,
            Self::VarDecl(s) => s.span,
            Self::Function(s) => s.span,
            Self::Class(s) => s.span,
            Self::Return(s) => s.span,
            Self::Break(s) => s.span,
            Self::Continue(s) => s.span,
            Self::Throw(s) => s.span,
            Self::Block(s) => s.span,
            Self::If(s) => s.span,
            Self::While(s) => s.span,
            Self::DoWhile(s) => s.span,
            Self::For(s) => s.span,
            Self::ForOf(s) => s.span,
            Self::ForIn(s) => s.span,
            Self::Switch(s) => s.span,
            Self::Try(s) => s.span,
            Self::Labeled(s) => s.span,
            Self::Import(s) => s.span,
            Self::Export(s) => s.span(),
        }
    }
}

/// An expression statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExprStmt<'ast> {
    pub expr: &'ast Expr<'ast>,
    pub span: Span,
}

/// `let`/`const`/`var` declaration kind. `const` declarations carry
/// `is_immutable`/`is_const` flags on the resulting symbol; `let`/`const`
/// additionally start in the temporal dead zone until their declarator runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarDeclKind {
    Let,
    Const,
    Var,
}

/// A `let`/`const`/`var` declaration statement.
///
/// Examples:
/// - `let x;`
/// - `const [x, , ...rest] = a;`
/// - `var x = 1, y = 2;`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDeclStmt<'ast> {
    pub kind: VarDeclKind,
    pub declarators: &'ast [VarDeclarator<'ast>],
    pub span: Span,
}

/// A single declarator within a `let`/`const`/`var` statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDeclarator<'ast> {
    pub id: Pattern<'ast>,
    pub init: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

/// `return;` / `return expr;`. The completion value placed in the `V`
/// register when control exits a `try`/`finally` is computed separately
/// from this node (source spec §4.5, `ReturnFinally`/`HandlePending`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStmt<'ast> {
    pub value: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

/// `break;` / `break label;`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakStmt<'ast> {
    pub label: Option<Ident<'ast>>,
    pub span: Span,
}

/// `continue;` / `continue label;`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContinueStmt<'ast> {
    pub label: Option<Ident<'ast>>,
    pub span: Span,
}

/// `throw expr;`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrowStmt<'ast> {
    pub argument: &'ast Expr<'ast>,
    pub span: Span,
}

/// A block of statements, introducing its own lexical scope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block<'ast> {
    pub stmts: &'ast [Stmt<'ast>],
    pub span: Span,
}

/// `if (condition) then_stmt else else_stmt`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfStmt<'ast> {
    pub condition: &'ast Expr<'ast>,
    pub then_stmt: &'ast Stmt<'ast>,
    pub else_stmt: Option<&'ast Stmt<'ast>>,
    pub span: Span,
}

/// `while (condition) body`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhileStmt<'ast> {
    pub condition: &'ast Expr<'ast>,
    pub body: &'ast Stmt<'ast>,
    pub span: Span,
}

/// `do body while (condition);`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoWhileStmt<'ast> {
    pub body: &'ast Stmt<'ast>,
    pub condition: &'ast Expr<'ast>,
    pub span: Span,
}

/// `for (init; condition; update) body`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForStmt<'ast> {
    pub init: Option<ForInit<'ast>>,
    pub condition: Option<&'ast Expr<'ast>>,
    pub update: Option<&'ast Expr<'ast>>,
    pub body: &'ast Stmt<'ast>,
    pub span: Span,
}

/// The initializer clause of a `for` loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ForInit<'ast> {
    VarDecl(VarDeclStmt<'ast>),
    Expr(&'ast Expr<'ast>),
}

/// `for (left of right) body` / `for await (left of right) body`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForOfStmt<'ast> {
    pub left: ForBinding<'ast>,
    pub right: &'ast Expr<'ast>,
    pub body: &'ast Stmt<'ast>,
    pub is_await: bool,
    pub span: Span,
}

/// `for (left in right) body`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForInStmt<'ast> {
    pub left: ForBinding<'ast>,
    pub right: &'ast Expr<'ast>,
    pub body: &'ast Stmt<'ast>,
    pub span: Span,
}

/// The binding on the left of `for-of`/`for-in`: either a fresh
/// declaration (`for (const x of ...)`) or an existing assignment target
/// (`for (x of ...)`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ForBinding<'ast> {
    Decl { kind: VarDeclKind, pattern: Pattern<'ast> },
    Pattern(Pattern<'ast>),
}

/// `switch (expr) { cases }`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchStmt<'ast> {
    pub discriminant: &'ast Expr<'ast>,
    pub cases: &'ast [SwitchCase<'ast>],
    pub span: Span,
}

/// A `case`/`default` clause of a `switch`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchCase<'ast> {
    /// `None` for `default:`.
    pub test: Option<&'ast Expr<'ast>>,
    pub stmts: &'ast [Stmt<'ast>],
    pub span: Span,
}

impl<'ast> SwitchCase<'ast> {
    pub fn is_default(&self) -> bool {
        self.test.is_none()
    }
}

/// `try block catch (param) catch_block finally finally_block`.
///
/// Both `catch` and `finally` are optional individually, but at least one
/// must be present. `catch_param` is itself optional (`catch { ... }`
/// without a bound parameter).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TryStmt<'ast> {
    pub try_block: Block<'ast>,
    pub catch_param: Option<Pattern<'ast>>,
    pub catch_block: Option<Block<'ast>>,
    pub finally_block: Option<Block<'ast>>,
    pub span: Span,
}

/// `label: stmt`, establishing a break/continue target by name (source
/// spec §3 Loop Context, `label`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledStmt<'ast> {
    pub label: Ident<'ast>,
    pub body: &'ast Stmt<'ast>,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::expr::{IdentExpr, LiteralExpr, LiteralKind};
    use bumpalo::Bump;

    #[test]
    fn stmt_span() {
        let stmt = Stmt::Break(BreakStmt {
            label: None,
            span: Span::new(1, 1, 6),
        });
        assert_eq!(stmt.span(), Span::new(1, 1, 6));
    }

    #[test]
    fn break_and_continue_carry_labels() {
        let label = Ident::new("outer", Span::new(1, 7, 5));
        let brk = BreakStmt {
            label: Some(label),
            span: Span::new(1, 1, 12),
        };
        assert_eq!(brk.label.unwrap().name, "outer");
    }

    #[test]
    fn switch_case_default() {
        let default_case = SwitchCase {
            test: None,
            stmts: &[],
            span: Span::new(1, 1, 1),
        };
        assert!(default_case.is_default());
    }

    #[test]
    fn try_stmt_with_finally_and_no_catch_param() {
        let try_stmt = TryStmt {
            try_block: Block { stmts: &[], span: Span::new(1, 5, 2) },
            catch_param: None,
            catch_block: Some(Block { stmts: &[], span: Span::new(1, 15, 2) }),
            finally_block: Some(Block { stmts: &[], span: Span::new(1, 25, 2) }),
            span: Span::new(1, 1, 30),
        };
        assert!(try_stmt.catch_param.is_none());
        assert!(try_stmt.finally_block.is_some());
    }

    #[test]
    fn for_of_binding_variants() {
        let arena = Bump::new();
        let decl_binding = ForBinding::Decl {
            kind: VarDeclKind::Const,
            pattern: Pattern::Ident(Ident::new("x", Span::new(1, 11, 1))),
        };
        assert!(matches!(decl_binding, ForBinding::Decl { .. }));

        let existing = arena.alloc(Expr::Ident(IdentExpr {
            ident: Ident::new("iterable", Span::new(1, 15, 8)),
            span: Span::new(1, 15, 8),
        }));
        let for_of = ForOfStmt {
            left: decl_binding,
            right: existing,
            body: arena.alloc(Stmt::Block(Block { stmts: &[], span: Span::new(1, 25, 2) })),
            is_await: true,
            span: Span::new(1, 1, 27),
        };
        assert!(for_of.is_await);
    }

    #[test]
    fn labeled_statement_wraps_loop() {
        let arena = Bump::new();
        let condition = arena.alloc(Expr::Literal(LiteralExpr {
            kind: LiteralKind::Boolean(true),
            span: Span::new(2, 8, 4),
        }));
        let body = arena.alloc(Stmt::Block(Block { stmts: &[], span: Span::new(2, 13, 2) }));
        let while_stmt = arena.alloc(Stmt::While(arena.alloc(WhileStmt {
            condition,
            body,
            span: Span::new(2, 1, 15),
        })));
        let labeled = LabeledStmt {
            label: Ident::new("outer", Span::new(1, 1, 5)),
            body: while_stmt,
            span: Span::new(1, 1, 15),
        };
        assert!(matches!(labeled.body, Stmt::While(_)));
    }
}
