//! Declaration AST nodes: functions, classes, and module import/export
//! declarations.

use crate::ast::expr::Expr;
use crate::ast::pattern::{Pattern, PropertyKey};
use crate::ast::stmt::Block;
use crate::ast::Ident;
use jsc_core::Span;

/// A function declaration or literal.
///
/// Covers both the statement form (`function f() {}`, which the compiler
/// hoists — source spec §4.1 pre-walk) and the expression form
/// (`const f = function() {}` / `const f = function named() {}`, whose
/// name, if present, is visible only inside the function's own body, used
/// to support self-recursion via the sentinel-register protocol).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionDecl<'ast> {
    pub name: Option<Ident<'ast>>,
    pub params: &'ast [Param<'ast>],
    pub body: Block<'ast>,
    pub is_async: bool,
    pub is_generator: bool,
    pub span: Span,
}

/// A function parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param<'ast> {
    pub pattern: Pattern<'ast>,
    pub default: Option<&'ast Expr<'ast>>,
    /// The rest parameter (`...args`); must be the last parameter.
    pub is_rest: bool,
    /// A TypeScript `this` parameter — type-only, erased before lowering;
    /// never receives a register or appears in the emitted parameter count.
    pub is_this_param: bool,
    pub span: Span,
}

/// A class declaration statement. Desugars to a constructor function plus a
/// prototype object (source spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassDecl<'ast> {
    pub name: Ident<'ast>,
    pub super_class: Option<&'ast Expr<'ast>>,
    pub body: ClassBody<'ast>,
    pub span: Span,
}

/// A class body, shared between [`ClassDecl`] and
/// [`crate::ast::expr::ClassExpr`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassBody<'ast> {
    pub members: &'ast [ClassMember<'ast>],
    pub span: Span,
}

/// A class member: a method (including the constructor and accessors) or a
/// field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClassMember<'ast> {
    Method(MethodMember<'ast>),
    Field(FieldMember<'ast>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodMember<'ast> {
    pub key: PropertyKey<'ast>,
    pub kind: MethodKind,
    pub func: &'ast FunctionDecl<'ast>,
    pub is_static: bool,
    /// `#name` private field/method access, reserved names `__get__name`/
    /// `__set__name` are not used for these — they have their own opcodes
    /// (`GetPrivateField`/`SetPrivateField`).
    pub is_private: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Constructor,
    Method,
    Getter,
    Setter,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldMember<'ast> {
    pub key: PropertyKey<'ast>,
    pub value: Option<&'ast Expr<'ast>>,
    pub is_static: bool,
    pub is_private: bool,
    pub span: Span,
}

/// `import defaultExport, { a, b as c }, * as ns from "module"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportDecl<'ast> {
    pub default: Option<Ident<'ast>>,
    pub named: &'ast [ImportSpecifier<'ast>],
    pub namespace: Option<Ident<'ast>>,
    pub source: &'ast str,
    /// `import("module")`, lowered via the `DynamicImport` opcode rather
    /// than a static module binding; represented as its own statement form
    /// would be redundant with a call expression, so dynamic import is
    /// instead an [`Expr::Call`]-shaped construct the compiler recognizes —
    /// this struct only ever represents a static `import` declaration.
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportSpecifier<'ast> {
    pub imported: Ident<'ast>,
    pub local: Ident<'ast>,
    pub span: Span,
}

/// An export declaration: named, default, wildcard re-export, or wrapping a
/// local declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExportDecl<'ast> {
    /// `export { a, b as c }` or `export { a } from "module"`.
    Named {
        specifiers: &'ast [ExportSpecifier<'ast>],
        source: Option<&'ast str>,
        span: Span,
    },
    /// `export default expr` / `export default function f() {}`.
    Default { value: &'ast Expr<'ast>, span: Span },
    /// `export * from "module"` / `export * as ns from "module"`.
    All {
        exported: Option<Ident<'ast>>,
        source: &'ast str,
        span: Span,
    },
    /// `export function f() {}` / `export class C {}` / `export let x = 1`.
    Declaration {
        decl: &'ast crate::ast::stmt::Stmt<'ast>,
        span: Span,
    },
}

impl<'ast> ExportDecl<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Self::Named { span, .. }
            | Self::Default { span, .. }
            | Self::All { span, .. }
            | Self::Declaration { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportSpecifier<'ast> {
    pub local: Ident<'ast>,
    pub exported: Ident<'ast>,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::stmt::Stmt;
    use bumpalo::Bump;

    #[test]
    fn function_param_this_marker() {
        let param = Param {
            pattern: Pattern::Ident(Ident::new("this", Span::new(1, 1, 4))),
            default: None,
            is_rest: false,
            is_this_param: true,
            span: Span::new(1, 1, 4),
        };
        assert!(param.is_this_param);
    }

    #[test]
    fn method_kinds_distinct() {
        assert_ne!(MethodKind::Getter, MethodKind::Setter);
        assert_eq!(MethodKind::Constructor, MethodKind::Constructor);
    }

    #[test]
    fn export_all_with_namespace_alias() {
        let export = ExportDecl::All {
            exported: Some(Ident::new("utils", Span::new(1, 10, 5))),
            source: "./utils.js",
            span: Span::new(1, 1, 30),
        };
        assert_eq!(export.span(), Span::new(1, 1, 30));
    }

    #[test]
    fn export_declaration_wraps_stmt() {
        let arena = Bump::new();
        let stmt = arena.alloc(Stmt::Block(crate::ast::stmt::Block {
            stmts: &[],
            span: Span::new(1, 8, 2),
        }));
        let export = ExportDecl::Declaration {
            decl: stmt,
            span: Span::new(1, 1, 10),
        };
        assert!(matches!(export, ExportDecl::Declaration { .. }));
    }
}
