//! Expression AST nodes.
//!
//! Covers every expression form the compiler core lowers: literals,
//! identifiers, `this`/`super`, array/object literals, unary/update/binary/
//! logical/assignment/conditional expressions, member/index/optional-chain
//! access, calls (including `new`, spread, and optional calls), function and
//! class expressions, template literals, and `yield`/`await`.
//!
//! Types are attached to expressions by the external type checker, keyed by
//! node identity (the arena reference itself) rather than stored inline —
//! nodes stay plain data so they can be built directly by tests without a
//! live checker.

use crate::ast::decl::{ClassBody, FunctionDecl};
use crate::ast::pattern::{Pattern, PropertyKey};
use crate::ast::stmt::Block;
use crate::ast::{AssignOp, BinaryOp, Ident, LogicalOp, UnaryOp, UpdateOp};
use jsc_core::Span;

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    Literal(LiteralExpr<'ast>),
    Ident(IdentExpr<'ast>),
    This(Span),
    Super(Span),
    Array(&'ast ArrayExpr<'ast>),
    Object(&'ast ObjectExpr<'ast>),
    Unary(&'ast UnaryExpr<'ast>),
    Update(&'ast UpdateExpr<'ast>),
    Binary(&'ast BinaryExpr<'ast>),
    Logical(&'ast LogicalExpr<'ast>),
    Assign(&'ast AssignExpr<'ast>),
    Conditional(&'ast ConditionalExpr<'ast>),
    Call(&'ast CallExpr<'ast>),
    New(&'ast NewExpr<'ast>),
    Member(&'ast MemberExpr<'ast>),
    Function(&'ast FunctionDecl<'ast>),
    Arrow(&'ast ArrowExpr<'ast>),
    Class(&'ast ClassExpr<'ast>),
    Template(&'ast TemplateExpr<'ast>),
    TaggedTemplate(&'ast TaggedTemplateExpr<'ast>),
    Spread(&'ast SpreadExpr<'ast>),
    Yield(&'ast YieldExpr<'ast>),
    Await(&'ast AwaitExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Ident(e) => e.span,
            Self::This(span) | Self::Super(span) => *span,
            Self::Array(e) => e.span,
            Self::Object(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Update(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Logical(e) => e.span,
            Self::Assign(e) => e.span,
            Self::Conditional(e) => e.span,
            Self::Call(e) => e.span,
            Self::New(e) => e.span,
            Self::Member(e) => e.span,
            Self::Function(e) => e.span,
            Self::Arrow(e) => e.span,
            Self::Class(e) => e.span,
            Self::Template(e) => e.span,
            Self::TaggedTemplate(e) => e.span,
            Self::Spread(e) => e.span,
            Self::Yield(e) => e.span,
            Self::Await(e) => e.span,
        }
    }
}

/// A literal value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralExpr<'ast> {
    pub kind: LiteralKind<'ast>,
    pub span: Span,
}

/// The kind of literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralKind<'ast> {
    Number(f64),
    String(&'ast str),
    Boolean(bool),
    Null,
    Undefined,
    /// A regular expression literal; the pattern and flags are passed
    /// through to the VM's `RegExp` constructor uninterpreted.
    RegExp { pattern: &'ast str, flags: &'ast str },
}

/// An identifier reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdentExpr<'ast> {
    pub ident: Ident<'ast>,
    pub span: Span,
}

/// An array literal: `[a, , ...b]`. Like [`crate::ast::pattern::ArrayPattern`],
/// a comma-separated hole is `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayExpr<'ast> {
    pub elements: &'ast [Option<ArrayElement<'ast>>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArrayElement<'ast> {
    Expr(&'ast Expr<'ast>),
    Spread(&'ast Expr<'ast>),
}

/// An object literal: `{ a, b: 1, [c]: 2, ...d, get e() {}, m() {} }`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectExpr<'ast> {
    pub properties: &'ast [ObjectProperty<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectProperty<'ast> {
    KeyValue {
        key: PropertyKey<'ast>,
        value: &'ast Expr<'ast>,
        shorthand: bool,
        span: Span,
    },
    Method {
        key: PropertyKey<'ast>,
        func: &'ast FunctionDecl<'ast>,
        span: Span,
    },
    Getter {
        key: PropertyKey<'ast>,
        func: &'ast FunctionDecl<'ast>,
        span: Span,
    },
    Setter {
        key: PropertyKey<'ast>,
        func: &'ast FunctionDecl<'ast>,
        span: Span,
    },
    Spread {
        value: &'ast Expr<'ast>,
        span: Span,
    },
}

/// A prefix unary operation: `-x`, `!x`, `typeof x`, `delete x.y`, ...
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    pub op: UnaryOp,
    pub operand: &'ast Expr<'ast>,
    pub span: Span,
}

/// `++x`/`x++`/`--x`/`x--`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateExpr<'ast> {
    pub op: UpdateOp,
    pub operand: &'ast Expr<'ast>,
    pub is_prefix: bool,
    pub span: Span,
}

/// A binary operation with unconditional operand evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    pub left: &'ast Expr<'ast>,
    pub op: BinaryOp,
    pub right: &'ast Expr<'ast>,
    pub span: Span,
}

/// `&&`/`||`/`??`, whose right operand is conditionally evaluated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogicalExpr<'ast> {
    pub left: &'ast Expr<'ast>,
    pub op: LogicalOp,
    pub right: &'ast Expr<'ast>,
    pub span: Span,
}

/// An assignment expression, simple or compound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignExpr<'ast> {
    pub target: AssignTarget<'ast>,
    pub op: AssignOp,
    pub value: &'ast Expr<'ast>,
    pub span: Span,
}

/// The left-hand side of an assignment: a plain expression (identifier or
/// member access) for `=` and compound operators, or a destructuring
/// pattern, which only `=` permits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssignTarget<'ast> {
    Expr(&'ast Expr<'ast>),
    Pattern(Pattern<'ast>),
}

/// A conditional (ternary) expression: `cond ? then : otherwise`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConditionalExpr<'ast> {
    pub condition: &'ast Expr<'ast>,
    pub consequent: &'ast Expr<'ast>,
    pub alternate: &'ast Expr<'ast>,
    pub span: Span,
}

/// A function call: `callee(args)`, `obj.method(args)`, `obj?.(args)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    pub callee: &'ast Expr<'ast>,
    pub args: &'ast [Argument<'ast>],
    /// `obj?.(args)` — short-circuits the whole chain if `obj` is nullish.
    pub optional: bool,
    pub span: Span,
}

/// A call argument; spread arguments are distinguished so the compiler can
/// enforce the single-spread-argument limitation
/// (`CompilationError::MultiArgumentSpreadCall`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Argument<'ast> {
    Expr(&'ast Expr<'ast>),
    Spread(&'ast Expr<'ast>),
}

/// `new callee(args)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewExpr<'ast> {
    pub callee: &'ast Expr<'ast>,
    pub args: &'ast [Argument<'ast>],
    pub span: Span,
}

/// Member/index access: `obj.prop`, `obj[expr]`, `obj?.prop`, `obj?.[expr]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberExpr<'ast> {
    pub object: &'ast Expr<'ast>,
    pub property: MemberProperty<'ast>,
    /// `obj[expr]`/`obj?.[expr]` vs. `obj.prop`/`obj?.prop`.
    pub computed: bool,
    /// `obj?.prop` — short-circuits the whole chain if `obj` is nullish.
    pub optional: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MemberProperty<'ast> {
    Ident(Ident<'ast>),
    Computed(&'ast Expr<'ast>),
}

/// An arrow function: `(a, b) => expr` or `(a, b) => { ... }`.
///
/// Unlike [`FunctionDecl`], arrows never bind their own `this`/`super`/
/// `arguments` — those resolve through the enclosing scope, exactly like any
/// other free variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowExpr<'ast> {
    pub params: &'ast [crate::ast::decl::Param<'ast>],
    pub body: ArrowBody<'ast>,
    pub is_async: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArrowBody<'ast> {
    Expr(&'ast Expr<'ast>),
    Block(Block<'ast>),
}

/// A class expression: `const C = class extends Base { ... }`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassExpr<'ast> {
    pub name: Option<Ident<'ast>>,
    pub super_class: Option<&'ast Expr<'ast>>,
    pub body: ClassBody<'ast>,
    pub span: Span,
}

/// A template literal: `` `a${b}c` ``. `cooked` has one more entry than
/// `expressions` (the parts before, between, and after each substitution).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateExpr<'ast> {
    pub cooked: &'ast [&'ast str],
    pub expressions: &'ast [&'ast Expr<'ast>],
    pub span: Span,
}

/// A tagged template: `` tag`a${b}c` ``, lowered to
/// `tag(cookedStrings, ...substitutions)` where `cookedStrings` also carries
/// a `raw` property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaggedTemplateExpr<'ast> {
    pub tag: &'ast Expr<'ast>,
    pub quasi: &'ast TemplateExpr<'ast>,
    pub raw: &'ast [&'ast str],
    pub span: Span,
}

/// `...expr`, used in array literals and call arguments (see
/// [`ArrayElement::Spread`] / [`Argument::Spread`]); this standalone variant
/// covers spread appearing as a bare expression node, e.g. inside generic
/// AST-walking code shared with those forms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadExpr<'ast> {
    pub argument: &'ast Expr<'ast>,
    pub span: Span,
}

/// `yield expr` / `yield* expr`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YieldExpr<'ast> {
    pub argument: Option<&'ast Expr<'ast>>,
    pub delegate: bool,
    pub span: Span,
}

/// `await expr`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AwaitExpr<'ast> {
    pub argument: &'ast Expr<'ast>,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;

    #[test]
    fn expr_span() {
        let lit = Expr::Literal(LiteralExpr {
            kind: LiteralKind::Number(42.0),
            span: Span::new(1, 1, 2),
        });
        assert_eq!(lit.span(), Span::new(1, 1, 2));
    }

    #[test]
    fn this_and_super_spans() {
        assert_eq!(Expr::This(Span::point(1, 1)).span(), Span::point(1, 1));
        assert_eq!(Expr::Super(Span::point(2, 1)).span(), Span::point(2, 1));
    }

    #[test]
    fn binary_and_logical_are_distinct() {
        let arena = Bump::new();
        let left = arena.alloc(Expr::Literal(LiteralExpr {
            kind: LiteralKind::Number(1.0),
            span: Span::new(1, 1, 1),
        }));
        let right = arena.alloc(Expr::Literal(LiteralExpr {
            kind: LiteralKind::Number(2.0),
            span: Span::new(1, 5, 1),
        }));
        let binary = Expr::Binary(arena.alloc(BinaryExpr {
            left,
            op: BinaryOp::Add,
            right,
            span: Span::new(1, 1, 5),
        }));
        let logical = Expr::Logical(arena.alloc(LogicalExpr {
            left,
            op: LogicalOp::And,
            right,
            span: Span::new(1, 1, 5),
        }));
        assert!(matches!(binary, Expr::Binary(_)));
        assert!(matches!(logical, Expr::Logical(_)));
    }

    #[test]
    fn optional_member_and_call_chain() {
        let arena = Bump::new();
        let object = arena.alloc(Expr::Ident(IdentExpr {
            ident: Ident::new("obj", Span::new(1, 1, 3)),
            span: Span::new(1, 1, 3),
        }));
        let member = arena.alloc(Expr::Member(arena.alloc(MemberExpr {
            object,
            property: MemberProperty::Ident(Ident::new("fn", Span::new(1, 6, 2))),
            computed: false,
            optional: true,
            span: Span::new(1, 1, 7),
        })));
        let call = Expr::Call(arena.alloc(CallExpr {
            callee: member,
            args: &[],
            optional: false,
            span: Span::new(1, 1, 9),
        }));
        match call {
            Expr::Call(c) => match c.callee {
                Expr::Member(m) => assert!(m.optional),
                _ => panic!("expected member callee"),
            },
            _ => panic!("expected call"),
        }
    }

    #[test]
    fn array_literal_holes_and_spread() {
        let arena = Bump::new();
        let elem = arena.alloc(Expr::Literal(LiteralExpr {
            kind: LiteralKind::Number(1.0),
            span: Span::new(1, 2, 1),
        }));
        let rest = arena.alloc(Expr::Ident(IdentExpr {
            ident: Ident::new("rest", Span::new(1, 10, 4)),
            span: Span::new(1, 10, 4),
        }));
        let elements = arena.alloc([
            Some(ArrayElement::Expr(elem)),
            None,
            Some(ArrayElement::Spread(rest)),
        ]);
        let array = ArrayExpr {
            elements,
            span: Span::new(1, 1, 15),
        };
        assert!(array.elements[1].is_none());
        assert!(matches!(array.elements[2], Some(ArrayElement::Spread(_))));
    }

    #[test]
    fn template_parts_outnumber_expressions() {
        let arena = Bump::new();
        let sub = arena.alloc(Expr::Ident(IdentExpr {
            ident: Ident::new("b", Span::new(1, 4, 1)),
            span: Span::new(1, 4, 1),
        }));
        let cooked = arena.alloc(["a", "c"]);
        let expressions = arena.alloc([&*sub]);
        let template = TemplateExpr {
            cooked,
            expressions,
            span: Span::new(1, 1, 8),
        };
        assert_eq!(template.cooked.len(), template.expressions.len() + 1);
    }

    #[test]
    fn yield_delegate_flag() {
        let arena = Bump::new();
        let arg = arena.alloc(Expr::Ident(IdentExpr {
            ident: Ident::new("gen", Span::new(1, 7, 3)),
            span: Span::new(1, 7, 3),
        }));
        let yield_star = YieldExpr {
            argument: Some(arg),
            delegate: true,
            span: Span::new(1, 1, 9),
        };
        assert!(yield_star.delegate);
    }
}
