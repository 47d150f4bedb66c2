//! Destructuring pattern AST nodes.
//!
//! A pattern appears wherever a binding is introduced from a value rather
//! than a plain name: `let`/`const`/`var` declarators, function parameters,
//! catch clause parameters, and the loop variable of `for-of`/`for-in`.

use crate::ast::Ident;
use crate::ast::expr::Expr;
use jsc_core::Span;

/// A binding pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pattern<'ast> {
    /// A plain identifier binding.
    Ident(Ident<'ast>),
    /// `[a, , b = 1, ...rest]`
    Array(&'ast ArrayPattern<'ast>),
    /// `{ a, b: c, d = 1, ...rest }`
    Object(&'ast ObjectPattern<'ast>),
    /// A pattern with a default value, used for destructured parameters and
    /// elements/properties not already carrying their own default.
    Assign(&'ast AssignPattern<'ast>),
}

impl<'ast> Pattern<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Self::Ident(i) => i.span,
            Self::Array(p) => p.span,
            Self::Object(p) => p.span,
            Self::Assign(p) => p.span,
        }
    }
}

/// An array destructuring pattern: `[a, , b = 1, ...rest]`.
///
/// `elements` carries one entry per comma-separated slot; a hole (`[a, , b]`)
/// is `None`. The rest element, if present, must be the pattern's last
/// element — a rest element anywhere else is a compile error
/// (`CompilationError::RestElementNotLast`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayPattern<'ast> {
    pub elements: &'ast [Option<Pattern<'ast>>],
    pub rest: Option<Pattern<'ast>>,
    pub span: Span,
}

/// An object destructuring pattern: `{ a, b: c, d = 1, ...rest }`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectPattern<'ast> {
    pub properties: &'ast [ObjectPatternProperty<'ast>],
    pub rest: Option<Pattern<'ast>>,
    pub span: Span,
}

/// A single `key: value` (or shorthand `key`) entry of an object pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectPatternProperty<'ast> {
    pub key: PropertyKey<'ast>,
    pub value: Pattern<'ast>,
    /// `{ a }` as sugar for `{ a: a }`.
    pub shorthand: bool,
    pub span: Span,
}

/// A pattern paired with the default value used when the matched source is
/// `undefined`. Lowered via `JumpIfUndefined` against the source value, not
/// an equality comparison, so an explicit `undefined` argument also takes
/// the default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignPattern<'ast> {
    pub target: Pattern<'ast>,
    pub default: &'ast Expr<'ast>,
    pub span: Span,
}

/// A property key, shared between object literals, object patterns, and
/// member expressions with a non-computed key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyKey<'ast> {
    Ident(Ident<'ast>),
    String(&'ast str, Span),
    Number(f64, Span),
    /// `[expr]: value` — a computed key. Only a string/number *literal*
    /// computed key is supported for `delete`; see
    /// `CompilationError::DeleteUnsupportedOperand`.
    Computed(&'ast Expr<'ast>),
}

impl<'ast> PropertyKey<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Self::Ident(i) => i.span,
            Self::String(_, span) => *span,
            Self::Number(_, span) => *span,
            Self::Computed(e) => e.span(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::expr::{LiteralExpr, LiteralKind};
    use bumpalo::Bump;

    #[test]
    fn array_pattern_with_hole_and_rest() {
        let arena = Bump::new();
        let elements = arena.alloc([
            Some(Pattern::Ident(Ident::new("a", Span::new(1, 2, 1)))),
            None,
            Some(Pattern::Ident(Ident::new("b", Span::new(1, 6, 1)))),
        ]);
        let rest = Pattern::Ident(Ident::new("rest", Span::new(1, 9, 4)));
        let pattern = ArrayPattern {
            elements,
            rest: Some(rest),
            span: Span::new(1, 1, 14),
        };
        assert!(pattern.elements[1].is_none());
        assert!(pattern.rest.is_some());
    }

    #[test]
    fn object_pattern_shorthand_and_renamed() {
        let arena = Bump::new();
        let properties = arena.alloc([
            ObjectPatternProperty {
                key: PropertyKey::Ident(Ident::new("a", Span::new(1, 2, 1))),
                value: Pattern::Ident(Ident::new("a", Span::new(1, 2, 1))),
                shorthand: true,
                span: Span::new(1, 2, 1),
            },
            ObjectPatternProperty {
                key: PropertyKey::Ident(Ident::new("b", Span::new(1, 5, 1))),
                value: Pattern::Ident(Ident::new("c", Span::new(1, 8, 1))),
                shorthand: false,
                span: Span::new(1, 5, 4),
            },
        ]);
        let pattern = ObjectPattern {
            properties,
            rest: None,
            span: Span::new(1, 1, 12),
        };
        assert!(pattern.properties[0].shorthand);
        assert!(!pattern.properties[1].shorthand);
    }

    #[test]
    fn assign_pattern_default() {
        let arena = Bump::new();
        let default = arena.alloc(Expr::Literal(LiteralExpr {
            kind: LiteralKind::Number(1.0),
            span: Span::new(1, 5, 1),
        }));
        let pattern = AssignPattern {
            target: Pattern::Ident(Ident::new("x", Span::new(1, 1, 1))),
            default,
            span: Span::new(1, 1, 5),
        };
        assert_eq!(pattern.span, Span::new(1, 1, 5));
    }
}
