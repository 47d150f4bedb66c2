//! Arena-allocated AST node definitions consumed by the compiler core.
//!
//! This crate provides:
//! - Expression, statement, declaration, and pattern node definitions
//!   ([`ast`]), arena-allocated via `bumpalo`.
//! - [`Program`], the root of a parsed module or script.
//!
//! There is no lexer or parser here — nodes are constructed directly, by a
//! parser living outside this workspace or by tests.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use jsc_ast::{Expr, LiteralExpr, LiteralKind};
//! use jsc_core::Span;
//!
//! let arena = Bump::new();
//! let one = arena.alloc(Expr::Literal(LiteralExpr {
//!     kind: LiteralKind::Number(1.0),
//!     span: Span::new(1, 1, 1),
//! }));
//! assert_eq!(one.span(), Span::new(1, 1, 1));
//! ```

pub mod ast;

pub use ast::*;
