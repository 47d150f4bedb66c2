//! Expression lowering (source spec §4.3).
//!
//! Every case is a method on [`Compiler`] taking `(node, hint)` and returning
//! the register the value ended up in — often `hint`, sometimes not (the
//! hint protocol: callers that need the value in `hint` specifically emit a
//! move themselves). Diagnosable conditions push onto the compiler's error
//! list and the lowering falls back to loading `undefined` into the result
//! register so the rest of the tree can still be walked.

mod assignment;
mod binary;
mod calls;
mod coroutine;
mod identifiers;
mod lambda;
mod literals;
mod member;
mod template;
mod ternary;
mod unary;

use jsc_ast::{Expr, Ident};
use jsc_core::TypeChecker;

use crate::context::Compiler;
use crate::register::Register;

/// The three lvalue shapes an assignment or update expression can target
/// (source spec §4.3 "Update"/"Assignment": "three lvalue forms").
pub(crate) enum LValue<'ast> {
    Ident(Ident<'ast>),
    Member { object: &'ast Expr<'ast>, property: jsc_ast::MemberProperty<'ast>, optional: bool },
    Private { object: &'ast Expr<'ast>, name: &'ast str },
}

impl<'a, 'ast, TC> Compiler<'a, &'ast Expr<'ast>, TC>
where
    TC: TypeChecker<&'ast Expr<'ast>>,
{
    /// The single entry point for expression compilation: dispatches on the
    /// node's variant and routes to the matching lowering function.
    pub fn compile_expr(&mut self, expr: &'ast Expr<'ast>, hint: Register) -> Register {
        match expr {
            Expr::Literal(lit) => self.compile_literal(lit, hint),
            Expr::Ident(ident) => self.compile_ident_expr(&ident, hint),
            Expr::This(_) => self.compile_this(hint),
            Expr::Super(span) => {
                // A bare `super` only makes sense as the callee of `super(...)`
                // or the object of `super.prop`; both are handled by their
                // respective parents before recursing here.
                self.emitter().emit_load_undefined(hint);
                let _ = span;
                hint
            }
            Expr::Array(array) => self.compile_array_literal(array, hint),
            Expr::Object(object) => self.compile_object_literal(object, hint),
            Expr::Unary(unary) => self.compile_unary(unary, hint),
            Expr::Update(update) => self.compile_update(update, hint),
            Expr::Binary(binary) => self.compile_binary(binary, hint),
            Expr::Logical(logical) => self.compile_logical(logical, hint),
            Expr::Assign(assign) => self.compile_assign(assign, hint),
            Expr::Conditional(cond) => self.compile_conditional(cond, hint),
            Expr::Call(call) => self.compile_call(call, hint),
            Expr::New(new_expr) => self.compile_new(new_expr, hint),
            Expr::Member(member) => self.compile_member(member, hint),
            Expr::Function(func) => self.compile_function_expr(func, hint),
            Expr::Arrow(arrow) => self.compile_arrow(arrow, hint),
            Expr::Class(class) => self.compile_class_expr(class, hint),
            Expr::Template(template) => self.compile_template(template, hint),
            Expr::TaggedTemplate(tagged) => self.compile_tagged_template(tagged, hint),
            Expr::Spread(spread) => {
                // A bare spread only has meaning inside an array/object
                // literal or a call's argument list; those contexts lower it
                // directly. Reaching here means it was misused as a plain
                // value — compile the inner expression anyway.
                self.compile_expr(spread.argument, hint)
            }
            Expr::Yield(yield_expr) => self.compile_yield(yield_expr, hint),
            Expr::Await(await_expr) => self.compile_await(await_expr, hint),
        }
    }

    /// Compile an expression into a fresh register, ignoring any hint.
    pub(crate) fn compile_expr_fresh(&mut self, expr: &'ast Expr<'ast>) -> Register {
        let hint = self.alloc();
        let actual = self.compile_expr(expr, hint);
        if actual != hint {
            self.free(hint);
        }
        actual
    }

    /// Compile an expression directly into an already-reserved `target`
    /// register (as opposed to [`Self::compile_expr_fresh`], which allocates
    /// its own). Used to place call arguments into a pre-allocated
    /// contiguous register block.
    pub(crate) fn compile_expr_into(&mut self, expr: &'ast Expr<'ast>, target: Register) {
        let actual = self.compile_expr(expr, target);
        if actual != target {
            self.emitter().emit_move(target, actual);
        }
    }

    pub(crate) fn compile_this(&mut self, hint: Register) -> Register {
        self.emitter().emit(crate::bytecode::OpCode::GetThis);
        self.emitter().emit_byte(hint);
        hint
    }

    /// Resolve the lvalue shape of an assignment/update target expression.
    /// Returns `None` (and records no error itself — callers decide whether
    /// an unsupported shape is diagnosable) for anything that isn't one of
    /// the three supported forms.
    pub(crate) fn classify_lvalue(&self, expr: &'ast Expr<'ast>) -> Option<LValue<'ast>> {
        match expr {
            Expr::Ident(ident) => Some(LValue::Ident(ident.ident)),
            Expr::Member(member) => match member.property {
                jsc_ast::MemberProperty::Ident(name) if name.name.starts_with('#') => {
                    Some(LValue::Private { object: member.object, name: name.name })
                }
                _ => Some(LValue::Member {
                    object: member.object,
                    property: member.property,
                    optional: member.optional,
                }),
            },
            _ => None,
        }
    }
}
