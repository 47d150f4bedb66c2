//! Unary and update operator lowering (source spec §4.3 "Unary operators",
//! "Update expressions").

use jsc_ast::{Expr, MemberProperty, UnaryExpr, UnaryOp, UpdateExpr, UpdateOp};
use jsc_core::{CompilationError, TypeChecker};

use crate::bytecode::OpCode;
use crate::context::{Compiler, IdentifierResolution};
use crate::expr::LValue;
use crate::register::Register;
use crate::scope::SymbolLocation;

impl<'a, 'ast, TC> Compiler<'a, &'ast Expr<'ast>, TC>
where
    TC: TypeChecker<&'ast Expr<'ast>>,
{
    pub(super) fn compile_unary(&mut self, unary: &UnaryExpr<'ast>, hint: Register) -> Register {
        self.emitter().set_line(unary.span.line);
        if unary.op == UnaryOp::Delete {
            return self.compile_delete(unary, hint);
        }
        if unary.op == UnaryOp::Typeof {
            // `typeof` tolerates an unresolved bare identifier (no
            // ReferenceError), unlike every other read of that identifier.
            if let Expr::Ident(ident) = unary.operand {
                let value = self.alloc();
                self.compile_ident_read(ident.ident.name, value);
                self.emitter().emit(OpCode::TypeOf);
                self.emitter().emit_byte(hint);
                self.emitter().emit_byte(value);
                self.free(value);
                return hint;
            }
        }
        let value = self.compile_expr_fresh(unary.operand);
        if unary.op == UnaryOp::Void {
            self.free(value);
            self.emitter().emit_load_undefined(hint);
            return hint;
        }
        let op = match unary.op {
            UnaryOp::Plus => OpCode::ToNumber,
            UnaryOp::Negate => OpCode::Neg,
            UnaryOp::LogicalNot => OpCode::Not,
            UnaryOp::BitwiseNot => OpCode::BitNot,
            UnaryOp::Typeof => OpCode::TypeOf,
            UnaryOp::Void | UnaryOp::Delete => unreachable!("handled above"),
        };
        self.emitter().emit(op);
        self.emitter().emit_byte(hint);
        self.emitter().emit_byte(value);
        self.free(value);
        hint
    }

    /// `delete x.y`, `delete x[y]`, `delete x.#p` (unsupported),
    /// `delete x` (unsupported — deleting a binding isn't expressible).
    fn compile_delete(&mut self, unary: &UnaryExpr<'ast>, hint: Register) -> Register {
        match self.classify_lvalue(unary.operand) {
            Some(LValue::Member { object, property, optional: _ }) => match property {
                MemberProperty::Ident(name) => {
                    let obj = self.compile_expr_fresh(object);
                    let name_idx = self.intern_string(name.name);
                    self.emitter().emit(OpCode::DeleteProp);
                    self.emitter().emit_byte(hint);
                    self.emitter().emit_byte(obj);
                    self.emitter().emit_u16(name_idx);
                    self.free(obj);
                    self.emitter().emit_load_bool(hint, true);
                    hint
                }
                MemberProperty::Computed(index_expr) => {
                    let obj = self.compile_expr_fresh(object);
                    let index = self.compile_expr_fresh(index_expr);
                    self.emitter().emit(OpCode::DeleteIndex);
                    self.emitter().emit_byte(hint);
                    self.emitter().emit_byte(obj);
                    self.emitter().emit_byte(index);
                    self.free(obj);
                    self.free(index);
                    hint
                }
            },
            Some(LValue::Ident(ident)) => {
                // `delete globalName` is the one binding shape the engine
                // can actually remove (a global property); anything else
                // (local/outer bindings) has no runtime representation of
                // "unbind".
                match self.resolve(ident.name) {
                    IdentifierResolution::Global(index) | IdentifierResolution::Local(crate::scope::Symbol {
                        location: SymbolLocation::Global(index),
                        ..
                    }) => {
                        self.emitter().emit(OpCode::DeleteGlobal);
                        self.emitter().emit_byte(hint);
                        self.emitter().emit_u16(index);
                        hint
                    }
                    _ => {
                        self.add_error(CompilationError::DeleteUnsupportedOperand { span: unary.span });
                        self.emitter().emit_load_bool(hint, false);
                        hint
                    }
                }
            }
            Some(LValue::Private { .. }) | None => {
                self.add_error(CompilationError::DeleteUnsupportedOperand { span: unary.span });
                self.emitter().emit_load_bool(hint, false);
                hint
            }
        }
    }

    pub(super) fn compile_update(&mut self, update: &UpdateExpr<'ast>, hint: Register) -> Register {
        self.emitter().set_line(update.span.line);
        let Some(lvalue) = self.classify_lvalue(update.operand) else {
            self.emitter().emit_load_undefined(hint);
            return hint;
        };
        let target = self.resolve_lvalue(&lvalue);
        let old = self.alloc();
        self.read_resolved(&target, old);
        let new = self.alloc();
        let op = match update.op {
            UpdateOp::Increment => OpCode::Add,
            UpdateOp::Decrement => OpCode::Sub,
        };
        let one = self.alloc();
        self.emitter().emit_load_number(one, 1.0);
        self.emitter().emit(op);
        self.emitter().emit_byte(new);
        self.emitter().emit_byte(old);
        self.emitter().emit_byte(one);
        self.free(one);
        self.write_resolved(&target, new);
        self.free_resolved(&target);
        let result = if update.is_prefix {
            self.emitter().emit_move(hint, new);
            hint
        } else {
            self.emitter().emit_move(hint, old);
            hint
        };
        self.free(old);
        self.free(new);
        result
    }
}
