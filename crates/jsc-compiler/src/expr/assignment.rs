//! Assignment expression lowering and the shared lvalue read/write machinery
//! used by both assignment and update expressions (source spec §4.3
//! "Assignment", "Update expressions": "three lvalue forms").

use jsc_ast::{AssignExpr, AssignTarget, Expr, MemberProperty};
use jsc_core::TypeChecker;

use crate::bytecode::OpCode;
use crate::context::{Compiler, IdentifierResolution};
use crate::expr::LValue;
use crate::register::Register;
use crate::scope::SymbolLocation;

/// A member lvalue's key, resolved once so a compound assignment or update
/// expression reads and writes through the same object/key registers rather
/// than re-evaluating (and re-running the side effects of) the object or
/// computed-key expression twice.
pub(crate) enum MemberKey {
    Name(u16),
    /// `obj.length` — fast-path read only; writes fall back to `SetProp`
    /// since there's no dedicated "set length" opcode.
    Length(u16),
    Index(Register),
}

pub(crate) enum ResolvedLValue<'ast> {
    Ident(&'ast str),
    Member { obj: Register, key: MemberKey },
    Private { obj: Register, name_idx: u16 },
}

impl<'a, 'ast, TC> Compiler<'a, &'ast Expr<'ast>, TC>
where
    TC: TypeChecker<&'ast Expr<'ast>>,
{
    pub(crate) fn resolve_lvalue(&mut self, lvalue: &LValue<'ast>) -> ResolvedLValue<'ast> {
        match *lvalue {
            LValue::Ident(ident) => ResolvedLValue::Ident(ident.name),
            LValue::Member { object, property, .. } => {
                let obj = self.compile_expr_fresh(object);
                let key = match property {
                    MemberProperty::Ident(name) if name.name == "length" => {
                        MemberKey::Length(self.intern_string(name.name))
                    }
                    MemberProperty::Ident(name) => MemberKey::Name(self.intern_string(name.name)),
                    MemberProperty::Computed(expr) => MemberKey::Index(self.compile_expr_fresh(expr)),
                };
                ResolvedLValue::Member { obj, key }
            }
            LValue::Private { object, name } => {
                let obj = self.compile_expr_fresh(object);
                let name_idx = self.intern_string(name);
                ResolvedLValue::Private { obj, name_idx }
            }
        }
    }

    pub(crate) fn read_resolved(&mut self, target: &ResolvedLValue<'ast>, dest: Register) {
        match *target {
            ResolvedLValue::Ident(name) => {
                self.compile_ident_read(name, dest);
            }
            ResolvedLValue::Member { obj, key: MemberKey::Name(name_idx) } => {
                self.emitter().emit(OpCode::GetProp);
                self.emitter().emit_byte(dest);
                self.emitter().emit_byte(obj);
                self.emitter().emit_u16(name_idx);
            }
            ResolvedLValue::Member { obj, key: MemberKey::Length(_) } => {
                self.emitter().emit(OpCode::GetLength);
                self.emitter().emit_byte(dest);
                self.emitter().emit_byte(obj);
            }
            ResolvedLValue::Member { obj, key: MemberKey::Index(index) } => {
                self.emitter().emit(OpCode::GetIndex);
                self.emitter().emit_byte(dest);
                self.emitter().emit_byte(obj);
                self.emitter().emit_byte(index);
            }
            ResolvedLValue::Private { obj, name_idx } => {
                self.emitter().emit(OpCode::GetPrivateField);
                self.emitter().emit_byte(dest);
                self.emitter().emit_byte(obj);
                self.emitter().emit_u16(name_idx);
            }
        }
    }

    pub(crate) fn write_resolved(&mut self, target: &ResolvedLValue<'ast>, value: Register) {
        match *target {
            ResolvedLValue::Ident(name) => self.write_ident(name, value),
            ResolvedLValue::Member { obj, key: MemberKey::Name(name_idx) | MemberKey::Length(name_idx) } => {
                self.emitter().emit(OpCode::SetProp);
                self.emitter().emit_byte(obj);
                self.emitter().emit_u16(name_idx);
                self.emitter().emit_byte(value);
            }
            ResolvedLValue::Member { obj, key: MemberKey::Index(index) } => {
                self.emitter().emit(OpCode::SetIndex);
                self.emitter().emit_byte(obj);
                self.emitter().emit_byte(index);
                self.emitter().emit_byte(value);
            }
            ResolvedLValue::Private { obj, name_idx } => {
                self.emitter().emit(OpCode::SetPrivateField);
                self.emitter().emit_byte(obj);
                self.emitter().emit_u16(name_idx);
                self.emitter().emit_byte(value);
            }
        }
    }

    pub(crate) fn free_resolved(&mut self, target: &ResolvedLValue<'ast>) {
        match *target {
            ResolvedLValue::Ident(_) => {}
            ResolvedLValue::Member { obj, key: MemberKey::Index(index) } => {
                self.free(index);
                self.free(obj);
            }
            ResolvedLValue::Member { obj, .. } | ResolvedLValue::Private { obj, .. } => self.free(obj),
        }
    }

    /// Write `value` into the binding named `name`, per source-spec §4.3's
    /// identifier-resolution location kinds.
    pub(crate) fn write_ident(&mut self, name: &'ast str, value: Register) {
        match self.resolve(name) {
            IdentifierResolution::Local(symbol) => match symbol.location {
                SymbolLocation::Local(reg) => self.emitter().emit_move(reg, value),
                SymbolLocation::Global(index) => self.emitter().emit_set_global(index, value),
                SymbolLocation::Spilled(_) => {}
            },
            IdentifierResolution::Outer(symbol) => match symbol.location {
                SymbolLocation::Local(reg) => {
                    let upvalue_index = self.add_free_symbol(name, true, reg);
                    self.emitter().emit(OpCode::SetUpvalue);
                    self.emitter().emit_byte(upvalue_index);
                    self.emitter().emit_byte(value);
                }
                SymbolLocation::Global(index) => self.emitter().emit_set_global(index, value),
                SymbolLocation::Spilled(_) => {}
            },
            IdentifierResolution::Global(index) => self.emitter().emit_set_global(index, value),
            IdentifierResolution::Unresolved => {
                let index = self.globals().get_or_insert(name);
                self.emitter().emit_set_global(index, value);
            }
        }
    }

    pub(super) fn compile_assign(&mut self, assign: &AssignExpr<'ast>, hint: Register) -> Register {
        self.emitter().set_line(assign.span.line);

        let AssignTarget::Expr(target_expr) = assign.target else {
            let AssignTarget::Pattern(pattern) = assign.target else { unreachable!() };
            let value = self.compile_expr_fresh(assign.value);
            self.compile_destructure_assign(&pattern, value);
            self.emitter().emit_move(hint, value);
            self.free(value);
            return hint;
        };

        let Some(lvalue) = self.classify_lvalue(target_expr) else {
            self.emitter().emit_load_undefined(hint);
            return hint;
        };

        if let Some(binary_op) = assign.op.binary_op() {
            let target = self.resolve_lvalue(&lvalue);
            let lhs = self.alloc();
            self.read_resolved(&target, lhs);
            let rhs = self.compile_expr_fresh(assign.value);
            self.emitter().emit(super::binary::binary_opcode(binary_op));
            self.emitter().emit_byte(hint);
            self.emitter().emit_byte(lhs);
            self.emitter().emit_byte(rhs);
            self.free(lhs);
            self.free(rhs);
            self.write_resolved(&target, hint);
            self.free_resolved(&target);
            return hint;
        }

        if let Some(logical_op) = assign.op.logical_op() {
            return self.compile_logical_assign(&lvalue, logical_op, assign.value, hint);
        }

        // Plain `=`.
        let target = self.resolve_lvalue(&lvalue);
        let value = self.compile_expr(assign.value, hint);
        self.emitter().emit_move(hint, value);
        self.write_resolved(&target, hint);
        self.free_resolved(&target);
        hint
    }

    /// `&&=`/`||=`/`??=`: the right-hand side is only evaluated (and only
    /// written back) when the left-hand side's current value fails the
    /// corresponding short-circuit test.
    fn compile_logical_assign(
        &mut self,
        lvalue: &LValue<'ast>,
        op: jsc_ast::LogicalOp,
        rhs: &'ast Expr<'ast>,
        hint: Register,
    ) -> Register {
        use jsc_ast::LogicalOp;

        let target = self.resolve_lvalue(lvalue);
        self.read_resolved(&target, hint);

        let skip = match op {
            LogicalOp::And => {
                let label = self.emitter().emit_jump(OpCode::JumpIfFalse);
                self.emitter().emit_byte(hint);
                label
            }
            LogicalOp::Or => {
                let truthy = self.alloc();
                self.emitter().emit(OpCode::Not);
                self.emitter().emit_byte(truthy);
                self.emitter().emit_byte(hint);
                let label = self.emitter().emit_jump(OpCode::JumpIfFalse);
                self.emitter().emit_byte(truthy);
                self.free(truthy);
                label
            }
            LogicalOp::NullishCoalescing => {
                let nullish = self.alloc();
                self.emitter().emit(OpCode::IsNullish);
                self.emitter().emit_byte(nullish);
                self.emitter().emit_byte(hint);
                self.emitter().emit(OpCode::Not);
                self.emitter().emit_byte(nullish);
                self.emitter().emit_byte(nullish);
                let label = self.emitter().emit_jump(OpCode::JumpIfFalse);
                self.emitter().emit_byte(nullish);
                self.free(nullish);
                label
            }
        };

        let value = self.compile_expr(rhs, hint);
        self.emitter().emit_move(hint, value);
        self.write_resolved(&target, hint);
        self.emitter().patch_jump(skip);
        self.free_resolved(&target);
        hint
    }
}
