//! Member/index access lowering, including optional chaining (source spec
//! §4.3 "Member access", "Optional chaining").

use jsc_ast::{Expr, MemberExpr, MemberProperty};
use jsc_core::{Type, TypeChecker};

use crate::bytecode::OpCode;
use crate::context::Compiler;
use crate::register::Register;

impl<'a, 'ast, TC> Compiler<'a, &'ast Expr<'ast>, TC>
where
    TC: TypeChecker<&'ast Expr<'ast>>,
{
    pub(super) fn compile_member(&mut self, member: &MemberExpr<'ast>, hint: Register) -> Register {
        self.emitter().set_line(member.span.line);

        if matches!(member.object, Expr::Super(_)) {
            return self.compile_super_member(member, hint);
        }

        let obj = self.compile_expr_fresh(member.object);

        // `obj?.prop`: guard the object, short-circuiting the access itself
        // to `undefined` in `hint` (source spec §4.3 "Optional chaining" —
        // each optional link guards only its own access).
        let guard = if member.optional {
            let nullish = self.alloc();
            self.emitter().emit(OpCode::IsNullish);
            self.emitter().emit_byte(nullish);
            self.emitter().emit_byte(obj);
            let to_access = self.emitter().emit_jump(OpCode::JumpIfFalse);
            self.emitter().emit_byte(nullish);
            self.free(nullish);
            self.emitter().emit_load_undefined(hint);
            let to_end = self.emitter().emit_jump(OpCode::Jump);
            self.emitter().patch_jump(to_access);
            Some(to_end)
        } else {
            None
        };

        self.emit_member_read_typed(member.object, member.property, obj, hint);
        self.free(obj);

        if let Some(to_end) = guard {
            self.emitter().patch_jump(to_end);
        }
        hint
    }

    /// Emit the actual property/index read once the object register and any
    /// optional-chaining guard are already handled by the caller. Has no
    /// static type for `obj` to consult, so a plain identifier property
    /// always takes the non-getter `GetProp` path — callers that do have
    /// the object's source expression should go through
    /// [`Self::emit_member_read_typed`] instead to get optimistic getter
    /// dispatch.
    pub(super) fn emit_member_read(&mut self, property: MemberProperty<'ast>, obj: Register, dest: Register) {
        match property {
            MemberProperty::Ident(name) if name.name.starts_with('#') => {
                let name_idx = self.intern_string(name.name);
                self.emitter().emit(OpCode::GetPrivateField);
                self.emitter().emit_byte(dest);
                self.emitter().emit_byte(obj);
                self.emitter().emit_u16(name_idx);
            }
            MemberProperty::Ident(name) if name.name == "length" => {
                self.emitter().emit(OpCode::GetLength);
                self.emitter().emit_byte(dest);
                self.emitter().emit_byte(obj);
            }
            MemberProperty::Ident(name) => {
                let name_idx = self.intern_string(name.name);
                self.emitter().emit(OpCode::GetProp);
                self.emitter().emit_byte(dest);
                self.emitter().emit_byte(obj);
                self.emitter().emit_u16(name_idx);
            }
            MemberProperty::Computed(index_expr) => {
                let index = self.compile_expr_fresh(index_expr);
                self.emitter().emit(OpCode::GetIndex);
                self.emitter().emit_byte(dest);
                self.emitter().emit_byte(obj);
                self.emitter().emit_byte(index);
                self.free(index);
            }
        }
    }

    /// Same as [`Self::emit_member_read`], but checks `object_expr`'s static
    /// type first: a plain-identifier property statically declared as a
    /// getter emits an optimistic getter dispatch instead of a bare
    /// `GetProp` (source spec §4.3 "Member access" step 5).
    pub(super) fn emit_member_read_typed(
        &mut self,
        object_expr: &'ast Expr<'ast>,
        property: MemberProperty<'ast>,
        obj: Register,
        dest: Register,
    ) {
        if let MemberProperty::Ident(name) = property {
            if !name.name.starts_with('#') && name.name != "length" && self.is_declared_getter(object_expr, name.name)
            {
                self.emit_optimistic_getter_read(obj, name.name, dest);
                return;
            }
        }
        self.emit_member_read(property, obj, dest);
    }

    fn is_declared_getter(&self, object_expr: &'ast Expr<'ast>, name: &str) -> bool {
        match self.computed_type(object_expr) {
            Some(Type::Object(object_type)) => object_type.properties.get(name).is_some_and(|p| p.is_getter),
            _ => false,
        }
    }

    /// The runtime may hand back either a plain data property or an
    /// accessor for the same static type (subtype polymorphism), so the
    /// getter call is guarded rather than assumed: look up the method under
    /// its reserved `__get__name` slot, call it if present, otherwise fall
    /// back to a plain property read (source spec §9 "Optimistic getter
    /// dispatch").
    fn emit_optimistic_getter_read(&mut self, obj: Register, name: &str, dest: Register) {
        let getter_idx = self.intern_string(format!("__get__{name}"));
        let getter = self.alloc();
        self.emitter().emit(OpCode::GetProp);
        self.emitter().emit_byte(getter);
        self.emitter().emit_byte(obj);
        self.emitter().emit_u16(getter_idx);

        let is_undef = self.alloc();
        self.emitter().emit(OpCode::IsUndefined);
        self.emitter().emit_byte(is_undef);
        self.emitter().emit_byte(getter);
        let to_call = self.emitter().emit_jump(OpCode::JumpIfFalse);
        self.emitter().emit_byte(is_undef);
        self.free(is_undef);

        let name_idx = self.intern_string(name);
        self.emitter().emit(OpCode::GetProp);
        self.emitter().emit_byte(dest);
        self.emitter().emit_byte(obj);
        self.emitter().emit_u16(name_idx);
        let to_end = self.emitter().emit_jump(OpCode::Jump);

        self.emitter().patch_jump(to_call);
        self.emitter().emit(OpCode::CallMethod);
        self.emitter().emit_byte(dest);
        self.emitter().emit_byte(getter);
        self.emitter().emit_byte(obj);
        self.emitter().emit_byte(0);

        self.emitter().patch_jump(to_end);
        self.free(getter);
    }

    /// `super.prop` / `super[expr]` — dispatches through `GetSuperProp`,
    /// which walks the parent prototype rather than `this`'s own shape
    /// (REDESIGNED: kept as a dedicated opcode instead of being simplified
    /// to `this.prop`).
    pub(super) fn compile_super_member(&mut self, member: &MemberExpr<'ast>, hint: Register) -> Register {
        let this = self.alloc();
        self.emitter().emit(OpCode::GetThis);
        self.emitter().emit_byte(this);
        let name_idx = self.super_prop_name_idx(member.property);
        self.emitter().emit(OpCode::GetSuperProp);
        self.emitter().emit_byte(hint);
        self.emitter().emit_byte(this);
        self.emitter().emit_u16(name_idx);
        self.free(this);
        hint
    }

    /// Intern a super-access property name for `GetSuperProp`, which — like
    /// `GetProp` — only has room for a constant-pool name index. Computed
    /// non-literal keys fall back to an empty-string constant, matching
    /// `intern_property_key`'s best-effort handling.
    pub(crate) fn super_prop_name_idx(&mut self, property: MemberProperty<'ast>) -> u16 {
        match property {
            MemberProperty::Ident(name) => self.intern_string(name.name),
            MemberProperty::Computed(expr) => match expr {
                Expr::Literal(jsc_ast::LiteralExpr { kind: jsc_ast::LiteralKind::String(s), .. }) => {
                    self.intern_string(*s)
                }
                _ => self.intern_string(""),
            },
        }
    }
}
