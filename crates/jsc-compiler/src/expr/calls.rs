//! Call and `new` expression lowering (source spec §4.3 "Calls",
//! "Construction", "Optional chaining", "Spread arguments", `super(...)`).
//!
//! Plain and method calls place their arguments in one contiguous register
//! block (`alloc_contiguous`) so `Call`/`CallMethod`/`New` can encode just an
//! argument count rather than a register per argument. A call with a spread
//! argument instead builds a single combined argument array and goes through
//! the `Spread*` opcode family, which is fully explicit and needs no
//! contiguity.

use jsc_core::{CompilationError, Span, Type, TypeChecker, TypeHash};
use jsc_ast::{Argument, CallExpr, Expr, MemberExpr, NewExpr};

use crate::bytecode::OpCode;
use crate::context::Compiler;
use crate::register::Register;

impl<'a, 'ast, TC> Compiler<'a, &'ast Expr<'ast>, TC>
where
    TC: TypeChecker<&'ast Expr<'ast>>,
{
    pub(super) fn compile_call(&mut self, call: &CallExpr<'ast>, hint: Register) -> Register {
        self.emitter().set_line(call.span.line);

        if matches!(call.callee, Expr::Super(_)) {
            return self.compile_super_call(call.args, call.span, hint);
        }

        if let Expr::Member(member) = call.callee {
            return self.compile_method_call(call.callee, member, call.args, call.optional, hint);
        }

        let func = self.compile_expr_fresh(call.callee);
        let guard = if call.optional {
            Some(self.emit_nullish_guard(func, hint))
        } else {
            None
        };

        let is_generator = self.is_generator_call(call.callee);
        self.emit_call_plain(func, call.callee, call.args, hint, is_generator);
        self.free(func);

        if let Some(to_end) = guard {
            self.emitter().patch_jump(to_end);
        }
        hint
    }

    pub(super) fn compile_new(&mut self, new_expr: &NewExpr<'ast>, hint: Register) -> Register {
        self.emitter().set_line(new_expr.span.line);

        let func = self.compile_expr_fresh(new_expr.callee);

        if new_expr.args.iter().any(|a| matches!(a, Argument::Spread(_))) {
            self.check_multi_spread(new_expr.args);
            let array_reg = self.compile_call_args_array(new_expr.args);
            self.emitter().emit(OpCode::SpreadNew);
            self.emitter().emit_byte(hint);
            self.emitter().emit_byte(func);
            self.emitter().emit_byte(array_reg);
            self.free(array_reg);
            self.free(func);
            return hint;
        }

        let argc = new_expr.args.len();
        let block = self.alloc_contiguous(1 + argc);
        self.emitter().emit_move(block, func);
        self.free(func);
        for (i, arg) in new_expr.args.iter().enumerate() {
            let Argument::Expr(expr) = arg else { unreachable!("spread handled above") };
            self.compile_expr_into(expr, block + 1 + i as u8);
        }
        self.emitter().emit(OpCode::New);
        self.emitter().emit_byte(hint);
        self.emitter().emit_byte(block);
        self.emitter().emit_byte(argc as u8);
        for i in (0..=argc as u8).rev() {
            self.free(block + i);
        }
        hint
    }

    /// `super(...)` — there's no dedicated opcode for it; it's synthesized
    /// as fetching `this`'s own superclass constructor off `this` via
    /// `GetSuperProp` and invoking it bound to `this`.
    fn compile_super_call(&mut self, args: &'ast [Argument<'ast>], span: Span, hint: Register) -> Register {
        if !self.in_derived_constructor() {
            self.add_error(CompilationError::SuperOutsideDerivedConstructor { span });
            self.emitter().emit_load_undefined(hint);
            return hint;
        }

        let this = self.alloc();
        self.emitter().emit(OpCode::GetThis);
        self.emitter().emit_byte(this);
        let name_idx = self.intern_string("constructor");
        let func = self.alloc();
        self.emitter().emit(OpCode::GetSuperProp);
        self.emitter().emit_byte(func);
        self.emitter().emit_byte(this);
        self.emitter().emit_u16(name_idx);

        self.emit_call_with_receiver(func, this, None, args, hint);

        self.free(func);
        self.free(this);
        hint
    }

    /// `obj.method(args)` / `obj?.method(args)` / `obj.method?.(args)` /
    /// `super.method(args)`.
    fn compile_method_call(
        &mut self,
        callee: &'ast Expr<'ast>,
        member: &MemberExpr<'ast>,
        args: &'ast [Argument<'ast>],
        call_optional: bool,
        hint: Register,
    ) -> Register {
        if matches!(member.object, Expr::Super(_)) {
            return self.compile_super_method_call(member, args, hint);
        }

        let obj = self.compile_expr_fresh(member.object);
        let member_guard = if member.optional { Some(self.emit_nullish_guard(obj, hint)) } else { None };

        let func = self.alloc();
        self.emit_member_read_typed(member.object, member.property, obj, func);

        let call_guard = if call_optional { Some(self.emit_nullish_guard(func, hint)) } else { None };

        self.emit_call_with_receiver(func, obj, Some(callee), args, hint);

        if let Some(to_end) = call_guard {
            self.emitter().patch_jump(to_end);
        }
        self.free(func);
        self.free(obj);
        if let Some(to_end) = member_guard {
            self.emitter().patch_jump(to_end);
        }
        hint
    }

    fn compile_super_method_call(
        &mut self,
        member: &MemberExpr<'ast>,
        args: &'ast [Argument<'ast>],
        hint: Register,
    ) -> Register {
        let this = self.alloc();
        self.emitter().emit(OpCode::GetThis);
        self.emitter().emit_byte(this);
        let name_idx = self.super_prop_name_idx(member.property);
        let func = self.alloc();
        self.emitter().emit(OpCode::GetSuperProp);
        self.emitter().emit_byte(func);
        self.emitter().emit_byte(this);
        self.emitter().emit_u16(name_idx);

        self.emit_call_with_receiver(func, this, None, args, hint);

        self.free(func);
        self.free(this);
        hint
    }

    /// `obj?.prop`/`obj.method?.(...)`-style short circuit: if `guarded` is
    /// nullish, load `undefined` into `hint` and jump past the rest of the
    /// caller's emission; otherwise fall through. Returns the jump to patch
    /// at the end of the whole chain.
    fn emit_nullish_guard(&mut self, guarded: Register, hint: Register) -> crate::emit::JumpLabel {
        let nullish = self.alloc();
        self.emitter().emit(OpCode::IsNullish);
        self.emitter().emit_byte(nullish);
        self.emitter().emit_byte(guarded);
        let to_access = self.emitter().emit_jump(OpCode::JumpIfFalse);
        self.emitter().emit_byte(nullish);
        self.free(nullish);
        self.emitter().emit_load_undefined(hint);
        let to_end = self.emitter().emit_jump(OpCode::Jump);
        self.emitter().patch_jump(to_access);
        to_end
    }

    /// `func(args)` with no receiver — either a single contiguous
    /// `[func, args...]` block passed to `Call`/`CreateGenerator`, or a
    /// combined argument array passed to `SpreadCall` when any argument is
    /// spread.
    fn emit_call_plain(
        &mut self,
        func: Register,
        callee: &'ast Expr<'ast>,
        args: &'ast [Argument<'ast>],
        hint: Register,
        is_generator: bool,
    ) {
        if args.iter().any(|a| matches!(a, Argument::Spread(_))) {
            self.check_multi_spread(args);
            let array_reg = self.compile_call_args_array(args);
            self.emitter().emit(OpCode::SpreadCall);
            self.emitter().emit_byte(hint);
            self.emitter().emit_byte(func);
            self.emitter().emit_byte(array_reg);
            self.free(array_reg);
            return;
        }

        let argc = args.len();
        let padded_argc = self.padded_argc(callee, argc);
        let block = self.alloc_contiguous(1 + padded_argc);
        self.emitter().emit_move(block, func);
        for (i, arg) in args.iter().enumerate() {
            let Argument::Expr(expr) = arg else { unreachable!("spread handled above") };
            self.compile_expr_into(expr, block + 1 + i as u8);
        }
        for i in argc..padded_argc {
            self.emitter().emit_load_undefined(block + 1 + i as u8);
        }
        self.emitter().emit(if is_generator { OpCode::CreateGenerator } else { OpCode::Call });
        self.emitter().emit_byte(hint);
        self.emitter().emit_byte(block);
        self.emitter().emit_byte(padded_argc as u8);
        for i in (0..=padded_argc as u8).rev() {
            self.free(block + i);
        }
    }

    /// `func.call(this, args)` shape shared by plain method calls,
    /// `super(...)`, and `super.method(...)` — a contiguous
    /// `[func, this, args...]` block passed to `CallMethod`, or a combined
    /// argument array passed to `SpreadCallMethod`. `callee` is the call
    /// expression's own callee node (used to look up the selected call
    /// signature for optional-parameter padding); `super(...)` and
    /// `super.method(...)` have none, since superclass signatures are
    /// resolved through `superclass_arity` instead.
    fn emit_call_with_receiver(
        &mut self,
        func: Register,
        this: Register,
        callee: Option<&'ast Expr<'ast>>,
        args: &'ast [Argument<'ast>],
        hint: Register,
    ) {
        if args.iter().any(|a| matches!(a, Argument::Spread(_))) {
            self.check_multi_spread(args);
            let array_reg = self.compile_call_args_array(args);
            self.emitter().emit(OpCode::SpreadCallMethod);
            self.emitter().emit_byte(hint);
            self.emitter().emit_byte(func);
            self.emitter().emit_byte(this);
            self.emitter().emit_byte(array_reg);
            self.free(array_reg);
            return;
        }

        let argc = args.len();
        let padded_argc = callee.map_or(argc, |callee| self.padded_argc(callee, argc));
        let block = self.alloc_contiguous(2 + padded_argc);
        self.emitter().emit_move(block, func);
        self.emitter().emit_move(block + 1, this);
        for (i, arg) in args.iter().enumerate() {
            let Argument::Expr(expr) = arg else { unreachable!("spread handled above") };
            self.compile_expr_into(expr, block + 2 + i as u8);
        }
        for i in argc..padded_argc {
            self.emitter().emit_load_undefined(block + 2 + i as u8);
        }
        self.emitter().emit(OpCode::CallMethod);
        self.emitter().emit_byte(hint);
        self.emitter().emit_byte(block);
        self.emitter().emit_byte(block + 1);
        self.emitter().emit_byte(padded_argc as u8);
        for i in (0..=1 + padded_argc as u8).rev() {
            self.free(block + i);
        }
    }

    /// Picks the callee's call signature best matching `actual_argc` (the
    /// signature with the fewest total parameters that is still at least
    /// `actual_argc`, and whose required — non-optional — parameter count is
    /// at or below `actual_argc`) and returns how many argument slots the
    /// call site should actually allocate: `actual_argc` if no signature
    /// needs padding, or the signature's full parameter count if the
    /// missing trailing parameters are all optional (source spec §4.3,
    /// "Optional parameter padding").
    fn padded_argc(&self, callee: &'ast Expr<'ast>, actual_argc: usize) -> usize {
        let Some(Type::Object(object)) = self.computed_type(callee) else {
            return actual_argc;
        };
        object
            .call_signatures
            .iter()
            .filter(|sig| {
                let optional_count = sig.optional_params.count_ones() as usize;
                let required = sig.params.len().saturating_sub(optional_count);
                required <= actual_argc && sig.params.len() >= actual_argc
            })
            .map(|sig| sig.params.len())
            .min()
            .unwrap_or(actual_argc)
    }

    /// Build one combined argument array in source order, draining each
    /// spread source into it — mirrors `compile_array_literal`'s handling of
    /// array-literal spread elements.
    fn compile_call_args_array(&mut self, args: &'ast [Argument<'ast>]) -> Register {
        let array_reg = self.alloc();
        self.emitter().emit(OpCode::NewArray);
        self.emitter().emit_byte(array_reg);
        self.emitter().emit_u16(args.len() as u16);
        for arg in args {
            match arg {
                Argument::Expr(expr) => {
                    let value = self.compile_expr_fresh(expr);
                    self.emitter().emit(OpCode::ArrayPush);
                    self.emitter().emit_byte(array_reg);
                    self.emitter().emit_byte(value);
                    self.free(value);
                }
                Argument::Spread(expr) => {
                    let source = self.compile_expr_fresh(expr);
                    let iter = self.compile_get_iterator(source);
                    self.free(source);
                    self.compile_drain_iterator_into_array(iter, array_reg);
                    self.free(iter);
                }
            }
        }
        array_reg
    }

    /// More than one spread argument in a single call is a diagnosable
    /// condition, not a hard stop — compilation still proceeds and honors
    /// every spread, in source order.
    fn check_multi_spread(&mut self, args: &'ast [Argument<'ast>]) {
        let spreads: Vec<Span> = args
            .iter()
            .filter_map(|a| match a {
                Argument::Spread(expr) => Some(expr.span()),
                Argument::Expr(_) => None,
            })
            .collect();
        if spreads.len() > 1 {
            self.add_error(CompilationError::MultiArgumentSpreadCall { span: spreads[1] });
        }
    }

    /// A plain call's callee is a generator/async-generator factory when its
    /// computed type is callable and its first call signature returns
    /// `Generator<...>`/`AsyncGenerator<...>` — such a call constructs a
    /// generator object instead of invoking the body directly. Only plain
    /// calls get this treatment; there's no `CreateGeneratorMethod` opcode.
    fn is_generator_call(&self, callee: &'ast Expr<'ast>) -> bool {
        let Some(Type::Object(object)) = self.computed_type(callee) else {
            return false;
        };
        let Some(signature) = object.call_signatures.first() else {
            return false;
        };
        match signature.return_type.as_ref() {
            Type::InstantiatedGeneric { name_hash, .. } => {
                *name_hash == TypeHash::from_name("Generator") || *name_hash == TypeHash::from_name("AsyncGenerator")
            }
            _ => false,
        }
    }
}
