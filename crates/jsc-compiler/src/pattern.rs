//! Destructuring pattern lowering and the iterator-protocol helpers it
//! shares with spread elements (source spec §4.3 "Destructuring", §4.6
//! "Iteration protocol").
//!
//! Two entry points cover every place a pattern appears:
//! - [`Compiler::compile_bind_pattern`] introduces *new* bindings — used by
//!   `let`/`const`/`var` declarators, function parameters, catch clause
//!   parameters, and `for-of`/`for-in` loop variables.
//! - [`Compiler::compile_destructure_assign`] writes through *existing*
//!   lvalues — used by a bare destructuring assignment expression
//!   (`[a, b] = x`).
//!
//! Both walk the same pattern shapes and share the iterator-draining and
//! object-rest-copy machinery; they differ only in what a leaf identifier
//! does with the value it's handed.

use jsc_ast::{ArrayPattern, Expr, LiteralExpr, LiteralKind, ObjectPattern, Pattern, PropertyKey};
use jsc_core::TypeChecker;

use crate::bytecode::OpCode;
use crate::context::Compiler;
use crate::register::Register;
use crate::scope::{Symbol, SymbolFlags};

/// `true` if binding `pattern` to a register means that register becomes the
/// bound symbol's permanent home (so the caller must not free it); `false`
/// if the pattern only reads through the register (an array/object pattern
/// never keeps its own source register, only the fresh ones it allocates
/// for its children).
pub(crate) fn terminal_ident(pattern: &Pattern) -> bool {
    match pattern {
        Pattern::Ident(_) => true,
        Pattern::Assign(p) => terminal_ident(&p.target),
        Pattern::Array(_) | Pattern::Object(_) => false,
    }
}

impl<'a, 'ast, TC> Compiler<'a, &'ast Expr<'ast>, TC>
where
    TC: TypeChecker<&'ast Expr<'ast>>,
{
    /// Bind `pattern` against the value in `source`, introducing fresh
    /// symbols (source spec §4.3 "Destructuring" binding forms).
    ///
    /// If `pattern`'s terminal leaf is a plain identifier, `source` becomes
    /// that symbol's register and must not be freed or reused by the
    /// caller. Otherwise `source` is only read through and the caller
    /// retains ownership.
    pub(crate) fn compile_bind_pattern(&mut self, pattern: &Pattern<'ast>, source: Register, flags: SymbolFlags) {
        match pattern {
            Pattern::Ident(ident) => {
                self.define(ident.name, Symbol::local(source).with_flags(flags));
            }
            Pattern::Assign(assign) => {
                self.apply_pattern_default(assign.default, source);
                self.compile_bind_pattern(&assign.target, source, flags);
            }
            Pattern::Array(array) => self.compile_bind_array_pattern(array, source, flags),
            Pattern::Object(object) => self.compile_bind_object_pattern(object, source, flags),
        }
    }

    fn compile_bind_array_pattern(&mut self, pattern: &ArrayPattern<'ast>, source: Register, flags: SymbolFlags) {
        self.emit_destructure_guard(source);
        let iter = self.compile_get_iterator(source);
        for element in pattern.elements {
            match element {
                Some(pat) => {
                    let value = self.alloc();
                    self.compile_iterator_step(iter, value);
                    let keep = terminal_ident(pat);
                    self.compile_bind_pattern(pat, value, flags);
                    if !keep {
                        self.free(value);
                    }
                }
                None => {
                    let hole = self.alloc();
                    self.compile_iterator_step(iter, hole);
                    self.free(hole);
                }
            }
        }
        if let Some(rest) = pattern.rest {
            let array_reg = self.alloc();
            self.emitter().emit(OpCode::NewArray);
            self.emitter().emit_byte(array_reg);
            self.emitter().emit_u16(0);
            self.compile_drain_iterator_into_array(iter, array_reg);
            let keep = terminal_ident(&rest);
            self.compile_bind_pattern(&rest, array_reg, flags);
            if !keep {
                self.free(array_reg);
            }
        }
        self.free(iter);
    }

    fn compile_bind_object_pattern(&mut self, pattern: &ObjectPattern<'ast>, source: Register, flags: SymbolFlags) {
        self.emit_destructure_guard(source);
        for prop in pattern.properties {
            let value = self.alloc();
            self.emit_get_prop_by_key(value, source, &prop.key);
            let keep = terminal_ident(&prop.value);
            self.compile_bind_pattern(&prop.value, value, flags);
            if !keep {
                self.free(value);
            }
        }
        if let Some(rest) = pattern.rest {
            let rest_obj = self.alloc();
            self.emitter().emit(OpCode::NewObject);
            self.emitter().emit_byte(rest_obj);
            self.call_object_assign_helper(rest_obj, source);
            let keep = terminal_ident(&rest);
            self.compile_bind_pattern(&rest, rest_obj, flags);
            if !keep {
                self.free(rest_obj);
            }
        }
    }

    /// Like [`Self::compile_bind_pattern`], but every leaf identifier is
    /// defined in the function's root scope rather than the current block —
    /// `var` declarators are function-scoped regardless of how deeply nested
    /// the block they textually appear in is (source spec §4.1 "Variable
    /// declarations").
    pub(crate) fn compile_bind_pattern_in_root(&mut self, pattern: &Pattern<'ast>, source: Register, flags: SymbolFlags) {
        self.compile_bind_pattern_scoped(pattern, source, flags, true);
    }

    fn compile_bind_pattern_scoped(&mut self, pattern: &Pattern<'ast>, source: Register, flags: SymbolFlags, in_root: bool) {
        match pattern {
            Pattern::Ident(ident) => {
                let symbol = Symbol::local(source).with_flags(flags);
                if in_root {
                    self.define_in_root(ident.name, symbol);
                } else {
                    self.define(ident.name, symbol);
                }
            }
            Pattern::Assign(assign) => {
                self.apply_pattern_default(assign.default, source);
                self.compile_bind_pattern_scoped(&assign.target, source, flags, in_root);
            }
            Pattern::Array(array) => {
                self.emit_destructure_guard(source);
                let iter = self.compile_get_iterator(source);
                for element in array.elements {
                    match element {
                        Some(pat) => {
                            let value = self.alloc();
                            self.compile_iterator_step(iter, value);
                            let keep = terminal_ident(pat);
                            self.compile_bind_pattern_scoped(pat, value, flags, in_root);
                            if !keep {
                                self.free(value);
                            }
                        }
                        None => {
                            let hole = self.alloc();
                            self.compile_iterator_step(iter, hole);
                            self.free(hole);
                        }
                    }
                }
                if let Some(rest) = array.rest {
                    let array_reg = self.alloc();
                    self.emitter().emit(OpCode::NewArray);
                    self.emitter().emit_byte(array_reg);
                    self.emitter().emit_u16(0);
                    self.compile_drain_iterator_into_array(iter, array_reg);
                    let keep = terminal_ident(&rest);
                    self.compile_bind_pattern_scoped(&rest, array_reg, flags, in_root);
                    if !keep {
                        self.free(array_reg);
                    }
                }
                self.free(iter);
            }
            Pattern::Object(object) => {
                self.emit_destructure_guard(source);
                for prop in object.properties {
                    let value = self.alloc();
                    self.emit_get_prop_by_key(value, source, &prop.key);
                    let keep = terminal_ident(&prop.value);
                    self.compile_bind_pattern_scoped(&prop.value, value, flags, in_root);
                    if !keep {
                        self.free(value);
                    }
                }
                if let Some(rest) = object.rest {
                    let rest_obj = self.alloc();
                    self.emitter().emit(OpCode::NewObject);
                    self.emitter().emit_byte(rest_obj);
                    self.call_object_assign_helper(rest_obj, source);
                    let keep = terminal_ident(&rest);
                    self.compile_bind_pattern_scoped(&rest, rest_obj, flags, in_root);
                    if !keep {
                        self.free(rest_obj);
                    }
                }
            }
        }
    }

    /// Destructuring-assignment form: write through *existing* lvalues
    /// rather than introducing bindings (source spec §4.3 "Destructuring
    /// assignment").
    pub(crate) fn compile_destructure_assign(&mut self, pattern: &Pattern<'ast>, source: Register) {
        match pattern {
            Pattern::Ident(ident) => self.write_ident(ident.name, source),
            Pattern::Assign(assign) => {
                self.apply_pattern_default(assign.default, source);
                self.compile_destructure_assign(&assign.target, source);
            }
            Pattern::Array(array) => {
                self.emit_destructure_guard(source);
                let iter = self.compile_get_iterator(source);
                for element in array.elements {
                    let value = self.alloc();
                    self.compile_iterator_step(iter, value);
                    if let Some(pat) = element {
                        self.compile_destructure_assign(pat, value);
                    }
                    self.free(value);
                }
                if let Some(rest) = array.rest {
                    let array_reg = self.alloc();
                    self.emitter().emit(OpCode::NewArray);
                    self.emitter().emit_byte(array_reg);
                    self.emitter().emit_u16(0);
                    self.compile_drain_iterator_into_array(iter, array_reg);
                    self.compile_destructure_assign(&rest, array_reg);
                    self.free(array_reg);
                }
                self.free(iter);
            }
            Pattern::Object(object) => {
                self.emit_destructure_guard(source);
                for prop in object.properties {
                    let value = self.alloc();
                    self.emit_get_prop_by_key(value, source, &prop.key);
                    self.compile_destructure_assign(&prop.value, value);
                    self.free(value);
                }
                if let Some(rest) = object.rest {
                    let rest_obj = self.alloc();
                    self.emitter().emit(OpCode::NewObject);
                    self.emitter().emit_byte(rest_obj);
                    self.call_object_assign_helper(rest_obj, source);
                    self.compile_destructure_assign(&rest, rest_obj);
                    self.free(rest_obj);
                }
            }
        }
    }

    /// `pattern = default` leaves: if `source` is `undefined`, overwrite it
    /// in place with the (lazily evaluated) default. Lowers via
    /// `JumpIfUndefined` against the source value directly, not via an
    /// equality comparison, so an explicit `undefined` argument also takes
    /// the default.
    pub(crate) fn apply_pattern_default(&mut self, default: &'ast Expr<'ast>, source: Register) {
        let run_default = self.emitter().emit_jump(OpCode::JumpIfUndefined);
        self.emitter().emit_byte(source);
        let skip_default = self.emitter().emit_jump(OpCode::Jump);
        self.emitter().patch_jump(run_default);
        self.compile_expr(default, source);
        self.emitter().patch_jump(skip_default);
    }

    /// Throws if `source` is `null`/`undefined` before any of a destructuring
    /// pattern's elements are bound (source spec §4.3 "Destructuring" step
    /// 1 — a nullish source throws `TypeError` rather than silently binding
    /// `undefined` to every leaf).
    fn emit_destructure_guard(&mut self, source: Register) {
        self.emitter().emit(OpCode::TypeGuardDestructureSource);
        self.emitter().emit_byte(source);
    }

    fn emit_get_prop_by_key(&mut self, dest: Register, obj: Register, key: &PropertyKey<'ast>) {
        if let PropertyKey::Computed(expr) = key {
            if !matches!(
                expr,
                Expr::Literal(LiteralExpr { kind: LiteralKind::String(_) | LiteralKind::Number(_), .. })
            ) {
                let index = self.compile_expr_fresh(expr);
                self.emitter().emit(OpCode::GetIndex);
                self.emitter().emit_byte(dest);
                self.emitter().emit_byte(obj);
                self.emitter().emit_byte(index);
                self.free(index);
                return;
            }
        }
        let name_idx = self.intern_property_key(key);
        self.emitter().emit(OpCode::GetProp);
        self.emitter().emit_byte(dest);
        self.emitter().emit_byte(obj);
        self.emitter().emit_u16(name_idx);
    }

    // ----------------------------------------------------------------------
    // Iterator protocol (source spec §4.6): `source[Symbol.iterator]()`
    // produces an iterator object; each step calls `.next()` and reads
    // `.done`/`.value` off the result, since this instruction set has no
    // dedicated iterator opcodes beyond the abnormal-exit guard
    // (`TypeGuardIteratorReturn`).
    // ----------------------------------------------------------------------

    /// `source[Symbol.iterator]()`.
    /// Fetch `Symbol.iterator` on `source` and call it (source spec §4.3,
    /// array-destructuring step 2). `Symbol.iterator` itself is read off the
    /// global `Symbol` object rather than interned as a literal property
    /// name, then used as a *computed* index into `source` — matching how a
    /// real well-known symbol is a unique key rather than the string
    /// `"iterator"`.
    pub(crate) fn compile_get_iterator(&mut self, source: Register) -> Register {
        let key = self.compile_symbol_iterator_key();
        let func = self.alloc();
        self.emitter().emit(OpCode::GetIndex);
        self.emitter().emit_byte(func);
        self.emitter().emit_byte(source);
        self.emitter().emit_byte(key);
        self.free(key);
        let dest = self.alloc();
        self.emitter().emit(OpCode::CallMethod);
        self.emitter().emit_byte(dest);
        self.emitter().emit_byte(func);
        self.emitter().emit_byte(source);
        self.emitter().emit_byte(0);
        self.free(func);
        dest
    }

    /// `Symbol.iterator`: a computed property read of `.iterator` off the
    /// global `Symbol` object, yielding the well-known symbol value used to
    /// key an iterable's iterator method.
    fn compile_symbol_iterator_key(&mut self) -> Register {
        let symbol_global = self.globals().get_or_insert("Symbol");
        let symbol = self.alloc();
        self.emitter().emit_get_global(symbol, symbol_global);
        let iterator_name = self.intern_string("iterator");
        let key = self.alloc();
        self.emitter().emit(OpCode::GetProp);
        self.emitter().emit_byte(key);
        self.emitter().emit_byte(symbol);
        self.emitter().emit_u16(iterator_name);
        self.free(symbol);
        key
    }

    /// One `iter.next()` step: writes the yielded value into `dest`, or
    /// `undefined` once the iterator is exhausted.
    pub(crate) fn compile_iterator_step(&mut self, iter: Register, dest: Register) {
        let result = self.call_iterator_next(iter);

        let done_name = self.intern_string("done");
        let done = self.alloc();
        self.emitter().emit(OpCode::GetProp);
        self.emitter().emit_byte(done);
        self.emitter().emit_byte(result);
        self.emitter().emit_u16(done_name);
        let to_value = self.emitter().emit_jump(OpCode::JumpIfFalse);
        self.emitter().emit_byte(done);
        self.free(done);

        self.emitter().emit_load_undefined(dest);
        let to_end = self.emitter().emit_jump(OpCode::Jump);

        self.emitter().patch_jump(to_value);
        let value_name = self.intern_string("value");
        self.emitter().emit(OpCode::GetProp);
        self.emitter().emit_byte(dest);
        self.emitter().emit_byte(result);
        self.emitter().emit_u16(value_name);

        self.emitter().patch_jump(to_end);
        self.free(result);
    }

    /// Drain every remaining value of `iter` into `array` (rest elements,
    /// array spread).
    pub(crate) fn compile_drain_iterator_into_array(&mut self, iter: Register, array: Register) {
        let loop_start = self.emitter().current_offset();
        let result = self.call_iterator_next(iter);

        let done_name = self.intern_string("done");
        let done = self.alloc();
        self.emitter().emit(OpCode::GetProp);
        self.emitter().emit_byte(done);
        self.emitter().emit_byte(result);
        self.emitter().emit_u16(done_name);
        // `JumpIfFalse` only understands "jump when falsy", so the not-done
        // case is the jump target and the done case falls through to the
        // unconditional exit right below.
        let to_value = self.emitter().emit_jump(OpCode::JumpIfFalse);
        self.emitter().emit_byte(done);
        self.free(done);
        let to_end = self.emitter().emit_jump(OpCode::Jump);

        self.emitter().patch_jump(to_value);
        let value_name = self.intern_string("value");
        let value = self.alloc();
        self.emitter().emit(OpCode::GetProp);
        self.emitter().emit_byte(value);
        self.emitter().emit_byte(result);
        self.emitter().emit_u16(value_name);
        self.free(result);
        self.emitter().emit(OpCode::ArrayPush);
        self.emitter().emit_byte(array);
        self.emitter().emit_byte(value);
        self.free(value);

        self.emitter().emit_jump_back(loop_start);
        self.emitter().patch_jump(to_end);
    }

    pub(crate) fn call_iterator_next(&mut self, iter: Register) -> Register {
        let next_name = self.intern_string("next");
        let next_fn = self.alloc();
        self.emitter().emit(OpCode::GetProp);
        self.emitter().emit_byte(next_fn);
        self.emitter().emit_byte(iter);
        self.emitter().emit_u16(next_name);
        let result = self.alloc();
        self.emitter().emit(OpCode::CallMethod);
        self.emitter().emit_byte(result);
        self.emitter().emit_byte(next_fn);
        self.emitter().emit_byte(iter);
        self.emitter().emit_byte(0);
        self.free(next_fn);
        result
    }

    /// Copy every own-enumerable property of `source` onto `target`, used
    /// for object spread (`{ ...a }`) and object-rest destructuring
    /// (`{ a, ...rest }`). No bulk-copy opcode exists, so this calls through
    /// to the runtime's `Object.assign`.
    pub(crate) fn call_object_assign_helper(&mut self, target: Register, source: Register) {
        let object_global = self.globals().get_or_insert("Object");
        let object_reg = self.alloc();
        self.emitter().emit_get_global(object_reg, object_global);
        let assign_name = self.intern_string("assign");
        let assign_fn = self.alloc();
        self.emitter().emit(OpCode::GetProp);
        self.emitter().emit_byte(assign_fn);
        self.emitter().emit_byte(object_reg);
        self.emitter().emit_u16(assign_name);

        let args = self.alloc_contiguous(2);
        self.emitter().emit_move(args, target);
        self.emitter().emit_move(args + 1, source);

        let result = self.alloc();
        self.emitter().emit(OpCode::CallMethod);
        self.emitter().emit_byte(result);
        self.emitter().emit_byte(assign_fn);
        self.emitter().emit_byte(object_reg);
        self.emitter().emit_byte(2);

        self.free(result);
        self.free(args + 1);
        self.free(args);
        self.free(assign_fn);
        self.free(object_reg);
    }
}
