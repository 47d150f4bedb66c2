//! `for-of` and `for-in` lowering (source spec §4.2 "Control flow", §4.6
//! "Iteration protocol").
//!
//! `for-in` is unified with `for-of` by first synthesizing an array of the
//! right-hand side's own enumerable keys (via a runtime `Object.keys` call)
//! and then driving the same iterator-stepping loop shape over it.

use jsc_ast::{Expr, ForBinding, ForInStmt, ForOfStmt, Pattern, VarDeclKind};
use jsc_core::TypeChecker;

use crate::bytecode::OpCode;
use crate::context::Compiler;
use crate::emit::{JumpLabel, LoopCleanup};
use crate::register::Register;
use crate::scope::SymbolFlags;

impl<'a, 'ast, TC> Compiler<'a, &'ast Expr<'ast>, TC>
where
    TC: TypeChecker<&'ast Expr<'ast>>,
{
    pub(crate) fn compile_for_of(&mut self, stmt: &'ast ForOfStmt<'ast>, label: Option<String>) {
        self.emitter().set_line(stmt.span.line);
        self.enter_block();
        let source = self.compile_expr_fresh(stmt.right);
        let iter = self.compile_get_iterator(source);
        self.free(source);

        let loop_start = self.emitter().current_offset();
        self.emitter().enter_loop(loop_start, label);
        self.emitter().set_loop_cleanup(LoopCleanup { iterator_reg: Some(iter), binding_reg: None });

        let value = self.alloc();
        let to_end = self.compile_for_iterator_step(iter, value);

        self.enter_block();
        let binding_reg = self.compile_for_binding(&stmt.left, value);
        self.compile_stmt(stmt.body);
        if let Some(reg) = binding_reg {
            self.emitter().emit(OpCode::CloseUpvalue);
            self.emitter().emit_byte(reg);
        }
        self.exit_block();

        self.emitter().emit_jump_back(loop_start);
        self.emitter().patch_jump(to_end);
        self.free(value);
        self.free(iter);
        for b in self.emitter().exit_loop() {
            self.emitter().patch_jump(b);
        }
        self.exit_block();
    }

    pub(crate) fn compile_for_in(&mut self, stmt: &'ast ForInStmt<'ast>, label: Option<String>) {
        self.emitter().set_line(stmt.span.line);
        self.enter_block();
        let source = self.compile_expr_fresh(stmt.right);
        let keys = self.compile_object_keys(source);
        self.free(source);
        let iter = self.compile_get_iterator(keys);
        self.free(keys);

        let loop_start = self.emitter().current_offset();
        self.emitter().enter_loop(loop_start, label);
        self.emitter().set_loop_cleanup(LoopCleanup { iterator_reg: Some(iter), binding_reg: None });

        let value = self.alloc();
        let to_end = self.compile_for_iterator_step(iter, value);

        self.enter_block();
        let binding_reg = self.compile_for_binding(&stmt.left, value);
        self.compile_stmt(stmt.body);
        if let Some(reg) = binding_reg {
            self.emitter().emit(OpCode::CloseUpvalue);
            self.emitter().emit_byte(reg);
        }
        self.exit_block();

        self.emitter().emit_jump_back(loop_start);
        self.emitter().patch_jump(to_end);
        self.free(value);
        self.free(iter);
        for b in self.emitter().exit_loop() {
            self.emitter().patch_jump(b);
        }
        self.exit_block();
    }

    /// One `iter.next()` step for a `for-of`/`for-in` loop body: unlike
    /// [`Compiler::compile_iterator_step`] (used by destructuring, which
    /// needs `undefined` on exhaustion so the surrounding expression stays
    /// well-formed), the loop has nowhere to put an `undefined` — exhaustion
    /// means "stop running the body" — so the done branch returns an
    /// unpatched jump for the caller to route to the loop's own exit instead
    /// of loading a value.
    pub(crate) fn compile_for_iterator_step(&mut self, iter: Register, dest: Register) -> JumpLabel {
        let result = self.call_iterator_next(iter);

        let done_name = self.intern_string("done");
        let done = self.alloc();
        self.emitter().emit(OpCode::GetProp);
        self.emitter().emit_byte(done);
        self.emitter().emit_byte(result);
        self.emitter().emit_u16(done_name);
        let to_not_done = self.emitter().emit_jump(OpCode::JumpIfFalse);
        self.emitter().emit_byte(done);
        self.free(done);

        let to_end = self.emitter().emit_jump(OpCode::Jump);

        self.emitter().patch_jump(to_not_done);
        let value_name = self.intern_string("value");
        self.emitter().emit(OpCode::GetProp);
        self.emitter().emit_byte(dest);
        self.emitter().emit_byte(result);
        self.emitter().emit_u16(value_name);

        self.free(result);
        to_end
    }

    /// Bind a `for-of`/`for-in` loop variable for one iteration. Declaration
    /// forms (`for (const x of ...)`) introduce a fresh per-iteration
    /// binding so closures created in the body each capture their own
    /// iteration's value; a bare pattern (`for (x of ...)`) writes through
    /// the existing binding instead.
    ///
    /// Returns the register to `CloseUpvalue` at the end of the iteration,
    /// when the binding is a terminal identifier declaration (array/object
    /// patterns don't keep a single terminal register, so there's nothing
    /// distinct to close beyond what their children already own).
    pub(crate) fn compile_for_binding(&mut self, left: &ForBinding<'ast>, value: Register) -> Option<Register> {
        match left {
            ForBinding::Decl { kind, pattern } => {
                let flags = if *kind == VarDeclKind::Const { SymbolFlags::IMMUTABLE } else { SymbolFlags::empty() };
                let keep = matches!(pattern, Pattern::Ident(_));
                if *kind == VarDeclKind::Var {
                    self.compile_bind_pattern_in_root(pattern, value, flags);
                } else {
                    self.compile_bind_pattern(pattern, value, flags);
                }
                keep.then_some(value)
            }
            ForBinding::Pattern(pattern) => {
                self.compile_destructure_assign(pattern, value);
                None
            }
        }
    }

    /// Synthesize `Object.keys(source)` for `for-in` — the instruction set
    /// has no dedicated enumerate-keys opcode (source spec §9: "for-in is
    /// not a hot path; unifying it with for-of over a synthesized key array
    /// is acceptable").
    pub(crate) fn compile_object_keys(&mut self, source: Register) -> Register {
        let object_global = self.globals().get_or_insert("Object");
        let object_reg = self.alloc();
        self.emitter().emit_get_global(object_reg, object_global);
        let keys_name = self.intern_string("keys");
        let keys_fn = self.alloc();
        self.emitter().emit(OpCode::GetProp);
        self.emitter().emit_byte(keys_fn);
        self.emitter().emit_byte(object_reg);
        self.emitter().emit_u16(keys_name);

        let args = self.alloc_contiguous(1);
        self.emitter().emit_move(args, source);

        let result = self.alloc();
        self.emitter().emit(OpCode::CallMethod);
        self.emitter().emit_byte(result);
        self.emitter().emit_byte(keys_fn);
        self.emitter().emit_byte(object_reg);
        self.emitter().emit_byte(1);

        self.free(args);
        self.free(keys_fn);
        self.free(object_reg);
        result
    }
}
