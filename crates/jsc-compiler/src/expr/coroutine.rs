//! `yield`/`yield*`/`await` lowering (source spec §4.5 "Generators and async
//! functions").
//!
//! Neither opcode needs the calling function to be specially shaped — the
//! VM is what actually suspends a generator frame on `Yield` or parks an
//! async frame on `Await`; the compiler's job is just placing the value and
//! destination registers. `yield*` is the one form that expands to real
//! bytecode rather than a single instruction: it drives the delegate's
//! iterator itself, re-yielding each value it produces.

use jsc_ast::{AwaitExpr, Expr, YieldExpr};
use jsc_core::TypeChecker;

use crate::bytecode::OpCode;
use crate::context::Compiler;
use crate::register::Register;

impl<'a, 'ast, TC> Compiler<'a, &'ast Expr<'ast>, TC>
where
    TC: TypeChecker<&'ast Expr<'ast>>,
{
    pub(super) fn compile_yield(&mut self, yield_expr: &YieldExpr<'ast>, hint: Register) -> Register {
        self.emitter().set_line(yield_expr.span.line);

        if yield_expr.delegate {
            let arg = yield_expr.argument.expect("yield* always carries its delegate expression");
            return self.compile_yield_delegate(arg, hint);
        }

        let value = match yield_expr.argument {
            Some(expr) => self.compile_expr_fresh(expr),
            None => {
                let reg = self.alloc();
                self.emitter().emit_load_undefined(reg);
                reg
            }
        };
        self.emitter().emit(OpCode::Yield);
        self.emitter().emit_byte(value);
        self.emitter().emit_byte(hint);
        self.free(value);
        hint
    }

    /// `yield* delegate`: drain the delegate's iterator one step at a time,
    /// re-yielding each produced value and forwarding the value sent back in
    /// (source spec §4.6 "Iteration protocol" applied to generator
    /// delegation). The expression's own value is the delegate's final
    /// `{ done: true, value }`.
    fn compile_yield_delegate(&mut self, delegate: &'ast Expr<'ast>, hint: Register) -> Register {
        let source = self.compile_expr_fresh(delegate);
        let iter = self.compile_get_iterator(source);
        self.free(source);

        let loop_start = self.emitter().current_offset();
        let result = self.call_iterator_next(iter);

        let done_name = self.intern_string("done");
        let done = self.alloc();
        self.emitter().emit(OpCode::GetProp);
        self.emitter().emit_byte(done);
        self.emitter().emit_byte(result);
        self.emitter().emit_u16(done_name);
        let to_step = self.emitter().emit_jump(OpCode::JumpIfFalse);
        self.emitter().emit_byte(done);
        self.free(done);

        // Exhausted: the delegate's final value becomes this expression's
        // own value.
        let value_name = self.intern_string("value");
        self.emitter().emit(OpCode::GetProp);
        self.emitter().emit_byte(hint);
        self.emitter().emit_byte(result);
        self.emitter().emit_u16(value_name);
        self.free(result);
        let to_end = self.emitter().emit_jump(OpCode::Jump);

        self.emitter().patch_jump(to_step);
        let value = self.alloc();
        self.emitter().emit(OpCode::GetProp);
        self.emitter().emit_byte(value);
        self.emitter().emit_byte(result);
        self.emitter().emit_u16(value_name);
        self.free(result);
        let sent = self.alloc();
        self.emitter().emit(OpCode::Yield);
        self.emitter().emit_byte(value);
        self.emitter().emit_byte(sent);
        self.free(sent);
        self.free(value);
        self.emitter().emit_jump_back(loop_start);

        self.emitter().patch_jump(to_end);
        self.free(iter);
        hint
    }

    pub(super) fn compile_await(&mut self, await_expr: &AwaitExpr<'ast>, hint: Register) -> Register {
        self.emitter().set_line(await_expr.span.line);
        let value = self.compile_expr_fresh(await_expr.argument);
        self.emitter().emit(OpCode::Await);
        self.emitter().emit_byte(hint);
        self.emitter().emit_byte(value);
        self.free(value);
        hint
    }
}
