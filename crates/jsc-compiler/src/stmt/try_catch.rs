//! `try`/`catch`/`finally` lowering (source spec §4.2 "Control flow",
//! exception handling).
//!
//! The VM resolves thrown exceptions against a chunk-level exception table
//! (`ExceptionHandlerEntry`) rather than any jump instruction, so compiling
//! `try` is mostly bookkeeping: record the byte range the try block (plus,
//! if present, its catch handler) protects, and where control should resume
//! if something inside it throws.
//!
//! A `finally` block runs on every path out of the protected region —
//! normal completion, a caught exception, an uncaught exception, and an
//! early `return`/`break`/`continue` — so it gets its own table entry
//! spanning the same protected range, with `HandlePending` replaying
//! whatever pending completion (value, exception, or jump) the runtime
//! parked before entering it. `return` inside a `finally`-guarded region
//! uses `ReturnFinally` rather than `Return` so the runtime knows to route
//! through that pending-completion machinery instead of unwinding directly.
use jsc_ast::{Expr, TryStmt};
use jsc_core::TypeChecker;

use crate::bytecode::{ExceptionHandlerEntry, OpCode};
use crate::context::Compiler;
use crate::scope::SymbolFlags;

impl<'a, 'ast, TC> Compiler<'a, &'ast Expr<'ast>, TC>
where
    TC: TypeChecker<&'ast Expr<'ast>>,
{
    pub(crate) fn compile_try(&mut self, stmt: &'ast TryStmt<'ast>) {
        self.emitter().set_line(stmt.span.line);
        let has_finally = stmt.finally_block.is_some();
        let pending_reg = has_finally.then(|| self.alloc());
        if has_finally {
            self.emitter().enter_finally();
        }

        let try_start = self.emitter().current_offset();
        self.compile_block(&stmt.try_block);
        let try_end = self.emitter().current_offset();

        if let Some(catch_block) = stmt.catch_block {
            let skip_catch = self.emitter().emit_jump(OpCode::Jump);
            let catch_start = self.emitter().current_offset();

            self.enter_block();
            let catch_reg = match stmt.catch_param {
                Some(param) => {
                    let reg = pending_reg.unwrap_or_else(|| self.alloc());
                    self.compile_bind_pattern(&param, reg, SymbolFlags::empty());
                    reg
                }
                None => pending_reg.unwrap_or_else(|| self.alloc()),
            };
            self.compile_block_stmts(catch_block.stmts);
            self.exit_block();
            if stmt.catch_param.is_none() && pending_reg.is_none() {
                self.free(catch_reg);
            }

            self.emitter().add_exception_entry(ExceptionHandlerEntry {
                try_start,
                try_end,
                handler_pc: catch_start,
                catch_reg,
                is_catch: true,
                is_finally: false,
            });

            self.emitter().patch_jump(skip_catch);
        }
        let protected_end = self.emitter().current_offset();
        if has_finally {
            self.emitter().exit_finally();
        }

        if let Some(finally_block) = stmt.finally_block {
            let finally_start = protected_end;
            self.emitter().add_exception_entry(ExceptionHandlerEntry {
                try_start,
                try_end: protected_end,
                handler_pc: finally_start,
                catch_reg: pending_reg.unwrap_or(0),
                is_catch: false,
                is_finally: true,
            });
            self.compile_block(&finally_block);
            self.emitter().emit(OpCode::HandlePending);
            self.free(pending_reg.unwrap());
        }
    }
}
