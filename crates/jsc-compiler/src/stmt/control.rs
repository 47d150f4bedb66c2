//! Control-flow lowering: `if`, `while`, `do-while`, classic `for`, and
//! labeled statements (source spec §4.2 "Control flow").
//!
//! The instruction set has only one conditional branch, `JumpIfFalse` —
//! every construct here is built from that plus the unconditional `Jump`,
//! following the same "fall through is the common case" shape as
//! [`crate::pattern`]'s iterator-step helpers.

use jsc_ast::{DoWhileStmt, Expr, ForInit, ForStmt, IfStmt, LabeledStmt, Stmt, WhileStmt};
use jsc_core::TypeChecker;

use crate::bytecode::OpCode;
use crate::context::Compiler;
use crate::emit::LoopCleanup;
use crate::register::Register;

impl<'a, 'ast, TC> Compiler<'a, &'ast Expr<'ast>, TC>
where
    TC: TypeChecker<&'ast Expr<'ast>>,
{
    pub(crate) fn compile_if(&mut self, stmt: &'ast IfStmt<'ast>) {
        self.emitter().set_line(stmt.span.line);
        let test = self.compile_expr_fresh(stmt.condition);
        let to_else = self.emitter().emit_jump(OpCode::JumpIfFalse);
        self.emitter().emit_byte(test);
        self.free(test);
        self.compile_stmt(stmt.then_stmt);
        match stmt.else_stmt {
            Some(else_stmt) => {
                let to_end = self.emitter().emit_jump(OpCode::Jump);
                self.emitter().patch_jump(to_else);
                self.compile_stmt(else_stmt);
                self.emitter().patch_jump(to_end);
            }
            None => self.emitter().patch_jump(to_else),
        }
    }

    pub(crate) fn compile_while(&mut self, stmt: &'ast WhileStmt<'ast>, label: Option<String>) {
        self.emitter().set_line(stmt.span.line);
        let loop_start = self.emitter().current_offset();
        self.emitter().enter_loop(loop_start, label);
        let test = self.compile_expr_fresh(stmt.condition);
        let to_end = self.emitter().emit_jump(OpCode::JumpIfFalse);
        self.emitter().emit_byte(test);
        self.free(test);
        self.compile_stmt(stmt.body);
        self.emitter().emit_jump_back(loop_start);
        self.emitter().patch_jump(to_end);
        for b in self.emitter().exit_loop() {
            self.emitter().patch_jump(b);
        }
    }

    /// `do body while (condition);` — the condition test doubles as
    /// `continue`'s target, so the first pass into the loop skips straight
    /// to the body via `skip_check`, and every later pass re-enters through
    /// the test (source spec §4.2: "continue must jump to an already-known
    /// offset, never a forward patch").
    pub(crate) fn compile_do_while(&mut self, stmt: &'ast DoWhileStmt<'ast>, label: Option<String>) {
        self.emitter().set_line(stmt.span.line);
        self.enter_block();
        let skip_check = self.emitter().emit_jump(OpCode::Jump);
        let cond_check_start = self.emitter().current_offset();
        self.emitter().enter_loop(cond_check_start, label);
        let test = self.compile_expr_fresh(stmt.condition);
        let to_end = self.emitter().emit_jump(OpCode::JumpIfFalse);
        self.emitter().emit_byte(test);
        self.free(test);
        let to_body = self.emitter().emit_jump(OpCode::Jump);
        self.emitter().patch_jump(skip_check);
        self.emitter().patch_jump(to_body);
        self.compile_stmt(stmt.body);
        self.emitter().emit_jump_back(cond_check_start);
        self.emitter().patch_jump(to_end);
        for b in self.emitter().exit_loop() {
            self.emitter().patch_jump(b);
        }
        self.exit_block();
    }

    /// Classic `for (init; condition; update) body`, lowered as a
    /// condition-guarded `while` whose `continue` target is the update
    /// clause (so `continue` always runs the update before re-testing the
    /// condition, matching ECMAScript `for` semantics without needing a
    /// forward-patchable continue).
    pub(crate) fn compile_for(&mut self, stmt: &'ast ForStmt<'ast>, label: Option<String>) {
        self.emitter().set_line(stmt.span.line);
        self.enter_block();
        let mut per_iteration: Vec<Register> = Vec::new();
        match &stmt.init {
            Some(ForInit::VarDecl(decl)) => {
                for declarator in decl.declarators {
                    if let Some(reg) = self.compile_declarator(decl.kind, declarator) {
                        per_iteration.push(reg);
                    }
                }
            }
            Some(ForInit::Expr(expr)) => {
                let v = self.compile_expr_fresh(expr);
                self.free(v);
            }
            None => {}
        }

        let to_cond_test = stmt.update.is_some().then(|| self.emitter().emit_jump(OpCode::Jump));
        let update_start = self.emitter().current_offset();
        self.emitter().enter_loop(update_start, label);
        if let Some(&first) = per_iteration.first() {
            self.emitter().set_loop_cleanup(LoopCleanup { iterator_reg: None, binding_reg: Some(first) });
        }

        if let Some(update) = stmt.update {
            let v = self.compile_expr_fresh(update);
            self.free(v);
        }
        if let Some(jump) = to_cond_test {
            self.emitter().patch_jump(jump);
        }

        let to_end = stmt.condition.map(|cond| {
            let test = self.compile_expr_fresh(cond);
            let jump = self.emitter().emit_jump(OpCode::JumpIfFalse);
            self.emitter().emit_byte(test);
            self.free(test);
            jump
        });

        self.compile_stmt(stmt.body);
        for reg in &per_iteration {
            self.emitter().emit(OpCode::CloseUpvalue);
            self.emitter().emit_byte(*reg);
        }
        self.emitter().emit_jump_back(update_start);
        if let Some(jump) = to_end {
            self.emitter().patch_jump(jump);
        }
        for b in self.emitter().exit_loop() {
            self.emitter().patch_jump(b);
        }
        self.exit_block();
    }

    pub(crate) fn compile_labeled(&mut self, stmt: &'ast LabeledStmt<'ast>) {
        let label = stmt.label.name.to_string();
        match stmt.body {
            Stmt::While(w) => self.compile_while(w, Some(label)),
            Stmt::DoWhile(w) => self.compile_do_while(w, Some(label)),
            Stmt::For(f) => self.compile_for(f, Some(label)),
            Stmt::ForOf(f) => self.compile_for_of(f, Some(label)),
            Stmt::ForIn(f) => self.compile_for_in(f, Some(label)),
            Stmt::Switch(s) => self.compile_switch(s, Some(label)),
            other => {
                self.emitter().enter_labeled_block(label);
                self.compile_stmt(other);
                for b in self.emitter().exit_labeled_block() {
                    self.emitter().patch_jump(b);
                }
            }
        }
    }
}
