//! `switch` lowering (source spec §4.2 "Control flow").
//!
//! All cases share a single lexical scope (hoisting and TDZ predeclaration
//! run once over every case's statements combined, matching how a JS
//! `switch` body is one block regardless of how many `case`/`default`
//! clauses it has). Dispatch is a linear chain of `StrictEq` tests: each
//! `case` that doesn't match falls through to the next test, and a match
//! jumps forward into that case's body; a bare `default` (or running off
//! the end with no match) falls through to the default clause's body, or
//! straight to the switch's end if there is none.

use jsc_ast::{Expr, SwitchStmt};
use jsc_core::TypeChecker;

use crate::bytecode::OpCode;
use crate::context::Compiler;
use crate::emit::JumpLabel;

impl<'a, 'ast, TC> Compiler<'a, &'ast Expr<'ast>, TC>
where
    TC: TypeChecker<&'ast Expr<'ast>>,
{
    pub(crate) fn compile_switch(&mut self, stmt: &'ast SwitchStmt<'ast>, label: Option<String>) {
        self.emitter().set_line(stmt.span.line);
        let disc = self.compile_expr_fresh(stmt.discriminant);
        self.enter_block();
        self.predeclare_tdz(stmt.cases.iter().flat_map(|case| case.stmts.iter()));
        self.hoist_functions(stmt.cases.iter().flat_map(|case| case.stmts.iter()));
        self.emitter().enter_switch(label);

        let mut case_jumps: Vec<Option<JumpLabel>> = Vec::with_capacity(stmt.cases.len());
        for case in stmt.cases {
            match case.test {
                Some(test) => {
                    let test_reg = self.compile_expr_fresh(test);
                    let eq = self.alloc();
                    self.emitter().emit(OpCode::StrictEq);
                    self.emitter().emit_byte(eq);
                    self.emitter().emit_byte(disc);
                    self.emitter().emit_byte(test_reg);
                    self.free(test_reg);
                    let skip = self.emitter().emit_jump(OpCode::JumpIfFalse);
                    self.emitter().emit_byte(eq);
                    self.free(eq);
                    let to_body = self.emitter().emit_jump(OpCode::Jump);
                    self.emitter().patch_jump(skip);
                    case_jumps.push(Some(to_body));
                }
                None => case_jumps.push(None),
            }
        }
        self.free(disc);
        let to_fallthrough = self.emitter().emit_jump(OpCode::Jump);

        let default_index = stmt.cases.iter().position(|case| case.is_default());
        if let Some(idx) = default_index {
            case_jumps[idx] = Some(to_fallthrough);
        }

        for (case, jump) in stmt.cases.iter().zip(case_jumps) {
            if let Some(j) = jump {
                self.emitter().patch_jump(j);
            }
            for s in case.stmts {
                self.compile_stmt(s);
            }
        }

        if default_index.is_none() {
            self.emitter().patch_jump(to_fallthrough);
        }

        for b in self.emitter().exit_switch() {
            self.emitter().patch_jump(b);
        }
        self.exit_block();
    }
}
