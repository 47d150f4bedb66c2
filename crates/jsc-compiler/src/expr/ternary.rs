//! Conditional (`?:`) expression lowering (source spec §4.3 "Conditional
//! expressions").

use jsc_ast::{ConditionalExpr, Expr};
use jsc_core::TypeChecker;

use crate::bytecode::OpCode;
use crate::context::Compiler;
use crate::register::Register;

impl<'a, 'ast, TC> Compiler<'a, &'ast Expr<'ast>, TC>
where
    TC: TypeChecker<&'ast Expr<'ast>>,
{
    pub(super) fn compile_conditional(&mut self, cond: &ConditionalExpr<'ast>, hint: Register) -> Register {
        self.emitter().set_line(cond.span.line);

        let test = self.compile_expr_fresh(cond.condition);
        let to_alternate = self.emitter().emit_jump(OpCode::JumpIfFalse);
        self.emitter().emit_byte(test);
        self.free(test);

        self.compile_expr(cond.consequent, hint);
        let to_end = self.emitter().emit_jump(OpCode::Jump);

        self.emitter().patch_jump(to_alternate);
        self.compile_expr(cond.alternate, hint);

        self.emitter().patch_jump(to_end);
        hint
    }
}
