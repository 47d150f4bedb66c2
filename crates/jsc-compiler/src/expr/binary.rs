//! Binary and logical operator lowering (source spec §4.3 "Binary operators",
//! "Logical operators").

use jsc_ast::{BinaryExpr, BinaryOp, Expr, LiteralExpr, LiteralKind, LogicalExpr, LogicalOp};
use jsc_core::TypeChecker;

use crate::bytecode::OpCode;
use crate::context::Compiler;
use crate::register::Register;

impl<'a, 'ast, TC> Compiler<'a, &'ast Expr<'ast>, TC>
where
    TC: TypeChecker<&'ast Expr<'ast>>,
{
    pub(super) fn compile_binary(&mut self, binary: &BinaryExpr<'ast>, hint: Register) -> Register {
        self.emitter().set_line(binary.span.line);

        // Peephole: `x === null` / `x !== null` / `x === undefined` /
        // `x !== undefined` compile to dedicated type-guard opcodes rather
        // than a generic strict-equality comparison against a loaded
        // constant (source spec §4.3 "Binary operators").
        if matches!(binary.op, BinaryOp::StrictEqual | BinaryOp::StrictNotEqual) {
            if let Some((operand, is_null, negate)) = strict_nullish_guard(binary) {
                let value = self.compile_expr_fresh(operand);
                self.emitter().emit(if is_null { OpCode::IsNull } else { OpCode::IsUndefined });
                self.emitter().emit_byte(hint);
                self.emitter().emit_byte(value);
                self.free(value);
                if negate {
                    self.emitter().emit(OpCode::Not);
                    self.emitter().emit_byte(hint);
                    self.emitter().emit_byte(hint);
                }
                return hint;
            }
        }

        let lhs = self.compile_expr_fresh(binary.left);
        let rhs = self.compile_expr_fresh(binary.right);
        self.emitter().emit(binary_opcode(binary.op));
        self.emitter().emit_byte(hint);
        self.emitter().emit_byte(lhs);
        self.emitter().emit_byte(rhs);
        self.free(lhs);
        self.free(rhs);
        hint
    }

    /// `a && b`: evaluate `a` into `hint`; if falsy, short-circuit past `b`.
    /// `a || b`: evaluate `a` into `hint`; if truthy, short-circuit past `b`.
    /// `a ?? b`: evaluate `a`; if nullish, evaluate `b` into `hint`, else move
    /// `a`'s value into `hint` (source spec §4.3 "Logical operators").
    pub(super) fn compile_logical(&mut self, logical: &LogicalExpr<'ast>, hint: Register) -> Register {
        self.emitter().set_line(logical.span.line);
        match logical.op {
            LogicalOp::And => {
                let lhs = self.compile_expr_fresh(logical.left);
                self.emitter().emit_move(hint, lhs);
                self.free(lhs);
                let skip_right = self.emitter().emit_jump(OpCode::JumpIfFalse);
                self.emitter().emit_byte(hint);
                self.compile_expr(logical.right, hint);
                self.emitter().patch_jump(skip_right);
                hint
            }
            LogicalOp::Or => {
                let lhs = self.compile_expr_fresh(logical.left);
                self.emitter().emit_move(hint, lhs);
                self.free(lhs);
                let not_hint = self.alloc();
                self.emitter().emit(OpCode::Not);
                self.emitter().emit_byte(not_hint);
                self.emitter().emit_byte(hint);
                let skip_right = self.emitter().emit_jump(OpCode::JumpIfFalse);
                self.emitter().emit_byte(not_hint);
                self.free(not_hint);
                self.compile_expr(logical.right, hint);
                self.emitter().patch_jump(skip_right);
                hint
            }
            LogicalOp::NullishCoalescing => {
                let lhs = self.compile_expr_fresh(logical.left);
                let to_rhs = self.emitter().emit_jump(OpCode::JumpIfNullish);
                self.emitter().emit_byte(lhs);
                self.emitter().emit_move(hint, lhs);
                let to_end = self.emitter().emit_jump(OpCode::Jump);
                self.emitter().patch_jump(to_rhs);
                self.free(lhs);
                self.compile_expr(logical.right, hint);
                self.emitter().patch_jump(to_end);
                hint
            }
        }
    }
}

fn strict_nullish_guard<'a, 'ast>(binary: &'a BinaryExpr<'ast>) -> Option<(&'a Expr<'ast>, bool, bool)> {
    let negate = matches!(binary.op, BinaryOp::StrictNotEqual);
    if let Some(is_null) = nullish_kind(binary.right) {
        return Some((binary.left, is_null, negate));
    }
    if let Some(is_null) = nullish_kind(binary.left) {
        return Some((binary.right, is_null, negate));
    }
    None
}

fn nullish_kind(expr: &Expr<'_>) -> Option<bool> {
    match expr {
        Expr::Literal(LiteralExpr { kind: LiteralKind::Null, .. }) => Some(true),
        Expr::Literal(LiteralExpr { kind: LiteralKind::Undefined, .. }) => Some(false),
        _ => None,
    }
}

pub(super) fn binary_opcode(op: BinaryOp) -> OpCode {
    match op {
        BinaryOp::Add => OpCode::Add,
        BinaryOp::Sub => OpCode::Sub,
        BinaryOp::Mul => OpCode::Mul,
        BinaryOp::Div => OpCode::Div,
        BinaryOp::Mod => OpCode::Mod,
        BinaryOp::Pow => OpCode::Pow,
        BinaryOp::Equal => OpCode::Eq,
        BinaryOp::NotEqual => OpCode::Ne,
        BinaryOp::StrictEqual => OpCode::StrictEq,
        BinaryOp::StrictNotEqual => OpCode::StrictNe,
        BinaryOp::Less => OpCode::Lt,
        BinaryOp::LessEqual => OpCode::Le,
        BinaryOp::Greater => OpCode::Gt,
        BinaryOp::GreaterEqual => OpCode::Ge,
        BinaryOp::BitwiseAnd => OpCode::BitAnd,
        BinaryOp::BitwiseOr => OpCode::BitOr,
        BinaryOp::BitwiseXor => OpCode::BitXor,
        BinaryOp::ShiftLeft => OpCode::Shl,
        BinaryOp::ShiftRight => OpCode::Shr,
        BinaryOp::ShiftRightUnsigned => OpCode::Ushr,
        BinaryOp::In => OpCode::In,
        BinaryOp::Instanceof => OpCode::Instanceof,
    }
}
