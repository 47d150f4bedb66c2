//! Template literal lowering (source spec §4.3 "Template literals").
//!
//! Neither form has a dedicated opcode: a plain template folds its parts
//! together with `Concat`, and a tagged template builds the cooked/raw
//! strings array `String.raw`-style before calling the tag function.

use jsc_ast::{TaggedTemplateExpr, TemplateExpr};
use jsc_core::TypeChecker;

use crate::bytecode::OpCode;
use crate::context::Compiler;
use crate::register::Register;

impl<'a, 'ast, TC> Compiler<'a, &'ast jsc_ast::Expr<'ast>, TC>
where
    TC: TypeChecker<&'ast jsc_ast::Expr<'ast>>,
{
    /// `` `a${b}c` ``: start from the first cooked part and fold in each
    /// substitution followed by the cooked part that trails it. Empty
    /// cooked parts (back-to-back substitutions, or a template that starts
    /// or ends with `${...}`) are skipped rather than concatenated in —
    /// `Concat` with an empty string is a no-op with extra steps.
    pub(super) fn compile_template(&mut self, template: &TemplateExpr<'ast>, hint: Register) -> Register {
        self.emitter().set_line(template.span.line);
        self.emitter().emit_load_string(hint, template.cooked[0]);

        for (i, expr) in template.expressions.iter().enumerate() {
            let value = self.compile_expr_fresh(expr);
            self.emitter().emit(OpCode::Concat);
            self.emitter().emit_byte(hint);
            self.emitter().emit_byte(hint);
            self.emitter().emit_byte(value);
            self.free(value);

            let part = template.cooked[i + 1];
            if part.is_empty() {
                continue;
            }
            let part_reg = self.alloc();
            self.emitter().emit_load_string(part_reg, part);
            self.emitter().emit(OpCode::Concat);
            self.emitter().emit_byte(hint);
            self.emitter().emit_byte(hint);
            self.emitter().emit_byte(part_reg);
            self.free(part_reg);
        }
        hint
    }

    /// `` tag`a${b}c` `` desugars to `tag(strings, ...substitutions)`, where
    /// `strings` is an array of the cooked parts carrying a parallel `raw`
    /// array under a `raw` property (source spec §4.3 "Tagged templates").
    pub(super) fn compile_tagged_template(&mut self, tagged: &TaggedTemplateExpr<'ast>, hint: Register) -> Register {
        self.emitter().set_line(tagged.span.line);

        let strings = self.build_cooked_strings_array(tagged.quasi.cooked, tagged.raw);
        let func = self.compile_expr_fresh(tagged.tag);

        let argc = 1 + tagged.quasi.expressions.len();
        let block = self.alloc_contiguous(1 + argc);
        self.emitter().emit_move(block, func);
        self.free(func);
        self.emitter().emit_move(block + 1, strings);
        self.free(strings);
        for (i, expr) in tagged.quasi.expressions.iter().enumerate() {
            self.compile_expr_into(expr, block + 2 + i as u8);
        }
        self.emitter().emit(OpCode::Call);
        self.emitter().emit_byte(hint);
        self.emitter().emit_byte(block);
        self.emitter().emit_byte(argc as u8);
        for i in (0..=argc as u8).rev() {
            self.free(block + i);
        }
        hint
    }

    fn build_cooked_strings_array(&mut self, cooked: &'ast [&'ast str], raw: &'ast [&'ast str]) -> Register {
        let array = self.alloc();
        self.emitter().emit(OpCode::NewArray);
        self.emitter().emit_byte(array);
        self.emitter().emit_u16(cooked.len() as u16);
        for part in cooked {
            let reg = self.alloc();
            self.emitter().emit_load_string(reg, *part);
            self.emitter().emit(OpCode::ArrayPush);
            self.emitter().emit_byte(array);
            self.emitter().emit_byte(reg);
            self.free(reg);
        }

        let raw_array = self.alloc();
        self.emitter().emit(OpCode::NewArray);
        self.emitter().emit_byte(raw_array);
        self.emitter().emit_u16(raw.len() as u16);
        for part in raw {
            let reg = self.alloc();
            self.emitter().emit_load_string(reg, *part);
            self.emitter().emit(OpCode::ArrayPush);
            self.emitter().emit_byte(raw_array);
            self.emitter().emit_byte(reg);
            self.free(reg);
        }

        let raw_name = self.intern_string("raw");
        self.emitter().emit(OpCode::SetProp);
        self.emitter().emit_byte(array);
        self.emitter().emit_u16(raw_name);
        self.emitter().emit_byte(raw_array);
        self.free(raw_array);
        array
    }
}
