//! Identifier resolution (source spec §4.3 "Identifier resolution").

use jsc_ast::{Expr, IdentExpr};
use jsc_core::TypeChecker;

use crate::bytecode::OpCode;
use crate::context::{Compiler, IdentifierResolution};
use crate::module::ImportKind;
use crate::register::{BAD_REGISTER, Register};
use crate::scope::SymbolLocation;

impl<'a, 'ast, TC> Compiler<'a, &'ast Expr<'ast>, TC>
where
    TC: TypeChecker<&'ast Expr<'ast>>,
{
    pub(super) fn compile_ident_expr(&mut self, ident: &IdentExpr<'ast>, hint: Register) -> Register {
        self.emitter().set_line(ident.span.line);
        self.compile_ident_read(ident.ident.name, hint)
    }

    /// Read an identifier's value into `hint`, per source-spec §4.3 steps
    /// 1–6. Shared by plain identifier expressions and by destructuring/
    /// pattern leaves that bind by name.
    pub(crate) fn compile_ident_read(&mut self, name: &'ast str, hint: Register) -> Register {
        match self.resolve(name) {
            IdentifierResolution::Local(symbol) if symbol.is_tdz() => self.emit_tdz_error(name, hint),
            IdentifierResolution::Outer(symbol) if symbol.is_tdz() => self.emit_tdz_error(name, hint),
            IdentifierResolution::Local(symbol) => match symbol.location {
                SymbolLocation::Local(reg) => {
                    if reg == BAD_REGISTER {
                        // The function's own name, read from directly inside
                        // its own body: this captures the closure currently
                        // under construction. `add_free_symbol` records it
                        // with the sentinel register still in place;
                        // `emit_closure` recognizes that sentinel and
                        // substitutes the closure's real destination
                        // register when it encodes this upvalue.
                        let upvalue_index = self.add_free_symbol(name, true, BAD_REGISTER);
                        self.emitter().emit(OpCode::LoadFree);
                        self.emitter().emit_byte(hint);
                        self.emitter().emit_byte(upvalue_index);
                        return hint;
                    }
                    self.emitter().emit_move(hint, reg);
                    hint
                }
                SymbolLocation::Global(index) => {
                    self.emitter().emit_get_global(hint, index);
                    hint
                }
                SymbolLocation::Spilled(_) => {
                    self.emitter().emit_load_undefined(hint);
                    hint
                }
            },
            IdentifierResolution::Outer(symbol) => match symbol.location {
                SymbolLocation::Local(reg) => {
                    let upvalue_index = self.add_free_symbol(name, true, reg);
                    self.emitter().emit(OpCode::LoadFree);
                    self.emitter().emit_byte(hint);
                    self.emitter().emit_byte(upvalue_index);
                    hint
                }
                SymbolLocation::Global(index) => {
                    self.emitter().emit_get_global(hint, index);
                    hint
                }
                SymbolLocation::Spilled(_) => {
                    self.emitter().emit_load_undefined(hint);
                    hint
                }
            },
            IdentifierResolution::Global(index) => {
                self.emitter().emit_get_global(hint, index);
                hint
            }
            IdentifierResolution::Unresolved => {
                if self.module_ref().import(name).is_some() {
                    return self.compile_module_import_read(name, hint);
                }
                // Undefined references aren't a compile error: they're a
                // deferred global access (source spec §7 "Resolution
                // errors").
                let index = self.globals().get_or_insert(name);
                self.emitter().emit_get_global(hint, index);
                hint
            }
        }
    }

    /// `name` resolved to a binding still flagged TDZ — a forward reference
    /// discovered at compile time. Loads `undefined` into `hint` so the rest
    /// of the expression tree still has a register to work with, then emits
    /// an unconditional throw ahead of it.
    fn emit_tdz_error(&mut self, name: &str, hint: Register) -> Register {
        let name_idx = self.intern_string(name);
        self.emitter().emit(OpCode::ThrowTdzError);
        self.emitter().emit_u16(name_idx);
        self.emitter().emit_load_undefined(hint);
        hint
    }

    /// Read an imported binding: ensure the source module has run, then
    /// fetch the export it names off it (source spec §4.7 "Module linkage"
    /// — deferred runtime resolution rather than eager cross-module
    /// materialization). A namespace import (`import * as ns`) reads the
    /// module's whole export object under the reserved empty-string export
    /// name.
    fn compile_module_import_read(&mut self, name: &str, hint: Register) -> Register {
        let binding = self.module_ref().import(name).expect("caller checked import(name).is_some()").clone();
        let module_idx = self.intern_string(binding.source_module);
        self.emitter().emit(OpCode::EvalModule);
        self.emitter().emit_u16(module_idx);

        let export_name = match &binding.kind {
            ImportKind::Named { source_name } => source_name.as_str(),
            ImportKind::Default => "default",
            ImportKind::Namespace => "",
        };
        let export_idx = self.intern_string(export_name);
        self.emitter().emit(OpCode::GetModuleExport);
        self.emitter().emit_byte(hint);
        self.emitter().emit_u16(module_idx);
        self.emitter().emit_u16(export_idx);
        hint
    }
}
