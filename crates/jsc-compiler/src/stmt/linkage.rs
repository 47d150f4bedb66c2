//! Module linkage: `import`/`export` declarations (source spec §4.5
//! "Modules").
//!
//! Neither declaration form emits bytecode by itself. An `import` only
//! registers where a name resolves to (source spec §4.5: imports read
//! lazily, via `EvalModule`+`GetModuleExport` at the point of use — see
//! [`crate::expr::identifiers::compile_module_import_read`]). An `export`
//! either re-exports a binding from elsewhere (no local value ever touches
//! a register) or promotes an already-compiled local binding into the
//! module's global export table so other modules can read it by name.

use jsc_ast::{ExportDecl, Expr, ImportDecl, ImportSpecifier, Stmt};
use jsc_core::{CompilationError, Span, TypeChecker};

use crate::bytecode::OpCode;
use crate::context::{Compiler, IdentifierResolution};
use crate::module::{ImportBinding, ImportKind, ReExport};
use crate::scope::{Symbol, SymbolLocation};

impl<'a, 'ast, TC> Compiler<'a, &'ast Expr<'ast>, TC>
where
    TC: TypeChecker<&'ast Expr<'ast>>,
{
    pub(crate) fn compile_import(&mut self, decl: &'ast ImportDecl<'ast>) {
        if let Some(default) = decl.default {
            self.module().add_import(
                default.name.to_string(),
                ImportBinding { source_module: decl.source.to_string(), kind: ImportKind::Default },
            );
        }
        for ImportSpecifier { imported, local, .. } in decl.named {
            self.module().add_import(
                local.name.to_string(),
                ImportBinding {
                    source_module: decl.source.to_string(),
                    kind: ImportKind::Named { source_name: imported.name.to_string() },
                },
            );
        }
        if let Some(namespace) = decl.namespace {
            self.module().add_import(
                namespace.name.to_string(),
                ImportBinding { source_module: decl.source.to_string(), kind: ImportKind::Namespace },
            );
        }
    }

    pub(crate) fn compile_export(&mut self, export: &'ast ExportDecl<'ast>) {
        match export {
            ExportDecl::Named { specifiers, source: Some(src), .. } => {
                for spec in *specifiers {
                    self.module().add_reexport(ReExport {
                        exported_name: Some(spec.exported.name.to_string()),
                        source_name: Some(spec.local.name.to_string()),
                        source_module: src.to_string(),
                    });
                }
            }
            ExportDecl::Named { specifiers, source: None, .. } => {
                for spec in *specifiers {
                    self.promote_export(&spec.exported.name, &spec.local.name, spec.span);
                }
            }
            ExportDecl::Default { value, .. } => {
                let reg = self.compile_expr_fresh(value);
                let global = self.globals().get_or_insert("*default*");
                self.emitter().emit_set_global(global, reg);
                self.free(reg);
                self.module().add_export("default", "*default*");
            }
            // `export * as ns from "mod"`: the whole module object is read
            // under one reserved key at the point of use, so bookkeeping the
            // reexport is enough — no per-name enumeration needed.
            ExportDecl::All { exported: Some(ns), source, .. } => {
                self.module().add_reexport(ReExport {
                    exported_name: Some(ns.name.to_string()),
                    source_name: None,
                    source_module: source.to_string(),
                });
            }
            // `export * from "mod"`: every name `mod` exports (other than
            // its own default) becomes a re-export of this module too, so
            // the names have to be known at compile time (source spec §4.7).
            ExportDecl::All { exported: None, source, span } => {
                self.compile_export_star(*source, *span);
            }
            ExportDecl::Declaration { decl, span } => {
                self.compile_export_declaration(decl, *span);
            }
        }
    }

    /// Synthesize one re-export per name `source` exports (source spec §4.7,
    /// `export * from`). Mirrors the `EvalModule`+`GetModuleExport` pattern
    /// named imports read through ([`crate::expr::identifiers::compile_module_import_read`]),
    /// plus a `SetGlobal` to promote each value into this module's own
    /// export table, since every exported name needs a global slot
    /// (`"default"` is excluded: a wildcard re-export never forwards the
    /// source module's default export).
    fn compile_export_star(&mut self, source: &'ast str, span: Span) {
        let Some((loader, referrer)) = self.module_loader() else {
            self.add_error(CompilationError::ModuleLoaderUnavailable { span });
            return;
        };
        let Some(export_names) = loader.get_export_names(source, &referrer) else {
            self.add_error(CompilationError::UnresolvedReexportSource { specifier: source.to_string(), span });
            return;
        };
        let module_idx = self.intern_string(source.to_string());
        for export_name in export_names.iter().filter(|name| name.as_str() != "default") {
            let name_idx = self.intern_string(export_name.clone());
            let value = self.alloc();
            self.emitter().emit(OpCode::EvalModule);
            self.emitter().emit_u16(module_idx);
            self.emitter().emit(OpCode::GetModuleExport);
            self.emitter().emit_byte(value);
            self.emitter().emit_u16(module_idx);
            self.emitter().emit_u16(name_idx);
            let global = self.globals().get_or_insert(export_name.as_str());
            self.emitter().emit_set_global(global, value);
            self.free(value);
            self.module().add_export(export_name.as_str(), export_name.as_str());
        }
    }

    fn compile_export_declaration(&mut self, decl: &'ast Stmt<'ast>, span: Span) {
        match decl {
            Stmt::Function(func) => {
                // Already compiled and bound by `hoist_functions`; only the
                // export-table entry is left to add.
                if let Some(name) = func.name {
                    self.promote_export(name.name, name.name, span);
                }
            }
            Stmt::Class(class) => {
                self.compile_stmt(decl);
                self.promote_export(class.name.name, class.name.name, span);
            }
            Stmt::VarDecl(var_decl) => {
                self.compile_stmt(decl);
                for declarator in var_decl.declarators {
                    self.promote_declarator_exports(&declarator.id, span);
                }
            }
            other => self.compile_stmt(other),
        }
    }

    fn promote_declarator_exports(&mut self, pattern: &jsc_ast::Pattern<'ast>, span: Span) {
        use jsc_ast::Pattern;
        match pattern {
            Pattern::Ident(ident) => self.promote_export(ident.name, ident.name, span),
            Pattern::Assign(assign) => self.promote_declarator_exports(&assign.target, span),
            Pattern::Array(array) => {
                for element in array.elements.iter().filter_map(|e| e.as_ref()) {
                    self.promote_declarator_exports(element, span);
                }
                if let Some(rest) = &array.rest {
                    self.promote_declarator_exports(rest, span);
                }
            }
            Pattern::Object(object) => {
                for prop in object.properties {
                    self.promote_declarator_exports(&prop.value, span);
                }
                if let Some(rest) = &object.rest {
                    self.promote_declarator_exports(rest, span);
                }
            }
        }
    }

    /// Move an already-bound local symbol into the module's global export
    /// table, so other modules can reach it through `GetModuleExport`.
    /// Exported bindings therefore always live behind a global slot, even
    /// if they'd otherwise have stayed a plain register local.
    fn promote_export(&mut self, export_name: &str, local_name: &str, span: Span) {
        match self.resolve(local_name) {
            IdentifierResolution::Local(Symbol { location: SymbolLocation::Local(reg), .. }) => {
                let global = self.globals().get_or_insert(local_name);
                self.emitter().emit_set_global(global, reg);
                self.module().add_export(export_name, local_name);
            }
            _ => {
                self.add_error(CompilationError::UnknownNamedExport { name: local_name.to_string(), span });
            }
        }
    }
}
