//! Statement lowering (source spec §4.2 "Control flow", §4.1 "Declarations").
//!
//! [`Compiler::compile_block`] is the single entry point every block-bearing
//! construct (function bodies, `if`/`while`/`for` bodies, `try`/`catch`
//! clauses) goes through: it predeclares every `let`/`const`/`class` binding
//! in TDZ state and hoists every function declaration before lowering the
//! block's statements in order, matching how the corresponding JS
//! constructs behave at runtime regardless of where in the block a
//! declaration textually sits.

mod control;
mod iteration;
mod linkage;
mod switch;
mod try_catch;

use jsc_ast::{
    BreakStmt, ContinueStmt, Expr, FunctionDecl, Pattern, ReturnStmt, Stmt, ThrowStmt, VarDeclKind,
    VarDeclStmt, VarDeclarator,
};
use jsc_core::{CompilationError, TypeChecker};

use crate::bytecode::OpCode;
use crate::context::{Compiler, NO_VALUE};
use crate::pattern::terminal_ident;
use crate::register::Register;
use crate::scope::{Symbol, SymbolFlags};

impl<'a, 'ast, TC> Compiler<'a, &'ast Expr<'ast>, TC>
where
    TC: TypeChecker<&'ast Expr<'ast>>,
{
    /// Compile a `{ ... }` block in its own lexical scope.
    pub(crate) fn compile_block(&mut self, block: &jsc_ast::Block<'ast>) {
        self.enter_block();
        self.compile_block_stmts(block.stmts);
        self.exit_block();
    }

    /// Predeclare, hoist, and compile a sequence of statements *without*
    /// opening a new scope. Exists so callers that already manage their own
    /// scope around a statement list — `try`'s catch clause, which must bind
    /// `catch (e)`'s parameter in the same scope its body's statements
    /// see — don't have to duplicate the predeclare/hoist walk.
    pub(crate) fn compile_block_stmts(&mut self, stmts: &'ast [Stmt<'ast>]) {
        self.predeclare_tdz(stmts.iter());
        self.hoist_functions(stmts.iter());
        for stmt in stmts {
            self.compile_stmt(stmt);
        }
    }

    /// Compile an entire module or script body at the root frame pushed by
    /// [`Compiler::new`]. The sole entry point a caller outside this crate
    /// needs: lower every top-level statement, then hand the `Compiler` to
    /// [`Compiler::finish_module`] to get the chunk and collected errors.
    ///
    /// Unlike a nested block, the script/module root hoists its function
    /// declarations into *global* bindings rather than local registers
    /// (source spec §4.1, the five-step top-level pre-walk) — a script's top
    /// frame has no caller to keep its register file alive, so a name that
    /// needs to outlive `compile_program` itself must live in the global
    /// table instead.
    pub fn compile_program(&mut self, program: &'ast jsc_ast::Program<'ast>) {
        #[cfg(feature = "profiling")]
        profiling::scope!("compile_program");
        let stmts = program.body();
        self.predeclare_tdz(stmts.iter());
        self.hoist_root_functions(stmts.iter());
        for stmt in stmts {
            self.compile_stmt(stmt);
        }
    }

    fn compile_stmt(&mut self, stmt: &'ast Stmt<'ast>) {
        match stmt {
            Stmt::Expr(expr_stmt) => {
                self.emitter().set_line(expr_stmt.span.line);
                let value = self.compile_expr_fresh(expr_stmt.expr);
                self.free(value);
            }
            Stmt::VarDecl(decl) => self.compile_var_decl_stmt(decl),
            Stmt::Return(stmt) => self.compile_return(stmt),
            Stmt::Break(stmt) => self.compile_break(stmt),
            Stmt::Continue(stmt) => self.compile_continue(stmt),
            Stmt::Throw(stmt) => self.compile_throw(stmt),
            Stmt::Block(block) => self.compile_block(block),
            Stmt::If(stmt) => self.compile_if(stmt),
            Stmt::While(stmt) => self.compile_while(stmt, None),
            Stmt::DoWhile(stmt) => self.compile_do_while(stmt, None),
            Stmt::For(stmt) => self.compile_for(stmt, None),
            Stmt::ForOf(stmt) => self.compile_for_of(stmt, None),
            Stmt::ForIn(stmt) => self.compile_for_in(stmt, None),
            Stmt::Switch(stmt) => self.compile_switch(stmt, None),
            Stmt::Try(stmt) => self.compile_try(stmt),
            Stmt::Labeled(stmt) => self.compile_labeled(stmt),
            // Already compiled and bound by `hoist_functions`.
            Stmt::Function(_) => {}
            Stmt::Class(decl) => {
                let hint = self.alloc();
                let reg = self.compile_class_decl(decl, hint);
                self.pin(reg);
                self.define(decl.name.name, Symbol::local(reg));
            }
            Stmt::Import(decl) => {
                if self.module_mode() {
                    self.compile_import(decl);
                } else {
                    self.add_error(CompilationError::ImportExportOutsideModuleMode { span: decl.span });
                }
            }
            Stmt::Export(decl) => {
                if self.module_mode() {
                    self.compile_export(decl);
                } else {
                    self.add_error(CompilationError::ImportExportOutsideModuleMode { span: decl.span() });
                }
            }
        }
    }

    /// Introduce every `let`/`const`/class binding a statement list declares
    /// in TDZ state, ahead of lowering any of the list's statements. Reading
    /// one of these names before its own declarator runs throws (source
    /// spec §4.1, temporal dead zone); calling `define` again when the real
    /// declarator compiles overwrites the sentinel with the bound register,
    /// which is what actually clears the TDZ — no separate "un-TDZ" step is
    /// needed.
    fn predeclare_tdz(&mut self, stmts: impl Iterator<Item = &'ast Stmt<'ast>>) {
        for stmt in stmts {
            match stmt {
                Stmt::VarDecl(decl) if decl.kind != VarDeclKind::Var => {
                    for declarator in decl.declarators {
                        self.predeclare_pattern_tdz(&declarator.id);
                    }
                }
                Stmt::Class(decl) => {
                    self.define(decl.name.name, Symbol::local(NO_VALUE).with_flags(SymbolFlags::TDZ));
                }
                _ => {}
            }
        }
    }

    fn predeclare_pattern_tdz(&mut self, pattern: &Pattern<'ast>) {
        match pattern {
            Pattern::Ident(ident) => {
                self.define(ident.name, Symbol::local(NO_VALUE).with_flags(SymbolFlags::TDZ));
            }
            Pattern::Assign(assign) => self.predeclare_pattern_tdz(&assign.target),
            Pattern::Array(array) => {
                for element in array.elements.iter().filter_map(|e| e.as_ref()) {
                    self.predeclare_pattern_tdz(element);
                }
                if let Some(rest) = &array.rest {
                    self.predeclare_pattern_tdz(rest);
                }
            }
            Pattern::Object(object) => {
                for prop in object.properties {
                    self.predeclare_pattern_tdz(&prop.value);
                }
                if let Some(rest) = &object.rest {
                    self.predeclare_pattern_tdz(rest);
                }
            }
        }
    }

    /// Compile and bind every `function` declaration in a statement list
    /// before any of the list's other statements run, so a function can
    /// call another declared later in the same block (source spec §4.1,
    /// function hoisting).
    fn hoist_functions(&mut self, stmts: impl Iterator<Item = &'ast Stmt<'ast>>) {
        for stmt in stmts {
            if let Stmt::Function(decl) = stmt {
                self.compile_function_decl_stmt(decl);
            }
        }
    }

    fn compile_function_decl_stmt(&mut self, decl: &'ast FunctionDecl<'ast>) {
        let name = decl.name.expect("hoisted function declarations are always named");
        let (const_idx, free_symbols) = self.compile_function_literal(decl, Some(name.name));
        let func_reg = self.emit_closure(const_idx, &free_symbols);
        self.pin(func_reg);
        self.define(name.name, Symbol::local(func_reg));
    }

    /// Script/module-root counterpart of [`Self::hoist_functions`]: steps
    /// (b)–(e) of source spec §4.1's top-level pre-walk. Step (a) — a
    /// tentative self-recursive binding — is already covered for every
    /// named function literal by [`Compiler::compile_function_literal`]
    /// itself, which binds the name in the literal's *own* scope before
    /// compiling its body, so there's nothing extra to pre-declare here.
    fn hoist_root_functions(&mut self, stmts: impl Iterator<Item = &'ast Stmt<'ast>>) {
        for stmt in stmts {
            if let Stmt::Function(decl) = stmt {
                self.compile_root_function_decl_stmt(decl);
            }
        }
    }

    /// (b) compile the literal, (c) emit its closure, (d) reserve a global
    /// index and store the closure there, (e) rebind the symbol table entry
    /// to that global rather than the (freed) register holding it.
    fn compile_root_function_decl_stmt(&mut self, decl: &'ast FunctionDecl<'ast>) {
        let name = decl.name.expect("hoisted function declarations are always named");
        let (const_idx, free_symbols) = self.compile_function_literal(decl, Some(name.name));
        let func_reg = self.emit_closure(const_idx, &free_symbols);
        let global_idx = self.globals().get_or_insert(name.name);
        self.emitter().emit_set_global(global_idx, func_reg);
        self.free(func_reg);
        self.define(name.name, Symbol::global(global_idx));
    }

    fn compile_var_decl_stmt(&mut self, decl: &'ast VarDeclStmt<'ast>) {
        self.emitter().set_line(decl.span.line);
        for declarator in decl.declarators {
            self.compile_declarator(decl.kind, declarator);
        }
    }

    /// Compile one `id = init` declarator. Returns the bound register when
    /// the binding is a terminal identifier — callers that need a
    /// per-iteration register to close over (`for`'s loop variable) use
    /// this; plain `let`/`const`/`var` statements ignore it.
    pub(crate) fn compile_declarator(
        &mut self,
        kind: VarDeclKind,
        declarator: &'ast VarDeclarator<'ast>,
    ) -> Option<Register> {
        let flags = if kind == VarDeclKind::Const { SymbolFlags::IMMUTABLE } else { SymbolFlags::empty() };
        let value = match declarator.init {
            Some(expr) => self.compile_expr_fresh(expr),
            None => {
                let reg = self.alloc();
                self.emitter().emit_load_undefined(reg);
                reg
            }
        };
        let keep = terminal_ident(&declarator.id);
        if kind == VarDeclKind::Var {
            self.compile_bind_pattern_in_root(&declarator.id, value, flags);
        } else {
            self.compile_bind_pattern(&declarator.id, value, flags);
        }
        keep.then_some(value)
    }

    fn compile_return(&mut self, stmt: &'ast ReturnStmt<'ast>) {
        self.emitter().set_line(stmt.span.line);
        let value = match stmt.value {
            Some(expr) => self.compile_expr_fresh(expr),
            None => {
                let reg = self.alloc();
                self.emitter().emit_load_undefined(reg);
                reg
            }
        };
        if self.emitter().finally_depth() > 0 {
            self.emitter().emit(OpCode::ReturnFinally);
            self.emitter().emit_byte(value);
        } else {
            self.emitter().emit_return(value);
        }
        self.free(value);
    }

    fn compile_throw(&mut self, stmt: &'ast ThrowStmt<'ast>) {
        self.emitter().set_line(stmt.span.line);
        let value = self.compile_expr_fresh(stmt.argument);
        self.emitter().emit_throw(value);
        self.free(value);
    }

    fn compile_break(&mut self, stmt: &'ast BreakStmt<'ast>) {
        self.emitter().set_line(stmt.span.line);
        let label = stmt.label.map(|ident| ident.name.to_string());
        if let Err(err) = self.emitter().emit_break(label.as_deref()) {
            self.add_error(CompilationError::InvalidJumpTarget { message: err.to_string(), span: stmt.span });
        }
    }

    fn compile_continue(&mut self, stmt: &'ast ContinueStmt<'ast>) {
        self.emitter().set_line(stmt.span.line);
        let label = stmt.label.map(|ident| ident.name.to_string());
        if let Err(err) = self.emitter().emit_continue(label.as_deref()) {
            self.add_error(CompilationError::InvalidJumpTarget { message: err.to_string(), span: stmt.span });
        }
    }
}
