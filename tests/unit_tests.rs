//! End-to-end lowering tests: hand-built ASTs compiled to bytecode, asserted
//! against emitted opcodes, the exception table, and the collected error
//! list.
//!
//! There is no parser in this workspace, so every program here is built
//! directly out of `jsc_ast` node constructors over a `bumpalo` arena,
//! following the construction style each node type's own doc examples use.

use bumpalo::Bump;
use jsc_ast::{
    Block, BreakStmt, ExportDecl, Expr, ExprStmt, Ident, IdentExpr, IfStmt, ImportDecl, LiteralExpr, LiteralKind,
    Pattern, Program, ReturnStmt, Stmt, ThrowStmt, TryStmt, VarDeclKind, VarDeclStmt, VarDeclarator, WhileStmt,
};
use jsc_core::ty::Program as TypeProgram;
use jsc_core::{Span, Type, TypeChecker};
use jsc_compiler::bytecode::OpCode;

struct NoProgram;

impl TypeProgram for NoProgram {
    fn superclass_arity(&self, _class_name: &str) -> Option<usize> {
        None
    }
}

/// A checker that never supplies computed types — every program compiled in
/// this file needs none, matching `jsc-compiler`'s own internal `FakeChecker`
/// test helper.
struct NoopChecker {
    program: NoProgram,
}

impl NoopChecker {
    fn new() -> Self {
        Self { program: NoProgram }
    }
}

impl<'ast> TypeChecker<&'ast Expr<'ast>> for NoopChecker {
    type Program = NoProgram;

    fn get_computed_type(&self, _node: &'ast Expr<'ast>) -> Option<Type> {
        None
    }

    fn resolve_type(&self, _name: &str) -> Option<Type> {
        None
    }

    fn get_program(&self) -> &NoProgram {
        &self.program
    }
}

fn span() -> Span {
    Span::new(1, 1, 1)
}

fn num<'a>(arena: &'a Bump, value: f64) -> &'a Expr<'a> {
    arena.alloc(Expr::Literal(LiteralExpr { kind: LiteralKind::Number(value), span: span() }))
}

fn boolean<'a>(arena: &'a Bump, value: bool) -> &'a Expr<'a> {
    arena.alloc(Expr::Literal(LiteralExpr { kind: LiteralKind::Boolean(value), span: span() }))
}

#[test]
fn return_of_a_literal_loads_the_constant_and_returns() {
    let arena = Bump::new();
    let ret = Stmt::Return(ReturnStmt { value: Some(num(&arena, 42.0)), span: span() });
    let body = arena.alloc([ret]);
    let program = Program::new(body, span());

    let checker = NoopChecker::new();
    let (chunk, errors, _exports) = jsc::compile(&checker, &program, jsc::CompileOptions::default());

    assert!(errors.is_empty());
    chunk.assert_opcodes(&[OpCode::LoadConst, OpCode::Return]);
}

#[test]
fn if_else_branches_both_return() {
    let arena = Bump::new();
    let then_branch = arena.alloc(Stmt::Return(ReturnStmt { value: Some(num(&arena, 1.0)), span: span() }));
    let else_branch = arena.alloc(Stmt::Return(ReturnStmt { value: Some(num(&arena, 2.0)), span: span() }));
    let if_stmt = arena.alloc(IfStmt {
        condition: boolean(&arena, true),
        then_stmt: then_branch,
        else_stmt: Some(else_branch),
        span: span(),
    });
    let body = arena.alloc([Stmt::If(if_stmt)]);
    let program = Program::new(body, span());

    let checker = NoopChecker::new();
    let (chunk, errors, _exports) = jsc::compile(&checker, &program, jsc::CompileOptions::default());

    assert!(errors.is_empty());
    chunk.assert_opcodes(&[
        OpCode::LoadTrue,
        OpCode::JumpIfFalse,
        OpCode::LoadConst,
        OpCode::Return,
        OpCode::Jump,
        OpCode::LoadConst,
        OpCode::Return,
    ]);
}

#[test]
fn while_loop_with_immediate_break_patches_both_jumps() {
    let arena = Bump::new();
    let break_stmt = arena.alloc(Stmt::Break(BreakStmt { label: None, span: span() }));
    let body = arena.alloc(Stmt::Block(Block { stmts: std::slice::from_ref(break_stmt), span: span() }));
    let while_stmt = arena.alloc(WhileStmt { condition: boolean(&arena, true), body, span: span() });
    let program_body = arena.alloc([Stmt::While(while_stmt)]);
    let program = Program::new(program_body, span());

    let checker = NoopChecker::new();
    let (chunk, errors, _exports) = jsc::compile(&checker, &program, jsc::CompileOptions::default());

    assert!(errors.is_empty());
    // Condition test, exit jump, the break itself, then the back-edge that
    // re-tests the condition.
    chunk.assert_opcodes(&[OpCode::LoadTrue, OpCode::JumpIfFalse, OpCode::Jump, OpCode::Jump]);
}

#[test]
fn let_declaration_binds_without_emitting_a_move() {
    let arena = Bump::new();
    let declarator =
        VarDeclarator { id: Pattern::Ident(Ident::new("x", span())), init: Some(num(&arena, 42.0)), span: span() };
    let decl = Stmt::VarDecl(VarDeclStmt { kind: VarDeclKind::Let, declarators: arena.alloc([declarator]), span: span() });
    let program = Program::new(arena.alloc([decl]), span());

    let checker = NoopChecker::new();
    let (chunk, errors, _exports) = jsc::compile(&checker, &program, jsc::CompileOptions::default());

    assert!(errors.is_empty());
    // A terminal identifier binding keeps the register the initializer's
    // value already landed in, so no separate Move is emitted.
    chunk.assert_opcodes(&[OpCode::LoadConst]);
}

#[test]
fn try_catch_records_one_exception_table_entry() {
    let arena = Bump::new();
    let throw_stmt = Stmt::Throw(ThrowStmt { argument: num(&arena, 1.0), span: span() });
    let try_block = Block { stmts: arena.alloc([throw_stmt]), span: span() };

    let catch_ident = arena.alloc(Expr::Ident(IdentExpr { ident: Ident::new("e", span()), span: span() }));
    let catch_return = Stmt::Return(ReturnStmt { value: Some(catch_ident), span: span() });
    let catch_block = Block { stmts: arena.alloc([catch_return]), span: span() };

    let try_stmt = arena.alloc(TryStmt {
        try_block,
        catch_param: Some(Pattern::Ident(Ident::new("e", span()))),
        catch_block: Some(catch_block),
        finally_block: None,
        span: span(),
    });
    let program = Program::new(arena.alloc([Stmt::Try(try_stmt)]), span());

    let checker = NoopChecker::new();
    let (chunk, errors, _exports) = jsc::compile(&checker, &program, jsc::CompileOptions::default());

    assert!(errors.is_empty());
    chunk.assert_contains_opcodes(&[OpCode::Throw, OpCode::Return]);
    assert_eq!(chunk.exception_table().len(), 1);
    let entry = &chunk.exception_table()[0];
    assert!(entry.is_catch);
    assert!(!entry.is_finally);
}

#[test]
fn try_finally_emits_handle_pending_and_a_finally_entry() {
    let arena = Bump::new();
    let try_block =
        Block { stmts: arena.alloc([Stmt::Throw(ThrowStmt { argument: num(&arena, 1.0), span: span() })]), span: span() };
    let finally_block = Block {
        stmts: arena.alloc([Stmt::Expr(ExprStmt { expr: num(&arena, 0.0), span: span() })]),
        span: span(),
    };

    let try_stmt = arena.alloc(TryStmt {
        try_block,
        catch_param: None,
        catch_block: None,
        finally_block: Some(finally_block),
        span: span(),
    });
    let program = Program::new(arena.alloc([Stmt::Try(try_stmt)]), span());

    let checker = NoopChecker::new();
    let (chunk, errors, _exports) = jsc::compile(&checker, &program, jsc::CompileOptions::default());

    assert!(errors.is_empty());
    chunk.assert_contains_opcodes(&[OpCode::Throw, OpCode::HandlePending]);
    assert_eq!(chunk.exception_table().len(), 1);
    assert!(chunk.exception_table()[0].is_finally);
}

#[test]
fn import_outside_module_mode_is_a_compile_error() {
    let arena = Bump::new();
    let import_decl =
        arena.alloc(ImportDecl { default: None, named: &[], namespace: None, source: "./mod.js", span: span() });
    let program = Program::new(arena.alloc([Stmt::Import(import_decl)]), span());

    let checker = NoopChecker::new();
    let options = jsc::CompileOptions { module_mode: false, ..Default::default() };
    let (_chunk, errors, _exports) = jsc::compile(&checker, &program, options);

    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], jsc::CompilationError::ImportExportOutsideModuleMode { .. }));
}

#[test]
fn export_default_in_module_mode_promotes_a_global() {
    let arena = Bump::new();
    let export_decl = arena.alloc(ExportDecl::Default { value: num(&arena, 7.0), span: span() });
    let program = Program::new(arena.alloc([Stmt::Export(export_decl)]), span());

    let checker = NoopChecker::new();
    let options = jsc::CompileOptions { module_mode: true, ..Default::default() };
    let (chunk, errors, _exports) = jsc::compile(&checker, &program, options);

    assert!(errors.is_empty());
    chunk.assert_contains_opcodes(&[OpCode::LoadConst, OpCode::SetGlobal]);
}
