//! Performance benchmarks for the bytecode lowering pipeline.
//!
//! This workspace has no lexer or parser, so every benchmark here compiles a
//! hand-synthesized `jsc_ast::Program` rather than source text:
//! - Size-based: small to stress-test programs (tens to thousands of statements)
//! - Feature-specific: functions, classes, control flow, try/catch
//! - Complexity: wide (many top-level items) vs. deep (nested blocks)
//!
//! When run with the `profile-with-puffin` feature, [`jsc_compiler`]'s own
//! `profiling` spans are also collected and can be analyzed separately.

use bumpalo::Bump;
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

use jsc_ast::{
    Block, ClassBody, ClassDecl, ClassMember, Expr, ExprStmt, FunctionDecl, Ident, IfStmt, LiteralExpr, LiteralKind,
    MethodKind, MethodMember, Pattern, Program, PropertyKey, ReturnStmt, Stmt, ThrowStmt, TryStmt, VarDeclKind,
    VarDeclStmt, VarDeclarator, WhileStmt,
};
use jsc_core::ty::Program as TypeProgram;
use jsc_core::{Span, Type, TypeChecker};

struct NoProgram;

impl TypeProgram for NoProgram {
    fn superclass_arity(&self, _class_name: &str) -> Option<usize> {
        None
    }
}

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

/// `let v0 = 0; let v1 = 1; ... let v{n-1} = n-1;`
fn program_of_let_decls(arena: &Bump, n: usize) -> Program<'_> {
    let mut stmts = Vec::with_capacity(n);
    for i in 0..n {
        let name = arena.alloc_str(&format!("v{i}"));
        let declarator =
            VarDeclarator { id: Pattern::Ident(Ident::new(name, span())), init: Some(num(arena, i as f64)), span: span() };
        stmts.push(Stmt::VarDecl(VarDeclStmt {
            kind: VarDeclKind::Let,
            declarators: arena.alloc([declarator]),
            span: span(),
        }));
    }
    Program::new(arena.alloc_slice_copy(&stmts), span())
}

/// `n` independent top-level functions, each returning a literal.
fn program_of_functions(arena: &Bump, n: usize) -> Program<'_> {
    let mut stmts = Vec::with_capacity(n);
    for i in 0..n {
        let name = arena.alloc_str(&format!("fn{i}"));
        let body = Block {
            stmts: arena.alloc([Stmt::Return(ReturnStmt { value: Some(num(arena, i as f64)), span: span() })]),
            span: span(),
        };
        let func = arena.alloc(FunctionDecl {
            name: Some(Ident::new(name, span())),
            params: &[],
            body,
            is_async: false,
            is_generator: false,
            span: span(),
        });
        stmts.push(Stmt::Function(func));
    }
    Program::new(arena.alloc_slice_copy(&stmts), span())
}

/// `n` independent classes, each with one field and one method.
fn program_of_classes(arena: &Bump, n: usize) -> Program<'_> {
    let mut stmts = Vec::with_capacity(n);
    for i in 0..n {
        let class_name = arena.alloc_str(&format!("Class{i}"));
        let method_body = Block {
            stmts: arena.alloc([Stmt::Return(ReturnStmt { value: Some(num(arena, i as f64)), span: span() })]),
            span: span(),
        };
        let method_fn = arena.alloc(FunctionDecl {
            name: None,
            params: &[],
            body: method_body,
            is_async: false,
            is_generator: false,
            span: span(),
        });
        let method = ClassMember::Method(MethodMember {
            key: PropertyKey::Ident(Ident::new("value", span())),
            kind: MethodKind::Method,
            func: method_fn,
            is_static: false,
            is_private: false,
            span: span(),
        });
        let body = ClassBody { members: arena.alloc([method]), span: span() };
        let decl = arena.alloc(ClassDecl { name: Ident::new(class_name, span()), super_class: None, body, span: span() });
        stmts.push(Stmt::Class(decl));
    }
    Program::new(arena.alloc_slice_copy(&stmts), span())
}

/// `n` sequential `if (true) { ... } else { ... }` statements — a wide
/// spread of independent branches rather than nested ones.
fn program_of_branches(arena: &Bump, n: usize) -> Program<'_> {
    let mut stmts = Vec::with_capacity(n);
    for i in 0..n {
        let then_branch = arena.alloc(Stmt::Expr(ExprStmt { expr: num(arena, i as f64), span: span() }));
        let else_branch = arena.alloc(Stmt::Expr(ExprStmt { expr: num(arena, -(i as f64)), span: span() }));
        let if_stmt = arena.alloc(IfStmt {
            condition: boolean(arena, i % 2 == 0),
            then_stmt: then_branch,
            else_stmt: Some(else_branch),
            span: span(),
        });
        stmts.push(Stmt::If(if_stmt));
    }
    Program::new(arena.alloc_slice_copy(&stmts), span())
}

/// A single `while` loop whose body is `depth` levels of nested `try`/
/// `catch`, each catch re-throwing — deep rather than wide.
fn program_of_deep_nesting(arena: &Bump, depth: usize) -> Program<'_> {
    let mut innermost = Stmt::Expr(ExprStmt { expr: num(arena, 0.0), span: span() });
    for _ in 0..depth {
        let throw_stmt = Stmt::Throw(ThrowStmt { argument: num(arena, 1.0), span: span() });
        let try_block = Block { stmts: arena.alloc([innermost, throw_stmt]), span: span() };
        let catch_block =
            Block { stmts: arena.alloc([Stmt::Expr(ExprStmt { expr: num(arena, 0.0), span: span() })]), span: span() };
        let try_stmt = arena.alloc(TryStmt {
            try_block,
            catch_param: Some(Pattern::Ident(Ident::new("e", span()))),
            catch_block: Some(catch_block),
            finally_block: None,
            span: span(),
        });
        innermost = Stmt::Try(try_stmt);
    }
    let body = arena.alloc(Stmt::Block(Block { stmts: arena.alloc([innermost]), span: span() }));
    let while_stmt = arena.alloc(WhileStmt { condition: boolean(arena, false), body, span: span() });
    Program::new(arena.alloc([Stmt::While(while_stmt)]), span())
}

fn compile_program<'ast>(program: &'ast Program<'ast>) {
    let checker = NoopChecker::new();
    let (chunk, errors, _exports) = jsc::compile(&checker, program, jsc::CompileOptions::default());
    black_box(errors.len());
    black_box(chunk);
}

/// Lowering throughput across program sizes (statement count).
fn size_based_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("compiler/program_sizes");

    for &n in &[10usize, 100, 1_000, 5_000] {
        let arena = Bump::new();
        let program = program_of_let_decls(&arena, n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("let_decls_{n}"), |b| {
            b.iter(|| compile_program(black_box(&program)));
        });
    }

    group.finish();
}

/// Lowering cost for specific declaration/control-flow shapes.
fn feature_specific_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("compiler/features");

    let arena = Bump::new();
    let many_functions = program_of_functions(&arena, 200);
    group.bench_function("many_functions", |b| {
        b.iter(|| compile_program(black_box(&many_functions)));
    });

    let arena = Bump::new();
    let many_classes = program_of_classes(&arena, 100);
    group.bench_function("many_classes", |b| {
        b.iter(|| compile_program(black_box(&many_classes)));
    });

    let arena = Bump::new();
    let branches = program_of_branches(&arena, 200);
    group.bench_function("if_else_chain", |b| {
        b.iter(|| compile_program(black_box(&branches)));
    });

    group.finish();
}

/// Wide (many independent top-level items) vs. deep (nested try/catch
/// inside a loop) lowering.
fn complexity_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("compiler/complexity");

    let arena = Bump::new();
    let wide = program_of_functions(&arena, 500);
    group.bench_function("wide_many_items", |b| {
        b.iter(|| compile_program(black_box(&wide)));
    });

    let arena = Bump::new();
    let deep = program_of_deep_nesting(&arena, 50);
    group.bench_function("deep_nesting", |b| {
        b.iter(|| compile_program(black_box(&deep)));
    });

    group.finish();
}

criterion_group!(benches, size_based_benchmarks, feature_specific_benchmarks, complexity_benchmarks);

criterion_main!(benches);
