//! Composite lowering tests: larger hand-built programs that exercise
//! several statement/expression forms working together through the single
//! public [`jsc::compile`] entry point, rather than one construct in
//! isolation (that's what `unit_tests.rs` is for).

use bumpalo::Bump;
use jsc_ast::{
    ArrayElement, ArrayExpr, Argument, ArrowBody, ArrowExpr, Block, CallExpr, Expr, ExprStmt, ForBinding, ForOfStmt,
    Ident, IdentExpr, LiteralExpr, LiteralKind, Pattern, Program, ReturnStmt, Stmt, SwitchCase, SwitchStmt,
    VarDeclKind, VarDeclStmt, VarDeclarator,
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

fn ident_expr<'a>(arena: &'a Bump, name: &'a str) -> &'a Expr<'a> {
    arena.alloc(Expr::Ident(IdentExpr { ident: Ident::new(name, span()), span: span() }))
}

/// `for (const x of [1, 2, 3]) x;` — the right-hand side's own array
/// literal lowering, the `@@iterator`/`next` protocol dance, and the
/// per-iteration binding all run together here.
#[test]
fn for_of_over_an_array_literal_drives_the_iterator_protocol() {
    let arena = Bump::new();
    let elements = arena.alloc([
        Some(ArrayElement::Expr(num(&arena, 1.0))),
        Some(ArrayElement::Expr(num(&arena, 2.0))),
        Some(ArrayElement::Expr(num(&arena, 3.0))),
    ]);
    let array_expr = arena.alloc(ArrayExpr { elements, span: span() });
    let array: &Expr = arena.alloc(Expr::Array(array_expr));

    let body_expr = ident_expr(&arena, "x");
    let body = arena.alloc(Stmt::Expr(ExprStmt { expr: body_expr, span: span() }));

    let for_of = arena.alloc(ForOfStmt {
        left: ForBinding::Decl { kind: VarDeclKind::Const, pattern: Pattern::Ident(Ident::new("x", span())) },
        right: array,
        body,
        is_await: false,
        span: span(),
    });
    let program = Program::new(arena.alloc([Stmt::ForOf(for_of)]), span());

    let checker = NoopChecker::new();
    let (chunk, errors, _exports) = jsc::compile(&checker, &program, jsc::CompileOptions::default());

    assert!(errors.is_empty());
    // Array construction, then the `@@iterator`/`next` protocol calls
    // (each a `GetProp` + `CallMethod` pair), then the `done`/`value`
    // property reads that drive the loop.
    chunk.assert_contains_opcodes(&[
        OpCode::NewArray,
        OpCode::GetProp,
        OpCode::CallMethod,
        OpCode::GetProp,
        OpCode::CallMethod,
        OpCode::GetProp,
        OpCode::JumpIfFalse,
        OpCode::Jump,
        OpCode::GetProp,
    ]);
}

/// `switch (n) { case 1: return 10; case 2: return 20; default: return 0; }`
/// — a three-way dispatch chain, including the default fallthrough target.
#[test]
fn switch_with_a_default_dispatches_through_strict_eq_chain() {
    let arena = Bump::new();
    let discriminant = ident_expr(&arena, "n");

    let case_one = SwitchCase {
        test: Some(num(&arena, 1.0)),
        stmts: arena.alloc([Stmt::Return(ReturnStmt { value: Some(num(&arena, 10.0)), span: span() })]),
        span: span(),
    };
    let case_two = SwitchCase {
        test: Some(num(&arena, 2.0)),
        stmts: arena.alloc([Stmt::Return(ReturnStmt { value: Some(num(&arena, 20.0)), span: span() })]),
        span: span(),
    };
    let default_case = SwitchCase {
        test: None,
        stmts: arena.alloc([Stmt::Return(ReturnStmt { value: Some(num(&arena, 0.0)), span: span() })]),
        span: span(),
    };

    let switch_stmt =
        arena.alloc(SwitchStmt { discriminant, cases: arena.alloc([case_one, case_two, default_case]), span: span() });
    let program = Program::new(arena.alloc([Stmt::Switch(switch_stmt)]), span());

    let checker = NoopChecker::new();
    let (chunk, errors, _exports) = jsc::compile(&checker, &program, jsc::CompileOptions::default());

    assert!(errors.is_empty());
    // Two `StrictEq` tests (one per non-default case) each followed by a
    // `JumpIfFalse`/`Jump` pair, then three `Return`s for the three bodies.
    chunk.assert_contains_opcodes(&[
        OpCode::StrictEq,
        OpCode::JumpIfFalse,
        OpCode::Jump,
        OpCode::StrictEq,
        OpCode::JumpIfFalse,
        OpCode::Jump,
        OpCode::Return,
        OpCode::Return,
        OpCode::Return,
    ]);
}

/// `function outer(a) { return () => a; }` followed by a call to `outer`
/// — exercises closure literal compilation, free-variable capture into an
/// upvalue, and a call site in the same program.
#[test]
fn nested_arrow_closes_over_the_enclosing_parameter() {
    let arena = Bump::new();

    let arrow_expr = arena.alloc(ArrowExpr {
        params: &[],
        body: ArrowBody::Expr(ident_expr(&arena, "a")),
        is_async: false,
        span: span(),
    });
    let arrow: &Expr = arena.alloc(Expr::Arrow(arrow_expr));
    let outer_body = Block { stmts: arena.alloc([Stmt::Return(ReturnStmt { value: Some(arrow), span: span() })]), span: span() };

    let param = jsc_ast::Param {
        pattern: Pattern::Ident(Ident::new("a", span())),
        default: None,
        is_rest: false,
        is_this_param: false,
        span: span(),
    };
    let outer_fn = arena.alloc(jsc_ast::FunctionDecl {
        name: Some(Ident::new("outer", span())),
        params: arena.alloc([param]),
        body: outer_body,
        is_async: false,
        is_generator: false,
        span: span(),
    });

    let call_expr = arena.alloc(CallExpr {
        callee: ident_expr(&arena, "outer"),
        args: arena.alloc([Argument::Expr(num(&arena, 5.0))]),
        optional: false,
        span: span(),
    });
    let call: &Expr = arena.alloc(Expr::Call(call_expr));
    let call_stmt = Stmt::Expr(ExprStmt { expr: call, span: span() });

    let program = Program::new(arena.alloc([Stmt::Function(outer_fn), call_stmt]), span());

    let checker = NoopChecker::new();
    let (chunk, errors, _exports) = jsc::compile(&checker, &program, jsc::CompileOptions::default());

    assert!(errors.is_empty());
    // The top level only ever sees the hoisted function's closure creation
    // and the later call; the arrow's own body compiles into a separate
    // function-table entry, not inline here.
    chunk.assert_contains_opcodes(&[OpCode::Closure, OpCode::Call]);
}

/// `let total = 0; for (const k of [1, 2]) { total = total + k; }` followed
/// by a `const` re-declaration attempt inside the loop body is rejected —
/// a destructuring/TDZ edge case combined with the iteration machinery.
#[test]
fn let_rebound_inside_a_for_of_body_is_its_own_lexical_binding() {
    let arena = Bump::new();
    let declarator =
        VarDeclarator { id: Pattern::Ident(Ident::new("total", span())), init: Some(num(&arena, 0.0)), span: span() };
    let total_decl =
        Stmt::VarDecl(VarDeclStmt { kind: VarDeclKind::Let, declarators: arena.alloc([declarator]), span: span() });

    let elements = arena.alloc([Some(ArrayElement::Expr(num(&arena, 1.0))), Some(ArrayElement::Expr(num(&arena, 2.0)))]);
    let array_expr = arena.alloc(ArrayExpr { elements, span: span() });
    let array: &Expr = arena.alloc(Expr::Array(array_expr));

    let inner_declarator =
        VarDeclarator { id: Pattern::Ident(Ident::new("total", span())), init: Some(num(&arena, 9.0)), span: span() };
    let inner_decl = Stmt::VarDecl(VarDeclStmt {
        kind: VarDeclKind::Let,
        declarators: arena.alloc([inner_declarator]),
        span: span(),
    });
    let body = arena.alloc(Stmt::Block(Block { stmts: arena.alloc([inner_decl]), span: span() }));

    let for_of = arena.alloc(ForOfStmt {
        left: ForBinding::Decl { kind: VarDeclKind::Const, pattern: Pattern::Ident(Ident::new("k", span())) },
        right: array,
        body,
        is_await: false,
        span: span(),
    });

    let program = Program::new(arena.alloc([total_decl, Stmt::ForOf(for_of)]), span());

    let checker = NoopChecker::new();
    let (chunk, errors, _exports) = jsc::compile(&checker, &program, jsc::CompileOptions::default());

    // The inner `let total` is a fresh binding in its own block scope, not a
    // re-declaration conflict with the outer one — this should compile
    // cleanly rather than raising a redeclaration error.
    assert!(errors.is_empty());
    chunk.assert_contains_opcodes(&[OpCode::NewArray, OpCode::LoadConst]);
}
