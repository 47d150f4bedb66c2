//! Literal, array, and object literal lowering (source spec §4.3 "Literals").

use jsc_ast::{ArrayElement, Expr, LiteralExpr, LiteralKind, ObjectExpr, ObjectProperty};
use jsc_core::TypeChecker;

use crate::bytecode::OpCode;
use crate::context::Compiler;
use crate::register::Register;

impl<'a, 'ast, TC> Compiler<'a, &'ast Expr<'ast>, TC>
where
    TC: TypeChecker<&'ast Expr<'ast>>,
{
    pub(super) fn compile_literal(&mut self, lit: &LiteralExpr<'ast>, hint: Register) -> Register {
        self.emitter().set_line(lit.span.line);
        match lit.kind {
            LiteralKind::Number(value) => self.emitter().emit_load_number(hint, value),
            LiteralKind::String(value) => self.emitter().emit_load_string(hint, value),
            LiteralKind::Boolean(value) => self.emitter().emit_load_bool(hint, value),
            LiteralKind::Null => self.emitter().emit_load_null(hint),
            LiteralKind::Undefined => self.emitter().emit_load_undefined(hint),
            LiteralKind::RegExp { pattern, flags } => self.emitter().emit_load_regex(hint, pattern, flags),
        }
        hint
    }

    pub(super) fn compile_array_literal(
        &mut self,
        array: &jsc_ast::ArrayExpr<'ast>,
        hint: Register,
    ) -> Register {
        self.emitter().set_line(array.span.line);
        self.emitter().emit(OpCode::NewArray);
        self.emitter().emit_byte(hint);
        self.emitter().emit_u16(array.elements.len() as u16);
        for element in array.elements {
            match element {
                Some(ArrayElement::Expr(expr)) => {
                    let value = self.compile_expr_fresh(expr);
                    self.emitter().emit(OpCode::ArrayPush);
                    self.emitter().emit_byte(hint);
                    self.emitter().emit_byte(value);
                    self.free(value);
                }
                Some(ArrayElement::Spread(expr)) => {
                    self.compile_array_spread_into(hint, expr);
                }
                None => {
                    // Elision: `[1, , 3]`. The VM's NewArray already sized
                    // the array; pushing `undefined` keeps indices aligned.
                    let hole = self.alloc();
                    self.emitter().emit_load_undefined(hole);
                    self.emitter().emit(OpCode::ArrayPush);
                    self.emitter().emit_byte(hint);
                    self.emitter().emit_byte(hole);
                    self.free(hole);
                }
            }
        }
        hint
    }

    /// Push every element a spread source yields onto an array under
    /// construction, using the iterator protocol (shared with destructuring
    /// rest collection).
    pub(crate) fn compile_array_spread_into(&mut self, array_reg: Register, source: &'ast Expr<'ast>) {
        let source_reg = self.compile_expr_fresh(source);
        let iter_reg = self.compile_get_iterator(source_reg);
        self.free(source_reg);
        self.compile_drain_iterator_into_array(iter_reg, array_reg);
        self.free(iter_reg);
    }

    pub(super) fn compile_object_literal(&mut self, object: &ObjectExpr<'ast>, hint: Register) -> Register {
        self.emitter().set_line(object.span.line);
        self.emitter().emit(OpCode::NewObject);
        self.emitter().emit_byte(hint);
        for property in object.properties {
            match property {
                ObjectProperty::KeyValue { key, value, .. } => {
                    let value_reg = self.compile_expr_fresh(value);
                    self.emit_set_prop_by_key(hint, key, value_reg);
                    self.free(value_reg);
                }
                ObjectProperty::Method { key, func, .. } => {
                    let (const_idx, free_symbols) = self.compile_function_literal(func, None);
                    let func_reg = self.emit_closure(const_idx, &free_symbols);
                    let name_idx = self.intern_property_key(key);
                    self.emitter().emit(OpCode::DefineMethod);
                    self.emitter().emit_byte(hint);
                    self.emitter().emit_u16(name_idx);
                    self.emitter().emit_byte(func_reg);
                    self.free(func_reg);
                }
                ObjectProperty::Getter { key, func, .. } => {
                    self.emit_accessor(hint, key, func, 0);
                }
                ObjectProperty::Setter { key, func, .. } => {
                    self.emit_accessor(hint, key, func, 1);
                }
                ObjectProperty::Spread { value, .. } => {
                    // No bulk "assign own properties" opcode exists; fall
                    // back to the shared runtime helper also used for
                    // object-rest-pattern destructuring.
                    let value_reg = self.compile_expr_fresh(value);
                    self.call_object_assign_helper(hint, value_reg);
                    self.free(value_reg);
                }
            }
        }
        hint
    }

    pub(crate) fn emit_accessor(
        &mut self,
        obj: Register,
        key: &jsc_ast::PropertyKey<'ast>,
        func: &'ast jsc_ast::FunctionDecl<'ast>,
        kind: u8,
    ) {
        let (const_idx, free_symbols) = self.compile_function_literal(func, None);
        let func_reg = self.emit_closure(const_idx, &free_symbols);
        let name_idx = self.intern_property_key(key);
        self.emitter().emit(OpCode::DefineAccessor);
        self.emitter().emit_byte(obj);
        self.emitter().emit_u16(name_idx);
        self.emitter().emit_byte(func_reg);
        self.emitter().emit_byte(kind);
        self.free(func_reg);
    }

    /// Intern a property key (literal or computed-and-evaluated) into the
    /// constant pool, returning its string constant index.
    pub(crate) fn intern_property_key(&mut self, key: &jsc_ast::PropertyKey<'ast>) -> u16 {
        match key {
            jsc_ast::PropertyKey::Ident(ident) => self.intern_string(ident.name),
            jsc_ast::PropertyKey::String(s, _) => self.intern_string(s),
            jsc_ast::PropertyKey::Number(n, _) => self.intern_string(&format_number_key(*n)),
            jsc_ast::PropertyKey::Computed(expr) => {
                // Best-effort: only literal computed keys can be interned at
                // compile time; anything else loses its dynamic value here.
                // Callers with a genuinely dynamic key use `GetIndex`/
                // `SetIndex` instead of going through this path.
                match expr {
                    Expr::Literal(LiteralExpr { kind: LiteralKind::String(s), .. }) => self.intern_string(s),
                    Expr::Literal(LiteralExpr { kind: LiteralKind::Number(n), .. }) => {
                        self.intern_string(&format_number_key(*n))
                    }
                    _ => self.intern_string(""),
                }
            }
        }
    }

    pub(crate) fn emit_set_prop_by_key(
        &mut self,
        obj: Register,
        key: &jsc_ast::PropertyKey<'ast>,
        value: Register,
    ) {
        if let jsc_ast::PropertyKey::Computed(expr) = key {
            if !matches!(
                expr,
                Expr::Literal(LiteralExpr { kind: LiteralKind::String(_) | LiteralKind::Number(_), .. })
            ) {
                let index_reg = self.compile_expr_fresh(expr);
                self.emitter().emit(OpCode::SetIndex);
                self.emitter().emit_byte(obj);
                self.emitter().emit_byte(index_reg);
                self.emitter().emit_byte(value);
                self.free(index_reg);
                return;
            }
        }
        let name_idx = self.intern_property_key(key);
        self.emitter().emit(OpCode::SetProp);
        self.emitter().emit_byte(obj);
        self.emitter().emit_u16(name_idx);
        self.emitter().emit_byte(value);
    }

    /// Add a string to the constant pool, returning its index.
    pub(crate) fn intern_string(&mut self, value: impl Into<String>) -> u16 {
        self.emitter().constants_mut().add_string(value.into()) as u16
    }
}

fn format_number_key(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() { format!("{}", n as i64) } else { n.to_string() }
}
