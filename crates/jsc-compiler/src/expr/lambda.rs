//! Function/closure/class synthesis (source spec §4.4).
//!
//! Three constructs share one machine here: a function literal becomes a
//! `(constant index, free-symbol list)` pair via [`Compiler::compile_function_literal`],
//! [`Compiler::emit_closure`] turns that pair into a runtime closure value, and
//! a class declaration/expression desugars to a constructor function plus a
//! prototype object built out of the same two primitives.

use jsc_core::{CompilationError, Span, TypeChecker};
use jsc_ast::{
    ArrowBody, ArrowExpr, ClassBody, ClassDecl, ClassExpr, ClassMember, Expr, FieldMember,
    FunctionDecl, Ident, MethodKind, MethodMember, Param,
};

use crate::bytecode::OpCode;
use crate::context::{Compiler, FreeSymbol};
use crate::register::{BAD_REGISTER, Register};
use crate::scope::{Symbol, SymbolFlags};

impl<'a, 'ast, TC> Compiler<'a, &'ast Expr<'ast>, TC>
where
    TC: TypeChecker<&'ast Expr<'ast>>,
{
    /// Compile a function literal's body into its own chunk, returning the
    /// function-table index and the free symbols it closed over (source
    /// spec §4.4 "Function literal compilation", steps 1–9). The caller
    /// turns these into a runtime value via [`Self::emit_closure`].
    pub(crate) fn compile_function_literal(
        &mut self,
        func: &'ast FunctionDecl<'ast>,
        name: Option<&str>,
    ) -> (u32, Vec<FreeSymbol>) {
        self.enter_function(name.map(str::to_string));

        // A named function literal binds its own name in its own root scope
        // pointing at the sentinel register (step 3). A reference to it from
        // directly inside the body resolves as `Local` with that sentinel
        // and is rewritten into a self-capturing upvalue — see
        // `identifiers::compile_ident_read`.
        if let Some(name) = name {
            self.define(name, Symbol::local(BAD_REGISTER).with_flags(SymbolFlags::IMMUTABLE));
        }

        let (arity, has_rest) = self.bind_params(func.params);
        self.compile_block(&func.body);
        // Safety net: a function whose body falls off the end without an
        // explicit `return` yields `undefined` (step 8).
        self.emitter().emit_return_undefined();

        self.exit_function(name.unwrap_or_default().to_string(), arity, func.is_generator, func.is_async, has_rest)
    }

    fn compile_arrow_literal(&mut self, arrow: &'ast ArrowExpr<'ast>) -> (u32, Vec<FreeSymbol>) {
        // Arrows never bind their own name, `this`, or `arguments` — nothing
        // here parallels the self-recursion sentinel.
        self.enter_function(None);
        let (arity, has_rest) = self.bind_params(arrow.params);
        match &arrow.body {
            ArrowBody::Expr(expr) => {
                let value = self.compile_expr_fresh(expr);
                self.emitter().emit_return(value);
                self.free(value);
            }
            ArrowBody::Block(block) => {
                self.compile_block(block);
                self.emitter().emit_return_undefined();
            }
        }
        self.exit_function(String::new(), arity, false, arrow.is_async, has_rest)
    }

    /// Allocate and bind a parameter list in declaration order, pinning each
    /// register against reuse (it may be captured by a nested closure) and
    /// applying default-value expressions (step 4). TypeScript `this`
    /// parameters are type-only and never receive a register. Returns the
    /// arity (excluding `this` and the rest parameter) and whether a rest
    /// parameter was declared.
    fn bind_params(&mut self, params: &'ast [Param<'ast>]) -> (u8, bool) {
        let mut arity = 0u8;
        let mut has_rest = false;
        for param in params {
            if param.is_this_param {
                continue;
            }
            let reg = self.alloc();
            self.pin(reg);
            self.compile_bind_pattern(&param.pattern, reg, SymbolFlags::empty());
            if param.is_rest {
                has_rest = true;
                continue;
            }
            if let Some(default) = param.default {
                self.apply_pattern_default(default, reg);
            }
            arity += 1;
        }
        (arity, has_rest)
    }

    /// Turn a compiled function (constant index + captured free symbols)
    /// into a runtime value (source spec §4.4 "Closure emission"). Zero
    /// upvalues collapses to a plain `LoadConst` — there's nothing for
    /// `Closure` to close over.
    pub(crate) fn emit_closure(&mut self, const_idx: u32, free_symbols: &[FreeSymbol]) -> Register {
        let dest = self.alloc();
        let pool_idx = self.emitter().constants_mut().add_function(const_idx);

        if free_symbols.is_empty() {
            self.emitter().emit(OpCode::LoadConst);
            self.emitter().emit_byte(dest);
            self.emitter().emit_u16(pool_idx as u16);
            return dest;
        }

        self.emitter().emit(OpCode::Closure);
        self.emitter().emit_byte(dest);
        self.emitter().emit_u16(pool_idx as u16);
        self.emitter().emit_byte(free_symbols.len() as u8);
        for free in free_symbols {
            // The self-name sentinel: the VM reads the closure register
            // itself once it exists, rather than some parent register.
            if free.is_local && free.index == BAD_REGISTER {
                self.emitter().emit_byte(1);
                self.emitter().emit_byte(dest);
            } else {
                self.emitter().emit_byte(free.is_local as u8);
                self.emitter().emit_byte(free.index);
            }
        }
        dest
    }

    pub(super) fn compile_function_expr(&mut self, func: &'ast FunctionDecl<'ast>, hint: Register) -> Register {
        self.emitter().set_line(func.span.line);
        let name = func.name.map(|ident| ident.name.to_string());
        let (const_idx, free_symbols) = self.compile_function_literal(func, name.as_deref());
        self.move_closure_into_hint(const_idx, &free_symbols, hint)
    }

    pub(super) fn compile_arrow(&mut self, arrow: &'ast ArrowExpr<'ast>, hint: Register) -> Register {
        self.emitter().set_line(arrow.span.line);
        let (const_idx, free_symbols) = self.compile_arrow_literal(arrow);
        self.move_closure_into_hint(const_idx, &free_symbols, hint)
    }

    fn move_closure_into_hint(&mut self, const_idx: u32, free_symbols: &[FreeSymbol], hint: Register) -> Register {
        let reg = self.emit_closure(const_idx, free_symbols);
        if reg != hint {
            self.emitter().emit_move(hint, reg);
            self.free(reg);
        }
        hint
    }

    pub(super) fn compile_class_expr(&mut self, class: &'ast ClassExpr<'ast>, hint: Register) -> Register {
        self.emitter().set_line(class.span.line);
        self.compile_class(class.name, class.super_class, &class.body, class.span, hint)
    }

    /// `class Foo { ... }` as a statement — shares every step with the
    /// expression form; only the name's optionality differs at the AST
    /// level.
    pub(crate) fn compile_class_decl(&mut self, decl: &'ast ClassDecl<'ast>, hint: Register) -> Register {
        self.emitter().set_line(decl.span.line);
        self.compile_class(Some(decl.name), decl.super_class, &decl.body, decl.span, hint)
    }

    /// Desugar a class into a constructor function plus a prototype object
    /// (source spec §4.4 "Class declaration desugaring").
    fn compile_class(
        &mut self,
        name: Option<Ident<'ast>>,
        super_class: Option<&'ast Expr<'ast>>,
        body: &ClassBody<'ast>,
        span: Span,
        hint: Register,
    ) -> Register {
        // A block scope binds the class's own name to the sentinel register
        // for the duration of compiling its members, exactly like a named
        // function literal's self-binding — `static` methods referencing the
        // class by name resolve as an `Outer` hit into this scope and get
        // rewritten to the constructor's real register at closure time.
        self.enter_block();
        if let Some(name) = name {
            self.define(name.name, Symbol::local(BAD_REGISTER).with_flags(SymbolFlags::IMMUTABLE));
        }

        let parent = super_class.map(|expr| self.compile_expr_fresh(expr));

        let ctor_member = body.members.iter().find_map(|member| match member {
            ClassMember::Method(method) if method.kind == MethodKind::Constructor => Some(*method),
            _ => None,
        });
        let field_inits: Vec<FieldMember<'ast>> = body
            .members
            .iter()
            .filter_map(|member| match member {
                ClassMember::Field(field) if !field.is_static => Some(*field),
                _ => None,
            })
            .collect();

        let class_name = name.map(|n| n.name.to_string());
        let (ctor_const, ctor_free) =
            self.compile_constructor(class_name.as_deref(), parent.is_some(), ctor_member, &field_inits);
        let ctor_reg = self.emit_closure(ctor_const, &ctor_free);

        let proto_reg = self.build_prototype(super_class, parent, span);

        for member in body.members {
            match member {
                ClassMember::Method(method) if method.kind == MethodKind::Constructor => {}
                ClassMember::Method(method) => {
                    let target = if method.is_static { ctor_reg } else { proto_reg };
                    self.emit_class_method(target, method);
                }
                ClassMember::Field(field) if field.is_static => {
                    let value = match field.value {
                        Some(expr) => self.compile_expr_fresh(expr),
                        None => {
                            let reg = self.alloc();
                            self.emitter().emit_load_undefined(reg);
                            reg
                        }
                    };
                    self.emit_set_prop_by_key(ctor_reg, &field.key, value);
                    self.free(value);
                }
                ClassMember::Field(_) => {
                    // Non-static fields were already folded into the
                    // constructor as `this.name = expr` assignments.
                }
            }
        }

        let proto_name = self.intern_string("prototype");
        self.emitter().emit(OpCode::SetProp);
        self.emitter().emit_byte(ctor_reg);
        self.emitter().emit_u16(proto_name);
        self.emitter().emit_byte(proto_reg);

        let ctor_name = self.intern_string("constructor");
        self.emitter().emit(OpCode::SetProp);
        self.emitter().emit_byte(proto_reg);
        self.emitter().emit_u16(ctor_name);
        self.emitter().emit_byte(ctor_reg);

        self.free(proto_reg);
        if let Some(parent) = parent {
            self.free(parent);
        }
        self.exit_block();

        if ctor_reg != hint {
            self.emitter().emit_move(hint, ctor_reg);
            self.free(ctor_reg);
        }
        hint
    }

    fn emit_class_method(&mut self, target: Register, method: &MethodMember<'ast>) {
        match method.kind {
            MethodKind::Method => {
                let (const_idx, free_symbols) = self.compile_function_literal(method.func, None);
                let func_reg = self.emit_closure(const_idx, &free_symbols);
                let name_idx = self.intern_property_key(&method.key);
                self.emitter().emit(OpCode::DefineMethod);
                self.emitter().emit_byte(target);
                self.emitter().emit_u16(name_idx);
                self.emitter().emit_byte(func_reg);
                self.free(func_reg);
            }
            MethodKind::Getter => self.emit_accessor(target, &method.key, method.func, 0),
            MethodKind::Setter => self.emit_accessor(target, &method.key, method.func, 1),
            MethodKind::Constructor => unreachable!("constructor filtered out by the caller"),
        }
    }

    /// Build the prototype object: an instance of the parent (constructed
    /// with placeholder arguments matching its arity) for a derived class,
    /// or an empty object otherwise (source spec §4.4 step 4, and §9's first
    /// open question — an unavailable superclass arity is a compile error
    /// rather than a guessed fallback).
    fn build_prototype(&mut self, super_class: Option<&'ast Expr<'ast>>, parent: Option<Register>, span: Span) -> Register {
        let proto = self.alloc();
        let (Some(super_expr), Some(parent)) = (super_class, parent) else {
            self.emitter().emit(OpCode::NewObject);
            self.emitter().emit_byte(proto);
            return proto;
        };

        let class_name = match super_expr {
            Expr::Ident(ident) => Some(ident.ident.name),
            _ => None,
        };
        let Some(arity) = class_name.and_then(|n| self.superclass_arity(n)) else {
            let name = class_name.unwrap_or("<expr>").to_string();
            self.add_error(CompilationError::SuperclassArityUnavailable { name, span });
            self.emitter().emit(OpCode::NewObject);
            self.emitter().emit_byte(proto);
            return proto;
        };

        let block = self.alloc_contiguous(1 + arity);
        self.emitter().emit_move(block, parent);
        for i in 0..arity {
            self.emitter().emit_load_undefined(block + 1 + i as u8);
        }
        self.emitter().emit(OpCode::New);
        self.emitter().emit_byte(proto);
        self.emitter().emit_byte(block);
        self.emitter().emit_byte(arity as u8);
        for i in (0..=arity as u8).rev() {
            self.free(block + i);
        }
        proto
    }

    /// Compile the constructor function: the explicit `constructor` method
    /// if the class declares one, or a synthesized empty one otherwise.
    /// Instance field initializers (`this.name = expr`) are prepended to
    /// whichever body runs (source spec §4.4 step 1).
    fn compile_constructor(
        &mut self,
        name: Option<&str>,
        is_derived: bool,
        ctor_member: Option<MethodMember<'ast>>,
        field_inits: &[FieldMember<'ast>],
    ) -> (u32, Vec<FreeSymbol>) {
        let fn_name = name.map(|n| format!("{n}.constructor"));
        self.enter_function(fn_name.clone());
        if let Some(name) = name {
            self.define(name, Symbol::local(BAD_REGISTER).with_flags(SymbolFlags::IMMUTABLE));
        }
        if is_derived {
            self.enter_derived_constructor();
        }

        let (arity, has_rest) = match ctor_member {
            Some(method) => {
                let (arity, has_rest) = self.bind_params(method.func.params);
                self.compile_field_initializers(field_inits);
                self.compile_block(&method.func.body);
                (arity, has_rest)
            }
            None => {
                self.compile_field_initializers(field_inits);
                (0, false)
            }
        };
        self.emitter().emit_return_undefined();
        self.exit_function(fn_name.unwrap_or_else(|| "constructor".to_string()), arity, false, false, has_rest)
    }

    fn compile_field_initializers(&mut self, field_inits: &[FieldMember<'ast>]) {
        for field in field_inits {
            let Some(value_expr) = field.value else { continue };
            let this = self.alloc();
            self.emitter().emit(OpCode::GetThis);
            self.emitter().emit_byte(this);
            let value = self.compile_expr_fresh(value_expr);
            self.emit_set_prop_by_key(this, &field.key, value);
            self.free(value);
            self.free(this);
        }
    }
}
