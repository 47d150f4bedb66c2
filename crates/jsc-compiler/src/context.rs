//! The compiler instance (source spec §3 "Compiler Instance").
//!
//! [`Compiler`] is the single struct every expression/statement lowering
//! function in this crate threads through: it owns the in-progress
//! [`BytecodeEmitter`], the function-nesting stack of register allocators
//! and scope chains, the error list, the shared [`GlobalIndexMap`], and a
//! reference to the external, already-type-checked program.
//!
//! Source-spec §3 describes a nested function literal as spawning a *child*
//! compiler instance linked back to its parent, with upvalue resolution
//! walking "parent compiler symbol tables". This crate realizes that as a
//! stack of [`FunctionScope`] frames inside one `Compiler` rather than a
//! literal tree of parent-linked structs: it avoids a self-referential
//! lifetime between parent and child while preserving the exact behavior —
//! walking "the parent compiler's symbol table" is walking this stack one
//! level down from the top. The [`BytecodeEmitter`] mirrors the same shape
//! with its own chunk-frame stack, so the two stacks always move in lock
//! step: entering a function literal pushes both.

use rustc_hash::FxHashMap;

use jsc_core::{CompilationError, ModuleLoader, Program, Type, TypeChecker};

use crate::emit::BytecodeEmitter;
use crate::globals::GlobalIndexMap;
use crate::module::ModuleBindings;
use crate::register::{BAD_REGISTER, Register, RegisterAllocator};
use crate::scope::{ScopeStack, Symbol};

/// A captured outer-scope binding (source spec §3 "Free Symbol").
///
/// Recorded the first time an identifier resolves outside the current
/// function's own scope stack; at closure-emission time the accumulated
/// list becomes the `Closure` opcode's upvalue table (source spec §4.4
/// "Closures").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeSymbol {
    pub name: String,
    /// `true` if this upvalue closes directly over a register in the
    /// immediately enclosing function's frame; `false` if it closes over
    /// one of *that* function's own upvalues (a capture two or more levels
    /// up, threaded through rather than re-resolved).
    pub is_local: bool,
    /// Register index when `is_local`, upvalue index otherwise.
    pub index: u8,
}

/// One function body's worth of compiler state.
struct FunctionScope {
    scopes: ScopeStack,
    allocator: RegisterAllocator,
    free_symbols: Vec<FreeSymbol>,
    function_name: Option<String>,
    /// Register currently holding a given constant-pool slot within this
    /// function, so re-compiling the same literal doesn't re-emit
    /// `LoadConst` (source spec §3 "constant-register cache").
    constant_cache: FxHashMap<u32, Register>,
    /// Set while compiling a derived class's constructor; `super(...)` is
    /// only legal with this set (source spec §4.4, `SuperOutsideDerivedConstructor`).
    in_derived_constructor: bool,
}

impl FunctionScope {
    fn new(function_name: Option<String>) -> Self {
        Self {
            scopes: ScopeStack::new(),
            allocator: RegisterAllocator::new(),
            free_symbols: Vec::new(),
            function_name,
            constant_cache: FxHashMap::default(),
            in_derived_constructor: false,
        }
    }
}

/// Where an identifier resolved, from the perspective of the function
/// currently being compiled (source spec §4.3 "Identifier resolution").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierResolution {
    /// Found in the current function's own scope chain.
    Local(Symbol),
    /// Found in an enclosing function's scope chain; the caller must record
    /// a [`FreeSymbol`] and rewrite this into an upvalue reference.
    Outer(Symbol),
    /// Found in the global index map.
    Global(u16),
    /// Not found anywhere.
    Unresolved,
}

/// The compiler instance (source spec §3). Generic over the external
/// type-checked-program collaborator so this crate never depends on a
/// concrete checker implementation (source spec §6, "Type-checker interface
/// consumed by the compiler").
pub struct Compiler<'a, N, TC: TypeChecker<N>> {
    emitter: BytecodeEmitter,
    /// Stack of function-nesting frames, innermost last. Always non-empty
    /// once [`Self::new`] has run.
    functions: Vec<FunctionScope>,
    errors: Vec<CompilationError>,
    globals: GlobalIndexMap,
    module: ModuleBindings,
    module_mode: bool,
    checker: &'a TC,
    /// External collaborator consulted by `export * from` to enumerate a
    /// source module's export names, paired with this module's own
    /// specifier (the `referrer` a loader needs to resolve a relative
    /// import). `None` when the embedder never configured one; `export *
    /// from` reports [`CompilationError::ModuleLoaderUnavailable`] in that
    /// case rather than silently dropping the re-export.
    module_loader: Option<(&'a dyn ModuleLoader, String)>,
    _node: std::marker::PhantomData<N>,
}

impl<'a, N, TC: TypeChecker<N>> Compiler<'a, N, TC> {
    /// Start a root compilation: one module body, sharing `globals` with
    /// any sibling module compiled in the same pass (source spec §3
    /// "Heap Allocator... shared across every Compiler instance").
    ///
    /// `module_mode` gates `import`/`export` lowering (source spec §4.7): a
    /// script-mode compilation records [`CompilationError::ImportExportOutsideModuleMode`]
    /// for either and skips the binding bookkeeping, rather than silently
    /// linking a module graph a script-mode caller never asked for.
    pub fn new(checker: &'a TC, globals: GlobalIndexMap, module_mode: bool) -> Self {
        let mut compiler = Self {
            emitter: BytecodeEmitter::new(),
            functions: vec![FunctionScope::new(None)],
            errors: Vec::new(),
            globals,
            module: ModuleBindings::new(),
            module_mode,
            checker,
            module_loader: None,
            _node: std::marker::PhantomData,
        };
        compiler.emitter.start_chunk();
        compiler
    }

    /// Whether `import`/`export` declarations are permitted in this
    /// compilation (source spec §3.3 `CompileOptions::module_mode`).
    pub fn module_mode(&self) -> bool {
        self.module_mode
    }

    /// Configure the collaborator `export * from` consults to enumerate a
    /// source module's export names, and this module's own specifier (used
    /// as the `referrer` argument for relative-specifier resolution).
    pub fn set_module_loader(&mut self, loader: &'a dyn ModuleLoader, referrer: impl Into<String>) {
        self.module_loader = Some((loader, referrer.into()));
    }

    /// The configured module loader and this module's own specifier, if one
    /// was set via [`Self::set_module_loader`].
    pub fn module_loader(&self) -> Option<(&'a dyn ModuleLoader, String)> {
        self.module_loader.as_ref().map(|(loader, referrer)| (*loader, referrer.clone()))
    }

    // ------------------------------------------------------------------
    // Function nesting
    // ------------------------------------------------------------------

    /// Enter a nested function literal: pushes both a fresh chunk on the
    /// emitter and a fresh [`FunctionScope`], so the two stacks stay in
    /// lock step (source spec §3 ownership summary).
    pub fn enter_function(&mut self, name: Option<String>) {
        #[cfg(feature = "profiling")]
        profiling::scope!("compile_function");
        self.emitter.start_chunk();
        self.functions.push(FunctionScope::new(name));
    }

    /// Leave the current function literal, returning its compiled-function
    /// index and its accumulated free symbols (the caller turns these into
    /// the `Closure` opcode's upvalue list).
    ///
    /// # Panics
    /// Panics if called at the module's root frame — callers only invoke
    /// this after a matching [`Self::enter_function`].
    #[track_caller]
    pub fn exit_function(
        &mut self,
        name: String,
        num_params: u8,
        is_generator: bool,
        is_async: bool,
        has_rest: bool,
    ) -> (u32, Vec<FreeSymbol>) {
        assert!(
            self.functions.len() > 1,
            "exit_function called at the module root; no matching enter_function"
        );
        let scope = self.functions.pop().unwrap();
        let num_upvalues = scope.free_symbols.len() as u8;
        let max_registers = scope.allocator.max_regs();
        let index = self.emitter.finish_function(
            name,
            num_params,
            num_upvalues,
            max_registers,
            is_generator,
            is_async,
            has_rest,
        );
        (index, scope.free_symbols)
    }

    /// Finish the module's top-level chunk (the root frame pushed by
    /// [`Self::new`]), returning it along with every error collected and the
    /// export-name → global-slot map ([`Self::export_global_indices`]).
    ///
    /// `export_global_indices` is read before `self` is consumed so callers
    /// can actually retrieve it — this method is the only place `compile()`
    /// gives up ownership of the `Compiler`, so exposing the map any later
    /// would make it unreachable.
    ///
    /// # Panics
    /// Panics if any nested function scope is still open.
    #[track_caller]
    pub fn finish_module(
        mut self,
    ) -> (crate::bytecode::BytecodeChunk, Vec<CompilationError>, FxHashMap<String, u16>) {
        assert_eq!(
            self.functions.len(),
            1,
            "finish_module called with {} function scope(s) still open",
            self.functions.len()
        );
        let exports = self.export_global_indices().into_iter().collect();
        let chunk = self.emitter.finish_chunk();
        (chunk, self.errors, exports)
    }

    fn current_function(&self) -> &FunctionScope {
        self.functions.last().expect("function scope stack is never empty")
    }

    fn current_function_mut(&mut self) -> &mut FunctionScope {
        self.functions.last_mut().expect("function scope stack is never empty")
    }

    pub fn function_name(&self) -> Option<&str> {
        self.current_function().function_name.as_deref()
    }

    pub fn enter_derived_constructor(&mut self) {
        self.current_function_mut().in_derived_constructor = true;
    }

    pub fn in_derived_constructor(&self) -> bool {
        self.current_function().in_derived_constructor
    }

    // ------------------------------------------------------------------
    // Register allocation (delegates to the current function's allocator)
    // ------------------------------------------------------------------

    pub fn alloc(&mut self) -> Register {
        self.current_function_mut().allocator.alloc()
    }

    pub fn alloc_hinted(&mut self, hint: Register) -> Register {
        self.current_function_mut().allocator.alloc_hinted(hint)
    }

    pub fn alloc_contiguous(&mut self, n: usize) -> Register {
        self.current_function_mut().allocator.alloc_contiguous(n)
    }

    pub fn free(&mut self, r: Register) {
        self.current_function_mut().allocator.free(r);
    }

    pub fn pin(&mut self, r: Register) {
        self.current_function_mut().allocator.pin(r);
    }

    pub fn unpin(&mut self, r: Register) {
        self.current_function_mut().allocator.unpin(r);
    }

    pub fn is_pinned(&self, r: Register) -> bool {
        self.current_function().allocator.is_pinned(r)
    }

    // ------------------------------------------------------------------
    // Scope
    // ------------------------------------------------------------------

    pub fn enter_block(&mut self) {
        self.current_function_mut().scopes.enter_block();
    }

    pub fn exit_block(&mut self) {
        self.current_function_mut().scopes.exit_block();
    }

    pub fn define(&mut self, name: impl Into<String>, symbol: Symbol) {
        self.current_function_mut().scopes.define(name, symbol);
    }

    pub fn define_in_root(&mut self, name: impl Into<String>, symbol: Symbol) {
        self.current_function_mut().scopes.define_in_root(name, symbol);
    }

    /// Clear a binding's TDZ flag in the current function's scope chain —
    /// called once its `let`/`const` declarator has actually run.
    pub fn clear_tdz(&mut self, name: &str) {
        if let Some(sym) = self.current_function_mut().scopes.resolve_mut(name) {
            sym.clear_tdz();
        }
    }

    /// Resolve a name, walking the current function's own scope chain first,
    /// then each enclosing function's chain outward, and finally the global
    /// index map (source spec §4.3 "Identifier resolution" steps 4–7).
    ///
    /// A hit in an enclosing function does **not** record the free symbol
    /// itself — that requires knowing which intermediate functions the
    /// capture threads through, which is the caller's job once it decides
    /// to actually close over the binding (e.g. some resolutions, like a
    /// `typeof` check on an unresolved name, never need to).
    pub fn resolve(&self, name: &str) -> IdentifierResolution {
        if let crate::scope::Resolution::Found(sym) = self.current_function().scopes.resolve(name) {
            return IdentifierResolution::Local(sym);
        }
        for scope in self.functions[..self.functions.len() - 1].iter().rev() {
            if let crate::scope::Resolution::Found(sym) = scope.scopes.resolve(name) {
                return IdentifierResolution::Outer(sym);
            }
        }
        if let Some(index) = self.globals.get(name) {
            return IdentifierResolution::Global(index);
        }
        IdentifierResolution::Unresolved
    }

    /// Record a free-variable capture for the current function, reusing an
    /// existing entry by name if this identifier was already captured
    /// earlier in the same function body (source spec §4.4 "Closures").
    pub fn add_free_symbol(&mut self, name: impl Into<String>, is_local: bool, index: u8) -> u8 {
        let name = name.into();
        let scope = self.current_function_mut();
        if let Some(pos) = scope.free_symbols.iter().position(|f| f.name == name) {
            return pos as u8;
        }
        let upvalue_index = scope.free_symbols.len() as u8;
        scope.free_symbols.push(FreeSymbol { name, is_local, index });
        upvalue_index
    }

    pub fn free_symbols(&self) -> &[FreeSymbol] {
        &self.current_function().free_symbols
    }

    // ------------------------------------------------------------------
    // Constant-register cache
    // ------------------------------------------------------------------

    /// Register currently holding constant-pool slot `idx` within the
    /// current function, if any.
    pub fn cached_constant_register(&self, idx: u32) -> Option<Register> {
        self.current_function().constant_cache.get(&idx).copied()
    }

    pub fn cache_constant_register(&mut self, idx: u32, reg: Register) {
        self.current_function_mut().constant_cache.insert(idx, reg);
    }

    /// Invalidate the cache entry for `reg` if it's currently the cached
    /// home of some constant — called whenever `reg` is about to be
    /// overwritten by something else, so the cache never lies.
    pub fn invalidate_constant_cache_for(&mut self, reg: Register) {
        self.current_function_mut().constant_cache.retain(|_, cached| *cached != reg);
    }

    // ------------------------------------------------------------------
    // Globals & module bindings
    // ------------------------------------------------------------------

    pub fn globals(&mut self) -> &mut GlobalIndexMap {
        &mut self.globals
    }

    pub fn module(&mut self) -> &mut ModuleBindings {
        &mut self.module
    }

    pub fn module_ref(&self) -> &ModuleBindings {
        &self.module
    }

    /// Every export name this module declares, paired with the global slot
    /// its local binding was promoted to (source spec §4.7 "Module linkage"
    /// — exports are visible cross-module only once they have a global
    /// index). A name with no registered global at export time (e.g. an
    /// export referencing a binding the compiler never resolved) is skipped;
    /// [`crate::stmt::compile_export`] is responsible for having already
    /// recorded a [`jsc_core::CompilationError::UnknownNamedExport`] for that
    /// case.
    pub fn export_global_indices(&self) -> Vec<(String, u16)> {
        self.module
            .exports()
            .filter_map(|(export_name, local_name)| {
                self.globals.get(local_name).map(|idx| (export_name.to_string(), idx))
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Type checker
    // ------------------------------------------------------------------

    pub fn computed_type(&self, node: N) -> Option<Type> {
        self.checker.get_computed_type(node)
    }

    pub fn resolve_type(&self, name: &str) -> Option<Type> {
        self.checker.resolve_type(name)
    }

    pub fn program(&self) -> &TC::Program {
        self.checker.get_program()
    }

    pub fn superclass_arity(&self, class_name: &str) -> Option<usize> {
        self.program().superclass_arity(class_name)
    }

    // ------------------------------------------------------------------
    // Errors
    // ------------------------------------------------------------------

    pub fn add_error(&mut self, error: CompilationError) {
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[CompilationError] {
        &self.errors
    }

    // ------------------------------------------------------------------
    // Emitter passthrough
    // ------------------------------------------------------------------

    pub fn emitter(&mut self) -> &mut BytecodeEmitter {
        &mut self.emitter
    }
}

/// A register holding no meaningful value — returned by statement
/// compilation and by an unresolved identifier reference.
pub const NO_VALUE: Register = BAD_REGISTER;

#[cfg(test)]
mod tests {
    use super::*;
    use jsc_core::Span;

    struct FakeProgram;

    impl Program for FakeProgram {
        fn superclass_arity(&self, class_name: &str) -> Option<usize> {
            if class_name == "Base" { Some(2) } else { None }
        }
    }

    struct FakeChecker {
        program: FakeProgram,
    }

    impl TypeChecker<u32> for FakeChecker {
        type Program = FakeProgram;

        fn get_computed_type(&self, _node: u32) -> Option<Type> {
            None
        }

        fn resolve_type(&self, _name: &str) -> Option<Type> {
            None
        }

        fn get_program(&self) -> &FakeProgram {
            &self.program
        }
    }

    fn new_compiler(checker: &FakeChecker) -> Compiler<'_, u32, FakeChecker> {
        Compiler::new(checker, GlobalIndexMap::new(), true)
    }

    #[test]
    fn resolves_local_binding() {
        let checker = FakeChecker { program: FakeProgram };
        let mut compiler = new_compiler(&checker);
        compiler.define("x", Symbol::local(3));
        assert_eq!(compiler.resolve("x"), IdentifierResolution::Local(Symbol::local(3)));
    }

    #[test]
    fn resolves_outer_binding_across_function_boundary() {
        let checker = FakeChecker { program: FakeProgram };
        let mut compiler = new_compiler(&checker);
        compiler.define("x", Symbol::local(3));
        compiler.enter_function(Some("inner".to_string()));
        assert_eq!(compiler.resolve("x"), IdentifierResolution::Outer(Symbol::local(3)));
    }

    #[test]
    fn resolves_global_when_not_lexically_visible() {
        let checker = FakeChecker { program: FakeProgram };
        let mut compiler = new_compiler(&checker);
        let idx = compiler.globals().get_or_insert("g");
        assert_eq!(compiler.resolve("g"), IdentifierResolution::Global(idx));
    }

    #[test]
    fn unresolved_when_nowhere_found() {
        let checker = FakeChecker { program: FakeProgram };
        let compiler = new_compiler(&checker);
        assert_eq!(compiler.resolve("nope"), IdentifierResolution::Unresolved);
    }

    #[test]
    fn register_allocation_is_scoped_per_function() {
        let checker = FakeChecker { program: FakeProgram };
        let mut compiler = new_compiler(&checker);
        let outer_r0 = compiler.alloc();
        assert_eq!(outer_r0, 0);
        compiler.enter_function(None);
        let inner_r0 = compiler.alloc();
        assert_eq!(inner_r0, 0, "nested function gets its own register file starting at 0");
    }

    #[test]
    fn free_symbols_dedupe_by_name() {
        let checker = FakeChecker { program: FakeProgram };
        let mut compiler = new_compiler(&checker);
        compiler.enter_function(None);
        let a = compiler.add_free_symbol("x", true, 2);
        let b = compiler.add_free_symbol("x", true, 2);
        assert_eq!(a, b);
        assert_eq!(compiler.free_symbols().len(), 1);
    }

    #[test]
    fn exit_function_returns_captured_upvalues() {
        let checker = FakeChecker { program: FakeProgram };
        let mut compiler = new_compiler(&checker);
        compiler.enter_function(Some("inner".to_string()));
        compiler.add_free_symbol("y", true, 0);
        let (index, free) = compiler.exit_function("inner".to_string(), 0, false, false, false);
        assert_eq!(index, 0);
        assert_eq!(free.len(), 1);
        assert_eq!(free[0].name, "y");
    }

    #[test]
    fn superclass_arity_from_program() {
        let checker = FakeChecker { program: FakeProgram };
        let compiler = new_compiler(&checker);
        assert_eq!(compiler.superclass_arity("Base"), Some(2));
        assert_eq!(compiler.superclass_arity("Unknown"), None);
    }

    #[test]
    fn derived_constructor_flag_is_per_function() {
        let checker = FakeChecker { program: FakeProgram };
        let mut compiler = new_compiler(&checker);
        compiler.enter_derived_constructor();
        assert!(compiler.in_derived_constructor());
        compiler.enter_function(None);
        assert!(!compiler.in_derived_constructor(), "flag doesn't leak into a nested function");
    }

    #[test]
    fn finish_module_requires_all_functions_closed() {
        let checker = FakeChecker { program: FakeProgram };
        let compiler = new_compiler(&checker);
        let (chunk, errors, exports) = compiler.finish_module();
        assert!(chunk.is_empty());
        assert!(errors.is_empty());
        assert!(exports.is_empty());
    }

    #[test]
    fn finish_module_surfaces_export_global_indices() {
        let checker = FakeChecker { program: FakeProgram };
        let mut compiler = new_compiler(&checker);
        let idx = compiler.globals().get_or_insert("x");
        compiler.module().add_export("x", "x");
        let (_chunk, _errors, exports) = compiler.finish_module();
        assert_eq!(exports.get("x"), Some(&idx));
    }

    #[test]
    fn span_default_is_usable_in_errors() {
        let err = CompilationError::RestElementNotLast { span: Span::default() };
        assert_eq!(err.span(), Span::default());
    }
}
