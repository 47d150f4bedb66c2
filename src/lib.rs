//! Public entry point for the register-based bytecode compiler core.
//!
//! This crate has no lexer, parser, or type checker of its own — it wires
//! together [`jsc_ast`] (the node shapes), [`jsc_core`] (the
//! `TypeChecker` collaborator interface and diagnostics), and
//! [`jsc_compiler`] (lowering) into the one function most callers need:
//! [`compile`].

pub use jsc_compiler::bytecode::BytecodeChunk;
pub use jsc_core::{CompilationError, ModuleLoader, TypeHash};

use rustc_hash::FxHashMap;

use jsc_compiler::{Compiler, GlobalIndexMap};
use jsc_core::TypeChecker;

/// Compilation-wide configuration (source spec §3.3 "Configuration").
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    /// Enables `import`/`export` lowering (source spec §4.7 "Modules"). A
    /// script-mode compilation (`false`, the default) rejects either with
    /// [`CompilationError::ImportExportOutsideModuleMode`] instead of
    /// silently linking a module graph nothing asked for.
    pub module_mode: bool,
    /// Reserved for string-literal type identity, mirroring the grounding
    /// codebase's `Compiler::new` parameter of the same purpose. The
    /// current constant pool stores string literals untagged, so this is
    /// currently unused by lowering itself; it exists so a caller that does
    /// track a known string type has somewhere to put it without a later
    /// breaking signature change.
    pub string_type_hash: Option<TypeHash>,
}

/// Compile an already-parsed, already-type-checked program to bytecode
/// (source spec §6's documented external entry point).
///
/// `checker` supplies the type information the compiler core needs but
/// doesn't compute itself — per-expression computed types, resolved type
/// names, superclass constructor arity (source spec §6, "Type-checker
/// interface consumed by the compiler"). Lowering doesn't stop at the
/// first diagnosable error: it keeps compiling the rest of the program and
/// returns whatever chunk resulted, alongside every error collected along
/// the way, alongside a map from this module's export names to the global
/// slot each was promoted to (empty outside module mode, or for an export
/// the compiler never resolved a binding for).
///
/// This convenience entry point has no `export * from` enumeration
/// configured; a caller that needs it should drive
/// [`jsc_compiler::Compiler`] directly and call
/// [`jsc_compiler::Compiler::set_module_loader`] before
/// [`jsc_compiler::Compiler::compile_program`].
pub fn compile<'a, 'ast, TC>(
    checker: &'a TC,
    program: &'ast jsc_ast::Program<'ast>,
    options: CompileOptions,
) -> (BytecodeChunk, Vec<CompilationError>, FxHashMap<String, u16>)
where
    TC: TypeChecker<&'ast jsc_ast::Expr<'ast>>,
{
    let mut compiler = Compiler::new(checker, GlobalIndexMap::new(), options.module_mode);
    compiler.compile_program(program);
    compiler.finish_module()
}
