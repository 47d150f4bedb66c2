//! Spans, diagnostics, and identity types shared by the compiler workspace.
//!
//! This crate has no dependency on the AST or the compiler itself — it is the
//! bottom of the dependency graph, providing the few primitives every other
//! crate in the workspace needs:
//!
//! - [`span`]: [`Span`], source location tracking for diagnostics.
//! - [`error`]: [`CompilationError`], the diagnosable-condition enum returned
//!   alongside an emitted chunk.
//! - [`ids`]: [`UnitId`], identifying a compilation unit.
//! - [`type_hash`]: [`TypeHash`], a deterministic identity hash for global
//!   names and generic instantiations.
//! - [`ty`]: the [`Type`]/[`TypeChecker`] collaborator interface the compiler
//!   queries while lowering an already type-checked AST.
//! - [`module_loader`]: [`ModuleLoader`], the collaborator interface
//!   `export * from` consults to enumerate a source module's export names.

pub mod error;
pub mod ids;
pub mod module_loader;
pub mod span;
pub mod ty;
pub mod type_hash;

pub use error::CompilationError;
pub use ids::UnitId;
pub use module_loader::ModuleLoader;
pub use span::Span;
pub use ty::{ObjectType, Program, PropertyInfo, Signature, Type, TypeChecker};
pub use type_hash::TypeHash;
