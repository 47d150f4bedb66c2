//! The module-loader collaborator interface (source spec §6 "Module
//! loader").
//!
//! The compiler never parses or evaluates another module itself, so `export
//! * from "mod"` — which must synthesize one re-export per name the source
//! module provides — needs an external collaborator to report those names at
//! compile time. [`ModuleLoader`] is that seam, mirroring how [`crate::TypeChecker`]
//! is the seam for type information: the compiler queries it, never
//! implements it.

/// Resolves a module specifier to the names it exports, relative to the
/// importing module (`referrer`).
///
/// Only `export * from` consults this trait — named/default imports and
/// exports resolve their bindings lazily at runtime via `EvalModule` +
/// `GetModuleExport` and never need to know another module's export names
/// ahead of time.
pub trait ModuleLoader {
    /// Export names `specifier` provides when imported from `referrer`, or
    /// `None` if the specifier can't be resolved.
    fn get_export_names(&self, specifier: &str, referrer: &str) -> Option<Vec<String>>;
}
