//! Module binding table (source spec §3 "Module Binding Table", §4.7
//! "Module linkage").
//!
//! Tracks how a module's local names relate to imports from other modules
//! and to the names the module itself exports, so `import`/`export`
//! declarations lower to plain [`crate::globals::GlobalIndexMap`] lookups
//! rather than a runtime module-resolution step.

use rustc_hash::FxHashMap;

/// Where an imported local name actually comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportKind {
    /// `import { foo } from "mod"` / `import { foo as bar } from "mod"`.
    Named { source_name: String },
    /// `import def from "mod"`.
    Default,
    /// `import * as ns from "mod"`.
    Namespace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub source_module: String,
    pub kind: ImportKind,
}

/// Per-module import/export linkage.
///
/// `exports` maps an export name to the *local* name it aliases, so
/// `export { a as b }` records `b -> a` and a plain `export { a }` records
/// the identity `a -> a`. Re-exports (`export { a } from "mod"` and
/// `export * from "mod"`) don't go through a local binding at all; they're
/// tracked separately so the driver can resolve them against the source
/// module's own export table once both are compiled.
#[derive(Debug, Default)]
pub struct ModuleBindings {
    imports: FxHashMap<String, ImportBinding>,
    exports: FxHashMap<String, String>,
    reexports: Vec<ReExport>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReExport {
    pub exported_name: Option<String>,
    pub source_name: Option<String>,
    pub source_module: String,
}

impl ModuleBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_import(&mut self, local_name: impl Into<String>, binding: ImportBinding) {
        self.imports.insert(local_name.into(), binding);
    }

    pub fn import(&self, local_name: &str) -> Option<&ImportBinding> {
        self.imports.get(local_name)
    }

    pub fn add_export(&mut self, export_name: impl Into<String>, local_name: impl Into<String>) {
        self.exports.insert(export_name.into(), local_name.into());
    }

    pub fn export_local_name(&self, export_name: &str) -> Option<&str> {
        self.exports.get(export_name).map(String::as_str)
    }

    pub fn exports(&self) -> impl Iterator<Item = (&str, &str)> {
        self.exports.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn add_reexport(&mut self, reexport: ReExport) {
        self.reexports.push(reexport);
    }

    pub fn reexports(&self) -> &[ReExport] {
        &self.reexports
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_import_round_trips() {
        let mut bindings = ModuleBindings::new();
        bindings.add_import(
            "bar",
            ImportBinding {
                source_module: "./foo.js".to_string(),
                kind: ImportKind::Named { source_name: "foo".to_string() },
            },
        );
        let found = bindings.import("bar").unwrap();
        assert_eq!(found.source_module, "./foo.js");
        assert_eq!(found.kind, ImportKind::Named { source_name: "foo".to_string() });
    }

    #[test]
    fn plain_export_is_identity() {
        let mut bindings = ModuleBindings::new();
        bindings.add_export("a", "a");
        assert_eq!(bindings.export_local_name("a"), Some("a"));
    }

    #[test]
    fn aliased_export_maps_to_local() {
        let mut bindings = ModuleBindings::new();
        bindings.add_export("b", "a");
        assert_eq!(bindings.export_local_name("b"), Some("a"));
    }

    #[test]
    fn wildcard_reexport_has_no_names() {
        let mut bindings = ModuleBindings::new();
        bindings.add_reexport(ReExport {
            exported_name: None,
            source_name: None,
            source_module: "./utils.js".to_string(),
        });
        assert_eq!(bindings.reexports().len(), 1);
        assert!(bindings.reexports()[0].exported_name.is_none());
    }
}
