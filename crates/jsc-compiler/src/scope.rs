//! Lexical scope and symbol resolution (source spec §3 "Symbol"/"Symbol
//! Table").
//!
//! A [`SymbolTable`] maps names to [`Symbol`]s and chains outward to its
//! enclosing scope. Resolution walks that chain; whether the defining table
//! turns out to be the current function's own table, an enclosing block
//! within the same function, or an outer function entirely determines
//! whether the compiler emits a plain register reference, a TDZ check, or
//! registers a free variable (source spec §4.3 "Identifier resolution").

use bitflags::bitflags;
use rustc_hash::FxHashMap;

use crate::register::Register;

bitflags! {
    /// Per-binding flags (source spec §3 "Symbol").
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SymbolFlags: u8 {
        /// Set on a named function expression's self-binding: the name is
        /// visible only inside the function body and can't be reassigned.
        const IMMUTABLE = 0b001;
        /// `let`/`const` before its declarator has run; referencing it is a
        /// runtime TDZ error.
        const TDZ = 0b010;
        /// `const` — reassignment is a compile-time error the type checker
        /// is responsible for catching; the compiler only threads the flag
        /// through so future callers can see it.
        const CONST = 0b100;
    }
}

/// Where a symbol's value lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolLocation {
    /// A register in the current function's frame.
    Local(Register),
    /// A slot in the global index map (source spec §3 "Heap Allocator").
    Global(u16),
    /// Reserved for a future spilled-register scheme; the allocator never
    /// spills today (register budget is 254 per function), but the symbol
    /// shape reserves the variant so callers can match exhaustively against
    /// source-spec §3's three location kinds without this crate needing a
    /// breaking change later.
    Spilled(u32),
}

/// A binding in a scope (source spec §3 "Symbol").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub location: SymbolLocation,
    pub flags: SymbolFlags,
}

impl Symbol {
    pub fn local(reg: Register) -> Self {
        Self { location: SymbolLocation::Local(reg), flags: SymbolFlags::empty() }
    }

    pub fn global(index: u16) -> Self {
        Self { location: SymbolLocation::Global(index), flags: SymbolFlags::empty() }
    }

    pub fn with_flags(mut self, flags: SymbolFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn is_immutable(&self) -> bool {
        self.flags.contains(SymbolFlags::IMMUTABLE)
    }

    pub fn is_tdz(&self) -> bool {
        self.flags.contains(SymbolFlags::TDZ)
    }

    pub fn is_const(&self) -> bool {
        self.flags.contains(SymbolFlags::CONST)
    }

    /// Clear the TDZ flag in place — called once the declarator that
    /// introduces this binding has actually run.
    pub fn clear_tdz(&mut self) {
        self.flags.remove(SymbolFlags::TDZ);
    }
}

/// A `with`-object descriptor (source spec §3 "Symbol Table").
#[derive(Debug, Clone)]
pub struct WithDescriptor {
    pub object_reg: Register,
    pub known_properties: Option<Vec<String>>,
}

/// One table in a function's block-nesting chain. Each function owns the
/// head of its own chain ([`ScopeStack`]); `enter_block`/`exit_block` pushes
/// and pops nested block scopes (an `if`/`for`/`{ }` body introducing its
/// own `let`/`const`). Crossing a *function* boundary (as opposed to a block
/// boundary) is tracked separately by the caller (see
/// [`crate::context::Compiler`]) — that's what turns a hit on an outer
/// table into a free-variable reference rather than a plain local.
#[derive(Debug)]
pub struct SymbolTable {
    bindings: FxHashMap<String, Symbol>,
    with_stack: Vec<WithDescriptor>,
    is_function_root: bool,
}

impl SymbolTable {
    pub fn new_function_root() -> Self {
        Self { bindings: FxHashMap::default(), with_stack: Vec::new(), is_function_root: true }
    }

    pub fn new_block() -> Self {
        Self { bindings: FxHashMap::default(), with_stack: Vec::new(), is_function_root: false }
    }

    pub fn is_function_root(&self) -> bool {
        self.is_function_root
    }

    /// Define a binding in this table, overwriting any existing binding of
    /// the same name in this exact table (shadowing in an outer table is
    /// unaffected — that's a different `SymbolTable` instance).
    pub fn define(&mut self, name: impl Into<String>, symbol: Symbol) {
        self.bindings.insert(name.into(), symbol);
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.bindings.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.bindings.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn push_with(&mut self, desc: WithDescriptor) {
        self.with_stack.push(desc);
    }

    pub fn pop_with(&mut self) -> Option<WithDescriptor> {
        self.with_stack.pop()
    }

    pub fn with_stack(&self) -> &[WithDescriptor] {
        &self.with_stack
    }
}

/// A stack of [`SymbolTable`]s for one function, innermost last. The first
/// (index 0) table is always the function's own root scope.
#[derive(Debug)]
pub struct ScopeStack {
    tables: Vec<SymbolTable>,
}

/// The outcome of resolving a name within one function's scope stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Found(Symbol),
    NotFound,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self { tables: vec![SymbolTable::new_function_root()] }
    }

    pub fn enter_block(&mut self) {
        self.tables.push(SymbolTable::new_block());
    }

    pub fn exit_block(&mut self) -> SymbolTable {
        assert!(self.tables.len() > 1, "exit_block called on the function root scope");
        self.tables.pop().unwrap()
    }

    pub fn define(&mut self, name: impl Into<String>, symbol: Symbol) {
        self.tables.last_mut().unwrap().define(name, symbol);
    }

    /// Define in the function's root table regardless of current block
    /// depth — used for `var` (function-scoped) and hoisted function
    /// declarations.
    pub fn define_in_root(&mut self, name: impl Into<String>, symbol: Symbol) {
        self.tables[0].define(name, symbol);
    }

    /// Resolve a name by walking this function's scope stack innermost-out.
    /// Does not cross into an enclosing function — that's the caller's job
    /// (source spec §4.3 steps 4/5: found-locally vs found-in-outer-table).
    pub fn resolve(&self, name: &str) -> Resolution {
        for table in self.tables.iter().rev() {
            if let Some(sym) = table.get(name) {
                return Resolution::Found(*sym);
            }
        }
        Resolution::NotFound
    }

    pub fn resolve_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        for table in self.tables.iter_mut().rev() {
            if table.contains(name) {
                return table.get_mut(name);
            }
        }
        None
    }

    pub fn current(&mut self) -> &mut SymbolTable {
        self.tables.last_mut().unwrap()
    }

    pub fn depth(&self) -> usize {
        self.tables.len()
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_finds_innermost_shadow() {
        let mut stack = ScopeStack::new();
        stack.define("x", Symbol::local(0));
        stack.enter_block();
        stack.define("x", Symbol::local(5));
        assert_eq!(stack.resolve("x"), Resolution::Found(Symbol::local(5)));
        stack.exit_block();
        assert_eq!(stack.resolve("x"), Resolution::Found(Symbol::local(0)));
    }

    #[test]
    fn resolve_not_found() {
        let stack = ScopeStack::new();
        assert_eq!(stack.resolve("missing"), Resolution::NotFound);
    }

    #[test]
    fn define_in_root_survives_block_exit() {
        let mut stack = ScopeStack::new();
        stack.enter_block();
        stack.define_in_root("v", Symbol::local(2));
        stack.exit_block();
        assert_eq!(stack.resolve("v"), Resolution::Found(Symbol::local(2)));
    }

    #[test]
    fn tdz_flag_clears() {
        let mut sym = Symbol::local(0).with_flags(SymbolFlags::TDZ);
        assert!(sym.is_tdz());
        sym.clear_tdz();
        assert!(!sym.is_tdz());
    }

    #[test]
    fn with_stack_push_pop() {
        let mut table = SymbolTable::new_block();
        table.push_with(WithDescriptor { object_reg: 3, known_properties: None });
        assert_eq!(table.with_stack().len(), 1);
        let popped = table.pop_with().unwrap();
        assert_eq!(popped.object_reg, 3);
    }

    #[test]
    fn block_root_distinction() {
        let root = SymbolTable::new_function_root();
        let block = SymbolTable::new_block();
        assert!(root.is_function_root());
        assert!(!block.is_function_root());
    }
}
