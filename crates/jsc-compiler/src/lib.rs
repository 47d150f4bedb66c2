//! Register-based bytecode compiler core.
//!
//! Lowers an already type-checked JS/TS AST to the bytecode a register-based
//! VM executes, per the data model and component design this crate is built
//! from (chunks, registers, symbol tables, the global index map, module
//! binding tables, and the compiler instance that ties them together).
//!
//! ## Modules
//!
//! - [`bytecode`]: the instruction set ([`bytecode::OpCode`]), compiled
//!   chunks ([`bytecode::BytecodeChunk`]), and the constant pool
//!   ([`bytecode::ConstantPool`]).
//! - [`register`]: the per-function register allocator.
//! - [`scope`]: lexical scope chains and symbol resolution within one
//!   function.
//! - [`globals`]: the process-wide global name-to-index table.
//! - [`module`]: import/export/re-export linkage for one module.
//! - [`emit`]: the low-level bytecode emitter, including break/continue
//!   jump bookkeeping.
//! - [`context`]: [`context::Compiler`], the instance every lowering
//!   function is threaded through.

pub mod bytecode;
pub mod context;
pub mod emit;
pub mod expr;
pub mod globals;
pub mod module;
pub mod pattern;
pub mod register;
pub mod scope;
pub mod stmt;

pub use context::{Compiler, FreeSymbol, IdentifierResolution};
pub use emit::{BreakError, BytecodeEmitter, JumpLabel, LoopCleanup};
pub use globals::GlobalIndexMap;
pub use module::{ImportBinding, ImportKind, ModuleBindings, ReExport};
pub use register::{BAD_REGISTER, MAX_REGISTER, NO_HINT, Register, RegisterAllocator};
pub use scope::{Resolution, ScopeStack, Symbol, SymbolFlags, SymbolLocation, SymbolTable};

pub use jsc_core::CompilationError;
