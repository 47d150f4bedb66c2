//! Bytecode emitter.
//!
//! The [`BytecodeEmitter`] is the low-level write surface every expression
//! and statement compiler goes through: it owns the constant pool (shared
//! across every function in a module, for deduplication), the table of
//! finished function chunks, and the current in-progress chunk. It also
//! hosts the [`JumpManager`] that tracks break/continue targets, so callers
//! never poke at [`BytecodeChunk`] offsets directly.
//!
//! `start_chunk()`/`finish_chunk()` nest: compiling a function expression or
//! arrow function while already inside another function's body pushes a new
//! chunk, and finishing it pops back to the enclosing one. This is what
//! lets closures be compiled depth-first as they're encountered in an
//! expression tree.

mod jumps;

use crate::bytecode::{BytecodeChunk, Constant, ConstantPool, OpCode};
use crate::register::Register;
pub use jumps::{BreakError, LoopCleanup};
use jumps::JumpManager;

/// A finished function body, ready to be referenced by a
/// [`Constant::Function`] entry and instantiated by `Closure`/hoisted
/// `GetGlobal` at runtime.
#[derive(Debug)]
pub struct CompiledFunctionEntry {
    pub name: String,
    pub chunk: BytecodeChunk,
    pub num_params: u8,
    pub num_upvalues: u8,
    pub max_registers: u8,
    pub is_generator: bool,
    pub is_async: bool,
    pub has_rest: bool,
}

/// A forward-jump placeholder awaiting a target (source spec §4.2 "Jump
/// displacement").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpLabel(pub(crate) usize);

impl JumpLabel {
    pub fn offset(&self) -> usize {
        self.0
    }
}

struct ChunkFrame {
    chunk: BytecodeChunk,
    jumps: JumpManager,
    current_line: u32,
    /// How many `finally` blocks of the current function are currently open
    /// (nested `try { } finally { }` inside another's `try`/`catch`). Callers
    /// don't currently branch on this directly; it exists so future
    /// diagnostics (and the `ReturnFinally`/`HandlePending` interaction with
    /// nested handlers) have a place to read it from.
    finally_depth: u32,
}

impl ChunkFrame {
    fn new() -> Self {
        Self { chunk: BytecodeChunk::new(), jumps: JumpManager::new(), current_line: 0, finally_depth: 0 }
    }
}

/// Owns every piece of output a module compilation produces.
pub struct BytecodeEmitter {
    constants: ConstantPool,
    compiled_functions: Vec<CompiledFunctionEntry>,
    /// Stack of in-progress chunks; the top is the one currently receiving
    /// emitted bytecode. Always non-empty while a chunk is open.
    frames: Vec<ChunkFrame>,
}

impl Default for BytecodeEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl BytecodeEmitter {
    pub fn new() -> Self {
        Self { constants: ConstantPool::new(), compiled_functions: Vec::new(), frames: Vec::new() }
    }

    /// Begin a new function chunk, nesting inside whatever chunk (if any) is
    /// already open.
    pub fn start_chunk(&mut self) {
        self.frames.push(ChunkFrame::new());
    }

    /// Finish the current chunk and return it without registering it as a
    /// [`CompiledFunctionEntry`] — used by the top-level module body, which
    /// has no function-constant slot of its own.
    #[track_caller]
    pub fn finish_chunk(&mut self) -> BytecodeChunk {
        self.frames.pop().expect("finish_chunk called with no open chunk").chunk
    }

    /// Finish the current chunk, register it as a compiled function, and
    /// return its index into [`Self::compiled_functions`] — this is also
    /// the index later wrapped in a [`Constant::Function`] for `Closure`
    /// to reference.
    #[track_caller]
    pub fn finish_function(
        &mut self,
        name: String,
        num_params: u8,
        num_upvalues: u8,
        max_registers: u8,
        is_generator: bool,
        is_async: bool,
        has_rest: bool,
    ) -> u32 {
        let chunk = self.finish_chunk();
        let index = self.compiled_functions.len() as u32;
        self.compiled_functions.push(CompiledFunctionEntry {
            name,
            chunk,
            num_params,
            num_upvalues,
            max_registers,
            is_generator,
            is_async,
            has_rest,
        });
        index
    }

    #[track_caller]
    fn frame(&mut self) -> &mut ChunkFrame {
        self.frames.last_mut().expect("no open chunk: call start_chunk() first")
    }

    #[track_caller]
    fn chunk(&mut self) -> &mut BytecodeChunk {
        &mut self.frame().chunk
    }

    pub fn current_chunk(&self) -> &BytecodeChunk {
        &self.frames.last().expect("no open chunk").chunk
    }

    pub fn set_line(&mut self, line: u32) {
        self.frame().current_line = line;
    }

    pub fn current_line(&self) -> u32 {
        self.frames.last().map(|f| f.current_line).unwrap_or(0)
    }

    // ------------------------------------------------------------------
    // Raw emission
    // ------------------------------------------------------------------

    pub fn emit(&mut self, op: OpCode) {
        let line = self.current_line();
        self.chunk().write_op(op, line);
    }

    pub fn emit_byte(&mut self, byte: u8) {
        let line = self.current_line();
        self.chunk().write_byte(byte, line);
    }

    pub fn emit_u16(&mut self, value: u16) {
        let line = self.current_line();
        self.chunk().write_u16(value, line);
    }

    // ------------------------------------------------------------------
    // Constants & literals
    // ------------------------------------------------------------------

    fn emit_load_const(&mut self, dest: Register, constant: Constant) {
        let idx = self.constants.add(constant);
        self.emit(OpCode::LoadConst);
        self.emit_byte(dest);
        self.emit_u16(idx as u16);
    }

    pub fn emit_load_number(&mut self, dest: Register, value: f64) {
        self.emit_load_const(dest, Constant::Number(ordered_float::OrderedFloat(value)));
    }

    pub fn emit_load_string(&mut self, dest: Register, value: impl Into<String>) {
        self.emit_load_const(dest, Constant::String(value.into()));
    }

    pub fn emit_load_regex(&mut self, dest: Register, pattern: impl Into<String>, flags: impl Into<String>) {
        self.emit_load_const(dest, Constant::Regex { pattern: pattern.into(), flags: flags.into() });
    }

    pub fn emit_load_null(&mut self, dest: Register) {
        self.emit(OpCode::LoadNull);
        self.emit_byte(dest);
    }

    pub fn emit_load_undefined(&mut self, dest: Register) {
        self.emit(OpCode::LoadUndefined);
        self.emit_byte(dest);
    }

    pub fn emit_load_bool(&mut self, dest: Register, value: bool) {
        self.emit(if value { OpCode::LoadTrue } else { OpCode::LoadFalse });
        self.emit_byte(dest);
    }

    pub fn emit_move(&mut self, dest: Register, src: Register) {
        if dest == src {
            return;
        }
        self.emit(OpCode::Move);
        self.emit_byte(dest);
        self.emit_byte(src);
    }

    // ------------------------------------------------------------------
    // Globals
    // ------------------------------------------------------------------

    pub fn emit_get_global(&mut self, dest: Register, index: u16) {
        self.emit(OpCode::GetGlobal);
        self.emit_byte(dest);
        self.emit_u16(index);
    }

    pub fn emit_set_global(&mut self, index: u16, src: Register) {
        self.emit(OpCode::SetGlobal);
        self.emit_u16(index);
        self.emit_byte(src);
    }

    // ------------------------------------------------------------------
    // Jumps & loop control
    // ------------------------------------------------------------------

    pub fn emit_jump(&mut self, op: OpCode) -> JumpLabel {
        let line = self.current_line();
        let offset = self.chunk().emit_jump(op, line);
        JumpLabel(offset)
    }

    pub fn patch_jump(&mut self, label: JumpLabel) {
        self.chunk().patch_jump(label.0);
    }

    /// Emit a backward jump straight to `target` (a loop's back-edge).
    pub fn emit_jump_back(&mut self, target: usize) {
        let line = self.current_line();
        self.chunk().emit_jump_to(OpCode::Jump, target, line);
    }

    pub fn current_offset(&self) -> usize {
        self.frames.last().map(|f| f.chunk.current_offset()).unwrap_or(0)
    }

    pub fn enter_loop(&mut self, continue_target: usize, label: Option<String>) {
        self.frame().jumps.enter_loop(continue_target, label);
    }

    pub fn set_loop_cleanup(&mut self, cleanup: LoopCleanup) {
        self.frame().jumps.set_loop_cleanup(cleanup);
    }

    pub fn set_completion_reg(&mut self, reg: Register) {
        self.frame().jumps.set_completion_reg(reg);
    }

    pub fn completion_reg(&mut self) -> Option<Register> {
        self.frame().jumps.completion_reg()
    }

    pub fn exit_loop(&mut self) -> Vec<JumpLabel> {
        self.frame().jumps.exit_loop()
    }

    pub fn enter_switch(&mut self, label: Option<String>) {
        self.frame().jumps.enter_switch(label);
    }

    pub fn exit_switch(&mut self) -> Vec<JumpLabel> {
        self.frame().jumps.exit_switch()
    }

    pub fn enter_labeled_block(&mut self, label: String) {
        self.frame().jumps.enter_labeled_block(label);
    }

    pub fn exit_labeled_block(&mut self) -> Vec<JumpLabel> {
        self.frame().jumps.exit_breakable()
    }

    pub fn in_loop(&mut self) -> bool {
        self.frame().jumps.in_loop()
    }

    pub fn in_switch(&mut self) -> bool {
        self.frame().jumps.in_switch()
    }

    pub fn in_breakable(&mut self) -> bool {
        self.frame().jumps.in_breakable()
    }

    pub fn set_continue_target(&mut self, target: usize) {
        self.frame().jumps.set_continue_target(target);
    }

    /// Emit a `break` (bare or labeled), recording the jump to patch once
    /// the target construct's end is known. Returns an error the caller
    /// surfaces as a compile error if there's no matching target.
    pub fn emit_break(&mut self, label: Option<&str>) -> Result<(), BreakError> {
        let cleanups = self.frame().jumps.cleanups_for_break(label)?;
        self.emit_loop_cleanups(&cleanups);
        let jump = self.emit_jump(OpCode::Jump);
        self.frame().jumps.add_break(label, jump)?;
        Ok(())
    }

    /// Emit a `continue` (bare or labeled).
    pub fn emit_continue(&mut self, label: Option<&str>) -> Result<(), BreakError> {
        let cleanups = self.frame().jumps.cleanups_for_continue(label)?;
        self.emit_loop_cleanups(&cleanups);
        let target = self.frame().jumps.continue_target(label)?;
        self.emit_jump_back(target);
        Ok(())
    }

    fn emit_loop_cleanups(&mut self, cleanups: &[LoopCleanup]) {
        for cleanup in cleanups {
            if let Some(reg) = cleanup.iterator_reg {
                self.emit(OpCode::TypeGuardIteratorReturn);
                self.emit_byte(reg);
            }
            if let Some(reg) = cleanup.binding_reg {
                self.emit(OpCode::CloseUpvalue);
                self.emit_byte(reg);
            }
        }
    }

    pub fn loop_depth(&mut self) -> usize {
        self.frame().jumps.loop_depth()
    }

    pub fn breakable_depth(&mut self) -> usize {
        self.frame().jumps.breakable_depth()
    }

    // ------------------------------------------------------------------
    // Return / throw
    // ------------------------------------------------------------------

    pub fn emit_return(&mut self, value: Register) {
        self.emit(OpCode::Return);
        self.emit_byte(value);
    }

    pub fn emit_return_undefined(&mut self) {
        self.emit(OpCode::ReturnUndefined);
    }

    pub fn emit_throw(&mut self, value: Register) {
        self.emit(OpCode::Throw);
        self.emit_byte(value);
    }

    // ------------------------------------------------------------------
    // Exception table
    // ------------------------------------------------------------------

    pub fn add_exception_entry(&mut self, entry: crate::bytecode::ExceptionHandlerEntry) {
        self.chunk().add_exception_entry(entry);
    }

    pub fn enter_finally(&mut self) {
        self.frame().finally_depth += 1;
    }

    pub fn exit_finally(&mut self) {
        self.frame().finally_depth -= 1;
    }

    pub fn finally_depth(&mut self) -> u32 {
        self.frame().finally_depth
    }

    // ------------------------------------------------------------------
    // Output accessors
    // ------------------------------------------------------------------

    pub fn constants_mut(&mut self) -> &mut ConstantPool {
        &mut self.constants
    }

    pub fn constants(&self) -> &ConstantPool {
        &self.constants
    }

    pub fn compiled_functions(&self) -> &[CompiledFunctionEntry] {
        &self.compiled_functions
    }

    /// Tear down the emitter, returning its accumulated output. Called once
    /// the top-level module chunk has been finished via
    /// [`Self::finish_chunk`].
    pub fn decompose(self) -> (ConstantPool, Vec<CompiledFunctionEntry>) {
        (self.constants, self.compiled_functions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_simple_sequence() {
        let mut emitter = BytecodeEmitter::new();
        emitter.start_chunk();
        emitter.set_line(1);
        emitter.emit_load_number(0, 42.0);
        emitter.emit_return(0);
        let chunk = emitter.finish_chunk();
        chunk.assert_opcodes(&[OpCode::LoadConst, OpCode::Return]);
    }

    #[test]
    fn nested_chunks_for_closures() {
        let mut emitter = BytecodeEmitter::new();
        emitter.start_chunk();
        emitter.emit_load_number(0, 1.0);

        emitter.start_chunk();
        emitter.emit_load_number(0, 2.0);
        let inner_idx = emitter.finish_function("inner".to_string(), 0, 0, 1, false, false, false);
        assert_eq!(inner_idx, 0);

        emitter.emit_return(0);
        let outer = emitter.finish_chunk();
        outer.assert_opcodes(&[OpCode::LoadConst, OpCode::Return]);
        assert_eq!(emitter.compiled_functions().len(), 1);
    }

    #[test]
    fn break_patches_to_loop_end() {
        let mut emitter = BytecodeEmitter::new();
        emitter.start_chunk();
        let loop_start = emitter.current_offset();
        emitter.enter_loop(loop_start, None);
        emitter.emit_break(None).unwrap();
        let breaks = emitter.exit_loop();
        assert_eq!(breaks.len(), 1);
        emitter.patch_jump(breaks[0]);
        let chunk = emitter.finish_chunk();
        chunk.assert_opcodes(&[OpCode::Jump]);
    }

    #[test]
    fn continue_jumps_backward() {
        let mut emitter = BytecodeEmitter::new();
        emitter.start_chunk();
        let loop_start = emitter.current_offset();
        emitter.enter_loop(loop_start, None);
        emitter.emit_continue(None).unwrap();
        emitter.exit_loop();
        let chunk = emitter.finish_chunk();
        chunk.assert_opcodes(&[OpCode::Jump]);
    }

    #[test]
    fn break_outside_loop_errors() {
        let mut emitter = BytecodeEmitter::new();
        emitter.start_chunk();
        assert!(emitter.emit_break(None).is_err());
    }

    #[test]
    fn loop_cleanup_emitted_before_break() {
        let mut emitter = BytecodeEmitter::new();
        emitter.start_chunk();
        let loop_start = emitter.current_offset();
        emitter.enter_loop(loop_start, None);
        emitter.set_loop_cleanup(LoopCleanup { iterator_reg: Some(4), binding_reg: Some(2) });
        emitter.emit_break(None).unwrap();
        emitter.exit_loop();
        let chunk = emitter.finish_chunk();
        chunk.assert_opcodes(&[OpCode::TypeGuardIteratorReturn, OpCode::CloseUpvalue, OpCode::Jump]);
    }
}
