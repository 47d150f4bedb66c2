//! Bytecode types for the register-based VM.
//!
//! This module contains the core bytecode types:
//!
//! - [`OpCode`] - The instruction set for the VM
//! - [`BytecodeChunk`] and [`ExceptionHandlerEntry`] - compiled bytecode
//!   for a function, plus its try/catch/finally table
//! - [`Constant`] and [`ConstantPool`] - module-level constant storage

mod chunk;
mod constant;
mod opcode;

pub use chunk::{BytecodeChunk, ExceptionHandlerEntry};
pub use constant::{Constant, ConstantPool};
pub use opcode::OpCode;
