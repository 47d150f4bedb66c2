//! Bytecode operation codes.
//!
//! This module defines the instruction set consumed by the (external) VM.
//! Each opcode is a single byte; operands follow inline, register operands
//! as a single byte each, constant-pool/global indices and jump offsets as
//! big-endian `u16`/`i16`.

/// Bytecode operation codes for the register-based VM.
///
/// Unlike a stack machine, operands name registers directly — most
/// instructions carry an explicit destination register rather than leaving
/// a result on an implicit stack top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    // =========================================================================
    // Constants & literals
    // =========================================================================
    /// Load constant from the pool.
    /// Operands: u8 dest, u16 constant index
    LoadConst = 0,
    /// Load `null`.
    /// Operands: u8 dest
    LoadNull,
    /// Load `undefined`.
    /// Operands: u8 dest
    LoadUndefined,
    /// Load `true`.
    /// Operands: u8 dest
    LoadTrue,
    /// Load `false`.
    /// Operands: u8 dest
    LoadFalse,

    // =========================================================================
    // Register movement
    // =========================================================================
    /// Copy a register's value into another register.
    /// Operands: u8 dest, u8 src
    Move,

    // =========================================================================
    // Arithmetic
    // =========================================================================
    /// Operands: u8 dest, u8 lhs, u8 rhs (unless noted)
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    /// Operands: u8 dest, u8 src
    Neg,

    // =========================================================================
    // Bitwise / shift
    // =========================================================================
    BitAnd,
    BitOr,
    BitXor,
    /// Operands: u8 dest, u8 src
    BitNot,
    Shl,
    Shr,
    Ushr,

    // =========================================================================
    // Comparison (produce bool)
    // =========================================================================
    /// Loose equality (`==`).
    Eq,
    /// Loose inequality (`!=`).
    Ne,
    /// Strict equality (`===`).
    StrictEq,
    /// Strict inequality (`!==`).
    StrictNe,
    Lt,
    Le,
    Gt,
    Ge,
    /// `in` operator: is `lhs` a property of object `rhs`.
    /// Operands: u8 dest, u8 lhs, u8 rhs
    In,
    /// `instanceof` operator. Operands: u8 dest, u8 lhs, u8 rhs
    Instanceof,

    // =========================================================================
    // Logical / unary
    // =========================================================================
    /// Logical NOT. Operands: u8 dest, u8 src
    Not,
    /// `typeof` operator. Operands: u8 dest, u8 src
    TypeOf,

    // =========================================================================
    // Type guards
    // =========================================================================
    /// Operands: u8 dest, u8 src
    IsNull,
    /// Operands: u8 dest, u8 src
    IsUndefined,
    /// Operands: u8 dest, u8 src
    IsNullish,
    /// Coerce to number. Operands: u8 dest, u8 src
    ToNumber,
    /// Checks the iterator in `src` for `done === false` and, if so, calls
    /// `.return()` and validates the result is an object. Used for
    /// destructuring and `for-of` abnormal-exit cleanup.
    /// Operands: u8 iterator reg
    TypeGuardIteratorReturn,
    /// Throws `TypeError("Cannot destructure 'null' or 'undefined'")` if
    /// `src` is nullish; a no-op otherwise. Emitted once per destructuring
    /// pattern, ahead of binding any of its elements.
    /// Operands: u8 src
    TypeGuardDestructureSource,
    /// Unconditionally throws `ReferenceError("Cannot access 'name' before
    /// initialization")`. Emitted in place of a normal read when the
    /// compiler statically determines a reference occurs before its
    /// `let`/`const` declarator has run (source glossary "TDZ").
    /// Operands: u16 name constant index
    ThrowTdzError,

    // =========================================================================
    // Property access
    // =========================================================================
    /// Operands: u8 dest, u8 obj, u16 name constant index
    GetProp,
    /// Operands: u8 obj, u16 name constant index, u8 value
    SetProp,
    /// Operands: u8 dest, u8 obj, u16 name constant index
    DeleteProp,
    /// `obj.#name`. Operands: u8 dest, u8 obj, u16 name constant index
    GetPrivateField,
    /// `super.prop`: looks up `prop` starting at the home object's parent
    /// prototype rather than `this`'s own prototype chain, so an override
    /// in the current class's own prototype is skipped (source spec
    /// REDESIGN: `super.method` dispatches through the parent prototype
    /// rather than being simplified to a `this.method` lookup).
    /// Operands: u8 dest, u8 this, u16 name constant index
    GetSuperProp,
    /// Operands: u8 obj, u16 name constant index, u8 value
    SetPrivateField,
    /// Attaches a method (from a closure register) onto an object under a
    /// property name. Operands: u8 obj, u16 name constant index, u8 func
    DefineMethod,
    /// Attaches a getter or setter. `kind`: 0 = getter, 1 = setter.
    /// Operands: u8 obj, u16 name constant index, u8 func, u8 kind
    DefineAccessor,
    /// Specialized `.length` fast path (array or string, per static type).
    /// Operands: u8 dest, u8 obj
    GetLength,

    // =========================================================================
    // Indexed access
    // =========================================================================
    /// Operands: u8 dest, u8 obj, u8 index
    GetIndex,
    /// Operands: u8 obj, u8 index, u8 value
    SetIndex,
    /// Operands: u8 dest, u8 obj, u8 index
    DeleteIndex,

    // =========================================================================
    // `this`
    // =========================================================================
    /// Operands: u8 dest
    GetThis,
    /// Operands: u8 src
    SetThis,

    // =========================================================================
    // Object/array construction
    // =========================================================================
    /// Allocate an empty array of known size hint. Operands: u8 dest, u16 size
    NewArray,
    /// Allocate an empty object. Operands: u8 dest
    NewObject,
    /// Append a value to an array (used for rest-collection push loops).
    /// Operands: u8 array, u8 value
    ArrayPush,
    /// String concatenation (template literals). Operands: u8 dest, u8 lhs, u8 rhs
    Concat,

    // =========================================================================
    // Calls
    // =========================================================================
    /// Operands: u8 dest, u8 func, u8 argc
    Call,
    /// Operands: u8 dest, u8 func, u8 this, u8 argc
    CallMethod,
    /// Tail-position call. Operands: u8 func, u8 argc
    TailCall,
    /// Tail-position method call. Operands: u8 func, u8 this, u8 argc
    TailCallMethod,
    /// Call with a single spread argument source. Operands: u8 dest, u8 func, u8 spread
    SpreadCall,
    /// Operands: u8 dest, u8 func, u8 this, u8 spread
    SpreadCallMethod,
    /// Operands: u8 dest, u8 func, u8 argc
    New,
    /// Operands: u8 dest, u8 func, u8 spread
    SpreadNew,

    // =========================================================================
    // Closures / upvalues
    // =========================================================================
    /// Construct a closure from a function constant and a trailing run of
    /// `(is_local: u8, index: u8)` upvalue-capture pairs.
    /// Operands: u8 dest, u16 constant index, u8 upvalue count,
    /// then `upvalue count` pairs of (u8, u8).
    Closure,
    /// Load a captured upvalue. Operands: u8 dest, u8 upvalue index
    LoadFree,
    /// Store into a captured upvalue. Operands: u8 upvalue index, u8 src
    SetUpvalue,
    /// Close the upvalue pointing at the given register (used once per
    /// `for`/`for-of` iteration so closures observe a fresh per-iteration
    /// binding). Operands: u8 register
    CloseUpvalue,

    // =========================================================================
    // Globals
    // =========================================================================
    /// Operands: u8 dest, u16 global index
    GetGlobal,
    /// Operands: u16 global index, u8 src
    SetGlobal,
    /// Operands: u8 dest, u16 global index
    DeleteGlobal,

    // =========================================================================
    // Control flow
    // =========================================================================
    /// Unconditional jump. Operand: i16 offset (big-endian), relative to the
    /// byte immediately after the offset.
    Jump,
    /// Operands: u8 cond, i16 offset
    JumpIfFalse,
    /// Operands: u8 reg, i16 offset
    JumpIfNull,
    /// Operands: u8 reg, i16 offset
    JumpIfUndefined,
    /// Operands: u8 reg, i16 offset
    JumpIfNullish,
    /// Operand: u8 value register
    Return,
    /// No operands; returns `undefined`.
    ReturnUndefined,
    /// Resumes a pending return/throw/break/continue after a `finally`
    /// block runs to completion normally.
    ReturnFinally,
    /// Re-raises a pending exception after a `finally` block if one was
    /// in flight when the handler was entered.
    HandlePending,
    /// Operand: u8 value register
    Throw,

    // =========================================================================
    // Coroutines
    // =========================================================================
    /// Operands: u8 value register, u8 sent-value destination register
    Yield,
    /// Operands: u8 dest, u8 promise register
    Await,
    /// Creates a generator object instead of invoking the function body
    /// directly. Operands: u8 dest, u8 func, u8 argc
    CreateGenerator,

    // =========================================================================
    // Modules
    // =========================================================================
    /// Operand: u16 module-specifier constant index
    EvalModule,
    /// Operands: u8 dest, u16 module constant, u16 export-name constant
    GetModuleExport,
    /// `import(specifier)`. Operands: u8 dest, u8 specifier register
    DynamicImport,
    /// Operand: u8 dest
    LoadImportMeta,
}

impl OpCode {
    /// Convert from u8, returning None for invalid values.
    pub fn from_u8(value: u8) -> Option<Self> {
        if value <= OpCode::LoadImportMeta as u8 {
            // SAFETY: OpCode is repr(u8) and we've verified the value is in range.
            Some(unsafe { std::mem::transmute::<u8, OpCode>(value) })
        } else {
            None
        }
    }

    /// Get the size of the *fixed* operand portion for this opcode in bytes.
    ///
    /// This does NOT include the opcode byte itself. [`OpCode::Closure`]
    /// additionally carries a variable-length trailing upvalue list whose
    /// length is encoded in its fixed operand; see
    /// [`super::chunk::BytecodeChunk::opcodes`].
    pub fn operand_size(&self) -> usize {
        match self {
            // No operands
            OpCode::ReturnUndefined | OpCode::ReturnFinally | OpCode::HandlePending => 0,

            // 1-byte operand
            OpCode::LoadNull
            | OpCode::LoadUndefined
            | OpCode::LoadTrue
            | OpCode::LoadFalse
            | OpCode::TypeGuardIteratorReturn
            | OpCode::TypeGuardDestructureSource
            | OpCode::GetThis
            | OpCode::SetThis
            | OpCode::NewObject
            | OpCode::Return
            | OpCode::Throw
            | OpCode::CloseUpvalue
            | OpCode::LoadImportMeta => 1,

            // 2-byte operand
            OpCode::Move
            | OpCode::Neg
            | OpCode::BitNot
            | OpCode::Not
            | OpCode::TypeOf
            | OpCode::IsNull
            | OpCode::IsUndefined
            | OpCode::IsNullish
            | OpCode::ToNumber
            | OpCode::GetLength
            | OpCode::ArrayPush
            | OpCode::LoadFree
            | OpCode::SetUpvalue
            | OpCode::Jump
            | OpCode::Yield
            | OpCode::Await
            | OpCode::DynamicImport
            | OpCode::TailCall
            | OpCode::EvalModule
            | OpCode::ThrowTdzError => 2,

            // 3-byte operand
            OpCode::LoadConst
            | OpCode::Add
            | OpCode::Sub
            | OpCode::Mul
            | OpCode::Div
            | OpCode::Mod
            | OpCode::Pow
            | OpCode::BitAnd
            | OpCode::BitOr
            | OpCode::BitXor
            | OpCode::Shl
            | OpCode::Shr
            | OpCode::Ushr
            | OpCode::Eq
            | OpCode::Ne
            | OpCode::StrictEq
            | OpCode::StrictNe
            | OpCode::Lt
            | OpCode::Le
            | OpCode::Gt
            | OpCode::Ge
            | OpCode::In
            | OpCode::Instanceof
            | OpCode::GetIndex
            | OpCode::SetIndex
            | OpCode::DeleteIndex
            | OpCode::NewArray
            | OpCode::Concat
            | OpCode::Call
            | OpCode::SpreadCall
            | OpCode::SpreadNew
            | OpCode::New
            | OpCode::TailCallMethod
            | OpCode::GetGlobal
            | OpCode::SetGlobal
            | OpCode::DeleteGlobal
            | OpCode::JumpIfFalse
            | OpCode::JumpIfNull
            | OpCode::JumpIfUndefined
            | OpCode::JumpIfNullish
            | OpCode::CreateGenerator => 3,

            // 4-byte operand. Closure's count here covers only its fixed
            // part; its upvalue-pair tail is variable-length, see
            // `has_variable_tail`.
            OpCode::GetProp
            | OpCode::DeleteProp
            | OpCode::GetPrivateField
            | OpCode::GetSuperProp
            | OpCode::SetProp
            | OpCode::SetPrivateField
            | OpCode::DefineMethod
            | OpCode::CallMethod
            | OpCode::SpreadCallMethod
            | OpCode::Closure => 4,

            // 5-byte operand
            OpCode::DefineAccessor | OpCode::GetModuleExport => 5,
        }
    }

    /// Get the name of this opcode for debugging.
    pub fn name(&self) -> &'static str {
        match self {
            OpCode::LoadConst => "LOAD_CONST",
            OpCode::LoadNull => "LOAD_NULL",
            OpCode::LoadUndefined => "LOAD_UNDEFINED",
            OpCode::LoadTrue => "LOAD_TRUE",
            OpCode::LoadFalse => "LOAD_FALSE",
            OpCode::Move => "MOVE",
            OpCode::Add => "ADD",
            OpCode::Sub => "SUB",
            OpCode::Mul => "MUL",
            OpCode::Div => "DIV",
            OpCode::Mod => "MOD",
            OpCode::Pow => "POW",
            OpCode::Neg => "NEG",
            OpCode::BitAnd => "BIT_AND",
            OpCode::BitOr => "BIT_OR",
            OpCode::BitXor => "BIT_XOR",
            OpCode::BitNot => "BIT_NOT",
            OpCode::Shl => "SHL",
            OpCode::Shr => "SHR",
            OpCode::Ushr => "USHR",
            OpCode::Eq => "EQ",
            OpCode::Ne => "NE",
            OpCode::StrictEq => "STRICT_EQ",
            OpCode::StrictNe => "STRICT_NE",
            OpCode::Lt => "LT",
            OpCode::Le => "LE",
            OpCode::Gt => "GT",
            OpCode::Ge => "GE",
            OpCode::In => "IN",
            OpCode::Instanceof => "INSTANCEOF",
            OpCode::Not => "NOT",
            OpCode::TypeOf => "TYPEOF",
            OpCode::IsNull => "IS_NULL",
            OpCode::IsUndefined => "IS_UNDEFINED",
            OpCode::IsNullish => "IS_NULLISH",
            OpCode::ToNumber => "TO_NUMBER",
            OpCode::TypeGuardIteratorReturn => "TYPE_GUARD_ITERATOR_RETURN",
            OpCode::TypeGuardDestructureSource => "TYPE_GUARD_DESTRUCTURE_SOURCE",
            OpCode::ThrowTdzError => "THROW_TDZ_ERROR",
            OpCode::GetProp => "GET_PROP",
            OpCode::SetProp => "SET_PROP",
            OpCode::DeleteProp => "DELETE_PROP",
            OpCode::GetPrivateField => "GET_PRIVATE_FIELD",
            OpCode::GetSuperProp => "GET_SUPER_PROP",
            OpCode::SetPrivateField => "SET_PRIVATE_FIELD",
            OpCode::DefineMethod => "DEFINE_METHOD",
            OpCode::DefineAccessor => "DEFINE_ACCESSOR",
            OpCode::GetLength => "GET_LENGTH",
            OpCode::GetIndex => "GET_INDEX",
            OpCode::SetIndex => "SET_INDEX",
            OpCode::DeleteIndex => "DELETE_INDEX",
            OpCode::GetThis => "GET_THIS",
            OpCode::SetThis => "SET_THIS",
            OpCode::NewArray => "NEW_ARRAY",
            OpCode::NewObject => "NEW_OBJECT",
            OpCode::ArrayPush => "ARRAY_PUSH",
            OpCode::Concat => "CONCAT",
            OpCode::Call => "CALL",
            OpCode::CallMethod => "CALL_METHOD",
            OpCode::TailCall => "TAIL_CALL",
            OpCode::TailCallMethod => "TAIL_CALL_METHOD",
            OpCode::SpreadCall => "SPREAD_CALL",
            OpCode::SpreadCallMethod => "SPREAD_CALL_METHOD",
            OpCode::New => "NEW",
            OpCode::SpreadNew => "SPREAD_NEW",
            OpCode::Closure => "CLOSURE",
            OpCode::LoadFree => "LOAD_FREE",
            OpCode::SetUpvalue => "SET_UPVALUE",
            OpCode::CloseUpvalue => "CLOSE_UPVALUE",
            OpCode::GetGlobal => "GET_GLOBAL",
            OpCode::SetGlobal => "SET_GLOBAL",
            OpCode::DeleteGlobal => "DELETE_GLOBAL",
            OpCode::Jump => "JUMP",
            OpCode::JumpIfFalse => "JUMP_IF_FALSE",
            OpCode::JumpIfNull => "JUMP_IF_NULL",
            OpCode::JumpIfUndefined => "JUMP_IF_UNDEFINED",
            OpCode::JumpIfNullish => "JUMP_IF_NULLISH",
            OpCode::Return => "RETURN",
            OpCode::ReturnUndefined => "RETURN_UNDEFINED",
            OpCode::ReturnFinally => "RETURN_FINALLY",
            OpCode::HandlePending => "HANDLE_PENDING",
            OpCode::Throw => "THROW",
            OpCode::Yield => "YIELD",
            OpCode::Await => "AWAIT",
            OpCode::CreateGenerator => "CREATE_GENERATOR",
            OpCode::EvalModule => "EVAL_MODULE",
            OpCode::GetModuleExport => "GET_MODULE_EXPORT",
            OpCode::DynamicImport => "DYNAMIC_IMPORT",
            OpCode::LoadImportMeta => "LOAD_IMPORT_META",
        }
    }

    /// True for opcodes that carry a variable-length tail beyond their
    /// fixed operand (currently only [`OpCode::Closure`]).
    pub fn has_variable_tail(&self) -> bool {
        matches!(self, OpCode::Closure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_repr() {
        assert_eq!(OpCode::LoadConst as u8, 0);
        assert_eq!(OpCode::LoadNull as u8, 1);
    }

    #[test]
    fn opcode_from_u8() {
        assert_eq!(OpCode::from_u8(0), Some(OpCode::LoadConst));
        assert_eq!(OpCode::from_u8(1), Some(OpCode::LoadNull));
        assert_eq!(OpCode::from_u8(255), None);
    }

    #[test]
    fn opcode_name() {
        assert_eq!(OpCode::LoadConst.name(), "LOAD_CONST");
        assert_eq!(OpCode::Add.name(), "ADD");
        assert_eq!(OpCode::JumpIfFalse.name(), "JUMP_IF_FALSE");
    }

    #[test]
    fn last_opcode_is_load_import_meta() {
        let last = OpCode::LoadImportMeta as u8;
        assert_eq!(OpCode::from_u8(last), Some(OpCode::LoadImportMeta));
        assert_eq!(OpCode::from_u8(last + 1), None);
    }

    #[test]
    fn operand_sizes() {
        assert_eq!(OpCode::ReturnUndefined.operand_size(), 0);
        assert_eq!(OpCode::Return.operand_size(), 1);
        assert_eq!(OpCode::Move.operand_size(), 2);
        assert_eq!(OpCode::LoadConst.operand_size(), 3);
        assert_eq!(OpCode::GetProp.operand_size(), 4);
        assert_eq!(OpCode::GetSuperProp.operand_size(), 4);
        assert_eq!(OpCode::SetProp.operand_size(), 4);
        assert_eq!(OpCode::DefineAccessor.operand_size(), 5);
        // GetLength is a fast-path read of just (dest, obj) - no name index.
        assert_eq!(OpCode::GetLength.operand_size(), 2);
        // CloseUpvalue takes a single register, not a register pair.
        assert_eq!(OpCode::CloseUpvalue.operand_size(), 1);
    }

    #[test]
    fn only_closure_has_variable_tail() {
        assert!(OpCode::Closure.has_variable_tail());
        assert!(!OpCode::Call.has_variable_tail());
    }
}
