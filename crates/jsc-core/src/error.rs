//! Diagnostics produced by the compiler core.
//!
//! The compiler's only externally observable outputs are the emitted chunk
//! and this error list (source spec §6, "Bit-exact compatibility"). Parse
//! and type-check errors are the responsibility of the external collaborators
//! that produce the AST this crate consumes; `CompilationError` covers only
//! the diagnosable conditions the compiler itself can detect while lowering
//! an already-parsed, already-type-checked tree.
//!
//! Internal invariant violations (register exhaustion, jump-offset overflow,
//! sentinel-register misuse, an unpatched placeholder reaching emit) are not
//! represented here: per source-spec §7 they are reachable only via compiler
//! bugs and the implementation panics on them rather than returning a value.

use thiserror::Error;

use crate::Span;

/// A diagnosable condition detected while lowering an AST to bytecode.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilationError {
    /// `extends` names a superclass the type checker never resolved.
    #[error("at {span}: unresolved superclass '{name}'")]
    UnresolvedSuperclass { name: String, span: Span },

    /// The type checker could not supply a constructor arity for a
    /// superclass; placeholder constructor arguments cannot be synthesized
    /// without one (source spec §9, first open question).
    #[error("at {span}: no reliable constructor arity for superclass '{name}'")]
    SuperclassArityUnavailable { name: String, span: Span },

    /// `delete` applied to a computed member whose key isn't a string
    /// literal; the VM has no dynamic-delete opcode (source spec §9, fourth
    /// open question).
    #[error("at {span}: delete of a computed, non-literal property key is unsupported")]
    DeleteUnsupportedOperand { span: Span },

    /// A function captured more than 256 distinct free variables.
    #[error("at {span}: function captures {count} free variables, exceeding the 256 limit")]
    TooManyFreeVariables { count: usize, span: Span },

    /// A destructuring pattern placed a rest element before the end of the
    /// pattern.
    #[error("at {span}: rest element must be the last element of a destructuring pattern")]
    RestElementNotLast { span: Span },

    /// More than one spread argument appeared in a single call; the current
    /// simplified spread lowering handles exactly one (source spec §9, third
    /// open question).
    #[error("at {span}: only one spread argument is supported per call")]
    MultiArgumentSpreadCall { span: Span },

    /// `super(...)` appeared outside a derived class's constructor.
    #[error("at {span}: 'super' call is only valid inside a derived class constructor")]
    SuperOutsideDerivedConstructor { span: Span },

    /// A named export referenced a binding that was never declared.
    #[error("at {span}: cannot export '{name}': no such binding")]
    UnknownNamedExport { name: String, span: Span },

    /// `break`/`continue` (bare or labeled) with no matching enclosing loop,
    /// switch, or labeled statement.
    #[error("at {span}: {message}")]
    InvalidJumpTarget { message: String, span: Span },

    /// `import`/`export` appeared while compiling in script mode
    /// (`CompileOptions::module_mode == false`).
    #[error("at {span}: 'import'/'export' is not permitted outside module mode")]
    ImportExportOutsideModuleMode { span: Span },

    /// `export * from "..."` requires enumerating the source module's export
    /// names at compile time, but no [`crate::ModuleLoader`] was configured
    /// for this compilation.
    #[error("at {span}: 'export * from' requires a module loader, but none was configured")]
    ModuleLoaderUnavailable { span: Span },

    /// The configured [`crate::ModuleLoader`] could not resolve `export *
    /// from`'s source specifier.
    #[error("at {span}: cannot resolve re-export source '{specifier}'")]
    UnresolvedReexportSource { specifier: String, span: Span },
}

impl CompilationError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            Self::UnresolvedSuperclass { span, .. } => *span,
            Self::SuperclassArityUnavailable { span, .. } => *span,
            Self::DeleteUnsupportedOperand { span } => *span,
            Self::TooManyFreeVariables { span, .. } => *span,
            Self::RestElementNotLast { span } => *span,
            Self::MultiArgumentSpreadCall { span } => *span,
            Self::SuperOutsideDerivedConstructor { span } => *span,
            Self::UnknownNamedExport { span, .. } => *span,
            Self::InvalidJumpTarget { span, .. } => *span,
            Self::ImportExportOutsideModuleMode { span } => *span,
            Self::ModuleLoaderUnavailable { span } => *span,
            Self::UnresolvedReexportSource { span, .. } => *span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_carries_span() {
        let span = Span::new(3, 1, 5);
        let err = CompilationError::RestElementNotLast { span };
        assert_eq!(err.span(), span);
    }

    #[test]
    fn error_message_includes_span() {
        let err = CompilationError::UnknownNamedExport {
            name: "foo".into(),
            span: Span::new(2, 1, 3),
        };
        assert!(err.to_string().contains("foo"));
        assert!(err.to_string().contains("2:1"));
    }

    #[test]
    fn too_many_free_variables_reports_count() {
        let err = CompilationError::TooManyFreeVariables {
            count: 257,
            span: Span::point(10, 1),
        };
        assert!(err.to_string().contains("257"));
    }

    #[test]
    fn invalid_jump_target_carries_message() {
        let err = CompilationError::InvalidJumpTarget {
            message: "break/continue used outside any loop or switch".to_string(),
            span: Span::point(4, 1),
        };
        assert!(err.to_string().contains("break/continue"));
    }
}
