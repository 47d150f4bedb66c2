//! The type-checker collaborator interface.
//!
//! The compiler consumes an already type-checked AST; it never infers or
//! checks types itself. [`TypeChecker`] is the seam an external type checker
//! plugs into, and [`Type`] is the shape of the information it reports back
//! (source spec §6, "Type-checker interface consumed by the compiler").

use rustc_hash::FxHashMap;

use crate::TypeHash;

/// A property entry in an object type's member map.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyInfo {
    pub ty: Type,
    pub is_getter: bool,
    pub is_setter: bool,
    pub is_readonly: bool,
}

/// A function call or construct signature, with a bitmap of which trailing
/// parameters are optional (bit `i` set means parameter `i` may be omitted).
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub params: Vec<Type>,
    pub optional_params: u64,
    pub return_type: Box<Type>,
}

/// Member-access information for an object type that represents class
/// metadata (the static side of a class declaration).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassMetadata {
    pub construct_signatures: Vec<Signature>,
    pub instance_properties: FxHashMap<String, PropertyInfo>,
}

/// A type as reported by the external type checker.
///
/// Mirrors exactly the variant set source-spec §6 enumerates: primitive,
/// literal, union, intersection, array, object (itself subdivided into
/// callable/constructable/class-instance/class-metadata shapes), and
/// instantiated-generic.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Primitive(PrimitiveType),
    /// A literal type, e.g. the type of `"hi"` or `42` narrowed to that exact
    /// value rather than `string`/`number`.
    Literal(LiteralValue),
    Union(Vec<Type>),
    Intersection(Vec<Type>),
    Array(Box<Type>),
    Object(ObjectType),
    /// An instantiation of a generic, e.g. `Generator<number>`. Carries the
    /// generic's name (hashed for identity) and its type arguments so
    /// callers can detect `Generator<...>`/`AsyncGenerator<...>` shapes
    /// without string comparison.
    InstantiatedGeneric {
        name: String,
        name_hash: TypeHash,
        args: Vec<Type>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Number,
    String,
    Boolean,
    Null,
    Undefined,
    Symbol,
    BigInt,
    Any,
    Unknown,
    Void,
    Never,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Number(ordered_float::OrderedFloat<f64>),
    String(String),
    Boolean(bool),
}

/// An object type, with optional callable/constructable/class-metadata
/// facets layered on top of a plain property map. A class's instance type
/// and its static (metadata) type are both represented this way; which
/// facets are populated distinguishes them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectType {
    pub properties: FxHashMap<String, PropertyInfo>,
    pub call_signatures: Vec<Signature>,
    pub construct_signatures: Vec<Signature>,
    pub is_class_instance: bool,
    pub class_metadata: Option<Box<ClassMetadata>>,
}

impl ObjectType {
    pub fn is_callable(&self) -> bool {
        !self.call_signatures.is_empty()
    }

    pub fn is_constructable(&self) -> bool {
        !self.construct_signatures.is_empty()
    }
}

/// The root of a type-checked program, as reported by [`TypeChecker::get_program`].
/// Used for top-level hoisted-declaration discovery and superclass arity
/// lookup (source spec §4.1 pre-walk, §9 first open question).
pub trait Program {
    /// Constructor arity of a named class, if the checker can resolve it.
    /// `None` means the class is unresolved or its arity is unknown; the
    /// compiler turns that into `CompilationError::SuperclassArityUnavailable`
    /// rather than guessing (source spec §9).
    fn superclass_arity(&self, class_name: &str) -> Option<usize>;
}

/// The type-checker collaborator the compiler queries while lowering.
///
/// `Node` is left abstract (rather than fixed to a concrete AST type) so this
/// trait can be implemented against whatever node identity scheme the
/// checker uses internally.
pub trait TypeChecker<Node> {
    type Program: Program;

    /// The type computed for an expression node, if any.
    fn get_computed_type(&self, node: Node) -> Option<Type>;

    /// Resolve a type by name in the checker's environment.
    fn resolve_type(&self, name: &str) -> Option<Type>;

    /// The type-checked program, for hoisting and superclass-arity queries.
    fn get_program(&self) -> &Self::Program;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_type_callable_constructable() {
        let mut ty = ObjectType::default();
        assert!(!ty.is_callable());
        assert!(!ty.is_constructable());
        ty.call_signatures.push(Signature {
            params: vec![],
            optional_params: 0,
            return_type: Box::new(Type::Primitive(PrimitiveType::Void)),
        });
        assert!(ty.is_callable());
    }

    #[test]
    fn instantiated_generic_carries_args() {
        let generator = Type::InstantiatedGeneric {
            name: "Generator".into(),
            name_hash: TypeHash::from_name("Generator"),
            args: vec![Type::Primitive(PrimitiveType::Number)],
        };
        match generator {
            Type::InstantiatedGeneric { args, .. } => assert_eq!(args.len(), 1),
            _ => panic!("expected InstantiatedGeneric"),
        }
    }
}
