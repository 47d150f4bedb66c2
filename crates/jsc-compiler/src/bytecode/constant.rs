//! Constant pool for compiled modules (source spec §6 "Constants").
//!
//! The constant pool stores the literal values `LoadConst` instructions
//! reference: numbers, strings, booleans, `null`/`undefined`, regular
//! expressions, compiled functions (referenced by `Closure`), and frozen
//! array/object templates built from other pool entries.

use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;

/// Values stored in the constant pool.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// A JS number. Always `f64` — there is no separate integer type at the
    /// language level.
    Number(OrderedFloat<f64>),
    /// A string literal's text.
    String(String),
    Boolean(bool),
    Null,
    Undefined,
    /// A regular expression literal's source text and flags.
    Regex { pattern: String, flags: String },
    /// A reference to a compiled function, by index into the compiler's
    /// `compiled_functions` table. `Closure` reads this to know which
    /// function body to instantiate.
    Function(u32),
    /// A frozen array literal with no holes, spreads, or computed elements —
    /// each element is itself a constant-pool index. Used as a fast-path
    /// initializer the VM can clone rather than rebuild element-by-element.
    Array(Vec<u32>),
    /// A frozen object literal with only plain `key: value` properties,
    /// each side a constant-pool index.
    Object(Vec<(u32, u32)>),
}

/// Module-level constant pool with deduplication.
///
/// Shared across all functions in a module to avoid duplicate strings/values.
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    constants: Vec<Constant>,
    index: FxHashMap<ConstantKey, u32>,
}

/// Hashable shadow of [`Constant`] used purely for deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ConstantKey {
    Number(u64),
    String(String),
    Boolean(bool),
    Null,
    Undefined,
    Regex(String, String),
    Function(u32),
    Array(Vec<u32>),
    Object(Vec<(u32, u32)>),
}

impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            constants: Vec::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Add or get an existing constant, returning its index. Deduplicates
    /// identical constants so repeated literals (e.g. the same string
    /// appearing twice in one module) share a pool slot.
    pub fn add(&mut self, constant: Constant) -> u32 {
        let key = Self::to_key(&constant);

        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }

        let idx = self.constants.len() as u32;
        self.constants.push(constant);
        self.index.insert(key, idx);
        idx
    }

    pub fn add_number(&mut self, value: f64) -> u32 {
        self.add(Constant::Number(OrderedFloat(value)))
    }

    pub fn add_string(&mut self, value: impl Into<String>) -> u32 {
        self.add(Constant::String(value.into()))
    }

    pub fn add_boolean(&mut self, value: bool) -> u32 {
        self.add(Constant::Boolean(value))
    }

    pub fn add_null(&mut self) -> u32 {
        self.add(Constant::Null)
    }

    pub fn add_undefined(&mut self) -> u32 {
        self.add(Constant::Undefined)
    }

    pub fn add_regex(&mut self, pattern: impl Into<String>, flags: impl Into<String>) -> u32 {
        self.add(Constant::Regex { pattern: pattern.into(), flags: flags.into() })
    }

    pub fn add_function(&mut self, function_index: u32) -> u32 {
        self.add(Constant::Function(function_index))
    }

    pub fn add_array(&mut self, element_indices: Vec<u32>) -> u32 {
        self.add(Constant::Array(element_indices))
    }

    pub fn add_object(&mut self, property_indices: Vec<(u32, u32)>) -> u32 {
        self.add(Constant::Object(property_indices))
    }

    pub fn get(&self, index: u32) -> Option<&Constant> {
        self.constants.get(index as usize)
    }

    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    fn to_key(constant: &Constant) -> ConstantKey {
        match constant {
            Constant::Number(v) => ConstantKey::Number(v.to_bits()),
            Constant::String(s) => ConstantKey::String(s.clone()),
            Constant::Boolean(b) => ConstantKey::Boolean(*b),
            Constant::Null => ConstantKey::Null,
            Constant::Undefined => ConstantKey::Undefined,
            Constant::Regex { pattern, flags } => {
                ConstantKey::Regex(pattern.clone(), flags.clone())
            }
            Constant::Function(idx) => ConstantKey::Function(*idx),
            Constant::Array(elems) => ConstantKey::Array(elems.clone()),
            Constant::Object(props) => ConstantKey::Object(props.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_pool_is_empty() {
        let pool = ConstantPool::new();
        assert!(pool.is_empty());
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn add_number() {
        let mut pool = ConstantPool::new();
        let idx = pool.add_number(42.0);
        assert_eq!(idx, 0);
        assert_eq!(pool.get(idx), Some(&Constant::Number(OrderedFloat(42.0))));
    }

    #[test]
    fn add_string() {
        let mut pool = ConstantPool::new();
        let idx = pool.add_string("hello");
        assert_eq!(idx, 0);
        assert_eq!(pool.get(idx), Some(&Constant::String("hello".to_string())));
    }

    #[test]
    fn add_regex() {
        let mut pool = ConstantPool::new();
        let idx = pool.add_regex("a+", "g");
        assert_eq!(
            pool.get(idx),
            Some(&Constant::Regex { pattern: "a+".to_string(), flags: "g".to_string() })
        );
    }

    #[test]
    fn number_deduplication() {
        let mut pool = ConstantPool::new();
        let idx1 = pool.add_number(100.0);
        let idx2 = pool.add_number(200.0);
        let idx3 = pool.add_number(100.0);
        assert_eq!(idx1, 0);
        assert_eq!(idx2, 1);
        assert_eq!(idx3, 0);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn string_deduplication() {
        let mut pool = ConstantPool::new();
        let idx1 = pool.add_string("test");
        let idx2 = pool.add_string("other");
        let idx3 = pool.add_string("test");
        assert_eq!(idx1, 0);
        assert_eq!(idx2, 1);
        assert_eq!(idx3, 0);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn array_constant_dedups_by_element_indices() {
        let mut pool = ConstantPool::new();
        let a = pool.add_number(1.0);
        let b = pool.add_number(2.0);
        let arr1 = pool.add_array(vec![a, b]);
        let arr2 = pool.add_array(vec![a, b]);
        assert_eq!(arr1, arr2);
    }

    #[test]
    fn get_out_of_bounds() {
        let pool = ConstantPool::new();
        assert_eq!(pool.get(0), None);
        assert_eq!(pool.get(100), None);
    }

    #[test]
    fn constants_slice() {
        let mut pool = ConstantPool::new();
        pool.add_number(1.0);
        pool.add_number(2.0);
        pool.add_number(3.0);

        let constants = pool.constants();
        assert_eq!(constants.len(), 3);
        assert_eq!(constants[0], Constant::Number(OrderedFloat(1.0)));
    }
}
