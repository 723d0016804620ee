//! Compilation state threaded through expression lowering.
use crate::operators::OperatorRegistry;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Assigns stable numeric codes to string literals.
///
/// GLSL has no strings, so every string literal seen while compiling a style
/// is replaced by a number. One table is created per style compilation and
/// shared by both shader-side contexts and by the draw-time callbacks, so the
/// same string always maps to the same code within that compilation.
#[derive(Debug, Default)]
pub struct LiteralTable {
    codes: Mutex<HashMap<String, u32>>,
}

impl LiteralTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the code for `literal`, assigning the next free one if unseen.
    pub fn code_for(&self, literal: &str) -> u32 {
        let mut codes = self.lock();
        if let Some(code) = codes.get(literal) {
            return *code;
        }
        let code = codes.len() as u32;
        codes.insert(literal.to_string(), code);
        code
    }

    /// Looks up a code without assigning one.
    pub fn get(&self, literal: &str) -> Option<u32> {
        self.lock().get(literal).copied()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, u32>> {
        // The map is never left half-updated, so a poisoned lock is still usable.
        self.codes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The state of one shader-side compilation.
///
/// A style compilation uses two contexts, one per shader stage. They share
/// the literal table and the operator registry but track referenced
/// attributes separately.
#[derive(Debug, Clone)]
pub struct ParsingContext {
    /// Selects `v_` (fragment) or `a_` (vertex) names for feature attributes.
    pub in_fragment_shader: bool,
    /// Style variables referenced so far, in first-seen order.
    pub variables: Vec<String>,
    /// Feature attributes referenced so far, in first-seen order.
    pub attributes: Vec<String>,
    /// Helper function definitions keyed by function name.
    pub functions: BTreeMap<String, String>,
    pub string_literals: Arc<LiteralTable>,
    operators: Arc<OperatorRegistry>,
}

impl ParsingContext {
    pub fn new(
        in_fragment_shader: bool,
        string_literals: Arc<LiteralTable>,
        operators: Arc<OperatorRegistry>,
    ) -> Self {
        Self {
            in_fragment_shader,
            variables: Vec::new(),
            attributes: Vec::new(),
            functions: BTreeMap::new(),
            string_literals,
            operators,
        }
    }

    /// A vertex-side context with its own literal table and the built-in operators.
    pub fn vertex() -> Self {
        Self::new(false, Arc::default(), Arc::default())
    }

    /// A fragment-side context sharing the literal table and operators of `other`.
    pub fn fragment_from(other: &ParsingContext) -> Self {
        Self::new(
            true,
            Arc::clone(&other.string_literals),
            Arc::clone(&other.operators),
        )
    }

    pub fn operators(&self) -> &OperatorRegistry {
        &self.operators
    }

    pub fn reference_attribute(&mut self, name: &str) {
        if !self.attributes.iter().any(|a| a == name) {
            self.attributes.push(name.to_string());
        }
    }

    pub fn reference_variable(&mut self, name: &str) {
        if !self.variables.iter().any(|v| v == name) {
            self.variables.push(name.to_string());
        }
    }

    /// Registers a helper function; a later definition under the same name wins.
    pub fn add_function(&mut self, name: impl Into<String>, definition: impl Into<String>) {
        self.functions.insert(name.into(), definition.into());
    }
}
