//! A typed expression language for point styles, lowered to GLSL.
//!
//! Expressions are JSON values: literals, or arrays whose first element names
//! an operator (`["get", "speed"]`). Each expression is type-checked against
//! the set of types it may produce and compiled to a GLSL expression string.
//! Compilation records which feature attributes and style variables were
//! referenced so that a caller can declare the matching shader inputs.

pub mod ast;
pub mod context;
pub mod engine;
pub mod error;
pub mod operators;
pub mod types;

// --- Public API ---
pub use ast::Expression;
pub use context::{LiteralTable, ParsingContext};
pub use engine::{
    array_to_glsl, color_to_glsl, expression_to_glsl, get_string_number_equivalent,
    get_value_type, number_to_glsl, string_to_glsl, uniform_name_for_variable,
};
pub use error::ExprError;
pub use operators::{OperatorDef, OperatorRegistry, ReturnTypeFn, ToGlslFn};
pub use types::ValueTypes;
