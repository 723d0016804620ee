//! Compiles literal point-symbol styles into GLSL programs.
//!
//! A [`LiteralStyle`] describes how each point is drawn with data-driven
//! expressions. [`StyleCompiler::compile`] (or [`parse_literal_style`] with
//! the default configuration) turns it into a [`CompiledStyle`]: a
//! configured [`ShaderBuilder`](stipple_shader::ShaderBuilder), one
//! [`AttributeBinding`] per feature property the shaders read, and the
//! uniform values to set before each draw.

pub mod bindings;
pub mod compiler;
pub mod error;
pub mod literal;
pub mod shapes;

pub use bindings::{
    AttributeBinding, AttributeCallback, FeatureProperties, MISSING_VALUE_SENTINEL,
    UniformCallback, UniformValue,
};
pub use compiler::{
    CompiledStyle, CompilerConfig, StyleCompiler, StyleCompilerBuilder, parse_literal_style,
};
pub use error::StyleError;
pub use literal::{LiteralStyle, LiteralSymbolStyle, StyleVariables};
pub use shapes::SymbolType;

/// Deserializes a JSON style and compiles it with the default configuration.
pub fn parse_literal_style_json(json: &str) -> Result<CompiledStyle, StyleError> {
    StyleCompiler::default().compile_json(json)
}
