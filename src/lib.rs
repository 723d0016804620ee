//! Stipple compiles data-driven point-symbol styles into GLSL programs.
//!
//! A style is a JSON document whose symbol fields are expressions over
//! feature properties (`["get", name]`), style variables (`["var", name]`)
//! and literals. Compiling it yields vertex and fragment shader source, one
//! attribute binding per property the shaders read, and the uniforms to set
//! before each draw.
//!
//! ```no_run
//! use stipple::parse_literal_style_json;
//!
//! let compiled = parse_literal_style_json(
//!     r##"{"symbol": {"symbolType": "circle", "size": ["get", "radius"], "color": "#ff0000"}}"##,
//! )?;
//! let vertex = compiled.vertex_shader(false);
//! let fragment = compiled.fragment_shader(false);
//! # Ok::<(), stipple::StyleError>(())
//! ```
//!
//! The workspace crates are re-exported here:
//!
//! - `stipple-types`: CSS color parsing.
//! - `stipple-expr`: the expression language, its type inference and GLSL lowering.
//! - `stipple-shader`: the shader text assembler.
//! - `stipple-resource`: resource providers and asynchronous texture loading.
//! - `stipple-style`: the style model and the compiler tying everything together.

pub use stipple_expr as expr;
pub use stipple_resource as resource;
pub use stipple_shader as shader;
pub use stipple_style as style;
pub use stipple_types as types;

pub use stipple_expr::{Expression, ExprError, OperatorDef, OperatorRegistry, ParsingContext, ValueTypes};
pub use stipple_resource::{
    FilesystemResourceProvider, InMemoryResourceProvider, ResourceError, ResourceProvider,
    TextureHandle, TextureImage, TextureState,
};
pub use stipple_shader::ShaderBuilder;
pub use stipple_style::{
    AttributeBinding, CompiledStyle, CompilerConfig, FeatureProperties, LiteralStyle,
    LiteralSymbolStyle, MISSING_VALUE_SENTINEL, StyleCompiler, StyleCompilerBuilder, StyleError,
    StyleVariables, SymbolType, UniformValue, parse_literal_style, parse_literal_style_json,
};
pub use stipple_types::Color;

/// Compiles a style that is already held as a JSON value.
pub fn parse_literal_style_value(value: serde_json::Value) -> Result<CompiledStyle, StyleError> {
    let style: LiteralStyle = serde_json::from_value(value)?;
    parse_literal_style(&style)
}
