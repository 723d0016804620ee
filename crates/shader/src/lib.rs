//! Textual assembly of the vertex and fragment programs used to draw point
//! symbols as screen-aligned quads.
//!
//! A [`ShaderBuilder`] holds user declarations and a handful of GLSL
//! expression slots. The two render methods wrap that state in a fixed
//! program skeleton; they never validate the GLSL they emit.

pub mod builder;
pub mod glsl;

pub use builder::ShaderBuilder;
pub use glsl::{GlslType, Varying};
