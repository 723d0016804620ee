//! Draw-time bindings produced by style compilation.
use crate::error::StyleError;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use stipple_expr::LiteralTable;
use stipple_resource::TextureHandle;

/// The properties of one feature, as read by attribute callbacks.
pub type FeatureProperties = Map<String, Value>;

/// Fed to the GPU when a property or variable has no usable value.
///
/// It lies far outside the range of literal codes, so it never matches a
/// string comparison. A real value equal to it is indistinguishable from a
/// missing one.
pub const MISSING_VALUE_SENTINEL: f64 = -9999999.0;

pub type AttributeCallback = Arc<dyn Fn(&FeatureProperties) -> f64 + Send + Sync>;
pub type UniformCallback = Arc<dyn Fn() -> Result<f64, StyleError> + Send + Sync>;

/// Extracts the value of the `a_<name>` vertex attribute from a feature.
#[derive(Clone)]
pub struct AttributeBinding {
    pub name: String,
    pub callback: AttributeCallback,
}

impl AttributeBinding {
    pub fn evaluate(&self, properties: &FeatureProperties) -> f64 {
        (self.callback)(properties)
    }
}

impl fmt::Debug for AttributeBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeBinding").field("name", &self.name).finish_non_exhaustive()
    }
}

/// The value bound to a uniform at draw time.
#[derive(Clone)]
pub enum UniformValue {
    /// Evaluated before each draw.
    Number(UniformCallback),
    /// An image that may still be loading.
    Texture(TextureHandle),
}

impl UniformValue {
    /// Evaluates a numeric uniform; `None` for textures.
    pub fn number(&self) -> Option<Result<f64, StyleError>> {
        match self {
            UniformValue::Number(callback) => Some(callback()),
            UniformValue::Texture(_) => None,
        }
    }

    pub fn texture(&self) -> Option<&TextureHandle> {
        match self {
            UniformValue::Texture(handle) => Some(handle),
            UniformValue::Number(_) => None,
        }
    }
}

impl fmt::Debug for UniformValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniformValue::Number(_) => f.write_str("Number(..)"),
            UniformValue::Texture(handle) => f.debug_tuple("Texture").field(handle).finish(),
        }
    }
}

/// Converts a JSON value to the number a shader sees.
///
/// Strings become their literal code, booleans 1 or 0. Null maps to the
/// sentinel; arrays and objects do too, with a warning naming `source`.
pub(crate) fn value_to_number(value: &Value, literals: &LiteralTable, source: &str) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(MISSING_VALUE_SENTINEL),
        Value::String(s) => f64::from(literals.code_for(s)),
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null => MISSING_VALUE_SENTINEL,
        Value::Array(_) | Value::Object(_) => {
            log::warn!("{} holds a non-scalar value, using the missing-value sentinel", source);
            MISSING_VALUE_SENTINEL
        }
    }
}
