use serde::{Deserialize, Serialize};
use std::fmt;

/// The GLSL types a varying may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlslType {
    Float,
    Vec2,
    Vec3,
    Vec4,
}

impl GlslType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GlslType::Float => "float",
            GlslType::Vec2 => "vec2",
            GlslType::Vec3 => "vec3",
            GlslType::Vec4 => "vec4",
        }
    }
}

impl fmt::Display for GlslType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value computed per vertex and interpolated for the fragment stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Varying {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: GlslType,
    /// Vertex-side GLSL expression assigned to the varying.
    pub expression: String,
}

impl Varying {
    pub fn new(name: impl Into<String>, ty: GlslType, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty,
            expression: expression.into(),
        }
    }

    /// `varying <type> <name>;`
    pub fn declaration(&self) -> String {
        format!("varying {} {};", self.ty, self.name)
    }

    /// `  <name> = <expression>;`
    pub fn assignment(&self) -> String {
        format!("  {} = {};", self.name, self.expression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varying_lines() {
        let varying = Varying::new("v_speed", GlslType::Float, "a_speed");
        assert_eq!(varying.declaration(), "varying float v_speed;");
        assert_eq!(varying.assignment(), "  v_speed = a_speed;");
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Varying::new("v_a", GlslType::Vec4, "x")).unwrap();
        assert_eq!(json, r#"{"name":"v_a","type":"vec4","expression":"x"}"#);
    }
}
