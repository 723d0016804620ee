//! The shader builder and its program skeletons.
use crate::glsl::{GlslType, Varying};

const DEFAULT_SIZE: &str = "vec2(1.0)";
const DEFAULT_ROTATION: &str = "0.0";
const DEFAULT_OFFSET: &str = "vec2(0.0)";
const DEFAULT_COLOR: &str = "vec4(1.0)";
const DEFAULT_TEX_COORD: &str = "vec4(0.0, 0.0, 1.0, 1.0)";
const DEFAULT_DISCARD: &str = "false";

const VERTEX_UNIFORMS: [&str; 6] = [
    "uniform mat4 u_projectionMatrix;",
    "uniform mat4 u_offsetScaleMatrix;",
    "uniform mat4 u_offsetRotateMatrix;",
    "uniform float u_time;",
    "uniform float u_zoom;",
    "uniform float u_resolution;",
];

const FRAGMENT_UNIFORMS: [&str; 3] = [
    "uniform float u_time;",
    "uniform float u_zoom;",
    "uniform float u_resolution;",
];

const VERTEX_ATTRIBUTES: [&str; 2] = ["attribute vec2 a_position;", "attribute float a_index;"];

const BUILTIN_VARYINGS: [&str; 2] = ["varying vec2 v_texCoord;", "varying vec2 v_quadCoord;"];

/// Rotates the corner selected by `a_index` around the symbol anchor.
const QUAD_CORNERS: &str = "  float offsetX;
  float offsetY;
  if (a_index == 0.0) {
    offsetX = (offset.x - halfSize.x) * cos(angle) + (offset.y - halfSize.y) * sin(angle);
    offsetY = (offset.y - halfSize.y) * cos(angle) - (offset.x - halfSize.x) * sin(angle);
  } else if (a_index == 1.0) {
    offsetX = (offset.x + halfSize.x) * cos(angle) + (offset.y - halfSize.y) * sin(angle);
    offsetY = (offset.y - halfSize.y) * cos(angle) - (offset.x + halfSize.x) * sin(angle);
  } else if (a_index == 2.0) {
    offsetX = (offset.x + halfSize.x) * cos(angle) + (offset.y + halfSize.y) * sin(angle);
    offsetY = (offset.y + halfSize.y) * cos(angle) - (offset.x + halfSize.x) * sin(angle);
  } else {
    offsetX = (offset.x - halfSize.x) * cos(angle) + (offset.y + halfSize.y) * sin(angle);
    offsetY = (offset.y + halfSize.y) * cos(angle) - (offset.x - halfSize.x) * sin(angle);
  }
  vec4 offsets = offsetMatrix * vec4(offsetX, offsetY, 0.0, 0.0);
  gl_Position = u_projectionMatrix * vec4(a_position, 0.0, 1.0) + offsets;";

const QUAD_TEX_COORDS: &str = "  float u = a_index == 0.0 || a_index == 3.0 ? texCoord.s : texCoord.p;
  float v = a_index == 2.0 || a_index == 3.0 ? texCoord.t : texCoord.q;
  v_texCoord = vec2(u, v);
  u = a_index == 0.0 || a_index == 3.0 ? 0.0 : 1.0;
  v = a_index == 2.0 || a_index == 3.0 ? 0.0 : 1.0;
  v_quadCoord = vec2(u, v);";

const HIT_ATTRIBUTE: &str = "attribute vec4 a_hitColor;";
const HIT_VARYING: &str = "varying vec4 v_hitColor;";
const HIT_ASSIGNMENT: &str = "  v_hitColor = a_hitColor;";
const HIT_TAIL: [&str; 2] = [
    "  if (gl_FragColor.a < 0.1) { discard; }",
    "  gl_FragColor = v_hitColor;",
];

/// Collects declarations and expressions, then renders the point-symbol
/// vertex and fragment programs.
///
/// Uniform and attribute declarations are stored without their `uniform` /
/// `attribute` keyword and trailing semicolon, e.g. `float u_var_limit`.
/// Expression slots are overwritten wholesale by their setters.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderBuilder {
    uniforms: Vec<String>,
    attributes: Vec<String>,
    varyings: Vec<Varying>,
    functions: Vec<String>,
    size_expression: String,
    rotation_expression: String,
    offset_expression: String,
    color_expression: String,
    tex_coord_expression: String,
    discard_expression: String,
    rotate_with_view: bool,
}

impl Default for ShaderBuilder {
    fn default() -> Self {
        Self {
            uniforms: Vec::new(),
            attributes: Vec::new(),
            varyings: Vec::new(),
            functions: Vec::new(),
            size_expression: DEFAULT_SIZE.to_string(),
            rotation_expression: DEFAULT_ROTATION.to_string(),
            offset_expression: DEFAULT_OFFSET.to_string(),
            color_expression: DEFAULT_COLOR.to_string(),
            tex_coord_expression: DEFAULT_TEX_COORD.to_string(),
            discard_expression: DEFAULT_DISCARD.to_string(),
            rotate_with_view: false,
        }
    }
}

impl ShaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a uniform declaration such as `float u_var_limit`.
    pub fn add_uniform(&mut self, declaration: impl Into<String>) -> &mut Self {
        self.uniforms.push(declaration.into());
        self
    }

    /// Adds an attribute declaration such as `float a_speed`.
    pub fn add_attribute(&mut self, declaration: impl Into<String>) -> &mut Self {
        self.attributes.push(declaration.into());
        self
    }

    pub fn add_varying(
        &mut self,
        name: impl Into<String>,
        ty: GlslType,
        expression: impl Into<String>,
    ) -> &mut Self {
        self.varyings.push(Varying::new(name, ty, expression));
        self
    }

    /// Adds a helper function definition, emitted before `main` in both programs.
    pub fn add_function(&mut self, definition: impl Into<String>) -> &mut Self {
        self.functions.push(definition.into());
        self
    }

    /// Sets the quad size, a `vec2` in pixels.
    pub fn set_size_expression(&mut self, expression: impl Into<String>) -> &mut Self {
        self.size_expression = expression.into();
        self
    }

    /// Sets the rotation angle in radians.
    pub fn set_rotation_expression(&mut self, expression: impl Into<String>) -> &mut Self {
        self.rotation_expression = expression.into();
        self
    }

    /// Sets the `vec2` offset of the quad center from the anchor, in pixels.
    pub fn set_symbol_offset_expression(&mut self, expression: impl Into<String>) -> &mut Self {
        self.offset_expression = expression.into();
        self
    }

    /// Sets the `vec4` fragment color, before alpha premultiplication.
    pub fn set_color_expression(&mut self, expression: impl Into<String>) -> &mut Self {
        self.color_expression = expression.into();
        self
    }

    /// Sets the `vec4` texture rectangle as `(left, top, right, bottom)`.
    pub fn set_texture_coordinate_expression(&mut self, expression: impl Into<String>) -> &mut Self {
        self.tex_coord_expression = expression.into();
        self
    }

    /// Sets the boolean predicate under which a fragment is discarded.
    pub fn set_fragment_discard_expression(&mut self, expression: impl Into<String>) -> &mut Self {
        self.discard_expression = expression.into();
        self
    }

    /// When set, symbols rotate along with the view instead of staying screen-aligned.
    pub fn set_symbol_rotate_with_view(&mut self, rotate_with_view: bool) -> &mut Self {
        self.rotate_with_view = rotate_with_view;
        self
    }

    pub fn size_expression(&self) -> &str {
        &self.size_expression
    }

    pub fn rotation_expression(&self) -> &str {
        &self.rotation_expression
    }

    pub fn offset_expression(&self) -> &str {
        &self.offset_expression
    }

    pub fn color_expression(&self) -> &str {
        &self.color_expression
    }

    pub fn texture_coordinate_expression(&self) -> &str {
        &self.tex_coord_expression
    }

    pub fn fragment_discard_expression(&self) -> &str {
        &self.discard_expression
    }

    pub fn rotate_with_view(&self) -> bool {
        self.rotate_with_view
    }

    pub fn uniforms(&self) -> &[String] {
        &self.uniforms
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn varyings(&self) -> &[Varying] {
        &self.varyings
    }

    pub fn functions(&self) -> &[String] {
        &self.functions
    }

    /// Renders the vertex program.
    ///
    /// With `for_hit_detection`, the program also forwards the `a_hitColor`
    /// attribute to the fragment stage through `v_hitColor`.
    pub fn get_symbol_vertex_shader(&self, for_hit_detection: bool) -> String {
        log::trace!("Rendering symbol vertex shader (hit detection: {for_hit_detection})");
        let offset_matrix = if self.rotate_with_view {
            "u_offsetScaleMatrix * u_offsetRotateMatrix"
        } else {
            "u_offsetScaleMatrix"
        };

        let mut lines: Vec<String> = vec!["precision mediump float;".to_string()];
        lines.extend(VERTEX_UNIFORMS.iter().map(|s| s.to_string()));
        lines.extend(self.uniforms.iter().map(|u| format!("uniform {u};")));
        lines.extend(VERTEX_ATTRIBUTES.iter().map(|s| s.to_string()));
        lines.extend(self.attributes.iter().map(|a| format!("attribute {a};")));
        if for_hit_detection {
            lines.push(HIT_ATTRIBUTE.to_string());
        }
        lines.extend(BUILTIN_VARYINGS.iter().map(|s| s.to_string()));
        lines.extend(self.varyings.iter().map(Varying::declaration));
        if for_hit_detection {
            lines.push(HIT_VARYING.to_string());
        }
        lines.extend(self.functions.iter().cloned());

        lines.push("void main(void) {".to_string());
        lines.push(format!("  mat4 offsetMatrix = {offset_matrix};"));
        lines.push(format!("  vec2 halfSize = {} * 0.5;", self.size_expression));
        lines.push(format!("  vec2 offset = {};", self.offset_expression));
        lines.push(format!("  float angle = {};", self.rotation_expression));
        lines.push(QUAD_CORNERS.to_string());
        lines.push(format!("  vec4 texCoord = {};", self.tex_coord_expression));
        lines.push(QUAD_TEX_COORDS.to_string());
        lines.extend(self.varyings.iter().map(Varying::assignment));
        if for_hit_detection {
            lines.push(HIT_ASSIGNMENT.to_string());
        }
        lines.push("}".to_string());
        lines.join("\n")
    }

    /// Renders the fragment program.
    ///
    /// With `for_hit_detection`, fragments that are nearly transparent are
    /// dropped and the output color is replaced by `v_hitColor`.
    pub fn get_symbol_fragment_shader(&self, for_hit_detection: bool) -> String {
        log::trace!("Rendering symbol fragment shader (hit detection: {for_hit_detection})");
        let mut lines: Vec<String> = vec!["precision mediump float;".to_string()];
        lines.extend(FRAGMENT_UNIFORMS.iter().map(|s| s.to_string()));
        lines.extend(self.uniforms.iter().map(|u| format!("uniform {u};")));
        lines.extend(BUILTIN_VARYINGS.iter().map(|s| s.to_string()));
        lines.extend(self.varyings.iter().map(Varying::declaration));
        if for_hit_detection {
            lines.push(HIT_VARYING.to_string());
        }
        lines.extend(self.functions.iter().cloned());

        lines.push("void main(void) {".to_string());
        lines.push(format!("  if ({}) {{ discard; }}", self.discard_expression));
        lines.push(format!("  gl_FragColor = {};", self.color_expression));
        lines.push("  gl_FragColor.rgb *= gl_FragColor.a;".to_string());
        if for_hit_detection {
            lines.extend(HIT_TAIL.iter().map(|s| s.to_string()));
        }
        lines.push("}".to_string());
        lines.join("\n")
    }
}
