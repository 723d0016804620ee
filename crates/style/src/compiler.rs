//! Compiles a [`LiteralStyle`] into a configured [`ShaderBuilder`] plus the
//! uniform and attribute bindings needed to draw with it.
use crate::bindings::{
    AttributeBinding, FeatureProperties, MISSING_VALUE_SENTINEL, UniformValue, value_to_number,
};
use crate::error::StyleError;
use crate::literal::{LiteralStyle, StyleVariables};
use crate::shapes::SymbolType;
use itertools::Itertools;
use std::collections::BTreeMap;
use std::sync::Arc;
use stipple_expr::{
    Expression, LiteralTable, OperatorRegistry, ParsingContext, ValueTypes, expression_to_glsl,
    uniform_name_for_variable,
};
use stipple_resource::{
    FilesystemResourceProvider, ResourceProvider, TextureHandle, TextureLoader,
};
use stipple_shader::{GlslType, ShaderBuilder};

/// The result of compiling a style.
#[derive(Debug, Clone)]
pub struct CompiledStyle {
    pub builder: ShaderBuilder,
    /// One binding per `float a_<name>` attribute, in declaration order.
    pub attributes: Vec<AttributeBinding>,
    /// Keyed by uniform name: `u_var_<name>` and, for images, `u_texture`.
    pub uniforms: BTreeMap<String, UniformValue>,
}

impl CompiledStyle {
    pub fn vertex_shader(&self, for_hit_detection: bool) -> String {
        self.builder.get_symbol_vertex_shader(for_hit_detection)
    }

    pub fn fragment_shader(&self, for_hit_detection: bool) -> String {
        self.builder.get_symbol_fragment_shader(for_hit_detection)
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeBinding> {
        self.attributes.iter().find(|binding| binding.name == name)
    }

    /// The texture of an `image` symbol, if one was bound.
    pub fn texture(&self) -> Option<&TextureHandle> {
        self.uniforms.get("u_texture").and_then(UniformValue::texture)
    }
}

/// Settings shared by every compilation of a [`StyleCompiler`].
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Where `image` symbols read their `src` from.
    pub resource_provider: Arc<dyn ResourceProvider>,
    /// When false, image symbols get an idle texture handle and nothing is fetched.
    pub load_textures: bool,
    /// Used when a symbol does not set `crossOrigin`.
    pub default_cross_origin: String,
    pub operators: Arc<OperatorRegistry>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            resource_provider: Arc::new(FilesystemResourceProvider::new(".")),
            load_textures: true,
            default_cross_origin: "anonymous".to_string(),
            operators: Arc::new(OperatorRegistry::default()),
        }
    }
}

/// A builder for creating a `StyleCompiler`.
#[derive(Debug, Default)]
pub struct StyleCompilerBuilder {
    config: CompilerConfig,
}

impl StyleCompilerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource_provider(mut self, provider: Arc<dyn ResourceProvider>) -> Self {
        self.config.resource_provider = provider;
        self
    }

    /// Replaces the operator set, e.g. a default registry with extra operators.
    pub fn with_operators(mut self, operators: OperatorRegistry) -> Self {
        self.config.operators = Arc::new(operators);
        self
    }

    pub fn load_textures(mut self, load_textures: bool) -> Self {
        self.config.load_textures = load_textures;
        self
    }

    pub fn with_default_cross_origin(mut self, cross_origin: impl Into<String>) -> Self {
        self.config.default_cross_origin = cross_origin.into();
        self
    }

    pub fn build(self) -> StyleCompiler {
        StyleCompiler::new(self.config)
    }
}

/// Compiles literal styles with a fixed configuration.
///
/// Compilations are independent: each allocates its own contexts and
/// literal table, so one compiler may be shared across threads.
#[derive(Debug, Clone)]
pub struct StyleCompiler {
    config: CompilerConfig,
    textures: TextureLoader,
}

impl Default for StyleCompiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

impl StyleCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        let textures = TextureLoader::new(Arc::clone(&config.resource_provider));
        Self { config, textures }
    }

    pub fn builder() -> StyleCompilerBuilder {
        StyleCompilerBuilder::new()
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Deserializes a JSON style and compiles it.
    pub fn compile_json(&self, json: &str) -> Result<CompiledStyle, StyleError> {
        let style = LiteralStyle::from_json(json)?;
        self.compile(&style)
    }

    pub fn compile(&self, style: &LiteralStyle) -> Result<CompiledStyle, StyleError> {
        let symbol = &style.symbol;
        // Checked before anything else so no partial work is done for bad shapes.
        let shape: SymbolType = symbol.symbol_type.parse()?;
        log::debug!("Compiling {} symbol style", shape);

        let literals = Arc::new(LiteralTable::new());
        let mut vertex =
            ParsingContext::new(false, Arc::clone(&literals), Arc::clone(&self.config.operators));
        let mut fragment = ParsingContext::fragment_from(&vertex);

        let size = field_or(&symbol.size, || Expression::Number(1.0));
        let color = field_or(&symbol.color, || Expression::from("white"));
        let texture_coord = field_or(&symbol.texture_coord, || {
            Expression::NumberArray(vec![0.0, 0.0, 1.0, 1.0])
        });
        let offset = field_or(&symbol.offset, || Expression::NumberArray(vec![0.0, 0.0]));
        let opacity = field_or(&symbol.opacity, || Expression::Number(1.0));
        let rotation = field_or(&symbol.rotation, || Expression::Number(0.0));

        let size_types = ValueTypes::NUMBER_ARRAY | ValueTypes::NUMBER;
        let parsed_size = compile_field(&mut vertex, "size", &size, size_types)?;
        let parsed_offset = compile_field(&mut vertex, "offset", &offset, ValueTypes::NUMBER_ARRAY)?;
        let parsed_tex_coord =
            compile_field(&mut vertex, "textureCoord", &texture_coord, ValueTypes::NUMBER_ARRAY)?;
        let parsed_rotation = compile_field(&mut vertex, "rotation", &rotation, ValueTypes::NUMBER)?;
        let parsed_color = compile_field(&mut fragment, "color", &color, ValueTypes::COLOR)?;
        let parsed_opacity = compile_field(&mut fragment, "opacity", &opacity, ValueTypes::NUMBER)?;

        let mask = if shape.needs_visible_size() {
            let fragment_size = expression_to_glsl(&mut fragment, &size, Some(size_types))?;
            shape.opacity_mask(&format!("vec2({fragment_size}).x"))
        } else {
            shape.opacity_mask("")
        };

        let mut builder = ShaderBuilder::new();
        builder
            .set_size_expression(format!("vec2({parsed_size})"))
            .set_rotation_expression(parsed_rotation)
            .set_symbol_offset_expression(parsed_offset)
            .set_texture_coordinate_expression(parsed_tex_coord)
            .set_symbol_rotate_with_view(symbol.rotate_with_view)
            .set_color_expression(format!(
                "vec4({parsed_color}.rgb, {parsed_color}.a * {parsed_opacity} * {mask})"
            ));

        if let Some(filter) = &style.filter {
            let parsed_filter = compile_field(&mut fragment, "filter", filter, ValueTypes::BOOLEAN)?;
            builder.set_fragment_discard_expression(format!("!{parsed_filter}"));
        }

        let mut uniforms = BTreeMap::new();
        for name in vertex.variables.iter().chain(&fragment.variables).unique() {
            let uniform_name = uniform_name_for_variable(name);
            builder.add_uniform(format!("float {uniform_name}"));
            uniforms.insert(
                uniform_name,
                variable_uniform(name, style.variables.clone(), Arc::clone(&literals)),
            );
        }

        if shape == SymbolType::Image {
            match &symbol.src {
                Some(src) => {
                    let cross_origin = symbol
                        .cross_origin
                        .as_deref()
                        .unwrap_or(&self.config.default_cross_origin);
                    let handle = if self.config.load_textures {
                        self.textures.spawn(src, cross_origin)
                    } else {
                        TextureHandle::idle(src.as_str(), cross_origin)
                    };
                    let textured = format!(
                        "{} * texture2D(u_texture, v_texCoord)",
                        builder.color_expression()
                    );
                    builder
                        .add_uniform("sampler2D u_texture")
                        .set_color_expression(textured);
                    uniforms.insert("u_texture".to_string(), UniformValue::Texture(handle));
                }
                None => log::debug!("Image symbol has no src, no texture is bound"),
            }
        }

        for name in &fragment.attributes {
            vertex.reference_attribute(name);
            builder.add_varying(format!("v_{name}"), GlslType::Float, format!("a_{name}"));
        }
        let mut attributes = Vec::with_capacity(vertex.attributes.len());
        for name in &vertex.attributes {
            builder.add_attribute(format!("float a_{name}"));
            attributes.push(attribute_binding(name, Arc::clone(&literals)));
        }

        let functions: BTreeMap<&String, &String> =
            vertex.functions.iter().chain(&fragment.functions).collect();
        for definition in functions.into_values() {
            builder.add_function(definition.as_str());
        }

        log::debug!(
            "Compiled {} style: {} uniform(s), {} attribute(s), {} string literal(s)",
            shape,
            uniforms.len(),
            attributes.len(),
            literals.len()
        );
        Ok(CompiledStyle {
            builder,
            attributes,
            uniforms,
        })
    }
}

/// Compiles a style with the default configuration.
pub fn parse_literal_style(style: &LiteralStyle) -> Result<CompiledStyle, StyleError> {
    StyleCompiler::default().compile(style)
}

fn field_or(field: &Option<Expression>, default: impl FnOnce() -> Expression) -> Expression {
    field.clone().unwrap_or_else(default)
}

fn compile_field(
    ctx: &mut ParsingContext,
    field: &str,
    expression: &Expression,
    types: ValueTypes,
) -> Result<String, StyleError> {
    let glsl = expression_to_glsl(ctx, expression, Some(types))?;
    log::trace!("{} -> {}", field, glsl);
    Ok(glsl)
}

fn variable_uniform(name: &str, variables: StyleVariables, literals: Arc<LiteralTable>) -> UniformValue {
    let name = name.to_string();
    UniformValue::Number(Arc::new(move || {
        let value = variables
            .get(&name)
            .ok_or_else(|| StyleError::MissingVariable(name.clone()))?;
        Ok(value_to_number(&value, &literals, &format!("Variable '{name}'")))
    }))
}

fn attribute_binding(name: &str, literals: Arc<LiteralTable>) -> AttributeBinding {
    let key = name.to_string();
    AttributeBinding {
        name: name.to_string(),
        callback: Arc::new(move |properties: &FeatureProperties| match properties.get(&key) {
            Some(value) => value_to_number(value, &literals, &format!("Property '{key}'")),
            None => MISSING_VALUE_SENTINEL,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::LiteralSymbolStyle;
    use serde_json::json;
    use stipple_resource::InMemoryResourceProvider;

    fn style(value: serde_json::Value) -> LiteralStyle {
        serde_json::from_value(value).unwrap()
    }

    fn compiler() -> StyleCompiler {
        let _ = env_logger::builder().is_test(true).try_init();
        StyleCompiler::builder()
            .with_resource_provider(Arc::new(InMemoryResourceProvider::new()))
            .build()
    }

    #[test]
    fn test_defaults() {
        let compiled = compiler()
            .compile(&LiteralStyle::new(LiteralSymbolStyle::new("square")))
            .unwrap();
        let builder = &compiled.builder;
        assert_eq!(builder.size_expression(), "vec2(1.0)");
        assert_eq!(builder.rotation_expression(), "0.0");
        assert_eq!(builder.offset_expression(), "vec2(0.0, 0.0)");
        assert_eq!(builder.texture_coordinate_expression(), "vec4(0.0, 0.0, 1.0, 1.0)");
        assert_eq!(
            builder.color_expression(),
            "vec4(vec4(1.0, 1.0, 1.0, 1.0).rgb, vec4(1.0, 1.0, 1.0, 1.0).a * 1.0 * 1.0)"
        );
        assert_eq!(builder.fragment_discard_expression(), "false");
        assert!(compiled.attributes.is_empty());
        assert!(compiled.uniforms.is_empty());
    }

    #[test]
    fn test_unknown_shape_fails_first() {
        // The broken size would fail too, but the shape is checked first.
        let err = compiler()
            .compile(&style(json!({"symbol": {"symbolType": "hexagon", "size": ["nope"]}})))
            .unwrap_err();
        assert!(matches!(err, StyleError::UnknownSymbolType(ref s) if s == "hexagon"));
    }

    #[test]
    fn test_circle_mask_uses_size() {
        let compiled = compiler()
            .compile(&style(json!({"symbol": {"symbolType": "circle", "size": 2}})))
            .unwrap();
        assert_eq!(
            compiled.builder.color_expression(),
            "vec4(vec4(1.0, 1.0, 1.0, 1.0).rgb, vec4(1.0, 1.0, 1.0, 1.0).a * 1.0 * \
             (1.0-smoothstep(1.-4./vec2(2.0).x,1.,dot(v_quadCoord-.5,v_quadCoord-.5)*4.)))"
        );
    }

    #[test]
    fn test_filter_becomes_negated_discard() {
        let compiled = compiler()
            .compile(&style(json!({
                "filter": [">", ["get", "size"], 10],
                "symbol": {"symbolType": "square"}
            })))
            .unwrap();
        assert_eq!(compiled.builder.fragment_discard_expression(), "!(v_size > 10.0)");
        assert_eq!(compiled.builder.attributes(), ["float a_size"]);
        assert_eq!(compiled.builder.varyings()[0].expression, "a_size");
    }

    #[test]
    fn test_filter_must_be_boolean() {
        let err = compiler()
            .compile(&style(json!({"filter": "road", "symbol": {"symbolType": "square"}})))
            .unwrap_err();
        assert!(matches!(err, StyleError::Expression(_)));
    }

    #[test]
    fn test_vertex_attribute_has_no_varying() {
        let compiled = compiler()
            .compile(&style(json!({"symbol": {"symbolType": "square", "size": ["get", "radius"]}})))
            .unwrap();
        assert_eq!(compiled.builder.size_expression(), "vec2(a_radius)");
        assert!(compiled.builder.varyings().is_empty());
        assert_eq!(compiled.attributes.len(), 1);
        assert_eq!(compiled.attributes[0].name, "radius");
    }

    #[test]
    fn test_attribute_callback() {
        let compiled = compiler()
            .compile(&style(json!({
                "symbol": {"symbolType": "square", "color": ["match", ["get", "kind"], "road", "red", "blue"]}
            })))
            .unwrap();
        let binding = compiled.attribute("kind").unwrap();
        let road = json!({"kind": "road"});
        let rail = json!({"kind": "rail"});
        assert_eq!(binding.evaluate(road.as_object().unwrap()), 0.0);
        assert_eq!(binding.evaluate(rail.as_object().unwrap()), 1.0);
        assert_eq!(binding.evaluate(&FeatureProperties::new()), MISSING_VALUE_SENTINEL);
    }

    #[test]
    fn test_variables_are_declared_once() {
        let compiled = compiler()
            .compile(&style(json!({
                "filter": [">", ["var", "limit"], 1],
                "variables": {"limit": 3},
                "symbol": {"symbolType": "square", "size": ["var", "limit"], "opacity": ["var", "fade"]}
            })))
            .unwrap();
        assert_eq!(compiled.builder.uniforms(), ["float u_var_limit", "float u_var_fade"]);
        let limit = compiled.uniforms["u_var_limit"].number().unwrap().unwrap();
        assert_eq!(limit, 3.0);
        let fade = compiled.uniforms["u_var_fade"].number().unwrap();
        assert!(matches!(fade, Err(StyleError::MissingVariable(ref name)) if name == "fade"));
    }

    #[test]
    fn test_image_without_loading() {
        let compiler = StyleCompiler::builder()
            .with_resource_provider(Arc::new(InMemoryResourceProvider::new()))
            .load_textures(false)
            .with_default_cross_origin("use-credentials")
            .build();
        let compiled = compiler
            .compile(&style(json!({"symbol": {"symbolType": "image", "src": "pin.png"}})))
            .unwrap();
        let texture = compiled.texture().unwrap();
        assert_eq!(texture.cross_origin(), "use-credentials");
        assert_eq!(texture.state(), stipple_resource::TextureState::Idle);
        assert!(compiled.builder.uniforms().contains(&"sampler2D u_texture".to_string()));
        assert!(
            compiled
                .builder
                .color_expression()
                .ends_with(" * 1.0) * texture2D(u_texture, v_texCoord)")
        );
    }

    #[test]
    fn test_image_without_src_binds_nothing() {
        let compiled = compiler()
            .compile(&style(json!({"symbol": {"symbolType": "image"}})))
            .unwrap();
        assert!(compiled.texture().is_none());
        assert!(!compiled.builder.color_expression().contains("texture2D"));
    }
}
