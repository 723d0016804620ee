mod common;

use common::fixtures::*;
use common::{TestResult, assert_hit_variant, compile, init_logger, properties};
use serde_json::json;
use stipple::{
    ExprError, LiteralStyle, MISSING_VALUE_SENTINEL, StyleError, StyleVariables,
    parse_literal_style, parse_literal_style_json, parse_literal_style_value,
};

#[test]
fn test_minimal_square_uses_defaults() -> TestResult {
    init_logger();
    let compiled = compile(minimal_style("square"))?;
    let builder = &compiled.builder;
    assert_eq!(builder.size_expression(), "vec2(1.0)");
    assert_eq!(builder.offset_expression(), "vec2(0.0, 0.0)");
    assert_eq!(builder.texture_coordinate_expression(), "vec4(0.0, 0.0, 1.0, 1.0)");
    assert_eq!(
        builder.color_expression(),
        "vec4(vec4(1.0, 1.0, 1.0, 1.0).rgb, vec4(1.0, 1.0, 1.0, 1.0).a * 1.0 * 1.0)"
    );
    assert!(compiled.attributes.is_empty());
    assert!(compiled.uniforms.is_empty());
    assert!(compiled.fragment_shader(false).contains("  if (false) { discard; }"));
    Ok(())
}

#[test]
fn test_color_alpha_is_combined_with_opacity() -> TestResult {
    let compiled = compile(json!({
        "symbol": { "symbolType": "square", "color": [255, 0, 0, 0.5], "opacity": 0.8 }
    }))?;
    assert_eq!(
        compiled.builder.color_expression(),
        "vec4(vec4(1.0, 0.0, 0.0, 0.5).rgb, vec4(1.0, 0.0, 0.0, 0.5).a * 0.8 * 1.0)"
    );
    Ok(())
}

#[test]
fn test_square_and_image_are_not_masked() -> TestResult {
    for symbol_type in ["square", "image"] {
        let compiled = compile(minimal_style(symbol_type))?;
        assert!(
            !compiled.builder.color_expression().contains("smoothstep"),
            "{symbol_type} should not be masked"
        );
    }
    Ok(())
}

#[test]
fn test_circle_mask_reads_size_in_fragment() -> TestResult {
    let compiled = compile(json!({ "symbol": { "symbolType": "circle", "size": 2 } }))?;
    assert!(
        compiled
            .builder
            .color_expression()
            .contains("smoothstep(1.-4./vec2(2.0).x,1.,dot(v_quadCoord-.5,v_quadCoord-.5)*4.)")
    );
    let fragment = compiled.fragment_shader(false);
    assert_eq!(fragment.matches("discard;").count(), 1);
    assert!(fragment.contains("  if (false) { discard; }"));
    Ok(())
}

#[test]
fn test_unknown_symbol_type_is_rejected() {
    let err = compile(minimal_style("hexagon")).unwrap_err();
    assert_eq!(err.to_string(), "Unexpected symbol type: hexagon");
}

#[test]
fn test_expression_errors_surface() {
    let cases = [
        (json!({"symbol": {"symbolType": "square", "size": ["nope", 1]}}), "nope"),
        (json!({"symbol": {"symbolType": "square", "size": ["get", "a", "b"]}}), "Exactly 1"),
        (json!({"symbol": {"symbolType": "square", "offset": [1, 2, 3, 4, 5]}}), "between 2 and 4"),
        (json!({"symbol": {"symbolType": "square", "opacity": "road"}}), "expected type"),
    ];
    for (style, needle) in cases {
        let err = compile(style).unwrap_err();
        assert!(matches!(err, StyleError::Expression(_)), "unexpected error kind: {err:?}");
        assert!(err.to_string().contains(needle), "'{err}' should mention '{needle}'");
    }

    let err = compile(json!({"symbol": {"symbolType": "square", "size": ["frobnicate"]}})).unwrap_err();
    assert!(matches!(
        err,
        StyleError::Expression(ExprError::UnknownOperator(ref op)) if op.contains("frobnicate")
    ));
}

#[test]
fn test_speed_attribute_feeds_vertex_and_fragment() -> TestResult {
    let compiled = compile(speed_style())?;
    let builder = &compiled.builder;
    assert_eq!(builder.attributes(), ["float a_heading", "float a_speed"]);
    assert_eq!(builder.varyings().len(), 1);
    assert_eq!(builder.varyings()[0].name, "v_speed");
    assert_eq!(builder.rotation_expression(), "(a_heading * 0.0174533)");

    let vertex = compiled.vertex_shader(false);
    assert!(vertex.contains("attribute float a_speed;"));
    assert!(vertex.contains("varying float v_speed;"));
    assert!(vertex.contains("  v_speed = a_speed;"));
    let fragment = compiled.fragment_shader(false);
    assert!(fragment.contains("varying float v_speed;"));
    assert!(!fragment.contains("a_speed"));

    let speed = compiled.attribute("speed").ok_or("no speed binding")?;
    assert_eq!(speed.evaluate(&properties(json!({"speed": 42}))), 42.0);
    assert_eq!(speed.evaluate(&properties(json!({"heading": 90}))), MISSING_VALUE_SENTINEL);
    assert_eq!(speed.evaluate(&properties(json!({"speed": null}))), MISSING_VALUE_SENTINEL);
    Ok(())
}

#[test]
fn test_string_literals_share_codes_across_bindings() -> TestResult {
    let compiled = compile(category_style())?;
    let kind = compiled.attribute("kind").ok_or("no kind binding")?;
    let selected = compiled.uniforms["u_var_selected"].number().ok_or("not numeric")??;

    let road = kind.evaluate(&properties(json!({"kind": "road"})));
    let rail = kind.evaluate(&properties(json!({"kind": "rail"})));
    assert_eq!(selected, road);
    assert_ne!(road, rail);
    assert_eq!(
        compiled.builder.fragment_discard_expression(),
        "!(v_kind == u_var_selected)"
    );
    Ok(())
}

#[test]
fn test_variable_updates_are_observed() -> TestResult {
    let style = LiteralStyle::from_json(&population_style().to_string())?;
    let variables: StyleVariables = style.variables.clone();
    let compiled = parse_literal_style(&style)?;
    assert_eq!(compiled.builder.uniforms(), ["float u_var_minPopulation"]);

    let uniform = &compiled.uniforms["u_var_minPopulation"];
    assert_eq!(uniform.number().ok_or("not numeric")??, 10000.0);
    variables.set("minPopulation", 50000);
    assert_eq!(uniform.number().ok_or("not numeric")??, 50000.0);
    variables.remove("minPopulation");
    assert!(matches!(
        uniform.number(),
        Some(Err(StyleError::MissingVariable(ref name))) if name == "minPopulation"
    ));
    Ok(())
}

#[test]
fn test_hit_detection_only_adds_lines() -> TestResult {
    let compiled = compile(population_style())?;
    let (base, hit) = (compiled.vertex_shader(false), compiled.vertex_shader(true));
    assert_hit_variant(
        &base,
        &hit,
        &[
            "attribute vec4 a_hitColor;",
            "varying vec4 v_hitColor;",
            "  v_hitColor = a_hitColor;",
        ],
    );
    let (base, hit) = (compiled.fragment_shader(false), compiled.fragment_shader(true));
    assert_hit_variant(
        &base,
        &hit,
        &[
            "varying vec4 v_hitColor;",
            "  if (gl_FragColor.a < 0.1) { discard; }",
            "  gl_FragColor = v_hitColor;",
        ],
    );
    Ok(())
}

#[test]
fn test_string_literal_has_one_code_in_both_programs() -> TestResult {
    let compiled = compile(json!({
        "filter": ["==", ["get", "kind"], "road"],
        "symbol": {
            "symbolType": "square",
            "size": ["match", ["get", "kind"], "rail", 4, "road", 10, 5]
        }
    }))?;
    // Pairs are lowered from the last one, so "road" is seen first.
    assert_eq!(
        compiled.builder.size_expression(),
        "vec2((a_kind == 1.0 ? 4.0 : (a_kind == 0.0 ? 10.0 : 5.0)))"
    );
    assert_eq!(compiled.builder.fragment_discard_expression(), "!(v_kind == 0.0)");
    assert!(compiled.vertex_shader(false).contains("(a_kind == 0.0 ? 10.0"));
    assert!(compiled.fragment_shader(false).contains("  if (!(v_kind == 0.0)) { discard; }"));

    let kind = compiled.attribute("kind").ok_or("no kind binding")?;
    assert_eq!(kind.evaluate(&properties(json!({"kind": "road"}))), 0.0);
    assert_eq!(kind.evaluate(&properties(json!({"kind": "rail"}))), 1.0);
    Ok(())
}

#[test]
fn test_compilation_is_deterministic() -> TestResult {
    let json = population_style().to_string();
    let first = parse_literal_style_json(&json)?;
    let second = parse_literal_style_json(&json)?;
    assert_eq!(first.builder, second.builder);
    assert_eq!(first.vertex_shader(true), second.vertex_shader(true));
    assert_eq!(first.fragment_shader(false), second.fragment_shader(false));
    Ok(())
}

#[test]
fn test_rotate_with_view_uses_rotation_matrix() -> TestResult {
    let compiled = parse_literal_style_value(json!({
        "symbol": { "symbolType": "square", "rotateWithView": true }
    }))?;
    assert!(
        compiled
            .vertex_shader(false)
            .contains("  mat4 offsetMatrix = u_offsetScaleMatrix * u_offsetRotateMatrix;")
    );
    Ok(())
}

#[test]
fn test_invalid_json_is_reported() {
    let err = parse_literal_style_json("{\"symbol\": ").unwrap_err();
    assert!(matches!(err, StyleError::Json(_)));
}
