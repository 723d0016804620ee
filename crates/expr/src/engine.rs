//! Lowers expression trees to GLSL source fragments.
use crate::ast::Expression;
use crate::context::ParsingContext;
use crate::error::ExprError;
use crate::types::ValueTypes;
use stipple_types::Color;

/// Infers the set of types `expression` may produce.
pub fn get_value_type(
    ctx: &ParsingContext,
    expression: &Expression,
) -> Result<ValueTypes, ExprError> {
    match expression {
        Expression::Number(_) => Ok(ValueTypes::NUMBER),
        Expression::Bool(_) => Ok(ValueTypes::BOOLEAN),
        Expression::String(s) => {
            if Color::is_color_string(s) {
                Ok(ValueTypes::COLOR | ValueTypes::STRING)
            } else {
                Ok(ValueTypes::STRING)
            }
        }
        Expression::NumberArray(numbers) => {
            if numbers.len() == 3 || numbers.len() == 4 {
                Ok(ValueTypes::COLOR | ValueTypes::NUMBER_ARRAY)
            } else {
                Ok(ValueTypes::NUMBER_ARRAY)
            }
        }
        Expression::Call { operator, args } => {
            let def = ctx
                .operators()
                .get(operator)
                .ok_or_else(|| ExprError::UnknownOperator(expression.to_string()))?;
            (def.return_type)(ctx, args)
        }
    }
}

/// Compiles `expression` into a GLSL expression string.
///
/// `type_hint` narrows ambiguous literals: a color-looking string becomes a
/// `vec4` only when a color is expected, and a literal code otherwise.
pub fn expression_to_glsl(
    ctx: &mut ParsingContext,
    expression: &Expression,
    type_hint: Option<ValueTypes>,
) -> Result<String, ExprError> {
    if let Expression::Call { operator, args } = expression {
        let def = *ctx
            .operators()
            .get(operator)
            .ok_or_else(|| ExprError::UnknownOperator(expression.to_string()))?;
        log::trace!("Lowering '{}' with {} argument(s)", operator, args.len());
        return (def.to_glsl)(ctx, args, type_hint);
    }

    let value_type = get_value_type(ctx, expression)?;
    let expects = |ty: ValueTypes| type_hint.is_none() || type_hint == Some(ty);
    match expression {
        Expression::Number(n) => Ok(number_to_glsl(*n)),
        Expression::Bool(b) => Ok(b.to_string()),
        Expression::String(s) if expects(ValueTypes::STRING) => Ok(string_to_glsl(ctx, s)),
        Expression::String(s) if value_type.intersects(ValueTypes::COLOR) && expects(ValueTypes::COLOR) => {
            color_to_glsl(Color::parse(s)?.to_rgba_array())
        }
        Expression::NumberArray(numbers)
            if value_type.intersects(ValueTypes::COLOR) && expects(ValueTypes::COLOR) =>
        {
            let mut rgba = [0.0, 0.0, 0.0, 1.0];
            rgba[..numbers.len()].copy_from_slice(numbers);
            color_to_glsl(rgba)
        }
        Expression::NumberArray(numbers) => array_to_glsl(numbers),
        _ => Err(ExprError::UnexpectedType {
            expression: expression.to_string(),
            expected: type_hint.unwrap_or(ValueTypes::ANY).to_string(),
        }),
    }
}

/// Formats a number as a GLSL float literal (`1` becomes `1.0`).
pub fn number_to_glsl(value: f64) -> String {
    let s = value.to_string();
    if s.contains('.') { s } else { format!("{s}.0") }
}

/// Formats 2 to 4 numbers as a `vecN` constructor.
pub fn array_to_glsl(values: &[f64]) -> Result<String, ExprError> {
    if !(2..=4).contains(&values.len()) {
        return Err(ExprError::ArrayLength(values.len()));
    }
    let parts: Vec<String> = values.iter().map(|v| number_to_glsl(*v)).collect();
    Ok(format!("vec{}({})", values.len(), parts.join(", ")))
}

/// Formats `[r, g, b, a]` (RGB in `0..=255`) as a normalized `vec4`.
pub fn color_to_glsl(rgba: [f64; 4]) -> Result<String, ExprError> {
    let [r, g, b, a] = rgba;
    array_to_glsl(&[r / 255.0, g / 255.0, b / 255.0, a])
}

/// Returns the numeric code standing in for `literal` in generated GLSL.
pub fn get_string_number_equivalent(ctx: &ParsingContext, literal: &str) -> f64 {
    f64::from(ctx.string_literals.code_for(literal))
}

pub fn string_to_glsl(ctx: &ParsingContext, literal: &str) -> String {
    number_to_glsl(get_string_number_equivalent(ctx, literal))
}

/// The uniform a style variable is bound to.
pub fn uniform_name_for_variable(name: &str) -> String {
    format!("u_var_{name}")
}
