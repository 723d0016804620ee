//! Defines the operator registry and the built-in operators.
//!
//! Each operator knows its possible return types and how to lower a call to
//! GLSL. Custom operators can be added to a registry before compiling a style.
use crate::ast::{Expression, describe};
use crate::context::ParsingContext;
use crate::engine::{expression_to_glsl, get_value_type, number_to_glsl, uniform_name_for_variable};
use crate::error::ExprError;
use crate::types::ValueTypes;
use std::collections::HashMap;

/// Infers the return types of a call from its arguments.
pub type ReturnTypeFn = fn(ctx: &ParsingContext, args: &[Expression]) -> Result<ValueTypes, ExprError>;

/// Lowers a call to a GLSL expression, optionally narrowed by a type hint.
pub type ToGlslFn = fn(
    ctx: &mut ParsingContext,
    args: &[Expression],
    type_hint: Option<ValueTypes>,
) -> Result<String, ExprError>;

#[derive(Debug, Clone, Copy)]
pub struct OperatorDef {
    pub return_type: ReturnTypeFn,
    pub to_glsl: ToGlslFn,
}

impl OperatorDef {
    pub const fn new(return_type: ReturnTypeFn, to_glsl: ToGlslFn) -> Self {
        Self { return_type, to_glsl }
    }
}

/// A registry of every operator an expression may call.
#[derive(Debug, Clone)]
pub struct OperatorRegistry {
    operators: HashMap<String, OperatorDef>,
}

impl OperatorRegistry {
    /// Creates a registry with no operators at all.
    pub fn new() -> Self {
        Self { operators: HashMap::new() }
    }

    /// Registers an operator, replacing any previous one with the same name.
    pub fn register(&mut self, name: &str, operator: OperatorDef) {
        self.operators.insert(name.to_string(), operator);
    }

    pub fn get(&self, name: &str) -> Option<&OperatorDef> {
        self.operators.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operators.contains_key(name)
    }

    /// Registered operator names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.operators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register("get", OperatorDef::new(returns_any, get));
        registry.register("var", OperatorDef::new(returns_any, var));
        registry.register("time", OperatorDef::new(returns_number, time));
        registry.register("zoom", OperatorDef::new(returns_number, zoom));
        registry.register("resolution", OperatorDef::new(returns_number, resolution));

        registry.register("*", OperatorDef::new(returns_number, multiply));
        registry.register("/", OperatorDef::new(returns_number, divide));
        registry.register("+", OperatorDef::new(returns_number, add));
        registry.register("-", OperatorDef::new(returns_number, subtract));
        registry.register("clamp", OperatorDef::new(returns_number, clamp));
        registry.register("%", OperatorDef::new(returns_number, modulo));
        registry.register("^", OperatorDef::new(returns_number, power));
        registry.register("abs", OperatorDef::new(returns_number, abs));
        registry.register("floor", OperatorDef::new(returns_number, floor));
        registry.register("round", OperatorDef::new(returns_number, round));
        registry.register("ceil", OperatorDef::new(returns_number, ceil));
        registry.register("sin", OperatorDef::new(returns_number, sin));
        registry.register("cos", OperatorDef::new(returns_number, cos));
        registry.register("atan", OperatorDef::new(returns_number, atan));

        registry.register(">", OperatorDef::new(returns_boolean, greater));
        registry.register(">=", OperatorDef::new(returns_boolean, greater_or_equal));
        registry.register("<", OperatorDef::new(returns_boolean, less));
        registry.register("<=", OperatorDef::new(returns_boolean, less_or_equal));
        registry.register("==", OperatorDef::new(returns_boolean, equal));
        registry.register("!=", OperatorDef::new(returns_boolean, not_equal));
        registry.register("!", OperatorDef::new(returns_boolean, not));
        registry.register("all", OperatorDef::new(returns_boolean, all));
        registry.register("any", OperatorDef::new(returns_boolean, any));
        registry.register("between", OperatorDef::new(returns_boolean, between));

        registry.register("array", OperatorDef::new(returns_number_array, array));
        registry.register("color", OperatorDef::new(returns_color, color));
        registry.register("interpolate", OperatorDef::new(interpolate_type, interpolate));
        registry.register("match", OperatorDef::new(match_type, match_));
        registry.register("case", OperatorDef::new(case_type, case));
        registry
    }
}

// --- Argument checks ---

pub fn assert_args_count(args: &[Expression], count: usize) -> Result<(), ExprError> {
    if args.len() != count {
        return Err(ExprError::ArgsCount { expected: count, found: args.len() });
    }
    Ok(())
}

pub fn assert_args_min_count(args: &[Expression], count: usize) -> Result<(), ExprError> {
    if args.len() < count {
        return Err(ExprError::ArgsMinCount { expected: count, found: args.len() });
    }
    Ok(())
}

pub fn assert_args_max_count(args: &[Expression], count: usize) -> Result<(), ExprError> {
    if args.len() > count {
        return Err(ExprError::ArgsMaxCount { expected: count, found: args.len() });
    }
    Ok(())
}

pub fn assert_args_even(args: &[Expression]) -> Result<(), ExprError> {
    if args.len() % 2 != 0 {
        return Err(ExprError::ArgsEven(args.len()));
    }
    Ok(())
}

pub fn assert_args_odd(args: &[Expression]) -> Result<(), ExprError> {
    if args.len() % 2 == 0 {
        return Err(ExprError::ArgsOdd(args.len()));
    }
    Ok(())
}

pub fn assert_number(ctx: &ParsingContext, arg: &Expression) -> Result<(), ExprError> {
    if !get_value_type(ctx, arg)?.intersects(ValueTypes::NUMBER) {
        return Err(ExprError::ExpectedNumber(arg.to_string()));
    }
    Ok(())
}

pub fn assert_numbers(ctx: &ParsingContext, args: &[Expression]) -> Result<(), ExprError> {
    args.iter().try_for_each(|arg| assert_number(ctx, arg))
}

pub fn assert_boolean(ctx: &ParsingContext, arg: &Expression) -> Result<(), ExprError> {
    if !get_value_type(ctx, arg)?.intersects(ValueTypes::BOOLEAN) {
        return Err(ExprError::ExpectedBoolean(arg.to_string()));
    }
    Ok(())
}

/// Attribute and variable names must be written as plain strings.
pub fn assert_string_identifier(arg: &Expression) -> Result<&str, ExprError> {
    match arg {
        Expression::String(name) => Ok(name),
        other => Err(ExprError::ExpectedIdentifier(other.to_string())),
    }
}

pub fn assert_unique_inferred_type(args: &[Expression], types: ValueTypes) -> Result<(), ExprError> {
    if !types.is_unique() {
        return Err(ExprError::AmbiguousType(describe(args)));
    }
    Ok(())
}

fn compile_all(
    ctx: &mut ParsingContext,
    args: &[Expression],
    hint: Option<ValueTypes>,
) -> Result<Vec<String>, ExprError> {
    args.iter().map(|arg| expression_to_glsl(ctx, arg, hint)).collect()
}

// --- Return types ---

fn returns_any(_ctx: &ParsingContext, _args: &[Expression]) -> Result<ValueTypes, ExprError> {
    Ok(ValueTypes::ANY)
}

fn returns_number(_ctx: &ParsingContext, _args: &[Expression]) -> Result<ValueTypes, ExprError> {
    Ok(ValueTypes::NUMBER)
}

fn returns_boolean(_ctx: &ParsingContext, _args: &[Expression]) -> Result<ValueTypes, ExprError> {
    Ok(ValueTypes::BOOLEAN)
}

fn returns_number_array(_ctx: &ParsingContext, _args: &[Expression]) -> Result<ValueTypes, ExprError> {
    Ok(ValueTypes::NUMBER_ARRAY)
}

fn returns_color(_ctx: &ParsingContext, _args: &[Expression]) -> Result<ValueTypes, ExprError> {
    Ok(ValueTypes::COLOR)
}

/// Intersects `initial` with the types of the arguments at `indices` and of the last argument.
fn intersect_outputs(
    ctx: &ParsingContext,
    args: &[Expression],
    initial: ValueTypes,
    indices: impl Iterator<Item = usize>,
    include_last: bool,
) -> Result<ValueTypes, ExprError> {
    let mut types = initial;
    for i in indices {
        types &= get_value_type(ctx, &args[i])?;
    }
    if include_last {
        if let Some(last) = args.last() {
            types &= get_value_type(ctx, last)?;
        }
    }
    Ok(types)
}

fn interpolate_type(ctx: &ParsingContext, args: &[Expression]) -> Result<ValueTypes, ExprError> {
    let initial = ValueTypes::COLOR | ValueTypes::NUMBER;
    intersect_outputs(ctx, args, initial, (3..args.len()).step_by(2), false)
}

fn match_type(ctx: &ParsingContext, args: &[Expression]) -> Result<ValueTypes, ExprError> {
    intersect_outputs(ctx, args, ValueTypes::ANY, (2..args.len()).step_by(2), true)
}

fn case_type(ctx: &ParsingContext, args: &[Expression]) -> Result<ValueTypes, ExprError> {
    intersect_outputs(ctx, args, ValueTypes::ANY, (1..args.len()).step_by(2), true)
}

// --- Inputs ---

fn get(ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    assert_args_count(args, 1)?;
    let name = assert_string_identifier(&args[0])?;
    ctx.reference_attribute(name);
    let prefix = if ctx.in_fragment_shader { "v_" } else { "a_" };
    Ok(format!("{prefix}{name}"))
}

fn var(ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    assert_args_count(args, 1)?;
    let name = assert_string_identifier(&args[0])?;
    ctx.reference_variable(name);
    Ok(uniform_name_for_variable(name))
}

fn time(_ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    assert_args_count(args, 0)?;
    Ok("u_time".to_string())
}

fn zoom(_ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    assert_args_count(args, 0)?;
    Ok("u_zoom".to_string())
}

fn resolution(_ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    assert_args_count(args, 0)?;
    Ok("u_resolution".to_string())
}

// --- Math ---

fn variadic_numeric(ctx: &mut ParsingContext, args: &[Expression], glue: &str) -> Result<String, ExprError> {
    assert_args_min_count(args, 2)?;
    assert_numbers(ctx, args)?;
    let parts = compile_all(ctx, args, Some(ValueTypes::NUMBER))?;
    Ok(format!("({})", parts.join(glue)))
}

/// Checks the argument count and that every argument is numeric, then compiles them.
fn numeric_args(ctx: &mut ParsingContext, args: &[Expression], count: usize) -> Result<Vec<String>, ExprError> {
    assert_args_count(args, count)?;
    assert_numbers(ctx, args)?;
    compile_all(ctx, args, Some(ValueTypes::NUMBER))
}

fn unary_function(ctx: &mut ParsingContext, args: &[Expression], function: &str) -> Result<String, ExprError> {
    let parts = numeric_args(ctx, args, 1)?;
    Ok(format!("{function}({})", parts[0]))
}

fn binary_infix(ctx: &mut ParsingContext, args: &[Expression], op: &str) -> Result<String, ExprError> {
    let parts = numeric_args(ctx, args, 2)?;
    Ok(format!("({} {op} {})", parts[0], parts[1]))
}

fn binary_function(ctx: &mut ParsingContext, args: &[Expression], function: &str) -> Result<String, ExprError> {
    let parts = numeric_args(ctx, args, 2)?;
    Ok(format!("{function}({}, {})", parts[0], parts[1]))
}

fn multiply(ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    variadic_numeric(ctx, args, " * ")
}

fn add(ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    variadic_numeric(ctx, args, " + ")
}

fn divide(ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    binary_infix(ctx, args, "/")
}

fn subtract(ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    binary_infix(ctx, args, "-")
}

fn clamp(ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    let parts = numeric_args(ctx, args, 3)?;
    Ok(format!("clamp({}, {}, {})", parts[0], parts[1], parts[2]))
}

fn modulo(ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    binary_function(ctx, args, "mod")
}

fn power(ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    binary_function(ctx, args, "pow")
}

fn abs(ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    unary_function(ctx, args, "abs")
}

fn floor(ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    unary_function(ctx, args, "floor")
}

fn round(ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    let parts = numeric_args(ctx, args, 1)?;
    Ok(format!("floor({} + 0.5)", parts[0]))
}

fn ceil(ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    unary_function(ctx, args, "ceil")
}

fn sin(ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    unary_function(ctx, args, "sin")
}

fn cos(ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    unary_function(ctx, args, "cos")
}

fn atan(ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    assert_args_min_count(args, 1)?;
    assert_args_max_count(args, 2)?;
    assert_numbers(ctx, args)?;
    let parts = compile_all(ctx, args, Some(ValueTypes::NUMBER))?;
    Ok(format!("atan({})", parts.join(", ")))
}

// --- Logic ---

fn greater(ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    binary_infix(ctx, args, ">")
}

fn greater_or_equal(ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    binary_infix(ctx, args, ">=")
}

fn less(ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    binary_infix(ctx, args, "<")
}

fn less_or_equal(ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    binary_infix(ctx, args, "<=")
}

fn equality(ctx: &mut ParsingContext, args: &[Expression], op: &str) -> Result<String, ExprError> {
    assert_args_count(args, 2)?;
    let mut shared = ValueTypes::ANY;
    shared &= get_value_type(ctx, &args[0])?;
    shared &= get_value_type(ctx, &args[1])?;
    if shared.is_empty() {
        return Err(ExprError::IncompatibleTypes(describe(args)));
    }
    // Colors are compared by their literal codes, never as vectors.
    shared &= !ValueTypes::COLOR;
    let left = expression_to_glsl(ctx, &args[0], Some(shared))?;
    let right = expression_to_glsl(ctx, &args[1], Some(shared))?;
    Ok(format!("({left} {op} {right})"))
}

fn equal(ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    equality(ctx, args, "==")
}

fn not_equal(ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    equality(ctx, args, "!=")
}

fn not(ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    assert_args_count(args, 1)?;
    assert_boolean(ctx, &args[0])?;
    let operand = expression_to_glsl(ctx, &args[0], None)?;
    Ok(format!("(!{operand})"))
}

fn boolean_chain(ctx: &mut ParsingContext, args: &[Expression], glue: &str) -> Result<String, ExprError> {
    assert_args_min_count(args, 2)?;
    args.iter().try_for_each(|arg| assert_boolean(ctx, arg))?;
    let parts = compile_all(ctx, args, Some(ValueTypes::BOOLEAN))?;
    Ok(format!("({})", parts.join(glue)))
}

fn all(ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    boolean_chain(ctx, args, " && ")
}

fn any(ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    boolean_chain(ctx, args, " || ")
}

fn between(ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    let parts = numeric_args(ctx, args, 3)?;
    let (value, low, high) = (&parts[0], &parts[1], &parts[2]);
    Ok(format!("({value} >= {low} && {value} <= {high})"))
}

// --- Conversion ---

fn array(ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    assert_args_min_count(args, 2)?;
    assert_args_max_count(args, 4)?;
    assert_numbers(ctx, args)?;
    let parts = compile_all(ctx, args, Some(ValueTypes::NUMBER))?;
    Ok(format!("vec{}({})", args.len(), parts.join(", ")))
}

fn color(ctx: &mut ParsingContext, args: &[Expression], _hint: Option<ValueTypes>) -> Result<String, ExprError> {
    assert_args_min_count(args, 3)?;
    assert_args_max_count(args, 4)?;
    assert_numbers(ctx, args)?;
    let mut parts = Vec::with_capacity(4);
    for (i, arg) in args.iter().enumerate() {
        let channel = expression_to_glsl(ctx, arg, Some(ValueTypes::NUMBER))?;
        parts.push(if i < 3 { format!("{channel} / 255.0") } else { channel });
    }
    if parts.len() == 3 {
        parts.push("1.0".to_string());
    }
    Ok(format!("vec4({})", parts.join(", ")))
}

// --- Conditionals ---

fn interpolation_exponent(kind: &Expression) -> Result<f64, ExprError> {
    let invalid = || ExprError::InvalidInterpolation(kind.to_string());
    match kind {
        Expression::Call { operator, args } if operator == "linear" && args.is_empty() => Ok(1.0),
        Expression::Call { operator, args } if operator == "exponential" => match args.as_slice() {
            [Expression::Number(exponent)] if *exponent != 0.0 => Ok(*exponent),
            _ => Err(invalid()),
        },
        _ => Err(invalid()),
    }
}

fn interpolate(ctx: &mut ParsingContext, args: &[Expression], hint: Option<ValueTypes>) -> Result<String, ExprError> {
    assert_args_even(args)?;
    assert_args_min_count(args, 6)?;
    let exponent = number_to_glsl(interpolation_exponent(&args[0])?);

    let output_type = interpolate_type(ctx, args)? & hint.unwrap_or(ValueTypes::ANY);
    assert_unique_inferred_type(args, output_type)?;

    let input = expression_to_glsl(ctx, &args[1], None)?;
    let mut result: Option<String> = None;
    for i in (2..args.len() - 2).step_by(2) {
        let stop1 = expression_to_glsl(ctx, &args[i], None)?;
        let output1 = match result.take() {
            Some(previous) => previous,
            None => expression_to_glsl(ctx, &args[i + 1], Some(output_type))?,
        };
        let stop2 = expression_to_glsl(ctx, &args[i + 2], None)?;
        let output2 = expression_to_glsl(ctx, &args[i + 3], Some(output_type))?;
        result = Some(format!(
            "mix({output1}, {output2}, pow(clamp(({input} - {stop1}) / ({stop2} - {stop1}), 0.0, 1.0), {exponent}))"
        ));
    }
    result.ok_or_else(|| ExprError::ArgsMinCount { expected: 6, found: args.len() })
}

fn match_(ctx: &mut ParsingContext, args: &[Expression], hint: Option<ValueTypes>) -> Result<String, ExprError> {
    assert_args_even(args)?;
    assert_args_min_count(args, 4)?;
    let output_type = match_type(ctx, args)? & hint.unwrap_or(ValueTypes::ANY);
    assert_unique_inferred_type(args, output_type)?;

    let input = expression_to_glsl(ctx, &args[0], None)?;
    let mut result = expression_to_glsl(ctx, &args[args.len() - 1], Some(output_type))?;
    for i in (1..args.len() - 1).step_by(2).rev() {
        let candidate = expression_to_glsl(ctx, &args[i], None)?;
        let output = expression_to_glsl(ctx, &args[i + 1], Some(output_type))?;
        result = format!("({input} == {candidate} ? {output} : {result})");
    }
    Ok(result)
}

fn case(ctx: &mut ParsingContext, args: &[Expression], hint: Option<ValueTypes>) -> Result<String, ExprError> {
    assert_args_odd(args)?;
    assert_args_min_count(args, 3)?;
    let output_type = case_type(ctx, args)? & hint.unwrap_or(ValueTypes::ANY);
    assert_unique_inferred_type(args, output_type)?;
    for condition in args.iter().step_by(2).take(args.len() / 2) {
        assert_boolean(ctx, condition)?;
    }

    let mut result = expression_to_glsl(ctx, &args[args.len() - 1], Some(output_type))?;
    for i in (0..args.len() - 1).step_by(2).rev() {
        let condition = expression_to_glsl(ctx, &args[i], None)?;
        let output = expression_to_glsl(ctx, &args[i + 1], Some(output_type))?;
        result = format!("({condition} ? {output} : {result})");
    }
    Ok(result)
}
