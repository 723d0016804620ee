//! Defines the Abstract Syntax Tree (AST) for style expressions.
//!
//! Style expressions arrive as JSON values. Literals stay literals; an array
//! whose first element is a string is an operator call, e.g.
//! `["*", ["get", "size"], 2]`.
use crate::error::ExprError;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Expression {
    /// A numeric literal.
    Number(f64),
    /// A boolean literal.
    Bool(bool),
    /// A string literal; may also read as a color.
    String(String),
    /// A literal array made only of numbers.
    NumberArray(Vec<f64>),
    /// An operator applied to its arguments.
    Call { operator: String, args: Vec<Expression> },
}

impl Expression {
    /// Builds an expression tree from a JSON value.
    pub fn from_value(value: &Value) -> Result<Self, ExprError> {
        match value {
            Value::Number(n) => n
                .as_f64()
                .map(Expression::Number)
                .ok_or_else(|| ExprError::UnhandledValue(value.to_string())),
            Value::Bool(b) => Ok(Expression::Bool(*b)),
            Value::String(s) => Ok(Expression::String(s.clone())),
            Value::Array(items) => {
                if let Some(numbers) = items.iter().map(Value::as_f64).collect::<Option<Vec<_>>>()
                {
                    return Ok(Expression::NumberArray(numbers));
                }
                match items.split_first() {
                    Some((Value::String(operator), rest)) => Ok(Expression::Call {
                        operator: operator.clone(),
                        args: rest
                            .iter()
                            .map(Expression::from_value)
                            .collect::<Result<_, _>>()?,
                    }),
                    _ => Err(ExprError::ExpectedOperator(value.to_string())),
                }
            }
            Value::Null | Value::Object(_) => Err(ExprError::UnhandledValue(value.to_string())),
        }
    }

    /// Shorthand for an operator call.
    pub fn call(operator: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::Call {
            operator: operator.into(),
            args,
        }
    }

    /// The JSON form of this expression.
    pub fn to_value(&self) -> Value {
        match self {
            Expression::Number(n) => number_value(*n),
            Expression::Bool(b) => Value::Bool(*b),
            Expression::String(s) => Value::String(s.clone()),
            Expression::NumberArray(numbers) => {
                Value::Array(numbers.iter().map(|n| number_value(*n)).collect())
            }
            Expression::Call { operator, args } => {
                let mut items = Vec::with_capacity(args.len() + 1);
                items.push(Value::String(operator.clone()));
                items.extend(args.iter().map(Expression::to_value));
                Value::Array(items)
            }
        }
    }
}

fn number_value(n: f64) -> Value {
    Number::from_f64(n).map_or(Value::Null, Value::Number)
}

/// Renders a list of arguments the way they were written, for error messages.
pub(crate) fn describe(args: &[Expression]) -> String {
    Value::Array(args.iter().map(Expression::to_value).collect()).to_string()
}

impl TryFrom<Value> for Expression {
    type Error = ExprError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Expression::from_value(&value)
    }
}

impl From<Expression> for Value {
    fn from(expression: Expression) -> Self {
        expression.to_value()
    }
}

impl From<f64> for Expression {
    fn from(n: f64) -> Self {
        Expression::Number(n)
    }
}

impl From<bool> for Expression {
    fn from(b: bool) -> Self {
        Expression::Bool(b)
    }
}

impl From<&str> for Expression {
    fn from(s: &str) -> Self {
        Expression::String(s.to_string())
    }
}

impl From<Vec<f64>> for Expression {
    fn from(numbers: Vec<f64>) -> Self {
        Expression::NumberArray(numbers)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_literals() {
        assert_eq!(Expression::from_value(&json!(2)).unwrap(), Expression::Number(2.0));
        assert_eq!(Expression::from_value(&json!(true)).unwrap(), Expression::Bool(true));
        assert_eq!(
            Expression::from_value(&json!([0, 0, 1, 1])).unwrap(),
            Expression::NumberArray(vec![0.0, 0.0, 1.0, 1.0])
        );
    }

    #[test]
    fn test_nested_call() {
        let expr = Expression::from_value(&json!(["*", ["get", "size"], 2])).unwrap();
        assert_eq!(
            expr,
            Expression::call(
                "*",
                vec![Expression::call("get", vec!["size".into()]), 2.0.into()]
            )
        );
        assert_eq!(expr.to_string(), r#"["*",["get","size"],2.0]"#);
    }

    #[test]
    fn test_rejects_unhandled_values() {
        assert!(matches!(
            Expression::from_value(&json!(null)),
            Err(ExprError::UnhandledValue(_))
        ));
        assert!(matches!(
            Expression::from_value(&json!({"a": 1})),
            Err(ExprError::UnhandledValue(_))
        ));
        assert!(matches!(
            Expression::from_value(&json!([1, "a"])),
            Err(ExprError::ExpectedOperator(_))
        ));
    }

    #[test]
    fn test_deserialize_through_serde() {
        let expr: Expression = serde_json::from_value(json!(["var", "threshold"])).unwrap();
        assert_eq!(expr, Expression::call("var", vec!["threshold".into()]));
        assert!(serde_json::from_value::<Expression>(json!(null)).is_err());
    }
}
