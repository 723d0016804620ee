use stipple_types::ColorParseError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("Unhandled value type: {0}")]
    UnhandledValue(String),

    #[error("Expected an expression operator but received: {0}")]
    ExpectedOperator(String),

    #[error("Unrecognized expression operator: {0}")]
    UnknownOperator(String),

    #[error("Exactly {expected} arguments were expected, got {found} instead")]
    ArgsCount { expected: usize, found: usize },

    #[error("At least {expected} arguments were expected, got {found} instead")]
    ArgsMinCount { expected: usize, found: usize },

    #[error("At most {expected} arguments were expected, got {found} instead")]
    ArgsMaxCount { expected: usize, found: usize },

    #[error("An even amount of arguments was expected, got {0} instead")]
    ArgsEven(usize),

    #[error("An odd amount of arguments was expected, got {0} instead")]
    ArgsOdd(usize),

    #[error("A numeric value was expected, got {0} instead")]
    ExpectedNumber(String),

    #[error("A boolean value was expected, got {0} instead")]
    ExpectedBoolean(String),

    #[error("A string identifier was expected, got {0} instead")]
    ExpectedIdentifier(String),

    #[error("Could not infer only one type from the following expression: {0}")]
    AmbiguousType(String),

    #[error("All arguments should be of compatible type, got {0} instead")]
    IncompatibleTypes(String),

    #[error("Invalid interpolation type: {0}")]
    InvalidInterpolation(String),

    #[error("Array must have between 2 and 4 elements, got {0}")]
    ArrayLength(usize),

    #[error("Unexpected expression {expression} (expected type {expected})")]
    UnexpectedType { expression: String, expected: String },

    #[error(transparent)]
    Color(#[from] ColorParseError),
}
