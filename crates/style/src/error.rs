use stipple_expr::ExprError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StyleError {
    /// The symbol shape tag is not one of `square`, `circle`, `triangle`, `image`.
    #[error("Unexpected symbol type: {0}")]
    UnknownSymbolType(String),

    /// Raised by a uniform callback, not at compile time.
    #[error("The following variable is missing from the style: {0}")]
    MissingVariable(String),

    #[error(transparent)]
    Expression(#[from] ExprError),

    #[error("Invalid style JSON: {0}")]
    Json(#[from] serde_json::Error),
}
