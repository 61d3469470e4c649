use thiserror::Error;

/// Anything that can go wrong while evaluating an expression.
///
/// The `Display` form is what the counterpart receives in place of a
/// result, so it mirrors the familiar `Kind: message` shape.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("SyntaxError: {0}")]
    Syntax(String),

    #[error("ReferenceError: {0} is not defined")]
    Reference(String),

    #[error("TypeError: {0}")]
    Type(String),

    #[error("RangeError: {0}")]
    Range(String),
}

impl EvalError {
    pub(crate) fn syntax(msg: impl Into<String>) -> Self {
        EvalError::Syntax(msg.into())
    }

    pub(crate) fn type_error(msg: impl Into<String>) -> Self {
        EvalError::Type(msg.into())
    }
}
