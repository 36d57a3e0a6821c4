use thiserror::Error;

/// Errors raised by the expression evaluator before or during parsing.
///
/// A well-formed expression never produces an error, even when the result is
/// `NaN` or infinite; callers decide how to show those.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("Invalid character '{ch}' at position {pos}")]
    InvalidCharacter { ch: char, pos: usize },
    #[error("Malformed number '{0}'")]
    MalformedNumber(String),
    #[error("Unexpected '{0}'")]
    UnexpectedToken(String),
    #[error("Unexpected end of expression")]
    UnexpectedEnd,
    #[error("Mismatched closing bracket")]
    ClosingBracketMismatch,
    #[error("Mismatched opening bracket")]
    OpenBracketMismatch,
    #[error("Empty expression")]
    EmptyExpression,
    #[error("Unknown key '{0}'")]
    UnknownKey(String),
}

pub type CalcResult = Result<f64, CalcError>;
