//! Debugger core errors.

use smol_str::SmolStr;
use thiserror::Error;

/// Errors reported by breakpoint table operations and session setup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DebugError {
    /// Breakpoint number outside `[1..len]`.
    #[error("Breakpoint number {number} not in range [1..{len}]")]
    OutOfRange { number: usize, len: usize },

    /// Condition or command expression failed to evaluate.
    #[error(transparent)]
    Eval(#[from] EvalError),

    /// Invalid configuration value.
    #[error("invalid config: {0}")]
    InvalidConfig(SmolStr),

    /// Filesystem or environment failure.
    #[error("io error: {0}")]
    Io(SmolStr),
}

impl DebugError {
    /// The valid breakpoint range for an out-of-range error, if any.
    #[must_use]
    pub fn valid_range(&self) -> Option<(usize, usize)> {
        match self {
            DebugError::OutOfRange { len, .. } => Some((1, *len)),
            _ => None,
        }
    }
}

/// Failure reported by a condition evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to evaluate '{expression}': {message}")]
pub struct EvalError {
    /// Expression text that was being evaluated.
    pub expression: SmolStr,
    /// Evaluator-specific failure message.
    pub message: SmolStr,
}

impl EvalError {
    #[must_use]
    pub fn new(expression: impl Into<SmolStr>, message: impl Into<SmolStr>) -> Self {
        Self {
            expression: expression.into(),
            message: message.into(),
        }
    }
}
