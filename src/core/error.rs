//! Error types for tree construction, evaluation, compilation and execution.

use thiserror::Error;

use crate::core::expr::NodeTag;

/// Errors produced by the engine.
///
/// Usage errors describe impossible requests made by the caller. `Internal`
/// marks a broken engine invariant and is always logged before it is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    /// A node was rebuilt with the wrong number of children.
    #[error("node `{tag}` takes {expected} children, {got} given")]
    ArityMismatch {
        tag: NodeTag,
        expected: usize,
        got: usize,
    },

    /// A node kind cannot be rebuilt from its tag alone (it carries metadata).
    #[error("node `{0}` cannot be built from a tag and children alone")]
    MissingMetadata(NodeTag),

    /// A compiled function was called with the wrong number of parameters.
    #[error("wrong number of arguments: expected {expected}, got {got}")]
    WrongArgumentCount { expected: usize, got: usize },

    /// The tree cannot be collapsed to a single value.
    #[error("cannot evaluate: {0}")]
    CannotEvaluate(String),

    /// The tree contains a node the bytecode compiler has no instruction for.
    #[error("cannot compile node `{0}`")]
    UncompilableNode(String),

    /// Differentiation was requested for a boolean or comparison node.
    #[error("cannot differentiate node `{0}`")]
    NotDifferentiable(String),

    /// A free variable is not in the compiled function's parameter list.
    #[error("variable `{0}` is not a parameter of the compiled function")]
    UnboundVariable(String),

    /// The active cancellation token was triggered.
    #[error("operation cancelled")]
    Cancelled,

    /// Engine defect: stack imbalance, catalogue gap, ...
    #[error("internal error: {0}")]
    Internal(String),
}

impl MathError {
    /// Build an [`MathError::Internal`] and log it, internal failures are never silent.
    pub(crate) fn internal(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        log::error!("{msg}");
        Self::Internal(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MathError::WrongArgumentCount {
            expected: 2,
            got: 1,
        };
        assert_eq!(
            err.to_string(),
            "wrong number of arguments: expected 2, got 1"
        );

        let err = MathError::ArityMismatch {
            tag: NodeTag::Pow,
            expected: 2,
            got: 3,
        };
        assert_eq!(err.to_string(), "node `pow` takes 2 children, 3 given");
    }
}
