//! Error types shared by the runtime core

use thiserror::Error;

/// Errors surfaced by the core DAG and operation types.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A structural contract was broken: malformed operation, cycle-inducing
    /// dependency, or an illegal status transition. Fatal; surfaced to the
    /// caller unchanged.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Lookup of an unknown vertex or tensor where an absent sentinel cannot
    /// be returned.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A failure reported by an external executor and recorded on the node.
    #[error("Execution failure: {0}")]
    ExecutionFailure(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::InvariantViolation("operand slot 2 unset".into());
        assert_eq!(err.to_string(), "Invariant violation: operand slot 2 unset");

        let err = CoreError::NotFound("vertex 42".into());
        assert!(err.to_string().contains("vertex 42"));
    }
}
