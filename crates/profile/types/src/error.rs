//! Error types for name quoting.

use thiserror::Error;

/// Errors raised when a name cannot be written as a policy-language token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    /// The name is empty.
    #[error("cannot quote an empty name")]
    Empty,

    /// The name contains a character that has no quoted representation.
    #[error("name {name:?} is not representable: {reason}")]
    Unrepresentable { name: String, reason: String },
}

/// Convenience result type for quoting operations.
pub type QuoteResult<T> = Result<T, QuoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_empty() {
        assert_eq!(QuoteError::Empty.to_string(), "cannot quote an empty name");
    }

    #[test]
    fn error_display_unrepresentable() {
        let err = QuoteError::Unrepresentable {
            name: "a\"b".into(),
            reason: "contains a double quote".into(),
        };
        assert_eq!(
            err.to_string(),
            "name \"a\\\"b\" is not representable: contains a double quote"
        );
    }
}
