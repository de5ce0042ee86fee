//! Error types for profile serialization.

use profile_types::QuoteError;
use thiserror::Error;

/// Errors that abort a serialize call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriterError {
    /// The requested profile is not a key of the profile set.
    #[error("unknown profile: {0}")]
    UnknownProfile(String),

    /// A name could not be quoted for output.
    #[error("quoting failed: {0}")]
    Quote(#[from] QuoteError),
}

/// Convenience result type for writer operations.
pub type WriterResult<T> = Result<T, WriterError>;
