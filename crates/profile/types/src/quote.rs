//! Name quoting.
//!
//! Profile, hat and path names are bare tokens in the policy language unless
//! they contain whitespace, in which case they must be wrapped in double
//! quotes. Names that cannot be expressed even when quoted are rejected.

use std::borrow::Cow;

use crate::error::{QuoteError, QuoteResult};

/// Decides whether a name needs quoting and returns its written form.
pub trait NameQuoter: Send + Sync {
    /// Return `name` as it must appear in policy text.
    fn quote(&self, name: &str) -> QuoteResult<String>;
}

/// Quoter implementing the policy language's bare-token rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultQuoter;

impl NameQuoter for DefaultQuoter {
    fn quote(&self, name: &str) -> QuoteResult<String> {
        if name.is_empty() {
            return Err(QuoteError::Empty);
        }
        if let Some(reason) = unrepresentable(name) {
            return Err(QuoteError::Unrepresentable {
                name: name.to_string(),
                reason: reason.to_string(),
            });
        }
        Ok(quote_if_needed(name).into_owned())
    }
}

fn unrepresentable(name: &str) -> Option<&'static str> {
    if name.contains('"') {
        Some("contains a double quote")
    } else if name.contains('\0') {
        Some("contains a NUL byte")
    } else if name.contains(['\n', '\r']) {
        Some("contains a line break")
    } else {
        None
    }
}

/// Wrap `data` in double quotes if it contains whitespace.
///
/// Infallible counterpart of [`DefaultQuoter`], used by the rule constructors
/// whose inputs are trusted to be well-formed.
pub fn quote_if_needed(data: &str) -> Cow<'_, str> {
    if data.chars().any(char::is_whitespace) {
        Cow::Owned(format!("\"{}\"", data))
    } else {
        Cow::Borrowed(data)
    }
}
