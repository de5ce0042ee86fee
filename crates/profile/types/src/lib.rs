//! Profile Types
//!
//! In-memory model of a mandatory-access-control security profile: a named
//! top-level profile plus the hats nested beneath it, each carrying ordered
//! rule collections.
//!
//! - **Rules**: [`RawRule`] (verbatim body with audit/deny modifiers) and
//!   [`BusRule`] (set-valued bus access rule), unified under [`Rule`]
//! - **Profiles**: [`ProfileNode`] and the flat [`ProfileSet`] namespace
//! - **Declarations**: file-scoped aliases, variables and includes shared by
//!   every profile in one file
//! - **Quoting**: the [`NameQuoter`] seam used when names are written out
//!
//! # Example
//!
//! ```rust
//! use profile_types::{ProfileNode, ProfileSet, RawRule, RuleCategory};
//!
//! let mut set = ProfileSet::new();
//! set.insert(
//!     "/usr/bin/foo",
//!     ProfileNode::new().with_rule(RuleCategory::Path, RawRule::path("/usr/bin/foo", "r")),
//! );
//! set.insert(
//!     "bar",
//!     ProfileNode::new().with_rule(RuleCategory::Capability, RawRule::capability("kill")),
//! );
//!
//! assert_eq!(set.hats_of("/usr/bin/foo").count(), 1);
//! ```

#![deny(unsafe_code)]

mod declarations;
mod error;
mod profile;
mod quote;
mod rule;

pub use declarations::{FileDeclarations, ProfileFile, SharedDeclarations};
pub use error::{QuoteError, QuoteResult};
pub use profile::{ProfileNode, ProfileSet, RepoInfo, RuleCategory, RuleSections};
pub use quote::{quote_if_needed, DefaultQuoter, NameQuoter};
pub use rule::{BusRule, FileAccess, RawRule, Rule};
