//! Profile Writer
//!
//! Serializes an in-memory profile tree into the policy language consumed by
//! the profile compiler.
//!
//! Data flows strictly downward:
//!
//! ```text
//! ProfileSerializer      metadata, initial comment, shared declarations
//!        │
//!        ▼
//! ProfileWriter::write_piece   declared / embedded / external hats
//!        │           │
//!        ▼           ▼
//! write_rules    write_header  (every nesting level)
//!        │
//!        ▼
//!      Rule::render
//! ```
//!
//! Output is deterministic: hats are visited in lexicographic order, rule
//! categories in a fixed order, and set-valued rule fields sorted.
//!
//! # Usage
//!
//! ```rust
//! use profile_types::{ProfileNode, ProfileSet, RawRule, RuleCategory};
//! use profile_writer::{ProfileSerializer, SerializeOptions};
//!
//! let profiles = ProfileSet::new()
//!     .with(
//!         "/usr/bin/foo",
//!         ProfileNode::new().with_rule(RuleCategory::Path, RawRule::path("/usr/bin/foo", "r")),
//!     )
//!     .with(
//!         "bar",
//!         ProfileNode::new().with_rule(RuleCategory::Capability, RawRule::capability("kill")),
//!     );
//!
//! let text = ProfileSerializer::new()
//!     .serialize(&profiles, "/usr/bin/foo", SerializeOptions::default())
//!     .unwrap();
//! assert_eq!(
//!     text,
//!     "/usr/bin/foo {\n  /usr/bin/foo r,\n\n  ^bar {\n    capability kill,\n  }\n}\n"
//! );
//! ```

#![deny(unsafe_code)]

mod error;
mod hat_tree;
mod header;
mod locator;
mod sections;
mod serializer;

pub use error::{WriterError, WriterResult};
pub use hat_tree::ProfileWriter;
pub use locator::{ProfileLocator, DEFAULT_PROFILE_DIR};
pub use sections::{write_category, write_declarations, write_rules};
pub use serializer::{
    Clock, FixedClock, ProfileSerializer, SerializeOptions, SystemClock, TIMESTAMP_FORMAT,
};
