//! Profile serializer: turns a profile set into the text of a profile file.
//!
//! Output layout:
//!
//! 1. metadata comments (when requested): modification time and repository
//!    provenance
//! 2. the root's initial comment
//! 3. file-scoped shared declarations for the profile's file
//! 4. the profile block with its hats
//!
//! The full text is built in memory; any failure returns no output.

use chrono::{Local, NaiveDateTime};
use profile_types::{
    DefaultQuoter, FileDeclarations, NameQuoter, ProfileFile, ProfileNode, ProfileSet,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{WriterError, WriterResult};
use crate::hat_tree::ProfileWriter;
use crate::locator::ProfileLocator;
use crate::sections::write_declarations;

/// `asctime`-style timestamp used in the `Last Modified` comment.
pub const TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

// ── Options ────────────────────────────────────────────────────────────

/// Per-call serialization switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializeOptions {
    /// Write the `Last Modified` and `REPOSITORY` comments.
    pub include_metadata: bool,
    /// Drop every `flags=(...)` clause.
    pub no_flags: bool,
}

impl SerializeOptions {
    pub fn with_metadata(mut self) -> Self {
        self.include_metadata = true;
        self
    }

    pub fn without_flags(mut self) -> Self {
        self.no_flags = true;
        self
    }
}

// ── Clock ──────────────────────────────────────────────────────────────

/// Source of the modification timestamp.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

// ── Serializer ─────────────────────────────────────────────────────────

/// Entry point for writing profiles.
pub struct ProfileSerializer<'a> {
    quoter: Box<dyn NameQuoter + 'a>,
    clock: Box<dyn Clock + 'a>,
    locator: ProfileLocator,
    declarations: Option<&'a FileDeclarations>,
}

impl Default for ProfileSerializer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> ProfileSerializer<'a> {
    pub fn new() -> Self {
        Self {
            quoter: Box::new(DefaultQuoter),
            clock: Box::new(SystemClock),
            locator: ProfileLocator::default(),
            declarations: None,
        }
    }

    pub fn with_quoter(mut self, quoter: impl NameQuoter + 'a) -> Self {
        self.quoter = Box::new(quoter);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'a) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_locator(mut self, locator: ProfileLocator) -> Self {
        self.locator = locator;
        self
    }

    /// Shared declarations looked up by the profile's filename.
    pub fn with_declarations(mut self, declarations: &'a FileDeclarations) -> Self {
        self.declarations = Some(declarations);
        self
    }

    pub fn locator(&self) -> &ProfileLocator {
        &self.locator
    }

    /// Serialize the profile `name` and its hats. The result always ends
    /// with a newline.
    pub fn serialize(
        &self,
        profiles: &ProfileSet,
        name: &str,
        options: SerializeOptions,
    ) -> WriterResult<String> {
        let root = profiles
            .get(name)
            .ok_or_else(|| WriterError::UnknownProfile(name.to_string()))?;

        debug!(
            profile = name,
            nodes = profiles.len(),
            include_metadata = options.include_metadata,
            no_flags = options.no_flags,
            "Serializing profile"
        );

        let mut string = String::new();
        if options.include_metadata {
            string.push_str(&self.metadata(root));
        }

        if let Some(comment) = root.initial_comment.as_deref().filter(|c| !c.is_empty()) {
            string.push_str(&unescape_newlines(comment));
            string.push('\n');
        }

        let mut data = Vec::new();

        let filename = self.locator.filename(name);
        if let Some(decls) = self.declarations.and_then(|d| d.get(&filename)) {
            debug!(file = %filename.display(), "Writing shared declarations");
            data.extend(write_declarations(decls, 0));
        }

        let writer = ProfileWriter::new(&*self.quoter, !options.no_flags);
        data.extend(writer.write_piece(profiles, 0, name, name)?);

        string.push_str(&data.join("\n"));
        string.push('\n');
        Ok(string)
    }

    /// Serialize every profile stored in one file.
    ///
    /// Metadata comes from `primary`; the shared declarations are written
    /// once, followed by each profile (initial comment, then block) in name
    /// order, separated by blank lines.
    pub fn serialize_file(
        &self,
        file: &ProfileFile,
        primary: &str,
        options: SerializeOptions,
    ) -> WriterResult<String> {
        let root = file
            .profiles
            .get(primary)
            .and_then(|set| set.get(primary))
            .ok_or_else(|| WriterError::UnknownProfile(primary.to_string()))?;

        debug!(
            profile = primary,
            profiles = file.profiles.len(),
            "Serializing profile file"
        );

        let mut string = String::new();
        if options.include_metadata {
            string.push_str(&self.metadata(root));
        }

        let writer = ProfileWriter::new(&*self.quoter, !options.no_flags);
        let mut data = write_declarations(&file.declarations, 0);

        for (index, (name, profiles)) in file.profiles.iter().enumerate() {
            let node = profiles
                .get(name)
                .ok_or_else(|| WriterError::UnknownProfile(name.clone()))?;

            if index > 0 {
                data.push(String::new());
            }
            if let Some(comment) = node.initial_comment.as_deref().filter(|c| !c.is_empty()) {
                data.push(unescape_newlines(comment));
            }
            data.extend(writer.write_piece(profiles, 0, name, name)?);
        }

        string.push_str(&data.join("\n"));
        string.push('\n');
        Ok(string)
    }

    fn metadata(&self, root: &ProfileNode) -> String {
        let mut out = format!(
            "# Last Modified: {}\n",
            self.clock.now().format(TIMESTAMP_FORMAT)
        );

        match &root.repo {
            Some(repo) if repo.is_complete() => {
                out.push_str(&format!(
                    "# REPOSITORY: {} {} {}\n",
                    repo.url, repo.user, repo.id
                ));
            }
            Some(repo) if repo.neversubmit => out.push_str("# REPOSITORY: NEVERSUBMIT\n"),
            _ => {}
        }

        out
    }
}

/// Turn literal `\n` escapes into newlines.
fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}
