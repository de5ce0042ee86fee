//! Profile filename resolution.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default directory holding profile files.
pub const DEFAULT_PROFILE_DIR: &str = "/etc/apparmor.d";

/// Maps profile names to the files that store them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileLocator {
    profile_dir: PathBuf,
    existing: BTreeMap<String, PathBuf>,
}

impl Default for ProfileLocator {
    fn default() -> Self {
        Self::new(DEFAULT_PROFILE_DIR)
    }
}

impl ProfileLocator {
    pub fn new(profile_dir: impl Into<PathBuf>) -> Self {
        Self {
            profile_dir: profile_dir.into(),
            existing: BTreeMap::new(),
        }
    }

    /// Pin `profile` to a known file, bypassing name-based derivation.
    pub fn with_existing(mut self, profile: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        self.existing.insert(profile.into(), file.into());
        self
    }

    pub fn profile_dir(&self) -> &Path {
        &self.profile_dir
    }

    /// File for `profile`: a known mapping if one exists, otherwise the
    /// name with its leading `/` stripped (or `profile_` prepended for
    /// non-path names) and remaining `/` turned into `.`.
    pub fn filename(&self, profile: &str) -> PathBuf {
        if let Some(existing) = self.existing.get(profile) {
            return existing.clone();
        }
        let base = match profile.strip_prefix('/') {
            Some(rest) => rest.to_string(),
            None => format!("profile_{}", profile),
        };
        self.profile_dir.join(base.replace('/', "."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_profiles_flatten_to_dotted_names() {
        let locator = ProfileLocator::default();
        assert_eq!(
            locator.filename("/usr/bin/foo"),
            Path::new("/etc/apparmor.d/usr.bin.foo")
        );
    }

    #[test]
    fn named_profiles_get_prefix() {
        let locator = ProfileLocator::new("/tmp/profiles");
        assert_eq!(
            locator.filename("firefox"),
            Path::new("/tmp/profiles/profile_firefox")
        );
        assert_eq!(
            locator.filename("a/b"),
            Path::new("/tmp/profiles/profile_a.b")
        );
    }

    #[test]
    fn existing_mapping_wins() {
        let locator = ProfileLocator::default()
            .with_existing("/usr/bin/foo", "/etc/apparmor.d/local/custom");
        assert_eq!(
            locator.filename("/usr/bin/foo"),
            Path::new("/etc/apparmor.d/local/custom")
        );
        assert_eq!(locator.profile_dir(), Path::new("/etc/apparmor.d"));
    }
}
