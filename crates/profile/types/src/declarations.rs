//! File-scoped declarations.
//!
//! Aliases, variables and includes that apply to every profile stored in one
//! profile file are written once at the top of that file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::profile::{ProfileSet, RuleCategory};
use crate::rule::Rule;

/// Declarations shared by all profiles in one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedDeclarations {
    pub alias: Vec<Rule>,
    pub variables: Vec<Rule>,
    pub includes: Vec<Rule>,
}

impl SharedDeclarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration. Non-declaration categories are ignored and
    /// reported back as `false`.
    pub fn push(&mut self, category: RuleCategory, rule: impl Into<Rule>) -> bool {
        let target = match category {
            RuleCategory::Alias => &mut self.alias,
            RuleCategory::Variable => &mut self.variables,
            RuleCategory::Include => &mut self.includes,
            _ => return false,
        };
        target.push(rule.into());
        true
    }

    pub fn with(mut self, category: RuleCategory, rule: impl Into<Rule>) -> Self {
        self.push(category, rule);
        self
    }

    /// Categories in write order: alias, variables, includes.
    pub fn iter(&self) -> impl Iterator<Item = (RuleCategory, &[Rule])> {
        [
            (RuleCategory::Alias, self.alias.as_slice()),
            (RuleCategory::Variable, self.variables.as_slice()),
            (RuleCategory::Include, self.includes.as_slice()),
        ]
        .into_iter()
    }

    pub fn is_empty(&self) -> bool {
        self.alias.is_empty() && self.variables.is_empty() && self.includes.is_empty()
    }
}

/// Read-only lookup of shared declarations by profile filename.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileDeclarations {
    files: BTreeMap<PathBuf, SharedDeclarations>,
}

impl FileDeclarations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, filename: impl Into<PathBuf>, decls: SharedDeclarations) {
        self.files.insert(filename.into(), decls);
    }

    pub fn get(&self, filename: &Path) -> Option<&SharedDeclarations> {
        self.files.get(filename)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Every profile stored in one file, with the declarations they share.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileFile {
    pub declarations: SharedDeclarations,
    /// Top-level profile name → that profile and its hats.
    pub profiles: BTreeMap<String, ProfileSet>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RawRule;

    #[test]
    fn push_rejects_enforcement_rules() {
        let mut decls = SharedDeclarations::new();
        assert!(decls.push(RuleCategory::Include, RawRule::include("tunables/global")));
        assert!(!decls.push(RuleCategory::Capability, RawRule::capability("kill")));
        assert_eq!(decls.includes.len(), 1);
        assert!(!decls.is_empty());
    }

    #[test]
    fn iter_yields_alias_variables_includes() {
        let decls = SharedDeclarations::new()
            .with(RuleCategory::Include, RawRule::include("tunables/global"))
            .with(RuleCategory::Alias, RawRule::alias("/usr/", "/mnt/usr/"));
        let cats: Vec<_> = decls.iter().map(|(c, _)| c).collect();
        assert_eq!(
            cats,
            vec![RuleCategory::Alias, RuleCategory::Variable, RuleCategory::Include]
        );
    }

    #[test]
    fn lookup_by_filename() {
        let mut files = FileDeclarations::new();
        files.insert(
            "/etc/apparmor.d/usr.bin.foo",
            SharedDeclarations::new().with(RuleCategory::Include, RawRule::include("tunables/global")),
        );
        assert!(files.get(Path::new("/etc/apparmor.d/usr.bin.foo")).is_some());
        assert!(files.get(Path::new("/etc/apparmor.d/usr.bin.bar")).is_none());
        assert_eq!(files.len(), 1);
    }
}
