//! Profile nodes and the flat profile namespace.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::rule::Rule;

// ── Rule categories ────────────────────────────────────────────────────

/// The rule collections a profile or hat can carry.
///
/// [`RuleCategory::ORDER`] is the order in which categories are written:
/// declarations (aliases, variables, includes) before any enforcement rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Alias,
    Variable,
    Include,
    Rlimit,
    Capability,
    Network,
    Dbus,
    Mount,
    Signal,
    Ptrace,
    PivotRoot,
    Unix,
    Link,
    Path,
    ChangeProfile,
}

impl RuleCategory {
    pub const ORDER: [RuleCategory; 15] = [
        RuleCategory::Alias,
        RuleCategory::Variable,
        RuleCategory::Include,
        RuleCategory::Rlimit,
        RuleCategory::Capability,
        RuleCategory::Network,
        RuleCategory::Dbus,
        RuleCategory::Mount,
        RuleCategory::Signal,
        RuleCategory::Ptrace,
        RuleCategory::PivotRoot,
        RuleCategory::Unix,
        RuleCategory::Link,
        RuleCategory::Path,
        RuleCategory::ChangeProfile,
    ];

    /// Snake-case category name, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::Alias => "alias",
            RuleCategory::Variable => "variable",
            RuleCategory::Include => "include",
            RuleCategory::Rlimit => "rlimit",
            RuleCategory::Capability => "capability",
            RuleCategory::Network => "network",
            RuleCategory::Dbus => "dbus",
            RuleCategory::Mount => "mount",
            RuleCategory::Signal => "signal",
            RuleCategory::Ptrace => "ptrace",
            RuleCategory::PivotRoot => "pivot_root",
            RuleCategory::Unix => "unix",
            RuleCategory::Link => "link",
            RuleCategory::Path => "path",
            RuleCategory::ChangeProfile => "change_profile",
        }
    }

    /// Declarations that may be hoisted to file scope.
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            RuleCategory::Alias | RuleCategory::Variable | RuleCategory::Include
        )
    }
}

impl std::fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered rule collections, one per [`RuleCategory`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSections {
    pub alias: Vec<Rule>,
    pub variables: Vec<Rule>,
    pub includes: Vec<Rule>,
    pub rlimits: Vec<Rule>,
    pub capabilities: Vec<Rule>,
    pub network: Vec<Rule>,
    pub dbus: Vec<Rule>,
    pub mount: Vec<Rule>,
    pub signal: Vec<Rule>,
    pub ptrace: Vec<Rule>,
    pub pivot_root: Vec<Rule>,
    pub unix: Vec<Rule>,
    pub links: Vec<Rule>,
    pub paths: Vec<Rule>,
    pub change_profile: Vec<Rule>,
}

impl RuleSections {
    /// Rules stored under `category`, in insertion order.
    pub fn get(&self, category: RuleCategory) -> &[Rule] {
        match category {
            RuleCategory::Alias => &self.alias,
            RuleCategory::Variable => &self.variables,
            RuleCategory::Include => &self.includes,
            RuleCategory::Rlimit => &self.rlimits,
            RuleCategory::Capability => &self.capabilities,
            RuleCategory::Network => &self.network,
            RuleCategory::Dbus => &self.dbus,
            RuleCategory::Mount => &self.mount,
            RuleCategory::Signal => &self.signal,
            RuleCategory::Ptrace => &self.ptrace,
            RuleCategory::PivotRoot => &self.pivot_root,
            RuleCategory::Unix => &self.unix,
            RuleCategory::Link => &self.links,
            RuleCategory::Path => &self.paths,
            RuleCategory::ChangeProfile => &self.change_profile,
        }
    }

    /// Mutable access to the rules under `category`.
    pub fn get_mut(&mut self, category: RuleCategory) -> &mut Vec<Rule> {
        match category {
            RuleCategory::Alias => &mut self.alias,
            RuleCategory::Variable => &mut self.variables,
            RuleCategory::Include => &mut self.includes,
            RuleCategory::Rlimit => &mut self.rlimits,
            RuleCategory::Capability => &mut self.capabilities,
            RuleCategory::Network => &mut self.network,
            RuleCategory::Dbus => &mut self.dbus,
            RuleCategory::Mount => &mut self.mount,
            RuleCategory::Signal => &mut self.signal,
            RuleCategory::Ptrace => &mut self.ptrace,
            RuleCategory::PivotRoot => &mut self.pivot_root,
            RuleCategory::Unix => &mut self.unix,
            RuleCategory::Link => &mut self.links,
            RuleCategory::Path => &mut self.paths,
            RuleCategory::ChangeProfile => &mut self.change_profile,
        }
    }

    /// Append `rule` to `category`.
    pub fn push(&mut self, category: RuleCategory, rule: impl Into<Rule>) {
        self.get_mut(category).push(rule.into());
    }

    /// Non-empty categories in write order.
    pub fn iter(&self) -> impl Iterator<Item = (RuleCategory, &[Rule])> + '_ {
        RuleCategory::ORDER
            .into_iter()
            .map(move |c| (c, self.get(c)))
            .filter(|(_, rules)| !rules.is_empty())
    }

    /// Total rules across every category.
    pub fn len(&self) -> usize {
        RuleCategory::ORDER.iter().map(|c| self.get(*c).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── Repository provenance ──────────────────────────────────────────────

/// Where a profile was fetched from, if it came from a profile repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoInfo {
    pub url: String,
    pub user: String,
    pub id: String,
    /// The profile must never be submitted back to the repository.
    pub neversubmit: bool,
}

impl RepoInfo {
    /// True when url, user and id are all known.
    pub fn is_complete(&self) -> bool {
        !self.url.is_empty() && !self.user.is_empty() && !self.id.is_empty()
    }
}

// ── ProfileNode ────────────────────────────────────────────────────────

/// One profile or hat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileNode {
    /// Flags clause text without the `flags=(...)` wrapper; empty for none.
    pub flags: String,
    /// A nested node written with the `profile` keyword instead of `^`.
    pub profile: bool,
    /// Body is appended, wrapped, after the owning profile's block.
    pub external: bool,
    /// Referenced by name only from the owning profile.
    pub declared: bool,
    /// Executable path the profile attaches to.
    pub attachment: Option<String>,
    /// Comment written after the opening brace.
    pub header_comment: Option<String>,
    /// Always write the `profile` keyword.
    pub profile_keyword: bool,
    /// Rules written inside the block.
    pub rules: RuleSections,
    /// Repository provenance for the metadata comment.
    pub repo: Option<RepoInfo>,
    /// Free text written before the profile; literal `\n` become newlines.
    pub initial_comment: Option<String>,
}

impl ProfileNode {
    /// An empty node with no flags and no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flags clause text.
    pub fn with_flags(mut self, flags: impl Into<String>) -> Self {
        self.flags = flags.into();
        self
    }

    /// Write the node with the `profile` keyword when embedded.
    pub fn as_profile(mut self) -> Self {
        self.profile = true;
        self
    }

    /// Mark the node as an external hat.
    pub fn external(mut self) -> Self {
        self.external = true;
        self
    }

    /// Mark the node as a declared hat.
    pub fn declared(mut self) -> Self {
        self.declared = true;
        self
    }

    /// Attach the profile to an executable path.
    pub fn with_attachment(mut self, attachment: impl Into<String>) -> Self {
        self.attachment = Some(attachment.into());
        self
    }

    /// Comment after the opening brace.
    pub fn with_header_comment(mut self, comment: impl Into<String>) -> Self {
        self.header_comment = Some(comment.into());
        self
    }

    /// Force the `profile` keyword.
    pub fn with_profile_keyword(mut self) -> Self {
        self.profile_keyword = true;
        self
    }

    /// Append a rule under `category`.
    pub fn with_rule(mut self, category: RuleCategory, rule: impl Into<Rule>) -> Self {
        self.rules.push(category, rule);
        self
    }

    /// Record repository provenance.
    pub fn with_repo(mut self, repo: RepoInfo) -> Self {
        self.repo = Some(repo);
        self
    }

    /// Free text written before the profile.
    pub fn with_initial_comment(mut self, comment: impl Into<String>) -> Self {
        self.initial_comment = Some(comment.into());
        self
    }

    /// Neither declared nor external: the body is written inline.
    pub fn is_embedded(&self) -> bool {
        !self.declared && !self.external
    }
}

// ── ProfileSet ─────────────────────────────────────────────────────────

/// Flat name → node namespace for one profile and its hats.
///
/// There are no parent pointers: when a node is being written, every other
/// key is one of its hats. Keys iterate in lexicographic order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileSet {
    profiles: BTreeMap<String, ProfileNode>,
}

impl ProfileSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, returning the one it replaced.
    pub fn insert(&mut self, name: impl Into<String>, node: ProfileNode) -> Option<ProfileNode> {
        self.profiles.insert(name.into(), node)
    }

    /// Builder form of [`ProfileSet::insert`].
    pub fn with(mut self, name: impl Into<String>, node: ProfileNode) -> Self {
        self.insert(name, node);
        self
    }

    /// The node stored under `name`.
    pub fn get(&self, name: &str) -> Option<&ProfileNode> {
        self.profiles.get(name)
    }

    /// True when `name` is a key of the set.
    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    /// Every key in lexicographic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Every entry in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProfileNode)> {
        self.profiles.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Every node except `name`, sorted by name.
    pub fn hats_of<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a ProfileNode)> + 'a {
        self.iter().filter(move |(hat, _)| *hat != name)
    }

    /// Number of nodes, the root included.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, ProfileNode)> for ProfileSet {
    fn from_iter<T: IntoIterator<Item = (K, ProfileNode)>>(iter: T) -> Self {
        Self {
            profiles: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{BusRule, RawRule};

    #[test]
    fn declarations_come_first_in_order() {
        let first_enforcement = RuleCategory::ORDER
            .iter()
            .position(|c| !c.is_declaration())
            .unwrap();
        assert_eq!(first_enforcement, 3);
        assert!(RuleCategory::ORDER[first_enforcement..]
            .iter()
            .all(|c| !c.is_declaration()));
    }

    #[test]
    fn order_keeps_links_paths_change_profile_last() {
        let tail: Vec<_> = RuleCategory::ORDER[12..].iter().map(|c| c.as_str()).collect();
        assert_eq!(tail, vec!["link", "path", "change_profile"]);
    }

    #[test]
    fn sections_iter_skips_empty_categories() {
        let mut sections = RuleSections::default();
        sections.push(RuleCategory::Path, RawRule::path("/bin/ls", "ix"));
        sections.push(RuleCategory::Capability, RawRule::capability("kill"));
        sections.push(RuleCategory::Dbus, BusRule::new());

        let cats: Vec<_> = sections.iter().map(|(c, _)| c).collect();
        assert_eq!(
            cats,
            vec![RuleCategory::Capability, RuleCategory::Dbus, RuleCategory::Path]
        );
        assert_eq!(sections.len(), 3);
        assert!(!sections.is_empty());
    }

    #[test]
    fn repo_completeness() {
        let mut repo = RepoInfo {
            url: "https://profiles.example.org".into(),
            user: "alice".into(),
            id: "42".into(),
            neversubmit: false,
        };
        assert!(repo.is_complete());
        repo.id.clear();
        assert!(!repo.is_complete());
    }

    #[test]
    fn embedded_means_neither_declared_nor_external() {
        assert!(ProfileNode::new().is_embedded());
        assert!(!ProfileNode::new().declared().is_embedded());
        assert!(!ProfileNode::new().external().is_embedded());
    }

    #[test]
    fn hats_of_excludes_current_and_sorts() {
        let set: ProfileSet = [
            ("zeta", ProfileNode::new()),
            ("/usr/bin/foo", ProfileNode::new()),
            ("alpha", ProfileNode::new()),
        ]
        .into_iter()
        .collect();

        let hats: Vec<_> = set.hats_of("/usr/bin/foo").map(|(n, _)| n).collect();
        assert_eq!(hats, vec!["alpha", "zeta"]);
        assert_eq!(set.hats_of("missing").count(), 3);
    }

    #[test]
    fn profile_set_serde_is_a_plain_map() {
        let set = ProfileSet::new().with(
            "/bin/true",
            ProfileNode::new()
                .with_flags("complain")
                .with_rule(RuleCategory::Capability, RawRule::capability("kill")),
        );
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["/bin/true"]["flags"], "complain");

        let back: ProfileSet = serde_json::from_value(json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn profile_node_deserializes_with_defaults() {
        let node: ProfileNode = serde_json::from_str(r#"{"declared": true}"#).unwrap();
        assert!(node.declared);
        assert!(node.flags.is_empty());
        assert!(node.rules.is_empty());
        assert!(node.repo.is_none());
    }
}
