//! Rule model.
//!
//! A [`Rule`] renders to exactly one line of policy text, without leading
//! indentation or trailing newline.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::quote::quote_if_needed;

// ── Modifiers ──────────────────────────────────────────────────────────

fn modifier_prefix(audit: bool, deny: bool) -> &'static str {
    match (audit, deny) {
        (true, true) => "audit deny ",
        (true, false) => "audit ",
        (false, true) => "deny ",
        (false, false) => "",
    }
}

// ── RawRule ────────────────────────────────────────────────────────────

/// An already-formatted rule body emitted verbatim after its modifiers.
///
/// The body carries its own terminator (usually a trailing `,`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRule {
    /// Log every access matched by the rule.
    #[serde(default)]
    pub audit: bool,
    /// Refuse the access instead of granting it.
    #[serde(default)]
    pub deny: bool,
    /// Rule text without modifiers.
    pub rule: String,
}

impl RawRule {
    /// Wrap preformatted rule text.
    pub fn new(rule: impl Into<String>) -> Self {
        Self {
            audit: false,
            deny: false,
            rule: rule.into(),
        }
    }

    /// Set the `audit` modifier.
    pub fn audited(mut self) -> Self {
        self.audit = true;
        self
    }

    /// Set the `deny` modifier.
    pub fn denied(mut self) -> Self {
        self.deny = true;
        self
    }

    /// `alias <from> -> <to>,`
    pub fn alias(from: &str, to: &str) -> Self {
        Self::new(format!(
            "alias {} -> {},",
            quote_if_needed(from),
            quote_if_needed(to)
        ))
    }

    /// `<name> = <v1> <v2> ...`; empty values are written as `""`.
    pub fn variable<I, S>(name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let values: Vec<String> = values
            .into_iter()
            .map(|v| match v.as_ref() {
                "" => "\"\"".to_string(),
                v => quote_if_needed(v).into_owned(),
            })
            .collect();
        Self::new(format!("{} = {}", name, values.join(" ")))
    }

    /// `#include <path>`
    pub fn include(path: &str) -> Self {
        Self::new(format!("#include <{}>", path))
    }

    /// `set rlimit <resource> <= <value>,`
    pub fn rlimit(resource: &str, value: &str) -> Self {
        Self::new(format!("set rlimit {} <= {},", resource, value))
    }

    /// `capability <name>,`, or `capability,` for every capability.
    pub fn capability(name: &str) -> Self {
        Self::keyword("capability", name)
    }

    /// `network [<domain>] [<type>],`
    pub fn network(domain: &str, kind: &str) -> Self {
        let body: Vec<&str> = [domain, kind].into_iter().filter(|s| !s.is_empty()).collect();
        Self::keyword("network", &body.join(" "))
    }

    /// `link [subset ]<from> -> <to>,`
    pub fn link(from: &str, to: &str, subset: bool) -> Self {
        Self::new(format!(
            "link {}{} -> {},",
            if subset { "subset " } else { "" },
            quote_if_needed(from),
            quote_if_needed(to)
        ))
    }

    /// `<path> <mode>,`
    pub fn path(path: &str, mode: &str) -> Self {
        FileAccess::new(path, mode).into_rule()
    }

    /// `change_profile,` or `change_profile -> <target>,`
    pub fn change_profile(target: Option<&str>) -> Self {
        match target {
            Some(t) => Self::new(format!("change_profile -> {},", quote_if_needed(t))),
            None => Self::new("change_profile,"),
        }
    }

    /// `<keyword> <body>,`, or `<keyword>,` when the body is empty.
    ///
    /// Used for the signal, ptrace, mount, pivot_root and unix categories,
    /// whose bodies are passed through untouched.
    pub fn keyword(keyword: &str, body: &str) -> Self {
        if body.is_empty() {
            Self::new(format!("{},", keyword))
        } else {
            Self::new(format!("{} {},", keyword, body))
        }
    }

    /// Modifiers followed by the rule text.
    pub fn render(&self) -> String {
        format!("{}{}", modifier_prefix(self.audit, self.deny), self.rule)
    }
}

impl fmt::Display for RawRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

// ── FileAccess ─────────────────────────────────────────────────────────

/// Structured input for a file path rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileAccess {
    /// Restrict the rule to files owned by the task.
    pub owner: bool,
    /// Prefix the rule with the `file` keyword.
    pub file_keyword: bool,
    /// Empty means "all files" and requires `file_keyword`.
    pub path: String,
    /// Permission string such as `rw` or `ix`.
    pub mode: String,
    /// Exec transition target.
    pub target: Option<String>,
}

impl FileAccess {
    /// Access `mode` on `path`.
    pub fn new(path: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: mode.into(),
            ..Self::default()
        }
    }

    /// Add the `owner` qualifier.
    pub fn owner(mut self) -> Self {
        self.owner = true;
        self
    }

    /// Add the `file` keyword.
    pub fn file_keyword(mut self) -> Self {
        self.file_keyword = true;
        self
    }

    /// Transition to `target` on exec.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// `[owner ][file ][<path> ][<mode>][ -> <target>],`
    pub fn into_rule(self) -> RawRule {
        let mut parts: Vec<String> = Vec::with_capacity(5);
        if self.owner {
            parts.push("owner".into());
        }
        if self.file_keyword {
            parts.push("file".into());
        }
        if !self.path.is_empty() {
            parts.push(quote_if_needed(&self.path).into_owned());
        }
        if !self.mode.is_empty() {
            parts.push(self.mode);
        }
        if let Some(target) = self.target {
            parts.push(format!("-> {}", quote_if_needed(&target)));
        }
        RawRule::new(format!("{},", parts.join(" ")))
    }
}

// ── BusRule ────────────────────────────────────────────────────────────

/// Structured bus access rule.
///
/// Every field is a set; sets iterate in sorted order so rendering is
/// byte-stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusRule {
    pub audit: bool,
    pub deny: bool,
    /// `send`, `receive`, `bind`, `eavesdrop`.
    pub actions: BTreeSet<String>,
    /// `bus=` values, e.g. `system` or `session`.
    pub buses: BTreeSet<String>,
    /// `name=` values (well-known bus names).
    pub names: BTreeSet<String>,
    /// `path=` object paths.
    pub paths: BTreeSet<String>,
    pub interfaces: BTreeSet<String>,
    pub members: BTreeSet<String>,
    /// `name=` inside the `peer=(...)` clause.
    pub peer_names: BTreeSet<String>,
    /// `label=` inside the `peer=(...)` clause.
    pub peer_labels: BTreeSet<String>,
}

impl BusRule {
    /// A bare `dbus,` rule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add permitted actions.
    pub fn with_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions.extend(actions.into_iter().map(Into::into));
        self
    }

    /// Add a `bus=` value.
    pub fn with_bus(mut self, bus: impl Into<String>) -> Self {
        self.buses.insert(bus.into());
        self
    }

    /// Add a `name=` value.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }

    /// Add a `path=` value.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.paths.insert(path.into());
        self
    }

    /// Add an `interface=` value.
    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.insert(interface.into());
        self
    }

    /// Add a `member=` value.
    pub fn with_member(mut self, member: impl Into<String>) -> Self {
        self.members.insert(member.into());
        self
    }

    /// Add a peer `name=` value.
    pub fn with_peer_name(mut self, name: impl Into<String>) -> Self {
        self.peer_names.insert(name.into());
        self
    }

    /// Add a peer `label=` value.
    pub fn with_peer_label(mut self, label: impl Into<String>) -> Self {
        self.peer_labels.insert(label.into());
        self
    }

    /// Set the `audit` modifier.
    pub fn audited(mut self) -> Self {
        self.audit = true;
        self
    }

    /// Set the `deny` modifier.
    pub fn denied(mut self) -> Self {
        self.deny = true;
        self
    }

    /// `dbus [<actions>] [<key>=<values>]... [peer=(...)],`
    pub fn render(&self) -> String {
        let mut out = format!("{}dbus", modifier_prefix(self.audit, self.deny));

        if let Some(actions) = set_clause(&self.actions) {
            out.push(' ');
            out.push_str(&actions);
        }

        let conditionals = [
            ("bus", &self.buses),
            ("name", &self.names),
            ("path", &self.paths),
            ("interface", &self.interfaces),
            ("member", &self.members),
        ];
        for (key, values) in conditionals {
            if let Some(clause) = set_clause(values) {
                out.push_str(&format!(" {}={}", key, clause));
            }
        }

        let peer: Vec<String> = [("name", &self.peer_names), ("label", &self.peer_labels)]
            .into_iter()
            .filter_map(|(key, values)| set_clause(values).map(|c| format!("{}={}", key, c)))
            .collect();
        if !peer.is_empty() {
            out.push_str(&format!(" peer=({})", peer.join(", ")));
        }

        out.push(',');
        out
    }
}

impl fmt::Display for BusRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Nothing for an empty set, the bare element for a singleton, otherwise a
/// parenthesized comma-joined list.
fn set_clause(values: &BTreeSet<String>) -> Option<String> {
    match values.len() {
        0 => None,
        1 => values.iter().next().cloned(),
        _ => Some(format!(
            "({})",
            values.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
        )),
    }
}

// ── Rule ───────────────────────────────────────────────────────────────

/// A single policy rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rule {
    /// Preformatted text.
    Raw(RawRule),
    /// Structured bus rule, rendered on write.
    Bus(BusRule),
}

impl Rule {
    /// Render the rule as one line of policy text.
    pub fn render(&self) -> String {
        match self {
            Rule::Raw(rule) => rule.render(),
            Rule::Bus(rule) => rule.render(),
        }
    }

}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<RawRule> for Rule {
    fn from(rule: RawRule) -> Self {
        Rule::Raw(rule)
    }
}

impl From<BusRule> for Rule {
    fn from(rule: BusRule) -> Self {
        Rule::Bus(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_rule_modifiers() {
        let rule = RawRule::new("/etc/shadow r,");
        assert_eq!(rule.render(), "/etc/shadow r,");
        assert_eq!(rule.clone().audited().render(), "audit /etc/shadow r,");
        assert_eq!(rule.clone().denied().render(), "deny /etc/shadow r,");
        assert_eq!(
            rule.audited().denied().render(),
            "audit deny /etc/shadow r,"
        );
    }

    #[test]
    fn category_constructors() {
        assert_eq!(
            RawRule::alias("/usr/", "/mnt/usr/").render(),
            "alias /usr/ -> /mnt/usr/,"
        );
        assert_eq!(
            RawRule::variable("@{HOME}", ["/home/*/", "/root/"]).render(),
            "@{HOME} = /home/*/ /root/"
        );
        assert_eq!(RawRule::variable("@{EMPTY}", [""]).render(), "@{EMPTY} = \"\"");
        assert_eq!(
            RawRule::include("abstractions/base").render(),
            "#include <abstractions/base>"
        );
        assert_eq!(
            RawRule::rlimit("nofile", "1024").render(),
            "set rlimit nofile <= 1024,"
        );
        assert_eq!(RawRule::capability("kill").render(), "capability kill,");
        assert_eq!(RawRule::capability("").render(), "capability,");
        assert_eq!(RawRule::network("inet", "stream").render(), "network inet stream,");
        assert_eq!(RawRule::network("", "").render(), "network,");
        assert_eq!(
            RawRule::link("/a", "/b", true).render(),
            "link subset /a -> /b,"
        );
        assert_eq!(RawRule::change_profile(None).render(), "change_profile,");
        assert_eq!(
            RawRule::change_profile(Some("/bin/bar")).render(),
            "change_profile -> /bin/bar,"
        );
        assert_eq!(
            RawRule::keyword("signal", "(send) peer=unconfined").render(),
            "signal (send) peer=unconfined,"
        );
        assert_eq!(RawRule::keyword("ptrace", "").render(), "ptrace,");
    }

    #[test]
    fn path_rules_quote_whitespace() {
        assert_eq!(RawRule::path("/usr/bin/foo", "r").render(), "/usr/bin/foo r,");
        assert_eq!(
            RawRule::path("/opt/my app/**", "rw").render(),
            "\"/opt/my app/**\" rw,"
        );
    }

    #[test]
    fn file_access_variants() {
        let rule = FileAccess::new("@{HOME}/.cache/**", "rwk").owner().into_rule();
        assert_eq!(rule.render(), "owner @{HOME}/.cache/** rwk,");

        let rule = FileAccess::new("", "rw").file_keyword().into_rule();
        assert_eq!(rule.render(), "file rw,");

        let rule = FileAccess::new("/usr/bin/helper", "Px")
            .with_target("helper_profile")
            .into_rule();
        assert_eq!(rule.render(), "/usr/bin/helper Px -> helper_profile,");
    }

    #[test]
    fn bus_rule_empty_is_bare_keyword() {
        assert_eq!(BusRule::new().render(), "dbus,");
    }

    #[test]
    fn bus_rule_single_action() {
        let rule = BusRule::new().with_actions(["send"]);
        assert_eq!(rule.render(), "dbus send,");
    }

    #[test]
    fn bus_rule_multiple_actions_sorted() {
        let rule = BusRule::new().with_actions(["send", "receive"]);
        assert_eq!(rule.render(), "dbus (receive, send),");
    }

    #[test]
    fn bus_rule_modifiers_and_conditionals() {
        let rule = BusRule::new()
            .with_actions(["send"])
            .with_bus("session")
            .with_path("/org/freedesktop/DBus")
            .with_interface("org.freedesktop.DBus")
            .with_member("Hello")
            .with_peer_name("org.freedesktop.DBus")
            .with_peer_label("unconfined")
            .audited()
            .denied();
        assert_eq!(
            rule.render(),
            "audit deny dbus send bus=session path=/org/freedesktop/DBus \
             interface=org.freedesktop.DBus member=Hello \
             peer=(name=org.freedesktop.DBus, label=unconfined),"
        );
    }

    #[test]
    fn rule_dispatches_by_variant() {
        let raw: Rule = RawRule::capability("chown").denied().into();
        let bus: Rule = BusRule::new().with_actions(["bind"]).audited().into();
        assert_eq!(raw.render(), "deny capability chown,");
        assert_eq!(bus.to_string(), "audit dbus bind,");
    }

    #[test]
    fn rule_serde_is_tagged_by_kind() {
        let rule: Rule = RawRule::capability("kill").into();
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["kind"], "raw");
        assert_eq!(json["rule"], "capability kill,");

        let parsed: Rule =
            serde_json::from_str(r#"{"kind":"bus","actions":["send","receive"]}"#).unwrap();
        assert_eq!(parsed.render(), "dbus (receive, send),");
    }
}
