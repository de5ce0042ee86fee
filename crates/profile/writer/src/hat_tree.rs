//! Hat tree serializer.
//!
//! A [`ProfileSet`] is a flat namespace: while a node is being written every
//! other key is one of its hats, and each hat's `declared`/`external` flags
//! decide where its body goes.
//!
//! ```text
//! /usr/bin/foo {              <- header, rules
//!   declared_hat,             <- declared: reference only
//!
//!   ^embedded {               <- embedded: body inline
//!     ...
//!   }
//! }
//!
//!   /usr/bin/foo//external {  <- external: qualified body after the block,
//!     ...                        indented one level, extra closing brace
//!   }
//! ```

use profile_types::{NameQuoter, ProfileSet};
use tracing::trace;

use crate::error::{WriterError, WriterResult};
use crate::sections::{indent, write_rules};

/// Writes profile blocks with one quoting service and one flags policy.
#[derive(Clone, Copy)]
pub struct ProfileWriter<'q> {
    quoter: &'q dyn NameQuoter,
    include_flags: bool,
}

impl<'q> ProfileWriter<'q> {
    pub fn new(quoter: &'q dyn NameQuoter, include_flags: bool) -> Self {
        Self {
            quoter,
            include_flags,
        }
    }

    pub(crate) fn quoter(&self) -> &'q dyn NameQuoter {
        self.quoter
    }

    pub fn include_flags(&self) -> bool {
        self.include_flags
    }

    /// Write one profile or hat and everything nested beneath it.
    ///
    /// `name == hat` renders `name` as the top-level profile: its embedded
    /// hats inline, then its external hats after the closing brace. When
    /// they differ, `hat` is rendered on its own as `name//hat`; that block
    /// is left open for the caller to close.
    pub fn write_piece(
        &self,
        profiles: &ProfileSet,
        depth: usize,
        name: &str,
        hat: &str,
    ) -> WriterResult<Vec<String>> {
        let (display, current, in_hat) = if name == hat {
            (name.to_string(), name, false)
        } else {
            (format!("{}//{}", name, hat), hat, true)
        };

        let node = profiles
            .get(current)
            .ok_or_else(|| WriterError::UnknownProfile(current.to_string()))?;

        let mut data = self.write_header(node, depth, &display, false)?;
        data.extend(write_rules(&node.rules, depth + 1));

        let pre2 = indent(depth + 1);

        // Declared hats
        for (hat_name, _) in profiles.hats_of(current).filter(|(_, n)| n.declared) {
            trace!(profile = current, hat = hat_name, "declared hat reference");
            data.push(format!("{}{},", pre2, self.quoter.quote(hat_name)?));
        }

        if !in_hat {
            // Embedded hats
            for (hat_name, hat_node) in profiles.hats_of(current).filter(|(_, n)| n.is_embedded()) {
                trace!(profile = current, hat = hat_name, "embedded hat");
                data.push(String::new());

                let shown = if hat_node.profile {
                    hat_name.to_string()
                } else {
                    format!("^{}", hat_name)
                };
                data.extend(self.write_header(hat_node, depth + 1, &shown, true)?);
                data.extend(write_rules(&hat_node.rules, depth + 2));
                data.push(format!("{}}}", pre2));
            }

            data.push(format!("{}}}", indent(depth)));
        }

        if name == hat {
            // External hats
            for (hat_name, _) in profiles.hats_of(current).filter(|(_, n)| n.external) {
                trace!(profile = current, hat = hat_name, "external hat");
                data.push(String::new());

                let body = self.write_piece(profiles, depth.saturating_sub(1), name, hat_name)?;
                data.extend(body.into_iter().map(|line| format!("  {}", line)));
                data.push("  }".to_string());
            }
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use profile_types::{DefaultQuoter, ProfileNode, RawRule, RuleCategory};

    fn piece(profiles: &ProfileSet, root: &str) -> Vec<String> {
        ProfileWriter::new(&DefaultQuoter, true)
            .write_piece(profiles, 0, root, root)
            .unwrap()
    }

    #[test]
    fn lone_profile() {
        let set = ProfileSet::new().with(
            "/bin/true",
            ProfileNode::new().with_rule(RuleCategory::Path, RawRule::path("/bin/true", "mr")),
        );
        assert_eq!(piece(&set, "/bin/true"), vec!["/bin/true {", "  /bin/true mr,", "}"]);
    }

    #[test]
    fn embedded_hat_is_inlined() {
        let set = ProfileSet::new()
            .with(
                "/usr/bin/foo",
                ProfileNode::new()
                    .with_rule(RuleCategory::Path, RawRule::path("/usr/bin/foo", "r")),
            )
            .with(
                "bar",
                ProfileNode::new().with_rule(RuleCategory::Capability, RawRule::capability("kill")),
            );
        assert_eq!(
            piece(&set, "/usr/bin/foo"),
            vec![
                "/usr/bin/foo {",
                "  /usr/bin/foo r,",
                "",
                "  ^bar {",
                "    capability kill,",
                "  }",
                "}",
            ]
        );
    }

    #[test]
    fn embedded_profile_hat_uses_keyword() {
        let set = ProfileSet::new()
            .with("/usr/bin/foo", ProfileNode::new())
            .with("child", ProfileNode::new().as_profile());
        assert_eq!(
            piece(&set, "/usr/bin/foo"),
            vec!["/usr/bin/foo {", "", "  profile child {", "  }", "}"]
        );
    }

    #[test]
    fn declared_hat_is_referenced_not_inlined() {
        let set = ProfileSet::new()
            .with("/usr/bin/foo", ProfileNode::new())
            .with(
                "helper",
                ProfileNode::new()
                    .declared()
                    .with_rule(RuleCategory::Capability, RawRule::capability("kill")),
            );
        assert_eq!(
            piece(&set, "/usr/bin/foo"),
            vec!["/usr/bin/foo {", "  helper,", "}"]
        );
    }

    #[test]
    fn declared_references_precede_embedded_hats() {
        let set = ProfileSet::new()
            .with("/usr/bin/foo", ProfileNode::new())
            .with("a_inline", ProfileNode::new())
            .with("z_declared", ProfileNode::new().declared());
        assert_eq!(
            piece(&set, "/usr/bin/foo"),
            vec![
                "/usr/bin/foo {",
                "  z_declared,",
                "",
                "  ^a_inline {",
                "  }",
                "}",
            ]
        );
    }

    #[test]
    fn external_hat_is_appended_wrapped() {
        let set = ProfileSet::new()
            .with(
                "/usr/bin/foo",
                ProfileNode::new().with_rule(RuleCategory::Capability, RawRule::capability("chown")),
            )
            .with(
                "ext",
                ProfileNode::new()
                    .external()
                    .with_rule(RuleCategory::Path, RawRule::path("/tmp/x", "rw")),
            );
        assert_eq!(
            piece(&set, "/usr/bin/foo"),
            vec![
                "/usr/bin/foo {",
                "  capability chown,",
                "}",
                "",
                "  /usr/bin/foo//ext {",
                "    /tmp/x rw,",
                "  }",
            ]
        );
    }

    #[test]
    fn entered_hat_is_qualified_and_left_open() {
        let set = ProfileSet::new()
            .with("/usr/bin/foo", ProfileNode::new())
            .with("other", ProfileNode::new())
            .with(
                "ext",
                ProfileNode::new()
                    .external()
                    .with_rule(RuleCategory::Capability, RawRule::capability("kill")),
            );
        let lines = ProfileWriter::new(&DefaultQuoter, true)
            .write_piece(&set, 0, "/usr/bin/foo", "ext")
            .unwrap();
        assert_eq!(lines, vec!["/usr/bin/foo//ext {", "  capability kill,"]);
    }

    #[test]
    fn unknown_root_is_an_error() {
        let err = ProfileWriter::new(&DefaultQuoter, true)
            .write_piece(&ProfileSet::new(), 0, "/nope", "/nope")
            .unwrap_err();
        assert_eq!(err, WriterError::UnknownProfile("/nope".into()));
    }

    #[test]
    fn nested_depth_indents_everything() {
        let set = ProfileSet::new()
            .with("/usr/bin/foo", ProfileNode::new())
            .with(
                "bar",
                ProfileNode::new().with_rule(RuleCategory::Capability, RawRule::capability("kill")),
            );
        let lines = ProfileWriter::new(&DefaultQuoter, true)
            .write_piece(&set, 1, "/usr/bin/foo", "/usr/bin/foo")
            .unwrap();
        assert_eq!(
            lines,
            vec![
                "  /usr/bin/foo {",
                "",
                "    ^bar {",
                "      capability kill,",
                "    }",
                "  }",
            ]
        );
    }
}
