//! Rule section writer.
//!
//! Emits every rule collection of one profile level in [`RuleCategory::ORDER`],
//! one line per rule. Empty categories contribute nothing.

use profile_types::{Rule, RuleCategory, RuleSections, SharedDeclarations};

/// Two spaces per nesting level.
pub(crate) fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

/// One indented line per rule.
pub fn write_category(rules: &[Rule], depth: usize) -> Vec<String> {
    let pre = indent(depth);
    rules
        .iter()
        .map(|rule| format!("{}{}", pre, rule.render()))
        .collect()
}

/// All categories of one node, in write order.
pub fn write_rules(sections: &RuleSections, depth: usize) -> Vec<String> {
    RuleCategory::ORDER
        .iter()
        .flat_map(|category| write_category(sections.get(*category), depth))
        .collect()
}

/// File-scoped aliases, variables and includes.
pub fn write_declarations(decls: &SharedDeclarations, depth: usize) -> Vec<String> {
    decls
        .iter()
        .flat_map(|(_, rules)| write_category(rules, depth))
        .collect()
}
