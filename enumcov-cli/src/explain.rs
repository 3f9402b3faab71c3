//! Rule explanations for `enumcov explain` and `enumcov list-rules`.

use enumcov_domain::rules::{self, RULES, RuleDescriptor};
use enumcov_domain::{FixerMeta, builtin_fixer_metas};
use std::fmt::Write as _;

const RULE: &str =
    "================================================================================";
const SECTION: &str =
    "--------------------------------------------------------------------------------";

/// Look a rule up by id or key. Case and `_`/`-` are not significant for keys.
pub fn lookup_rule(query: &str) -> Option<&'static RuleDescriptor> {
    let normalized = query.trim().to_lowercase().replace('_', "-");
    rules::lookup(query.trim()).or_else(|| rules::lookup(&normalized))
}

pub fn list_rule_keys() -> Vec<&'static str> {
    RULES.iter().map(|r| r.key).collect()
}

/// Built-in fixers that act on `rule`.
pub fn fixes_for(rule: &RuleDescriptor) -> Vec<FixerMeta> {
    builtin_fixer_metas()
        .into_iter()
        .filter(|m| m.rule_ids.contains(&rule.id))
        .collect()
}

pub fn render_explanation(rule: &RuleDescriptor) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "RULE: {}", rule.title);
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Id:        {}", rule.id);
    let _ = writeln!(out, "Key:       {}", rule.key);
    let _ = writeln!(out, "Severity:  {}", rule.severity.as_str());
    let _ = writeln!(out, "Category:  {}", rule.category);
    let _ = writeln!(out, "Message:   {}", rule.message_format);
    let _ = writeln!(out);

    for (heading, body) in [
        ("DESCRIPTION", rule.description),
        ("RATIONALE", rule.rationale),
        ("REMEDIATION", rule.remediation),
    ] {
        let _ = writeln!(out, "{heading}");
        let _ = writeln!(out, "{SECTION}");
        let _ = writeln!(out, "{body}");
        let _ = writeln!(out);
    }

    let fixes = fixes_for(rule);
    let _ = writeln!(out, "AUTOMATIC FIX");
    let _ = writeln!(out, "{SECTION}");
    if fixes.is_empty() {
        let _ = writeln!(out, "None. This finding has to be resolved by hand.");
    } else {
        for fix in fixes {
            let _ = writeln!(out, "  - {} ({})", fix.title, fix.fix_key);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "Run `enumcov fix --snapshot <file>` to preview, add `--apply` to write.");
    }

    out
}
