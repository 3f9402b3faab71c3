//! Static rule descriptors shared by the emitter, the fixer registry and `enumcov explain`.

use crate::classify::DomainMember;
use enumcov_types::diagnostic::Severity;

/// A diagnostic rule: stable id plus message template with `{0}`, `{1}` positional holes.
#[derive(Debug, Clone)]
pub struct RuleDescriptor {
    /// Stable rule id (e.g., "EXHAUSTIVEDICT0001").
    pub id: &'static str,
    /// Short user-facing key (e.g., "missing-keys").
    pub key: &'static str,
    pub title: &'static str,
    pub message_format: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub description: &'static str,
    pub rationale: &'static str,
    pub remediation: &'static str,
}

pub static EXHAUSTIVE: RuleDescriptor = RuleDescriptor {
    id: "EXHAUSTIVEDICT0001",
    key: "missing-keys",
    title: "Dictionary with [Exhaustive] attribute must define values for all Enum keys",
    message_format: "Dictionary '{0}' need to define values for the following keys: {1}",
    category: "Usage",
    severity: Severity::Warning,
    description: r#"Reported when a dictionary marked [Exhaustive] and keyed by an enum does not
provide an entry for every member of that enum.

Only keys written as compile-time constants are counted. A declaration without an
initializer, or initialized with `[]`, provides no keys at all. Initializers the
analysis cannot see into (factory calls, `new()` without an entry list) are treated
the same way."#,
    rationale: r#"A lookup for a forgotten enum member fails at runtime. Adding a member to the
enum should break the build at every map that has to handle it."#,
    remediation: r##"Add the listed keys to the initializer. `enumcov fix` appends them in the style
of the existing entries, with a TODO placeholder value to fill in:

    [Exhaustive]
    Dictionary<Color, string> ColorToHex = new()
    {
        { Color.Red, "#FF0000" }, { Color.Green, TODO }, { Color.Blue, TODO }
    };"##,
};

pub static DUPLICATED_ENTRY: RuleDescriptor = RuleDescriptor {
    id: "EXHAUSTIVEDICT0002",
    key: "duplicated-keys",
    title: "Dictionary with [Exhaustive] attribute must define values for all Enum keys",
    message_format: "Dictionary '{0}' has duplicated values for keys: {1}",
    category: "Usage",
    severity: Severity::Warning,
    description: r#"Reported when the initializer of an [Exhaustive] dictionary provides the same
enum key more than once. Each duplicated member is listed once, however many times
it occurs."#,
    rationale: r#"Duplicate keys either throw when the dictionary is constructed or silently keep
the last value, depending on the entry syntax. Both hide a mistake."#,
    remediation: "Remove all but one entry for each listed key.",
};

pub static NOT_APPLICABLE: RuleDescriptor = RuleDescriptor {
    id: "EXHAUSTIVEDICT0003",
    key: "not-applicable",
    title: "[Exhaustive] attribute is only applicable to dictionaries keyed by an enum",
    message_format: "Attribute [Exhaustive] is not applicable to '{0}' of type '{1}'",
    category: "Usage",
    severity: Severity::Warning,
    description: r#"Reported when [Exhaustive] is placed on a field or property whose type is not a
Dictionary, or is a Dictionary whose key type is not an enum. The declaration is not
checked any further."#,
    rationale: r#"The attribute only has meaning for enum-keyed dictionaries. Anywhere else it
suggests a check that never runs."#,
    remediation: "Remove the attribute, or change the declared type to Dictionary<TEnum, TValue>.",
};

pub static RULES: &[&RuleDescriptor] = &[&EXHAUSTIVE, &DUPLICATED_ENTRY, &NOT_APPLICABLE];

/// Look a rule up by id (case-insensitive) or short key.
pub fn lookup(name: &str) -> Option<&'static RuleDescriptor> {
    RULES
        .iter()
        .copied()
        .find(|r| r.id.eq_ignore_ascii_case(name) || r.key == name)
}

impl RuleDescriptor {
    pub fn format_message(&self, args: &[String]) -> String {
        format_message(self.message_format, args)
    }
}

/// Substitute `{n}` holes with `args[n]`. Holes without an argument are left as written.
pub fn format_message(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let hole = after
            .find('}')
            .and_then(|close| after[..close].parse::<usize>().ok().map(|n| (n, close)));
        match hole.and_then(|(n, close)| args.get(n).map(|a| (a, close))) {
            Some((arg, close)) => {
                out.push_str(arg);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// `Color.Red, Color.Green`
pub fn format_members(members: &[DomainMember]) -> String {
    members
        .iter()
        .map(|m| m.display.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// True if `rule_id` matches any of the `deny` patterns.
pub fn is_denied(deny: &[String], rule_id: &str) -> bool {
    deny.iter().any(|p| glob_match(p, rule_id))
}

fn glob_match(pat: &str, text: &str) -> bool {
    let p = pat.as_bytes();
    let t = text.as_bytes();
    let mut dp = vec![vec![false; t.len() + 1]; p.len() + 1];
    dp[0][0] = true;

    for i in 1..=p.len() {
        if p[i - 1] == b'*' {
            dp[i][0] = dp[i - 1][0];
        }
    }

    for i in 1..=p.len() {
        for j in 1..=t.len() {
            dp[i][j] = match p[i - 1] {
                b'*' => dp[i - 1][j] || dp[i][j - 1],
                b'?' => dp[i - 1][j - 1],
                c => dp[i - 1][j - 1] && c == t[j - 1],
            };
        }
    }

    dp[p.len()][t.len()]
}
