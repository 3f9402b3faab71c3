use crate::rules::RuleDescriptor;
use enumcov_types::diagnostic::{Diagnostic, Location};
use enumcov_types::span::{LineIndex, Span};
use uuid::Uuid;

/// Builds diagnostic records for one document.
#[derive(Debug, Clone)]
pub struct DiagnosticEmitter<'a> {
    path: &'a str,
    text: &'a str,
    lines: LineIndex,
}

impl<'a> DiagnosticEmitter<'a> {
    pub fn new(path: &'a str, text: &'a str) -> Self {
        Self {
            path,
            text,
            lines: LineIndex::new(text),
        }
    }

    pub fn path(&self) -> &'a str {
        self.path
    }

    pub fn emit(&self, rule: &RuleDescriptor, span: Span, args: Vec<String>) -> Diagnostic {
        let pos = self.lines.line_col(self.text, span.start);
        Diagnostic {
            id: deterministic_diagnostic_id(rule.id, self.path, span, &args).to_string(),
            rule_id: rule.id.to_string(),
            severity: rule.severity,
            location: Location {
                path: self.path.to_string(),
                span,
                line: pos.line,
                column: pos.column,
            },
            message: rule.format_message(&args),
            message_args: args,
        }
    }
}

/// v5(namespace, rule|path|span|args): the same finding at the same place always gets the same id.
pub fn deterministic_diagnostic_id(rule_id: &str, path: &str, span: Span, args: &[String]) -> Uuid {
    const NAMESPACE: Uuid = Uuid::from_bytes([
        0x9a, 0x1e, 0x52, 0x0c, 0x7b, 0x3d, 0x4e, 0x61, 0xa2, 0x05, 0xd4, 0x8f, 0x13, 0x6c, 0xe0,
        0x27,
    ]);

    let stable_key = format!(
        "{}|{}|{}..{}|{}",
        rule_id,
        path,
        span.start,
        span.end,
        args.join("\u{1f}")
    );
    Uuid::new_v5(&NAMESPACE, stable_key.as_bytes())
}
