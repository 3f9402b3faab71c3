//! Rendering helpers (markdown) for human-readable artifacts.

use enumcov_types::apply::{ApplyReport, ApplyStatus};
use enumcov_types::diagnostic::{Diagnostic, SiteFailure};
use enumcov_types::fix::FixPlan;
use enumcov_types::report::{CheckReport, ReportStatus};

/// One-line compiler-style rendering: `path:line:col: warning[ID]: message`.
pub fn render_diagnostic_line(d: &Diagnostic) -> String {
    format!(
        "{}:{}:{}: {}[{}]: {}",
        d.location.path,
        d.location.line,
        d.location.column,
        d.severity.as_str(),
        d.rule_id,
        d.message
    )
}

pub fn render_report_md(report: &CheckReport) -> String {
    let mut out = String::new();
    out.push_str("# enumcov report\n\n");
    out.push_str(&format!(
        "- Status: `{}`\n",
        status_label(report.verdict.status)
    ));
    out.push_str(&format!(
        "- Sites analyzed: {}\n",
        report.run.sites_analyzed
    ));
    out.push_str(&format!(
        "- Diagnostics: {} (failures {})\n",
        report.diagnostics.len(),
        report.failures.len()
    ));
    out.push_str(&format!("- Inputs: {}\n", report.inputs.len()));
    for reason in &report.verdict.reasons {
        out.push_str(&format!("- Reason: {}\n", reason));
    }
    out.push('\n');

    let broken: Vec<_> = report.inputs.iter().filter(|i| i.error.is_some()).collect();
    if !broken.is_empty() {
        out.push_str("## Inputs with errors\n\n");
        for input in broken {
            out.push_str(&format!(
                "- `{}`: {}\n",
                input.path,
                input.error.as_deref().unwrap_or_default()
            ));
        }
        out.push('\n');
    }

    out.push_str("## Diagnostics\n\n");
    if report.diagnostics.is_empty() {
        out.push_str("_No diagnostics._\n");
    } else {
        for d in &report.diagnostics {
            out.push_str(&format!(
                "- `{}` {} at `{}:{}:{}`: {}\n",
                d.rule_id,
                d.severity.as_str(),
                d.location.path,
                d.location.line,
                d.location.column,
                d.message
            ));
        }
    }

    push_failures(&mut out, &report.failures);

    out
}

pub fn render_fixes_md(plan: &FixPlan) -> String {
    let mut out = String::new();
    out.push_str("# enumcov fixes\n\n");
    out.push_str(&format!(
        "- Edits: {} across {} file(s)\n",
        plan.summary.edits, plan.summary.files
    ));
    out.push_str(&format!(
        "- Entries added: {}\n",
        plan.summary.entries_added
    ));
    if let Some(bytes) = plan.summary.patch_bytes {
        out.push_str(&format!("- Patch bytes: {}\n", bytes));
    }
    out.push('\n');

    out.push_str("## Edits\n\n");
    if plan.edits.is_empty() {
        out.push_str("_No edits proposed._\n");
    }

    for (i, edit) in plan.edits.iter().enumerate() {
        out.push_str(&format!("### {}. {}\n\n", i + 1, edit.title));
        out.push_str(&format!("- Fix: `{}`\n", edit.fix_key));
        out.push_str(&format!("- Diagnostic: `{}`\n", edit.diagnostic_id));
        out.push_str(&format!(
            "- Target: `{}` bytes {}..{}\n",
            edit.path, edit.span.start, edit.span.end
        ));
        if !edit.added.is_empty() {
            out.push_str(&format!("- Adds: {}\n", edit.added.join(", ")));
        }
        out.push('\n');
    }

    push_failures(&mut out, &plan.failures);

    out
}

fn push_failures(out: &mut String, failures: &[SiteFailure]) {
    if failures.is_empty() {
        return;
    }
    out.push_str("\n## Failures\n\n");
    for f in failures {
        let at = f
            .span
            .map(|s| format!("{}@{}..{}", f.path, s.start, s.end))
            .unwrap_or_else(|| f.path.clone());
        out.push_str(&format!("- `{}`: {}\n", at, f.message));
    }
}

pub fn render_apply_md(apply: &ApplyReport) -> String {
    let mut out = String::new();
    out.push_str("# enumcov apply\n\n");
    out.push_str(&format!(
        "- Attempted: {}\n- Applied: {}\n- Skipped: {}\n- Failed: {}\n- Files modified: {}\n\n",
        apply.summary.attempted,
        apply.summary.applied,
        apply.summary.skipped,
        apply.summary.failed,
        apply.summary.files_modified
    ));

    out.push_str("## Results\n\n");
    if apply.results.is_empty() {
        out.push_str("_No results._\n");
        return out;
    }

    for (i, r) in apply.results.iter().enumerate() {
        out.push_str(&format!("### {}. {}\n\n", i + 1, r.diagnostic_id));
        out.push_str(&format!("- Status: `{}`\n", apply_label(r.status)));
        out.push_str(&format!("- File: `{}`\n", r.path));
        if let Some(msg) = &r.message {
            out.push_str(&format!("- Message: {}\n", msg));
        }
        if r.sha256_before.is_some() || r.sha256_after.is_some() {
            let before = r.sha256_before.as_deref().unwrap_or("-");
            let after = r.sha256_after.as_deref().unwrap_or("-");
            out.push_str(&format!("- sha256: {} → {}\n", before, after));
        }
        if let Some(backup) = &r.backup_path {
            out.push_str(&format!("- Backup: `{}`\n", backup));
        }
        out.push('\n');
    }

    out
}

fn status_label(s: ReportStatus) -> &'static str {
    match s {
        ReportStatus::Pass => "pass",
        ReportStatus::Warn => "warn",
        ReportStatus::Fail => "fail",
    }
}

fn apply_label(s: ApplyStatus) -> &'static str {
    match s {
        ApplyStatus::Applied => "applied",
        ApplyStatus::Skipped => "skipped",
        ApplyStatus::Failed => "failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enumcov_types::ToolInfo;
    use enumcov_types::apply::ApplyResult;
    use enumcov_types::diagnostic::{Diagnostic, Location, Severity};
    use enumcov_types::fix::FixEdit;
    use enumcov_types::report::ReportRunInfo;
    use enumcov_types::span::Span;
    use pretty_assertions::assert_eq;

    fn run_info() -> ReportRunInfo {
        ReportRunInfo {
            started_at: chrono::Utc::now(),
            ended_at: None,
            duration_ms: None,
            sites_analyzed: 3,
        }
    }

    fn duplicated() -> Diagnostic {
        Diagnostic {
            id: "id-1".to_string(),
            rule_id: "EXHAUSTIVEDICT0002".to_string(),
            severity: Severity::Warning,
            location: Location {
                path: "P.cs".to_string(),
                span: Span::new(4, 8),
                line: 12,
                column: 31,
            },
            message_args: vec![],
            message: "Dictionary 'Map' has duplicated values for keys: Color.Red".to_string(),
        }
    }

    #[test]
    fn diagnostic_line_is_compiler_style() {
        assert_eq!(
            render_diagnostic_line(&duplicated()),
            "P.cs:12:31: warning[EXHAUSTIVEDICT0002]: Dictionary 'Map' has duplicated values for keys: Color.Red"
        );
    }

    #[test]
    fn report_lists_diagnostics_with_positions() {
        let d = duplicated();
        let report = CheckReport::new(ToolInfo::enumcov("0.1.0"), run_info(), vec![], vec![d], vec![]);
        let md = render_report_md(&report);
        assert!(md.starts_with("# enumcov report\n\n- Status: `warn`\n- Sites analyzed: 3\n"));
        assert!(md.contains(
            "- `EXHAUSTIVEDICT0002` warning at `P.cs:12:31`: Dictionary 'Map' has duplicated values for keys: Color.Red\n"
        ));
        assert!(!md.contains("## Failures"));
    }

    #[test]
    fn empty_report_says_so() {
        let report = CheckReport::new(ToolInfo::enumcov("0.1.0"), run_info(), vec![], vec![], vec![]);
        assert!(render_report_md(&report).contains("_No diagnostics._"));
    }

    #[test]
    fn fixes_list_added_members() {
        let edit = FixEdit {
            diagnostic_id: "id-1".to_string(),
            fix_key: "enumcov.add_missing_entries".to_string(),
            title: "Add missing values from enum".to_string(),
            path: "P.cs".to_string(),
            document_sha256: "00".to_string(),
            span: Span::new(10, 30),
            replacement: String::new(),
            added: vec!["Color.Green".to_string(), "Color.Blue".to_string()],
        };
        let md = render_fixes_md(&FixPlan::new(ToolInfo::enumcov("0.1.0"), vec![edit]));
        assert!(md.contains("- Edits: 1 across 1 file(s)\n- Entries added: 2\n"));
        assert!(md.contains("### 1. Add missing values from enum\n"));
        assert!(md.contains("- Adds: Color.Green, Color.Blue\n"));
    }

    #[test]
    fn fixes_list_sites_without_an_edit() {
        let mut plan = FixPlan::new(ToolInfo::enumcov("0.1.0"), vec![]);
        plan.failures.push(SiteFailure {
            path: "P.cs".to_string(),
            span: Some(Span::new(40, 52)),
            message: "entry list span is outside P.cs".to_string(),
        });
        let md = render_fixes_md(&plan);
        assert!(md.contains("_No edits proposed._\n"));
        assert!(md.ends_with("## Failures\n\n- `P.cs@40..52`: entry list span is outside P.cs\n"));
    }

    #[test]
    fn apply_shows_status_and_hashes() {
        let mut apply = ApplyReport::new(ToolInfo::enumcov("0.1.0"), "/repo");
        apply.results.push(ApplyResult {
            diagnostic_id: "id-1".to_string(),
            path: "P.cs".to_string(),
            status: ApplyStatus::Applied,
            message: None,
            sha256_before: Some("aa".to_string()),
            sha256_after: Some("bb".to_string()),
            backup_path: Some("/repo/P.cs.enumcov.bak".to_string()),
        });
        let md = render_apply_md(&apply);
        assert!(md.contains("- Status: `applied`\n"));
        assert!(md.contains("- sha256: aa → bb\n"));
        assert!(md.contains("- Backup: `/repo/P.cs.enumcov.bak`\n"));

        let empty = render_apply_md(&ApplyReport::new(ToolInfo::enumcov("0.1.0"), "/repo"));
        assert_eq!(empty.lines().last(), Some("_No results._"));
    }
}
