//! Core check, fix and apply pipelines, extracted from the CLI.
//!
//! Snapshot loading and artifact writing go through the port traits. Applying a plan touches the
//! files under the configured root directly.

use crate::load::LoadedSnapshot;
use crate::ports::{SnapshotSource, WritePort};
use crate::settings::{ApplySettings, CheckSettings, FixSettings};
use anyhow::Context;
use camino::Utf8Path;
use chrono::Utc;
use enumcov_domain::rules::EXHAUSTIVE;
use enumcov_domain::{AnalysisRun, Analyzer, FixContext, FixSynthesizer};
use enumcov_edit::{ApplyOptions, apply_fix_plan, preview_plan};
use enumcov_render::{render_apply_md, render_fixes_md, render_report_md};
use enumcov_types::ToolInfo;
use enumcov_types::apply::ApplyReport;
use enumcov_types::diagnostic::Diagnostic;
use enumcov_types::fix::FixPlan;
use enumcov_types::report::{CheckReport, ReportInput, ReportRunInfo, ReportStatus};
use fs_err as fs;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Error type for pipeline results. Exit code 2 = findings or blocked edits, 1 = tool error.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("findings reported")]
    Findings,
    #[error("{failed} edit(s) could not be applied")]
    ApplyBlocked { failed: u64 },
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ToolError::Findings | ToolError::ApplyBlocked { .. } => 2,
            ToolError::Internal(_) => 1,
        }
    }
}

/// Outcome of `run_check`.
pub struct CheckOutcome {
    pub report: CheckReport,
    /// The report should fail the run: some input or site failed, or warnings are fatal.
    pub findings_block: bool,
}

/// Analyze every loaded snapshot and build a report.
pub fn run_check(
    settings: &CheckSettings,
    source: &dyn SnapshotSource,
    tool: ToolInfo,
) -> Result<CheckOutcome, ToolError> {
    let started_at = Utc::now();
    let loaded = source.load_snapshots()?;

    let analyzer = Analyzer::new(settings.analysis.clone());
    let (inputs, run) = analyze_loaded(&analyzer, &loaded);

    let ended_at = Utc::now();
    let run_info = ReportRunInfo {
        started_at,
        ended_at: Some(ended_at),
        duration_ms: Some((ended_at - started_at).num_milliseconds().max(0) as u64),
        sites_analyzed: run.sites_analyzed,
    };
    let report = CheckReport::new(tool, run_info, inputs, run.diagnostics, run.failures);
    info!(
        "checked {} site(s): {} diagnostic(s), {} failure(s)",
        report.run.sites_analyzed,
        report.diagnostics.len(),
        report.failures.len()
    );

    let findings_block = match report.verdict.status {
        ReportStatus::Fail => true,
        ReportStatus::Warn => settings.fail_on_warnings,
        ReportStatus::Pass => false,
    };

    Ok(CheckOutcome {
        report,
        findings_block,
    })
}

fn analyze_loaded(analyzer: &Analyzer, loaded: &[LoadedSnapshot]) -> (Vec<ReportInput>, AnalysisRun) {
    let mut inputs = Vec::with_capacity(loaded.len());
    let mut merged = AnalysisRun::default();

    for l in loaded {
        match &l.snapshot {
            Ok(snapshot) => {
                inputs.push(ReportInput {
                    path: l.path.to_string(),
                    schema: Some(snapshot.schema.clone()),
                    error: None,
                });
                let run = analyzer.analyze(snapshot);
                debug!(path = %l.path, sites = run.sites_analyzed, "analyzed snapshot");
                merged.sites_analyzed += run.sites_analyzed;
                merged.diagnostics.extend(run.diagnostics);
                merged.failures.extend(run.failures);
            }
            Err(err) => {
                warn!(path = %l.path, "skipping snapshot: {}", err);
                inputs.push(ReportInput {
                    path: l.path.to_string(),
                    schema: None,
                    error: Some(err.to_string()),
                });
            }
        }
    }

    merged.diagnostics.sort_by(|a, b| {
        (&a.location.path, a.location.span.start, &a.rule_id).cmp(&(
            &b.location.path,
            b.location.span.start,
            &b.rule_id,
        ))
    });
    merged
        .failures
        .sort_by(|a, b| (&a.path, a.span).cmp(&(&b.path, b.span)));
    (inputs, merged)
}

/// Write `report.json` and `report.md`.
pub fn write_check_artifacts(
    outcome: &CheckOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let report_json = serde_json::to_string_pretty(&outcome.report).context("serialize report")?;
    writer.write_file(&out_dir.join("report.json"), report_json.as_bytes())?;

    let report_md = render_report_md(&outcome.report);
    writer.write_file(&out_dir.join("report.md"), report_md.as_bytes())?;

    Ok(())
}

/// Outcome of `run_fix`.
pub struct FixOutcome {
    pub plan: FixPlan,
    pub patch: String,
    /// Requested diagnostic ids that matched no fixable diagnostic.
    pub unmatched: Vec<String>,
}

/// Re-analyze every loaded snapshot and propose edits for missing-entry diagnostics.
pub fn run_fix(
    settings: &FixSettings,
    source: &dyn SnapshotSource,
    tool: ToolInfo,
) -> Result<FixOutcome, ToolError> {
    let loaded = source.load_snapshots()?;

    let analyzer = Analyzer::new(settings.analysis.clone());
    let synthesizer = FixSynthesizer::new(FixContext {
        analysis: settings.analysis.clone(),
        style: settings.style.clone(),
    });

    let mut edits = Vec::new();
    let mut failures = Vec::new();
    let mut documents = BTreeMap::new();
    let mut matched = BTreeSet::new();

    for l in &loaded {
        let snapshot = match &l.snapshot {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(path = %l.path, "skipping snapshot: {}", err);
                continue;
            }
        };

        let selected: Vec<Diagnostic> = analyzer
            .analyze(snapshot)
            .diagnostics
            .into_iter()
            .filter(|d| d.rule_id == EXHAUSTIVE.id)
            .filter(|d| settings.diagnostics.is_empty() || settings.diagnostics.contains(&d.id))
            .collect();
        matched.extend(selected.iter().map(|d| d.id.clone()));

        let batch = synthesizer.propose_all(snapshot, &selected);
        for failure in &batch.failures {
            warn!(path = %failure.path, "no fix proposed: {}", failure.message);
        }
        edits.extend(batch.edits);
        failures.extend(batch.failures);

        for doc in &snapshot.documents {
            documents.insert(doc.path.clone(), doc.text.clone());
        }
    }

    let unmatched: Vec<String> = settings
        .diagnostics
        .iter()
        .filter(|id| !matched.contains(*id))
        .cloned()
        .collect();
    for id in &unmatched {
        warn!("diagnostic {} is not a fixable finding in the loaded snapshots", id);
    }

    // The same document can appear in more than one snapshot.
    edits.sort_by(|a, b| (&a.path, a.span.start, a.span.end).cmp(&(&b.path, b.span.start, b.span.end)));
    edits.dedup_by(|a, b| a.path == b.path && a.span == b.span && a.replacement == b.replacement);

    let mut plan = FixPlan::new(tool, edits);
    plan.failures = failures;
    let patch = preview_plan(&plan, &documents).context("preview patch")?;
    plan.summary.patch_bytes = Some(patch.len() as u64);
    info!(
        "proposed {} edit(s) across {} file(s)",
        plan.summary.edits, plan.summary.files
    );

    Ok(FixOutcome {
        plan,
        patch,
        unmatched,
    })
}

/// Write `fixes.json`, `fixes.md` and `patch.diff`.
pub fn write_fix_artifacts(
    outcome: &FixOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let plan_json = serde_json::to_string_pretty(&outcome.plan).context("serialize fixes")?;
    writer.write_file(&out_dir.join("fixes.json"), plan_json.as_bytes())?;

    let plan_md = render_fixes_md(&outcome.plan);
    writer.write_file(&out_dir.join("fixes.md"), plan_md.as_bytes())?;

    writer.write_file(&out_dir.join("patch.diff"), outcome.patch.as_bytes())?;

    Ok(())
}

/// Outcome of `run_apply`.
pub struct ApplyOutcome {
    pub apply: ApplyReport,
    pub patch: String,
    /// Some edits failed their preconditions and were not written.
    pub apply_blocked: bool,
}

/// Apply `<out_dir>/fixes.json` to the files under the root.
pub fn run_apply(settings: &ApplySettings, tool: ToolInfo) -> Result<ApplyOutcome, ToolError> {
    let plan_path = settings.out_dir.join("fixes.json");
    let plan_str = fs::read_to_string(&plan_path).with_context(|| format!("read {}", plan_path))?;
    let plan: FixPlan = serde_json::from_str(&plan_str).context("parse fixes.json")?;
    if plan.schema != enumcov_types::schema::ENUMCOV_FIXES_V1 {
        return Err(anyhow::anyhow!("{} has unsupported schema {:?}", plan_path, plan.schema).into());
    }

    let opts = ApplyOptions {
        dry_run: settings.dry_run,
        backup: settings.backup_enabled,
        backup_suffix: settings.backup_suffix.clone(),
    };
    let (apply, patch) =
        apply_fix_plan(&settings.root, &plan, tool, &opts).context("apply fix plan")?;

    let apply_blocked = apply.summary.failed > 0;
    if apply_blocked {
        warn!("{} edit(s) could not be applied", apply.summary.failed);
    }

    Ok(ApplyOutcome {
        apply,
        patch,
        apply_blocked,
    })
}

/// Write `apply.json`, `apply.md` and the applied `patch.diff`.
pub fn write_apply_artifacts(
    outcome: &ApplyOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let apply_json = serde_json::to_string_pretty(&outcome.apply).context("serialize apply")?;
    writer.write_file(&out_dir.join("apply.json"), apply_json.as_bytes())?;

    let apply_md = render_apply_md(&outcome.apply);
    writer.write_file(&out_dir.join("apply.md"), apply_md.as_bytes())?;

    writer.write_file(&out_dir.join("patch.diff"), outcome.patch.as_bytes())?;

    Ok(())
}
