//! Edit engine for enumcov fix plans.
//!
//! Responsibilities:
//! - Apply `FixEdit`s to document text, refusing edits computed against other text.
//! - Apply a whole plan to files under a root (with optional backups).
//! - Generate a unified diff preview.

mod error;

pub use error::{EditError, EditResult, PreconditionError};

use anyhow::Context;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use diffy::PatchFormatter;
use enumcov_types::ToolInfo;
use enumcov_types::apply::{ApplyReport, ApplyResult, ApplyStatus};
use enumcov_types::fix::{FixEdit, FixPlan};
use fs_err as fs;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

pub const DEFAULT_BACKUP_SUFFIX: &str = ".enumcov.bak";

#[derive(Debug, Clone)]
pub struct ApplyOptions {
    pub dry_run: bool,
    pub backup: bool,
    pub backup_suffix: String,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            backup: true,
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
        }
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Apply `edits` to `text` and return the new text.
///
/// Every edit must carry the sha256 of `text`. Spans must lie on char boundaries inside `text`
/// and must not overlap. Edits are applied back to front, so each span refers to the original
/// text regardless of the order given.
pub fn apply_edits(text: &str, edits: &[FixEdit]) -> EditResult<String> {
    let actual = sha256_hex(text.as_bytes());
    for edit in edits {
        if edit.document_sha256 != actual {
            return Err(PreconditionError::StaleDocument {
                path: edit.path.clone(),
                expected: edit.document_sha256.clone(),
                actual,
            }
            .into());
        }
    }

    let mut ordered: Vec<&FixEdit> = edits.iter().collect();
    ordered.sort_by_key(|e| (e.span.start, e.span.end));

    for edit in &ordered {
        if edit.span.start > edit.span.end || edit.span.slice(text).is_none() {
            return Err(conflict(edit, "span is outside the document"));
        }
    }
    for pair in ordered.windows(2) {
        if pair[1].span.start < pair[0].span.end {
            return Err(conflict(pair[1], "overlaps another edit"));
        }
    }

    let mut out = text.to_string();
    for edit in ordered.iter().rev() {
        out.replace_range(edit.span.start..edit.span.end, &edit.replacement);
    }
    Ok(out)
}

fn conflict(edit: &FixEdit, message: &str) -> EditError {
    PreconditionError::Conflict {
        path: edit.path.clone(),
        span: edit.span,
        message: message.to_string(),
    }
    .into()
}

/// Unified diff of one file, git style. Empty when nothing changed.
pub fn render_patch(path: &str, before: &str, after: &str) -> String {
    if before == after {
        return String::new();
    }

    let mut out = String::new();
    out.push_str(&format!("diff --git a/{0} b/{0}\n", path));
    out.push_str(&format!("--- a/{0}\n+++ b/{0}\n", path));

    let patch = diffy::create_patch(before, after);
    out.push_str(&PatchFormatter::new().fmt_patch(&patch).to_string());
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Diff preview of a plan against in-memory documents (path to text).
pub fn preview_plan(plan: &FixPlan, documents: &BTreeMap<String, String>) -> EditResult<String> {
    let mut out = String::new();
    for (path, edits) in group_by_path(&plan.edits) {
        let before = documents
            .get(path)
            .with_context(|| format!("no document text for {path}"))?;
        let after = apply_edits(before, &edits)?;
        out.push_str(&render_patch(path, before, &after));
    }
    Ok(out)
}

/// Apply a plan to the files under `root`.
///
/// Per-file precondition failures are recorded as `failed` results and do not stop the other
/// files. I/O failures while writing abort the run.
pub fn apply_fix_plan(
    root: &Utf8Path,
    plan: &FixPlan,
    tool: ToolInfo,
    opts: &ApplyOptions,
) -> anyhow::Result<(ApplyReport, String)> {
    let mut report = ApplyReport::new(tool, root.as_str());
    report.applied = !opts.dry_run;

    let mut patch = String::new();

    for (path, edits) in group_by_path(&plan.edits) {
        report.summary.attempted += edits.len() as u64;
        let abs = match path_under(root, path) {
            Ok(abs) => abs,
            Err(err) => {
                warn!("refusing {}: {}", path, err);
                report.errors.push(err.to_string());
                record(&mut report, &edits, ApplyStatus::Failed, Some(err.to_string()), None);
                continue;
            }
        };

        let before = match fs::read_to_string(&abs) {
            Ok(text) => text,
            Err(err) => {
                warn!("cannot read {}: {}", abs, err);
                let message = format!("read failed: {err}");
                report.errors.push(format!("{path}: {message}"));
                record(&mut report, &edits, ApplyStatus::Failed, Some(message), None);
                continue;
            }
        };
        let sha_before = sha256_hex(before.as_bytes());

        let after = match apply_edits(&before, &edits) {
            Ok(after) => after,
            Err(EditError::Precondition(err)) => {
                warn!("skipping {}: {}", path, err);
                report.errors.push(err.to_string());
                let files = FileShas {
                    before: sha_before,
                    after: None,
                    backup: None,
                };
                record(
                    &mut report,
                    &edits,
                    ApplyStatus::Failed,
                    Some(err.to_string()),
                    Some(files),
                );
                continue;
            }
            Err(EditError::Runtime(err)) => return Err(err),
        };
        patch.push_str(&render_patch(path, &before, &after));

        let mut files = FileShas {
            before: sha_before,
            after: Some(sha256_hex(after.as_bytes())),
            backup: None,
        };

        if opts.dry_run {
            debug!("dry-run: not writing {}", abs);
            record(
                &mut report,
                &edits,
                ApplyStatus::Skipped,
                Some("dry-run".to_string()),
                Some(files),
            );
            continue;
        }

        if opts.backup {
            let backup = Utf8PathBuf::from(format!("{}{}", abs, opts.backup_suffix));
            fs::write(&backup, &before).with_context(|| format!("write backup {}", backup))?;
            files.backup = Some(backup.to_string());
        }
        fs::write(&abs, &after).with_context(|| format!("write {}", abs))?;
        info!("applied {} edit(s) to {}", edits.len(), path);

        report.summary.files_modified += 1;
        record(&mut report, &edits, ApplyStatus::Applied, None, Some(files));
    }

    Ok((report, patch))
}

struct FileShas {
    before: String,
    after: Option<String>,
    backup: Option<String>,
}

fn record(
    report: &mut ApplyReport,
    edits: &[FixEdit],
    status: ApplyStatus,
    message: Option<String>,
    files: Option<FileShas>,
) {
    for edit in edits {
        match status {
            ApplyStatus::Applied => report.summary.applied += 1,
            ApplyStatus::Skipped => report.summary.skipped += 1,
            ApplyStatus::Failed => report.summary.failed += 1,
        }
        report.results.push(ApplyResult {
            diagnostic_id: edit.diagnostic_id.clone(),
            path: edit.path.clone(),
            status,
            message: message.clone(),
            sha256_before: files.as_ref().map(|f| f.before.clone()),
            sha256_after: files.as_ref().and_then(|f| f.after.clone()),
            backup_path: files.as_ref().and_then(|f| f.backup.clone()),
        });
    }
}

fn group_by_path(edits: &[FixEdit]) -> BTreeMap<&str, Vec<FixEdit>> {
    let mut groups: BTreeMap<&str, Vec<FixEdit>> = BTreeMap::new();
    for edit in edits {
        groups.entry(edit.path.as_str()).or_default().push(edit.clone());
    }
    groups
}

/// Join a plan path onto `root`. Only plain relative paths are accepted.
fn path_under(root: &Utf8Path, path: &str) -> Result<Utf8PathBuf, PreconditionError> {
    let rel = Utf8Path::new(path);
    let plain = rel
        .components()
        .all(|c| matches!(c, Utf8Component::Normal(_) | Utf8Component::CurDir));
    if path.is_empty() || !plain {
        return Err(PreconditionError::OutsideRoot {
            path: path.to_string(),
        });
    }
    Ok(root.join(rel))
}
