use crate::ToolInfo;
use crate::diagnostic::{Diagnostic, Severity, SiteFailure};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub schema: String,
    pub tool: ToolInfo,
    pub run: ReportRunInfo,
    pub verdict: ReportVerdict,

    #[serde(default)]
    pub inputs: Vec<ReportInput>,

    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<SiteFailure>,
}

impl CheckReport {
    pub fn new(
        tool: ToolInfo,
        run: ReportRunInfo,
        inputs: Vec<ReportInput>,
        diagnostics: Vec<Diagnostic>,
        failures: Vec<SiteFailure>,
    ) -> Self {
        let verdict = ReportVerdict::from_results(&inputs, &diagnostics, &failures);
        Self {
            schema: crate::schema::ENUMCOV_REPORT_V1.to_string(),
            tool,
            run,
            verdict,
            inputs,
            diagnostics,
            failures,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRunInfo {
    pub started_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,

    #[serde(default)]
    pub sites_analyzed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportInput {
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportVerdict {
    pub status: ReportStatus,
    pub counts: ReportCounts,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

impl ReportVerdict {
    /// `fail` when an input or a site could not be analyzed, `warn` when anything was reported,
    /// `pass` otherwise.
    pub fn from_results(
        inputs: &[ReportInput],
        diagnostics: &[Diagnostic],
        failures: &[SiteFailure],
    ) -> Self {
        let mut counts = ReportCounts::default();
        for d in diagnostics {
            match d.severity {
                Severity::Info => counts.info += 1,
                Severity::Warning => counts.warning += 1,
                Severity::Error => counts.error += 1,
            }
        }
        counts.failures = failures.len() as u64;

        let mut reasons = Vec::new();
        let broken_inputs = inputs.iter().filter(|i| i.error.is_some()).count();
        if broken_inputs > 0 {
            reasons.push(format!("{broken_inputs} input(s) could not be loaded"));
        }
        if !failures.is_empty() {
            reasons.push(format!("{} site(s) could not be analyzed", failures.len()));
        }

        let status = if !reasons.is_empty() || counts.error > 0 {
            ReportStatus::Fail
        } else if !diagnostics.is_empty() {
            ReportStatus::Warn
        } else {
            ReportStatus::Pass
        };

        Self {
            status,
            counts,
            reasons,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCounts {
    pub info: u64,
    pub warning: u64,
    pub error: u64,

    #[serde(default)]
    pub failures: u64,
}
