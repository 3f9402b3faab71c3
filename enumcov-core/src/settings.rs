//! Clap-free settings for the check, fix and apply pipelines.

use camino::Utf8PathBuf;
use enumcov_domain::{AnalyzerConfig, FixStyle};

/// Settings for the check pipeline.
#[derive(Debug, Clone)]
pub struct CheckSettings {
    pub root: Utf8PathBuf,
    pub out_dir: Utf8PathBuf,
    pub analysis: AnalyzerConfig,

    /// Treat any diagnostic as a failing result (exit 2).
    pub fail_on_warnings: bool,
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            root: Utf8PathBuf::from("."),
            out_dir: Utf8PathBuf::from("artifacts/enumcov"),
            analysis: AnalyzerConfig::default(),
            fail_on_warnings: false,
        }
    }
}

/// Settings for the fix pipeline.
#[derive(Debug, Clone)]
pub struct FixSettings {
    pub root: Utf8PathBuf,
    pub out_dir: Utf8PathBuf,
    pub analysis: AnalyzerConfig,
    pub style: FixStyle,

    /// Only fix these diagnostic ids. Empty means every fixable diagnostic.
    pub diagnostics: Vec<String>,
}

impl Default for FixSettings {
    fn default() -> Self {
        Self {
            root: Utf8PathBuf::from("."),
            out_dir: Utf8PathBuf::from("artifacts/enumcov"),
            analysis: AnalyzerConfig::default(),
            style: FixStyle::default(),
            diagnostics: Vec::new(),
        }
    }
}

/// Settings for the apply pipeline.
#[derive(Debug, Clone)]
pub struct ApplySettings {
    pub root: Utf8PathBuf,
    pub out_dir: Utf8PathBuf,
    pub dry_run: bool,

    // Backups
    pub backup_enabled: bool,
    pub backup_suffix: String,
}

impl Default for ApplySettings {
    fn default() -> Self {
        Self {
            root: Utf8PathBuf::from("."),
            out_dir: Utf8PathBuf::from("artifacts/enumcov"),
            dry_run: false,
            backup_enabled: true,
            backup_suffix: enumcov_edit::DEFAULT_BACKUP_SUFFIX.to_string(),
        }
    }
}
