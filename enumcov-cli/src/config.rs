//! Configuration file loading for enumcov.
//!
//! Discovers and loads `enumcov.toml` from the root directory.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use enumcov_core::{AnalyzerConfig, ContainerShape, FixStyle};
use enumcov_types::snapshot::SymbolIdentity;
use fs_err as fs;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "enumcov.toml";

/// Top-level configuration from enumcov.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EnumcovConfig {
    pub analysis: AnalysisConfig,
    pub fix: FixConfig,
    pub apply: ApplyConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Rule id patterns (`*`, `?`) that are never reported.
    pub deny: Vec<String>,

    /// Attribute a declaration must carry to be checked.
    pub marker: IdentityConfig,

    /// Map type the marker is valid on.
    pub container: ContainerConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub module: Option<String>,
    pub qualified_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    pub module: Option<String>,
    pub qualified_name: Option<String>,
    pub arity: Option<usize>,
}

/// Templates for appended entries. `{key}` and `{value}` are substituted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FixConfig {
    pub placeholder: Option<String>,
    pub pair_template: Option<String>,
    pub indexer_template: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApplyConfig {
    /// Whether to create backups before writing files.
    pub backup: bool,

    /// Suffix for backup files.
    pub backup_suffix: String,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            backup: true,
            backup_suffix: ".enumcov.bak".to_string(),
        }
    }
}

/// Searches for `enumcov.toml` in the root directory.
pub fn discover_config(root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

pub fn load_config(path: &Utf8Path) -> anyhow::Result<EnumcovConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<EnumcovConfig> {
    let config: EnumcovConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from the root, or return the default if there is none.
pub fn load_or_default(root: &Utf8Path) -> anyhow::Result<EnumcovConfig> {
    match discover_config(root) {
        Some(path) => load_config(&path),
        None => Ok(EnumcovConfig::default()),
    }
}

/// Configuration after applying CLI arguments on top of the config file.
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub analysis: AnalyzerConfig,
    pub style: FixStyle,
    pub backup_enabled: bool,
    pub backup_suffix: String,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: EnumcovConfig,
}

impl ConfigMerger {
    pub fn new(config: EnumcovConfig) -> Self {
        Self { config }
    }

    /// CLI `deny` patterns extend the config file list.
    pub fn merge_check_args(self, cli_deny: &[String]) -> MergedConfig {
        self.merge(cli_deny, None, false)
    }

    /// As `merge_check_args`; a CLI placeholder replaces the configured one.
    pub fn merge_fix_args(
        self,
        cli_deny: &[String],
        cli_placeholder: Option<&str>,
        cli_no_backup: bool,
    ) -> MergedConfig {
        self.merge(cli_deny, cli_placeholder, cli_no_backup)
    }

    pub fn merge_apply_args(self, cli_no_backup: bool) -> MergedConfig {
        self.merge(&[], None, cli_no_backup)
    }

    fn merge(
        self,
        cli_deny: &[String],
        cli_placeholder: Option<&str>,
        cli_no_backup: bool,
    ) -> MergedConfig {
        let EnumcovConfig {
            analysis,
            fix,
            apply,
        } = self.config;

        let defaults = AnalyzerConfig::default();

        let mut deny = analysis.deny;
        for pattern in cli_deny {
            if !deny.contains(pattern) {
                deny.push(pattern.clone());
            }
        }

        let marker = SymbolIdentity::new(
            analysis.marker.module.unwrap_or(defaults.marker.module),
            analysis
                .marker
                .qualified_name
                .unwrap_or(defaults.marker.qualified_name),
        );
        let container = ContainerShape {
            identity: SymbolIdentity::new(
                analysis
                    .container
                    .module
                    .unwrap_or(defaults.container.identity.module),
                analysis
                    .container
                    .qualified_name
                    .unwrap_or(defaults.container.identity.qualified_name),
            ),
            arity: analysis.container.arity.unwrap_or(defaults.container.arity),
        };

        let style_defaults = FixStyle::default();
        let style = FixStyle {
            placeholder: cli_placeholder
                .map(str::to_string)
                .or(fix.placeholder)
                .unwrap_or(style_defaults.placeholder),
            pair_template: fix.pair_template.unwrap_or(style_defaults.pair_template),
            indexer_template: fix
                .indexer_template
                .unwrap_or(style_defaults.indexer_template),
        };

        MergedConfig {
            analysis: AnalyzerConfig {
                marker,
                container,
                deny,
            },
            style,
            backup_enabled: apply.backup && !cli_no_backup,
            backup_suffix: apply.backup_suffix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parse_full_config() {
        let contents = r#"
[analysis]
deny = ["EXHAUSTIVEDICT0003"]

[analysis.marker]
module = "Acme.Annotations"
qualified_name = "Acme.Annotations.TotalAttribute"

[analysis.container]
qualified_name = "Acme.Collections.EnumMap"
module = "Acme.Collections"
arity = 2

[fix]
placeholder = "default"
pair_template = "{ {key}, {value} }"

[apply]
backup = false
backup_suffix = ".orig"
"#;

        let config = parse_config(contents).unwrap();
        assert_eq!(config.analysis.deny, vec!["EXHAUSTIVEDICT0003"]);
        assert_eq!(config.analysis.marker.module.as_deref(), Some("Acme.Annotations"));
        assert_eq!(config.analysis.container.arity, Some(2));
        assert_eq!(config.fix.placeholder.as_deref(), Some("default"));
        assert!(config.fix.indexer_template.is_none());
        assert!(!config.apply.backup);
        assert_eq!(config.apply.backup_suffix, ".orig");
    }

    #[test]
    fn empty_config_merges_to_defaults() {
        let merged = ConfigMerger::new(parse_config("").unwrap()).merge_check_args(&[]);
        assert_eq!(merged.analysis, AnalyzerConfig::default());
        assert_eq!(merged.style, FixStyle::default());
        assert!(merged.backup_enabled);
        assert_eq!(merged.backup_suffix, ".enumcov.bak");
    }

    #[test]
    fn partial_identity_keeps_default_fields() {
        let config = parse_config(
            r#"
[analysis.marker]
module = "MyAnnotations"
"#,
        )
        .unwrap();
        let merged = ConfigMerger::new(config).merge_check_args(&[]);
        assert_eq!(merged.analysis.marker.module, "MyAnnotations");
        assert_eq!(
            merged.analysis.marker.qualified_name,
            "ExhaustiveDictionary.ExhaustiveAttribute"
        );
    }

    #[test]
    fn cli_deny_extends_config_deny() {
        let config = parse_config("[analysis]\ndeny = [\"A*\"]\n").unwrap();
        let merged =
            ConfigMerger::new(config).merge_check_args(&["B?".to_string(), "A*".to_string()]);
        assert_eq!(merged.analysis.deny, vec!["A*", "B?"]);
    }

    #[test]
    fn cli_placeholder_and_no_backup_win() {
        let config = parse_config("[fix]\nplaceholder = \"default\"\n").unwrap();
        let merged = ConfigMerger::new(config).merge_fix_args(&[], Some("null"), true);
        assert_eq!(merged.style.placeholder, "null");
        assert!(!merged.backup_enabled);
    }

    #[test]
    fn discover_config_some_and_none() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        assert!(discover_config(&root).is_none());

        std::fs::write(root.join(CONFIG_FILE_NAME), "").expect("write config");
        assert!(discover_config(&root).is_some());
        assert!(load_or_default(&root).is_ok());
    }

    #[test]
    fn invalid_toml_names_the_file() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        std::fs::write(root.join(CONFIG_FILE_NAME), "[analysis\n").expect("write config");
        let err = load_or_default(&root).unwrap_err();
        assert!(format!("{err:#}").contains("enumcov.toml"));
    }
}
