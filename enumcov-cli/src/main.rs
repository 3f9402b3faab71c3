use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use enumcov_cli::config::{self, ConfigMerger, MergedConfig};
use enumcov_cli::explain;
use enumcov_core::adapters::{FsSnapshotSource, FsWritePort};
use enumcov_core::pipeline::{
    ToolError, run_apply, run_check, run_fix, write_apply_artifacts, write_check_artifacts,
    write_fix_artifacts,
};
use enumcov_core::settings::{ApplySettings, CheckSettings, FixSettings};
use enumcov_render::render_diagnostic_line;
use enumcov_types::ToolInfo;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "enumcov",
    version,
    about = "Exhaustiveness checks and fixes for enum-keyed map declarations."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyze host snapshots and report incomplete or misused [Exhaustive] maps.
    Check(CheckArgs),
    /// Propose edits that add missing enum keys (optionally apply them).
    Fix(FixArgs),
    /// Apply a previously written fixes.json.
    Apply(ApplyArgs),
    /// Explain a rule: what it reports, why, and how to resolve it.
    Explain(ExplainArgs),
    /// List all rules.
    ListRules(ListRulesArgs),
}

#[derive(Debug, Parser)]
struct CheckArgs {
    /// Snapshot file, or a directory scanned for `*.snapshot.json`.
    #[arg(long)]
    snapshot: Utf8PathBuf,

    /// Root directory (config discovery, default output location).
    #[arg(long, default_value = ".")]
    root: Utf8PathBuf,

    /// Output directory for artifacts (default: <root>/artifacts/enumcov).
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,

    /// Rule id patterns to suppress (`*` and `?` wildcards).
    #[arg(long)]
    deny: Vec<String>,

    /// Exit with code 2 when anything is reported.
    #[arg(long, default_value_t = false)]
    fail_on_warnings: bool,
}

#[derive(Debug, Parser)]
struct FixArgs {
    /// Snapshot file, or a directory scanned for `*.snapshot.json`.
    #[arg(long)]
    snapshot: Utf8PathBuf,

    /// Root directory the document paths are relative to.
    #[arg(long, default_value = ".")]
    root: Utf8PathBuf,

    /// Output directory for artifacts (default: <root>/artifacts/enumcov).
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,

    /// Only fix these diagnostic ids (repeatable).
    #[arg(long = "diagnostic")]
    diagnostics: Vec<String>,

    /// Rule id patterns to suppress (`*` and `?` wildcards).
    #[arg(long)]
    deny: Vec<String>,

    /// Value text for appended entries.
    #[arg(long)]
    placeholder: Option<String>,

    /// Write the edits to the files under --root.
    #[arg(long, default_value_t = false)]
    apply: bool,

    /// Do not keep a backup of modified files.
    #[arg(long, default_value_t = false)]
    no_backup: bool,
}

#[derive(Debug, Parser)]
struct ApplyArgs {
    /// Root directory the document paths are relative to.
    #[arg(long, default_value = ".")]
    root: Utf8PathBuf,

    /// Directory containing fixes.json (default: <root>/artifacts/enumcov).
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,

    /// Check preconditions and render the patch without writing files.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Do not keep a backup of modified files.
    #[arg(long, default_value_t = false)]
    no_backup: bool,
}

#[derive(Debug, Parser)]
struct ExplainArgs {
    /// Rule id or key to explain (e.g., "EXHAUSTIVEDICT0001", "missing-keys").
    rule: String,
}

#[derive(Debug, Parser)]
struct ListRulesArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Fix(args) => cmd_fix(args),
        Command::Apply(args) => cmd_apply(args),
        Command::Explain(args) => cmd_explain(args).map_err(ToolError::from),
        Command::ListRules(args) => cmd_list_rules(args).map_err(ToolError::from),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(ToolError::Internal(e)) => {
            error!("{:?}", e);
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
        Err(e) => {
            debug!("exiting with {}: {}", e.exit_code(), e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn load_merged(
    root: &camino::Utf8Path,
    merge: impl FnOnce(ConfigMerger) -> MergedConfig,
) -> anyhow::Result<MergedConfig> {
    let file_config = config::load_or_default(root).context("load enumcov.toml config")?;
    let merged = merge(ConfigMerger::new(file_config));
    debug!("merged config: {:?}", merged);
    Ok(merged)
}

fn cmd_check(args: CheckArgs) -> Result<(), ToolError> {
    let out_dir = args
        .out_dir
        .unwrap_or_else(|| args.root.join("artifacts").join("enumcov"));
    let merged = load_merged(&args.root, |m| m.merge_check_args(&args.deny))?;

    let settings = CheckSettings {
        root: args.root.clone(),
        out_dir: out_dir.clone(),
        analysis: merged.analysis,
        fail_on_warnings: args.fail_on_warnings,
    };
    let source = FsSnapshotSource::new(args.snapshot);
    let outcome = run_check(&settings, &source, tool_info())?;
    write_check_artifacts(&outcome, &out_dir, &FsWritePort)?;

    for d in &outcome.report.diagnostics {
        println!("{}", render_diagnostic_line(d));
    }
    for f in &outcome.report.failures {
        println!("{}: error: {}", f.path, f.message);
    }
    for input in &outcome.report.inputs {
        if let Some(err) = &input.error {
            println!("{}: error: {}", input.path, err);
        }
    }
    println!(
        "{} diagnostic(s) in {} site(s)",
        outcome.report.diagnostics.len(),
        outcome.report.run.sites_analyzed
    );
    info!("wrote report to {}", out_dir);

    if outcome.findings_block {
        return Err(ToolError::Findings);
    }
    Ok(())
}

fn cmd_fix(args: FixArgs) -> Result<(), ToolError> {
    let out_dir = args
        .out_dir
        .unwrap_or_else(|| args.root.join("artifacts").join("enumcov"));
    let merged = load_merged(&args.root, |m| {
        m.merge_fix_args(&args.deny, args.placeholder.as_deref(), args.no_backup)
    })?;

    let settings = FixSettings {
        root: args.root.clone(),
        out_dir: out_dir.clone(),
        analysis: merged.analysis,
        style: merged.style,
        diagnostics: args.diagnostics,
    };
    let source = FsSnapshotSource::new(args.snapshot);
    let outcome = run_fix(&settings, &source, tool_info())?;
    write_fix_artifacts(&outcome, &out_dir, &FsWritePort)?;

    for edit in &outcome.plan.edits {
        println!("{}: {}: {}", edit.path, edit.title, edit.added.join(", "));
    }
    for id in &outcome.unmatched {
        println!("{}: no fixable diagnostic with this id", id);
    }
    for failure in &outcome.plan.failures {
        println!("{}: error: {}", failure.path, failure.message);
    }
    println!(
        "{} edit(s) across {} file(s)",
        outcome.plan.summary.edits, outcome.plan.summary.files
    );
    info!("wrote fixes to {}", out_dir);

    if !args.apply {
        return Ok(());
    }
    apply_plan(ApplySettings {
        root: args.root,
        out_dir,
        dry_run: false,
        backup_enabled: merged.backup_enabled,
        backup_suffix: merged.backup_suffix,
    })
}

fn cmd_apply(args: ApplyArgs) -> Result<(), ToolError> {
    let out_dir = args
        .out_dir
        .unwrap_or_else(|| args.root.join("artifacts").join("enumcov"));
    let merged = load_merged(&args.root, |m| m.merge_apply_args(args.no_backup))?;

    apply_plan(ApplySettings {
        root: args.root,
        out_dir,
        dry_run: args.dry_run,
        backup_enabled: merged.backup_enabled,
        backup_suffix: merged.backup_suffix,
    })
}

fn apply_plan(settings: ApplySettings) -> Result<(), ToolError> {
    let outcome = run_apply(&settings, tool_info())?;
    write_apply_artifacts(&outcome, &settings.out_dir, &FsWritePort)?;

    let summary = &outcome.apply.summary;
    println!(
        "applied {}, skipped {}, failed {} ({} file(s) modified)",
        summary.applied, summary.skipped, summary.failed, summary.files_modified
    );
    for err in &outcome.apply.errors {
        println!("error: {}", err);
    }
    info!("wrote apply artifacts to {}", settings.out_dir);

    if outcome.apply_blocked {
        return Err(ToolError::ApplyBlocked {
            failed: summary.failed,
        });
    }
    Ok(())
}

fn tool_info() -> ToolInfo {
    ToolInfo::enumcov(env!("CARGO_PKG_VERSION"))
}

fn cmd_explain(args: ExplainArgs) -> anyhow::Result<()> {
    let Some(rule) = explain::lookup_rule(&args.rule) else {
        let available = explain::list_rule_keys().join(", ");
        anyhow::bail!(
            "Unknown rule: '{}'\n\nAvailable rules: {}",
            args.rule,
            available
        );
    };
    print!("{}", explain::render_explanation(rule));
    Ok(())
}

fn cmd_list_rules(args: ListRulesArgs) -> anyhow::Result<()> {
    use enumcov_domain::rules::RULES;

    match args.format {
        OutputFormat::Text => {
            println!("Available rules:\n");
            println!("  {:<20} {:<18} {:<8} TITLE", "ID", "KEY", "FIX");
            println!("  {:<20} {:<18} {:<8} -----", "--", "---", "---");
            for rule in RULES {
                let fix = if explain::fixes_for(rule).is_empty() {
                    "no"
                } else {
                    "yes"
                };
                println!("  {:<20} {:<18} {:<8} {}", rule.id, rule.key, fix, rule.title);
            }
            println!();
            println!("Use 'enumcov explain <id or key>' for details.");
        }
        OutputFormat::Json => {
            let rules: Vec<_> = RULES
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "id": r.id,
                        "key": r.key,
                        "title": r.title,
                        "severity": r.severity.as_str(),
                        "category": r.category,
                        "message": r.message_format,
                        "fixes": explain::fixes_for(r)
                            .iter()
                            .map(|f| f.fix_key)
                            .collect::<Vec<_>>(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rules)?);
        }
    }
    Ok(())
}
