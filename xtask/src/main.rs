use anyhow::Context;
use clap::{Parser, Subcommand};
use enumcov_testkit::ToyHost;
use fs_err as fs;
use std::process::Command as ProcessCommand;

#[derive(Debug, Parser)]
#[command(name = "xtask", about = "Workspace helper tasks")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print schema identifiers used by enumcov.
    PrintSchemas,
    /// Print rule ids, keys and titles.
    PrintRules,
    /// Create the default artifacts layout (artifacts/enumcov).
    InitArtifacts {
        #[arg(long, default_value = "artifacts")]
        dir: String,
    },
    /// Snapshot C#-like sources with the toy host (for hand-made fixtures).
    Snapshot {
        /// Source files; paths are recorded as given.
        #[arg(required = true)]
        sources: Vec<String>,
        #[arg(long, default_value = "sources.snapshot.json")]
        out: String,
    },
    /// Run the cucumber acceptance suite.
    Acceptance,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::PrintSchemas => {
            println!("{}", enumcov_types::schema::ENUMCOV_SNAPSHOT_V1);
            println!("{}", enumcov_types::schema::ENUMCOV_REPORT_V1);
            println!("{}", enumcov_types::schema::ENUMCOV_FIXES_V1);
            println!("{}", enumcov_types::schema::ENUMCOV_APPLY_V1);
        }
        Command::PrintRules => {
            for rule in enumcov_domain::rules::RULES {
                println!("{}\t{}\t{}", rule.id, rule.key, rule.title);
            }
        }
        Command::InitArtifacts { dir } => {
            fs::create_dir_all(format!("{dir}/enumcov")).with_context(|| format!("create {dir}"))?;
            println!("initialized {dir}/enumcov");
        }
        Command::Snapshot { sources, out } => {
            let mut host = ToyHost::new();
            for path in &sources {
                let text = fs::read_to_string(path)?;
                host.add_document(path.as_str(), text);
            }
            let snapshot = host.snapshot().context("parse sources")?;
            let json = serde_json::to_string_pretty(&snapshot).context("serialize snapshot")?;
            fs::write(&out, json)?;
            println!("wrote {} document(s) to {out}", sources.len());
        }
        Command::Acceptance => {
            let status = ProcessCommand::new("cargo")
                .args(["test", "-p", "enumcov-bdd", "--test", "cucumber"])
                .status()
                .context("run cucumber suite")?;
            if !status.success() {
                anyhow::bail!("acceptance failed");
            }
        }
    }
    Ok(())
}
