// src/main.rs

use anyhow::{Context, Result};
use clap::Parser;
use depbind::{BindConfig, NpmClient, ShellRunner};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "depbind")]
#[command(author, version, about = "Bind project dependencies from cache, registry or sibling packages", long_about = None)]
struct Cli {
    /// Project root (default: current directory)
    #[arg(short, long, default_value = ".")]
    project: PathBuf,

    /// Config file (default: <project>/depbind.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Query and plan, but do not install or pack anything
    #[arg(long)]
    dry_run: bool,

    /// Log resolution decisions
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let project_dir = cli
        .project
        .canonicalize()
        .with_context(|| format!("Project directory {} not found", cli.project.display()))?;

    let mut config = BindConfig::load(&project_dir, cli.config.as_deref())?;
    config.dry_run = cli.dry_run;

    let npm = NpmClient::new(ShellRunner::new(), config.package_manager.clone(), &project_dir)
        .dry_run(config.dry_run);

    let summary = depbind::run(&project_dir, &config, &npm)?;

    if summary.is_success() {
        if summary.clean_installed {
            info!("All dependencies bound");
        } else if summary.dry_run && summary.outcome.changed {
            info!("[DRY-RUN] All dependencies resolvable; nothing was installed");
        } else {
            info!("Nothing to do");
        }
        return Ok(());
    }

    error!(
        "{} dependenc{} could not be bound",
        summary.outcome.errors.len(),
        if summary.outcome.errors.len() == 1 { "y" } else { "ies" }
    );
    std::process::exit(summary.exit_code());
}
