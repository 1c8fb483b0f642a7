//! Command-line front end over the planning and apply engines.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use bundle_planner::{MemoryStore, Plan, Planner, PlannerConfig, apply};

#[derive(Parser, Debug)]
#[command(
  name = "bundle-planner",
  version,
  about = "Plan and apply addressable bundle group assignments"
)]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
  /// Compute a plan from a project store and print the result log
  Analyze(AnalyzeArgs),
  /// Execute a previously computed plan against a project store
  Apply(ApplyArgs),
}

#[derive(Parser, Debug)]
struct AnalyzeArgs {
  /// Path to the project store JSON document
  #[arg(long, value_name = "FILE")]
  project: PathBuf,

  /// Optional configuration file; defaults are discovered from the working directory
  #[arg(long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Write the serialized plan to this path
  #[arg(long, value_name = "FILE")]
  plan_out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ApplyArgs {
  /// Path to the project store JSON document
  #[arg(long, value_name = "FILE")]
  project: PathBuf,

  /// Path to a plan previously written by `analyze`
  #[arg(long, value_name = "FILE")]
  plan: PathBuf,

  /// Optional configuration file; defaults are discovered from the working directory
  #[arg(long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Write the mutated store here instead of back to --project
  #[arg(long, value_name = "FILE")]
  out: Option<PathBuf>,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
    )
    .with_target(false)
    .init();

  match Cli::parse().command {
    Commands::Analyze(args) => analyze(args),
    Commands::Apply(args) => run_apply(args),
  }
}

fn load_config(explicit: Option<&PathBuf>) -> Result<PlannerConfig> {
  match explicit {
    Some(path) => PlannerConfig::from_path(path)
      .with_context(|| format!("failed to load config from {}", path.display())),
    None => {
      let cwd = std::env::current_dir().context("failed to resolve working directory")?;
      Ok(PlannerConfig::discover(&cwd))
    }
  }
}

fn analyze(args: AnalyzeArgs) -> Result<()> {
  let config = load_config(args.config.as_ref())?;
  let store = MemoryStore::from_path(&args.project)
    .with_context(|| format!("failed to load project {}", args.project.display()))?;

  let planner = Planner::from_config(config);
  let mut session = planner.begin()?;
  let outcome = session.analyze(&store)?;

  for line in outcome.report.lines() {
    println!("{line}");
  }

  if let Some(path) = args.plan_out {
    let json = serde_json::to_string_pretty(&outcome.plan).context("failed to serialize plan")?;
    std::fs::write(&path, json)
      .with_context(|| format!("failed to write plan to {}", path.display()))?;
    tracing::info!(path = %path.display(), "plan written");
  }

  Ok(())
}

fn run_apply(args: ApplyArgs) -> Result<()> {
  let config = load_config(args.config.as_ref())?;
  let mut store = MemoryStore::from_path(&args.project)
    .with_context(|| format!("failed to load project {}", args.project.display()))?;

  let plan_json = std::fs::read_to_string(&args.plan)
    .with_context(|| format!("failed to read plan {}", args.plan.display()))?;
  let plan: Plan = serde_json::from_str(&plan_json)
    .with_context(|| format!("failed to parse plan {}", args.plan.display()))?;

  let (layout, _) = config.split();
  let stats = apply(&plan, &layout.group_template, &mut store)?;

  let destination = args.out.unwrap_or(args.project);
  store
    .to_path(&destination)
    .with_context(|| format!("failed to write project {}", destination.display()))?;

  println!(
    "Applied: {} groups created, {} groups removed, {} entries created, {} entries removed, {} skipped, {} stale",
    stats.groups_created,
    stats.groups_removed,
    stats.entries_created,
    stats.entries_removed,
    stats.skipped_missing_group,
    stats.stale_entries,
  );

  Ok(())
}
