use anyhow::Result;
use clap::{Parser, Subcommand};
use console::{style, Term};
use packplan_core::{
    resolve_plan, BuildConfig, BuildMode, BuildPlan, EmittedFile, ManifestBuilder, Warning,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// packplan - environment-aware build plan resolver
#[derive(Parser)]
#[command(name = "packplan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the build plan for a mode
    Plan {
        /// Build mode: development or production
        #[arg(short, long)]
        mode: String,

        /// Path to the static declarations (default: packplan.toml)
        #[arg(short, long, default_value = "packplan.toml")]
        config: PathBuf,

        /// Print the full plan as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Validate the static declarations without resolving a plan
    Check {
        /// Path to the static declarations (default: packplan.toml)
        #[arg(short, long, default_value = "packplan.toml")]
        config: PathBuf,
    },

    /// Fold an emitted-file list into the post-build manifest
    Manifest {
        /// JSON file listing the emitted files of one build
        #[arg(short, long)]
        emitted: PathBuf,

        /// Optional seed mapping from a previous build
        #[arg(short, long)]
        seed: Option<PathBuf>,

        /// Output path (default: asset-manifest.json)
        #[arg(short, long, default_value = "asset-manifest.json")]
        out: PathBuf,

        /// Path to the static declarations (default: packplan.toml)
        #[arg(short, long, default_value = "packplan.toml")]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .without_time()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Plan { mode, config, json } => cmd_plan(&mode, &config, json),
        Commands::Check { config } => cmd_check(&config),
        Commands::Manifest {
            emitted,
            seed,
            out,
            config,
        } => cmd_manifest(&emitted, seed.as_deref(), &out, &config),
    }
}

/// Load declarations, falling back to the built-in defaults when the
/// default config path does not exist
fn load_config(path: &Path) -> Result<BuildConfig> {
    if path.exists() {
        Ok(BuildConfig::load(path)?)
    } else {
        Ok(BuildConfig::default())
    }
}

/// Collect the process environment for the pure resolver
///
/// This is the only place ambient state is read; `GENERATE_SOURCEMAP=false`
/// clears the source-map flag here rather than inside the library.
fn collect_env(config: &mut BuildConfig) -> BTreeMap<String, String> {
    let vars: BTreeMap<String, String> = std::env::vars().collect();
    if vars.get("GENERATE_SOURCEMAP").map(String::as_str) == Some("false") {
        config.source_map = false;
    }
    vars
}

fn print_warnings(term: &Term, warnings: &[Warning]) -> Result<()> {
    for warning in warnings {
        term.write_line(&format!(
            "{} {}",
            style("warning:").yellow().bold(),
            warning
        ))?;
    }
    Ok(())
}

fn cmd_plan(mode: &str, config_path: &Path, json: bool) -> Result<()> {
    let term = Term::stderr();

    let mode = match BuildMode::from_str(mode) {
        Ok(m) => m,
        Err(e) => {
            term.write_line(&format!("{} {}", style("error:").red().bold(), e))?;
            std::process::exit(1);
        }
    };

    let mut config = load_config(config_path)?;
    let vars = collect_env(&mut config);

    let (plan, warnings) = match resolve_plan(mode, &vars, &config) {
        Ok(resolved) => resolved,
        Err(e) => {
            term.write_line(&format!("{} {}", style("error:").red().bold(), e))?;
            std::process::exit(1);
        }
    };

    print_warnings(&term, &warnings)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print_plan_summary(&term, &plan)?;
    }

    Ok(())
}

fn print_plan_summary(term: &Term, plan: &BuildPlan) -> Result<()> {
    term.write_line(&format!(
        "{} Resolved {} build plan",
        style("::").cyan().bold(),
        style(plan.mode).bold()
    ))?;
    term.write_line("")?;
    term.write_line(&format!("  Entry:      {}", plan.paths.entry.display()))?;
    term.write_line(&format!("  Output:     {}", plan.paths.output_dir.display()))?;
    term.write_line(&format!("  Cache:      {:?}", plan.cache))?;
    term.write_line(&format!("  Source map: {:?}", plan.output.source_map))?;
    term.write_line("")?;

    for group in &plan.rules.groups {
        let policy = if group.exclusive {
            "first match wins"
        } else {
            "all matches apply"
        };
        term.write_line(&format!(
            "  Group {} ({}):",
            style(&group.id).bold(),
            policy
        ))?;
        for rule in &group.rules {
            term.write_line(&format!(
                "    {} {} -> [{}]",
                style("-").dim(),
                rule.predicate,
                rule.transformers.0.join(", ")
            ))?;
        }
    }

    term.write_line("")?;
    for step in &plan.steps {
        term.write_line(&format!("  {} {}", style("+").green().bold(), step.name()))?;
    }

    Ok(())
}

fn cmd_check(config_path: &Path) -> Result<()> {
    let term = Term::stderr();

    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            term.write_line(&format!("{} {}", style("error:").red().bold(), e))?;
            std::process::exit(1);
        }
    };

    match config.pipeline().validate() {
        Ok(warnings) => {
            print_warnings(&term, &warnings)?;
            term.write_line(&format!(
                "{} {} rule group(s) valid, {} warning(s)",
                style("::").green().bold(),
                config.rules.len(),
                warnings.len()
            ))?;
            Ok(())
        }
        Err(e) => {
            term.write_line(&format!("{} {}", style("error:").red().bold(), e))?;
            std::process::exit(1);
        }
    }
}

fn cmd_manifest(
    emitted_path: &Path,
    seed_path: Option<&Path>,
    out: &Path,
    config_path: &Path,
) -> Result<()> {
    let term = Term::stderr();
    let config = load_config(config_path)?;

    let emitted: Vec<EmittedFile> =
        serde_json::from_str(&std::fs::read_to_string(emitted_path)?)?;

    let mut builder = ManifestBuilder::new().with_main_group(config.main_group.clone());
    if let Some(seed_path) = seed_path {
        let seed: BTreeMap<String, String> =
            serde_json::from_str(&std::fs::read_to_string(seed_path)?)?;
        builder = builder.with_seed(seed);
    }

    let (manifest, warnings) = builder.build(&emitted);
    print_warnings(&term, &warnings)?;

    std::fs::write(out, serde_json::to_string_pretty(&manifest)?)?;

    term.write_line(&format!(
        "{} Wrote {} ({} file(s), {} entrypoint(s))",
        style("::").green().bold(),
        out.display(),
        manifest.files.len(),
        manifest.entrypoints.len()
    ))?;

    Ok(())
}
