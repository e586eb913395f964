//! LaTeX toolchain build runner.
//!
//! Resolves the build chain for the configured output format, runs each
//! external tool in order and publishes the rendered artifact under
//! `target/`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use texbuild::build::LocalBuild;
use texbuild::config::{BuildConfig, load_config};
use texbuild::core::registry::StepRegistry;
use texbuild::exit_codes;
use texbuild::logging;
use texbuild::pipeline;

#[derive(Parser)]
#[command(
    name = "texbuild",
    version,
    about = "Deterministic LaTeX toolchain build runner"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the build pipeline for the current project.
    Build(BuildArgs),
    /// List the built-in steps.
    Steps,
}

#[derive(Args)]
struct BuildArgs {
    /// Configuration file.
    #[arg(long, default_value = "texbuild.toml")]
    config: PathBuf,
    /// Output format: dvi, pdf or ps.
    #[arg(long)]
    output_format: Option<String>,
    /// Directory containing the LaTeX sources.
    #[arg(long)]
    source_dir: Option<PathBuf>,
    /// Main document name, instead of auto-detection.
    #[arg(long)]
    main_file: Option<String>,
    /// Bin directory of the TeX distribution.
    #[arg(long)]
    bin_dir: Option<PathBuf>,
    /// Keep the working directory (and composite log) after the build.
    #[arg(long)]
    keep_intermediate_files: bool,
    /// Tolerate non-zero exit codes from non-optional steps.
    #[arg(long)]
    no_halt_on_error: bool,
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::FAILURE);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Build(args) => cmd_build(&args),
        Command::Steps => cmd_steps(),
    }
}

fn cmd_build(args: &BuildArgs) -> Result<()> {
    let mut config = load_config(&args.config)?;
    apply_overrides(&mut config, args)?;
    config.validate()?;

    let base_dir = std::env::current_dir().context("resolve current directory")?;
    let artifact_id = config
        .artifact_id
        .clone()
        .unwrap_or_else(|| project_name(&base_dir));
    let version = config
        .artifact_version
        .clone()
        .unwrap_or_else(|| "0.1.0".to_string());
    let build = LocalBuild::new(base_dir, artifact_id, version);

    let report = pipeline::execute(&config, &build)?;
    println!("{}", report.artifact.display());
    Ok(())
}

fn apply_overrides(config: &mut BuildConfig, args: &BuildArgs) -> Result<()> {
    if let Some(format) = &args.output_format {
        config.output_format = format.parse()?;
    }
    if let Some(dir) = &args.source_dir {
        config.source_directory = dir.clone();
    }
    if let Some(name) = &args.main_file {
        config.main_document = Some(name.clone());
    }
    if let Some(dir) = &args.bin_dir {
        config.bin_directory = Some(dir.clone());
    }
    if args.keep_intermediate_files {
        config.keep_intermediate_files = true;
    }
    if args.no_halt_on_error {
        config.halt_on_error = false;
    }
    Ok(())
}

fn project_name(base_dir: &Path) -> String {
    base_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

fn cmd_steps() -> Result<()> {
    let registry = StepRegistry::with_defaults();
    for step in registry.sorted_steps() {
        println!(
            "{:<18} {:<10} {:>3} -> {:<3} {}",
            step.id,
            step.executable,
            step.input_extension,
            step.output_extension,
            if step.optional { "optional" } else { "" }
        );
    }
    Ok(())
}
