//! The pipeline runner: configure the chain, then execute it step by step.
//!
//! Execution is single-threaded and fully synchronous: each step blocks
//! until its tool terminates, because later steps consume files earlier
//! steps produce.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use tracing::{error, info, instrument};

use crate::build::Build;
use crate::config::BuildConfig;
use crate::core::chain::{BuildPlan, resolve_chains};
use crate::core::registry::StepRegistry;
use crate::core::step::{Step, TEX_EXTENSION, ids};
use crate::core::template::{base_name, expand_arguments, tokenize_quoted};
use crate::io::build_log::BuildLog;
use crate::io::executable::{BIN_OVERRIDE_ENV, find_executable};
use crate::io::process::{ToolInvocation, run_tool};
use crate::io::workdir::{
    TARGET_DIR, copy_dir_recursive, create_working_directory, remove_working_directory,
    resolve_main_document,
};

/// How a single step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The tool ran and exited zero.
    Executed,
    /// The step did not run meaningfully (optional launch failure, or a
    /// non-zero exit with the expected input file absent).
    Skipped,
    /// The tool exited non-zero on an existing input and halt-on-error is
    /// disabled; the run continued.
    Failed(i32),
}

/// One executed entry of the build chain.
#[derive(Debug, Clone)]
pub struct StepRun {
    pub id: String,
    pub outcome: StepOutcome,
}

/// Result of a completed pipeline run.
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// The published artifact.
    pub artifact: PathBuf,
    /// Per-step outcomes in chain order.
    pub steps: Vec<StepRun>,
}

/// Resolve and verify the run before any subprocess starts: source
/// directory, registry overlays, style files, chains and executables.
///
/// Output-format validation happens when the configuration is parsed into
/// [`crate::core::step::OutputFormat`].
pub fn configure(config: &BuildConfig, base_dir: &Path) -> Result<BuildPlan> {
    let source_dir = base_dir.join(&config.source_directory);
    if !source_dir.is_dir() {
        bail!("source directory '{}' does not exist", source_dir.display());
    }

    let mut registry = StepRegistry::with_defaults();
    for step in &config.steps {
        registry.register(step.clone());
    }
    registry.configure_style_file(ids::MAKEINDEX, config.index_style_file.as_deref());
    registry.configure_style_file(
        ids::MAKEINDEXNOMENCL,
        config.nomenclature_style_file.as_deref(),
    );

    let plan = resolve_chains(
        &registry,
        config.output_format,
        config.rendering_steps.as_deref(),
        config.build_steps.as_deref(),
    )?;
    check_executables(&plan, config.bin_directory.as_deref())?;
    Ok(plan)
}

/// Execute the whole build chain and publish the artifact.
///
/// On a fatal step failure the working directory and the partial composite
/// log are retained for inspection, regardless of the retention flag.
#[instrument(skip_all, fields(output_format = %config.output_format))]
pub fn execute<B: Build>(config: &BuildConfig, build: &B) -> Result<BuildReport> {
    config.validate()?;
    let plan = configure(config, build.base_dir())?;
    info!(
        "rendering steps: [{}], build steps: [{}]",
        chain_ids(&plan.rendering),
        chain_ids(&plan.build)
    );
    if let Some(bin_dir) = &config.bin_directory {
        info!("bin directory of the tex distribution: {}", bin_dir.display());
    }

    let working_dir = create_working_directory(build.base_dir())?;
    if config.enable_dependency_scan {
        build.resolve_dependencies(&working_dir)?;
    }
    let source_dir = build.base_dir().join(&config.source_directory);
    copy_dir_recursive(&source_dir, &working_dir)?;

    let main_file =
        resolve_main_document(&working_dir, config.main_document.as_deref(), TEX_EXTENSION)?;
    let main_name = main_file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("main document has no file name"))?;
    info!("processing {main_name}");
    let base = base_name(&main_name).to_string();

    let mut log = BuildLog::create(&working_dir)?;
    let total = plan.build.len();
    let mut steps = Vec::new();
    let mut fatal = None;
    for (index, step) in plan.build.iter().enumerate() {
        log.step_header(index + 1, total, &step.id)?;
        let outcome = execute_step(step, &working_dir, &main_name, config);
        // Absorbed even when the step failed, so partial logs survive a
        // fatal abort.
        log.absorb_step_log(&working_dir, &base, step)?;
        match outcome {
            Ok(outcome) => steps.push(StepRun {
                id: step.id.clone(),
                outcome,
            }),
            Err(err) => {
                fatal = Some(err);
                break;
            }
        }
    }
    log.finish()?;
    if let Some(err) = fatal {
        return Err(err);
    }

    let artifact = publish_artifact(&working_dir, &base, config, build)?;
    if !config.keep_intermediate_files {
        remove_working_directory(&working_dir);
    }
    Ok(BuildReport { artifact, steps })
}

/// Run one step and apply the skip/fail/halt policy.
fn execute_step(
    step: &Step,
    working_dir: &Path,
    main_name: &str,
    config: &BuildConfig,
) -> Result<StepOutcome> {
    // Configuration already verified every executable; a miss here means the
    // tool disappeared since.
    let executable = find_executable(
        config.bin_directory.as_deref(),
        &step.platform_executable(),
    )
    .ok_or_else(|| {
        anyhow!(
            "executable for step '{}' is no longer available",
            step.id
        )
    })?;

    let base = base_name(main_name);
    let input_file = working_dir.join(step.input_file_name(base));
    let args = expand_arguments(
        step.arguments.as_deref(),
        main_name,
        &step.input_extension,
        &step.output_extension,
    )
    .map(|expanded| tokenize_quoted(&expanded))
    .unwrap_or_default();

    info!("executing {}: {} {}", step.id, executable.display(), args.join(" "));
    let invocation = ToolInvocation {
        program: executable,
        args,
        working_dir: working_dir.to_path_buf(),
        log_prefix: format!("[texbuild][{}]", step.id),
        timeout: config.step_timeout(),
    };

    let exit = match run_tool(&invocation) {
        Ok(exit) => exit,
        Err(err) => {
            if step.optional {
                info!("execution skipped: {} ({err:#})", step.id);
                return Ok(StepOutcome::Skipped);
            }
            return Err(err.context(format!("step '{}' could not be executed", step.id)));
        }
    };
    if exit.timed_out {
        if step.optional {
            info!("execution skipped after timeout: {}", step.id);
            return Ok(StepOutcome::Skipped);
        }
        bail!("step '{}' timed out", step.id);
    }

    match exit.code.unwrap_or(-1) {
        0 => Ok(StepOutcome::Executed),
        _ if !input_file.is_file() => {
            info!("execution skipped: {} (no {})", step.id, input_file.display());
            Ok(StepOutcome::Skipped)
        }
        code if config.halt_on_error => {
            bail!(
                "execution of step '{}' failed with exit code {code}",
                step.id
            );
        }
        code => {
            info!("execution of {} finished with exit code {code}", step.id);
            Ok(StepOutcome::Failed(code))
        }
    }
}

/// Verify every step of both chains has a locatable executable, collecting
/// all missing steps into one error.
fn check_executables(plan: &BuildPlan, bin_dir: Option<&Path>) -> Result<()> {
    let mut checked = BTreeSet::new();
    let mut missing = Vec::new();
    for step in plan.rendering.iter().chain(plan.build.iter()) {
        if !checked.insert(step.id.clone()) {
            continue;
        }
        if find_executable(bin_dir, &step.platform_executable()).is_none() {
            error!(
                "step '{}' cannot be executed: executable '{}' found neither in the bin directory, {BIN_OVERRIDE_ENV} nor on PATH",
                step.id,
                step.platform_executable()
            );
            missing.push(step.id.clone());
        }
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(anyhow!(
            "missing executables for steps: {}",
            missing.join(", ")
        ))
    }
}

fn publish_artifact<B: Build>(
    working_dir: &Path,
    base: &str,
    config: &BuildConfig,
    build: &B,
) -> Result<PathBuf> {
    let extension = config.output_format.extension();
    let output_file = working_dir.join(format!("{base}.{extension}"));
    let target_dir = build.base_dir().join(TARGET_DIR);
    std::fs::create_dir_all(&target_dir)
        .with_context(|| format!("create target directory {}", target_dir.display()))?;
    let artifact = target_dir.join(format!(
        "{}-{}.{extension}",
        build.artifact_id(),
        build.version()
    ));
    std::fs::copy(&output_file, &artifact).with_context(|| {
        format!(
            "copy output {} to {}",
            output_file.display(),
            artifact.display()
        )
    })?;
    build.set_artifact(&artifact)?;
    Ok(artifact)
}

fn chain_ids(steps: &[Step]) -> String {
    steps
        .iter()
        .map(|step| step.id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
