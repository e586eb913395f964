//! Build configuration loaded from `texbuild.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use crate::core::step::{OutputFormat, Step};

/// Build configuration (TOML).
///
/// This file is intended to be edited by humans and must remain stable and
/// automatable. Missing fields default to the values used by the default
/// pdf build.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Output format of the artifact; selects the default rendering chain.
    pub output_format: OutputFormat,

    /// Bin directory of the TeX distribution, searched before `PATH`.
    pub bin_directory: Option<PathBuf>,

    /// Explicit rendering chain, overriding the per-format default.
    pub rendering_steps: Option<Vec<String>>,

    /// Explicit build chain; the reserved token `render` expands to the
    /// rendering chain.
    pub build_steps: Option<Vec<String>>,

    /// User-defined steps, merged into the registry by id (overriding
    /// built-ins with the same id).
    pub steps: Vec<Step>,

    /// Directory containing the source document, relative to the base dir.
    pub source_directory: PathBuf,

    /// Fixed main document name; without it, the single `.tex` file in the
    /// source directory is used.
    pub main_document: Option<String>,

    /// Style file for the makeindex step's `%style` placeholder.
    pub index_style_file: Option<String>,

    /// Style file for the nomenclature index step.
    pub nomenclature_style_file: Option<String>,

    /// Abort the run when a non-optional step exits non-zero. Some tools
    /// finish successfully but return a non-zero exit code, which is why
    /// this can be disabled.
    pub halt_on_error: bool,

    /// Keep the working directory (and the composite log) after the run.
    pub keep_intermediate_files: bool,

    /// Let the host provision dependency resources into the working
    /// directory before the source copy.
    pub enable_dependency_scan: bool,

    /// Bounded wait per step; a hung tool blocks the run forever without it.
    pub step_timeout_secs: Option<u64>,

    /// Artifact identity used for the published file name; the CLI host
    /// falls back to the project directory name.
    pub artifact_id: Option<String>,
    pub artifact_version: Option<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Pdf,
            bin_directory: None,
            rendering_steps: None,
            build_steps: None,
            steps: Vec::new(),
            source_directory: PathBuf::from("src/main/tex"),
            main_document: None,
            index_style_file: None,
            nomenclature_style_file: Some("nomencl.ist".to_string()),
            halt_on_error: true,
            keep_intermediate_files: false,
            enable_dependency_scan: false,
            step_timeout_secs: None,
            artifact_id: None,
            artifact_version: None,
        }
    }
}

impl BuildConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(steps) = &self.rendering_steps
            && steps.is_empty()
        {
            return Err(anyhow!("rendering_steps must not be an empty list"));
        }
        if let Some(steps) = &self.build_steps
            && steps.is_empty()
        {
            return Err(anyhow!("build_steps must not be an empty list"));
        }
        for step in &self.steps {
            if step.id.trim().is_empty() {
                return Err(anyhow!("custom step ids must not be empty"));
            }
            if step.executable.trim().is_empty() {
                return Err(anyhow!("custom step '{}' has no executable", step.id));
            }
        }
        if self.step_timeout_secs == Some(0) {
            return Err(anyhow!("step_timeout_secs must be > 0 when set"));
        }
        Ok(())
    }

    pub fn step_timeout(&self) -> Option<Duration> {
        self.step_timeout_secs.map(Duration::from_secs)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `BuildConfig::default()`.
pub fn load_config(path: &Path) -> Result<BuildConfig> {
    if !path.exists() {
        let config = BuildConfig::default();
        config.validate()?;
        return Ok(config);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let config: BuildConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(config.output_format, OutputFormat::Pdf);
        assert!(config.halt_on_error);
        assert!(!config.keep_intermediate_files);
        assert_eq!(config.source_directory, PathBuf::from("src/main/tex"));
        assert_eq!(config.nomenclature_style_file.as_deref(), Some("nomencl.ist"));
    }

    #[test]
    fn parses_full_configuration() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("texbuild.toml");
        fs::write(
            &path,
            r#"
output_format = "ps"
halt_on_error = false
build_steps = ["render", "bibtex", "render"]
index_style_file = "plain.ist"

[[steps]]
id = "gnuplot"
executable = "gnuplot"
input_extension = "plt"
output_extension = "eps"
arguments = "%input"
optional = true
"#,
        )
        .expect("write");

        let config = load_config(&path).expect("load");
        assert_eq!(config.output_format, OutputFormat::Ps);
        assert!(!config.halt_on_error);
        assert_eq!(
            config.build_steps.as_deref(),
            Some(&["render".to_string(), "bibtex".to_string(), "render".to_string()][..])
        );
        assert_eq!(config.steps.len(), 1);
        assert_eq!(config.steps[0].id, "gnuplot");
        assert!(config.steps[0].optional);
        assert_eq!(config.steps[0].log_extension, None);
    }

    #[test]
    fn rejects_invalid_output_format() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("texbuild.toml");
        fs::write(&path, "output_format = \"html\"\n").expect("write");

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("parse"));
    }

    #[test]
    fn rejects_empty_chain_overrides() {
        let config = BuildConfig {
            rendering_steps: Some(Vec::new()),
            ..BuildConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("rendering_steps"));
    }

    #[test]
    fn rejects_zero_timeout() {
        let config = BuildConfig {
            step_timeout_secs: Some(0),
            ..BuildConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
