//! Host-system integration boundary.
//!
//! The [`Build`] trait decouples the pipeline from the hosting build system:
//! project identity, dependency provisioning and artifact registration stay
//! on the host side, so the core runs unchanged under different hosts.
//! Tests use fake builds that provision files without any real resolution.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info};

/// Capabilities the pipeline needs from its hosting build system.
pub trait Build {
    /// Base directory of the project being built.
    fn base_dir(&self) -> &Path;

    /// Artifact identity, used for the published file name.
    fn artifact_id(&self) -> &str;

    /// Artifact version, used for the published file name.
    fn version(&self) -> &str;

    /// Provision dependency-provided resources into the working directory.
    ///
    /// Runs before the source copy, so source files win on conflict. Only
    /// invoked when the dependency scan is enabled.
    fn resolve_dependencies(&self, working_dir: &Path) -> Result<()>;

    /// Record the published artifact with the host.
    fn set_artifact(&self, artifact: &Path) -> Result<()>;
}

/// Filesystem-only host used by the `texbuild` CLI.
///
/// Has no dependency providers; `resolve_dependencies` is a no-op.
pub struct LocalBuild {
    base_dir: PathBuf,
    artifact_id: String,
    version: String,
}

impl LocalBuild {
    pub fn new(base_dir: PathBuf, artifact_id: String, version: String) -> Self {
        Self {
            base_dir,
            artifact_id,
            version,
        }
    }
}

impl Build for LocalBuild {
    fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn resolve_dependencies(&self, _working_dir: &Path) -> Result<()> {
        debug!("no dependency providers configured");
        Ok(())
    }

    fn set_artifact(&self, artifact: &Path) -> Result<()> {
        info!("artifact {}", artifact.display());
        Ok(())
    }
}
