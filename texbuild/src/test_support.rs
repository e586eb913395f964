//! Test-only helpers: fake host builds and fake tool scripts.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::build::Build;

/// Host build stub that provisions in-memory dependency files and records
/// the registered artifact.
pub struct FakeBuild {
    pub base_dir: PathBuf,
    pub artifact_id: String,
    pub version: String,
    /// Relative path and contents written by `resolve_dependencies`.
    pub dependency_files: Vec<(String, String)>,
    pub artifact: RefCell<Option<PathBuf>>,
    pub resolve_calls: RefCell<u32>,
}

impl FakeBuild {
    pub fn new(base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            artifact_id: "thesis-project".to_string(),
            version: "1.0".to_string(),
            dependency_files: Vec::new(),
            artifact: RefCell::new(None),
            resolve_calls: RefCell::new(0),
        }
    }
}

impl Build for FakeBuild {
    fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn resolve_dependencies(&self, working_dir: &Path) -> Result<()> {
        *self.resolve_calls.borrow_mut() += 1;
        for (name, contents) in &self.dependency_files {
            let dest = working_dir.join(name);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
            fs::write(&dest, contents).with_context(|| format!("write {}", dest.display()))?;
        }
        Ok(())
    }

    fn set_artifact(&self, artifact: &Path) -> Result<()> {
        *self.artifact.borrow_mut() = Some(artifact.to_path_buf());
        Ok(())
    }
}

/// Write an executable shell script posing as an external tool.
#[cfg(unix)]
pub fn write_fake_tool(dir: &Path, name: &str, script: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, script).expect("write fake tool");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod fake tool");
    path
}
