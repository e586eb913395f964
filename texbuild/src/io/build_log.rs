//! Composite build log aggregation.
//!
//! Each executed step gets a header block in one plain-text log inside the
//! working directory; per-step tool logs are absorbed into it and removed.
//! Absorption must happen strictly after the step's process has terminated,
//! which the sequential pipeline guarantees.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::step::Step;

/// File name of the composite log inside the working directory.
pub const BUILD_LOG_NAME: &str = "texbuild.log";

pub struct BuildLog {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl BuildLog {
    /// Create (or append to) the composite log in `working_dir`.
    pub fn create(working_dir: &Path) -> Result<Self> {
        let path = working_dir.join(BUILD_LOG_NAME);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("create build log {}", path.display()))?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the header block identifying a step's position in the chain.
    pub fn step_header(&mut self, index: usize, total: usize, step_id: &str) -> Result<()> {
        writeln!(self.writer, "##### Step {index}/{total} {step_id} #####")
            .with_context(|| format!("write build log {}", self.path.display()))
    }

    /// Absorb the step's tool log, if the step declares one and the tool
    /// wrote it: append its raw contents and remove the per-step file.
    /// Tool logs carry whatever encoding the tool uses, so absorption is
    /// byte-faithful.
    pub fn absorb_step_log(
        &mut self,
        working_dir: &Path,
        base_name: &str,
        step: &Step,
    ) -> Result<()> {
        let Some(extension) = step.log_extension.as_deref() else {
            return Ok(());
        };
        let step_log = working_dir.join(format!("{base_name}.{extension}"));
        if !step_log.is_file() {
            return Ok(());
        }
        let contents = fs::read(&step_log)
            .with_context(|| format!("read step log {}", step_log.display()))?;
        self.writer
            .write_all(&contents)
            .with_context(|| format!("write build log {}", self.path.display()))?;
        fs::remove_file(&step_log)
            .with_context(|| format!("remove step log {}", step_log.display()))?;
        Ok(())
    }

    /// Flush and return the log path.
    pub fn finish(mut self) -> Result<PathBuf> {
        self.writer
            .flush()
            .with_context(|| format!("write build log {}", self.path.display()))?;
        Ok(self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::step::{builtin_steps, ids};

    #[test]
    fn headers_identify_step_position_and_id() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut log = BuildLog::create(temp.path()).expect("create");
        log.step_header(1, 6, ids::PDFLATEX).expect("header");
        log.step_header(2, 6, ids::BIBTEX).expect("header");
        let path = log.finish().expect("finish");

        let contents = fs::read_to_string(path).expect("read");
        assert!(contents.contains("##### Step 1/6 pdflatex #####"));
        assert!(contents.contains("##### Step 2/6 bibtex #####"));
    }

    #[test]
    fn absorbing_appends_and_removes_step_log() {
        let temp = tempfile::tempdir().expect("tempdir");
        let steps = builtin_steps();
        let pdflatex = steps
            .iter()
            .find(|step| step.id == ids::PDFLATEX)
            .expect("pdflatex");
        fs::write(temp.path().join("thesis.log"), "tool output\n").expect("write");

        let mut log = BuildLog::create(temp.path()).expect("create");
        log.step_header(1, 1, ids::PDFLATEX).expect("header");
        log.absorb_step_log(temp.path(), "thesis", pdflatex)
            .expect("absorb");
        let path = log.finish().expect("finish");

        let contents = fs::read_to_string(path).expect("read");
        assert!(contents.contains("tool output"));
        assert!(!temp.path().join("thesis.log").exists());
    }

    /// Tool logs are absorbed byte for byte, including non-UTF-8 encodings.
    #[test]
    fn non_utf8_step_log_is_absorbed_verbatim() {
        let temp = tempfile::tempdir().expect("tempdir");
        let steps = builtin_steps();
        let pdflatex = steps
            .iter()
            .find(|step| step.id == ids::PDFLATEX)
            .expect("pdflatex");
        fs::write(temp.path().join("thesis.log"), b"caf\xe9 output\n").expect("write");

        let mut log = BuildLog::create(temp.path()).expect("create");
        log.absorb_step_log(temp.path(), "thesis", pdflatex)
            .expect("absorb");
        let path = log.finish().expect("finish");

        let contents = fs::read(path).expect("read");
        assert!(contents.windows(11).any(|w| w == b"caf\xe9 output"));
        assert!(!temp.path().join("thesis.log").exists());
    }

    #[test]
    fn missing_step_log_is_tolerated() {
        let temp = tempfile::tempdir().expect("tempdir");
        let steps = builtin_steps();
        let bibtex = steps.iter().find(|step| step.id == ids::BIBTEX).expect("bibtex");

        let mut log = BuildLog::create(temp.path()).expect("create");
        log.absorb_step_log(temp.path(), "thesis", bibtex)
            .expect("absorb");
        log.finish().expect("finish");
    }
}
