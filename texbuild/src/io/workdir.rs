//! Working-directory lifecycle: creation, source copy, main-document lookup
//! and best-effort removal.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use tracing::warn;

/// Relative location of the working directory under the host base dir.
pub const WORKING_DIR: &str = "target/latex";

/// Relative location artifacts are published to.
pub const TARGET_DIR: &str = "target";

/// Create (or reuse) the per-run working directory.
pub fn create_working_directory(base_dir: &Path) -> Result<PathBuf> {
    let working_dir = base_dir.join(WORKING_DIR);
    fs::create_dir_all(&working_dir)
        .with_context(|| format!("create working directory {}", working_dir.display()))?;
    Ok(working_dir)
}

/// Recursively copy the contents of `source` into `dest`, overwriting
/// same-named files already present (e.g. from dependency resolution).
pub fn copy_dir_recursive(source: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest).with_context(|| format!("create directory {}", dest.display()))?;
    let entries =
        fs::read_dir(source).with_context(|| format!("read directory {}", source.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("read directory {}", source.display()))?;
        let target = dest.join(entry.file_name());
        let file_type = entry.file_type().with_context(|| {
            format!("inspect directory entry {}", entry.path().display())
        })?;
        if file_type.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target).with_context(|| {
                format!("copy {} to {}", entry.path().display(), target.display())
            })?;
        }
    }
    Ok(())
}

/// Find the single file with the given extension in `directory`.
///
/// Returns `Ok(None)` when there is no match; more than one match is an
/// error because the main document would be ambiguous.
pub fn find_single_file(directory: &Path, extension: &str) -> Result<Option<PathBuf>> {
    let suffix = format!(".{extension}");
    let mut matches = Vec::new();
    let entries = fs::read_dir(directory)
        .with_context(|| format!("read directory {}", directory.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("read directory {}", directory.display()))?;
        if entry.file_name().to_string_lossy().ends_with(&suffix) {
            matches.push(entry.path());
        }
    }
    match matches.len() {
        0 => Ok(None),
        1 => Ok(Some(matches.remove(0))),
        _ => bail!(
            "multiple .{extension} files found in {}; set 'main_document' to disambiguate",
            directory.display()
        ),
    }
}

/// Resolve the main source document inside the working directory.
///
/// A configured name must exist; without one, exactly one file with the
/// expected extension must be present.
pub fn resolve_main_document(
    working_dir: &Path,
    configured: Option<&str>,
    extension: &str,
) -> Result<PathBuf> {
    let main_file = match configured {
        Some(name) if !name.is_empty() => Some(working_dir.join(name)),
        _ => find_single_file(working_dir, extension)?,
    };
    match main_file {
        Some(file) if file.is_file() => Ok(file),
        _ => Err(anyhow!(
            "no source document found in {}",
            working_dir.display()
        )),
    }
}

/// Delete the working directory; failures are downgraded to a warning
/// because cleanup is best-effort.
pub fn remove_working_directory(working_dir: &Path) {
    if let Err(err) = fs::remove_dir_all(working_dir) {
        warn!(
            err = %err,
            "could not delete working directory {}",
            working_dir.display()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_preserves_nested_layout_and_overwrites() {
        let temp = tempfile::tempdir().expect("tempdir");
        let source = temp.path().join("src");
        let dest = temp.path().join("work");
        fs::create_dir_all(source.join("figures")).expect("mkdir");
        fs::write(source.join("thesis.tex"), "source wins").expect("write");
        fs::write(source.join("figures/plot.eps"), "eps").expect("write");
        fs::create_dir_all(&dest).expect("mkdir");
        fs::write(dest.join("thesis.tex"), "from dependency").expect("write");

        copy_dir_recursive(&source, &dest).expect("copy");

        let main = fs::read_to_string(dest.join("thesis.tex")).expect("read");
        assert_eq!(main, "source wins");
        assert!(dest.join("figures/plot.eps").is_file());
    }

    #[test]
    fn single_tex_file_is_auto_detected() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("thesis.tex"), "").expect("write");
        fs::write(temp.path().join("refs.bib"), "").expect("write");

        let main = resolve_main_document(temp.path(), None, "tex").expect("main");
        assert_eq!(main, temp.path().join("thesis.tex"));
    }

    #[test]
    fn multiple_tex_files_are_ambiguous() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("a.tex"), "").expect("write");
        fs::write(temp.path().join("b.tex"), "").expect("write");

        let err = resolve_main_document(temp.path(), None, "tex").unwrap_err();
        assert!(err.to_string().contains("multiple .tex files"));
    }

    #[test]
    fn configured_main_document_must_exist() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("thesis.tex"), "").expect("write");

        let err = resolve_main_document(temp.path(), Some("missing.tex"), "tex").unwrap_err();
        assert!(err.to_string().contains("no source document found"));
    }

    #[test]
    fn empty_directory_has_no_source_document() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = resolve_main_document(temp.path(), None, "tex").unwrap_err();
        assert!(err.to_string().contains("no source document found"));
    }
}
