//! Locating tool executables on the local system.

use std::env;
use std::path::{Path, PathBuf};

/// Environment variable holding a system-level bin directory override,
/// checked after the configured bin directory and before `PATH`.
pub const BIN_OVERRIDE_ENV: &str = "TEXBUILD_BIN";

/// Find the executable with the given platform name.
///
/// Search order, first hit wins: the configured bin directory, the
/// [`BIN_OVERRIDE_ENV`] directory, then every entry of `PATH` in listed
/// order. Returns `None` instead of an error so callers can collect all
/// missing executables before failing.
pub fn find_executable(bin_dir: Option<&Path>, platform_name: &str) -> Option<PathBuf> {
    if let Some(dir) = bin_dir {
        let candidate = dir.join(platform_name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    if let Ok(dir) = env::var(BIN_OVERRIDE_ENV)
        && !dir.is_empty()
    {
        let candidate = Path::new(&dir).join(platform_name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    if let Some(path) = env::var_os("PATH") {
        for dir in env::split_paths(&path) {
            let candidate = dir.join(platform_name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn finds_executable_in_configured_bin_dir() {
        let temp = tempfile::tempdir().expect("tempdir");
        let candidate = temp.path().join("pdflatex");
        fs::write(&candidate, "").expect("write");

        let found = find_executable(Some(temp.path()), "pdflatex").expect("found");
        assert_eq!(found, candidate);
    }

    #[test]
    fn bin_dir_miss_falls_through_to_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        // `sh` is on PATH everywhere we run tests; the empty bin dir must not
        // shadow the PATH lookup.
        #[cfg(unix)]
        assert!(find_executable(Some(temp.path()), "sh").is_some());
    }

    #[test]
    fn unknown_executable_is_not_found() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert!(find_executable(Some(temp.path()), "texbuild-no-such-tool").is_none());
    }

    #[test]
    fn directories_do_not_count_as_executables() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::create_dir(temp.path().join("pdflatex")).expect("mkdir");
        assert!(find_executable(Some(temp.path()), "pdflatex").is_none());
    }
}
