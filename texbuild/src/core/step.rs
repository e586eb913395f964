//! Step descriptors and the built-in tool set.
//!
//! A [`Step`] describes one external tool invocation: which executable to
//! run, which file extensions it consumes and produces, and the argument
//! template expanded before execution (see [`crate::core::template`]).

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::Deserialize;

/// Well-known ids of the built-in steps.
pub mod ids {
    pub const LATEX: &str = "latex";
    pub const PDFLATEX: &str = "pdflatex";
    pub const XELATEX: &str = "xelatex";
    pub const LUALATEX: &str = "lualatex";
    pub const BIBTEX: &str = "bibtex";
    pub const BIBER: &str = "biber";
    pub const MAKEINDEX: &str = "makeindex";
    pub const MAKEINDEXNOMENCL: &str = "makeindexnomencl";
    pub const DVIPS: &str = "dvips";
    pub const DVIPDFM: &str = "dvipdfm";
    pub const PS2PDF: &str = "ps2pdf";
}

/// File extension of LaTeX source documents.
pub const TEX_EXTENSION: &str = "tex";

/// Output formats a build can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Dvi,
    Pdf,
    Ps,
}

impl OutputFormat {
    /// File extension of artifacts in this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Dvi => "dvi",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Ps => "ps",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dvi" => Ok(OutputFormat::Dvi),
            "pdf" => Ok(OutputFormat::Pdf),
            "ps" => Ok(OutputFormat::Ps),
            other => Err(anyhow!(
                "invalid output format '{other}'. Supported values are: dvi, pdf, ps"
            )),
        }
    }
}

/// One tool invocation in the build chain.
///
/// Argument templates may contain the placeholders `%input`, `%output` and
/// `%base`; the index-related built-ins additionally carry a `%style`
/// placeholder resolved during registry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Step {
    /// Unique id within a registry snapshot.
    pub id: String,
    /// Logical executable name, without platform suffix.
    pub executable: String,
    /// File extension of the input the tool expects.
    pub input_extension: String,
    /// File extension of the output the tool produces.
    pub output_extension: String,
    /// Argument template; `None` means the tool takes no arguments.
    #[serde(default)]
    pub arguments: Option<String>,
    /// Optional steps are skipped instead of failing the run when their
    /// expected input file is absent (e.g. bibtex without references).
    #[serde(default)]
    pub optional: bool,
    /// Extension of the log file the tool writes next to the document.
    #[serde(default)]
    pub log_extension: Option<String>,
}

impl Step {
    fn builtin(
        id: &str,
        executable: &str,
        input_extension: &str,
        output_extension: &str,
        arguments: &str,
        optional: bool,
        log_extension: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            executable: executable.to_string(),
            input_extension: input_extension.to_string(),
            output_extension: output_extension.to_string(),
            arguments: Some(arguments.to_string()),
            optional,
            log_extension: Some(log_extension.to_string()),
        }
    }

    /// Executable name on the current platform (`.exe` suffix on Windows).
    pub fn platform_executable(&self) -> String {
        if cfg!(windows) {
            format!("{}.exe", self.executable)
        } else {
            self.executable.clone()
        }
    }

    /// Name of the input file this step expects for the given document base.
    pub fn input_file_name(&self, base_name: &str) -> String {
        format!("{base_name}.{}", self.input_extension)
    }
}

/// The predefined steps seeded into every registry snapshot.
pub fn builtin_steps() -> Vec<Step> {
    vec![
        Step::builtin(
            ids::LATEX,
            "latex",
            "tex",
            "dvi",
            "-interaction=nonstopmode --src-specials %input",
            false,
            "log",
        ),
        Step::builtin(
            ids::PDFLATEX,
            "pdflatex",
            "tex",
            "pdf",
            "-synctex=1 -interaction=nonstopmode --src-specials %base",
            false,
            "log",
        ),
        Step::builtin(
            ids::XELATEX,
            "xelatex",
            "tex",
            "pdf",
            "-synctex=1 -interaction=nonstopmode %input",
            false,
            "log",
        ),
        Step::builtin(
            ids::LUALATEX,
            "lualatex",
            "tex",
            "pdf",
            "-synctex=1 -interaction=nonstopmode --src-specials %input",
            false,
            "log",
        ),
        Step::builtin(ids::BIBTEX, "bibtex", "bib", "aux", "%base", true, "blg"),
        Step::builtin(ids::BIBER, "biber", "bib", "bbl", "%base", true, "blg"),
        Step::builtin(
            ids::MAKEINDEX,
            "makeindex",
            "idx",
            "ind",
            "%input -s %style",
            true,
            "ilg",
        ),
        Step::builtin(
            ids::MAKEINDEXNOMENCL,
            "makeindex",
            "nlo",
            "nls",
            "%input -s %style -o %output",
            true,
            "ilg",
        ),
        Step::builtin(ids::DVIPS, "dvips", "dvi", "ps", "-R0 -o %output %input", false, "log"),
        Step::builtin(ids::DVIPDFM, "dvipdfm", "dvi", "pdf", "%input", false, "log"),
        Step::builtin(ids::PS2PDF, "ps2pdf", "ps", "pdf", "%input", false, "log"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_ids_are_unique() {
        let steps = builtin_steps();
        let mut ids: Vec<&str> = steps.iter().map(|step| step.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), steps.len());
    }

    #[test]
    fn input_file_name_uses_step_extension() {
        let steps = builtin_steps();
        let bibtex = steps.iter().find(|step| step.id == ids::BIBTEX).expect("bibtex");
        assert_eq!(bibtex.input_file_name("thesis"), "thesis.bib");
    }

    #[cfg(not(windows))]
    #[test]
    fn platform_executable_has_no_suffix_on_unix() {
        let steps = builtin_steps();
        let pdflatex = steps
            .iter()
            .find(|step| step.id == ids::PDFLATEX)
            .expect("pdflatex");
        assert_eq!(pdflatex.platform_executable(), "pdflatex");
    }

    #[test]
    fn output_format_parses_supported_values() {
        assert_eq!("pdf".parse::<OutputFormat>().expect("pdf"), OutputFormat::Pdf);
        assert_eq!("dvi".parse::<OutputFormat>().expect("dvi"), OutputFormat::Dvi);
        assert_eq!("ps".parse::<OutputFormat>().expect("ps"), OutputFormat::Ps);
    }

    #[test]
    fn output_format_rejects_unknown_values() {
        let err = "html".parse::<OutputFormat>().unwrap_err();
        assert!(err.to_string().contains("invalid output format 'html'"));
        assert!(err.to_string().contains("dvi, pdf, ps"));
    }
}
