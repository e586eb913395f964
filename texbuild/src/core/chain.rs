//! Chain resolution: from configured step ids to ordered step lists.
//!
//! The rendering chain contains the steps that produce the target format;
//! the build chain is the full executed sequence, with the reserved `render`
//! token expanded in place to the rendering chain (it may appear several
//! times to force repeated passes for cross-reference stabilization).

use anyhow::{Result, anyhow};

use crate::core::registry::StepRegistry;
use crate::core::step::{OutputFormat, Step, ids};

/// Reserved build-chain token that expands to the rendering chain.
pub const RENDER_TOKEN: &str = "render";

/// One entry of a configured build chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainToken {
    /// Placeholder for the whole rendering chain.
    Render,
    /// Reference to a registered step by id.
    Step(String),
}

impl ChainToken {
    pub fn parse(token: &str) -> Self {
        if token == RENDER_TOKEN {
            ChainToken::Render
        } else {
            ChainToken::Step(token.to_string())
        }
    }
}

/// The resolved chains for one run.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    /// Steps that directly produce the output format.
    pub rendering: Vec<Step>,
    /// The full ordered sequence to execute.
    pub build: Vec<Step>,
}

/// Default rendering chain per output format.
fn default_rendering_ids(format: OutputFormat) -> &'static [&'static str] {
    match format {
        OutputFormat::Dvi => &[ids::LATEX],
        OutputFormat::Ps => &[ids::LATEX, ids::DVIPS],
        OutputFormat::Pdf => &[ids::PDFLATEX],
    }
}

/// Default build chain: one render pass, the auxiliary steps, then two more
/// render passes to stabilize cross references.
const DEFAULT_BUILD_TOKENS: [&str; 6] = [
    RENDER_TOKEN,
    ids::BIBTEX,
    ids::MAKEINDEX,
    ids::MAKEINDEXNOMENCL,
    RENDER_TOKEN,
    RENDER_TOKEN,
];

/// Resolve the rendering and build chains against a registry snapshot.
///
/// Fails on the first unknown step id, naming the id and the configuration
/// list it was declared in.
pub fn resolve_chains(
    registry: &StepRegistry,
    output_format: OutputFormat,
    rendering_steps: Option<&[String]>,
    build_steps: Option<&[String]>,
) -> Result<BuildPlan> {
    let rendering = match rendering_steps {
        Some(configured) => resolve_ids(registry, configured.iter().map(String::as_str), "rendering_steps")?,
        None => resolve_ids(
            registry,
            default_rendering_ids(output_format).iter().copied(),
            "rendering_steps",
        )?,
    };

    let tokens: Vec<ChainToken> = match build_steps {
        Some(configured) => configured.iter().map(|token| ChainToken::parse(token)).collect(),
        None => DEFAULT_BUILD_TOKENS
            .iter()
            .map(|token| ChainToken::parse(token))
            .collect(),
    };

    let mut build = Vec::new();
    for token in &tokens {
        match token {
            ChainToken::Render => build.extend(rendering.iter().cloned()),
            ChainToken::Step(id) => {
                let step = registry.get(id).ok_or_else(|| unknown_step(id, "build_steps"))?;
                build.push(step.clone());
            }
        }
    }

    Ok(BuildPlan { rendering, build })
}

fn resolve_ids<'a>(
    registry: &StepRegistry,
    ids: impl Iterator<Item = &'a str>,
    declared_in: &str,
) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    for id in ids {
        let step = registry
            .get(id)
            .ok_or_else(|| unknown_step(id, declared_in))?;
        steps.push(step.clone());
    }
    Ok(steps)
}

fn unknown_step(id: &str, declared_in: &str) -> anyhow::Error {
    anyhow!(
        "step '{id}' declared in '{declared_in}' is unknown; define it with the 'steps' configuration"
    )
}
