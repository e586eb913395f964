//! Per-run step registry.
//!
//! Each run builds a fresh snapshot: built-in steps first, then caller
//! overlays by id (last writer wins). Style-file configuration rewrites the
//! snapshot's own clones, so built-in definitions are never mutated and
//! concurrent runs in one process cannot interfere.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::core::step::{Step, builtin_steps};

static STYLE_FLAG_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"-s\s+%style").unwrap());

#[derive(Debug, Clone)]
pub struct StepRegistry {
    steps: HashMap<String, Step>,
}

impl StepRegistry {
    /// Registry seeded with the built-in steps.
    pub fn with_defaults() -> Self {
        let mut registry = Self {
            steps: HashMap::new(),
        };
        for step in builtin_steps() {
            registry.register(step);
        }
        registry
    }

    /// Insert or replace a step by id.
    pub fn register(&mut self, step: Step) {
        self.steps.insert(step.id.clone(), step);
    }

    pub fn get(&self, id: &str) -> Option<&Step> {
        self.steps.get(id)
    }

    /// All registered steps, ordered by id.
    pub fn sorted_steps(&self) -> Vec<&Step> {
        let mut steps: Vec<&Step> = self.steps.values().collect();
        steps.sort_by(|a, b| a.id.cmp(&b.id));
        steps
    }

    /// Resolve the `%style` placeholder of the step with the given id.
    ///
    /// Without a style file the whole `-s %style` flag is removed from the
    /// argument template; with one, `%style` is replaced by the file name.
    /// Must be applied exactly once per run, before templates are expanded.
    pub fn configure_style_file(&mut self, id: &str, style_file: Option<&str>) {
        let Some(step) = self.steps.get_mut(id) else {
            return;
        };
        let Some(arguments) = step.arguments.as_deref() else {
            return;
        };
        let rewritten = apply_style_file(arguments, style_file);
        step.arguments = Some(rewritten);
    }
}

fn apply_style_file(arguments: &str, style_file: Option<&str>) -> String {
    match style_file {
        None | Some("") => STYLE_FLAG_RE.replace_all(arguments, "").trim().to_string(),
        Some(style) => arguments.replace("%style", style),
    }
}
