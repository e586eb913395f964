//! Argument-template expansion and command-line tokenization.
//!
//! Both functions are pure: they operate on names, not files, and never touch
//! the filesystem.

/// Document name without its final extension.
pub fn base_name(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(index) => &file_name[..index],
        None => file_name,
    }
}

/// Expand a step's argument template against a concrete resource name.
///
/// `%input` and `%output` become `<base>.<input_ext>` / `<base>.<output_ext>`
/// and are double-quoted when the base name contains a space. `%base` is
/// always inserted unquoted. A `None` template means the step takes no
/// arguments and yields `None`.
pub fn expand_arguments(
    template: Option<&str>,
    resource_name: &str,
    input_extension: &str,
    output_extension: &str,
) -> Option<String> {
    let template = template?;
    let base = base_name(resource_name);
    let mut input_name = format!("{base}.{input_extension}");
    let mut output_name = format!("{base}.{output_extension}");
    if base.contains(' ') {
        input_name = format!("\"{input_name}\"");
        output_name = format!("\"{output_name}\"");
    }
    let expanded = template
        .replace("%input", &input_name)
        .replace("%base", base)
        .replace("%output", &output_name);
    Some(expanded)
}

/// Split an expanded argument string into command-line tokens.
///
/// Whitespace separates tokens, but double-quoted spans form a single token
/// with the quotes removed, matching the quoting produced by
/// [`expand_arguments`].
pub fn tokenize_quoted(arguments: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in arguments.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}
