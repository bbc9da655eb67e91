//! Reply template rendering.
//!
//! Templates are plain strings with `{{name}}` placeholders. Each placeholder
//! is replaced by the matching argument; unknown names render as an empty
//! string. Substituted values are never expanded again.

use std::{collections::HashMap, sync::LazyLock};

use regex::{Captures, Regex};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}]*)\}\}").expect("placeholder pattern is valid"));

/// Renders `template`, substituting every `{{name}}` with `args[name]`.
///
/// # Examples
///
/// ```
/// # use std::collections::HashMap;
/// # use clanbot::templater::render;
/// let args = HashMap::from([("a", "x".to_string()), ("b", "y".to_string())]);
/// assert_eq!(render("{{a}} and {{b}}", &args), "x and y");
/// ```
pub fn render(template: &str, args: &HashMap<&str, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            args.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned()
}
