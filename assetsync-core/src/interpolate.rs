//! `{key}` template interpolation for URL templates and shell commands.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9_-]+)\}").expect("Invalid placeholder regex"));

/// Replace every `{key}` whose `lookup` yields a value; unknown keys stay verbatim.
pub fn interpolate_with(template: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Interpolate scalar values of `vars` as-is.
pub fn interpolate(template: &str, vars: &Map<String, Value>) -> String {
    interpolate_with(template, |key| scalar(vars.get(key)?))
}

/// Interpolate scalar values of `vars`, percent-encoding each value.
pub fn interpolate_encoded(template: &str, vars: &Map<String, Value>) -> String {
    interpolate_with(template, |key| {
        scalar(vars.get(key)?).map(|v| urlencoding::encode(&v).into_owned())
    })
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
