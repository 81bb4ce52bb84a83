//! Branch → environment transformers.
//!
//! | Name          | Options     | Result                                      |
//! |---------------|-------------|---------------------------------------------|
//! | `passthrough` | -           | input unchanged                             |
//! | `static`      | `value`     | constant value                              |
//! | `slug`        | `pattern`   | `pattern` with `{slug}` = input, `/` → `-`  |
//! | `version`     | `version`   | constant locked version                     |

use serde_json::{Map, Value};

use crate::error::CoreError;

/// Placeholder replaced by the slugified input in a slug pattern.
pub const SLUG_PLACEHOLDER: &str = "{slug}";

/// Slug pattern used when a serialized slug transformer carries no pattern.
pub const DEFAULT_SLUG_PATTERN: &str = "fe-{slug}";

/// A pure function mapping (part of) a branch name to an environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transformer {
    Passthrough,
    Static { value: String },
    Slug { pattern: String },
    Version { version: String },
}

impl Transformer {
    pub fn passthrough() -> Self {
        Transformer::Passthrough
    }

    pub fn static_value(value: impl Into<String>) -> Result<Self, CoreError> {
        let value = value.into();
        if value.is_empty() {
            return Err(CoreError::MissingTransformerOption {
                transformer: "static",
                option: "value",
            });
        }
        Ok(Transformer::Static { value })
    }

    pub fn slug(pattern: impl Into<String>) -> Result<Self, CoreError> {
        let pattern = pattern.into();
        if !pattern.contains(SLUG_PLACEHOLDER) {
            return Err(CoreError::MissingPlaceholder {
                pattern,
                placeholder: SLUG_PLACEHOLDER,
            });
        }
        Ok(Transformer::Slug { pattern })
    }

    pub fn version(version: impl Into<String>) -> Result<Self, CoreError> {
        let version = version.into();
        if version.is_empty() {
            return Err(CoreError::MissingTransformerOption {
                transformer: "version",
                option: "version",
            });
        }
        Ok(Transformer::Version { version })
    }

    /// Stable registry name of this transformer.
    pub fn name(&self) -> &'static str {
        match self {
            Transformer::Passthrough => "passthrough",
            Transformer::Static { .. } => "static",
            Transformer::Slug { .. } => "slug",
            Transformer::Version { .. } => "version",
        }
    }

    pub fn transform(&self, input: &str) -> String {
        match self {
            Transformer::Passthrough => input.to_string(),
            Transformer::Static { value } => value.clone(),
            Transformer::Slug { pattern } => {
                pattern.replace(SLUG_PLACEHOLDER, &input.replace('/', "-"))
            }
            Transformer::Version { version } => version.clone(),
        }
    }

    /// Options record used by the serialized environment map.
    pub fn to_options(&self) -> Map<String, Value> {
        let mut options = Map::new();
        match self {
            Transformer::Passthrough => {}
            Transformer::Static { value } => {
                options.insert("value".into(), Value::String(value.clone()));
            }
            Transformer::Slug { pattern } => {
                options.insert("pattern".into(), Value::String(pattern.clone()));
            }
            Transformer::Version { version } => {
                options.insert("version".into(), Value::String(version.clone()));
            }
        }
        options
    }

    /// Rebuild a transformer from its registry name and options record.
    pub fn from_options(name: &str, options: &Map<String, Value>) -> Result<Self, CoreError> {
        let option = |key: &str| options.get(key).and_then(Value::as_str).unwrap_or_default();
        match name {
            "passthrough" => Ok(Self::passthrough()),
            "static" => Self::static_value(option("value")),
            "slug" => match options.get("pattern").and_then(Value::as_str) {
                Some(pattern) => Self::slug(pattern),
                None => Self::slug(DEFAULT_SLUG_PATTERN),
            },
            "version" => Self::version(option("version")),
            other => Err(CoreError::UnsupportedTransformer(other.to_string())),
        }
    }
}
