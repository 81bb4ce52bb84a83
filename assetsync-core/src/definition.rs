//! Typed views over the raw source / target / vcs configuration bags.
//!
//! Each view owns a [`Definition`]: explicit configuration merged recursively
//! over type-specific defaults. Pipelines mutate their own copy (resolved
//! environment, fetched revision); definitions are never shared across runs.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::revision::Revision;

pub const KEY_TYPE: &str = "type";
pub const KEY_URL: &str = "url";
pub const KEY_REVISION_URL: &str = "revision-url";
pub const KEY_VERSION: &str = "version";
pub const KEY_ENVIRONMENT: &str = "environment";
pub const KEY_REVISION: &str = "revision";
pub const KEY_COMMAND: &str = "command";
pub const KEY_ACCESS_TOKEN: &str = "access-token";
pub const KEY_PATH: &str = "path";
pub const KEY_BASE: &str = "base";
pub const KEY_REVISION_FILE: &str = "revision-file";

/// Default name of the revision file written next to placed assets.
pub const DEFAULT_REVISION_FILE: &str = "REVISION";

/// A string-keyed configuration bag with defaults applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Definition {
    values: Map<String, Value>,
}

impl Definition {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// `values` merged recursively over `defaults`; explicit values win.
    pub fn with_defaults(values: Map<String, Value>, defaults: Map<String, Value>) -> Self {
        let mut merged = defaults;
        merge_recursive(&mut merged, values);
        Self { values: merged }
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Non-empty string value of `key`.
    pub fn str(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Scalar value of `key` rendered as a string (numbers and booleans included).
    pub fn string(&self, key: &str) -> Option<String> {
        match self.values.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(Value::as_bool)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    fn require(&self, definition: &'static str, key: &str) -> Result<&str, CoreError> {
        self.str(key).ok_or_else(|| CoreError::MissingConfiguration {
            definition,
            key: key.to_string(),
        })
    }
}

fn merge_recursive(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                merge_recursive(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn defaults(entries: &[(&str, &str)]) -> Map<String, Value> {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_string(), Value::String((*v).to_string())))
        .collect()
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Where assets come from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Source(Definition);

impl Source {
    pub const DEFAULT_TYPE: &'static str = "http";

    pub fn new(values: Map<String, Value>) -> Self {
        Self(Definition::with_defaults(
            values,
            defaults(&[(KEY_TYPE, Self::DEFAULT_TYPE)]),
        ))
    }

    pub fn definition(&self) -> &Definition {
        &self.0
    }

    pub fn definition_mut(&mut self) -> &mut Definition {
        &mut self.0
    }

    pub fn kind(&self) -> &str {
        self.0.str(KEY_TYPE).unwrap_or(Self::DEFAULT_TYPE)
    }

    pub fn url(&self) -> Result<&str, CoreError> {
        self.0.require("source", KEY_URL)
    }

    pub fn revision_url(&self) -> Option<&str> {
        self.0.str(KEY_REVISION_URL)
    }

    /// Locked asset version, if the source pins one.
    pub fn version(&self) -> Option<String> {
        self.0.string(KEY_VERSION)
    }

    pub fn environment(&self) -> Option<&str> {
        self.0.str(KEY_ENVIRONMENT)
    }

    pub fn set_environment(&mut self, environment: &str) {
        self.0.set(KEY_ENVIRONMENT, environment);
    }

    pub fn command(&self) -> Option<&str> {
        self.0.str(KEY_COMMAND)
    }

    pub fn access_token(&self) -> Option<&str> {
        self.0.str(KEY_ACCESS_TOKEN)
    }

    /// Explicit or previously injected revision; malformed values read as unknown.
    pub fn revision(&self) -> Option<Revision> {
        self.0.str(KEY_REVISION).and_then(|r| Revision::new(r).ok())
    }

    pub fn set_revision(&mut self, revision: &Revision) {
        self.0.set(KEY_REVISION, revision.as_str());
    }
}

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

/// Where assets are placed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Target(Definition);

impl Target {
    pub const DEFAULT_TYPE: &'static str = "archive";

    pub fn new(values: Map<String, Value>) -> Self {
        Self(Definition::with_defaults(
            values,
            defaults(&[
                (KEY_TYPE, Self::DEFAULT_TYPE),
                (KEY_REVISION_FILE, DEFAULT_REVISION_FILE),
                (KEY_BASE, ""),
            ]),
        ))
    }

    pub fn definition(&self) -> &Definition {
        &self.0
    }

    pub fn definition_mut(&mut self) -> &mut Definition {
        &mut self.0
    }

    pub fn kind(&self) -> &str {
        self.0.str(KEY_TYPE).unwrap_or(Self::DEFAULT_TYPE)
    }

    pub fn path(&self) -> Result<PathBuf, CoreError> {
        self.0.require("target", KEY_PATH).map(PathBuf::from)
    }

    pub fn revision_file(&self) -> &str {
        self.0.str(KEY_REVISION_FILE).unwrap_or(DEFAULT_REVISION_FILE)
    }

    /// `<path>/<revision-file>`.
    pub fn revision_file_path(&self) -> Result<PathBuf, CoreError> {
        Ok(self.path()?.join(self.revision_file()))
    }

    /// Sub-path of the extracted archive that becomes the target contents.
    pub fn base(&self) -> &str {
        self.0.str(KEY_BASE).unwrap_or_default()
    }

    pub fn revision(&self) -> Option<Revision> {
        self.0.str(KEY_REVISION).and_then(|r| Revision::new(r).ok())
    }
}

// ---------------------------------------------------------------------------
// Vcs
// ---------------------------------------------------------------------------

pub const KEY_PROJECT_ID: &str = "project-id";
pub const KEY_REPOSITORY: &str = "repository";
pub const KEY_BASE_URL: &str = "base-url";

/// Binding to a version-control host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Vcs(Definition);

impl Vcs {
    pub fn new(values: Map<String, Value>) -> Self {
        Self(Definition::new(values))
    }

    pub fn definition(&self) -> &Definition {
        &self.0
    }

    pub fn kind(&self) -> Result<&str, CoreError> {
        self.0.require("vcs", KEY_TYPE)
    }

    pub fn environment(&self) -> Option<&str> {
        self.0.str(KEY_ENVIRONMENT)
    }

    pub fn set_environment(&mut self, environment: &str) {
        self.0.set(KEY_ENVIRONMENT, environment);
    }

    pub fn access_token(&self) -> Option<&str> {
        self.0.str(KEY_ACCESS_TOKEN)
    }

    pub fn project_id(&self) -> Result<String, CoreError> {
        self.0
            .string(KEY_PROJECT_ID)
            .ok_or_else(|| CoreError::MissingConfiguration {
                definition: "vcs",
                key: KEY_PROJECT_ID.to_string(),
            })
    }

    pub fn repository(&self) -> Result<&str, CoreError> {
        self.0.require("vcs", KEY_REPOSITORY)
    }

    pub fn base_url(&self) -> Option<&str> {
        self.0.str(KEY_BASE_URL)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.0.str(key)
    }
}
