//! Opaque, validated revision identifiers.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, CoreError};

/// Minimum accepted revision length (abbreviated git SHA).
pub const MIN_REVISION_LENGTH: usize = 7;

/// A source or target revision, typically a commit SHA.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Revision(String);

impl Revision {
    pub fn new(value: impl AsRef<str>) -> Result<Self, CoreError> {
        let value = value.as_ref().trim();
        if value.chars().count() < MIN_REVISION_LENGTH {
            return Err(CoreError::InvalidRevision {
                value: value.to_string(),
                min: MIN_REVISION_LENGTH,
            });
        }
        Ok(Self(value.to_string()))
    }

    /// Read a revision from the first line of `path`.
    pub fn from_file(path: &Path) -> Result<Self, CoreError> {
        let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        Self::new(contents.lines().next().unwrap_or_default())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First seven characters, for display.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(MIN_REVISION_LENGTH) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for Revision {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Revision> for String {
    fn from(revision: Revision) -> Self {
        revision.0
    }
}
