//! Error types for assetsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from environment resolution, definitions and
/// configuration loading.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No pair of the environment map matched the branch.
    #[error("no environment matches branch '{branch}'")]
    NoMatch { branch: String },

    /// A transformer was constructed without a required option.
    #[error("transformer '{transformer}' requires option '{option}'")]
    MissingTransformerOption {
        transformer: &'static str,
        option: &'static str,
    },

    /// A slug pattern does not contain the `{slug}` placeholder.
    #[error("slug pattern '{pattern}' must contain the placeholder '{placeholder}'")]
    MissingPlaceholder {
        pattern: String,
        placeholder: &'static str,
    },

    /// The transformer name is not part of the registry.
    #[error("unsupported transformer '{0}'")]
    UnsupportedTransformer(String),

    /// A `/…/` delimited pattern is not a valid regular expression.
    #[error("invalid regex pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A glob pattern could not be compiled.
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// The serialized environment map has an unexpected shape.
    #[error("invalid environment map entry '{pattern}': {message}")]
    InvalidMapEntry { pattern: String, message: String },

    /// A revision string is shorter than the minimum length.
    #[error("invalid revision '{value}': expected at least {min} characters")]
    InvalidRevision { value: String, min: usize },

    /// A required definition key is absent.
    #[error("missing configuration '{key}' in {definition} definition")]
    MissingConfiguration {
        definition: &'static str,
        key: String,
    },

    /// The configuration file does not exist.
    #[error("configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// The configuration file is not valid JSON or has the wrong shape.
    #[error("failed to parse configuration at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No branch was given and none could be derived from CI or git.
    #[error("cannot determine the current branch of {path}; pass --branch")]
    BranchUndetectable { path: PathBuf },

    /// Underlying git failure while reading HEAD.
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// I/O failure with the offending path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`CoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CoreError {
    CoreError::Io {
        path: path.into(),
        source,
    }
}
