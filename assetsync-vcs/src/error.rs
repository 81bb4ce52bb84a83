//! Error types for assetsync-vcs.

use thiserror::Error;

use assetsync_core::CoreError;

/// All errors that can arise from version-control host queries.
#[derive(Debug, Error)]
pub enum VcsError {
    /// Invalid or incomplete vcs definition.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The request never produced an HTTP response.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The host answered with a non-success status.
    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The response body could not be interpreted.
    #[error("invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },

    /// No provider is registered under this type name.
    #[error("unsupported vcs type '{0}'")]
    UnsupportedType(String),

    /// A provider with the same name is already registered.
    #[error("vcs provider '{0}' is already registered")]
    DuplicateProvider(String),
}

impl VcsError {
    pub(crate) fn from_ureq(url: &str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, _) => VcsError::Status {
                url: url.to_string(),
                status,
            },
            ureq::Error::Transport(transport) => VcsError::Transport {
                url: url.to_string(),
                message: transport.to_string(),
            },
        }
    }

    pub(crate) fn invalid_response(url: &str, message: impl ToString) -> Self {
        VcsError::InvalidResponse {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, VcsError::Status { status: 404, .. })
    }
}
