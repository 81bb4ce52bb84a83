//! Error types for assetsync-sync.

use std::path::PathBuf;

use thiserror::Error;

use assetsync_core::CoreError;
use assetsync_vcs::VcsError;

/// Why a download failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadFailure {
    #[error("{0}")]
    Transport(String),

    #[error("unauthorized (HTTP 401)")]
    Unauthorized,

    #[error("not found (HTTP 404)")]
    NotFound,

    #[error("received {received} of {expected} expected bytes")]
    Verification { expected: u64, received: u64 },
}

/// All errors that can arise from fetching, placing and inspecting assets.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("download of {url} failed: {kind}")]
    Download { url: String, kind: DownloadFailure },

    /// Missing path, failed extraction / copy / write, failed command.
    #[error("filesystem failure at {path}: {reason}")]
    Filesystem { path: PathBuf, reason: String },

    /// The asset has the wrong shape for the chosen processor or provider.
    #[error("unsupported asset for {role} '{name}': {reason}")]
    UnsupportedAsset {
        role: &'static str,
        name: &'static str,
        reason: String,
    },

    /// No implementation is registered under this type name.
    #[error("unsupported {role} type '{name}'")]
    UnsupportedType { role: &'static str, name: String },

    /// An implementation was registered under a name it does not answer to.
    #[error("invalid {role} implementation for '{name}': {reason}")]
    UnsupportedClass {
        role: &'static str,
        name: String,
        reason: String,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("vcs error: {0}")]
    Vcs(#[from] VcsError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    /// Failures a different environment may not hit: transport, filesystem,
    /// host errors. Configuration and registry errors are excluded.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            SyncError::Download { .. }
                | SyncError::Filesystem { .. }
                | SyncError::Io { .. }
                | SyncError::Vcs(_)
        )
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`SyncError::Filesystem`].
pub(crate) fn fs_err(path: impl Into<PathBuf>, reason: impl Into<String>) -> SyncError {
    SyncError::Filesystem {
        path: path.into(),
        reason: reason.into(),
    }
}
