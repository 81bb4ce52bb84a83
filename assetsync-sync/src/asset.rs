//! Assets as they move from provider to processor.

use std::path::{Path, PathBuf};

use tempfile::TempPath;

use assetsync_core::{Revision, Source};

/// A fetched or placed asset.
#[derive(Debug)]
pub enum Asset {
    /// On disk, not yet placed at the target.
    Fetched(FetchedAsset),
    /// Placed at (or already present in) the target.
    Placed(PlacedAsset),
}

impl Asset {
    pub fn source(&self) -> Option<&Source> {
        match self {
            Asset::Fetched(asset) => Some(&asset.source),
            Asset::Placed(asset) => asset.source.as_ref(),
        }
    }
}

/// A fetched file. Temporary files are deleted when the asset is dropped.
#[derive(Debug)]
pub struct FetchedAsset {
    pub source: Source,
    path: PathBuf,
    _temp: Option<TempPath>,
}

impl FetchedAsset {
    pub fn temporary(source: Source, temp: TempPath) -> Self {
        Self {
            source,
            path: temp.to_path_buf(),
            _temp: Some(temp),
        }
    }

    /// A file the provider does not own; it is left in place.
    pub fn local(source: Source, path: PathBuf) -> Self {
        Self {
            source,
            path,
            _temp: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_temporary(&self) -> bool {
        self._temp.is_some()
    }
}

/// A populated target.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedAsset {
    pub source: Option<Source>,
    pub path: PathBuf,
    pub revision: Option<Revision>,
}
