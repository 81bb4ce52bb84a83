//! Targets that are already populated, e.g. by a local build.

use tracing::debug;

use assetsync_core::Target;

use crate::asset::{Asset, PlacedAsset};
use crate::error::{fs_err, SyncError};
use crate::processor::Processor;
use crate::progress::Progress;

/// Leaves files untouched and reports the target's current revision.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExistingProcessor;

impl ExistingProcessor {
    pub const NAME: &'static str = "existing";

    /// The target as it is on disk; fails if its directory is missing.
    pub fn current(&self, target: &Target) -> Result<PlacedAsset, SyncError> {
        let path = self.asset_path(target)?;
        if !path.is_dir() {
            return Err(fs_err(&path, "target directory does not exist"));
        }
        let revision = self.target_revision(target);
        debug!("{} is at {:?}", path.display(), revision.as_ref().map(|r| r.short()));
        Ok(PlacedAsset {
            source: None,
            path,
            revision,
        })
    }
}

impl Processor for ExistingProcessor {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process_asset(
        &self,
        asset: Asset,
        target: &Target,
        _progress: &mut dyn Progress,
    ) -> Result<Asset, SyncError> {
        let placed = self.current(target)?;
        Ok(Asset::Placed(PlacedAsset {
            source: asset.source().cloned(),
            ..placed
        }))
    }
}
