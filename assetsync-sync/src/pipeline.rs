//! Synchronization: fetch each asset definition's source and place it at
//! its target, unless the target already holds the source revision.
//!
//! With `failsafe`, a fetch failure is retried once in the
//! [`FALLBACK_ENVIRONMENT`]. Failures of one asset definition never stop
//! the others.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, warn};

use assetsync_core::definition::KEY_REVISION;
use assetsync_core::environment::LATEST_ENVIRONMENT;
use assetsync_core::{AssetBundle, CoreError, Revision};

use crate::asset::Asset;
use crate::error::SyncError;
use crate::processor::ExistingProcessor;
use crate::progress::Progress;
use crate::registries::Registries;

/// Environment retried on failsafe; it carries no version, so it always exists.
pub const FALLBACK_ENVIRONMENT: &str = LATEST_ENVIRONMENT;

/// Whether a target that already holds the source revision is re-fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strategy {
    #[default]
    Default,
    Force,
}

impl Strategy {
    fn skips_current(self) -> bool {
        matches!(self, Strategy::Default)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    pub strategy: Strategy,
    pub failsafe: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum SyncOutcome {
    UpToDate { revision: Option<Revision> },
    Placed { path: PathBuf, revision: Option<Revision> },
}

/// Result for one asset definition of a [`Synchronizer::sync_all`] run.
#[derive(Debug)]
pub struct SyncReport {
    pub index: usize,
    /// Environment of the last attempt.
    pub environment: Option<String>,
    pub result: Result<SyncOutcome, SyncError>,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

pub fn all_succeeded(reports: &[SyncReport]) -> bool {
    reports.iter().all(SyncReport::is_success)
}

pub struct Synchronizer<'r> {
    registries: &'r Registries,
}

impl<'r> Synchronizer<'r> {
    pub fn new(registries: &'r Registries) -> Self {
        Self { registries }
    }

    /// Synchronize every bundle in order, collecting one report each.
    ///
    /// A definition that could not be built is reported as failed without
    /// stopping the ones after it.
    pub fn sync_all(
        &self,
        bundles: Vec<Result<AssetBundle, CoreError>>,
        options: SyncOptions,
        progress: &mut dyn Progress,
    ) -> Vec<SyncReport> {
        bundles
            .into_iter()
            .enumerate()
            .map(|(index, bundle)| {
                let (environment, result) = match bundle {
                    Ok(mut bundle) => {
                        let result = self.sync(&mut bundle, options, progress);
                        (bundle.source.environment().map(str::to_string), result)
                    }
                    Err(err) => (None, Err(SyncError::from(err))),
                };
                if let Err(err) = &result {
                    warn!("asset definition #{index} failed: {err}");
                }
                SyncReport {
                    index,
                    environment,
                    result,
                }
            })
            .collect()
    }

    /// Synchronize one bundle. Environment and revision are written back
    /// into `bundle`.
    pub fn sync(
        &self,
        bundle: &mut AssetBundle,
        options: SyncOptions,
        progress: &mut dyn Progress,
    ) -> Result<SyncOutcome, SyncError> {
        let explicit = bundle.source.revision();
        let mut retried = false;
        loop {
            match self.attempt(bundle, options.strategy, progress) {
                Err(err)
                    if options.failsafe
                        && !retried
                        && err.is_fetch_failure()
                        && bundle.source.environment() != Some(FALLBACK_ENVIRONMENT) =>
                {
                    warn!("{err}; retrying with environment '{FALLBACK_ENVIRONMENT}'");
                    bundle.source.set_environment(FALLBACK_ENVIRONMENT);
                    bundle.source.definition_mut().remove(KEY_REVISION);
                    if let Some(revision) = &explicit {
                        bundle.source.set_revision(revision);
                    }
                    if let Some(vcs) = &mut bundle.vcs {
                        vcs.set_environment(FALLBACK_ENVIRONMENT);
                    }
                    retried = true;
                }
                result => return result,
            }
        }
    }

    fn attempt(
        &self,
        bundle: &mut AssetBundle,
        strategy: Strategy,
        progress: &mut dyn Progress,
    ) -> Result<SyncOutcome, SyncError> {
        let provider = self.registries.providers.get(bundle.source.kind())?;
        let processor = self.registries.processors.get(bundle.target.kind())?;

        if let Some(revision) = self.registries.source_revision(bundle, provider) {
            bundle.source.set_revision(&revision);
        }

        if strategy.skips_current() {
            if let Some(outcome) = up_to_date(bundle) {
                return Ok(outcome);
            }
        }

        let asset = provider.fetch_asset(&bundle.source, progress)?;
        match processor.process_asset(asset, &bundle.target, progress)? {
            Asset::Placed(placed) => {
                info!("placed {}", placed.path.display());
                Ok(SyncOutcome::Placed {
                    path: placed.path,
                    revision: placed.revision,
                })
            }
            Asset::Fetched(fetched) => Err(SyncError::UnsupportedAsset {
                role: "processor",
                name: processor.name(),
                reason: format!("{} was not placed", fetched.path().display()),
            }),
        }
    }
}

/// `UpToDate` when the target exists and holds the known source revision.
fn up_to_date(bundle: &AssetBundle) -> Option<SyncOutcome> {
    let wanted = bundle.source.revision()?;
    let current = ExistingProcessor.current(&bundle.target).ok()?;
    if current.revision.as_ref() == Some(&wanted) {
        debug!("{} already at {}", current.path.display(), wanted.short());
        Some(SyncOutcome::UpToDate {
            revision: current.revision,
        })
    } else {
        None
    }
}
