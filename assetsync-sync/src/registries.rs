//! The three type-name registries a pipeline run resolves against.

use std::path::PathBuf;

use tracing::warn;

use assetsync_core::{AssetBundle, Revision};
use assetsync_vcs::VcsRegistry;

use crate::processor::ProcessorRegistry;
use crate::provider::{Provider, ProviderRegistry};

pub struct Registries {
    pub providers: ProviderRegistry,
    pub processors: ProcessorRegistry,
    pub vcs: VcsRegistry,
}

impl Registries {
    /// Built-in providers, processors and VCS hosts sharing one HTTP agent.
    /// Local commands run from `working_dir`.
    pub fn with_defaults(working_dir: PathBuf) -> Self {
        let agent = assetsync_vcs::http::agent();
        Self {
            providers: ProviderRegistry::with_defaults(agent.clone(), working_dir),
            processors: ProcessorRegistry::with_defaults(),
            vcs: VcsRegistry::with_defaults(agent),
        }
    }

    /// Revision the source currently resolves to: the VCS host's latest
    /// deployment, else the provider's answer, else an explicit `revision`.
    /// Lookup failures are logged and read as unknown.
    pub fn source_revision(&self, bundle: &AssetBundle, provider: &dyn Provider) -> Option<Revision> {
        if let Some(vcs) = &bundle.vcs {
            match self.vcs.for_vcs(vcs) {
                Ok(host) => {
                    if let Some(revision) = host.latest_revision(None) {
                        return Some(revision);
                    }
                }
                Err(err) => warn!("skipping vcs revision lookup: {err}"),
            }
        }
        match provider.fetch_revision(&bundle.source) {
            Ok(Some(revision)) => Some(revision),
            Ok(None) => bundle.source.revision(),
            Err(err) => {
                warn!("skipping provider revision lookup: {err}");
                bundle.source.revision()
            }
        }
    }
}
