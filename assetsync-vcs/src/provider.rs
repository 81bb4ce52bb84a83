//! The capability every VCS backend implements.

use assetsync_core::{Revision, Vcs};

use crate::deployment::Deployment;
use crate::error::VcsError;

/// Revision and deployment queries against a version-control host.
///
/// Registered instances are templates: [`VcsProvider::with_vcs`] returns an
/// independently configured clone, the template itself is never mutated.
/// Nothing is cached; every call is a fresh round trip.
pub trait VcsProvider: Send + Sync {
    /// Registry name (`gitlab`, `github`).
    fn name(&self) -> &'static str;

    /// Human-facing URL of the bound project.
    fn source_url(&self) -> String;

    /// Revision of the most recent successful deployment to `environment`
    /// (or the bound environment). `None` when the query fails or nothing
    /// qualifies.
    fn latest_revision(&self, environment: Option<&str>) -> Option<Revision>;

    /// Whether the host knows `revision`.
    fn has_revision(&self, revision: &Revision) -> Result<bool, VcsError>;

    /// Deployments to the bound environment that have not finished yet.
    fn active_deployments(&self) -> Result<Vec<Deployment>, VcsError>;

    /// Clone bound to the credentials and environment of `vcs`.
    fn with_vcs(&self, vcs: &Vcs) -> Result<Box<dyn VcsProvider>, VcsError>;
}
