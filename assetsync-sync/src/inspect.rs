//! Read-only inspection: where an asset comes from, which revision each side
//! holds, and whether deployments are still in flight.

use std::fmt;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use assetsync_core::{AssetBundle, Revision};
use assetsync_vcs::{Deployment, VcsProvider};

use crate::error::SyncError;
use crate::registries::Registries;

/// Source revision compared with target revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiffStatus {
    UpToDate,
    NeedsUpdate,
    /// Either side's revision is unknown.
    Unknown,
}

impl DiffStatus {
    pub fn between(source: Option<&Revision>, target: Option<&Revision>) -> Self {
        match (source, target) {
            (Some(source), Some(target)) if source == target => DiffStatus::UpToDate,
            (Some(_), Some(_)) => DiffStatus::NeedsUpdate,
            _ => DiffStatus::Unknown,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            DiffStatus::UpToDate => "✓",
            DiffStatus::NeedsUpdate => "✗",
            DiffStatus::Unknown => "?",
        }
    }
}

impl fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inspection {
    pub environment: Option<String>,
    pub source_url: String,
    pub source_revision: Option<Revision>,
    pub target_path: PathBuf,
    pub target_revision: Option<Revision>,
    pub vcs_url: Option<String>,
    pub status: DiffStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// No deployment is in flight.
    Cleared,
    /// The deadline passed with these deployments still active.
    TimedOut { active: Vec<Deployment> },
}

/// Poll `vcs` every `interval` until no deployment is active. Without a
/// `deadline` this waits indefinitely.
pub fn wait_for_deployments(
    vcs: &dyn VcsProvider,
    interval: Duration,
    deadline: Option<Instant>,
    mut on_poll: impl FnMut(&[Deployment]),
) -> Result<WaitOutcome, SyncError> {
    loop {
        let active = vcs.active_deployments()?;
        if active.is_empty() {
            return Ok(WaitOutcome::Cleared);
        }
        on_poll(&active);
        let pause = match deadline {
            None => interval,
            Some(deadline) => {
                let left = deadline.saturating_duration_since(Instant::now());
                if left.is_zero() {
                    return Ok(WaitOutcome::TimedOut { active });
                }
                interval.min(left)
            }
        };
        debug!("{} deployment(s) active, next poll in {pause:?}", active.len());
        thread::sleep(pause);
    }
}

pub struct Inspector<'r> {
    registries: &'r Registries,
}

impl<'r> Inspector<'r> {
    pub fn new(registries: &'r Registries) -> Self {
        Self { registries }
    }

    pub fn inspect(&self, bundle: &AssetBundle) -> Result<Inspection, SyncError> {
        let provider = self.registries.providers.get(bundle.source.kind())?;
        let processor = self.registries.processors.get(bundle.target.kind())?;

        let source_revision = self.registries.source_revision(bundle, provider);
        let target_revision = processor.target_revision(&bundle.target);
        let vcs_url = bundle.vcs.as_ref().and_then(|vcs| match self.registries.vcs.for_vcs(vcs) {
            Ok(host) => Some(host.source_url()),
            Err(err) => {
                warn!("vcs unavailable: {err}");
                None
            }
        });

        Ok(Inspection {
            environment: bundle.source.environment().map(str::to_string),
            source_url: provider.asset_url(&bundle.source)?,
            status: DiffStatus::between(source_revision.as_ref(), target_revision.as_ref()),
            source_revision,
            target_path: processor.asset_path(&bundle.target)?,
            target_revision,
            vcs_url,
        })
    }

    /// Wait until the bundle's VCS host reports no active deployment.
    /// Bundles without a VCS section are cleared immediately.
    pub fn wait_for_deployments(
        &self,
        bundle: &AssetBundle,
        interval: Duration,
        timeout: Option<Duration>,
        on_poll: impl FnMut(&[Deployment]),
    ) -> Result<WaitOutcome, SyncError> {
        let Some(vcs) = &bundle.vcs else {
            return Ok(WaitOutcome::Cleared);
        };
        let host = self.registries.vcs.for_vcs(vcs)?;
        info!("waiting for deployments on {}", host.source_url());
        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        wait_for_deployments(host.as_ref(), interval, deadline, on_poll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assetsync_core::Vcs;
    use assetsync_vcs::VcsError;

    fn rev(value: &str) -> Revision {
        Revision::new(value).unwrap()
    }

    #[test]
    fn diff_status_symbols() {
        let a = rev("aaaaaaaa");
        let b = rev("bbbbbbbb");
        assert_eq!(DiffStatus::between(Some(&a), Some(&a)).symbol(), "✓");
        assert_eq!(DiffStatus::between(Some(&a), Some(&b)).symbol(), "✗");
        assert_eq!(DiffStatus::between(None, Some(&b)).symbol(), "?");
        assert_eq!(DiffStatus::between(Some(&a), None).to_string(), "?");
    }

    /// Reports one active deployment for the first `busy_polls` polls.
    struct Busy {
        busy_polls: usize,
        polls: AtomicUsize,
    }

    impl VcsProvider for Busy {
        fn name(&self) -> &'static str {
            "busy"
        }
        fn source_url(&self) -> String {
            "https://vcs.example/busy".into()
        }
        fn latest_revision(&self, _environment: Option<&str>) -> Option<Revision> {
            None
        }
        fn has_revision(&self, _revision: &Revision) -> Result<bool, VcsError> {
            Ok(false)
        }
        fn active_deployments(&self) -> Result<Vec<Deployment>, VcsError> {
            let polls = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
            if polls <= self.busy_polls {
                Ok(vec![Deployment {
                    uri: "https://vcs.example/jobs/1".into(),
                    revision: rev("cafebabe"),
                }])
            } else {
                Ok(Vec::new())
            }
        }
        fn with_vcs(&self, _vcs: &Vcs) -> Result<Box<dyn VcsProvider>, VcsError> {
            unimplemented!()
        }
    }

    #[test]
    fn waits_until_cleared() {
        let vcs = Busy {
            busy_polls: 2,
            polls: AtomicUsize::new(0),
        };
        let mut seen = 0;
        let outcome =
            wait_for_deployments(&vcs, Duration::from_millis(1), None, |_| seen += 1).unwrap();
        assert_eq!(outcome, WaitOutcome::Cleared);
        assert_eq!(seen, 2);
        assert_eq!(vcs.polls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn deadline_stops_waiting() {
        let vcs = Busy {
            busy_polls: usize::MAX,
            polls: AtomicUsize::new(0),
        };
        let deadline = Instant::now() + Duration::from_millis(30);
        let outcome =
            wait_for_deployments(&vcs, Duration::from_millis(5), Some(deadline), |_| {}).unwrap();
        match outcome {
            WaitOutcome::TimedOut { active } => assert_eq!(active.len(), 1),
            other => panic!("unexpected {other:?}"),
        }
        assert!(Instant::now() >= deadline);
    }
}
