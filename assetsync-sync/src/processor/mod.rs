//! Processors place a fetched asset at its [`Target`].

pub mod archive;
pub mod existing;

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::debug;

use assetsync_core::{Revision, Target};

use crate::asset::Asset;
use crate::error::SyncError;
use crate::progress::Progress;

pub use archive::ArchiveProcessor;
pub use existing::ExistingProcessor;

pub trait Processor {
    /// Name the processor is registered under (`target.type`).
    fn name(&self) -> &'static str;

    fn process_asset(
        &self,
        asset: Asset,
        target: &Target,
        progress: &mut dyn Progress,
    ) -> Result<Asset, SyncError>;

    fn asset_path(&self, target: &Target) -> Result<PathBuf, SyncError> {
        Ok(target.path()?)
    }

    fn target_revision(&self, target: &Target) -> Option<Revision> {
        target_revision(target)
    }
}

/// Explicit `target.revision`, else the first line of the revision file.
pub fn target_revision(target: &Target) -> Option<Revision> {
    if let Some(revision) = target.revision() {
        return Some(revision);
    }
    let path = target.revision_file_path().ok()?;
    match Revision::from_file(&path) {
        Ok(revision) => Some(revision),
        Err(err) => {
            debug!("no target revision: {err}");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

pub struct ProcessorRegistry {
    processors: BTreeMap<String, Box<dyn Processor>>,
}

impl ProcessorRegistry {
    pub fn empty() -> Self {
        Self {
            processors: BTreeMap::new(),
        }
    }

    /// `archive` and `existing`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry
            .processors
            .insert(ArchiveProcessor::NAME.to_string(), Box::new(ArchiveProcessor));
        registry
            .processors
            .insert(ExistingProcessor::NAME.to_string(), Box::new(ExistingProcessor));
        registry
    }

    /// Register `processor` under `name`, which must be its own name and unused.
    pub fn register(&mut self, name: &str, processor: Box<dyn Processor>) -> Result<(), SyncError> {
        let reason = if processor.name() != name {
            format!("implementation answers to '{}'", processor.name())
        } else if self.processors.contains_key(name) {
            "already registered".to_string()
        } else {
            self.processors.insert(name.to_string(), processor);
            return Ok(());
        };
        Err(SyncError::UnsupportedClass {
            role: "processor",
            name: name.to_string(),
            reason,
        })
    }

    pub fn get(&self, name: &str) -> Result<&dyn Processor, SyncError> {
        self.processors
            .get(name)
            .map(|p| p.as_ref())
            .ok_or_else(|| SyncError::UnsupportedType {
                role: "processor",
                name: name.to_string(),
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.processors.keys().map(String::as_str)
    }
}
