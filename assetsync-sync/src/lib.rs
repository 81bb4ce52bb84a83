//! # assetsync-sync
//!
//! Fetches frontend assets and places them in their target directories.
//!
//! - [`provider`]: obtain an asset (`http`, `local`)
//! - [`processor`]: place it (`archive`, `existing`)
//! - [`pipeline`]: the [`Synchronizer`], with idempotency and failsafe retry
//! - [`inspect`]: read-only revision comparison and deployment polling

pub mod asset;
pub mod error;
pub mod inspect;
pub mod pipeline;
pub mod processor;
pub mod progress;
pub mod provider;
pub mod registries;

pub use asset::{Asset, FetchedAsset, PlacedAsset};
pub use error::{DownloadFailure, SyncError};
pub use inspect::{DiffStatus, Inspection, Inspector, WaitOutcome};
pub use pipeline::{Strategy, SyncOptions, SyncOutcome, SyncReport, Synchronizer};
pub use progress::{LogProgress, NoProgress, Progress};
pub use registries::Registries;
