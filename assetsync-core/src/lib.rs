//! assetsync core library: environment resolution, asset definitions,
//! configuration.
//!
//! - [`environment`]: transformers, pairs and the ordered [`EnvironmentMap`]
//! - [`definition`]: typed [`Source`] / [`Target`] / [`Vcs`] views
//! - [`factory`]: builds definitions for a branch
//! - [`config`]: `assets.json` model and loader
//! - [`revision`]: validated [`Revision`] identifiers
//! - [`branch`]: current branch detection

pub mod branch;
pub mod config;
pub mod definition;
pub mod environment;
pub mod error;
pub mod factory;
pub mod interpolate;
pub mod revision;

pub use config::{AssetConfig, Config, EnvironmentsConfig};
pub use definition::{Definition, Source, Target, Vcs};
pub use environment::{EnvironmentMap, Pair, Transformer};
pub use error::CoreError;
pub use factory::AssetBundle;
pub use revision::Revision;
