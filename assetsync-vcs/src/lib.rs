//! # assetsync-vcs
//!
//! Version-control host queries: latest successful deployment revision,
//! revision existence and in-flight deployments.
//!
//! Look up a bound provider with [`VcsRegistry::for_vcs`].

pub mod deployment;
pub mod error;
pub mod github;
pub mod gitlab;
pub mod http;
pub mod provider;
pub mod registry;

pub use deployment::Deployment;
pub use error::VcsError;
pub use provider::VcsProvider;
pub use registry::VcsRegistry;
