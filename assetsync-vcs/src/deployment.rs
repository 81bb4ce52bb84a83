use std::fmt;

use serde::Serialize;

use assetsync_core::Revision;

/// One in-flight or queued deployment reported by a VCS host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deployment {
    pub uri: String,
    pub revision: Revision,
}

impl fmt::Display for Deployment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.revision.short(), self.uri)
    }
}
