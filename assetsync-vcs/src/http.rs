//! Shared blocking HTTP agent.

use std::time::Duration;

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!("assetsync/", env!("CARGO_PKG_VERSION"));

const TIMEOUT: Duration = Duration::from_secs(30);

/// Agent with the default timeout and user agent.
pub fn agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
}
