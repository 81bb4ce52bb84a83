//! Branch → environment resolution: transformers, pairs and the ordered map.

pub mod map;
pub mod pair;
pub mod transformer;

pub use map::{EnvironmentMap, LATEST_ENVIRONMENT, STABLE_ENVIRONMENT};
pub use pair::Pair;
pub use transformer::{Transformer, DEFAULT_SLUG_PATTERN, SLUG_PLACEHOLDER};
