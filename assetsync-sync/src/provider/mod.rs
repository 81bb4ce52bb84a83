//! Providers obtain the asset a [`Source`] describes.

pub mod http;
pub mod local;

use std::collections::BTreeMap;
use std::path::PathBuf;

use assetsync_core::{Revision, Source};

use crate::asset::Asset;
use crate::error::SyncError;
use crate::progress::Progress;

pub use http::HttpProvider;
pub use local::LocalPathProvider;

pub trait Provider {
    /// Name the provider is registered under (`source.type`).
    fn name(&self) -> &'static str;

    /// The concrete location `source` resolves to.
    fn asset_url(&self, source: &Source) -> Result<String, SyncError>;

    /// Fetch the asset into a file the processor can read.
    fn fetch_asset(&self, source: &Source, progress: &mut dyn Progress) -> Result<Asset, SyncError>;

    /// The revision `source` currently resolves to, if discoverable.
    fn fetch_revision(&self, source: &Source) -> Result<Option<Revision>, SyncError> {
        Ok(source.revision())
    }
}

/// Suffix of the last URL or path segment that identifies an archive format,
/// so temporary files keep it.
pub(crate) fn archive_suffix(location: &str) -> &'static str {
    let name = location
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    [".tar.gz", ".tgz", ".tar", ".zip"]
        .into_iter()
        .find(|suffix| name.ends_with(suffix))
        .unwrap_or("")
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

pub struct ProviderRegistry {
    providers: BTreeMap<String, Box<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn empty() -> Self {
        Self {
            providers: BTreeMap::new(),
        }
    }

    /// `http` and `local`, with local commands run from `working_dir`.
    pub fn with_defaults(agent: ureq::Agent, working_dir: PathBuf) -> Self {
        let mut registry = Self::empty();
        registry
            .providers
            .insert(HttpProvider::NAME.to_string(), Box::new(HttpProvider::new(agent)));
        registry.providers.insert(
            LocalPathProvider::NAME.to_string(),
            Box::new(LocalPathProvider::new(working_dir)),
        );
        registry
    }

    /// Register `provider` under `name`, which must be its own name and unused.
    pub fn register(&mut self, name: &str, provider: Box<dyn Provider>) -> Result<(), SyncError> {
        if provider.name() != name {
            return Err(SyncError::UnsupportedClass {
                role: "provider",
                name: name.to_string(),
                reason: format!("implementation answers to '{}'", provider.name()),
            });
        }
        if self.providers.contains_key(name) {
            return Err(SyncError::UnsupportedClass {
                role: "provider",
                name: name.to_string(),
                reason: "already registered".into(),
            });
        }
        self.providers.insert(name.to_string(), provider);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&dyn Provider, SyncError> {
        self.providers
            .get(name)
            .map(|p| p.as_ref())
            .ok_or_else(|| SyncError::UnsupportedType {
                role: "provider",
                name: name.to_string(),
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://cdn.example/app-1.2.tar.gz", ".tar.gz")]
    #[case("https://cdn.example/app.TGZ?token=x", ".tgz")]
    #[case("dist/app.zip", ".zip")]
    #[case("build.tar#frag", ".tar")]
    #[case("https://cdn.example/latest", "")]
    fn archive_suffix_follows_last_segment(#[case] location: &str, #[case] expected: &str) {
        assert_eq!(archive_suffix(location), expected);
    }

    #[test]
    fn defaults_are_registered() {
        let registry = ProviderRegistry::with_defaults(ureq::agent(), PathBuf::from("."));
        assert_eq!(registry.names().collect::<Vec<_>>(), ["http", "local"]);
    }

    #[test]
    fn unknown_type_is_unsupported() {
        let registry = ProviderRegistry::empty();
        let err = registry.get("ftp").err().unwrap();
        assert!(matches!(err, SyncError::UnsupportedType { role: "provider", .. }));
    }

    #[test]
    fn mismatched_name_is_an_invalid_implementation() {
        let mut registry = ProviderRegistry::empty();
        let err = registry
            .register("cdn", Box::new(HttpProvider::new(ureq::agent())))
            .unwrap_err();
        assert!(matches!(err, SyncError::UnsupportedClass { .. }));
        assert!(registry.get("cdn").is_err());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = ProviderRegistry::with_defaults(ureq::agent(), PathBuf::from("."));
        let err = registry
            .register("http", Box::new(HttpProvider::new(ureq::agent())))
            .unwrap_err();
        assert!(err.to_string().contains("already registered"));
    }
}
