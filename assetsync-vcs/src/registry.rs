//! `type` name → VCS provider template.

use std::collections::BTreeMap;

use assetsync_core::Vcs;

use crate::error::VcsError;
use crate::github::GithubVcsProvider;
use crate::gitlab::GitlabVcsProvider;
use crate::provider::VcsProvider;

pub struct VcsRegistry {
    templates: BTreeMap<&'static str, Box<dyn VcsProvider>>,
}

impl VcsRegistry {
    /// Registry without any provider.
    pub fn empty() -> Self {
        Self {
            templates: BTreeMap::new(),
        }
    }

    /// Registry with the built-in `gitlab` and `github` providers.
    pub fn with_defaults(agent: ureq::Agent) -> Self {
        let mut registry = Self::empty();
        registry.templates.insert("gitlab", Box::new(GitlabVcsProvider::new(agent.clone())));
        registry.templates.insert("github", Box::new(GithubVcsProvider::new(agent)));
        registry
    }

    /// Register `template` under its own name; names are unique.
    pub fn register(&mut self, template: Box<dyn VcsProvider>) -> Result<(), VcsError> {
        let name = template.name();
        if self.templates.contains_key(name) {
            return Err(VcsError::DuplicateProvider(name.to_string()));
        }
        self.templates.insert(name, template);
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.templates.keys().copied()
    }

    /// Provider bound to `vcs`.
    pub fn for_vcs(&self, vcs: &Vcs) -> Result<Box<dyn VcsProvider>, VcsError> {
        let kind = vcs.kind()?;
        let template = self
            .templates
            .get(kind)
            .ok_or_else(|| VcsError::UnsupportedType(kind.to_string()))?;
        template.with_vcs(vcs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vcs(value: serde_json::Value) -> Vcs {
        Vcs::new(value.as_object().cloned().unwrap())
    }

    #[test]
    fn defaults_are_registered() {
        let registry = VcsRegistry::with_defaults(crate::http::agent());
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["github", "gitlab"]);
    }

    #[test]
    fn unknown_type_is_unsupported() {
        let registry = VcsRegistry::with_defaults(crate::http::agent());
        let err = registry.for_vcs(&vcs(json!({"type": "bitbucket"}))).err().unwrap();
        assert!(matches!(err, VcsError::UnsupportedType(name) if name == "bitbucket"));
    }

    #[test]
    fn missing_type_is_missing_configuration() {
        let registry = VcsRegistry::with_defaults(crate::http::agent());
        let err = registry.for_vcs(&vcs(json!({}))).err().unwrap();
        assert!(matches!(err, VcsError::Core(_)));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = VcsRegistry::with_defaults(crate::http::agent());
        let err = registry
            .register(Box::new(GitlabVcsProvider::new(crate::http::agent())))
            .unwrap_err();
        assert!(matches!(err, VcsError::DuplicateProvider(_)));
    }

    #[test]
    fn binding_does_not_touch_the_template() {
        let registry = VcsRegistry::with_defaults(crate::http::agent());
        let bound = registry
            .for_vcs(&vcs(json!({"type": "gitlab", "project-id": 12, "environment": "latest"})))
            .unwrap();
        assert_eq!(bound.source_url(), "https://gitlab.com/api/v4/projects/12");
        let again = registry
            .for_vcs(&vcs(json!({"type": "gitlab", "project-id": 13})))
            .unwrap();
        assert_eq!(again.source_url(), "https://gitlab.com/api/v4/projects/13");
    }

    #[test]
    fn gitlab_source_url_points_at_the_project_api() {
        let registry = VcsRegistry::with_defaults(crate::http::agent());
        let bound = registry
            .for_vcs(&vcs(json!({"type": "gitlab", "project-id": "group/web", "base-url": "https://git.example.com/"})))
            .unwrap();
        assert_eq!(bound.source_url(), "https://git.example.com/api/v4/projects/group%2Fweb");
    }
}
