//! Builds source / target / vcs definitions from configuration plus a branch.
//!
//! Environment map derivation:
//! - empty `environments.map` → built-in map, seeded with the source's locked version;
//! - otherwise the configured map, merged onto the built-in map when
//!   `environments.merge` is set (configured entries replace built-in ones at
//!   their original index, novel ones are appended).

use crate::config::AssetConfig;
use crate::definition::{Source, Target, Vcs};
use crate::environment::EnvironmentMap;
use crate::error::CoreError;

/// Everything one pipeline run needs for a single asset definition.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetBundle {
    pub source: Source,
    pub target: Target,
    pub vcs: Option<Vcs>,
}

/// Environment map for `config`.
pub fn environment_map(config: &AssetConfig) -> Result<EnvironmentMap, CoreError> {
    let version = Source::new(config.source.clone()).version();
    let defaults = EnvironmentMap::default_map(version.as_deref())?;
    if config.environments.map.is_empty() {
        return Ok(defaults);
    }
    let custom = EnvironmentMap::from_array(&config.environments.map)?;
    if config.environments.merge {
        Ok(defaults.merge(&custom))
    } else {
        Ok(custom)
    }
}

/// Environment `branch` resolves to under `config`.
pub fn resolve_environment(config: &AssetConfig, branch: &str) -> Result<String, CoreError> {
    environment_map(config)?.resolve(branch)
}

/// Source definition with the resolved environment injected.
pub fn build_source(config: &AssetConfig, branch: &str) -> Result<Source, CoreError> {
    let environment = resolve_environment(config, branch)?;
    let mut source = Source::new(config.source.clone());
    source.set_environment(&environment);
    tracing::debug!("branch '{branch}' resolves to environment '{environment}'");
    Ok(source)
}

pub fn build_target(config: &AssetConfig) -> Target {
    Target::new(config.target.clone())
}

/// Vcs definition with the resolved environment, or `None` without a `vcs` section.
pub fn build_vcs(config: &AssetConfig, branch: &str) -> Result<Option<Vcs>, CoreError> {
    let Some(values) = config.vcs.as_ref() else {
        return Ok(None);
    };
    let environment = resolve_environment(config, branch)?;
    let mut vcs = Vcs::new(values.clone());
    vcs.set_environment(&environment);
    Ok(Some(vcs))
}

pub fn build(config: &AssetConfig, branch: &str) -> Result<AssetBundle, CoreError> {
    Ok(AssetBundle {
        source: build_source(config, branch)?,
        target: build_target(config),
        vcs: build_vcs(config, branch)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvironmentsConfig;
    use serde_json::{json, Map, Value};

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn config(source: Value, map: Value, merge: bool) -> AssetConfig {
        AssetConfig {
            source: obj(source),
            target: obj(json!({"path": "/srv/assets"})),
            vcs: None,
            environments: EnvironmentsConfig {
                map: obj(map),
                merge,
            },
        }
    }

    #[test]
    fn default_map_injects_environment() {
        let cfg = config(json!({"url": "u"}), json!({}), false);
        let source = build_source(&cfg, "feature/login").unwrap();
        assert_eq!(source.environment(), Some("fe-login"));
        let source = build_source(&cfg, "main").unwrap();
        assert_eq!(source.environment(), Some("stable"));
    }

    #[test]
    fn locked_version_seeds_default_map() {
        let cfg = config(json!({"url": "u", "version": "4.2.0"}), json!({}), false);
        assert_eq!(resolve_environment(&cfg, "master").unwrap(), "4.2.0");
    }

    #[test]
    fn custom_map_without_merge_replaces_defaults() {
        let cfg = config(
            json!({"url": "u"}),
            json!({"main": {"transformer": "static", "options": {"value": "prod"}}}),
            false,
        );
        assert_eq!(resolve_environment(&cfg, "main").unwrap(), "prod");
        assert!(matches!(
            resolve_environment(&cfg, "develop"),
            Err(CoreError::NoMatch { .. })
        ));
    }

    #[test]
    fn custom_map_with_merge_overrides_in_place() {
        let cfg = config(
            json!({"url": "u"}),
            json!({
                "develop": {"transformer": "static", "options": {"value": "nightly"}},
                "hotfix/*": {"transformer": "static", "options": {"value": "hotfix"}}
            }),
            true,
        );
        let map = environment_map(&cfg).unwrap();
        assert_eq!(map.find("develop").unwrap().0, 2);
        assert_eq!(map.find("hotfix/*").unwrap().0, 7);
        assert_eq!(map.resolve("develop").unwrap(), "nightly");
        assert_eq!(map.resolve("main").unwrap(), "stable");
    }

    #[test]
    fn vcs_is_optional_and_receives_environment() {
        let mut cfg = config(json!({"url": "u"}), json!({}), false);
        assert!(build_vcs(&cfg, "develop").unwrap().is_none());

        cfg.vcs = Some(obj(json!({"type": "gitlab", "project-id": 7})));
        let bundle = build(&cfg, "develop").unwrap();
        assert_eq!(bundle.vcs.unwrap().environment(), Some("latest"));
        assert_eq!(bundle.target.path().unwrap(), std::path::PathBuf::from("/srv/assets"));
    }
}
