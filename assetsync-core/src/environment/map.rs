//! Ordered environment map.
//!
//! Pairs are kept sorted by their index; [`EnvironmentMap::resolve`] returns the
//! transform of the lowest-index pair whose pattern matches the branch.
//! Registration order is the only tie-break, so specific patterns must come
//! before general ones (`renovate/*` before `*`).

use serde_json::{Map, Value};

use crate::environment::pair::Pair;
use crate::environment::transformer::{Transformer, DEFAULT_SLUG_PATTERN};
use crate::error::CoreError;

/// Environment the default map assigns to integration branches.
pub const LATEST_ENVIRONMENT: &str = "latest";

/// Environment the default map assigns to `main`/`master` without a locked version.
pub const STABLE_ENVIRONMENT: &str = "stable";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentMap {
    pairs: Vec<(usize, Pair)>,
}

impl EnvironmentMap {
    /// Build a map indexing `pairs` in iteration order. Duplicate patterns are
    /// kept as-is; the first one wins during resolution.
    pub fn new(pairs: impl IntoIterator<Item = Pair>) -> Self {
        Self {
            pairs: pairs.into_iter().enumerate().collect(),
        }
    }

    /// Build a map from pairs, letting a later pair replace an earlier pair
    /// with the same pattern at the earlier pair's index.
    pub fn from_pairs(pairs: impl IntoIterator<Item = Pair>) -> Self {
        let mut map = Self::default();
        for pair in pairs {
            match map.position(pair.input_pattern()) {
                Some(pos) => map.pairs[pos].1 = pair,
                None => {
                    map.push(pair);
                }
            }
        }
        map
    }

    /// Built-in map. With `version`, `main`/`master` resolve to that exact
    /// version instead of `stable`.
    pub fn default_map(version: Option<&str>) -> Result<Self, CoreError> {
        let stable = match version {
            Some(version) => Transformer::version(version)?,
            None => Transformer::static_value(STABLE_ENVIRONMENT)?,
        };
        let latest = Transformer::static_value(LATEST_ENVIRONMENT)?;
        let slug = Transformer::slug(DEFAULT_SLUG_PATTERN)?;

        Ok(Self::new([
            Pair::new("main", stable.clone())?,
            Pair::new("master", stable)?,
            Pair::new("develop", latest.clone())?,
            Pair::new("release/*", latest.clone())?,
            Pair::new("renovate/*", latest)?,
            Pair::new("feature/*", slug.clone())?,
            Pair::new("*", slug)?,
        ]))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Indexed pairs in ascending index order.
    pub fn pairs(&self) -> &[(usize, Pair)] {
        &self.pairs
    }

    /// Index and pair registered for `pattern`, if any.
    pub fn find(&self, pattern: &str) -> Option<(usize, &Pair)> {
        self.pairs
            .iter()
            .find(|(_, pair)| pair.input_pattern() == pattern)
            .map(|(index, pair)| (*index, pair))
    }

    /// Place `pair` at `index`, replacing whatever was there.
    pub fn insert(&mut self, index: usize, pair: Pair) {
        match self.pairs.iter().position(|(i, _)| *i == index) {
            Some(pos) => self.pairs[pos].1 = pair,
            None => self.pairs.push((index, pair)),
        }
        self.sort();
    }

    /// Append `pair` after the highest index; returns its index.
    pub fn push(&mut self, pair: Pair) -> usize {
        let index = self.next_index();
        self.pairs.push((index, pair));
        self.sort();
        index
    }

    pub fn resolve(&self, branch: &str) -> Result<String, CoreError> {
        self.pairs
            .iter()
            .find_map(|(_, pair)| pair.transform(branch))
            .ok_or_else(|| CoreError::NoMatch {
                branch: branch.to_string(),
            })
    }

    /// New map where every pattern of `other` already present here takes over
    /// the transformer at the existing index, and novel patterns are appended.
    pub fn merge(&self, other: &EnvironmentMap) -> EnvironmentMap {
        let mut merged = self.clone();
        for (_, pair) in &other.pairs {
            match merged.position(pair.input_pattern()) {
                Some(pos) => {
                    let replaced = merged.pairs[pos].1.with_transformer(pair.transformer().clone());
                    merged.pairs[pos].1 = replaced;
                }
                None => {
                    merged.push(pair.clone());
                }
            }
        }
        merged
    }

    /// `{pattern → {transformer, options}}` in index order.
    pub fn to_array(&self) -> Map<String, Value> {
        let mut out = Map::new();
        for (_, pair) in &self.pairs {
            let transformer = pair.transformer();
            let mut entry = Map::new();
            entry.insert("transformer".into(), Value::String(transformer.name().into()));
            entry.insert("options".into(), Value::Object(transformer.to_options()));
            out.insert(pair.input_pattern().to_string(), Value::Object(entry));
        }
        out
    }

    pub fn from_array(array: &Map<String, Value>) -> Result<Self, CoreError> {
        let mut pairs = Vec::with_capacity(array.len());
        for (pattern, entry) in array {
            let invalid = |message: &str| CoreError::InvalidMapEntry {
                pattern: pattern.clone(),
                message: message.to_string(),
            };
            let entry = entry.as_object().ok_or_else(|| invalid("expected an object"))?;
            let name = entry
                .get("transformer")
                .and_then(Value::as_str)
                .ok_or_else(|| invalid("missing 'transformer'"))?;
            let options = match entry.get("options") {
                None | Some(Value::Null) => Map::new(),
                Some(Value::Object(options)) => options.clone(),
                Some(_) => return Err(invalid("'options' must be an object")),
            };
            let transformer = Transformer::from_options(name, &options)?;
            pairs.push(Pair::new(pattern.as_str(), transformer)?);
        }
        Ok(Self::from_pairs(pairs))
    }

    fn position(&self, pattern: &str) -> Option<usize> {
        self.pairs
            .iter()
            .position(|(_, pair)| pair.input_pattern() == pattern)
    }

    fn next_index(&self) -> usize {
        self.pairs
            .iter()
            .map(|(index, _)| index + 1)
            .max()
            .unwrap_or(0)
    }

    fn sort(&mut self) {
        self.pairs.sort_by_key(|(index, _)| *index);
    }
}
