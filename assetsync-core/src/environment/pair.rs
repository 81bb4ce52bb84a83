//! A single `pattern → transformer` binding.
//!
//! Patterns delimited by slashes (`/^feature\/(.+)$/`, optionally followed by
//! `i`, `m`, `s` or `x` flags) are regular expressions; everything else is a
//! shell-style glob where `*` also matches `/`.

use glob::{MatchOptions, Pattern};
use regex::Regex;

use crate::environment::transformer::Transformer;
use crate::error::CoreError;

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
enum Matcher {
    Regex(Regex),
    Glob { pattern: Pattern, prefix_len: usize },
}

/// Immutable binding of one branch pattern to one [`Transformer`].
#[derive(Debug, Clone)]
pub struct Pair {
    input_pattern: String,
    matcher: Matcher,
    transformer: Transformer,
}

impl Pair {
    pub fn new(input_pattern: impl Into<String>, transformer: Transformer) -> Result<Self, CoreError> {
        let input_pattern = input_pattern.into();
        let matcher = compile(&input_pattern)?;
        Ok(Self {
            input_pattern,
            matcher,
            transformer,
        })
    }

    pub fn input_pattern(&self) -> &str {
        &self.input_pattern
    }

    pub fn transformer(&self) -> &Transformer {
        &self.transformer
    }

    /// Same pattern bound to another transformer.
    pub fn with_transformer(&self, transformer: Transformer) -> Self {
        Self {
            input_pattern: self.input_pattern.clone(),
            matcher: self.matcher.clone(),
            transformer,
        }
    }

    pub fn matches(&self, branch: &str) -> bool {
        match &self.matcher {
            Matcher::Regex(regex) => regex.is_match(branch),
            Matcher::Glob { pattern, .. } => pattern.matches_with(branch, GLOB_OPTIONS),
        }
    }

    /// Transformed environment for `branch`, or `None` when the pattern does
    /// not match.
    pub fn transform(&self, branch: &str) -> Option<String> {
        if !self.matches(branch) {
            return None;
        }
        Some(self.transformer.transform(self.subject(branch)))
    }

    /// Part of the branch handed to the transformer: the text after a glob's
    /// literal prefix, the first capture group of a regex, or the whole branch.
    fn subject<'a>(&self, branch: &'a str) -> &'a str {
        match &self.matcher {
            Matcher::Regex(regex) => regex
                .captures(branch)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
                .unwrap_or(branch),
            Matcher::Glob { prefix_len, .. } => {
                if *prefix_len == self.input_pattern.len() {
                    branch
                } else {
                    branch.get(*prefix_len..).unwrap_or(branch)
                }
            }
        }
    }
}

impl PartialEq for Pair {
    fn eq(&self, other: &Self) -> bool {
        self.input_pattern == other.input_pattern && self.transformer == other.transformer
    }
}

impl Eq for Pair {}

fn compile(input_pattern: &str) -> Result<Matcher, CoreError> {
    if let Some((body, flags)) = split_regex(input_pattern) {
        let source = if flags.is_empty() {
            body.to_string()
        } else {
            format!("(?{flags}){body}")
        };
        let regex = Regex::new(&source).map_err(|source| CoreError::InvalidPattern {
            pattern: input_pattern.to_string(),
            source,
        })?;
        return Ok(Matcher::Regex(regex));
    }

    let pattern = Pattern::new(input_pattern).map_err(|e| CoreError::InvalidGlob {
        pattern: input_pattern.to_string(),
        message: e.msg.to_string(),
    })?;
    let prefix_len = input_pattern
        .find(['*', '?', '['])
        .unwrap_or(input_pattern.len());
    Ok(Matcher::Glob {
        pattern,
        prefix_len,
    })
}

/// `/body/flags` → `(body, flags)`.
fn split_regex(input_pattern: &str) -> Option<(&str, &str)> {
    let rest = input_pattern.strip_prefix('/')?;
    let end = rest.rfind('/')?;
    let (body, flags) = (&rest[..end], &rest[end + 1..]);
    if body.is_empty() || !flags.chars().all(|c| matches!(c, 'i' | 'm' | 's' | 'x')) {
        return None;
    }
    Some((body, flags))
}
