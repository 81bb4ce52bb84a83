//! Current-branch detection.
//!
//! Order: CI variables, then the checked-out branch of the enclosing git
//! repository. CI checkouts are usually detached, so the variables come first.

use std::path::Path;

use git2::{ErrorCode, Repository};

use crate::error::CoreError;

/// CI variables carrying the branch name, in lookup order.
pub const CI_BRANCH_VARIABLES: &[&str] = &[
    "CI_COMMIT_REF_NAME",
    "GITHUB_HEAD_REF",
    "GITHUB_REF_NAME",
    "BRANCH_NAME",
];

/// Detect the branch for `dir` using the process environment.
pub fn detect_branch(dir: &Path) -> Result<String, CoreError> {
    detect_branch_with(dir, |key| std::env::var(key).ok())
}

/// Detect the branch for `dir`, reading CI variables through `env`.
pub fn detect_branch_with(
    dir: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<String, CoreError> {
    for key in CI_BRANCH_VARIABLES {
        if let Some(value) = env(key).filter(|v| !v.trim().is_empty()) {
            tracing::debug!("branch '{value}' taken from ${key}");
            return Ok(value.trim().to_string());
        }
    }

    let undetectable = || CoreError::BranchUndetectable {
        path: dir.to_path_buf(),
    };
    let repo = match Repository::discover(dir) {
        Ok(repo) => repo,
        Err(e) if e.code() == ErrorCode::NotFound => return Err(undetectable()),
        Err(e) => return Err(e.into()),
    };
    head_branch(&repo)?.ok_or_else(undetectable)
}

fn head_branch(repo: &Repository) -> Result<Option<String>, CoreError> {
    match repo.head() {
        Ok(head) if head.is_branch() => Ok(head.shorthand().map(str::to_string)),
        Ok(_) => Ok(None),
        // Fresh repository: HEAD points at a branch with no commits yet.
        Err(e) if e.code() == ErrorCode::UnbornBranch => {
            let head = repo.find_reference("HEAD")?;
            Ok(head
                .symbolic_target()
                .and_then(|target| target.strip_prefix("refs/heads/"))
                .map(str::to_string))
        }
        Err(e) => Err(e.into()),
    }
}
