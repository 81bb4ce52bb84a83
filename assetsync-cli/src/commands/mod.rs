pub mod environment;
pub mod fetch;
pub mod inspect;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use assetsync_core::{branch, config, AssetBundle, Config, CoreError};

/// Options shared by every command.
#[derive(Args, Debug)]
pub struct ProjectArgs {
    /// Configuration file [default: ./assets.json].
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Branch to resolve environments for [default: CI variables, then git].
    #[arg(long, short = 'b')]
    pub branch: Option<String>,
}

/// Loaded configuration plus the branch it is resolved for.
pub struct Project {
    pub dir: PathBuf,
    pub config: Config,
    pub branch: String,
}

impl ProjectArgs {
    pub fn load(&self) -> Result<Project> {
        let cwd = std::env::current_dir().context("could not determine working directory")?;
        let path = match &self.config {
            Some(path) => cwd.join(path),
            None => config::config_path_in(&cwd),
        };
        let config = config::load(&path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?;
        let dir = path.parent().map(PathBuf::from).unwrap_or(cwd);
        let branch = match &self.branch {
            Some(branch) => branch.clone(),
            None => branch::detect_branch(&dir).context("pass --branch to choose one")?,
        };
        tracing::info!("branch '{branch}'");
        Ok(Project {
            dir,
            config,
            branch,
        })
    }
}

impl Project {
    /// One bundle per configured asset, in configuration order. A definition
    /// that cannot be built stays in its slot as an error.
    pub fn bundles(&self) -> Vec<Result<AssetBundle, CoreError>> {
        self.config
            .assets
            .iter()
            .map(|asset| assetsync_core::factory::build(asset, &self.branch))
            .collect()
    }
}
