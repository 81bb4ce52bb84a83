//! `assetsync environment`: show branch → environment resolution.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use super::ProjectArgs;

/// Arguments for `assetsync environment`.
#[derive(Args, Debug)]
pub struct EnvironmentArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

impl EnvironmentArgs {
    pub fn run(self) -> Result<()> {
        let project = self.project.load()?;
        println!("branch {}", project.branch.bold());
        for (index, asset) in project.config.assets.iter().enumerate() {
            let environment = assetsync_core::factory::resolve_environment(asset, &project.branch)
                .with_context(|| format!("asset definition #{index}"))?;
            println!("  #{index}  {}", environment.green());
        }
        Ok(())
    }
}
