//! `assetsync fetch`: download and place every configured asset.

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;

use assetsync_sync::{
    pipeline::all_succeeded, LogProgress, Registries, Strategy, SyncOptions, SyncOutcome,
    SyncReport, Synchronizer,
};

use super::ProjectArgs;

/// Arguments for `assetsync fetch`.
#[derive(Args, Debug)]
pub struct FetchArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Re-fetch even when the target already holds the source revision.
    #[arg(long)]
    pub force: bool,

    /// On fetch failure, retry once with the `latest` environment.
    #[arg(long)]
    pub failsafe: bool,
}

impl FetchArgs {
    pub fn run(self) -> Result<()> {
        let project = self.project.load()?;
        let bundles = project.bundles();
        if bundles.is_empty() {
            println!("No frontend assets configured.");
            return Ok(());
        }

        let registries = Registries::with_defaults(project.dir.clone());
        let options = SyncOptions {
            strategy: if self.force {
                Strategy::Force
            } else {
                Strategy::Default
            },
            failsafe: self.failsafe,
        };
        let reports =
            Synchronizer::new(&registries).sync_all(bundles, options, &mut LogProgress::default());
        for report in &reports {
            print_report(report);
        }

        if !all_succeeded(&reports) {
            let failed = reports.iter().filter(|r| !r.is_success()).count();
            bail!("{failed} of {} asset definitions failed", reports.len());
        }
        Ok(())
    }
}

fn print_report(report: &SyncReport) {
    let environment = report.environment.as_deref().unwrap_or("-");
    match &report.result {
        Ok(SyncOutcome::UpToDate { revision }) => println!(
            "{} #{} [{environment}] up to date{}",
            "✓".green(),
            report.index,
            revision
                .as_ref()
                .map(|r| format!(" at {}", r.short()))
                .unwrap_or_default(),
        ),
        Ok(SyncOutcome::Placed { path, revision }) => println!(
            "{} #{} [{environment}] placed {}{}",
            "✓".green(),
            report.index,
            path.display(),
            revision
                .as_ref()
                .map(|r| format!(" at {}", r.short()))
                .unwrap_or_default(),
        ),
        Err(err) => eprintln!("{} #{} [{environment}] {err}", "✗".red(), report.index),
    }
}
