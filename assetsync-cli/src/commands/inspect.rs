//! `assetsync inspect`: compare revisions, optionally wait for deployments.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use assetsync_core::{AssetBundle, CoreError};
use assetsync_sync::{DiffStatus, Inspection, Inspector, Registries, WaitOutcome};

use super::ProjectArgs;

/// Arguments for `assetsync inspect`.
#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    /// Block until the VCS host reports no active deployment.
    #[arg(long)]
    pub wait_for_deployments: bool,

    /// Seconds between deployment polls.
    #[arg(long, default_value_t = 10)]
    pub interval: u64,

    /// Give up waiting after this many seconds [default: wait indefinitely].
    #[arg(long, requires = "wait_for_deployments")]
    pub timeout: Option<u64>,
}

#[derive(Serialize)]
struct InspectionJson {
    index: usize,
    #[serde(flatten)]
    inspection: Inspection,
    symbol: &'static str,
}

#[derive(Tabled)]
struct InspectionRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "environment")]
    environment: String,
    #[tabled(rename = "source")]
    source_revision: String,
    #[tabled(rename = "target")]
    target_revision: String,
    #[tabled(rename = "")]
    status: String,
    #[tabled(rename = "path")]
    path: String,
}

impl InspectArgs {
    pub fn run(self) -> Result<()> {
        let project = self.project.load()?;
        let bundles = project.bundles();
        if bundles.is_empty() && !self.json {
            println!("No frontend assets configured.");
            return Ok(());
        }
        let registries = Registries::with_defaults(project.dir.clone());
        let inspector = Inspector::new(&registries);

        if self.wait_for_deployments {
            self.wait(&inspector, &bundles)?;
        }

        let mut inspections = Vec::new();
        let mut failed = 0;
        for (index, bundle) in bundles.iter().enumerate() {
            let result = match bundle {
                Ok(bundle) => inspector.inspect(bundle).map_err(|e| e.to_string()),
                Err(err) => Err(err.to_string()),
            };
            match result {
                Ok(inspection) => inspections.push((index, inspection)),
                Err(err) => {
                    failed += 1;
                    eprintln!("{} #{index} {err}", "✗".red());
                }
            }
        }

        if self.json {
            print_json(inspections)?;
        } else {
            print_table(inspections);
        }

        if failed > 0 {
            bail!("{failed} of {} asset definitions could not be inspected", bundles.len());
        }
        Ok(())
    }

    fn wait(
        &self,
        inspector: &Inspector<'_>,
        bundles: &[Result<AssetBundle, CoreError>],
    ) -> Result<()> {
        let interval = Duration::from_secs(self.interval);
        let timeout = self.timeout.map(Duration::from_secs);
        let built = bundles
            .iter()
            .enumerate()
            .filter_map(|(index, bundle)| bundle.as_ref().ok().map(|b| (index, b)));
        for (index, bundle) in built {
            let outcome = inspector
                .wait_for_deployments(bundle, interval, timeout, |active| {
                    eprintln!("#{index}: waiting for {} active deployment(s)", active.len());
                    for deployment in active {
                        eprintln!("  {deployment}");
                    }
                })
                .with_context(|| format!("failed to poll deployments for #{index}"))?;
            if let WaitOutcome::TimedOut { active } = outcome {
                bail!(
                    "#{index}: {} deployment(s) still active after {}s",
                    active.len(),
                    self.timeout.unwrap_or_default()
                );
            }
        }
        Ok(())
    }
}

fn revision_cell(revision: Option<&assetsync_core::Revision>) -> String {
    revision.map(|r| r.short().to_string()).unwrap_or_else(|| "-".into())
}

fn status_cell(status: DiffStatus) -> String {
    match status {
        DiffStatus::UpToDate => status.symbol().green().bold().to_string(),
        DiffStatus::NeedsUpdate => status.symbol().red().bold().to_string(),
        DiffStatus::Unknown => status.symbol().yellow().bold().to_string(),
    }
}

fn print_table(inspections: Vec<(usize, Inspection)>) {
    if inspections.is_empty() {
        return;
    }
    for (index, inspection) in &inspections {
        println!("#{index} {}", inspection.source_url.bold());
        if let Some(vcs) = &inspection.vcs_url {
            println!("   {}", vcs.bright_black());
        }
    }
    let rows: Vec<InspectionRow> = inspections
        .into_iter()
        .map(|(index, i)| InspectionRow {
            index,
            environment: i.environment.unwrap_or_else(|| "-".into()),
            source_revision: revision_cell(i.source_revision.as_ref()),
            target_revision: revision_cell(i.target_revision.as_ref()),
            status: status_cell(i.status),
            path: i.target_path.display().to_string(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn print_json(inspections: Vec<(usize, Inspection)>) -> Result<()> {
    let payload: Vec<InspectionJson> = inspections
        .into_iter()
        .map(|(index, inspection)| InspectionJson {
            index,
            symbol: inspection.status.symbol(),
            inspection,
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize inspection JSON")?
    );
    Ok(())
}
