//! Local filesystem provider, optionally producing the asset with a command.
//!
//! `command` placeholders: `{url}` (the interpolated url), `{cwd}` (the
//! working directory), `{temp}` (a fresh temporary file that becomes the
//! asset and must be left non-empty) and any other source key.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use assetsync_core::interpolate::{interpolate, interpolate_with};
use assetsync_core::Source;

use crate::asset::{Asset, FetchedAsset};
use crate::error::{fs_err, io_err, SyncError};
use crate::progress::Progress;
use crate::provider::{archive_suffix, Provider};

#[derive(Debug, Clone)]
pub struct LocalPathProvider {
    working_dir: PathBuf,
}

impl LocalPathProvider {
    pub const NAME: &'static str = "local";

    pub fn new(working_dir: PathBuf) -> Self {
        Self { working_dir }
    }

    fn resolve(&self, location: &str) -> Result<PathBuf, SyncError> {
        let location = location.strip_prefix("file://").unwrap_or(location);
        if location.contains("://") {
            return Err(SyncError::UnsupportedAsset {
                role: "provider",
                name: Self::NAME,
                reason: format!("'{location}' is not a local path"),
            });
        }
        Ok(self.working_dir.join(location))
    }

    fn run(&self, command: &str, progress: &mut dyn Progress) -> Result<(), SyncError> {
        let step = format!("run `{command}`");
        progress.start(&step, None);
        info!("running `{command}` in {}", self.working_dir.display());
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(&self.working_dir)
            .output()
            .map_err(|e| io_err(&self.working_dir, e))?;
        progress.finish(&step, output.status.success());
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(fs_err(
                &self.working_dir,
                format!("`{command}` exited with {}: {}", output.status, stderr.trim()),
            ));
        }
        debug!("{}", String::from_utf8_lossy(&output.stdout).trim());
        Ok(())
    }
}

fn ensure_exists(path: &Path) -> Result<(), SyncError> {
    if path.exists() {
        Ok(())
    } else {
        Err(fs_err(path, "asset path does not exist"))
    }
}

/// The `{temp}` file exists before the command runs, so only content counts.
fn ensure_written(path: &Path) -> Result<(), SyncError> {
    let metadata = std::fs::metadata(path).map_err(|e| io_err(path, e))?;
    if metadata.len() > 0 {
        Ok(())
    } else {
        Err(fs_err(path, "command produced no asset"))
    }
}

impl Provider for LocalPathProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn asset_url(&self, source: &Source) -> Result<String, SyncError> {
        Ok(interpolate(source.url()?, source.definition().values()))
    }

    fn fetch_asset(&self, source: &Source, progress: &mut dyn Progress) -> Result<Asset, SyncError> {
        let url = self.asset_url(source)?;
        let path = self.resolve(&url)?;

        let Some(command) = source.command() else {
            ensure_exists(&path)?;
            return Ok(Asset::Fetched(FetchedAsset::local(source.clone(), path)));
        };

        let temp = if command.contains("{temp}") {
            let file = tempfile::Builder::new()
                .prefix("assetsync-")
                .suffix(archive_suffix(&url))
                .tempfile()
                .map_err(|e| io_err(std::env::temp_dir(), e))?;
            Some(file.into_temp_path())
        } else {
            None
        };

        let cwd = self.working_dir.to_string_lossy().into_owned();
        let temp_name = temp.as_ref().map(|t| t.to_string_lossy().into_owned());
        let command = interpolate_with(command, |key| match key {
            "url" => Some(url.clone()),
            "cwd" => Some(cwd.clone()),
            "temp" => temp_name.clone(),
            _ => source.definition().string(key),
        });
        self.run(&command, progress)?;

        match temp {
            Some(temp) => {
                ensure_written(&temp)?;
                Ok(Asset::Fetched(FetchedAsset::temporary(source.clone(), temp)))
            }
            None => {
                ensure_exists(&path)?;
                Ok(Asset::Fetched(FetchedAsset::local(source.clone(), path)))
            }
        }
    }
}
