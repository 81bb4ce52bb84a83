//! Extracts zip, tar and tar.gz archives into the target directory.
//!
//! Stages, each reported to [`Progress`]:
//! 1. remove the previous target and any stale extraction directory
//! 2. extract into `<parent>/.<name>.extracting`
//! 3. copy the `base` sub-path of the extracted tree to the target
//! 4. write the revision file, remove the extraction directory

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::{debug, info};

use assetsync_core::{Revision, Target};

use crate::asset::{Asset, FetchedAsset, PlacedAsset};
use crate::error::{fs_err, SyncError};
use crate::processor::Processor;
use crate::progress::Progress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Tar,
    TarGz,
}

impl ArchiveKind {
    /// Detect by file name suffix.
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_ascii_lowercase();
        if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else {
            None
        }
    }

    fn extract(self, archive: &Path, into: &Path) -> io::Result<()> {
        fs::create_dir_all(into)?;
        let file = File::open(archive)?;
        match self {
            Self::Zip => zip::ZipArchive::new(file)
                .and_then(|mut zip| zip.extract(into))
                .map_err(io::Error::other),
            Self::Tar => tar::Archive::new(file).unpack(into),
            Self::TarGz => tar::Archive::new(GzDecoder::new(file)).unpack(into),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ArchiveProcessor;

impl ArchiveProcessor {
    pub const NAME: &'static str = "archive";
}

/// `<parent>/.<name>.extracting` next to `target`.
pub fn extraction_dir(target: &Path) -> Result<PathBuf, SyncError> {
    let name = target
        .file_name()
        .ok_or_else(|| fs_err(target, "target path has no directory name"))?;
    let parent = target.parent().unwrap_or_else(|| Path::new("."));
    Ok(parent.join(format!(".{}.extracting", name.to_string_lossy())))
}

/// `root/base`, refusing anything that leaves `root`.
fn base_dir(root: &Path, base: &str) -> Result<PathBuf, SyncError> {
    let base = Path::new(base.trim_end_matches('/'));
    if base
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(fs_err(root, format!("base '{}' escapes the archive", base.display())));
    }
    let dir = root.join(base);
    if !dir.is_dir() {
        return Err(fs_err(&dir, "base directory not found in archive"));
    }
    Ok(dir)
}

fn remove_dir_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn copy_dir(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let dest = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &dest)?;
        } else {
            fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}

fn stage<T>(
    progress: &mut dyn Progress,
    step: &str,
    path: &Path,
    run: impl FnOnce() -> io::Result<T>,
) -> Result<T, SyncError> {
    progress.start(step, None);
    let result = run();
    progress.finish(step, result.is_ok());
    result.map_err(|e| fs_err(path, format!("{step}: {e}")))
}

fn place(
    fetched: &FetchedAsset,
    kind: ArchiveKind,
    target: &Target,
    target_path: &Path,
    temp_dir: &Path,
    progress: &mut dyn Progress,
) -> Result<Option<Revision>, SyncError> {
    stage(progress, "extract archive", temp_dir, || {
        kind.extract(fetched.path(), temp_dir)
    })?;
    let base = base_dir(temp_dir, target.base())?;
    stage(progress, "copy files", target_path, || copy_dir(&base, target_path))?;

    let revision = fetched.source.revision();
    if let Some(revision) = &revision {
        let file = target_path.join(target.revision_file());
        stage(progress, "write revision", &file, || {
            fs::write(&file, format!("{revision}\n"))
        })?;
    }
    stage(progress, "remove temporary files", temp_dir, || {
        remove_dir_if_exists(temp_dir)
    })?;
    Ok(revision)
}

impl Processor for ArchiveProcessor {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process_asset(
        &self,
        asset: Asset,
        target: &Target,
        progress: &mut dyn Progress,
    ) -> Result<Asset, SyncError> {
        let Asset::Fetched(fetched) = asset else {
            return Err(SyncError::UnsupportedAsset {
                role: "processor",
                name: Self::NAME,
                reason: "asset is already placed".into(),
            });
        };
        let kind = ArchiveKind::detect(fetched.path()).ok_or_else(|| SyncError::UnsupportedAsset {
            role: "processor",
            name: Self::NAME,
            reason: format!("{} is not a zip, tar or tar.gz file", fetched.path().display()),
        })?;

        let target_path = self.asset_path(target)?;
        let temp_dir = extraction_dir(&target_path)?;
        info!("extracting {} into {}", fetched.path().display(), target_path.display());

        stage(progress, "clean target", &target_path, || {
            remove_dir_if_exists(&temp_dir)?;
            remove_dir_if_exists(&target_path)
        })?;
        let placed = place(&fetched, kind, target, &target_path, &temp_dir, progress);
        if placed.is_err() {
            let _ = remove_dir_if_exists(&temp_dir);
        }
        let revision = placed?;
        debug!("placed {} at {}", fetched.path().display(), target_path.display());

        Ok(Asset::Placed(PlacedAsset {
            source: Some(fetched.source),
            path: target_path,
            revision,
        }))
    }
}
