//! Maintenance sweep: `git pull` in every working copy below a directory.
//!
//! Unlike the clone path, a failing pull is logged and recorded but never
//! stops the sweep.

use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::context::SyncContext;
use crate::error::{Error, Result};
use crate::exclude::ExclusionSet;
use crate::git::GitRunner;
use crate::probe;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepResult {
    Pulled { path: PathBuf },
    WouldPull { path: PathBuf },
    Excluded { path: PathBuf },
    /// Directory without a `.git` marker
    NotARepository { path: PathBuf },
    Failed { path: PathBuf, error: String },
}

#[derive(Debug, Clone, Default)]
pub struct SweepSummary {
    pub pulled: usize,
    pub excluded: usize,
    pub ignored: usize,
    pub failed: usize,
    pub results: Vec<SweepResult>,
}

impl SweepSummary {
    fn record(&mut self, result: SweepResult) {
        match result {
            SweepResult::Pulled { .. } | SweepResult::WouldPull { .. } => self.pulled += 1,
            SweepResult::Excluded { .. } => self.excluded += 1,
            SweepResult::NotARepository { .. } => self.ignored += 1,
            SweepResult::Failed { .. } => self.failed += 1,
        }
        self.results.push(result);
    }
}

/// Immediate, non-hidden subdirectories of `root`, sorted by name
pub fn list_directories(root: &Path) -> Result<Vec<PathBuf>> {
    let read_dir_error = |source| Error::ReadDir {
        path: root.to_path_buf(),
        source,
    };

    let mut directories = Vec::new();
    for entry in std::fs::read_dir(root).map_err(read_dir_error)? {
        let entry = entry.map_err(read_dir_error)?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if !hidden && probe::folder_exists(&entry.path()) {
            directories.push(entry.path());
        }
    }

    directories.sort();
    Ok(directories)
}

/// Pull every git working copy directly below `root` that is not excluded
pub async fn sweep<G: GitRunner + ?Sized>(
    ctx: &SyncContext,
    git: &G,
    root: &Path,
    exclusions: &ExclusionSet,
) -> Result<SweepSummary> {
    let mut summary = SweepSummary::default();

    for dir in list_directories(root)? {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if exclusions.contains(&name) {
            info!("Skipping {} (in .gitexclude)", name);
            summary.record(SweepResult::Excluded { path: dir });
            continue;
        }

        if !probe::is_git_repo(&dir) {
            summary.record(SweepResult::NotARepository { path: dir });
            continue;
        }

        if ctx.noop {
            info!("would run git pull in {}", name);
            summary.record(SweepResult::WouldPull { path: dir });
            continue;
        }

        info!("Running git pull in {}", name);
        match git.pull(&dir).await {
            Ok(()) => summary.record(SweepResult::Pulled { path: dir }),
            Err(e) => {
                error!("Error running git pull in {}: {}", name, e);
                summary.record(SweepResult::Failed {
                    path: dir,
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        "Sweep finished: {} pulled, {} excluded, {} failed",
        summary.pulled, summary.excluded, summary.failed
    );
    Ok(summary)
}
