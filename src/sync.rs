//! Sync Engine - clones every catalog entry that is not present locally
//!
//! Each repository resolves to clone, skip (already exists) or excluded.
//! Execution is sequential. By default the first clone failure aborts the
//! run; with `keep_going` failures are collected into the summary instead.

use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::catalog::{Catalog, RepositoryRecord};
use crate::context::SyncContext;
use crate::error::{Error, Result};
use crate::exclude::ExclusionSet;
use crate::git::GitRunner;
use crate::probe;

/// Outcome for a single catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncResult {
    /// Repository was cloned
    Cloned { full_name: String },
    /// Dry run: repository would have been cloned
    WouldClone { full_name: String },
    /// Repository already exists locally
    Skipped { full_name: String },
    /// Dry run: repository would have been skipped
    WouldSkip { full_name: String },
    /// Filtered out before any local check
    Excluded { full_name: String, reason: String },
    /// Clone failed and the run continued
    Failed { full_name: String, error: String },
}

impl SyncResult {
    pub fn full_name(&self) -> &str {
        match self {
            SyncResult::Cloned { full_name }
            | SyncResult::WouldClone { full_name }
            | SyncResult::Skipped { full_name }
            | SyncResult::WouldSkip { full_name }
            | SyncResult::Excluded { full_name, .. }
            | SyncResult::Failed { full_name, .. } => full_name,
        }
    }
}

/// Results from a complete sync operation
#[derive(Debug, Clone)]
pub struct SyncSummary {
    pub total_repositories: usize,
    pub cloned: usize,
    pub skipped: usize,
    pub excluded: usize,
    pub failed: usize,
    pub duration: Duration,
    pub results: Vec<SyncResult>,
}

impl SyncSummary {
    fn compile(results: Vec<SyncResult>, duration: Duration) -> Self {
        let mut summary = SyncSummary {
            total_repositories: results.len(),
            cloned: 0,
            skipped: 0,
            excluded: 0,
            failed: 0,
            duration,
            results: Vec::new(),
        };

        for result in &results {
            match result {
                SyncResult::Cloned { .. } | SyncResult::WouldClone { .. } => summary.cloned += 1,
                SyncResult::Skipped { .. } | SyncResult::WouldSkip { .. } => summary.skipped += 1,
                SyncResult::Excluded { .. } => summary.excluded += 1,
                SyncResult::Failed { .. } => summary.failed += 1,
            }
        }

        summary.results = results;
        summary
    }

    pub fn failures(&self) -> impl Iterator<Item = &SyncResult> {
        self.results
            .iter()
            .filter(|r| matches!(r, SyncResult::Failed { .. }))
    }
}

/// Behaviour switches for the sync engine
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Record clone failures and continue instead of aborting
    pub keep_going: bool,
    /// Leave archived repositories alone
    pub skip_archived: bool,
}

/// Clones catalog entries into `<base_dir>/<owner>/`
pub struct SyncEngine<G> {
    git: G,
    base_dir: PathBuf,
    options: SyncOptions,
}

impl<G: GitRunner> SyncEngine<G> {
    pub fn new(git: G, base_dir: impl Into<PathBuf>, options: SyncOptions) -> Self {
        Self {
            git,
            base_dir: base_dir.into(),
            options,
        }
    }

    /// Folder that receives the clones of `owner`
    pub fn owner_dir(&self, owner: &str) -> PathBuf {
        self.base_dir.join(owner)
    }

    /// Directory `git clone` creates for `repository` inside the owner folder
    pub fn repo_path(&self, owner: &str, repository: &RepositoryRecord) -> PathBuf {
        self.owner_dir(owner).join(repository.name())
    }

    /// Split the catalog into entries to process and entries filtered out
    pub fn partition(
        &self,
        catalog: &Catalog,
        exclusions: &ExclusionSet,
    ) -> (Catalog, Vec<SyncResult>) {
        let skip_archived = self.options.skip_archived;
        let filtered = catalog.select(|repo| {
            exclusion_reason(repo, exclusions, skip_archived).is_some()
        });

        let excluded = filtered
            .iter()
            .filter_map(|repo| {
                exclusion_reason(repo, exclusions, skip_archived).map(|reason| {
                    SyncResult::Excluded {
                        full_name: repo.full_name.clone(),
                        reason: reason.to_string(),
                    }
                })
            })
            .collect();

        (catalog.not_in(&filtered), excluded)
    }

    /// Clone every repository of `catalog` that does not exist locally
    pub async fn sync(
        &self,
        ctx: &SyncContext,
        owner: &str,
        catalog: &Catalog,
        exclusions: &ExclusionSet,
    ) -> Result<SyncSummary> {
        let start_time = Instant::now();
        let (work, mut results) = self.partition(catalog, exclusions);

        for result in &results {
            if let SyncResult::Excluded { full_name, reason } = result {
                info!("excluding {} ({})", full_name, reason);
            }
        }

        debug!("cloning {} repositories...", work.len());

        for repository in &work {
            match self.clone_repository(ctx, owner, repository).await {
                Ok(result) => results.push(result),
                Err(Error::Clone { full_name, source }) if self.options.keep_going => {
                    error!("failed to clone {}: {}", full_name, source);
                    results.push(SyncResult::Failed {
                        full_name,
                        error: source.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        let summary = SyncSummary::compile(results, start_time.elapsed());
        info!(
            "Sync completed in {:.2}s: {} cloned, {} skipped, {} excluded, {} failed",
            summary.duration.as_secs_f64(),
            summary.cloned,
            summary.skipped,
            summary.excluded,
            summary.failed
        );

        Ok(summary)
    }

    /// Clone one repository into the owner folder unless its path already exists
    pub async fn clone_repository(
        &self,
        ctx: &SyncContext,
        owner: &str,
        repository: &RepositoryRecord,
    ) -> Result<SyncResult> {
        let base_folder = self.owner_dir(owner);
        if !probe::folder_exists(&base_folder) {
            if ctx.noop {
                debug!("would create {}", base_folder.display());
            } else {
                tokio::fs::create_dir_all(&base_folder)
                    .await
                    .map_err(|source| Error::CreateFolder {
                        path: base_folder.clone(),
                        source,
                    })?;
            }
        }

        let full_name = repository.full_name.clone();
        let repository_path = self.repo_path(owner, repository);

        if probe::path_exists(&repository_path) {
            if ctx.noop {
                info!("would skip {} (already exists).", full_name);
                return Ok(SyncResult::WouldSkip { full_name });
            }

            info!("skipping {} (already exists).", full_name);
            return Ok(SyncResult::Skipped { full_name });
        }

        if ctx.noop {
            info!("would clone {}", full_name);
            return Ok(SyncResult::WouldClone { full_name });
        }

        info!("cloning {}", full_name);
        self.git
            .clone_repository(&base_folder, &repository.clone_url)
            .await
            .map_err(|source| Error::Clone {
                full_name: full_name.clone(),
                source,
            })?;

        Ok(SyncResult::Cloned { full_name })
    }
}

fn exclusion_reason(
    repository: &RepositoryRecord,
    exclusions: &ExclusionSet,
    skip_archived: bool,
) -> Option<&'static str> {
    if exclusions.contains(repository.name()) || exclusions.contains(&repository.full_name) {
        Some("in exclusion list")
    } else if skip_archived && repository.archived {
        Some("archived")
    } else {
        None
    }
}
