//! git-clone-all - bulk clone the repositories of a GitHub user or organization
//!
//! Fetches the owner's full repository catalog from the GitHub REST API and
//! clones every repository that does not already exist locally, so re-running
//! only picks up new repositories.
//!
//! ## Modules
//!
//! - [`github`]: paginated repository catalog retrieval
//! - [`catalog`]: repository records and identity-based set operations
//! - [`sync`]: clone-or-skip orchestration
//! - [`sweep`]: `git pull` across existing working copies
//! - [`exclude`]: `.gitexclude` loading
//! - [`git`]: external `git` invocation
//! - [`config`]: YAML configuration

pub mod catalog;
pub mod config;
pub mod context;
pub mod error;
pub mod exclude;
pub mod git;
pub mod github;
pub mod probe;
pub mod sweep;
pub mod sync;

pub use catalog::{Catalog, RepositoryRecord};
pub use config::Config;
pub use context::{SyncContext, Verbosity};
pub use error::{Error, GitError};
pub use exclude::ExclusionSet;
pub use git::{GitCli, GitRunner};
pub use github::{GitHubClient, Owner};
pub use sweep::{SweepResult, SweepSummary};
pub use sync::{SyncEngine, SyncOptions, SyncResult, SyncSummary};
