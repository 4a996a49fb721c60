use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command as AsyncCommand;
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::error::GitError;

/// The two git operations the sync workflow needs.
///
/// Abstracted so that orchestration can be exercised without a git binary.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitRunner: Send + Sync {
    /// `git -C <dir> clone <url>`
    async fn clone_repository(&self, dir: &Path, url: &str) -> Result<(), GitError>;

    /// `git -C <dir> pull`
    async fn pull(&self, dir: &Path) -> Result<(), GitError>;
}

#[async_trait]
impl<T: GitRunner + ?Sized> GitRunner for &T {
    async fn clone_repository(&self, dir: &Path, url: &str) -> Result<(), GitError> {
        (**self).clone_repository(dir, url).await
    }

    async fn pull(&self, dir: &Path) -> Result<(), GitError> {
        (**self).pull(dir).await
    }
}

/// Runs the `git` executable found on `PATH`
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
    timeout: Duration,
}

impl GitCli {
    pub fn new(timeout: Duration) -> Self {
        Self {
            program: "git".to_string(),
            timeout,
        }
    }

    /// Use a different executable instead of `git`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    async fn run(&self, dir: &Path, args: &[&str]) -> Result<String, GitError> {
        debug!("Running git -C {} {}", dir.display(), args.join(" "));

        let child = AsyncCommand::new(&self.program)
            .arg("-C")
            .arg(dir)
            .args(args)
            // never block on a credential prompt
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = timeout(self.timeout, child)
            .await
            .map_err(|_| GitError::Timeout {
                args: args.join(" "),
                timeout: self.timeout,
            })?
            .map_err(GitError::Spawn)?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(GitError::Exit {
                args: args.join(" "),
                code: output.status.code(),
                stderr,
            });
        }

        trace!("{}", stdout);
        Ok(stdout)
    }
}

#[async_trait]
impl GitRunner for GitCli {
    async fn clone_repository(&self, dir: &Path, url: &str) -> Result<(), GitError> {
        self.run(dir, &["clone", url]).await.map(|_| ())
    }

    async fn pull(&self, dir: &Path) -> Result<(), GitError> {
        self.run(dir, &["pull"]).await.map(|_| ())
    }
}
