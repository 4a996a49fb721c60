//! Common test utilities and helpers for git-clone-all tests
#![allow(dead_code)]

use async_trait::async_trait;
use git_clone_all::{Catalog, GitError, GitRunner, RepositoryRecord};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Isolated working area with its own config directory
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub config_dir: PathBuf,
    pub work_dir: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_dir = temp_dir.path().join("config");
        let work_dir = temp_dir.path().join("work");
        std::fs::create_dir_all(config_dir.join("git-clone-all")).expect("Failed to create config dir");
        std::fs::create_dir_all(&work_dir).expect("Failed to create work dir");

        Self {
            temp_dir,
            config_dir,
            work_dir,
        }
    }

    pub fn create_test_config(&self, content: &str) -> PathBuf {
        let config_path = self.config_dir.join("git-clone-all").join("config.yml");
        std::fs::write(&config_path, content).expect("Failed to write test config");
        config_path
    }

    /// Config pointing the client at a mock API root
    pub fn create_api_config(&self, api_url: &str, token_env: &str) -> PathBuf {
        self.create_test_config(&format!(
            r#"
github:
  api_url: "{}"
  token_env: "{}"
logging:
  color: false
"#,
            api_url, token_env
        ))
    }
}

pub fn record(id: u64, full_name: &str) -> RepositoryRecord {
    RepositoryRecord {
        id,
        full_name: full_name.to_string(),
        clone_url: format!("https://github.com/{}.git", full_name),
        html_url: format!("https://github.com/{}", full_name),
        archived: false,
    }
}

pub fn sample_catalog(owner: &str, count: u64) -> Catalog {
    (1..=count)
        .map(|i| record(i, &format!("{}/repo-{:03}", owner, i)))
        .collect()
}

/// One API page of repository objects, shaped like GitHub's response
pub fn api_page(owner: &str, ids: std::ops::Range<u64>) -> Value {
    let repos: Vec<Value> = ids
        .map(|id| {
            json!({
                "id": id,
                "name": format!("repo-{:03}", id),
                "full_name": format!("{}/repo-{:03}", owner, id),
                "clone_url": format!("https://github.com/{}/repo-{:03}.git", owner, id),
                "html_url": format!("https://github.com/{}/repo-{:03}", owner, id),
                "archived": false,
                "fork": false,
                "private": false
            })
        })
        .collect();
    Value::Array(repos)
}

/// Fake git that records calls and materialises clones as `<dir>/<name>/.git`
#[derive(Default)]
pub struct RecordingGit {
    pub clones: Mutex<Vec<(PathBuf, String)>>,
    pub pulls: Mutex<Vec<PathBuf>>,
}

impl RecordingGit {
    pub fn clone_count(&self) -> usize {
        self.clones.lock().unwrap().len()
    }

    pub fn pull_count(&self) -> usize {
        self.pulls.lock().unwrap().len()
    }
}

fn repo_dir_name(url: &str) -> String {
    let last = url.trim_end_matches('/').rsplit('/').next().unwrap_or(url);
    last.trim_end_matches(".git").to_string()
}

#[async_trait]
impl GitRunner for RecordingGit {
    async fn clone_repository(&self, dir: &Path, url: &str) -> Result<(), GitError> {
        std::fs::create_dir_all(dir.join(repo_dir_name(url)).join(".git")).map_err(GitError::Spawn)?;
        self.clones
            .lock()
            .unwrap()
            .push((dir.to_path_buf(), url.to_string()));
        Ok(())
    }

    async fn pull(&self, dir: &Path) -> Result<(), GitError> {
        self.pulls.lock().unwrap().push(dir.to_path_buf());
        Ok(())
    }
}

/// True when a usable `git` executable is on PATH
pub fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Assertion helper for command output
pub fn assert_contains_all(text: &str, expected: &[&str]) {
    for item in expected {
        assert!(
            text.contains(item),
            "Expected text to contain '{}', but it didn't. Text: {}",
            item,
            text
        );
    }
}
