use anyhow::{bail, Context, Result};
use dirs::config_dir;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::exclude::DEFAULT_EXCLUDE_FILE;

/// Main configuration structure for git-clone-all
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Directory under which `<owner>/` folders are created
    #[serde(default = "default_base_directory")]
    pub base_directory: String,

    /// Newline-delimited list of repository names to skip
    #[serde(default = "default_exclude_file")]
    pub exclude_file: String,

    /// GitHub API settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Synchronization behavior settings
    #[serde(default)]
    pub sync: SyncConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// GitHub configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GitHubConfig {
    /// REST API root, overridable for GitHub Enterprise
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Environment variable holding the access token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Repositories requested per page
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Timeout for each API request in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

/// Synchronization configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SyncConfig {
    /// Timeout for each git invocation in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Continue past failed clones and report them at the end
    #[serde(default)]
    pub keep_going: bool,

    /// Do not clone archived repositories
    #[serde(default)]
    pub skip_archived: bool,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log format
    #[serde(default = "default_log_format")]
    pub format: String, // "compact", "full"

    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,
}

// Default value functions
fn default_base_directory() -> String {
    ".".to_string()
}
fn default_exclude_file() -> String {
    DEFAULT_EXCLUDE_FILE.to_string()
}
fn default_api_url() -> String {
    "https://api.github.com".to_string()
}
fn default_token_env() -> String {
    "GIT_TOKEN".to_string()
}
fn default_per_page() -> u32 {
    40
}
fn default_request_timeout() -> u64 {
    30
}
fn default_timeout() -> u64 {
    300
}
fn default_log_format() -> String {
    "compact".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token_env: default_token_env(),
            per_page: default_per_page(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            keep_going: false,
            skip_archived: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            color: default_true(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_directory: default_base_directory(),
            exclude_file: default_exclude_file(),
            github: GitHubConfig::default(),
            sync: SyncConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, falling back to built-in defaults
    pub fn load_or_default() -> Result<Self> {
        match Self::default_config_path() {
            Some(config_path) if config_path.exists() => Self::load(&config_path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {:?}", path))?;

        // Expand environment variables in paths
        config.expand_paths()?;

        Ok(config)
    }

    /// Reject values that would make every git call or request time out at once
    pub fn validate(&self) -> Result<()> {
        if self.sync.timeout == 0 {
            bail!("sync.timeout must be greater than 0");
        }
        if self.github.request_timeout == 0 {
            bail!("github.request_timeout must be greater than 0");
        }
        if self.github.per_page == 0 {
            bail!("github.per_page must be greater than 0");
        }
        Ok(())
    }

    /// Default configuration file path (XDG compliant), if a config dir exists
    pub fn default_config_path() -> Option<PathBuf> {
        config_dir().map(|dir| dir.join("git-clone-all").join("config.yml"))
    }

    /// Expand `~` and environment variables in configuration paths
    pub fn expand_paths(&mut self) -> Result<()> {
        self.base_directory = shellexpand::full(&self.base_directory)
            .context("Failed to expand base_directory path")?
            .into_owned();

        self.exclude_file = shellexpand::full(&self.exclude_file)
            .context("Failed to expand exclude_file path")?
            .into_owned();

        Ok(())
    }

    pub fn base_path(&self) -> PathBuf {
        PathBuf::from(&self.base_directory)
    }

    pub fn exclude_path(&self) -> PathBuf {
        PathBuf::from(&self.exclude_file)
    }

    pub fn git_timeout(&self) -> Duration {
        Duration::from_secs(self.sync.timeout)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.github.request_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tempfile::TempDir;

    // Helper function to create a temporary config directory
    fn setup_test_config_dir() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_dir = temp_dir.path().join("git-clone-all");
        std::fs::create_dir_all(&config_dir).expect("Failed to create config dir");
        (temp_dir, config_dir)
    }

    #[test]
    fn test_config_default_values() {
        let config = Config::default();

        assert_eq!(config.base_directory, ".");
        assert_eq!(config.exclude_file, ".gitexclude");
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.github.token_env, "GIT_TOKEN");
        assert_eq!(config.github.per_page, 40);
        assert_eq!(config.sync.timeout, 300);
        assert!(!config.sync.keep_going);
        assert!(!config.sync.skip_archived);
        assert_eq!(config.logging.format, "compact");
        assert!(config.logging.color);
    }

    #[test]
    #[serial]
    fn test_expand_paths() {
        env::set_var("TEST_GIT_CLONE_ALL_HOME", "/test/home");

        let mut config = Config::default();
        config.base_directory = "${TEST_GIT_CLONE_ALL_HOME}/src".to_string();
        config.exclude_file = "$TEST_GIT_CLONE_ALL_HOME/.gitexclude".to_string();

        config.expand_paths().expect("Failed to expand paths");

        assert_eq!(config.base_directory, "/test/home/src");
        assert_eq!(config.exclude_file, "/test/home/.gitexclude");

        env::remove_var("TEST_GIT_CLONE_ALL_HOME");
    }

    #[test]
    fn test_config_load_nonexistent_file() {
        let nonexistent_path = Path::new("/nonexistent/path/config.yml");
        let result = Config::load(nonexistent_path);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_load_invalid_yaml() {
        let (_temp_dir, config_dir) = setup_test_config_dir();
        let config_path = config_dir.join("config.yml");
        std::fs::write(&config_path, "github: [not, a, map").unwrap();

        let err = Config::load(&config_path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_load_from_file() {
        let (_temp_dir, config_dir) = setup_test_config_dir();
        let config_path = config_dir.join("config.yml");
        std::fs::write(
            &config_path,
            "base_directory: /custom/path\ngithub:\n  per_page: 100\nsync:\n  keep_going: true\n",
        )
        .unwrap();

        let loaded_config = Config::load(&config_path).expect("Failed to load config");

        assert_eq!(loaded_config.base_directory, "/custom/path");
        assert_eq!(loaded_config.github.per_page, 100);
        assert!(loaded_config.sync.keep_going);
    }

    #[test]
    fn test_zero_timeouts_are_rejected() {
        let (_temp_dir, config_dir) = setup_test_config_dir();
        let config_path = config_dir.join("config.yml");

        std::fs::write(&config_path, "sync:\n  timeout: 0\n").unwrap();
        let err = Config::load(&config_path).unwrap_err();
        assert!(format!("{:#}", err).contains("sync.timeout"));

        std::fs::write(&config_path, "github:\n  request_timeout: 0\n").unwrap();
        let err = Config::load(&config_path).unwrap_err();
        assert!(format!("{:#}", err).contains("github.request_timeout"));

        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_default_path_xdg() {
        if let Some(default_path) = Config::default_config_path() {
            assert!(default_path.to_string_lossy().contains("git-clone-all"));
            assert!(default_path.to_string_lossy().ends_with("config.yml"));
        }
    }

    #[test]
    fn test_yaml_parsing_partial() {
        let yaml_content = r#"
base_directory: "/srv/mirrors"
github:
  api_url: "https://github.example.com/api/v3"
  token_env: "GHE_TOKEN"
sync:
  timeout: 60
  skip_archived: true
logging:
  format: "full"
  color: false
"#;

        let config: Config = serde_yaml::from_str(yaml_content).expect("Failed to parse YAML");

        assert_eq!(config.base_directory, "/srv/mirrors");
        assert_eq!(config.exclude_file, ".gitexclude");
        assert_eq!(config.github.api_url, "https://github.example.com/api/v3");
        assert_eq!(config.github.token_env, "GHE_TOKEN");
        assert_eq!(config.github.per_page, 40);
        assert_eq!(config.git_timeout(), Duration::from_secs(60));
        assert!(config.sync.skip_archived);
        assert!(!config.sync.keep_going);
        assert_eq!(config.logging.format, "full");
        assert!(!config.logging.color);
    }

    #[test]
    fn test_empty_mapping_uses_defaults() {
        let config: Config = serde_yaml::from_str("{}").expect("Failed to parse YAML");
        assert_eq!(config.base_path(), PathBuf::from("."));
        assert_eq!(config.exclude_path(), PathBuf::from(".gitexclude"));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }
}
