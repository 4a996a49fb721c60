//! `.gitexclude` handling: a newline-delimited list of repository names to skip.

use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

/// Default exclusion file, looked up in the working directory
pub const DEFAULT_EXCLUDE_FILE: &str = ".gitexclude";

/// Repository names to skip, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    names: Vec<String>,
}

impl ExclusionSet {
    /// Load the exclusion list from `path`.
    ///
    /// Exclusions are advisory: an unreadable file is logged and yields an
    /// empty set instead of failing the run.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let set = Self::parse(&content);
                debug!("Loaded {} exclusions from {}", set.len(), path.display());
                set
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No exclusion file at {}", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("Error opening {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse exclusion file content, dropping blank lines and surrounding whitespace
    pub fn parse(content: &str) -> Self {
        let mut names: Vec<String> = Vec::new();
        for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if !names.iter().any(|n| n == line) {
                names.push(line.to_string());
            }
        }
        Self { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::default();
        for name in iter {
            let name = name.into();
            if !set.contains(&name) {
                set.names.push(name);
            }
        }
        set
    }
}
