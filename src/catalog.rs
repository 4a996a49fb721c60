//! Repository catalog: the ordered list of repositories an owner has on the
//! hosting service, plus set operations keyed by repository identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A repository as listed by the GitHub REST API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RepositoryRecord {
    pub id: u64,

    /// `owner/name`
    pub full_name: String,

    pub clone_url: String,

    #[serde(default)]
    pub html_url: String,

    #[serde(default)]
    pub archived: bool,
}

impl RepositoryRecord {
    /// Two records denote the same repository iff id and full name both match
    pub fn same_repository(&self, other: &RepositoryRecord) -> bool {
        self.id == other.id && self.full_name == other.full_name
    }

    pub fn exists_in(&self, catalog: &Catalog) -> bool {
        catalog.iter().any(|repo| repo.same_repository(self))
    }

    /// Repository name without the owner prefix
    pub fn name(&self) -> &str {
        self.full_name
            .rsplit_once('/')
            .map_or(self.full_name.as_str(), |(_, name)| name)
    }
}

impl fmt::Display for RepositoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}", self.id, self.full_name, self.clone_url)
    }
}

/// Ordered repository list, in API page order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    repositories: Vec<RepositoryRecord>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records of `self` that also appear in `other`
    pub fn contained_in(&self, other: &Catalog) -> Catalog {
        self.iter().filter(|repo| repo.exists_in(other)).cloned().collect()
    }

    /// Records of `self` that do not appear in `other`
    pub fn not_in(&self, other: &Catalog) -> Catalog {
        self.iter().filter(|repo| !repo.exists_in(other)).cloned().collect()
    }

    /// Records matching `predicate`, in order
    pub fn select<F>(&self, predicate: F) -> Catalog
    where
        F: Fn(&RepositoryRecord) -> bool,
    {
        self.iter().filter(|repo| predicate(repo)).cloned().collect()
    }

    pub fn push(&mut self, repository: RepositoryRecord) {
        self.repositories.push(repository);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RepositoryRecord> {
        self.repositories.iter()
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }

    pub fn as_slice(&self) -> &[RepositoryRecord] {
        &self.repositories
    }
}

impl From<Vec<RepositoryRecord>> for Catalog {
    fn from(repositories: Vec<RepositoryRecord>) -> Self {
        Self { repositories }
    }
}

impl FromIterator<RepositoryRecord> for Catalog {
    fn from_iter<I: IntoIterator<Item = RepositoryRecord>>(iter: I) -> Self {
        Self {
            repositories: iter.into_iter().collect(),
        }
    }
}

impl Extend<RepositoryRecord> for Catalog {
    fn extend<I: IntoIterator<Item = RepositoryRecord>>(&mut self, iter: I) {
        self.repositories.extend(iter);
    }
}

impl IntoIterator for Catalog {
    type Item = RepositoryRecord;
    type IntoIter = std::vec::IntoIter<RepositoryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.repositories.into_iter()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a RepositoryRecord;
    type IntoIter = std::slice::Iter<'a, RepositoryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.repositories.iter()
    }
}
