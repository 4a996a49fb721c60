use async_trait::async_trait;
use reqwest::Client;
use std::env;
use std::fmt;
use tracing::{debug, info, trace};

use crate::catalog::{Catalog, RepositoryRecord};
use crate::config::GitHubConfig;
use crate::error::{Error, Result};

/// Media type requested from the repository listing endpoints
pub const ACCEPT_HEADER: &str = "application/vnd.github.inertia-preview+json";

/// Whose repositories to list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    User(String),
    Org(String),
}

impl Owner {
    pub fn name(&self) -> &str {
        match self {
            Owner::User(name) | Owner::Org(name) => name,
        }
    }

    /// API path of the owner's repository listing
    pub fn repos_path(&self) -> String {
        match self {
            Owner::User(name) => format!("users/{}/repos", name),
            Owner::Org(name) => format!("orgs/{}/repos", name),
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::User(name) => write!(f, "user {}", name),
            Owner::Org(name) => write!(f, "organization {}", name),
        }
    }
}

/// A paginated source of repository records.
///
/// Pages are numbered from 1; an empty page marks the end of the listing.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, page: u32) -> Result<Vec<RepositoryRecord>>;
}

/// Walk `source` page by page until an empty page, collecting every record.
///
/// Any page failure aborts the walk; records from earlier pages are discarded.
pub async fn fetch_catalog<S>(source: &S) -> Result<Catalog>
where
    S: PageSource + ?Sized,
{
    let mut catalog = Catalog::new();
    let mut page = 1u32;

    loop {
        let records = source.fetch_page(page).await?;
        if records.is_empty() {
            break;
        }

        debug!("Page {} returned {} repositories", page, records.len());
        catalog.extend(records);
        page += 1;
    }

    Ok(catalog)
}

/// Read the access token from `var`; an unset or empty variable is a configuration error
pub fn token_from_env(var: &str) -> Result<String> {
    match env::var(var) {
        Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(Error::MissingCredential(var.to_string())),
    }
}

/// Minimal GitHub REST client for repository listings
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    api_url: String,
    token: String,
    per_page: u32,
}

impl GitHubClient {
    /// Create a client, reading the token from the configured environment variable.
    ///
    /// Fails before any network activity if the token is missing.
    pub fn from_config(config: &GitHubConfig, request_timeout: std::time::Duration) -> Result<Self> {
        let token = token_from_env(&config.token_env)?;
        Self::new(&config.api_url, token, config.per_page, request_timeout)
    }

    pub fn new(
        api_url: &str,
        token: String,
        per_page: u32,
        request_timeout: std::time::Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(request_timeout)
            .build()
            .map_err(Error::HttpClient)?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
            per_page: per_page.max(1),
        })
    }

    /// Full repository listing endpoint for `owner`
    pub fn endpoint(&self, owner: &Owner) -> String {
        format!("{}/{}", self.api_url, owner.repos_path())
    }

    /// Fetch the complete catalog of `owner`
    pub async fn list_repositories(&self, owner: &Owner) -> Result<Catalog> {
        info!("Fetching repository list for {}", owner);

        let pages = OwnerPages {
            client: self,
            endpoint: self.endpoint(owner),
        };
        let catalog = fetch_catalog(&pages).await?;

        info!("Found {} repositories for {}", catalog.len(), owner);
        Ok(catalog)
    }

    async fn get_page(&self, endpoint: &str, page: u32) -> Result<Vec<RepositoryRecord>> {
        let per_page = self.per_page.to_string();
        let page_number = page.to_string();

        let request = self
            .http
            .get(endpoint)
            .query(&[("per_page", per_page.as_str()), ("page", page_number.as_str())])
            .header("Accept", ACCEPT_HEADER)
            .header("Authorization", format!("token {}", self.token))
            .build()
            .map_err(|source| Error::Transport {
                url: endpoint.to_string(),
                source,
            })?;

        let url = request.url().to_string();
        trace!("{}", url);

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|source| Error::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                url,
                status: status.as_u16(),
            });
        }

        // consumes the response, releasing the connection before the next page
        let body = response.text().await.map_err(|source| Error::Transport {
            url: url.clone(),
            source,
        })?;
        trace!("{}", body);

        serde_json::from_str(&body).map_err(|source| Error::Decode { page, source })
    }
}

/// Pages of one owner's repository listing
struct OwnerPages<'a> {
    client: &'a GitHubClient,
    endpoint: String,
}

#[async_trait]
impl PageSource for OwnerPages<'_> {
    async fn fetch_page(&self, page: u32) -> Result<Vec<RepositoryRecord>> {
        self.client.get_page(&self.endpoint, page).await
    }
}
