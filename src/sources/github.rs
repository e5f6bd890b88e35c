//! GitHub REST review source
//!
//! Two lookups: the author of a commit, and the approving reviewers of a pull
//! request. Anything other than a successful, well-formed response is logged
//! and treated as "no data". There are no retries.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use super::ReviewSource;
use crate::error::{GateError, Result};
use crate::pr::PrNumber;
use crate::resolver::ApproverSet;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const REQUEST_TIMEOUT_SECS: u64 = 30;
const APPROVED: &str = "APPROVED";

/// Connection settings for the code-hosting API.
#[derive(Clone)]
pub struct ApiConfig {
    base_url: String,
    repository: String,
    token: String,
}

impl ApiConfig {
    /// Validates the credential first: without it nothing else may run.
    pub fn new(base_url: &str, repository: &str, token: Option<String>) -> Result<Self> {
        let token = token
            .filter(|t| !t.trim().is_empty())
            .ok_or(GateError::MissingCredential)?;

        let valid_repo = matches!(
            repository.split_once('/'),
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/')
        );
        if !valid_repo {
            return Err(GateError::InvalidRepository(repository.to_string()));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            repository: repository.to_string(),
            token,
        })
    }

    fn repo_url(&self, path: &str) -> String {
        format!("{}/repos/{}{}", self.base_url, self.repository, path)
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("repository", &self.repository)
            .field("token", &"<redacted>")
            .finish()
    }
}

// ── Payloads ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct UserPayload {
    pub login: String,
}

/// `GET /repos/{repo}/commits/{sha}`. `author` is null when the commit email
/// is not linked to an account.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitPayload {
    #[serde(default)]
    pub author: Option<UserPayload>,
}

/// One entry of `GET /repos/{repo}/pulls/{n}/reviews`. `user` is null for
/// deleted accounts.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewPayload {
    #[serde(default)]
    pub user: Option<UserPayload>,
    pub state: String,
}

pub fn approvers_from_reviews(reviews: &[ReviewPayload]) -> ApproverSet {
    reviews
        .iter()
        .filter(|r| r.state == APPROVED)
        .filter_map(|r| r.user.as_ref())
        .map(|u| u.login.clone())
        .collect()
}

// ── Client ───────────────────────────────────────────────────────

pub struct GitHubClient {
    http: Client,
    config: ApiConfig,
}

impl GitHubClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { http, config })
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        let url = self.config.repo_url(path);
        debug!(url = %url, "GET");

        let response = match self
            .http
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.config.token))
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, concat!("merge-gate/", env!("CARGO_PKG_VERSION")))
            .send()
        {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %url, error = %e, "API request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "API returned non-success status");
            return None;
        }

        match response.json::<T>() {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(url = %url, error = %e, "API response did not decode");
                None
            }
        }
    }
}

impl ReviewSource for GitHubClient {
    fn commit_author(&self, sha: &str) -> Option<String> {
        let commit: CommitPayload = self.get(&format!("/commits/{sha}"))?;
        let login = commit.author.map(|a| a.login);
        if login.is_none() {
            warn!(sha, "commit has no linked author account");
        }
        login
    }

    fn approvers(&self, pr: &PrNumber) -> ApproverSet {
        let reviews: Vec<ReviewPayload> = self
            .get(&format!("/pulls/{pr}/reviews?per_page=100"))
            .unwrap_or_default();
        let approvers = approvers_from_reviews(&reviews);
        debug!(pr = %pr, reviews = reviews.len(), approvers = approvers.len(), "PR reviews");
        approvers
    }
}
