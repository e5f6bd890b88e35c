//! Gate configuration, built once at startup and passed by reference.

use std::path::PathBuf;

use crate::error::Result;
use crate::sources::ApiConfig;

pub const DEFAULT_CODEOWNERS: &str = ".github/CODEOWNERS";
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

#[derive(Debug, Clone)]
pub struct GateConfig {
    pub codeowners: PathBuf,
    pub repo_dir: PathBuf,
    /// Overrides the ref name read from git.
    pub review_ref: Option<String>,
    pub api: ApiConfig,
}

impl GateConfig {
    /// The credential is validated before anything else so a misconfigured
    /// run stops before touching the ownership file or the network.
    pub fn new(
        codeowners: PathBuf,
        repo_dir: PathBuf,
        review_ref: Option<String>,
        api_url: &str,
        repository: &str,
        token: Option<String>,
    ) -> Result<Self> {
        let api = ApiConfig::new(api_url, repository, token)?;
        Ok(Self {
            codeowners,
            repo_dir,
            review_ref,
            api,
        })
    }

    /// Ownership file path, relative paths resolved against the working tree.
    pub fn codeowners_path(&self) -> PathBuf {
        if self.codeowners.is_absolute() {
            self.codeowners.clone()
        } else {
            self.repo_dir.join(&self.codeowners)
        }
    }
}
