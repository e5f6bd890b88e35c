//! External collaborators feeding the gate
//!
//! - [`DiffSource`]: the version-control side (changed files, HEAD commit,
//!   review ref), implemented over git by [`git::GitDiffSource`].
//! - [`ReviewSource`]: the code-hosting side (commit authorship, PR
//!   approvals), implemented over the GitHub REST API by
//!   [`github::GitHubClient`].

pub mod git;
pub mod github;

use crate::error::Result;
use crate::pr::PrNumber;
use crate::resolver::ApproverSet;

pub use git::GitDiffSource;
pub use github::{ApiConfig, GitHubClient};

/// Hash and subject line of the commit under review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadCommit {
    pub sha: String,
    pub subject: String,
}

pub trait DiffSource {
    /// Paths changed since the most recent tag reachable from `HEAD^`.
    /// Empty when there is no such tag.
    fn changed_files(&self) -> Result<Vec<String>>;

    fn head_commit(&self) -> Result<HeadCommit>;

    /// Name of the branch/ref under review, if it can be determined.
    fn review_ref(&self) -> Result<Option<String>>;
}

/// Lookups against the code-hosting platform. Failures here are degraded
/// data, never errors: an unknown author is `None`, a failed review listing
/// is an empty set.
pub trait ReviewSource {
    fn commit_author(&self, sha: &str) -> Option<String>;

    fn approvers(&self, pr: &PrNumber) -> ApproverSet;
}
