//! merge-gate - CODEOWNERS merge gate for release branches
//!
//! Decides whether the committer of `HEAD` may merge the files changed since
//! the last release tag. Each changed file is checked against every ownership
//! rule whose pattern matches it; each such rule must be satisfied either by
//! the committer owning it or by the committer being an approver of the
//! associated pull request.
//!
//! The pipeline is linear and synchronous:
//! ownership table → changed files → commit/review lookups → resolve → report.

pub mod codeowners;
pub mod config;
pub mod error;
pub mod pr;
pub mod report;
pub mod resolver;
pub mod sources;

pub use codeowners::{OwnershipRule, OwnershipTable};
pub use config::GateConfig;
pub use error::{GateError, Result};
pub use pr::{resolve_pr, title_to_pr, PrNumber};
pub use report::Report;
pub use resolver::{resolve, ApproverSet, FileVerdict, Resolution, RuleFailure};
pub use sources::{DiffSource, ReviewSource};

use tracing::info;

/// Everything the gate learned while deciding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateOutcome {
    pub committer: Option<String>,
    pub pr: Option<PrNumber>,
    pub approvers: ApproverSet,
    pub resolution: Resolution,
}

/// Gather inputs from the sources and resolve them against the table.
///
/// `review_ref` overrides the ref name the diff source would report. It is
/// only consulted when the commit title carries no PR reference.
pub fn run_gate(
    table: &OwnershipTable,
    diff: &dyn DiffSource,
    reviews: &dyn ReviewSource,
    review_ref: Option<&str>,
) -> Result<GateOutcome> {
    let changed = diff.changed_files()?;
    let head = diff.head_commit()?;

    let committer = reviews.commit_author(&head.sha);
    // A failed commit lookup loses the title along with the author.
    let title = committer.as_ref().map(|_| head.subject.as_str());

    let pr = match title.and_then(title_to_pr) {
        Some(pr) => Some(pr),
        None if title.is_some() => {
            let git_ref = match review_ref {
                Some(r) => Some(r.to_string()),
                None => diff.review_ref()?,
            };
            resolve_pr(title, git_ref.as_deref())
        }
        None => None,
    };

    let approvers = pr
        .as_ref()
        .map(|pr| reviews.approvers(pr))
        .unwrap_or_default();

    info!(
        committer = committer.as_deref().unwrap_or("<unresolved>"),
        pr = pr.as_ref().map(PrNumber::as_str).unwrap_or("<none>"),
        approvers = approvers.len(),
        changed = changed.len(),
        "resolving ownership"
    );

    let resolution = resolve(table, &changed, committer.as_deref(), &approvers);
    Ok(GateOutcome {
        committer,
        pr,
        approvers,
        resolution,
    })
}
