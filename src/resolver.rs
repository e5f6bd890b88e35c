//! Authorization resolver
//!
//! Every ownership rule whose pattern matches a changed file is an independent
//! gate for that file. A gate opens when the committer owns the rule, or when
//! the committer is among the PR's approvers. The approver test is global, not
//! per rule, so an approved PR lets its committer through every gate.
//!
//! Files no rule governs are always authorized. An unresolved committer opens
//! no gate at all.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::codeowners::OwnershipTable;

// ── Inputs ───────────────────────────────────────────────────────

/// Identities that left an `APPROVED` review on the PR.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ApproverSet(BTreeSet<String>);

impl ApproverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.0.contains(identity)
    }

    pub fn insert(&mut self, identity: impl Into<String>) -> bool {
        self.0.insert(identity.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ApproverSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

// ── Verdicts ─────────────────────────────────────────────────────

/// A governing rule whose gate stayed closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleFailure {
    pub pattern: String,
    pub owners: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileVerdict {
    pub path: String,
    pub failures: Vec<RuleFailure>,
}

impl FileVerdict {
    pub fn is_authorized(&self) -> bool {
        self.failures.is_empty()
    }

    /// Owners of every failed rule, first-seen order, no repeats.
    pub fn required_owners(&self) -> Vec<String> {
        let mut owners: Vec<String> = Vec::new();
        for owner in self.failures.iter().flat_map(|f| f.owners.iter()) {
            if !owners.contains(owner) {
                owners.push(owner.clone());
            }
        }
        owners
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub verdicts: Vec<FileVerdict>,
    pub any_unauthorized: bool,
}

impl Resolution {
    pub fn unauthorized(&self) -> impl Iterator<Item = &FileVerdict> {
        self.verdicts.iter().filter(|v| !v.is_authorized())
    }
}

// ── Resolution ───────────────────────────────────────────────────

/// Decide every changed file. Pure: identical inputs give identical verdicts.
pub fn resolve(
    table: &OwnershipTable,
    changed_files: &[String],
    committer: Option<&str>,
    approvers: &ApproverSet,
) -> Resolution {
    let approved = committer.is_some_and(|c| approvers.contains(c));

    let verdicts: Vec<FileVerdict> = changed_files
        .iter()
        .map(|path| {
            let failures = table
                .governing(path)
                .filter(|rule| {
                    let owner = committer.is_some_and(|c| rule.is_owner(c));
                    !(owner || approved)
                })
                .map(|rule| RuleFailure {
                    pattern: rule.pattern().to_string(),
                    owners: rule.owners().to_vec(),
                })
                .collect();
            FileVerdict {
                path: path.clone(),
                failures,
            }
        })
        .collect();

    let any_unauthorized = verdicts.iter().any(|v| !v.is_authorized());
    Resolution {
        verdicts,
        any_unauthorized,
    }
}
