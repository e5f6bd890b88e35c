//! Pull-request context
//!
//! Squash-merged commits carry their PR as a trailing `(#1234)` in the subject
//! line. Review branches may also follow a `pr/<number>` naming convention.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static TITLE_PR_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(#([0-9]+)\)$").expect("valid PR suffix regex"));

/// Pull-request number, kept as the digit string it was written as.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PrNumber(String);

impl PrNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `title_to_pr("fixing XXXX-1234 (#4529)")` => `Some("4529")`
pub fn title_to_pr(title: &str) -> Option<PrNumber> {
    TITLE_PR_SUFFIX
        .captures(title)
        .and_then(|caps| caps.get(1))
        .map(|m| PrNumber(m.as_str().to_string()))
}

/// `ref_to_pr("pr/17")` => `Some("17")`
pub fn ref_to_pr(review_ref: &str) -> Option<PrNumber> {
    let digits = review_ref.trim().strip_prefix("pr/")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(PrNumber(digits.to_string()))
}

/// PR context for a commit. The title suffix wins; the review ref is only
/// consulted when the title carries no reference. Without a title (commit
/// lookup failed) there is no PR context.
pub fn resolve_pr(title: Option<&str>, review_ref: Option<&str>) -> Option<PrNumber> {
    let title = title?;
    title_to_pr(title).or_else(|| review_ref.and_then(ref_to_pr))
}
