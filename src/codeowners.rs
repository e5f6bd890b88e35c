//! CODEOWNERS-style ownership table
//!
//! Each significant line of the ownership file is `<pattern> <@owner>...`.
//! Blank lines and `#` comment lines are ignored, as are lines that name a
//! pattern without any owner.
//!
//! Patterns are matched against the changed path prefixed with `/`, as flat
//! strings: `*` matches any run of characters, path separators included. A
//! segment-aware matcher would change the meaning of every pattern that
//! contains a `/`, so that is deliberately not what happens here.

use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::error::{GateError, Result};

/// A pattern and the identities allowed to approve changes under it.
#[derive(Debug, Clone)]
pub struct OwnershipRule {
    pattern: String,
    /// `None` when a bracket set in the pattern can match no character.
    compiled: Option<Regex>,
    owners: Vec<String>,
}

impl PartialEq for OwnershipRule {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.owners == other.owners
    }
}

impl Eq for OwnershipRule {}

impl OwnershipRule {
    pub fn new(pattern: &str, owners: Vec<String>) -> std::result::Result<Self, regex::Error> {
        let compiled = match translate(pattern) {
            Some(re) => Some(Regex::new(&re)?),
            None => None,
        };
        Ok(Self {
            pattern: pattern.to_string(),
            compiled,
            owners,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn owners(&self) -> &[String] {
        &self.owners
    }

    pub fn is_owner(&self, identity: &str) -> bool {
        self.owners.iter().any(|o| o == identity)
    }

    /// Does this rule govern the match key (a path already rooted with `/`)?
    pub fn matches(&self, key: &str) -> bool {
        self.compiled.as_ref().is_some_and(|re| re.is_match(key))
    }
}

// ── Wildcard translation ─────────────────────────────────────────
//
// `*` is any run of characters (any number of stars in a row is one `*`),
// `?` is any single character, `[...]` is a set with `!` for negation and
// `a-z` ranges. A `[` without a closing `]` is literal. No character is
// special with respect to `/`.

/// Anchored regex for a wildcard pattern, or `None` if it can never match.
fn translate(pattern: &str) -> Option<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from(r"\A(?s:");
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => {
                while i < chars.len() && chars[i] == '*' {
                    i += 1;
                }
                out.push_str(".*");
            }
            '?' => out.push('.'),
            '[' => match set_end(&chars, i) {
                Some(end) => {
                    out.push_str(&translate_set(&chars[i..end])?);
                    i = end + 1;
                }
                None => out.push_str(r"\["),
            },
            c => push_literal(&mut out, c),
        }
    }

    out.push_str(r")\z");
    Some(out)
}

/// Index of the `]` closing a set whose body starts at `start`. A leading `!`
/// and then a leading `]` belong to the body.
fn set_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    while j < chars.len() && chars[j] != ']' {
        j += 1;
    }
    (j < chars.len()).then_some(j)
}

fn translate_set(body: &[char]) -> Option<String> {
    let (negated, body) = match body.split_first() {
        Some((&'!', rest)) => (true, rest),
        _ => (false, body),
    };

    let mut items = String::new();
    let mut k = 0;
    while k < body.len() {
        if k + 2 < body.len() && body[k + 1] == '-' {
            let (lo, hi) = (body[k], body[k + 2]);
            // Reversed ranges are empty.
            if lo <= hi {
                push_literal(&mut items, lo);
                items.push('-');
                push_literal(&mut items, hi);
            }
            k += 3;
        } else {
            push_literal(&mut items, body[k]);
            k += 1;
        }
    }

    match (negated, items.is_empty()) {
        (true, true) => Some(".".to_string()),
        (false, true) => None,
        (true, false) => Some(format!("[^{items}]")),
        (false, false) => Some(format!("[{items}]")),
    }
}

fn push_literal(out: &mut String, c: char) {
    let mut buf = [0u8; 4];
    out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

/// Ownership rules in file order. Built once, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnershipTable {
    rules: Vec<OwnershipRule>,
}

impl OwnershipTable {
    /// Load and parse an ownership file. An unreadable file is fatal: an
    /// empty table would authorize everything.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| GateError::OwnershipFile {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::parse(&text)?;
        debug!(
            path = %path.display(),
            rules = table.len(),
            "loaded ownership table"
        );
        Ok(table)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut table = Self::default();

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let Some(pattern) = tokens.next() else {
                continue;
            };
            let owners: Vec<String> = tokens.map(normalize_owner).collect();
            if owners.is_empty() {
                continue;
            }

            let rule = OwnershipRule::new(pattern, owners).map_err(|source| {
                GateError::InvalidPattern {
                    line: idx + 1,
                    pattern: pattern.to_string(),
                    source,
                }
            })?;
            table.insert(rule);
        }

        Ok(table)
    }

    /// Insert a rule. A repeated pattern replaces the owners of the earlier
    /// rule but keeps its position.
    pub fn insert(&mut self, rule: OwnershipRule) {
        match self.rules.iter_mut().find(|r| r.pattern == rule.pattern) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
    }

    pub fn rules(&self) -> &[OwnershipRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Every rule governing a repository-relative path.
    pub fn governing<'a>(&'a self, path: &str) -> impl Iterator<Item = &'a OwnershipRule> + 'a {
        let key = match_key(path);
        self.rules.iter().filter(move |r| r.matches(&key))
    }
}

/// Match key for a repository-relative path: patterns are rooted at `/`.
pub fn match_key(path: &str) -> String {
    format!("/{path}")
}

/// Drop the leading character of an owner token.
///
/// Owners are written `@login`, but the first character goes regardless of
/// what it is; existing ownership files rely on this.
fn normalize_owner(token: &str) -> String {
    let mut chars = token.chars();
    chars.next();
    chars.as_str().to_string()
}
