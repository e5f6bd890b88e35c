//! Git-backed diff source
//!
//! Runs the git CLI in the working tree under review.

use std::path::Path;

use tracing::{debug, info};
use xshell::{cmd, Shell};

use super::{DiffSource, HeadCommit};
use crate::error::{GateError, Result};

pub struct GitDiffSource {
    sh: Shell,
}

impl GitDiffSource {
    pub fn new(repo_dir: &Path) -> Result<Self> {
        let sh = Shell::new().map_err(|e| git_error("shell", e))?;
        sh.change_dir(repo_dir);
        Ok(Self { sh })
    }

    /// Most recent tag reachable from the parent of HEAD. A failing describe
    /// (no tag, or HEAD has no parent) means there is nothing to compare.
    pub fn last_tag(&self) -> Option<String> {
        let sh = &self.sh;
        match cmd!(sh, "git describe --tags --abbrev=0 HEAD^")
            .quiet()
            .ignore_stderr()
            .read()
        {
            Ok(out) => non_empty_lines(&out).next().map(str::to_string),
            Err(e) => {
                debug!(error = %e, "no tag reachable from HEAD^");
                None
            }
        }
    }
}

impl DiffSource for GitDiffSource {
    fn changed_files(&self) -> Result<Vec<String>> {
        let Some(tag) = self.last_tag() else {
            info!("no release tag found, nothing to check");
            return Ok(Vec::new());
        };

        let sh = &self.sh;
        let out = cmd!(sh, "git diff --name-only {tag} HEAD")
            .quiet()
            .read()
            .map_err(|e| git_error("diff", e))?;
        let files: Vec<String> = non_empty_lines(&out).map(str::to_string).collect();
        info!(tag = %tag, changed = files.len(), "collected changed files");
        Ok(files)
    }

    fn head_commit(&self) -> Result<HeadCommit> {
        let sh = &self.sh;
        let out = cmd!(sh, "git log -1 --pretty=%H%n%s")
            .quiet()
            .read()
            .map_err(|e| git_error("log", e))?;

        let mut lines = out.lines().map(str::trim);
        let sha = lines.next().filter(|s| !s.is_empty()).ok_or_else(|| GateError::Git {
            command: "log".to_string(),
            message: "no commit hash in output".to_string(),
        })?;
        let subject = lines.next().unwrap_or_default();
        debug!(sha, subject, "head commit");

        Ok(HeadCommit {
            sha: sha.to_string(),
            subject: subject.to_string(),
        })
    }

    fn review_ref(&self) -> Result<Option<String>> {
        let sh = &self.sh;
        let out = cmd!(sh, "git rev-parse --abbrev-ref HEAD")
            .quiet()
            .read()
            .map_err(|e| git_error("rev-parse", e))?;
        let name = out.trim();
        // Detached HEAD reports the literal "HEAD".
        if name.is_empty() || name == "HEAD" {
            return Ok(None);
        }
        Ok(Some(name.to_string()))
    }
}

fn non_empty_lines(out: &str) -> impl Iterator<Item = &str> {
    out.lines().map(str::trim).filter(|l| !l.is_empty())
}

fn git_error(command: &str, err: xshell::Error) -> GateError {
    GateError::Git {
        command: command.to_string(),
        message: err.to_string(),
    }
}
