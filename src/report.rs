//! Report and exit status
//!
//! Turns a resolved gate into the CI-facing output: one `ERROR:` line per
//! unauthorized file, an optional JSON summary, and the process exit status.

use std::process::ExitCode;

use serde::Serialize;

use crate::pr::PrNumber;
use crate::resolver::{ApproverSet, Resolution};
use crate::GateOutcome;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnauthorizedFile {
    pub file: String,
    pub required_owners: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub authorized: bool,
    pub committer: Option<String>,
    pub pr: Option<PrNumber>,
    pub approvers: ApproverSet,
    pub changed_files: usize,
    pub unauthorized: Vec<UnauthorizedFile>,
}

impl Report {
    pub fn from_resolution(resolution: &Resolution) -> Self {
        let unauthorized: Vec<UnauthorizedFile> = resolution
            .unauthorized()
            .map(|v| UnauthorizedFile {
                file: v.path.clone(),
                required_owners: v.required_owners(),
            })
            .collect();

        Self {
            authorized: !resolution.any_unauthorized,
            committer: None,
            pr: None,
            approvers: ApproverSet::new(),
            changed_files: resolution.verdicts.len(),
            unauthorized,
        }
    }

    pub fn from_outcome(outcome: &GateOutcome) -> Self {
        Self {
            committer: outcome.committer.clone(),
            pr: outcome.pr.clone(),
            approvers: outcome.approvers.clone(),
            ..Self::from_resolution(&outcome.resolution)
        }
    }

    pub fn diagnostic_lines(&self) -> Vec<String> {
        self.unauthorized
            .iter()
            .map(|u| format!("ERROR: {} requires approval from {:?}", u.file, u.required_owners))
            .collect()
    }

    /// Write the diagnostics to stderr.
    pub fn emit(&self) {
        for line in self.diagnostic_lines() {
            eprintln!("{line}");
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.authorized {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}
