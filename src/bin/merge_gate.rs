//! merge-gate CLI
//!
//! Fails the build when the committer of `HEAD` is not allowed to merge the
//! files changed since the last release tag.
//!
//! Usage:
//!   GITHUB_TOKEN=... merge-gate --repo acme/widgets
//!   GITHUB_TOKEN=... merge-gate --repo acme/widgets --codeowners CODEOWNERS --json
//!
//! Exit status is 0 when every changed file is authorized, non-zero otherwise
//! (including configuration errors).

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use merge_gate::config::{GateConfig, DEFAULT_CODEOWNERS};
use merge_gate::sources::github::DEFAULT_API_URL;
use merge_gate::sources::{GitDiffSource, GitHubClient};
use merge_gate::{run_gate, OwnershipTable, Report};

#[derive(Parser, Debug)]
#[command(name = "merge-gate")]
#[command(about = "Check that the HEAD committer may merge the files changed since the last tag")]
struct Args {
    /// Ownership file, relative to --repo-dir unless absolute
    #[arg(long, env = "MERGE_GATE_CODEOWNERS", default_value = DEFAULT_CODEOWNERS)]
    codeowners: PathBuf,

    /// Repository on the code-hosting platform, as owner/name
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repo: String,

    /// API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Ref under review (e.g. pr/123); read from git when omitted
    #[arg(long, env = "MERGE_GATE_REVIEW_REF")]
    review_ref: Option<String>,

    /// Working tree to inspect
    #[arg(long, default_value = ".")]
    repo_dir: PathBuf,

    /// Also print a JSON report to stdout
    #[arg(long)]
    json: bool,

    /// Debug logging for merge-gate
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = GateConfig::new(
        args.codeowners,
        args.repo_dir,
        args.review_ref,
        &args.api_url,
        &args.repo,
        std::env::var(merge_gate::config::TOKEN_ENV).ok(),
    )
    .context("invalid configuration")?;

    let table = OwnershipTable::load(&config.codeowners_path())
        .context("failed to load ownership table")?;
    let diff = GitDiffSource::new(&config.repo_dir).context("failed to open repository")?;
    let reviews = GitHubClient::new(config.api.clone()).context("failed to create API client")?;

    let outcome = run_gate(&table, &diff, &reviews, config.review_ref.as_deref())
        .context("failed to collect changes")?;

    let report = Report::from_outcome(&outcome);
    report.emit();
    if args.json {
        println!("{}", report.to_json().context("failed to serialize report")?);
    }

    Ok(report.exit_code())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("warn,merge_gate=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,merge_gate=info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
