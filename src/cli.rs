use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use crate::auth::Token;
use crate::config::TestSelectionConfig;
use crate::jobs::{Checker, Watcher, DEFAULT_POLL_INTERVAL};
use crate::output::print_skip_summary;
use crate::providers::GitHubClient;
use crate::skips::{changed_files, TestSelector};

#[derive(Parser)]
#[command(name = "gatekeeper")]
#[command(author, version, about = "Gate merges on required CI jobs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wait until every required job for a commit has finished
    Jobs {
        #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,

        #[arg(short = 'u', long, default_value = "https://api.github.com")]
        api_url: String,

        /// Repository in "owner/repo" form
        #[arg(short, long, env = "GITHUB_REPOSITORY")]
        repository: String,

        /// Full hash of the commit to watch
        #[arg(short, long, env = "COMMIT_HASH")]
        commit: String,

        /// Comma separated list of required job names
        #[arg(short = 'j', long, env = "REQUIRED_JOBS", value_delimiter = ',')]
        required_jobs: Vec<String>,

        /// Comma separated list of regexps matched against the start of job names
        #[arg(short = 'x', long, env = "REQUIRED_REGEXPS", value_delimiter = ',')]
        required_regexps: Vec<String>,

        /// Seconds to wait between polls while jobs are running
        #[arg(short, long, default_value_t = DEFAULT_POLL_INTERVAL.as_secs())]
        interval: u64,
    },
    /// Report which features or tests the current change needs
    Skips {
        /// Print required test names and regexps instead of skip flags
        #[arg(short, long, default_value_t = false)]
        tests: bool,

        #[arg(short = 'b', long, env = "TARGET_BRANCH", default_value = "main")]
        target_branch: String,

        #[arg(short, long, default_value = "required-tests.yaml")]
        config: PathBuf,

        /// Repository to diff
        #[arg(long, default_value = ".")]
        repo_dir: PathBuf,
    },
}

impl Cli {
    #[allow(clippy::too_many_arguments)]
    async fn execute_jobs(
        &self,
        token: Option<&str>,
        api_url: &str,
        repository: &str,
        commit: &str,
        required_jobs: &[String],
        required_regexps: &[String],
        interval: u64,
    ) -> Result<ExitCode> {
        info!("Watching required jobs of {repository}@{commit}");

        let checker = Checker::new(required_jobs, required_regexps)?;
        let client = GitHubClient::new(api_url, repository, api_token(token))?;
        let mut watcher = Watcher::new(client, checker, Duration::from_secs(interval));

        let verdict = watcher.watch(commit).await?;
        Ok(verdict.into())
    }

    async fn execute_skips(
        &self,
        tests: bool,
        target_branch: &str,
        config: &Path,
        repo_dir: &Path,
    ) -> Result<ExitCode> {
        let mut selection = Vec::new();
        write_selection(tests, target_branch, config, repo_dir, &mut selection).await?;

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&selection)?;
        stdout.flush()?;

        Ok(ExitCode::SUCCESS)
    }

    pub async fn execute(&self) -> Result<ExitCode> {
        match &self.command {
            Commands::Jobs {
                token,
                api_url,
                repository,
                commit,
                required_jobs,
                required_regexps,
                interval,
            } => {
                self.execute_jobs(
                    token.as_deref(),
                    api_url,
                    repository,
                    commit,
                    required_jobs,
                    required_regexps,
                    *interval,
                )
                .await
            }
            Commands::Skips {
                tests,
                target_branch,
                config,
                repo_dir,
            } => {
                self.execute_skips(*tests, target_branch, config, repo_dir)
                    .await
            }
        }
    }
}

/// Blank tokens (an exported but empty `GITHUB_TOKEN`) mean unauthenticated requests.
fn api_token(token: Option<&str>) -> Option<Token> {
    token.filter(|t| !t.trim().is_empty()).map(Token::from)
}

/// Writes either the required tests (`tests`) or the skip flags for the change in `repo_dir`.
async fn write_selection(
    tests: bool,
    target_branch: &str,
    config: &Path,
    repo_dir: &Path,
    out: &mut impl Write,
) -> Result<()> {
    let config = TestSelectionConfig::load(config)?;
    let selector = TestSelector::new(config)?;

    let changes = changed_files(repo_dir, target_branch)
        .await
        .with_context(|| format!("Failed to list changes against {target_branch}"))?;
    let enabled = selector.features_for_change(&changes);
    info!("Enabled features: {enabled:?}");

    if tests {
        selector.select_required_tests(&enabled).emit(out)?;
    } else {
        selector.emit_skip_report(&enabled, out)?;
        print_skip_summary(&selector.skip_statuses(&enabled));
    }
    Ok(())
}
