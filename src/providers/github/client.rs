use std::time::Duration;

use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::Token;
use crate::error::{GatekeeperError, Result};

use super::types::{
    GitHubJob, GitHubWorkflowRun, Paginated, WorkflowJobsResponse, WorkflowRunsResponse,
};

const PAGE_SIZE: usize = 100;
const REQUEST_TIMEOUT_SECONDS: u64 = 60;

/// GitHub Actions REST client for reading workflow runs and their jobs.
///
/// Requests are never retried: any network failure or non-2xx response is returned to the
/// caller as is.
pub struct GitHubClient {
    client: Client,
    /// `{base}/repos/{owner}/{repo}/`
    repo_url: Url,
    token: Option<Token>,
}

impl GitHubClient {
    /// Create a new GitHub API client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - GitHub API base URL (e.g., "https://api.github.com")
    /// * `repository` - Repository path in format "owner/repo"
    /// * `token` - Optional GitHub token; requests are unauthenticated without it
    ///
    /// # Errors
    ///
    /// Returns an error if the repository path or base URL is malformed, or if the HTTP
    /// client cannot be built.
    pub fn new(base_url: &str, repository: &str, token: Option<Token>) -> Result<Self> {
        let (owner, repo) = repository
            .split_once('/')
            .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty() && !repo.contains('/'))
            .ok_or_else(|| {
                GatekeeperError::Config(format!(
                    "Repository must be in format 'owner/repo', got '{repository}'"
                ))
            })?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );

        let client = Client::builder()
            .user_agent(concat!("gatekeeper/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .build()
            .map_err(|e| GatekeeperError::Config(format!("Failed to create HTTP client: {e}")))?;

        let base = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let repo_url = Url::parse(&base)
            .map_err(|e| GatekeeperError::Config(format!("Invalid base URL: {e}")))?
            .join(&format!("repos/{owner}/{repo}/"))
            .map_err(|e| GatekeeperError::Config(format!("Invalid repository URL: {e}")))?;

        Ok(Self {
            client,
            repo_url,
            token,
        })
    }

    /// Helper to build authenticated requests
    fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.token {
            request.bearer_auth(token.as_str())
        } else {
            request
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.repo_url
            .join(path)
            .map_err(|e| GatekeeperError::Config(format!("Invalid endpoint URL: {e}")))
    }

    /// Fetch every workflow run whose head commit is `head_sha`.
    pub async fn fetch_workflow_runs(&self, head_sha: &str) -> Result<Vec<GitHubWorkflowRun>> {
        let mut url = self.endpoint("actions/runs")?;
        url.query_pairs_mut().append_pair("head_sha", head_sha);

        self.fetch_all::<WorkflowRunsResponse>(url).await
    }

    /// Fetch all jobs of a workflow run, following pagination.
    pub async fn fetch_jobs_for_run(&self, run_id: u64) -> Result<Vec<GitHubJob>> {
        let url = self.endpoint(&format!("actions/runs/{run_id}/jobs"))?;

        self.fetch_all::<WorkflowJobsResponse>(url).await
    }

    /// Requests pages of a fixed size until the accumulated item count reaches the largest
    /// `total_count` reported so far.
    async fn fetch_all<P>(&self, endpoint: Url) -> Result<Vec<P::Item>>
    where
        P: Paginated + DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut total_count = 0;
        let mut page = 1;

        loop {
            let mut url = endpoint.clone();
            url.query_pairs_mut()
                .append_pair("per_page", &PAGE_SIZE.to_string())
                .append_pair("page", &page.to_string());

            let response: P = self.get_json(url).await?;
            total_count = total_count.max(response.total_count());
            let page_items = response.into_items();

            // An empty page would otherwise loop forever against a stale total.
            if page_items.is_empty() {
                if items.len() < total_count {
                    warn!(
                        "Page {page} of {endpoint} was empty after {} of {total_count} items",
                        items.len()
                    );
                }
                break;
            }

            items.extend(page_items);
            if items.len() >= total_count {
                break;
            }
            page += 1;
        }

        debug!("Fetched {} items from {endpoint}", items.len());
        Ok(items)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.auth_request(self.client.get(url)).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(GatekeeperError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
