use serde::Deserialize;

/// GitHub Actions workflow run.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubWorkflowRun {
    /// Unique identifier for the workflow run
    pub id: u64,
    /// Name of the workflow
    #[serde(default)]
    pub name: Option<String>,
}

impl GitHubWorkflowRun {
    /// Identifier used for this run in reports: `<workflow name>#<run id>`.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{name}#{}", self.id),
            None => self.id.to_string(),
        }
    }
}

/// Job within a GitHub Actions workflow run.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubJob {
    /// Name of the job
    pub name: String,
    /// Status of the job (queued, in_progress, completed, ...)
    pub status: String,
    /// Conclusion of the job, set once completed
    #[serde(default)]
    pub conclusion: Option<String>,
}

impl GitHubJob {
    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }
}

/// A page of a paginated listing that reports its overall size.
pub trait Paginated {
    type Item;

    fn total_count(&self) -> usize;

    fn into_items(self) -> Vec<Self::Item>;
}

/// Response from GitHub API for workflow runs.
#[derive(Debug, Deserialize)]
pub struct WorkflowRunsResponse {
    pub total_count: usize,
    pub workflow_runs: Vec<GitHubWorkflowRun>,
}

impl Paginated for WorkflowRunsResponse {
    type Item = GitHubWorkflowRun;

    fn total_count(&self) -> usize {
        self.total_count
    }

    fn into_items(self) -> Vec<GitHubWorkflowRun> {
        self.workflow_runs
    }
}

/// Response from GitHub API for workflow jobs.
#[derive(Debug, Deserialize)]
pub struct WorkflowJobsResponse {
    pub total_count: usize,
    pub jobs: Vec<GitHubJob>,
}

impl Paginated for WorkflowJobsResponse {
    type Item = GitHubJob;

    fn total_count(&self) -> usize {
        self.total_count
    }

    fn into_items(self) -> Vec<GitHubJob> {
        self.jobs
    }
}
