use std::fmt;
use std::process::ExitCode;

/// Aggregate decision for every required job of a watched commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
    Running,
}

impl Verdict {
    /// Process exit code for this verdict.
    ///
    /// `Running` has a code of its own but the watch loop never exits with it.
    pub fn code(self) -> u8 {
        match self {
            Self::Pass => 0,
            Self::Fail => 1,
            Self::Running => 127,
        }
    }

    /// One-line human summary used at the end of the report.
    pub fn summary(self) -> &'static str {
        match self {
            Self::Pass => "All required jobs passed",
            Self::Fail => "Not all required jobs passed!",
            Self::Running => "Some jobs are still running.",
        }
    }
}

impl From<Verdict> for ExitCode {
    fn from(verdict: Verdict) -> Self {
        ExitCode::from(verdict.code())
    }
}

/// Terminal outcome reported by the CI provider for a finished job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conclusion {
    Success,
    Failure,
    Cancelled,
    Other(String),
}

impl Conclusion {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Cancelled => "cancelled",
            Self::Other(other) => other,
        }
    }
}

impl From<&str> for Conclusion {
    fn from(value: &str) -> Self {
        match value {
            "success" => Self::Success,
            "failure" => Self::Failure,
            "cancelled" => Self::Cancelled,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Conclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last known state of one job within one workflow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobResult {
    Running,
    Pass,
    /// Finished without success; holds the conclusion string.
    Failed(String),
}

/// A single observation of a job, as produced by one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobObservation {
    pub workflow_run_id: String,
    pub job_name: String,
    pub completed: bool,
    /// Only meaningful once `completed` is set.
    pub conclusion: Option<Conclusion>,
}

impl JobObservation {
    /// Maps the observation onto the state the registry stores.
    pub fn result(&self) -> JobResult {
        if !self.completed {
            return JobResult::Running;
        }
        match &self.conclusion {
            Some(Conclusion::Success) => JobResult::Pass,
            Some(conclusion) => JobResult::Failed(conclusion.to_string()),
            None => JobResult::Failed("unknown".to_string()),
        }
    }
}

#[cfg(test)]
impl JobObservation {
    pub fn running(workflow_run_id: &str, job_name: &str) -> Self {
        Self {
            workflow_run_id: workflow_run_id.to_string(),
            job_name: job_name.to_string(),
            completed: false,
            conclusion: None,
        }
    }

    pub fn completed(workflow_run_id: &str, job_name: &str, conclusion: Conclusion) -> Self {
        Self {
            workflow_run_id: workflow_run_id.to_string(),
            job_name: job_name.to_string(),
            completed: true,
            conclusion: Some(conclusion),
        }
    }
}
