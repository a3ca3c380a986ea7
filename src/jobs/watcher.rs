use std::time::Duration;

use log::info;

use crate::error::Result;
use crate::output::{print_report, WaitProgress};
use crate::providers::github::{GitHubClient, GitHubJob};

use super::checker::Checker;
use super::verdict::{Conclusion, JobObservation, Verdict};

/// Delay between polls while required jobs are still running.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Polls GitHub for the jobs of a commit and feeds them into a [`Checker`].
pub struct Watcher {
    client: GitHubClient,
    checker: Checker,
    interval: Duration,
}

impl Watcher {
    pub fn new(client: GitHubClient, checker: Checker, interval: Duration) -> Self {
        Self {
            client,
            checker,
            interval,
        }
    }

    /// Records every job of every workflow run for `commit_sha`, prints the report and
    /// returns the resulting verdict.
    ///
    /// # Errors
    ///
    /// Fails on the first transport or API error; nothing is retried.
    pub async fn poll_all_required_jobs(&mut self, commit_sha: &str) -> Result<Verdict> {
        let runs = self.client.fetch_workflow_runs(commit_sha).await?;
        info!("Found {} workflow runs for commit {commit_sha}", runs.len());

        for run in &runs {
            let run_label = run.label();
            let jobs = self.client.fetch_jobs_for_run(run.id).await?;
            info!("Workflow run {run_label} has {} jobs", jobs.len());

            for job in &jobs {
                self.checker.record(&observe(&run_label, job));
            }
        }

        info!("Tracking {} required jobs", self.checker.required_count());
        print_report(&self.checker.report());
        Ok(self.checker.status())
    }

    /// Polls until every required job has finished and returns the final verdict.
    ///
    /// There is no deadline and no iteration cap: as long as jobs are running this keeps
    /// polling, and only the timeout of the surrounding CI job bounds it.
    pub async fn watch(&mut self, commit_sha: &str) -> Result<Verdict> {
        loop {
            let verdict = self.poll_all_required_jobs(commit_sha).await?;
            if verdict != Verdict::Running {
                info!("Final verdict for {commit_sha}: {verdict:?}");
                return Ok(verdict);
            }
            WaitProgress::wait(self.interval).await;
        }
    }
}

fn observe(run_label: &str, job: &GitHubJob) -> JobObservation {
    JobObservation {
        workflow_run_id: run_label.to_string(),
        job_name: job.name.clone(),
        completed: job.is_completed(),
        conclusion: job.conclusion.as_deref().map(Conclusion::from),
    }
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Mock, Server, ServerGuard};
    use serde_json::json;

    use super::*;

    async fn mock_runs(server: &mut ServerGuard, sha: &str, run_ids: &[u64]) -> Mock {
        let runs: Vec<_> = run_ids
            .iter()
            .map(|id| json!({"id": id, "name": "CI", "head_sha": sha}))
            .collect();
        server
            .mock("GET", "/repos/kata/gate/actions/runs")
            .match_query(Matcher::UrlEncoded("head_sha".into(), sha.into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"total_count": runs.len(), "workflow_runs": runs}).to_string())
            .create_async()
            .await
    }

    async fn mock_jobs(
        server: &mut ServerGuard,
        run_id: u64,
        jobs: &[(&str, &str, Option<&str>)],
    ) -> Mock {
        let jobs: Vec<_> = jobs
            .iter()
            .enumerate()
            .map(|(i, (name, status, conclusion))| {
                json!({"id": i, "name": name, "status": status, "conclusion": conclusion})
            })
            .collect();
        server
            .mock(
                "GET",
                format!("/repos/kata/gate/actions/runs/{run_id}/jobs").as_str(),
            )
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"total_count": jobs.len(), "jobs": jobs}).to_string())
            .create_async()
            .await
    }

    fn watcher(server: &ServerGuard, jobs: &[&str], regexps: &[&str]) -> Watcher {
        let client = GitHubClient::new(&server.url(), "kata/gate", None).unwrap();
        let checker = Checker::new(jobs, regexps).unwrap();
        Watcher::new(client, checker, Duration::ZERO)
    }

    #[test]
    fn test_observe_maps_job_fields() {
        let job = GitHubJob {
            name: "build".to_string(),
            status: "completed".to_string(),
            conclusion: Some("cancelled".to_string()),
        };

        let observation = observe("CI#4", &job);
        assert_eq!(
            observation,
            JobObservation::completed("CI#4", "build", Conclusion::Cancelled)
        );
    }

    #[tokio::test]
    async fn test_poll_aggregates_jobs_across_runs() {
        let mut server = Server::new_async().await;
        let _runs = mock_runs(&mut server, "abc", &[1, 2]).await;
        let _run_1 = mock_jobs(
            &mut server,
            1,
            &[
                ("build", "completed", Some("success")),
                ("lint", "completed", Some("failure")),
            ],
        )
        .await;
        let _run_2 = mock_jobs(&mut server, 2, &[("test-unit", "in_progress", None)]).await;

        let mut watcher = watcher(&server, &["build"], &["test-"]);
        let verdict = watcher.poll_all_required_jobs("abc").await.unwrap();

        // lint failed, but it isn't required
        assert_eq!(verdict, Verdict::Running);
        assert_eq!(watcher.checker.required_count(), 2);
        assert!(watcher.checker.report().contains("WARN: CI#2/test-unit - Still running"));
    }

    #[tokio::test]
    async fn test_poll_without_runs_fails_when_only_regexps_given() {
        let mut server = Server::new_async().await;
        let _runs = mock_runs(&mut server, "abc", &[]).await;

        let mut watcher = watcher(&server, &[], &["build"]);
        let verdict = watcher.poll_all_required_jobs("abc").await.unwrap();

        assert_eq!(verdict, Verdict::Fail);
    }

    #[tokio::test]
    async fn test_watch_returns_once_jobs_finish() {
        let mut server = Server::new_async().await;
        let _runs = mock_runs(&mut server, "abc", &[1]).await;
        let running = mock_jobs(&mut server, 1, &[("build", "in_progress", None)]).await;

        let mut watcher = watcher(&server, &["build"], &[]);
        assert_eq!(
            watcher.poll_all_required_jobs("abc").await.unwrap(),
            Verdict::Running
        );
        running.remove_async().await;
        let _finished = mock_jobs(&mut server, 1, &[("build", "completed", Some("success"))]).await;

        let verdict = watcher.watch("abc").await.unwrap();
        assert_eq!(verdict, Verdict::Pass);
    }

    #[tokio::test]
    async fn test_watch_stops_on_failure() {
        let mut server = Server::new_async().await;
        let _runs = mock_runs(&mut server, "abc", &[1]).await;
        let _jobs = mock_jobs(&mut server, 1, &[("build", "completed", Some("timed_out"))]).await;

        let mut watcher = watcher(&server, &["build"], &[]);
        let verdict = watcher.watch("abc").await.unwrap();

        assert_eq!(verdict, Verdict::Fail);
        assert_eq!(verdict.code(), 1);
    }

    #[tokio::test]
    async fn test_transport_errors_propagate() {
        let mut server = Server::new_async().await;
        let _runs = server
            .mock("GET", "/repos/kata/gate/actions/runs")
            .match_query(Matcher::Any)
            .with_status(502)
            .create_async()
            .await;

        let mut watcher = watcher(&server, &["build"], &[]);
        assert!(watcher.watch("abc").await.is_err());
    }
}
