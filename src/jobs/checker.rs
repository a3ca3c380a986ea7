use std::collections::BTreeMap;

use log::debug;

use crate::error::{GatekeeperError, Result};
use crate::rules::{MatchMode, RuleTable};

use super::verdict::{JobObservation, JobResult, Verdict};

/// Per-run results for a single required job, keyed by workflow run identifier.
type RunResults = BTreeMap<String, JobResult>;

/// Tracks every required job across workflow runs and folds them into one [`Verdict`].
///
/// Jobs become required either by being listed explicitly or by matching one of the
/// required-job patterns at the start of their name. Once a job name is in the registry it
/// stays there for the lifetime of the checker.
#[derive(Debug)]
pub struct Checker {
    required_regexps: RuleTable<()>,
    results: BTreeMap<String, RunResults>,
}

impl Checker {
    /// Creates a checker for the given required job names and job-name patterns.
    ///
    /// Blank entries are ignored, which lets callers pass raw comma-separated input.
    ///
    /// # Errors
    ///
    /// Returns an error if neither a job nor a pattern is left after filtering, or if a
    /// pattern doesn't compile.
    pub fn new<S: AsRef<str>>(required_jobs: &[S], required_regexps: &[S]) -> Result<Self> {
        let jobs: Vec<&str> = non_blank(required_jobs).collect();
        let regexps = RuleTable::from_pairs(
            MatchMode::Prefix,
            non_blank(required_regexps).map(|pattern| (pattern, ())),
        )?;

        if jobs.is_empty() && regexps.is_empty() {
            return Err(GatekeeperError::Config(
                "No required jobs or required job regexps defined".to_string(),
            ));
        }

        let results = jobs
            .into_iter()
            .map(|job| (job.to_string(), RunResults::new()))
            .collect();

        Ok(Self {
            required_regexps: regexps,
            results,
        })
    }

    /// Records one job observation.
    ///
    /// Jobs that are neither listed nor matched by a pattern are dropped without touching
    /// the registry. A later observation for the same job and run replaces the earlier one.
    ///
    /// Returns `true` while the job is still pending, `false` once it finished (either way)
    /// or when it isn't required at all.
    pub fn record(&mut self, observation: &JobObservation) -> bool {
        let name = observation.job_name.as_str();
        if !self.results.contains_key(name) {
            if self.required_regexps.first_match(name).is_none() {
                debug!("Ignoring job '{name}' which is not required");
                return false;
            }
            debug!("Job '{name}' is required via regexp");
            self.results.insert(name.to_string(), RunResults::new());
        }

        let result = observation.result();
        let pending = result == JobResult::Running;
        debug!("{}/{name} -> {result:?}", observation.workflow_run_id);

        if let Some(runs) = self.results.get_mut(name) {
            runs.insert(observation.workflow_run_id.clone(), result);
        }
        pending
    }

    /// Current aggregate verdict.
    ///
    /// - nothing recorded at all is a failure, never a wait
    /// - any failed run of any job fails the whole gate immediately
    /// - jobs still running, or required but never seen, keep the gate running
    /// - otherwise every job has been seen and every run passed
    pub fn status(&self) -> Verdict {
        if self.results.is_empty() {
            return Verdict::Fail;
        }

        let mut running = false;
        for runs in self.results.values() {
            if runs.is_empty() {
                running = true;
                continue;
            }
            for result in runs.values() {
                match result {
                    JobResult::Running => running = true,
                    JobResult::Failed(_) => return Verdict::Fail,
                    JobResult::Pass => {}
                }
            }
        }

        if running {
            Verdict::Running
        } else {
            Verdict::Pass
        }
    }

    /// Renders a sorted line per observation followed by a one-line summary.
    pub fn report(&self) -> String {
        let mut lines = Vec::new();
        for (job, runs) in &self.results {
            if runs.is_empty() {
                lines.push(format!("WARN: {job} - No results so far"));
                continue;
            }
            for (run, result) in runs {
                lines.push(match result {
                    JobResult::Running => format!("WARN: {run}/{job} - Still running"),
                    JobResult::Pass => format!("PASS: {run}/{job} - success"),
                    JobResult::Failed(conclusion) => {
                        format!("FAIL: {run}/{job} - Not passed - {conclusion}")
                    }
                });
            }
        }
        lines.sort();

        format!("{}\n\n{}", lines.join("\n"), self.status().summary())
    }

    /// Number of job names currently known to be required.
    pub fn required_count(&self) -> usize {
        self.results.len()
    }
}

fn non_blank<S: AsRef<str>>(items: &[S]) -> impl Iterator<Item = &str> {
    items
        .iter()
        .map(|item| item.as_ref().trim())
        .filter(|item| !item.is_empty())
}
