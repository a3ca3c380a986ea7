use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::pending;

/// Spinner shown while waiting for the next poll.
pub struct WaitProgress {
    pb: ProgressBar,
}

impl WaitProgress {
    fn start(interval: Duration) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("  {msg} {spinner} {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(
            pending(format!(
                "Some jobs are still running, polling again in {}s",
                interval.as_secs()
            ))
            .to_string(),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        Self { pb }
    }

    /// Sleeps for `interval` with a spinner on stderr.
    pub async fn wait(interval: Duration) {
        let progress = Self::start(interval);
        tokio::time::sleep(interval).await;
        progress.pb.finish_and_clear();
    }
}
