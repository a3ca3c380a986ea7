mod progress;
mod report;
mod styling;
mod tables;

pub use progress::WaitProgress;
pub use report::print_report;
pub use tables::print_skip_summary;

use styling::{muted, title};

/// Prints the gatekeeper banner to stderr.
///
/// stdout is reserved for the report and the skip/test output consumed by other CI steps.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        title("🚦 gatekeeper"),
        muted(env!("CARGO_PKG_VERSION")),
        muted("Required CI jobs and test selection")
    );
}
