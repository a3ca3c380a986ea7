use std::path::Path;

use log::info;
use tokio::process::Command;

use crate::error::{GatekeeperError, Result};

/// Lists the files changed in `repo_dir` relative to `origin/<target_branch>`.
///
/// The list is also echoed to stderr for the CI log.
///
/// # Errors
///
/// Returns an error if `git` cannot be spawned, exits unsuccessfully or prints something
/// that isn't UTF-8.
pub async fn changed_files(repo_dir: &Path, target_branch: &str) -> Result<Vec<String>> {
    let output = Command::new("git")
        .arg("diff")
        .arg("--name-only")
        .arg(format!("origin/{target_branch}"))
        .current_dir(repo_dir)
        .output()
        .await?;

    if !output.status.success() {
        return Err(GatekeeperError::Git(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    let changes = decode_name_only(output.stdout)?;
    info!("{} files changed against origin/{target_branch}", changes.len());
    eprintln!("{}", changes.join("\n"));

    Ok(changes)
}

/// Splits `git diff --name-only` output, rejecting anything that isn't UTF-8.
fn decode_name_only(stdout: Vec<u8>) -> Result<Vec<String>> {
    let stdout = String::from_utf8(stdout)
        .map_err(|e| GatekeeperError::Git(format!("output is not valid UTF-8: {e}")))?;
    Ok(parse_name_only(&stdout))
}

fn parse_name_only(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(ToString::to_string)
        .collect()
}
