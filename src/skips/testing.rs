use std::fs;
use std::path::Path;
use std::process::Command;

fn git(repo: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(["-c", "user.name=gatekeeper", "-c", "user.email=gatekeeper@example.com"])
        .args(["-c", "commit.gpgsign=false"])
        .args(args)
        .current_dir(repo)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

pub fn write_file(repo: &Path, path: &str, contents: &str) {
    let path = repo.join(path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Initialises `repo` with one commit holding `files` and points `origin/main` at it.
pub fn init_repo(repo: &Path, files: &[&str]) {
    git(repo, &["init", "-q"]);
    for file in files {
        write_file(repo, file, "initial\n");
    }
    git(repo, &["add", "-A"]);
    git(repo, &["commit", "-q", "-m", "initial"]);
    git(repo, &["update-ref", "refs/remotes/origin/main", "HEAD"]);
}
