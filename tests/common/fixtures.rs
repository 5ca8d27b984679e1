//! Real temporary git repositories for engine tests

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// A throwaway git repository on disk.
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Initialize an empty repository with a committer identity.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let repo = Self { dir };
        repo.git(&["init", "-b", "main"]);
        repo.git(&["config", "user.name", "Split Tester"]);
        repo.git(&["config", "user.email", "tester@example.com"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Run a git command, asserting success; returns stdout.
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.dir.path())
            .output()
            .expect("run git");
        assert!(
            output.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    /// Write a file, creating parent directories as needed.
    pub fn write(&self, rel: &str, content: &str) {
        let target = self.dir.path().join(rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(target, content).expect("write file");
    }

    /// Delete a file from the work tree.
    pub fn delete(&self, rel: &str) {
        fs::remove_file(self.dir.path().join(rel)).expect("remove file");
    }

    /// Stage everything and commit.
    pub fn commit_all(&self, message: &str) {
        self.git(&["add", "-A"]);
        self.git(&["commit", "-m", message]);
    }

    /// Create and check out `branch` off main, with main as its upstream.
    pub fn branch_with_upstream(&self, branch: &str) {
        self.git(&["checkout", "-b", branch, "main"]);
        self.git(&["branch", "--set-upstream-to=main", branch]);
    }

    /// Short names of all local branches.
    pub fn branches(&self) -> Vec<String> {
        self.git(&["for-each-ref", "--format=%(refname:short)", "refs/heads"])
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Full commit message at the tip of `branch`.
    pub fn head_message(&self, branch: &str) -> String {
        self.git(&["log", "-1", "--format=%B", branch])
    }

    /// All file paths recorded in `branch`'s tree.
    pub fn tree_files(&self, branch: &str) -> Vec<String> {
        self.git(&["ls-tree", "-r", "--name-only", branch])
            .lines()
            .map(str::to_string)
            .collect()
    }
}
