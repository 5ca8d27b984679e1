//! Git working-copy access via child processes
//!
//! Thin wrapper over the `git` binary. Every operation is a blocking
//! subprocess call with captured output; a nonzero exit surfaces as a
//! structured [`ProcessFailure`] carrying the command line, exit code,
//! both output streams and the working directory.

use crate::error::{Error, ProcessFailure, Result};
use crate::types::{ChangedFile, FileAction};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Handle to one git work tree.
pub struct GitWorkspace {
    root: PathBuf,
}

impl GitWorkspace {
    /// Locate the work tree containing `path`.
    pub fn discover(path: &Path) -> Result<Self> {
        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .current_dir(path)
            .output()?;
        if !output.status.success() {
            return Err(Error::NotARepository);
        }
        let root = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
        Ok(Self { root })
    }

    /// Absolute path of the repository root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path for a repository-relative one.
    #[must_use]
    pub fn abs_path(&self, repo_relative: &str) -> PathBuf {
        self.root.join(repo_relative)
    }

    /// Run a git command in the repository root and return its stdout.
    pub fn run<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<OsString> = args
            .into_iter()
            .map(|a| a.as_ref().to_os_string())
            .collect();
        debug!("git {:?}", args);

        let output = Command::new("git")
            .args(&args)
            .current_dir(&self.root)
            .output()?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let command = std::iter::once("git".to_string())
                .chain(args.iter().map(|a| a.to_string_lossy().into_owned()))
                .collect::<Vec<_>>()
                .join(" ");
            Err(ProcessFailure {
                command,
                exit_code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                cwd: self.root.clone(),
            }
            .into())
        }
    }

    /// Name of the checked-out branch, or `None` on a detached HEAD.
    pub fn current_branch(&self) -> Result<Option<String>> {
        // symbolic-ref -q exits 1 on a detached HEAD; that is an answer,
        // not a failure.
        match self.run(["symbolic-ref", "--short", "-q", "HEAD"]) {
            Ok(out) => Ok(Some(out.trim().to_string())),
            Err(Error::Process(failure)) if failure.exit_code == Some(1) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Short name of `branch`'s upstream, or `None` if none is configured.
    pub fn upstream(&self, branch: &str) -> Result<Option<String>> {
        let upstream_ref = format!("{branch}@{{upstream}}");
        match self.run(["rev-parse", "--abbrev-ref", upstream_ref.as_str()]) {
            Ok(out) => Ok(Some(out.trim().to_string())),
            Err(Error::Process(failure)) if failure.exit_code == Some(128) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Merge base of `branch` and `upstream`.
    pub fn common_ancestor(&self, branch: &str, upstream: &str) -> Result<String> {
        Ok(self.run(["merge-base", branch, upstream])?.trim().to_string())
    }

    /// A config value, or `None` when the key is unset.
    pub fn config(&self, key: &str) -> Result<Option<String>> {
        match self.run(["config", "--get", key]) {
            Ok(out) => {
                let value = out.trim();
                if value.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(value.to_string()))
                }
            }
            Err(Error::Process(failure)) if failure.exit_code == Some(1) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// `user.email`, trimmed; `None` when unset.
    pub fn user_email(&self) -> Result<Option<String>> {
        self.config("user.email")
    }

    /// Short names of all local branches.
    pub fn local_branches(&self) -> Result<Vec<String>> {
        let out = self.run(["for-each-ref", "--format=%(refname:short)", "refs/heads"])?;
        Ok(out.lines().map(str::to_string).collect())
    }

    /// Changed files between `base` and the work tree, with rename and
    /// copy detection. Renames and copies report the destination path.
    pub fn capture_status(&self, base: &str) -> Result<Vec<ChangedFile>> {
        let out = self.run(["diff", "--no-ext-diff", "--name-status", "-C", base])?;
        Ok(parse_name_status(&out))
    }

    /// Create and check out `name` tracking `upstream`.
    pub fn create_tracking_branch(&self, name: &str, upstream: &str) -> Result<()> {
        self.run(["checkout", "-t", upstream, "-b", name]).map(drop)
    }

    /// Check out an existing branch.
    pub fn checkout_branch(&self, name: &str) -> Result<()> {
        self.run(["checkout", name]).map(drop)
    }

    /// Restore `paths` from `source` into the index and work tree.
    pub fn checkout_files_from(&self, source: &str, paths: &[PathBuf]) -> Result<()> {
        let mut args: Vec<OsString> = vec!["checkout".into(), source.into(), "--".into()];
        args.extend(paths.iter().map(|p| p.as_os_str().to_os_string()));
        self.run(args).map(drop)
    }

    /// Remove `paths` from the index and work tree.
    pub fn remove_files(&self, paths: &[PathBuf]) -> Result<()> {
        let mut args: Vec<OsString> = vec!["rm".into()];
        args.extend(paths.iter().map(|p| p.as_os_str().to_os_string()));
        self.run(args).map(drop)
    }

    /// Commit staged changes with the message read from `message_file`.
    pub fn commit_from_file(&self, message_file: &Path) -> Result<()> {
        let args: Vec<&OsStr> = vec!["commit".as_ref(), "-F".as_ref(), message_file.as_os_str()];
        self.run(args).map(drop)
    }
}

fn parse_name_status(out: &str) -> Vec<ChangedFile> {
    out.lines()
        .filter_map(|line| {
            let mut parts = line.split('\t');
            let tag = parts.next()?.trim();
            if tag.is_empty() {
                return None;
            }
            // Rename/copy records carry two paths; the destination is the
            // one that exists on the branch.
            let path = match tag.chars().next()? {
                'R' | 'C' => parts.nth(1)?,
                _ => parts.next()?,
            };
            Some(ChangedFile::new(FileAction::from_status(tag), path))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_status_simple() {
        let parsed = parse_name_status("M\tfoo/bar.cc\nA\tbaz.h\nD\tgone.txt\n");
        assert_eq!(
            parsed,
            vec![
                ChangedFile::new(FileAction::Modified, "foo/bar.cc"),
                ChangedFile::new(FileAction::Added, "baz.h"),
                ChangedFile::new(FileAction::Deleted, "gone.txt"),
            ]
        );
    }

    #[test]
    fn test_parse_name_status_rename_takes_destination() {
        let parsed = parse_name_status("R095\told/name.rs\tnew/name.rs\n");
        assert_eq!(
            parsed,
            vec![ChangedFile::new(FileAction::Renamed, "new/name.rs")]
        );
    }

    #[test]
    fn test_parse_name_status_skips_blank_lines() {
        assert!(parse_name_status("\n\n").is_empty());
    }
}
