//! Branch creation, selective checkout, commit and upload for one group

use crate::error::{Error, Result};
use crate::git::GitWorkspace;
use crate::split::progress::SplitProgress;
use crate::types::{ChangeGroup, ReviewerSet};
use std::collections::HashSet;
use std::io::Write;
use tempfile::NamedTempFile;
use tracing::debug;

/// Token replaced with the group's directory list in descriptions and
/// comments.
pub const DIRECTORY_PLACEHOLDER: &str = "$directory";

/// Upload transport seam.
///
/// The production implementation shells out to `git cl`; tests record
/// the calls instead.
pub trait Uploader {
    /// Upload the currently checked-out branch with `args`; returns the
    /// upload command's exit code. Nonzero is a recoverable condition
    /// reported to the caller, not an error.
    fn upload(&self, args: &[String]) -> Result<i32>;

    /// Publish a comment on the change uploaded from the current branch.
    fn add_comment(&self, message: &str) -> Result<()>;
}

/// Uploader backed by `git cl` running in the workspace.
pub struct GitClUploader<'a> {
    workspace: &'a GitWorkspace,
}

impl<'a> GitClUploader<'a> {
    /// Wrap a workspace.
    #[must_use]
    pub const fn new(workspace: &'a GitWorkspace) -> Self {
        Self { workspace }
    }
}

impl Uploader for GitClUploader<'_> {
    fn upload(&self, args: &[String]) -> Result<i32> {
        let mut cmd = vec!["cl".to_string(), "upload".to_string()];
        cmd.extend_from_slice(args);
        match self.workspace.run(cmd) {
            Ok(_) => Ok(0),
            Err(Error::Process(failure)) => Ok(failure.exit_code.unwrap_or(1)),
            Err(err) => Err(err),
        }
    }

    fn add_comment(&self, message: &str) -> Result<()> {
        self.workspace
            .run(["cl", "comments", "-a", message])
            .map(drop)
    }
}

/// Everything needed to turn one assignment group into an uploaded change.
#[derive(Debug, Clone)]
pub struct UploadRequest<'a> {
    /// Branch being split; also the branch-name prefix
    pub refactor_branch: &'a str,
    /// Upstream the split branches are created from
    pub upstream: &'a str,
    /// Files and directories of this group
    pub group: &'a ChangeGroup,
    /// Reviewers for this change
    pub reviewers: &'a ReviewerSet,
    /// Description template (may contain [`DIRECTORY_PLACEHOLDER`])
    pub description: &'a str,
    /// Comment to publish after upload, if any
    pub comment: Option<&'a str>,
    /// Request a CQ dry run on upload
    pub cq_dry_run: bool,
    /// Enable auto-submit on upload
    pub enable_auto_submit: bool,
    /// Topic to set on upload, if any
    pub topic: Option<&'a str>,
}

/// Format a directory list for printing: a single directory bare, several
/// as a bracketed list.
#[must_use]
pub fn format_directories(directories: &[String]) -> String {
    if directories.len() == 1 {
        directories[0].clone()
    } else {
        format!("[{}]", directories.join(", "))
    }
}

/// Replace every [`DIRECTORY_PLACEHOLDER`] in `text` with the formatted
/// directory list.
#[must_use]
pub fn expand_directory_placeholder(text: &str, directories: &[String]) -> String {
    text.replace(DIRECTORY_PLACEHOLDER, &format_directories(directories))
}

/// Branch name for a group: `<prefix>_<first directory>_split`.
#[must_use]
pub fn split_branch_name(prefix: &str, directories: &[String]) -> String {
    format!("{prefix}_{}_split", directories[0])
}

/// Create a branch for one group, apply its files, commit and upload.
///
/// Skips the group (with a notice) when its branch already exists, which
/// is what makes an interrupted run resumable. A failed upload is
/// reported but does not abort; any git failure does.
pub fn upload_change(
    workspace: &GitWorkspace,
    uploader: &dyn Uploader,
    progress: &dyn SplitProgress,
    request: &UploadRequest<'_>,
) -> Result<()> {
    let directories = &request.group.directories;
    let printable = format_directories(directories);
    let branch_name = split_branch_name(request.refactor_branch, directories);

    let existing: HashSet<String> = workspace.local_branches()?.into_iter().collect();
    if existing.contains(&branch_name) {
        progress.on_message(&format!(
            "Skipping {printable} for which a branch already exists."
        ));
        return Ok(());
    }

    workspace.create_tracking_branch(&branch_name, request.upstream)?;
    debug!("created {branch_name} tracking {}", request.upstream);

    let mut deleted = Vec::new();
    let mut modified = Vec::new();
    for file in &request.group.files {
        let abspath = workspace.abs_path(&file.path);
        if file.action.is_deletion() {
            deleted.push(abspath);
        } else {
            modified.push(abspath);
        }
    }
    if !deleted.is_empty() {
        workspace.remove_files(&deleted)?;
    }
    if !modified.is_empty() {
        workspace.checkout_files_from(request.refactor_branch, &modified)?;
    }

    // Commit via a transient file so the description never passes through
    // a shell. The file is removed on every exit path, including errors.
    {
        let mut message_file = NamedTempFile::new()?;
        message_file
            .write_all(expand_directory_placeholder(request.description, directories).as_bytes())?;
        message_file.flush()?;
        workspace.commit_from_file(message_file.path())?;
    }

    progress.on_message(&format!("Uploading change for {printable}..."));
    let status = uploader.upload(&build_upload_args(request))?;
    if status != 0 {
        progress.on_upload_failed(&branch_name);
    }

    if let Some(comment) = request.comment {
        uploader.add_comment(&expand_directory_placeholder(comment, directories))?;
    }

    Ok(())
}

/// Upload argument set for one group.
///
/// `--send-mail` is only passed when no comment will follow, so reviewers
/// are not notified twice.
fn build_upload_args(request: &UploadRequest<'_>) -> Vec<String> {
    let mut args = vec!["-f".to_string()];
    if !request.reviewers.is_empty() {
        args.push("-r".to_string());
        args.push(request.reviewers.to_comma_list());
    }
    if request.cq_dry_run {
        args.push("--cq-dry-run".to_string());
    }
    if request.comment.is_none() {
        args.push("--send-mail".to_string());
    }
    if request.enable_auto_submit {
        args.push("--enable-auto-submit".to_string());
    }
    if let Some(topic) = request.topic {
        args.push(format!("--topic={topic}"));
    }
    args
}
