//! Top-level split control flow
//!
//! Validates preconditions, builds the plan (partition then assign),
//! guards against oversized fan-outs, then previews or uploads every
//! group and reports the reviewer-load ranking.

use crate::error::{Error, Result};
use crate::footers;
use crate::git::GitWorkspace;
use crate::owners::OwnersService;
use crate::split::assign::assign_reviewers;
use crate::split::partition::partition_by_owners;
use crate::split::progress::{ChangePreview, SplitProgress};
use crate::split::upload::{expand_directory_placeholder, upload_change, UploadRequest, Uploader};
use crate::types::ReviewerLoadCounter;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Runs producing more than this many changes require explicit
/// confirmation; large fan-outs have overloaded the commit queue before.
pub const FORCE_LIMIT: usize = 10;

/// Number of reviewers listed in the end-of-run ranking.
pub const TOP_REVIEWER_COUNT: usize = 5;

/// Line appended to every uploaded description.
const ATTRIBUTION: &str = "This change was uploaded by cl-split.";

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitOutcome {
    /// The plan was executed, or previewed in a dry run.
    Completed,
    /// The user declined a confirmation; nothing was changed.
    Declined,
}

/// Options for one split run.
#[derive(Debug, Clone, Default)]
pub struct SplitOptions {
    /// Description applied to every uploaded change
    pub description: String,
    /// Comment published on every uploaded change, if any
    pub comment: Option<String>,
    /// Preview only; create no branches, upload nothing
    pub dry_run: bool,
    /// Request a CQ dry run on every upload
    pub cq_dry_run: bool,
    /// Enable auto-submit on every upload
    pub enable_auto_submit: bool,
    /// Maximum ownership-search depth; 0 means no limit
    pub max_depth: usize,
    /// Topic set on every uploaded change, if any
    pub topic: Option<String>,
}

/// Split the current branch into one change per reviewer group.
///
/// Returns [`SplitOutcome::Declined`] when the user turns down a
/// confirmation; every precondition violation and unexpected command
/// failure is an error.
#[allow(clippy::too_many_lines)]
pub fn split_branch(
    workspace: &GitWorkspace,
    owners: &dyn OwnersService,
    uploader: &dyn Uploader,
    progress: &dyn SplitProgress,
    options: &SplitOptions,
) -> Result<SplitOutcome> {
    let description = footers::append_attribution(&options.description, ATTRIBUTION);

    let refactor_branch = workspace.current_branch()?.ok_or(Error::DetachedHead)?;
    let upstream = workspace
        .upstream(&refactor_branch)?
        .ok_or_else(|| Error::NoUpstream(refactor_branch.clone()))?;
    let ancestor = workspace.common_ancestor(&refactor_branch, &upstream)?;
    debug!("splitting {refactor_branch} against {upstream} (ancestor {ancestor})");

    let files = workspace.capture_status(&ancestor)?;
    if files.is_empty() {
        return Err(Error::EmptyChangeList);
    }
    let author = workspace.user_email()?;

    if !has_bug_link(&description)
        && !progress.confirm("Description does not include a bug link. Proceed?")?
    {
        return Ok(SplitOutcome::Declined);
    }

    let buckets = partition_by_owners(workspace.root(), &files, options.max_depth);
    let assignments = assign_reviewers(buckets, author.as_deref(), owners)?;

    let total = assignments.len();
    progress.on_message(&format!(
        "Will split current branch ({refactor_branch}) into {total} changes.\n"
    ));

    if !options.dry_run && total > FORCE_LIMIT {
        progress.on_message(&format!(
            "This will generate {total} changes, which can put too much load on the \
             verification infrastructure. Consider --max-depth to reduce the count, \
             and --dry-run to inspect the result first."
        ));
        if !progress.confirm("Proceed?")? {
            return Ok(SplitOutcome::Declined);
        }
    }

    let mut loads = ReviewerLoadCounter::default();
    for (index, (reviewers, group)) in assignments.iter().enumerate() {
        if options.dry_run {
            progress.on_preview(&ChangePreview {
                index: index + 1,
                total,
                directories: &group.directories,
                files: group.files.iter().map(|f| f.path.as_str()).collect(),
                reviewers,
                description: expand_directory_placeholder(&description, &group.directories),
                cq_dry_run: options.cq_dry_run,
                enable_auto_submit: options.enable_auto_submit,
                topic: options.topic.as_deref(),
            });
        } else {
            upload_change(
                workspace,
                uploader,
                progress,
                &UploadRequest {
                    refactor_branch: &refactor_branch,
                    upstream: &upstream,
                    group,
                    reviewers,
                    description: &description,
                    comment: options.comment.as_deref(),
                    cq_dry_run: options.cq_dry_run,
                    enable_auto_submit: options.enable_auto_submit,
                    topic: options.topic.as_deref(),
                },
            )?;
        }
        // Dry runs count too, so the ranking can be previewed.
        loads.record(reviewers);
    }

    progress.on_message("The top reviewers are:");
    for (reviewer, count) in loads.top(TOP_REVIEWER_COUNT) {
        progress.on_message(&format!("    {reviewer}: {count} changes"));
    }

    // End on the branch the run started from, so a partially-completed
    // split never strands the user on a just-created branch.
    workspace.checkout_branch(&refactor_branch)?;

    Ok(SplitOutcome::Completed)
}

/// Whether the description carries a `Bug: 123` / `Bug: project:456` line.
fn has_bug_link(description: &str) -> bool {
    static BUG_RE: OnceLock<Regex> = OnceLock::new();
    BUG_RE
        .get_or_init(|| {
            Regex::new(r"(?m)^Bug:\s*(?:[a-zA-Z]+:)?[0-9]+").expect("hardcoded regex is valid")
        })
        .is_match(description)
}
