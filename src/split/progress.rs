//! Progress callbacks for interface-agnostic run reporting
//!
//! The engine never prints or prompts directly; the embedding interface
//! (CLI, tests) implements this trait.

use crate::error::Result;
use crate::types::ReviewerSet;

/// Preview of one planned change, emitted during dry runs.
#[derive(Debug, Clone)]
pub struct ChangePreview<'a> {
    /// 1-based index of this change in the plan
    pub index: usize,
    /// Total number of planned changes
    pub total: usize,
    /// Ownership directories merged into this change
    pub directories: &'a [String],
    /// Paths of the files in this change
    pub files: Vec<&'a str>,
    /// Reviewers assigned to this change
    pub reviewers: &'a ReviewerSet,
    /// Description with the directory placeholder already expanded
    pub description: String,
    /// Whether the upload would request a CQ dry run
    pub cq_dry_run: bool,
    /// Whether the upload would enable auto-submit
    pub enable_auto_submit: bool,
    /// Topic the upload would set, if any
    pub topic: Option<&'a str>,
}

/// Callbacks the engine drives during a run.
pub trait SplitProgress {
    /// General status line.
    fn on_message(&self, message: &str);

    /// Dry-run preview of one planned change.
    fn on_preview(&self, preview: &ChangePreview<'_>);

    /// Recoverable upload failure; `branch` is left behind for resuming.
    fn on_upload_failed(&self, branch: &str);

    /// Ask the user to confirm; returning `false` declines.
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// Silent callbacks that accept every confirmation.
pub struct NoopProgress;

impl SplitProgress for NoopProgress {
    fn on_message(&self, _message: &str) {}
    fn on_preview(&self, _preview: &ChangePreview<'_>) {}
    fn on_upload_failed(&self, _branch: &str) {}
    fn confirm(&self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}
