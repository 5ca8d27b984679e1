//! Mock collaborators standing in for the owners backend, the uploader
//! and the terminal.

use cl_split::error::Result;
use cl_split::owners::OwnersService;
use cl_split::split::{ChangePreview, SplitProgress, Uploader};
use cl_split::types::ReviewerSet;
use std::cell::RefCell;

/// Suggests reviewers by matching path prefixes against fixed rules.
pub struct PrefixOwners {
    rules: Vec<(String, Vec<String>)>,
}

impl PrefixOwners {
    pub fn new(rules: &[(&str, &[&str])]) -> Self {
        Self {
            rules: rules
                .iter()
                .map(|(prefix, reviewers)| {
                    (
                        (*prefix).to_string(),
                        reviewers.iter().map(|r| (*r).to_string()).collect(),
                    )
                })
                .collect(),
        }
    }
}

impl OwnersService for PrefixOwners {
    fn suggest_owners(&self, paths: &[String], exclude: &[String]) -> Result<ReviewerSet> {
        let mut set = ReviewerSet::new();
        for path in paths {
            for (prefix, reviewers) in &self.rules {
                if path.starts_with(prefix.as_str()) {
                    for reviewer in reviewers {
                        if !exclude.contains(reviewer) {
                            set.insert(reviewer.clone());
                        }
                    }
                }
            }
        }
        Ok(set)
    }
}

/// Records upload calls and returns a fixed exit code.
#[derive(Default)]
pub struct MockUploader {
    pub exit_code: i32,
    pub uploads: RefCell<Vec<Vec<String>>>,
    pub comments: RefCell<Vec<String>>,
}

impl MockUploader {
    pub fn failing(exit_code: i32) -> Self {
        Self {
            exit_code,
            ..Self::default()
        }
    }
}

impl Uploader for MockUploader {
    fn upload(&self, args: &[String]) -> Result<i32> {
        self.uploads.borrow_mut().push(args.to_vec());
        Ok(self.exit_code)
    }

    fn add_comment(&self, message: &str) -> Result<()> {
        self.comments.borrow_mut().push(message.to_string());
        Ok(())
    }
}

/// Records all callbacks; answers every confirmation with a fixed reply.
pub struct RecordingProgress {
    confirm_answer: bool,
    pub messages: RefCell<Vec<String>>,
    pub prompts: RefCell<Vec<String>>,
    pub previews: RefCell<Vec<String>>,
    pub failed_branches: RefCell<Vec<String>>,
}

impl RecordingProgress {
    pub fn accepting() -> Self {
        Self::with_answer(true)
    }

    pub fn declining() -> Self {
        Self::with_answer(false)
    }

    fn with_answer(confirm_answer: bool) -> Self {
        Self {
            confirm_answer,
            messages: RefCell::default(),
            prompts: RefCell::default(),
            previews: RefCell::default(),
            failed_branches: RefCell::default(),
        }
    }
}

impl SplitProgress for RecordingProgress {
    fn on_message(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }

    fn on_preview(&self, preview: &ChangePreview<'_>) {
        self.previews.borrow_mut().push(format!(
            "{}/{} dirs={} reviewers={} files={}",
            preview.index,
            preview.total,
            preview.directories.join(","),
            preview.reviewers,
            preview.files.join(",")
        ));
    }

    fn on_upload_failed(&self, branch: &str) {
        self.failed_branches.borrow_mut().push(branch.to_string());
    }

    fn confirm(&self, prompt: &str) -> Result<bool> {
        self.prompts.borrow_mut().push(prompt.to_string());
        Ok(self.confirm_answer)
    }
}
