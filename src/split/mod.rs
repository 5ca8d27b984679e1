//! Four-stage splitting engine
//!
//! 1. Partition - group changed files by nearest OWNERS directory
//! 2. Assign - resolve a reviewer set per group and merge equal sets
//! 3. Upload - one branch + one uploaded change per merged group
//!
//! orchestrated end-to-end by [`split_branch`].

mod assign;
mod orchestrate;
mod partition;
mod progress;
mod upload;

pub use assign::assign_reviewers;
pub use orchestrate::{split_branch, SplitOptions, SplitOutcome, FORCE_LIMIT, TOP_REVIEWER_COUNT};
pub use partition::{partition_by_owners, OWNERS_FILE, ROOT_DIR};
pub use progress::{ChangePreview, NoopProgress, SplitProgress};
pub use upload::{
    expand_directory_placeholder, format_directories, split_branch_name, upload_change,
    GitClUploader, UploadRequest, Uploader, DIRECTORY_PLACEHOLDER,
};
