//! cl-split - change-list splitting for Gerrit-style review flows
//!
//! Takes the diff between the current branch and its upstream, partitions
//! the changed files into groups bounded by `OWNERS` directories, assigns
//! a reviewer set to each group, and creates one branch + one uploaded
//! change per group.

pub mod error;
pub mod footers;
pub mod git;
pub mod owners;
pub mod split;
pub mod types;
