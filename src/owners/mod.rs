//! Reviewer suggestion services
//!
//! Provides the seam between the splitting engine and whatever decides
//! who may review a set of files. The production backend asks a Gerrit
//! code-owners server; tests substitute their own implementations.

mod gerrit;

pub use gerrit::{parse_review_remote, GerritOwnersService};

use crate::error::Result;
use crate::types::ReviewerSet;

/// Sentinel identity meaning "anyone may approve".
///
/// Always excluded from suggestions in addition to the change author.
pub const EVERYONE: &str = "*";

/// Reviewer suggestion backend.
pub trait OwnersService {
    /// Suggest a reviewer set able to approve all of `paths`.
    ///
    /// The returned set never contains an identity listed in `exclude`.
    fn suggest_owners(&self, paths: &[String], exclude: &[String]) -> Result<ReviewerSet>;
}
