//! Error types for cl-split

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// cl-split errors
#[derive(Debug, Error)]
pub enum Error {
    /// The working directory is not inside a git work tree
    #[error("not inside a git work tree")]
    NotARepository,

    /// HEAD is not on a branch
    #[error("cannot split from a detached HEAD; check out a branch first")]
    DetachedHead,

    /// The current branch has no upstream configured
    #[error("branch {0} has no upstream; set one with `git branch --set-upstream-to`")]
    NoUpstream(String),

    /// The diff against upstream contains no files
    #[error("cannot split an empty change list")]
    EmptyChangeList,

    /// An invoked command exited nonzero
    #[error(transparent)]
    Process(#[from] ProcessFailure),

    /// Reviewer suggestion failed
    #[error("owners lookup failed: {0}")]
    Owners(String),

    /// A remote or URL could not be parsed
    #[error("{0}")]
    Parse(String),

    /// HTTP transport error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL construction error
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Structured failure of an invoked child process.
///
/// Carries everything needed to report the failure without re-running the
/// command: the full command line, the exit status, both captured output
/// streams, and the directory the command ran in.
#[derive(Debug, Clone)]
pub struct ProcessFailure {
    /// Full command line that was run
    pub command: String,
    /// Exit code, or `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
    /// Directory the command ran in
    pub cwd: PathBuf,
}

impl fmt::Display for ProcessFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exit_code {
            Some(code) => write!(
                f,
                "command `{}` failed with exit code {code} in {}",
                self.command,
                self.cwd.display()
            ),
            None => write!(
                f,
                "command `{}` was terminated by a signal in {}",
                self.command,
                self.cwd.display()
            ),
        }
    }
}

impl std::error::Error for ProcessFailure {}
