use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Every way a rewrite run can fail.
///
/// All of these are fatal: the CLI prints the message and exits with status 1.
#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("`git` not found in PATH")]
    GitNotFound,

    #[error("{} is not a git repository", .0.display())]
    NotARepository(PathBuf),

    #[error(
        "working directory has uncommitted changes; commit or stash them before rewriting history"
    )]
    DirtyWorktree,

    #[error("no commits to rewrite")]
    NoCommits,

    #[error("invalid timestamp {input:?}: {reason}")]
    InvalidTimestamp { input: String, reason: String },

    #[error("end-time must not come before start-time")]
    EndBeforeStart,

    #[error("--start-time must be provided if --end-time is specified")]
    EndWithoutStart,

    #[error("invalid timezone format {input:?}: {reason} (expected ±HH:MM, e.g. +05:30, -07:00)")]
    InvalidTimezone { input: String, reason: String },

    #[error("a remote URL for origin must be provided")]
    MissingRemoteUrl,

    #[error("author name and email must be provided")]
    MissingIdentity,

    #[error("author {field} {value:?} must not contain control characters such as newlines")]
    InvalidIdentity { field: &'static str, value: String },

    #[error("prompt error: {0}")]
    Prompt(String),

    #[error("cannot locate current executable: {0}")]
    CurrentExe(io::Error),

    #[error("`{}` failed{}", .command, format_output(.output))]
    CommandFailed { command: String, output: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

fn format_output(output: &str) -> String {
    if output.is_empty() {
        String::new()
    } else {
        format!(":\n{}", output)
    }
}
