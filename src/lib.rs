//! # git-history-rewrite
//!
//! A CLI tool to rewrite the commit history of a git repository in one go.
//!
//! This crate provides functionality to:
//! - Point `origin` at a new remote URL
//! - Spread commit dates evenly across an interval, shown in a chosen timezone
//! - Overwrite author and committer on every commit
//! - Clean up the old history and optionally force-push the result
//!
//! ## Usage
//!
//! ```bash
//! # Interactive: prompts for anything not given
//! git-history-rewrite --repo-path ~/src/project
//!
//! # Scripted
//! git-history-rewrite --remote-url git@example.com:me/project.git \
//!     --start-time 2025-01-01T00:00:00 --end-time 2025-06-30T23:59:59 \
//!     --author-name "Jane Doe" --author-email jane@example.com \
//!     --timezone -08:00 --force-push --yes
//! ```
//!
//! ## Modules
//!
//! - [`cli`] - Command-line interface, input resolution and main entry point
//! - [`rewrite`] - The rewrite pipeline
//! - [`plan`] - Per-commit rewrite targets
//! - [`timestamps`] - Timestamp parsing, timezone offsets and interpolation
//! - [`script`] - Env-filter and rebase todo rendering
//! - [`git`] - Git command wrappers
//! - [`prompt`] - User input abstractions
//! - [`sequence_editor`] - Rebase todo file replacement
//! - [`banner`] - Summary banner
//! - [`error`] - Error type
//! - [`debug`] - Debug logging

pub mod banner;
pub mod cli;
pub mod debug;
pub mod error;
pub mod git;
pub mod plan;
pub mod prompt;
pub mod rewrite;
pub mod script;
pub mod sequence_editor;
pub mod timestamps;
