//! The rewrite pipeline, from worktree check to optional push.
//!
//! [`execute`] receives fully resolved [`Settings`]; all prompting for
//! missing values happens before it is called. The only questions asked in
//! here are confirmations, through a [`ConfirmPrompter`].

use std::io::Write;
use std::path::Path;

use clap::ValueEnum;
use console::style;

use crate::banner::print_banner;
use crate::debug::debug_log;
use crate::error::RewriteError;
use crate::git::{self, Git, GitRunner, PUSH_ARGS};
use crate::plan::{DateWindow, Identity, RewritePlan};
use crate::prompt::{self, ConfirmPrompter};
use crate::script;
use crate::timestamps::TimezoneOffset;

/// How history is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Strategy {
    /// `git filter-branch --env-filter` over all refs; keeps merges.
    #[default]
    EnvFilter,
    /// `git rebase -i --root` on the current branch with a generated todo.
    Rebase,
}

impl Strategy {
    /// The value accepted by `--strategy`.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::EnvFilter => "env-filter",
            Strategy::Rebase => "rebase",
        }
    }

    /// Whether merge commits survive the rewrite.
    ///
    /// A plain `rebase -i` replays only the non-merge commits, so the plan for
    /// [`Strategy::Rebase`] must not contain merges or git stops half way on
    /// a `pick` it cannot apply.
    pub fn keeps_merges(&self) -> bool {
        matches!(self, Strategy::EnvFilter)
    }
}

/// Everything the pipeline needs, already validated.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Last component of the repository path, used in the banner.
    pub repo_name: String,
    /// URL `origin` is pointed at before the rewrite.
    pub remote_url: String,
    /// Interval commit dates are spread over; `None` keeps existing dates.
    pub window: Option<DateWindow>,
    /// Offset the rewritten dates are rendered in.
    pub timezone: TimezoneOffset,
    /// Author and committer written to every commit.
    pub identity: Identity,
    pub strategy: Strategy,
    /// Push without asking once the rewrite succeeded.
    pub force_push: bool,
    /// Skip the "rewrite now?" confirmation (`--yes` or no terminal).
    pub skip_confirm: bool,
}

/// How a run that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The user said no before anything was changed.
    Declined,
    Rewritten { pushed: bool },
}

/// Runs the whole rewrite against `git`.
///
/// Nothing is mutated until the worktree is known clean, the commit list is
/// non-empty and the user (unless `skip_confirm`) has agreed.
///
/// # Parameters
///
/// * `git` - Typed git operations bound to the target repository.
/// * `settings` - Resolved inputs for this run.
/// * `confirm` - Answers the start, equal-interval and push questions.
/// * `editor_exe` - The binary git re-invokes as its sequence editor for
///   [`Strategy::Rebase`].
///
/// # Returns
///
/// * `Ok(Outcome::Declined)` - The user said no before any change was made.
/// * `Ok(Outcome::Rewritten { pushed })` - History was rewritten and cleaned up.
/// * `Err(_)` - The first failing step; later steps are not attempted.
pub fn execute<R: GitRunner, C: ConfirmPrompter>(
    git: &mut Git<R>,
    settings: &Settings,
    confirm: &mut C,
    editor_exe: &Path,
) -> Result<Outcome, RewriteError> {
    git.ensure_clean_worktree()?;

    let commits = git.list_commits(settings.strategy.keeps_merges())?;
    debug_log(&format!(
        "{} commits to rewrite with {}",
        commits.len(),
        settings.strategy.name()
    ));

    let plan = RewritePlan::build(
        &commits,
        settings.identity.clone(),
        settings.window,
        settings.timezone,
    )?;

    if settings.window.is_some_and(|w| w.is_degenerate()) && plan.len() > 1 {
        eprintln!(
            "{}",
            style("Warning: start-time equals end-time. All commits will have the same timestamp.")
                .yellow()
                .bold()
        );
        if !prompt::confirm_same_timestamp(confirm).map_err(RewriteError::Prompt)? {
            return Ok(Outcome::Declined);
        }
    }

    print_banner(settings, &plan);

    if !settings.skip_confirm && !prompt::confirm_start(confirm).map_err(RewriteError::Prompt)? {
        return Ok(Outcome::Declined);
    }

    git.set_remote(&settings.remote_url)?;
    println!(
        "{}",
        style(format!("origin now points at {}", settings.remote_url)).green()
    );

    println!("Rewriting history...");
    let output = match settings.strategy {
        Strategy::EnvFilter => rewrite_with_env_filter(git, &plan)?,
        Strategy::Rebase => rewrite_with_rebase(git, &plan, editor_exe)?,
    };
    if !output.trim().is_empty() {
        println!("{}", output.trim_end());
    }
    println!(
        "{}",
        style("✅ History rewritten successfully.").green().bold()
    );

    cleanup(git)?;

    let pushed = if settings.force_push {
        true
    } else {
        prompt::confirm_push(confirm).map_err(RewriteError::Prompt)?
    };

    if pushed {
        git.force_push_all()?;
        println!(
            "\n\n{}",
            style("History rewritten and force-pushed.").green().bold()
        );
    } else {
        println!(
            "\n\n{}",
            style("History rewritten; skipping push.").yellow().bold()
        );
        println!("To push manually, run:");
        println!("  git {}", PUSH_ARGS.join(" "));
    }

    Ok(Outcome::Rewritten { pushed })
}

fn write_temp_script(
    suffix: &str,
    contents: &str,
) -> Result<tempfile::NamedTempFile, RewriteError> {
    let mut file = tempfile::Builder::new()
        .prefix("git-history-rewrite-")
        .suffix(suffix)
        .tempfile()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    debug_log(&format!("wrote rewrite script to {}", file.path().display()));
    Ok(file)
}

fn rewrite_with_env_filter<R: GitRunner>(
    git: &mut Git<R>,
    plan: &RewritePlan,
) -> Result<String, RewriteError> {
    let script = write_temp_script(".sh", &script::render_env_filter(plan))?;
    git.filter_branch(script.path())
}

fn rewrite_with_rebase<R: GitRunner>(
    git: &mut Git<R>,
    plan: &RewritePlan,
    editor_exe: &Path,
) -> Result<String, RewriteError> {
    let todo = write_temp_script(".todo", &script::render_rebase_todo(plan))?;
    let editor = git::build_sequence_editor_env(
        &editor_exe.to_string_lossy(),
        &todo.path().to_string_lossy(),
    );
    git.rebase_root(&editor).map_err(|e| {
        eprintln!(
            "{}",
            style("The rebase stopped; run `git rebase --abort` to restore the previous history.")
                .yellow()
        );
        e
    })
}

/// Drops `refs/original/*`, expires reflogs and prunes unreachable objects so
/// the old history is really gone.
fn cleanup<R: GitRunner>(git: &mut Git<R>) -> Result<(), RewriteError> {
    for refname in git.original_refs()? {
        git.delete_ref(&refname)?;
    }
    git.expire_reflog()?;
    git.gc_aggressive()?;
    Ok(())
}
