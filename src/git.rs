use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::debug::debug_log;
use crate::error::RewriteError;

/// Name of the remote this tool (re)points and pushes to.
pub const REMOTE: &str = "origin";

/// Arguments of the push command, shared between the real push and the
/// manual hint printed when the user skips it.
pub const PUSH_ARGS: [&str; 5] = ["push", "-u", REMOTE, "--force", "--all"];

/// One `git` invocation: arguments plus the extra environment for the child.
///
/// The working directory is owned by the [`GitRunner`], so nothing here
/// touches the state of the current process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCommand {
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
    /// Inherit stdio instead of capturing it (for long, chatty commands).
    pub passthrough: bool,
}

impl GitCommand {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            envs: Vec::new(),
            passthrough: false,
        }
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.envs.push((key.to_string(), value.to_string()));
        self
    }

    pub fn passthrough(mut self) -> Self {
        self.passthrough = true;
        self
    }

    /// `git arg1 arg2 ...`, as shown in error messages.
    pub fn display(&self) -> String {
        let mut s = String::from("git");
        for arg in &self.args {
            s.push(' ');
            s.push_str(arg);
        }
        s
    }
}

/// Result of running a [`GitCommand`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    /// Stdout and stderr joined, trimmed; what gets surfaced on failure.
    pub fn combined(&self) -> String {
        let out = self.stdout.trim();
        let err = self.stderr.trim();
        match (out.is_empty(), err.is_empty()) {
            (true, _) => err.to_string(),
            (false, true) => out.to_string(),
            (false, false) => format!("{}\n{}", out, err),
        }
    }
}

/// Abstraction over running `git`.
///
/// Implementors decide where and how the process runs. A non-zero exit is
/// reported through [`GitOutput::success`], not as an `Err`; `Err` is for
/// failing to run at all.
pub trait GitRunner {
    fn run(&mut self, cmd: &GitCommand) -> Result<GitOutput, RewriteError>;
}

/// Runs the system `git` binary inside one repository directory.
#[derive(Debug, Clone)]
pub struct SystemGit {
    repo: PathBuf,
}

impl SystemGit {
    pub fn new(repo: PathBuf) -> Self {
        Self { repo }
    }
}

impl GitRunner for SystemGit {
    fn run(&mut self, cmd: &GitCommand) -> Result<GitOutput, RewriteError> {
        debug_log(&format!("running `{}`", cmd.display()));

        let mut command = Command::new("git");
        command.args(&cmd.args).current_dir(&self.repo);
        for (key, value) in &cmd.envs {
            command.env(key, value);
        }

        if cmd.passthrough {
            command.stdin(Stdio::inherit());
            command.stdout(Stdio::inherit());
            command.stderr(Stdio::inherit());
            let status = command.status().map_err(map_spawn_error)?;
            return Ok(GitOutput {
                success: status.success(),
                ..GitOutput::default()
            });
        }

        command.stdin(Stdio::null());
        let out = command.output().map_err(map_spawn_error)?;
        Ok(GitOutput {
            success: out.status.success(),
            stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        })
    }
}

fn map_spawn_error(e: std::io::Error) -> RewriteError {
    if e.kind() == std::io::ErrorKind::NotFound {
        RewriteError::GitNotFound
    } else {
        RewriteError::Io(e)
    }
}

/// Verifies `git` can be found on `PATH`.
pub fn ensure_git_available() -> Result<(), RewriteError> {
    which::which("git")
        .map(|_| ())
        .map_err(|_| RewriteError::GitNotFound)
}

/// Returns `true` when `path` looks like the root of a git work tree.
///
/// `.git` may be a directory or, for linked worktrees and submodules, a file.
pub fn is_repository(path: &Path) -> bool {
    path.join(".git").exists()
}

/// Typed operations over a [`GitRunner`].
pub struct Git<R: GitRunner> {
    runner: R,
}

impl<R: GitRunner> Git<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Runs `cmd` and returns its stdout.
    ///
    /// # Returns
    ///
    /// * `Ok(stdout)` if git exited with status `0`.
    /// * `Err(CommandFailed)` carrying the command line and the combined
    ///   stdout/stderr on a non-zero exit.
    /// * `Err(GitNotFound)` / `Err(Io)` if the process could not be started.
    fn checked(&mut self, cmd: GitCommand) -> Result<String, RewriteError> {
        let out = self.runner.run(&cmd)?;
        if out.success {
            Ok(out.stdout)
        } else {
            Err(RewriteError::CommandFailed {
                command: cmd.display(),
                output: out.combined(),
            })
        }
    }

    /// Reads a repository config value with `git config --get <key>`.
    ///
    /// # Parameters
    ///
    /// * `key` - Config key such as `user.name`.
    ///
    /// # Returns
    ///
    /// The trimmed value, or an empty string when the key is unset or git
    /// fails. Callers treat empty as "not configured".
    pub fn config_get(&mut self, key: &str) -> String {
        match self.runner.run(&GitCommand::new(["config", "--get", key])) {
            Ok(out) if out.success => out.stdout.trim().to_string(),
            _ => String::new(),
        }
    }

    /// Fails with [`RewriteError::DirtyWorktree`] if `git status --porcelain`
    /// reports anything.
    pub fn ensure_clean_worktree(&mut self) -> Result<(), RewriteError> {
        let status = self.checked(GitCommand::new(["status", "--porcelain"]))?;
        if status.trim().is_empty() {
            Ok(())
        } else {
            Err(RewriteError::DirtyWorktree)
        }
    }

    /// Lists the commits reachable from `HEAD`, oldest first.
    ///
    /// An unborn `HEAD` (a repository without commits) is reported as
    /// [`RewriteError::NoCommits`] rather than as a failed `rev-list`.
    ///
    /// # Parameters
    ///
    /// * `include_merges` - When `false`, merge commits are left out and the
    ///   list is in topological order, which is the sequence of `pick`s that
    ///   `git rebase -i` replays when it flattens history.
    ///
    /// # Returns
    ///
    /// * `Ok(hashes)` - Full commit hashes, oldest first.
    /// * `Err(NoCommits)` - `HEAD` does not resolve to a commit.
    /// * `Err(CommandFailed)` - `git rev-list` failed.
    pub fn list_commits(&mut self, include_merges: bool) -> Result<Vec<String>, RewriteError> {
        let head = self
            .runner
            .run(&GitCommand::new(["rev-parse", "--verify", "-q", "HEAD"]))?;
        if !head.success {
            return Err(RewriteError::NoCommits);
        }

        let args: &[&str] = if include_merges {
            &["rev-list", "--reverse", "HEAD"]
        } else {
            &["rev-list", "--reverse", "--topo-order", "--no-merges", "HEAD"]
        };
        let out = self.checked(GitCommand::new(args.iter().copied()))?;
        Ok(out.split_whitespace().map(str::to_string).collect())
    }

    /// Points `origin` at `url`, adding the remote if it does not exist.
    ///
    /// # Parameters
    ///
    /// * `url` - The new remote URL, passed to git as a single argument.
    ///
    /// # Returns
    ///
    /// * `Ok(())` once `git remote set-url` or `git remote add` succeeded.
    /// * `Err(CommandFailed)` with git's output otherwise.
    pub fn set_remote(&mut self, url: &str) -> Result<(), RewriteError> {
        let exists = self
            .runner
            .run(&GitCommand::new(["remote", "get-url", REMOTE]))?
            .success;

        if exists {
            self.checked(GitCommand::new(["remote", "set-url", REMOTE, url]))?;
        } else {
            self.checked(GitCommand::new(["remote", "add", REMOTE, url]))?;
        }
        Ok(())
    }

    /// Rewrites every ref with `git filter-branch --env-filter`, sourcing the
    /// filter from `script`.
    ///
    /// `FILTER_BRANCH_SQUELCH_WARNING=1` suppresses the interactive deprecation
    /// pause. The backup refs filter-branch leaves behind are removed later with
    /// [`Git::original_refs`] and [`Git::delete_ref`].
    ///
    /// # Returns
    ///
    /// The captured output of `filter-branch` on success.
    pub fn filter_branch(&mut self, script: &Path) -> Result<String, RewriteError> {
        let filter = format!(". {}", shell_quote(&script.to_string_lossy()));
        let cmd = GitCommand::new([
            "filter-branch",
            "-f",
            "--env-filter",
            filter.as_str(),
            "--",
            "--all",
        ])
        .env("FILTER_BRANCH_SQUELCH_WARNING", "1");
        self.checked(cmd)
    }

    /// Runs `git rebase -i --root` with `sequence_editor` as
    /// `GIT_SEQUENCE_EDITOR`.
    ///
    /// # Parameters
    ///
    /// * `sequence_editor` - Shell command git runs with the todo path
    ///   appended; see [`build_sequence_editor_env`].
    pub fn rebase_root(&mut self, sequence_editor: &str) -> Result<String, RewriteError> {
        let cmd = GitCommand::new(["rebase", "-i", "--root"])
            .env("GIT_SEQUENCE_EDITOR", sequence_editor);
        self.checked(cmd)
    }

    /// Backup refs left under `refs/original/` by `filter-branch`.
    pub fn original_refs(&mut self) -> Result<Vec<String>, RewriteError> {
        let out = self.checked(GitCommand::new([
            "for-each-ref",
            "--format=%(refname)",
            "refs/original/",
        ]))?;
        Ok(out.split_whitespace().map(str::to_string).collect())
    }

    /// Deletes a single ref with `git update-ref -d`.
    ///
    /// # Parameters
    ///
    /// * `refname` - Full ref name, e.g. `refs/original/refs/heads/main`.
    pub fn delete_ref(&mut self, refname: &str) -> Result<(), RewriteError> {
        self.checked(GitCommand::new(["update-ref", "-d", refname]))?;
        Ok(())
    }

    /// Expires every reflog entry immediately so the pre-rewrite commits are
    /// no longer referenced from any reflog.
    pub fn expire_reflog(&mut self) -> Result<(), RewriteError> {
        self.checked(GitCommand::new(["reflog", "expire", "--expire=now", "--all"]))?;
        Ok(())
    }

    /// Runs `git gc --prune=now --aggressive` with the terminal attached.
    ///
    /// Run after [`Git::expire_reflog`]; together they drop the objects of the
    /// old history from the object store.
    pub fn gc_aggressive(&mut self) -> Result<(), RewriteError> {
        self.checked(GitCommand::new(["gc", "--prune=now", "--aggressive"]).passthrough())?;
        Ok(())
    }

    /// `git push -u origin --force --all`, with the terminal attached so
    /// credential prompts and progress work.
    pub fn force_push_all(&mut self) -> Result<(), RewriteError> {
        self.checked(GitCommand::new(PUSH_ARGS).passthrough())?;
        Ok(())
    }
}

/// Wraps `s` in single quotes for `sh`, escaping embedded single quotes.
///
/// # Examples
///
/// ```
/// use git_history_rewrite::git::shell_quote;
///
/// assert_eq!(shell_quote("O'Brien"), r#"'O'"'"'Brien'"#);
/// ```
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r#"'"'"'"#))
}

/// Builds the value for the `GIT_SEQUENCE_EDITOR` environment variable.
///
/// Git runs the editor through the shell and appends the todo file path, so
/// this re-invokes `exe_path` in sequence-editor mode with the generated
/// `script_path` as its first argument.
pub(crate) fn build_sequence_editor_env(exe_path: &str, script_path: &str) -> String {
    format!(
        "{} --sequence-editor {}",
        shell_quote(exe_path),
        shell_quote(script_path)
    )
}


#[cfg(test)]
mod tests {
    use super::test_support::MockRunner;
    use super::*;
    use std::fs;

    #[test]
    fn sequence_editor_env_quotes_both_paths() {
        let s = build_sequence_editor_env("/Users/me/My App/bin", "/tmp/todo.txt");
        assert_eq!(s, "'/Users/me/My App/bin' --sequence-editor '/tmp/todo.txt'");
    }

    #[test]
    fn shell_quote_escapes_single_quotes() {
        assert_eq!(shell_quote("plain"), "'plain'");
        assert_eq!(shell_quote("it's"), r#"'it'"'"'s'"#);
    }

    #[test]
    fn display_joins_args() {
        let cmd = GitCommand::new(["rev-list", "--reverse", "HEAD"]);
        assert_eq!(cmd.display(), "git rev-list --reverse HEAD");
    }

    #[test]
    fn combined_output_joins_streams() {
        let out = GitOutput {
            success: false,
            stdout: "partial\n".to_string(),
            stderr: "fatal: nope\n".to_string(),
        };
        assert_eq!(out.combined(), "partial\nfatal: nope");
    }

    #[test]
    fn repository_detection() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        assert!(!is_repository(dir.path()));
        fs::create_dir_all(dir.path().join(".git")).expect("failed to create .git");
        assert!(is_repository(dir.path()));
    }

    #[test]
    fn repository_detection_accepts_gitfile() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        fs::write(dir.path().join(".git"), "gitdir: /elsewhere\n").expect("failed to write .git");
        assert!(is_repository(dir.path()));
    }

    #[test]
    fn clean_worktree_passes() {
        let mut git = Git::new(MockRunner::default().respond("git status", true, ""));
        assert!(git.ensure_clean_worktree().is_ok());
    }

    #[test]
    fn dirty_worktree_is_rejected() {
        let mut git = Git::new(MockRunner::default().respond("git status", true, " M src/lib.rs\n"));
        let err = git.ensure_clean_worktree().unwrap_err();
        assert!(matches!(err, RewriteError::DirtyWorktree));
    }

    #[test]
    fn failing_status_surfaces_output() {
        let mut git = Git::new(MockRunner::default().respond("git status", false, ""));
        match git.ensure_clean_worktree() {
            Err(RewriteError::CommandFailed { command, output }) => {
                assert_eq!(command, "git status --porcelain");
                assert_eq!(output, "error from git status");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn list_commits_splits_lines() {
        let mut git = Git::new(MockRunner::default().respond("git rev-list", true, "aaa\nbbb\nccc\n"));
        assert_eq!(git.list_commits(true).unwrap(), vec!["aaa", "bbb", "ccc"]);
        assert_eq!(
            git.runner().displayed(),
            vec!["git rev-parse --verify -q HEAD", "git rev-list --reverse HEAD"]
        );
    }

    #[test]
    fn list_commits_without_merges_uses_rebase_order() {
        let mut git = Git::new(MockRunner::default().respond("git rev-list", true, "aaa\nccc\n"));
        assert_eq!(git.list_commits(false).unwrap(), vec!["aaa", "ccc"]);
        assert_eq!(
            git.runner().displayed()[1],
            "git rev-list --reverse --topo-order --no-merges HEAD"
        );
    }

    #[test]
    fn unborn_head_means_no_commits() {
        let mut git = Git::new(MockRunner::default().respond("git rev-parse", false, ""));
        assert!(matches!(git.list_commits(true), Err(RewriteError::NoCommits)));
        assert_eq!(git.runner().displayed(), vec!["git rev-parse --verify -q HEAD"]);
    }

    #[test]
    fn set_remote_updates_existing_origin() {
        let mut git = Git::new(MockRunner::default().respond("git remote get-url", true, "old\n"));
        git.set_remote("git@example.com:me/repo.git").unwrap();
        assert_eq!(
            git.runner().displayed(),
            vec![
                "git remote get-url origin",
                "git remote set-url origin git@example.com:me/repo.git",
            ]
        );
    }

    #[test]
    fn set_remote_adds_missing_origin() {
        let mut git = Git::new(MockRunner::default().respond("git remote get-url", false, ""));
        git.set_remote("https://example.com/repo.git").unwrap();
        assert_eq!(
            git.runner().displayed()[1],
            "git remote add origin https://example.com/repo.git"
        );
    }

    #[test]
    fn config_get_missing_key_is_empty() {
        let mut git = Git::new(MockRunner::default().respond("git config", false, ""));
        assert_eq!(git.config_get("user.name"), "");
    }

    #[test]
    fn config_get_trims_value() {
        let mut git = Git::new(MockRunner::default().respond("git config", true, "Jane Doe\n"));
        assert_eq!(git.config_get("user.name"), "Jane Doe");
    }

    #[test]
    fn filter_branch_sources_script_and_silences_warning() {
        let mut git = Git::new(MockRunner::default());
        git.filter_branch(Path::new("/tmp/env filter.sh")).unwrap();
        let cmd = &git.runner().calls[0];
        assert_eq!(
            cmd.args,
            vec!["filter-branch", "-f", "--env-filter", ". '/tmp/env filter.sh'", "--", "--all"]
        );
        assert_eq!(
            cmd.envs,
            vec![("FILTER_BRANCH_SQUELCH_WARNING".to_string(), "1".to_string())]
        );
    }

    #[test]
    fn rebase_root_sets_sequence_editor() {
        let mut git = Git::new(MockRunner::default());
        git.rebase_root("'/bin/tool' --sequence-editor '/tmp/x'").unwrap();
        let cmd = &git.runner().calls[0];
        assert_eq!(cmd.args, vec!["rebase", "-i", "--root"]);
        assert_eq!(cmd.envs[0].0, "GIT_SEQUENCE_EDITOR");
    }

    #[test]
    fn push_attaches_terminal() {
        let mut git = Git::new(MockRunner::default());
        git.force_push_all().unwrap();
        let cmd = &git.runner().calls[0];
        assert!(cmd.passthrough);
        assert_eq!(cmd.display(), "git push -u origin --force --all");
    }
}
