use crate::{
    debug,
    error::RewriteError,
    git::{self, Git, GitRunner, SystemGit},
    plan::{DateWindow, Identity},
    prompt::{self, ConfirmPrompter, StringPrompter},
    rewrite::{self, Outcome, Settings, Strategy},
    sequence_editor,
    timestamps::{TimezoneOffset, parse_timestamp},
};

use chrono::{DateTime, Utc};
use clap::Parser;
use console::style;
use std::{
    env,
    io::IsTerminal,
    path::{Path, PathBuf},
};

/// Flag that switches the binary into sequence-editor mode. Git invokes us
/// this way during `--strategy rebase`; it is never typed by users.
const SEQUENCE_EDITOR_FLAG: &str = "--sequence-editor";

/// Rewrite the commit history of a git repository: re-point origin, spread
/// commit dates over an interval, reset author and committer, and
/// optionally force-push.
#[derive(Parser, Debug)]
#[command(name = "git-history-rewrite", version, long_about = None)]
pub struct Args {
    /// Path to the git repository root
    #[arg(long, default_value = ".")]
    pub repo_path: String,

    /// New git remote URL for origin (prompted if omitted)
    #[arg(long)]
    pub remote_url: Option<String>,

    /// Start of the date interval, e.g. 2025-01-01T00:00:00
    #[arg(long)]
    pub start_time: Option<String>,

    /// End of the date interval, e.g. 2025-06-30T23:59:59 (default: now)
    #[arg(long)]
    pub end_time: Option<String>,

    /// New author name (default: git config user.name)
    #[arg(long)]
    pub author_name: Option<String>,

    /// New author email (default: git config user.email)
    #[arg(long)]
    pub author_email: Option<String>,

    /// Timezone offset for rewritten commit dates, ±HH:MM
    #[arg(long, default_value = TimezoneOffset::DEFAULT, allow_hyphen_values = true)]
    pub timezone: TimezoneOffset,

    /// Force push rewritten history to origin without prompting
    #[arg(long)]
    pub force_push: bool,

    /// How history is rewritten
    #[arg(long, value_enum, default_value_t = Strategy::EnvFilter)]
    pub strategy: Strategy,

    /// Do not ask for confirmation before rewriting
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Print every git invocation to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Expands a leading `~` and makes `path` absolute.
pub(crate) fn expand_path(path: &str) -> Result<PathBuf, RewriteError> {
    let expanded = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => {
            let home = dirs::home_dir().ok_or_else(|| {
                RewriteError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "cannot determine home directory",
                ))
            })?;
            home.join(rest.trim_start_matches('/'))
        }
        _ => PathBuf::from(path),
    };
    Ok(std::path::absolute(expanded)?)
}

/// Last path component, for prompts and the banner.
fn repo_name(root: &Path) -> String {
    root.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("current repository")
        .to_string()
}

/// Uses `--remote-url` or asks for it; an empty answer is an error.
pub(crate) fn resolve_remote_url<S: StringPrompter>(
    flag: Option<&str>,
    strings: &mut S,
    repo_name: &str,
) -> Result<String, RewriteError> {
    let url = match flag {
        Some(url) => url.trim().to_string(),
        None => prompt::ask(strings, "New git remote URL for origin", repo_name, "")
            .map_err(RewriteError::Prompt)?,
    };
    if url.is_empty() {
        return Err(RewriteError::MissingRemoteUrl);
    }
    Ok(url)
}

/// Works out which date interval, if any, commits are spread over.
///
/// `--start-time` alone runs up to `now`; `--end-time` alone is an error.
/// With neither flag the user is asked whether to touch dates at all.
pub(crate) fn resolve_window<S: StringPrompter, C: ConfirmPrompter>(
    start: Option<&str>,
    end: Option<&str>,
    strings: &mut S,
    confirms: &mut C,
    repo_name: &str,
    now: DateTime<Utc>,
) -> Result<Option<DateWindow>, RewriteError> {
    let (start, end) = match (start, end) {
        (Some(start), end) => (start.to_string(), end.map(str::to_string)),
        (None, Some(_)) => return Err(RewriteError::EndWithoutStart),
        (None, None) => {
            if !prompt::confirm_edit_dates(confirms).map_err(RewriteError::Prompt)? {
                return Ok(None);
            }
            let start = prompt::ask(
                strings,
                "ISO start timestamp (e.g. 2025-01-01T00:00:00)",
                repo_name,
                "",
            )
            .map_err(RewriteError::Prompt)?;
            let end = prompt::ask(
                strings,
                "ISO end timestamp (e.g. 2025-06-30T23:59:59, empty for now)",
                repo_name,
                "",
            )
            .map_err(RewriteError::Prompt)?;
            (start, Some(end))
        }
    };

    let start = parse_timestamp(&start)?;
    let end = match end.as_deref().map(str::trim) {
        Some(e) if !e.is_empty() => parse_timestamp(e)?,
        _ => now,
    };
    DateWindow::new(start, end).map(Some)
}

/// Flag, then repository `git config`, then a prompt, for each field.
pub(crate) fn resolve_identity<R: GitRunner, S: StringPrompter>(
    name_flag: Option<&str>,
    email_flag: Option<&str>,
    git: &mut Git<R>,
    strings: &mut S,
    repo_name: &str,
) -> Result<Identity, RewriteError> {
    let mut field = |flag: Option<&str>,
                     key: &str,
                     label: &str|
     -> Result<String, RewriteError> {
        if let Some(v) = flag.map(str::trim).filter(|v| !v.is_empty()) {
            return Ok(v.to_string());
        }
        let configured = git.config_get(key);
        if !configured.is_empty() {
            return Ok(configured);
        }
        prompt::ask(strings, label, repo_name, "").map_err(RewriteError::Prompt)
    };

    let name = field(name_flag, "user.name", "New author name")?;
    let email = field(email_flag, "user.email", "New author email")?;
    Identity::new(&name, &email)
}

/// Sequence-editor mode: `<exe> --sequence-editor <script> <todo>`.
fn run_sequence_editor(args: &[String]) -> Result<i32, ()> {
    let script = args.get(2).map(|s| s.as_str());
    let todo = args.get(3).map(|s| s.as_str());
    match sequence_editor::run(script, todo) {
        Ok(_) => Ok(0),
        Err(e) => {
            eprintln!(
                "{}",
                style(format!("Sequence editor error: {}", e)).red().bold()
            );
            Err(())
        }
    }
}

fn run(args: Args) -> Result<i32, RewriteError> {
    if args.verbose {
        debug::enable();
    }

    git::ensure_git_available()?;

    let timezone = args.timezone;

    let root = expand_path(&args.repo_path)?;
    if !git::is_repository(&root) {
        return Err(RewriteError::NotARepository(root));
    }
    let name = repo_name(&root);
    debug::debug_log(&format!(
        "repository root: {}, timezone {}",
        root.display(),
        timezone
    ));

    let interactive = std::io::stdin().is_terminal();
    let mut strings = prompt::DialoguerStringPrompter;

    let remote_url = resolve_remote_url(args.remote_url.as_deref(), &mut strings, &name)?;

    let window = if interactive {
        resolve_window(
            args.start_time.as_deref(),
            args.end_time.as_deref(),
            &mut strings,
            &mut prompt::DialoguerConfirmPrompter,
            &name,
            Utc::now(),
        )?
    } else {
        resolve_window(
            args.start_time.as_deref(),
            args.end_time.as_deref(),
            &mut strings,
            &mut prompt::NonInteractive,
            &name,
            Utc::now(),
        )?
    };

    let mut git = Git::new(SystemGit::new(root));
    let identity = resolve_identity(
        args.author_name.as_deref(),
        args.author_email.as_deref(),
        &mut git,
        &mut strings,
        &name,
    )?;

    let settings = Settings {
        repo_name: name,
        remote_url,
        window,
        timezone,
        identity,
        strategy: args.strategy,
        force_push: args.force_push,
        skip_confirm: args.yes || !interactive,
    };

    let exe = env::current_exe().map_err(RewriteError::CurrentExe)?;
    let outcome = if interactive {
        rewrite::execute(
            &mut git,
            &settings,
            &mut prompt::DialoguerConfirmPrompter,
            &exe,
        )?
    } else {
        rewrite::execute(&mut git, &settings, &mut prompt::NonInteractive, &exe)?
    };

    if outcome == Outcome::Declined {
        println!(
            "{}",
            style("Canceled by user. No changes made.").yellow().bold()
        );
    }
    Ok(0)
}

/// Main CLI entry point for `git-history-rewrite`.
///
/// This function:
/// 1. Handles the internal `--sequence-editor` invocation made by git.
/// 2. Parses CLI flags.
/// 3. Verifies `git` is installed and the path is a repository (the timezone
///    is already validated by the parser).
/// 4. Resolves the remote URL, date interval and identity from flags, git
///    config and prompts.
/// 5. Runs the rewrite pipeline (see [`rewrite::execute`]).
///
/// # Exit Codes
///
/// * `0` – Success, or the user declined a confirmation.
/// * `1` – Any validation, prompt or git failure; the message is printed to stderr.
pub fn entry() -> Result<i32, ()> {
    let raw: Vec<String> = env::args().collect();

    if raw.get(1).map(String::as_str) == Some(SEQUENCE_EDITOR_FLAG) {
        return run_sequence_editor(&raw);
    }

    let args = match Args::try_parse_from(raw) {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            // --help and --version come back as "errors" that belong on stdout.
            return if e.use_stderr() { Err(()) } else { Ok(0) };
        }
    };

    match run(args) {
        Ok(code) => Ok(code),
        Err(e) => {
            eprintln!("{}", style(format!("Error: {}", e)).red().bold());
            Err(())
        }
    }
}
