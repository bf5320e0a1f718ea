use dialoguer::{Confirm, Input, theme::ColorfulTheme};

/// Source of free-text answers (remote URL, timestamps, identity).
///
/// The rest of the crate only talks to this trait, so input resolution can be
/// driven by canned answers in tests.
pub trait StringPrompter {
    /// Shows `prompt` and returns the answer.
    ///
    /// A non-empty `default` is returned when the user just presses Enter; an
    /// empty one means an empty answer is accepted as-is. `Err` carries the
    /// terminal failure as text.
    fn prompt(&mut self, prompt: &str, default: &str) -> Result<String, String>;
}

/// Source of yes/no answers.
pub trait ConfirmPrompter {
    /// Shows `prompt` and returns the answer, `default` on a bare Enter.
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, String>;
}

/// `StringPrompter` backed by `dialoguer::Input` with the colorful theme.
pub struct DialoguerStringPrompter;

impl StringPrompter for DialoguerStringPrompter {
    fn prompt(&mut self, prompt: &str, default: &str) -> Result<String, String> {
        let theme = ColorfulTheme::default();
        let mut input = Input::<String>::with_theme(&theme).with_prompt(prompt);
        input = if default.is_empty() {
            input.allow_empty(true)
        } else {
            input.default(default.to_string())
        };
        input.interact_text().map_err(|e| e.to_string())
    }
}

/// `ConfirmPrompter` backed by `dialoguer::Confirm` with the colorful theme.
pub struct DialoguerConfirmPrompter;

impl ConfirmPrompter for DialoguerConfirmPrompter {
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, String> {
        let theme = ColorfulTheme::default();
        let confirm = Confirm::with_theme(&theme)
            .with_prompt(prompt)
            .default(default);
        confirm.interact().map_err(|e| e.to_string())
    }
}

/// Answers every confirmation with its default, without touching the terminal.
///
/// Used when stdin is not a terminal so scripted runs never block.
pub struct NonInteractive;

impl ConfirmPrompter for NonInteractive {
    fn confirm(&mut self, _prompt: &str, default: bool) -> Result<bool, String> {
        Ok(default)
    }
}

/// Removes control characters (everything below space, plus DEL).
///
/// Pasted terminal input sometimes carries escape sequences or stray
/// carriage returns that would otherwise end up in a remote URL or identity.
pub fn clean_input(s: &str) -> String {
    s.chars().filter(|&c| c >= ' ' && c != '\x7f').collect()
}

/// Asks for `label` in the context of `repo_name` (`"Author name for my-repo"`).
///
/// The answer is trimmed and passed through [`clean_input`].
pub fn ask<P: StringPrompter>(
    prompter: &mut P,
    label: &str,
    repo_name: &str,
    default_value: &str,
) -> Result<String, String> {
    let prompt = format!("{} for {}", label, repo_name);
    let answer = prompter.prompt(&prompt, default_value)?;
    Ok(clean_input(answer.trim()))
}

/// Ask whether commit dates should be rewritten at all.
pub fn confirm_edit_dates<P: ConfirmPrompter>(prompter: &mut P) -> Result<bool, String> {
    prompter.confirm("Do you want to edit the commit dates?", false)
}

/// Ask the user to confirm whether to begin rewriting commit history.
pub fn confirm_start<P: ConfirmPrompter>(prompter: &mut P) -> Result<bool, String> {
    prompter.confirm("Rewrite history now? (this cannot be undone)", true)
}

/// Ask whether to go on when every commit would get the same timestamp.
pub fn confirm_same_timestamp<P: ConfirmPrompter>(prompter: &mut P) -> Result<bool, String> {
    prompter.confirm(
        "start-time equals end-time; all commits will share one timestamp. Continue anyway?",
        false,
    )
}

/// Ask whether to force-push the rewritten history now.
pub fn confirm_push<P: ConfirmPrompter>(prompter: &mut P) -> Result<bool, String> {
    prompter.confirm("Do you want to push to origin now?", false)
}


#[cfg(test)]
mod tests {
    use super::test_support::{ScriptedConfirms, ScriptedStrings};
    use super::*;

    /// Answers one confirmation and checks the default it was offered.
    struct ExpectDefault {
        expected: bool,
        answer: Result<bool, String>,
        seen: Option<String>,
    }

    impl ConfirmPrompter for ExpectDefault {
        fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, String> {
            assert_eq!(default, self.expected, "wrong default for {prompt:?}");
            self.seen = Some(prompt.to_string());
            self.answer.clone()
        }
    }

    fn expect(expected: bool, answer: Result<bool, String>) -> ExpectDefault {
        ExpectDefault {
            expected,
            answer,
            seen: None,
        }
    }

    #[test]
    fn ask_adds_repo_context() {
        let mut strings = ScriptedStrings::new(&["Alice"]);
        let answer = ask(&mut strings, "Author name", "my-repo", "Jane Doe").unwrap();
        assert_eq!(answer, "Alice");
        assert_eq!(
            strings.asked,
            vec![("Author name for my-repo".to_string(), "Jane Doe".to_string())]
        );
    }

    #[test]
    fn ask_strips_control_characters_and_whitespace() {
        let mut strings = ScriptedStrings::new(&["  git@example.com:\x1b[Ame/repo.git\r "]);
        let answer = ask(&mut strings, "Remote URL", "repo", "").unwrap();
        assert_eq!(answer, "git@example.com:[Ame/repo.git");
    }

    #[test]
    fn ask_propagates_prompt_failure() {
        let mut strings = ScriptedStrings::new(&[]);
        assert!(ask(&mut strings, "Label", "repo", "default").is_err());
    }

    #[test]
    fn clean_input_removes_del_and_controls() {
        assert_eq!(clean_input("a\tb\x7fc\u{0}d"), "abcd");
        assert_eq!(clean_input("Zoë Ünïcode"), "Zoë Ünïcode");
    }

    #[test]
    fn start_defaults_to_yes_everything_else_to_no() {
        let mut p = expect(true, Ok(true));
        assert!(confirm_start(&mut p).unwrap());

        let mut p = expect(false, Ok(false));
        assert!(!confirm_push(&mut p).unwrap());
        assert_eq!(p.seen.as_deref(), Some("Do you want to push to origin now?"));

        let mut p = expect(false, Ok(true));
        assert!(confirm_same_timestamp(&mut p).unwrap());
    }

    #[test]
    fn confirm_failure_is_returned() {
        let mut p = expect(false, Err("confirm failed".to_string()));
        assert_eq!(confirm_edit_dates(&mut p).unwrap_err(), "confirm failed");
    }

    #[test]
    fn scripted_confirms_record_prompts() {
        let mut confirms = ScriptedConfirms::new(&[true]);
        assert!(confirm_edit_dates(&mut confirms).unwrap());
        assert_eq!(confirms.asked, vec!["Do you want to edit the commit dates?"]);
        assert!(confirm_push(&mut confirms).is_err());
    }

    #[test]
    fn non_interactive_takes_defaults() {
        let mut prompter = NonInteractive;
        assert!(confirm_start(&mut prompter).unwrap());
        assert!(!confirm_same_timestamp(&mut prompter).unwrap());
        assert!(!confirm_push(&mut prompter).unwrap());
    }
}
