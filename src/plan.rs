use chrono::{DateTime, Utc};

use crate::error::RewriteError;
use crate::timestamps::{TimezoneOffset, format_git_date, interpolate};

/// Name and email written as both author and committer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    /// Builds an identity from user, config or flag input.
    ///
    /// Both fields are trimmed. The values end up inside generated shell
    /// scripts and one-line todo entries, so control characters (newlines in
    /// particular) are rejected instead of being passed through.
    ///
    /// # Returns
    ///
    /// * `Err(MissingIdentity)` - Either field is empty after trimming.
    /// * `Err(InvalidIdentity)` - Either field contains a control character.
    pub fn new(name: &str, email: &str) -> Result<Self, RewriteError> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() || email.is_empty() {
            return Err(RewriteError::MissingIdentity);
        }
        for (field, value) in [("name", name), ("email", email)] {
            if value.chars().any(char::is_control) {
                return Err(RewriteError::InvalidIdentity {
                    field,
                    value: value.to_string(),
                });
            }
        }
        Ok(Self {
            name: name.to_string(),
            email: email.to_string(),
        })
    }

    /// `Name <email>`, the form `git commit --author` takes.
    pub fn author_line(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }
}

/// The interval commit dates are spread over.
///
/// Construction guarantees `start <= end`; equal bounds are allowed and give
/// every commit the same date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    /// # Returns
    ///
    /// * `Err(EndBeforeStart)` if `end` is earlier than `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, RewriteError> {
        if end < start {
            return Err(RewriteError::EndBeforeStart);
        }
        Ok(Self { start, end })
    }

    /// Every commit would get the same date.
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }
}

/// What a single commit is rewritten to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub commit: String,
    /// Git-formatted date, `None` when dates are left alone.
    pub date: Option<String>,
}

/// Per-commit targets for one rewrite, oldest commit first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewritePlan {
    pub identity: Identity,
    pub entries: Vec<PlanEntry>,
}

impl RewritePlan {
    /// Pairs every commit with its target date.
    ///
    /// # Parameters
    ///
    /// * `commits` - Hashes oldest first, as returned by `Git::list_commits`.
    /// * `identity` - Author and committer for every commit.
    /// * `window` - When set, commit `i` of `n` gets the `i`-th of `n` evenly
    ///   spaced instants in it, rendered in `tz`. When `None`, dates are kept.
    /// * `tz` - Offset the dates are written in.
    ///
    /// # Returns
    ///
    /// * `Err(NoCommits)` if `commits` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use git_history_rewrite::plan::{Identity, RewritePlan};
    /// use git_history_rewrite::timestamps::TimezoneOffset;
    ///
    /// let id = Identity::new("Jane Doe", "jane@example.com").unwrap();
    /// let commits = vec!["a1".to_string(), "b2".to_string()];
    /// let plan = RewritePlan::build(&commits, id, None, TimezoneOffset::default()).unwrap();
    /// assert_eq!(plan.len(), 2);
    /// assert!(!plan.rewrites_dates());
    /// ```
    pub fn build(
        commits: &[String],
        identity: Identity,
        window: Option<DateWindow>,
        tz: TimezoneOffset,
    ) -> Result<Self, RewriteError> {
        if commits.is_empty() {
            return Err(RewriteError::NoCommits);
        }

        let dates: Vec<Option<String>> = match window {
            Some(w) => interpolate(commits.len(), w.start, w.end)
                .into_iter()
                .map(|at| Some(format_git_date(at, tz)))
                .collect(),
            None => vec![None; commits.len()],
        };

        let entries = commits
            .iter()
            .zip(dates)
            .map(|(commit, date)| PlanEntry {
                commit: commit.clone(),
                date,
            })
            .collect();

        Ok(Self { identity, entries })
    }

    /// `true` when at least one commit gets a new date.
    pub fn rewrites_dates(&self) -> bool {
        self.entries.iter().any(|e| e.date.is_some())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn commits(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{:040x}", i + 1)).collect()
    }

    fn jane() -> Identity {
        Identity::new("Jane Doe", "jane@example.com").unwrap()
    }

    #[test]
    fn identity_trims_and_requires_both_fields() {
        let id = Identity::new("  Jane ", " jane@example.com\n").unwrap();
        assert_eq!(id.author_line(), "Jane <jane@example.com>");
        assert!(matches!(
            Identity::new("Jane", "   "),
            Err(RewriteError::MissingIdentity)
        ));
        assert!(Identity::new("", "jane@example.com").is_err());
    }

    #[test]
    fn identity_rejects_embedded_newlines() {
        match Identity::new("Jane\nexec touch owned", "jane@example.com") {
            Err(RewriteError::InvalidIdentity { field, .. }) => assert_eq!(field, "name"),
            other => panic!("unexpected result: {:?}", other),
        }
        match Identity::new("Jane", "jane@example.com\r\nexec true") {
            Err(RewriteError::InvalidIdentity { field, .. }) => assert_eq!(field, "email"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(Identity::new("Zoë O'Brien", "zoe@example.com").is_ok());
    }

    #[test]
    fn window_rejects_end_before_start() {
        let start = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert!(matches!(
            DateWindow::new(start, end),
            Err(RewriteError::EndBeforeStart)
        ));
        assert!(DateWindow::new(start, start).unwrap().is_degenerate());
    }

    #[test]
    fn empty_commit_list_is_an_error() {
        let err = RewritePlan::build(&[], jane(), None, TimezoneOffset::default()).unwrap_err();
        assert!(matches!(err, RewriteError::NoCommits));
    }

    #[test]
    fn identity_only_plan_has_no_dates() {
        let plan = RewritePlan::build(&commits(3), jane(), None, TimezoneOffset::default()).unwrap();
        assert_eq!(plan.len(), 3);
        assert!(!plan.rewrites_dates());
    }

    #[test]
    fn dated_plan_spreads_over_window_in_utc() {
        let window = DateWindow::new(
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 1, 2, 0, 0).unwrap(),
        )
        .unwrap();
        let tz = TimezoneOffset::parse("+00:00").unwrap();
        let plan = RewritePlan::build(&commits(3), jane(), Some(window), tz).unwrap();

        let dates: Vec<_> = plan.entries.iter().map(|e| e.date.clone().unwrap()).collect();
        assert_eq!(
            dates,
            vec![
                "2025-01-01 00:00:00 +0000",
                "2025-01-01 01:00:00 +0000",
                "2025-01-01 02:00:00 +0000",
            ]
        );
        assert_eq!(plan.entries[0].commit, commits(3)[0]);
    }

    #[test]
    fn dated_plan_renders_in_requested_offset() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let window = DateWindow::new(start, start).unwrap();
        let tz = TimezoneOffset::parse("+05:30").unwrap();
        let plan = RewritePlan::build(&commits(1), jane(), Some(window), tz).unwrap();
        assert_eq!(
            plan.entries[0].date.as_deref(),
            Some("2025-01-01 05:30:00 +0530")
        );
    }
}
