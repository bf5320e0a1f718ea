//! Renders a [`RewritePlan`] into the input each rewrite strategy consumes.

use crate::git::shell_quote;
use crate::plan::RewritePlan;

/// Shell fragment for `git filter-branch --env-filter`.
///
/// Identity variables are set for every commit. When the plan carries dates,
/// a `case` on `$GIT_COMMIT` (the original hash) sets both dates per commit;
/// commits not listed keep theirs.
pub fn render_env_filter(plan: &RewritePlan) -> String {
    let name = shell_quote(&plan.identity.name);
    let email = shell_quote(&plan.identity.email);

    let mut s = format!(
        "GIT_AUTHOR_NAME={name}\nGIT_AUTHOR_EMAIL={email}\n\
         GIT_COMMITTER_NAME={name}\nGIT_COMMITTER_EMAIL={email}\n"
    );
    s.push_str("export GIT_AUTHOR_NAME GIT_AUTHOR_EMAIL GIT_COMMITTER_NAME GIT_COMMITTER_EMAIL\n");

    if !plan.rewrites_dates() {
        return s;
    }

    s.push_str("case \"$GIT_COMMIT\" in\n");
    for entry in &plan.entries {
        let Some(date) = &entry.date else {
            continue;
        };
        let date = shell_quote(date);
        s.push_str(&format!(
            "  {})\n    GIT_AUTHOR_DATE={date}\n    GIT_COMMITTER_DATE={date}\n",
            entry.commit
        ));
        s.push_str("    export GIT_AUTHOR_DATE GIT_COMMITTER_DATE\n");
        s.push_str("    ;;\n");
    }
    s.push_str("esac\n");
    s
}

/// Todo list for `git rebase -i --root`.
///
/// Each commit is picked, then amended in place by an `exec` line that sets
/// the committer through the environment and the author through `--author`.
pub fn render_rebase_todo(plan: &RewritePlan) -> String {
    let committer = format!(
        "GIT_COMMITTER_NAME={} GIT_COMMITTER_EMAIL={}",
        shell_quote(&plan.identity.name),
        shell_quote(&plan.identity.email)
    );
    let author = shell_quote(&plan.identity.author_line());

    let mut s = String::new();
    for entry in &plan.entries {
        s.push_str(&format!("pick {}\n", entry.commit));
        let exec = match &entry.date {
            Some(date) => {
                let date = shell_quote(date);
                format!(
                    "exec {committer} GIT_COMMITTER_DATE={date} GIT_AUTHOR_DATE={date} \
                     git commit --amend --no-edit --author={author} --date={date}\n"
                )
            }
            None => format!("exec {committer} git commit --amend --no-edit --author={author}\n"),
        };
        s.push_str(&exec);
    }
    s
}
