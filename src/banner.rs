use console::{measure_text_width, style};
use std::iter;

use crate::plan::RewritePlan;
use crate::rewrite::{Settings, Strategy};

/// Prints a framed, colorized summary of the rewrite about to happen.
///
/// The banner is dynamically sized to fit the widest **visible** line of text,
/// using [`console::measure_text_width`] to ignore ANSI color codes when
/// calculating padding. It is framed with Unicode box-drawing characters
/// (`╔═╗`, `║ ║`, `╚═╝`) and uses [`console::style`] for coloring and bolding.
///
/// Borders are styled independently from the inner text so that embedded color
/// codes inside the content do not affect the color of the box edges.
pub fn print_banner(settings: &Settings, plan: &RewritePlan) {
    let lines = banner_lines(settings, plan);

    let max_width = lines
        .iter()
        .map(|l| measure_text_width(l)) // ignore ANSI in content
        .max()
        .unwrap_or(0)
        + 2;

    let border = "═".repeat(max_width);
    let top = style(format!("╔{}╗", border)).blue().bold();
    let bottom = style(format!("╚{}╝", border)).blue().bold();
    let left = style("║ ").blue().bold().to_string();
    let right = style("║").blue().bold().to_string();

    println!();
    println!("{top}");
    for line in lines {
        let visible = measure_text_width(&line);
        let pad = max_width - visible; // includes the one space after left border
        println!("{}{}{}{}", left, line, " ".repeat(pad - 1), right);
    }
    println!("{bottom}");
    println!();
}

/// Constructs the lines of text for the summary banner.
///
/// Order: title, strategy notes, the targets (remote, commits, dates,
/// identity), then the steps that will run. Strategy lines carry ANSI
/// styling, so measure them with `console::measure_text_width`.
fn banner_lines(settings: &Settings, plan: &RewritePlan) -> Vec<String> {
    let top = [
        format!("Rewrite history of {}", settings.repo_name),
        String::new(),
    ]
    .into_iter();

    let mode = match settings.strategy {
        Strategy::EnvFilter => vec![
            style("Strategy: env-filter (every branch, merges preserved).")
                .cyan()
                .bold()
                .to_string(),
            style("(Use --strategy rebase to replay the current branch instead.)")
                .cyan()
                .to_string(),
        ],
        Strategy::Rebase => vec![
            style("Strategy: rebase (current branch only, merges flattened).")
                .yellow()
                .bold()
                .to_string(),
        ],
    }
    .into_iter();

    let dates = match (
        plan.entries.first().and_then(|e| e.date.as_deref()),
        plan.entries.last().and_then(|e| e.date.as_deref()),
    ) {
        (Some(first), Some(last)) => format!("Dates: {} .. {}", first, last),
        _ => String::from("Dates: unchanged"),
    };

    let push_step = if settings.force_push {
        "  4) Force-push all branches to origin"
    } else {
        "  4) Ask before force-pushing all branches"
    };

    let bottom = iter::once(String::new())
        .chain([
            format!("Remote origin: {}", settings.remote_url),
            format!("Commits: {}", plan.len()),
            dates,
            format!("Author and committer: {}", plan.identity.author_line()),
            String::new(),
        ])
        .chain(
            [
                "This tool will:",
                "  1) Point origin at the new URL",
                "  2) Rewrite every commit",
                "  3) Expire reflogs and run an aggressive gc",
                push_step,
            ]
            .into_iter()
            .map(|s| s.to_string()),
        );

    top.chain(mode).chain(bottom).collect()
}
