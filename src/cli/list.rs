//! List command - open pull requests carrying the target label

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, hyperlink, spinner_style};
use anstream::println;
use gatekeep::error::Result;
use indicatif::ProgressBar;
use std::path::Path;
use std::time::Duration;

/// Run the list command
#[allow(clippy::future_not_send)]
pub async fn run_list(config_path: Option<&Path>, after: Option<&str>, limit: u32) -> Result<()> {
    let ctx = CommandContext::new(config_path).await?;
    let github = &ctx.config.github;
    let labels = [github.target_label.clone()];

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message(format!(
        "Listing {}/{} PRs labeled {}...",
        github.organization, github.repository, github.target_label
    ));
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = ctx
        .platform
        .list_pull_requests(
            &github.organization,
            &github.repository,
            &labels,
            limit,
            after,
        )
        .await;
    spinner.finish_and_clear();
    let page = result?;

    if page.entries.is_empty() {
        println!(
            "{}",
            format!("No open PRs labeled {}.", github.target_label).muted()
        );
        return Ok(());
    }

    println!(
        "{} open PRs labeled {}:",
        page.total_count.to_string().emphasis(),
        github.target_label.accent()
    );
    for pr in &page.entries {
        let draft = if pr.is_draft { " (draft)" } else { "" };
        println!(
            "  {} {}{}",
            hyperlink(&format!("#{}", pr.number), &pr.url).accent(),
            pr.title,
            draft.muted()
        );
    }

    if page.has_next_page
        && let Some(cursor) = &page.end_cursor
    {
        println!();
        println!("{} --after {cursor}", "More:".muted());
    }

    Ok(())
}
