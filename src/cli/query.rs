//! Query command - show the merge-readiness decision for one PR

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, hyperlink, icon, spinner_style};
use anstream::println;
use chrono::Utc;
use gatekeep::config::format_duration;
use gatekeep::error::{Error, Result};
use gatekeep::readiness::{Decision, ReviewPhase, decide};
use gatekeep::types::{PermissionSets, Review, ReviewState};
use indicatif::ProgressBar;
use std::path::Path;
use std::time::Duration;

/// Run the query command
#[allow(clippy::future_not_send)]
pub async fn run_query(config_path: Option<&Path>, number: u64, json: bool) -> Result<()> {
    let ctx = CommandContext::new(config_path).await?;
    let github = &ctx.config.github;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message(format!(
        "Fetching {}/{}#{number}...",
        github.organization, github.repository
    ));
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = decide(ctx.platform.as_ref(), number, github, Utc::now()).await;
    spinner.finish_and_clear();
    let decision = result?;

    if json {
        let rendered = serde_json::to_string_pretty(&decision)
            .map_err(|e| Error::Internal(format!("failed to serialize decision: {e}")))?;
        println!("{rendered}");
        return Ok(());
    }

    print_decision(&decision);
    Ok(())
}

fn print_decision(decision: &Decision) {
    let info = &decision.snapshot.info;

    let title = format!("#{} {}", info.number, info.title);
    println!("{}", hyperlink(&title, &info.url).emphasis());

    let mut meta = vec![info.state.to_string()];
    if info.is_draft {
        meta.push("draft".to_string());
    }
    if let Some(author) = &info.author_login {
        meta.push(format!("by {author}"));
    }
    println!("{}", meta.join(", ").muted());
    if !info.labels.is_empty() {
        println!("Labels: {}", info.labels.join(", ").accent());
    }
    println!();

    let requirements = &decision.requirements;
    println!("{}:", "Requirements".emphasis());
    println!(
        "  {} {}",
        icon(requirements.is_mergeable()),
        decision.snapshot.mergeable
    );
    println!(
        "  {} {}",
        icon(requirements.checks_passed()),
        decision.snapshot.status
    );
    println!(
        "  {} {} resolved, {} unresolved conversations",
        icon(requirements.conversations_resolved()),
        decision.snapshot.threads.resolved,
        requirements.unresolved_threads
    );
    println!(
        "  {} {} change requests",
        icon(requirements.no_change_requests()),
        requirements.change_requests
    );
    println!(
        "  {} {} approvals",
        icon(requirements.enough_approvals()),
        requirements.approvals
    );
    println!();

    if !decision.snapshot.latest_reviews.is_empty() {
        println!("{}:", "Reviews".emphasis());
        let mut reviews: Vec<&Review> = decision.snapshot.latest_reviews.iter().collect();
        reviews.sort_by_key(|r| r.submitted_at);
        for review in reviews {
            let starts_clock = decision.clock_start.as_ref() == Some(review);
            println!(
                "  {} {} {}{}",
                review_marker(review.state),
                reviewer_name(review, &decision.permissions),
                review
                    .submitted_at
                    .format("%Y-%m-%d %H:%M UTC")
                    .to_string()
                    .muted(),
                if starts_clock {
                    format!(" {}", "(clock start)".accent())
                } else {
                    String::new()
                }
            );
        }
        println!();
    }

    match (decision.phase, decision.wait) {
        (ReviewPhase::ReadyForMerge, Some(wait)) => println!(
            "{} {} since {}",
            icon(true),
            decision.phase.to_string().success(),
            wait.ready_at.format("%Y-%m-%d %H:%M UTC")
        ),
        (ReviewPhase::Waiting, Some(wait)) => println!(
            "{} {} until {} ({} left)",
            "…".warn(),
            decision.phase.to_string().warn(),
            wait.ready_at.format("%Y-%m-%d %H:%M UTC"),
            format_duration(wait.remaining)
        ),
        _ => println!("{} {}", icon(false), decision.phase.to_string().warn()),
    }

    let reasons = requirements.blocking_reasons();
    if !reasons.is_empty() {
        println!();
        println!("{}:", "Blocking".emphasis());
        for reason in reasons {
            println!("  {}", reason.muted());
        }
    }
}

fn review_marker(state: ReviewState) -> String {
    match state {
        ReviewState::Approved => icon(true),
        ReviewState::ChangesRequested => icon(false),
        other => format!("[{other}]").muted(),
    }
}

/// Designated reviewers are bold, other collaborators italic
fn reviewer_name(review: &Review, permissions: &PermissionSets) -> String {
    let Some(login) = review.author_login.as_deref() else {
        return "(unknown)".muted();
    };
    if permissions.is_designated_reviewer(login) {
        login.emphasis()
    } else if permissions.has_write_access(login) {
        login.slanted()
    } else {
        login.to_string()
    }
}
