//! Plain-text rendering of search results.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use skysift_core::PostRecord;
use skysift_search::ResultSet;

/// Short age of `then` relative to `now`: `42s ago`, `5m ago`, `3h ago`,
/// `6d ago`, or the calendar date once a week has passed.
pub fn relative_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);
    let mins = secs / 60;
    let hours = mins / 60;
    let days = hours / 24;

    if secs < 60 {
        format!("{secs}s ago")
    } else if mins < 60 {
        format!("{mins}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days < 7 {
        format!("{days}d ago")
    } else {
        then.format("%Y-%m-%d").to_string()
    }
}

fn post_age(post: &PostRecord, now: DateTime<Utc>) -> Option<String> {
    let raw = post.timestamp()?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(relative_age(ts.with_timezone(&Utc), now)),
        Err(_) => Some(raw.to_string()),
    }
}

/// One post as a text block.
pub fn render_post(post: &PostRecord, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = write!(out, "{} @{}", post.author.name(), post.author.handle);
    if let Some(age) = post_age(post, now) {
        let _ = write!(out, " · {age}");
    }
    out.push('\n');

    let text = post.text().trim();
    if !text.is_empty() {
        out.push_str(text);
        out.push('\n');
    }
    if post.embed.is_some() {
        out.push_str("[embed]\n");
    }

    let _ = writeln!(
        out,
        "{} replies  {} reposts  {} quotes  {} likes",
        post.reply_count, post.repost_count, post.quote_count, post.like_count
    );
    out.push_str(&post.web_url());
    out.push('\n');
    out
}

/// The whole result set, or its empty-state message.
pub fn render_results(result: &ResultSet, query: &str, now: DateTime<Utc>) -> String {
    if let Some(reason) = result.empty_reason() {
        return format!("{}\n", reason.message(query));
    }

    let mut out = format!("Search results for \"{query}\"\n");
    for post in &result.posts {
        out.push('\n');
        out.push_str(&render_post(post, now));
    }
    if result.missing() > 0 {
        let _ = write!(
            out,
            "\n({} matching posts could not be loaded)\n",
            result.missing()
        );
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
