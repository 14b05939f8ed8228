// src/feed/render.rs
use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::feed::store::{FeedState, FeedUser, Notice, NoticeLevel};
use crate::models::post::Post;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

/// Compact age such as "45s ago" or "3w ago". Future timestamps read "just now".
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - then).num_seconds();
    if diff < 0 {
        return "just now".to_string();
    }
    if diff < MINUTE {
        return format!("{}s ago", diff.max(1));
    }

    let units = [(YEAR, "y"), (MONTH, "mo"), (WEEK, "w"), (DAY, "d"), (HOUR, "h"), (MINUTE, "m")];
    for (secs, label) in units {
        let n = diff / secs;
        if n >= 1 {
            return format!("{}{} ago", n, label);
        }
    }
    "just now".to_string()
}

/// Up to two uppercase initials from a display name.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

fn author_name(post: &Post) -> &str {
    post.author
        .username
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or("Creator")
}

pub fn render_post(post: &Post, now: DateTime<Utc>, out: &mut String) {
    let name = author_name(post);
    let _ = writeln!(out, "[{}] {} · {}", initials(name), name, relative_time(post.created_at, now));
    let _ = writeln!(out, "  {}", post.title);
    for line in post.content.lines() {
        let _ = writeln!(out, "  {}", line);
    }
    if let Some(url) = &post.image_url {
        let _ = writeln!(out, "  [image] {}", url);
    }
    if post.updated_at.is_some() {
        let _ = writeln!(out, "  (edited)");
    }
}

/// Text rendering of the whole feed view, one block per state.
pub fn render_feed(state: &FeedState<'_>, user: Option<&FeedUser>, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    match state {
        FeedState::Idle => {
            out.push_str("Share moments with the community\n");
            out.push_str("Log in to discover posts and create your own.\n");
        }
        FeedState::Loading => out.push_str("Loading feed...\n"),
        FeedState::Error(message) => {
            let _ = writeln!(out, "! {}", message);
            out.push_str("Retry to load the feed again.\n");
        }
        FeedState::Empty => out.push_str("No posts yet. Share the first one!\n"),
        FeedState::Populated(posts) => {
            if let Some(user) = user {
                let _ = writeln!(out, "Welcome back, {}\n", user.username);
            }
            for (i, post) in posts.iter().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                render_post(post, now, &mut out);
            }
        }
    }
    out
}

pub fn render_notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Success => format!("✓ {}", notice.message),
        NoticeLevel::Error => format!("✗ {}", notice.message),
    }
}
