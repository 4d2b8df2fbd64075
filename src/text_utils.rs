use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::post::Post;
use crate::view::RenderMode;

pub const INVALID_DATE: &str = "Invalid Date";

pub fn parse_post_date(buf: &str) -> Option<NaiveDate> {
    let buf = buf.trim();
    if let Ok(date) = NaiveDate::parse_from_str(buf, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date_time) = DateTime::parse_from_rfc3339(buf) {
        return Some(date_time.date_naive());
    }
    NaiveDateTime::parse_from_str(buf, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|dt| dt.date())
        .ok()
}

/// Long English date, e.g. `October 15, 2023`
pub fn format_date(buf: &str) -> String {
    match parse_post_date(buf) {
        Some(date) => date.format("%B %-d, %Y").to_string(),
        None => INVALID_DATE.to_string(),
    }
}

/// Newest first. Posts whose date does not parse go last, keeping their order.
pub fn sort_by_date_desc(posts: &mut [Post]) {
    posts.sort_by(|a, b| {
        match (parse_post_date(&a.date), parse_post_date(&b.date)) {
            (Some(da), Some(db)) => db.cmp(&da),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

pub fn paragraphs(text: &str) -> Vec<&str> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .collect()
}

/// One `<p>` block per line of `text`
pub fn format_content(text: &str, mode: RenderMode) -> String {
    let mut res = String::with_capacity(text.len() + 16);
    for paragraph in paragraphs(text) {
        res.push_str("<p>");
        res.push_str(&mode.text(paragraph));
        res.push_str("</p>");
    }
    res
}

pub fn excerpt(text: &str, max_chars: usize) -> String {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.chars().count() <= max_chars {
        return text;
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}
