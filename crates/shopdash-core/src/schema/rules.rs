//! Field rules shared by every schema that carries the field.
//!
//! The product rules are used by both the full product schema and the
//! add-product projection, so creation and full-entity validation cannot
//! drift apart.

use std::sync::LazyLock;

use chrono::DateTime;
use regex::Regex;
use serde_json::{Map, Value};

use super::violation::{child_path, describe, Checker, Constraint};

pub(super) const TITLE_MIN_CHARS: usize = 3;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("valid regex")
});

pub(super) fn url(cx: &mut Checker, path: &str, value: &Value) -> Option<String> {
    let raw = cx.as_string(path, value)?;
    match reqwest::Url::parse(&raw) {
        Ok(_) => Some(raw),
        Err(e) => {
            cx.violate(path, Constraint::Url, format!("{}: {e}", describe(value)));
            None
        }
    }
}

pub(super) fn url_field(cx: &mut Checker, map: &Map<String, Value>, path: &str) -> Option<String> {
    let value = cx.required(map, path)?;
    url(cx, path, value)
}

pub(super) fn email_field(
    cx: &mut Checker,
    map: &Map<String, Value>,
    path: &str,
) -> Option<String> {
    let raw = cx.string(map, path)?;
    if is_email(&raw) {
        Some(raw)
    } else {
        cx.violate(path, Constraint::Email, format!("not an email address: \"{raw}\""));
        None
    }
}

fn is_email(raw: &str) -> bool {
    !raw.starts_with('.') && !raw.contains("..") && EMAIL_RE.is_match(raw)
}

/// RFC 3339 timestamps in UTC only (`Z` suffix); offsets are rejected.
pub(super) fn datetime_field(
    cx: &mut Checker,
    map: &Map<String, Value>,
    path: &str,
) -> Option<String> {
    let raw = cx.string(map, path)?;
    let utc = raw.ends_with('Z') || raw.ends_with('z');
    match DateTime::parse_from_rfc3339(&raw) {
        Ok(_) if utc => Some(raw),
        Ok(_) => {
            cx.violate(path, Constraint::DateTime, format!("offset not allowed: \"{raw}\""));
            None
        }
        Err(e) => {
            cx.violate(path, Constraint::DateTime, format!("\"{raw}\": {e}"));
            None
        }
    }
}

pub(super) fn review_rating(
    cx: &mut Checker,
    map: &Map<String, Value>,
    path: &str,
) -> Option<u8> {
    let rating = cx.unsigned(map, path)?;
    match u8::try_from(rating) {
        Ok(r) if (1..=5).contains(&r) => Some(r),
        _ => {
            cx.violate(path, Constraint::Range, format!("expected 1..=5, got {rating}"));
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Product fields
// ---------------------------------------------------------------------------

pub(super) fn title(cx: &mut Checker, map: &Map<String, Value>, parent: &str) -> Option<String> {
    let path = child_path(parent, "title");
    let title = cx.string(map, &path)?;
    if title.chars().count() >= TITLE_MIN_CHARS {
        Some(title)
    } else {
        cx.violate(
            &path,
            Constraint::MinLength,
            format!("title must be at least {TITLE_MIN_CHARS} characters, got \"{title}\""),
        );
        None
    }
}

pub(super) fn price(cx: &mut Checker, map: &Map<String, Value>, parent: &str) -> Option<f64> {
    let path = child_path(parent, "price");
    let price = cx.number(map, &path)?;
    if price > 0.0 {
        Some(price)
    } else {
        cx.violate(&path, Constraint::Positive, format!("price must be positive, got {price}"));
        None
    }
}

pub(super) fn stock(cx: &mut Checker, map: &Map<String, Value>, parent: &str) -> Option<u64> {
    cx.unsigned(map, &child_path(parent, "stock"))
}

/// `Err(())` means a violation was recorded; `Ok(None)` means absent.
pub(super) fn brand(
    cx: &mut Checker,
    map: &Map<String, Value>,
    parent: &str,
) -> Result<Option<String>, ()> {
    cx.optional_string(map, &child_path(parent, "brand"))
}

pub(super) fn category(cx: &mut Checker, map: &Map<String, Value>, parent: &str) -> Option<String> {
    cx.string(map, &child_path(parent, "category"))
}

pub(super) fn description(
    cx: &mut Checker,
    map: &Map<String, Value>,
    parent: &str,
) -> Option<String> {
    cx.string(map, &child_path(parent, "description"))
}
