//! Field rules shared by portal page creation and update.
//!
//! Length limits are declared with `validator` attributes on parameter
//! structs; the functions below cover what attributes cannot express.

use std::sync::LazyLock;

use regex_lite::Regex;
use url::Url;
use validator::ValidationError;

pub const SLUG_MIN_LENGTH: u64 = 3;
pub const SLUG_MAX_LENGTH: u64 = 50;
pub const TITLE_MAX_LENGTH: u64 = 100;
pub const TEXT_MAX_LENGTH: u64 = 500;

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").unwrap());

/// Slugs that collide with application routes.
pub const RESERVED_SLUGS: &[&str] = &[
    "admin", "api", "static", "public", "auth", "login", "signup", "help",
    "about", "terms", "privacy",
];

/// Check slug shape and reservation. Length is checked separately.
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if !SLUG_RE.is_match(slug) {
        return Err(ValidationError::new("slug").with_message(
            "slug must contain only lowercase letters, numbers, and hyphens".into(),
        ));
    }

    if RESERVED_SLUGS.contains(&slug) {
        return Err(ValidationError::new("slug")
            .with_message(format!("slug '{slug}' is reserved").into()));
    }

    Ok(())
}

pub fn validate_theme(theme: &str) -> Result<(), ValidationError> {
    match theme {
        "light" | "dark" => Ok(()),
        _ => Err(ValidationError::new("theme")
            .with_message("theme must be one of: light, dark".into())),
    }
}

/// Accept empty values, otherwise require an absolute URL.
pub fn validate_optional_url(url: &str) -> Result<(), ValidationError> {
    if url.is_empty() {
        return Ok(());
    }

    validate_url(url)
}

/// Require an absolute URL.
pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    Url::parse(url)
        .map(|_| ())
        .map_err(|_| ValidationError::new("url"))
}

/// Turn `Some("")` into `None`.
///
/// Update requests treat empty strings as "unchanged".
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}
