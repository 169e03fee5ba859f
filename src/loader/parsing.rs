//! Pure helpers for the loader's per-record validation step: date
//! parsing, the idempotency key, and within-listing skill dedup. Kept
//! free of I/O so they're exercised directly by unit tests.

use super::models::{NewJob, ScrapedListing};
use chrono::NaiveDate;
use std::collections::HashSet;

/// Parses `YYYY-MM-DD`, tolerant of an embedded space or `T` separator
/// before a trailing time component. Malformed input yields `None`
/// rather than an error, matching the original's "null on failure"
/// behavior.
pub fn parse_date_posted(value: &str) -> Option<NaiveDate> {
    let date_part = value.split([' ', 'T']).next().unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// `(lower(title), lower(company))`, the idempotency key the loader
/// dedups against both the DB's existing rows and records within the
/// same batch.
pub fn idempotency_key(title: &str, company: &str) -> (String, String) {
    (title.to_lowercase(), company.to_lowercase())
}

/// Case-sensitive, stripped dedup of a single listing's skill list,
/// preserving first-seen order.
pub fn dedup_skills(skills: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for skill in skills {
        let trimmed = skill.trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_string()) {
            result.push(trimmed.to_string());
        }
    }
    result
}

/// `title`, `company`, and `location` must all be present and non-blank
/// for a listing to be persistable.
pub fn is_valid_listing(listing: &ScrapedListing) -> bool {
    !listing.title.trim().is_empty()
        && !listing.company.trim().is_empty()
        && !listing.location.trim().is_empty()
}

/// Validates, parses, and prepares one listing for insertion. Returns
/// `None` for listings that fail validation; duplicate detection against
/// already-seen keys is the caller's responsibility since it spans the
/// whole batch plus the DB's existing rows.
pub fn prepare_listing(listing: &ScrapedListing) -> Option<NewJob> {
    if !is_valid_listing(listing) {
        return None;
    }
    Some(NewJob {
        title: listing.title.clone(),
        company_name: listing.company.clone(),
        location: listing.location.clone(),
        job_url: listing.url.clone(),
        date_posted: listing.date_posted.as_deref().and_then(parse_date_posted),
        skills: dedup_skills(&listing.extracted_skills),
    })
}
