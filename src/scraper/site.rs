//! The external job-listing site is a black box (see Non-goals): this
//! module owns the one detail that isn't — the `time_filter` → search-URL
//! parameter mapping — plus a minimal card/detail parser so the rest of
//! the pipeline has something to iterate over. The HTML selectors below
//! are an implementation detail of that external site, not a contract.

use super::models::JobCard;
use scraper::{Html, Selector};

const BASE_SEARCH_URL: &str = "https://jobs.example.com/search";
pub const LISTINGS_PER_PAGE: usize = 25;

/// Maps a `time_filter` value onto the site's `f_TPR` search parameter.
/// Absent or unrecognized filters omit the parameter entirely.
pub fn time_filter_param(time_filter: Option<&str>) -> Option<&'static str> {
    match time_filter {
        Some("24h") => Some("r86400"),
        Some("1w") => Some("r604800"),
        Some("1m") => Some("r2592000"),
        _ => None,
    }
}

pub fn search_url(title: &str, location: &str, time_filter: Option<&str>, page: usize) -> String {
    let mut url = format!(
        "{BASE_SEARCH_URL}?keywords={}&location={}&start={}",
        urlencode(title),
        urlencode(location),
        page * LISTINGS_PER_PAGE
    );
    if let Some(param) = time_filter_param(time_filter) {
        url.push_str("&f_TPR=");
        url.push_str(param);
    }
    url
}

fn urlencode(value: &str) -> String {
    value.replace(' ', "%20")
}

/// Parses a search-results page into cards, dropping any card missing
/// `title`, `company`, or `url`.
pub fn parse_search_results(html: &str) -> Vec<JobCard> {
    let document = Html::parse_document(html);
    let card_selector = Selector::parse("div.job-card").unwrap();
    let title_selector = Selector::parse(".job-title").unwrap();
    let company_selector = Selector::parse(".job-company").unwrap();
    let location_selector = Selector::parse(".job-location").unwrap();
    let link_selector = Selector::parse("a.job-link").unwrap();
    let date_selector = Selector::parse(".job-date-posted").unwrap();

    document
        .select(&card_selector)
        .filter_map(|card| {
            let title = text_of(&card, &title_selector)?;
            let company = text_of(&card, &company_selector)?;
            let url = card
                .select(&link_selector)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(str::to_string)?;
            let location = text_of(&card, &location_selector).unwrap_or_default();
            let date_posted = text_of(&card, &date_selector);

            Some(JobCard {
                title,
                company,
                location,
                url,
                date_posted,
            })
        })
        .collect()
}

/// Parses a job-detail page into its full description text, used both for
/// display and as the LLM skill-extraction input.
pub fn parse_detail_description(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(".job-description").ok()?;
    text_of(&document.root_element(), &selector)
}

fn text_of(
    scope: &scraper::ElementRef<'_>,
    selector: &Selector,
) -> Option<String> {
    scope.select(selector).next().map(|el| {
        el.text().collect::<Vec<_>>().join(" ").trim().to_string()
    })
}
