use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::fetcher::PageGetter;
use super::{tag_record, Source};
use crate::error::FetchError;
use crate::posting::RawPosting;

pub const ENDPOINT: &str = "https://www.arbeitnow.com/api/job-board-api";

#[derive(Deserialize)]
struct Page {
    #[serde(default)]
    data: Vec<Value>,
    #[serde(default)]
    links: Links,
}

#[derive(Deserialize, Default)]
struct Links {
    next: Option<String>,
}

/// One page of postings and whether another page follows.
pub fn parse(body: &str) -> Result<(Vec<RawPosting>, bool), FetchError> {
    let page: Page =
        serde_json::from_str(body).map_err(|e| FetchError::decode("arbeitnow page", e))?;
    let has_next = page.links.next.is_some_and(|n| !n.is_empty());
    let jobs = page
        .data
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(map) => Some(tag_record(map, Source::Arbeitnow)),
            _ => None,
        })
        .collect();
    Ok((jobs, has_next))
}

/// Pages 1..=max_pages, stopping early at an empty page or a missing `next`
/// link. Any page error fails the whole fetch.
pub async fn fetch_pages<G: PageGetter>(
    fetcher: &mut G,
    max_pages: usize,
) -> Result<Vec<RawPosting>, FetchError> {
    let mut all = Vec::new();
    for page in 1..=max_pages.max(1) {
        let body = fetcher.get_text(&format!("{}?page={}", ENDPOINT, page)).await?;
        let (jobs, has_next) = parse(&body)?;
        debug!(page, count = jobs.len(), "arbeitnow page");
        if jobs.is_empty() {
            break;
        }
        all.extend(jobs);
        if !has_next {
            break;
        }
    }
    Ok(all)
}
