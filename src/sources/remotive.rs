use serde::Deserialize;

use super::{tag_record, Source};
use crate::error::FetchError;
use crate::posting::RawPosting;

pub const ENDPOINT: &str = "https://remotive.com/api/remote-jobs?category=data";

#[derive(Deserialize)]
struct Listing {
    #[serde(default)]
    jobs: Vec<serde_json::Value>,
}

pub fn parse(body: &str) -> Result<Vec<RawPosting>, FetchError> {
    let listing: Listing =
        serde_json::from_str(body).map_err(|e| FetchError::decode("remotive api", e))?;
    Ok(listing
        .jobs
        .into_iter()
        .filter_map(|v| match v {
            serde_json::Value::Object(map) => Some(tag_record(map, Source::Remotive)),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_jobs_array() {
        let body = std::fs::read_to_string("tests/fixtures/remotive.json").unwrap();
        let jobs = parse(&body).unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[1]["company_name"], "Datawerk");
        assert!(jobs.iter().all(|j| j["source"] == "remotive"));
    }

    #[test]
    fn missing_jobs_key_is_empty() {
        assert!(parse("{}").unwrap().is_empty());
    }
}
