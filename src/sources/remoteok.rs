use serde_json::Value;

use super::{tag_record, Source};
use crate::error::FetchError;
use crate::posting::RawPosting;

pub const ENDPOINT: &str = "https://remoteok.com/api";

/// The API answers with one array; its first element is a legal notice, not a job.
pub fn parse(body: &str) -> Result<Vec<RawPosting>, FetchError> {
    let items: Vec<Value> =
        serde_json::from_str(body).map_err(|e| FetchError::decode("remoteok api", e))?;

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) if !map.contains_key("legal") => Some(map),
            _ => None,
        })
        .map(|map| tag_record(map, Source::RemoteOk))
        .collect())
}
