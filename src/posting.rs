use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A source record exactly as a fetch step produced it. Any field may be
/// missing or carry an unexpected type.
pub type RawPosting = Map<String, Value>;

/// Recorded only for postings that passed the classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReasons {
    pub role_keywords: Vec<String>,
    pub entry_keywords: Vec<String>,
    pub remote_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub tags: Vec<String>,
    pub job_url: String,
    pub description: String,
    pub skills: BTreeSet<String>,
    pub source: String,
    /// `YYYY-MM-DD`, or null when the source date could not be read.
    pub date_posted: Option<String>,
    pub salary: String,
    pub is_remote: bool,
    pub match_reasons: MatchReasons,
    pub raw: RawPosting,
}

#[cfg(test)]
impl MatchReasons {
    pub fn is_empty(&self) -> bool {
        self.role_keywords.is_empty()
            && self.entry_keywords.is_empty()
            && self.remote_keywords.is_empty()
    }
}
