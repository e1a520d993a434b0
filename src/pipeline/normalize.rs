use serde_json::Value;

use super::classify::Classifier;
use super::dates::{format_date, DateParser};
use super::skills::SkillExtractor;
use crate::posting::{CanonicalPosting, MatchReasons, RawPosting};

// First non-empty alias wins (dates: first one that parses).
const TITLE: &[&str] = &["title", "position"];
const COMPANY: &[&str] = &["company", "company_name"];
const LOCATION: &[&str] = &["location", "candidate_required_location", "region"];
const JOB_URL: &[&str] = &["job_url", "url", "link"];
const DESCRIPTION: &[&str] = &["description"];
const SOURCE: &[&str] = &["source"];
const SALARY: &[&str] = &["salary"];
const DATE: &[&str] = &[
    "date_posted",
    "publication_date",
    "date",
    "pubDate",
    "created_at",
    "epoch",
];
const REMOTE_FLAG: &[&str] = &["remote", "is_remote"];

/// Maps any raw record onto the canonical schema. Total: absent or oddly
/// typed fields fall back to empty values.
pub struct Normalizer {
    skills: Box<dyn SkillExtractor>,
    dates: Box<dyn DateParser>,
    remote: Classifier,
}

impl Normalizer {
    pub fn new(
        skills: Box<dyn SkillExtractor>,
        dates: Box<dyn DateParser>,
        remote: Classifier,
    ) -> Self {
        Self {
            skills,
            dates,
            remote,
        }
    }

    pub fn normalize(&self, raw: RawPosting) -> CanonicalPosting {
        let title = first_text(&raw, TITLE);
        let company = first_text(&raw, COMPANY);
        let location = first_text(&raw, LOCATION);
        let tags = tags(raw.get("tags"));
        let job_url = first_text(&raw, JOB_URL);
        let description = first_text(&raw, DESCRIPTION);
        let source = first_text(&raw, SOURCE);
        let salary = salary(&raw);

        let date_posted = DATE
            .iter()
            .filter_map(|k| raw.get(*k))
            .find_map(|v| self.dates.parse(&text(v)))
            .map(format_date);

        let flagged = REMOTE_FLAG
            .iter()
            .any(|k| matches!(raw.get(*k), Some(Value::Bool(true))));
        let is_remote = flagged || self.remote.is_remote(&title, &location, &tags, &source);

        CanonicalPosting {
            skills: self.skills.extract(&description),
            title,
            company,
            location,
            tags,
            job_url,
            description,
            source,
            date_posted,
            salary,
            is_remote,
            match_reasons: MatchReasons::default(),
            raw,
        }
    }
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn first_text(raw: &RawPosting, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|k| raw.get(*k))
        .map(text)
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

/// Arrays keep their order (and repeats); a plain string is read as a
/// comma-separated list.
fn tags(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter(|v| v.is_string() || v.is_number())
            .map(text)
            .filter(|t| !t.is_empty())
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

fn salary(raw: &RawPosting) -> String {
    let stated = first_text(raw, SALARY);
    if !stated.is_empty() {
        return stated;
    }
    let bound = |key: &str| {
        raw.get(key)
            .and_then(Value::as_f64)
            .filter(|n| *n > 0.0)
            .map(|n| format!("{}", n.round() as i64))
    };
    match (bound("salary_min"), bound("salary_max")) {
        (Some(lo), Some(hi)) => format!("{lo}-{hi}"),
        (Some(one), None) | (None, Some(one)) => one,
        (None, None) => String::new(),
    }
}
