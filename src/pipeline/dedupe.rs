use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::posting::CanonicalPosting;

const TITLE_KEY_CHARS: usize = 50;
const COMPANY_KEY_CHARS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateReason {
    Url,
    TitleCompany,
}

/// A posting dropped because an earlier survivor shared one of its keys.
#[derive(Debug, Clone)]
pub struct Duplicate {
    pub reason: DuplicateReason,
    pub key: String,
    pub posting: CanonicalPosting,
}

#[derive(Debug, Default)]
pub struct Deduped {
    pub kept: Vec<CanonicalPosting>,
    pub dropped: Vec<Duplicate>,
}

/// Lowercased title (50 chars) and company (30 chars).
pub fn title_company_key(job: &CanonicalPosting) -> String {
    let title: String = job.title.to_lowercase().chars().take(TITLE_KEY_CHARS).collect();
    let company: String = job.company.to_lowercase().chars().take(COMPANY_KEY_CHARS).collect();
    format!("{title}-{company}")
}

/// Keep the first posting per URL and per title+company, in input order.
/// Empty URLs never collide with each other.
pub fn dedupe(jobs: Vec<CanonicalPosting>) -> Deduped {
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut seen_titles: HashSet<String> = HashSet::new();
    let mut out = Deduped::default();

    for job in jobs {
        let tc_key = title_company_key(&job);

        let hit = if !job.job_url.is_empty() && seen_urls.contains(&job.job_url) {
            Some((DuplicateReason::Url, job.job_url.clone()))
        } else if seen_titles.contains(&tc_key) {
            Some((DuplicateReason::TitleCompany, tc_key.clone()))
        } else {
            None
        };

        if let Some((reason, key)) = hit {
            debug!(?reason, %key, "duplicate dropped");
            out.dropped.push(Duplicate {
                reason,
                key,
                posting: job,
            });
            continue;
        }

        if !job.job_url.is_empty() {
            seen_urls.insert(job.job_url.clone());
        }
        seen_titles.insert(tc_key);
        out.kept.push(job);
    }

    out
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::posting::{MatchReasons, RawPosting};

    fn job(url: &str, title: &str, company: &str) -> CanonicalPosting {
        CanonicalPosting {
            title: title.into(),
            company: company.into(),
            location: String::new(),
            tags: vec![],
            job_url: url.into(),
            description: String::new(),
            skills: BTreeSet::new(),
            source: "test".into(),
            date_posted: None,
            salary: String::new(),
            is_remote: true,
            match_reasons: MatchReasons::default(),
            raw: RawPosting::new(),
        }
    }

    fn titles(jobs: &[CanonicalPosting]) -> Vec<&str> {
        jobs.iter().map(|j| j.title.as_str()).collect()
    }

    #[test]
    fn same_url_keeps_the_first() {
        let out = dedupe(vec![
            job("http://a/3", "Data Analyst", "Acme"),
            job("http://a/3", "Junior Analyst", "Other"),
        ]);
        assert_eq!(titles(&out.kept), vec!["Data Analyst"]);
        assert_eq!(out.dropped.len(), 1);
        assert_eq!(out.dropped[0].reason, DuplicateReason::Url);
        assert_eq!(out.dropped[0].key, "http://a/3");
    }

    #[test]
    fn empty_urls_are_always_distinct() {
        let out = dedupe(vec![job("", "Data Analyst", "Acme"), job("", "BI Analyst", "Beta")]);
        assert_eq!(out.kept.len(), 2);
        assert!(out.dropped.is_empty());
    }

    #[test]
    fn title_and_company_collide_case_insensitively() {
        let out = dedupe(vec![
            job("http://a/1", "Data Analyst", "Acme"),
            job("http://b/1", "DATA ANALYST", "acme"),
            job("", "data analyst", "ACME"),
        ]);
        assert_eq!(out.kept.len(), 1);
        assert!(out
            .dropped
            .iter()
            .all(|d| d.reason == DuplicateReason::TitleCompany && d.key == "data analyst-acme"));
    }

    #[test]
    fn key_truncates_by_characters() {
        let long_title = "é".repeat(80);
        let key = title_company_key(&job("", &long_title, &"Ç".repeat(40)));
        assert_eq!(key, format!("{}-{}", "é".repeat(50), "ç".repeat(30)));

        let out = dedupe(vec![
            job("u1", &format!("{}A", "x".repeat(50)), "Co"),
            job("u2", &format!("{}B", "x".repeat(50)), "Co"),
        ]);
        assert_eq!(out.kept.len(), 1);
    }

    #[test]
    fn order_is_preserved_without_duplicates() {
        let input: Vec<_> = (0..5)
            .map(|i| job(&format!("http://a/{i}"), &format!("Role {i}"), "Acme"))
            .collect();
        let out = dedupe(input.clone());
        assert_eq!(out.kept, input);
    }

    #[test]
    fn dedupe_is_idempotent() {
        let input = vec![
            job("http://a/1", "Data Analyst", "Acme"),
            job("", "Data Analyst", "Acme"),
            job("", "Analyst", "Beta"),
            job("http://a/1", "Other", "Gamma"),
            job("", "Analyst", "Gamma"),
            job("", "Analyst", "Gamma"),
        ];
        let once = dedupe(input).kept;
        let twice = dedupe(once.clone()).kept;
        assert_eq!(once, twice);
        assert_eq!(titles(&once), vec!["Data Analyst", "Analyst", "Analyst"]);
    }
}
