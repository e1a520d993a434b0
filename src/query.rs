use crate::config::Keywords;
use crate::posting::CanonicalPosting;

pub const DEFAULT_LIMIT: usize = 50;

/// Read-side filter over a saved feed.
#[derive(Debug, Clone)]
pub struct Query {
    pub role: Option<String>,
    pub remote: Option<bool>,
    pub entry_level: Option<bool>,
    /// Words that mark a posting as entry level when found in its title or tags.
    pub entry_vocabulary: Vec<String>,
    pub limit: usize,
    pub skip: usize,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            role: None,
            remote: None,
            entry_level: None,
            entry_vocabulary: Keywords::default().entry,
            limit: DEFAULT_LIMIT,
            skip: 0,
        }
    }
}

impl Query {
    pub fn matches(&self, job: &CanonicalPosting) -> bool {
        if let Some(role) = self.role.as_deref().map(str::to_lowercase) {
            let hit = job.title.to_lowercase().contains(&role)
                || job.description.to_lowercase().contains(&role)
                || job.tags.iter().any(|t| t.to_lowercase().contains(&role));
            if !hit {
                return false;
            }
        }
        if self.remote.is_some_and(|want| job.is_remote != want) {
            return false;
        }
        !self
            .entry_level
            .is_some_and(|want| self.is_entry_level(job) != want)
    }

    /// Title or a tag names an entry-level word; descriptions are not read.
    fn is_entry_level(&self, job: &CanonicalPosting) -> bool {
        let fields = std::iter::once(&job.title).chain(job.tags.iter());
        fields.map(|f| f.to_lowercase()).any(|f| {
            self.entry_vocabulary
                .iter()
                .filter(|kw| !kw.is_empty())
                .any(|kw| f.contains(&kw.to_lowercase()))
        })
    }

    pub fn apply<'a>(&self, jobs: &'a [CanonicalPosting]) -> Vec<&'a CanonicalPosting> {
        jobs.iter()
            .filter(|j| self.matches(j))
            .skip(self.skip)
            .take(self.limit)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use crate::config::Settings;
    use crate::pipeline::Pipeline;
    use crate::posting::{MatchReasons, RawPosting};

    fn job(title: &str, tags: &[&str], remote: bool) -> CanonicalPosting {
        CanonicalPosting {
            title: title.into(),
            company: "Acme".into(),
            location: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            job_url: format!("https://jobs/{title}"),
            description: String::new(),
            skills: BTreeSet::new(),
            source: "arbeitnow".into(),
            date_posted: None,
            salary: String::new(),
            is_remote: remote,
            match_reasons: MatchReasons::default(),
            raw: RawPosting::new(),
        }
    }

    fn feed() -> Vec<CanonicalPosting> {
        vec![
            job("Junior Data Analyst", &[], true),
            job("BI Developer", &["Data", "Junior"], false),
            job("Marketing Analyst", &[], true),
            job("Data Engineer", &["entry-level"], true),
        ]
    }

    fn titles(found: Vec<&CanonicalPosting>) -> Vec<&str> {
        found.into_iter().map(|j| j.title.as_str()).collect()
    }

    #[test]
    fn default_query_returns_everything() {
        let feed = feed();
        assert_eq!(Query::default().apply(&feed).len(), 4);
    }

    #[test]
    fn role_matches_title_or_tags() {
        let feed = feed();
        let q = Query {
            role: Some("DATA".into()),
            ..Query::default()
        };
        assert_eq!(
            titles(q.apply(&feed)),
            vec!["Junior Data Analyst", "BI Developer", "Data Engineer"]
        );
    }

    #[test]
    fn flags_compose() {
        let feed = feed();
        let q = Query {
            role: Some("analyst".into()),
            remote: Some(true),
            entry_level: Some(false),
            ..Query::default()
        };
        assert_eq!(titles(q.apply(&feed)), vec!["Marketing Analyst"]);
    }

    #[test]
    fn entry_level_splits_a_pipeline_feed() {
        let raw = [
            json!({"title": "Junior Data Analyst", "description": "remote", "job_url": "http://a/1", "source": "remoteok"}),
            json!({"title": "Data Analyst", "description": "graduate scheme", "job_url": "http://a/2", "source": "remoteok"}),
        ];
        let raw = raw
            .into_iter()
            .filter_map(|v| v.as_object().cloned())
            .collect();
        let pipeline = Pipeline::from_settings(
            &Settings::default(),
            Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap(),
        );
        let feed = pipeline.run(raw).jobs;
        assert_eq!(feed.len(), 2);

        let entry = |want| Query {
            entry_level: Some(want),
            ..Query::default()
        };
        assert_eq!(titles(entry(true).apply(&feed)), vec!["Junior Data Analyst"]);
        assert_eq!(titles(entry(false).apply(&feed)), vec!["Data Analyst"]);
    }

    #[test]
    fn skip_then_limit() {
        let feed = feed();
        let q = Query {
            skip: 1,
            limit: 2,
            ..Query::default()
        };
        assert_eq!(titles(q.apply(&feed)), vec!["BI Developer", "Marketing Analyst"]);
    }
}
