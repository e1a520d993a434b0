use std::collections::HashSet;

use tracing::trace;

use crate::config::Keywords;
use crate::posting::{CanonicalPosting, MatchReasons};

/// Reason recorded in place of matched keywords for remote-only sources.
pub const REMOTE_ONLY_REASON: &str = "remote-only site";

/// Keyword gate for the role profile. Matching is lowercase substring
/// containment, so "analyst" also hits "analysts". Reasons carry the
/// keywords as configured.
#[derive(Debug, Clone)]
pub struct Classifier {
    // (as configured, lowercase)
    role: Vec<(String, String)>,
    entry: Vec<(String, String)>,
    remote: Vec<(String, String)>,
    remote_only: HashSet<String>,
}

fn vocabulary(words: &[String]) -> Vec<(String, String)> {
    words
        .iter()
        .filter(|w| !w.is_empty())
        .map(|w| (w.clone(), w.to_lowercase()))
        .collect()
}

/// Vocabulary entries found in the lowercase `haystack`, in vocabulary order.
fn matches(vocabulary: &[(String, String)], haystack: &str) -> Vec<String> {
    vocabulary
        .iter()
        .filter(|(_, lower)| haystack.contains(lower.as_str()))
        .map(|(literal, _)| literal.clone())
        .collect()
}

impl Classifier {
    pub fn new<S: AsRef<str>>(keywords: &Keywords, remote_only_sources: &[S]) -> Self {
        Self {
            role: vocabulary(&keywords.role),
            entry: vocabulary(&keywords.entry),
            remote: vocabulary(&keywords.remote),
            remote_only: remote_only_sources
                .iter()
                .map(|s| s.as_ref().to_string())
                .collect(),
        }
    }

    pub fn is_remote_only(&self, source: &str) -> bool {
        self.remote_only.contains(source)
    }

    /// Remote when title, location or a tag names a remote keyword, or the
    /// source only lists remote jobs.
    pub fn is_remote(&self, title: &str, location: &str, tags: &[String], source: &str) -> bool {
        if self.is_remote_only(source) {
            return true;
        }
        let fields = [title, location].into_iter().chain(tags.iter().map(String::as_str));
        fields
            .map(str::to_lowercase)
            .any(|f| self.remote.iter().any(|(_, kw)| f.contains(kw.as_str())))
    }

    /// Decide whether `job` fits the profile.
    ///
    /// On success this writes the matched keywords into `job.match_reasons`;
    /// it is the one place a posting is mutated after normalization. A
    /// rejected posting is left untouched.
    pub fn classify(&self, job: &mut CanonicalPosting) -> bool {
        let haystack =
            format!("{}{}{}", job.description, job.title, job.tags.join(" ")).to_lowercase();

        let role = matches(&self.role, &haystack);
        if role.is_empty() {
            trace!(url = %job.job_url, "no role keyword");
            return false;
        }

        let entry = matches(&self.entry, &haystack);
        if entry.is_empty() {
            trace!(url = %job.job_url, "no entry-level keyword");
            return false;
        }

        let remote = if self.is_remote_only(&job.source) {
            vec![REMOTE_ONLY_REASON.to_string()]
        } else {
            let found = matches(&self.remote, &haystack);
            if found.is_empty() {
                trace!(url = %job.job_url, "no remote keyword");
                return false;
            }
            found
        };

        job.match_reasons = MatchReasons {
            role_keywords: role,
            entry_keywords: entry,
            remote_keywords: remote,
        };
        true
    }
}
