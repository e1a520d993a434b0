use std::collections::BTreeSet;

/// Pulls recognised skill tags out of free text.
pub trait SkillExtractor: Send + Sync {
    fn extract(&self, text: &str) -> BTreeSet<String>;
}

/// Case-insensitive substring lookup against a fixed vocabulary.
#[derive(Debug, Clone, Default)]
pub struct KeywordSkills {
    // (as configured, lowercased)
    vocabulary: Vec<(String, String)>,
}

impl KeywordSkills {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let vocabulary = terms
            .into_iter()
            .map(Into::into)
            .filter(|t: &String| !t.trim().is_empty())
            .map(|t| {
                let lower = t.to_lowercase();
                (t, lower)
            })
            .collect();
        Self { vocabulary }
    }
}

impl SkillExtractor for KeywordSkills {
    fn extract(&self, text: &str) -> BTreeSet<String> {
        if text.is_empty() {
            return BTreeSet::new();
        }
        let haystack = text.to_lowercase();
        self.vocabulary
            .iter()
            .filter(|(_, lower)| haystack.contains(lower.as_str()))
            .map(|(term, _)| term.clone())
            .collect()
    }
}
