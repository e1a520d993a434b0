pub mod classify;
pub mod dates;
pub mod dedupe;
pub mod normalize;
pub mod skills;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::Settings;
use crate::posting::{CanonicalPosting, RawPosting};
use classify::Classifier;
use dates::{DateParser, FeedDates};
use dedupe::Duplicate;
use normalize::Normalizer;
use skills::{KeywordSkills, SkillExtractor};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStats {
    pub raw: usize,
    pub qualified: usize,
    pub unique: usize,
}

#[derive(Debug, Default)]
pub struct PipelineOutput {
    pub jobs: Vec<CanonicalPosting>,
    pub duplicates: Vec<Duplicate>,
    pub stats: PipelineStats,
}

/// normalize → classify → dedupe, one synchronous pass over an in-memory batch.
pub struct Pipeline {
    normalizer: Normalizer,
    classifier: Classifier,
}

impl Pipeline {
    pub fn new(
        settings: &Settings,
        skills: Box<dyn SkillExtractor>,
        dates: Box<dyn DateParser>,
    ) -> Self {
        let classifier = Classifier::new(&settings.keywords, &settings.remote_only_sources);
        Self {
            normalizer: Normalizer::new(skills, dates, classifier.clone()),
            classifier,
        }
    }

    /// Keyword skills from the configured vocabulary; relative dates resolve against `now`.
    pub fn from_settings(settings: &Settings, now: DateTime<Utc>) -> Self {
        Self::new(
            settings,
            Box::new(KeywordSkills::new(settings.skills.iter().cloned())),
            Box::new(FeedDates::new(now)),
        )
    }

    pub fn run(&self, raw_jobs: Vec<RawPosting>) -> PipelineOutput {
        let raw = raw_jobs.len();

        let qualified: Vec<CanonicalPosting> = raw_jobs
            .into_iter()
            .map(|r| self.normalizer.normalize(r))
            .filter_map(|mut job| self.classifier.classify(&mut job).then_some(job))
            .collect();
        let qualified_count = qualified.len();

        let deduped = dedupe::dedupe(qualified);
        let stats = PipelineStats {
            raw,
            qualified: qualified_count,
            unique: deduped.kept.len(),
        };
        info!(
            raw = stats.raw,
            qualified = stats.qualified,
            unique = stats.unique,
            "pipeline finished"
        );

        PipelineOutput {
            jobs: deduped.kept,
            duplicates: deduped.dropped,
            stats,
        }
    }
}
