pub mod arbeitnow;
pub mod fetcher;
pub mod remoteok;
pub mod remotive;
pub mod weworkremotely;

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::LazyLock;

use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::FetchError;
use crate::posting::RawPosting;
use fetcher::Fetcher;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Job boards with a public JSON or RSS feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    RemoteOk,
    Remotive,
    WeWorkRemotely,
    Arbeitnow,
}

impl Source {
    pub const ALL: [Source; 4] = [
        Source::RemoteOk,
        Source::Remotive,
        Source::WeWorkRemotely,
        Source::Arbeitnow,
    ];

    /// Value written to each posting's `source` field.
    pub fn id(self) -> &'static str {
        match self {
            Source::RemoteOk => "remoteok",
            Source::Remotive => "remotive",
            Source::WeWorkRemotely => "weworkremotely",
            Source::Arbeitnow => "arbeitnow",
        }
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            Source::RemoteOk => remoteok::ENDPOINT,
            Source::Remotive => remotive::ENDPOINT,
            Source::WeWorkRemotely => weworkremotely::ENDPOINT,
            Source::Arbeitnow => arbeitnow::ENDPOINT,
        }
    }

    /// Every page this source has, up to `max_pages`. All or nothing: an
    /// error on any page discards what earlier pages returned.
    pub async fn fetch(
        self,
        fetcher: &mut Fetcher,
        max_pages: usize,
    ) -> Result<Vec<RawPosting>, FetchError> {
        match self {
            Source::RemoteOk => remoteok::parse(&fetcher.get_text(remoteok::ENDPOINT).await?),
            Source::Remotive => remotive::parse(&fetcher.get_text(remotive::ENDPOINT).await?),
            Source::WeWorkRemotely => {
                weworkremotely::parse(&fetcher.get_text(weworkremotely::ENDPOINT).await?)
            }
            Source::Arbeitnow => arbeitnow::fetch_pages(fetcher, max_pages).await,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Source::ALL
            .into_iter()
            .find(|src| src.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let known: Vec<_> = Source::ALL.iter().map(|s| s.id()).collect();
                format!("unknown source '{}' (known: {})", s, known.join(", "))
            })
    }
}

pub struct Harvest {
    pub postings: Vec<RawPosting>,
    pub ok: usize,
    pub failed: usize,
}

/// Fetch all `sources` concurrently, one task each. A source that fails,
/// panics or is still running at Ctrl-C contributes no postings.
pub async fn harvest(settings: &Settings, sources: &[Source]) -> Harvest {
    let fetch_settings = settings.fetch.clone();
    let max_pages = settings.max_pages;
    harvest_with(sources, move |source| {
        let fetch_settings = fetch_settings.clone();
        async move {
            let mut fetcher = Fetcher::new(&fetch_settings)?;
            source.fetch(&mut fetcher, max_pages).await
        }
    })
    .await
}

/// [`harvest`] with the per-source fetch supplied by the caller.
pub async fn harvest_with<F, Fut>(sources: &[Source], fetch: F) -> Harvest
where
    F: Fn(Source) -> Fut,
    Fut: Future<Output = Result<Vec<RawPosting>, FetchError>> + Send + 'static,
{
    let pb = ProgressBar::new(sources.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40} {pos}/{len} sources {msg}")
    {
        pb.set_style(style.progress_chars("=> "));
    }

    let (tx, mut rx) = mpsc::channel::<(Source, Result<Vec<RawPosting>, FetchError>)>(
        sources.len().max(1),
    );

    for &source in sources {
        let tx = tx.clone();
        let job = fetch(source);
        tokio::spawn(async move {
            let result = job.await;
            let _ = tx.send((source, result)).await;
        });
    }

    // rx closes once every task has sent (or died)
    drop(tx);

    let mut postings = Vec::new();
    let mut ok = 0usize;
    let mut failed = 0usize;

    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);

    loop {
        tokio::select! {
            msg = rx.recv() => match msg {
                Some((source, Ok(batch))) => {
                    info!("{}: {} postings", source, batch.len());
                    pb.set_message(source.id());
                    postings.extend(batch);
                    ok += 1;
                    pb.inc(1);
                }
                Some((source, Err(e))) => {
                    warn!("{} contributed nothing: {}", source, e);
                    failed += 1;
                    pb.inc(1);
                }
                None => break,
            },
            _ = &mut interrupt => {
                warn!("interrupted, sources still in flight are skipped");
                break;
            }
        }
    }
    pb.finish_and_clear();

    let missing = sources.len() - ok - failed;
    if missing > 0 {
        warn!("{} sources never reported back", missing);
    }
    info!(
        "Harvested {} postings from {} sources ({} failed)",
        postings.len(),
        ok,
        failed + missing
    );

    Harvest {
        postings,
        ok,
        failed: failed + missing,
    }
}

/// Feed descriptions are HTML fragments; keep only their text.
pub fn plain_text(html: &str) -> String {
    let stripped = TAG_RE.replace_all(html, " ");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&amp;", "&");
    SPACE_RE.replace_all(&decoded, " ").trim().to_string()
}

/// Stamp the source id and flatten an HTML description in place.
fn tag_record(mut record: RawPosting, source: Source) -> RawPosting {
    let text = record.get("description").and_then(Value::as_str).map(plain_text);
    if let Some(text) = text {
        record.insert("description".into(), Value::String(text));
    }
    record.insert("source".into(), Value::String(source.id().into()));
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_ids_round_trip_through_from_str() {
        for s in Source::ALL {
            assert_eq!(s.id().parse::<Source>().unwrap(), s);
        }
        assert_eq!("RemoteOK".parse::<Source>().unwrap(), Source::RemoteOk);
        assert!("indeed".parse::<Source>().is_err());
    }

    #[test]
    fn plain_text_drops_markup() {
        let html = "<p>Junior <b>data</b>&nbsp;analyst &amp; BI</p>\n<ul><li>SQL</li></ul>";
        assert_eq!(plain_text(html), "Junior data analyst & BI SQL");
        assert_eq!(plain_text(""), "");
    }

    #[test]
    fn tag_record_sets_source_and_cleans_description() {
        let mut raw = RawPosting::new();
        raw.insert("description".into(), Value::String("<i>Müller</i> GmbH".into()));
        raw.insert("source".into(), Value::String("spoofed".into()));
        let out = tag_record(raw, Source::Arbeitnow);
        assert_eq!(out["description"], "Müller GmbH");
        assert_eq!(out["source"], "arbeitnow");
    }

    #[tokio::test]
    async fn harvest_of_nothing_is_empty() {
        let h = harvest(&Settings::default(), &[]).await;
        assert!(h.postings.is_empty());
        assert_eq!((h.ok, h.failed), (0, 0));
    }

    #[tokio::test]
    async fn failed_and_panicked_sources_contribute_nothing() {
        let sources = [Source::RemoteOk, Source::Remotive, Source::Arbeitnow];
        let h = harvest_with(&sources, |source| async move {
            match source {
                Source::RemoteOk => {
                    let mut record = RawPosting::new();
                    record.insert("title".into(), Value::String("Junior Data Analyst".into()));
                    Ok(vec![tag_record(record, source)])
                }
                Source::Remotive => Err(FetchError::Status {
                    url: remotive::ENDPOINT.into(),
                    status: 503,
                }),
                _ => panic!("adapter blew up"),
            }
        })
        .await;

        assert_eq!(h.postings.len(), 1);
        assert_eq!(h.postings[0]["source"], "remoteok");
        assert_eq!((h.ok, h.failed), (1, 2));
    }
}
