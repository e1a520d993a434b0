use std::time::Duration;

use rand::seq::SliceRandom;
use reqwest::header::{ACCEPT, USER_AGENT};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::FetchSettings;
use crate::error::FetchError;

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36",
];

/// HTTP client for one source. Spaces its own requests, so each source task
/// owns one and nothing is shared.
pub struct Fetcher {
    client: reqwest::Client,
    delay: Duration,
    max_retries: u32,
    base_backoff: Duration,
    last_request: Option<Instant>,
}

impl Fetcher {
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            client,
            delay: Duration::from_millis(settings.request_delay_ms),
            max_retries: settings.max_retries,
            base_backoff: Duration::from_millis(settings.base_backoff_ms),
            last_request: None,
        })
    }

    /// GET `url` as text, retrying transient failures with exponential backoff.
    /// Makes at most `max_retries + 1` attempts.
    pub async fn get_text(&mut self, url: &str) -> Result<String, FetchError> {
        let attempts = self.max_retries.saturating_add(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.get_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_transient() && attempt < attempts => {
                    let backoff = backoff(self.base_backoff, attempt);
                    warn!(
                        "{} failed (attempt {}/{}): {}, backing off {:.1}s",
                        url,
                        attempt,
                        attempts,
                        e,
                        backoff.as_secs_f64()
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) if e.is_transient() => {
                    return Err(FetchError::Exhausted {
                        url: url.to_string(),
                        attempts,
                        last: e.to_string(),
                    })
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_once(&mut self, url: &str) -> Result<String, FetchError> {
        self.pace().await;

        let agent = USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(USER_AGENTS[0]);
        debug!(url, agent, "GET");

        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, agent)
            .header(ACCEPT, "application/json, application/rss+xml, */*")
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(transport)
    }

    /// Wait until at least `delay` has passed since the previous request.
    async fn pace(&mut self) {
        if let Some(last) = self.last_request {
            tokio::time::sleep_until(last + self.delay).await;
        }
        self.last_request = Some(Instant::now());
    }
}

/// Something that can GET a page body; paginated adapters only need this.
pub trait PageGetter {
    async fn get_text(&mut self, url: &str) -> Result<String, FetchError>;
}

impl PageGetter for Fetcher {
    async fn get_text(&mut self, url: &str) -> Result<String, FetchError> {
        Fetcher::get_text(self, url).await
    }
}

/// `base * 2^(attempt-1)`, attempt counted from 1.
fn backoff(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
}
