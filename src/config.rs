use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "jobfeed.toml";
pub const DEFAULT_OUTPUT: &str = "outputs/master_jobs.json";
pub const DEFAULT_DUPLICATES: &str = "outputs/duplicates.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub max_pages: usize,
    pub output_path: PathBuf,
    pub duplicates_path: PathBuf,
    pub debug: bool,
    pub fetch: FetchSettings,
    pub keywords: Keywords,
    /// Sources whose every listing is remote; the remote keyword check is skipped for them.
    pub remote_only_sources: Vec<String>,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub request_delay_ms: u64,
    pub max_retries: u32,
    pub timeout_secs: u64,
    pub base_backoff_ms: u64,
}

/// Vocabularies the classifier matches against, in reporting order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Keywords {
    pub role: Vec<String>,
    pub entry: Vec<String>,
    pub remote: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_pages: 5,
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            duplicates_path: PathBuf::from(DEFAULT_DUPLICATES),
            debug: false,
            fetch: FetchSettings::default(),
            keywords: Keywords::default(),
            remote_only_sources: strings(&["remoteok", "weworkremotely", "remote.co", "remotive"]),
            skills: strings(&[
                "sql",
                "python",
                "excel",
                "tableau",
                "power bi",
                "looker",
                "pandas",
                "statistics",
                "data visualization",
                "google sheets",
                "bigquery",
                "spark",
                "etl",
            ]),
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            request_delay_ms: 2000,
            max_retries: 3,
            timeout_secs: 30,
            base_backoff_ms: 2000,
        }
    }
}

impl Default for Keywords {
    fn default() -> Self {
        Self {
            role: strings(&[
                "data analyst",
                "data",
                "analyst",
                "junior data analyst",
                "associate data analyst",
            ]),
            entry: strings(&[
                "entry level",
                "entry-level",
                "fresher",
                "junior",
                "0-1 years",
                "0-2 years",
                "graduate",
            ]),
            remote: strings(&["remote", "anywhere", "work from anywhere", "fully remote", "remote-only"]),
        }
    }
}

impl Settings {
    /// Defaults, then the config file (explicit path must exist, the default
    /// one is optional), then `JOBFEED_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("JOBFEED")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_carry_the_analyst_profile() {
        let s = Settings::default();
        assert_eq!(s.max_pages, 5);
        assert_eq!(s.output_path, PathBuf::from("outputs/master_jobs.json"));
        assert_eq!(s.keywords.role[0], "data analyst");
        assert!(s.remote_only_sources.iter().any(|x| x == "remoteok"));
        assert_eq!(s.fetch.max_retries, 3);
    }

    #[test]
    fn file_overrides_only_what_it_names() {
        let mut f = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            f,
            "max_pages = 2\n[keywords]\nrole = [\"bookkeeper\"]\n[fetch]\nmax_retries = 1"
        )
        .unwrap();

        let s = Settings::load(Some(f.path())).unwrap();
        assert_eq!(s.max_pages, 2);
        assert_eq!(s.keywords.role, vec!["bookkeeper".to_string()]);
        assert_eq!(s.keywords.entry, Keywords::default().entry);
        assert_eq!(s.fetch.max_retries, 1);
        assert_eq!(s.fetch.timeout_secs, 30);
    }

    #[test]
    fn env_overrides_file_with_single_underscore_prefix() {
        let mut f = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(f, "duplicates_path = \"from/file.json\"\n[fetch]\nbase_backoff_ms = 10").unwrap();

        std::env::set_var("JOBFEED_DUPLICATES_PATH", "from/env.json");
        std::env::set_var("JOBFEED_FETCH__BASE_BACKOFF_MS", "7");
        let loaded = Settings::load(Some(f.path()));
        std::env::remove_var("JOBFEED_DUPLICATES_PATH");
        std::env::remove_var("JOBFEED_FETCH__BASE_BACKOFF_MS");

        let s = loaded.unwrap();
        assert_eq!(s.duplicates_path, PathBuf::from("from/env.json"));
        assert_eq!(s.fetch.base_backoff_ms, 7);
        assert_eq!(s.fetch.request_delay_ms, 2000);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(Settings::load(Some(Path::new("/nonexistent/jobfeed.toml"))).is_err());
    }
}
