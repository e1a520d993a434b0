mod config;
mod error;
mod pipeline;
mod posting;
mod query;
mod sources;
mod store;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::config::Settings;
use crate::pipeline::Pipeline;
use crate::posting::{CanonicalPosting, RawPosting};
use crate::query::Query;
use crate::sources::Source;

#[derive(Parser)]
#[command(
    name = "jobfeed",
    about = "Entry-level remote data analyst jobs, merged from several job boards"
)]
struct Cli {
    /// Settings file (default: ./jobfeed.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Debug logging
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch all sources, filter, dedupe and save the feed
    Run {
        /// Max pages per paginated source
        #[arg(short = 'n', long)]
        max_pages: Option<usize>,
        /// Feed path (default: outputs/master_jobs.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Only these sources (repeatable; default: all)
        #[arg(short, long = "source")]
        sources: Vec<Source>,
    },
    /// Run the pipeline over a saved raw dump (JSON array of records)
    Process {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Filter a saved feed
    Query {
        /// Substring of title, description or a tag
        #[arg(short, long)]
        role: Option<String>,
        #[arg(long)]
        remote: Option<bool>,
        #[arg(long)]
        entry_level: Option<bool>,
        /// Max rows to display
        #[arg(short = 'n', long, default_value_t = query::DEFAULT_LIMIT)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        skip: usize,
        /// Feed to read (default: the configured output path)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// List known sources
    Sources,
}

fn init_tracing(debug: bool) {
    let fallback = if debug { "jobfeed=debug,info" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    settings.debug |= cli.debug;
    init_tracing(settings.debug);

    let t0 = Instant::now();

    let result = match cli.command {
        Commands::Run {
            max_pages,
            output,
            sources,
        } => {
            if let Some(n) = max_pages {
                settings.max_pages = n;
            }
            if let Some(path) = output {
                settings.output_path = path;
            }
            let sources = if sources.is_empty() {
                Source::ALL.to_vec()
            } else {
                sources
            };

            println!(
                "Fetching {} sources (max {} pages each)...",
                sources.len(),
                settings.max_pages
            );
            let harvest = sources::harvest(&settings, &sources).await;
            println!(
                "Fetched {} postings ({} sources ok, {} failed)",
                harvest.postings.len(),
                harvest.ok,
                harvest.failed
            );
            publish(&settings, harvest.postings)
        }
        Commands::Process { input, output } => {
            if let Some(path) = output {
                settings.output_path = path;
            }
            let raw = store::load_raw(&input)
                .with_context(|| format!("Failed to read raw postings from {}", input.display()))?;
            println!("Processing {} raw postings from {}", raw.len(), input.display());
            publish(&settings, raw)
        }
        Commands::Query {
            role,
            remote,
            entry_level,
            limit,
            skip,
            input,
        } => {
            let path = input.unwrap_or_else(|| settings.output_path.clone());
            let jobs = store::load_jobs(&path)
                .with_context(|| format!("Failed to read feed {}", path.display()))?;
            let q = Query {
                role,
                remote,
                entry_level,
                entry_vocabulary: settings.keywords.entry.clone(),
                limit,
                skip,
            };
            print_jobs(&q.apply(&jobs));
            Ok(())
        }
        Commands::Sources => {
            for s in Source::ALL {
                let remote_only = settings.remote_only_sources.iter().any(|r| r == s.id());
                println!(
                    "{:<16} {:<8} {}",
                    s.id(),
                    if remote_only { "remote" } else { "mixed" },
                    s.endpoint()
                );
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Pipeline + sink. A failed feed write fails the run; a failed duplicates
/// log only warns.
fn publish(settings: &Settings, raw: Vec<RawPosting>) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_settings(settings, Utc::now());
    let out = pipeline.run(raw);
    println!(
        "{} raw -> {} matched -> {} unique ({} duplicates)",
        out.stats.raw,
        out.stats.qualified,
        out.stats.unique,
        out.duplicates.len()
    );

    store::save_jobs(&out.jobs, &settings.output_path)
        .with_context(|| format!("Failed to save feed to {}", settings.output_path.display()))?;

    if let Err(e) = store::save_duplicates(&out.duplicates, &settings.duplicates_path) {
        warn!("Duplicates log not written: {}", e);
    }

    info!(path = %settings.output_path.display(), "feed saved");
    println!(
        "Scraped {} qualifying jobs for Data Analyst (Entry-Level, Remote) roles",
        out.jobs.len()
    );
    Ok(())
}

fn print_jobs(jobs: &[&CanonicalPosting]) {
    if jobs.is_empty() {
        println!("No jobs found.");
        return;
    }

    println!(
        "{:>3} | {:<32} | {:<20} | {:<14} | {:<10} | {:<6} | {:<20}",
        "#", "Title", "Company", "Source", "Posted", "Remote", "Skills"
    );
    println!("{}", "-".repeat(124));

    for (i, j) in jobs.iter().enumerate() {
        let skills = j.skills.iter().cloned().collect::<Vec<_>>().join(", ");
        println!(
            "{:>3} | {:<32} | {:<20} | {:<14} | {:<10} | {:<6} | {:<20}",
            i + 1,
            truncate(&j.title, 32),
            truncate(&j.company, 20),
            truncate(&j.source, 14),
            j.date_posted.as_deref().unwrap_or("-"),
            if j.is_remote { "yes" } else { "no" },
            truncate(&skills, 20)
        );
    }

    println!("\n{} jobs", jobs.len());
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_accepts_repeated_sources() {
        let args = ["jobfeed", "run", "-s", "remoteok", "--source", "arbeitnow", "-n", "2"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Run {
                sources, max_pages, ..
            } => {
                assert_eq!(sources, vec![Source::RemoteOk, Source::Arbeitnow]);
                assert_eq!(max_pages, Some(2));
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn unknown_source_is_rejected() {
        assert!(Cli::try_parse_from(["jobfeed", "run", "--source", "indeed"]).is_err());
    }

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("Zürich", 10), "Zürich");
        assert_eq!(truncate("Zürich Daten", 3), "Zür...");
    }

    #[test]
    fn publish_writes_feed_and_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            output_path: dir.path().join("out/master_jobs.json"),
            duplicates_path: dir.path().join("out/duplicates.json"),
            ..Settings::default()
        };
        let raw: Vec<RawPosting> = serde_json::from_str(
            r#"[
                {"title": "Junior Data Analyst", "description": "entry level", "job_url": "http://a/3", "source": "remoteok"},
                {"title": "Data Analyst Intern", "description": "graduate", "job_url": "http://a/3", "source": "remotive"}
            ]"#,
        )
        .unwrap();

        publish(&settings, raw).unwrap();

        let jobs = store::load_jobs(&settings.output_path).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "Junior Data Analyst");
        assert!(settings.duplicates_path.exists());
    }

    #[test]
    fn publish_fails_when_feed_cannot_be_written() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let settings = Settings {
            output_path: blocker.join("master_jobs.json"),
            duplicates_path: dir.path().join("duplicates.json"),
            ..Settings::default()
        };
        assert!(publish(&settings, Vec::new()).is_err());
    }
}
