use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info};

use crate::error::StoreError;
use crate::pipeline::dedupe::{Duplicate, DuplicateReason};
use crate::posting::{CanonicalPosting, RawPosting};

/// One line of the duplicates log.
#[derive(Debug, Serialize)]
pub struct DuplicateRecord<'a> {
    pub reason: DuplicateReason,
    pub key: &'a str,
    pub title: &'a str,
    pub company: &'a str,
    pub job_url: &'a str,
    pub source: &'a str,
}

impl<'a> From<&'a Duplicate> for DuplicateRecord<'a> {
    fn from(d: &'a Duplicate) -> Self {
        Self {
            reason: d.reason,
            key: &d.key,
            title: &d.posting.title,
            company: &d.posting.company,
            job_url: &d.posting.job_url,
            source: &d.posting.source,
        }
    }
}

pub fn save_jobs(jobs: &[CanonicalPosting], path: &Path) -> Result<(), StoreError> {
    write_json_atomic(jobs, path)?;
    info!("Saved {} jobs to {}", jobs.len(), path.display());
    Ok(())
}

pub fn save_duplicates(dups: &[Duplicate], path: &Path) -> Result<(), StoreError> {
    let records: Vec<DuplicateRecord> = dups.iter().map(DuplicateRecord::from).collect();
    write_json_atomic(&records, path)?;
    info!("Logged {} duplicates to {}", records.len(), path.display());
    Ok(())
}

pub fn load_jobs(path: &Path) -> Result<Vec<CanonicalPosting>, StoreError> {
    read_json(path)
}

/// A raw dump: one JSON array of source records.
pub fn load_raw(path: &Path) -> Result<Vec<RawPosting>, StoreError> {
    read_json(path)
}

/// Serialize next to `path`, then rename over it so readers never see a
/// half-written file. Failures are logged here and returned.
fn write_json_atomic<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), StoreError> {
    let result = try_write(value, path);
    if let Err(e) = &result {
        error!("Failed to save {}: {}", path.display(), e);
    }
    result
}

fn try_write<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), StoreError> {
    let io_err = |op, path: &Path| {
        let path = path.to_path_buf();
        move |source| StoreError::Io { op, path, source }
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_err("creating directory", dir))?;
    }

    let tmp = tmp_path(path);
    let written = (|| {
        let file = fs::File::create(&tmp).map_err(io_err("creating", &tmp))?;
        let mut out = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut out, value).map_err(|source| StoreError::Encode {
            path: tmp.clone(),
            source,
        })?;
        out.write_all(b"\n").map_err(io_err("writing", &tmp))?;
        let file = out
            .into_inner()
            .map_err(|e| io_err("flushing", &tmp)(e.into_error()))?;
        file.sync_all().map_err(io_err("syncing", &tmp))?;
        fs::rename(&tmp, path).map_err(io_err("renaming into", path))
    })();

    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let text = fs::read_to_string(path).map_err(|source| StoreError::Io {
        op: "reading",
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| StoreError::Decode {
        path: path.to_path_buf(),
        source,
    })
}
