//! File-backed report cache.
//!
//! One JSON file per `artist + scope` key. A report is fresh while
//! `now - generated_at` is below the TTL; stale or unreadable entries are
//! treated as misses and overwritten by the next run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use mov_core::ValuationReport;
use tracing::{debug, warn};

use crate::error::RunnerError;

/// Report cache rooted at a directory.
#[derive(Debug, Clone)]
pub struct ReportCache {
    dir: PathBuf,
    ttl: Duration,
}

impl ReportCache {
    /// Cache in `dir` with the given freshness window.
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    /// File that holds the entry for `artist` and `scope`.
    pub fn entry_path(&self, artist: &str, scope: &str) -> PathBuf {
        self.dir.join(format!("{}__{}.json", sanitize(artist), sanitize(scope)))
    }

    /// A fresh cached report, if any.
    pub async fn load(
        &self,
        artist: &str,
        scope: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ValuationReport>, RunnerError> {
        let path = self.entry_path(artist, scope);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RunnerError::io(&path, e)),
        };

        let report: ValuationReport = match serde_json::from_str(&contents) {
            Ok(report) => report,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable cache entry");
                return Ok(None);
            }
        };

        if self.is_fresh(&report, now) {
            debug!(artist, scope, generated_at = %report.generated_at, "Cache hit");
            Ok(Some(report))
        } else {
            debug!(artist, scope, generated_at = %report.generated_at, "Cache entry stale");
            Ok(None)
        }
    }

    /// Write `report` under `artist` and `scope`.
    pub async fn store(
        &self,
        artist: &str,
        scope: &str,
        report: &ValuationReport,
    ) -> Result<PathBuf, RunnerError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| RunnerError::io(&self.dir, e))?;
        let path = self.entry_path(artist, scope);
        let json = serde_json::to_vec(report)?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| RunnerError::io(&path, e))?;
        debug!(path = %path.display(), "Report cached");
        Ok(path)
    }

    fn is_fresh(&self, report: &ValuationReport, now: DateTime<Utc>) -> bool {
        let Ok(age) = now.signed_duration_since(report.generated_at).to_std() else {
            // Generated in the future: clock skew, treat as fresh.
            return true;
        };
        age < self.ttl
    }

    /// Directory the cache writes to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Keep cache file names to a portable character set.
fn sanitize(part: &str) -> String {
    let cleaned: String = part
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "_".to_owned()
    } else {
        cleaned
    }
}
