//! On-disk snapshot cache.
//!
//! A single JSON file holding the last successfully fetched record list:
//!
//! ```json
//! { "savedAt": "2025-11-19T08:00:00Z", "data": [ { "Code": "BBCA", ... } ] }
//! ```
//!
//! Freshness is judged against `savedAt`, not the file's mtime, so a copied
//! or restored file keeps its real age.

use crate::models::RawRecord;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub saved_at: DateTime<Utc>,
    pub data: Vec<RawRecord>,
}

impl CacheEntry {
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.saved_at).to_std().unwrap_or(Duration::ZERO)
    }

    /// A snapshot stamped in the future counts as fresh.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age(now) < ttl
    }
}

pub struct FileCache {
    path: PathBuf,
    ttl: Duration,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self { path: path.into(), ttl }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached snapshot regardless of age.
    ///
    /// A missing file is `None`. So is an unreadable or corrupt one: the
    /// caller refetches and the next write replaces it.
    pub fn read(&self) -> Result<Option<CacheEntry>> {
        if !self.path.exists() {
            debug!("No cache at {:?}", self.path);
            return Ok(None);
        }

        let text = match std::fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) => {
                warn!("Cache {:?} unreadable: {}", self.path, e);
                return Ok(None);
            }
        };

        match serde_json::from_str::<CacheEntry>(&text) {
            Ok(entry) => {
                debug!(
                    "Cache {:?}: {} records saved at {}",
                    self.path,
                    entry.data.len(),
                    entry.saved_at
                );
                Ok(Some(entry))
            }
            Err(e) => {
                warn!("Cache {:?} is corrupt, ignoring: {}", self.path, e);
                Ok(None)
            }
        }
    }

    /// Read the cached snapshot only if it is younger than the TTL.
    pub fn read_fresh(&self, now: DateTime<Utc>) -> Result<Option<CacheEntry>> {
        Ok(self.read()?.filter(|e| e.is_fresh(now, self.ttl)))
    }

    pub fn write(&self, records: &[RawRecord], now: DateTime<Utc>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Could not create dir {:?}", parent))?;
        }

        let entry = CacheEntry {
            saved_at: now,
            data: records.to_vec(),
        };
        let json = serde_json::to_string(&entry).context("Failed to serialise cache")?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).with_context(|| format!("Failed to write {:?}", tmp))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to move {:?} into place", tmp))?;

        info!("Cached {} records at {:?}", records.len(), self.path);
        Ok(())
    }

    /// Remove the cache file. Returns whether one existed.
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&self.path)
            .with_context(|| format!("Failed to remove {:?}", self.path))?;
        Ok(true)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn record(code: &str) -> RawRecord {
        RawRecord {
            code: code.into(),
            name: format!("{} Tbk.", code),
            last: Some(1000.0),
            ..Default::default()
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 19, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_missing_file_reads_as_none() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("stocks.json"), Duration::from_secs(60));
        assert!(cache.read().unwrap().is_none());
        assert!(!cache.clear().unwrap());
    }

    #[test]
    fn test_write_then_read_within_ttl() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("nested/stocks.json"), Duration::from_secs(60));
        cache.write(&[record("BBCA"), record("TLKM")], t0()).unwrap();

        let fresh = cache.read_fresh(t0() + chrono::Duration::seconds(59)).unwrap().unwrap();
        assert_eq!(fresh.data.len(), 2);
        assert_eq!(fresh.data[0].code, "BBCA");
        assert_eq!(fresh.saved_at, t0());
    }

    #[test]
    fn test_expired_entry_is_stale_but_still_readable() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("stocks.json"), Duration::from_secs(60));
        cache.write(&[record("BBCA")], t0()).unwrap();

        let later = t0() + chrono::Duration::seconds(60);
        assert!(cache.read_fresh(later).unwrap().is_none());
        let stale = cache.read().unwrap().unwrap();
        assert_eq!(stale.age(later), Duration::from_secs(60));
    }

    #[test]
    fn test_corrupt_file_reads_as_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stocks.json");
        std::fs::write(&path, "{ not json").unwrap();
        let cache = FileCache::new(&path, Duration::from_secs(60));
        assert!(cache.read().unwrap().is_none());
    }

    #[test]
    fn test_envelope_uses_saved_at_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stocks.json");
        let cache = FileCache::new(&path, Duration::from_secs(60));
        cache.write(&[record("BBCA")], t0()).unwrap();

        let v: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(v.get("savedAt").is_some());
        assert_eq!(v["data"][0]["Code"], "BBCA");
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("stocks.json"), Duration::from_secs(60));
        cache.write(&[record("BBCA")], t0()).unwrap();
        assert!(cache.clear().unwrap());
        assert!(cache.read().unwrap().is_none());
    }
}
