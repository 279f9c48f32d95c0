//! Offline snapshot loader.
//!
//! Reads a saved listing from disk: a raw API response, a bare array, or a
//! cache file written by this tool.

use crate::models::RawRecord;
use crate::provider::parse_listing;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

pub fn load_snapshot(path: &Path) -> Result<Vec<RawRecord>> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {:?}", path))?;

    let records = parse_listing(&body).with_context(|| format!("Failed to parse {:?}", path))?;

    info!("{:?}: {} records loaded", path, records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::FileCache;
    use chrono::Utc;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_loads_bare_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dump.json");
        std::fs::write(&path, r#"[{"Code":"BBCA","Last":9000},{"Code":"TLKM"}]"#).unwrap();

        let records = load_snapshot(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].last, Some(9000.0));
    }

    #[test]
    fn test_loads_cache_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stocks.json");
        let cache = FileCache::new(&path, Duration::from_secs(60));
        let record = RawRecord { code: "ASII".into(), per: Some(7.5), ..Default::default() };
        cache.write(&[record.clone()], Utc::now()).unwrap();

        assert_eq!(load_snapshot(&path).unwrap(), vec![record]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = load_snapshot(&dir.path().join("nope.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read snapshot"));
    }
}
