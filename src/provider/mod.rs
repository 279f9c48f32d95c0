pub mod cleaner;
pub mod http_client;

use crate::cache::FileCache;
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::models::RawRecord;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;
use tracing::{debug, info, warn};
use url::Url;

use self::http_client::HttpClient;

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable market data source.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch_records(&self) -> Result<Vec<RawRecord>>;
}

// ── pasardana feed ────────────────────────────────────────────────────────────

pub struct PasardanaSource {
    client: HttpClient,
    endpoint: Url,
}

impl PasardanaSource {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new(config)?,
            endpoint: listing_url(config)?,
        })
    }
}

/// Full-universe listing, one page, sorted by code.
pub fn listing_url(config: &ProviderConfig) -> Result<Url> {
    let page_length = config.page_length.to_string();
    Url::parse_with_params(
        &config.base_url,
        &[
            ("pageBegin", "0"),
            ("pageLength", page_length.as_str()),
            ("sortField", "Code"),
            ("sortOrder", "ASC"),
        ],
    )
    .with_context(|| format!("Invalid provider base_url {:?}", config.base_url))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListingPayload {
    Bare(Vec<RawRecord>),
    Wrapped { data: Vec<RawRecord> },
}

/// Decode a listing body: either a bare array or `{ "data": [...] }`.
/// Rows without a code are dropped.
pub fn parse_listing(body: &str) -> Result<Vec<RawRecord>> {
    let payload: ListingPayload =
        serde_json::from_str(body).context("Listing body is neither an array nor {data: [...]}")?;

    let rows = match payload {
        ListingPayload::Bare(rows) => rows,
        ListingPayload::Wrapped { data } => data,
    };

    let total = rows.len();
    let records: Vec<RawRecord> = rows.into_iter().filter(|r| !r.code.is_empty()).collect();
    if records.len() < total {
        debug!("Dropped {} rows without a code", total - records.len());
    }
    Ok(records)
}

#[async_trait]
impl MarketDataSource for PasardanaSource {
    fn name(&self) -> &str {
        "pasardana"
    }

    async fn fetch_records(&self) -> Result<Vec<RawRecord>> {
        info!("Fetching listing ({})", self.endpoint);
        let body = self.client.get_text(&self.endpoint).await?;
        let records = parse_listing(&body)?;
        info!("Fetched {} records", records.len());
        Ok(records)
    }
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Remote,
    FreshCache,
    StaleCache,
    File,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Origin::Remote => "remote",
            Origin::FreshCache => "cache",
            Origin::StaleCache => "stale cache",
            Origin::File => "file",
        })
    }
}

/// A record list plus where it came from and when it was captured.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub records: Vec<RawRecord>,
    pub origin: Origin,
    pub saved_at: Option<DateTime<Utc>>,
}

// ── Cache-backed provider ─────────────────────────────────────────────────────

pub struct CachedProvider<S> {
    source: S,
    cache: FileCache,
}

impl<S: MarketDataSource> CachedProvider<S> {
    pub fn new(source: S, cache: FileCache) -> Self {
        Self { source, cache }
    }

    pub async fn load(&self, refresh: bool) -> Result<Snapshot, ProviderError> {
        self.load_at(refresh, Utc::now()).await
    }

    /// Fresh cache → remote → stale cache → error.
    ///
    /// `refresh` skips the fresh-cache check but still falls back to the
    /// cache if the fetch fails.
    pub async fn load_at(&self, refresh: bool, now: DateTime<Utc>) -> Result<Snapshot, ProviderError> {
        if !refresh {
            if let Some(entry) = self.cache.read_fresh(now)? {
                info!(
                    "Using cached snapshot ({} records, saved {})",
                    entry.data.len(),
                    entry.saved_at
                );
                return Ok(Snapshot {
                    records: entry.data,
                    origin: Origin::FreshCache,
                    saved_at: Some(entry.saved_at),
                });
            }
        }

        match self.source.fetch_records().await {
            Ok(records) => {
                if let Err(e) = self.cache.write(&records, now) {
                    warn!("Could not update cache: {:#}", e);
                }
                Ok(Snapshot {
                    records,
                    origin: Origin::Remote,
                    saved_at: Some(now),
                })
            }
            Err(fetch_err) => {
                warn!("{} fetch failed: {:#}", self.source.name(), fetch_err);
                match self.cache.read()? {
                    Some(entry) => {
                        warn!(
                            "Falling back to stale cache saved {} ({} records)",
                            entry.saved_at,
                            entry.data.len()
                        );
                        Ok(Snapshot {
                            records: entry.data,
                            origin: Origin::StaleCache,
                            saved_at: Some(entry.saved_at),
                        })
                    }
                    None => Err(ProviderError::Unavailable {
                        reason: format!("{:#}", fetch_err),
                        path: self.cache.path().to_path_buf(),
                    }),
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::tempdir;

    struct FakeSource {
        records: Option<Vec<RawRecord>>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn ok(codes: &[&str]) -> Self {
            Self {
                records: Some(
                    codes
                        .iter()
                        .map(|c| RawRecord { code: c.to_string(), ..Default::default() })
                        .collect(),
                ),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self { records: None, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl MarketDataSource for FakeSource {
        fn name(&self) -> &str {
            "fake"
        }

        async fn fetch_records(&self) -> Result<Vec<RawRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.records.clone().ok_or_else(|| anyhow::anyhow!("connection refused"))
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 19, 8, 0, 0).unwrap()
    }

    fn codes(snapshot: &Snapshot) -> Vec<&str> {
        snapshot.records.iter().map(|r| r.code.as_str()).collect()
    }

    #[test]
    fn test_parse_listing_shapes() {
        let bare = parse_listing(r#"[{"Code":"BBCA"},{"Code":""},{"Name":"no code"}]"#).unwrap();
        assert_eq!(bare.len(), 1);

        let wrapped = parse_listing(r#"{"success":true,"data":[{"Code":"TLKM","Per":"9.5"}]}"#).unwrap();
        assert_eq!(wrapped[0].code, "TLKM");
        assert_eq!(wrapped[0].per, Some(9.5));

        assert!(parse_listing(r#"{"error":"nope"}"#).is_err());
    }

    #[test]
    fn test_listing_url() {
        let url = listing_url(&ProviderConfig::default()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://pasardana.id/api/StockSearchResult/GetAll?pageBegin=0&pageLength=1000&sortField=Code&sortOrder=ASC"
        );
        let bad = ProviderConfig { base_url: "not a url".into(), ..Default::default() };
        assert!(listing_url(&bad).is_err());
    }

    #[test]
    fn test_fetch_populates_cache() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("stocks.json"), Duration::from_secs(3600));
        let provider = CachedProvider::new(FakeSource::ok(&["BBCA", "TLKM"]), cache);

        let snap = tokio_test::block_on(provider.load_at(false, t0())).unwrap();
        assert_eq!(snap.origin, Origin::Remote);
        assert_eq!(codes(&snap), ["BBCA", "TLKM"]);
        assert_eq!(provider.cache.read().unwrap().unwrap().data.len(), 2);
    }

    #[test]
    fn test_fresh_cache_skips_fetch() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("stocks.json"), Duration::from_secs(3600));
        cache.write(&[RawRecord { code: "OLD".into(), ..Default::default() }], t0()).unwrap();
        let provider = CachedProvider::new(FakeSource::ok(&["NEW"]), cache);

        let later = t0() + chrono::Duration::minutes(30);
        let snap = tokio_test::block_on(provider.load_at(false, later)).unwrap();
        assert_eq!(snap.origin, Origin::FreshCache);
        assert_eq!(codes(&snap), ["OLD"]);
        assert_eq!(provider.source.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_refresh_bypasses_fresh_cache() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("stocks.json"), Duration::from_secs(3600));
        cache.write(&[RawRecord { code: "OLD".into(), ..Default::default() }], t0()).unwrap();
        let provider = CachedProvider::new(FakeSource::ok(&["NEW"]), cache);

        let snap = tokio_test::block_on(provider.load_at(true, t0())).unwrap();
        assert_eq!(snap.origin, Origin::Remote);
        assert_eq!(codes(&snap), ["NEW"]);
    }

    #[test]
    fn test_expired_cache_is_refetched() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("stocks.json"), Duration::from_secs(3600));
        cache.write(&[RawRecord { code: "OLD".into(), ..Default::default() }], t0()).unwrap();
        let provider = CachedProvider::new(FakeSource::ok(&["NEW"]), cache);

        let later = t0() + chrono::Duration::hours(2);
        let snap = tokio_test::block_on(provider.load_at(false, later)).unwrap();
        assert_eq!(snap.origin, Origin::Remote);
        assert_eq!(snap.saved_at, Some(later));
        assert_eq!(provider.source.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fetch_failure_falls_back_to_stale_cache() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("stocks.json"), Duration::from_secs(3600));
        cache.write(&[RawRecord { code: "OLD".into(), ..Default::default() }], t0()).unwrap();
        let provider = CachedProvider::new(FakeSource::failing(), cache);

        let later = t0() + chrono::Duration::days(3);
        let snap = tokio_test::block_on(provider.load_at(false, later)).unwrap();
        assert_eq!(snap.origin, Origin::StaleCache);
        assert_eq!(snap.saved_at, Some(t0()));
        assert_eq!(codes(&snap), ["OLD"]);
    }

    #[test]
    fn test_fetch_failure_without_cache_is_unavailable() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("stocks.json"), Duration::from_secs(3600));
        let provider = CachedProvider::new(FakeSource::failing(), cache);

        let err = tokio_test::block_on(provider.load_at(false, t0())).unwrap_err();
        match err {
            ProviderError::Unavailable { reason, path } => {
                assert!(reason.contains("connection refused"));
                assert!(path.ends_with("stocks.json"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
