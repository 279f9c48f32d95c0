//! Pipeline orchestrator: ties provider → scoring → presentation together.
//!
//! ## Load modes
//!
//! `Cached` (default): serve the cached snapshot while it is younger than the
//!   TTL, otherwise fetch; a failed fetch falls back to the stale cache.
//!
//! `Refresh`: always fetch first, still falling back to the cache on failure.
//!
//! `File`: score a snapshot from disk; the cache is neither read nor written.

use crate::cache::FileCache;
use crate::config::AppConfig;
use crate::loader::load_snapshot;
use crate::models::{EnrichedRecord, Label};
use crate::presentation::{enrich, label_counts};
use crate::provider::{CachedProvider, Origin, PasardanaSource, Snapshot};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub enum LoadMode {
    Cached,
    Refresh,
    File(PathBuf),
}

pub struct Pipeline {
    config: AppConfig,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn cache(&self) -> FileCache {
        FileCache::new(&self.config.cache.path, self.config.cache.ttl())
    }

    pub async fn load(&self, mode: &LoadMode) -> Result<Snapshot> {
        match mode {
            LoadMode::File(path) => Ok(Snapshot {
                records: load_snapshot(path)?,
                origin: Origin::File,
                saved_at: None,
            }),
            LoadMode::Cached | LoadMode::Refresh => {
                let source = PasardanaSource::new(&self.config.provider)
                    .context("Failed to build market data source")?;
                let provider = CachedProvider::new(source, self.cache());
                let refresh = matches!(mode, LoadMode::Refresh);
                Ok(provider.load(refresh).await?)
            }
        }
    }

    pub async fn run(&self, mode: &LoadMode) -> Result<(Vec<EnrichedRecord>, PipelineStats)> {
        let snapshot = self.load(mode).await?;
        Ok(score_snapshot(snapshot))
    }
}

/// Score every record in a snapshot and tally the labels.
pub fn score_snapshot(snapshot: Snapshot) -> (Vec<EnrichedRecord>, PipelineStats) {
    let Snapshot { records, origin, saved_at } = snapshot;
    let stocks = enrich(records);

    let stats = PipelineStats {
        records: stocks.len(),
        origin,
        saved_at,
        label_counts: label_counts(&stocks),
    };

    info!(
        "Scored {} records from {} ({} STRONG BUY, {} BUY)",
        stats.records,
        stats.origin,
        stats.count(Label::StrongBuy),
        stats.count(Label::Buy),
    );

    (stocks, stats)
}

#[derive(Debug)]
pub struct PipelineStats {
    pub records: usize,
    pub origin: Origin,
    pub saved_at: Option<DateTime<Utc>>,
    pub label_counts: BTreeMap<Label, usize>,
}

impl PipelineStats {
    pub fn count(&self, label: Label) -> usize {
        self.label_counts.get(&label).copied().unwrap_or(0)
    }
}
