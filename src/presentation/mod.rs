//! Enrichment, search, filter and sort over scored records.

pub mod export;

use crate::error::ParseFilterError;
use crate::models::{EnrichedRecord, Label, RawRecord, normalise_token};
use crate::provider::cleaner::normalise_code;
use crate::scoring::{gt, score};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Attach a composite score to every record, preserving order.
pub fn enrich(records: Vec<RawRecord>) -> Vec<EnrichedRecord> {
    records
        .into_iter()
        .map(|record| {
            let ai = score(&record);
            EnrichedRecord { record, ai }
        })
        .collect()
}

// ── Filter ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Label(Label),
    /// One-day move above 5%
    TopGainer,
    /// More than a million shares traded
    TopVolume,
}

impl Filter {
    pub fn matches(&self, s: &EnrichedRecord) -> bool {
        match self {
            Filter::All => true,
            Filter::Label(l) => s.ai.label == *l,
            Filter::TopGainer => gt(s.record.one_day.map(|d| d * 100.0), 5.0),
            Filter::TopVolume => gt(s.record.volume, 1_000_000.0),
        }
    }
}

impl FromStr for Filter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise_token(s).as_str() {
            "ALL" => Ok(Filter::All),
            "TOP GAINER" => Ok(Filter::TopGainer),
            "TOP VOLUME" => Ok(Filter::TopVolume),
            _ => s
                .parse::<Label>()
                .map(Filter::Label)
                .map_err(|_| ParseFilterError(s.to_string())),
        }
    }
}

// ── Sort ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortKey {
    /// Keep feed order
    #[default]
    None,
    /// One-day return, highest first
    OneDay,
    /// Shares traded, highest first
    Volume,
}

impl SortKey {
    fn key(&self, s: &EnrichedRecord) -> Option<f64> {
        match self {
            SortKey::None => None,
            SortKey::OneDay => s.record.one_day,
            SortKey::Volume => s.record.volume,
        }
    }

    /// Descending; records missing the key go last.
    fn compare(&self, a: &EnrichedRecord, b: &EnrichedRecord) -> Ordering {
        match (self.key(a), self.key(b)) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

// ── Query ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Query {
    pub search: String,
    pub filter: Filter,
    pub sort: SortKey,
    pub limit: Option<usize>,
}

impl Query {
    /// Case-insensitive substring match on code or name.
    fn matches_search(&self, s: &EnrichedRecord) -> bool {
        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || s.record.code.to_lowercase().contains(&needle)
            || s.record.name.to_lowercase().contains(&needle)
    }

    pub fn apply<'a>(&self, stocks: &'a [EnrichedRecord]) -> Vec<&'a EnrichedRecord> {
        let mut out: Vec<&EnrichedRecord> = stocks
            .iter()
            .filter(|s| self.matches_search(s) && self.filter.matches(s))
            .collect();

        if self.sort != SortKey::None {
            out.sort_by(|a, b| self.sort.compare(a, b));
        }
        if let Some(limit) = self.limit {
            out.truncate(limit);
        }
        out
    }
}

pub fn label_counts(stocks: &[EnrichedRecord]) -> BTreeMap<Label, usize> {
    let mut counts: BTreeMap<Label, usize> = Label::ALL.into_iter().map(|l| (l, 0)).collect();
    for s in stocks {
        *counts.entry(s.ai.label).or_default() += 1;
    }
    counts
}

pub fn find_by_code<'a>(records: &'a [RawRecord], code: &str) -> Option<&'a RawRecord> {
    let code = normalise_code(code);
    records.iter().find(|r| normalise_code(&r.code) == code)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
