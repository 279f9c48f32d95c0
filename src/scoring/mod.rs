//! Rule-based scoring strategies.
//!
//! Every strategy is a pure function over a [`RawRecord`]. A missing field
//! fails every comparison it takes part in, so absent data contributes zero
//! and never raises.

pub mod composite;
pub mod screener;
pub mod swing;

use serde::Serialize;

use crate::models::{Label, RawRecord, ScoreResult, ScreenerResult, SwingScore};

pub use self::composite::score;
pub use self::screener::screen;
pub use self::swing::swing_score;

// ── Comparison helpers ────────────────────────────────────────────────────────

#[inline]
pub(crate) fn gt(v: Option<f64>, threshold: f64) -> bool {
    matches!(v, Some(x) if x > threshold)
}

#[inline]
pub(crate) fn lt(v: Option<f64>, threshold: f64) -> bool {
    matches!(v, Some(x) if x < threshold)
}

/// Closed interval `[lo, hi]`.
#[inline]
pub(crate) fn within(v: Option<f64>, lo: f64, hi: f64) -> bool {
    matches!(v, Some(x) if x >= lo && x <= hi)
}

#[inline]
pub(crate) fn pts(cond: bool, points: u32) -> u32 {
    if cond { points } else { 0 }
}

// ── Strategy set ──────────────────────────────────────────────────────────────

/// The available scoring algorithms. They share an input shape and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Five-factor composite score (0–100) with a five-tier label
    Composite,
    /// Six pass/fail categories, labelled by pass count
    Screener,
    /// Short-term momentum score, capped at 100
    Swing,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Composite, Strategy::Screener, Strategy::Swing];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Composite => "composite",
            Strategy::Screener => "screener",
            Strategy::Swing => "swing",
        }
    }

    pub fn evaluate(&self, record: &RawRecord) -> Evaluation {
        match self {
            Strategy::Composite => Evaluation::Composite(score(record)),
            Strategy::Screener => Evaluation::Screener(screen(record)),
            Strategy::Swing => Evaluation::Swing(swing_score(record)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "strategy", rename_all = "lowercase")]
pub enum Evaluation {
    Composite(ScoreResult),
    Screener(ScreenerResult),
    Swing(SwingScore),
}

impl Evaluation {
    pub fn label(&self) -> Option<Label> {
        match self {
            Evaluation::Composite(r) => Some(r.label),
            Evaluation::Screener(r) => Some(r.label),
            Evaluation::Swing(_) => None,
        }
    }

    pub fn headline(&self) -> String {
        let verdict = self.label().map(|l| format!(" {}", l)).unwrap_or_default();
        match self {
            Evaluation::Composite(r) => format!("{}/100{}", r.score, verdict),
            Evaluation::Screener(r) => format!("{}/6 passed{}", r.total_pass, verdict),
            Evaluation::Swing(r) => format!("{}/100", r.score),
        }
    }
}
