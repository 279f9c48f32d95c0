//! Swing-trading score.
//!
//! Weighted toward short-horizon moves: one-day momentum, volume and value,
//! then one-week and one-month trend, with a small fundamental tilt.
//! Thresholds within a group stack, so a 9% day earns 15 + 25 + 40.

use crate::models::{RawRecord, SwingScore};

use super::{gt, lt, pts};

pub fn swing_score(r: &RawRecord) -> SwingScore {
    let mut score = 0;

    // One-day momentum
    score += pts(gt(r.one_day, 0.03), 15);
    score += pts(gt(r.one_day, 0.05), 25);
    score += pts(gt(r.one_day, 0.08), 40);

    // Volume / value
    score += pts(gt(r.volume, 1_000_000.0), 7);
    score += pts(gt(r.volume, 5_000_000.0), 15);
    score += pts(gt(r.value, 5_000_000_000.0), 10);
    let volume_spike = match r.vma20 {
        Some(vma) if vma != 0.0 => gt(r.volume, vma * 1.5),
        _ => false,
    };
    score += pts(volume_spike, 8);

    // Short trend
    score += pts(gt(r.one_week, 0.02), 10);
    score += pts(gt(r.one_week, 0.05), 15);

    // Swing trend
    score += pts(gt(r.one_month, 0.04), 5);
    score += pts(gt(r.one_month, 0.08), 10);

    // Fundamentals
    score += pts(gt(r.roe, 0.08), 6);
    score += pts(gt(r.per, 0.0) && lt(r.per, 20.0), 4);

    SwingScore { score: score.min(100) }
}
