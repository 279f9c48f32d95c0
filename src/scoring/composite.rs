//! Five-factor composite score.
//!
//! | Factor    | Conditions                                                        |
//! |-----------|-------------------------------------------------------------------|
//! | Trend     | 1D>0 +3, 1W>0 +4, 1M>0 +5, 3M>0 +5, Last>PrevClose +3              |
//! | Momentum  | 1M>5% +8, 3M>10% +10, σ1Y<0.40 +4, β∈[0.8,1.2] +3 else β<0.6 +1    |
//! | Valuation | PER<8 +8 else PER∈[8,12] +6, PBR<1 +6, PSR<1.5 +4, ROE>10% +4      |
//! | Volume    | Value>5M +5, Frequency>1000 +5                                     |
//! | Risk      | β<0.7 +8, σ1Y<0.35 +6                                              |
//!
//! Sub-scores are summed without clamping. Momentum can reach 25.

use crate::models::{Label, RawRecord, ScoreResult};

use super::{gt, lt, pts, within};

pub fn trend_score(r: &RawRecord) -> u32 {
    let above_prev = matches!(
        (r.last, r.prev_closing_price),
        (Some(last), Some(prev)) if last > prev
    );

    pts(gt(r.one_day, 0.0), 3)
        + pts(gt(r.one_week, 0.0), 4)
        + pts(gt(r.one_month, 0.0), 5)
        + pts(gt(r.three_month, 0.0), 5)
        + pts(above_prev, 3)
}

pub fn momentum_score(r: &RawRecord) -> u32 {
    let beta_bonus = if within(r.beta_one_year, 0.8, 1.2) {
        3
    } else if lt(r.beta_one_year, 0.6) {
        1
    } else {
        0
    };

    pts(gt(r.one_month, 0.05), 8)
        + pts(gt(r.three_month, 0.10), 10)
        + pts(lt(r.stdev_one_year, 0.40), 4)
        + beta_bonus
}

pub fn valuation_score(r: &RawRecord) -> u32 {
    let per = if lt(r.per, 8.0) {
        8
    } else if within(r.per, 8.0, 12.0) {
        6
    } else {
        0
    };

    per + pts(lt(r.pbr, 1.0), 6)
        + pts(lt(r.psr_annualized, 1.5), 4)
        + pts(gt(r.roe, 0.10), 4)
}

pub fn volume_score(r: &RawRecord) -> u32 {
    pts(gt(r.value, 5_000_000.0), 5) + pts(gt(r.frequency, 1000.0), 5)
}

pub fn risk_score(r: &RawRecord) -> u32 {
    pts(lt(r.beta_one_year, 0.7), 8) + pts(lt(r.stdev_one_year, 0.35), 6)
}

/// Closed lower bound per tier, first match wins.
pub fn label_for_score(score: u32) -> Label {
    match score {
        s if s >= 85 => Label::StrongBuy,
        s if s >= 70 => Label::Buy,
        s if s >= 55 => Label::Watchlist,
        s if s >= 40 => Label::Hold,
        _ => Label::Avoid,
    }
}

pub fn score(r: &RawRecord) -> ScoreResult {
    let trend_score = trend_score(r);
    let momentum_score = momentum_score(r);
    let valuation_score = valuation_score(r);
    let volume_score = volume_score(r);
    let risk_score = risk_score(r);

    let total = trend_score + momentum_score + valuation_score + volume_score + risk_score;

    ScoreResult {
        score: total,
        label: label_for_score(total),
        trend_score,
        momentum_score,
        valuation_score,
        volume_score,
        risk_score,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
