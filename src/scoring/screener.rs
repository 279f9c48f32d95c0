//! Six-category pass/fail screen.
//!
//! Each category passes only when all of its conditions hold. The label is
//! derived from the number of passing categories alone.

use crate::models::{Label, RawRecord, ScreenerResult};

use super::{gt, lt};

pub fn quality(r: &RawRecord) -> bool {
    gt(r.roe, 0.15) && gt(r.roa, 0.08) && gt(r.npm, 0.10) && lt(r.der, 1.0)
}

pub fn value(r: &RawRecord) -> bool {
    gt(r.per, 0.0) && lt(r.per, 12.0) && lt(r.pbr, 1.5)
}

pub fn growth(r: &RawRecord) -> bool {
    gt(r.eps_growth, 0.10) && gt(r.revenue_growth, 0.10) && gt(r.net_profit_growth, 0.10)
}

pub fn momentum(r: &RawRecord) -> bool {
    gt(r.one_month, 0.05) && gt(r.three_month, 0.10)
}

/// Compares the one-year *return* against 1, not the one-year beta. This is
/// almost always satisfied; kept as-is so labels match the published screen.
pub fn risk(r: &RawRecord) -> bool {
    lt(r.one_year, 1.0) && lt(r.stdev_one_year, 0.35)
}

pub fn liquidity(r: &RawRecord) -> bool {
    gt(r.volume, 2_000_000.0) && gt(r.value, 10_000_000_000.0)
}

pub fn label_for_passes(total_pass: u32) -> Label {
    match total_pass {
        n if n >= 5 => Label::StrongBuy,
        4 => Label::Buy,
        3 => Label::Watchlist,
        _ => Label::Avoid,
    }
}

pub fn screen(r: &RawRecord) -> ScreenerResult {
    let flags = [quality(r), value(r), growth(r), momentum(r), risk(r), liquidity(r)];
    let total_pass = flags.iter().filter(|&&f| f).count() as u32;

    ScreenerResult {
        quality: flags[0],
        value: flags[1],
        growth: flags[2],
        momentum: flags[3],
        risk: flags[4],
        liquidity: flags[5],
        total_pass,
        label: label_for_passes(total_pass),
    }
}
