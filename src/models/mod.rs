use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseLabelError;
use crate::provider::cleaner::{lenient_f64, lenient_string};

// ── Raw record ────────────────────────────────────────────────────────────────

/// One stock's snapshot as served by the market-data feed.
///
/// Keys follow the feed (PascalCase). Every numeric field is optional: the
/// feed routinely sends `null` or omits valuation and risk fields for newly
/// listed or suspended symbols.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct RawRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_date: Option<String>,

    // Prices
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub last: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub prev_closing_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub adjusted_annual_low_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub adjusted_annual_high_price: Option<f64>,

    // Periodic returns (fractional, 0.05 = 5%)
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub one_day: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub one_week: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub one_month: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub three_month: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub six_month: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub one_year: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub mtd: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub ytd: Option<f64>,

    // Trading activity
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub capitalization: Option<f64>,

    // Valuation & profitability
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub per: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub pbr: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub psr_annualized: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub pcfr_annualized: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub roe: Option<f64>,

    // Risk
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub beta_one_year: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub stdev_one_year: Option<f64>,

    // Not in the standard feed; read when a richer source supplies them.
    #[serde(rename = "ROA", default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub roa: Option<f64>,
    #[serde(rename = "NPM", default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub npm: Option<f64>,
    #[serde(rename = "DER", default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub der: Option<f64>,
    #[serde(rename = "EPSGrowth", default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub eps_growth: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub revenue_growth: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub net_profit_growth: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub vma20: Option<f64>,
}

// ── Labels ────────────────────────────────────────────────────────────────────

/// Categorical verdict shared by the composite score and the screener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "STRONG BUY")]
    StrongBuy,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "WATCHLIST")]
    Watchlist,
    #[serde(rename = "HOLD")]
    Hold,
    #[serde(rename = "AVOID")]
    Avoid,
}

impl Label {
    pub const ALL: [Label; 5] = [
        Label::StrongBuy,
        Label::Buy,
        Label::Watchlist,
        Label::Hold,
        Label::Avoid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::StrongBuy => "STRONG BUY",
            Label::Buy => "BUY",
            Label::Watchlist => "WATCHLIST",
            Label::Hold => "HOLD",
            Label::Avoid => "AVOID",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = ParseLabelError;

    /// Accepts "STRONG BUY", "strong-buy", "Strong_Buy", …
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = normalise_token(s);
        Label::ALL
            .into_iter()
            .find(|l| l.as_str() == norm)
            .ok_or_else(|| ParseLabelError(s.to_string()))
    }
}

/// Upper-case and fold `-`/`_` to spaces so CLI-friendly spellings match.
pub fn normalise_token(s: &str) -> String {
    s.trim()
        .to_uppercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

// ── Engine outputs ────────────────────────────────────────────────────────────

/// Composite 0–100 heuristic with its five factor sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub score: u32,
    pub label: Label,
    pub trend_score: u32,
    pub momentum_score: u32,
    pub valuation_score: u32,
    pub volume_score: u32,
    pub risk_score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenerResult {
    pub quality: bool,
    pub value: bool,
    pub growth: bool,
    pub momentum: bool,
    pub risk: bool,
    pub liquidity: bool,
    pub total_pass: u32,
    pub label: Label,
}

impl ScreenerResult {
    /// Category names paired with their pass flag, in display order.
    pub fn categories(&self) -> [(&'static str, bool); 6] {
        [
            ("quality", self.quality),
            ("value", self.value),
            ("growth", self.growth),
            ("momentum", self.momentum),
            ("risk", self.risk),
            ("liquidity", self.liquidity),
        ]
    }
}

/// Short-term swing score, capped at 100. Carries no label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwingScore {
    pub score: u32,
}

// ── Enriched record ───────────────────────────────────────────────────────────

/// Raw record plus its composite score, as consumed by the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub record: RawRecord,
    pub ai: ScoreResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_round_trips_display_and_parse() {
        for label in Label::ALL {
            assert_eq!(label.to_string().parse::<Label>(), Ok(label));
        }
        assert_eq!("strong-buy".parse::<Label>(), Ok(Label::StrongBuy));
        assert_eq!(" watchlist ".parse::<Label>(), Ok(Label::Watchlist));
        assert!("CUT LOSS".parse::<Label>().is_err());
    }

    #[test]
    fn test_label_serializes_as_feed_string() {
        assert_eq!(serde_json::to_string(&Label::StrongBuy).unwrap(), "\"STRONG BUY\"");
    }

    #[test]
    fn test_raw_record_decodes_feed_row() {
        let json = r#"{
            "Code": "BOLT", "Name": "Garuda Metalindo Tbk.",
            "Last": 1095, "PrevClosingPrice": 1115,
            "OneDay": -0.01793722, "Per": 18.8261, "Pbr": null,
            "Roe": "0.150220575384317", "Frequency": 7,
            "ThreeYear": 0.40384615
        }"#;
        let r: RawRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r.code, "BOLT");
        assert_eq!(r.last, Some(1095.0));
        assert_eq!(r.pbr, None);
        assert_eq!(r.roe, Some(0.150220575384317));
        assert_eq!(r.beta_one_year, None);
        assert_eq!(r.roa, None);
    }

    #[test]
    fn test_enriched_record_flattens_raw_fields() {
        let enriched = EnrichedRecord {
            record: RawRecord {
                code: "BBCA".into(),
                one_day: Some(0.01),
                ..Default::default()
            },
            ai: ScoreResult {
                score: 3,
                label: Label::Avoid,
                trend_score: 3,
                momentum_score: 0,
                valuation_score: 0,
                volume_score: 0,
                risk_score: 0,
            },
        };
        let v = serde_json::to_value(&enriched).unwrap();
        assert_eq!(v["Code"], "BBCA");
        assert_eq!(v["OneDay"], 0.01);
        assert_eq!(v["ai"]["label"], "AVOID");
        assert_eq!(v["ai"]["trendScore"], 3);
        assert!(v.get("Per").is_none());
    }
}
