//! CSV report of scored records.

use crate::models::EnrichedRecord;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// One flat CSV row; the csv crate cannot serialize the flattened record.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    code: &'a str,
    name: &'a str,
    last: Option<f64>,
    one_day: Option<f64>,
    volume: Option<f64>,
    value: Option<f64>,
    per: Option<f64>,
    pbr: Option<f64>,
    roe: Option<f64>,
    score: u32,
    label: &'static str,
    trend: u32,
    momentum: u32,
    valuation: u32,
    volume_demand: u32,
    risk: u32,
}

impl<'a> From<&'a EnrichedRecord> for ExportRow<'a> {
    fn from(s: &'a EnrichedRecord) -> Self {
        let r = &s.record;
        Self {
            code: &r.code,
            name: &r.name,
            last: r.last,
            one_day: r.one_day,
            volume: r.volume,
            value: r.value,
            per: r.per,
            pbr: r.pbr,
            roe: r.roe,
            score: s.ai.score,
            label: s.ai.label.as_str(),
            trend: s.ai.trend_score,
            momentum: s.ai.momentum_score,
            valuation: s.ai.valuation_score,
            volume_demand: s.ai.volume_score,
            risk: s.ai.risk_score,
        }
    }
}

pub fn write_csv<W: Write>(writer: W, stocks: &[&EnrichedRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for s in stocks {
        wtr.serialize(ExportRow::from(*s))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_csv(path: &Path, stocks: &[&EnrichedRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Could not create dir {:?}", parent))?;
    }
    let file = std::fs::File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    write_csv(file, stocks)?;
    info!("Wrote {} rows to {:?}", stocks.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawRecord;
    use crate::presentation::enrich;

    #[test]
    fn test_csv_has_header_and_blank_missing_values() {
        let stocks = enrich(vec![RawRecord {
            code: "BBCA".into(),
            name: "Bank Central Asia, Tbk".into(),
            one_day: Some(0.01),
            ..Default::default()
        }]);
        let refs: Vec<&EnrichedRecord> = stocks.iter().collect();

        let mut buf = Vec::new();
        write_csv(&mut buf, &refs).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "code,name,last,one_day,volume,value,per,pbr,roe,score,label,trend,momentum,valuation,volume_demand,risk"
        );
        assert_eq!(
            lines.next().unwrap(),
            "BBCA,\"Bank Central Asia, Tbk\",,0.01,,,,,,3,AVOID,3,0,0,0,0"
        );
        assert!(lines.next().is_none());
    }
}
