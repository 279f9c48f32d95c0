mod cache;
mod config;
mod error;
mod loader;
mod models;
mod pipeline;
mod presentation;
mod provider;
mod scoring;
mod utils;

use anyhow::{Result, bail};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::AppConfig;
use crate::models::{EnrichedRecord, Label};
use crate::pipeline::{LoadMode, Pipeline, PipelineStats, score_snapshot};
use crate::presentation::export::export_csv;
use crate::presentation::{Filter, Query, SortKey, find_by_code};
use crate::scoring::{Evaluation, Strategy};

#[derive(Parser)]
#[command(name = "idx-screener", about = "Rule-based IDX stock scoring", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Score a saved JSON snapshot instead of the live feed
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// List scored stocks
    List {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Show one stock's metrics, factor breakdown and every strategy's verdict
    Show { code: String },

    /// Run the six-category screen on one stock
    Screen { code: String },

    /// Label distribution and snapshot freshness
    Summary,

    /// Write the (filtered) scored list to CSV
    Export {
        out: PathBuf,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Fetch from the feed now and rewrite the cache
    Refresh,

    /// Delete the cached snapshot
    ClearCache,
}

#[derive(Args)]
struct QueryArgs {
    /// Substring of code or name (case-insensitive)
    #[arg(short, long, default_value = "")]
    search: String,

    /// ALL, TOP GAINER, TOP VOLUME or a label such as "strong-buy"
    #[arg(short, long, default_value = "ALL")]
    filter: Filter,

    #[arg(long, value_enum, default_value_t = SortKey::None)]
    sort: SortKey,

    /// Maximum rows (defaults to display.default_limit; 0 = no limit)
    #[arg(short, long)]
    limit: Option<usize>,

    /// Bypass a fresh cache and fetch from the feed
    #[arg(long)]
    refresh: bool,
}

impl QueryArgs {
    fn to_query(&self, default_limit: usize) -> Query {
        let limit = self.limit.unwrap_or(default_limit);
        Query {
            search: self.search.clone(),
            filter: self.filter,
            sort: self.sort,
            limit: (limit > 0).then_some(limit),
        }
    }
}

fn load_mode(input: &Option<PathBuf>, refresh: bool) -> LoadMode {
    match input {
        Some(path) => LoadMode::File(path.clone()),
        None if refresh => LoadMode::Refresh,
        None => LoadMode::Cached,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "idx_screener=info,warn",
        1 => "idx_screener=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;
    let default_limit = config.display.default_limit;
    let pipeline = Pipeline::new(config);

    match cli.command {
        Command::List { query } => {
            let (stocks, stats) = pipeline.run(&load_mode(&cli.input, query.refresh)).await?;
            let rows = query.to_query(default_limit).apply(&stocks);
            print_table(&rows, &stats);
        }

        Command::Show { code } => {
            let snapshot = pipeline.load(&load_mode(&cli.input, false)).await?;
            let Some(record) = find_by_code(&snapshot.records, &code) else {
                bail!("No stock with code {:?} in {} records", code, snapshot.records.len());
            };
            print_detail(record);
        }

        Command::Screen { code } => {
            let snapshot = pipeline.load(&load_mode(&cli.input, false)).await?;
            let Some(record) = find_by_code(&snapshot.records, &code) else {
                bail!("No stock with code {:?} in {} records", code, snapshot.records.len());
            };
            if let Evaluation::Screener(r) = Strategy::Screener.evaluate(record) {
                println!("{} — {}", record.code, record.name);
                for (name, pass) in r.categories() {
                    println!("  {:<10} {}", name, if pass { "PASS" } else { "fail" });
                }
                println!("  {}/6 passed → {}", r.total_pass, r.label);
            }
        }

        Command::Summary => {
            let snapshot = pipeline.load(&load_mode(&cli.input, false)).await?;
            let (_, stats) = score_snapshot(snapshot);
            print_summary(&stats);
        }

        Command::Export { out, query } => {
            let _t = utils::Timer::start("CSV export");
            let (stocks, _) = pipeline.run(&load_mode(&cli.input, query.refresh)).await?;
            let rows = query.to_query(0).apply(&stocks);
            export_csv(&out, &rows)?;
            info!("Exported {} of {} stocks", rows.len(), stocks.len());
        }

        Command::Refresh => {
            if cli.input.is_some() {
                bail!("--input and refresh are mutually exclusive");
            }
            let _t = utils::Timer::start("Feed refresh");
            let snapshot = pipeline.load(&LoadMode::Refresh).await?;
            info!("Done: {} records ({})", snapshot.records.len(), snapshot.origin);
        }

        Command::ClearCache => {
            let cache = pipeline.cache();
            if cache.clear()? {
                println!("Removed {:?}", cache.path());
            } else {
                println!("No cache at {:?}", cache.path());
            }
        }
    }

    Ok(())
}

// ── Output ────────────────────────────────────────────────────────────────────

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

fn print_table(rows: &[&EnrichedRecord], stats: &PipelineStats) {
    if rows.is_empty() {
        println!("No stocks found matching criteria.");
        return;
    }

    println!(
        "{:<6} {:<28} {:>10} {:>8} {:>10} {:>5}  {}",
        "CODE", "NAME", "LAST", "1D", "VOLUME", "SCORE", "LABEL"
    );
    for s in rows {
        let r = &s.record;
        println!(
            "{:<6} {:<28} {:>10} {:>8} {:>10} {:>5}  {}",
            r.code,
            truncate(&r.name, 28),
            utils::fmt_amount(r.last),
            utils::fmt_percent(r.one_day),
            utils::fmt_compact(r.volume),
            s.ai.score,
            s.ai.label,
        );
    }
    println!(
        "{} of {} stocks ({}, {} top picks)",
        rows.len(),
        stats.records,
        stats.origin,
        stats.count(Label::StrongBuy) + stats.count(Label::Buy),
    );
}

fn print_detail(record: &crate::models::RawRecord) {
    let r = record;
    println!("─────────────────────────────────────────────");
    println!("  {} — {}", r.code, r.name);
    if let Some(sector) = &r.sector_name {
        println!("  {}", sector);
    }
    println!("  Last update : {}", r.last_date.as_deref().unwrap_or("N/A"));
    println!("─────────────────────────────────────────────");
    println!("  Last        : {}", utils::fmt_amount(r.last));
    println!("  Prev close  : {}", utils::fmt_amount(r.prev_closing_price));
    println!(
        "  52w range   : {} – {}",
        utils::fmt_amount(r.adjusted_annual_low_price),
        utils::fmt_amount(r.adjusted_annual_high_price)
    );
    println!(
        "  Returns     : 1D {}  1W {}  1M {}  3M {}  1Y {}",
        utils::fmt_percent(r.one_day),
        utils::fmt_percent(r.one_week),
        utils::fmt_percent(r.one_month),
        utils::fmt_percent(r.three_month),
        utils::fmt_percent(r.one_year),
    );
    println!(
        "  Activity    : vol {}  value {}  freq {}",
        utils::fmt_compact(r.volume),
        utils::fmt_compact(r.value),
        utils::fmt_amount(r.frequency),
    );
    println!(
        "  Valuation   : PER {}  PBR {}  PSR {}  ROE {}",
        utils::fmt_ratio(r.per),
        utils::fmt_ratio(r.pbr),
        utils::fmt_ratio(r.psr_annualized),
        utils::fmt_percent(r.roe),
    );
    println!(
        "  Risk        : β {}  σ {}",
        utils::fmt_ratio(r.beta_one_year),
        utils::fmt_ratio(r.stdev_one_year),
    );
    println!("─────────────────────────────────────────────");

    for strategy in Strategy::ALL {
        let eval = strategy.evaluate(r);
        println!("  {:<10} {}", strategy.name(), eval.headline());
        if let Evaluation::Composite(s) = eval {
            println!("    trend      {:>2}/20", s.trend_score);
            println!("    momentum   {:>2}/20", s.momentum_score);
            println!("    valuation  {:>2}/20", s.valuation_score);
            println!("    volume     {:>2}/20", s.volume_score);
            println!("    risk       {:>2}/20", s.risk_score);
        }
    }
    println!("─────────────────────────────────────────────");
}

fn print_summary(stats: &PipelineStats) {
    let age = stats
        .saved_at
        .map(|t| (Utc::now() - t).to_std().unwrap_or_default())
        .map(utils::fmt_age)
        .unwrap_or_else(|| "—".into());

    println!("─────────────────────────────────");
    println!("  IDX Screener — Summary");
    println!("─────────────────────────────────");
    println!("  Stocks     : {}", utils::fmt_number(stats.records as i64));
    println!("  Source     : {}", stats.origin);
    println!("  Age        : {}", age);
    println!("─────────────────────────────────");
    for (label, n) in &stats.label_counts {
        println!("  {:<10} : {}", label.as_str(), n);
    }
    println!("─────────────────────────────────");
}
