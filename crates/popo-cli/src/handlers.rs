//! Command handlers.

use crate::config::AppConfig;
use console::style;
use popo_api::AppState;
use popo_cache::DateCache;
use chrono::NaiveDate;
use popo_core::ports::{Clock, SystemClock};
use popo_core::{DataRecord, FieldName, FieldValue, parse_date_input};
use popo_scraper::{HttpDriver, ScrapePipeline};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

type HandlerResult = Result<(), Box<dyn std::error::Error>>;

/// Wire the HTTP driver, scrape pipeline and cache together.
fn build_cache(config: &AppConfig) -> Result<DateCache, Box<dyn std::error::Error>> {
    let driver = HttpDriver::new(&config.scrape)?;
    let pipeline = ScrapePipeline::new(Arc::new(driver), config.scrape.clone());
    Ok(DateCache::new(
        Arc::new(pipeline),
        Arc::new(SystemClock),
        config.cache.clone(),
    ))
}

/// Start the API server.
pub async fn serve(config: &AppConfig, bind: Option<SocketAddr>) -> HandlerResult {
    let addr = bind.unwrap_or(config.server.bind);
    let cache = build_cache(config)?;
    info!(capacity = cache.capacity(), "Bulletin cache ready");

    println!(
        "{} Serving bulletins on {}",
        style("▶").cyan(),
        style(format!("http://{addr}")).bold()
    );
    popo_api::serve(addr, Arc::new(AppState::new(cache))).await?;
    Ok(())
}

/// Fetch the bulletin for `date`, reporting when none is available.
async fn fetch(
    config: &AppConfig,
    date: NaiveDate,
) -> Result<Option<Arc<DataRecord>>, Box<dyn std::error::Error>> {
    eprintln!("Fetching bulletin for {}...", style(date).bold());
    let record = build_cache(config)?.get(date).await?;
    if record.is_none() {
        eprintln!("{} No bulletin available for {}", style("✗").red(), date);
    }
    Ok(record)
}

/// The date `latest` and `alert` report on.
fn today(clock: &dyn Clock) -> NaiveDate {
    clock.now().date_naive()
}

/// Fetch and print today's bulletin.
pub async fn latest(config: &AppConfig, clock: &dyn Clock, json: bool) -> HandlerResult {
    let Some(record) = fetch(config, today(clock)).await? else {
        return Ok(());
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&*record)?);
    } else {
        print_record(&record);
    }
    Ok(())
}

/// Print the alert phase and plume direction for `date`, or for today.
pub async fn alert(config: &AppConfig, clock: &dyn Clock, date: Option<&str>) -> HandlerResult {
    let date = match date {
        Some(date) => parse_date_input(date)?,
        None => today(clock),
    };
    let Some(record) = fetch(config, date).await? else {
        return Ok(());
    };

    for (name, value) in alert_fields(&record) {
        println!("  {:<16} {}", name.label(), styled_value(value));
    }
    Ok(())
}

/// The fields that make up the alert status.
fn alert_fields(record: &DataRecord) -> [(FieldName, &FieldValue); 2] {
    [FieldName::Phase, FieldName::PlumeDirection].map(|name| (name, record.field(name)))
}

/// Fetch and print the bulletin for one date.
pub async fn get(config: &AppConfig, date: &str, field: Option<&str>, json: bool) -> HandlerResult {
    let date = parse_date_input(date)?;
    let field = field.map(str::parse::<FieldName>).transpose()?;

    let Some(record) = fetch(config, date).await? else {
        return Ok(());
    };

    match (field, json) {
        (Some(field), true) => println!("{}", serde_json::to_string(record.field(field))?),
        (Some(field), false) => println!("{}", styled_value(record.field(field))),
        (None, true) => println!("{}", serde_json::to_string_pretty(&*record)?),
        (None, false) => print_record(&record),
    }
    Ok(())
}

fn print_record(record: &DataRecord) {
    for name in FieldName::ALL {
        println!("  {:<16} {}", name.as_str(), styled_value(record.field(name)));
    }

    let resolved = record.resolved_count();
    let marker = if record.is_complete() {
        style("✓").green()
    } else {
        style("!").yellow()
    };
    println!("{} {}/{} fields resolved", marker, resolved, FieldName::ALL.len());
}

fn styled_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Value(v) => style(v).green().to_string(),
        FieldValue::Diagnostic(d) => style(d).yellow().to_string(),
    }
}

/// Show configuration.
pub fn show_config(config: &AppConfig, path: &Path) -> HandlerResult {
    println!("Current configuration:");
    print!("{}", serde_yaml::to_string(config)?);
    println!("\nConfig file: {}", path.display());
    Ok(())
}

/// Set configuration.
pub fn set_config(path: &Path, key: &str, value: &str) -> HandlerResult {
    let mut config = AppConfig::load(Some(path))?;
    config.set(key, value)?;
    config.save(path)?;

    println!("{} Set {} = {}", style("✓").green(), key, value);
    Ok(())
}
