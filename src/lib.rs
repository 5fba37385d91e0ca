pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::config::{AppConfig, exchange_rate_api_key, gemini_api_key};
use crate::core::insights::InsightService;
use crate::core::transaction::{Transaction, load_transactions};
use crate::core::{ConversionService, RateProvider};
use crate::providers::caching::CachingRateProvider;
use crate::providers::exchange_rate_api::ExchangeRateApiProvider;
use crate::providers::exchangerate_host::ExchangerateHostProvider;
use crate::providers::gemini::GeminiClient;
use crate::providers::tiered::TieredRateProvider;
use crate::store::insights::InsightStore;

pub enum AppCommand {
    Summary,
    Categories,
    Timeline,
    Monthly,
    Schedule,
    Rates,
    Insights,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("SpendX starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let converter = build_conversion_service(&config);
    let base_currency = config.base_currency.clone();

    match command {
        AppCommand::Rates => cli::rates::run(&converter, &base_currency).await,
        AppCommand::Summary => {
            let transactions = load_configured_transactions(&config)?;
            cli::summary::run(&transactions, &converter, &base_currency).await
        }
        AppCommand::Categories => {
            let transactions = load_configured_transactions(&config)?;
            cli::categories::run(&transactions, &converter, &base_currency).await
        }
        AppCommand::Timeline => {
            let transactions = load_configured_transactions(&config)?;
            cli::timeline::run(&transactions, &converter, &base_currency).await
        }
        AppCommand::Monthly => {
            let transactions = load_configured_transactions(&config)?;
            cli::monthly::run(&transactions, &converter, &base_currency).await
        }
        AppCommand::Schedule => {
            let transactions = load_configured_transactions(&config)?;
            cli::schedule::run(&transactions, &converter, &base_currency).await
        }
        AppCommand::Insights => {
            let transactions = load_configured_transactions(&config)?;
            let insight_service = build_insight_service(&config);
            cli::insights::run(&transactions, &converter, &insight_service, &base_currency).await
        }
    }
}

/// Primary -> secondary -> static chain behind one shared TTL cache,
/// constructed once per invocation.
fn build_conversion_service(config: &AppConfig) -> ConversionService {
    let primary_url = config
        .providers
        .exchange_rate
        .as_ref()
        .map_or("https://api.exchangerate-api.com/v4", |p| &p.base_url);
    let secondary_url = config
        .providers
        .exchangerate_host
        .as_ref()
        .map_or("https://api.exchangerate.host", |p| &p.base_url);

    let primary = ExchangeRateApiProvider::new(primary_url, exchange_rate_api_key());
    let secondary = ExchangerateHostProvider::new(secondary_url);
    let tiered = TieredRateProvider::new(Box::new(primary), Box::new(secondary));
    let cached = CachingRateProvider::new(tiered);

    ConversionService::new(Arc::new(cached) as Arc<dyn RateProvider>)
}

fn build_insight_service(config: &AppConfig) -> InsightService {
    let (gemini_url, model) = config.providers.gemini.as_ref().map_or(
        ("https://generativelanguage.googleapis.com", "gemini-2.0-flash"),
        |p| (p.base_url.as_str(), p.model.as_str()),
    );
    let api_key = gemini_api_key().unwrap_or_else(|| {
        warn!("GEMINI_API_KEY is not set; insight requests will fail over to cached data");
        String::new()
    });
    let client = GeminiClient::new(gemini_url, &api_key, model);

    let store = match config.data_path() {
        Ok(dir) => match InsightStore::open(&dir) {
            Ok(store) => Some(store),
            Err(e) => {
                warn!("Insight cache unavailable: {e}");
                None
            }
        },
        Err(e) => {
            warn!("Insight cache unavailable: {e}");
            None
        }
    };

    InsightService::new(Arc::new(client), store)
}

fn load_configured_transactions(config: &AppConfig) -> Result<Vec<Transaction>> {
    let path = config
        .transactions
        .as_ref()
        .context("No transactions file configured; set `transactions` in config.yaml")?;
    load_transactions(path)
}
