use std::sync::Arc;

use alloy::primitives::{Address, U256};
use anyhow::Context;
use jemallocator::Jemalloc;
use log::{error, info, warn, LevelFilter};
use serde::Serialize;
use simple_logger::SimpleLogger;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use price_lens::resolver::NoFeed;
use price_lens::{OnChainPoolReader, PriceResolver, RouteRegistry, Settings};

/// One line of the price report.
#[derive(Debug, Serialize)]
struct PriceReport {
    token: Address,
    price: Option<U256>,
    error: Option<String>,
}

#[tokio::main()]
async fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .context("Failed to initialize logger")?;

    // Load configuration
    let settings = Settings::new()
        .context("Failed to load config.yaml. Please ensure it exists and is valid")?;

    let registry = Arc::new(
        RouteRegistry::from_settings(&settings).context("Failed to seed route registry")?,
    );
    info!(
        "Route registry seeded: {} routes, native asset {}",
        registry.routes().len(),
        registry.native_asset()
    );

    let pools = OnChainPoolReader::new(&settings.rpc).context("Failed to create pool reader")?;

    // No external feed is wired in; external routes report a read failure
    let resolver = PriceResolver::from_settings(Arc::clone(&registry), pools, NoFeed, &settings.lens);

    let timeout = settings.lens.resolution_timeout();
    let tasks = registry
        .routes()
        .into_iter()
        .map(|token| {
            let resolver = &resolver;
            async move { (token, resolver.resolve_native_price_within(token, timeout).await) }
        })
        .collect::<Vec<_>>();

    let mut reports = Vec::with_capacity(tasks.len());
    for (token, result) in futures::future::join_all(tasks).await {
        match result {
            Ok(price) => {
                info!("{token}: {price}");
                reports.push(PriceReport {
                    token,
                    price: Some(price),
                    error: None,
                });
            },
            Err(e) => {
                // Route misconfiguration at error level, live-data failures at warn
                if e.is_configuration_error() {
                    error!("{token}: {e}");
                } else {
                    warn!("{token}: {e}");
                }
                reports.push(PriceReport {
                    token,
                    price: None,
                    error: Some(e.to_string()),
                });
            },
        }
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&reports).context("Failed to encode price report")?
    );

    Ok(())
}
