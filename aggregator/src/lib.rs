pub mod aggregate;
pub mod config;
pub mod discovery;
pub mod entrypoints;
pub mod errors;
pub mod leagues;
pub mod metrics_defs;
pub mod normalize;
pub mod query;
pub mod router;
pub mod types;
pub mod upstream;

#[cfg(test)]
mod testutils;

use crate::aggregate::Aggregator;
use crate::entrypoints::Catalog;
use crate::errors::AggregatorError;
use crate::leagues::Leagues;
use crate::router::Router;
use crate::upstream::HttpScoreboardSource;
use shared::admin_service::{AdminService, Readiness};
use shared::http::{run_http_service, serve};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builds the request router for a validated config.
pub fn build_router(config: &config::Config) -> Result<Router, AggregatorError> {
    let source = HttpScoreboardSource::new(&config.upstream.base_url)?;
    let aggregator = Aggregator::new(Arc::new(source), Leagues::new(config.leagues.clone()));
    let catalog = Catalog::new(&config.pricing);

    Ok(Router::new(aggregator, catalog, config.agent.clone()))
}

pub async fn run(config: config::Config) -> Result<(), AggregatorError> {
    config.validate()?;
    let router = build_router(&config)?;

    let readiness = Readiness::new();
    let admin_task = run_http_service(
        &config.admin_listener.host,
        config.admin_listener.port,
        AdminService::<AggregatorError>::new(readiness.clone()),
    );

    let listener =
        TcpListener::bind(format!("{}:{}", config.listener.host, config.listener.port)).await?;
    tracing::info!(
        host = %config.listener.host,
        port = config.listener.port,
        leagues = config.leagues.len(),
        upstream = %config.upstream.base_url,
        "Scoreboard aggregator listening"
    );
    readiness.mark_ready();

    tokio::try_join!(serve(listener, router), admin_task)?;
    Ok(())
}
