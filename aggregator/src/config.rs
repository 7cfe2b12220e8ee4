use crate::entrypoints::ENTRYPOINT_NAMES;
use crate::leagues::{LeagueConfig, default_leagues};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use url::Url;

pub const DEFAULT_UPSTREAM_URL: &str = "https://site.api.espn.com/apis/site/v2/sports";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("At least one league must be configured")]
    NoLeagues,

    #[error("Duplicate league key: {0}")]
    DuplicateLeague(String),

    #[error("League has an empty key, sport or league segment")]
    EmptyLeagueField,

    #[error("Pricing references unknown entrypoint: {0}")]
    UnknownEntrypoint(String),

    #[error("Invalid price for entrypoint {entrypoint}: {price}")]
    InvalidPrice { entrypoint: String, price: String },
}

/// Aggregator configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Main listener serving the entrypoints and discovery document
    pub listener: Listener,
    /// Admin listener for health and readiness checks
    pub admin_listener: Listener,
    /// Sports data API
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Metadata published in the discovery document
    #[serde(default)]
    pub agent: AgentConfig,
    /// League table. Replaces the built-in table when present.
    #[serde(default = "default_leagues")]
    pub leagues: Vec<LeagueConfig>,
    /// Entrypoint name to price. Overrides the built-in prices.
    #[serde(default)]
    pub pricing: HashMap<String, String>,
}

impl Config {
    /// Validates the aggregator configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;

        if self.leagues.is_empty() {
            return Err(ConfigValidationError::NoLeagues);
        }

        let mut keys = HashSet::new();
        for league in &self.leagues {
            if league.key.trim().is_empty()
                || league.sport.trim().is_empty()
                || league.league.trim().is_empty()
            {
                return Err(ConfigValidationError::EmptyLeagueField);
            }

            if !keys.insert(league.key.to_lowercase()) {
                return Err(ConfigValidationError::DuplicateLeague(league.key.clone()));
            }
        }

        for (entrypoint, price) in &self.pricing {
            if !ENTRYPOINT_NAMES.contains(&entrypoint.as_str()) {
                return Err(ConfigValidationError::UnknownEntrypoint(entrypoint.clone()));
            }

            let valid = price
                .parse::<f64>()
                .map(|value| value.is_finite() && value >= 0.0)
                .unwrap_or(false);
            if !valid {
                return Err(ConfigValidationError::InvalidPrice {
                    entrypoint: entrypoint.clone(),
                    price: price.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Listener {
    /// Validates the listener configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.port == 0 {
            return Err(ConfigValidationError::InvalidPort);
        }
        Ok(())
    }
}

/// Sports data API configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct UpstreamConfig {
    /// Base URL; `{sport}/{league}/scoreboard` is appended per league.
    ///
    /// Invalid URLs are rejected during config deserialization.
    pub base_url: Url,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        UpstreamConfig {
            base_url: Url::parse(DEFAULT_UPSTREAM_URL).expect("default upstream URL is valid"),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    pub name: String,
    pub description: String,
    pub version: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            name: "scoreboard".to_string(),
            description: "Live scores, schedules and results across major sports leagues"
                .to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
