//! Callable entrypoints.
//!
//! Each entrypoint has typed input and output. The catalog erases those types
//! behind `JsonEntrypoint` so the router can dispatch by name on raw JSON.
//!
//! Invocation body: `{"input": {...}}`. Response: `Envelope`.

mod reports;
mod scores;

pub use reports::{Dashboard, Overview, Report};
pub use scores::{LeagueScores, Schedule, Search, SportScores};

use crate::aggregate::Aggregator;
use crate::errors::{AggregatorError, Result, ValidationError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Names of every entrypoint, in catalog order.
pub const ENTRYPOINT_NAMES: &[&str] = &[
    "overview",
    "league",
    "sport",
    "search",
    "schedule",
    "dashboard",
    "report",
];

/// An entrypoint with typed input and output.
#[async_trait]
pub trait Entrypoint: Send + Sync {
    type Input: DeserializeOwned + Send;
    type Output: Serialize + Send;

    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Price used when the config sets none. `None` means free.
    fn default_price(&self) -> Option<&'static str>;

    async fn invoke(&self, aggregator: &Aggregator, input: Self::Input) -> Result<Self::Output>;
}

/// Type-erased entrypoint operating on JSON values.
#[async_trait]
pub trait JsonEntrypoint: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn default_price(&self) -> Option<&'static str>;

    async fn invoke_json(&self, aggregator: &Aggregator, input: Value) -> Result<Value>;
}

#[async_trait]
impl<T> JsonEntrypoint for T
where
    T: Entrypoint,
{
    fn name(&self) -> &'static str {
        Entrypoint::name(self)
    }

    fn description(&self) -> &'static str {
        Entrypoint::description(self)
    }

    fn default_price(&self) -> Option<&'static str> {
        Entrypoint::default_price(self)
    }

    async fn invoke_json(&self, aggregator: &Aggregator, input: Value) -> Result<Value> {
        let input: T::Input = serde_json::from_value(input)
            .map_err(|e| ValidationError::MalformedInput(e.to_string()))?;
        let output = self.invoke(aggregator, input).await?;
        Ok(serde_json::to_value(output)?)
    }
}

/// Response wrapper returned by every entrypoint.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub output: Value,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct InvokeRequest {
    #[serde(default = "empty_input")]
    input: Value,
}

fn empty_input() -> Value {
    Value::Object(serde_json::Map::new())
}

fn is_free(price: &str) -> bool {
    price.parse::<f64>().is_ok_and(|p| p == 0.0)
}

pub struct CatalogEntry {
    pub entrypoint: Arc<dyn JsonEntrypoint>,
    /// `None` when free
    pub price: Option<String>,
}

/// Every entrypoint with its effective price, keyed by name.
pub struct Catalog {
    entries: IndexMap<&'static str, CatalogEntry>,
}

impl Catalog {
    /// Builds the standard catalog. `pricing` overrides default prices; a
    /// price of zero makes an entrypoint free.
    pub fn new(pricing: &HashMap<String, String>) -> Self {
        let entrypoints: Vec<Arc<dyn JsonEntrypoint>> = vec![
            Arc::new(Overview),
            Arc::new(LeagueScores),
            Arc::new(SportScores),
            Arc::new(Search),
            Arc::new(Schedule),
            Arc::new(Dashboard),
            Arc::new(Report),
        ];

        let entries = entrypoints
            .into_iter()
            .map(|entrypoint| {
                let price = pricing
                    .get(entrypoint.name())
                    .cloned()
                    .or_else(|| entrypoint.default_price().map(str::to_string))
                    .filter(|price| !is_free(price));
                (entrypoint.name(), CatalogEntry { entrypoint, price })
            })
            .collect();

        Catalog { entries }
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(name)
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    /// Parses an invocation body and runs the named entrypoint.
    pub async fn invoke(
        &self,
        name: &str,
        aggregator: &Aggregator,
        body: &[u8],
    ) -> Result<Envelope> {
        let entry = self
            .get(name)
            .ok_or_else(|| AggregatorError::UnknownEntrypoint(name.to_string()))?;

        let request: InvokeRequest = if body.iter().all(u8::is_ascii_whitespace) {
            InvokeRequest {
                input: empty_input(),
            }
        } else {
            serde_json::from_slice(body)
                .map_err(|e| ValidationError::MalformedBody(e.to_string()))?
        };

        let fetched_at = Utc::now();
        let output = entry.entrypoint.invoke_json(aggregator, request.input).await?;

        Ok(Envelope { output, fetched_at })
    }
}
