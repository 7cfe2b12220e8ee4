use super::Entrypoint;
use crate::aggregate::{Aggregator, flatten};
use crate::errors::{Result, ValidationError};
use crate::query::{
    EventFilter, SearchScope, cap, filter_events, search, sort_by_start, upcoming, validate_limit,
};
use crate::types::{Counts, EventState, LeagueSummary, NormalizedEvent};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const DEFAULT_SCHEDULE_LIMIT: usize = 10;

fn filtered(
    events: Vec<NormalizedEvent>,
    state: Option<EventState>,
    limit: Option<usize>,
) -> Vec<NormalizedEvent> {
    let mut events = filter_events(events, &EventFilter::with_state(state));
    sort_by_start(&mut events);
    cap(&mut events, limit);
    events
}

/// Events for a single league.
pub struct LeagueScores;

#[derive(Debug, Deserialize)]
pub struct LeagueInput {
    pub league: String,
    #[serde(default)]
    pub status: Option<EventState>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct LeagueOutput {
    pub league: String,
    pub name: String,
    /// Counts over every event, before filtering
    pub summary: Counts,
    pub events: Vec<NormalizedEvent>,
}

#[async_trait]
impl Entrypoint for LeagueScores {
    type Input = LeagueInput;
    type Output = LeagueOutput;

    fn name(&self) -> &'static str {
        "league"
    }

    fn description(&self) -> &'static str {
        "Scores for one league, optionally filtered by status"
    }

    fn default_price(&self) -> Option<&'static str> {
        Some("0.01")
    }

    async fn invoke(&self, aggregator: &Aggregator, input: LeagueInput) -> Result<LeagueOutput> {
        let limit = validate_limit(input.limit, None)?;
        let league = aggregator.league(&input.league)?.clone();

        // A single league has nothing to fall back on, so failures surface.
        let events = aggregator.fetch_league(&league).await?;
        let summary = Counts::from_events(&events);

        Ok(LeagueOutput {
            league: league.key,
            name: league.name,
            summary,
            events: filtered(events, input.status, limit),
        })
    }
}

/// Events for every league of one sport.
pub struct SportScores;

#[derive(Debug, Deserialize)]
pub struct SportInput {
    pub sport: String,
    #[serde(default)]
    pub status: Option<EventState>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SportOutput {
    pub sport: String,
    pub leagues: Vec<LeagueSummary>,
    pub events: Vec<NormalizedEvent>,
}

#[async_trait]
impl Entrypoint for SportScores {
    type Input = SportInput;
    type Output = SportOutput;

    fn name(&self) -> &'static str {
        "sport"
    }

    fn description(&self) -> &'static str {
        "Scores across every league of a sport"
    }

    fn default_price(&self) -> Option<&'static str> {
        Some("0.01")
    }

    async fn invoke(&self, aggregator: &Aggregator, input: SportInput) -> Result<SportOutput> {
        let limit = validate_limit(input.limit, None)?;
        let leagues = aggregator.leagues().for_sport(&input.sport)?;

        let results = aggregator.aggregate_all(&leagues).await;
        let summaries = results.iter().map(|r| r.summary()).collect();

        Ok(SportOutput {
            sport: input.sport.trim().to_lowercase(),
            leagues: summaries,
            events: filtered(flatten(results), input.status, limit),
        })
    }
}

/// Text search over participants or event names.
pub struct Search;

#[derive(Debug, Deserialize)]
pub struct SearchInput {
    pub query: String,
    #[serde(default)]
    pub leagues: Option<Vec<String>>,
    #[serde(default)]
    pub scope: SearchScope,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub query: String,
    pub scope: SearchScope,
    /// Number of matches before the limit was applied
    pub matches: usize,
    pub events: Vec<NormalizedEvent>,
}

#[async_trait]
impl Entrypoint for Search {
    type Input = SearchInput;
    type Output = SearchOutput;

    fn name(&self) -> &'static str {
        "search"
    }

    fn description(&self) -> &'static str {
        "Find events by team, athlete or event name"
    }

    fn default_price(&self) -> Option<&'static str> {
        Some("0.01")
    }

    async fn invoke(&self, aggregator: &Aggregator, input: SearchInput) -> Result<SearchOutput> {
        if input.query.trim().is_empty() {
            return Err(ValidationError::EmptyQuery.into());
        }
        let limit = validate_limit(input.limit, None)?;
        let leagues = aggregator.leagues().resolve(input.leagues.as_deref())?;

        let results = aggregator.aggregate_all(&leagues).await;
        let mut events = search(flatten(results), &input.query, input.scope)?;
        let matches = events.len();
        sort_by_start(&mut events);
        cap(&mut events, limit);

        Ok(SearchOutput {
            query: input.query,
            scope: input.scope,
            matches,
            events,
        })
    }
}

/// Upcoming events, earliest first.
pub struct Schedule;

#[derive(Debug, Deserialize)]
pub struct ScheduleInput {
    #[serde(default)]
    pub leagues: Option<Vec<String>>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ScheduleOutput {
    pub leagues: Vec<String>,
    pub events: Vec<NormalizedEvent>,
}

#[async_trait]
impl Entrypoint for Schedule {
    type Input = ScheduleInput;
    type Output = ScheduleOutput;

    fn name(&self) -> &'static str {
        "schedule"
    }

    fn description(&self) -> &'static str {
        "Next scheduled events across leagues"
    }

    fn default_price(&self) -> Option<&'static str> {
        Some("0.01")
    }

    async fn invoke(
        &self,
        aggregator: &Aggregator,
        input: ScheduleInput,
    ) -> Result<ScheduleOutput> {
        let limit = validate_limit(input.limit, Some(DEFAULT_SCHEDULE_LIMIT))?;
        let leagues = aggregator.leagues().resolve(input.leagues.as_deref())?;

        let results = aggregator.aggregate_all(&leagues).await;

        Ok(ScheduleOutput {
            leagues: leagues.into_iter().map(|l| l.key).collect(),
            events: upcoming(flatten(results), limit),
        })
    }
}
