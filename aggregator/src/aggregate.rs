use crate::errors::{UpstreamError, ValidationError};
use crate::leagues::{LeagueConfig, Leagues};
use crate::metrics_defs::{UPSTREAM_FAILURES, UPSTREAM_FETCH_DURATION};
use crate::normalize::events_from_scoreboard;
use crate::types::{Counts, LeagueSummary, NormalizedEvent};
use crate::upstream::ScoreboardSource;
use shared::{counter, histogram};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::{self, JoinSet};

/// Events fetched for one league. A league whose fetch failed has no events.
#[derive(Clone, Debug)]
pub struct LeagueEvents {
    pub league: LeagueConfig,
    pub events: Vec<NormalizedEvent>,
}

impl LeagueEvents {
    fn empty(league: LeagueConfig) -> Self {
        LeagueEvents {
            league,
            events: Vec::new(),
        }
    }

    pub fn summary(&self) -> LeagueSummary {
        LeagueSummary {
            league: self.league.key.clone(),
            name: self.league.name.clone(),
            counts: Counts::from_events(&self.events),
        }
    }
}

/// Flattens per-league results into one event list, keeping league order.
pub fn flatten(results: Vec<LeagueEvents>) -> Vec<NormalizedEvent> {
    results.into_iter().flat_map(|r| r.events).collect()
}

/// Fetches and normalizes scoreboards for the configured leagues.
#[derive(Clone)]
pub struct Aggregator {
    source: Arc<dyn ScoreboardSource>,
    leagues: Arc<Leagues>,
}

impl Aggregator {
    pub fn new(source: Arc<dyn ScoreboardSource>, leagues: Leagues) -> Self {
        Self {
            source,
            leagues: Arc::new(leagues),
        }
    }

    pub fn leagues(&self) -> &Leagues {
        &self.leagues
    }

    /// Looks up a league by key.
    pub fn league(&self, key: &str) -> Result<&LeagueConfig, ValidationError> {
        self.leagues
            .get(key)
            .ok_or_else(|| ValidationError::UnknownLeague(key.to_string()))
    }

    /// Fetches one league. Upstream failures are returned to the caller.
    pub async fn fetch_league(
        &self,
        league: &LeagueConfig,
    ) -> Result<Vec<NormalizedEvent>, UpstreamError> {
        let start = Instant::now();
        let result = self.source.fetch_scoreboard(league).await;
        histogram!(UPSTREAM_FETCH_DURATION, "league" => league.key.clone())
            .record(start.elapsed().as_secs_f64());

        match result {
            Ok(scoreboard) => Ok(events_from_scoreboard(&scoreboard, league)),
            Err(e) => {
                counter!(UPSTREAM_FAILURES, "league" => league.key.clone())
                    .increment(1);
                Err(e)
            }
        }
    }

    /// Fetches every league in parallel.
    ///
    /// Each league is fetched in its own task. A league whose fetch fails (or
    /// whose task panics) is logged and contributes no events; the others are
    /// unaffected. Results follow the order of `leagues`.
    pub async fn aggregate_all(&self, leagues: &[LeagueConfig]) -> Vec<LeagueEvents> {
        let mut join_set = JoinSet::new();
        let mut task_leagues: HashMap<task::Id, usize> = HashMap::new();

        for (index, league) in leagues.iter().cloned().enumerate() {
            let aggregator = self.clone();
            let handle = join_set.spawn(async move {
                let result = aggregator.fetch_league(&league).await;
                (index, league, result)
            });
            task_leagues.insert(handle.id(), index);
        }

        let mut slots: Vec<Option<LeagueEvents>> = (0..leagues.len()).map(|_| None).collect();

        while let Some(joined) = join_set.join_next_with_id().await {
            match joined {
                Ok((_, (index, league, Ok(events)))) => {
                    slots[index] = Some(LeagueEvents { league, events });
                }
                Ok((_, (index, league, Err(e)))) => {
                    tracing::warn!(
                        league = %league.key,
                        error = %e,
                        "League fetch failed, omitting its events"
                    );
                    slots[index] = Some(LeagueEvents::empty(league));
                }
                Err(e) => {
                    let league = task_leagues
                        .get(&e.id())
                        .map_or("unknown", |&index| leagues[index].key.as_str());
                    tracing::error!(
                        league = %league,
                        error = %e,
                        "League fetch task panicked, omitting its events"
                    );
                }
            }
        }

        slots
            .into_iter()
            .zip(leagues)
            .map(|(slot, league)| {
                slot.unwrap_or_else(|| LeagueEvents::empty(league.clone()))
            })
            .collect()
    }
}
