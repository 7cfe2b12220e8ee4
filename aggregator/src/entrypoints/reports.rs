use super::Entrypoint;
use crate::aggregate::{Aggregator, LeagueEvents, flatten};
use crate::errors::Result;
use crate::query::{EventFilter, filter_events, sort_by_start, upcoming, validate_limit};
use crate::types::{Counts, EventState, LeagueSummary, NormalizedEvent};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const DEFAULT_DASHBOARD_UPCOMING: usize = 5;

fn summarize(results: &[LeagueEvents]) -> (Vec<LeagueSummary>, Counts) {
    let summaries: Vec<LeagueSummary> = results.iter().map(|r| r.summary()).collect();
    let mut totals = Counts::default();
    for summary in &summaries {
        totals.add(&summary.counts);
    }
    (summaries, totals)
}

/// Free summary of every configured league.
pub struct Overview;

#[derive(Debug, Default, Deserialize)]
pub struct OverviewInput {}

#[derive(Debug, Serialize)]
pub struct OverviewOutput {
    pub leagues: Vec<LeagueSummary>,
    pub totals: Counts,
}

#[async_trait]
impl Entrypoint for Overview {
    type Input = OverviewInput;
    type Output = OverviewOutput;

    fn name(&self) -> &'static str {
        "overview"
    }

    fn description(&self) -> &'static str {
        "Live, upcoming and completed counts for every league"
    }

    fn default_price(&self) -> Option<&'static str> {
        None
    }

    async fn invoke(
        &self,
        aggregator: &Aggregator,
        _input: OverviewInput,
    ) -> Result<OverviewOutput> {
        let leagues: Vec<_> = aggregator.leagues().all().cloned().collect();
        let results = aggregator.aggregate_all(&leagues).await;
        let (leagues, totals) = summarize(&results);

        Ok(OverviewOutput { leagues, totals })
    }
}

/// Summaries plus live and next events for a chosen set of leagues.
pub struct Dashboard;

#[derive(Debug, Deserialize)]
pub struct DashboardInput {
    pub leagues: Vec<String>,
    /// Number of upcoming events to include
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct DashboardOutput {
    pub leagues: Vec<LeagueSummary>,
    pub totals: Counts,
    pub live: Vec<NormalizedEvent>,
    pub upcoming: Vec<NormalizedEvent>,
}

#[async_trait]
impl Entrypoint for Dashboard {
    type Input = DashboardInput;
    type Output = DashboardOutput;

    fn name(&self) -> &'static str {
        "dashboard"
    }

    fn description(&self) -> &'static str {
        "League summaries with live games and the next scheduled ones"
    }

    fn default_price(&self) -> Option<&'static str> {
        Some("0.02")
    }

    async fn invoke(
        &self,
        aggregator: &Aggregator,
        input: DashboardInput,
    ) -> Result<DashboardOutput> {
        let limit = validate_limit(input.limit, Some(DEFAULT_DASHBOARD_UPCOMING))?;
        let leagues = aggregator
            .leagues()
            .resolve(Some(input.leagues.as_slice()))?;

        let results = aggregator.aggregate_all(&leagues).await;
        let (summaries, totals) = summarize(&results);
        let events = flatten(results);

        let mut live = filter_events(
            events.clone(),
            &EventFilter::with_state(Some(EventState::InProgress)),
        );
        sort_by_start(&mut live);

        Ok(DashboardOutput {
            leagues: summaries,
            totals,
            live,
            upcoming: upcoming(events, limit),
        })
    }
}

/// Every event grouped by league.
pub struct Report;

#[derive(Debug, Deserialize)]
pub struct ReportInput {
    #[serde(default)]
    pub leagues: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct LeagueReport {
    #[serde(flatten)]
    pub summary: LeagueSummary,
    pub events: Vec<NormalizedEvent>,
}

#[derive(Debug, Serialize)]
pub struct ReportOutput {
    pub leagues: Vec<LeagueReport>,
    pub totals: Counts,
}

#[async_trait]
impl Entrypoint for Report {
    type Input = ReportInput;
    type Output = ReportOutput;

    fn name(&self) -> &'static str {
        "report"
    }

    fn description(&self) -> &'static str {
        "Full scoreboard for each league with totals"
    }

    fn default_price(&self) -> Option<&'static str> {
        Some("0.05")
    }

    async fn invoke(&self, aggregator: &Aggregator, input: ReportInput) -> Result<ReportOutput> {
        let leagues = aggregator.leagues().resolve(input.leagues.as_deref())?;
        let results = aggregator.aggregate_all(&leagues).await;

        let mut totals = Counts::default();
        let reports = results
            .into_iter()
            .map(|result| {
                let summary = result.summary();
                totals.add(&summary.counts);
                let mut events = result.events;
                sort_by_start(&mut events);
                LeagueReport { summary, events }
            })
            .collect();

        Ok(ReportOutput {
            leagues: reports,
            totals,
        })
    }
}
