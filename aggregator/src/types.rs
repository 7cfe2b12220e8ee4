use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse state of an event.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventState {
    #[serde(alias = "upcoming", alias = "pre")]
    Scheduled,
    #[serde(alias = "live", alias = "in-progress", alias = "in")]
    InProgress,
    #[serde(alias = "final", alias = "post")]
    Completed,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct EventStatus {
    pub state: EventState,
    /// Upstream free text, e.g. "Final/OT" or "Q3 5:12"
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock: Option<String>,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
    Unknown,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Participant {
    pub name: String,
    pub abbreviation: Option<String>,
    pub score: Option<String>,
    pub winner: bool,
    pub side: Side,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<String>,
}

/// One game, match or fight in the common shape.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NormalizedEvent {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    pub league: String,
    pub league_name: String,
    pub start_time: Option<DateTime<Utc>>,
    pub status: EventStatus,
    pub venue: Option<String>,
    pub participants: Vec<Participant>,
}

impl NormalizedEvent {
    pub fn state(&self) -> EventState {
        self.status.state
    }

    /// `query` must already be lowercase.
    pub fn has_participant_matching(&self, query: &str) -> bool {
        self.participants.iter().any(|participant| {
            participant.name.to_lowercase().contains(query)
                || participant
                    .abbreviation
                    .as_deref()
                    .is_some_and(|abbr| abbr.to_lowercase().contains(query))
        })
    }

    /// Matches the event name, short name or any participant. `query` must
    /// already be lowercase.
    pub fn matches_text(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(query)
            || self
                .short_name
                .as_deref()
                .is_some_and(|short| short.to_lowercase().contains(query))
            || self.has_participant_matching(query)
    }
}

/// Live/upcoming/completed tallies.
#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq, Eq)]
pub struct Counts {
    pub live: usize,
    pub upcoming: usize,
    pub completed: usize,
    pub total: usize,
}

impl Counts {
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a NormalizedEvent>) -> Self {
        let mut counts = Counts::default();
        for event in events {
            match event.state() {
                EventState::Scheduled => counts.upcoming += 1,
                EventState::InProgress => counts.live += 1,
                EventState::Completed => counts.completed += 1,
            }
            counts.total += 1;
        }
        counts
    }

    pub fn add(&mut self, other: &Counts) {
        self.live += other.live;
        self.upcoming += other.upcoming;
        self.completed += other.completed;
        self.total += other.total;
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct LeagueSummary {
    pub league: String,
    pub name: String,
    #[serde(flatten)]
    pub counts: Counts,
}
