//! Filtering, searching and ordering of normalized events.

use crate::errors::ValidationError;
use crate::types::{EventState, NormalizedEvent};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const MAX_LIMIT: usize = 100;

/// Predicate over normalized events. Empty filters match everything.
#[derive(Clone, Debug, Default)]
pub struct EventFilter {
    pub state: Option<EventState>,
    /// Matched against event name and participants, case-insensitively
    pub text: Option<String>,
}

impl EventFilter {
    pub fn with_state(state: Option<EventState>) -> Self {
        EventFilter { state, text: None }
    }

    pub fn matches(&self, event: &NormalizedEvent) -> bool {
        if let Some(state) = self.state
            && event.state() != state
        {
            return false;
        }

        if let Some(text) = &self.text
            && !event.matches_text(&text.to_lowercase())
        {
            return false;
        }

        true
    }
}

pub fn filter_events(events: Vec<NormalizedEvent>, filter: &EventFilter) -> Vec<NormalizedEvent> {
    events.into_iter().filter(|e| filter.matches(e)).collect()
}

/// Where a search query is looked for.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    /// Participant names and abbreviations only
    #[default]
    Participants,
    /// Event name as well as participants
    All,
}

/// Case-insensitive substring search. A blank query is rejected.
pub fn search(
    events: Vec<NormalizedEvent>,
    query: &str,
    scope: SearchScope,
) -> Result<Vec<NormalizedEvent>, ValidationError> {
    if query.trim().is_empty() {
        return Err(ValidationError::EmptyQuery);
    }
    let needle = query.to_lowercase();

    Ok(events
        .into_iter()
        .filter(|event| match scope {
            SearchScope::Participants => event.has_participant_matching(&needle),
            SearchScope::All => event.matches_text(&needle),
        })
        .collect())
}

/// Sorts by start time, earliest first. Events without a start time go last;
/// the sort is stable.
pub fn sort_by_start(events: &mut [NormalizedEvent]) {
    events.sort_by(|a, b| match (a.start_time, b.start_time) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

pub fn cap(events: &mut Vec<NormalizedEvent>, limit: Option<usize>) {
    if let Some(limit) = limit {
        events.truncate(limit);
    }
}

/// Scheduled events, earliest first, at most `limit`.
pub fn upcoming(events: Vec<NormalizedEvent>, limit: Option<usize>) -> Vec<NormalizedEvent> {
    let scheduled = EventFilter::with_state(Some(EventState::Scheduled));
    let mut upcoming = filter_events(events, &scheduled);
    sort_by_start(&mut upcoming);
    cap(&mut upcoming, limit);
    upcoming
}

/// Checks a caller-supplied limit against `1..=MAX_LIMIT`, falling back to
/// `default` when absent.
pub fn validate_limit(
    limit: Option<usize>,
    default: Option<usize>,
) -> Result<Option<usize>, ValidationError> {
    match limit {
        Some(limit) if limit == 0 || limit > MAX_LIMIT => Err(ValidationError::LimitOutOfRange {
            limit,
            max: MAX_LIMIT,
        }),
        Some(limit) => Ok(Some(limit)),
        None => Ok(default),
    }
}
