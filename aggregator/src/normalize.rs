//! Reshapes upstream scoreboard events into `NormalizedEvent`.
//!
//! The upstream payload differs between sports: team sports carry
//! `competitor.team`, individual sports (MMA, tennis) carry
//! `competitor.athlete`, tennis nests competitions under `groupings`, and
//! scores arrive as strings, numbers or objects. Every field other than the
//! event itself is optional; anything missing becomes `None` or a neutral
//! default instead of an error.

use crate::leagues::LeagueConfig;
use crate::types::{EventState, EventStatus, NormalizedEvent, Participant, Side};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

/// Normalizes every event of one league's scoreboard response.
pub fn events_from_scoreboard(scoreboard: &Value, league: &LeagueConfig) -> Vec<NormalizedEvent> {
    match scoreboard["events"].as_array() {
        Some(events) => events.iter().map(|e| normalize(e, league)).collect(),
        None => Vec::new(),
    }
}

/// Maps a single upstream event to the common shape.
pub fn normalize(event: &Value, league: &LeagueConfig) -> NormalizedEvent {
    let competition = primary_competition(event);

    let status_obj = if event["status"].is_object() {
        &event["status"]
    } else {
        &competition["status"]
    };

    let participants = competition["competitors"]
        .as_array()
        .map(|competitors| competitors.iter().map(participant).collect())
        .unwrap_or_default();

    let date = text(&event["date"]).or_else(|| text(&competition["date"]));

    NormalizedEvent {
        id: text(&event["id"]).unwrap_or_default(),
        name: text(&event["name"]).unwrap_or_default(),
        short_name: text(&event["shortName"]),
        league: league.key.clone(),
        league_name: league.name.clone(),
        start_time: date.as_deref().and_then(parse_date),
        status: status(status_obj),
        venue: text(&competition["venue"]["fullName"])
            .or_else(|| text(&event["venue"]["displayName"]))
            .or_else(|| text(&event["venue"]["fullName"])),
        participants,
    }
}

fn primary_competition(event: &Value) -> &Value {
    let direct = &event["competitions"][0];
    if direct.is_object() {
        return direct;
    }
    &event["groupings"][0]["competitions"][0]
}

fn participant(competitor: &Value) -> Participant {
    let team = &competitor["team"];
    let athlete = &competitor["athlete"];

    let name = text(&team["displayName"])
        .or_else(|| text(&team["name"]))
        .or_else(|| text(&athlete["displayName"]))
        .or_else(|| text(&athlete["fullName"]))
        .unwrap_or_default();

    let abbreviation =
        text(&team["abbreviation"]).or_else(|| text(&athlete["shortName"]));

    let side = match competitor["homeAway"].as_str() {
        Some("home") => Side::Home,
        Some("away") => Side::Away,
        _ => Side::Unknown,
    };

    Participant {
        name,
        abbreviation,
        score: score(&competitor["score"]),
        winner: competitor["winner"].as_bool().unwrap_or(false),
        side,
        record: text(&competitor["records"][0]["summary"]),
    }
}

fn score(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(_) => text(&value["displayValue"]),
        _ => None,
    }
}

fn status(status_obj: &Value) -> EventStatus {
    let kind = &status_obj["type"];

    let detail = text(&kind["detail"])
        .or_else(|| text(&kind["shortDetail"]))
        .or_else(|| text(&kind["description"]))
        .unwrap_or_default();

    EventStatus {
        state: parse_state(kind),
        detail,
        period: status_obj["period"]
            .as_u64()
            .and_then(|p| u32::try_from(p).ok()),
        clock: text(&status_obj["displayClock"]),
    }
}

/// `type.state` wins when present, then the `completed` flag, then the
/// status name.
fn parse_state(kind: &Value) -> EventState {
    match kind["state"].as_str() {
        Some("in") => return EventState::InProgress,
        Some("post") => return EventState::Completed,
        Some("pre") => return EventState::Scheduled,
        _ => {}
    }

    if kind["completed"].as_bool() == Some(true) {
        return EventState::Completed;
    }

    let name = kind["name"].as_str().unwrap_or_default().to_lowercase();
    if name.contains("in_progress")
        || name.contains("halftime")
        || name.contains("end_period")
    {
        EventState::InProgress
    } else if name.contains("final") || name.contains("completed") {
        EventState::Completed
    } else {
        EventState::Scheduled
    }
}

/// Accepts RFC 3339 and the minute-precision form the upstream uses
/// (`2024-01-15T19:00Z`).
pub fn parse_date(date: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(date) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%MZ")
        .ok()
        .map(|naive| naive.and_utc())
}

fn text(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
