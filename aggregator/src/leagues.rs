//! League table.
//!
//! Each league key (e.g. `nba`) maps to the upstream path segments used to
//! build its scoreboard URL (`basketball/nba`) and a display name. The table
//! is built once at startup, either from the defaults below or from the
//! config file, and is never mutated afterwards.

use crate::errors::ValidationError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single league as configured.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct LeagueConfig {
    /// Short key used by callers (e.g. "nba")
    pub key: String,
    /// Upstream sport path segment (e.g. "basketball")
    pub sport: String,
    /// Upstream league path segment (e.g. "nba", "eng.1")
    pub league: String,
    /// Display name (e.g. "NBA")
    pub name: String,
}

struct LeagueDef {
    key: &'static str,
    sport: &'static str,
    league: &'static str,
    name: &'static str,
}

static DEFAULT_LEAGUES: &[LeagueDef] = &[
    // Football
    LeagueDef {
        key: "nfl",
        sport: "football",
        league: "nfl",
        name: "NFL",
    },
    LeagueDef {
        key: "ncaaf",
        sport: "football",
        league: "college-football",
        name: "College Football",
    },
    // Basketball
    LeagueDef {
        key: "nba",
        sport: "basketball",
        league: "nba",
        name: "NBA",
    },
    LeagueDef {
        key: "wnba",
        sport: "basketball",
        league: "wnba",
        name: "WNBA",
    },
    LeagueDef {
        key: "ncaab",
        sport: "basketball",
        league: "mens-college-basketball",
        name: "Men's College Basketball",
    },
    // Baseball / hockey
    LeagueDef {
        key: "mlb",
        sport: "baseball",
        league: "mlb",
        name: "MLB",
    },
    LeagueDef {
        key: "nhl",
        sport: "hockey",
        league: "nhl",
        name: "NHL",
    },
    // Soccer
    LeagueDef {
        key: "mls",
        sport: "soccer",
        league: "usa.1",
        name: "MLS",
    },
    LeagueDef {
        key: "epl",
        sport: "soccer",
        league: "eng.1",
        name: "Premier League",
    },
    LeagueDef {
        key: "laliga",
        sport: "soccer",
        league: "esp.1",
        name: "La Liga",
    },
    // Individual sports
    LeagueDef {
        key: "ufc",
        sport: "mma",
        league: "ufc",
        name: "UFC",
    },
    LeagueDef {
        key: "atp",
        sport: "tennis",
        league: "atp",
        name: "ATP",
    },
];

impl From<&LeagueDef> for LeagueConfig {
    fn from(def: &LeagueDef) -> Self {
        LeagueConfig {
            key: def.key.to_string(),
            sport: def.sport.to_string(),
            league: def.league.to_string(),
            name: def.name.to_string(),
        }
    }
}

/// The built-in league table.
pub fn default_leagues() -> Vec<LeagueConfig> {
    DEFAULT_LEAGUES.iter().map(LeagueConfig::from).collect()
}

/// Immutable lookup over the configured leagues, in configuration order.
#[derive(Clone, Debug)]
pub struct Leagues {
    by_key: IndexMap<String, LeagueConfig>,
}

impl Leagues {
    /// Keys are matched case-insensitively. Later duplicates are ignored;
    /// config validation rejects them before this point.
    pub fn new(leagues: Vec<LeagueConfig>) -> Self {
        let mut by_key = IndexMap::with_capacity(leagues.len());
        for league in leagues {
            by_key.entry(league.key.to_lowercase()).or_insert(league);
        }
        Self { by_key }
    }

    pub fn get(&self, key: &str) -> Option<&LeagueConfig> {
        self.by_key.get(&key.trim().to_lowercase())
    }

    pub fn all(&self) -> impl Iterator<Item = &LeagueConfig> {
        self.by_key.values()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Resolves requested league keys. `None` selects every league.
    /// Duplicate keys are collapsed, keeping the first occurrence.
    pub fn resolve(&self, keys: Option<&[String]>) -> Result<Vec<LeagueConfig>, ValidationError> {
        let Some(keys) = keys else {
            return Ok(self.all().cloned().collect());
        };

        if keys.is_empty() {
            return Err(ValidationError::EmptyLeagueList);
        }

        let mut resolved: Vec<LeagueConfig> = Vec::with_capacity(keys.len());
        for key in keys {
            let league = self
                .get(key)
                .ok_or_else(|| ValidationError::UnknownLeague(key.clone()))?;
            if !resolved.iter().any(|l| l.key == league.key) {
                resolved.push(league.clone());
            }
        }
        Ok(resolved)
    }

    /// Every league whose upstream sport segment equals `sport`.
    pub fn for_sport(&self, sport: &str) -> Result<Vec<LeagueConfig>, ValidationError> {
        let wanted = sport.trim().to_lowercase();
        let leagues: Vec<LeagueConfig> = self
            .all()
            .filter(|league| league.sport.eq_ignore_ascii_case(&wanted))
            .cloned()
            .collect();

        if leagues.is_empty() {
            return Err(ValidationError::UnknownSport(sport.to_string()));
        }
        Ok(leagues)
    }
}

impl Default for Leagues {
    fn default() -> Self {
        Leagues::new(default_leagues())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let leagues = Leagues::default();
        assert_eq!(leagues.len(), DEFAULT_LEAGUES.len());

        let nba = leagues.get("nba").unwrap();
        assert_eq!(nba.sport, "basketball");
        assert_eq!(nba.league, "nba");
        assert_eq!(nba.name, "NBA");

        let epl = leagues.get("EPL").unwrap();
        assert_eq!(epl.league, "eng.1");

        assert!(leagues.get("cricket").is_none());
    }

    #[test]
    fn test_resolve() {
        let leagues = Leagues::default();

        let all = leagues.resolve(None).unwrap();
        assert_eq!(all.len(), leagues.len());
        assert_eq!(all[0].key, "nfl");

        let requested = ["nhl", "NBA", "nhl"].map(String::from);
        let picked = leagues.resolve(Some(&requested)).unwrap();
        let keys: Vec<_> = picked.iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys, vec!["nhl", "nba"]);

        assert_eq!(
            leagues.resolve(Some(&[])).unwrap_err(),
            ValidationError::EmptyLeagueList
        );
        assert_eq!(
            leagues
                .resolve(Some(&["nba".to_string(), "xfl".to_string()]))
                .unwrap_err(),
            ValidationError::UnknownLeague("xfl".to_string())
        );
    }

    #[test]
    fn test_for_sport() {
        let leagues = Leagues::default();

        let basketball = leagues.for_sport("Basketball").unwrap();
        let keys: Vec<_> = basketball.iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys, vec!["nba", "wnba", "ncaab"]);

        assert_eq!(
            leagues.for_sport("curling").unwrap_err(),
            ValidationError::UnknownSport("curling".to_string())
        );
    }
}
