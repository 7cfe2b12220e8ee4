use crate::errors::UpstreamError;
use crate::leagues::LeagueConfig;
use async_trait::async_trait;
use serde_json::Value;
use url::Url;

/// Source of raw scoreboard JSON, one league at a time.
#[async_trait]
pub trait ScoreboardSource: Send + Sync {
    async fn fetch_scoreboard(&self, league: &LeagueConfig) -> Result<Value, UpstreamError>;
}

/// Fetches scoreboards from the sports data REST API.
///
/// No retries and no caching: every call goes to the upstream. Timeouts are
/// the HTTP client defaults.
#[derive(Clone)]
pub struct HttpScoreboardSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpScoreboardSource {
    pub fn new(base_url: &Url) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("scoreboard/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(HttpScoreboardSource {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn scoreboard_url(&self, league: &LeagueConfig) -> String {
        format!(
            "{}/{}/{}/scoreboard",
            self.base_url, league.sport, league.league
        )
    }
}

#[async_trait]
impl ScoreboardSource for HttpScoreboardSource {
    async fn fetch_scoreboard(&self, league: &LeagueConfig) -> Result<Value, UpstreamError> {
        let url = self.scoreboard_url(league);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport {
                league: league.key.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                league: league.key.clone(),
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| UpstreamError::InvalidBody {
                league: league.key.clone(),
                message: e.to_string(),
            })
    }
}
