use crate::config::ConfigValidationError;
use http::StatusCode;
use thiserror::Error;

/// Result type alias for aggregator operations
pub type Result<T, E = AggregatorError> = std::result::Result<T, E>;

/// Failure talking to the sports data API for one league.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpstreamError {
    #[error("upstream returned HTTP {status} for league {league}")]
    Status { league: String, status: u16 },

    #[error("upstream request failed for league {league}: {message}")]
    Transport { league: String, message: String },

    #[error("upstream returned an unreadable body for league {league}: {message}")]
    InvalidBody { league: String, message: String },
}

impl UpstreamError {
    pub fn league(&self) -> &str {
        match self {
            UpstreamError::Status { league, .. }
            | UpstreamError::Transport { league, .. }
            | UpstreamError::InvalidBody { league, .. } => league,
        }
    }
}

/// Malformed or out-of-range input to an entrypoint.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("request body is not valid JSON: {0}")]
    MalformedBody(String),

    #[error("invalid input: {0}")]
    MalformedInput(String),

    #[error("unknown league: {0}")]
    UnknownLeague(String),

    #[error("unknown sport: {0}")]
    UnknownSport(String),

    #[error("league list cannot be empty")]
    EmptyLeagueList,

    #[error("search query cannot be empty")]
    EmptyQuery,

    #[error("limit {limit} is out of range (1..={max})")]
    LimitOutOfRange { limit: usize, max: usize },
}

/// Errors that can occur while serving the aggregator
#[derive(Error, Debug)]
pub enum AggregatorError {
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Unknown entrypoint: {0}")]
    UnknownEntrypoint(String),

    #[error("No route matched for request")]
    NoRouteMatched,

    #[error("Failed to read request body: {0}")]
    RequestBodyError(String),

    #[error("Response serialization error: {0}")]
    ResponseSerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AggregatorError {
    /// HTTP status reported to the caller for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AggregatorError::Validation(_) | AggregatorError::RequestBodyError(_) => {
                StatusCode::BAD_REQUEST
            }
            AggregatorError::UnknownEntrypoint(_) | AggregatorError::NoRouteMatched => {
                StatusCode::NOT_FOUND
            }
            AggregatorError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AggregatorError::ResponseSerializationError(_)
            | AggregatorError::HttpClientError(_)
            | AggregatorError::Config(_)
            | AggregatorError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let status = |err: AggregatorError| err.status_code();

        assert_eq!(
            status(ValidationError::EmptyQuery.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(AggregatorError::UnknownEntrypoint("nope".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status(AggregatorError::NoRouteMatched), StatusCode::NOT_FOUND);

        let upstream = UpstreamError::Status {
            league: "nba".into(),
            status: 500,
        };
        assert_eq!(status(upstream.into()), StatusCode::BAD_GATEWAY);

        let io = std::io::Error::other("boom");
        assert_eq!(status(io.into()), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_upstream_error_league() {
        let err = UpstreamError::Transport {
            league: "nhl".into(),
            message: "connection refused".into(),
        };
        assert_eq!(err.league(), "nhl");
        assert_eq!(
            err.to_string(),
            "upstream request failed for league nhl: connection refused"
        );
    }
}
