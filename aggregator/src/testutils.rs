use crate::errors::UpstreamError;
use crate::leagues::LeagueConfig;
use crate::upstream::ScoreboardSource;
use async_trait::async_trait;
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::net::TcpListener;
use url::Url;

/// Builds one upstream event with two team competitors.
pub fn event_json(
    id: &str,
    state: &str,
    date: Option<&str>,
    home: (&str, &str),
    away: (&str, &str),
) -> Value {
    let mut event = json!({
        "id": id,
        "name": format!("{} at {}", away.0, home.0),
        "shortName": format!("{} @ {}", away.1, home.1),
        "status": {"type": {"state": state, "detail": state}},
        "competitions": [{
            "competitors": [
                {"homeAway": "home", "score": "0", "team": {"displayName": home.0, "abbreviation": home.1}},
                {"homeAway": "away", "score": "0", "team": {"displayName": away.0, "abbreviation": away.1}}
            ]
        }]
    });
    if let Some(date) = date {
        event["date"] = json!(date);
    }
    event
}

/// One in-progress and two scheduled events.
pub fn mixed_scoreboard() -> Value {
    json!({
        "events": [
            event_json("1", "in", Some("2024-01-15T19:00Z"), ("Los Angeles Lakers", "LAL"), ("Boston Celtics", "BOS")),
            event_json("2", "pre", Some("2024-01-16T01:30Z"), ("Denver Nuggets", "DEN"), ("Miami Heat", "MIA")),
            event_json("3", "pre", Some("2024-01-15T23:00Z"), ("Golden State Warriors", "GS"), ("Phoenix Suns", "PHX")),
        ]
    })
}

/// Scoreboard body with `count` scheduled events.
pub fn scoreboard_body(count: usize) -> String {
    let events: Vec<Value> = (0..count)
        .map(|i| {
            event_json(
                &i.to_string(),
                "pre",
                Some("2024-01-15T19:00Z"),
                ("Home Team", "HOM"),
                ("Away Team", "AWY"),
            )
        })
        .collect();
    json!({ "events": events }).to_string()
}

pub struct UpstreamRoute {
    pub path: String,
    pub status: u16,
    pub body: String,
}

impl UpstreamRoute {
    pub fn ok(path: &str, body: String) -> Self {
        UpstreamRoute {
            path: path.to_string(),
            status: 200,
            body,
        }
    }

    pub fn status(path: &str, status: u16) -> Self {
        UpstreamRoute {
            path: path.to_string(),
            status,
            body: String::new(),
        }
    }
}

/// Starts a local stand-in for the sports data API and returns its base URL
/// (`http://127.0.0.1:{port}/sports`). Unknown paths return 404.
pub async fn start_upstream_server(routes: Vec<UpstreamRoute>) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to address");
    let port = listener.local_addr().unwrap().port();

    let routes: Arc<HashMap<String, (u16, String)>> = Arc::new(
        routes
            .into_iter()
            .map(|route| (route.path, (route.status, route.body)))
            .collect(),
    );

    tokio::spawn(async move {
        loop {
            let (stream, _) = listener.accept().await.unwrap();
            let io = TokioIo::new(stream);
            let routes = routes.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let routes = routes.clone();
                    async move {
                        let (status, body) = routes
                            .get(req.uri().path())
                            .cloned()
                            .unwrap_or((404, String::new()));
                        let mut response = Response::new(Full::new(Bytes::from(body)));
                        *response.status_mut() = StatusCode::from_u16(status).unwrap();
                        Ok::<_, Infallible>(response)
                    }
                });

                if let Err(err) = Builder::new(TokioExecutor::new())
                    .serve_connection(io, service)
                    .await
                {
                    eprintln!("Error serving connection: {:?}", err);
                }
            });
        }
    });

    Url::parse(&format!("http://127.0.0.1:{port}/sports")).unwrap()
}

/// In-memory scoreboard source keyed by league key.
#[derive(Default)]
pub struct MockSource {
    responses: HashMap<String, Result<Value, UpstreamError>>,
    panics: HashSet<String>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scoreboard(mut self, league: &str, scoreboard: Value) -> Self {
        self.responses.insert(league.to_string(), Ok(scoreboard));
        self
    }

    pub fn with_status(mut self, league: &str, status: u16) -> Self {
        self.responses.insert(
            league.to_string(),
            Err(UpstreamError::Status {
                league: league.to_string(),
                status,
            }),
        );
        self
    }

    /// Fetching `league` panics.
    pub fn with_panic(mut self, league: &str) -> Self {
        self.panics.insert(league.to_string());
        self
    }
}

#[async_trait]
impl ScoreboardSource for MockSource {
    async fn fetch_scoreboard(&self, league: &LeagueConfig) -> Result<Value, UpstreamError> {
        if self.panics.contains(&league.key) {
            panic!("scoreboard fetch for {} blew up", league.key);
        }
        self.responses
            .get(&league.key)
            .cloned()
            .unwrap_or_else(|| {
                Err(UpstreamError::Status {
                    league: league.key.clone(),
                    status: 404,
                })
            })
    }
}
