use crate::aggregate::Aggregator;
use crate::config::AgentConfig;
use crate::discovery::{DiscoveryDocument, entrypoint_list};
use crate::entrypoints::Catalog;
use crate::errors::AggregatorError;
use crate::metrics_defs::{REQUEST_DURATION, REQUESTS_INFLIGHT};
use http_body_util::BodyExt;
use http_body_util::combinators::BoxBody;
use hyper::body::{Body, Bytes};
use hyper::service::Service;
use hyper::{Method, Request, Response, StatusCode};
use serde::Serialize;
use serde_json::json;
use shared::http::json_response;
use shared::{gauge, histogram};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

type RouterResponse = Response<BoxBody<Bytes, AggregatorError>>;

const DISCOVERY_PATH: &str = "/.well-known/agent.json";
const ENTRYPOINTS_PATH: &str = "/entrypoints";

/// What a request path resolved to
#[derive(Debug, PartialEq)]
enum Route<'a> {
    Discovery,
    ListEntrypoints,
    Invoke(&'a str),
}

fn match_route<'a>(method: &Method, path: &'a str) -> Option<Route<'a>> {
    match (method, path) {
        (&Method::GET, DISCOVERY_PATH) => Some(Route::Discovery),
        (&Method::GET, ENTRYPOINTS_PATH) => Some(Route::ListEntrypoints),
        (&Method::POST, path) => {
            let name = path
                .strip_prefix("/entrypoints/")?
                .strip_suffix("/invoke")?;
            if name.is_empty() || name.contains('/') {
                return None;
            }
            Some(Route::Invoke(name))
        }
        _ => None,
    }
}

struct RouterState {
    aggregator: Aggregator,
    catalog: Catalog,
    agent: AgentConfig,
}

/// Serves the discovery document and dispatches entrypoint invocations.
///
/// Every error becomes a JSON `{"error": ...}` response, so the service
/// itself never fails.
#[derive(Clone)]
pub struct Router {
    state: Arc<RouterState>,
}

impl Router {
    pub fn new(aggregator: Aggregator, catalog: Catalog, agent: AgentConfig) -> Self {
        Router {
            state: Arc::new(RouterState {
                aggregator,
                catalog,
                agent,
            }),
        }
    }

    pub async fn route<B>(&self, req: Request<B>) -> RouterResponse
    where
        B: Body + Send + 'static,
        B::Data: Send,
        B::Error: std::fmt::Display,
    {
        let start = Instant::now();
        let (parts, body) = req.into_parts();
        let route = match_route(&parts.method, parts.uri.path());
        let label = self.metric_label(route.as_ref());

        gauge!(REQUESTS_INFLIGHT).increment(1.0);
        let result = match route {
            Some(Route::Discovery) => {
                let document = DiscoveryDocument::new(&self.state.agent, &self.state.catalog);
                to_json(&document)
            }
            Some(Route::ListEntrypoints) => to_json(&json!({
                "entrypoints": entrypoint_list(&self.state.catalog),
            })),
            Some(Route::Invoke(name)) => self.invoke(name, body).await,
            None => {
                tracing::debug!(
                    method = %parts.method,
                    path = %parts.uri.path(),
                    "No route matched"
                );
                Err(AggregatorError::NoRouteMatched)
            }
        };
        gauge!(REQUESTS_INFLIGHT).decrement(1.0);

        let response = result.unwrap_or_else(|e| error_response(&e));
        histogram!(
            REQUEST_DURATION,
            "entrypoint" => label,
            "status" => response.status().as_u16().to_string()
        )
        .record(start.elapsed().as_secs_f64());

        response
    }

    /// Metric tag for a request. Only catalog names are used so that request
    /// paths cannot create new series.
    fn metric_label(&self, route: Option<&Route<'_>>) -> &'static str {
        match route {
            Some(Route::Discovery) => "discovery",
            Some(Route::ListEntrypoints) => "list",
            Some(Route::Invoke(name)) => self
                .state
                .catalog
                .get(name)
                .map(|entry| entry.entrypoint.name())
                .unwrap_or("unknown"),
            None => "none",
        }
    }

    async fn invoke<B>(&self, name: &str, body: B) -> Result<RouterResponse, AggregatorError>
    where
        B: Body + Send + 'static,
        B::Data: Send,
        B::Error: std::fmt::Display,
    {
        let body = body
            .collect()
            .await
            .map_err(|e| AggregatorError::RequestBodyError(e.to_string()))?
            .to_bytes();

        let envelope = self
            .state
            .catalog
            .invoke(name, &self.state.aggregator, &body)
            .await?;
        to_json(&envelope)
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<RouterResponse, AggregatorError> {
    let body = serde_json::to_vec(value)?;
    Ok(json_response(StatusCode::OK, Bytes::from(body)))
}

fn error_response(error: &AggregatorError) -> RouterResponse {
    let status = error.status_code();
    if status.is_server_error() {
        tracing::warn!(status = status.as_u16(), error = %error, "Request failed");
    } else {
        tracing::debug!(status = status.as_u16(), error = %error, "Request rejected");
    }

    let body = json!({ "error": error.to_string() }).to_string();
    json_response(status, Bytes::from(body))
}

impl<B> Service<Request<B>> for Router
where
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: std::fmt::Display,
{
    type Response = RouterResponse;
    type Error = AggregatorError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<B>) -> Self::Future {
        let router = self.clone();
        Box::pin(async move { Ok(router.route(req).await) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leagues::Leagues;
    use crate::testutils::{MockSource, mixed_scoreboard};
    use http_body_util::Full;
    use metrics::{
        Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
    };
    use serde_json::Value;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    fn router() -> Router {
        let source = MockSource::new()
            .with_scoreboard("nba", mixed_scoreboard())
            .with_status("nfl", 500);
        Router::new(
            Aggregator::new(Arc::new(source), Leagues::default()),
            Catalog::new(&HashMap::new()),
            AgentConfig::default(),
        )
    }

    fn request(method: Method, path: &str, body: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    async fn send(router: &Router, req: Request<Full<Bytes>>) -> (StatusCode, Value) {
        let response = router.call(req).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn test_match_route() {
        assert_eq!(
            match_route(&Method::GET, "/.well-known/agent.json"),
            Some(Route::Discovery)
        );
        assert_eq!(
            match_route(&Method::POST, "/entrypoints/league/invoke"),
            Some(Route::Invoke("league"))
        );
        assert_eq!(
            match_route(&Method::GET, "/entrypoints/league/invoke"),
            None
        );
        assert_eq!(match_route(&Method::POST, "/entrypoints//invoke"), None);
        assert_eq!(match_route(&Method::POST, "/entrypoints/a/b/invoke"), None);
        assert_eq!(match_route(&Method::POST, "/entrypoints"), None);
    }

    #[test]
    fn test_metric_label() {
        let router = router();
        let invoke = |name| router.metric_label(Some(&Route::Invoke(name)));
        assert_eq!(invoke("league"), "league");
        assert_eq!(invoke("junk"), "unknown");
        assert_eq!(router.metric_label(Some(&Route::Discovery)), "discovery");
        assert_eq!(router.metric_label(None), "none");
    }

    /// Records the key of every registered histogram.
    #[derive(Default)]
    struct HistogramKeys {
        keys: Mutex<HashSet<String>>,
    }

    impl Recorder for HistogramKeys {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, _: &Key, _: &Metadata<'_>) -> Counter {
            Counter::noop()
        }

        fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
            Gauge::noop()
        }

        fn register_histogram(&self, key: &Key, _: &Metadata<'_>) -> Histogram {
            let labels: Vec<String> = key
                .labels()
                .map(|label| format!("{}={}", label.key(), label.value()))
                .collect();
            self.keys
                .lock()
                .unwrap()
                .insert(format!("{}|{}", key.name(), labels.join(",")));
            Histogram::noop()
        }
    }

    #[test]
    fn test_unknown_entrypoints_share_one_series() {
        let recorder = HistogramKeys::default();
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        metrics::with_local_recorder(&recorder, || {
            rt.block_on(async {
                let router = router();
                for i in 0..20 {
                    let path = format!("/entrypoints/junk{i}/invoke");
                    let response = router.route(request(Method::POST, &path, "{}")).await;
                    assert_eq!(response.status(), StatusCode::NOT_FOUND);
                }
            })
        });

        let keys = recorder.keys.lock().unwrap();
        assert_eq!(keys.len(), 1);
        let key = keys.iter().next().unwrap();
        assert!(key.starts_with("request.duration|"));
        assert!(key.contains("entrypoint=unknown"));
        assert!(!key.contains("junk"));
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, body) = send(&router(), request(Method::GET, "/nope", "")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());

        let (status, body) = send(
            &router(),
            request(Method::POST, "/entrypoints/nope/invoke", "{}"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Unknown entrypoint: nope");
    }

    #[tokio::test]
    async fn test_invoke_league() {
        let (status, body) = send(
            &router(),
            request(
                Method::POST,
                "/entrypoints/league/invoke",
                r#"{"input": {"league": "nba", "status": "live"}}"#,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["fetched_at"].is_string());
        assert_eq!(body["output"]["league"], "nba");
        assert_eq!(body["output"]["events"].as_array().unwrap().len(), 1);
        let event = &body["output"]["events"][0];
        assert_eq!(event["status"]["state"], "in_progress");
    }

    #[tokio::test]
    async fn test_invoke_errors() {
        let router = router();

        let (status, _) = send(
            &router,
            request(
                Method::POST,
                "/entrypoints/league/invoke",
                r#"{"input": {"league": "cricket"}}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &router,
            request(Method::POST, "/entrypoints/league/invoke", "{oops"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &router,
            request(
                Method::POST,
                "/entrypoints/league/invoke",
                r#"{"input": {"league": "nfl"}}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("nfl"));
    }

    #[tokio::test]
    async fn test_multi_league_call_isolates_failure() {
        let (status, body) = send(
            &router(),
            request(
                Method::POST,
                "/entrypoints/report/invoke",
                r#"{"input": {"leagues": ["nfl", "nba"]}}"#,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["output"]["totals"]["total"], 3);
        assert_eq!(body["output"]["leagues"][0]["total"], 0);
    }

    #[tokio::test]
    async fn test_discovery() {
        let router = router();

        let (status, body) = send(&router, request(Method::GET, DISCOVERY_PATH, "")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "scoreboard");
        assert_eq!(body["entrypoints"].as_array().unwrap().len(), 7);

        let (status, body) = send(&router, request(Method::GET, ENTRYPOINTS_PATH, "")).await;
        assert_eq!(status, StatusCode::OK);
        let league = &body["entrypoints"][1];
        assert_eq!(league["invoke"], "/entrypoints/league/invoke");
        assert_eq!(league["price"], "0.01");
    }
}
