use axum::Router;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::snapshot::epoch_seconds;
use crate::core::source::RateSource;
use crate::providers::caching::RateCache;

/// Query parameter selecting a single currency.
pub const CURRENCY_PARAM: &str = "currency";

#[derive(Debug, Serialize)]
struct AllRatesBody {
    error: bool,
    msg: String,
    #[serde(with = "epoch_seconds")]
    timestamp: DateTime<Utc>,
    base: String,
    rates: HashMap<String, f64>,
}

#[derive(Debug, Serialize)]
struct SingleRateBody {
    error: bool,
    msg: String,
    #[serde(with = "epoch_seconds")]
    timestamp: DateTime<Utc>,
    base: String,
    code: String,
    rate: f64,
}

pub fn router<S: RateSource + 'static>(cache: Arc<RateCache<S>>) -> Router {
    Router::new()
        .route("/current_rates", get(current_rates::<S>))
        .with_state(cache)
}

/// GET /current_rates
///
/// Without a `currency` parameter, responds with the full rates mapping.
/// With one (even an empty value), responds with that single rate, echoing
/// the code exactly as supplied while the lookup is uppercased. Errors are
/// reported in the body with status 200.
async fn current_rates<S: RateSource + 'static>(
    State(cache): State<Arc<RateCache<S>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let snapshot = cache.get_rates().await;

    match params.get(CURRENCY_PARAM) {
        Some(code) => {
            let rate = snapshot.rates.get(&code.to_uppercase()).copied();
            json_response(&SingleRateBody {
                error: rate.is_none(),
                msg: match rate {
                    Some(_) => String::new(),
                    None => "Unsupported Currency".to_string(),
                },
                timestamp: snapshot.timestamp,
                base: snapshot.base,
                code: code.clone(),
                rate: rate.unwrap_or(0.0),
            })
        }
        None => {
            let unavailable = snapshot.rates.is_empty();
            json_response(&AllRatesBody {
                error: unavailable,
                msg: if unavailable {
                    "Unable to retrieve rates".to_string()
                } else {
                    String::new()
                },
                timestamp: snapshot.timestamp,
                base: snapshot.base,
                rates: snapshot.rates,
            })
        }
    }
}

fn json_response<T: Serialize>(body: &T) -> Response {
    match serde_json::to_string(body) {
        Ok(json) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            json,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::snapshot::RateSnapshot;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    struct MockRateSource {
        snapshot: Option<RateSnapshot>,
    }

    #[async_trait]
    impl RateSource for MockRateSource {
        async fn fetch_rates(&self) -> Result<RateSnapshot> {
            match &self.snapshot {
                Some(snapshot) => Ok(snapshot.clone()),
                None => Err(anyhow!("upstream unavailable")),
            }
        }
    }

    fn app_with_rates() -> Router {
        let snapshot = RateSnapshot {
            base: "USD".to_string(),
            timestamp: Utc::now(),
            rates: HashMap::from([
                ("AUD".to_string(), 1.347864),
                ("SGD".to_string(), 1.397609),
            ]),
        };
        router(Arc::new(RateCache::new(MockRateSource {
            snapshot: Some(snapshot),
        })))
    }

    fn app_without_rates() -> Router {
        router(Arc::new(RateCache::new(MockRateSource { snapshot: None })))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn test_all_rates_response() {
        let (status, body) = get_json(app_with_rates(), "/current_rates").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"], false);
        assert_eq!(body["msg"], "");
        assert_eq!(body["base"], "USD");
        assert!(body["timestamp"].is_i64());
        assert_eq!(body["rates"]["AUD"], 1.347864);
        assert_eq!(body["rates"]["SGD"], 1.397609);
    }

    #[tokio::test]
    async fn test_all_rates_unavailable() {
        let (status, body) = get_json(app_without_rates(), "/current_rates").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"], true);
        assert_eq!(body["msg"], "Unable to retrieve rates");
        assert_eq!(body["base"], "");
        assert_eq!(body["timestamp"], 0);
        assert_eq!(body["rates"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_single_rate_response() {
        let (status, body) = get_json(app_with_rates(), "/current_rates?currency=SGD").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"], false);
        assert_eq!(body["msg"], "");
        assert_eq!(body["base"], "USD");
        assert_eq!(body["code"], "SGD");
        assert_eq!(body["rate"], 1.397609);
    }

    #[tokio::test]
    async fn test_single_rate_lookup_is_uppercased() {
        let (_, body) = get_json(app_with_rates(), "/current_rates?currency=aud").await;

        assert_eq!(body["error"], false);
        assert_eq!(body["rate"], 1.347864);
        // The code echoes the raw query value
        assert_eq!(body["code"], "aud");
    }

    #[tokio::test]
    async fn test_single_rate_unsupported_currency() {
        let (status, body) = get_json(app_with_rates(), "/current_rates?currency=XYZ").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"], true);
        assert_eq!(body["msg"], "Unsupported Currency");
        assert_eq!(body["code"], "XYZ");
        assert_eq!(body["rate"], 0.0);
    }

    #[tokio::test]
    async fn test_empty_currency_value_is_single_rate_branch() {
        let (_, body) = get_json(app_with_rates(), "/current_rates?currency=").await;

        assert_eq!(body["error"], true);
        assert_eq!(body["msg"], "Unsupported Currency");
        assert_eq!(body["code"], "");
        assert_eq!(body["rate"], 0.0);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let response = app_with_rates()
            .oneshot(
                Request::builder()
                    .uri("/unsupported_path")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
