//! Endpoint handlers
//!
//! POST /api/run-search       batch mode
//! GET  /api/run-search-sse   streaming mode
//! POST /api/retry-scrape     single-URL retry
//! GET  /api/proxy-locations  location autocomplete passthrough

use crate::crawler::validate_search;
use crate::output::{BatchResponse, RetryResult, StreamEmitter, StreamEvent};
use crate::server::error::ApiError;
use crate::server::AppState;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::stream::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl SearchParams {
    /// Trimmed query and location, rejecting blanks
    fn required(self) -> Result<(String, String), ApiError> {
        let q = self.q.unwrap_or_default().trim().to_string();
        let location = self.location.unwrap_or_default().trim().to_string();
        validate_search(&q, &location)?;
        Ok((q, location))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RetryBody {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RetryResponse {
    pub result: RetryResult,
}

#[derive(Debug, Default, Deserialize)]
pub struct LocationParams {
    #[serde(default)]
    pub q: Option<String>,
}

/// Parses a JSON request body; an empty body reads as `{}`
fn parse_body<T>(body: &Bytes) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected request body");
        ApiError::bad_request("invalid JSON")
    })
}

pub async fn run_search(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<BatchResponse>, ApiError> {
    let (q, location) = parse_body::<SearchParams>(&body)?.required()?;
    let response = state.coordinator.search_batch(&q, &location).await?;
    Ok(Json(response))
}

pub async fn run_search_sse(
    State(state): State<AppState>,
    params: Option<Query<SearchParams>>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let params = params.map(|Query(p)| p).unwrap_or_default();
    let (q, location) = params.required()?;

    // Fail before the stream opens so the status code still means something
    state.coordinator.provider().api_key()?;

    let (tx, rx) = mpsc::unbounded_channel();
    let coordinator = Arc::clone(&state.coordinator);
    tokio::spawn(async move {
        if let Err(e) = coordinator
            .search_stream(&q, &location, StreamEmitter::new(tx))
            .await
        {
            tracing::warn!(query = %q, error = %e, "Streaming search ended with an error");
        }
    });

    let events =
        UnboundedReceiverStream::new(rx).map(|event| Ok::<_, Infallible>(to_sse_event(&event)));
    let keep_alive = KeepAlive::new().interval(state.keep_alive).text("keep-alive");

    Ok(Sse::new(events).keep_alive(keep_alive))
}

fn to_sse_event(event: &StreamEvent) -> Event {
    match event.to_json() {
        Ok(data) => Event::default().event(event.name()).data(data),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize stream event");
            Event::default()
                .event("error")
                .data(r#"{"error":"serialization failed"}"#)
        }
    }
}

pub async fn retry_scrape(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RetryResponse>, ApiError> {
    let url = parse_body::<RetryBody>(&body)?
        .url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::bad_request("missing url"))?;

    let result = state.coordinator.retry_one(&url).await;
    Ok(Json(RetryResponse { result }))
}

pub async fn proxy_locations(
    State(state): State<AppState>,
    params: Option<Query<LocationParams>>,
) -> Result<Response, ApiError> {
    let q = params
        .and_then(|Query(p)| p.q)
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::bad_request("missing q parameter"))?;

    let upstream = state.coordinator.provider().locations(&q).await?;
    let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);

    Ok((status, [(CONTENT_TYPE, "application/json")], upstream.body).into_response())
}

/// `OPTIONS` when the CORS layer is off; with it on, the layer answers first
/// and its answer is rewritten to the same 204
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub async fn post_only() -> ApiError {
    ApiError::MethodNotAllowed("POST")
}

pub async fn get_only() -> ApiError {
    ApiError::MethodNotAllowed("GET")
}
