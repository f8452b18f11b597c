//! Live-search sessions: one coordinator per browser tab, driven over
//! plain POSTs and observed over server-sent events.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use futures::stream::Stream;
use serde::Deserialize;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::{IntervalStream, WatchStream};
use tokio_stream::StreamExt;

use crate::coordinator::{SearchCoordinator, SearchView};
use crate::server::AppContext;

pub fn session_routes() -> Router<AppContext> {
    Router::new()
        .route("/sessions", get(list_sessions).post(create_session))
        .route("/sessions/:id", get(current_view).delete(end_session))
        .route("/sessions/:id/input", post(input))
        .route("/sessions/:id/submit", post(submit))
        .route("/sessions/:id/retry", post(retry))
        .route("/sessions/:id/close", post(end_session))
        .route("/sessions/:id/events", get(events))
}

async fn list_sessions(State(ctx): State<AppContext>) -> impl IntoResponse {
    Json(ctx.sessions.list())
}

#[derive(Deserialize)]
struct CreateRequest {
    #[serde(default)]
    query: String,
}

/// Start a session. An optional `{"query": ...}` body pre-fills its input,
/// so a page opened on `/?q=` searches straight away.
async fn create_session(
    State(ctx): State<AppContext>,
    body: Option<Json<CreateRequest>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let query = body.map(|Json(request)| request.query).unwrap_or_default();
    let id = ctx.sessions.create(&query).ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "Too many live search sessions".to_string(),
        )
    })?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

fn lookup(ctx: &AppContext, id: &str) -> Result<SearchCoordinator, (StatusCode, String)> {
    ctx.sessions
        .get(id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Session not found: {id}")))
}

async fn current_view(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<SearchView>, (StatusCode, String)> {
    Ok(Json(lookup(&ctx, &id)?.view()))
}

#[derive(Deserialize)]
struct InputRequest {
    query: String,
}

async fn input(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(body): Json<InputRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    lookup(&ctx, &id)?.input(body.query);
    Ok(StatusCode::ACCEPTED)
}

async fn submit(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    lookup(&ctx, &id)?.submit();
    Ok(StatusCode::ACCEPTED)
}

async fn retry(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    lookup(&ctx, &id)?.retry();
    Ok(StatusCode::ACCEPTED)
}

async fn end_session(State(ctx): State<AppContext>, Path(id): Path<String>) -> impl IntoResponse {
    if ctx.sessions.end(&id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Stream of `view` events, one per published view, each carrying the view
/// itself and the rendered grid fragment. The current view is sent first.
///
/// Heartbeats keep the session from expiring while the stream is open. When
/// the session ends the stream sends a final `closed` event and finishes.
async fn events(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, (StatusCode, String)> {
    let coordinator = lookup(&ctx, &id)?;
    let renderer = ctx.renderer.clone();

    let views = WatchStream::new(coordinator.subscribe()).map(move |view| {
        let html = renderer.grid(&view).unwrap_or_else(|e| {
            tracing::error!("Failed to render results grid: {:#}", e);
            String::new()
        });
        let data = serde_json::to_string(&serde_json::json!({ "view": view, "html": html }))
            .unwrap_or_else(|e| format!(r#"{{"error": "serialization failed: {}"}}"#, e));

        Some(Ok::<_, Infallible>(Event::default().event("view").data(data)))
    });
    // The watch stream ends once the coordinator task has stopped.
    let views = views.chain(tokio_stream::once(None));

    let sessions = ctx.sessions.clone();
    let heartbeat = IntervalStream::new(tokio::time::interval(sessions.keepalive_interval()))
        .map(move |_| {
            sessions.touch(&id);
            Some(Ok(Event::default().event("heartbeat").data("{}")))
        });

    let stream = views
        .merge(heartbeat)
        .map_while(|frame| frame)
        .chain(tokio_stream::once(Ok(Event::default()
            .event("closed")
            .data("{}"))));

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    ))
}
