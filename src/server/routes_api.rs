use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use cine_core::{Error, ListQuery, MovieDetail, MovieSummary};
use serde::Deserialize;

use super::error::AppError;
use crate::server::AppContext;

pub fn api_routes() -> Router<AppContext> {
    Router::new()
        .route("/health", get(health))
        .route("/trending", get(trending))
        .route("/search", get(search))
        .route("/movies/:id", get(movie_detail))
}

async fn health(State(ctx): State<AppContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "source": ctx.source.name(),
        "sessions": ctx.sessions.len(),
    }))
}

async fn trending(State(ctx): State<AppContext>) -> Result<Json<Vec<MovieSummary>>, AppError> {
    Ok(Json(ctx.source.trending().await?))
}

#[derive(Deserialize)]
struct SearchParams {
    query: Option<String>,
}

/// Title search. A blank query answers with the trending list, matching
/// what the home page shows for an empty search box.
async fn search(
    State(ctx): State<AppContext>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<MovieSummary>>, AppError> {
    let query = ListQuery::from_input(params.query.as_deref().unwrap_or(""));
    Ok(Json(ctx.source.fetch_list(&query).await?))
}

async fn movie_detail(
    State(ctx): State<AppContext>,
    Path(raw_id): Path<String>,
) -> Result<Json<MovieDetail>, AppError> {
    let id = raw_id
        .parse::<u64>()
        .map_err(|_| Error::InvalidRequest(format!("movie id must be numeric: {raw_id:?}")))?;
    Ok(Json(ctx.source.detail(id).await?))
}
