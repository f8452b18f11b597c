//! Server-rendered HTML pages.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use cine_core::{Error, ListQuery};
use serde::Deserialize;

use super::error::render_failure;
use crate::coordinator::{fetch_with_timeout, SearchState};
use crate::server::AppContext;

pub fn page_routes() -> Router<AppContext> {
    Router::new()
        .route("/", get(home))
        .route("/movie/:id", get(movie))
}

#[derive(Deserialize)]
struct HomeQuery {
    q: Option<String>,
}

/// Home page. `?q=` pre-fills the search box and renders its results, so the
/// page works without scripts and retry links are plain navigation.
async fn home(State(ctx): State<AppContext>, Query(params): Query<HomeQuery>) -> Response {
    let text = params.q.unwrap_or_default();
    let query = ListQuery::from_input(&text);
    let window = ctx.config.search.settings().request_timeout;

    let outcome = fetch_with_timeout(ctx.source.as_ref(), &query, window).await;
    if let Err(ref e) = outcome {
        tracing::warn!(query = %query, error = %e, "home page fetch failed");
    }

    let view = SearchState::settled(&text, outcome).view();
    match ctx.renderer.home(&view) {
        Ok(html) => Html(html).into_response(),
        Err(e) => render_failure(e),
    }
}

/// Movie detail page. Unknown or malformed ids get the not-found page;
/// other upstream failures get an error page with a retry link.
async fn movie(State(ctx): State<AppContext>, Path(raw_id): Path<String>) -> Response {
    let id = match raw_id.parse::<u64>() {
        Ok(id) if id > 0 => id,
        _ => return not_found(&ctx, &raw_id),
    };

    match ctx.source.detail(id).await {
        Ok(movie) => match ctx.renderer.detail(&movie) {
            Ok(html) => Html(html).into_response(),
            Err(e) => render_failure(e),
        },
        Err(Error::NotFound { .. }) | Err(Error::InvalidRequest(_)) => not_found(&ctx, &raw_id),
        Err(e) => {
            tracing::warn!(movie_id = id, error = %e, "detail fetch failed");
            match ctx.renderer.detail_error(&e, id) {
                Ok(html) => (StatusCode::BAD_GATEWAY, Html(html)).into_response(),
                Err(e) => render_failure(e),
            }
        }
    }
}

fn not_found(ctx: &AppContext, raw_id: &str) -> Response {
    match ctx.renderer.not_found(raw_id) {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => render_failure(e),
    }
}
