//! HTTP route tests.
//!
//! Drives the full [`create_router`] with `tower::ServiceExt::oneshot`
//! against a scripted [`FakeSource`].

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use cine_core::Error;
use cineanalytics::config::Config;
use cineanalytics::server::create_router;
use common::{detail, movie, test_context, test_context_with, FakeSource};
use http_body_util::BodyExt;
use tower::ServiceExt;

fn app(source: Arc<FakeSource>) -> Router {
    create_router(test_context(source))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    send(app, Method::GET, uri, None).await
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    json: Option<serde_json::Value>,
) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match json {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_200() {
    let app = app(Arc::new(FakeSource::new()));
    let (status, _) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn api_health_reports_source_and_sessions() {
    let app = app(Arc::new(FakeSource::new()));
    let (status, body) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["source"], "fake");
    assert_eq!(json["sessions"], 0);
}

// ---------------------------------------------------------------------------
// JSON API
// ---------------------------------------------------------------------------

#[tokio::test]
async fn trending_returns_movies_in_order() {
    let app = app(Arc::new(FakeSource::new()));
    let (status, body) = get(&app, "/api/trending").await;
    assert_eq!(status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json[0]["title"], "Dune: Part Two");
    assert_eq!(json[1]["title"], "Oppenheimer");
}

#[tokio::test]
async fn search_routes_to_search_endpoint() {
    let source = Arc::new(FakeSource::new().with_search(
        "batman",
        Duration::ZERO,
        Ok(vec![movie(268, "Batman")]),
    ));
    let app = app(source.clone());

    let (status, body) = get(&app, "/api/search?query=batman").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json[0]["id"], 268);
    assert_eq!(source.search_terms(), vec!["batman"]);
}

#[tokio::test]
async fn blank_search_falls_back_to_trending() {
    let source = Arc::new(FakeSource::new());
    let app = app(source.clone());

    for uri in ["/api/search", "/api/search?query=", "/api/search?query=%20%20"] {
        let (status, _) = get(&app, uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
    }
    assert!(source.search_terms().is_empty());
    assert_eq!(source.trending_calls(), 3);
}

#[tokio::test]
async fn upstream_failure_maps_to_json_error() {
    let source = Arc::new(FakeSource::new().with_search(
        "boom",
        Duration::ZERO,
        Err(Error::Network("connection refused".into())),
    ));
    let app = app(source);

    let (status, body) = get(&app, "/api/search?query=boom").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["code"], "network_error");
    assert_eq!(json["retryable"], true);
}

#[tokio::test]
async fn movie_detail_json() {
    let source = Arc::new(FakeSource::new().with_detail(603, Ok(detail(603, "The Matrix"))));
    let app = app(source);

    let (status, body) = get(&app, "/api/movies/603").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["title"], "The Matrix");
    assert_eq!(json["runtime"], 136);
}

#[tokio::test]
async fn unknown_movie_is_404_json() {
    let app = app(Arc::new(FakeSource::new()));
    let (status, body) = get(&app, "/api/movies/999999999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["code"], "not_found");
}

#[tokio::test]
async fn non_numeric_movie_id_is_400() {
    let app = app(Arc::new(FakeSource::new()));
    let (status, body) = get(&app, "/api/movies/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("invalid_request"));
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

#[tokio::test]
async fn home_page_shows_trending() {
    let app = app(Arc::new(FakeSource::new()));
    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Trending This Week"));
    assert!(body.contains("Dune: Part Two"));
    assert!(body.contains("href=\"/movie/1\""));
}

#[tokio::test]
async fn home_page_with_query_shows_results() {
    let source = Arc::new(FakeSource::new().with_search(
        "batman",
        Duration::ZERO,
        Ok(vec![movie(268, "Batman")]),
    ));
    let app = app(source);

    let (status, body) = get(&app, "/?q=batman").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Results for &quot;batman&quot;"));
    assert!(body.contains("Batman"));
    assert!(body.contains("value=\"batman\""));
}

#[tokio::test]
async fn home_page_failure_shows_retry_not_empty_state() {
    let source = Arc::new(FakeSource::new().with_search(
        "boom",
        Duration::ZERO,
        Err(Error::FetchFailed { status: 503 }),
    ));
    let app = app(source);

    let (status, body) = get(&app, "/?q=boom").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("data-retry"));
    assert!(!body.contains("No movies found."));
}

#[tokio::test]
async fn home_page_empty_results() {
    let source = Arc::new(FakeSource::new().with_search("qwxz", Duration::ZERO, Ok(Vec::new())));
    let app = app(source);

    let (_, body) = get(&app, "/?q=qwxz").await;
    assert!(body.contains("No movies found."));
}

#[tokio::test]
async fn detail_page_renders_movie() {
    let source = Arc::new(FakeSource::new().with_detail(603, Ok(detail(603, "The Matrix"))));
    let app = app(source);

    let (status, body) = get(&app, "/movie/603").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("The Matrix"));
    assert!(body.contains("Welcome to the Real World."));
    assert!(body.contains("2h 16m"));
    assert!(body.contains("$463,517,383"));
}

#[tokio::test]
async fn unknown_movie_page_is_not_found() {
    let app = app(Arc::new(FakeSource::new()));

    let (status, body) = get(&app, "/movie/999999999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Movie Not Found"));
    assert!(body.contains("999999999"));
    assert!(body.contains("Go Home"));
}

#[tokio::test]
async fn malformed_movie_id_is_not_found_without_fetching() {
    let source = Arc::new(FakeSource::new());
    let app = app(source.clone());

    for uri in ["/movie/abc", "/movie/0"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert!(body.contains("Movie Not Found"));
    }
    assert!(source.calls().is_empty());
}

#[tokio::test]
async fn detail_upstream_failure_is_502_with_retry() {
    let source = Arc::new(
        FakeSource::new().with_detail(550, Err(Error::FetchFailed { status: 500 })),
    );
    let app = app(source);

    let (status, body) = get(&app, "/movie/550").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("href=\"/movie/550\""));
}

// ---------------------------------------------------------------------------
// Live search sessions
// ---------------------------------------------------------------------------

async fn create_session(app: &Router) -> String {
    let (status, body) = send(app, Method::POST, "/api/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    json["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn session_lifecycle() {
    let source = Arc::new(FakeSource::new());
    let app = app(source.clone());
    let id = create_session(&app).await;

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/sessions/{id}/input"),
        Some(serde_json::json!({ "query": "heat" })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (status, _) = send(&app, Method::POST, &format!("/api/sessions/{id}/submit"), None).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    // Let the coordinator settle the submitted search.
    let mut settled = false;
    for _ in 0..50 {
        let (_, body) = get(&app, &format!("/api/sessions/{id}")).await;
        let view: serde_json::Value = serde_json::from_str(&body).unwrap();
        if view["status"] == "ready" {
            assert_eq!(view["heading"], "Results for \"heat\"");
            settled = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(settled, "search never settled");
    assert_eq!(source.search_terms(), vec!["heat"]);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::POST, &format!("/api/sessions/{id}/retry"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_session_is_404() {
    let app = app(Arc::new(FakeSource::new()));

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/sessions/nope/input",
        Some(serde_json::json!({ "query": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, "/api/sessions/nope/events").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/api/sessions/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn session_close_beacon_ends_session() {
    let app = app(Arc::new(FakeSource::new()));
    let id = create_session(&app).await;

    let (status, _) = send(&app, Method::POST, &format!("/api/sessions/{id}/close"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = get(&app, "/api/sessions").await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn session_events_stream_views() {
    let app = app(Arc::new(FakeSource::new()));
    let id = create_session(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/sessions/{id}/events"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );

    let mut body = response.into_body();
    let mut seen = String::new();
    for _ in 0..5 {
        let frame = tokio::time::timeout(Duration::from_secs(5), body.frame())
            .await
            .expect("no event within 5s")
            .expect("stream ended")
            .unwrap();
        if let Ok(data) = frame.into_data() {
            seen.push_str(&String::from_utf8_lossy(&data));
        }
        if seen.contains("event: view") {
            break;
        }
    }

    assert!(seen.contains("event: view"));
    assert!(seen.contains("\"html\""));
    assert!(seen.contains("\"view\""));
}

#[tokio::test]
async fn session_created_with_query_searches_it_first() {
    let source = Arc::new(FakeSource::new().with_search(
        "batman",
        Duration::ZERO,
        Ok(vec![movie(268, "Batman")]),
    ));
    let app = app(source.clone());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/sessions",
        Some(serde_json::json!({ "query": "batman" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    let id = json["id"].as_str().unwrap().to_string();

    let mut settled = None;
    for _ in 0..50 {
        let (_, body) = get(&app, &format!("/api/sessions/{id}")).await;
        let view: serde_json::Value = serde_json::from_str(&body).unwrap();
        // Until the search lands the view is pending, never an empty result.
        assert!(view["loading"] == true || !view["results"].as_array().unwrap().is_empty());
        if view["status"] == "ready" {
            settled = Some(view);
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let view = settled.expect("search never settled");
    assert_eq!(view["query"], "batman");
    assert_eq!(view["results"][0]["title"], "Batman");
    assert_eq!(source.search_terms(), vec!["batman"]);
    assert_eq!(source.trending_calls(), 0);
}

#[tokio::test]
async fn session_limit_refuses_new_sessions() {
    let mut config = Config::default();
    config.search.max_sessions = 1;
    let app = create_router(test_context_with(config, Arc::new(FakeSource::new())));

    let id = create_session(&app).await;
    let (status, _) = send(&app, Method::POST, "/api/sessions", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    create_session(&app).await;
}

async fn open_events(app: &Router, id: &str) -> Body {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/sessions/{id}/events"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response.into_body()
}

#[tokio::test(start_paused = true)]
async fn open_event_stream_keeps_session_alive() {
    let mut config = Config::default();
    config.search.session_idle_secs = 60;
    let ctx = test_context_with(config, Arc::new(FakeSource::new()));
    let app = create_router(ctx.clone());

    let watched = create_session(&app).await;
    let idle = create_session(&app).await;
    let mut body = open_events(&app, &watched).await;

    // Heartbeats go out every 30s of virtual time; read past two idle windows.
    let mut heartbeats = 0;
    while heartbeats < 5 {
        let frame = body.frame().await.expect("stream ended").unwrap();
        if let Ok(data) = frame.into_data() {
            heartbeats += String::from_utf8_lossy(&data)
                .matches("event: heartbeat")
                .count();
        }
    }

    assert_eq!(ctx.sessions.cleanup_expired(), 1);
    assert!(ctx.sessions.get(&watched).is_some());
    assert!(ctx.sessions.get(&idle).is_none());
}

#[tokio::test]
async fn ending_a_session_closes_its_event_stream() {
    let app = app(Arc::new(FakeSource::new()));
    let id = create_session(&app).await;
    let mut body = open_events(&app, &id).await;

    let mut seen = String::new();
    while !seen.contains("event: view") {
        let frame = tokio::time::timeout(Duration::from_secs(5), body.frame())
            .await
            .expect("no event within 5s")
            .expect("stream ended")
            .unwrap();
        if let Ok(data) = frame.into_data() {
            seen.push_str(&String::from_utf8_lossy(&data));
        }
    }

    let (status, _) = send(&app, Method::DELETE, &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The stream says goodbye and then finishes instead of heartbeating forever.
    loop {
        let next = tokio::time::timeout(Duration::from_secs(5), body.frame())
            .await
            .expect("stream stayed open after the session ended");
        match next {
            Some(frame) => {
                if let Ok(data) = frame.unwrap().into_data() {
                    seen.push_str(&String::from_utf8_lossy(&data));
                }
            }
            None => break,
        }
    }
    assert!(seen.contains("event: closed"));
}
