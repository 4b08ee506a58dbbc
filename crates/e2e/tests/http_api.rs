//! HttpBookingApi against an in-process axum server

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use cinebook_e2e::api::{BookingApi, HttpBookingApi};
use cinebook_e2e::config::ApiConfig;
use cinebook_e2e::{E2eError, ResourceIndexBuilder};

const TOKEN: &str = "secret-token";

async fn movies(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    if headers.get("x-api-token").and_then(|v| v.to_str().ok()) != Some(TOKEN) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(json!([
        {"id": 1, "title": "Dune"},
        {"id": "2", "title": "Encanto"}
    ])))
}

async fn showtimes(Path(movie_id): Path<String>) -> Result<Json<Value>, StatusCode> {
    match movie_id.as_str() {
        "1" => Ok(Json(json!([
            {
                "branch": {"id": "bhd-3-2", "name": "BHD Star - Vincom 3/2"},
                "showtimes": [
                    {"id": 40001, "dateTime": "2021-10-17T08:10:00"},
                    {"id": 40002, "dateTime": "2021-10-17T10:30:00"}
                ]
            }
        ]))),
        "2" => Ok(Json(json!([
            {
                "branch": {"id": "cgv-aeon", "name": "CGV - Aeon Tan Phu"},
                "showtimes": [{"id": 40001, "dateTime": "2021-10-17T08:10:00"}]
            }
        ]))),
        "500" => Err(StatusCode::INTERNAL_SERVER_ERROR),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn detail(Path(showtime_id): Path<String>) -> Result<Json<Value>, StatusCode> {
    if showtime_id != "40001" && showtime_id != "vip/40001#2" {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(json!({
        "movieTitle": "Dune",
        "cinemaName": "BHD Star - Vincom 3/2",
        "dateTime": "17/10/2021 ~ 08:10",
        "seats": [
            {"code": "A1", "reserved": true},
            {"code": "A2", "reserved": false}
        ]
    })))
}

async fn spawn_server() -> String {
    let app = Router::new()
        .route("/api/movies", get(movies))
        .route("/api/movies/:id/showtimes", get(showtimes))
        .route("/api/showtimes/:id", get(detail));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api", addr)
}

fn client(base_url: String, token: Option<&str>) -> HttpBookingApi {
    HttpBookingApi::new(&ApiConfig {
        base_url,
        token: token.map(String::from),
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn fetches_the_hierarchy() {
    let api = client(spawn_server().await, Some(TOKEN));

    let movies = api.fetch_movies().await.unwrap();
    assert_eq!(movies.len(), 2);
    assert_eq!(movies[0].id, "1");
    assert_eq!(movies[1].id, "2");

    let branches = api.fetch_showtimes_for_movie("1").await.unwrap();
    assert_eq!(branches[0].branch.name, "BHD Star - Vincom 3/2");
    assert_eq!(branches[0].showtimes[1].id, "40002");

    let detail = api.fetch_showtime_detail("40001").await.unwrap();
    assert_eq!(detail.available_seats(), 1);
}

#[tokio::test]
async fn ids_with_reserved_characters_reach_their_resource() {
    let api = client(spawn_server().await, Some(TOKEN));
    let detail = api.fetch_showtime_detail("vip/40001#2").await.unwrap();
    assert_eq!(detail.movie_title, "Dune");
}

#[tokio::test]
async fn index_over_http_deduplicates() {
    let api = std::sync::Arc::new(client(spawn_server().await, Some(TOKEN)));
    let ids = ResourceIndexBuilder::new(api).showtime_ids().await.unwrap();
    assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec!["40001", "40002"]);
}

#[tokio::test]
async fn missing_token_is_a_transport_error() {
    let api = client(spawn_server().await, None);
    let err = api.fetch_movies().await.unwrap_err();
    match err {
        E2eError::Transport(message) => assert!(message.contains("401")),
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn status_codes_map_to_errors() {
    let api = client(spawn_server().await, Some(TOKEN));

    let err = api.fetch_showtime_detail("99999").await.unwrap_err();
    assert!(err.is_not_found());

    let err = api.fetch_showtimes_for_movie("500").await.unwrap_err();
    assert!(matches!(err, E2eError::Transport(_)));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = client(format!("http://{}/api", addr), None);
    assert!(matches!(api.fetch_movies().await, Err(E2eError::Transport(_))));
}
