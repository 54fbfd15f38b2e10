//! Places proxy: forwards search, reverse lookup and directions to the
//! geocoding service so the access token never reaches the browser.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use foundation::LngLat;
use geocoding::{GeocodingConfig, GeocodingError, MapboxClient, SearchOptions};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
struct AppState {
    places: Arc<MapboxClient>,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    proximity: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let addr: SocketAddr = env::var("PLACES_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:9200".to_string())
        .parse()
        .map_err(|e| format!("invalid PLACES_ADDR: {e}"))?;
    let config = GeocodingConfig::from_env()?;
    info!(
        "forwarding to {} (country={}, language={}, limit={})",
        config.geocoding_url, config.country, config.language, config.search_limit
    );

    let state = AppState {
        places: Arc::new(MapboxClient::new(config)),
    };

    info!("places proxy listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}

fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::OPTIONS]);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/places/search/:query", get(search_places))
        .route("/places/reverse/:lng/:lat", get(reverse_lookup))
        .route("/directions/:coordinates", get(directions))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn search_places(
    State(state): State<AppState>,
    Path(query): Path<String>,
    Query(params): Query<SearchParams>,
) -> Response {
    let proximity = match params.proximity.as_deref().map(str::parse::<LngLat>) {
        None => None,
        Some(Ok(p)) => Some(p),
        Some(Err(err)) => return bad_request(err.to_string()),
    };
    let options = SearchOptions {
        proximity,
        ..SearchOptions::default()
    };

    match state.places.search_places(&query, &options).await {
        Ok(resp) => Json(resp).into_response(),
        Err(err) => upstream_error("search", err),
    }
}

async fn reverse_lookup(
    State(state): State<AppState>,
    Path((lng, lat)): Path<(f64, f64)>,
) -> Response {
    match state.places.reverse(LngLat::new(lng, lat)).await {
        Ok(resp) => Json(resp).into_response(),
        Err(err) => upstream_error("reverse lookup", err),
    }
}

async fn directions(
    State(state): State<AppState>,
    Path(coordinates): Path<String>,
) -> Response {
    let waypoints = match parse_waypoints(&coordinates) {
        Ok(w) => w,
        Err(msg) => return bad_request(msg),
    };

    match state.places.route(&waypoints).await {
        Ok(resp) => Json(resp).into_response(),
        Err(err) => upstream_error("directions", err),
    }
}

/// `lng,lat;lng,lat;...`
fn parse_waypoints(raw: &str) -> Result<Vec<LngLat>, String> {
    raw.split(';')
        .map(|pair| pair.parse::<LngLat>().map_err(|e| e.to_string()))
        .collect()
}

fn bad_request(message: String) -> Response {
    warn!("rejected request: {message}");
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

fn upstream_error(what: &str, err: GeocodingError) -> Response {
    if let GeocodingError::InvalidInput(msg) = err {
        return bad_request(msg);
    }
    error!("{what} failed: {err}");
    (StatusCode::BAD_GATEWAY, Json(json!({ "error": err.to_string() }))).into_response()
}
