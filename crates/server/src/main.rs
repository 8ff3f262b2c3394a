use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::get,
    Json, Router,
};
use feed_client::{HttpFeedSource, QuakeMapService};
use pipeline::{profile::BOUNDARIES_ROUTE, render_page};
use serde_json::Value;
use shared::{
    domain::LegendEntry,
    error::{ApiError, ErrorCode, MapError},
    protocol::MapDocument,
};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;

use app_state::AppState;
use config::load_settings;

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings()?;
    let token = settings.access_token().map_err(|error| {
        error!(%error, "refusing to start without a tile provider access token");
        error
    })?;
    let profile = settings.profile()?;
    info!(
        variant = %profile.variant,
        feed = %profile.earthquake_feed_url,
        boundaries = profile.boundaries.is_some(),
        "map profile loaded"
    );

    let service = QuakeMapService::new(Arc::new(HttpFeedSource::new()), profile, token);
    let app = build_router(Arc::new(AppState { service }));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/", get(map_page))
        .route("/api/map", get(map_document))
        .route("/api/legend", get(legend))
        .route(BOUNDARIES_ROUTE, get(boundaries))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn map_page(State(state): State<Arc<AppState>>) -> ApiResult<Html<String>> {
    let document = state.service.compose().await;
    let page = render_page(&document).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::new(ErrorCode::Internal, e.to_string())),
        )
    })?;
    Ok(Html(page))
}

async fn map_document(State(state): State<Arc<AppState>>) -> Json<MapDocument> {
    Json(state.service.compose().await)
}

async fn legend(State(state): State<Arc<AppState>>) -> Json<Vec<LegendEntry>> {
    Json(state.service.composer().legend().entries.clone())
}

async fn boundaries(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    match state.service.load_boundaries().await {
        Ok(Some(document)) => Ok(Json(document)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiError::new(
                ErrorCode::NotFound,
                "this map has no boundary overlay",
            )),
        )),
        Err(err) => {
            error!(error = %err, "boundary fetch failed");
            Err(upstream(err))
        }
    }
}

fn upstream(err: MapError) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_GATEWAY, Json(ApiError::from(err)))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
