use super::*;
use axum::{body, body::Body, http::Request};
use feed_client::StaticFeedSource;
use pipeline::{MapProfile, TileAccessToken};
use serde_json::json;
use shared::domain::{BoundaryLoading, Variant};
use tower::ServiceExt;

const QUAKES: &str = "memory://quakes";
const PLATES: &str = "memory://plates";

fn quake_feed() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [
            {
                "properties": { "mag": 5.2, "place": "Ridge <North>", "time": 1_700_000_000_000_i64 },
                "geometry": { "coordinates": [-30.0, 10.0, 12.0] }
            },
            {
                "properties": { "mag": 8.1, "place": "Trench", "time": 1_700_000_100_000_i64 },
                "geometry": { "coordinates": [142.0, 38.0] }
            }
        ]
    })
}

fn plate_feed() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": { "Name": "NA-PA" },
            "geometry": { "type": "LineString", "coordinates": [[-120.0, 35.0], [-118.0, 34.0]] }
        }]
    })
}

fn test_app(variant: Variant, loading: BoundaryLoading, with_plates: bool) -> Router {
    let mut source = StaticFeedSource::new().with_document(QUAKES, quake_feed());
    if with_plates {
        source = source.with_document(PLATES, plate_feed());
    }
    let mut profile = MapProfile::for_variant(variant)
        .with_boundary_url(PLATES)
        .with_boundary_loading(loading);
    profile.earthquake_feed_url = QUAKES.to_string();

    let token = TileAccessToken::new("pk.server-test").expect("token");
    let service = QuakeMapService::new(Arc::new(source), profile, token);
    build_router(Arc::new(AppState { service }))
}

async fn get_body(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::get(uri).body(Body::empty()).expect("request");
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, body.to_vec())
}

#[tokio::test]
async fn healthz_reports_ok() {
    let app = test_app(Variant::Baseline, BoundaryLoading::Joined, false);
    let (status, body) = get_body(app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn map_document_route_serves_enhanced_map() {
    let app = test_app(Variant::Enhanced, BoundaryLoading::Joined, true);
    let (status, body) = get_body(app, "/api/map").await;
    assert_eq!(status, StatusCode::OK);

    let doc: MapDocument = serde_json::from_slice(&body).expect("json");
    assert_eq!(doc.variant, Variant::Enhanced);
    assert_eq!(doc.active_base_layer, "Lightmap");
    assert_eq!(doc.overlays.len(), 2);
    assert_eq!(doc.overlays[0].content.primitive_count(), 2);
    assert_eq!(doc.overlays[1].content.primitive_count(), 1);
    assert!(doc.notices.is_empty());
}

#[tokio::test]
async fn map_page_embeds_escaped_document() {
    let app = test_app(Variant::Baseline, BoundaryLoading::Joined, false);
    let (status, body) = get_body(app, "/").await;
    assert_eq!(status, StatusCode::OK);

    let page = String::from_utf8(body).expect("utf8");
    assert!(page.starts_with("<!doctype html>"));
    assert!(page.contains("map-document"));
    assert!(!page.contains("Ridge <North>"));
    assert!(page.contains("Ridge &lt;North&gt;"));
}

#[tokio::test]
async fn legend_route_lists_one_entry_per_tier() {
    let app = test_app(Variant::Baseline, BoundaryLoading::Joined, false);
    let (status, body) = get_body(app, "/api/legend").await;
    assert_eq!(status, StatusCode::OK);

    let entries: Vec<LegendEntry> = serde_json::from_slice(&body).expect("json");
    assert_eq!(entries.len(), 6);
    assert_eq!(entries[0].color, "lime");
    assert_eq!(entries[0].label, "Under: 3.9");
    assert_eq!(entries[5].color, "darkred");
}

#[tokio::test]
async fn deferred_map_points_at_boundaries_route() {
    let app = test_app(Variant::Enhanced, BoundaryLoading::Deferred, true);

    let (status, body) = get_body(app.clone(), "/api/map").await;
    assert_eq!(status, StatusCode::OK);
    let doc: MapDocument = serde_json::from_slice(&body).expect("json");
    assert_eq!(doc.overlays[1].content.primitive_count(), 0);

    let (status, body) = get_body(app, BOUNDARIES_ROUTE).await;
    assert_eq!(status, StatusCode::OK);
    let plates: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(plates, plate_feed());
}

#[tokio::test]
async fn boundaries_route_is_not_found_for_baseline() {
    let app = test_app(Variant::Baseline, BoundaryLoading::Joined, false);
    let (status, body) = get_body(app, BOUNDARIES_ROUTE).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let err: ApiError = serde_json::from_slice(&body).expect("json");
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn boundaries_route_reports_upstream_failure() {
    let app = test_app(Variant::Enhanced, BoundaryLoading::Deferred, false);
    let (status, body) = get_body(app, BOUNDARIES_ROUTE).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let err: ApiError = serde_json::from_slice(&body).expect("json");
    assert_eq!(err.code, ErrorCode::Upstream);
    assert!(err.message.contains(PLATES));
}

#[tokio::test]
async fn missing_plates_in_joined_mode_becomes_notice() {
    let app = test_app(Variant::Enhanced, BoundaryLoading::Joined, false);
    let (status, body) = get_body(app, "/api/map").await;
    assert_eq!(status, StatusCode::OK);

    let doc: MapDocument = serde_json::from_slice(&body).expect("json");
    assert_eq!(doc.overlays[0].content.primitive_count(), 2);
    assert_eq!(doc.notices.len(), 1);
    assert!(doc.notices[0].starts_with("Tectonic plate data could not be loaded"));
}
