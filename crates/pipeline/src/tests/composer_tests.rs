use super::*;
use crate::layers::{build_overlay, circle_style, deferred_boundary_overlay};

fn token() -> TileAccessToken {
    TileAccessToken::new("pk.test-token").expect("token")
}

#[test]
fn empty_token_fails_closed() {
    let err = TileAccessToken::new("   ").expect_err("empty token");
    assert!(matches!(err, MapError::ConfigurationMissing(_)));

    let err = TileAccessToken::first_of([None, Some(String::new())]).expect_err("no token");
    assert!(err.to_string().contains("API_KEY"));
}

#[test]
fn first_non_empty_token_wins() {
    let token = TileAccessToken::first_of([None, Some(" ".into()), Some(" abc ".into())])
        .expect("token");
    assert_eq!(token.expose(), "abc");
}

#[test]
fn token_is_redacted_in_debug_output() {
    assert_eq!(format!("{:?}", token()), "TileAccessToken(***)");
}

#[test]
fn baseline_document_has_satellite_and_lightmap() {
    let tiers = TierTable::for_variant(Variant::Baseline);
    let composer = MapComposer::new(Variant::Baseline, &tiers, token());
    let doc = composer.compose(
        vec![build_overlay(Vec::new(), circle_style(Variant::Baseline))],
        Vec::new(),
    );

    let names: Vec<&str> = doc.base_layers.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["Satellite", "Lightmap"]);
    assert_eq!(doc.active_base_layer, "Satellite");
    assert_eq!(doc.base_layers[0].options["tileSize"], 512);
    assert_eq!(doc.base_layers[0].options["zoomOffset"], -1);
    assert_eq!(doc.base_layers[0].options["accessToken"], "pk.test-token");
    assert_eq!(doc.overlays.len(), 1);
    assert!(!doc.layer_control.collapsed);
    assert_eq!(doc.viewport.center, DEFAULT_CENTER);
    assert_eq!(doc.viewport.zoom, 2);
    assert_eq!(doc.legend.entries[1].color, "green");
}

#[test]
fn enhanced_document_keeps_overlay_order_and_notices() {
    let tiers = TierTable::for_variant(Variant::Enhanced);
    let composer = MapComposer::new(Variant::Enhanced, &tiers, token());
    let doc = composer.compose(
        vec![
            build_overlay(Vec::new(), circle_style(Variant::Enhanced)),
            deferred_boundary_overlay("/api/boundaries"),
        ],
        vec!["earthquake feed unavailable".into()],
    );

    let names: Vec<&str> = doc.base_layers.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["Nasa", "Terrain", "Lightmap"]);
    assert_eq!(doc.active_base_layer, "Lightmap");
    assert!(doc.base_layers.iter().any(|b| b.name == doc.active_base_layer));
    assert_eq!(doc.base_layers[0].options["maxZoom"], 8);
    assert!(doc.base_layers[1].options.is_empty());

    let overlays: Vec<&str> = doc.overlays.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(overlays, vec!["Earthquakes", "Tectonic Plates"]);
    assert!(doc.overlay("Tectonic Plates").is_some());
    assert_eq!(doc.notices, vec!["earthquake feed unavailable".to_string()]);
}

#[test]
fn legend_follows_custom_tier_table() {
    let tiers = TierTable::from_toml_str(
        "[[tiers]]\ncolor = \"blue\"\n[[tiers]]\nlower_bound = 6.0\ncolor = \"black\"\n",
    )
    .expect("tiers");
    let composer = MapComposer::new(Variant::Enhanced, &tiers, token());
    let labels: Vec<&str> = composer
        .legend()
        .entries
        .iter()
        .map(|e| e.label.as_str())
        .collect();
    assert_eq!(labels, vec!["Under: 6", "Over: 6+"]);
}
