use super::*;
use pipeline::profile::{BOUNDARIES_ROUTE, DEFAULT_BOUNDARY_FEED};
use serde_json::json;
use shared::protocol::{MapDocument, OverlayContent};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("quakemap").chain(args.iter().copied())).expect("parse")
}

#[test]
fn global_options_work_after_the_subcommand() {
    let cli = parse(&["legend", "--variant", "baseline"]);
    assert_eq!(cli.global.variant, Variant::Baseline);
    assert!(matches!(cli.command, Command::Legend));
}

#[test]
fn render_defaults_to_html_and_joined_loading() {
    let cli = parse(&["render"]);
    assert_eq!(cli.global.variant, Variant::Enhanced);
    let Command::Render {
        format,
        output,
        malformed_policy,
        boundary_loading,
        ..
    } = cli.command
    else {
        panic!("expected render");
    };
    assert_eq!(format, OutputFormat::Html);
    assert!(output.is_none());
    assert_eq!(malformed_policy, MalformedPolicy::Skip);
    assert_eq!(boundary_loading, BoundaryLoading::Joined);
}

#[test]
fn classify_accepts_negative_magnitudes() {
    let cli = parse(&["classify", "-1.5"]);
    let Command::Classify { magnitude } = cli.command else {
        panic!("expected classify");
    };
    assert_eq!(magnitude, -1.5);
    let tiers = tier_table(&cli.global).expect("tiers");
    assert_eq!(describe_tier(&tiers, magnitude), "T0 lime radius=0m");
}

#[test]
fn classify_reports_tier_and_radius() {
    let tiers = TierTable::for_variant(Variant::Baseline);
    assert_eq!(describe_tier(&tiers, 6.5), "T3 darkorange radius=325000m");
    assert_eq!(describe_tier(&tiers, 9.5), "T5 darkred radius=475000m");
}

#[test]
fn unknown_variant_is_a_usage_error() {
    let args = ["quakemap", "legend", "--variant", "deluxe"];
    assert!(Cli::try_parse_from(args).is_err());
}

#[test]
fn explicit_access_token_is_used_first() {
    let cli = parse(&["render", "--access-token", "pk.cli"]);
    let token = access_token(&cli.global).expect("token");
    assert_eq!(token.expose(), "pk.cli");
}

#[test]
fn tier_file_overrides_builtin_table() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tiers.toml");
    fs::write(
        &path,
        "[[tiers]]\ncolor = \"gray\"\n\n[[tiers]]\nlower_bound = 2.0\ncolor = \"black\"\n",
    )
    .expect("write");

    let cli = parse(&["classify", "2.0", "--tiers", path.to_str().expect("utf8 path")]);
    let tiers = tier_table(&cli.global).expect("tiers");
    assert_eq!(tiers.classify(2.0).color, "black");
    assert_eq!(tiers.classify(1.9).color, "gray");
}

#[tokio::test]
async fn render_from_local_file_produces_json_document() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("quakes.geojson");
    let feed = json!({
        "type": "FeatureCollection",
        "features": [{
            "properties": { "mag": 6.5, "place": "Test City", "time": 0 },
            "geometry": { "coordinates": [-122.4, 37.8, 5.0] }
        }]
    });
    fs::write(&path, feed.to_string()).expect("write");

    let profile = MapProfile::for_variant(Variant::Baseline);
    let source = local_source(&path, &profile).expect("source");
    let token = TileAccessToken::new("pk.cli").expect("token");
    let service = QuakeMapService::new(Arc::new(source), profile, token);

    let rendered = render(&service, OutputFormat::Json).await.expect("render");
    let doc: MapDocument = serde_json::from_str(&rendered).expect("json");
    assert!(doc.notices.is_empty());
    assert_eq!(doc.overlays.len(), 1);
    assert_eq!(doc.overlays[0].content.primitive_count(), 1);

    let page = render(&service, OutputFormat::Html).await.expect("render");
    assert!(page.contains("Test City"));
}

#[tokio::test]
async fn deferred_render_fetches_boundaries_from_upstream() {
    let cli = parse(&["render", "--boundary-loading", "deferred", "--access-token", "pk.cli"]);
    let Command::Render {
        earthquake_url,
        malformed_policy,
        boundary_loading,
        ..
    } = cli.command
    else {
        panic!("expected render");
    };
    let mut profile =
        render_profile(&cli.global, earthquake_url, malformed_policy, boundary_loading)
            .expect("profile");
    profile.earthquake_feed_url = "memory://quakes".to_string();

    let source = StaticFeedSource::new().with_document("memory://quakes", json!({ "features": [] }));
    let token = access_token(&cli.global).expect("token");
    let doc = QuakeMapService::new(Arc::new(source), profile, token)
        .compose()
        .await;

    let OverlayContent::RemoteShapes { source, .. } = &doc.overlays[1].content else {
        panic!("expected remote shapes, got {:?}", doc.overlays[1].content);
    };
    assert_eq!(source, DEFAULT_BOUNDARY_FEED);
    assert_ne!(source, BOUNDARIES_ROUTE);
    assert!(doc.notices.is_empty());
}
