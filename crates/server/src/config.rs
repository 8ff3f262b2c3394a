use std::{env, path::PathBuf};

use anyhow::Context;
use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File, FileFormat};
use pipeline::{
    profile::{DEFAULT_BOUNDARY_FEED, DEFAULT_EARTHQUAKE_FEED},
    MapProfile, PopupOptions, TierTable, TileAccessToken,
};
use serde::Deserialize;
use shared::{
    domain::{BoundaryLoading, DisplayZone, MalformedPolicy, Variant},
    error::MapError,
};

const SETTINGS_FILE: &str = "quakemap";
const ENV_PREFIX: &str = "APP";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server_bind: String,
    pub variant: Variant,
    pub earthquake_feed_url: String,
    pub boundary_feed_url: String,
    pub boundary_loading: BoundaryLoading,
    pub malformed_policy: MalformedPolicy,
    pub display_zone: DisplayZone,
    pub tier_table_path: Option<PathBuf>,
    pub tile_access_token: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8080".into(),
            variant: Variant::default(),
            earthquake_feed_url: DEFAULT_EARTHQUAKE_FEED.into(),
            boundary_feed_url: DEFAULT_BOUNDARY_FEED.into(),
            boundary_loading: BoundaryLoading::default(),
            malformed_policy: MalformedPolicy::default(),
            display_zone: DisplayZone::default(),
            tier_table_path: None,
            tile_access_token: None,
        }
    }
}

/// Struct defaults, then `quakemap.toml` if present, then `APP__*` variables.
pub fn load_settings() -> anyhow::Result<Settings> {
    let builder = Config::builder()
        .add_source(File::with_name(SETTINGS_FILE).required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));
    build_settings(builder)
}

#[cfg(test)]
pub(crate) fn settings_from_toml(raw: &str) -> anyhow::Result<Settings> {
    build_settings(Config::builder().add_source(File::from_str(raw, FileFormat::Toml)))
}

fn build_settings(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Settings> {
    builder
        .build()
        .context("failed to read settings")?
        .try_deserialize()
        .context("failed to parse settings")
}

impl Settings {
    pub fn profile(&self) -> Result<MapProfile, MapError> {
        let mut profile = MapProfile::for_variant(self.variant)
            .with_boundary_url(self.boundary_feed_url.clone())
            .with_boundary_loading(self.boundary_loading);
        profile.earthquake_feed_url = self.earthquake_feed_url.clone();
        profile.malformed_policy = self.malformed_policy;
        profile.popup = PopupOptions {
            zone: self.display_zone,
        };
        if let Some(path) = &self.tier_table_path {
            profile = profile.with_tiers(TierTable::load(path)?);
        }
        Ok(profile)
    }

    /// `tile_access_token` from file or `APP__TILE_ACCESS_TOKEN`, else `API_KEY`.
    pub fn access_token(&self) -> Result<TileAccessToken, MapError> {
        self.access_token_or(env::var("API_KEY").ok())
    }

    pub(crate) fn access_token_or(
        &self,
        fallback: Option<String>,
    ) -> Result<TileAccessToken, MapError> {
        TileAccessToken::first_of([self.tile_access_token.clone(), fallback])
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
