//! Feed decoding and the record-to-marker mapping.

use chrono::{Local, TimeZone, Utc};
use serde_json::Value;
use shared::{
    domain::{DisplayZone, EventRecord, MalformedPolicy, MarkerDescriptor},
    error::MapError,
    protocol::FeedFeature,
};
use tracing::warn;

use crate::tiers::TierTable;

pub const UNKNOWN_PLACE: &str = "Unknown location";

const EVENT_TIME_FORMAT: &str = "%a %b %d %Y %H:%M:%S GMT%z";

#[derive(Debug, Clone, Copy, Default)]
pub struct PopupOptions {
    pub zone: DisplayZone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct DecodedFeed {
    pub records: Vec<EventRecord>,
    pub skipped: Vec<SkippedRecord>,
}

/// Turns a feed document into validated records.
///
/// A document without a `features` array is rejected outright. Individual
/// defects are handled according to `policy`.
pub fn decode_feed(document: &Value, policy: MalformedPolicy) -> Result<DecodedFeed, MapError> {
    let features = document
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| MapError::MalformedRecord {
            index: 0,
            reason: "feed document has no 'features' array".into(),
        })?;

    let mut decoded = DecodedFeed {
        records: Vec::with_capacity(features.len()),
        skipped: Vec::new(),
    };
    for (index, raw) in features.iter().enumerate() {
        match decode_feature(raw, policy) {
            Ok(record) => decoded.records.push(record),
            Err(reason) if policy == MalformedPolicy::Fail => {
                return Err(MapError::MalformedRecord { index, reason });
            }
            Err(reason) => {
                warn!(index, %reason, "skipping malformed feed record");
                decoded.skipped.push(SkippedRecord { index, reason });
            }
        }
    }
    Ok(decoded)
}

fn decode_feature(raw: &Value, policy: MalformedPolicy) -> Result<EventRecord, String> {
    let feature: FeedFeature =
        serde_json::from_value(raw.clone()).map_err(|err| format!("unreadable feature: {err}"))?;

    let coordinates = feature
        .geometry
        .map(|geometry| geometry.coordinates)
        .ok_or("missing geometry")?;
    let (longitude, latitude) = match coordinates.as_slice() {
        [Some(lng), Some(lat), ..] => (*lng, *lat),
        [_, _, ..] => return Err("longitude or latitude is null".into()),
        _ => return Err(format!("expected [lng, lat], got {} values", coordinates.len())),
    };
    if !longitude.is_finite() || !latitude.is_finite() {
        return Err("coordinates are not finite".into());
    }
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(format!("latitude {latitude} out of range"));
    }

    let magnitude = match (feature.properties.mag, policy) {
        (Some(mag), _) if mag.is_finite() => mag,
        (Some(mag), _) => return Err(format!("magnitude {mag} is not finite")),
        (None, MalformedPolicy::DefaultMagnitude) => 0.0,
        (None, _) => return Err("missing magnitude".into()),
    };

    let timestamp_millis = feature.properties.time.ok_or("missing time")?;
    if Utc.timestamp_millis_opt(timestamp_millis).single().is_none() {
        return Err(format!("time {timestamp_millis} out of range"));
    }

    let place = feature
        .properties
        .place
        .filter(|place| !place.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_PLACE.to_string());

    Ok(EventRecord {
        magnitude,
        longitude,
        latitude,
        place,
        timestamp_millis,
    })
}

/// Maps every record to exactly one marker, in order.
pub fn map_features(
    records: &[EventRecord],
    tiers: &TierTable,
    options: &PopupOptions,
) -> Vec<MarkerDescriptor> {
    records
        .iter()
        .map(|record| map_feature(record, tiers, options))
        .collect()
}

pub fn map_feature(
    record: &EventRecord,
    tiers: &TierTable,
    options: &PopupOptions,
) -> MarkerDescriptor {
    let tier = tiers.classify(record.magnitude);
    MarkerDescriptor {
        position: record.position(),
        radius: tiers.radius_for(record.magnitude),
        fill_color: tier.color.clone(),
        popup_html: popup_html(record, options.zone),
        tier: tier.index,
    }
}

pub fn popup_html(record: &EventRecord, zone: DisplayZone) -> String {
    format!(
        "<h3> Location: {}</h3><hr><h2> Size: {}</h2><hr><p>{}</p>",
        escape_html(&record.place),
        record.magnitude,
        format_event_time(record.timestamp_millis, zone)
    )
}

/// Renders epoch millis the way a browser prints a `Date`.
pub fn format_event_time(timestamp_millis: i64, zone: DisplayZone) -> String {
    let formatted = match zone {
        DisplayZone::Utc => Utc
            .timestamp_millis_opt(timestamp_millis)
            .single()
            .map(|time| time.format(EVENT_TIME_FORMAT).to_string()),
        DisplayZone::Local => Local
            .timestamp_millis_opt(timestamp_millis)
            .single()
            .map(|time| time.format(EVENT_TIME_FORMAT).to_string()),
    };
    formatted.unwrap_or_else(|| format!("unknown time ({timestamp_millis})"))
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
#[path = "tests/mapper_tests.rs"]
mod tests;
