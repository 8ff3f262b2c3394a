use std::{fmt, str::FromStr};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

macro_rules! str_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(format!(
                        "unknown {} '{other}', expected one of: {}",
                        stringify!($name),
                        [$($text),+].join(", ")
                    )),
                }
            }
        }
    };
}

/// Which flavour of the map is deployed.
///
/// `Enhanced` differs from `Baseline` in its tier palette, its base layers and
/// the extra tectonic plate overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Baseline,
    #[default]
    Enhanced,
}

str_enum!(Variant {
    Baseline => "baseline",
    Enhanced => "enhanced",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Earthquakes,
    TectonicPlates,
}

str_enum!(Dataset {
    Earthquakes => "earthquakes",
    TectonicPlates => "tectonic_plates",
});

/// What to do with feed records that cannot become an [`EventRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    #[default]
    Skip,
    DefaultMagnitude,
    Fail,
}

str_enum!(MalformedPolicy {
    Skip => "skip",
    DefaultMagnitude => "default_magnitude",
    Fail => "fail",
});

/// How the boundary overlay relates to the first paint of the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryLoading {
    /// Both feeds are awaited before the document is composed.
    #[default]
    Joined,
    /// The page fetches boundaries itself after first paint.
    Deferred,
}

str_enum!(BoundaryLoading {
    Joined => "joined",
    Deferred => "deferred",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayZone {
    #[default]
    Local,
    Utc,
}

str_enum!(DisplayZone {
    Local => "local",
    Utc => "utc",
});

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// One earthquake as received from the feed, after validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub magnitude: f64,
    pub longitude: f64,
    pub latitude: f64,
    pub place: String,
    pub timestamp_millis: i64,
}

impl EventRecord {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }

    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp_millis).single()
    }
}

/// A band of the magnitude scale, `[lower_bound, next.lower_bound)`.
///
/// The first tier has no lower bound and the last tier has no upper bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualTier {
    pub index: usize,
    pub lower_bound: Option<f64>,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerDescriptor {
    pub position: LatLng,
    pub radius: f64,
    pub fill_color: String,
    pub popup_html: String,
    pub tier: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub color: String,
    pub label: String,
}
