//! Magnitude tiers: the single table behind marker colors and the legend.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use shared::{
    domain::{Variant, VisualTier},
    error::MapError,
};

/// Meters of circle radius per unit of magnitude.
pub const SCALE_FACTOR: f64 = 50_000.0;

const BASELINE_BOUNDS: [f64; 5] = [3.9, 4.9, 5.9, 6.9, 7.9];
const BASELINE_COLORS: [&str; 6] = ["lime", "green", "orange", "darkorange", "red", "darkred"];
const ENHANCED_COLORS: [&str; 6] = ["lime", "yellow", "orange", "darkorange", "red", "darkred"];

/// One row of a tier file. The first row must omit `lower_bound`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierRow {
    #[serde(default)]
    pub lower_bound: Option<f64>,
    pub color: String,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierFile {
    #[serde(default = "default_radius_scale")]
    pub radius_scale: f64,
    pub tiers: Vec<TierRow>,
}

fn default_radius_scale() -> f64 {
    SCALE_FACTOR
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierTable {
    tiers: Vec<VisualTier>,
    radius_scale: f64,
}

impl TierTable {
    /// Builds a table, rejecting anything that would make classification
    /// ambiguous: an empty table, a bounded first tier, an unbounded later
    /// tier, or bounds that are not finite and strictly increasing.
    pub fn new(rows: Vec<TierRow>, radius_scale: f64) -> Result<Self, MapError> {
        if rows.is_empty() {
            return Err(MapError::ConfigurationInvalid(
                "tier table must contain at least one tier".into(),
            ));
        }
        if !radius_scale.is_finite() || radius_scale <= 0.0 {
            return Err(MapError::ConfigurationInvalid(format!(
                "radius scale must be a positive number, got {radius_scale}"
            )));
        }

        let mut previous: Option<f64> = None;
        let mut tiers = Vec::with_capacity(rows.len());
        for (index, row) in rows.into_iter().enumerate() {
            match (index, row.lower_bound) {
                (0, Some(bound)) => {
                    return Err(MapError::ConfigurationInvalid(format!(
                        "first tier must be unbounded below, got lower_bound = {bound}"
                    )));
                }
                (0, None) => {}
                (_, None) => {
                    return Err(MapError::ConfigurationInvalid(format!(
                        "tier {index} is missing its lower_bound"
                    )));
                }
                (_, Some(bound)) => {
                    if !bound.is_finite() {
                        return Err(MapError::ConfigurationInvalid(format!(
                            "tier {index} has a non-finite lower_bound"
                        )));
                    }
                    if previous.is_some_and(|prev| bound <= prev) {
                        return Err(MapError::ConfigurationInvalid(format!(
                            "tier {index} lower_bound {bound} does not increase"
                        )));
                    }
                    previous = Some(bound);
                }
            }
            if row.color.trim().is_empty() {
                return Err(MapError::ConfigurationInvalid(format!(
                    "tier {index} has an empty color"
                )));
            }
            tiers.push(VisualTier {
                index,
                lower_bound: row.lower_bound,
                color: row.color,
                label: row.label,
            });
        }

        Ok(Self {
            tiers,
            radius_scale,
        })
    }

    pub fn for_variant(variant: Variant) -> Self {
        let colors = match variant {
            Variant::Baseline => BASELINE_COLORS,
            Variant::Enhanced => ENHANCED_COLORS,
        };
        let tiers = colors
            .iter()
            .enumerate()
            .map(|(index, color)| VisualTier {
                index,
                lower_bound: index
                    .checked_sub(1)
                    .and_then(|bound| BASELINE_BOUNDS.get(bound).copied()),
                color: (*color).to_string(),
                label: None,
            })
            .collect();
        Self {
            tiers,
            radius_scale: SCALE_FACTOR,
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, MapError> {
        let file: TierFile = toml::from_str(raw)
            .map_err(|err| MapError::ConfigurationInvalid(format!("tier file: {err}")))?;
        Self::new(file.tiers, file.radius_scale)
    }

    pub fn load(path: &Path) -> Result<Self, MapError> {
        let raw = fs::read_to_string(path).map_err(|err| {
            MapError::ConfigurationInvalid(format!(
                "failed to read tier file '{}': {err}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Returns the tier whose half-open interval holds `magnitude`.
    ///
    /// A magnitude equal to a bound lands in the upper tier. `NaN` never
    /// passes a bound and lands in the first tier.
    pub fn classify(&self, magnitude: f64) -> &VisualTier {
        let passed = self
            .tiers
            .iter()
            .skip(1)
            .take_while(|tier| tier.lower_bound.is_some_and(|bound| magnitude >= bound))
            .count();
        &self.tiers[passed]
    }

    /// Circle radius in meters. Negative magnitudes collapse to zero.
    pub fn radius_for(&self, magnitude: f64) -> f64 {
        magnitude.max(0.0) * self.radius_scale
    }

    pub fn radius_scale(&self) -> f64 {
        self.radius_scale
    }

    pub fn tiers(&self) -> &[VisualTier] {
        &self.tiers
    }

    /// Upper bound of the tier at `index`, i.e. the next tier's lower bound.
    pub fn upper_bound(&self, index: usize) -> Option<f64> {
        self.tiers
            .get(index + 1)
            .and_then(|tier| tier.lower_bound)
    }
}

#[cfg(test)]
#[path = "tests/tiers_tests.rs"]
mod tests;
