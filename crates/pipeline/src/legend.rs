use shared::{
    domain::{LegendEntry, VisualTier},
    protocol::LegendPanel,
};

use crate::tiers::TierTable;

pub const LEGEND_TITLE: &str = "Registered Points on Richter Scale";
pub const LEGEND_POSITION: &str = "topright";

/// One entry per tier, in tier order, colored exactly like the markers.
pub fn build_legend(tiers: &TierTable) -> Vec<LegendEntry> {
    tiers
        .tiers()
        .iter()
        .map(|tier| LegendEntry {
            color: tier.color.clone(),
            label: tier_label(tier, tiers.upper_bound(tier.index)),
        })
        .collect()
}

pub fn legend_panel(tiers: &TierTable) -> LegendPanel {
    LegendPanel {
        title: LEGEND_TITLE.to_string(),
        position: LEGEND_POSITION.to_string(),
        entries: build_legend(tiers),
    }
}

fn tier_label(tier: &VisualTier, upper_bound: Option<f64>) -> String {
    if let Some(label) = &tier.label {
        return label.clone();
    }
    match (tier.lower_bound, upper_bound) {
        (Some(lower), Some(upper)) => format!("Between: {lower}-{upper}"),
        (None, Some(upper)) => format!("Under: {upper}"),
        (Some(lower), None) => format!("Over: {lower}+"),
        (None, None) => "All magnitudes".to_string(),
    }
}

#[cfg(test)]
#[path = "tests/legend_tests.rs"]
mod tests;
