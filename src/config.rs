//! Presentation constants handed to the dashboard front end

use crate::{aggregate::Dimension, layout::Fuel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Display settings of the charts
///
/// Nothing in the crate reads it implicitly, callers pass it along with the
/// structures they render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Box colour of the groups of buildings selected by climate zone
    pub by_zone_color: String,
    /// Box colour of the groups of buildings selected by building type
    pub by_type_color: String,
    pub fuel_labels: BTreeMap<Fuel, String>,
    /// Display order of the building types
    pub building_types: Vec<String>,
    pub utility_names: BTreeMap<String, String>,
    /// Overlay weight of the first year of a monthly profile
    pub weight_floor: f64,
}
impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            by_zone_color: String::from("rgb(8, 81, 156)"),
            by_type_color: String::from("#FF851B"),
            fuel_labels: [
                (Fuel::Electric, "Electricity"),
                (Fuel::Gas, "Natural gas"),
                (Fuel::Total, "Total"),
            ]
            .into_iter()
            .map(|(fuel, label)| (fuel, label.to_string()))
            .collect(),
            building_types: [
                "Warehouse",
                "Distribution",
                "Office building",
                "Medical building",
                "Hospital / convalescent home",
                "Hotel / motel",
                "Shopping center",
                "Department store / retail outlet",
                "Food store / supermarket",
                "Storefront retail",
                "Miscell commercial",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            utility_names: [
                ("PGE", "Pacific Gas & Electric"),
                ("SCE", "Southern California Edison"),
                ("SDGE", "San Diego Gas & Electric"),
                ("SCG", "Southern California Gas"),
            ]
            .into_iter()
            .map(|(code, name)| (code.to_string(), name.to_string()))
            .collect(),
            weight_floor: 0.15,
        }
    }
}
impl DisplayConfig {
    /// Box colour of the groups of buildings selected on the `by` axis
    pub fn box_color(&self, by: Dimension) -> &str {
        match by {
            Dimension::ClimateZone => &self.by_zone_color,
            Dimension::BuildingType => &self.by_type_color,
        }
    }
    pub fn fuel_label(&self, fuel: Fuel) -> String {
        self.fuel_labels
            .get(&fuel)
            .cloned()
            .unwrap_or_else(|| fuel.to_string())
    }
    /// Utility name, the code itself if it is unknown
    pub fn utility_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.utility_names
            .get(code)
            .map(String::as_str)
            .unwrap_or(code)
    }
    /// Group order of an aggregation on the `by` axis
    ///
    /// Buildings selected by climate zone are grouped by type and follow the
    /// configured type order, zone groups use their natural order.
    pub fn group_order(&self, by: Dimension) -> Option<&[String]> {
        match by {
            Dimension::ClimateZone => Some(&self.building_types),
            Dimension::BuildingType => None,
        }
    }
}
