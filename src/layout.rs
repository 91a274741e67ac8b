//! Namespaces and field names of the processed bills table

use crate::table::ColumnKey;
use serde::{Deserialize, Serialize};
use std::{fmt, num::ParseIntError, str::FromStr};
use strum_macros::{Display, EnumIter, EnumString};

/// Field names under the identity namespace
pub mod fields {
    pub const PROPERTY_ID: &str = "property_id";
    pub const ADDRESS: &str = "address";
    pub const CITY: &str = "city";
    pub const ZIP: &str = "zip";
    pub const UTILITY: &str = "utility";
    pub const CLIMATE_ZONE: &str = "cz";
    pub const BUILDING_TYPE: &str = "building_type";
    pub const YEAR_BUILT: &str = "year_built";
    pub const FLOOR_AREA: &str = "building_area";
    pub const LATITUDE: &str = "Latitude";
    pub const LONGITUDE: &str = "Longitude";
}

/// Fuel channel of the monthly series
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    EnumString,
    Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Fuel {
    Electric,
    Gas,
    Total,
}

/// Top-level (namespace) column names
///
/// The defaults follow the processed bills file: building characteristics
/// under `cis`, derived statistics under `summary` and one namespace of
/// monthly EUI per fuel channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub identity: String,
    pub summary: String,
    pub electric: String,
    pub gas: String,
    pub total: String,
}
impl Default for Layout {
    fn default() -> Self {
        Self {
            identity: String::from("cis"),
            summary: String::from("summary"),
            electric: String::from("EUI_elec"),
            gas: String::from("EUI_gas"),
            total: String::from("EUI_tot"),
        }
    }
}
impl Layout {
    pub fn identity(&self, field: &str) -> ColumnKey {
        ColumnKey::new(self.identity.as_str(), field)
    }
    pub fn summary(&self, field: &str) -> ColumnKey {
        ColumnKey::new(self.summary.as_str(), field)
    }
    /// Namespace holding the monthly series of a fuel channel
    pub fn fuel_namespace(&self, fuel: Fuel) -> &str {
        match fuel {
            Fuel::Electric => &self.electric,
            Fuel::Gas => &self.gas,
            Fuel::Total => &self.total,
        }
    }
}

/// Normalizes a climate zone to its integer text form: `"3.0"` and `"3"` both give `"3"`
///
/// Returns `None` if the value is not a positive integer.
pub fn normalize_zone(value: &str) -> Option<String> {
    let zone = value.trim().parse::<f64>().ok()?;
    if zone.is_finite() && zone.fract() == 0. && zone >= 1. {
        Some(format!("{}", zone as u64))
    } else {
        None
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum YearMonthError {
    #[error("{0:?} doesn't match the YYYY-MM pattern")]
    Pattern(String),
    #[error("month {0} is out of range")]
    Month(u32),
    #[error("year-month parsing error")]
    Parse(#[from] ParseIntError),
}

/// Year-month label of a monthly series column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}
impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, YearMonthError> {
        if (1..=12).contains(&month) {
            Ok(Self { year, month })
        } else {
            Err(YearMonthError::Month(month))
        }
    }
    /// Zero-based month index
    pub fn month_index(&self) -> usize {
        self.month as usize - 1
    }
}
impl FromStr for YearMonth {
    type Err = YearMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('-');
        let (Some(year), Some(month)) = (parts.next(), parts.next()) else {
            return Err(YearMonthError::Pattern(s.to_string()));
        };
        if year.len() != 4 || month.is_empty() || month.len() > 2 || parts.count() > 1 {
            return Err(YearMonthError::Pattern(s.to_string()));
        }
        YearMonth::new(year.parse()?, month.parse()?)
    }
}
impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zones() {
        assert_eq!(normalize_zone("3"), Some("3".to_string()));
        assert_eq!(normalize_zone("16.0"), Some("16".to_string()));
        assert_eq!(normalize_zone("0"), None);
        assert_eq!(normalize_zone("3.5"), None);
        assert_eq!(normalize_zone("coastal"), None);
    }

    #[test]
    fn year_month_labels() {
        assert_eq!("2013-01".parse::<YearMonth>(), Ok(YearMonth { year: 2013, month: 1 }));
        assert_eq!("2013-1".parse::<YearMonth>(), Ok(YearMonth { year: 2013, month: 1 }));
        assert_eq!("2013-12-01".parse::<YearMonth>(), Ok(YearMonth { year: 2013, month: 12 }));
        assert_eq!("2013-13".parse::<YearMonth>(), Err(YearMonthError::Month(13)));
        assert!("kWh".parse::<YearMonth>().is_err());
        assert!("13-01".parse::<YearMonth>().is_err());
        let ym: YearMonth = "2009-7".parse().unwrap();
        assert_eq!(ym.to_string(), "2009-07");
        assert_eq!(ym.month_index(), 6);
    }

    #[test]
    fn fuels() {
        assert_eq!("gas".parse::<Fuel>(), Ok(Fuel::Gas));
        assert_eq!("Electric".parse::<Fuel>(), Ok(Fuel::Electric));
        assert_eq!(Fuel::Total.to_string(), "total");
        let layout = Layout::default();
        assert_eq!(layout.fuel_namespace(Fuel::Gas), "EUI_gas");
        assert_eq!(
            layout.identity(fields::CLIMATE_ZONE),
            ColumnKey::new("cis", "cz")
        );
    }
}
