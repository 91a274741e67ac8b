//! Single-building analytics
//!
//! A [BuildingRecord] is a read-only view on one row of a [Table]. It gives
//! the monthly time trace of each fuel channel, the average monthly profile
//! over a range of years and the standing of the building among its peers.

use crate::{
    layout::{fields, Fuel, Layout, YearMonth},
    stats::{self, Histogram},
    table::{RowId, Table, TableError},
};
use itertools::Itertools;
use serde::Serialize;
use std::{borrow::Cow, ops::RangeInclusive};
use strum::IntoEnumIterator;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum AnalyticsError {
    #[error("building {0} is not in the table")]
    UnknownBuilding(RowId),
    #[error("invalid year range: {0} > {1}")]
    InvalidYearRange(i32, i32),
    #[error("table lookup failed")]
    Table(#[from] TableError),
}
type Result<T> = std::result::Result<T, AnalyticsError>;

/// Chronological monthly values of one fuel channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelTrace {
    pub fuel: Fuel,
    pub points: Vec<(YearMonth, Option<f64>)>,
}
impl FuelTrace {
    pub fn len(&self) -> usize {
        self.points.len()
    }
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Monthly values of one year with its overlay weight
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearProfile {
    pub year: i32,
    pub weight: f64,
    pub values: [Option<f64>; 12],
}

/// Average monthly profile of one fuel channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelProfile {
    pub fuel: Fuel,
    pub years: Vec<YearProfile>,
    /// Cross-year mean of each month, `None` if no year has the month
    pub mean: [Option<f64>; 12],
}

/// Overlay weight of the `i`th of `n` years
///
/// Weights increase linearly from `floor` by steps of `(1 - floor) / n`.
pub fn profile_weight(floor: f64, i: usize, n: usize) -> f64 {
    if n == 0 {
        return floor;
    }
    floor + (1. - floor) * i as f64 / n as f64
}

/// A building score compared to its peer group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerStanding {
    pub score: f64,
    /// Percentage of peers below the score, ties counting for half
    pub percentile: f64,
    pub peer_mean: f64,
    pub peers: Vec<f64>,
}
impl PeerStanding {
    /// Histogram of the peer values with the bin of the building score
    pub fn histogram(&self, n_bins: usize) -> Option<Histogram> {
        Histogram::new(&self.peers, n_bins, Some(self.score))
    }
}

/// Outcome of a peer ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PeerRank {
    Ranked(PeerStanding),
    /// No other building of the same type and climate zone has a value
    EmptyPeerGroup,
    /// The building has no value to rank
    MissingScore,
}
impl PeerRank {
    pub fn standing(&self) -> Option<&PeerStanding> {
        match self {
            PeerRank::Ranked(standing) => Some(standing),
            _ => None,
        }
    }
}

/// Read-only view on one building of a table
#[derive(Debug, Clone, Copy)]
pub struct BuildingRecord<'a> {
    table: &'a Table,
    layout: &'a Layout,
    position: usize,
}
impl<'a> BuildingRecord<'a> {
    pub fn new(table: &'a Table, layout: &'a Layout, id: RowId) -> Result<Self> {
        let position = table
            .position(id)
            .ok_or(AnalyticsError::UnknownBuilding(id))?;
        Ok(Self {
            table,
            layout,
            position,
        })
    }
    pub fn id(&self) -> RowId {
        self.table.row_ids()[self.position]
    }
    /// String form of an identity field
    pub fn text(&self, field: &str) -> Result<Option<Cow<'a, str>>> {
        Ok(self
            .table
            .column(&self.layout.identity(field))?
            .category(self.position))
    }
    /// Numeric identity field
    pub fn number(&self, field: &str) -> Result<Option<f64>> {
        Ok(self
            .table
            .column(&self.layout.identity(field))?
            .float(self.position))
    }
    pub fn property_id(&self) -> Result<Option<Cow<'a, str>>> {
        self.text(fields::PROPERTY_ID)
    }
    pub fn address(&self) -> Result<Option<Cow<'a, str>>> {
        self.text(fields::ADDRESS)
    }
    pub fn city(&self) -> Result<Option<Cow<'a, str>>> {
        self.text(fields::CITY)
    }
    pub fn zip(&self) -> Result<Option<Cow<'a, str>>> {
        self.text(fields::ZIP)
    }
    pub fn utility(&self) -> Result<Option<Cow<'a, str>>> {
        self.text(fields::UTILITY)
    }
    pub fn climate_zone(&self) -> Result<Option<Cow<'a, str>>> {
        self.text(fields::CLIMATE_ZONE)
    }
    pub fn building_type(&self) -> Result<Option<Cow<'a, str>>> {
        self.text(fields::BUILDING_TYPE)
    }
    pub fn year_built(&self) -> Result<Option<f64>> {
        self.number(fields::YEAR_BUILT)
    }
    pub fn floor_area(&self) -> Result<Option<f64>> {
        self.number(fields::FLOOR_AREA)
    }
    /// (latitude, longitude)
    pub fn coordinates(&self) -> Result<Option<(f64, f64)>> {
        Ok(self
            .number(fields::LATITUDE)?
            .zip(self.number(fields::LONGITUDE)?))
    }
    /// Summary metric value
    pub fn summary(&self, metric: &str) -> Result<Option<f64>> {
        Ok(self.table.floats(&self.layout.summary(metric))?[self.position])
    }
    /// Monthly values of a fuel channel in chronological order
    ///
    /// Fields of the fuel namespace that are not `YYYY-MM` labels are skipped.
    pub fn monthly_series(&self, fuel: Fuel) -> FuelTrace {
        let namespace = self.layout.fuel_namespace(fuel);
        let mut points: Vec<(YearMonth, Option<f64>)> = self
            .table
            .namespace(namespace)
            .filter_map(|(key, column)| match key.field.parse::<YearMonth>() {
                Ok(month) => Some((month, column.float(self.position))),
                Err(e) => {
                    log::debug!("{key} skipped: {e}");
                    None
                }
            })
            .collect();
        points.sort_by_key(|(month, _)| *month);
        FuelTrace { fuel, points }
    }
    /// Full time trace of the fuel channels, all of them if `fuels` is empty
    pub fn time_trace(&self, fuels: &[Fuel]) -> Vec<FuelTrace> {
        selected(fuels)
            .into_iter()
            .map(|fuel| self.monthly_series(fuel))
            .collect()
    }
    /// Average monthly profile over the years `y0..=y1`
    ///
    /// The years are restricted to those with monthly columns in the fuel
    /// namespace, weights are spread over the remaining years.
    pub fn monthly_profile(
        &self,
        years: RangeInclusive<i32>,
        fuels: &[Fuel],
        floor: f64,
    ) -> Result<Vec<FuelProfile>> {
        let (y0, y1) = years.into_inner();
        if y0 > y1 {
            return Err(AnalyticsError::InvalidYearRange(y0, y1));
        }
        Ok(selected(fuels)
            .into_iter()
            .map(|fuel| {
                let trace = self.monthly_series(fuel);
                let span: Vec<i32> = trace
                    .points
                    .iter()
                    .map(|(month, _)| month.year)
                    .minmax()
                    .into_option()
                    .map_or_else(Vec::new, |(lo, hi)| (lo.max(y0)..=hi.min(y1)).collect());
                if span.first() != Some(&y0) || span.last() != Some(&y1) {
                    log::debug!("{fuel} profile of {y0}-{y1} restricted to {span:?}");
                }
                let n_years = span.len();
                let years: Vec<YearProfile> = span
                    .into_iter()
                    .enumerate()
                    .map(|(i, year)| {
                        let mut values = [None; 12];
                        trace
                            .points
                            .iter()
                            .filter(|(month, _)| month.year == year)
                            .for_each(|(month, value)| values[month.month_index()] = *value);
                        YearProfile {
                            year,
                            weight: profile_weight(floor, i, n_years),
                            values,
                        }
                    })
                    .collect();
                let mut mean = [None; 12];
                for (k, value) in mean.iter_mut().enumerate() {
                    let present: Vec<f64> = years.iter().filter_map(|y| y.values[k]).collect();
                    *value = stats::mean(&present);
                }
                FuelProfile { fuel, years, mean }
            })
            .collect())
    }
    /// Ranks the building summary `metric` among the other buildings of the
    /// same type and climate zone
    pub fn peer_rank(&self, metric: &str) -> Result<PeerRank> {
        let values = self.table.floats(&self.layout.summary(metric))?;
        let Some(score) = values[self.position] else {
            return Ok(PeerRank::MissingScore);
        };
        let types = self
            .table
            .column(&self.layout.identity(fields::BUILDING_TYPE))?;
        let zones = self
            .table
            .column(&self.layout.identity(fields::CLIMATE_ZONE))?;
        let (building_type, zone) = (types.category(self.position), zones.category(self.position));
        let peers: Vec<f64> = (0..self.table.len())
            .filter(|&row| row != self.position)
            .filter(|&row| {
                building_type.is_some()
                    && zone.is_some()
                    && types.category(row) == building_type
                    && zones.category(row) == zone
            })
            .filter_map(|row| values[row])
            .collect();
        let (Some(percentile), Some(peer_mean)) = (
            stats::percentile_of_score(&peers, score),
            stats::mean(&peers),
        ) else {
            log::debug!("building {} has no peers for {metric}", self.id());
            return Ok(PeerRank::EmptyPeerGroup);
        };
        Ok(PeerRank::Ranked(PeerStanding {
            score,
            percentile,
            peer_mean,
            peers,
        }))
    }
}

fn selected(fuels: &[Fuel]) -> Vec<Fuel> {
    if fuels.is_empty() {
        Fuel::iter().collect()
    } else {
        fuels.to_vec()
    }
}
