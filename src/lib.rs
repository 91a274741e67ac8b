//! Building energy consumption explorer
//!
//! Loads the processed bills table of a building portfolio (billing data
//! joined with building characteristics), selects buildings with
//! categorical and range predicates, groups a summary metric for box plots
//! and computes the analytics of a single building: monthly time traces,
//! average monthly profiles and peer ranking.
//!
//! ```no_run
//! use eui_explorer::{aggregate, AggregateOptions, Dimension, FilterSet, TableLoader};
//! let table = TableLoader::default().load()?;
//! let offices = FilterSet::default()
//!     .building_types(["Office building"])
//!     .apply(&table)?;
//! let groups = aggregate(
//!     &offices,
//!     Dimension::BuildingType,
//!     "EUI_tot_avg_2009_2015",
//!     &AggregateOptions::default(),
//! )?;
//! println!("{groups}");
//! # Ok::<(), eui_explorer::Error>(())
//! ```

pub mod aggregate;
pub mod building;
pub mod config;
pub mod error;
pub mod filter;
pub mod geo;
pub mod layout;
pub mod loader;
pub mod report;
pub mod stats;
pub mod table;

#[cfg(test)]
mod fixtures;

pub use aggregate::{aggregate, axis_label, AggregateError, AggregateOptions, Dimension, Group, OrderedGroups};
pub use building::{AnalyticsError, BuildingRecord, FuelProfile, FuelTrace, PeerRank, PeerStanding};
pub use config::DisplayConfig;
pub use error::Error;
pub use filter::{filter, Bounds, FilterSet};
pub use geo::GeoPoint;
pub use layout::{Fuel, Layout, YearMonth};
pub use loader::{LoadError, TableLoader};
pub use table::{Column, ColumnKey, ColumnType, RowId, Table, TableError};
