//! Peer groups of a summary metric, ready for box plots
//!
//! Rows are selected on one categorical axis (building type or climate
//! zone) and partitioned on the other one. Groups with too few buildings
//! are suppressed and the remaining ones are ordered for display.

use crate::{
    layout::{fields, normalize_zone, Layout},
    stats::Summary,
    table::{category_cmp, Table, TableError},
};
use itertools::Itertools;
use regex::Regex;
use serde::Serialize;
use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet},
    fmt,
    str::FromStr,
    sync::LazyLock,
};
use strum_macros::EnumIter;

#[derive(thiserror::Error, Debug)]
pub enum AggregateError {
    #[error(r#"group dimension {0:?} is not recognized, expected "building_type" or "cz""#)]
    UnknownGroupDimension(String),
    #[error("table lookup failed")]
    Table(#[from] TableError),
}
type Result<T> = std::result::Result<T, AggregateError>;

/// Categorical axis of the building table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize)]
pub enum Dimension {
    BuildingType,
    ClimateZone,
}
impl Dimension {
    /// Get a new `Dimension` from its field name: "building_type" or "cz"
    pub fn new(name: &str) -> Result<Self> {
        match name {
            "building_type" => Ok(Dimension::BuildingType),
            "cz" | "climate_zone" => Ok(Dimension::ClimateZone),
            _ => Err(AggregateError::UnknownGroupDimension(name.to_string())),
        }
    }
    /// Identity field of the axis
    pub fn field(&self) -> &'static str {
        match self {
            Dimension::BuildingType => fields::BUILDING_TYPE,
            Dimension::ClimateZone => fields::CLIMATE_ZONE,
        }
    }
    /// The other axis, the one groups are displayed along
    pub fn peer_axis(&self) -> Self {
        match self {
            Dimension::BuildingType => Dimension::ClimateZone,
            Dimension::ClimateZone => Dimension::BuildingType,
        }
    }
    /// Display label of a group key on this axis
    pub fn label(&self, key: &str) -> String {
        match self {
            Dimension::BuildingType => key.to_string(),
            Dimension::ClimateZone => format!("CZ {key}"),
        }
    }
    /// Canonical form of a key given by a caller
    fn normalize(&self, key: &str) -> String {
        match self {
            Dimension::BuildingType => key.to_string(),
            Dimension::ClimateZone => normalize_zone(key).unwrap_or_else(|| key.to_string()),
        }
    }
    /// Key ordering: numeric for climate zones, lexicographic for building types
    fn compare(&self, a: &str, b: &str) -> Ordering {
        match self {
            Dimension::BuildingType => a.cmp(b),
            Dimension::ClimateZone => category_cmp(a, b),
        }
    }
}
impl FromStr for Dimension {
    type Err = AggregateError;

    fn from_str(s: &str) -> Result<Self> {
        Dimension::new(s)
    }
}
impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field())
    }
}

/// Aggregation settings
#[derive(Debug, Clone)]
pub struct AggregateOptions {
    layout: Layout,
    min_sample_size: usize,
    selection: Option<Vec<String>>,
    order: Option<Vec<String>>,
    axis_label: Option<String>,
}
impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            min_sample_size: 5,
            selection: None,
            order: None,
            axis_label: None,
        }
    }
}
impl AggregateOptions {
    pub fn layout(self, layout: Layout) -> Self {
        Self { layout, ..self }
    }
    /// Groups must have strictly more than `min_sample_size` buildings
    pub fn min_sample_size(self, min_sample_size: usize) -> Self {
        Self {
            min_sample_size,
            ..self
        }
    }
    /// Restricts rows to these values of the selection axis
    pub fn select<I, T>(self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        Self {
            selection: Some(values.into_iter().map(|v| v.to_string()).collect()),
            ..self
        }
    }
    /// Explicit display order of the groups, before the final reversal
    pub fn order<I, T>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        Self {
            order: Some(keys.into_iter().map(|v| v.to_string()).collect()),
            ..self
        }
    }
    pub fn axis_label<S: Into<String>>(self, label: S) -> Self {
        Self {
            axis_label: Some(label.into()),
            ..self
        }
    }
    pub fn get_layout(&self) -> &Layout {
        &self.layout
    }
}

/// Values of the metric for one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub key: String,
    pub label: String,
    pub values: Vec<f64>,
}
impl Group {
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    pub fn summary(&self) -> Option<Summary> {
        Summary::new(&self.values)
    }
}

/// Groups in display order
///
/// The first group renders at the bottom of a horizontal box plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderedGroups {
    pub metric: String,
    /// Axis the groups are partitioned on
    pub axis: Dimension,
    pub axis_label: Option<String>,
    pub groups: Vec<Group>,
}
impl OrderedGroups {
    pub fn len(&self) -> usize {
        self.groups.len()
    }
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Group> {
        self.groups.iter()
    }
    pub fn keys(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.key.as_str()).collect()
    }
}
impl fmt::Display for OrderedGroups {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} by {} [{}]:", self.metric, self.axis, self.len())?;
        writeln!(
            f,
            " {:<36} {:>6} {:>10} {:>10} {:>10} {:>10}",
            "GROUP", "COUNT", "MEAN", "MEDIAN", "MIN", "MAX"
        )?;
        for group in self.iter().rev() {
            if let Some(summary) = group.summary() {
                writeln!(f, " {:<36} {}", group.label, summary)?;
            }
        }
        Ok(())
    }
}

/// Axis label suggested by the metric name
///
/// Trend metrics (`*_fit_*`) are rates of change, average metrics
/// (`*_avg_*`) are levels. The year span is read from a trailing
/// `_YYYY_YYYY`, it defaults to 2009-2015.
pub fn axis_label(metric: &str) -> Option<String> {
    static YEARS_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"_(\d{4})_(\d{4})$").expect("year span regex"));
    let (y0, y1) = YEARS_RE
        .captures(metric)
        .and_then(|capts| Some((capts.get(1)?.as_str(), capts.get(2)?.as_str())))
        .unwrap_or(("2009", "2015"));
    if metric.contains("fit") {
        Some(format!("Change in annual EUI from {y0}-{y1}\n(kBtu/ft2/year)"))
    } else if metric.contains("avg") {
        Some(format!("Average annual EUI from {y0}-{y1} \n(kBtu/ft2)"))
    } else {
        None
    }
}

/// Partitions the buildings selected on the `by` axis along the other axis
///
/// Rows missing the metric or either categorical value are dropped, groups
/// with `min_sample_size` buildings or fewer are suppressed. Groups follow
/// the explicit order if one is given, ascending key order otherwise, and
/// are emitted reversed.
pub fn aggregate(
    table: &Table,
    by: Dimension,
    metric: &str,
    options: &AggregateOptions,
) -> Result<OrderedGroups> {
    let layout = &options.layout;
    let axis = by.peer_axis();
    let values = table.floats(&layout.summary(metric))?;
    let selector = table.column(&layout.identity(by.field()))?;
    let partition = table.column(&layout.identity(axis.field()))?;
    let selection: Option<HashSet<String>> = options
        .selection
        .as_ref()
        .map(|keys| keys.iter().map(|k| by.normalize(k)).collect());

    let mut partitions: HashMap<String, Vec<f64>> = HashMap::new();
    for row in 0..table.len() {
        let (Some(value), Some(selected), Some(key)) =
            (values[row], selector.category(row), partition.category(row))
        else {
            continue;
        };
        if selection
            .as_ref()
            .is_some_and(|selection| !selection.contains(&*selected))
        {
            continue;
        }
        partitions.entry(key.into_owned()).or_default().push(value);
    }

    partitions.retain(|key, values| {
        let keep = values.len() > options.min_sample_size;
        if !keep {
            log::debug!(
                "{metric}: {} dropped with {} buildings (<= {})",
                axis.label(key),
                values.len(),
                options.min_sample_size
            );
        }
        keep
    });

    let order: Vec<String> = match &options.order {
        Some(order) => order
            .iter()
            .map(|key| axis.normalize(key))
            .filter(|key| partitions.contains_key(key))
            .unique()
            .collect(),
        None => partitions
            .keys()
            .cloned()
            .sorted_by(|a, b| axis.compare(a, b))
            .collect(),
    };

    let groups = order
        .into_iter()
        .rev()
        .filter_map(|key| {
            let values = partitions.remove(&key)?;
            Some(Group {
                label: axis.label(&key),
                key,
                values,
            })
        })
        .collect();

    Ok(OrderedGroups {
        metric: metric.to_string(),
        axis,
        axis_label: match &options.axis_label {
            Some(label) => Some(label.clone()),
            None => axis_label(metric),
        },
        groups,
    })
}
