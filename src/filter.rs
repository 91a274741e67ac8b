//! Row selection by categorical and range predicates

use crate::{
    layout::{fields, normalize_zone, Layout},
    table::{Column, ColumnKey, ColumnType, Table, TableError},
};
use std::{borrow::Cow, collections::HashSet, ops::RangeInclusive};

type Result<T> = std::result::Result<T, TableError>;

/// Inclusive numeric bounds, a missing bound is unbounded on that side
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}
impl Bounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }
    pub fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            ..Default::default()
        }
    }
    pub fn at_most(max: f64) -> Self {
        Self {
            max: Some(max),
            ..Default::default()
        }
    }
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
    /// Checks if the bounds include the whole `(min, max)` domain
    pub fn covers(&self, (lo, hi): (f64, f64)) -> bool {
        self.contains(lo) && self.contains(hi)
    }
}
impl From<(f64, f64)> for Bounds {
    fn from((min, max): (f64, f64)) -> Self {
        Self::new(min, max)
    }
}
impl From<RangeInclusive<f64>> for Bounds {
    fn from(range: RangeInclusive<f64>) -> Self {
        Self::new(*range.start(), *range.end())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Cell string form is one of the values, an empty set matches everything
    OneOf(Vec<String>),
    /// Cell value is within the bounds
    Within(Bounds),
}

/// Conjunction of column predicates
///
/// ```
/// use eui_explorer::{Bounds, FilterSet};
/// let predicates = FilterSet::default()
///     .building_types(["Office building"])
///     .climate_zones([3, 9])
///     .year_built(Bounds::at_least(1980.));
/// assert_eq!(predicates.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterSet {
    layout: Layout,
    predicates: Vec<(ColumnKey, Predicate)>,
}
impl FilterSet {
    pub fn with_layout(layout: Layout) -> Self {
        Self {
            layout,
            ..Default::default()
        }
    }
    pub fn len(&self) -> usize {
        self.predicates.len()
    }
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
    pub fn predicates(&self) -> &[(ColumnKey, Predicate)] {
        &self.predicates
    }
    /// Keeps rows which `key` column is one of `values`
    pub fn category<I, T>(mut self, key: ColumnKey, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        let values = values.into_iter().map(|v| v.to_string()).collect();
        self.predicates.push((key, Predicate::OneOf(values)));
        self
    }
    /// Keeps rows which `key` column is within `bounds`
    pub fn range<B: Into<Bounds>>(mut self, key: ColumnKey, bounds: B) -> Self {
        self.predicates.push((key, Predicate::Within(bounds.into())));
        self
    }
    pub fn building_types<I, T>(self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        let key = self.layout.identity(fields::BUILDING_TYPE);
        self.category(key, values)
    }
    /// Climate zones given either as integers or as text
    pub fn climate_zones<I, T>(self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        let key = self.layout.identity(fields::CLIMATE_ZONE);
        let zones: Vec<String> = values
            .into_iter()
            .map(|v| {
                let v = v.to_string();
                normalize_zone(&v).unwrap_or(v)
            })
            .collect();
        self.category(key, zones)
    }
    pub fn utilities<I, T>(self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        let key = self.layout.identity(fields::UTILITY);
        self.category(key, values)
    }
    /// Range on a consumption metric of the summary namespace
    pub fn consumption<B: Into<Bounds>>(self, metric: &str, bounds: B) -> Self {
        let key = self.layout.summary(metric);
        self.range(key, bounds)
    }
    pub fn year_built<B: Into<Bounds>>(self, bounds: B) -> Self {
        let key = self.layout.identity(fields::YEAR_BUILT);
        self.range(key, bounds)
    }
    pub fn floor_area<B: Into<Bounds>>(self, bounds: B) -> Self {
        let key = self.layout.identity(fields::FLOOR_AREA);
        self.range(key, bounds)
    }
    /// Returns the rows of `table` matching every predicate, in table order
    pub fn apply(&self, table: &Table) -> Result<Table> {
        let mut mask = vec![true; table.len()];
        for (key, predicate) in &self.predicates {
            let column = table.column(key)?;
            match predicate {
                Predicate::OneOf(values) if values.is_empty() => (),
                Predicate::OneOf(values) => {
                    // float cells read as `1990`, so `1990.0` must too
                    let values: HashSet<Cow<str>> = values
                        .iter()
                        .map(|v| match (column, v.parse::<f64>()) {
                            (Column::Float(_), Ok(x)) => Cow::Owned(x.to_string()),
                            _ => Cow::Borrowed(v.as_str()),
                        })
                        .collect();
                    mask.iter_mut().enumerate().for_each(|(row, keep)| {
                        *keep &= column
                            .category(row)
                            .is_some_and(|c| values.contains(&*c))
                    });
                }
                Predicate::Within(bounds) => {
                    let Column::Float(cells) = column else {
                        return Err(TableError::ColumnType {
                            column: key.clone(),
                            expected: ColumnType::Float,
                        });
                    };
                    let no_op = bounds.is_unbounded()
                        || table.domain(key)?.map_or(true, |domain| bounds.covers(domain));
                    if no_op {
                        log::debug!("{key} range {bounds:?} covers the whole domain");
                        continue;
                    }
                    mask.iter_mut()
                        .zip(cells)
                        .for_each(|(keep, cell)| *keep &= cell.is_some_and(|x| bounds.contains(x)));
                }
            }
        }
        let positions: Vec<usize> = mask
            .into_iter()
            .enumerate()
            .filter_map(|(row, keep)| keep.then_some(row))
            .collect();
        Ok(table.take(&positions))
    }
}

/// Returns the rows of `table` matching `predicates`
pub fn filter(table: &Table, predicates: &FilterSet) -> Result<Table> {
    predicates.apply(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fixtures, table::RowId};
    use rand::{seq::SliceRandom, Rng};

    fn ids(table: &Table) -> Vec<usize> {
        table.row_ids().iter().map(|id| id.0).collect()
    }

    #[test]
    fn no_predicates() {
        let table = fixtures::table();
        assert_eq!(filter(&table, &FilterSet::default()).unwrap(), table);
    }

    #[test]
    fn zones_as_integers_or_text() {
        let table = fixtures::table();
        let by_int = filter(&table, &FilterSet::default().climate_zones([3])).unwrap();
        let by_text = filter(&table, &FilterSet::default().climate_zones(["3"])).unwrap();
        let by_float_text = filter(&table, &FilterSet::default().climate_zones(["3.0"])).unwrap();
        assert_eq!(ids(&by_int), vec![0, 1, 2, 7]);
        assert_eq!(by_int, by_text);
        assert_eq!(by_int, by_float_text);
    }

    #[test]
    fn conjunction() {
        let table = fixtures::table();
        let predicates = FilterSet::default()
            .building_types(["Office building"])
            .utilities(["PGE", "SDGE"])
            .year_built(Bounds::new(1980., 2000.));
        let subset = filter(&table, &predicates).unwrap();
        assert_eq!(ids(&subset), vec![0, 1]);
        // predicate order doesn't matter
        let reversed = FilterSet::default()
            .year_built(Bounds::new(1980., 2000.))
            .utilities(["SDGE", "PGE"])
            .building_types(["Office building"]);
        assert_eq!(filter(&table, &reversed).unwrap(), subset);
    }

    #[test]
    fn open_bounds() {
        let table = fixtures::table();
        let subset = filter(&table, &FilterSet::default().floor_area(Bounds::at_least(30000.))).unwrap();
        assert_eq!(ids(&subset), vec![2, 5, 6]);
        let subset = filter(&table, &FilterSet::default().floor_area(Bounds::at_most(12000.))).unwrap();
        assert_eq!(ids(&subset), vec![0, 7]);
        // no bound at all keeps the rows with a missing floor area
        let subset = filter(&table, &FilterSet::default().floor_area(Bounds::default())).unwrap();
        assert_eq!(subset.len(), table.len());
    }

    #[test]
    fn full_domain_round_trip() {
        let table = fixtures::table();
        let layout = Layout::default();
        let mut predicates = FilterSet::default();
        for key in [
            layout.identity(fields::YEAR_BUILT),
            layout.identity(fields::FLOOR_AREA),
            layout.summary("EUI_tot_avg_2009_2015"),
        ] {
            let domain = table.domain(&key).unwrap().unwrap();
            predicates = predicates.range(key, domain);
        }
        assert_eq!(filter(&table, &predicates).unwrap(), table);
    }

    #[test]
    fn empty_result() {
        let table = fixtures::table();
        let subset = filter(
            &table,
            &FilterSet::default()
                .building_types(["Warehouse"])
                .climate_zones([7]),
        )
        .unwrap();
        assert!(subset.is_empty());
        assert_eq!(subset.n_columns(), table.n_columns());
    }

    #[test]
    fn unknown_column() {
        let table = fixtures::table();
        let err = filter(
            &table,
            &FilterSet::default().consumption("kBtu_avg", Bounds::new(0., 10.)),
        )
        .unwrap_err();
        assert_eq!(
            err,
            TableError::UnknownColumn(ColumnKey::new("summary", "kBtu_avg"))
        );
        assert!(matches!(
            filter(
                &table,
                &FilterSet::default().range(ColumnKey::new("cis", "city"), (0., 1.))
            ),
            Err(TableError::ColumnType { .. })
        ));
    }

    #[test]
    fn idempotent_with_all_missing_values() {
        let table = Table::from_columns([
            (
                ColumnKey::new("cis", "building_type"),
                Column::Text(vec![
                    Some("Office building".to_string()),
                    Some("Warehouse".to_string()),
                ]),
            ),
            (
                ColumnKey::new("cis", "year_built"),
                Column::Float(vec![None, Some(1990.)]),
            ),
        ])
        .unwrap();
        let predicates = FilterSet::default()
            .building_types(["Office building"])
            .year_built(Bounds::at_least(1900.));
        let once = filter(&table, &predicates).unwrap();
        assert_eq!(ids(&once), vec![0]);
        assert_eq!(filter(&once, &predicates).unwrap(), once);
        // a range over a column without any value keeps every row
        let twice = filter(&once, &FilterSet::default().year_built(Bounds::new(2000., 2010.))).unwrap();
        assert_eq!(twice, once);
    }

    #[test]
    fn float_categories() {
        let table = fixtures::table();
        let year_built = Layout::default().identity(fields::YEAR_BUILT);
        let by_float_text = filter(&table, &FilterSet::default().category(year_built.clone(), ["1990.0"])).unwrap();
        let by_int = filter(&table, &FilterSet::default().category(year_built, [1990])).unwrap();
        assert_eq!(ids(&by_float_text), vec![0]);
        assert_eq!(by_float_text, by_int);
        // text columns are matched as given
        let city = Layout::default().identity(fields::CITY);
        let subset = filter(&table, &FilterSet::default().category(city, ["Fresno"])).unwrap();
        assert_eq!(ids(&subset), vec![0, 1]);
    }

    #[test]
    fn subset_and_idempotent() {
        let table = fixtures::table();
        let layout = Layout::default();
        let types = ["Office building", "Warehouse"];
        let zones = ["3", "7", "9"];
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let mut predicates = FilterSet::default();
            if rng.gen_bool(0.5) {
                predicates = predicates.building_types(types.choose_multiple(&mut rng, 1).copied());
            }
            if rng.gen_bool(0.5) {
                let n = rng.gen_range(0..=zones.len());
                predicates = predicates.climate_zones(zones.choose_multiple(&mut rng, n).copied());
            }
            if rng.gen_bool(0.5) {
                let lo = rng.gen_range(1950.0..2000.0);
                predicates = predicates.year_built(Bounds::new(lo, lo + rng.gen_range(0.0..60.0)));
            }
            if rng.gen_bool(0.5) {
                let key = layout.summary("EUI_tot_fit_2009_2015");
                predicates = predicates.range(key, Bounds::at_most(rng.gen_range(-2.5..2.0)));
            }
            let once = filter(&table, &predicates).unwrap();
            assert!(once
                .row_ids()
                .iter()
                .all(|id| table.position(*id).is_some()));
            assert!(once.row_ids().windows(2).all(|w| w[0] < w[1]));
            assert_eq!(filter(&once, &predicates).unwrap(), once);
        }
        assert_eq!(table.position(RowId(7)), Some(7));
    }
}
