//! Box plot groups of every selection value at once

use crate::{
    aggregate::{aggregate, AggregateError, AggregateOptions, Dimension, OrderedGroups},
    table::Table,
};
use rayon::prelude::*;
use std::time::Instant;

/// Aggregates `metric` for each value of the `by` axis
///
/// Selection values come from the table, in ascending order, and are
/// aggregated in parallel. Values without any group surviving the minimum
/// sample size are omitted.
pub fn overview(
    table: &Table,
    by: Dimension,
    metric: &str,
    options: &AggregateOptions,
) -> Result<Vec<(String, OrderedGroups)>, AggregateError> {
    let now = Instant::now();
    let selections = table.categories(&options.get_layout().identity(by.field()))?;
    let results = selections
        .into_par_iter()
        .map(|selection| {
            let groups = aggregate(
                table,
                by,
                metric,
                &options.clone().select([selection.as_str()]),
            )?;
            Ok((selection, groups))
        })
        .collect::<Result<Vec<_>, AggregateError>>()?;
    log::info!(
        "{} overview by {} in {}ms",
        metric,
        by,
        now.elapsed().as_millis()
    );
    Ok(results
        .into_iter()
        .filter(|(_, groups)| !groups.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn overview_by_zone() {
        let table = fixtures::table();
        let options = AggregateOptions::default().min_sample_size(0);
        let report = overview(&table, Dimension::ClimateZone, "EUI_tot_avg_2009_2015", &options).unwrap();
        assert_eq!(
            report.iter().map(|(zone, _)| zone.as_str()).collect::<Vec<_>>(),
            vec!["3", "7", "9"]
        );
        let (_, zone_3) = &report[0];
        assert_eq!(zone_3.keys(), vec!["Warehouse", "Office building"]);
        let (_, zone_7) = &report[1];
        assert_eq!(zone_7.groups[0].values, vec![70., 40.]);
    }

    #[test]
    fn overview_drops_empty_selections() {
        let table = fixtures::table();
        let options = AggregateOptions::default().min_sample_size(1);
        let report = overview(&table, Dimension::BuildingType, "EUI_tot_avg_2009_2015", &options).unwrap();
        // office buildings in zones 3 and 7 have two values each
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].0, "Office building");
        assert_eq!(report[0].1.keys(), vec!["7", "3"]);
    }
}
