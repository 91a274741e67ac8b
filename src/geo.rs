//! Map view of the buildings

use crate::{
    layout::{fields, Layout},
    table::{RowId, Table, TableError},
};
use itertools::Itertools;
use serde::Serialize;

/// Building location with its hover text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoPoint {
    pub row: RowId,
    pub latitude: f64,
    pub longitude: f64,
    pub hover: String,
}

impl Table {
    /// Locations of the buildings with both coordinates
    ///
    /// The hover text joins the address, the city and the zip code.
    pub fn geo_view(&self, layout: &Layout) -> Result<Vec<GeoPoint>, TableError> {
        let latitudes = self.floats(&layout.identity(fields::LATITUDE))?;
        let longitudes = self.floats(&layout.identity(fields::LONGITUDE))?;
        let hover_columns = [fields::ADDRESS, fields::CITY, fields::ZIP]
            .into_iter()
            .map(|field| self.column(&layout.identity(field)))
            .collect::<Result<Vec<_>, TableError>>()?;
        Ok(self
            .row_ids()
            .iter()
            .enumerate()
            .filter_map(|(position, &row)| {
                Some(GeoPoint {
                    row,
                    latitude: latitudes[position]?,
                    longitude: longitudes[position]?,
                    hover: hover_columns
                        .iter()
                        .filter_map(|column| column.category(position))
                        .join(", "),
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{filter::FilterSet, fixtures};

    #[test]
    fn geo_view() {
        let table = fixtures::table();
        let points = table.geo_view(&Layout::default()).unwrap();
        assert_eq!(points.len(), 7);
        assert!(points.iter().all(|p| p.row != RowId(4)));
        assert_eq!(points[0].hover, "1 Main St, Fresno, 93701");
        assert_eq!((points[0].latitude, points[0].longitude), (36.7, -119.8));
        let subset = FilterSet::default().utilities(["SCE"]).apply(&table).unwrap();
        let points = subset.geo_view(&Layout::default()).unwrap();
        assert_eq!(
            points.iter().map(|p| p.row).collect::<Vec<_>>(),
            vec![RowId(5), RowId(6)]
        );
    }
}
