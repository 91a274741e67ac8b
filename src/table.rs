//! Column store of building records addressed by (namespace, field) keys

use chrono::NaiveDate;
use itertools::{Itertools, MinMaxResult};
use serde::Serialize;
use std::{borrow::Cow, cmp::Ordering, collections::HashMap, fmt};
use strum_macros::Display;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum TableError {
    #[error("unknown column {0}")]
    UnknownColumn(ColumnKey),
    #[error("column {column} is not a {expected} column")]
    ColumnType {
        column: ColumnKey,
        expected: ColumnType,
    },
    #[error("duplicate column {0}")]
    DuplicateColumn(ColumnKey),
    #[error("column {column} has {found} rows, expected {expected}")]
    Length {
        column: ColumnKey,
        expected: usize,
        found: usize,
    },
}
type Result<T> = std::result::Result<T, TableError>;

/// Two-part column name: (namespace, field)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ColumnKey {
    pub namespace: String,
    pub field: String,
}
impl ColumnKey {
    pub fn new<N: Into<String>, F: Into<String>>(namespace: N, field: F) -> Self {
        Self {
            namespace: namespace.into(),
            field: field.into(),
        }
    }
}
impl<N: Into<String>, F: Into<String>> From<(N, F)> for ColumnKey {
    fn from((namespace, field): (N, F)) -> Self {
        Self::new(namespace, field)
    }
}
impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.namespace, self.field)
    }
}

/// Storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, serde::Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Float,
    Text,
    Date,
    Bool,
}

/// A typed column, `None` marks a missing cell
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Float(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
    Date(Vec<Option<NaiveDate>>),
    Bool(Vec<Option<bool>>),
}
impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Text(v) => v.len(),
            Column::Date(v) => v.len(),
            Column::Bool(v) => v.len(),
        }
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Float(_) => ColumnType::Float,
            Column::Text(_) => ColumnType::Text,
            Column::Date(_) => ColumnType::Date,
            Column::Bool(_) => ColumnType::Bool,
        }
    }
    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            Column::Float(v) => v[row].is_none(),
            Column::Text(v) => v[row].is_none(),
            Column::Date(v) => v[row].is_none(),
            Column::Bool(v) => v[row].is_none(),
        }
    }
    /// Float value at `row`, `None` if missing or if the column is not numeric
    pub fn float(&self, row: usize) -> Option<f64> {
        match self {
            Column::Float(v) => v[row],
            _ => None,
        }
    }
    /// String form of the cell at `row` used for categorical matching
    ///
    /// Integral floats have no decimal part (`1990.0` gives `"1990"`) and
    /// dates are written as `YYYY-MM-DD`.
    pub fn category(&self, row: usize) -> Option<Cow<'_, str>> {
        match self {
            Column::Float(v) => v[row].map(|x| Cow::Owned(x.to_string())),
            Column::Text(v) => v[row].as_deref().map(Cow::Borrowed),
            Column::Date(v) => v[row].map(|d| Cow::Owned(d.format("%Y-%m-%d").to_string())),
            Column::Bool(v) => v[row].map(|b| Cow::Owned(b.to_string())),
        }
    }
    fn take(&self, rows: &[usize]) -> Self {
        match self {
            Column::Float(v) => Column::Float(rows.iter().map(|&i| v[i]).collect()),
            Column::Text(v) => Column::Text(rows.iter().map(|&i| v[i].clone()).collect()),
            Column::Date(v) => Column::Date(rows.iter().map(|&i| v[i]).collect()),
            Column::Bool(v) => Column::Bool(rows.iter().map(|&i| v[i]).collect()),
        }
    }
}

/// Identity of a building: its position in the loaded file
///
/// Row ids survive filtering, so a derived table can always be traced back to the source rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RowId(pub usize);
impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Orders category labels numerically when both are integers, lexicographically otherwise
pub fn category_cmp(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

/// Immutable table of building records
///
/// Filtering and aggregation never mutate a table, they derive new ones.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    keys: Vec<ColumnKey>,
    columns: Vec<Column>,
    index: HashMap<ColumnKey, usize>,
    row_ids: Vec<RowId>,
}
impl Table {
    /// Builds a table from columns of equal length, rows are numbered from 0
    pub fn from_columns<I>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (ColumnKey, Column)>,
    {
        let mut this = Table::default();
        let mut n_rows: Option<usize> = None;
        for (key, column) in columns {
            let expected = *n_rows.get_or_insert(column.len());
            if column.len() != expected {
                return Err(TableError::Length {
                    column: key,
                    expected,
                    found: column.len(),
                });
            }
            if this.index.contains_key(&key) {
                return Err(TableError::DuplicateColumn(key));
            }
            this.index.insert(key.clone(), this.keys.len());
            this.keys.push(key);
            this.columns.push(column);
        }
        this.row_ids = (0..n_rows.unwrap_or_default()).map(RowId).collect();
        Ok(this)
    }
    /// Number of rows
    pub fn len(&self) -> usize {
        self.row_ids.len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn n_columns(&self) -> usize {
        self.keys.len()
    }
    pub fn keys(&self) -> &[ColumnKey] {
        &self.keys
    }
    pub fn row_ids(&self) -> &[RowId] {
        &self.row_ids
    }
    /// Position of a building in this table
    pub fn position(&self, id: RowId) -> Option<usize> {
        self.row_ids.iter().position(|&row| row == id)
    }
    pub fn contains(&self, key: &ColumnKey) -> bool {
        self.index.contains_key(key)
    }
    pub fn column(&self, key: &ColumnKey) -> Result<&Column> {
        self.index
            .get(key)
            .map(|&i| &self.columns[i])
            .ok_or_else(|| TableError::UnknownColumn(key.clone()))
    }
    /// Float cells of a numeric column
    pub fn floats(&self, key: &ColumnKey) -> Result<&[Option<f64>]> {
        match self.column(key)? {
            Column::Float(v) => Ok(v),
            _ => Err(TableError::ColumnType {
                column: key.clone(),
                expected: ColumnType::Float,
            }),
        }
    }
    /// Iterator over the columns of a namespace, in file order
    pub fn namespace<'a>(
        &'a self,
        namespace: &'a str,
    ) -> impl Iterator<Item = (&'a ColumnKey, &'a Column)> + 'a {
        self.keys
            .iter()
            .zip(self.columns.iter())
            .filter(move |(key, _)| key.namespace == namespace)
    }
    /// New table with the rows at `positions`, in that order
    pub fn take(&self, positions: &[usize]) -> Self {
        Self {
            keys: self.keys.clone(),
            columns: self.columns.iter().map(|c| c.take(positions)).collect(),
            index: self.index.clone(),
            row_ids: positions.iter().map(|&i| self.row_ids[i]).collect(),
        }
    }
    /// Range of the present values of a numeric column, `None` if all are missing
    pub fn domain(&self, key: &ColumnKey) -> Result<Option<(f64, f64)>> {
        let values = self.floats(key)?;
        Ok(
            match values
                .iter()
                .flatten()
                .copied()
                .minmax_by(|a, b| a.total_cmp(b))
            {
                MinMaxResult::NoElements => None,
                MinMaxResult::OneElement(x) => Some((x, x)),
                MinMaxResult::MinMax(x, y) => Some((x, y)),
            },
        )
    }
    /// Sorted distinct values of a column, integers are sorted numerically
    pub fn categories(&self, key: &ColumnKey) -> Result<Vec<String>> {
        let column = self.column(key)?;
        Ok((0..self.len())
            .filter_map(|row| column.category(row))
            .map(Cow::into_owned)
            .unique()
            .sorted_by(|a, b| category_cmp(a, b))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::from_columns([
            (
                ColumnKey::new("cis", "cz"),
                Column::Text(vec![
                    Some("12".into()),
                    Some("3".into()),
                    None,
                    Some("3".into()),
                ]),
            ),
            (
                ColumnKey::new("cis", "year_built"),
                Column::Float(vec![Some(1990.), None, Some(1950.5), Some(2001.)]),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn lookup() {
        let t = table();
        assert_eq!(t.len(), 4);
        assert_eq!(t.n_columns(), 2);
        assert!(t.contains(&("cis", "cz").into()));
        assert_eq!(
            t.column(&("cis", "zip").into()),
            Err(TableError::UnknownColumn(ColumnKey::new("cis", "zip")))
        );
        assert!(matches!(
            t.floats(&("cis", "cz").into()),
            Err(TableError::ColumnType { .. })
        ));
    }

    #[test]
    fn ragged_columns() {
        let t = Table::from_columns([
            (ColumnKey::new("a", "x"), Column::Bool(vec![Some(true)])),
            (ColumnKey::new("a", "y"), Column::Bool(vec![None, None])),
        ]);
        assert!(matches!(t, Err(TableError::Length { found: 2, .. })));
    }

    #[test]
    fn categories_and_domain() {
        let t = table();
        assert_eq!(
            t.categories(&("cis", "cz").into()).unwrap(),
            vec!["3".to_string(), "12".to_string()]
        );
        assert_eq!(
            t.domain(&("cis", "year_built").into()).unwrap(),
            Some((1950.5, 2001.))
        );
        let column = t.column(&("cis", "year_built").into()).unwrap();
        assert_eq!(column.category(0).as_deref(), Some("1990"));
        assert_eq!(column.category(2).as_deref(), Some("1950.5"));
        assert!(column.category(1).is_none());
    }

    #[test]
    fn take_keeps_row_ids() {
        let t = table().take(&[3, 1]);
        assert_eq!(t.row_ids(), &[RowId(3), RowId(1)]);
        assert_eq!(
            t.floats(&("cis", "year_built").into()).unwrap(),
            &[Some(2001.), None]
        );
        assert_eq!(table().take(&[1, 3]).position(RowId(3)), Some(1));
    }
}
