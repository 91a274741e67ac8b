//! Processed bills loader
//!
//! The file is a delimited text file with a two-row header: the first row
//! holds the namespace of each column and the second row its field name.
//! One data row per building follows.

use crate::{
    layout::{fields, normalize_zone},
    table::{Column, ColumnKey, ColumnType, Table, TableError},
};
use bzip2::read::BzDecoder;
use chrono::NaiveDate;
use flate2::read::GzDecoder;
use std::{
    collections::{BTreeMap, HashSet},
    fs::File,
    io::{self, BufReader, Read},
    path::{Path, PathBuf},
    time::Instant,
};

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("failed to open {1:?}")]
    Open(#[source] io::Error, PathBuf),
    #[error("failed to read the delimited file")]
    Csv(#[from] csv::Error),
    #[error("invalid two-row header: {0}")]
    MissingHeader(String),
    #[error("duplicate column {0}")]
    DuplicateColumn(ColumnKey),
    #[error("column {column}, row {row}: {value:?} is not a valid {expected} value")]
    MalformedInput {
        column: ColumnKey,
        row: usize,
        value: String,
        expected: ColumnType,
    },
    #[error("column {column}, row {row}: {value:?} doesn't match the date format {format:?}")]
    MalformedDate {
        column: ColumnKey,
        row: usize,
        value: String,
        format: String,
    },
    #[error("building {value:?} appears more than once in {column}")]
    DuplicateIdentity { column: ColumnKey, value: String },
    #[error("failed to assemble the table")]
    Table(#[from] TableError),
}
type Result<T> = std::result::Result<T, LoadError>;

/// Loader of the processed bills table
///
/// ```no_run
/// use eui_explorer::TableLoader;
/// let table = TableLoader::default()
///     .data_path("bills_building_eui_all_add_pf.csv.gz")
///     .load()?;
/// # Ok::<(), eui_explorer::LoadError>(())
/// ```
#[derive(Debug, Clone)]
pub struct TableLoader {
    path: PathBuf,
    delimiter: u8,
    identity: String,
    key_field: Option<String>,
    namespace_types: BTreeMap<String, ColumnType>,
    float_fields: Vec<String>,
    date_fields: Vec<String>,
    bool_fields: Vec<String>,
    date_format: String,
    missing_tokens: Vec<String>,
}
impl Default for TableLoader {
    fn default() -> Self {
        let mut namespace_types = BTreeMap::new();
        namespace_types.insert("cis".to_string(), ColumnType::Text);
        for namespace in [
            "kWh",
            "kWhOn",
            "kWhSemi",
            "kWhOff",
            "kW",
            "kWOn",
            "kWSemi",
            "billAmnt",
            "Therms",
            "EUI_elec",
            "EUI_gas",
            "EUI_tot",
            "EUI_tot_mo_avg_2009_2015",
            "EUI_tot_mo_avg_2013_2015",
            "EUI_elec_mo_avg_2009_2015",
            "EUI_elec_mo_avg_2013_2015",
            "EUI_gas_mo_avg_2009_2015",
            "EUI_gas_mo_avg_2013_2015",
            "summary",
        ] {
            namespace_types.insert(namespace.to_string(), ColumnType::Float);
        }
        Self {
            path: PathBuf::from("bills_building_eui_all_add_pf.csv"),
            delimiter: b',',
            identity: String::from("cis"),
            key_field: Some(fields::PROPERTY_ID.to_string()),
            namespace_types,
            float_fields: [
                fields::LONGITUDE,
                fields::LATITUDE,
                fields::YEAR_BUILT,
                "year_renovated",
                "Vacancy %",
                "Number Of Stories",
                fields::FLOOR_AREA,
                "land_area",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            date_fields: vec![String::from("date_transfer")],
            bool_fields: vec![String::from("range_address_ind")],
            date_format: String::from("%Y-%m-%d"),
            missing_tokens: ["", "NA", "NaN", "nan", "null", "None"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}
impl TableLoader {
    /// Path to the data file, `.gz` and `.bz2` files are decompressed on the fly
    pub fn data_path<P: AsRef<Path>>(self, path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..self
        }
    }
    pub fn delimiter(self, delimiter: u8) -> Self {
        Self { delimiter, ..self }
    }
    /// Namespace of the building characteristics (`cis`)
    pub fn identity_namespace<S: Into<String>>(self, identity: S) -> Self {
        Self {
            identity: identity.into(),
            ..self
        }
    }
    /// Identity field that must be unique across rows, `None` disables the check
    pub fn key_field<S: Into<String>>(self, key_field: Option<S>) -> Self {
        Self {
            key_field: key_field.map(Into::into),
            ..self
        }
    }
    /// Default type of every column under `namespace`
    pub fn namespace_type<S: Into<String>>(mut self, namespace: S, column_type: ColumnType) -> Self {
        self.namespace_types.insert(namespace.into(), column_type);
        self
    }
    /// Identity field to be coerced to float
    pub fn float_field<S: Into<String>>(mut self, field: S) -> Self {
        self.float_fields.push(field.into());
        self
    }
    /// Identity field to be coerced to a calendar date
    pub fn date_field<S: Into<String>>(mut self, field: S) -> Self {
        self.date_fields.push(field.into());
        self
    }
    /// Identity field to be coerced to a boolean flag
    pub fn bool_field<S: Into<String>>(mut self, field: S) -> Self {
        self.bool_fields.push(field.into());
        self
    }
    pub fn missing_token<S: Into<String>>(mut self, token: S) -> Self {
        self.missing_tokens.push(token.into());
        self
    }
    /// Loads the table from the data file
    pub fn load(self) -> Result<Table> {
        let file = File::open(&self.path).map_err(|e| LoadError::Open(e, self.path.clone()))?;
        log::info!("Loading {:?}...", self.path);
        let buf = BufReader::new(file);
        let reader: Box<dyn Read> = match self.path.extension().and_then(|x| x.to_str()) {
            Some("gz") => Box::new(GzDecoder::new(buf)),
            Some("bz2") => Box::new(BzDecoder::new(buf)),
            _ => Box::new(buf),
        };
        self.from_reader(reader)
    }
    /// Loads the table from any reader of delimited text
    pub fn from_reader<R: Read>(self, reader: R) -> Result<Table> {
        let now = Instant::now();
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = rdr.records();

        let namespaces = records
            .next()
            .ok_or_else(|| LoadError::MissingHeader("the namespace row is missing".into()))??;
        let names = records
            .next()
            .ok_or_else(|| LoadError::MissingHeader("the field row is missing".into()))??;
        let keys = self.header(&namespaces, &names)?;

        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); keys.len()];
        for result in records {
            let record = result?;
            for (column, cell) in cells.iter_mut().zip(record.iter()) {
                column.push(if self.missing_tokens.iter().any(|t| t == cell) {
                    None
                } else {
                    Some(cell.to_string())
                });
            }
        }

        let columns = keys
            .into_iter()
            .zip(cells)
            .map(|(key, cells)| {
                let column = self.coerce(&key, cells)?;
                Ok((key, column))
            })
            .collect::<Result<Vec<_>>>()?;
        let table = Table::from_columns(columns)?;
        self.check_identity(&table)?;
        log::info!(
            "... loaded {} buildings x {} columns in {}ms",
            table.len(),
            table.n_columns(),
            now.elapsed().as_millis()
        );
        Ok(table)
    }
    fn header(&self, namespaces: &csv::StringRecord, names: &csv::StringRecord) -> Result<Vec<ColumnKey>> {
        if namespaces.len() != names.len() {
            return Err(LoadError::MissingHeader(format!(
                "{} namespaces for {} fields",
                namespaces.len(),
                names.len()
            )));
        }
        let mut seen = HashSet::new();
        let mut keys = Vec::with_capacity(names.len());
        let mut current: Option<&str> = None;
        for (k, (namespace, field)) in namespaces.iter().zip(names.iter()).enumerate() {
            // merged header cells: an empty namespace continues the previous one
            if !namespace.is_empty() {
                current = Some(namespace);
            }
            let Some(namespace) = current else {
                return Err(LoadError::MissingHeader(format!(
                    "column #{k} has no namespace"
                )));
            };
            if field.is_empty() {
                return Err(LoadError::MissingHeader(format!(
                    "column #{k} ({namespace}) has no field name"
                )));
            }
            let key = ColumnKey::new(namespace, field);
            if !seen.insert(key.clone()) {
                return Err(LoadError::DuplicateColumn(key));
            }
            keys.push(key);
        }
        Ok(keys)
    }
    /// Type of a column before looking at its cells, `None` if it must be inferred
    fn declared_type(&self, key: &ColumnKey) -> Option<ColumnType> {
        if key.namespace == self.identity {
            if self.float_fields.contains(&key.field) {
                return Some(ColumnType::Float);
            }
            if self.date_fields.contains(&key.field) {
                return Some(ColumnType::Date);
            }
            if self.bool_fields.contains(&key.field) {
                return Some(ColumnType::Bool);
            }
        }
        self.namespace_types.get(&key.namespace).copied()
    }
    fn coerce(&self, key: &ColumnKey, cells: Vec<Option<String>>) -> Result<Column> {
        let malformed = |row: usize, value: &str, expected| LoadError::MalformedInput {
            column: key.clone(),
            row,
            value: value.to_string(),
            expected,
        };
        let column_type = self.declared_type(key).unwrap_or_else(|| {
            if cells.iter().flatten().all(|cell| cell.parse::<f64>().is_ok()) {
                ColumnType::Float
            } else {
                ColumnType::Text
            }
        });
        let column = match column_type {
            ColumnType::Float => Column::Float(
                cells
                    .iter()
                    .enumerate()
                    .map(|(row, cell)| {
                        cell.as_deref()
                            .map(|x| x.parse::<f64>().map_err(|_| malformed(row, x, ColumnType::Float)))
                            .transpose()
                    })
                    .collect::<Result<_>>()?,
            ),
            ColumnType::Date => Column::Date(
                cells
                    .iter()
                    .enumerate()
                    .map(|(row, cell)| {
                        cell.as_deref()
                            .map(|x| {
                                NaiveDate::parse_from_str(x, &self.date_format).map_err(|_| {
                                    LoadError::MalformedDate {
                                        column: key.clone(),
                                        row,
                                        value: x.to_string(),
                                        format: self.date_format.clone(),
                                    }
                                })
                            })
                            .transpose()
                    })
                    .collect::<Result<_>>()?,
            ),
            ColumnType::Bool => Column::Bool(
                cells
                    .iter()
                    .enumerate()
                    .map(|(row, cell)| {
                        cell.as_deref()
                            .map(|x| parse_flag(x).ok_or_else(|| malformed(row, x, ColumnType::Bool)))
                            .transpose()
                    })
                    .collect::<Result<_>>()?,
            ),
            ColumnType::Text if *key == ColumnKey::new(self.identity.as_str(), fields::CLIMATE_ZONE) => {
                Column::Text(
                    cells
                        .iter()
                        .enumerate()
                        .map(|(row, cell)| {
                            cell.as_deref()
                                .map(|x| normalize_zone(x).ok_or_else(|| malformed(row, x, ColumnType::Text)))
                                .transpose()
                        })
                        .collect::<Result<_>>()?,
                )
            }
            ColumnType::Text => Column::Text(cells),
        };
        Ok(column)
    }
    fn check_identity(&self, table: &Table) -> Result<()> {
        let Some(field) = &self.key_field else {
            return Ok(());
        };
        let key = ColumnKey::new(self.identity.as_str(), field.as_str());
        let Ok(column) = table.column(&key) else {
            return Ok(());
        };
        let mut seen = HashSet::new();
        for row in 0..table.len() {
            if let Some(value) = column.category(row) {
                if !seen.insert(value.clone()) {
                    return Err(LoadError::DuplicateIdentity {
                        column: key,
                        value: value.into_owned(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" | "1.0" => Some(true),
        "false" | "f" | "no" | "n" | "0" | "0.0" => Some(false),
        _ => None,
    }
}
