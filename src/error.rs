use crate::{aggregate::AggregateError, building::AnalyticsError, loader::LoadError, table::TableError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error in the `loader` module")]
    Load(#[from] LoadError),
    #[error("Error in the `table` module")]
    Table(#[from] TableError),
    #[error("Error in the `aggregate` module")]
    Aggregate(#[from] AggregateError),
    #[error("Error in the `building` module")]
    Analytics(#[from] AnalyticsError),
}
