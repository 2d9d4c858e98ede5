use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid calendar date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid hour of day {0:?}, expected 0-23")]
    InvalidHour(String),
    #[error("unknown granularity {0:?}")]
    UnknownGranularity(String),
    #[error("unknown date range preset {0:?}")]
    UnknownPreset(String),
    #[error("unknown sort direction {0:?}")]
    UnknownSortDirection(String),
    #[error("unknown column {0:?}")]
    UnknownColumn(String),
}

pub type Result<T> = std::result::Result<T, Error>;
