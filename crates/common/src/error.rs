//! Error types shared by the cinebook crates

use thiserror::Error;

/// Result type alias using the cinebook common Error
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unparseable date-time: '{input}' matches none of the known formats")]
    DateTimeParse { input: String },

    #[error("Date-time input is empty")]
    EmptyDateTime,

    #[error("Invalid range: min {min} is greater than max {max}")]
    InvalidRange { min: i64, max: i64 },

    #[error("Cannot select from an empty population")]
    EmptyPopulation,
}
