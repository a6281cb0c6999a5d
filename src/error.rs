//! Error types for CFCS scoring
//!
//! Every variant except `Polars` is a soft failure: the non-`try_` entry
//! points log it and hand back an empty/sentinel value instead.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised by the correlation builder, scorer and reporter
#[derive(Error, Debug)]
pub enum CfcsError {
    #[error("input dataframe must have at least one column with name starting with climate_risk")]
    MissingClimateColumns,

    #[error("input dataframe must have at least one column with name starting with futures")]
    MissingFuturesColumns,

    #[error("illegal group key '{key}': not a column of the input dataframe")]
    InvalidGroupKey { key: String },

    #[error("correlation table must have a correlation column")]
    MissingCorrelationColumn,

    #[error("sig_level must be a number between 0 and 1, got {value}")]
    InvalidSignificanceLevel { value: String },

    #[error("illegal feature column '{column}': not a column of the correlation table")]
    InvalidFeatureColumn { column: String },

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, CfcsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_value() {
        let err = CfcsError::InvalidGroupKey { key: "region".to_string() };
        assert!(err.to_string().contains("region"));

        let err = CfcsError::InvalidSignificanceLevel { value: "\"high\"".to_string() };
        assert!(err.to_string().contains("high"));
    }
}
