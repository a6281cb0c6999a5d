//! Column Role Classification
//!
//! Observation tables carry no schema metadata: a column is a climate-risk
//! variable if its name starts with `climate_risk`, a futures variable if it
//! starts with `futures`, and anything else may be used as a grouping key.
//! This module performs that classification once, up front, so the builder
//! works from explicit column lists.

use polars::prelude::*;
use crate::error::{CfcsError, Result};
use crate::metrics::correlation_table::{CLIMATE_VARIABLE, CORRELATION, FUTURES_VARIABLE};

pub const CLIMATE_PREFIX: &str = "climate_risk";
pub const FUTURES_PREFIX: &str = "futures";

/// Climate and futures columns of an observation table, in table order
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRoles {
    pub climate: Vec<String>,
    pub futures: Vec<String>,
}

impl ColumnRoles {
    /// Classify columns by prefix
    ///
    /// Fails if either class is empty, climate checked first.
    pub fn classify(df: &DataFrame) -> Result<Self> {
        let names = column_names(df);

        let climate: Vec<String> = names.iter()
            .filter(|name| name.starts_with(CLIMATE_PREFIX))
            .cloned()
            .collect();
        if climate.is_empty() {
            return Err(CfcsError::MissingClimateColumns);
        }

        let futures: Vec<String> = names.iter()
            .filter(|name| name.starts_with(FUTURES_PREFIX))
            .cloned()
            .collect();
        if futures.is_empty() {
            return Err(CfcsError::MissingFuturesColumns);
        }

        Ok(Self { climate, futures })
    }

    /// Number of (climate, futures) pairs per group
    pub fn n_pairs(&self) -> usize {
        self.climate.len() * self.futures.len()
    }
}

/// Column names of a frame, in order
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect()
}

/// Columns the correlation table adds after the group keys
const RECORD_COLUMNS: [&str; 3] = [CLIMATE_VARIABLE, FUTURES_VARIABLE, CORRELATION];

/// Check every grouping key is a column of `df` and not a record column name
pub fn validate_group_keys(df: &DataFrame, keys: &[String]) -> Result<()> {
    let names = column_names(df);
    match keys.iter().find(|key| {
        !names.contains(key) || RECORD_COLUMNS.contains(&key.as_str())
    }) {
        Some(key) => Err(CfcsError::InvalidGroupKey { key: key.clone() }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_keeps_table_order() {
        let df = df![
            "crop_name" => &["corn", "corn"],
            "futures_close" => &[1.0, 2.0],
            "climate_risk_heat" => &[0.1, 0.2],
            "futures_open" => &[3.0, 4.0],
            "climate_risk_drought" => &[0.3, 0.4],
        ].unwrap();

        let roles = ColumnRoles::classify(&df).unwrap();
        assert_eq!(roles.climate, vec!["climate_risk_heat", "climate_risk_drought"]);
        assert_eq!(roles.futures, vec!["futures_close", "futures_open"]);
        assert_eq!(roles.n_pairs(), 4);
    }

    #[test]
    fn test_classify_missing_climate() {
        let df = df![
            "futures_close" => &[1.0, 2.0],
        ].unwrap();

        let err = ColumnRoles::classify(&df).unwrap_err();
        assert!(matches!(err, CfcsError::MissingClimateColumns));
    }

    #[test]
    fn test_classify_missing_futures() {
        let df = df![
            "climate_risk_heat" => &[0.1, 0.2],
            "price" => &[1.0, 2.0],
        ].unwrap();

        let err = ColumnRoles::classify(&df).unwrap_err();
        assert!(matches!(err, CfcsError::MissingFuturesColumns));
    }

    #[test]
    fn test_validate_group_keys() {
        let df = df![
            "crop_name" => &["corn"],
            "country_name" => &["US"],
        ].unwrap();

        assert!(validate_group_keys(&df, &["crop_name".to_string()]).is_ok());

        let err = validate_group_keys(
            &df,
            &["crop_name".to_string(), "region".to_string()],
        ).unwrap_err();
        match err {
            CfcsError::InvalidGroupKey { key } => assert_eq!(key, "region"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_group_key_clashing_with_record_column() {
        let df = df![
            "climate_variable" => &["drought"],
            "crop_name" => &["corn"],
        ].unwrap();

        let err = validate_group_keys(
            &df,
            &["crop_name".to_string(), "climate_variable".to_string()],
        ).unwrap_err();
        match err {
            CfcsError::InvalidGroupKey { key } => assert_eq!(key, "climate_variable"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
