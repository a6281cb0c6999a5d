//! CORRELATION TABLE BUILDER
//!
//! Computes, per group of observations, the Pearson correlation between every
//! climate-risk column and every futures column, and reshapes the result into
//! long form.
//!
//! **Output columns**:
//!   1. group key columns (only when grouped), in the order given
//!   2. climate_variable - name of the `climate_risk*` column
//!   3. futures_variable - name of the `futures*` column
//!   4. correlation - Pearson r rounded to 5 decimals
//!
//! **Row order**: groups ascending by key, then climate columns, then futures
//! columns, both in input table order. Pairs without a defined correlation
//! are omitted.

use polars::prelude::*;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::Result;
use crate::utils::{numeric_values, partition_rows, pearson_pairwise, round_to};
use crate::utils::columns::{validate_group_keys, ColumnRoles};

pub const CLIMATE_VARIABLE: &str = "climate_variable";
pub const FUTURES_VARIABLE: &str = "futures_variable";
pub const CORRELATION: &str = "correlation";

/// Grouping used by the competition sample notebook
pub const DEFAULT_GROUP_KEYS: [&str; 3] = ["crop_name", "country_name", "date_on_month"];

/// Decimal places kept in the correlation column
const CORRELATION_DECIMALS: i32 = 5;

/// How observations are partitioned before correlating
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grouping {
    /// One global table over all rows
    Ungrouped,
    /// One table per distinct tuple of these key columns
    By(Vec<String>),
}

impl Default for Grouping {
    fn default() -> Self {
        Grouping::by(&DEFAULT_GROUP_KEYS)
    }
}

impl Grouping {
    pub fn by<S: AsRef<str>>(keys: &[S]) -> Self {
        Grouping::By(keys.iter().map(|k| k.as_ref().to_string()).collect())
    }

    /// Key columns (empty when ungrouped)
    pub fn keys(&self) -> &[String] {
        match self {
            Grouping::Ungrouped => &[],
            Grouping::By(keys) => keys,
        }
    }
}

/// One defined correlation, by column position within `ColumnRoles`
#[derive(Debug, Clone, Copy)]
struct PairCorrelation {
    climate: usize,
    futures: usize,
    value: f64,
}

/// Build the long-form correlation table
///
/// Never fails: on a missing climate/futures column or an unknown group key
/// it logs a warning and returns the empty table (single `correlation`
/// column). Use [`try_build_correlation_table`] to inspect the error.
pub fn build_correlation_table(observations: &DataFrame, grouping: &Grouping) -> DataFrame {
    match try_build_correlation_table(observations, grouping) {
        Ok(table) => table,
        Err(e) => {
            warn!("{}; returning empty correlation table", e);
            empty_correlation_table()
        }
    }
}

/// Build the long-form correlation table, reporting validation failures
pub fn try_build_correlation_table(
    observations: &DataFrame,
    grouping: &Grouping,
) -> Result<DataFrame> {
    let roles = ColumnRoles::classify(observations)?;
    let keys = grouping.keys();
    validate_group_keys(observations, keys)?;

    let climate = roles.climate.iter()
        .map(|name| numeric_values(observations, name))
        .collect::<Result<Vec<_>>>()?;
    let futures = roles.futures.iter()
        .map(|name| numeric_values(observations, name))
        .collect::<Result<Vec<_>>>()?;

    // An empty key list has nothing to partition by
    if keys.is_empty() {
        let all_rows: Vec<usize> = (0..observations.height()).collect();
        let pairs = correlate_group(&climate, &futures, &all_rows);
        let frame = DataFrame::new(record_columns(&roles, &pairs))?;
        return Ok(frame);
    }

    let partitions = partition_rows(observations, keys)?;
    debug!(
        "Correlating {} groups x {} column pairs",
        partitions.len(),
        roles.n_pairs()
    );

    // Indexed collect keeps group order regardless of scheduling
    let per_group: Vec<Vec<PairCorrelation>> = partitions.rows
        .par_iter()
        .map(|rows| correlate_group(&climate, &futures, rows))
        .collect();

    let mut group_of_record: Vec<IdxSize> = Vec::new();
    let mut records: Vec<PairCorrelation> = Vec::new();
    for (group_idx, pairs) in per_group.into_iter().enumerate() {
        group_of_record.extend(std::iter::repeat(group_idx as IdxSize).take(pairs.len()));
        records.extend(pairs);
    }

    let take = IdxCa::from_vec("group".into(), group_of_record);
    let mut table = partitions.keys.take(&take)?;
    for column in record_columns(&roles, &records) {
        table.with_column(column)?;
    }

    Ok(table)
}

/// The soft-failure result: no rows, one `correlation` column
pub fn empty_correlation_table() -> DataFrame {
    Series::new_empty(CORRELATION.into(), &DataType::Float64).into_frame()
}

/// Correlate every climate/futures pair over the given rows
fn correlate_group(
    climate: &[Vec<Option<f64>>],
    futures: &[Vec<Option<f64>>],
    rows: &[usize],
) -> Vec<PairCorrelation> {
    let gather = |values: &Vec<Option<f64>>| -> Vec<Option<f64>> {
        rows.iter().map(|&r| values[r]).collect()
    };
    let climate: Vec<Vec<Option<f64>>> = climate.iter().map(gather).collect();
    let futures: Vec<Vec<Option<f64>>> = futures.iter().map(gather).collect();

    let mut pairs = Vec::with_capacity(climate.len() * futures.len());
    for (ci, x) in climate.iter().enumerate() {
        for (fi, y) in futures.iter().enumerate() {
            if let Some(r) = pearson_pairwise(x, y) {
                pairs.push(PairCorrelation {
                    climate: ci,
                    futures: fi,
                    value: round_to(r, CORRELATION_DECIMALS),
                });
            }
        }
    }
    pairs
}

fn record_columns(roles: &ColumnRoles, records: &[PairCorrelation]) -> Vec<Column> {
    let climate: Vec<&str> = records.iter()
        .map(|p| roles.climate[p.climate].as_str())
        .collect();
    let futures: Vec<&str> = records.iter()
        .map(|p| roles.futures[p.futures].as_str())
        .collect();
    let correlation: Vec<f64> = records.iter().map(|p| p.value).collect();

    vec![
        Column::new(CLIMATE_VARIABLE.into(), climate),
        Column::new(FUTURES_VARIABLE.into(), futures),
        Column::new(CORRELATION.into(), correlation),
    ]
}
