//! FEATURE SIGNIFICANCE REPORT
//!
//! Breaks the CFCS sub-score inputs down per feature value (by default per
//! climate variable), keeping only features that have at least one
//! significant correlation.
//!
//! **Output columns** (after the feature column(s), ascending by feature):
//!   1. avg_sig_corr - mean |r| over significant correlations
//!   2. max_sig_corr - max |r| over significant correlations
//!   3. sig_corr_count - number of significant correlations
//!   4. sig_corr_ratio(%) - 100 × sig_corr_count / non-null correlations
//!
//! Floats are rounded to 3 decimals.

use polars::prelude::*;
use tracing::warn;

use crate::error::{CfcsError, Result};
use crate::metrics::correlation_table::{CLIMATE_VARIABLE, CORRELATION};
use crate::utils::columns::column_names;

pub const DEFAULT_FEATURE_COLUMN: &str = CLIMATE_VARIABLE;
pub const DEFAULT_SIG_LEVEL: f64 = 0.5;

pub const AVG_SIG_CORR: &str = "avg_sig_corr";
pub const MAX_SIG_CORR: &str = "max_sig_corr";
pub const SIG_CORR_COUNT: &str = "sig_corr_count";
pub const SIG_CORR_RATIO: &str = "sig_corr_ratio(%)";

const CORRELATION_ABS: &str = "correlation_abs";
const TOTAL_CORR_COUNT: &str = "total_corr_count";
const REPORT_DECIMALS: u32 = 3;

/// Per-feature report, or `None` ("no report") on invalid arguments
///
/// `sig_level` is taken as a dynamic scalar so values read from untyped
/// sources can be passed straight through. Booleans count as 1/0; other
/// non-numeric values and NaN are rejected. The input table is not modified.
pub fn sigcorr_report(
    correlation_table: &DataFrame,
    feature_column: &str,
    sig_level: AnyValue<'_>,
) -> Option<DataFrame> {
    match try_sigcorr_report(correlation_table, feature_column, sig_level) {
        Ok(report) => Some(report),
        Err(e) => {
            warn!("{}; no report produced", e);
            None
        }
    }
}

/// Report per climate variable at the default 0.5 level
pub fn sigcorr_report_default(correlation_table: &DataFrame) -> Option<DataFrame> {
    sigcorr_report(
        correlation_table,
        DEFAULT_FEATURE_COLUMN,
        AnyValue::Float64(DEFAULT_SIG_LEVEL),
    )
}

pub fn try_sigcorr_report(
    correlation_table: &DataFrame,
    feature_column: &str,
    sig_level: AnyValue<'_>,
) -> Result<DataFrame> {
    try_sigcorr_report_by(correlation_table, &[feature_column], sig_level)
}

/// Multi-column report, or `None` ("no report") on invalid arguments
pub fn sigcorr_report_by(
    correlation_table: &DataFrame,
    features: &[&str],
    sig_level: AnyValue<'_>,
) -> Option<DataFrame> {
    match try_sigcorr_report_by(correlation_table, features, sig_level) {
        Ok(report) => Some(report),
        Err(e) => {
            warn!("{}; no report produced", e);
            None
        }
    }
}

/// Report keyed by one or more feature columns
///
/// e.g. `["crop_name", "climate_variable"]` for a per-crop breakdown.
pub fn try_sigcorr_report_by(
    correlation_table: &DataFrame,
    features: &[&str],
    sig_level: AnyValue<'_>,
) -> Result<DataFrame> {
    let sig_level = numeric_sig_level(&sig_level)?;

    let names = column_names(correlation_table);
    if !names.iter().any(|n| n == CORRELATION) {
        return Err(CfcsError::MissingCorrelationColumn);
    }
    if features.is_empty() {
        return Err(CfcsError::InvalidFeatureColumn { column: String::new() });
    }
    if let Some(bad) = features.iter()
        .find(|&&f| f == CORRELATION || !names.iter().any(|n| n == f))
    {
        return Err(CfcsError::InvalidFeatureColumn { column: bad.to_string() });
    }

    let feature_exprs: Vec<Expr> = features.iter().map(|&f| col(f)).collect();
    let features_present = features.iter()
        .map(|&f| col(f).is_not_null())
        .reduce(|a, b| a.and(b))
        .unwrap_or_else(|| lit(true));

    let mut selection = feature_exprs.clone();
    selection.extend([
        col(AVG_SIG_CORR).round(REPORT_DECIMALS),
        col(MAX_SIG_CORR).round(REPORT_DECIMALS),
        col(SIG_CORR_COUNT),
        col(SIG_CORR_RATIO).round(REPORT_DECIMALS),
    ]);

    let report = correlation_table
        .clone()
        .lazy()
        .with_column(
            col(CORRELATION)
                .cast(DataType::Float64)
                .fill_nan(lit(NULL))
                .alias(CORRELATION),
        )
        .with_column(col(CORRELATION).abs().alias(CORRELATION_ABS))
        // Mask insignificant rows without dropping them from the total count
        .with_column(
            when(col(CORRELATION_ABS).lt(lit(sig_level)))
                .then(lit(NULL).cast(DataType::Float64))
                .otherwise(col(CORRELATION_ABS))
                .alias(CORRELATION_ABS),
        )
        .filter(features_present)
        .group_by(feature_exprs.clone())
        .agg([
            col(CORRELATION_ABS).mean().alias(AVG_SIG_CORR),
            col(CORRELATION_ABS).max().alias(MAX_SIG_CORR),
            col(CORRELATION_ABS).count().alias(SIG_CORR_COUNT),
            col(CORRELATION).count().alias(TOTAL_CORR_COUNT),
        ])
        .filter(col(AVG_SIG_CORR).is_not_null())
        .with_column(
            (lit(100.0) * col(SIG_CORR_COUNT).cast(DataType::Float64)
                / col(TOTAL_CORR_COUNT).cast(DataType::Float64))
                .alias(SIG_CORR_RATIO),
        )
        .select(selection)
        .sort_by_exprs(feature_exprs, SortMultipleOptions::default())
        .collect()?;

    Ok(report)
}

/// Extract a numeric significance level from a dynamic scalar
fn numeric_sig_level(value: &AnyValue<'_>) -> Result<f64> {
    let level = match value {
        AnyValue::Boolean(v) => Some(if *v { 1.0 } else { 0.0 }),
        AnyValue::Float64(v) => Some(*v),
        AnyValue::Float32(v) => Some(*v as f64),
        AnyValue::Int8(v) => Some(*v as f64),
        AnyValue::Int16(v) => Some(*v as f64),
        AnyValue::Int32(v) => Some(*v as f64),
        AnyValue::Int64(v) => Some(*v as f64),
        AnyValue::UInt8(v) => Some(*v as f64),
        AnyValue::UInt16(v) => Some(*v as f64),
        AnyValue::UInt32(v) => Some(*v as f64),
        AnyValue::UInt64(v) => Some(*v as f64),
        _ => None,
    };

    match level {
        Some(level) if !level.is_nan() => Ok(level),
        _ => Err(CfcsError::InvalidSignificanceLevel { value: format!("{}", value) }),
    }
}
