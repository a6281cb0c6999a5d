//! CLIMATE-FUTURES CORRELATION SCORE (CFCS)
//!
//! Leaderboard composite over a correlation table:
//!
//! CFCS = (0.5 × Avg_Sig_Corr_Score) + (0.3 × Max_Corr_Score) + (0.2 × Sig_Count_Score)
//!
//! - Avg_Sig_Corr_Score: mean |r| over significant correlations, × 100, capped at 100
//! - Max_Corr_Score: max |r| over all correlations, × 100, capped at 100
//! - Sig_Count_Score: share of correlations that are significant, in percent
//!
//! A correlation is significant when |r| >= 0.5.

use polars::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{CfcsError, Result};
use crate::metrics::correlation_table::CORRELATION;

/// |r| threshold for a significant correlation in the composite
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.5;

pub const AVG_SIG_WEIGHT: f64 = 0.5;
pub const MAX_CORR_WEIGHT: f64 = 0.3;
pub const SIG_COUNT_WEIGHT: f64 = 0.2;

pub const NO_VALID_CORRELATIONS: &str = "No valid correlations";

/// Figures the sub-scores are derived from
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationSummary {
    pub total_count: usize,
    pub sig_count: usize,
    /// Mean |r| over significant correlations (0 when none)
    pub avg_sig_corr: f64,
    pub max_abs_corr: f64,
}

/// CFCS and its three weighted sub-scores, all in [0, 100]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scoreboard {
    pub cfcs_score: f64,
    pub avg_sig_score: f64,
    pub max_corr_score: f64,
    pub sig_count_score: f64,
    #[serde(skip)]
    pub summary: CorrelationSummary,
}

/// Result of scoring a correlation table
///
/// Serializes to the flat record shape used on the leaderboard: either the
/// four scores, or `{"cfcs_score": 0.0, "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CfcsOutcome {
    Scored(Scoreboard),
    Unscored { cfcs_score: f64, error: String },
}

impl CfcsOutcome {
    fn unscored(error: impl Into<String>) -> Self {
        CfcsOutcome::Unscored { cfcs_score: 0.0, error: error.into() }
    }

    pub fn cfcs_score(&self) -> f64 {
        match self {
            CfcsOutcome::Scored(board) => board.cfcs_score,
            CfcsOutcome::Unscored { cfcs_score, .. } => *cfcs_score,
        }
    }

    pub fn scoreboard(&self) -> Option<&Scoreboard> {
        match self {
            CfcsOutcome::Scored(board) => Some(board),
            CfcsOutcome::Unscored { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            CfcsOutcome::Scored(_) => None,
            CfcsOutcome::Unscored { error, .. } => Some(error),
        }
    }
}

/// Score a correlation table
///
/// Never fails. A table without a `correlation` column is reported as an
/// unscored outcome carrying the error message.
pub fn compute_cfcs(correlation_table: &DataFrame) -> CfcsOutcome {
    match try_compute_cfcs(correlation_table) {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!("{}; scoring as 0", e);
            CfcsOutcome::unscored(e.to_string())
        }
    }
}

/// Score a correlation table, reporting a missing `correlation` column
///
/// A table with no non-null correlations is not an error: it scores
/// `Unscored { cfcs_score: 0.0, error: "No valid correlations" }`.
pub fn try_compute_cfcs(correlation_table: &DataFrame) -> Result<CfcsOutcome> {
    let column = correlation_table
        .column(CORRELATION)
        .map_err(|_| CfcsError::MissingCorrelationColumn)?
        .cast(&DataType::Float64)?;

    let abs_corrs: Vec<f64> = column.f64()?
        .into_iter()
        .flatten()
        .filter(|r| !r.is_nan())
        .map(f64::abs)
        .collect();

    Ok(match score_abs_correlations(&abs_corrs) {
        Some(board) => {
            log_scoreboard(&board);
            CfcsOutcome::Scored(board)
        }
        None => CfcsOutcome::unscored(NO_VALID_CORRELATIONS),
    })
}

/// Composite over absolute correlations; `None` when there are none
fn score_abs_correlations(abs_corrs: &[f64]) -> Option<Scoreboard> {
    if abs_corrs.is_empty() {
        return None;
    }

    let total_count = abs_corrs.len();
    let max_abs_corr = abs_corrs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let significant: Vec<f64> = abs_corrs.iter()
        .copied()
        .filter(|&r| r >= SIGNIFICANCE_THRESHOLD)
        .collect();
    let sig_count = significant.len();

    let (avg_sig_corr, avg_sig_score) = if sig_count > 0 {
        let avg = significant.iter().sum::<f64>() / sig_count as f64;
        (avg, (avg * 100.0).min(100.0))
    } else {
        (0.0, 0.0)
    };

    let max_corr_score = (max_abs_corr * 100.0).min(100.0);
    let sig_count_score = (sig_count as f64 / total_count as f64) * 100.0;

    let cfcs_score = AVG_SIG_WEIGHT * avg_sig_score
        + MAX_CORR_WEIGHT * max_corr_score
        + SIG_COUNT_WEIGHT * sig_count_score;

    Some(Scoreboard {
        cfcs_score,
        avg_sig_score,
        max_corr_score,
        sig_count_score,
        summary: CorrelationSummary {
            total_count,
            sig_count,
            avg_sig_corr,
            max_abs_corr,
        },
    })
}

fn log_scoreboard(board: &Scoreboard) {
    info!("{:.2}% of all correlations are significant", board.sig_count_score);
    info!("Average significant correlation is {:.3}", board.summary.avg_sig_corr);
    info!("highest absolute correlation found is {:.3}", board.summary.max_abs_corr);
    info!("final CFCS score is {:.2}", board.cfcs_score);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn table(correlations: &[Option<f64>]) -> DataFrame {
        df![
            "climate_variable" => vec!["climate_risk_drought"; correlations.len()],
            "correlation" => correlations,
        ].unwrap()
    }

    #[test]
    fn test_one_significant_of_two() {
        let outcome = try_compute_cfcs(&table(&[Some(0.8), Some(0.3)])).unwrap();
        let board = outcome.scoreboard().unwrap();

        assert_eq!(board.summary.sig_count, 1);
        assert_eq!(board.summary.total_count, 2);
        assert_relative_eq!(board.avg_sig_score, 80.0, epsilon = 1e-9);
        assert_relative_eq!(board.max_corr_score, 80.0, epsilon = 1e-9);
        assert_relative_eq!(board.sig_count_score, 50.0, epsilon = 1e-9);
        assert_relative_eq!(board.cfcs_score, 74.0, epsilon = 1e-9);
    }

    #[test]
    fn test_negative_correlations_use_magnitude() {
        let outcome = compute_cfcs(&table(&[Some(-0.9), Some(0.1)]));
        let board = outcome.scoreboard().unwrap();

        assert_relative_eq!(board.max_corr_score, 90.0, epsilon = 1e-9);
        assert_relative_eq!(board.avg_sig_score, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let outcome = compute_cfcs(&table(&[Some(0.5)]));
        assert_eq!(outcome.scoreboard().unwrap().summary.sig_count, 1);
    }

    #[test]
    fn test_nulls_are_ignored() {
        let with_nulls = compute_cfcs(&table(&[Some(0.8), None, Some(0.3), None]));
        let without = compute_cfcs(&table(&[Some(0.8), Some(0.3)]));
        assert_eq!(with_nulls, without);
    }

    #[test]
    fn test_all_null_is_unscored() {
        let outcome = compute_cfcs(&table(&[None, None]));
        assert_eq!(
            outcome,
            CfcsOutcome::Unscored { cfcs_score: 0.0, error: NO_VALID_CORRELATIONS.to_string() },
        );
        assert_eq!(outcome.cfcs_score(), 0.0);
    }

    #[test]
    fn test_missing_correlation_column() {
        let df = df![
            "climate_variable" => &["climate_risk_drought"],
        ].unwrap();

        assert!(matches!(
            try_compute_cfcs(&df),
            Err(CfcsError::MissingCorrelationColumn)
        ));

        let outcome = compute_cfcs(&df);
        assert_eq!(outcome.cfcs_score(), 0.0);
        assert!(outcome.error().unwrap().contains("correlation column"));
    }

    #[test]
    fn test_serialized_shapes() {
        let scored = compute_cfcs(&table(&[Some(0.8), Some(0.3)]));
        let json = serde_json::to_value(&scored).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 4);
        assert!(json.get("summary").is_none());

        let unscored = compute_cfcs(&table(&[None]));
        assert_eq!(
            serde_json::to_value(&unscored).unwrap(),
            serde_json::json!({"cfcs_score": 0.0, "error": "No valid correlations"}),
        );
    }
}
