//! Submission Scorer - runs the full pipeline for leaderboard submissions
//!
//! observations -> correlation table -> {CFCS outcome, significance report}
//!
//! Includes both single-submission and parallel (Rayon) batch scoring. No
//! submission can fail a batch: every stage degrades to its sentinel value.

use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;
use anyhow::Result;
use tracing::info;

use crate::config::ScoringConfig;
use crate::metrics::{build_correlation_table, compute_cfcs, sigcorr_report_by, CfcsOutcome};

/// Pipeline output for one submission
#[derive(Debug, Clone)]
pub struct SubmissionScore {
    pub correlations: DataFrame,
    pub cfcs: CfcsOutcome,
    /// `None` when the report arguments were invalid for this table
    pub report: Option<DataFrame>,
}

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub submission: String,
    pub cfcs_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Main submission scorer
pub struct SubmissionScorer {
    config: ScoringConfig,
}

impl Default for SubmissionScorer {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

impl SubmissionScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Initialize scorer from a JSON config file
    pub fn from_config_file(path: &Path) -> Result<Self> {
        info!("Loading scoring config: {:?}", path);
        let config = ScoringConfig::load(path)?;
        info!(
            "Scorer initialized: group keys {:?}, features {:?}, sig_level {}",
            config.group_keys, config.feature_columns, config.sig_level
        );
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score one submission's observations
    pub fn score(&self, observations: &DataFrame) -> SubmissionScore {
        let correlations = build_correlation_table(observations, &self.config.grouping());
        let cfcs = compute_cfcs(&correlations);

        let report = sigcorr_report_by(
            &correlations,
            &self.config.feature_refs(),
            AnyValue::Float64(self.config.sig_level),
        );

        SubmissionScore { correlations, cfcs, report }
    }

    /// Score many submissions IN PARALLEL
    ///
    /// Results come back in input order.
    pub fn score_parallel(
        &self,
        submissions: &[(String, DataFrame)],
    ) -> Vec<(String, SubmissionScore)> {
        submissions
            .par_iter()
            .map(|(name, observations)| (name.clone(), self.score(observations)))
            .collect()
    }

    /// Score and rank submissions by CFCS, highest first
    ///
    /// Ties keep input order and share no rank: ranks are 1..=n.
    pub fn leaderboard(&self, submissions: &[(String, DataFrame)]) -> Vec<LeaderboardEntry> {
        let mut entries: Vec<LeaderboardEntry> = self.score_parallel(submissions)
            .into_iter()
            .map(|(submission, score)| LeaderboardEntry {
                rank: 0,
                submission,
                cfcs_score: score.cfcs.cfcs_score(),
                error: score.cfcs.error().map(|e| e.to_string()),
            })
            .collect();

        entries.sort_by(|a, b| b.cfcs_score.total_cmp(&a.cfcs_score));
        for (idx, entry) in entries.iter_mut().enumerate() {
            entry.rank = idx + 1;
        }

        info!("Ranked {} submissions", entries.len());
        entries
    }
}
