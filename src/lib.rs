//! Climate-Futures Correlation Score (CFCS)
//!
//! Leaderboard scoring for climate-risk / futures-price submissions.
//!
//! Pipeline:
//! - `metrics::correlation_table`: grouped Pearson correlations, long form
//! - `metrics::cfcs`: weighted composite score
//! - `metrics::sigcorr_report`: per-feature significant-correlation report
//! - `scorer`: runs the stages for one submission or a batch
//!
//! Invalid inputs never panic or propagate through the plain entry points:
//! each stage has a `try_*` variant returning `CfcsError`, and a soft variant
//! that logs the error and returns an empty/sentinel value.

pub mod error;
pub mod utils;
pub mod config;
pub mod metrics;
pub mod scorer;

// Re-export commonly used types
pub use error::CfcsError;
pub use config::ScoringConfig;
pub use metrics::*;
pub use scorer::{SubmissionScore, SubmissionScorer};
