//! Scoring pipeline stages
//!
//! Observations flow through these in order:
//! correlation table -> composite score / per-feature report.

pub mod correlation_table;
pub mod cfcs;
pub mod sigcorr_report;

// Re-export stage entry points
pub use correlation_table::{
    build_correlation_table, try_build_correlation_table, empty_correlation_table, Grouping,
    CLIMATE_VARIABLE, FUTURES_VARIABLE, CORRELATION, DEFAULT_GROUP_KEYS,
};
pub use cfcs::{compute_cfcs, try_compute_cfcs, CfcsOutcome, CorrelationSummary, Scoreboard};
pub use sigcorr_report::{
    sigcorr_report, sigcorr_report_by, sigcorr_report_default, try_sigcorr_report,
    try_sigcorr_report_by,
};
