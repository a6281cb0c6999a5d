//! Scoring Configuration
//!
//! Per-run settings for the submission scorer, loaded from JSON. Fields left
//! out of the file take the competition defaults; the composite weights and
//! its 0.5 threshold are fixed and not configurable.
//!
//! ```json
//! { "group_keys": ["crop_name", "country_name"], "sig_level": 0.6 }
//! ```
//!
//! `"group_keys": null` correlates over the whole table.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use anyhow::{Context, Result};

use crate::metrics::correlation_table::{Grouping, DEFAULT_GROUP_KEYS};
use crate::metrics::sigcorr_report::{DEFAULT_FEATURE_COLUMN, DEFAULT_SIG_LEVEL};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Partition keys for the correlation table (`None` = ungrouped)
    pub group_keys: Option<Vec<String>>,
    /// Key column(s) of the significance report
    pub feature_columns: Vec<String>,
    /// |r| threshold used by the significance report
    pub sig_level: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            group_keys: Some(DEFAULT_GROUP_KEYS.iter().map(|k| k.to_string()).collect()),
            feature_columns: vec![DEFAULT_FEATURE_COLUMN.to_string()],
            sig_level: DEFAULT_SIG_LEVEL,
        }
    }
}

impl ScoringConfig {
    /// Load configuration from JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scoring config: {:?}", path))?;

        let config: ScoringConfig = serde_json::from_str(&contents)
            .with_context(|| "Failed to parse scoring config JSON")?;

        if config.feature_columns.is_empty() {
            anyhow::bail!("Scoring config must name at least one feature column");
        }

        Ok(config)
    }

    pub fn grouping(&self) -> Grouping {
        match &self.group_keys {
            Some(keys) => Grouping::by(keys.as_slice()),
            None => Grouping::Ungrouped,
        }
    }

    pub fn feature_refs(&self) -> Vec<&str> {
        self.feature_columns.iter().map(|f| f.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &tempfile::TempDir, json: &str) -> std::path::PathBuf {
        let path = dir.path().join("scoring.json");
        fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, r#"{ "sig_level": 0.6 }"#);

        let config = ScoringConfig::load(&path).unwrap();
        assert_eq!(config.sig_level, 0.6);
        assert_eq!(config.grouping(), Grouping::default());
        assert_eq!(config.feature_refs(), vec!["climate_variable"]);
    }

    #[test]
    fn test_null_group_keys_is_ungrouped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, r#"{ "group_keys": null }"#);

        let config = ScoringConfig::load(&path).unwrap();
        assert_eq!(config.grouping(), Grouping::Ungrouped);
    }

    #[test]
    fn test_empty_feature_columns_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, r#"{ "feature_columns": [] }"#);

        assert!(ScoringConfig::load(&path).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = ScoringConfig::load(Path::new("/nonexistent/scoring.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read scoring config"));
    }
}
