//! LazyFrame helpers for partitioning and column extraction
//!
//! Grouping is delegated to Polars: a row index is attached, rows are grouped
//! by key, and each group's row positions are collected as a list. The
//! per-group correlation work then runs over plain vectors.

use polars::prelude::*;
use crate::error::Result;

const ROW_INDEX: &str = "__cfcs_row";

/// Row partitions of a frame, one per distinct key tuple
#[derive(Debug)]
pub struct Partitions {
    /// Key columns only, one row per group, ascending key order
    pub keys: DataFrame,
    /// Row positions of each group in the source frame (same order as `keys`)
    pub rows: Vec<Vec<usize>>,
}

impl Partitions {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Partition rows of `df` by `keys`
///
/// Rows with a null value in any key column belong to no group. `keys` must
/// be non-empty and already validated against the frame.
pub fn partition_rows(df: &DataFrame, keys: &[String]) -> Result<Partitions> {
    let key_exprs: Vec<Expr> = keys.iter()
        .map(|k| col(k.as_str()))
        .collect();

    let mut lazy = df.clone().lazy().with_row_index(ROW_INDEX, None);
    if let Some(all_keys_present) = keys.iter()
        .map(|k| col(k.as_str()).is_not_null())
        .reduce(|a, b| a.and(b))
    {
        lazy = lazy.filter(all_keys_present);
    }

    let grouped = lazy
        .group_by(key_exprs.clone())
        .agg([col(ROW_INDEX)])
        .sort_by_exprs(key_exprs, SortMultipleOptions::default())
        .collect()?;

    let mut rows = Vec::with_capacity(grouped.height());
    for group in grouped.column(ROW_INDEX)?.list()?.into_iter() {
        let mut positions: Vec<usize> = match group {
            Some(series) => series.idx()?
                .into_no_null_iter()
                .map(|i| i as usize)
                .collect(),
            None => Vec::new(),
        };
        positions.sort_unstable();
        rows.push(positions);
    }

    let keys = grouped.select(keys.iter().map(|k| k.as_str()))?;

    Ok(Partitions { keys, rows })
}

/// Column values as nullable f64, NaN folded into null
pub fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let values = df.column(name)?.cast(&DataType::Float64)?;
    let values = values.f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_rows_sorted_by_key() {
        let df = df![
            "crop_name" => &["wheat", "corn", "wheat", "corn", "soy"],
            "value" => &[1, 2, 3, 4, 5],
        ].unwrap();

        let parts = partition_rows(&df, &["crop_name".to_string()]).unwrap();

        assert_eq!(parts.len(), 3);
        let crops: Vec<Option<&str>> = parts.keys.column("crop_name").unwrap()
            .str().unwrap()
            .into_iter()
            .collect();
        assert_eq!(crops, vec![Some("corn"), Some("soy"), Some("wheat")]);
        assert_eq!(parts.rows, vec![vec![1, 3], vec![4], vec![0, 2]]);
    }

    #[test]
    fn test_partition_rows_drops_null_keys() {
        let df = df![
            "crop_name" => &[Some("corn"), None, Some("corn")],
            "month" => &[Some(1), Some(1), None],
        ].unwrap();

        let parts = partition_rows(
            &df,
            &["crop_name".to_string(), "month".to_string()],
        ).unwrap();

        assert_eq!(parts.len(), 1);
        assert_eq!(parts.rows, vec![vec![0]]);
        assert_eq!(parts.keys.width(), 2);
    }

    #[test]
    fn test_numeric_values_casts_and_folds_nan() {
        let df = df![
            "ints" => &[Some(1i32), None, Some(3)],
            "floats" => &[Some(1.5), Some(f64::NAN), None],
        ].unwrap();

        assert_eq!(numeric_values(&df, "ints").unwrap(), vec![Some(1.0), None, Some(3.0)]);
        assert_eq!(numeric_values(&df, "floats").unwrap(), vec![Some(1.5), None, None]);
    }

    #[test]
    fn test_numeric_values_missing_column() {
        let df = df![
            "floats" => &[1.0],
        ].unwrap();

        assert!(numeric_values(&df, "missing").is_err());
    }
}
