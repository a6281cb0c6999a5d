//! Pearson correlation with pairwise deletion
//!
//! Matches pandas `DataFrame.corr(method="pearson", min_periods=2)`: only
//! positions where both values are present take part, and a pair with fewer
//! than `MIN_PERIODS` such positions (or zero variance) has no correlation.

/// Minimum jointly valid observations for a defined correlation
pub const MIN_PERIODS: usize = 2;

/// Pearson correlation of `x` and `y` over jointly valid positions
///
/// Null and NaN both count as missing. Result is clamped to [-1, 1].
pub fn pearson_pairwise(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x.iter()
        .zip(y.iter())
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) if !a.is_nan() && !b.is_nan() => Some((*a, *b)),
            _ => None,
        })
        .collect();

    if pairs.len() < MIN_PERIODS {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }

    Some((cov / denom).clamp(-1.0, 1.0))
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
