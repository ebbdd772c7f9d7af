//! Small f64 statistics helpers shared by the analytics modules.

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Sample variance (n-1 denominator)
pub fn sample_variance(data: &[f64]) -> f64 {
    let n = data.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(data);
    let sum_sq: f64 = data.iter().map(|x| (x - m) * (x - m)).sum();
    sum_sq / (n - 1) as f64
}

/// Bessel-corrected sample standard deviation; 0 with fewer than 2 points.
pub fn sample_std_dev(data: &[f64]) -> f64 {
    let var = sample_variance(data);
    if var <= 0.0 {
        return 0.0;
    }
    var.sqrt()
}

/// Largest peak-to-trough decline of a value series, as a fraction of the peak.
pub fn max_drawdown(values: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut max_dd = 0.0;

    for &v in values {
        if v > peak {
            peak = v;
        }
        if peak > 0.0 {
            let dd = (peak - v) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Treat values within `1e-12` of each other as equal dispersion-wise.
pub fn is_degenerate(std_dev: f64) -> bool {
    !std_dev.is_finite() || std_dev.abs() < 1e-12
}
