//! Descriptive statistics over a chronological series (oldest first).

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    })
}

/// Population standard deviation (divides by n)
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Coefficient of variation in percent. A zero mean yields 0.
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    let std_dev = population_std_dev(values)?;
    if mean == 0.0 {
        return Some(0.0);
    }
    Some(std_dev / mean.abs() * 100.0)
}

/// Mean of the `window` most recent values
pub fn moving_average(values: &[f64], window: usize) -> Option<f64> {
    if window == 0 || values.len() < window {
        return None;
    }
    mean(&values[values.len() - window..])
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

/// Least squares over `(index, value)`. Needs at least two points.
///
/// A flat series fits its line exactly and reports `r_squared = 1`.
pub fn linear_regression(values: &[f64]) -> Option<Regression> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = mean(values)?;

    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }
    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let (mut ss_res, mut ss_tot) = (0.0, 0.0);
    for (i, y) in values.iter().enumerate() {
        let fitted = intercept + slope * i as f64;
        ss_res += (y - fitted).powi(2);
        ss_tot += (y - y_mean).powi(2);
    }
    let r_squared = if ss_tot == 0.0 {
        1.0
    } else {
        1.0 - ss_res / ss_tot
    };

    Some(Regression {
        slope,
        intercept,
        r_squared,
    })
}

/// Percent change from the mean of the two oldest values to the mean of the
/// two most recent. An old mean of 0 yields 0.
pub fn momentum_change(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let old = mean(&values[..2])?;
    let recent = mean(&values[values.len() - 2..])?;
    if old == 0.0 {
        return Some(0.0);
    }
    Some((recent - old) / old.abs() * 100.0)
}
