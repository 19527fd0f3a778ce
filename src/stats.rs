/// Position-weighted mean: the first value gets weight `n²`, the last gets `1²`.
///
/// Returns 0.0 for an empty slice.
pub fn weighted_mean(values: &[f64]) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }

    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for (i, &value) in values.iter().enumerate() {
        let rank = (n - i) as f64;
        let weight = rank * rank;
        weighted_sum += value * weight;
        weight_total += weight;
    }

    weighted_sum / weight_total
}

/// Population standard deviation (divides by `n`).
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    variance.sqrt()
}

/// `n` evenly spaced values from `start` to `end`, both inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
