/// Default smoothing factor for telemetry series.
pub const DEFAULT_ALPHA: f64 = 0.3;

/// Exponential moving average over a bounded series.
///
/// `s[0] = x[0]`, `s[i] = alpha * x[i] + (1 - alpha) * s[i-1]`. Pure and
/// deterministic: the same input always produces the same output. Empty
/// input produces empty output.
pub fn ema(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut smoothed = Vec::with_capacity(values.len());
    let mut previous = match values.first() {
        Some(&first) => first,
        None => return smoothed,
    };
    smoothed.push(previous);
    for &value in &values[1..] {
        previous = alpha * value + (1.0 - alpha) * previous;
        smoothed.push(previous);
    }
    smoothed
}
