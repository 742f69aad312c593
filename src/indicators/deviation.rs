/// Normalized deviation-magnitude score: `1 - exp(-(deviation / scale)^2)`
///
/// In [0, 1]: once `|deviation|` is several multiples of `scale` the
/// exponential drops below f64 precision and the score saturates at exactly
/// 1.0. The
/// square makes the score symmetric in the sign of the deviation: it measures
/// how far price sits from the mean, not which side of it. Entry and exit
/// thresholds are applied to this value.
pub fn deviation_score(deviation: f64, scale: f64) -> f64 {
    let normalized = deviation / scale;
    1.0 - (-(normalized * normalized)).exp()
}
