use crate::csv_processor;

/// One value of an overlay line, stamped with the time of the bar it ends on.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SeriesPoint {
    pub time: i64,
    pub value: f64,
}

/// Simple moving average of the close price over a trailing window.
///
/// Emits one point per bar from index `window - 1` on, so `n` bars give
/// `n - window + 1` points and fewer than `window` bars give none. Each window is
/// summed from scratch; `NaN` closes make the windows containing them `NaN`.
///
/// # Arguments
/// * `candles` - Bars in time order.
/// * `window` - Number of bars averaged; `0` yields an empty series.
pub fn simple_moving_average(candles: &[csv_processor::Candle], window: usize) -> Vec<SeriesPoint> {
    if window == 0 || candles.len() < window {
        return Vec::new();
    }

    candles
        .windows(window)
        .map(|bars| {
            let sum: f64 = bars.iter().map(|bar| bar.close).sum();
            SeriesPoint {
                time: bars[window - 1].time,
                value: sum / window as f64,
            }
        })
        .collect()
}
