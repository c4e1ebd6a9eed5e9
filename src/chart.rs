use crate::csv_processor;
use crate::indicators;

/// Everything the renderer needs to draw one chart.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChartPayload {
    pub chart_id: String,
    pub title_id: String,
    pub title: String,
    pub candles: Vec<csv_processor::Candle>,
    pub sma_short: Vec<indicators::SeriesPoint>,
    pub sma_long: Vec<indicators::SeriesPoint>,
}

/// Minutes between the second and third bar.
///
/// This samples bars 1 and 2 rather than the whole span. `None` when fewer
/// than three bars exist.
pub fn timeframe_minutes(candles: &[csv_processor::Candle]) -> Option<f64> {
    let first = candles.get(1)?;
    let second = candles.get(2)?;
    Some((second.time - first.time) as f64 / 60.0)
}

/// Chart title: `"{name} - Time: {minutes} min"`, or just `name` when the
/// timeframe cannot be sampled.
pub fn title_label(name: &str, candles: &[csv_processor::Candle]) -> String {
    match timeframe_minutes(candles) {
        Some(minutes) => format!("{} - Time: {} min", name, minutes),
        None => name.to_string(),
    }
}
