use crate::chart;
use crate::csv_processor;
use crate::dashboard;
use crate::indicators;
use crate::sink;
use crate::utils;

/// Settings shared by every chart pipeline.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub short_window: usize,
    pub long_window: usize,
    pub basis: utils::TimeBasis,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            short_window: 5,
            long_window: 20,
            basis: utils::TimeBasis::Utc,
        }
    }
}

/// What happened to one chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSummary {
    pub chart_id: String,
    pub title: String,
    pub loaded: bool,
    pub candles: usize,
    pub skipped_rows: usize,
    pub rendered: bool,
}

/// Builds the payload for a parsed series: both averages plus the title.
pub fn build_payload(
    slot: &dashboard::ChartSlot,
    candles: Vec<csv_processor::Candle>,
    options: &PipelineOptions,
) -> chart::ChartPayload {
    let sma_short = indicators::simple_moving_average(&candles, options.short_window);
    let sma_long = indicators::simple_moving_average(&candles, options.long_window);
    chart::ChartPayload {
        chart_id: slot.chart_id.clone(),
        title_id: slot.title_id.clone(),
        title: chart::title_label(&slot.file_stem(), &candles),
        candles,
        sma_short,
        sma_long,
    }
}

/// Runs one chart end to end: load, parse, average, render.
///
/// A file that cannot be read is logged and charted as an empty series. A
/// render failure is logged and reported in the summary. Nothing here fails
/// the other charts.
pub fn run_slot(
    slot: &dashboard::ChartSlot,
    options: &PipelineOptions,
    sink: &dyn sink::ChartSink,
) -> ChartSummary {
    let (parsed, loaded) = match csv_processor::load_series(&slot.path, options.basis) {
        Ok(parsed) => (parsed, true),
        Err(e) => {
            tracing::error!(chart = %slot.chart_id, "Error processing file {}: {:#}", slot.path.display(), e);
            (csv_processor::ParsedSeries::default(), false)
        }
    };
    let skipped_rows = parsed.issues.len();

    let payload = build_payload(slot, parsed.records, options);
    let rendered = match sink.render(&payload) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(chart = %slot.chart_id, "Failed to render chart: {:#}", e);
            false
        }
    };

    ChartSummary {
        chart_id: payload.chart_id,
        title: payload.title,
        loaded,
        candles: payload.candles.len(),
        skipped_rows,
        rendered,
    }
}
