use crate::dashboard;
use crate::pipeline;
use crate::sink;

use rayon::prelude::*;

/// Runs every chart pipeline in parallel, showing a progress bar.
///
/// Each slot is handled by its own Rayon task with no state shared between
/// them, so a slow or failing file never holds up another chart. The summaries
/// are collected once all tasks finish and come back in layout order.
///
/// # Arguments
/// * `slots` - Dashboard layout to process.
/// * `options` - SMA windows and time basis applied to every chart.
/// * `sink` - Renderer receiving each finished chart.
///
/// # Returns
/// * `anyhow::Result<Vec<ChartSummary>>` - One summary per slot, or an error if the bar style is invalid.
pub fn process_dashboard(
    slots: &[dashboard::ChartSlot],
    options: &pipeline::PipelineOptions,
    sink: &dyn sink::ChartSink,
) -> anyhow::Result<Vec<pipeline::ChartSummary>> {
    let pb = indicatif::ProgressBar::new(slots.len() as u64);
    pb.set_style(
        indicatif::ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("#>-"),
    );

    let summaries = slots
        .par_iter()
        .map(|slot| {
            let summary = pipeline::run_slot(slot, options, sink);
            pb.set_message(summary.chart_id.clone());
            pb.inc(1);
            summary
        })
        .collect::<Vec<_>>();

    pb.finish_with_message("done");
    anyhow::Ok(summaries)
}
