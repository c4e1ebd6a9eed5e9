mod cli;
mod chart;
mod error;
mod utils;
mod sink;
mod pipeline;
mod progress;
mod dashboard;
mod indicators;
mod csv_processor;
mod read_payloads;
mod file_processing;

/// Main entry point of the application.
///
/// This function orchestrates the entire workflow:
/// 1. Initializes logging and parses command-line arguments.
/// 2. Validates input/output paths and builds the chart layout.
/// 3. Determines the number of threads to use.
/// 4. Loads every chart's CSV, computes its moving averages and exports it.
/// 5. Optionally reads the exported charts back and displays the first rows.
///
/// # Returns
///
/// * `anyhow::Result<()>` - Success or an error if any step fails.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let total_start = std::time::Instant::now();
    let args = cli::Args::parse();
    println!("Start loading charts...");

    file_processing::check_path(&args.input)?;
    file_processing::ensure_dir_exist(&args.output)?;

    let slots = if args.discover {
        dashboard::discover_layout(&args.input)?
    } else {
        dashboard::default_layout(&args.input)
    };
    tracing::info!(charts = slots.len(), input = %args.input.display(), "dashboard layout ready");

    let options = pipeline::PipelineOptions {
        short_window: args.short_window,
        long_window: args.long_window,
        basis: if args.local_time {
            utils::TimeBasis::Local
        } else {
            utils::TimeBasis::Utc
        },
    };
    let exporter = sink::BincodeExporter::new(&args.output);

    let effective_threads = match args.threads {
        Some(n) => {
            let max_threads = num_cpus::get();
            if n > max_threads {
                println!("⚠️ Warning: Limiting thread count to {} (max available)", max_threads);
                max_threads
            } else { n }
        }
        None => rayon::current_num_threads(),
    };
    println!("🚀 Using {} thread(s)", effective_threads);

    let summaries = if args.threads.is_some() {
        let local_pool = utils::configure_thread_pool(effective_threads)?;
        local_pool.install(|| progress::process_dashboard(&slots, &options, &exporter))?
    } else {
        progress::process_dashboard(&slots, &options, &exporter)?
    };

    for summary in &summaries {
        let status = if !summary.loaded {
            "⚠️ no data"
        } else if !summary.rendered {
            "⚠️ not exported"
        } else {
            "✅"
        };
        println!(
            " - {} {}: {} ({} candles, {} rows skipped)",
            status, summary.chart_id, summary.title, summary.candles, summary.skipped_rows,
        );
    }

    let duration = total_start.elapsed();
    println!(
        "✅ {} chart(s) processed in {:?} seconds",
        summaries.len(),
        duration.as_secs_f64()
    );

    if args.check {
        println!("Start reading...");
        let start = std::time::Instant::now();

        let exported = summaries
            .iter()
            .filter(|summary| summary.rendered)
            .map(|summary| summary.chart_id.clone())
            .collect::<Vec<_>>();

        let read = if args.threads.is_some() {
            let local_pool = utils::configure_thread_pool(effective_threads)?;
            local_pool.install(|| read_payloads::read_payloads(&exporter, &exported))?
        } else {
            read_payloads::read_payloads(&exporter, &exported)?
        };
        println!(
            "✅ Reading {} chart(s) complete in {:?} seconds",
            read,
            start.elapsed().as_secs_f64()
        );
    }
    Ok(())
}
