use crate::chart;
use crate::sink;
use crate::utils;

use rayon::prelude::*;

/// Number of bars and points printed per series.
const PREVIEW_ROWS: usize = 5;

/// Memory-maps an exported `.bin` file and decodes its chart payload.
///
/// # Errors
/// * If the file cannot be opened or mapped.
/// * If the bytes are not a bincode-encoded `ChartPayload`.
pub fn load_payload<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<chart::ChartPayload> {
    let file = std::fs::File::open(path.as_ref())?;
    let mmap = unsafe { memmap2::Mmap::map(&file)? };
    let payload = bincode::deserialize(&mmap)
        .map_err(|e| anyhow::anyhow!("Failed to decode {}: {}", path.as_ref().display(), e))?;
    anyhow::Ok(payload)
}

/// Reads back the charts exported by this run and prints a preview of each.
///
/// Only the payloads named by `chart_ids` are opened, so files left in the
/// output directory by earlier runs are not touched. Files are read in
/// parallel; a payload that is missing or fails to decode stops the check
/// with an error.
///
/// # Arguments
/// * `exporter` - Exporter that wrote the payloads, used to locate them.
/// * `chart_ids` - Charts exported by this run.
///
/// # Returns
/// * `anyhow::Result<usize>` - Number of payloads read.
pub fn read_payloads(exporter: &sink::BincodeExporter, chart_ids: &[String]) -> anyhow::Result<usize> {
    chart_ids.par_iter().try_for_each(|chart_id| {
        let payload = load_payload(exporter.payload_path(chart_id))?;
        print_preview(&payload)?;
        Ok::<_, anyhow::Error>(())
    })?;

    Ok(chart_ids.len())
}

/// Prints the title and the first few bars and average points of one chart.
fn print_preview(payload: &chart::ChartPayload) -> anyhow::Result<()> {
    println!(
        "📄 {} ({}): {} candles, {} short SMA points, {} long SMA points",
        payload.title,
        payload.chart_id,
        payload.candles.len(),
        payload.sma_short.len(),
        payload.sma_long.len(),
    );
    utils::print_candles(&payload.candles, PREVIEW_ROWS)?;
    if !payload.sma_short.is_empty() {
        println!("📈 Short SMA");
        utils::print_points(&payload.sma_short, PREVIEW_ROWS)?;
    }
    if !payload.sma_long.is_empty() {
        println!("📈 Long SMA");
        utils::print_points(&payload.sma_long, PREVIEW_ROWS)?;
    }
    anyhow::Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{BincodeExporter, ChartSink};

    fn payload(chart_id: &str) -> chart::ChartPayload {
        chart::ChartPayload {
            chart_id: chart_id.to_string(),
            title_id: "title1".to_string(),
            title: "ABB - Time: 1 min".to_string(),
            candles: Vec::new(),
            sma_short: Vec::new(),
            sma_long: Vec::new(),
        }
    }

    #[test]
    fn loads_exported_payload() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = BincodeExporter::new(dir.path());
        exporter.render(&payload("tvchart1")).unwrap();

        let loaded = load_payload(exporter.payload_path("tvchart1")).unwrap();
        assert_eq!(loaded, payload("tvchart1"));
        assert_eq!(read_payloads(&exporter, &["tvchart1".to_string()]).unwrap(), 1);
    }

    #[test]
    fn stale_and_foreign_files_are_not_read() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = BincodeExporter::new(dir.path());
        // left over from an earlier, larger layout
        exporter.render(&payload("tvchart30")).unwrap();
        std::fs::write(dir.path().join("cache.bin"), [0xffu8; 3]).unwrap();
        exporter.render(&payload("tvchart1")).unwrap();
        exporter.render(&payload("tvchart2")).unwrap();

        let ids = vec!["tvchart1".to_string(), "tvchart2".to_string()];
        assert_eq!(read_payloads(&exporter, &ids).unwrap(), 2);
    }

    #[test]
    fn missing_or_corrupt_payload_fails_the_check() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = BincodeExporter::new(dir.path());
        std::fs::write(exporter.payload_path("tvchart9"), [0xffu8; 3]).unwrap();

        assert!(load_payload(exporter.payload_path("tvchart9")).is_err());
        assert!(read_payloads(&exporter, &["tvchart9".to_string()]).is_err());
        assert!(read_payloads(&exporter, &["tvchart4".to_string()]).is_err());
    }
}
