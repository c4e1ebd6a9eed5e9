use crate::chart;

/// Receives finished charts. Implementations must tolerate calls from several
/// pipeline threads at once.
pub trait ChartSink: Sync {
    fn render(&self, payload: &chart::ChartPayload) -> anyhow::Result<()>;
}

/// Writes each chart as `<out_dir>/<chart_id>.bin`, bincode-encoded.
pub struct BincodeExporter {
    out_dir: std::path::PathBuf,
}

impl BincodeExporter {
    pub fn new<P: AsRef<std::path::Path>>(out_dir: P) -> Self {
        Self {
            out_dir: out_dir.as_ref().to_path_buf(),
        }
    }

    pub fn payload_path(&self, chart_id: &str) -> std::path::PathBuf {
        self.out_dir.join(format!("{}.bin", chart_id))
    }
}

impl ChartSink for BincodeExporter {
    fn render(&self, payload: &chart::ChartPayload) -> anyhow::Result<()> {
        let data = bincode::serialize(payload)?;
        let path = self.payload_path(&payload.chart_id);
        std::fs::write(&path, data)
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))?;
        tracing::debug!(chart = %payload.chart_id, path = %path.display(), "chart exported");
        anyhow::Ok(())
    }
}
