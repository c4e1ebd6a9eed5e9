/// Symbols shown on the default dashboard, in slot order.
pub const DEFAULT_SYMBOLS: [&str; 12] = [
    "ABB",
    "AARTIIND",
    "CUB",
    "BEL",
    "BAJAJ-AUT",
    "BHARATFOR",
    "BHEL",
    "DIXON",
    "DLF",
    "EXIDEIND",
    "ESCORTS",
    "COFORGE",
];

/// One chart on the dashboard: where it is drawn, where its title goes, and its data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSlot {
    pub chart_id: String,
    pub title_id: String,
    pub path: std::path::PathBuf,
}

impl ChartSlot {
    /// Builds the `n`-th slot (1-based) for `path`.
    pub fn numbered(n: usize, path: std::path::PathBuf) -> Self {
        ChartSlot {
            chart_id: format!("tvchart{}", n),
            title_id: format!("title{}", n),
            path,
        }
    }

    /// File name up to its first `.`, used as the chart's display name.
    pub fn file_stem(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy())
            .and_then(|name| name.split('.').next().map(str::to_string))
            .unwrap_or_default()
    }
}

/// The fixed twelve-chart layout over `data_dir`.
pub fn default_layout<P: AsRef<std::path::Path>>(data_dir: P) -> Vec<ChartSlot> {
    DEFAULT_SYMBOLS
        .iter()
        .enumerate()
        .map(|(i, symbol)| ChartSlot::numbered(i + 1, data_dir.as_ref().join(format!("{}.csv", symbol))))
        .collect()
}

/// Builds a layout from every `.csv`/`.txt` file in `data_dir`, sorted by file name.
///
/// # Errors
/// * If the directory cannot be read.
pub fn discover_layout<P: AsRef<std::path::Path>>(data_dir: P) -> anyhow::Result<Vec<ChartSlot>> {
    let mut paths = std::fs::read_dir(data_dir.as_ref())?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .map_or(false, |ext| ext.eq_ignore_ascii_case("csv") || ext.eq_ignore_ascii_case("txt"))
        })
        .collect::<Vec<_>>();
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let slots = paths
        .into_iter()
        .enumerate()
        .map(|(i, path)| ChartSlot::numbered(i + 1, path))
        .collect();
    anyhow::Ok(slots)
}
