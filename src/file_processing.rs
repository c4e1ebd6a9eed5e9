/// Checks that the input data directory exists and is a directory.
///
/// # Errors
/// * If the path is missing or points at a file.
pub fn check_path<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(anyhow::anyhow!("Input path does not exist: {}", path.display()));
    }
    if !path.is_dir() {
        return Err(anyhow::anyhow!("Input path is not a directory: {}", path.display()));
    }
    anyhow::Ok(())
}

/// Creates the output directory (and parents) if it is not there yet.
pub fn ensure_dir_exist<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    if path.is_file() {
        return Err(anyhow::anyhow!("Output path is a file: {}", path.display()));
    }
    std::fs::create_dir_all(path)?;
    anyhow::Ok(())
}
