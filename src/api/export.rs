//! Client-side half of the export action: naming and saving the
//! spreadsheet stream the backend generates

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use super::ApiError;

/// Timestamp-based filename for a downloaded export
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("data_{}.xlsx", now.timestamp_millis())
}

/// Write the exported spreadsheet bytes under the download directory,
/// creating it if needed. Returns the full path of the saved file.
pub fn save_export(download_dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, ApiError> {
    std::fs::create_dir_all(download_dir)?;
    let path = download_dir.join(filename);
    std::fs::write(&path, bytes)?;
    Ok(path)
}
