//! Mutation wrappers gluing user actions to the REST adapter
//!
//! Every wrapper shows a loading notice, dismisses it on completion and
//! converts any request failure into a boolean so the caller can decide
//! whether to reload the table.

use std::path::PathBuf;
use tracing::warn;

use crate::api::{export, DictDataApi};
use crate::models::{DictDataRecord, ListFilter};
use crate::notify::Notifier;

/// Create a candidate record. Returns true on success.
pub async fn create_record<A: DictDataApi, N: Notifier>(
    api: &A,
    notifier: &mut N,
    record: &DictDataRecord,
) -> bool {
    notifier.loading("Creating dictionary data...");
    match api.create(record).await {
        Ok(_) => {
            notifier.dismiss_loading();
            notifier.success("Dictionary data created");
            true
        }
        Err(e) => {
            warn!("Create failed: {}", e);
            notifier.dismiss_loading();
            notifier.failure(&format!("Create failed: {}", e));
            false
        }
    }
}

/// Replace a full record. Returns true on success.
pub async fn update_record<A: DictDataApi, N: Notifier>(
    api: &A,
    notifier: &mut N,
    record: &DictDataRecord,
) -> bool {
    notifier.loading("Updating dictionary data...");
    match api.update(record).await {
        Ok(_) => {
            notifier.dismiss_loading();
            notifier.success("Dictionary data updated");
            true
        }
        Err(e) => {
            warn!("Update failed: {}", e);
            notifier.dismiss_loading();
            notifier.failure(&format!("Update failed: {}", e));
            false
        }
    }
}

/// Delete one or many records. An empty code list is a no-op success.
pub async fn delete_records<A: DictDataApi, N: Notifier>(
    api: &A,
    notifier: &mut N,
    dict_codes: &[i64],
) -> bool {
    if dict_codes.is_empty() {
        return true;
    }
    notifier.loading("Deleting dictionary data...");
    match api.delete(dict_codes).await {
        Ok(()) => {
            notifier.dismiss_loading();
            notifier.success("Dictionary data deleted");
            true
        }
        Err(e) => {
            warn!("Delete failed: {}", e);
            notifier.dismiss_loading();
            notifier.failure(&format!("Delete failed: {}", e));
            false
        }
    }
}

/// Ask the backend to rebuild its dictionary cache
pub async fn refresh_cache<A: DictDataApi, N: Notifier>(api: &A, notifier: &mut N) -> bool {
    notifier.loading("Refreshing dictionary cache...");
    match api.refresh_cache().await {
        Ok(()) => {
            notifier.dismiss_loading();
            notifier.success("Dictionary cache refreshed");
            true
        }
        Err(e) => {
            warn!("Cache refresh failed: {}", e);
            notifier.dismiss_loading();
            notifier.failure(&format!("Cache refresh failed: {}", e));
            false
        }
    }
}

/// Request the spreadsheet export for the current filter and save it
/// under the download directory with a timestamp-based filename
pub async fn export_records<A: DictDataApi, N: Notifier>(
    api: &A,
    notifier: &mut N,
    filter: &ListFilter,
    download_dir: &std::path::Path,
) -> Option<PathBuf> {
    notifier.loading("Exporting dictionary data...");
    let bytes = match api.export(filter).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Export failed: {}", e);
            notifier.dismiss_loading();
            notifier.failure(&format!("Export failed: {}", e));
            return None;
        }
    };

    let filename = export::export_filename(chrono::Utc::now());
    match export::save_export(download_dir, &filename, &bytes) {
        Ok(path) => {
            notifier.dismiss_loading();
            notifier.success(&format!("Exported to {}", path.display()));
            Some(path)
        }
        Err(e) => {
            warn!("Saving export failed: {}", e);
            notifier.dismiss_loading();
            notifier.failure(&format!("Saving export failed: {}", e));
            None
        }
    }
}
