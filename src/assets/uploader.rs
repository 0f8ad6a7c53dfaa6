use std::time::Duration;

use super::{AssetStore, StoredAsset};
use crate::upload::{UploadedFile, MAX_FILE_BYTES};

/// Replace anything outside `[A-Za-z0-9.-]` so the name is a safe key.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Upload files one at a time, pausing `delay` after each success except the
/// last file. A file that is empty, oversize or rejected by the store is
/// recorded and skipped.
///
/// Returns the stored assets in input order when at least one upload
/// succeeded; per-file failures are then only logged. When nothing succeeded
/// the reasons are joined into a single error.
pub async fn upload_all(
    store: &dyn AssetStore,
    files: &[UploadedFile],
    delay: Duration,
) -> Result<Vec<StoredAsset>, String> {
    if files.is_empty() {
        return Ok(Vec::new());
    }

    tracing::info!("Uploading {} image(s)", files.len());

    let mut stored = Vec::with_capacity(files.len());
    let mut failures: Vec<String> = Vec::new();

    for (i, file) in files.iter().enumerate() {
        if file.data.is_empty() {
            let reason = format!("File {} has no data", file.file_name);
            tracing::warn!("{reason}");
            failures.push(reason);
            continue;
        }

        if file.data.len() > MAX_FILE_BYTES {
            let reason = format!(
                "File {} exceeds 5MB limit ({}MB)",
                file.file_name,
                file.data.len().div_ceil(1024 * 1024)
            );
            tracing::warn!("{reason}");
            failures.push(reason);
            continue;
        }

        let key = format!(
            "{}-{i}-{}",
            chrono::Utc::now().timestamp_millis(),
            sanitize_name(&file.file_name)
        );

        tracing::debug!(
            "Uploading file {}/{}: {} ({}KB)",
            i + 1,
            files.len(),
            file.file_name,
            file.data.len() / 1024
        );

        match store.upload(&key, file).await {
            Ok(asset) => {
                tracing::debug!("Uploaded {} -> {}", file.file_name, asset.url);
                stored.push(asset);
                if i + 1 < files.len() && !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
            Err(e) => {
                let reason = format!("Failed to upload {}: {e}", file.file_name);
                tracing::warn!("{reason}");
                failures.push(reason);
            }
        }
    }

    tracing::info!(
        "Upload summary: {} successful, {} failed",
        stored.len(),
        failures.len()
    );

    if stored.is_empty() {
        return Err(format!("All image uploads failed: {}", failures.join(", ")));
    }

    if !failures.is_empty() {
        tracing::warn!(
            "Partial upload: {} stored, skipped: {}",
            stored.len(),
            failures.join(", ")
        );
    }

    Ok(stored)
}

/// Best-effort removal of remote assets. Failures are logged and swallowed.
pub async fn cleanup(store: &dyn AssetStore, public_ids: &[String]) {
    for public_id in public_ids {
        match store.delete(public_id).await {
            Ok(()) => tracing::debug!("Deleted asset {public_id}"),
            Err(e) => tracing::warn!("Failed to delete asset {public_id}: {e}"),
        }
    }
}
